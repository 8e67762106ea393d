//! IS-MCTS configuration parameters.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ISMCTSError, Result};

/// How children are scored during selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChildSelectionPolicy {
    /// Q(a) + c * sqrt(ln(N) / n(a))
    Uct,
    /// Q(a) + c * P(a) * sqrt(N) / (1 + n(a))
    Puct,
}

/// How root statistics become the returned policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinalPolicyType {
    /// Visit counts normalized by the root's total visits.
    NormalizedVisitCount,
    /// Uniform over the most visited actions.
    MaxVisitCount,
    /// Uniform over the visited actions with the best mean return.
    MaxValue,
}

/// Which string identifies an information set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InfoKeySource {
    /// `GameState::information_state_string`
    InformationState,
    /// `GameState::observation_string`
    Observation,
}

/// Whether nodes may see different legal action sets across determinizations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionSetMode {
    /// Every state in an information set has the same legal actions.
    Strict,
    /// Filter node statistics down to the currently legal actions.
    Tolerant,
}

/// How many root determinizations to draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorldSamples {
    /// Resample for every simulation.
    Unlimited,
    /// Cache up to this many samples, then reuse them at random.
    Bounded(usize),
}

macro_rules! impl_from_str {
    ($ty:ident, $what:literal, { $($name:literal => $variant:ident),+ $(,)? }) => {
        impl FromStr for $ty {
            type Err = ISMCTSError;

            fn from_str(s: &str) -> Result<Self> {
                match s.to_ascii_lowercase().replace('-', "_").as_str() {
                    $($name => Ok($ty::$variant),)+
                    other => Err(ISMCTSError::Configuration(format!(
                        concat!("unsupported ", $what, ": {}"),
                        other
                    ))),
                }
            }
        }
    };
}

impl_from_str!(ChildSelectionPolicy, "child selection policy", {
    "uct" => Uct,
    "puct" => Puct,
});

impl_from_str!(FinalPolicyType, "final policy type", {
    "normalized_visit_count" => NormalizedVisitCount,
    "max_visit_count" => MaxVisitCount,
    "max_value" => MaxValue,
});

impl_from_str!(InfoKeySource, "information key source", {
    "information_state" => InformationState,
    "observation" => Observation,
});

impl_from_str!(ActionSetMode, "action set mode", {
    "strict" => Strict,
    "tolerant" => Tolerant,
});

/// IS-MCTS configuration parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ISMCTSConfig {
    /// Exploration constant C (default: sqrt(2)).
    /// Higher values favor exploration over exploitation.
    pub exploration_constant: f64,

    /// Simulations per `run_search` call.
    pub max_simulations: u32,

    /// Root determinization budget.
    pub max_world_samples: WorldSamples,

    /// Child scoring rule.
    pub child_selection: ChildSelectionPolicy,

    /// Final policy extraction rule.
    pub final_policy: FinalPolicyType,

    /// Source of information-set keys.
    pub info_key_source: InfoKeySource,

    /// Legal action set consistency assumption.
    pub action_set_mode: ActionSetMode,

    /// Random seed for the search RNG.
    /// Same seed produces deterministic searches.
    pub seed: u64,

    /// Log a warning when a root determinization changes the
    /// searching player's information key.
    pub check_determinizations: bool,
}

impl Default for ISMCTSConfig {
    fn default() -> Self {
        Self {
            exploration_constant: std::f64::consts::SQRT_2,
            max_simulations: 1000,
            max_world_samples: WorldSamples::Unlimited,
            child_selection: ChildSelectionPolicy::Puct,
            final_policy: FinalPolicyType::MaxVisitCount,
            info_key_source: InfoKeySource::InformationState,
            action_set_mode: ActionSetMode::Strict,
            seed: 42,
            check_determinizations: false,
        }
    }
}

impl ISMCTSConfig {
    /// Set the exploration constant.
    pub fn with_exploration(mut self, c: f64) -> Self {
        self.exploration_constant = c;
        self
    }

    /// Set the simulation budget.
    pub fn with_simulations(mut self, n: u32) -> Self {
        self.max_simulations = n;
        self
    }

    /// Set the root determinization budget.
    pub fn with_world_samples(mut self, samples: WorldSamples) -> Self {
        self.max_world_samples = samples;
        self
    }

    /// Set the child selection policy.
    pub fn with_selection(mut self, policy: ChildSelectionPolicy) -> Self {
        self.child_selection = policy;
        self
    }

    /// Set the final policy type.
    pub fn with_final_policy(mut self, policy: FinalPolicyType) -> Self {
        self.final_policy = policy;
        self
    }

    /// Set the information key source.
    pub fn with_info_key_source(mut self, source: InfoKeySource) -> Self {
        self.info_key_source = source;
        self
    }

    /// Set the action set mode.
    pub fn with_action_set_mode(mut self, mode: ActionSetMode) -> Self {
        self.action_set_mode = mode;
        self
    }

    /// Set the seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Enable or disable the determinization key check.
    pub fn with_determinization_check(mut self, enabled: bool) -> Self {
        self.check_determinizations = enabled;
        self
    }

    /// Reject values the search cannot run with.
    pub fn validate(&self) -> Result<()> {
        if !self.exploration_constant.is_finite() || self.exploration_constant < 0.0 {
            return Err(ISMCTSError::Configuration(format!(
                "exploration constant must be finite and non-negative, got {}",
                self.exploration_constant
            )));
        }
        if self.max_world_samples == WorldSamples::Bounded(0) {
            return Err(ISMCTSError::Configuration(
                "bounded world samples must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ISMCTSConfig::default();
        assert!((config.exploration_constant - std::f64::consts::SQRT_2).abs() < 0.001);
        assert_eq!(config.max_world_samples, WorldSamples::Unlimited);
        assert_eq!(config.child_selection, ChildSelectionPolicy::Puct);
        assert_eq!(config.final_policy, FinalPolicyType::MaxVisitCount);
        assert_eq!(config.action_set_mode, ActionSetMode::Strict);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = ISMCTSConfig::default()
            .with_exploration(2.0)
            .with_seed(123)
            .with_simulations(50)
            .with_world_samples(WorldSamples::Bounded(4))
            .with_selection(ChildSelectionPolicy::Uct)
            .with_final_policy(FinalPolicyType::MaxValue)
            .with_info_key_source(InfoKeySource::Observation)
            .with_action_set_mode(ActionSetMode::Tolerant)
            .with_determinization_check(true);

        assert_eq!(config.exploration_constant, 2.0);
        assert_eq!(config.seed, 123);
        assert_eq!(config.max_simulations, 50);
        assert_eq!(config.max_world_samples, WorldSamples::Bounded(4));
        assert_eq!(config.child_selection, ChildSelectionPolicy::Uct);
        assert_eq!(config.final_policy, FinalPolicyType::MaxValue);
        assert_eq!(config.info_key_source, InfoKeySource::Observation);
        assert_eq!(config.action_set_mode, ActionSetMode::Tolerant);
        assert!(config.check_determinizations);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let zero_cap = ISMCTSConfig::default().with_world_samples(WorldSamples::Bounded(0));
        assert!(matches!(zero_cap.validate(), Err(ISMCTSError::Configuration(_))));

        let negative = ISMCTSConfig::default().with_exploration(-1.0);
        assert!(matches!(negative.validate(), Err(ISMCTSError::Configuration(_))));

        let nan = ISMCTSConfig::default().with_exploration(f64::NAN);
        assert!(nan.validate().is_err());
    }

    #[test]
    fn test_from_str() {
        assert_eq!("UCT".parse::<ChildSelectionPolicy>(), Ok(ChildSelectionPolicy::Uct));
        assert_eq!("puct".parse::<ChildSelectionPolicy>(), Ok(ChildSelectionPolicy::Puct));
        assert_eq!(
            "max-visit-count".parse::<FinalPolicyType>(),
            Ok(FinalPolicyType::MaxVisitCount)
        );
        assert_eq!("observation".parse::<InfoKeySource>(), Ok(InfoKeySource::Observation));
        assert_eq!("Tolerant".parse::<ActionSetMode>(), Ok(ActionSetMode::Tolerant));

        let err = "ucb2".parse::<ChildSelectionPolicy>().unwrap_err();
        assert_eq!(
            err,
            ISMCTSError::Configuration("unsupported child selection policy: ucb2".into())
        );
    }

    #[test]
    fn test_serialization() {
        let config = ISMCTSConfig::default().with_world_samples(WorldSamples::Bounded(8));
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: ISMCTSConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }
}
