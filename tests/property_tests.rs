//! Property tests over randomized Kuhn poker searches.

use proptest::prelude::*;

use ismcts::evaluator::{RandomRolloutEvaluator, UniformEvaluator};
use ismcts::game::GameState;
use ismcts::games::kuhn::{KuhnAction, KuhnState};
use ismcts::mcts::{
    ActionSetMode, ChildSelectionPolicy, FinalPolicyType, ISMCTSConfig, ISMCTSSearch, WorldSamples,
};

/// Decision states: a deal plus a non-terminal betting prefix.
fn decision_state() -> impl Strategy<Value = KuhnState> {
    let deals = (0u8..3, 0u8..3).prop_filter("distinct cards", |(a, b)| a != b);
    let prefixes = prop_oneof![
        Just(vec![]),
        Just(vec![KuhnAction::Pass]),
        Just(vec![KuhnAction::Bet]),
        Just(vec![KuhnAction::Pass, KuhnAction::Bet]),
    ];

    (deals, prefixes).prop_map(|((a, b), prefix)| {
        let mut state = KuhnState::with_cards(a, b);
        for action in &prefix {
            state.apply_action(action);
        }
        state
    })
}

fn config() -> impl Strategy<Value = ISMCTSConfig> {
    (
        any::<u64>(),
        1u32..150,
        prop_oneof![Just(WorldSamples::Unlimited), (1usize..5).prop_map(WorldSamples::Bounded)],
        prop_oneof![Just(ChildSelectionPolicy::Uct), Just(ChildSelectionPolicy::Puct)],
        prop_oneof![
            Just(FinalPolicyType::NormalizedVisitCount),
            Just(FinalPolicyType::MaxVisitCount),
            Just(FinalPolicyType::MaxValue),
        ],
        prop_oneof![Just(ActionSetMode::Strict), Just(ActionSetMode::Tolerant)],
        0.0f64..3.0,
    )
        .prop_map(|(seed, sims, samples, selection, final_policy, mode, c)| {
            ISMCTSConfig::default()
                .with_seed(seed)
                .with_simulations(sims)
                .with_world_samples(samples)
                .with_selection(selection)
                .with_final_policy(final_policy)
                .with_action_set_mode(mode)
                .with_exploration(c)
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn visit_gap_is_zero_or_one(state in decision_state(), config in config()) {
        let mut search = ISMCTSSearch::new(RandomRolloutEvaluator::new(1), config);
        search.run_search(&state).unwrap();

        for (key, node) in search.store().iter() {
            let children = node.child_visits();
            prop_assert!(node.visits() >= children, "{} has more child visits than visits", key);
            let gap = node.visits() - children;
            prop_assert!(gap <= 1, "{} has gap {}", key, gap);
        }
    }

    #[test]
    fn policy_covers_each_legal_action_once(state in decision_state(), config in config()) {
        let legal = state.legal_actions();
        let mut search = ISMCTSSearch::new(UniformEvaluator, config);
        let policy = search.run_search(&state).unwrap();

        let total: f64 = policy.iter().map(|(_, p)| p).sum();
        prop_assert!((total - 1.0).abs() < 1e-5, "policy sums to {}", total);
        prop_assert_eq!(policy.len(), legal.len());
        for action in &legal {
            prop_assert_eq!(policy.iter().filter(|(a, _)| *a == action).count(), 1);
        }
        prop_assert!(policy.iter().all(|(_, p)| (0.0..=1.0 + 1e-9).contains(&p)));
    }

    #[test]
    fn resampling_preserves_information_state(state in decision_state(), seed in any::<u64>()) {
        let player = state.current_player().player().unwrap();
        let mut rng = ismcts::SearchRng::new(seed);

        let sampled = state.resample_from_infostate(player, &mut rng).unwrap();

        prop_assert_eq!(
            sampled.information_state_string(player),
            state.information_state_string(player)
        );
    }
}
