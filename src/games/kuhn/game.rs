//! Kuhn poker state.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{PlayerId, SearchRng};
use crate::game::{GameState, Turn};

/// Number of cards in the deck (J, Q, K).
pub const DECK_SIZE: u8 = 3;

const CARD_NAMES: [char; DECK_SIZE as usize] = ['J', 'Q', 'K'];

/// Kuhn poker actions. Deals are chance outcomes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum KuhnAction {
    /// Deal a card to the next player without one.
    Deal(u8),
    /// Check, or fold when facing a bet.
    Pass,
    /// Bet, or call when facing a bet.
    Bet,
}

impl KuhnAction {
    fn symbol(self) -> char {
        match self {
            KuhnAction::Deal(_) => '*',
            KuhnAction::Pass => 'p',
            KuhnAction::Bet => 'b',
        }
    }
}

/// Two-player Kuhn poker.
///
/// Each player antes 1 and is dealt one private card. Player 0 acts first;
/// a bet costs 1 more chip. Betting sequences `pp`, `bb` and `pbb` go to
/// showdown, `bp` and `pbp` end with a fold.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct KuhnState {
    cards: [Option<u8>; 2],
    history: SmallVec<[KuhnAction; 3]>,
}

impl KuhnState {
    /// Fresh game, before the deal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Game with both cards already dealt (0 = J, 1 = Q, 2 = K).
    pub fn with_cards(first: u8, second: u8) -> Self {
        debug_assert!(first != second && first < DECK_SIZE && second < DECK_SIZE);
        Self {
            cards: [Some(first), Some(second)],
            history: SmallVec::new(),
        }
    }

    /// Card held by `player`, if dealt.
    #[must_use]
    pub fn card(&self, player: PlayerId) -> Option<u8> {
        self.cards.get(player.index()).copied().flatten()
    }

    /// Betting actions taken so far.
    #[must_use]
    pub fn history(&self) -> &[KuhnAction] {
        &self.history
    }

    fn is_dealt(&self) -> bool {
        self.cards.iter().all(Option::is_some)
    }

    fn betting_over(&self) -> bool {
        use KuhnAction::{Bet, Pass};
        matches!(
            self.history.as_slice(),
            [Pass, Pass] | [Bet, Pass] | [Bet, Bet] | [Pass, Bet, Pass] | [Pass, Bet, Bet]
        )
    }

    fn contributions(&self) -> [f64; 2] {
        let mut chips = [1.0, 1.0];
        for (i, action) in self.history.iter().enumerate() {
            if *action == KuhnAction::Bet {
                chips[i % 2] += 1.0;
            }
        }
        chips
    }

    fn card_name(&self, player: PlayerId) -> char {
        self.card(player)
            .map_or('?', |c| CARD_NAMES[c as usize])
    }

    fn undealt(&self) -> impl Iterator<Item = u8> + '_ {
        (0..DECK_SIZE).filter(move |c| !self.cards.contains(&Some(*c)))
    }
}

impl GameState for KuhnState {
    type Action = KuhnAction;

    fn num_players(&self) -> usize {
        2
    }

    fn current_player(&self) -> Turn {
        if !self.is_dealt() {
            Turn::Chance
        } else if self.betting_over() {
            Turn::Terminal
        } else {
            Turn::Player(PlayerId::new((self.history.len() % 2) as u8))
        }
    }

    fn legal_actions(&self) -> Vec<KuhnAction> {
        match self.current_player() {
            Turn::Player(_) => vec![KuhnAction::Pass, KuhnAction::Bet],
            Turn::Chance | Turn::Terminal => vec![],
        }
    }

    fn chance_outcomes(&self) -> Vec<(KuhnAction, f64)> {
        if self.is_dealt() {
            return vec![];
        }
        let remaining: Vec<u8> = self.undealt().collect();
        let prob = 1.0 / remaining.len() as f64;
        remaining.into_iter().map(|c| (KuhnAction::Deal(c), prob)).collect()
    }

    fn apply_action(&mut self, action: &KuhnAction) {
        match *action {
            KuhnAction::Deal(card) => {
                if let Some(slot) = self.cards.iter_mut().find(|c| c.is_none()) {
                    *slot = Some(card);
                }
            }
            KuhnAction::Pass | KuhnAction::Bet => self.history.push(*action),
        }
    }

    fn returns(&self) -> Vec<f64> {
        if self.current_player() != Turn::Terminal {
            return vec![0.0, 0.0];
        }

        let chips = self.contributions();
        let winner = match self.history.as_slice() {
            [KuhnAction::Bet, KuhnAction::Pass] => 0,
            [KuhnAction::Pass, KuhnAction::Bet, KuhnAction::Pass] => 1,
            _ => {
                if self.cards[0] > self.cards[1] {
                    0
                } else {
                    1
                }
            }
        };
        let loser = 1 - winner;

        let mut returns = vec![0.0, 0.0];
        returns[winner] = chips[loser];
        returns[loser] = -chips[loser];
        returns
    }

    fn information_state_string(&self, player: PlayerId) -> String {
        let history: String = self.history.iter().map(|a| a.symbol()).collect();
        format!("{}:{}", self.card_name(player), history)
    }

    fn observation_string(&self, player: PlayerId) -> String {
        let chips = self.contributions();
        format!("{} pot=[{} {}]", self.card_name(player), chips[0], chips[1])
    }

    fn resample_from_infostate(&self, player: PlayerId, rng: &mut SearchRng) -> Option<Self> {
        let mut sampled = self.clone();
        let Some(own) = self.card(player) else {
            return Some(sampled);
        };

        let hidden: Vec<u8> = (0..DECK_SIZE).filter(|c| *c != own).collect();
        for (i, slot) in sampled.cards.iter_mut().enumerate() {
            if i != player.index() && slot.is_some() {
                *slot = rng.choose(&hidden).copied();
            }
        }
        Some(sampled)
    }
}
