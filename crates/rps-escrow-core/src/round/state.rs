//! The single round owned by a coordinator.

use crate::protocol::{Player, Reveal, RoundPhase};
use rps_custody::Address;

/// Players per round
pub const MAX_PLAYERS: usize = 2;

/// Mutable round storage. `Default` is the empty round.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Round {
    /// Registration order fixes player 1 / player 2
    pub players: Vec<Player>,
    pub revealed: Option<Reveal>,
    /// `None` when no round is active
    pub last_activity: Option<u64>,
}

impl Round {
    pub fn phase(&self) -> RoundPhase {
        match (self.players.len(), &self.revealed) {
            (0, _) => RoundPhase::Empty,
            (1, _) => RoundPhase::OneBet,
            (_, None) => RoundPhase::TwoBets,
            (_, Some(_)) => RoundPhase::OneReveal,
        }
    }

    /// Registration index of `address`, if it has bet in this round
    pub fn position_of(&self, address: &Address) -> Option<usize> {
        self.players.iter().position(|p| p.address == *address)
    }

    pub fn has_revealed(&self, address: &Address) -> bool {
        self.revealed
            .as_ref()
            .map_or(false, |reveal| reveal.player == *address)
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= MAX_PLAYERS
    }

    /// Wipe the round, handing back what it held
    pub fn take(&mut self) -> Round {
        std::mem::take(self)
    }
}
