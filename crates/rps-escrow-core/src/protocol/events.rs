//! Events emitted by the round coordinator.

use crate::bet::Bet;
use crate::crypto::{Commitment, Salt};
use rps_custody::Address;
use serde::{Deserialize, Serialize};

/// Observable outcome of a successful operation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RoundEvent {
    BetPlaced {
        player: Address,
        commitment: Commitment,
    },
    BetRevealed {
        player: Address,
        bet: Bet,
        salt: Salt,
    },
    RoundResolved {
        /// `None` on a draw
        winner: Option<Address>,
        bet1: Bet,
        bet2: Bet,
    },
    RoundCancelled {
        player1: Address,
        player2: Option<Address>,
    },
}

/// Indexed field of an event, for external filtering
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Topic {
    Player(Address),
    Bet(Bet),
}

impl RoundEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            RoundEvent::BetPlaced { .. } => "bet_placed",
            RoundEvent::BetRevealed { .. } => "bet_revealed",
            RoundEvent::RoundResolved { .. } => "round_resolved",
            RoundEvent::RoundCancelled { .. } => "round_cancelled",
        }
    }

    /// Indexed fields carried by this event
    pub fn topics(&self) -> Vec<Topic> {
        match self {
            RoundEvent::BetPlaced { player, .. } => vec![Topic::Player(*player)],
            RoundEvent::BetRevealed { player, bet, .. } => {
                vec![Topic::Player(*player), Topic::Bet(*bet)]
            }
            RoundEvent::RoundResolved { winner, bet1, bet2 } => {
                let mut topics = Vec::with_capacity(3);
                if let Some(winner) = winner {
                    topics.push(Topic::Player(*winner));
                }
                topics.push(Topic::Bet(*bet1));
                topics.push(Topic::Bet(*bet2));
                topics
            }
            RoundEvent::RoundCancelled { player1, player2 } => {
                let mut topics = vec![Topic::Player(*player1)];
                if let Some(player2) = player2 {
                    topics.push(Topic::Player(*player2));
                }
                topics
            }
        }
    }

    pub fn involves(&self, address: &Address) -> bool {
        self.topics().contains(&Topic::Player(*address))
    }

    pub fn mentions_bet(&self, bet: Bet) -> bool {
        self.topics().contains(&Topic::Bet(bet))
    }
}

/// Synchronous receiver of committed events.
///
/// Called while the coordinator still holds the round lock, so a sink sees
/// every event in commit order and must not block.
pub trait EventSink: Send + Sync {
    fn record(&self, event: &RoundEvent);
}
