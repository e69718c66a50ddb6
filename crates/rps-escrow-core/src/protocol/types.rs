//! Round data types.

use crate::bet::Bet;
use crate::crypto::Commitment;
use rps_custody::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A registered bettor and their sealed choice
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub address: Address,
    pub commitment: Commitment,
}

/// First reveal of the current round
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reveal {
    pub player: Address,
    pub bet: Bet,
}

/// Where the round stands
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    /// No bets
    Empty,
    /// Waiting for a second bettor
    OneBet,
    /// Both bets in, nobody revealed
    TwoBets,
    /// Waiting for the second reveal
    OneReveal,
}

impl fmt::Display for RoundPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoundPhase::Empty => write!(f, "Empty"),
            RoundPhase::OneBet => write!(f, "OneBet"),
            RoundPhase::TwoBets => write!(f, "TwoBets"),
            RoundPhase::OneReveal => write!(f, "OneReveal"),
        }
    }
}

/// Read-only copy of the round
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSnapshot {
    pub phase: RoundPhase,
    pub players: Vec<Player>,
    pub revealed: Option<Reveal>,
    /// 0 when no round is active
    pub last_activity_time: u64,
    /// Amount the escrow account should currently hold
    pub escrowed: u64,
}
