//! Rock-Paper-Scissors bets and the winner rule.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A player's hidden choice
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bet {
    Rock,
    Paper,
    Scissors,
}

impl Bet {
    pub const ALL: [Bet; 3] = [Bet::Rock, Bet::Paper, Bet::Scissors];

    /// Single-byte encoding used inside commitments
    pub fn as_byte(&self) -> u8 {
        match self {
            Bet::Rock => 0,
            Bet::Paper => 1,
            Bet::Scissors => 2,
        }
    }

    /// Check if this bet beats the other
    pub fn beats(&self, other: &Bet) -> bool {
        matches!(
            (self, other),
            (Bet::Rock, Bet::Scissors) | (Bet::Scissors, Bet::Paper) | (Bet::Paper, Bet::Rock)
        )
    }
}

impl fmt::Display for Bet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bet::Rock => write!(f, "Rock"),
            Bet::Paper => write!(f, "Paper"),
            Bet::Scissors => write!(f, "Scissors"),
        }
    }
}

/// Outcome of a round, relative to registration order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    /// Player 1 (first to bet) wins
    AWins,
    /// Player 2 wins
    BWins,
    Draw,
}

impl GameResult {
    /// 1-based index of the winning player; 0 for a draw
    pub fn winner_index(&self) -> u8 {
        match self {
            GameResult::AWins => 1,
            GameResult::BWins => 2,
            GameResult::Draw => 0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameResult::AWins => "A wins",
            GameResult::BWins => "B wins",
            GameResult::Draw => "Draw",
        }
    }

    /// Same outcome seen with the two players swapped
    pub fn swapped(&self) -> GameResult {
        match self {
            GameResult::AWins => GameResult::BWins,
            GameResult::BWins => GameResult::AWins,
            GameResult::Draw => GameResult::Draw,
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Decide a round from both bets in registration order
pub fn judge(bet1: Bet, bet2: Bet) -> GameResult {
    if bet1 == bet2 {
        GameResult::Draw
    } else if bet1.beats(&bet2) {
        GameResult::AWins
    } else {
        GameResult::BWins
    }
}
