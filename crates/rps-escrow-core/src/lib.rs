//! RPS Escrow Core Library
//!
//! Two-party Rock-Paper-Scissors over escrowed stakes, played with
//! commit-reveal so neither side sees the other's bet before committing.
//!
//! The [`RoundCoordinator`] owns the single round and moves value through a
//! [`Custodian`](rps_custody::Custodian).

pub mod bet;
pub mod clock;
pub mod config;
pub mod crypto;
pub mod error;
pub mod protocol;
pub mod round;

pub use bet::{judge, Bet, GameResult};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::RoundConfig;
pub use crypto::{Commitment, Salt};
pub use error::{ConfigError, Result, RoundError};
pub use protocol::{EventSink, Player, Reveal, RoundEvent, RoundPhase, RoundSnapshot, Topic};
pub use round::RoundCoordinator;
