//! Round state and coordinator.

mod coordinator;
mod state;

pub use coordinator::RoundCoordinator;
pub use state::MAX_PLAYERS;
