//! Protocol types and events.

mod events;
mod types;

pub use events::{EventSink, RoundEvent, Topic};
pub use types::{Player, Reveal, RoundPhase, RoundSnapshot};
