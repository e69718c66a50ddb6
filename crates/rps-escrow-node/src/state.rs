//! Application state management.

use crate::config::NodeConfig;
use chrono::{DateTime, Utc};
use rps_custody::MockCustodian;
use rps_escrow_core::{EventSink, RoundCoordinator, RoundEvent, SystemClock};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Event as recorded by the node
#[derive(Clone, Debug, Serialize)]
pub struct RecordedEvent {
    pub seq: u64,
    pub recorded_at: DateTime<Utc>,
    #[serde(flatten)]
    pub event: RoundEvent,
}

struct JournalInner {
    entries: VecDeque<RecordedEvent>,
    next_seq: u64,
}

/// Bounded log of committed events, oldest evicted first.
///
/// Sequence numbers keep counting across evictions, so a gap at the front
/// of the log shows how much history was dropped.
pub struct EventJournal {
    capacity: usize,
    inner: Mutex<JournalInner>,
}

impl EventJournal {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(JournalInner {
                entries: VecDeque::new(),
                next_seq: 0,
            }),
        }
    }

    /// Retained events, oldest first
    pub fn entries(&self) -> Vec<RecordedEvent> {
        lock(&self.inner).entries.iter().cloned().collect()
    }

    /// Events recorded since startup, including evicted ones
    pub fn total(&self) -> u64 {
        lock(&self.inner).next_seq
    }
}

impl EventSink for EventJournal {
    fn record(&self, event: &RoundEvent) {
        let mut inner = lock(&self.inner);
        if inner.entries.len() >= self.capacity {
            inner.entries.pop_front();
        }
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.entries.push_back(RecordedEvent {
            seq,
            recorded_at: Utc::now(),
            event: event.clone(),
        });
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    coordinator: Arc<RoundCoordinator>,
    /// In-memory ledger standing in for the token custodian
    custodian: MockCustodian,
    /// Real time plus any simulated skew
    clock: Arc<SystemClock>,
    journal: Arc<EventJournal>,
}

impl AppState {
    pub fn new(config: &NodeConfig) -> Self {
        let custodian = MockCustodian::new();
        let clock = Arc::new(SystemClock::new());
        let journal = Arc::new(EventJournal::new(config.journal_capacity));
        let coordinator = RoundCoordinator::new(
            config.round.clone(),
            config.escrow_account,
            Arc::new(custodian.clone()),
            clock.clone(),
        )
        .with_sink(journal.clone());

        Self {
            coordinator: Arc::new(coordinator),
            custodian,
            clock,
            journal,
        }
    }

    pub fn coordinator(&self) -> &RoundCoordinator {
        &self.coordinator
    }

    pub fn custodian(&self) -> &MockCustodian {
        &self.custodian
    }

    pub fn clock(&self) -> &SystemClock {
        &self.clock
    }

    pub fn journal(&self) -> &EventJournal {
        &self.journal
    }

    /// Retained events, oldest first
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.journal.entries()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rps_custody::Address;
    use rps_escrow_core::{Bet, Commitment, Salt};

    fn state_with_journal(capacity: usize) -> AppState {
        let capacity = capacity.to_string();
        let config = NodeConfig::from_lookup(|key: &str| match key {
            "RPS_JOURNAL_CAPACITY" => Some(capacity.clone()),
            _ => None,
        })
        .unwrap();
        AppState::new(&config)
    }

    /// Plays one drawn round: five events
    async fn play_draw(state: &AppState, x: Address, y: Address) {
        let coordinator = state.coordinator();
        let salt_x = Salt::random();
        let salt_y = Salt::random();
        coordinator
            .place_bet(x, Commitment::new(Bet::Rock, &salt_x))
            .await
            .unwrap();
        coordinator
            .place_bet(y, Commitment::new(Bet::Rock, &salt_y))
            .await
            .unwrap();
        coordinator.reveal_bet(x, Bet::Rock, salt_x).await.unwrap();
        coordinator.reveal_bet(y, Bet::Rock, salt_y).await.unwrap();
    }

    fn funded_pair(state: &AppState) -> (Address, Address) {
        let asset = state.coordinator().asset().clone();
        let x = Address::derive("x");
        let y = Address::derive("y");
        let stake = state.coordinator().betting_amount();
        state.custodian().mint(&asset, x, stake).unwrap();
        state.custodian().mint(&asset, y, stake).unwrap();
        (x, y)
    }

    #[tokio::test]
    async fn test_journal_keeps_bursts_beyond_broadcast_buffer() {
        let state = state_with_journal(1_000);
        let (x, y) = funded_pair(&state);

        // 300 events with nobody reading in between
        for _ in 0..60 {
            play_draw(&state, x, y).await;
        }

        let events = state.events();
        assert_eq!(events.len(), 300);
        assert!(events.iter().enumerate().all(|(i, e)| e.seq == i as u64));
        assert_eq!(events[0].event.kind(), "bet_placed");
        assert_eq!(events[299].event.kind(), "round_resolved");
    }

    #[tokio::test]
    async fn test_journal_evicts_oldest_at_capacity() {
        let state = state_with_journal(8);
        let (x, y) = funded_pair(&state);

        for _ in 0..3 {
            play_draw(&state, x, y).await;
        }

        let events = state.events();
        assert_eq!(state.journal().total(), 15);
        assert_eq!(events.len(), 8);
        assert_eq!(events.first().map(|e| e.seq), Some(7));
        assert_eq!(events.last().map(|e| e.seq), Some(14));
    }
}
