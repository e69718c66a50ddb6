//! Integration tests for complete rounds.
//!
//! These tests play whole rounds against the mock custodian and check
//! balances, events and the reset back to an empty round.

use async_trait::async_trait;
use rps_custody::{Address, AssetId, Custodian, CustodyError, MockCustodian, Transfer, TransferId};
use rps_escrow_core::{
    Bet, Commitment, ManualClock, RoundConfig, RoundCoordinator, RoundError, RoundEvent,
    RoundPhase, Salt,
};
use std::sync::Arc;
use tokio::sync::broadcast;

const START: u64 = 1_700_000_000;
const STAKE: u64 = 1_000;
const TIMEOUT: u64 = 600;
const FUNDS: u64 = 5 * STAKE;

struct Table {
    coordinator: RoundCoordinator,
    custodian: MockCustodian,
    clock: Arc<ManualClock>,
    asset: AssetId,
    x: Address,
    y: Address,
}

impl Table {
    fn new() -> Self {
        let asset = AssetId::new("TOKEN");
        let custodian = MockCustodian::new();
        let clock = Arc::new(ManualClock::new(START));
        let x = Address::derive("player-x");
        let y = Address::derive("player-y");
        custodian.mint(&asset, x, FUNDS).unwrap();
        custodian.mint(&asset, y, FUNDS).unwrap();

        let coordinator = RoundCoordinator::new(
            RoundConfig::new(asset.clone(), STAKE, TIMEOUT).unwrap(),
            Address::derive("escrow"),
            Arc::new(custodian.clone()),
            clock.clone(),
        );

        Self {
            coordinator,
            custodian,
            clock,
            asset,
            x,
            y,
        }
    }

    fn balance(&self, account: &Address) -> u64 {
        self.custodian.balance(&self.asset, account)
    }

    fn escrow(&self) -> u64 {
        self.balance(&self.coordinator.escrow_account())
    }

    async fn assert_escrow_matches_round(&self) {
        assert_eq!(self.escrow(), self.coordinator.escrowed().await);
        assert_eq!(
            self.escrow(),
            STAKE * self.coordinator.players().await.len() as u64
        );
    }

    async fn assert_reset(&self) {
        assert_eq!(self.coordinator.phase().await, RoundPhase::Empty);
        assert!(self.coordinator.players().await.is_empty());
        assert!(self.coordinator.revealed().await.is_none());
        assert_eq!(self.coordinator.last_activity_time().await, 0);
        assert_eq!(self.escrow(), 0);
    }

    async fn bet(&self, player: Address, bet: Bet) -> Salt {
        let salt = Salt::random();
        self.coordinator
            .place_bet(player, Commitment::new(bet, &salt))
            .await
            .unwrap();
        self.assert_escrow_matches_round().await;
        salt
    }
}

fn drain(events: &mut broadcast::Receiver<RoundEvent>) -> Vec<RoundEvent> {
    let mut out = Vec::new();
    while let Ok(event) = events.try_recv() {
        out.push(event);
    }
    out
}

/// X commits Rock, Y commits Paper, both reveal: Y takes the pot
#[tokio::test]
async fn test_paper_beats_rock_round() {
    let table = Table::new();
    let mut events = table.coordinator.subscribe();

    let salt_x = table.bet(table.x, Bet::Rock).await;
    let salt_y = table.bet(table.y, Bet::Paper).await;

    table
        .coordinator
        .reveal_bet(table.x, Bet::Rock, salt_x.clone())
        .await
        .unwrap();
    table.assert_escrow_matches_round().await;
    table
        .coordinator
        .reveal_bet(table.y, Bet::Paper, salt_y.clone())
        .await
        .unwrap();

    assert_eq!(table.balance(&table.y), FUNDS + STAKE);
    assert_eq!(table.balance(&table.x), FUNDS - STAKE);
    table.assert_reset().await;

    let events = drain(&mut events);
    let kinds: Vec<&str> = events.iter().map(RoundEvent::kind).collect();
    assert_eq!(
        kinds,
        vec![
            "bet_placed",
            "bet_placed",
            "bet_revealed",
            "bet_revealed",
            "round_resolved"
        ]
    );
    assert_eq!(
        events[3],
        RoundEvent::BetRevealed {
            player: table.y,
            bet: Bet::Paper,
            salt: salt_y,
        }
    );
    assert_eq!(
        events[4],
        RoundEvent::RoundResolved {
            winner: Some(table.y),
            bet1: Bet::Rock,
            bet2: Bet::Paper,
        }
    );
}

/// Lone bettor gets their stake back only after the timeout
#[tokio::test]
async fn test_single_bettor_withdraws_after_timeout() {
    let table = Table::new();
    table.bet(table.x, Bet::Scissors).await;
    let mut events = table.coordinator.subscribe();

    table.clock.advance(TIMEOUT / 2);
    let err = table.coordinator.withdraw(table.x).await.unwrap_err();
    assert!(matches!(err, RoundError::TooEarly));
    assert_eq!(table.escrow(), STAKE);

    table.clock.advance(TIMEOUT / 2);
    table.coordinator.withdraw(table.x).await.unwrap();

    assert_eq!(table.balance(&table.x), FUNDS);
    table.assert_reset().await;
    assert_eq!(
        drain(&mut events),
        vec![RoundEvent::RoundCancelled {
            player1: table.x,
            player2: None,
        }]
    );
}

/// Only X reveals; after the timeout Y is refused and X takes the pot
#[tokio::test]
async fn test_revealer_claims_pot_from_silent_opponent() {
    let table = Table::new();
    let salt_x = table.bet(table.x, Bet::Rock).await;
    table.bet(table.y, Bet::Paper).await;

    table.clock.advance(100);
    table
        .coordinator
        .reveal_bet(table.x, Bet::Rock, salt_x)
        .await
        .unwrap();

    // Timeout runs from the reveal, not from the bets
    table.clock.advance(TIMEOUT - 1);
    assert!(matches!(
        table.coordinator.withdraw(table.x).await,
        Err(RoundError::TooEarly)
    ));
    table.clock.advance(1);

    let mut events = table.coordinator.subscribe();
    let err = table.coordinator.withdraw(table.y).await.unwrap_err();
    assert!(matches!(err, RoundError::CheatingDetected));
    assert_eq!(table.escrow(), 2 * STAKE);

    table.coordinator.withdraw(table.x).await.unwrap();
    assert_eq!(table.balance(&table.x), FUNDS + STAKE);
    assert_eq!(table.balance(&table.y), FUNDS - STAKE);
    table.assert_reset().await;
    assert_eq!(
        drain(&mut events),
        vec![RoundEvent::RoundCancelled {
            player1: table.x,
            player2: Some(table.y),
        }]
    );
}

/// Same bet on both sides refunds both stakes
#[tokio::test]
async fn test_draw_refunds_both() {
    let table = Table::new();
    let salt_x = table.bet(table.x, Bet::Rock).await;
    let salt_y = table.bet(table.y, Bet::Rock).await;
    let mut events = table.coordinator.subscribe();

    table
        .coordinator
        .reveal_bet(table.y, Bet::Rock, salt_y)
        .await
        .unwrap();
    table
        .coordinator
        .reveal_bet(table.x, Bet::Rock, salt_x)
        .await
        .unwrap();

    assert_eq!(table.balance(&table.x), FUNDS);
    assert_eq!(table.balance(&table.y), FUNDS);
    table.assert_reset().await;
    assert_eq!(
        drain(&mut events).last(),
        Some(&RoundEvent::RoundResolved {
            winner: None,
            bet1: Bet::Rock,
            bet2: Bet::Rock,
        })
    );
}

#[tokio::test]
async fn test_reveal_must_match_commitment() {
    let table = Table::new();
    let salt_x = table.bet(table.x, Bet::Paper).await;
    table.bet(table.y, Bet::Rock).await;

    let other_salts = [Salt::random(), Salt::random(), Salt::from_bytes([0u8; 32])];
    for bet in Bet::ALL {
        for salt in &other_salts {
            let err = table
                .coordinator
                .reveal_bet(table.x, bet, salt.clone())
                .await
                .unwrap_err();
            assert!(matches!(err, RoundError::CheatingDetected));
        }
        if bet != Bet::Paper {
            let err = table
                .coordinator
                .reveal_bet(table.x, bet, salt_x.clone())
                .await
                .unwrap_err();
            assert!(matches!(err, RoundError::CheatingDetected));
        }
    }

    assert_eq!(table.coordinator.phase().await, RoundPhase::TwoBets);
    table
        .coordinator
        .reveal_bet(table.x, Bet::Paper, salt_x)
        .await
        .unwrap();
    assert_eq!(table.coordinator.phase().await, RoundPhase::OneReveal);
}

/// A round after a reset behaves like the first round on a fresh table
#[tokio::test]
async fn test_rounds_reuse_the_same_coordinator() {
    let table = Table::new();

    for (bet_x, bet_y) in [(Bet::Rock, Bet::Scissors), (Bet::Paper, Bet::Scissors)] {
        let salt_x = table.bet(table.x, bet_x).await;
        let salt_y = table.bet(table.y, bet_y).await;
        table
            .coordinator
            .reveal_bet(table.x, bet_x, salt_x)
            .await
            .unwrap();
        table
            .coordinator
            .reveal_bet(table.y, bet_y, salt_y)
            .await
            .unwrap();
        table.assert_reset().await;
    }

    // X won the first, Y the second
    assert_eq!(table.balance(&table.x), FUNDS);
    assert_eq!(table.balance(&table.y), FUNDS);

    // Player order of the next round is fresh: Y can now be player 1
    table.clock.advance(5);
    table.bet(table.y, Bet::Rock).await;
    let players = table.coordinator.players().await;
    assert_eq!(players.len(), 1);
    assert_eq!(players[0].address, table.y);
    assert_eq!(table.coordinator.last_activity_time().await, START + 5);
}

struct RejectingCustodian;

#[async_trait]
impl Custodian for RejectingCustodian {
    async fn transfer(&self, _transfer: &Transfer) -> Result<TransferId, CustodyError> {
        Err(CustodyError::TransferFailed("ledger offline".to_string()))
    }

    async fn transfer_batch(&self, _transfers: &[Transfer]) -> Result<Vec<TransferId>, CustodyError> {
        Err(CustodyError::TransferFailed("ledger offline".to_string()))
    }

    async fn balance_of(&self, _asset: &AssetId, _account: &Address) -> Result<u64, CustodyError> {
        Ok(0)
    }
}

#[tokio::test]
async fn test_custody_failure_leaves_no_trace() {
    let coordinator = RoundCoordinator::new(
        RoundConfig::new(AssetId::new("TOKEN"), STAKE, TIMEOUT).unwrap(),
        Address::derive("escrow"),
        Arc::new(RejectingCustodian),
        Arc::new(ManualClock::new(START)),
    );
    let mut events = coordinator.subscribe();

    let err = coordinator
        .place_bet(
            Address::derive("player-x"),
            Commitment::new(Bet::Rock, &Salt::random()),
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "custody");
    assert_eq!(coordinator.phase().await, RoundPhase::Empty);
    assert!(drain(&mut events).is_empty());
}

#[tokio::test]
async fn test_concurrent_bets_never_exceed_two_players() {
    let table = Arc::new(Table::new());
    let mut bettors = vec![table.x, table.y];
    for i in 0..6 {
        let extra = Address::derive(&format!("extra-{}", i));
        table.custodian.mint(&table.asset, extra, FUNDS).unwrap();
        bettors.push(extra);
    }

    let mut handles = Vec::new();
    for bettor in bettors.clone() {
        let table = table.clone();
        handles.push(tokio::spawn(async move {
            table
                .coordinator
                .place_bet(bettor, Commitment::new(Bet::Rock, &Salt::random()))
                .await
        }));
    }

    let mut accepted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(()) => accepted += 1,
            Err(err) => assert!(matches!(err, RoundError::BettingClosed)),
        }
    }

    assert_eq!(accepted, 2);
    table.assert_escrow_matches_round().await;
    let total: u64 = bettors.iter().map(|b| table.balance(b)).sum();
    assert_eq!(total + table.escrow(), FUNDS * bettors.len() as u64);
}
