//! Round coordinator: the commit-reveal state machine over escrowed bets.
//!
//! Each public operation holds the round lock for its whole duration,
//! including custodian calls, so operations never interleave. A failed
//! operation restores the round it started from and publishes nothing.

use super::state::Round;
use crate::bet::{judge, Bet, GameResult};
use crate::clock::Clock;
use crate::config::RoundConfig;
use crate::crypto::{Commitment, Salt};
use crate::error::{Result, RoundError};
use crate::protocol::{EventSink, Player, Reveal, RoundEvent, RoundPhase, RoundSnapshot};
use rps_custody::{Address, AssetId, Custodian, Transfer};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

/// Buffered events per subscriber before the slowest one starts lagging
const EVENT_CAPACITY: usize = 256;

pub struct RoundCoordinator {
    config: RoundConfig,
    /// Custodian account holding the escrowed bets
    escrow: Address,
    custodian: Arc<dyn Custodian>,
    clock: Arc<dyn Clock>,
    round: Mutex<Round>,
    events: broadcast::Sender<RoundEvent>,
    sinks: Vec<Arc<dyn EventSink>>,
}

impl RoundCoordinator {
    pub fn new(
        config: RoundConfig,
        escrow: Address,
        custodian: Arc<dyn Custodian>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            config,
            escrow,
            custodian,
            clock,
            round: Mutex::new(Round::default()),
            events,
            sinks: Vec::new(),
        }
    }

    /// Attach a sink that records every committed event without lag
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Register a sealed bet and pull the stake into escrow
    pub async fn place_bet(&self, caller: Address, commitment: Commitment) -> Result<()> {
        let mut round = self.round.lock().await;

        if round.is_full() {
            return Err(reject("place_bet", &caller, RoundError::BettingClosed));
        }
        if round.position_of(&caller).is_some() {
            return Err(reject("place_bet", &caller, RoundError::Duplicate));
        }
        // A stake paid from escrow to itself would never reach the pot
        if caller == self.escrow {
            return Err(reject("place_bet", &caller, RoundError::NotAPlayer));
        }

        let stake = Transfer::new(
            self.config.asset().clone(),
            caller,
            self.escrow,
            self.config.betting_amount(),
        );
        debug!("Collecting stake of {} from {}", stake.amount, caller);
        if let Err(err) = self.custodian.transfer(&stake).await {
            return Err(reject("place_bet", &caller, err.into()));
        }

        round.players.push(Player {
            address: caller,
            commitment,
        });
        round.last_activity = Some(self.clock.now());

        info!(
            "Player {} placed bet {} ({} of 2)",
            caller,
            commitment,
            round.players.len()
        );

        self.publish(vec![RoundEvent::BetPlaced {
            player: caller,
            commitment,
        }]);
        Ok(())
    }

    /// Open the caller's commitment; the second reveal settles the round
    pub async fn reveal_bet(&self, caller: Address, bet: Bet, salt: Salt) -> Result<()> {
        let mut round = self.round.lock().await;

        if !round.is_full() {
            return Err(reject("reveal_bet", &caller, RoundError::AwaitingBets));
        }
        if round.has_revealed(&caller) {
            return Err(reject("reveal_bet", &caller, RoundError::Duplicate));
        }
        let index = match round.position_of(&caller) {
            Some(index) => index,
            None => return Err(reject("reveal_bet", &caller, RoundError::NotAPlayer)),
        };
        if !round.players[index].commitment.verify(bet, &salt) {
            return Err(reject("reveal_bet", &caller, RoundError::CheatingDetected));
        }

        let mut events = vec![RoundEvent::BetRevealed {
            player: caller,
            bet,
            salt,
        }];

        let first = match round.revealed.clone() {
            None => {
                round.revealed = Some(Reveal {
                    player: caller,
                    bet,
                });
                round.last_activity = Some(self.clock.now());
                info!("Player {} revealed first, waiting for opponent", caller);
                self.publish(events);
                return Ok(());
            }
            Some(first) => first,
        };

        // Bets in registration order, not reveal order
        let (bet1, bet2) = if index == 0 {
            (bet, first.bet)
        } else {
            (first.bet, bet)
        };
        let result = judge(bet1, bet2);
        let players = [round.players[0].address, round.players[1].address];

        // Wipe before paying out so no transfer sees this round's state
        let previous = round.take();
        let payouts = self.payouts(result, players);

        debug!("Settling round with {} payout(s)", payouts.len());
        if let Err(err) = self.custodian.transfer_batch(&payouts).await {
            *round = previous;
            return Err(reject("reveal_bet", &caller, err.into()));
        }

        let winner = match result {
            GameResult::AWins => Some(players[0]),
            GameResult::BWins => Some(players[1]),
            GameResult::Draw => None,
        };
        match winner {
            Some(winner) => info!(
                "Round resolved: {} vs {}, {} wins {}",
                bet1,
                bet2,
                winner,
                self.config.pot()
            ),
            None => info!("Round resolved: {} vs {}, draw, stakes refunded", bet1, bet2),
        }

        events.push(RoundEvent::RoundResolved { winner, bet1, bet2 });
        self.publish(events);
        Ok(())
    }

    /// Recover escrow from an unresponsive opponent once the round timed out
    pub async fn withdraw(&self, caller: Address) -> Result<()> {
        let mut round = self.round.lock().await;
        let now = self.clock.now();

        let timed_out = round
            .last_activity
            .map_or(false, |last| now >= last.saturating_add(self.config.round_timeout_secs()));
        if !timed_out {
            return Err(reject("withdraw", &caller, RoundError::TooEarly));
        }
        if round.position_of(&caller).is_none() {
            return Err(reject("withdraw", &caller, RoundError::NotAPlayer));
        }

        let (amount, event) = if round.is_full() {
            // Only a player who proved their commitment may take the pot
            if !round.has_revealed(&caller) {
                return Err(reject("withdraw", &caller, RoundError::CheatingDetected));
            }
            (
                self.config.pot(),
                RoundEvent::RoundCancelled {
                    player1: round.players[0].address,
                    player2: Some(round.players[1].address),
                },
            )
        } else {
            (
                self.config.betting_amount(),
                RoundEvent::RoundCancelled {
                    player1: caller,
                    player2: None,
                },
            )
        };

        let previous = round.take();
        let refund = Transfer::new(self.config.asset().clone(), self.escrow, caller, amount);
        if let Err(err) = self.custodian.transfer(&refund).await {
            *round = previous;
            return Err(reject("withdraw", &caller, err.into()));
        }

        info!("Round cancelled by timeout, {} withdrew {}", caller, amount);
        self.publish(vec![event]);
        Ok(())
    }

    fn payouts(&self, result: GameResult, players: [Address; 2]) -> Vec<Transfer> {
        let asset = self.config.asset();
        match result {
            GameResult::Draw => players
                .iter()
                .map(|player| {
                    Transfer::new(
                        asset.clone(),
                        self.escrow,
                        *player,
                        self.config.betting_amount(),
                    )
                })
                .collect(),
            GameResult::AWins => vec![Transfer::new(
                asset.clone(),
                self.escrow,
                players[0],
                self.config.pot(),
            )],
            GameResult::BWins => vec![Transfer::new(
                asset.clone(),
                self.escrow,
                players[1],
                self.config.pot(),
            )],
        }
    }

    fn publish(&self, events: Vec<RoundEvent>) {
        for event in events {
            for sink in &self.sinks {
                sink.record(&event);
            }
            // No subscribers is fine
            let _ = self.events.send(event);
        }
    }

    // Accessors

    /// Stream of events from successful operations
    pub fn subscribe(&self) -> broadcast::Receiver<RoundEvent> {
        self.events.subscribe()
    }

    pub fn config(&self) -> &RoundConfig {
        &self.config
    }

    pub fn asset(&self) -> &AssetId {
        self.config.asset()
    }

    pub fn betting_amount(&self) -> u64 {
        self.config.betting_amount()
    }

    pub fn round_timeout(&self) -> u64 {
        self.config.round_timeout_secs()
    }

    pub fn escrow_account(&self) -> Address {
        self.escrow
    }

    pub async fn players(&self) -> Vec<Player> {
        self.round.lock().await.players.clone()
    }

    pub async fn revealed(&self) -> Option<Reveal> {
        self.round.lock().await.revealed.clone()
    }

    /// Timestamp of the last bet or first reveal; 0 when no round is active
    pub async fn last_activity_time(&self) -> u64 {
        self.round.lock().await.last_activity.unwrap_or(0)
    }

    pub async fn phase(&self) -> RoundPhase {
        self.round.lock().await.phase()
    }

    /// What the escrow account holds for the current round
    pub async fn escrowed(&self) -> u64 {
        let players = self.round.lock().await.players.len() as u64;
        self.config.betting_amount() * players
    }

    pub async fn snapshot(&self) -> RoundSnapshot {
        let round = self.round.lock().await;
        RoundSnapshot {
            phase: round.phase(),
            players: round.players.clone(),
            revealed: round.revealed.clone(),
            last_activity_time: round.last_activity.unwrap_or(0),
            escrowed: self.config.betting_amount() * round.players.len() as u64,
        }
    }
}

fn reject(operation: &str, caller: &Address, err: RoundError) -> RoundError {
    match &err {
        RoundError::CheatingDetected => {
            warn!("{} rejected for {}: {}", operation, caller, err)
        }
        _ => debug!("{} rejected for {}: {}", operation, caller, err),
    }
    err
}
