//! Immutable round configuration.

use crate::error::ConfigError;
use rps_custody::AssetId;
use serde::Serialize;

/// Fixed parameters of a coordinator, validated once at construction
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RoundConfig {
    asset: AssetId,
    betting_amount: u64,
    round_timeout_secs: u64,
}

impl RoundConfig {
    pub fn new(
        asset: AssetId,
        betting_amount: u64,
        round_timeout_secs: u64,
    ) -> Result<Self, ConfigError> {
        if asset.is_empty() {
            return Err(ConfigError::EmptyAsset);
        }
        if betting_amount == 0 {
            return Err(ConfigError::ZeroBettingAmount);
        }
        if round_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if betting_amount.checked_mul(2).is_none() {
            return Err(ConfigError::PayoutOverflow);
        }

        Ok(Self {
            asset,
            betting_amount,
            round_timeout_secs,
        })
    }

    /// Value unit being escrowed
    pub fn asset(&self) -> &AssetId {
        &self.asset
    }

    /// Stake each player puts in
    pub fn betting_amount(&self) -> u64 {
        self.betting_amount
    }

    pub fn round_timeout_secs(&self) -> u64 {
        self.round_timeout_secs
    }

    /// Whole pot of a two-player round
    pub fn pot(&self) -> u64 {
        // Checked in `new`
        self.betting_amount * 2
    }
}
