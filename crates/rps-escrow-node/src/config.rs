//! Node configuration from environment variables.

use rps_custody::{Address, AssetId};
use rps_escrow_core::{ConfigError, RoundConfig};
use std::str::FromStr;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_ASSET: &str = "TOKEN";
pub const DEFAULT_BETTING_AMOUNT: u64 = 1000;
pub const DEFAULT_ROUND_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_JOURNAL_CAPACITY: usize = 10_000;

#[derive(Clone, Debug)]
pub struct NodeConfig {
    pub port: u16,
    pub round: RoundConfig,
    /// Custodian account holding the stakes
    pub escrow_account: Address,
    /// Most recent events kept for `/api/events`
    pub journal_capacity: usize,
}

impl NodeConfig {
    /// Read `PORT`, `RPS_ASSET`, `RPS_BETTING_AMOUNT`, `RPS_ROUND_TIMEOUT_SECS`,
    /// `RPS_ESCROW_ACCOUNT` and `RPS_JOURNAL_CAPACITY` from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = parse_var(&lookup, "PORT", DEFAULT_PORT)?;
        let asset = AssetId::new(lookup("RPS_ASSET").unwrap_or_else(|| DEFAULT_ASSET.to_string()));
        let betting_amount = parse_var(&lookup, "RPS_BETTING_AMOUNT", DEFAULT_BETTING_AMOUNT)?;
        let round_timeout_secs =
            parse_var(&lookup, "RPS_ROUND_TIMEOUT_SECS", DEFAULT_ROUND_TIMEOUT_SECS)?;

        let escrow_account = match lookup("RPS_ESCROW_ACCOUNT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "RPS_ESCROW_ACCOUNT".to_string(),
                value: raw,
            })?,
            None => Address::derive(&format!("rps-escrow/{}", asset)),
        };

        let journal_capacity =
            parse_var(&lookup, "RPS_JOURNAL_CAPACITY", DEFAULT_JOURNAL_CAPACITY)?;
        if journal_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                key: "RPS_JOURNAL_CAPACITY".to_string(),
                value: "0".to_string(),
            });
        }

        let round = RoundConfig::new(asset, betting_amount, round_timeout_secs)?;

        Ok(Self {
            port,
            round,
            escrow_account,
            journal_capacity,
        })
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw,
        }),
        None => Ok(default),
    }
}
