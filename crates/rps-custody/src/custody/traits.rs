//! Custodian trait definition.

use crate::types::{Address, AssetId, TransferId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from custodian operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CustodyError {
    #[error("Insufficient funds in {account}: need {needed}, have {available}")]
    InsufficientFunds {
        account: Address,
        needed: u64,
        available: u64,
    },

    #[error("Account frozen: {0}")]
    AccountFrozen(Address),

    #[error("Amount overflow")]
    AmountOverflow,

    #[error("Transfer failed: {0}")]
    TransferFailed(String),
}

/// A single movement of value between two accounts
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub asset: AssetId,
    pub from: Address,
    pub to: Address,
    pub amount: u64,
}

impl Transfer {
    pub fn new(asset: AssetId, from: Address, to: Address, amount: u64) -> Self {
        Self {
            asset,
            from,
            to,
            amount,
        }
    }
}

/// Trait for the value custodian holding escrowed bets
///
/// Every call is all-or-nothing: on `Err` no balance has moved.
/// Implementations can be:
/// - MockCustodian for testing and the demo node
/// - A ledger or token-contract adapter in production
#[async_trait]
pub trait Custodian: Send + Sync {
    /// Move `amount` of `asset` from one account to another
    async fn transfer(&self, transfer: &Transfer) -> Result<TransferId, CustodyError>;

    /// Apply several transfers as one unit; either all land or none do
    async fn transfer_batch(&self, transfers: &[Transfer]) -> Result<Vec<TransferId>, CustodyError>;

    /// Current balance of an account
    async fn balance_of(&self, asset: &AssetId, account: &Address) -> Result<u64, CustodyError>;
}
