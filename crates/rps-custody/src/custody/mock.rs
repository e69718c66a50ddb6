//! Mock custodian for testing.

use super::traits::{Custodian, CustodyError, Transfer};
use crate::types::{Address, AssetId, TransferId};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type Ledger = HashMap<(AssetId, Address), u64>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-memory ledger implementing [`Custodian`]
#[derive(Clone, Default)]
pub struct MockCustodian {
    /// Map of (asset, account) -> balance
    ledger: Arc<Mutex<Ledger>>,
    /// Accounts that can neither send nor receive
    frozen: Arc<Mutex<HashSet<Address>>>,
    /// Every transfer that landed, in order
    history: Arc<Mutex<Vec<Transfer>>>,
}

impl MockCustodian {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit an account out of thin air, returning the new balance
    pub fn mint(
        &self,
        asset: &AssetId,
        account: Address,
        amount: u64,
    ) -> Result<u64, CustodyError> {
        let mut ledger = lock(&self.ledger);
        let balance = ledger.entry((asset.clone(), account)).or_insert(0);
        *balance = balance
            .checked_add(amount)
            .ok_or(CustodyError::AmountOverflow)?;
        Ok(*balance)
    }

    /// Get current balance
    pub fn balance(&self, asset: &AssetId, account: &Address) -> u64 {
        lock(&self.ledger)
            .get(&(asset.clone(), *account))
            .copied()
            .unwrap_or(0)
    }

    /// Make every transfer touching `account` fail
    pub fn freeze(&self, account: Address) {
        lock(&self.frozen).insert(account);
    }

    pub fn unfreeze(&self, account: &Address) {
        lock(&self.frozen).remove(account);
    }

    /// Get all transfers applied so far (for testing)
    pub fn history(&self) -> Vec<Transfer> {
        lock(&self.history).clone()
    }

    fn apply(&self, transfers: &[Transfer]) -> Result<Vec<TransferId>, CustodyError> {
        let frozen = lock(&self.frozen);
        let mut ledger = lock(&self.ledger);

        // Stage against a copy so a failing leg leaves the ledger untouched
        let mut staged = ledger.clone();
        for transfer in transfers {
            for account in [&transfer.from, &transfer.to] {
                if frozen.contains(account) {
                    return Err(CustodyError::AccountFrozen(*account));
                }
            }

            let from_key = (transfer.asset.clone(), transfer.from);
            let available = staged.get(&from_key).copied().unwrap_or(0);
            if available < transfer.amount {
                return Err(CustodyError::InsufficientFunds {
                    account: transfer.from,
                    needed: transfer.amount,
                    available,
                });
            }
            staged.insert(from_key, available - transfer.amount);

            let to_balance = staged
                .entry((transfer.asset.clone(), transfer.to))
                .or_insert(0);
            *to_balance = to_balance
                .checked_add(transfer.amount)
                .ok_or(CustodyError::AmountOverflow)?;
        }

        *ledger = staged;
        lock(&self.history).extend_from_slice(transfers);

        tracing::debug!("Mock custodian applied {} transfer(s)", transfers.len());
        Ok(transfers.iter().map(|_| TransferId::new()).collect())
    }
}

#[async_trait]
impl Custodian for MockCustodian {
    async fn transfer(&self, transfer: &Transfer) -> Result<TransferId, CustodyError> {
        let mut ids = self.apply(std::slice::from_ref(transfer))?;
        ids.pop()
            .ok_or_else(|| CustodyError::TransferFailed("no receipt produced".to_string()))
    }

    async fn transfer_batch(&self, transfers: &[Transfer]) -> Result<Vec<TransferId>, CustodyError> {
        self.apply(transfers)
    }

    async fn balance_of(&self, asset: &AssetId, account: &Address) -> Result<u64, CustodyError> {
        Ok(self.balance(asset, account))
    }
}
