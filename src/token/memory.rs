// In-memory stable token
//
// Reference implementation of the transfer port: a balance map behind a
// mutex. Used by the CLI (persisted through the store) and by tests.

use crate::identity::Address;
use crate::token::traits::{TransferError, TransferPort};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Snapshot of token balances for export/import
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBalances {
    token: Address,
    balances: BTreeMap<Address, u64>,
}

impl TokenBalances {
    /// Token address the balances belong to
    pub fn token(&self) -> &Address {
        &self.token
    }

    /// Balance of one account (0 if absent)
    pub fn balance_of(&self, account: &Address) -> u64 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Number of accounts holding a non-zero balance
    pub fn holder_count(&self) -> usize {
        self.balances.values().filter(|b| **b > 0).count()
    }
}

/// Stable token with balances held in memory
#[derive(Debug)]
pub struct InMemoryToken {
    token: Address,
    balances: Mutex<BTreeMap<Address, u64>>,
}

impl InMemoryToken {
    /// Create a token with no balances
    pub fn new(token: Address) -> Self {
        Self {
            token,
            balances: Mutex::new(BTreeMap::new()),
        }
    }

    /// Restore a token from exported balances
    pub fn from_balances(state: TokenBalances) -> Self {
        Self {
            token: state.token,
            balances: Mutex::new(state.balances),
        }
    }

    fn balances(&self) -> MutexGuard<'_, BTreeMap<Address, u64>> {
        self.balances.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Credit new tokens to an account
    pub fn mint(&self, account: &Address, amount: u64) -> Result<u64, TransferError> {
        if amount == 0 {
            return Err(TransferError::ZeroAmount);
        }

        let mut balances = self.balances();
        let supply = balances.values().try_fold(0u64, |acc, b| acc.checked_add(*b));
        supply
            .and_then(|s| s.checked_add(amount))
            .ok_or(TransferError::Overflow)?;

        let entry = balances.entry(*account).or_insert(0);
        *entry += amount;
        Ok(*entry)
    }

    /// Balance of one account (0 if it never held tokens)
    pub fn balance_of(&self, account: &Address) -> u64 {
        self.balances().get(account).copied().unwrap_or(0)
    }

    /// Sum of every balance
    pub fn total_supply(&self) -> u64 {
        self.balances().values().sum()
    }

    /// Export balances for persistence
    pub fn export_balances(&self) -> TokenBalances {
        TokenBalances {
            token: self.token,
            balances: self.balances().clone(),
        }
    }

    fn transfer(&self, from: &Address, to: &Address, amount: u64) -> Result<(), TransferError> {
        if amount == 0 {
            return Err(TransferError::ZeroAmount);
        }

        let mut balances = self.balances();
        let available = balances.get(from).copied().unwrap_or(0);
        if available < amount {
            return Err(TransferError::InsufficientBalance {
                available,
                required: amount,
            });
        }

        if from == to {
            return Ok(());
        }

        let credited = balances
            .get(to)
            .copied()
            .unwrap_or(0)
            .checked_add(amount)
            .ok_or(TransferError::Overflow)?;

        // Both checks passed; apply debit and credit together
        balances.insert(*from, available - amount);
        balances.insert(*to, credited);
        Ok(())
    }
}

impl TransferPort for InMemoryToken {
    fn token_address(&self) -> &Address {
        &self.token
    }

    fn transfer_in(&self, from: &Address, to: &Address, amount: u64) -> Result<(), TransferError> {
        self.transfer(from, to, amount)
    }

    fn transfer_out(&self, from: &Address, to: &Address, amount: u64) -> Result<(), TransferError> {
        self.transfer(from, to, amount)
    }
}
