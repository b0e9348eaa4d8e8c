//! Bank accounts
//!
//! An account is an id and an integer balance. Accounts are created out of
//! band (seed data or migrations) and only the transfer engine mutates them,
//! always on a copy owned by the current unit of work.

use serde::{Deserialize, Serialize};

use core_kernel::{AccountId, CoreError};

/// A bank account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier, immutable after creation
    pub id: AccountId,
    /// Current balance, never negative once committed
    pub balance: i64,
}

impl Account {
    /// Creates an account snapshot without validation
    ///
    /// Used by stores when rehydrating rows they already constrain.
    pub fn new(id: AccountId, balance: i64) -> Self {
        Self { id, balance }
    }

    /// Opens an account with an initial balance
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` if the opening balance is negative
    pub fn open(id: AccountId, balance: i64) -> Result<Self, CoreError> {
        if balance < 0 {
            return Err(CoreError::validation(format!(
                "account {} cannot be opened with negative balance {}",
                id, balance
            )));
        }
        Ok(Self { id, balance })
    }

    /// Withdraws `amount` from the balance
    ///
    /// The balance may go negative here; callers check [`Account::is_overdrawn`]
    /// before anything is persisted.
    pub fn debit(&mut self, amount: i64) {
        self.balance = self.balance.saturating_sub(amount);
    }

    /// Deposits `amount`, returning `false` if the balance would overflow
    pub fn credit(&mut self, amount: i64) -> bool {
        match self.balance.checked_add(amount) {
            Some(balance) => {
                self.balance = balance;
                true
            }
            None => false,
        }
    }

    /// Returns true if the balance breaks the non-negative rule
    pub fn is_overdrawn(&self) -> bool {
        self.balance < 0
    }
}
