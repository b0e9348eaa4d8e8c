//! Audit journal
//!
//! One immutable entry is written per committed transfer, inside the same
//! unit of work as the balance mutation. Entries reference accounts by id
//! only; the journal records history and never touches the accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{AccountId, JournalEntryId};

/// A journal entry as stored, with its store-assigned id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Store-assigned, strictly increasing identifier
    pub id: JournalEntryId,
    /// Transferred amount, always positive
    pub amount: i64,
    /// Debtor account
    pub from: AccountId,
    /// Creditor account
    pub to: AccountId,
    /// Creation time
    pub time: DateTime<Utc>,
}

/// A journal entry staged for insertion, before the store assigns its id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewJournalEntry {
    pub amount: i64,
    pub from: AccountId,
    pub to: AccountId,
    pub time: DateTime<Utc>,
}

impl NewJournalEntry {
    /// Records a transfer of `amount` from `from` to `to`, stamped now
    pub fn record(amount: i64, from: AccountId, to: AccountId) -> Self {
        Self {
            amount,
            from,
            to,
            time: Utc::now(),
        }
    }

    /// Attaches the id assigned by the store
    pub fn into_entry(self, id: JournalEntryId) -> JournalEntry {
        JournalEntry {
            id,
            amount: self.amount,
            from: self.from,
            to: self.to,
            time: self.time,
        }
    }
}
