//! Ledger Domain Ports
//!
//! The transfer engine reaches storage only through these traits. Two
//! adapters exist: [`crate::memory::InMemoryLedgerStore`] in this crate and
//! `PostgresLedgerStore` in `infra_db`.
//!
//! # Unit of Work
//!
//! [`LedgerStore::begin`] hands out an owned [`UnitOfWork`]. Reads through
//! the unit see its own staged writes and hold whatever isolation the store
//! provides (a global lock in memory, row locks in PostgreSQL). Writes become
//! durable only on [`UnitOfWork::commit`]; [`UnitOfWork::rollback`], or simply
//! dropping the unit, discards all of them. A caller-imposed timeout that
//! drops the transfer future therefore rolls back like any other failure.
//!
//! ```rust,ignore
//! let mut unit = store.begin().await?;
//! let mut account = unit.get_account(id).await?;
//! account.credit(10);
//! unit.save_account(&account).await?;
//! unit.commit().await?;
//! ```

use async_trait::async_trait;

use core_kernel::{AccountId, DomainPort, HealthCheckable, PortError};

use crate::account::Account;
use crate::journal::{JournalEntry, NewJournalEntry};

/// Name of the store-enforced `balance >= 0` constraint
///
/// Stores report violations of this rule as
/// `PortError::ConstraintViolation` carrying this name.
pub const BALANCE_CONSTRAINT: &str = "accounts_balance_non_negative";

/// A transaction scope over the ledger
#[async_trait]
pub trait UnitOfWork: Send {
    /// Loads an account, locking it for the rest of the unit
    ///
    /// Returns `PortError::NotFound` if no account has that id.
    async fn get_account(&mut self, id: AccountId) -> Result<Account, PortError>;

    /// Stages an upsert of the account
    async fn save_account(&mut self, account: &Account) -> Result<(), PortError>;

    /// Stages a journal entry and returns it with its assigned id
    async fn save_journal_entry(&mut self, entry: NewJournalEntry) -> Result<JournalEntry, PortError>;

    /// Makes every staged write durable
    ///
    /// On error nothing from this unit is kept.
    async fn commit(self: Box<Self>) -> Result<(), PortError>;

    /// Discards every staged write
    async fn rollback(self: Box<Self>) -> Result<(), PortError>;
}

/// The ledger persistence port
#[async_trait]
pub trait LedgerStore: DomainPort + HealthCheckable {
    /// Opens a new unit of work
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, PortError>;

    /// Reads the committed state of one account
    async fn get_account(&self, id: AccountId) -> Result<Account, PortError>;

    /// Reads every committed account, ordered by id
    async fn list_accounts(&self) -> Result<Vec<Account>, PortError>;

    /// Reads every committed journal entry, ordered by id
    async fn list_journal_entries(&self) -> Result<Vec<JournalEntry>, PortError>;

    /// Counts committed journal entries
    async fn count_journal_entries(&self) -> Result<u64, PortError>;
}
