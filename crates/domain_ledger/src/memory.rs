//! In-memory ledger store
//!
//! Keeps accounts and journal entries behind a single `tokio` mutex. A unit
//! of work owns the lock from `begin` until it is committed, rolled back or
//! dropped, so units are fully serialized. Writes are staged inside the unit
//! and copied into the shared state only on commit, after the same integrity
//! checks the database schema enforces.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

use core_kernel::{
    AccountId, DomainPort, HealthCheckResult, HealthCheckable, JournalEntryId, PortError,
};

use crate::account::Account;
use crate::journal::{JournalEntry, NewJournalEntry};
use crate::ports::{LedgerStore, UnitOfWork, BALANCE_CONSTRAINT};

const JOURNAL_AMOUNT_CONSTRAINT: &str = "journal_entries_amount_positive";
const JOURNAL_FROM_CONSTRAINT: &str = "journal_entries_from_id_fkey";
const JOURNAL_TO_CONSTRAINT: &str = "journal_entries_to_id_fkey";

#[derive(Debug, Default)]
struct LedgerState {
    accounts: BTreeMap<AccountId, Account>,
    journal: Vec<JournalEntry>,
    last_journal_id: i64,
}

/// Ledger store held entirely in process memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedgerStore {
    state: Arc<Mutex<LedgerState>>,
}

impl InMemoryLedgerStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with the given accounts
    pub fn with_accounts(accounts: impl IntoIterator<Item = Account>) -> Self {
        let state = LedgerState {
            accounts: accounts.into_iter().map(|a| (a.id, a)).collect(),
            ..Default::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Inserts or replaces an account outside of any transfer
    ///
    /// Intended for seeding; waits for any open unit of work to finish.
    pub async fn insert_account(&self, account: Account) {
        self.state.lock().await.accounts.insert(account.id, account);
    }
}

impl DomainPort for InMemoryLedgerStore {}

#[async_trait]
impl HealthCheckable for InMemoryLedgerStore {
    async fn health_check(&self) -> HealthCheckResult {
        HealthCheckResult::healthy("memory-ledger-store")
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, PortError> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        debug!("In-memory unit of work opened");
        Ok(Box::new(InMemoryUnitOfWork {
            state: guard,
            staged_accounts: BTreeMap::new(),
            staged_journal: Vec::new(),
        }))
    }

    async fn get_account(&self, id: AccountId) -> Result<Account, PortError> {
        self.state
            .lock()
            .await
            .accounts
            .get(&id)
            .cloned()
            .ok_or_else(|| PortError::not_found("Account", id))
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, PortError> {
        Ok(self.state.lock().await.accounts.values().cloned().collect())
    }

    async fn list_journal_entries(&self) -> Result<Vec<JournalEntry>, PortError> {
        Ok(self.state.lock().await.journal.clone())
    }

    async fn count_journal_entries(&self) -> Result<u64, PortError> {
        Ok(self.state.lock().await.journal.len() as u64)
    }
}

/// Unit of work over [`InMemoryLedgerStore`]
struct InMemoryUnitOfWork {
    state: OwnedMutexGuard<LedgerState>,
    staged_accounts: BTreeMap<AccountId, Account>,
    staged_journal: Vec<JournalEntry>,
}

impl InMemoryUnitOfWork {
    fn account_exists(&self, id: AccountId) -> bool {
        self.staged_accounts.contains_key(&id) || self.state.accounts.contains_key(&id)
    }

    /// Enforces the rules the database schema would reject at write time
    fn check_constraints(&self) -> Result<(), PortError> {
        if let Some(account) = self.staged_accounts.values().find(|a| a.is_overdrawn()) {
            return Err(PortError::constraint(
                BALANCE_CONSTRAINT,
                format!("balance of account {} would be {}", account.id, account.balance),
            ));
        }

        for entry in &self.staged_journal {
            if entry.amount <= 0 {
                return Err(PortError::constraint(
                    JOURNAL_AMOUNT_CONSTRAINT,
                    format!("journal amount {} is not positive", entry.amount),
                ));
            }
            if !self.account_exists(entry.from) {
                return Err(PortError::constraint(
                    JOURNAL_FROM_CONSTRAINT,
                    format!("account {} does not exist", entry.from),
                ));
            }
            if !self.account_exists(entry.to) {
                return Err(PortError::constraint(
                    JOURNAL_TO_CONSTRAINT,
                    format!("account {} does not exist", entry.to),
                ));
            }
        }

        Ok(())
    }
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    async fn get_account(&mut self, id: AccountId) -> Result<Account, PortError> {
        self.staged_accounts
            .get(&id)
            .or_else(|| self.state.accounts.get(&id))
            .cloned()
            .ok_or_else(|| PortError::not_found("Account", id))
    }

    async fn save_account(&mut self, account: &Account) -> Result<(), PortError> {
        self.staged_accounts.insert(account.id, account.clone());
        Ok(())
    }

    async fn save_journal_entry(&mut self, entry: NewJournalEntry) -> Result<JournalEntry, PortError> {
        let id = self.state.last_journal_id + self.staged_journal.len() as i64 + 1;
        let entry = entry.into_entry(JournalEntryId::new(id));
        self.staged_journal.push(entry.clone());
        Ok(entry)
    }

    async fn commit(self: Box<Self>) -> Result<(), PortError> {
        self.check_constraints()?;

        let InMemoryUnitOfWork {
            mut state,
            staged_accounts,
            staged_journal,
        } = *self;

        let account_writes = staged_accounts.len();
        let journal_writes = staged_journal.len();
        state.accounts.extend(staged_accounts);
        if let Some(last) = staged_journal.last() {
            state.last_journal_id = last.id.value();
        }
        state.journal.extend(staged_journal);

        debug!(account_writes, journal_writes, "In-memory unit of work committed");
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), PortError> {
        debug!(
            discarded_accounts = self.staged_accounts.len(),
            discarded_journal = self.staged_journal.len(),
            "In-memory unit of work rolled back"
        );
        Ok(())
    }
}
