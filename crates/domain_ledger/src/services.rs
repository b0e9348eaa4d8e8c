//! Ledger application service
//!
//! Groups the read-only queries over the store with the transfer engine, so
//! that outer layers depend on one object instead of wiring both.

use std::fmt;
use std::sync::Arc;

use tracing::instrument;

use core_kernel::{AccountId, PortError};

use crate::account::Account;
use crate::error::TransferError;
use crate::journal::JournalEntry;
use crate::ports::LedgerStore;
use crate::transfer::{TransferEngine, TransferReceipt};

/// Entry point for account queries and money transfers
#[derive(Clone)]
pub struct LedgerService {
    store: Arc<dyn LedgerStore>,
    engine: TransferEngine,
}

impl fmt::Debug for LedgerService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LedgerService")
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}

impl LedgerService {
    /// Creates a service over `store`
    ///
    /// # Arguments
    ///
    /// * `store` - The ledger store adapter
    /// * `journal_enabled` - Whether transfers append journal entries
    pub fn new(store: Arc<dyn LedgerStore>, journal_enabled: bool) -> Self {
        let engine = TransferEngine::new(Arc::clone(&store)).with_journal(journal_enabled);
        Self { store, engine }
    }

    pub fn engine(&self) -> &TransferEngine {
        &self.engine
    }

    pub fn store(&self) -> &Arc<dyn LedgerStore> {
        &self.store
    }

    /// Lists every account, ordered by id
    #[instrument(skip(self))]
    pub async fn all_accounts(&self) -> Result<Vec<Account>, PortError> {
        self.store.list_accounts().await
    }

    /// Reads one account
    pub async fn account(&self, id: AccountId) -> Result<Account, PortError> {
        self.store.get_account(id).await
    }

    /// Lists the audit journal, oldest first
    pub async fn journal(&self) -> Result<Vec<JournalEntry>, PortError> {
        self.store.list_journal_entries().await
    }

    /// Counts journal entries
    pub async fn journal_count(&self) -> Result<u64, PortError> {
        self.store.count_journal_entries().await
    }

    /// Transfers `amount` from `from` to `to`; see [`TransferEngine::transfer_money`]
    pub async fn transfer_money(
        &self,
        from: AccountId,
        to: AccountId,
        amount: i64,
    ) -> Result<TransferReceipt, TransferError> {
        self.engine.transfer_money(from, to, amount).await
    }
}
