//! PostgreSQL Ledger Adapter
//!
//! Implements the `LedgerStore` port with one database transaction per unit
//! of work. Account reads inside a unit take row locks (`FOR UPDATE`), and
//! dropping a unit without committing lets SQLx roll the transaction back.
//!
//! # Error Handling
//!
//! Database errors are translated to `PortError` variants:
//! - missing rows -> `PortError::NotFound`
//! - check, unique and foreign key violations -> `PortError::ConstraintViolation`
//!   carrying the constraint name
//! - serialization failures and deadlocks -> `PortError::Conflict`
//! - everything else -> `PortError::Connection` or `PortError::Internal`

use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, instrument};

use core_kernel::{
    AccountId, AdapterHealth, DomainPort, HealthCheckResult, HealthCheckable, PortError,
};
use domain_ledger::{Account, JournalEntry, LedgerStore, NewJournalEntry, UnitOfWork};

use crate::repositories::{AccountRepository, AccountRow, JournalRepository};

const ADAPTER_ID: &str = "postgres-ledger-store";

/// PostgreSQL-backed implementation of the `LedgerStore` port
#[derive(Debug, Clone)]
pub struct PostgresLedgerStore {
    pool: PgPool,
    accounts: AccountRepository,
    journal: JournalRepository,
}

impl PostgresLedgerStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            accounts: AccountRepository::new(pool.clone()),
            journal: JournalRepository::new(pool.clone()),
            pool,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl DomainPort for PostgresLedgerStore {}

#[async_trait]
impl HealthCheckable for PostgresLedgerStore {
    /// Runs `SELECT 1` against the pool
    async fn health_check(&self) -> HealthCheckResult {
        let start = Instant::now();
        let result = sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await;
        let latency_ms = start.elapsed().as_millis() as u64;

        let (status, message) = match result {
            Ok(_) => (AdapterHealth::Healthy, None),
            Err(e) => (AdapterHealth::Unhealthy, Some(format!("Database error: {}", e))),
        };

        HealthCheckResult {
            adapter_id: ADAPTER_ID.to_string(),
            status,
            latency_ms,
            message,
            checked_at: Utc::now(),
        }
    }
}

#[async_trait]
impl LedgerStore for PostgresLedgerStore {
    #[instrument(skip(self))]
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, PortError> {
        let tx = self.pool.begin().await.map_err(crate::DatabaseError::from)?;
        debug!("Database transaction opened");
        Ok(Box::new(PostgresUnitOfWork { tx }))
    }

    #[instrument(skip(self), fields(account_id = %id))]
    async fn get_account(&self, id: AccountId) -> Result<Account, PortError> {
        Ok(self.accounts.get_by_id(id.value()).await?.into())
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, PortError> {
        let rows = self.accounts.list().await?;
        Ok(rows.into_iter().map(Account::from).collect())
    }

    async fn list_journal_entries(&self) -> Result<Vec<JournalEntry>, PortError> {
        let rows = self.journal.list().await?;
        Ok(rows.into_iter().map(JournalEntry::from).collect())
    }

    async fn count_journal_entries(&self) -> Result<u64, PortError> {
        Ok(self.journal.count().await?)
    }
}

/// Unit of work backed by one PostgreSQL transaction
struct PostgresUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl UnitOfWork for PostgresUnitOfWork {
    #[instrument(skip(self), fields(account_id = %id))]
    async fn get_account(&mut self, id: AccountId) -> Result<Account, PortError> {
        let row = AccountRepository::lock_by_id(&mut self.tx, id.value()).await?;
        Ok(row.into())
    }

    async fn save_account(&mut self, account: &Account) -> Result<(), PortError> {
        let row = AccountRow {
            id: account.id.value(),
            balance: account.balance,
        };
        AccountRepository::upsert(&mut self.tx, &row).await?;
        Ok(())
    }

    async fn save_journal_entry(&mut self, entry: NewJournalEntry) -> Result<JournalEntry, PortError> {
        let row = JournalRepository::insert(&mut self.tx, &entry).await?;
        Ok(row.into())
    }

    async fn commit(self: Box<Self>) -> Result<(), PortError> {
        self.tx.commit().await.map_err(crate::DatabaseError::from)?;
        debug!("Database transaction committed");
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), PortError> {
        self.tx.rollback().await.map_err(crate::DatabaseError::from)?;
        debug!("Database transaction rolled back");
        Ok(())
    }
}
