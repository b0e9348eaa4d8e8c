//! Account repository implementation

use sqlx::{FromRow, PgConnection, PgPool};

use core_kernel::AccountId;
use domain_ledger::Account;

use crate::error::DatabaseError;

/// One row of the `accounts` table
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct AccountRow {
    pub id: i32,
    pub balance: i64,
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Account::new(AccountId::new(row.id), row.balance)
    }
}

/// Repository for the `accounts` table
#[derive(Debug, Clone)]
pub struct AccountRepository {
    pool: PgPool,
}

impl AccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Retrieves the committed state of one account
    pub async fn get_by_id(&self, id: i32) -> Result<AccountRow, DatabaseError> {
        sqlx::query_as::<_, AccountRow>("SELECT id, balance FROM accounts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Account", id))
    }

    /// Retrieves every account, ordered by id
    pub async fn list(&self) -> Result<Vec<AccountRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, AccountRow>("SELECT id, balance FROM accounts ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Reads an account and locks its row until the transaction ends
    pub async fn lock_by_id(conn: &mut PgConnection, id: i32) -> Result<AccountRow, DatabaseError> {
        sqlx::query_as::<_, AccountRow>("SELECT id, balance FROM accounts WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(conn)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Account", id))
    }

    /// Inserts the account or overwrites its balance
    ///
    /// The `accounts_balance_non_negative` check fires here, at statement time.
    pub async fn upsert(conn: &mut PgConnection, row: &AccountRow) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO accounts (id, balance) VALUES ($1, $2)
            ON CONFLICT (id) DO UPDATE SET balance = EXCLUDED.balance
            "#,
        )
        .bind(row.id)
        .bind(row.balance)
        .execute(conn)
        .await?;
        Ok(())
    }
}
