//! Journal repository implementation
//!
//! The journal is append-only: rows are inserted inside a transfer's
//! transaction and never updated or deleted.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, PgPool};

use core_kernel::{AccountId, JournalEntryId};
use domain_ledger::{JournalEntry, NewJournalEntry};

use crate::error::DatabaseError;

/// One row of the `journal_entries` table
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct JournalRow {
    pub id: i64,
    pub amount: i64,
    pub from_id: i32,
    pub to_id: i32,
    pub time: DateTime<Utc>,
}

impl From<JournalRow> for JournalEntry {
    fn from(row: JournalRow) -> Self {
        JournalEntry {
            id: JournalEntryId::new(row.id),
            amount: row.amount,
            from: AccountId::new(row.from_id),
            to: AccountId::new(row.to_id),
            time: row.time,
        }
    }
}

/// Repository for the `journal_entries` table
#[derive(Debug, Clone)]
pub struct JournalRepository {
    pool: PgPool,
}

impl JournalRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Retrieves every entry, oldest first
    pub async fn list(&self) -> Result<Vec<JournalRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, JournalRow>(
            "SELECT id, amount, from_id, to_id, time FROM journal_entries ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn count(&self) -> Result<u64, DatabaseError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM journal_entries")
            .fetch_one(&self.pool)
            .await?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    /// Appends an entry and returns it with its generated id
    pub async fn insert(conn: &mut PgConnection, entry: &NewJournalEntry) -> Result<JournalRow, DatabaseError> {
        let row = sqlx::query_as::<_, JournalRow>(
            r#"
            INSERT INTO journal_entries (amount, from_id, to_id, time)
            VALUES ($1, $2, $3, $4)
            RETURNING id, amount, from_id, to_id, time
            "#,
        )
        .bind(entry.amount)
        .bind(entry.from.value())
        .bind(entry.to.value())
        .bind(entry.time)
        .fetch_one(conn)
        .await?;
        Ok(row)
    }
}
