//! Infrastructure Database Layer
//!
//! PostgreSQL implementation of the ledger store, built on SQLx.
//!
//! # Architecture
//!
//! Repositories hold the SQL and map rows; the adapter implements the
//! domain's `LedgerStore` port on top of them. A unit of work is one database
//! transaction: accounts are read with `SELECT ... FOR UPDATE`, so concurrent
//! transfers touching the same rows queue behind each other, and the schema's
//! `CHECK` constraints stay the final word on balances.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig, PostgresLedgerStore};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/ledger")).await?;
//! run_migrations(&pool).await?;
//! let store = PostgresLedgerStore::new(pool);
//! ```

pub mod pool;
pub mod error;
pub mod repositories;
pub mod adapters;

pub use pool::{DatabasePool, create_pool, create_pool_from_url, run_migrations, DatabaseConfig};
pub use error::DatabaseError;
pub use adapters::PostgresLedgerStore;
