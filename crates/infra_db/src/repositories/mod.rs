//! Repository implementations for ledger tables
//!
//! Repositories encapsulate the SQL and map between rows and domain types.
//! Reads outside a transfer go through the pool; everything inside a unit of
//! work takes the transaction's connection explicitly.
//!
//! Queries use the runtime-checked `sqlx::query_as` API with `FromRow` rows,
//! so the crate builds without a live database.

pub mod account;
pub mod journal;

pub use account::{AccountRepository, AccountRow};
pub use journal::{JournalRepository, JournalRow};
