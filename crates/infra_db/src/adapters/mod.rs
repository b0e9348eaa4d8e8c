//! Domain Adapters
//!
//! Adapter implementations of domain ports on top of the repositories.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use domain_ledger::{LedgerStore, TransferEngine};
//! use infra_db::adapters::PostgresLedgerStore;
//!
//! let store: Arc<dyn LedgerStore> = Arc::new(PostgresLedgerStore::new(pool));
//! let engine = TransferEngine::new(store);
//! ```

pub mod ledger;

pub use ledger::PostgresLedgerStore;
