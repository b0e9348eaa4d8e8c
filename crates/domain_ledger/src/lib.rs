//! Ledger Domain - Accounts, Journal and Atomic Transfers
//!
//! This crate holds the business rules of the ledger service: accounts with
//! non-negative integer balances, an append-only audit journal, and the
//! transfer engine that moves money between two accounts as a single unit of
//! work.
//!
//! # Consistency Model
//!
//! A transfer either commits every mutation (debit, credit, journal entry) or
//! none of them. Storage is reached only through the [`LedgerStore`] port:
//! the engine opens a [`UnitOfWork`], stages its writes there and commits or
//! rolls back on every exit path. The balance rule is checked twice: once by
//! the engine before committing, and once more by the store itself, which is
//! the authoritative guard when transfers race.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use domain_ledger::{Account, InMemoryLedgerStore, TransferEngine};
//! use core_kernel::AccountId;
//!
//! let store = Arc::new(InMemoryLedgerStore::with_accounts([
//!     Account::new(AccountId::new(0), 100),
//!     Account::new(AccountId::new(1), 50),
//! ]));
//! let engine = TransferEngine::new(store);
//! let receipt = engine.transfer_money(AccountId::new(0), AccountId::new(1), 10).await?;
//! assert_eq!(receipt.debtor.balance, 90);
//! ```

pub mod account;
pub mod journal;
pub mod error;
pub mod ports;
pub mod memory;
pub mod transfer;
pub mod services;

pub use account::Account;
pub use journal::{JournalEntry, NewJournalEntry};
pub use error::{AccountSide, TransferError, TransferErrorKind};
pub use ports::{LedgerStore, UnitOfWork, BALANCE_CONSTRAINT};
pub use memory::InMemoryLedgerStore;
pub use transfer::{TransferEngine, TransferReceipt, TransferRequest, TransferStage};
pub use services::LedgerService;
