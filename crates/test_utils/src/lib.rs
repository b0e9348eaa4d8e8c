//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! ledger test suite.
//!
//! # Modules
//!
//! - `fixtures`: The standard two-account ledger and well-known ids
//! - `database`: PostgreSQL container management for integration tests
//! - `assertions`: Ledger-level assertion helpers
//! - `generators`: Property-based test data generators
//! - `faults`: A store wrapper that injects failures on demand

pub mod fixtures;
pub mod database;
pub mod assertions;
pub mod generators;
pub mod faults;

pub use fixtures::*;
pub use database::*;
pub use assertions::*;
pub use generators::*;
pub use faults::*;
