//! Core Kernel - Foundational types shared by every ledger crate
//!
//! This crate provides the building blocks used across the workspace:
//! - Integer-backed identifiers for accounts and journal entries
//! - The port error vocabulary and health-check contract for adapters
//! - The kernel error type

pub mod identifiers;
pub mod ports;
pub mod error;

pub use identifiers::{AccountId, JournalEntryId};
pub use ports::{PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth};
pub use error::CoreError;
