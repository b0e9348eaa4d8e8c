//! Ports and Adapters Infrastructure
//!
//! This module provides the foundational types for the hexagonal
//! architecture used by the ledger: domain crates declare port traits,
//! infrastructure crates provide adapters.
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │        TransferEngine / LedgerService     │
//! └──────────────────────────────────────────┘
//!                      │
//!                      ▼
//! ┌──────────────────────────────────────────┐
//! │        LedgerStore + UnitOfWork ports     │
//! └──────────────────────────────────────────┘
//!            ▲                      ▲
//!   ┌────────┴────────┐    ┌────────┴────────┐
//!   │  In-memory store │    │  PostgreSQL     │
//!   └─────────────────┘    └─────────────────┘
//! ```
//!
//! Adapters translate their own error vocabulary (SQLSTATE codes, lock
//! failures) into [`PortError`] so that nothing storage-specific crosses the
//! port boundary.

use std::fmt;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for port operations
///
/// All port implementations report failures through this type, so the
/// domain layer handles an in-memory store and a database identically.
#[derive(Debug, Error)]
pub enum PortError {
    /// The requested entity was not found
    #[error("Not found: {entity_type} with id {id}")]
    NotFound {
        entity_type: String,
        id: String,
    },

    /// A validation error occurred
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    /// An integrity constraint enforced by the store was violated
    #[error("Constraint '{constraint}' violated: {message}")]
    ConstraintViolation {
        constraint: String,
        message: String,
    },

    /// The operation conflicts with a concurrent one (serialization failure, deadlock)
    #[error("Conflict: {message}")]
    Conflict {
        message: String,
    },

    /// Connection to the underlying system failed
    #[error("Connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An internal error occurred
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl PortError {
    /// Creates a NotFound error
    pub fn not_found(entity_type: impl Into<String>, id: impl fmt::Display) -> Self {
        PortError::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        PortError::Validation {
            message: message.into(),
            field: None,
        }
    }

    /// Creates a ConstraintViolation error
    pub fn constraint(constraint: impl Into<String>, message: impl Into<String>) -> Self {
        PortError::ConstraintViolation {
            constraint: constraint.into(),
            message: message.into(),
        }
    }

    /// Creates a Conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        PortError::Conflict {
            message: message.into(),
        }
    }

    /// Creates a Connection error
    pub fn connection(message: impl Into<String>) -> Self {
        PortError::Connection {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        PortError::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Returns true if this error indicates a transient failure that may succeed on retry
    pub fn is_transient(&self) -> bool {
        matches!(self, PortError::Connection { .. } | PortError::Conflict { .. })
    }

    /// Returns true if this error indicates the entity was not found
    pub fn is_not_found(&self) -> bool {
        matches!(self, PortError::NotFound { .. })
    }

    /// Returns the constraint name if this error is a constraint violation
    pub fn violated_constraint(&self) -> Option<&str> {
        match self {
            PortError::ConstraintViolation { constraint, .. } => Some(constraint),
            _ => None,
        }
    }
}

/// Marker trait for all domain ports
///
/// All port traits extend this marker so they can be shared across tasks.
pub trait DomainPort: Send + Sync + 'static {}

/// Health status for an adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterHealth {
    /// Adapter is healthy and operational
    Healthy,
    /// Adapter is degraded but operational
    Degraded,
    /// Adapter is unhealthy and not operational
    Unhealthy,
}

/// Health check result for an adapter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResult {
    /// Adapter identifier
    pub adapter_id: String,
    /// Current health status
    pub status: AdapterHealth,
    /// Latency of the health check in milliseconds
    pub latency_ms: u64,
    /// Optional message with additional details
    pub message: Option<String>,
    /// Timestamp of the health check
    pub checked_at: chrono::DateTime<chrono::Utc>,
}

impl HealthCheckResult {
    /// Builds a healthy result with no latency, for adapters without I/O
    pub fn healthy(adapter_id: impl Into<String>) -> Self {
        Self {
            adapter_id: adapter_id.into(),
            status: AdapterHealth::Healthy,
            latency_ms: 0,
            message: None,
            checked_at: chrono::Utc::now(),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == AdapterHealth::Healthy
    }
}

/// Trait for adapters that support health checks
#[async_trait::async_trait]
pub trait HealthCheckable: Send + Sync {
    /// Performs a health check on the adapter
    async fn health_check(&self) -> HealthCheckResult;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_error_not_found() {
        let error = PortError::not_found("Account", 99);
        assert!(error.is_not_found());
        assert!(!error.is_transient());
        assert!(error.to_string().contains("Account"));
        assert!(error.to_string().contains("99"));
    }

    #[test]
    fn test_port_error_constraint() {
        let error = PortError::constraint("accounts_balance_non_negative", "balance -1 < 0");
        assert_eq!(error.violated_constraint(), Some("accounts_balance_non_negative"));
        assert!(!error.is_not_found());
        assert!(PortError::internal("boom").violated_constraint().is_none());
    }

    #[test]
    fn test_port_error_transient() {
        assert!(PortError::conflict("deadlock detected").is_transient());
        assert!(PortError::connection("refused").is_transient());
        assert!(!PortError::validation("bad").is_transient());
    }

    #[test]
    fn test_healthy_result() {
        let result = HealthCheckResult::healthy("memory");
        assert!(result.is_healthy());
        assert_eq!(result.adapter_id, "memory");
    }
}
