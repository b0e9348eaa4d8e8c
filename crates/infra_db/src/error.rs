//! Database error types
//!
//! SQLx errors are classified by PostgreSQL SQLSTATE code so that the
//! adapter can hand the domain a precise `PortError`.

use thiserror::Error;

use core_kernel::PortError;

/// Errors that can occur during database operations
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to establish a database connection
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Entity not found in database
    #[error("Entity not found: {entity} with id '{id}'")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation (23505)
    #[error("Duplicate entry: {message}")]
    DuplicateEntry {
        constraint: Option<String>,
        message: String,
    },

    /// Foreign key constraint violation (23503)
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation {
        constraint: Option<String>,
        message: String,
    },

    /// Check constraint violation (23514)
    #[error("Check constraint violation: {message}")]
    CheckViolation {
        constraint: Option<String>,
        message: String,
    },

    /// Serialization failure (40001) or deadlock (40P01)
    #[error("Transaction conflict: {0}")]
    TransactionConflict(String),

    /// Migration error
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Pool exhaustion - no available connections
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Any other SQLx error
    #[error("SQL error: {0}")]
    SqlError(#[source] sqlx::Error),
}

impl DatabaseError {
    /// Creates a not found error for a specific entity type and identifier
    ///
    /// # Example
    ///
    /// ```rust
    /// use infra_db::DatabaseError;
    ///
    /// let error = DatabaseError::not_found("Account", 99);
    /// assert!(error.to_string().contains("Account"));
    /// assert!(error.is_not_found());
    /// ```
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        DatabaseError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DatabaseError::NotFound { .. })
    }

    /// Name of the violated constraint, when PostgreSQL reported one
    pub fn constraint(&self) -> Option<&str> {
        match self {
            DatabaseError::DuplicateEntry { constraint, .. }
            | DatabaseError::ForeignKeyViolation { constraint, .. }
            | DatabaseError::CheckViolation { constraint, .. } => constraint.as_deref(),
            _ => None,
        }
    }

    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            DatabaseError::DuplicateEntry { .. }
                | DatabaseError::ForeignKeyViolation { .. }
                | DatabaseError::CheckViolation { .. }
        )
    }

    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            DatabaseError::ConnectionFailed(_) | DatabaseError::PoolExhausted
        )
    }

    /// Classifies a PostgreSQL SQLSTATE code
    ///
    /// See <https://www.postgresql.org/docs/current/errcodes-appendix.html>
    fn from_sqlstate(code: &str, constraint: Option<String>, message: String) -> Self {
        match code {
            "23505" => DatabaseError::DuplicateEntry { constraint, message },
            "23503" => DatabaseError::ForeignKeyViolation { constraint, message },
            "23514" => DatabaseError::CheckViolation { constraint, message },
            "40001" | "40P01" => DatabaseError::TransactionConflict(message),
            _ => DatabaseError::QueryFailed(message),
        }
    }
}

impl From<sqlx::Error> for DatabaseError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::RowNotFound => DatabaseError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },
            sqlx::Error::PoolTimedOut => DatabaseError::PoolExhausted,
            sqlx::Error::Io(_) | sqlx::Error::Tls(_) | sqlx::Error::PoolClosed => {
                DatabaseError::ConnectionFailed(error.to_string())
            }
            sqlx::Error::Database(ref db_err) => match db_err.code() {
                Some(code) => DatabaseError::from_sqlstate(
                    code.as_ref(),
                    db_err.constraint().map(str::to_string),
                    db_err.message().to_string(),
                ),
                None => DatabaseError::QueryFailed(db_err.message().to_string()),
            },
            other => DatabaseError::SqlError(other),
        }
    }
}

impl From<DatabaseError> for PortError {
    fn from(error: DatabaseError) -> Self {
        match error {
            DatabaseError::NotFound { entity, id } => PortError::NotFound { entity_type: entity, id },
            DatabaseError::DuplicateEntry { constraint, message }
            | DatabaseError::ForeignKeyViolation { constraint, message }
            | DatabaseError::CheckViolation { constraint, message } => PortError::ConstraintViolation {
                constraint: constraint.unwrap_or_default(),
                message,
            },
            DatabaseError::TransactionConflict(message) => PortError::Conflict { message },
            DatabaseError::ConnectionFailed(_) | DatabaseError::PoolExhausted => PortError::Connection {
                message: error.to_string(),
                source: Some(Box::new(error)),
            },
            other => PortError::Internal {
                message: other.to_string(),
                source: Some(Box::new(other)),
            },
        }
    }
}
