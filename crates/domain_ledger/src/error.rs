//! Transfer errors
//!
//! Every rejected transfer is reported as a [`TransferError`] naming both
//! parties and carrying a [`TransferErrorKind`]. Store failures are translated
//! into this vocabulary; their raw text survives only as an optional
//! diagnostic, kept apart from the user-facing reason.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use core_kernel::AccountId;

/// Which party of a transfer an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountSide {
    /// The account being debited
    Debtor,
    /// The account being credited
    Creditor,
}

impl fmt::Display for AccountSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountSide::Debtor => write!(f, "debtor"),
            AccountSide::Creditor => write!(f, "creditor"),
        }
    }
}

/// Reason a transfer was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferErrorKind {
    /// Amount was zero or negative
    #[error("transfer amount must be positive, got {amount}")]
    InvalidAmount { amount: i64 },

    /// Debtor and creditor are the same account
    #[error("debtor and creditor must be different accounts")]
    SameAccount,

    /// One side of the transfer does not exist
    #[error("unknown {side} account {id}")]
    UnknownAccount { side: AccountSide, id: AccountId },

    /// The debit would leave a negative balance
    #[error("{reason}")]
    InsufficientFunds {
        reason: String,
        diagnostic: Option<String>,
    },

    /// Any other store failure while the transfer was in flight
    #[error("{reason}")]
    TransferFailed {
        reason: String,
        diagnostic: Option<String>,
    },
}

impl TransferErrorKind {
    /// Stable machine-readable code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            TransferErrorKind::InvalidAmount { .. } => "invalid_amount",
            TransferErrorKind::SameAccount => "same_account",
            TransferErrorKind::UnknownAccount { .. } => "unknown_account",
            TransferErrorKind::InsufficientFunds { .. } => "insufficient_funds",
            TransferErrorKind::TransferFailed { .. } => "transfer_failed",
        }
    }
}

/// A rejected transfer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("transfer from account {debtor} to account {creditor} rejected: {kind}")]
pub struct TransferError {
    /// Account that would have been debited
    pub debtor: AccountId,
    /// Account that would have been credited
    pub creditor: AccountId,
    /// What went wrong
    pub kind: TransferErrorKind,
}

impl TransferError {
    pub fn new(debtor: AccountId, creditor: AccountId, kind: TransferErrorKind) -> Self {
        Self { debtor, creditor, kind }
    }

    pub fn invalid_amount(debtor: AccountId, creditor: AccountId, amount: i64) -> Self {
        Self::new(debtor, creditor, TransferErrorKind::InvalidAmount { amount })
    }

    pub fn same_account(account: AccountId) -> Self {
        Self::new(account, account, TransferErrorKind::SameAccount)
    }

    pub fn unknown_account(debtor: AccountId, creditor: AccountId, side: AccountSide) -> Self {
        let id = match side {
            AccountSide::Debtor => debtor,
            AccountSide::Creditor => creditor,
        };
        Self::new(debtor, creditor, TransferErrorKind::UnknownAccount { side, id })
    }

    pub fn insufficient_funds(
        debtor: AccountId,
        creditor: AccountId,
        reason: impl Into<String>,
        diagnostic: Option<String>,
    ) -> Self {
        Self::new(
            debtor,
            creditor,
            TransferErrorKind::InsufficientFunds {
                reason: reason.into(),
                diagnostic,
            },
        )
    }

    pub fn transfer_failed(
        debtor: AccountId,
        creditor: AccountId,
        reason: impl Into<String>,
        diagnostic: Option<String>,
    ) -> Self {
        Self::new(
            debtor,
            creditor,
            TransferErrorKind::TransferFailed {
                reason: reason.into(),
                diagnostic,
            },
        )
    }

    /// Human-readable reason, without the store diagnostic
    pub fn reason(&self) -> String {
        self.kind.to_string()
    }

    /// Raw diagnostic from the store, when the failure came from there
    pub fn diagnostic(&self) -> Option<&str> {
        match &self.kind {
            TransferErrorKind::InsufficientFunds { diagnostic, .. }
            | TransferErrorKind::TransferFailed { diagnostic, .. } => diagnostic.as_deref(),
            _ => None,
        }
    }

    /// The side that was not found, for `UnknownAccount` errors
    pub fn unknown_side(&self) -> Option<AccountSide> {
        match self.kind {
            TransferErrorKind::UnknownAccount { side, .. } => Some(side),
            _ => None,
        }
    }

    pub fn is_insufficient_funds(&self) -> bool {
        matches!(self.kind, TransferErrorKind::InsufficientFunds { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_both_parties() {
        let error = TransferError::invalid_amount(AccountId::new(0), AccountId::new(1), -1);
        let display = error.to_string();
        assert!(display.contains("account 0"));
        assert!(display.contains("account 1"));
        assert!(display.contains("-1"));
    }

    #[test]
    fn test_unknown_account_picks_side_id() {
        let error = TransferError::unknown_account(AccountId::new(0), AccountId::new(99), AccountSide::Creditor);
        assert_eq!(error.unknown_side(), Some(AccountSide::Creditor));
        assert_eq!(error.reason(), "unknown creditor account 99");
    }

    #[test]
    fn test_diagnostic_kept_apart_from_reason() {
        let error = TransferError::insufficient_funds(
            AccountId::new(0),
            AccountId::new(1),
            "insufficient funds",
            Some("check constraint violated".to_string()),
        );
        assert_eq!(error.reason(), "insufficient funds");
        assert_eq!(error.diagnostic(), Some("check constraint violated"));
        assert!(error.is_insufficient_funds());
        assert_eq!(error.kind.code(), "insufficient_funds");
    }
}
