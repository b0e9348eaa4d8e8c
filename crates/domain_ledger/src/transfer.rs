//! Transfer engine
//!
//! Moves a positive amount from a debtor account to a creditor account as
//! one unit of work. Each call runs a small state machine:
//!
//! ```text
//! Start → Validating → Loading → Mutating → Committing → Committed
//!             │            │          │           │
//!             └────────────┴──────────┴───────────┴──→ RolledBack
//! ```
//!
//! Validation of the request itself (amount, self-transfer) happens before
//! any store access. Everything after that runs inside the unit of work,
//! and any error rolls it back before being returned.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use core_kernel::{AccountId, PortError};

use crate::account::Account;
use crate::error::{AccountSide, TransferError};
use crate::journal::{JournalEntry, NewJournalEntry};
use crate::ports::{LedgerStore, UnitOfWork, BALANCE_CONSTRAINT};

/// Lifecycle stage of a single transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferStage {
    Start,
    Validating,
    Loading,
    Mutating,
    Committing,
    Committed,
    RolledBack,
}

impl TransferStage {
    /// Returns true if `next` is a legal successor of this stage
    pub fn can_transition_to(self, next: TransferStage) -> bool {
        use TransferStage::*;
        matches!(
            (self, next),
            (Start, Validating)
                | (Validating, Loading)
                | (Loading, Mutating)
                | (Mutating, Committing)
                | (Committing, Committed)
                | (Validating | Loading | Mutating | Committing, RolledBack)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, TransferStage::Committed | TransferStage::RolledBack)
    }
}

impl fmt::Display for TransferStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransferStage::Start => "start",
            TransferStage::Validating => "validating",
            TransferStage::Loading => "loading",
            TransferStage::Mutating => "mutating",
            TransferStage::Committing => "committing",
            TransferStage::Committed => "committed",
            TransferStage::RolledBack => "rolled_back",
        };
        f.write_str(name)
    }
}

/// The three inputs of a transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferRequest {
    pub from: AccountId,
    pub to: AccountId,
    pub amount: i64,
}

impl TransferRequest {
    pub fn new(from: AccountId, to: AccountId, amount: i64) -> Self {
        Self { from, to, amount }
    }

    /// Checks the request on its own, before touching the store
    ///
    /// # Errors
    ///
    /// - `InvalidAmount` if the amount is not strictly positive
    /// - `SameAccount` if debtor and creditor are equal
    pub fn validate(&self) -> Result<(), TransferError> {
        if self.amount <= 0 {
            return Err(TransferError::invalid_amount(self.from, self.to, self.amount));
        }
        if self.from == self.to {
            return Err(TransferError::same_account(self.from));
        }
        Ok(())
    }

    /// Translates a store failure into the transfer vocabulary
    ///
    /// A violation of the balance constraint means a concurrent debit won the
    /// race after our pre-check; it is reported as insufficient funds with
    /// the store's text kept as the diagnostic.
    fn store_failure(&self, error: PortError) -> TransferError {
        let diagnostic = Some(error.to_string());
        match error.violated_constraint() {
            Some(BALANCE_CONSTRAINT) => TransferError::insufficient_funds(
                self.from,
                self.to,
                format!("insufficient funds on account {} for a transfer of {}", self.from, self.amount),
                diagnostic,
            ),
            _ => TransferError::transfer_failed(
                self.from,
                self.to,
                "the ledger could not complete the transfer",
                diagnostic,
            ),
        }
    }

    fn lookup_failure(&self, side: AccountSide, error: PortError) -> TransferError {
        if error.is_not_found() {
            TransferError::unknown_account(self.from, self.to, side)
        } else {
            self.store_failure(error)
        }
    }
}

/// Outcome of a committed transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferReceipt {
    /// Debtor account after the transfer
    pub debtor: Account,
    /// Creditor account after the transfer
    pub creditor: Account,
    /// Journal entry written with the transfer, when journaling is enabled
    pub journal_entry: Option<JournalEntry>,
}

/// Runs transfers against a [`LedgerStore`]
///
/// The engine holds no state between calls beyond its configuration; every
/// transfer owns its own unit of work.
#[derive(Clone)]
pub struct TransferEngine {
    store: Arc<dyn LedgerStore>,
    journal_enabled: bool,
}

impl fmt::Debug for TransferEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransferEngine")
            .field("journal_enabled", &self.journal_enabled)
            .finish_non_exhaustive()
    }
}

impl TransferEngine {
    /// Creates an engine that journals every transfer
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self {
            store,
            journal_enabled: true,
        }
    }

    /// Turns journaling on or off
    pub fn with_journal(mut self, enabled: bool) -> Self {
        self.journal_enabled = enabled;
        self
    }

    /// Disables the audit journal
    pub fn without_journal(self) -> Self {
        self.with_journal(false)
    }

    pub fn journal_enabled(&self) -> bool {
        self.journal_enabled
    }

    /// Transfers `amount` from account `from` to account `to`
    ///
    /// Checks run in this order, each short-circuiting the rest:
    /// 1. amount strictly positive
    /// 2. debtor and creditor distinct
    /// 3. debtor exists
    /// 4. creditor exists
    /// 5. debtor balance stays non-negative after the debit
    ///
    /// On success both balances and the journal entry are committed together.
    ///
    /// # Errors
    ///
    /// Returns a [`TransferError`] naming both parties. On every error path
    /// the store is left exactly as it was before the call.
    #[instrument(skip(self, from, to), fields(debtor = %from, creditor = %to))]
    pub async fn transfer_money(
        &self,
        from: AccountId,
        to: AccountId,
        amount: i64,
    ) -> Result<TransferReceipt, TransferError> {
        let request = TransferRequest::new(from, to, amount);
        let mut stage = TransferStage::Start;

        advance(&mut stage, TransferStage::Validating);
        if let Err(error) = request.validate() {
            advance(&mut stage, TransferStage::RolledBack);
            warn!(reason = %error.kind, "Transfer rejected before opening a unit of work");
            return Err(error);
        }

        let mut unit = match self.store.begin().await {
            Ok(unit) => unit,
            Err(error) => {
                advance(&mut stage, TransferStage::RolledBack);
                warn!(error = %error, "Could not open a unit of work");
                return Err(request.store_failure(error));
            }
        };

        let staged = self.stage_transfer(unit.as_mut(), &request, &mut stage).await;

        let receipt = match staged {
            Ok(receipt) => receipt,
            Err(error) => {
                if let Err(rollback_error) = unit.rollback().await {
                    warn!(error = %rollback_error, "Rollback reported an error; writes were not committed");
                }
                advance(&mut stage, TransferStage::RolledBack);
                warn!(kind = error.kind.code(), reason = %error.kind, "Transfer rolled back");
                return Err(error);
            }
        };

        advance(&mut stage, TransferStage::Committing);
        if let Err(error) = unit.commit().await {
            advance(&mut stage, TransferStage::RolledBack);
            warn!(error = %error, "Store refused to commit the transfer");
            return Err(request.store_failure(error));
        }
        advance(&mut stage, TransferStage::Committed);

        info!(
            amount,
            debtor_balance = receipt.debtor.balance,
            creditor_balance = receipt.creditor.balance,
            journal_entry = receipt.journal_entry.as_ref().map(|e| e.id.value()),
            "Transfer committed"
        );
        Ok(receipt)
    }

    /// Loads, mutates and stages everything inside `unit`
    async fn stage_transfer(
        &self,
        unit: &mut dyn UnitOfWork,
        request: &TransferRequest,
        stage: &mut TransferStage,
    ) -> Result<TransferReceipt, TransferError> {
        advance(stage, TransferStage::Loading);
        let (mut debtor, mut creditor) = load_pair(unit, request).await?;

        advance(stage, TransferStage::Mutating);
        let debtor_before = debtor.balance;
        debtor.debit(request.amount);
        if debtor.is_overdrawn() {
            return Err(TransferError::insufficient_funds(
                request.from,
                request.to,
                format!(
                    "insufficient funds on account {}: balance {} is less than {}",
                    request.from, debtor_before, request.amount
                ),
                None,
            ));
        }

        if !creditor.credit(request.amount) {
            return Err(TransferError::transfer_failed(
                request.from,
                request.to,
                format!("crediting {} would overflow the balance of account {}", request.amount, request.to),
                None,
            ));
        }
        if creditor.is_overdrawn() {
            return Err(TransferError::insufficient_funds(
                request.from,
                request.to,
                format!("account {} would end with a negative balance", request.to),
                None,
            ));
        }

        unit.save_account(&debtor)
            .await
            .map_err(|e| request.store_failure(e))?;
        unit.save_account(&creditor)
            .await
            .map_err(|e| request.store_failure(e))?;

        let journal_entry = if self.journal_enabled {
            let entry = NewJournalEntry::record(request.amount, request.from, request.to);
            Some(
                unit.save_journal_entry(entry)
                    .await
                    .map_err(|e| request.store_failure(e))?,
            )
        } else {
            None
        };

        Ok(TransferReceipt {
            debtor,
            creditor,
            journal_entry,
        })
    }
}

/// Loads both accounts, locking them in ascending id order
///
/// Two opposite transfers between the same pair would otherwise lock the
/// rows in opposite orders and deadlock. Errors are still reported debtor
/// first.
async fn load_pair(
    unit: &mut dyn UnitOfWork,
    request: &TransferRequest,
) -> Result<(Account, Account), TransferError> {
    let debtor_first = request.from < request.to;
    let (first_id, second_id) = if debtor_first {
        (request.from, request.to)
    } else {
        (request.to, request.from)
    };

    let first = match unit.get_account(first_id).await {
        // Anything but a missing row leaves the unit unusable.
        Err(error) if !error.is_not_found() => return Err(request.store_failure(error)),
        other => other,
    };
    let second = unit.get_account(second_id).await;

    let (debtor, creditor) = if debtor_first { (first, second) } else { (second, first) };
    let debtor = debtor.map_err(|e| request.lookup_failure(AccountSide::Debtor, e))?;
    let creditor = creditor.map_err(|e| request.lookup_failure(AccountSide::Creditor, e))?;
    Ok((debtor, creditor))
}

fn advance(stage: &mut TransferStage, next: TransferStage) {
    debug_assert!(
        stage.can_transition_to(next),
        "illegal transfer stage transition {stage} -> {next}"
    );
    debug!(from = %stage, to = %next, "Transfer stage");
    *stage = next;
}
