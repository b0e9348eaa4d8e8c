//! Account and transfer handlers

use axum::{
    extract::{rejection::FormRejection, Path, State},
    Form, Json,
};
use tracing::{debug, info};

use core_kernel::AccountId;

use crate::dto::account::{AccountResponse, JournalEntryResponse, TransferMoneyForm};
use crate::{error::ApiError, AppState};

/// Lists all accounts, ordered by id
pub async fn all_accounts(
    State(state): State<AppState>,
) -> Result<Json<Vec<AccountResponse>>, ApiError> {
    debug!("Listing accounts");
    let accounts = state.service.all_accounts().await?;
    Ok(Json(accounts.into_iter().map(AccountResponse::from).collect()))
}

/// Transfers money and returns every account afterwards
///
/// The transfer is committed before the accounts are re-listed. If the
/// listing fails the client gets that error, but the money has still moved;
/// the committed transfer is logged with its journal entry so it can be
/// reconciled.
pub async fn transfer_money(
    State(state): State<AppState>,
    form: Result<Form<TransferMoneyForm>, FormRejection>,
) -> Result<Json<Vec<AccountResponse>>, ApiError> {
    let Form(form) = form.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    debug!(
        from = form.from_account,
        to = form.to_account,
        amount = form.amount,
        "Transfer requested"
    );

    let receipt = state
        .service
        .transfer_money(
            AccountId::new(form.from_account),
            AccountId::new(form.to_account),
            form.amount,
        )
        .await?;
    info!(
        from = %receipt.debtor.id,
        to = %receipt.creditor.id,
        amount = form.amount,
        journal_entry = receipt.journal_entry.as_ref().map(|e| e.id.value()),
        "Transfer accepted"
    );

    all_accounts(State(state)).await
}

/// Gets one account by id
pub async fn get_account(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<AccountResponse>, ApiError> {
    let account = state.service.account(AccountId::new(id)).await?;
    Ok(Json(account.into()))
}

/// Lists the audit journal, oldest first
pub async fn journal(
    State(state): State<AppState>,
) -> Result<Json<Vec<JournalEntryResponse>>, ApiError> {
    let entries = state.service.journal().await?;
    Ok(Json(entries.into_iter().map(JournalEntryResponse::from).collect()))
}
