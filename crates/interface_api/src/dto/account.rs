//! Account and transfer DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use domain_ledger::{Account, JournalEntry};

/// Form body of `POST /bankService/transferMoney`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferMoneyForm {
    pub from_account: i32,
    pub to_account: i32,
    pub amount: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountResponse {
    pub id: i32,
    pub balance: i64,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id.value(),
            balance: account.balance,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntryResponse {
    pub id: i64,
    pub amount: i64,
    pub from: i32,
    pub to: i32,
    pub time: DateTime<Utc>,
}

impl From<JournalEntry> for JournalEntryResponse {
    fn from(entry: JournalEntry) -> Self {
        Self {
            id: entry.id.value(),
            amount: entry.amount,
            from: entry.from.value(),
            to: entry.to.value(),
            time: entry.time,
        }
    }
}
