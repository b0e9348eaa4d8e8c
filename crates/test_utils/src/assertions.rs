//! Custom Test Assertions
//!
//! Ledger-level checks with messages that name the offending account.

use std::collections::BTreeMap;

use core_kernel::AccountId;
use domain_ledger::LedgerStore;

/// Committed balances and journal size at one point in time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerSnapshot {
    pub balances: BTreeMap<AccountId, i64>,
    pub journal_len: u64,
}

impl LedgerSnapshot {
    /// Reads the committed state of `store`
    ///
    /// # Panics
    ///
    /// Panics if the store cannot be read
    pub async fn capture(store: &dyn LedgerStore) -> Self {
        let balances = store
            .list_accounts()
            .await
            .expect("listing accounts for snapshot")
            .into_iter()
            .map(|account| (account.id, account.balance))
            .collect();
        let journal_len = store
            .count_journal_entries()
            .await
            .expect("counting journal entries for snapshot");
        Self { balances, journal_len }
    }

    pub fn balance(&self, id: AccountId) -> Option<i64> {
        self.balances.get(&id).copied()
    }

    /// Sum of every balance, widened so it cannot overflow
    pub fn total(&self) -> i128 {
        self.balances.values().map(|b| i128::from(*b)).sum()
    }
}

/// Asserts that `store` still matches `before`
pub async fn assert_ledger_unchanged(store: &dyn LedgerStore, before: &LedgerSnapshot) {
    let after = LedgerSnapshot::capture(store).await;
    assert_eq!(
        &after, before,
        "Ledger changed after a rejected transfer: before={:?}, after={:?}",
        before, after
    );
}

/// Asserts that the total money in `store` equals the total in `before`
pub async fn assert_zero_sum(store: &dyn LedgerStore, before: &LedgerSnapshot) {
    let after = LedgerSnapshot::capture(store).await;
    assert_eq!(
        after.total(),
        before.total(),
        "Total balance drifted: before={}, after={}",
        before.total(),
        after.total()
    );
}

/// Asserts that no committed balance is negative
pub async fn assert_no_negative_balances(store: &dyn LedgerStore) {
    let snapshot = LedgerSnapshot::capture(store).await;
    for (id, balance) in &snapshot.balances {
        assert!(*balance >= 0, "Account {} has negative balance {}", id, balance);
    }
}

/// Asserts the committed balance of one account
pub async fn assert_balance(store: &dyn LedgerStore, id: AccountId, expected: i64) {
    let account = store
        .get_account(id)
        .await
        .unwrap_or_else(|e| panic!("Account {} could not be read: {}", id, e));
    assert_eq!(
        account.balance, expected,
        "Balance mismatch for account {}: actual={}, expected={}",
        id, account.balance, expected
    );
}
