//! Property-Based Test Generators
//!
//! Proptest strategies for balances, amounts and transfer sequences over a
//! small fixed set of accounts.

use proptest::prelude::*;

use core_kernel::AccountId;

/// A transfer to attempt, which may or may not be valid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferAttempt {
    pub from: AccountId,
    pub to: AccountId,
    pub amount: i64,
}

/// Strategy for opening balances
pub fn balance_strategy() -> impl Strategy<Value = i64> {
    0i64..10_000
}

/// Strategy for strictly positive transfer amounts
pub fn positive_amount_strategy() -> impl Strategy<Value = i64> {
    1i64..5_000
}

/// Strategy for amounts that must be rejected
pub fn non_positive_amount_strategy() -> impl Strategy<Value = i64> {
    prop_oneof![Just(0i64), Just(i64::MIN), i64::MIN..0]
}

/// Strategy for an id among the first `accounts` ids
pub fn account_id_strategy(accounts: i32) -> impl Strategy<Value = AccountId> {
    (0..accounts).prop_map(AccountId::new)
}

/// Strategy for one attempt between the first `accounts` ids
///
/// Roughly one attempt in ten carries a non-positive amount, and debtor and
/// creditor may coincide.
pub fn transfer_attempt_strategy(accounts: i32) -> impl Strategy<Value = TransferAttempt> {
    let amount = prop_oneof![
        9 => positive_amount_strategy(),
        1 => -10i64..=0,
    ];
    (account_id_strategy(accounts), account_id_strategy(accounts), amount)
        .prop_map(|(from, to, amount)| TransferAttempt { from, to, amount })
}

/// Strategy for a sequence of up to `max_len` attempts
pub fn transfer_sequence_strategy(
    accounts: i32,
    max_len: usize,
) -> impl Strategy<Value = Vec<TransferAttempt>> {
    prop::collection::vec(transfer_attempt_strategy(accounts), 1..=max_len)
}
