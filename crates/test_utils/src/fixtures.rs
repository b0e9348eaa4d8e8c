//! Pre-built Test Fixtures
//!
//! The standard ledger used throughout the test suite: account 0 holding 100
//! and account 1 holding 50, matching the schema seed.

use std::sync::Arc;

use core_kernel::AccountId;
use domain_ledger::{Account, InMemoryLedgerStore, LedgerService, LedgerStore, TransferEngine};

/// Seeded debtor account
pub const DEBTOR_ID: AccountId = AccountId::new(0);
/// Seeded creditor account
pub const CREDITOR_ID: AccountId = AccountId::new(1);
/// An id no fixture ever creates
pub const UNKNOWN_ID: AccountId = AccountId::new(99);

pub const DEBTOR_OPENING_BALANCE: i64 = 100;
pub const CREDITOR_OPENING_BALANCE: i64 = 50;

/// Fixture for ledger test data
pub struct LedgerFixtures;

impl LedgerFixtures {
    /// The two seeded accounts, ordered by id
    pub fn seed_accounts() -> Vec<Account> {
        vec![
            Account::new(DEBTOR_ID, DEBTOR_OPENING_BALANCE),
            Account::new(CREDITOR_ID, CREDITOR_OPENING_BALANCE),
        ]
    }

    /// An in-memory store holding the seeded accounts
    pub fn seeded_store() -> InMemoryLedgerStore {
        InMemoryLedgerStore::with_accounts(Self::seed_accounts())
    }

    /// An in-memory store with `count` accounts, each holding `balance`
    pub fn uniform_store(count: i32, balance: i64) -> InMemoryLedgerStore {
        InMemoryLedgerStore::with_accounts(
            (0..count).map(|id| Account::new(AccountId::new(id), balance)),
        )
    }

    /// A journaling engine over the seeded store, plus the store itself
    pub fn seeded_engine() -> (TransferEngine, Arc<dyn LedgerStore>) {
        let store: Arc<dyn LedgerStore> = Arc::new(Self::seeded_store());
        (TransferEngine::new(Arc::clone(&store)), store)
    }

    /// A journaling service over the seeded store
    pub fn seeded_service() -> LedgerService {
        LedgerService::new(Arc::new(Self::seeded_store()), true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_accounts_are_ordered() {
        let accounts = LedgerFixtures::seed_accounts();
        assert_eq!(accounts.len(), 2);
        assert!(accounts[0].id < accounts[1].id);
        assert_eq!(accounts[0].balance, 100);
        assert_eq!(accounts[1].balance, 50);
    }

    #[tokio::test]
    async fn test_uniform_store_has_requested_accounts() {
        let store = LedgerFixtures::uniform_store(4, 10);
        let accounts = store.list_accounts().await.unwrap();
        assert_eq!(accounts.len(), 4);
        assert!(accounts.iter().all(|a| a.balance == 10));
    }
}
