//! Comprehensive tests for domain_ledger transfers

use std::sync::Arc;

use proptest::prelude::*;

use core_kernel::AccountId;
use domain_ledger::{
    Account, AccountSide, InMemoryLedgerStore, LedgerService, LedgerStore, TransferEngine, TransferErrorKind,
    BALANCE_CONSTRAINT,
};
use test_utils::{
    assert_balance, assert_ledger_unchanged, assert_no_negative_balances, assert_zero_sum,
    transfer_sequence_strategy, FaultPoint, FaultyLedgerStore, InjectedFault, LedgerFixtures,
    LedgerSnapshot, CREDITOR_ID, DEBTOR_ID, UNKNOWN_ID,
};

fn engine_over(store: &Arc<dyn LedgerStore>) -> TransferEngine {
    TransferEngine::new(Arc::clone(store))
}

// ============================================================================
// Scenario Tests
// ============================================================================

mod scenario_tests {
    use super::*;

    #[tokio::test]
    async fn test_transfer_commits_both_balances_and_journal() {
        let (engine, store) = LedgerFixtures::seeded_engine();

        let receipt = engine.transfer_money(DEBTOR_ID, CREDITOR_ID, 10).await.unwrap();

        assert_eq!(receipt.debtor.balance, 90);
        assert_eq!(receipt.creditor.balance, 60);
        assert_balance(store.as_ref(), DEBTOR_ID, 90).await;
        assert_balance(store.as_ref(), CREDITOR_ID, 60).await;

        let journal = store.list_journal_entries().await.unwrap();
        assert_eq!(journal.len(), 1);
        let entry = &journal[0];
        assert_eq!(entry.amount, 10);
        assert_eq!(entry.from, DEBTOR_ID);
        assert_eq!(entry.to, CREDITOR_ID);
        assert_eq!(Some(entry), receipt.journal_entry.as_ref());
    }

    #[tokio::test]
    async fn test_overdraft_is_rejected_and_rolled_back() {
        let (engine, store) = LedgerFixtures::seeded_engine();
        let before = LedgerSnapshot::capture(store.as_ref()).await;

        let error = engine.transfer_money(DEBTOR_ID, CREDITOR_ID, 1000).await.unwrap_err();

        assert!(error.is_insufficient_funds());
        assert_eq!(error.debtor, DEBTOR_ID);
        assert_eq!(error.creditor, CREDITOR_ID);
        assert!(error.reason().contains("insufficient funds"));
        assert_eq!(error.diagnostic(), None);
        assert_ledger_unchanged(store.as_ref(), &before).await;
    }

    #[tokio::test]
    async fn test_exact_balance_can_be_transferred() {
        let (engine, store) = LedgerFixtures::seeded_engine();

        engine.transfer_money(DEBTOR_ID, CREDITOR_ID, 100).await.unwrap();

        assert_balance(store.as_ref(), DEBTOR_ID, 0).await;
        assert_balance(store.as_ref(), CREDITOR_ID, 150).await;
    }

    #[tokio::test]
    async fn test_transfers_in_both_directions() {
        let (engine, store) = LedgerFixtures::seeded_engine();

        engine.transfer_money(DEBTOR_ID, CREDITOR_ID, 30).await.unwrap();
        engine.transfer_money(CREDITOR_ID, DEBTOR_ID, 80).await.unwrap();

        assert_balance(store.as_ref(), DEBTOR_ID, 150).await;
        assert_balance(store.as_ref(), CREDITOR_ID, 0).await;

        let journal = store.list_journal_entries().await.unwrap();
        assert_eq!(journal.len(), 2);
        assert!(journal[0].id < journal[1].id);
        assert_eq!(journal[1].from, CREDITOR_ID);
    }

    fn near_overflow_store(debtor_balance: i64) -> Arc<dyn LedgerStore> {
        Arc::new(InMemoryLedgerStore::with_accounts([
            Account::new(DEBTOR_ID, debtor_balance),
            Account::new(CREDITOR_ID, i64::MAX - 5),
        ]))
    }

    #[tokio::test]
    async fn test_overdraft_into_full_creditor_is_insufficient_funds() {
        let store = near_overflow_store(5);
        let before = LedgerSnapshot::capture(store.as_ref()).await;

        let error = engine_over(&store)
            .transfer_money(DEBTOR_ID, CREDITOR_ID, 10)
            .await
            .unwrap_err();

        assert!(error.is_insufficient_funds());
        assert_ledger_unchanged(store.as_ref(), &before).await;
    }

    #[tokio::test]
    async fn test_credit_overflow_is_transfer_failed() {
        let store = near_overflow_store(100);
        let before = LedgerSnapshot::capture(store.as_ref()).await;

        let error = engine_over(&store)
            .transfer_money(DEBTOR_ID, CREDITOR_ID, 10)
            .await
            .unwrap_err();

        assert_eq!(error.kind.code(), "transfer_failed");
        assert!(error.reason().contains("overflow"));
        assert_ledger_unchanged(store.as_ref(), &before).await;
    }
}

// ============================================================================
// Validation Tests
// ============================================================================

mod validation_tests {
    use super::*;

    #[tokio::test]
    async fn test_zero_and_negative_amounts_are_rejected() {
        let (engine, store) = LedgerFixtures::seeded_engine();
        let before = LedgerSnapshot::capture(store.as_ref()).await;

        for amount in [0, -1, i64::MIN] {
            let error = engine.transfer_money(DEBTOR_ID, CREDITOR_ID, amount).await.unwrap_err();
            assert_eq!(error.kind, TransferErrorKind::InvalidAmount { amount });
        }

        assert_ledger_unchanged(store.as_ref(), &before).await;
    }

    #[tokio::test]
    async fn test_invalid_amount_wins_over_unknown_accounts() {
        let (engine, _store) = LedgerFixtures::seeded_engine();

        let error = engine.transfer_money(UNKNOWN_ID, UNKNOWN_ID, 0).await.unwrap_err();

        assert_eq!(error.kind.code(), "invalid_amount");
    }

    #[tokio::test]
    async fn test_self_transfer_is_rejected() {
        let (engine, store) = LedgerFixtures::seeded_engine();
        let before = LedgerSnapshot::capture(store.as_ref()).await;

        let error = engine.transfer_money(DEBTOR_ID, DEBTOR_ID, 10).await.unwrap_err();

        assert_eq!(error.kind, TransferErrorKind::SameAccount);
        assert_eq!(error.debtor, DEBTOR_ID);
        assert_eq!(error.creditor, DEBTOR_ID);
        assert_ledger_unchanged(store.as_ref(), &before).await;
    }

    #[tokio::test]
    async fn test_self_transfer_of_unknown_account_is_same_account() {
        let (engine, _store) = LedgerFixtures::seeded_engine();

        let error = engine.transfer_money(UNKNOWN_ID, UNKNOWN_ID, 10).await.unwrap_err();

        assert_eq!(error.kind, TransferErrorKind::SameAccount);
    }

    #[tokio::test]
    async fn test_unknown_debtor() {
        let (engine, store) = LedgerFixtures::seeded_engine();
        let before = LedgerSnapshot::capture(store.as_ref()).await;

        let error = engine.transfer_money(UNKNOWN_ID, CREDITOR_ID, 10).await.unwrap_err();

        assert_eq!(error.unknown_side(), Some(AccountSide::Debtor));
        assert_eq!(
            error.kind,
            TransferErrorKind::UnknownAccount { side: AccountSide::Debtor, id: UNKNOWN_ID }
        );
        assert_ledger_unchanged(store.as_ref(), &before).await;
    }

    #[tokio::test]
    async fn test_unknown_creditor() {
        let (engine, store) = LedgerFixtures::seeded_engine();
        let before = LedgerSnapshot::capture(store.as_ref()).await;

        let error = engine.transfer_money(DEBTOR_ID, UNKNOWN_ID, 10).await.unwrap_err();

        assert_eq!(error.unknown_side(), Some(AccountSide::Creditor));
        assert_ledger_unchanged(store.as_ref(), &before).await;
    }

    #[tokio::test]
    async fn test_unknown_debtor_reported_before_creditor() {
        let (engine, _store) = LedgerFixtures::seeded_engine();

        let error = engine
            .transfer_money(AccountId::new(98), AccountId::new(97), 10)
            .await
            .unwrap_err();

        assert_eq!(error.unknown_side(), Some(AccountSide::Debtor));
    }

    #[tokio::test]
    async fn test_unknown_debtor_with_higher_id_than_creditor() {
        let (engine, _store) = LedgerFixtures::seeded_engine();

        let error = engine.transfer_money(UNKNOWN_ID, DEBTOR_ID, 1).await.unwrap_err();

        assert_eq!(error.unknown_side(), Some(AccountSide::Debtor));
    }
}

// ============================================================================
// Journal Tests
// ============================================================================

mod journal_tests {
    use super::*;

    #[tokio::test]
    async fn test_engine_without_journal_writes_no_entries() {
        let store: Arc<dyn LedgerStore> = Arc::new(LedgerFixtures::seeded_store());
        let engine = engine_over(&store).without_journal();
        assert!(!engine.journal_enabled());

        let receipt = engine.transfer_money(DEBTOR_ID, CREDITOR_ID, 10).await.unwrap();

        assert!(receipt.journal_entry.is_none());
        assert_balance(store.as_ref(), DEBTOR_ID, 90).await;
        assert_eq!(store.count_journal_entries().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_failed_transfers_write_no_entries() {
        let (engine, store) = LedgerFixtures::seeded_engine();

        let _ = engine.transfer_money(DEBTOR_ID, CREDITOR_ID, 101).await;
        let _ = engine.transfer_money(DEBTOR_ID, UNKNOWN_ID, 1).await;
        let _ = engine.transfer_money(DEBTOR_ID, CREDITOR_ID, 0).await;

        assert_eq!(store.count_journal_entries().await.unwrap(), 0);
    }
}

// ============================================================================
// Fault Injection Tests
// ============================================================================

mod fault_tests {
    use super::*;

    fn faulty_seeded() -> (FaultyLedgerStore, Arc<dyn LedgerStore>) {
        let faulty = FaultyLedgerStore::new(Arc::new(LedgerFixtures::seeded_store()));
        let store: Arc<dyn LedgerStore> = Arc::new(faulty.clone());
        (faulty, store)
    }

    #[tokio::test]
    async fn test_balance_constraint_at_commit_is_insufficient_funds() {
        let (faulty, store) = faulty_seeded();
        faulty.arm(
            FaultPoint::Commit,
            InjectedFault::constraint(BALANCE_CONSTRAINT, "new row violates check constraint"),
        );
        let before = LedgerSnapshot::capture(store.as_ref()).await;

        let error = engine_over(&store)
            .transfer_money(DEBTOR_ID, CREDITOR_ID, 10)
            .await
            .unwrap_err();

        assert!(error.is_insufficient_funds());
        let diagnostic = error.diagnostic().expect("store diagnostic is kept");
        assert!(diagnostic.contains(BALANCE_CONSTRAINT));
        assert!(!error.reason().contains(BALANCE_CONSTRAINT));
        assert_ledger_unchanged(store.as_ref(), &before).await;
    }

    #[tokio::test]
    async fn test_other_constraint_is_transfer_failed() {
        let (faulty, store) = faulty_seeded();
        faulty.arm(
            FaultPoint::SaveJournalEntry,
            InjectedFault::constraint("journal_entries_amount_positive", "amount must be positive"),
        );
        let before = LedgerSnapshot::capture(store.as_ref()).await;

        let error = engine_over(&store)
            .transfer_money(DEBTOR_ID, CREDITOR_ID, 10)
            .await
            .unwrap_err();

        assert_eq!(error.kind.code(), "transfer_failed");
        assert!(error.diagnostic().unwrap().contains("journal_entries_amount_positive"));
        assert_ledger_unchanged(store.as_ref(), &before).await;
    }

    #[tokio::test]
    async fn test_failure_after_first_write_rolls_back_everything() {
        let (faulty, store) = faulty_seeded();
        faulty.arm(FaultPoint::SaveAccount, InjectedFault::Connection("connection reset".into()));
        let before = LedgerSnapshot::capture(store.as_ref()).await;

        let error = engine_over(&store)
            .transfer_money(DEBTOR_ID, CREDITOR_ID, 10)
            .await
            .unwrap_err();

        assert_eq!(error.kind.code(), "transfer_failed");
        assert_eq!(faulty.fired(), vec![FaultPoint::SaveAccount]);
        assert_ledger_unchanged(store.as_ref(), &before).await;
    }

    #[tokio::test]
    async fn test_begin_failure_is_transfer_failed() {
        let (faulty, store) = faulty_seeded();
        faulty.arm(FaultPoint::Begin, InjectedFault::Connection("pool timed out".into()));

        let error = engine_over(&store)
            .transfer_money(DEBTOR_ID, CREDITOR_ID, 10)
            .await
            .unwrap_err();

        assert_eq!(error.kind.code(), "transfer_failed");
        assert!(error.diagnostic().unwrap().contains("pool timed out"));
    }

    #[tokio::test]
    async fn test_lookup_conflict_is_not_unknown_account() {
        let (faulty, store) = faulty_seeded();
        faulty.arm(FaultPoint::GetAccount, InjectedFault::Conflict("deadlock detected".into()));
        let before = LedgerSnapshot::capture(store.as_ref()).await;

        let error = engine_over(&store)
            .transfer_money(DEBTOR_ID, CREDITOR_ID, 10)
            .await
            .unwrap_err();

        assert_eq!(error.kind.code(), "transfer_failed");
        assert_eq!(error.unknown_side(), None);
        assert_ledger_unchanged(store.as_ref(), &before).await;
    }

    #[tokio::test]
    async fn test_store_is_usable_after_failure() {
        let (faulty, store) = faulty_seeded();
        faulty.arm(FaultPoint::Commit, InjectedFault::Conflict("serialization failure".into()));
        let engine = engine_over(&store);

        assert!(engine.transfer_money(DEBTOR_ID, CREDITOR_ID, 10).await.is_err());
        engine.transfer_money(DEBTOR_ID, CREDITOR_ID, 10).await.unwrap();

        assert_balance(store.as_ref(), DEBTOR_ID, 90).await;
        assert_eq!(store.count_journal_entries().await.unwrap(), 1);
    }
}

// ============================================================================
// Concurrency Tests
// ============================================================================

mod concurrency_tests {
    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_debits_never_overdraw() {
        let (engine, store) = LedgerFixtures::seeded_engine();

        // Twenty debits of 10 against a balance of 100: exactly ten can succeed.
        let handles: Vec<_> = (0..20)
            .map(|_| {
                let engine = engine.clone();
                tokio::spawn(async move { engine.transfer_money(DEBTOR_ID, CREDITOR_ID, 10).await })
            })
            .collect();

        let mut committed = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => committed += 1,
                Err(error) => assert!(error.is_insufficient_funds()),
            }
        }

        assert_eq!(committed, 10);
        assert_balance(store.as_ref(), DEBTOR_ID, 0).await;
        assert_balance(store.as_ref(), CREDITOR_ID, 150).await;
        assert_eq!(store.count_journal_entries().await.unwrap(), 10);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_opposite_transfers_do_not_deadlock() {
        let store: Arc<dyn LedgerStore> = Arc::new(LedgerFixtures::uniform_store(2, 1_000));
        let engine = engine_over(&store);
        let before = LedgerSnapshot::capture(store.as_ref()).await;

        let handles: Vec<_> = (0..50)
            .map(|i| {
                let engine = engine.clone();
                let (from, to) = if i % 2 == 0 { (0, 1) } else { (1, 0) };
                tokio::spawn(async move {
                    engine
                        .transfer_money(AccountId::new(from), AccountId::new(to), 7)
                        .await
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_zero_sum(store.as_ref(), &before).await;
        assert_balance(store.as_ref(), AccountId::new(0), 1_000).await;
    }

    #[tokio::test]
    async fn test_cancelled_transfer_leaves_store_unchanged() {
        let store = LedgerFixtures::seeded_store();
        let shared: Arc<dyn LedgerStore> = Arc::new(store.clone());
        let engine = engine_over(&shared);
        let before = LedgerSnapshot::capture(shared.as_ref()).await;

        // Holding a unit open blocks the transfer until it is dropped by the timeout.
        let blocker = shared.begin().await.unwrap();
        let outcome = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            engine.transfer_money(DEBTOR_ID, CREDITOR_ID, 10),
        )
        .await;
        drop(blocker);

        assert!(outcome.is_err());
        assert_ledger_unchanged(shared.as_ref(), &before).await;
        engine.transfer_money(DEBTOR_ID, CREDITOR_ID, 10).await.unwrap();
    }
}

// ============================================================================
// Service Tests
// ============================================================================

mod service_tests {
    use super::*;

    #[tokio::test]
    async fn test_all_accounts_sorted_by_id() {
        let store = InMemoryLedgerStore::new();
        for id in [5, 2, 9] {
            store
                .insert_account(domain_ledger::Account::new(AccountId::new(id), 1))
                .await;
        }
        let service = LedgerService::new(Arc::new(store), true);

        let ids: Vec<i32> = service
            .all_accounts()
            .await
            .unwrap()
            .iter()
            .map(|a| a.id.value())
            .collect();

        assert_eq!(ids, vec![2, 5, 9]);
    }

    #[tokio::test]
    async fn test_service_transfer_and_queries() {
        let service = LedgerFixtures::seeded_service();

        service.transfer_money(DEBTOR_ID, CREDITOR_ID, 25).await.unwrap();

        assert_eq!(service.account(DEBTOR_ID).await.unwrap().balance, 75);
        assert_eq!(service.journal_count().await.unwrap(), 1);
        assert_eq!(service.journal().await.unwrap()[0].amount, 25);
        assert!(service.account(UNKNOWN_ID).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_service_without_journal() {
        let service = LedgerService::new(Arc::new(LedgerFixtures::seeded_store()), false);
        assert!(!service.engine().journal_enabled());

        service.transfer_money(DEBTOR_ID, CREDITOR_ID, 25).await.unwrap();

        assert_eq!(service.journal_count().await.unwrap(), 0);
    }
}

// ============================================================================
// Property Tests
// ============================================================================

mod property_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn test_any_sequence_keeps_ledger_consistent(
            balances in prop::collection::vec(0i64..500, 3),
            attempts in transfer_sequence_strategy(4, 20),
        ) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();

            runtime.block_on(async {
                // Account 3 never exists, so some attempts hit unknown accounts.
                let store: Arc<dyn LedgerStore> = Arc::new(InMemoryLedgerStore::with_accounts(
                    balances
                        .iter()
                        .enumerate()
                        .map(|(id, balance)| domain_ledger::Account::new(AccountId::new(id as i32), *balance)),
                ));
                let engine = engine_over(&store);
                let before = LedgerSnapshot::capture(store.as_ref()).await;

                let mut committed = 0u64;
                for attempt in &attempts {
                    let snapshot = LedgerSnapshot::capture(store.as_ref()).await;
                    match engine.transfer_money(attempt.from, attempt.to, attempt.amount).await {
                        Ok(receipt) => {
                            committed += 1;
                            let debtor_before = snapshot.balance(attempt.from).unwrap();
                            assert_eq!(receipt.debtor.balance, debtor_before - attempt.amount);
                        }
                        Err(_) => assert_ledger_unchanged(store.as_ref(), &snapshot).await,
                    }
                }

                assert_zero_sum(store.as_ref(), &before).await;
                assert_no_negative_balances(store.as_ref()).await;
                assert_eq!(store.count_journal_entries().await.unwrap(), committed);
            });
        }
    }
}
