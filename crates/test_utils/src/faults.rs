//! Fault injection for ledger stores
//!
//! [`FaultyLedgerStore`] wraps any [`LedgerStore`] and makes chosen unit of
//! work operations fail after the real operation has run. Failures are armed
//! per operation and fire once, so a test can simulate a concurrent debit
//! winning the race at commit time without actually racing.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use core_kernel::{AccountId, DomainPort, HealthCheckResult, HealthCheckable, PortError};
use domain_ledger::{Account, JournalEntry, LedgerStore, NewJournalEntry, UnitOfWork};

/// Operation at which a fault may be injected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultPoint {
    Begin,
    GetAccount,
    SaveAccount,
    SaveJournalEntry,
    Commit,
    /// Store-level account listing, outside any unit of work
    ListAccounts,
}

/// Error to report when a fault fires
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InjectedFault {
    /// A named store constraint rejected the write
    Constraint { constraint: String, message: String },
    /// The store connection dropped
    Connection(String),
    /// A concurrent unit of work conflicted with this one
    Conflict(String),
}

impl InjectedFault {
    pub fn constraint(constraint: impl Into<String>, message: impl Into<String>) -> Self {
        InjectedFault::Constraint {
            constraint: constraint.into(),
            message: message.into(),
        }
    }

    fn to_error(&self) -> PortError {
        match self {
            InjectedFault::Constraint { constraint, message } => {
                PortError::constraint(constraint.clone(), message.clone())
            }
            InjectedFault::Connection(message) => PortError::connection(message.clone()),
            InjectedFault::Conflict(message) => PortError::conflict(message.clone()),
        }
    }
}

#[derive(Debug, Default)]
struct FaultPlan {
    armed: HashMap<FaultPoint, InjectedFault>,
    fired: Vec<FaultPoint>,
}

impl FaultPlan {
    fn take(&mut self, point: FaultPoint) -> Option<PortError> {
        let fault = self.armed.remove(&point)?;
        self.fired.push(point);
        Some(fault.to_error())
    }
}

type SharedPlan = Arc<Mutex<FaultPlan>>;

fn take_fault(plan: &SharedPlan, point: FaultPoint) -> Option<PortError> {
    plan.lock().expect("fault plan lock poisoned").take(point)
}

/// A ledger store that fails on demand
#[derive(Clone)]
pub struct FaultyLedgerStore {
    inner: Arc<dyn LedgerStore>,
    plan: SharedPlan,
}

impl FaultyLedgerStore {
    pub fn new(inner: Arc<dyn LedgerStore>) -> Self {
        Self {
            inner,
            plan: Arc::default(),
        }
    }

    /// Arms a one-shot fault at `point`, replacing any fault already armed there
    pub fn arm(&self, point: FaultPoint, fault: InjectedFault) {
        self.plan
            .lock()
            .expect("fault plan lock poisoned")
            .armed
            .insert(point, fault);
    }

    /// Points whose faults have fired, in firing order
    pub fn fired(&self) -> Vec<FaultPoint> {
        self.plan.lock().expect("fault plan lock poisoned").fired.clone()
    }

    /// The wrapped store
    pub fn inner(&self) -> &Arc<dyn LedgerStore> {
        &self.inner
    }
}

impl DomainPort for FaultyLedgerStore {}

#[async_trait]
impl HealthCheckable for FaultyLedgerStore {
    async fn health_check(&self) -> HealthCheckResult {
        self.inner.health_check().await
    }
}

#[async_trait]
impl LedgerStore for FaultyLedgerStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, PortError> {
        if let Some(error) = take_fault(&self.plan, FaultPoint::Begin) {
            return Err(error);
        }
        let inner = self.inner.begin().await?;
        Ok(Box::new(FaultyUnitOfWork {
            inner,
            plan: Arc::clone(&self.plan),
        }))
    }

    async fn get_account(&self, id: AccountId) -> Result<Account, PortError> {
        self.inner.get_account(id).await
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, PortError> {
        if let Some(error) = take_fault(&self.plan, FaultPoint::ListAccounts) {
            return Err(error);
        }
        self.inner.list_accounts().await
    }

    async fn list_journal_entries(&self) -> Result<Vec<JournalEntry>, PortError> {
        self.inner.list_journal_entries().await
    }

    async fn count_journal_entries(&self) -> Result<u64, PortError> {
        self.inner.count_journal_entries().await
    }
}

struct FaultyUnitOfWork {
    inner: Box<dyn UnitOfWork>,
    plan: SharedPlan,
}

#[async_trait]
impl UnitOfWork for FaultyUnitOfWork {
    async fn get_account(&mut self, id: AccountId) -> Result<Account, PortError> {
        let account = self.inner.get_account(id).await?;
        match take_fault(&self.plan, FaultPoint::GetAccount) {
            Some(error) => Err(error),
            None => Ok(account),
        }
    }

    async fn save_account(&mut self, account: &Account) -> Result<(), PortError> {
        self.inner.save_account(account).await?;
        match take_fault(&self.plan, FaultPoint::SaveAccount) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn save_journal_entry(&mut self, entry: NewJournalEntry) -> Result<JournalEntry, PortError> {
        let saved = self.inner.save_journal_entry(entry).await?;
        match take_fault(&self.plan, FaultPoint::SaveJournalEntry) {
            Some(error) => Err(error),
            None => Ok(saved),
        }
    }

    async fn commit(self: Box<Self>) -> Result<(), PortError> {
        // The write never reaches the store when the fault fires.
        if let Some(error) = take_fault(&self.plan, FaultPoint::Commit) {
            self.inner.rollback().await?;
            return Err(error);
        }
        self.inner.commit().await
    }

    async fn rollback(self: Box<Self>) -> Result<(), PortError> {
        self.inner.rollback().await
    }
}
