use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use rust_decimal::Decimal;
use tokio::sync::RwLock;

use crate::domain::account::{Account, AccountId, AccountType, Balance};
use crate::domain::transaction::Leg;
use crate::error::{LedgerError, Result};

/// In-memory projection of account balances, derived from the
/// transaction log.
///
/// The map lock only protects the structure; logical serialization of
/// transactions is the engine's job via per-account locks. All balance
/// writes go through [`AccountStore::adjust`], which applies a leg set
/// either completely or not at all.
#[derive(Default, Clone)]
pub struct AccountStore {
    accounts: Arc<RwLock<HashMap<AccountId, Account>>>,
    next_id: Arc<AtomicU64>,
}

impl AccountStore {
    pub fn new() -> Self {
        Self {
            accounts: Arc::new(RwLock::new(HashMap::new())),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Registers a new account with a zero balance and returns it.
    pub async fn register(&self, account_type: AccountType, name: impl Into<String>) -> Account {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let account = Account::new(id, account_type, name);
        let mut accounts = self.accounts.write().await;
        accounts.insert(id, account.clone());
        account
    }

    pub async fn get(&self, id: AccountId) -> Option<Account> {
        let accounts = self.accounts.read().await;
        accounts.get(&id).cloned()
    }

    /// All accounts, ascending by id.
    pub async fn all(&self) -> Vec<Account> {
        let accounts = self.accounts.read().await;
        let mut all: Vec<Account> = accounts.values().cloned().collect();
        all.sort_by_key(|a| a.id);
        all
    }

    /// Resolves every leg's account type, in leg order.
    pub async fn leg_types(&self, legs: &[Leg]) -> Result<Vec<AccountType>> {
        let accounts = self.accounts.read().await;
        legs.iter()
            .map(|leg| {
                accounts
                    .get(&leg.account)
                    .map(|a| a.account_type)
                    .ok_or(LedgerError::AccountNotFound(leg.account))
            })
            .collect()
    }

    /// Validates a leg set without mutating: accounts exist, legs sum to
    /// exactly zero, and no non-negative account would be overdrawn.
    pub async fn check(&self, legs: &[Leg]) -> Result<()> {
        let accounts = self.accounts.read().await;
        Self::validate(&accounts, legs)
    }

    /// Atomically applies a leg set: either every delta lands or none
    /// does. The validation re-runs under the write lock, so a caller
    /// that skipped [`AccountStore::check`] still cannot corrupt
    /// balances.
    pub async fn adjust(&self, legs: &[Leg]) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        Self::validate(&accounts, legs)?;
        for leg in legs {
            if let Some(account) = accounts.get_mut(&leg.account) {
                account.balance += Balance::new(leg.delta);
            }
        }
        Ok(())
    }

    fn validate(accounts: &HashMap<AccountId, Account>, legs: &[Leg]) -> Result<()> {
        let sum: Decimal = legs.iter().map(|leg| leg.delta).sum();
        if !sum.is_zero() {
            return Err(LedgerError::UnbalancedLegs { sum });
        }
        // Aggregate per account first: a leg set may touch the same
        // account more than once.
        let mut deltas: HashMap<AccountId, Decimal> = HashMap::new();
        for leg in legs {
            *deltas.entry(leg.account).or_default() += leg.delta;
        }
        for (id, delta) in &deltas {
            let account = accounts
                .get(id)
                .ok_or(LedgerError::AccountNotFound(*id))?;
            let new_balance = account.balance.value() + *delta;
            if account.account_type.must_stay_non_negative() && new_balance < Decimal::ZERO {
                return Err(LedgerError::InsufficientFunds {
                    account: *id,
                    balance: account.balance.value(),
                    requested: -*delta,
                });
            }
        }
        Ok(())
    }
}
