use std::collections::HashMap;
use std::time::Duration;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use crate::application::locks::AccountLocks;
use crate::application::store::AccountStore;
use crate::domain::account::AccountId;
use crate::domain::ports::TransactionLogBox;
use crate::domain::transaction::{CommittedTransaction, Transaction};
use crate::error::Result;

/// The transaction processor: validates and atomically applies
/// double-entry transfers.
///
/// Owns the balance projection, the per-account lock registry and the
/// durable log. The log append happens while the account locks are held
/// and before the projection is touched, so an append failure leaves no
/// visible balance change and a committed log entry is always reflected
/// in memory.
pub struct LedgerEngine {
    accounts: AccountStore,
    locks: AccountLocks,
    log: TransactionLogBox,
}

impl LedgerEngine {
    pub fn new(log: TransactionLogBox) -> Self {
        Self {
            accounts: AccountStore::new(),
            locks: AccountLocks::default(),
            log,
        }
    }

    pub fn with_lock_timeout(log: TransactionLogBox, timeout: Duration) -> Self {
        Self {
            accounts: AccountStore::new(),
            locks: AccountLocks::new(timeout),
            log,
        }
    }

    pub fn accounts(&self) -> &AccountStore {
        &self.accounts
    }

    /// Validates and commits a transaction.
    ///
    /// Pipeline: structural checks and the account-type pairing table
    /// run before any lock is taken; then the touched accounts are
    /// locked in ascending id order, balances are checked, the
    /// transaction is appended to the log and finally applied to the
    /// projection. Rejections never leave a log entry.
    pub async fn submit(&self, tx: Transaction) -> Result<CommittedTransaction> {
        tx.validate_structure().inspect_err(|e| {
            warn!(kind = %tx.kind, error = %e, "transaction rejected: structure");
        })?;
        let types = self.accounts.leg_types(&tx.legs).await?;
        tx.validate_pairing(&types).inspect_err(|e| {
            warn!(kind = %tx.kind, error = %e, "transaction rejected: pairing");
        })?;

        let ids: Vec<AccountId> = tx.legs.iter().map(|leg| leg.account).collect();
        let _guards = self.locks.acquire(&ids).await?;

        self.accounts.check(&tx.legs).await.inspect_err(|e| {
            warn!(kind = %tx.kind, error = %e, "transaction rejected: balance");
        })?;

        let legs = tx.legs.clone();
        let committed = self.log.append(Uuid::new_v4(), Utc::now(), tx).await?;
        // Cannot fail: balances were checked under the locks we still
        // hold and the leg set is unchanged.
        self.accounts.adjust(&legs).await?;

        info!(
            seq = committed.seq,
            id = %committed.id,
            kind = %committed.kind,
            "transaction committed"
        );
        Ok(committed)
    }

    /// Rebuilds the balance projection from the log, e.g. after opening
    /// a persistent log with prior history. Accounts must already be
    /// registered.
    pub async fn restore(&self) -> Result<u64> {
        let entries = self.log.entries().await?;
        let count = entries.len() as u64;
        for entry in entries {
            self.accounts.adjust(&entry.legs).await?;
        }
        if count > 0 {
            info!(transactions = count, "balances restored from log");
        }
        Ok(count)
    }

    /// Folds the full log from zero, returning the balance every account
    /// would have. The projection is not consulted.
    pub async fn replay(&self) -> Result<HashMap<AccountId, Decimal>> {
        let mut balances: HashMap<AccountId, Decimal> = HashMap::new();
        for entry in self.log.entries().await? {
            for leg in &entry.legs {
                *balances.entry(leg.account).or_default() += leg.delta;
            }
        }
        Ok(balances)
    }

    /// Consistency check: replaying the log must reproduce every live
    /// balance exactly.
    pub async fn verify_replay(&self) -> Result<()> {
        let replayed = self.replay().await?;
        for account in self.accounts.all().await {
            let expected = replayed
                .get(&account.id)
                .copied()
                .unwrap_or(Decimal::ZERO);
            if account.balance.value() != expected {
                return Err(crate::error::LedgerError::ReplayMismatch {
                    account: account.id,
                    live: account.balance.value(),
                    replayed: expected,
                });
            }
        }
        Ok(())
    }
}
