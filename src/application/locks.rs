use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::account::AccountId;
use crate::error::{LedgerError, Result};

pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Per-account lock registry with deadlock-free ordered acquisition.
///
/// A transaction touching N accounts locks them in ascending id order;
/// the total order makes cycles between transactions impossible. Each
/// individual wait is bounded; on timeout every guard taken so far is
/// dropped and the caller gets `LockTimeout`, free to retry.
pub struct AccountLocks {
    locks: StdMutex<HashMap<AccountId, Arc<Mutex<()>>>>,
    timeout: Duration,
}

impl AccountLocks {
    pub fn new(timeout: Duration) -> Self {
        Self {
            locks: StdMutex::new(HashMap::new()),
            timeout,
        }
    }

    /// Acquires exclusive locks on all given accounts, sorted and
    /// deduplicated first. The returned guards release on drop.
    pub async fn acquire(&self, accounts: &[AccountId]) -> Result<Vec<OwnedMutexGuard<()>>> {
        let mut ids: Vec<AccountId> = accounts.to_vec();
        ids.sort_unstable();
        ids.dedup();

        let mut guards = Vec::with_capacity(ids.len());
        for id in ids {
            let lock = self.lock_for(id);
            match tokio::time::timeout(self.timeout, lock.lock_owned()).await {
                Ok(guard) => guards.push(guard),
                // Guards collected so far drop here, rolling back the
                // acquisition entirely.
                Err(_) => return Err(LedgerError::LockTimeout),
            }
        }
        Ok(guards)
    }

    fn lock_for(&self, id: AccountId) -> Arc<Mutex<()>> {
        let mut locks = self
            .locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        locks.entry(id).or_default().clone()
    }
}

impl Default for AccountLocks {
    fn default() -> Self {
        Self::new(DEFAULT_LOCK_TIMEOUT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn acquire_is_exclusive_per_account() {
        let locks = Arc::new(AccountLocks::new(Duration::from_millis(50)));
        let guards = locks.acquire(&[1, 2]).await.unwrap();
        assert_eq!(guards.len(), 2);

        // A second acquisition of an overlapping set times out.
        let err = locks.acquire(&[2, 3]).await.unwrap_err();
        assert!(matches!(err, LedgerError::LockTimeout));

        drop(guards);
        assert!(locks.acquire(&[2, 3]).await.is_ok());
    }

    #[tokio::test]
    async fn duplicate_ids_lock_once() {
        let locks = AccountLocks::default();
        let guards = locks.acquire(&[7, 7, 7]).await.unwrap();
        assert_eq!(guards.len(), 1);
    }

    #[tokio::test]
    async fn opposite_orders_do_not_deadlock() {
        let locks = Arc::new(AccountLocks::new(Duration::from_secs(1)));
        let mut handles = Vec::new();
        for i in 0..32u64 {
            let locks = Arc::clone(&locks);
            // Half the tasks name the accounts in reverse order.
            let ids = if i % 2 == 0 { [1, 2] } else { [2, 1] };
            handles.push(tokio::spawn(async move {
                let _guards = locks.acquire(&ids).await.unwrap();
                tokio::task::yield_now().await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
    }
}
