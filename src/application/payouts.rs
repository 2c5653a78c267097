use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::application::engine::LedgerEngine;
use crate::application::tags::TagDirectory;
use crate::domain::account::{AccountId, Amount};
use crate::domain::payout::{Payout, PayoutState};
use crate::domain::tag::TagUid;
use crate::domain::transaction::{Leg, Transaction, TransactionKind, TransactionMetadata};
use crate::error::{LedgerError, Result};

/// Tracks payouts from `Pending` to their terminal state, delegating all
/// balance mutation to the ledger engine.
///
/// Completion holds the registry's write lock for its whole duration, so
/// two racing `complete` calls for the same payout serialize and the
/// second one observes the terminal state instead of booking twice.
pub struct PayoutService {
    engine: Arc<LedgerEngine>,
    tags: Arc<TagDirectory>,
    cash_exit_account: AccountId,
    payouts: RwLock<HashMap<Uuid, Payout>>,
}

impl PayoutService {
    pub fn new(
        engine: Arc<LedgerEngine>,
        tags: Arc<TagDirectory>,
        cash_exit_account: AccountId,
    ) -> Self {
        Self {
            engine,
            tags,
            cash_exit_account,
            payouts: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a pending payout: resolves the tag, snapshots the current
    /// balance and previews the post-payout balance. The ledger is not
    /// touched; no funds are reserved.
    pub async fn create(
        &self,
        tag_uid: TagUid,
        amount: Amount,
        cashier_id: u64,
        till_id: u64,
    ) -> Result<Payout> {
        let account_id = self.tags.resolve(tag_uid)?;
        let account = self
            .engine
            .accounts()
            .get(account_id)
            .await
            .ok_or(LedgerError::AccountNotFound(account_id))?;

        let old_balance = account.balance.value();
        let payout = Payout {
            id: Uuid::new_v4(),
            customer_tag_uid: tag_uid,
            customer_account: account_id,
            amount: amount.value(),
            old_balance,
            new_balance: old_balance - amount.value(),
            cashier_id,
            till_id,
            state: PayoutState::Pending,
            booked_at: None,
        };

        let mut payouts = self.payouts.write().await;
        payouts.insert(payout.id, payout.clone());
        info!(payout = %payout.id, tag = %tag_uid, amount = %payout.amount, "payout created");
        Ok(payout)
    }

    /// Completes a pending payout by booking the payout transaction.
    ///
    /// Completion re-resolves the tag: if it was rebound to a different
    /// account since creation the payout fails with `StaleBinding`
    /// instead of silently paying the new owner. Completing an already
    /// completed payout returns the stored record without booking a
    /// second transaction. A failed payout stays failed; it must be
    /// re-created.
    pub async fn complete(&self, payout_id: Uuid) -> Result<Payout> {
        let mut payouts = self.payouts.write().await;
        let payout = payouts
            .get(&payout_id)
            .cloned()
            .ok_or(LedgerError::PayoutNotFound(payout_id))?;

        match &payout.state {
            PayoutState::Completed => return Ok(payout),
            PayoutState::Failed { .. } => return Err(LedgerError::PayoutFinalized(payout_id)),
            PayoutState::Pending => {}
        }

        let actual = match self.tags.resolve(payout.customer_tag_uid) {
            Ok(account) => account,
            Err(err) => {
                Self::mark_failed(&mut payouts, payout_id, &err);
                return Err(err);
            }
        };
        if actual != payout.customer_account {
            let err = LedgerError::StaleBinding {
                tag_uid: payout.customer_tag_uid,
                expected: payout.customer_account,
                actual,
            };
            Self::mark_failed(&mut payouts, payout_id, &err);
            return Err(err);
        }

        let tx = Transaction::new(
            TransactionKind::Payout,
            vec![
                Leg::new(payout.customer_account, -payout.amount),
                Leg::new(self.cash_exit_account, payout.amount),
            ],
            TransactionMetadata {
                cashier_id: Some(payout.cashier_id),
                till_id: Some(payout.till_id),
                description: Some(format!("payout {payout_id}")),
            },
        );

        match self.engine.submit(tx).await {
            Ok(committed) => {
                let new_balance = self
                    .engine
                    .accounts()
                    .get(payout.customer_account)
                    .await
                    .ok_or(LedgerError::AccountNotFound(payout.customer_account))?
                    .balance
                    .value();
                let stored = payouts
                    .get_mut(&payout_id)
                    .ok_or(LedgerError::PayoutNotFound(payout_id))?;
                stored.state = PayoutState::Completed;
                stored.new_balance = new_balance;
                stored.booked_at = Some(committed.booked_at);
                info!(payout = %payout_id, seq = committed.seq, "payout completed");
                Ok(stored.clone())
            }
            Err(err) => {
                Self::mark_failed(&mut payouts, payout_id, &err);
                Err(err)
            }
        }
    }

    pub async fn get(&self, payout_id: Uuid) -> Option<Payout> {
        let payouts = self.payouts.read().await;
        payouts.get(&payout_id).cloned()
    }

    fn mark_failed(payouts: &mut HashMap<Uuid, Payout>, payout_id: Uuid, err: &LedgerError) {
        if let Some(stored) = payouts.get_mut(&payout_id) {
            stored.state = PayoutState::Failed {
                reason: err.to_string(),
            };
            warn!(payout = %payout_id, reason = %err, "payout failed");
        }
    }
}
