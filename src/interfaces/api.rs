use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::engine::LedgerEngine;
use crate::application::payouts::PayoutService;
use crate::application::tags::TagDirectory;
use crate::domain::account::{AccountId, Amount};
use crate::domain::payout::Payout;
use crate::domain::tag::TagUid;
use crate::domain::transaction::{
    Leg, Transaction, TransactionId, TransactionKind, TransactionMetadata,
};
use crate::error::{LedgerError, Result};

/// One leg of a transfer request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegRequest {
    pub account_id: AccountId,
    pub amount: Decimal,
}

/// `POST transfer` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRequest {
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub legs: Vec<LegRequest>,
    #[serde(default)]
    pub cashier_id: Option<u64>,
    #[serde(default)]
    pub till_id: Option<u64>,
    #[serde(default)]
    pub description: Option<String>,
}

/// `POST payout/create` response. `new_balance` is a preview until
/// completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingPayOut {
    pub uuid: Uuid,
    pub customer_tag_uid: u64,
    pub amount: Decimal,
    pub customer_account_id: AccountId,
    pub old_balance: Decimal,
    pub new_balance: Decimal,
}

/// `POST payout/{id}/complete` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedPayOut {
    pub uuid: Uuid,
    pub customer_tag_uid: u64,
    pub amount: Decimal,
    pub customer_account_id: AccountId,
    pub old_balance: Decimal,
    pub new_balance: Decimal,
    pub booked_at: DateTime<Utc>,
    pub cashier_id: u64,
    pub till_id: u64,
}

/// One row of `GET tag/{uid}/history`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserTagHistoryEntry {
    pub user_tag_uid: u64,
    pub account_id: AccountId,
    pub mapping_was_valid_until: DateTime<Utc>,
    pub user_tag_uid_hex: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

/// `POST cashier/account-change` payload: a float-style cash-drawer
/// adjustment for the cashier the tag resolves to. Positive amounts put
/// cash into the drawer, negative amounts take it out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashierAccountChangePayload {
    pub cashier_tag_uid: u64,
    pub amount: Decimal,
}

/// Facade mapping the logical request contracts onto the engine and
/// services. Transport and serialization framing stay with the caller.
pub struct LedgerApi {
    engine: Arc<LedgerEngine>,
    tags: Arc<TagDirectory>,
    payouts: Arc<PayoutService>,
    cash_entry_account: AccountId,
    cash_exit_account: AccountId,
}

impl LedgerApi {
    pub fn new(
        engine: Arc<LedgerEngine>,
        tags: Arc<TagDirectory>,
        payouts: Arc<PayoutService>,
        cash_entry_account: AccountId,
        cash_exit_account: AccountId,
    ) -> Self {
        Self {
            engine,
            tags,
            payouts,
            cash_entry_account,
            cash_exit_account,
        }
    }

    pub async fn transfer(&self, request: TransferRequest) -> Result<TransactionId> {
        let legs = request
            .legs
            .iter()
            .map(|leg| Leg::new(leg.account_id, leg.amount))
            .collect();
        let tx = Transaction::new(
            request.kind,
            legs,
            TransactionMetadata {
                cashier_id: request.cashier_id,
                till_id: request.till_id,
                description: request.description,
            },
        );
        let committed = self.engine.submit(tx).await?;
        Ok(committed.id)
    }

    pub async fn create_payout(
        &self,
        tag_uid: u64,
        amount: Decimal,
        cashier_id: u64,
        till_id: u64,
    ) -> Result<PendingPayOut> {
        let amount = Amount::new(amount)?;
        let payout = self
            .payouts
            .create(TagUid(tag_uid), amount, cashier_id, till_id)
            .await?;
        Ok(PendingPayOut {
            uuid: payout.id,
            customer_tag_uid: payout.customer_tag_uid.0,
            amount: payout.amount,
            customer_account_id: payout.customer_account,
            old_balance: payout.old_balance,
            new_balance: payout.new_balance,
        })
    }

    pub async fn complete_payout(&self, payout_id: Uuid) -> Result<CompletedPayOut> {
        let payout = self.payouts.complete(payout_id).await?;
        Self::completed_model(payout)
    }

    pub async fn tag_history(&self, tag_uid: u64) -> Vec<UserTagHistoryEntry> {
        self.tags
            .history(TagUid(tag_uid))
            .into_iter()
            .map(|record| UserTagHistoryEntry {
                user_tag_uid: record.tag_uid.0,
                account_id: record.account,
                mapping_was_valid_until: record.mapping_was_valid_until,
                user_tag_uid_hex: Some(record.tag_uid.hex()),
                comment: record.comment,
            })
            .collect()
    }

    /// Books a drawer adjustment for the cashier the tag resolves to:
    /// positive amounts move `cash_entry` -> cashier, negative ones
    /// cashier -> `cash_exit`.
    pub async fn cashier_account_change(
        &self,
        payload: CashierAccountChangePayload,
    ) -> Result<TransactionId> {
        if payload.amount.is_zero() {
            return Err(LedgerError::Validation(
                "cashier account change amount must be non-zero".to_string(),
            ));
        }
        let cashier = self.tags.resolve(TagUid(payload.cashier_tag_uid))?;
        let legs = if payload.amount > Decimal::ZERO {
            vec![
                Leg::new(self.cash_entry_account, -payload.amount),
                Leg::new(cashier, payload.amount),
            ]
        } else {
            vec![
                Leg::new(cashier, payload.amount),
                Leg::new(self.cash_exit_account, -payload.amount),
            ]
        };
        let tx = Transaction::new(
            TransactionKind::CashierShift,
            legs,
            TransactionMetadata {
                cashier_id: None,
                till_id: None,
                description: Some("cashier account change".to_string()),
            },
        );
        let committed = self.engine.submit(tx).await?;
        Ok(committed.id)
    }

    fn completed_model(payout: Payout) -> Result<CompletedPayOut> {
        let booked_at = payout.booked_at.ok_or_else(|| {
            LedgerError::Validation("completed payout is missing its booking time".to_string())
        })?;
        Ok(CompletedPayOut {
            uuid: payout.id,
            customer_tag_uid: payout.customer_tag_uid.0,
            amount: payout.amount,
            customer_account_id: payout.customer_account,
            old_balance: payout.old_balance,
            new_balance: payout.new_balance,
            booked_at,
            cashier_id: payout.cashier_id,
            till_id: payout.till_id,
        })
    }
}
