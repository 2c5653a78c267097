use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::account::AccountId;
use crate::domain::tag::TagUid;

/// Payout lifecycle. `Completed` and `Failed` are terminal; a failed
/// payout is re-created, never retried in place, so every payout record
/// documents exactly one decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum PayoutState {
    Pending,
    Completed,
    Failed { reason: String },
}

impl PayoutState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PayoutState::Pending)
    }
}

/// A cash payout to a customer, tracked from creation to its terminal
/// state. Creating a payout reserves no funds; only completion books
/// the underlying transaction and finalizes `new_balance`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payout {
    pub id: Uuid,
    pub customer_tag_uid: TagUid,
    pub customer_account: AccountId,
    pub amount: Decimal,
    pub old_balance: Decimal,
    /// Preview (`old_balance - amount`) while pending, actual
    /// post-transaction balance once completed.
    pub new_balance: Decimal,
    pub cashier_id: u64,
    pub till_id: u64,
    pub state: PayoutState,
    pub booked_at: Option<DateTime<Utc>>,
}
