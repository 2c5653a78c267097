use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::account::AccountId;
use crate::domain::tag::TagUid;

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors surfaced by the ledger engine and its services.
///
/// Validation and pairing errors are raised before any lock is taken, so
/// the caller can correct the request and resubmit. `LockTimeout` is the
/// only transient variant; everything else requires caller action.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("transaction legs do not sum to zero (sum = {sum})")]
    UnbalancedLegs { sum: Decimal },

    #[error("account type pairing {debit} -> {credit} is not permitted for a {kind} transaction")]
    InvalidAccountTypePairing {
        kind: &'static str,
        debit: &'static str,
        credit: &'static str,
    },

    #[error("insufficient funds on account {account}: balance {balance}, requested {requested}")]
    InsufficientFunds {
        account: AccountId,
        balance: Decimal,
        requested: Decimal,
    },

    #[error("account {0} not found")]
    AccountNotFound(AccountId),

    #[error("tag {0} is not assigned to any account")]
    TagUnassigned(TagUid),

    #[error(
        "rebind of tag {tag_uid} at {requested} predates the active binding from {active_since}"
    )]
    OutOfOrderRebind {
        tag_uid: TagUid,
        active_since: chrono::DateTime<chrono::Utc>,
        requested: chrono::DateTime<chrono::Utc>,
    },

    #[error(
        "tag {tag_uid} was rebound: payout snapshot references account {expected}, tag now resolves to {actual}"
    )]
    StaleBinding {
        tag_uid: TagUid,
        expected: AccountId,
        actual: AccountId,
    },

    #[error("could not acquire account locks within the configured timeout")]
    LockTimeout,

    #[error("payout {0} not found")]
    PayoutNotFound(Uuid),

    #[error("payout {0} is already finalized and cannot transition again")]
    PayoutFinalized(Uuid),

    #[error("replay mismatch on account {account}: live balance {live}, replayed {replayed}")]
    ReplayMismatch {
        account: AccountId,
        live: Decimal,
        replayed: Decimal,
    },

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
