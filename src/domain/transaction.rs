use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::domain::account::{AccountId, AccountType};
use crate::error::{LedgerError, Result};

pub type TransactionId = Uuid;

/// Closed set of value-moving operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Sale,
    TopUp,
    Payout,
    Voucher,
    ImbalanceCorrection,
    CashierShift,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Sale => "sale",
            TransactionKind::TopUp => "top_up",
            TransactionKind::Payout => "payout",
            TransactionKind::Voucher => "voucher",
            TransactionKind::ImbalanceCorrection => "imbalance_correction",
            TransactionKind::CashierShift => "cashier_shift",
        }
    }

    /// The account-type pairing table: which (debit, credit) class pairs
    /// a transaction kind may move value between. Adding an account type
    /// or kind means editing this table, nothing else.
    pub fn permits(&self, debit: AccountType, credit: AccountType) -> bool {
        use AccountType::*;
        match self {
            TransactionKind::Sale => {
                matches!((debit, credit), (Private | Cashier, SaleExit))
            }
            TransactionKind::TopUp => matches!(
                (debit, credit),
                (CashTopupSource | SumupEntry | SumupOnlineEntry, Private)
            ),
            TransactionKind::Payout => matches!((debit, credit), (Private, CashExit)),
            TransactionKind::Voucher => matches!((debit, credit), (VoucherCreate, Private)),
            TransactionKind::ImbalanceCorrection => matches!(
                (debit, credit),
                (CashImbalance, Cashier | CashVault) | (Cashier | CashVault, CashImbalance)
            ),
            TransactionKind::CashierShift => matches!(
                (debit, credit),
                (CashEntry, Cashier)
                    | (Cashier, CashExit)
                    | (CashVault, Transport)
                    | (Transport, Cashier)
                    | (Cashier, Transport)
                    | (Transport, CashVault)
            ),
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TransactionKind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sale" => Ok(TransactionKind::Sale),
            "top_up" => Ok(TransactionKind::TopUp),
            "payout" => Ok(TransactionKind::Payout),
            "voucher" => Ok(TransactionKind::Voucher),
            "imbalance_correction" => Ok(TransactionKind::ImbalanceCorrection),
            "cashier_shift" => Ok(TransactionKind::CashierShift),
            other => Err(LedgerError::Validation(format!(
                "unknown transaction kind: {other}"
            ))),
        }
    }
}

/// One side of a double-entry booking. Negative delta debits the
/// account, positive credits it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Leg {
    pub account: AccountId,
    pub delta: Decimal,
}

impl Leg {
    pub fn new(account: AccountId, delta: Decimal) -> Self {
        Self { account, delta }
    }
}

/// Free-form booking context carried on every transaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionMetadata {
    pub cashier_id: Option<u64>,
    pub till_id: Option<u64>,
    pub description: Option<String>,
}

/// A transaction as submitted by a caller, before validation and commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub kind: TransactionKind,
    pub legs: Vec<Leg>,
    pub metadata: TransactionMetadata,
}

impl Transaction {
    pub fn new(kind: TransactionKind, legs: Vec<Leg>, metadata: TransactionMetadata) -> Self {
        Self {
            kind,
            legs,
            metadata,
        }
    }

    /// Structural validation: at least two legs, every delta non-zero,
    /// exact zero sum. No rounding tolerance; the sum is either
    /// `Decimal::ZERO` or the legs are a caller bug.
    pub fn validate_structure(&self) -> Result<()> {
        if self.legs.len() < 2 {
            return Err(LedgerError::Validation(
                "a transaction needs at least two legs".to_string(),
            ));
        }
        if self.legs.iter().any(|leg| leg.delta.is_zero()) {
            return Err(LedgerError::Validation(
                "transaction legs must have non-zero amounts".to_string(),
            ));
        }
        let sum: Decimal = self.legs.iter().map(|leg| leg.delta).sum();
        if !sum.is_zero() {
            return Err(LedgerError::UnbalancedLegs { sum });
        }
        Ok(())
    }

    /// Semantic validation against the pairing table. `types` must
    /// resolve every leg's account to its class, in leg order.
    pub fn validate_pairing(&self, types: &[AccountType]) -> Result<()> {
        debug_assert_eq!(types.len(), self.legs.len());
        let debits = self
            .legs
            .iter()
            .zip(types)
            .filter(|(leg, _)| leg.delta < Decimal::ZERO);
        for (_, debit_ty) in debits {
            let credits = self
                .legs
                .iter()
                .zip(types)
                .filter(|(leg, _)| leg.delta > Decimal::ZERO);
            for (_, credit_ty) in credits {
                if !self.kind.permits(*debit_ty, *credit_ty) {
                    return Err(LedgerError::InvalidAccountTypePairing {
                        kind: self.kind.as_str(),
                        debit: debit_ty.as_str(),
                        credit: credit_ty.as_str(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// An immutable, committed transaction as recorded in the durable log.
///
/// `seq` is assigned by the log and is strictly monotonically
/// increasing; replaying all committed transactions in `seq` order from
/// empty state reproduces every live balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommittedTransaction {
    pub seq: u64,
    pub id: TransactionId,
    pub kind: TransactionKind,
    pub legs: Vec<Leg>,
    pub metadata: TransactionMetadata,
    pub booked_at: DateTime<Utc>,
}
