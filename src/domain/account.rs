use crate::error::LedgerError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

pub type AccountId = u64;

/// A monetary balance with currency-scale precision.
///
/// Wrapper around `rust_decimal::Decimal` so balances can never be mixed
/// up with raw deltas or floats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Balance(pub Decimal);

impl Balance {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl Add for Balance {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Balance {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl AddAssign for Balance {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Balance {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A strictly positive monetary amount, e.g. a payout or top-up request.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, LedgerError> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(LedgerError::Validation(
                "amount must be positive".to_string(),
            ))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = LedgerError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

/// Closed set of account classes.
///
/// Everything except `Private` and `Cashier` is a reservoir account: the
/// counter-party side of a real-world cash flow. Reservoirs may go
/// negative by design, e.g. `cash_topup_source` only ever loses value as
/// top-ups mint customer credit against incoming cash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    Private,
    SaleExit,
    CashEntry,
    CashExit,
    CashTopupSource,
    CashImbalance,
    CashVault,
    SumupEntry,
    SumupOnlineEntry,
    Transport,
    Cashier,
    VoucherCreate,
}

impl AccountType {
    /// Only customer accounts carry a non-negative-balance invariant.
    pub fn must_stay_non_negative(&self) -> bool {
        matches!(self, AccountType::Private)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Private => "private",
            AccountType::SaleExit => "sale_exit",
            AccountType::CashEntry => "cash_entry",
            AccountType::CashExit => "cash_exit",
            AccountType::CashTopupSource => "cash_topup_source",
            AccountType::CashImbalance => "cash_imbalance",
            AccountType::CashVault => "cash_vault",
            AccountType::SumupEntry => "sumup_entry",
            AccountType::SumupOnlineEntry => "sumup_online_entry",
            AccountType::Transport => "transport",
            AccountType::Cashier => "cashier",
            AccountType::VoucherCreate => "voucher_create",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AccountType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "private" => Ok(AccountType::Private),
            "sale_exit" => Ok(AccountType::SaleExit),
            "cash_entry" => Ok(AccountType::CashEntry),
            "cash_exit" => Ok(AccountType::CashExit),
            "cash_topup_source" => Ok(AccountType::CashTopupSource),
            "cash_imbalance" => Ok(AccountType::CashImbalance),
            "cash_vault" => Ok(AccountType::CashVault),
            "sumup_entry" => Ok(AccountType::SumupEntry),
            "sumup_online_entry" => Ok(AccountType::SumupOnlineEntry),
            "transport" => Ok(AccountType::Transport),
            "cashier" => Ok(AccountType::Cashier),
            "voucher_create" => Ok(AccountType::VoucherCreate),
            other => Err(LedgerError::Validation(format!(
                "unknown account type: {other}"
            ))),
        }
    }
}

/// An account in the ledger. Balances are only ever written by the
/// engine while it holds the account's lock and after the log append
/// succeeded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub account_type: AccountType,
    pub name: String,
    pub balance: Balance,
}

impl Account {
    pub fn new(id: AccountId, account_type: AccountType, name: impl Into<String>) -> Self {
        Self {
            id,
            account_type,
            name: name.into(),
            balance: Balance::ZERO,
        }
    }
}
