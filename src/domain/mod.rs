//! Domain layer: the value objects and entities of the ledger.
//!
//! Money is always `rust_decimal::Decimal`; balances mutate only through
//! committed transactions, and the full account-type pairing rules live
//! in one lookup table on `TransactionKind`.

pub mod account;
pub mod payout;
pub mod ports;
pub mod tag;
pub mod transaction;
