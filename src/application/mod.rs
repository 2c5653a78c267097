//! Application layer: orchestration of the ledger.
//!
//! The `LedgerEngine` is the only writer of account balances and writes
//! them only after the transaction log append succeeded. Tag bindings
//! live in their own directory with independent locking, so tag and
//! account locks are never held together.

pub mod engine;
pub mod locks;
pub mod payouts;
pub mod store;
pub mod tags;
