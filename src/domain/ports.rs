use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::transaction::{CommittedTransaction, Transaction, TransactionId};
use crate::error::Result;

/// The durable, append-only transaction log: the system of record.
///
/// Balances and every other projection must be reconstructible by
/// replaying `entries()` in sequence order from empty state. An adapter
/// assigns the sequence number on append, strictly monotonically
/// increasing from 1. If `append` fails the in-flight transaction is
/// aborted with no balance change.
#[async_trait]
pub trait TransactionLog: Send + Sync {
    async fn append(
        &self,
        id: TransactionId,
        booked_at: DateTime<Utc>,
        tx: Transaction,
    ) -> Result<CommittedTransaction>;

    /// All committed transactions, ascending by sequence number.
    async fn entries(&self) -> Result<Vec<CommittedTransaction>>;

    async fn len(&self) -> Result<u64>;
}

pub type TransactionLogBox = Box<dyn TransactionLog>;
