use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::ports::TransactionLog;
use crate::domain::transaction::{CommittedTransaction, Transaction, TransactionId};
use crate::error::Result;

/// In-memory append-only transaction log.
///
/// Entries are held in append order, so the vector index mirrors the
/// sequence numbers. Suitable for tests and single-run usage where
/// durability is not required.
#[derive(Default, Clone)]
pub struct InMemoryLog {
    entries: Arc<RwLock<Vec<CommittedTransaction>>>,
}

impl InMemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-loads committed entries, e.g. to model a log with prior
    /// history in tests. Sequence numbering continues after the seed.
    pub async fn seed(&self, seeded: Vec<CommittedTransaction>) {
        let mut entries = self.entries.write().await;
        *entries = seeded;
    }
}

#[async_trait]
impl TransactionLog for InMemoryLog {
    async fn append(
        &self,
        id: TransactionId,
        booked_at: DateTime<Utc>,
        tx: Transaction,
    ) -> Result<CommittedTransaction> {
        let mut entries = self.entries.write().await;
        let committed = CommittedTransaction {
            seq: entries.len() as u64 + 1,
            id,
            kind: tx.kind,
            legs: tx.legs,
            metadata: tx.metadata,
            booked_at,
        };
        entries.push(committed.clone());
        Ok(committed)
    }

    async fn entries(&self) -> Result<Vec<CommittedTransaction>> {
        let entries = self.entries.read().await;
        Ok(entries.clone())
    }

    async fn len(&self) -> Result<u64> {
        let entries = self.entries.read().await;
        Ok(entries.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::transaction::{Leg, TransactionKind, TransactionMetadata};
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn sale() -> Transaction {
        Transaction::new(
            TransactionKind::Sale,
            vec![Leg::new(1, dec!(-3)), Leg::new(2, dec!(3))],
            TransactionMetadata::default(),
        )
    }

    #[tokio::test]
    async fn append_assigns_sequence_numbers() {
        let log = InMemoryLog::new();
        let first = log.append(Uuid::new_v4(), Utc::now(), sale()).await.unwrap();
        let second = log.append(Uuid::new_v4(), Utc::now(), sale()).await.unwrap();

        assert_eq!(first.seq, 1);
        assert_eq!(second.seq, 2);
        assert_eq!(log.len().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn entries_come_back_in_sequence_order() {
        let log = InMemoryLog::new();
        for _ in 0..5 {
            log.append(Uuid::new_v4(), Utc::now(), sale()).await.unwrap();
        }
        let entries = log.entries().await.unwrap();
        let seqs: Vec<u64> = entries.iter().map(|e| e.seq).collect();
        assert_eq!(seqs, vec![1, 2, 3, 4, 5]);
    }
}
