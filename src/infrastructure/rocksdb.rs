use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rocksdb::{ColumnFamilyDescriptor, DB, IteratorMode, Options};

use crate::domain::ports::TransactionLog;
use crate::domain::transaction::{CommittedTransaction, Transaction, TransactionId};
use crate::error::{LedgerError, Result};

/// Column family holding the committed transaction log.
pub const CF_LOG: &str = "transaction_log";

/// Persistent append-only transaction log backed by RocksDB.
///
/// Keys are big-endian sequence numbers, so RocksDB's key order is the
/// replay order. `Clone` shares the underlying `Arc<DB>`.
#[derive(Clone)]
pub struct RocksDbLog {
    db: Arc<DB>,
    next_seq: Arc<AtomicU64>,
}

impl RocksDbLog {
    /// Opens or creates the log at `path` and resumes sequence numbering
    /// after the highest committed entry.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_log = ColumnFamilyDescriptor::new(CF_LOG, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf_log]).map_err(storage_err)?;

        let last_seq = {
            let cf = db.cf_handle(CF_LOG).ok_or_else(missing_cf)?;
            match db.iterator_cf(cf, IteratorMode::End).next() {
                Some(item) => {
                    let (key, _) = item.map_err(storage_err)?;
                    let bytes: [u8; 8] = key.as_ref().try_into().map_err(|_| {
                        LedgerError::Storage(std::io::Error::other("malformed log key"))
                    })?;
                    u64::from_be_bytes(bytes)
                }
                None => 0,
            }
        };

        Ok(Self {
            db: Arc::new(db),
            next_seq: Arc::new(AtomicU64::new(last_seq + 1)),
        })
    }
}

#[async_trait]
impl TransactionLog for RocksDbLog {
    async fn append(
        &self,
        id: TransactionId,
        booked_at: DateTime<Utc>,
        tx: Transaction,
    ) -> Result<CommittedTransaction> {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        let committed = CommittedTransaction {
            seq,
            id,
            kind: tx.kind,
            legs: tx.legs,
            metadata: tx.metadata,
            booked_at,
        };

        let cf = self.db.cf_handle(CF_LOG).ok_or_else(missing_cf)?;
        let value = serde_json::to_vec(&committed)?;
        self.db
            .put_cf(&cf, seq.to_be_bytes(), value)
            .map_err(storage_err)?;
        Ok(committed)
    }

    async fn entries(&self) -> Result<Vec<CommittedTransaction>> {
        let cf = self.db.cf_handle(CF_LOG).ok_or_else(missing_cf)?;
        let mut entries = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item.map_err(storage_err)?;
            let committed: CommittedTransaction = serde_json::from_slice(&value)?;
            entries.push(committed);
        }
        Ok(entries)
    }

    async fn len(&self) -> Result<u64> {
        Ok(self.next_seq.load(Ordering::SeqCst) - 1)
    }
}

fn storage_err(e: rocksdb::Error) -> LedgerError {
    LedgerError::Storage(std::io::Error::other(e.to_string()))
}

fn missing_cf() -> LedgerError {
    LedgerError::Storage(std::io::Error::other(
        "transaction log column family not found",
    ))
}
