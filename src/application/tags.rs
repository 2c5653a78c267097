use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::domain::account::AccountId;
use crate::domain::tag::{TagBinding, TagHistoryRecord, TagUid};
use crate::error::{LedgerError, Result};

/// Outcome of a rebind request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rebind {
    Applied,
    /// The tag already maps to the requested account.
    NoChange,
}

/// Durable mapping of physical tags to accounts, plus the append-only
/// history of past bindings.
///
/// The directory has its own lock, keyed state only, and is never locked
/// together with account locks; the engine consults it strictly before
/// building a transaction. Critical sections are plain map operations,
/// so a sync `RwLock` suffices and no guard ever lives across an await.
#[derive(Default)]
pub struct TagDirectory {
    inner: RwLock<TagTable>,
}

#[derive(Default)]
struct TagTable {
    active: HashMap<TagUid, TagBinding>,
    history: HashMap<TagUid, Vec<TagHistoryRecord>>,
}

impl TagDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves a tag to the account it is currently bound to.
    pub fn resolve(&self, tag_uid: TagUid) -> Result<AccountId> {
        let table = self.read();
        table
            .active
            .get(&tag_uid)
            .map(|binding| binding.account)
            .ok_or(LedgerError::TagUnassigned(tag_uid))
    }

    pub fn active_binding(&self, tag_uid: TagUid) -> Option<TagBinding> {
        self.read().active.get(&tag_uid).copied()
    }

    /// Rebinds a tag to `account` as of `at`.
    ///
    /// A no-op if the tag already maps to `account`. Otherwise the
    /// active binding (if any) is closed by appending a history record
    /// with `mapping_was_valid_until = at`, keeping validity intervals
    /// contiguous and non-overlapping. Rebinds must be monotonic in
    /// time: an `at` before the active binding's start is rejected so
    /// history can never be rewritten retroactively.
    pub fn rebind(
        &self,
        tag_uid: TagUid,
        account: AccountId,
        at: DateTime<Utc>,
        comment: Option<String>,
    ) -> Result<Rebind> {
        let mut table = self.write();
        if let Some(current) = table.active.get(&tag_uid).copied() {
            if current.account == account {
                return Ok(Rebind::NoChange);
            }
            if at < current.valid_from {
                return Err(LedgerError::OutOfOrderRebind {
                    tag_uid,
                    active_since: current.valid_from,
                    requested: at,
                });
            }
            table.history.entry(tag_uid).or_default().push(TagHistoryRecord {
                tag_uid,
                account: current.account,
                mapping_was_valid_until: at,
                comment: comment.clone(),
            });
        }
        table.active.insert(
            tag_uid,
            TagBinding {
                account,
                valid_from: at,
            },
        );
        info!(tag = %tag_uid, account, "tag rebound");
        Ok(Rebind::Applied)
    }

    /// Past bindings of a tag, oldest first.
    pub fn history(&self, tag_uid: TagUid) -> Vec<TagHistoryRecord> {
        self.read()
            .history
            .get(&tag_uid)
            .cloned()
            .unwrap_or_default()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, TagTable> {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, TagTable> {
        self.inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
