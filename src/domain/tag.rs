use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::account::AccountId;

/// Physical NFC tag identifier. Integer UID with a canonical lowercase
/// hex form used in payloads and search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagUid(pub u64);

impl TagUid {
    pub fn hex(&self) -> String {
        format!("{:x}", self.0)
    }
}

impl fmt::Display for TagUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}", self.0)
    }
}

impl From<u64> for TagUid {
    fn from(uid: u64) -> Self {
        Self(uid)
    }
}

/// The currently active tag -> account binding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TagBinding {
    pub account: AccountId,
    pub valid_from: DateTime<Utc>,
}

/// A closed historical binding. Written exactly once, when the tag is
/// rebound to a different account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagHistoryRecord {
    pub tag_uid: TagUid,
    pub account: AccountId,
    pub mapping_was_valid_until: DateTime<Utc>,
    pub comment: Option<String>,
}
