//! As-of query parameters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reconstruct what the system believed at `knowledge_time`.
///
/// With `valid_time` set, only rows valid at that instant are returned.
/// Without it, every row visible at `knowledge_time` is returned, which may
/// include several valid-time intervals per key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AsOfQuery {
    pub knowledge_time: DateTime<Utc>,
    pub valid_time: Option<DateTime<Utc>>,
    /// Restrict to these business keys.
    pub security_ids: Option<Vec<String>>,
}

impl AsOfQuery {
    pub fn at(knowledge_time: DateTime<Utc>) -> Self {
        Self {
            knowledge_time,
            valid_time: None,
            security_ids: None,
        }
    }

    pub fn valid_at(mut self, valid_time: DateTime<Utc>) -> Self {
        self.valid_time = Some(valid_time);
        self
    }

    pub fn for_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.security_ids = Some(keys.into_iter().map(Into::into).collect());
        self
    }
}
