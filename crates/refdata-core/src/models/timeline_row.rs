//! Persisted bi-temporal rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Attributes;

/// One version of one business entity on both time axes.
///
/// `valid_to` / `knowledge_to` of `None` mean open. Both upper bounds are
/// exclusive. `is_current` is derived: true iff both bounds are open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineRow {
    pub row_id: i64,
    pub security_id: String,
    pub attributes: Attributes,
    pub event_time: DateTime<Utc>,
    pub valid_from: DateTime<Utc>,
    pub valid_to: Option<DateTime<Utc>>,
    pub knowledge_from: DateTime<Utc>,
    pub knowledge_to: Option<DateTime<Utc>>,
    pub is_current: bool,
}

impl TimelineRow {
    /// Still part of what the system currently believes.
    pub fn is_currently_known(&self) -> bool {
        self.knowledge_to.is_none()
    }

    /// `valid_from <= t < valid_to` (open `valid_to` is unbounded).
    pub fn covers_valid(&self, t: DateTime<Utc>) -> bool {
        self.valid_from <= t && self.valid_to.map_or(true, |end| t < end)
    }

    /// `knowledge_from <= t < knowledge_to` (open `knowledge_to` is unbounded).
    pub fn known_at(&self, t: DateTime<Utc>) -> bool {
        self.knowledge_from <= t && self.knowledge_to.map_or(true, |end| t < end)
    }

    /// Value of `is_current` implied by the two upper bounds.
    pub fn derived_is_current(&self) -> bool {
        self.valid_to.is_none() && self.knowledge_to.is_none()
    }
}

/// A row about to be inserted. Knowledge is always open on insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTimelineRow {
    pub security_id: String,
    pub attributes: Attributes,
    pub event_time: DateTime<Utc>,
    pub valid_from: DateTime<Utc>,
    pub valid_to: Option<DateTime<Utc>>,
    pub knowledge_from: DateTime<Utc>,
}

impl NewTimelineRow {
    /// `is_current` at insert time: knowledge is open, so only `valid_to` decides.
    pub fn is_current(&self) -> bool {
        self.valid_to.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::parse_ts;

    fn row(valid_from: &str, valid_to: Option<&str>) -> TimelineRow {
        TimelineRow {
            row_id: 1,
            security_id: "EQ1".into(),
            attributes: Attributes::new(),
            event_time: parse_ts(valid_from).unwrap(),
            valid_from: parse_ts(valid_from).unwrap(),
            valid_to: valid_to.map(|v| parse_ts(v).unwrap()),
            knowledge_from: parse_ts("2025-01-10").unwrap(),
            knowledge_to: None,
            is_current: valid_to.is_none(),
        }
    }

    #[test]
    fn valid_interval_is_half_open() {
        let r = row("2025-01-01", Some("2025-02-01"));
        assert!(r.covers_valid(parse_ts("2025-01-01").unwrap()));
        assert!(r.covers_valid(parse_ts("2025-01-31T23:59:59Z").unwrap()));
        assert!(!r.covers_valid(parse_ts("2025-02-01").unwrap()));
        assert!(!r.covers_valid(parse_ts("2024-12-31").unwrap()));
    }

    #[test]
    fn open_bounds_are_unbounded() {
        let r = row("2025-01-01", None);
        assert!(r.covers_valid(parse_ts("2099-01-01").unwrap()));
        assert!(r.known_at(parse_ts("2099-01-01").unwrap()));
        assert!(!r.known_at(parse_ts("2025-01-09").unwrap()));
        assert!(r.derived_is_current());
    }
}
