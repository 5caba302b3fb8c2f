//! Incoming facts and their normalisation from raw records.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::errors::{RefdataError, RefdataResult};
use crate::models::Attributes;
use crate::time;

/// Record field holding the business key.
pub const SECURITY_ID_FIELD: &str = "security_id";
/// Record field holding the event (valid) time.
pub const EVENT_TIME_FIELD: &str = "event_time";

/// One already-parsed observation about a business entity.
///
/// Immutable once handed to the merge engine. Construction validates the
/// business key and truncates the event time to storage precision.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fact {
    security_id: String,
    attributes: Attributes,
    event_time: DateTime<Utc>,
}

impl Fact {
    pub fn new(
        security_id: impl Into<String>,
        attributes: Attributes,
        event_time: DateTime<Utc>,
    ) -> RefdataResult<Self> {
        let security_id = security_id.into().trim().to_string();
        if security_id.is_empty() {
            return Err(RefdataError::MalformedFact {
                reason: "missing security_id".to_string(),
            });
        }
        if !time::is_storable(event_time) {
            return Err(RefdataError::MalformedFact {
                reason: format!("record {security_id:?}: event_time {event_time} outside years 0000-9999"),
            });
        }
        Ok(Self {
            security_id,
            attributes,
            event_time: time::truncate_to_micros(event_time),
        })
    }

    /// Normalise a raw record: `security_id` and `event_time` are lifted out,
    /// every other field becomes an attribute.
    pub fn from_record(record: &Map<String, Value>) -> RefdataResult<Self> {
        let security_id = match record.get(SECURITY_ID_FIELD) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Null) | None => {
                return Err(RefdataError::MalformedFact {
                    reason: "missing security_id".to_string(),
                })
            }
            Some(other) => {
                return Err(RefdataError::MalformedFact {
                    reason: format!("security_id must be a string, got {other}"),
                })
            }
        };

        let event_time = match record.get(EVENT_TIME_FIELD) {
            Some(Value::String(s)) => time::parse_ts(s),
            Some(Value::Number(n)) => match n.as_f64() {
                Some(secs) => time::from_epoch_seconds(secs),
                None => Err(RefdataError::InvalidTimestamp {
                    value: n.to_string(),
                }),
            },
            Some(Value::Null) | None => {
                return Err(RefdataError::MalformedFact {
                    reason: format!("record {security_id:?} missing event_time"),
                })
            }
            Some(other) => Err(RefdataError::InvalidTimestamp {
                value: other.to_string(),
            }),
        }
        .map_err(|e| RefdataError::MalformedFact {
            reason: format!("record {security_id:?}: {e}"),
        })?;

        let attributes = Attributes::from_pairs(
            record
                .iter()
                .filter(|(k, _)| k.as_str() != SECURITY_ID_FIELD && k.as_str() != EVENT_TIME_FIELD)
                .map(|(k, v)| (k.clone(), v.clone())),
        )?;

        Self::new(security_id, attributes, event_time)
    }

    pub fn security_id(&self) -> &str {
        &self.security_id
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn event_time(&self) -> DateTime<Utc> {
        self.event_time
    }
}
