//! Decides whether a fact's event time may be merged.

use chrono::{DateTime, Utc};

use refdata_core::errors::{RefdataError, RefdataResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    Reject,
}

/// Stateless gate; the watermark itself lives in the Timeline Store and is
/// read inside the merge transaction.
pub struct WatermarkGate;

impl WatermarkGate {
    /// - no watermark yet → Allow
    /// - `event_time >= watermark` → Allow
    /// - below watermark → Allow only with `allow_late`
    pub fn check(
        watermark: Option<DateTime<Utc>>,
        event_time: DateTime<Utc>,
        allow_late: bool,
    ) -> GateDecision {
        match watermark {
            None => GateDecision::Allow,
            Some(mark) if event_time >= mark => GateDecision::Allow,
            Some(_) if allow_late => GateDecision::Allow,
            Some(_) => GateDecision::Reject,
        }
    }

    /// `check`, mapping `Reject` to `WatermarkViolation`.
    pub fn enforce(
        security_id: &str,
        watermark: Option<DateTime<Utc>>,
        event_time: DateTime<Utc>,
        allow_late: bool,
    ) -> RefdataResult<()> {
        match (Self::check(watermark, event_time, allow_late), watermark) {
            (GateDecision::Reject, Some(watermark)) => Err(RefdataError::WatermarkViolation {
                security_id: security_id.to_string(),
                event_time,
                watermark,
            }),
            _ => Ok(()),
        }
    }
}
