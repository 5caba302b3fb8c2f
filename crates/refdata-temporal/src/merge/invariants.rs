//! Checks run against a key's current rows before any write.

use chrono::{DateTime, Utc};

use refdata_core::errors::{RefdataError, RefdataResult};
use refdata_core::models::TimelineRow;

/// Current rows (sorted by `valid_from`) must not overlap in valid time,
/// only the last may be open-ended, and `is_current` must match the bounds.
pub fn check_current_rows(security_id: &str, rows: &[TimelineRow]) -> RefdataResult<()> {
    for row in rows {
        if !row.is_currently_known() {
            return Err(violation(
                security_id,
                format!("row {} has closed knowledge but was loaded as current", row.row_id),
            ));
        }
        if row.is_current != row.derived_is_current() {
            return Err(violation(
                security_id,
                format!("row {} has is_current={} inconsistent with its bounds", row.row_id, row.is_current),
            ));
        }
    }

    for pair in rows.windows(2) {
        let (earlier, later) = (&pair[0], &pair[1]);
        match earlier.valid_to {
            None => {
                return Err(violation(
                    security_id,
                    format!(
                        "open-ended row {} precedes row {}",
                        earlier.row_id, later.row_id
                    ),
                ))
            }
            Some(end) if end > later.valid_from || earlier.valid_from == later.valid_from => {
                return Err(violation(
                    security_id,
                    format!(
                        "rows {} and {} overlap in valid time",
                        earlier.row_id, later.row_id
                    ),
                ))
            }
            Some(_) => {}
        }
    }
    Ok(())
}

/// Knowledge time must not precede the latest `knowledge_from` recorded
/// for the key. Equal is allowed.
pub fn check_knowledge_order(
    security_id: &str,
    latest: Option<DateTime<Utc>>,
    knowledge_time: DateTime<Utc>,
) -> RefdataResult<()> {
    match latest {
        Some(latest) if knowledge_time < latest => Err(RefdataError::KnowledgeTimeRegression {
            security_id: security_id.to_string(),
            knowledge_time,
            latest,
        }),
        _ => Ok(()),
    }
}

fn violation(security_id: &str, detail: String) -> RefdataError {
    RefdataError::InvariantViolation {
        security_id: security_id.to_string(),
        detail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use refdata_core::models::Attributes;
    use refdata_core::time::parse_ts;

    fn t(s: &str) -> DateTime<Utc> {
        parse_ts(s).unwrap()
    }

    fn row(id: i64, from: &str, to: Option<&str>) -> TimelineRow {
        TimelineRow {
            row_id: id,
            security_id: "EQ1".into(),
            attributes: Attributes::new(),
            event_time: t(from),
            valid_from: t(from),
            valid_to: to.map(t),
            knowledge_from: t("2025-01-01"),
            knowledge_to: None,
            is_current: to.is_none(),
        }
    }

    #[test]
    fn contiguous_rows_pass() {
        let rows = [
            row(1, "2025-01-01", Some("2025-02-01")),
            row(2, "2025-02-01", Some("2025-03-01")),
            row(3, "2025-04-01", None),
        ];
        assert!(check_current_rows("EQ1", &rows).is_ok());
    }

    #[test]
    fn overlap_is_rejected() {
        let rows = [
            row(1, "2025-01-01", Some("2025-02-15")),
            row(2, "2025-02-01", None),
        ];
        let err = check_current_rows("EQ1", &rows).unwrap_err();
        assert_eq!(err.error_code(), "INVARIANT_VIOLATION");
    }

    #[test]
    fn open_row_must_be_last() {
        let rows = [row(1, "2025-01-01", None), row(2, "2025-02-01", None)];
        assert!(check_current_rows("EQ1", &rows).is_err());
    }

    #[test]
    fn stale_is_current_flag_is_rejected() {
        let mut stale = row(1, "2025-01-01", Some("2025-02-01"));
        stale.is_current = true;
        assert!(check_current_rows("EQ1", &[stale]).is_err());
    }

    #[test]
    fn knowledge_may_repeat_but_not_regress() {
        let latest = Some(t("2025-02-01"));
        assert!(check_knowledge_order("EQ1", None, t("2020-01-01")).is_ok());
        assert!(check_knowledge_order("EQ1", latest, t("2025-02-01")).is_ok());
        let err = check_knowledge_order("EQ1", latest, t("2025-01-01")).unwrap_err();
        assert_eq!(err.error_code(), "KNOWLEDGE_TIME_REGRESSION");
    }
}
