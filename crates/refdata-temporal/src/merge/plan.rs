//! Pure merge planning.

use chrono::{DateTime, Utc};

use refdata_core::models::{Attributes, Fact, MergeCase, NewTimelineRow, TimelineRow};

/// Row-level effect of merging one fact.
///
/// Every id in `supersede` gets `knowledge_to = knowledge_time`; every row
/// in `insert` is written with `knowledge_from = knowledge_time` and open
/// knowledge. Valid intervals of the inserted rows tile exactly what the
/// superseded rows covered, plus the gap a `GapFill` claims.
#[derive(Debug, Clone, PartialEq)]
pub struct MergePlan {
    pub case: MergeCase,
    pub supersede: Vec<i64>,
    pub insert: Vec<NewTimelineRow>,
}

impl MergePlan {
    fn noop() -> Self {
        Self {
            case: MergeCase::NoOp,
            supersede: Vec::new(),
            insert: Vec::new(),
        }
    }
}

/// Plan the merge of `fact` against `current`, the key's rows with open
/// knowledge sorted by `valid_from`.
pub fn plan_merge(current: &[TimelineRow], fact: &Fact, knowledge_time: DateTime<Utc>) -> MergePlan {
    let event_time = fact.event_time();
    let segment = |attributes: &Attributes,
                   source_event_time: DateTime<Utc>,
                   valid_from: DateTime<Utc>,
                   valid_to: Option<DateTime<Utc>>| NewTimelineRow {
        security_id: fact.security_id().to_string(),
        attributes: attributes.clone(),
        event_time: source_event_time,
        valid_from,
        valid_to,
        knowledge_from: knowledge_time,
    };

    if current.is_empty() {
        return MergePlan {
            case: MergeCase::Insert,
            supersede: Vec::new(),
            insert: vec![segment(fact.attributes(), event_time, event_time, None)],
        };
    }

    // Exact lower-boundary hit: restatement of an existing interval.
    if let Some(existing) = current.iter().find(|row| row.valid_from == event_time) {
        if existing.attributes == *fact.attributes() {
            return MergePlan::noop();
        }
        return MergePlan {
            case: MergeCase::Correction,
            supersede: vec![existing.row_id],
            insert: vec![segment(
                fact.attributes(),
                event_time,
                event_time,
                existing.valid_to,
            )],
        };
    }

    let enclosing = current.iter().find(|row| row.covers_valid(event_time));
    if let Some(enclosing) = enclosing {
        // Keep the old payload for [valid_from, event) and start the new
        // payload at the event, up to wherever the old interval ended.
        let case = if enclosing.valid_to.is_none() {
            MergeCase::Append
        } else {
            MergeCase::Split
        };
        return MergePlan {
            case,
            supersede: vec![enclosing.row_id],
            insert: vec![
                segment(
                    &enclosing.attributes,
                    enclosing.event_time,
                    enclosing.valid_from,
                    Some(event_time),
                ),
                segment(fact.attributes(), event_time, event_time, enclosing.valid_to),
            ],
        };
    }

    // Uncovered instant: before the first interval, or in a gap between two.
    let next = current.iter().find(|row| row.valid_from > event_time);
    let case = if next.is_some() {
        MergeCase::GapFill
    } else {
        MergeCase::Append
    };
    MergePlan {
        case,
        supersede: Vec::new(),
        insert: vec![segment(
            fact.attributes(),
            event_time,
            event_time,
            next.map(|row| row.valid_from),
        )],
    }
}
