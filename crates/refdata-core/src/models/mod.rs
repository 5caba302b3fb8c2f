mod attributes;
mod fact;
mod merge_outcome;
mod temporal_query;
mod timeline_row;

pub use attributes::Attributes;
pub use fact::{Fact, EVENT_TIME_FIELD, SECURITY_ID_FIELD};
pub use merge_outcome::{MergeCase, MergeOutcome, MergeSummary, RejectedRecord};
pub use temporal_query::AsOfQuery;
pub use timeline_row::{NewTimelineRow, TimelineRow};
