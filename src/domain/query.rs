use chrono::{DateTime, TimeDelta, Utc};

use super::{Event, EventType, Priority};

/// Server-side filter for a fetch. Every field left as `None` is not
/// constrained.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventQuery {
    pub event_type: Option<EventType>,
    pub priority: Option<Priority>,
    pub processed: Option<bool>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
}

impl EventQuery {
    /// Whether a pushed event belongs in a list fetched with this query.
    /// `limit` is not considered.
    pub fn matches(&self, event: &Event) -> bool {
        if let Some(ref ty) = self.event_type {
            if &event.event_type != ty {
                return false;
            }
        }
        if let Some(priority) = self.priority {
            if event.priority != priority {
                return false;
            }
        }
        if let Some(processed) = self.processed {
            if event.is_processed != processed {
                return false;
            }
        }
        if let Some(start) = self.start {
            if event.created_at < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if event.created_at > end {
                return false;
            }
        }
        true
    }
}

/// Start of a window reaching `hours` back from `now`, or `None` when that
/// falls outside the representable time range.
pub fn window_start(now: DateTime<Utc>, hours: u64) -> Option<DateTime<Utc>> {
    let hours = i64::try_from(hours).ok()?;
    now.checked_sub_signed(TimeDelta::try_hours(hours)?)
}
