use std::collections::BTreeMap;

use chrono::{Local, TimeZone, Timelike};

use crate::domain::{Event, EventType, Priority};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HourlyCount {
    pub hour: u32,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventStats {
    pub total: usize,
    pub processed: usize,
    pub by_type: BTreeMap<EventType, usize>,
    pub by_priority: BTreeMap<Priority, usize>,
    /// Sparse: hours without events are absent. Ascending by hour.
    pub message_frequency: Vec<HourlyCount>,
}

impl EventStats {
    /// Zero-filled 24 slot series for charts.
    pub fn hourly_series(&self) -> [u64; 24] {
        let mut series = [0u64; 24];
        for bucket in &self.message_frequency {
            if let Some(slot) = series.get_mut(bucket.hour as usize) {
                *slot = bucket.count as u64;
            }
        }
        series
    }

    pub fn pending(&self) -> usize {
        self.total - self.processed
    }
}

pub fn aggregate<'a, I>(events: I) -> EventStats
where
    I: IntoIterator<Item = &'a Event>,
{
    aggregate_in(events, &Local)
}

/// Same as [`aggregate`] with hour buckets taken in `tz`.
pub fn aggregate_in<'a, I, Tz>(events: I, tz: &Tz) -> EventStats
where
    I: IntoIterator<Item = &'a Event>,
    Tz: TimeZone,
{
    let mut stats = EventStats::default();
    let mut hours: BTreeMap<u32, usize> = BTreeMap::new();

    for event in events {
        stats.total += 1;
        if event.is_processed {
            stats.processed += 1;
        }
        *stats.by_type.entry(event.event_type.clone()).or_default() += 1;
        *stats.by_priority.entry(event.priority).or_default() += 1;

        let hour = event.created_at.with_timezone(tz).hour();
        *hours.entry(hour).or_default() += 1;
    }

    stats.message_frequency = hours
        .into_iter()
        .map(|(hour, count)| HourlyCount { hour, count })
        .collect();
    stats
}
