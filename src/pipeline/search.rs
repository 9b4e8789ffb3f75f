use crate::domain::Event;

/// Case-insensitive substring search over event type, source agent name
/// and the serialized payload. An empty term keeps every event.
pub fn search<'a>(events: &'a [Event], term: &str) -> Vec<&'a Event> {
    if term.is_empty() {
        return events.iter().collect();
    }

    let needle = term.to_lowercase();
    events
        .iter()
        .filter(|event| matches_term(event, &needle))
        .collect()
}

fn matches_term(event: &Event, needle: &str) -> bool {
    if event.event_type.as_str().to_lowercase().contains(needle) {
        return true;
    }
    if let Some(name) = event.source_name() {
        if name.to_lowercase().contains(needle) {
            return true;
        }
    }
    event
        .event_data
        .to_compact()
        .to_lowercase()
        .contains(needle)
}
