//! Pure filter derivation. Every predicate is conjunctive; the result is an
//! order-preserving projection of the input and can never fail.

use super::types::EventRecord;

/// Filter panel state: date bounds, type selection, free-text search.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterState {
    pub start_date: String,
    pub end_date: String,
    pub selected_types: Vec<String>,
    pub search: String,
}

/// The header carries its own date-range controls; both axes apply at the
/// same time, so the most restrictive bound wins.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DateRange {
    pub start_date: String,
    pub end_date: String,
}

impl DateRange {
    pub fn is_empty(&self) -> bool {
        self.start_date.is_empty() && self.end_date.is_empty()
    }

    pub fn clear(&mut self) {
        self.start_date.clear();
        self.end_date.clear();
    }
}

fn matches_search(event: &EventRecord, query_lower: &str) -> bool {
    event.label.to_lowercase().contains(query_lower)
        || event
            .description
            .as_ref()
            .is_some_and(|description| description.to_lowercase().contains(query_lower))
        || event.event_type.to_lowercase().contains(query_lower)
}

/// Applies all active predicates in order. An empty filter returns the
/// input unchanged, in the same order.
pub fn filter_events(
    events: &[EventRecord],
    filters: &FilterState,
    header_range: &DateRange,
) -> Vec<EventRecord> {
    let query_lower = filters.search.to_lowercase();

    events
        .iter()
        .filter(|event| filters.start_date.is_empty() || event.date >= filters.start_date)
        .filter(|event| filters.end_date.is_empty() || event.date <= filters.end_date)
        .filter(|event| header_range.start_date.is_empty() || event.date >= header_range.start_date)
        .filter(|event| header_range.end_date.is_empty() || event.date <= header_range.end_date)
        .filter(|event| {
            filters.selected_types.is_empty()
                || filters.selected_types.contains(&event.event_type)
        })
        .filter(|event| query_lower.is_empty() || matches_search(event, &query_lower))
        .cloned()
        .collect()
}

/// Distinct event types for populating the type-filter control, ascending
/// lexicographic, no duplicates.
pub fn distinct_event_types(events: &[EventRecord]) -> Vec<String> {
    let mut types = events
        .iter()
        .map(|event| event.event_type.clone())
        .collect::<Vec<_>>();
    types.sort();
    types.dedup();
    types
}

/// Timeline ordering: ascending by date string.
pub fn sort_by_date(events: &mut [EventRecord]) {
    events.sort_by(|a, b| a.date.cmp(&b.date));
}

/// Groups events by calendar year (the leading date component), years
/// ascending. Events keep their relative order within a year.
pub fn group_by_year(events: &[EventRecord]) -> Vec<(String, Vec<EventRecord>)> {
    let mut groups: Vec<(String, Vec<EventRecord>)> = Vec::new();
    for event in events {
        let year = event
            .date
            .split('-')
            .next()
            .unwrap_or_default()
            .to_owned();
        match groups.iter_mut().find(|(group_year, _)| group_year == &year) {
            Some((_, bucket)) => bucket.push(event.clone()),
            None => groups.push((year, vec![event.clone()])),
        }
    }
    groups.sort_by(|a, b| a.0.cmp(&b.0));
    groups
}
