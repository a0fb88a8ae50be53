mod cache;
mod fetch;
mod filter;
mod http;
mod mock;
mod parse;
mod snapshot;
mod types;
mod visible;

pub use cache::{CachedQuery, SnapshotKey, STALE_AFTER};
pub use fetch::Backend;
pub use filter::{
    DateRange, FilterState, distinct_event_types, filter_events, group_by_year, sort_by_date,
};
pub use types::{
    Edge, EdgeKind, Entity, EntityDegree, EventPage, EventRecord, EvolutionLink, GraphSnapshot,
    GraphStats, Node, NodeAttrs, NodeGroup, Severity,
};
pub use visible::visible_subgraph;
