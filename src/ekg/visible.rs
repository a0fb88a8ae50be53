use std::collections::HashSet;

use super::types::{Edge, GraphSnapshot, Node};

/// The subgraph that survives event filtering: all non-event nodes, plus
/// event nodes whose id is in the visible set, plus every edge whose two
/// endpoints both survive. Never produces a dangling edge.
pub fn visible_subgraph<'a>(
    snapshot: &'a GraphSnapshot,
    visible_event_ids: &HashSet<String>,
) -> (Vec<&'a Node>, Vec<&'a Edge>) {
    let nodes = snapshot
        .nodes
        .iter()
        .filter(|node| !node.is_event() || visible_event_ids.contains(&node.id))
        .collect::<Vec<_>>();

    let node_ids = nodes
        .iter()
        .map(|node| node.id.as_str())
        .collect::<HashSet<_>>();

    let edges = snapshot
        .edges
        .iter()
        .filter(|edge| {
            node_ids.contains(edge.source.as_str()) && node_ids.contains(edge.target.as_str())
        })
        .collect::<Vec<_>>();

    (nodes, edges)
}
