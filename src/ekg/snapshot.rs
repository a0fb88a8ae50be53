use std::collections::HashSet;

use super::fetch::normalize_snapshot;
use super::types::{EventRecord, GraphSnapshot, Node, NodeGroup};

impl GraphSnapshot {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn entity_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| node.group == NodeGroup::Entity)
            .count()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    /// Projects every event node into its view record, preserving snapshot
    /// order. Nodes without a date project an empty one.
    pub fn events(&self) -> Vec<EventRecord> {
        self.nodes
            .iter()
            .filter(|node| node.is_event())
            .filter_map(|node| {
                let attrs = node.event_attrs()?;
                Some(EventRecord {
                    event_id: node.id.clone(),
                    label: node.label.clone(),
                    event_type: node.node_type.clone(),
                    date: attrs.date,
                    severity: attrs.severity,
                    description: attrs.description,
                    actors: attrs.actors,
                    targets: attrs.targets,
                })
            })
            .collect()
    }

    /// Merges a neighborhood fragment into this snapshot: nodes and edges
    /// are unioned by id, and the edge invariants re-enforced afterwards.
    pub fn merge(&mut self, fragment: GraphSnapshot) {
        let known_nodes = self
            .nodes
            .iter()
            .map(|node| node.id.clone())
            .collect::<HashSet<_>>();
        for node in fragment.nodes {
            if !known_nodes.contains(&node.id) {
                self.nodes.push(node);
            }
        }

        let known_edges = self
            .edges
            .iter()
            .map(|edge| edge.id.clone())
            .collect::<HashSet<_>>();
        for edge in fragment.edges {
            if !known_edges.contains(&edge.id) {
                self.edges.push(edge);
            }
        }

        let merged = normalize_snapshot(std::mem::take(self));
        *self = merged;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ekg::Edge;
    use serde_json::{Map, json};

    fn node(id: &str, group: NodeGroup, data: serde_json::Value) -> Node {
        Node {
            id: id.to_owned(),
            label: format!("label {id}"),
            node_type: "type_a".to_owned(),
            group,
            data: data.as_object().cloned().unwrap_or_default(),
        }
    }

    fn edge(id: &str, source: &str, target: &str) -> Edge {
        Edge {
            id: id.to_owned(),
            source: source.to_owned(),
            target: target.to_owned(),
            edge_type: "involves".to_owned(),
            strength: None,
            properties: Map::new(),
        }
    }

    #[test]
    fn event_projection_preserves_snapshot_order() {
        let snapshot = GraphSnapshot {
            nodes: vec![
                node("ev-b", NodeGroup::Event, json!({"date": "2022-01-01"})),
                node("en-1", NodeGroup::Entity, json!({})),
                node("ev-a", NodeGroup::Event, json!({"date": "2020-01-01"})),
            ],
            edges: Vec::new(),
        };

        let events = snapshot.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_id, "ev-b");
        assert_eq!(events[1].event_id, "ev-a");
        assert_eq!(events[1].date, "2020-01-01");
    }

    #[test]
    fn undated_event_projects_empty_date() {
        let snapshot = GraphSnapshot {
            nodes: vec![node("ev-x", NodeGroup::Event, json!({}))],
            edges: Vec::new(),
        };
        assert_eq!(snapshot.events()[0].date, "");
    }

    #[test]
    fn merge_unions_without_duplicates_and_drops_dangling() {
        let mut snapshot = GraphSnapshot {
            nodes: vec![
                node("a", NodeGroup::Entity, json!({})),
                node("b", NodeGroup::Event, json!({})),
            ],
            edges: vec![edge("a-b", "a", "b")],
        };

        let fragment = GraphSnapshot {
            nodes: vec![
                node("b", NodeGroup::Event, json!({})),
                node("c", NodeGroup::Entity, json!({})),
            ],
            edges: vec![edge("b-c", "b", "c"), edge("c-ghost", "c", "ghost")],
        };

        snapshot.merge(fragment);
        assert_eq!(snapshot.node_count(), 3);
        assert_eq!(snapshot.edge_count(), 2);
        assert!(snapshot.edges.iter().all(|edge| edge.id != "c-ghost"));
    }
}
