use std::collections::HashSet;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;

use super::http::{build_client, get_text};
use super::mock;
use super::parse::{parse_page, unwrap_envelope};
use super::types::{Entity, EventPage, EvolutionLink, GraphSnapshot, GraphStats};

/// Read-only gateway to the knowledge-graph backend. Every operation is an
/// idempotent GET; the mock variant serves a built-in dataset for offline
/// development.
pub enum Backend {
    Http { base_url: String, client: Client },
    Mock,
}

impl Backend {
    pub fn http(base_url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self::Http {
            base_url: base_url.trim_end_matches('/').to_owned(),
            client: build_client(timeout)?,
        })
    }

    pub fn mock() -> Self {
        Self::Mock
    }

    /// Where the user should look when nothing answers.
    pub fn location_hint(&self) -> String {
        match self {
            Self::Http { base_url, .. } => base_url.clone(),
            Self::Mock => "built-in mock dataset".to_owned(),
        }
    }

    fn get(&self, path: &str) -> Result<String> {
        match self {
            Self::Http { base_url, client } => get_text(client, &format!("{base_url}{path}")),
            Self::Mock => unreachable!("mock backend never issues HTTP requests"),
        }
    }

    pub fn graph_snapshot(&self, limit: usize, min_score: f32) -> Result<GraphSnapshot> {
        let snapshot = match self {
            Self::Mock => mock::graph_snapshot(),
            Self::Http { .. } => {
                let raw = self
                    .get(&format!("/api/graph?limit={limit}&min_score={min_score}"))
                    .context("failed to fetch graph snapshot")?;
                unwrap_envelope(&raw)?
            }
        };
        Ok(normalize_snapshot(snapshot))
    }

    pub fn events_page(&self, offset: usize, limit: usize) -> Result<EventPage> {
        match self {
            Self::Mock => Ok(mock::events_page(offset, limit)),
            Self::Http { .. } => {
                let raw = self
                    .get(&format!("/api/events?offset={offset}&limit={limit}"))
                    .context("failed to fetch events page")?;
                parse_page(&raw)
            }
        }
    }

    pub fn stats(&self) -> Result<GraphStats> {
        match self {
            Self::Mock => Ok(mock::stats()),
            Self::Http { .. } => {
                let raw = self.get("/api/stats").context("failed to fetch stats")?;
                unwrap_envelope(&raw)
            }
        }
    }

    pub fn entities(&self) -> Result<Vec<Entity>> {
        match self {
            Self::Mock => Ok(mock::entities()),
            Self::Http { .. } => {
                let raw = self
                    .get("/api/entities")
                    .context("failed to fetch entities")?;
                unwrap_envelope(&raw)
            }
        }
    }

    /// One node's direct neighborhood, for merging into a live snapshot.
    pub fn neighborhood(&self, node_id: &str) -> Result<GraphSnapshot> {
        let snapshot = match self {
            Self::Mock => mock::neighborhood(node_id),
            Self::Http { .. } => {
                let raw = self
                    .get(&format!("/api/graph/neighborhood/{node_id}"))
                    .with_context(|| format!("failed to fetch neighborhood of {node_id}"))?;
                unwrap_envelope(&raw)?
            }
        };
        Ok(normalize_snapshot(snapshot))
    }

    pub fn evolution_links(&self, min_score: f32) -> Result<Vec<EvolutionLink>> {
        match self {
            Self::Mock => Ok(mock::evolution_links(min_score)),
            Self::Http { .. } => {
                let raw = self
                    .get(&format!("/api/evolution/links?min_score={min_score}"))
                    .context("failed to fetch evolution links")?;
                unwrap_envelope(&raw)
            }
        }
    }
}

/// Enforces the snapshot invariants: edges without an id get a synthetic
/// `source-target` one, and edges referencing unknown nodes are dropped
/// rather than surfaced as errors.
pub(super) fn normalize_snapshot(mut snapshot: GraphSnapshot) -> GraphSnapshot {
    let known_ids = snapshot
        .nodes
        .iter()
        .map(|node| node.id.as_str())
        .collect::<HashSet<_>>();

    snapshot
        .edges
        .retain(|edge| known_ids.contains(edge.source.as_str()) && known_ids.contains(edge.target.as_str()));

    for edge in &mut snapshot.edges {
        if edge.id.is_empty() {
            edge.id = format!("{}-{}", edge.source, edge.target);
        }
    }

    snapshot
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ekg::{Edge, Node, NodeGroup};
    use serde_json::Map;

    fn node(id: &str, group: NodeGroup) -> Node {
        Node {
            id: id.to_owned(),
            label: id.to_owned(),
            node_type: "test".to_owned(),
            group,
            data: Map::new(),
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
    fn normalization_drops_dangling_edges() {
        let snapshot = GraphSnapshot {
            nodes: vec![node("a", NodeGroup::Entity), node("b", NodeGroup::Event)],
            edges: vec![edge("e1", "a", "b"), edge("e2", "a", "missing")],
        };

        let normalized = normalize_snapshot(snapshot);
        assert_eq!(normalized.edges.len(), 1);
        assert_eq!(normalized.edges[0].id, "e1");
    }

    #[test]
    fn normalization_synthesizes_missing_edge_ids() {
        let snapshot = GraphSnapshot {
            nodes: vec![node("a", NodeGroup::Entity), node("b", NodeGroup::Event)],
            edges: vec![edge("", "a", "b")],
        };

        let normalized = normalize_snapshot(snapshot);
        assert_eq!(normalized.edges[0].id, "a-b");
    }

    #[test]
    fn mock_backend_snapshot_is_well_formed() {
        let backend = Backend::mock();
        let snapshot = backend.graph_snapshot(100, 0.5).expect("mock snapshot");
        assert!(!snapshot.nodes.is_empty());

        let known = snapshot
            .nodes
            .iter()
            .map(|node| node.id.as_str())
            .collect::<HashSet<_>>();
        for edge in &snapshot.edges {
            assert!(known.contains(edge.source.as_str()));
            assert!(known.contains(edge.target.as_str()));
            assert!(!edge.id.is_empty());
        }
    }
}
