//! Flat render-side mirror of the visible subgraph. Rebuilt whenever the
//! visible sets change; positions survive rebuilds so the picture does not
//! jump when a filter toggles.

use std::collections::HashMap;

use eframe::egui::{Pos2, Vec2, pos2, vec2};

use crate::ekg::{Edge, EdgeKind, Node, NodeGroup, Severity};
use crate::util::stable_pair;

#[derive(Clone, Debug)]
pub(crate) struct RenderNode {
    pub id: String,
    pub label: String,
    pub group: NodeGroup,
    pub severity: Option<Severity>,
    /// Event date in `YYYY-MM-DD` form; empty for entities and undated
    /// events.
    pub date: String,
    pub node_type: String,
    pub pos: Pos2,
    pub velocity: Vec2,
}

#[derive(Clone, Debug)]
pub(crate) struct RenderEdge {
    /// Indices into `RenderGraph::nodes`.
    pub source: usize,
    pub target: usize,
    pub kind: EdgeKind,
    pub strength: Option<f32>,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct RenderGraph {
    pub nodes: Vec<RenderNode>,
    pub edges: Vec<RenderEdge>,
    index_by_id: HashMap<String, usize>,
}

impl RenderGraph {
    /// Rebuilds from the visible node and edge sets. Nodes already present
    /// in `previous` keep their position and velocity; new nodes get a
    /// deterministic scatter seeded from their id so repeated runs agree.
    pub fn build(nodes: &[&Node], edges: &[&Edge], previous: &RenderGraph) -> RenderGraph {
        let mut graph = RenderGraph {
            nodes: Vec::with_capacity(nodes.len()),
            edges: Vec::with_capacity(edges.len()),
            index_by_id: HashMap::with_capacity(nodes.len()),
        };

        for node in nodes {
            let (pos, velocity) = match previous.index_of(&node.id) {
                Some(i) => (previous.nodes[i].pos, previous.nodes[i].velocity),
                None => (seed_position(&node.id), vec2(0.0, 0.0)),
            };

            let (severity, date) = node
                .event_attrs()
                .map(|attrs| (attrs.severity, attrs.date))
                .unwrap_or_default();
            graph.index_by_id.insert(node.id.clone(), graph.nodes.len());
            graph.nodes.push(RenderNode {
                id: node.id.clone(),
                label: node.label.clone(),
                group: node.group,
                severity,
                date,
                node_type: node.node_type.clone(),
                pos,
                velocity,
            });
        }

        for edge in edges {
            if let Some(source) = graph.index_of(&edge.source)
                && let Some(target) = graph.index_of(&edge.target)
            {
                graph.edges.push(RenderEdge {
                    source,
                    target,
                    kind: edge.kind(),
                    strength: edge.strength,
                });
            }
        }

        graph
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

fn seed_position(id: &str) -> Pos2 {
    let (jx, jy) = stable_pair(id);
    pos2(jx * 400.0, jy * 400.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn node(id: &str, group: NodeGroup) -> Node {
        Node {
            id: id.into(),
            label: id.to_uppercase(),
            node_type: "test".into(),
            group,
            data: Map::new(),
        }
    }

    fn edge(source: &str, target: &str, edge_type: &str) -> Edge {
        Edge {
            id: format!("{source}-{target}"),
            source: source.into(),
            target: target.into(),
            edge_type: edge_type.into(),
            strength: None,
            properties: Map::new(),
        }
    }

    #[test]
    fn rebuild_preserves_positions_of_surviving_nodes() {
        let a = node("a", NodeGroup::Entity);
        let b = node("b", NodeGroup::Event);
        let c = node("c", NodeGroup::Event);

        let mut first = RenderGraph::build(&[&a, &b], &[], &RenderGraph::default());
        first.nodes[0].pos = pos2(123.0, -45.0);

        let second = RenderGraph::build(&[&a, &c], &[], &first);
        let a_again = second.index_of("a").unwrap();
        assert_eq!(second.nodes[a_again].pos, pos2(123.0, -45.0));
        assert!(second.index_of("b").is_none());
    }

    #[test]
    fn new_nodes_get_deterministic_seeds() {
        let a = node("a", NodeGroup::Entity);
        let empty = RenderGraph::default();
        let one = RenderGraph::build(&[&a], &[], &empty);
        let two = RenderGraph::build(&[&a], &[], &empty);
        assert_eq!(one.nodes[0].pos, two.nodes[0].pos);
    }

    #[test]
    fn edges_resolve_to_indices_and_keep_their_kind() {
        let a = node("a", NodeGroup::Entity);
        let b = node("b", NodeGroup::Event);
        let e = edge("b", "a", "involves");

        let graph = RenderGraph::build(&[&a, &b], &[&e], &RenderGraph::default());
        assert_eq!(graph.edges.len(), 1);
        assert_eq!(graph.edges[0].source, graph.index_of("b").unwrap());
        assert_eq!(graph.edges[0].target, graph.index_of("a").unwrap());
        assert_eq!(graph.edges[0].kind, EdgeKind::Involves);
    }
}
