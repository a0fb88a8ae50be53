//! Force-directed simulation over the render graph. One call per frame
//! while the layout is running; returns whether anything still moved so the
//! caller can stop requesting repaints once the picture settles.

use eframe::egui::{Vec2, vec2};

use super::params::{edge_spring, node_repulsion};
use crate::app::graph::RenderGraph;
use crate::ekg::NodeGroup;

const TIME_STEP: f32 = 1.0 / 60.0;
const DAMPING: f32 = 0.85;
const MAX_FORCE: f32 = 5_000.0;
const MAX_VELOCITY: f32 = 600.0;
/// Nodes slower than this are treated as asleep.
const SLEEP_SPEED: f32 = 1.2;
/// Below this separation the repulsion denominator is clamped to avoid
/// force spikes between coincident seeds.
const MIN_DISTANCE: f32 = 12.0;

pub(crate) fn step(graph: &mut RenderGraph, group_by_type: bool) -> bool {
    let n = graph.nodes.len();
    if n == 0 {
        return false;
    }

    let mut forces = vec![vec2(0.0, 0.0); n];

    // Pairwise repulsion. Node counts are bounded by the fetch limit, so
    // the quadratic pass stays cheap.
    for i in 0..n {
        for j in (i + 1)..n {
            let delta = graph.nodes[i].pos - graph.nodes[j].pos;
            let dist = delta.length().max(MIN_DISTANCE);
            let repulsion =
                node_repulsion(graph.nodes[i].group) + node_repulsion(graph.nodes[j].group);
            let push = delta / dist * (repulsion / (dist * dist));
            forces[i] += push;
            forces[j] -= push;
        }
    }

    // Spring attraction along edges.
    for edge in &graph.edges {
        let (i, j) = (edge.source, edge.target);
        let same_type_event_pair = graph.nodes[i].group == NodeGroup::Event
            && graph.nodes[j].group == NodeGroup::Event
            && graph.nodes[i].node_type == graph.nodes[j].node_type;
        let spring = edge_spring(edge.kind, same_type_event_pair, group_by_type);

        let delta = graph.nodes[j].pos - graph.nodes[i].pos;
        let dist = delta.length().max(MIN_DISTANCE);
        let stretch = dist - spring.ideal_length;
        let pull = delta / dist * (stretch * spring.elasticity * TIME_STEP);
        forces[i] += pull;
        forces[j] -= pull;
    }

    let mut any_motion = false;
    for (node, force) in graph.nodes.iter_mut().zip(forces) {
        let force = clamp_length(force, MAX_FORCE);
        node.velocity = clamp_length((node.velocity + force * TIME_STEP) * DAMPING, MAX_VELOCITY);

        if node.velocity.length() < SLEEP_SPEED {
            node.velocity = vec2(0.0, 0.0);
        } else {
            node.pos += node.velocity * TIME_STEP;
            any_motion = true;
        }
    }

    recenter(graph);
    any_motion
}

fn clamp_length(v: Vec2, max: f32) -> Vec2 {
    let len = v.length();
    if len > max { v * (max / len) } else { v }
}

/// Keeps the layout centroid at the origin so the cloud never drifts out
/// of the viewport.
fn recenter(graph: &mut RenderGraph) {
    let n = graph.nodes.len() as f32;
    let centroid = graph
        .nodes
        .iter()
        .fold(vec2(0.0, 0.0), |acc, node| acc + node.pos.to_vec2())
        / n;
    for node in &mut graph.nodes {
        node.pos -= centroid;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::graph::RenderGraph;
    use crate::ekg::{Edge, Node};
    use serde_json::Map;

    fn node(id: &str, group: &str) -> Node {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "label": id,
            "type": "test",
            "group": group
        }))
        .expect("node")
    }

    fn involves(source: &str, target: &str) -> Edge {
        Edge {
            id: format!("{source}-{target}"),
            source: source.into(),
            target: target.into(),
            edge_type: "involves".into(),
            strength: None,
            properties: Map::new(),
        }
    }

    #[test]
    fn coincident_nodes_are_pushed_apart() {
        let a = node("a", "event");
        let b = node("b", "event");
        let mut graph = RenderGraph::build(&[&a, &b], &[], &RenderGraph::default());
        graph.nodes[0].pos = eframe::egui::pos2(0.0, 0.0);
        graph.nodes[1].pos = eframe::egui::pos2(1.0, 0.0);

        for _ in 0..30 {
            step(&mut graph, false);
        }
        let separation = (graph.nodes[0].pos - graph.nodes[1].pos).length();
        assert!(separation > 1.0);
    }

    #[test]
    fn springs_keep_connected_nodes_from_flying_apart() {
        let a = node("a", "entity");
        let b = node("b", "event");
        let e = involves("b", "a");
        let mut graph = RenderGraph::build(&[&a, &b], &[&e], &RenderGraph::default());

        for _ in 0..600 {
            if !step(&mut graph, false) {
                break;
            }
        }
        let separation = (graph.nodes[0].pos - graph.nodes[1].pos).length();
        assert!(separation < 400.0, "separation was {separation}");
    }

    #[test]
    fn centroid_stays_at_the_origin() {
        let a = node("a", "event");
        let b = node("b", "event");
        let c = node("c", "entity");
        let mut graph = RenderGraph::build(&[&a, &b, &c], &[], &RenderGraph::default());

        step(&mut graph, false);
        let centroid = graph
            .nodes
            .iter()
            .fold(vec2(0.0, 0.0), |acc, n| acc + n.pos.to_vec2())
            / 3.0;
        assert!(centroid.length() < 1e-3);
    }

    #[test]
    fn empty_graph_reports_no_motion() {
        let mut graph = RenderGraph::default();
        assert!(!step(&mut graph, false));
    }
}
