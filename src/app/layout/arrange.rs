//! Closed-form layouts: concentric, grid, and hierarchical. Each computes a
//! target position per node; the engine animates the graph toward those
//! targets instead of teleporting.

use std::collections::{HashMap, VecDeque};
use std::f32::consts::TAU;

use eframe::egui::{Pos2, pos2};

use crate::app::graph::RenderGraph;
use crate::ekg::{EdgeKind, NodeGroup};

const RING_SPACING: f32 = 140.0;
const GRID_SPACING: f32 = 120.0;
const LEVEL_SPACING: f32 = 150.0;
const SIBLING_SPACING: f32 = 130.0;

/// Display order shared by the concentric and grid layouts: events before
/// entities, alphabetical by label within each block.
fn display_order(graph: &RenderGraph) -> Vec<usize> {
    let mut order: Vec<usize> = (0..graph.nodes.len()).collect();
    order.sort_by(|&a, &b| {
        let na = &graph.nodes[a];
        let nb = &graph.nodes[b];
        let rank = |group: NodeGroup| match group {
            NodeGroup::Event | NodeGroup::Risk => 0,
            NodeGroup::Entity => 1,
        };
        rank(na.group)
            .cmp(&rank(nb.group))
            .then_with(|| na.label.cmp(&nb.label))
    });
    order
}

/// Concentric rings growing outward in display order, starting at the top
/// of each ring and proceeding clockwise. Ring capacity grows with the
/// circumference so spacing stays roughly constant.
pub(crate) fn concentric(graph: &RenderGraph) -> Vec<Pos2> {
    let order = display_order(graph);
    let mut targets = vec![pos2(0.0, 0.0); graph.nodes.len()];

    let mut placed = 0usize;
    let mut ring = 0usize;
    while placed < order.len() {
        let capacity = if ring == 0 { 1 } else { ring * 6 };
        let radius = ring as f32 * RING_SPACING;
        let count = capacity.min(order.len() - placed);
        for slot in 0..count {
            let angle = TAU * slot as f32 / count as f32 - TAU / 4.0;
            targets[order[placed + slot]] =
                pos2(radius * angle.cos(), radius * angle.sin());
        }
        placed += count;
        ring += 1;
    }
    targets
}

/// Square-ish grid filled row by row in display order, centered on the
/// origin.
pub(crate) fn grid(graph: &RenderGraph) -> Vec<Pos2> {
    let order = display_order(graph);
    let n = order.len();
    let mut targets = vec![pos2(0.0, 0.0); graph.nodes.len()];
    if n == 0 {
        return targets;
    }

    let columns = (n as f32).sqrt().ceil() as usize;
    let rows = n.div_ceil(columns);
    let origin_x = (columns.saturating_sub(1)) as f32 * GRID_SPACING / 2.0;
    let origin_y = (rows.saturating_sub(1)) as f32 * GRID_SPACING / 2.0;

    for (slot, &index) in order.iter().enumerate() {
        let col = slot % columns;
        let row = slot / columns;
        targets[index] = pos2(
            col as f32 * GRID_SPACING - origin_x,
            row as f32 * GRID_SPACING - origin_y,
        );
    }
    targets
}

/// Levels assigned by breadth-first traversal along `evolves_to` edges.
/// Roots are nodes with no incoming evolution edge; if every node has one
/// (a cycle), the earliest-dated event breaks the tie. Nodes unreachable
/// from any root land on level zero.
pub(crate) fn hierarchical(graph: &RenderGraph) -> Vec<Pos2> {
    let n = graph.nodes.len();
    let mut targets = vec![pos2(0.0, 0.0); n];
    if n == 0 {
        return targets;
    }

    let mut incoming = vec![0usize; n];
    let mut successors: Vec<Vec<usize>> = vec![Vec::new(); n];
    for edge in &graph.edges {
        if edge.kind == EdgeKind::EvolvesTo {
            incoming[edge.target] += 1;
            successors[edge.source].push(edge.target);
        }
    }

    let mut roots: Vec<usize> = (0..n).filter(|&i| incoming[i] == 0).collect();
    if roots.is_empty() {
        // Dates sort lexically; undated nodes sort last via the empty-date
        // flag so a dated event always wins the tie.
        let earliest = (0..n).min_by_key(|&i| {
            let node = &graph.nodes[i];
            (node.date.is_empty(), node.date.as_str(), node.label.as_str())
        });
        if let Some(root) = earliest {
            roots.push(root);
        }
    }

    let mut level = vec![usize::MAX; n];
    let mut queue = VecDeque::new();
    for &root in &roots {
        level[root] = 0;
        queue.push_back(root);
    }
    while let Some(current) = queue.pop_front() {
        for &next in &successors[current] {
            if level[next] == usize::MAX {
                level[next] = level[current] + 1;
                queue.push_back(next);
            }
        }
    }
    for l in &mut level {
        if *l == usize::MAX {
            *l = 0;
        }
    }

    let mut by_level: HashMap<usize, Vec<usize>> = HashMap::new();
    for (index, &l) in level.iter().enumerate() {
        by_level.entry(l).or_default().push(index);
    }

    let depth = by_level.keys().copied().max().unwrap_or(0);
    let origin_y = depth as f32 * LEVEL_SPACING / 2.0;
    for (l, mut members) in by_level {
        members.sort_by(|&a, &b| graph.nodes[a].label.cmp(&graph.nodes[b].label));
        let origin_x = (members.len().saturating_sub(1)) as f32 * SIBLING_SPACING / 2.0;
        for (slot, &index) in members.iter().enumerate() {
            targets[index] = pos2(
                slot as f32 * SIBLING_SPACING - origin_x,
                l as f32 * LEVEL_SPACING - origin_y,
            );
        }
    }
    targets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ekg::{Edge, Node};
    use serde_json::Map;

    fn node(id: &str, label: &str, group: &str) -> Node {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "label": label,
            "type": "test",
            "group": group
        }))
        .expect("node")
    }

    fn evolves(source: &str, target: &str) -> Edge {
        Edge {
            id: format!("{source}-{target}"),
            source: source.into(),
            target: target.into(),
            edge_type: "evolves_to".into(),
            strength: None,
            properties: Map::new(),
        }
    }

    fn graph(nodes: &[&Node], edges: &[&Edge]) -> RenderGraph {
        RenderGraph::build(nodes, edges, &RenderGraph::default())
    }

    #[test]
    fn display_order_puts_events_before_entities_alphabetically() {
        let zebra = node("z", "Zebra Corp", "entity");
        let beta = node("b", "Beta event", "event");
        let alpha = node("a", "Alpha event", "event");
        let g = graph(&[&zebra, &beta, &alpha], &[]);

        let order = display_order(&g);
        let labels: Vec<&str> = order.iter().map(|&i| g.nodes[i].label.as_str()).collect();
        assert_eq!(labels, vec!["Alpha event", "Beta event", "Zebra Corp"]);
    }

    #[test]
    fn grid_targets_are_distinct_and_centered() {
        let nodes: Vec<Node> = (0..5)
            .map(|i| node(&format!("n{i}"), &format!("Event {i}"), "event"))
            .collect();
        let refs: Vec<&Node> = nodes.iter().collect();
        let g = graph(&refs, &[]);

        let targets = grid(&g);
        for i in 0..targets.len() {
            for j in (i + 1)..targets.len() {
                assert_ne!(targets[i], targets[j]);
            }
        }
        let centroid = targets
            .iter()
            .fold(eframe::egui::vec2(0.0, 0.0), |acc, p| acc + p.to_vec2())
            / targets.len() as f32;
        assert!(centroid.length() < GRID_SPACING);
    }

    #[test]
    fn concentric_places_first_node_at_the_center() {
        let a = node("a", "Alpha event", "event");
        let b = node("b", "Beta event", "event");
        let g = graph(&[&a, &b], &[]);

        let targets = concentric(&g);
        let center = g.index_of("a").unwrap();
        assert_eq!(targets[center], pos2(0.0, 0.0));
        assert!(targets[g.index_of("b").unwrap()].to_vec2().length() > 1.0);
    }

    #[test]
    fn hierarchy_levels_follow_evolution_edges() {
        let a = node("a", "Origin", "event");
        let b = node("b", "Middle", "event");
        let c = node("c", "Latest", "event");
        let e1 = evolves("a", "b");
        let e2 = evolves("b", "c");
        let g = graph(&[&a, &b, &c], &[&e1, &e2]);

        let targets = hierarchical(&g);
        let ya = targets[g.index_of("a").unwrap()].y;
        let yb = targets[g.index_of("b").unwrap()].y;
        let yc = targets[g.index_of("c").unwrap()].y;
        assert!(ya < yb && yb < yc);
    }

    #[test]
    fn hierarchy_with_a_cycle_still_places_every_node() {
        let a = node("a", "First", "event");
        let b = node("b", "Second", "event");
        let e1 = evolves("a", "b");
        let e2 = evolves("b", "a");
        let g = graph(&[&a, &b], &[&e1, &e2]);

        let targets = hierarchical(&g);
        assert_eq!(targets.len(), 2);
        assert_ne!(targets[0], targets[1]);
    }
}
