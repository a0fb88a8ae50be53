//! Layout engine and its lifecycle. Exactly one layout runs at a time;
//! switching modes or rebuilding the graph tears the old run down before
//! the next one starts.

mod arrange;
mod params;
mod physics;

use anyhow::{Result, bail};
use eframe::egui::Pos2;

use crate::app::graph::RenderGraph;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum LayoutMode {
    #[default]
    ForceDirected,
    Concentric,
    Grid,
    Hierarchical,
}

impl LayoutMode {
    pub const ALL: [LayoutMode; 4] = [
        LayoutMode::ForceDirected,
        LayoutMode::Concentric,
        LayoutMode::Grid,
        LayoutMode::Hierarchical,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::ForceDirected => "Force-directed",
            Self::Concentric => "Concentric",
            Self::Grid => "Grid",
            Self::Hierarchical => "Hierarchical",
        }
    }
}

/// Explicit run states. `begin` is only legal from `Uninitialized`; every
/// other transition goes through `teardown` first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum LayoutState {
    #[default]
    Uninitialized,
    Initializing,
    Ready,
    TearingDown,
}

/// Fraction of the remaining distance covered per frame when animating
/// toward closed-form targets.
const APPROACH_RATE: f32 = 0.18;
const SETTLED_DISTANCE: f32 = 0.5;

#[derive(Debug, Default)]
pub(crate) struct LayoutEngine {
    state: LayoutState,
    mode: LayoutMode,
    targets: Vec<Pos2>,
}

impl LayoutEngine {
    pub fn state(&self) -> LayoutState {
        self.state
    }

    /// Stops the current run and releases its artifacts. Safe to call from
    /// any state, including when nothing is running.
    pub fn teardown(&mut self, graph: &mut RenderGraph) {
        self.state = LayoutState::TearingDown;
        for node in &mut graph.nodes {
            node.velocity = eframe::egui::vec2(0.0, 0.0);
        }
        self.targets.clear();
        self.state = LayoutState::Uninitialized;
    }

    /// Starts a run in `mode`. The engine must be torn down first; a begin
    /// from any other state is a caller bug and is refused.
    pub fn begin(&mut self, mode: LayoutMode, graph: &RenderGraph) -> Result<()> {
        if self.state != LayoutState::Uninitialized {
            bail!("layout engine busy ({:?}), teardown required before begin", self.state);
        }

        self.state = LayoutState::Initializing;
        self.mode = mode;
        self.targets = match mode {
            LayoutMode::ForceDirected => Vec::new(),
            LayoutMode::Concentric => arrange::concentric(graph),
            LayoutMode::Grid => arrange::grid(graph),
            LayoutMode::Hierarchical => arrange::hierarchical(graph),
        };
        self.state = LayoutState::Ready;
        Ok(())
    }

    /// Convenience for the common restart path: teardown then begin.
    pub fn restart(&mut self, mode: LayoutMode, graph: &mut RenderGraph) -> Result<()> {
        self.teardown(graph);
        self.begin(mode, graph)
    }

    /// Advances the run one frame. Returns true while anything still moves
    /// so the caller knows to keep repainting. Outside `Ready` this is a
    /// no-op.
    pub fn step(&mut self, graph: &mut RenderGraph, group_by_type: bool) -> bool {
        if self.state != LayoutState::Ready {
            return false;
        }

        match self.mode {
            LayoutMode::ForceDirected => physics::step(graph, group_by_type),
            _ => self.approach_targets(graph),
        }
    }

    fn approach_targets(&self, graph: &mut RenderGraph) -> bool {
        if self.targets.len() != graph.nodes.len() {
            return false;
        }

        let mut any_motion = false;
        for (node, target) in graph.nodes.iter_mut().zip(&self.targets) {
            let delta = *target - node.pos;
            if delta.length() <= SETTLED_DISTANCE {
                node.pos = *target;
            } else {
                node.pos += delta * APPROACH_RATE;
                any_motion = true;
            }
        }
        any_motion
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ekg::Node;

    fn graph(ids: &[&str]) -> RenderGraph {
        let nodes: Vec<Node> = ids
            .iter()
            .map(|id| {
                serde_json::from_value(serde_json::json!({
                    "id": id,
                    "label": id,
                    "type": "test",
                    "group": "event"
                }))
                .expect("node")
            })
            .collect();
        let refs: Vec<&Node> = nodes.iter().collect();
        RenderGraph::build(&refs, &[], &RenderGraph::default())
    }

    #[test]
    fn begin_requires_an_uninitialized_engine() {
        let mut engine = LayoutEngine::default();
        let mut g = graph(&["a", "b"]);

        assert!(engine.begin(LayoutMode::Grid, &g).is_ok());
        assert_eq!(engine.state(), LayoutState::Ready);
        assert!(engine.begin(LayoutMode::Grid, &g).is_err());

        engine.teardown(&mut g);
        assert_eq!(engine.state(), LayoutState::Uninitialized);
        assert!(engine.begin(LayoutMode::Concentric, &g).is_ok());
    }

    #[test]
    fn teardown_is_idempotent_and_zeroes_velocities() {
        let mut engine = LayoutEngine::default();
        let mut g = graph(&["a"]);
        g.nodes[0].velocity = eframe::egui::vec2(10.0, -3.0);

        engine.teardown(&mut g);
        engine.teardown(&mut g);
        assert_eq!(engine.state(), LayoutState::Uninitialized);
        assert_eq!(g.nodes[0].velocity, eframe::egui::vec2(0.0, 0.0));
    }

    #[test]
    fn static_layouts_settle_onto_their_targets() {
        let mut engine = LayoutEngine::default();
        let mut g = graph(&["a", "b", "c", "d"]);
        engine.begin(LayoutMode::Grid, &g).expect("begin");

        let mut frames = 0;
        while engine.step(&mut g, false) {
            frames += 1;
            assert!(frames < 1_000, "grid layout never settled");
        }
        assert!(!engine.step(&mut g, false));
    }

    #[test]
    fn step_outside_ready_is_a_no_op() {
        let mut engine = LayoutEngine::default();
        let mut g = graph(&["a", "b"]);
        assert!(!engine.step(&mut g, false));
    }

    #[test]
    fn restart_switches_modes_in_one_call() {
        let mut engine = LayoutEngine::default();
        let mut g = graph(&["a", "b"]);

        engine.restart(LayoutMode::Concentric, &mut g).expect("first");
        engine.restart(LayoutMode::Hierarchical, &mut g).expect("second");
        assert_eq!(engine.state(), LayoutState::Ready);
    }
}
