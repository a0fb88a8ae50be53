//! Force-layout tuning constants, keyed by node group and edge kind.

use crate::ekg::{EdgeKind, NodeGroup};

/// Entities need more breathing room than events: they accumulate many
/// `involves` edges and would otherwise collapse into hubs.
pub(crate) fn node_repulsion(group: NodeGroup) -> f32 {
    match group {
        NodeGroup::Entity => 12_000.0,
        NodeGroup::Event | NodeGroup::Risk => 8_000.0,
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct SpringParams {
    /// Rest length the spring relaxes toward.
    pub ideal_length: f32,
    /// Stiffness; larger pulls endpoints to the rest length harder.
    pub elasticity: f32,
}

/// `involves` edges pull tight to keep events near their participants;
/// everything else stays loose. When same-type grouping is on, pairs of
/// events sharing a type get an extra-short stiff spring so clusters form.
pub(crate) fn edge_spring(
    kind: EdgeKind,
    same_type_event_pair: bool,
    group_by_type: bool,
) -> SpringParams {
    if group_by_type && same_type_event_pair {
        return SpringParams {
            ideal_length: 60.0,
            elasticity: 180.0,
        };
    }

    match kind {
        EdgeKind::Involves => SpringParams {
            ideal_length: 80.0,
            elasticity: 150.0,
        },
        EdgeKind::EvolvesTo | EdgeKind::Other => SpringParams {
            ideal_length: 120.0,
            elasticity: 100.0,
        },
    }
}
