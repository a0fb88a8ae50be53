//! Deterministic visual encoding: domain objects in, draw parameters out.
//! No state, no I/O; re-evaluated whenever the rendered sets change.

use eframe::egui::Color32;

use crate::ekg::{EdgeKind, NodeGroup, Severity};

pub(crate) const ENTITY_FILL: Color32 = Color32::from_rgb(0x3b, 0x82, 0xf6);
pub(crate) const SEVERITY_HIGH: Color32 = Color32::from_rgb(0xef, 0x44, 0x44);
pub(crate) const SEVERITY_MEDIUM: Color32 = Color32::from_rgb(0xf5, 0x9e, 0x0b);
pub(crate) const SEVERITY_LOW: Color32 = Color32::from_rgb(0x22, 0xc5, 0x5e);

pub(crate) const SELECTED_BORDER: Color32 = Color32::from_rgb(0x63, 0x66, 0xf1);
pub(crate) const HOVERED_BORDER: Color32 = Color32::from_rgb(0xa5, 0xb4, 0xfc);

/// Entity nodes render larger than event nodes at a fixed ratio.
const ENTITY_SIZE: f32 = 60.0;
const EVENT_SIZE: f32 = 50.0;

const ENTITY_LABEL_BUDGET: usize = 22;
const EVENT_LABEL_BUDGET: usize = 26;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum NodeShape {
    Rectangle,
    Ellipse,
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct NodeStyle {
    pub fill: Color32,
    pub shape: NodeShape,
    /// Diameter (or rectangle side) in world units.
    pub size: f32,
    pub border_width: f32,
    pub border_color: Color32,
}

/// Entities get the fixed accent color and a rectangle; everything else is
/// an ellipse keyed by severity (absent severity reads as low).
pub(crate) fn node_style(group: NodeGroup, severity: Option<Severity>) -> NodeStyle {
    let (fill, shape, size) = match group {
        NodeGroup::Entity => (ENTITY_FILL, NodeShape::Rectangle, ENTITY_SIZE),
        NodeGroup::Event | NodeGroup::Risk => {
            let fill = match severity {
                Some(Severity::High) => SEVERITY_HIGH,
                Some(Severity::Medium) => SEVERITY_MEDIUM,
                Some(Severity::Low) | None => SEVERITY_LOW,
            };
            (fill, NodeShape::Ellipse, EVENT_SIZE)
        }
    };

    NodeStyle {
        fill,
        shape,
        size,
        border_width: 3.0,
        border_color: Color32::WHITE,
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct EdgeStyle {
    pub width: f32,
    /// Fill already carries the tier's opacity in its alpha channel.
    pub color: Color32,
    pub arrowhead: bool,
}

struct EdgeTier {
    rgb: (u8, u8, u8),
    width: (f32, f32),
    opacity: (f32, f32),
    arrowhead: bool,
}

fn tier(kind: EdgeKind) -> EdgeTier {
    match kind {
        EdgeKind::EvolvesTo => EdgeTier {
            rgb: (255, 255, 255),
            width: (1.5, 3.5),
            opacity: (0.6, 1.0),
            arrowhead: true,
        },
        EdgeKind::Involves => EdgeTier {
            rgb: (100, 200, 255),
            width: (1.0, 2.0),
            opacity: (0.3, 0.7),
            arrowhead: false,
        },
        EdgeKind::Other => EdgeTier {
            rgb: (255, 255, 255),
            width: (0.6, 1.4),
            opacity: (0.2, 0.6),
            arrowhead: false,
        },
    }
}

fn lerp(range: (f32, f32), t: f32) -> f32 {
    range.0 + (range.1 - range.0) * t
}

/// Width and opacity scale linearly with the normalized strength score
/// inside the tier's range; a missing score sits at the midpoint.
pub(crate) fn edge_style(kind: EdgeKind, strength: Option<f32>) -> EdgeStyle {
    let tier = tier(kind);
    let t = strength.unwrap_or(0.5).clamp(0.0, 1.0);

    let alpha = (lerp(tier.opacity, t) * 255.0).round() as u8;
    EdgeStyle {
        width: lerp(tier.width, t),
        color: Color32::from_rgba_unmultiplied(tier.rgb.0, tier.rgb.1, tier.rgb.2, alpha),
        arrowhead: tier.arrowhead,
    }
}

/// Labels beyond the per-group character budget are shortened with an
/// ellipsis.
pub(crate) fn truncate_label(label: &str, group: NodeGroup) -> String {
    let budget = match group {
        NodeGroup::Entity => ENTITY_LABEL_BUDGET,
        NodeGroup::Event | NodeGroup::Risk => EVENT_LABEL_BUDGET,
    };

    if label.chars().count() <= budget {
        label.to_owned()
    } else {
        let mut truncated = label.chars().take(budget.saturating_sub(1)).collect::<String>();
        truncated.push('…');
        truncated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_nodes_are_blue_rectangles_larger_than_events() {
        let entity = node_style(NodeGroup::Entity, None);
        assert_eq!(entity.fill, ENTITY_FILL);
        assert_eq!(entity.shape, NodeShape::Rectangle);

        let event = node_style(NodeGroup::Event, Some(Severity::High));
        assert_eq!(event.shape, NodeShape::Ellipse);
        assert!(entity.size > event.size);
    }

    #[test]
    fn event_fill_is_keyed_by_severity_with_low_default() {
        assert_eq!(
            node_style(NodeGroup::Event, Some(Severity::High)).fill,
            SEVERITY_HIGH
        );
        assert_eq!(
            node_style(NodeGroup::Event, Some(Severity::Medium)).fill,
            SEVERITY_MEDIUM
        );
        assert_eq!(node_style(NodeGroup::Event, None).fill, SEVERITY_LOW);
        assert_eq!(
            node_style(NodeGroup::Risk, Some(Severity::High)).fill,
            SEVERITY_HIGH
        );
    }

    #[test]
    fn default_strength_reproduces_the_tier_midpoints() {
        let evolves = edge_style(EdgeKind::EvolvesTo, None);
        assert!((evolves.width - 2.5).abs() < 1e-4);
        assert_eq!(evolves.color.a(), 204); // 0.8 * 255

        let involves = edge_style(EdgeKind::Involves, None);
        assert!((involves.width - 1.5).abs() < 1e-4);
        assert_eq!(involves.color.a(), 128); // 0.5 * 255, rounded

        let other = edge_style(EdgeKind::Other, None);
        assert!((other.width - 1.0).abs() < 1e-4);
        assert_eq!(other.color.a(), 102); // 0.4 * 255
    }

    #[test]
    fn strength_scales_width_and_opacity_within_the_tier() {
        let weak = edge_style(EdgeKind::EvolvesTo, Some(0.0));
        let strong = edge_style(EdgeKind::EvolvesTo, Some(1.0));
        assert!(weak.width < strong.width);
        assert!(weak.color.a() < strong.color.a());
        // Out-of-range scores clamp instead of extrapolating.
        assert_eq!(edge_style(EdgeKind::EvolvesTo, Some(2.0)).width, strong.width);
    }

    #[test]
    fn only_evolution_edges_carry_arrowheads() {
        assert!(edge_style(EdgeKind::EvolvesTo, None).arrowhead);
        assert!(!edge_style(EdgeKind::Involves, None).arrowhead);
        assert!(!edge_style(EdgeKind::Other, None).arrowhead);
    }

    #[test]
    fn long_labels_are_ellipsized_per_group_budget() {
        let long = "A very long label that exceeds every configured budget";
        let entity = truncate_label(long, NodeGroup::Entity);
        let event = truncate_label(long, NodeGroup::Event);
        assert!(entity.ends_with('…'));
        assert!(entity.chars().count() <= 22);
        assert!(event.chars().count() <= 26);
        assert!(event.chars().count() > entity.chars().count());

        assert_eq!(truncate_label("short", NodeGroup::Entity), "short");
    }
}
