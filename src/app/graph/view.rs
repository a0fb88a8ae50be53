use std::collections::HashSet;
use std::sync::Arc;

use eframe::egui::{
    self, Align2, Color32, CornerRadius, FontId, Rect, Sense, Shape, Stroke, StrokeKind, Ui,
    epaint::QuadraticBezierShape, vec2,
};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use super::super::encoding::{
    HOVERED_BORDER, NodeShape, SELECTED_BORDER, edge_style, node_style, truncate_label,
};
use super::super::layout::LayoutState;
use super::super::render_utils::{draw_background, edge_visible, node_visible, world_to_screen};
use super::super::{GraphState, SearchMatchCache};

const MATCH_RING: Color32 = Color32::from_rgb(0x67, 0xc4, 0xff);

impl GraphState {
    /// Fuzzy label matches for the current search query, recomputed only
    /// when the query or the render graph changes.
    fn cached_fuzzy_matches(&mut self) -> Option<Arc<HashSet<usize>>> {
        let query = self.filters.search.trim();
        if query.is_empty() {
            return None;
        }

        if let Some(cached) = &self.search_match_cache
            && cached.render_revision == self.render_revision
            && cached.query == query
        {
            return Some(Arc::clone(&cached.matches));
        }

        let matcher = SkimMatcherV2::default();
        let matches = self
            .render
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(index, node)| {
                matcher.fuzzy_match(&node.label, query).map(|_| index)
            })
            .collect::<HashSet<_>>();
        let matches = Arc::new(matches);

        self.search_match_cache = Some(SearchMatchCache {
            query: query.to_owned(),
            render_revision: self.render_revision,
            matches: Arc::clone(&matches),
        });
        Some(matches)
    }

    pub(in crate::app) fn draw_canvas(&mut self, ui: &mut Ui, location_hint: &str) {
        if let Some(message) = self.query.error().map(str::to_owned) {
            ui.add_space(60.0);
            ui.vertical_centered(|ui| {
                ui.heading("Failed to load graph");
                ui.add_space(6.0);
                ui.label(message);
                ui.label(format!("Make sure the backend is running on {location_hint}"));
                ui.add_space(10.0);
                if ui.button("Retry").clicked() {
                    self.reload(true);
                }
            });
            return;
        }

        if self.snapshot.is_none() {
            ui.vertical_centered(|ui| {
                ui.add_space(120.0);
                ui.heading("Loading knowledge graph...");
                ui.add_space(8.0);
                ui.spinner();
            });
            return;
        }

        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        draw_background(&painter, rect, self.pan, self.zoom);
        self.handle_zoom(ui, rect, &response);
        self.handle_pan(&response);

        if self.layout.state() != LayoutState::Ready {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "Layout unavailable, showing raw positions",
                FontId::proportional(14.0),
                Color32::from_gray(200),
            );
        }

        if self.render.is_empty() {
            painter.text(
                rect.center() - vec2(0.0, 12.0),
                Align2::CENTER_CENTER,
                "No nodes to display",
                FontId::proportional(18.0),
                Color32::from_gray(220),
            );
            painter.text(
                rect.center() + vec2(0.0, 14.0),
                Align2::CENTER_CENTER,
                "Adjust filters to see more data",
                FontId::proportional(13.0),
                Color32::from_gray(160),
            );
            return;
        }

        let moving = self.layout.step(&mut self.render, self.group_by_type);
        if moving || response.dragged() {
            ui.ctx().request_repaint();
        }

        let fuzzy_matches = self.cached_fuzzy_matches();
        let pan = self.pan;
        let zoom = self.zoom;

        let screen_positions = self
            .render
            .nodes
            .iter()
            .map(|node| world_to_screen(rect, pan, zoom, node.pos))
            .collect::<Vec<_>>();
        let screen_extents = self
            .render
            .nodes
            .iter()
            .map(|node| node_style(node.group, node.severity).size * 0.5 * zoom)
            .collect::<Vec<_>>();

        let hovered = Self::hovered_index(ui, &screen_positions, &screen_extents);
        if hovered.is_some() {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::PointingHand);
        }

        for edge in &self.render.edges {
            let start = screen_positions[edge.source];
            let end = screen_positions[edge.target];
            if !edge_visible(rect, start, end, 4.0) {
                continue;
            }

            let delta = end - start;
            let length = delta.length();
            if length < 1.0 {
                continue;
            }
            let direction = delta / length;
            let normal = vec2(-direction.y, direction.x);

            // Shallow bow keeps parallel edges between the same pair legible.
            let control = start + delta * 0.5 + normal * (length * 0.08);
            let style = edge_style(edge.kind, edge.strength);
            let stroke = Stroke::new(style.width * zoom.sqrt(), style.color);
            painter.add(QuadraticBezierShape::from_points_stroke(
                [start, control, end],
                false,
                Color32::TRANSPARENT,
                stroke,
            ));

            if style.arrowhead {
                let tangent = (end - control).normalized();
                let tip = end - tangent * screen_extents[edge.target];
                let base = tip - tangent * (9.0 * zoom.sqrt());
                let side = vec2(-tangent.y, tangent.x) * (4.0 * zoom.sqrt());
                painter.add(Shape::convex_polygon(
                    vec![tip, base + side, base - side],
                    style.color,
                    Stroke::NONE,
                ));
            }
        }

        let mut pending_selection = None;
        for (index, node) in self.render.nodes.iter().enumerate() {
            let position = screen_positions[index];
            let extent = screen_extents[index];
            if !node_visible(rect, position, extent) {
                continue;
            }

            let style = node_style(node.group, node.severity);
            let is_selected = self.selected.as_deref() == Some(node.id.as_str());
            let is_hovered = hovered == Some(index);
            let is_match = fuzzy_matches
                .as_ref()
                .is_some_and(|matches| matches.contains(&index));

            let (border_color, border_width) = if is_selected {
                (SELECTED_BORDER, style.border_width + 1.5)
            } else if is_hovered {
                (HOVERED_BORDER, style.border_width + 0.5)
            } else {
                (style.border_color, style.border_width)
            };
            let border = Stroke::new(border_width * zoom.sqrt().min(1.4), border_color);

            match style.shape {
                NodeShape::Rectangle => {
                    let shape_rect =
                        Rect::from_center_size(position, vec2(extent * 2.0, extent * 1.4));
                    painter.rect_filled(shape_rect, CornerRadius::same(4), style.fill);
                    painter.rect_stroke(shape_rect, CornerRadius::same(4), border, StrokeKind::Outside);
                }
                NodeShape::Ellipse => {
                    painter.circle_filled(position, extent, style.fill);
                    painter.circle_stroke(position, extent, border);
                }
            }

            if is_match && !is_selected {
                painter.circle_stroke(position, extent + 5.0, Stroke::new(2.0, MATCH_RING));
            }

            if zoom > 0.45 || is_hovered || is_selected {
                painter.text(
                    position + vec2(0.0, extent + 6.0),
                    Align2::CENTER_TOP,
                    truncate_label(&node.label, node.group),
                    FontId::proportional(12.0),
                    Color32::from_gray(235),
                );
            }

            if response.clicked_by(egui::PointerButton::Primary) && is_hovered {
                pending_selection = Some(node.id.clone());
            }
        }

        // A click on empty canvas clears the selection.
        if response.clicked_by(egui::PointerButton::Primary) {
            self.selected = pending_selection;
        }

        if let Some(index) = hovered {
            let node = &self.render.nodes[index];
            let summary = if node.date.is_empty() {
                format!("{}  |  {}", node.label, crate::util::humanize_tag(&node.node_type))
            } else {
                format!(
                    "{}  |  {}  |  {}",
                    node.label,
                    crate::util::humanize_tag(&node.node_type),
                    node.date
                )
            };
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                summary,
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }
    }
}
