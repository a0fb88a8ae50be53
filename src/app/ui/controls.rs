use eframe::egui::{self, Slider, Ui};

use crate::ekg::distinct_event_types;
use crate::util::{group_digits, humanize_tag};

use super::super::encoding::{ENTITY_FILL, SEVERITY_HIGH, SEVERITY_LOW, SEVERITY_MEDIUM};
use super::super::layout::LayoutMode;
use super::super::{AppConfig, GraphState};

impl GraphState {
    /// Header date axis. Applies together with the panel's own bounds.
    pub(in crate::app) fn draw_header_range(&mut self, ui: &mut Ui) {
        ui.label("From");
        let start = ui.add(
            egui::TextEdit::singleline(&mut self.header_range.start_date)
                .hint_text("YYYY-MM-DD")
                .desired_width(90.0),
        );
        ui.label("To");
        let end = ui.add(
            egui::TextEdit::singleline(&mut self.header_range.end_date)
                .hint_text("YYYY-MM-DD")
                .desired_width(90.0),
        );
        if start.changed() || end.changed() {
            self.graph_dirty = true;
        }

        if !self.header_range.is_empty() && ui.button("Clear").clicked() {
            self.header_range.clear();
            self.graph_dirty = true;
        }
    }

    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui, config: &AppConfig) {
        egui::ScrollArea::vertical().show(ui, |ui| {
            ui.heading("Query");
            ui.add_space(4.0);

            let limit_ceiling = config.max_nodes.max(10);
            let limit = ui.add(
                Slider::new(&mut self.node_limit, 10..=limit_ceiling)
                    .step_by(10.0)
                    .text("Node limit"),
            );
            let score = ui.add(
                Slider::new(&mut self.min_score, 0.1..=1.0)
                    .step_by(0.05)
                    .text("Min evolution score"),
            );
            if limit.drag_stopped() || score.drag_stopped() {
                self.reload(false);
            }

            if ui.button("Refresh").clicked() {
                self.reload(true);
            }

            ui.separator();
            ui.heading("Layout");
            ui.add_space(4.0);

            let mut mode = self.layout_mode;
            egui::ComboBox::from_label("Algorithm")
                .selected_text(mode.label())
                .show_ui(ui, |ui| {
                    for candidate in LayoutMode::ALL {
                        ui.selectable_value(&mut mode, candidate, candidate.label());
                    }
                });
            if mode != self.layout_mode {
                self.layout_mode = mode;
                self.graph_dirty = true;
            }

            if ui
                .checkbox(&mut self.group_by_type, "Group events by type")
                .changed()
                && self.layout_mode == LayoutMode::ForceDirected
            {
                self.graph_dirty = true;
            }

            ui.separator();
            ui.heading("Filters");
            ui.add_space(4.0);

            ui.label("Start date");
            let start = ui.add(
                egui::TextEdit::singleline(&mut self.filters.start_date).hint_text("YYYY-MM-DD"),
            );
            ui.label("End date");
            let end = ui.add(
                egui::TextEdit::singleline(&mut self.filters.end_date).hint_text("YYYY-MM-DD"),
            );
            ui.label("Search");
            let search = ui.add(
                egui::TextEdit::singleline(&mut self.filters.search)
                    .hint_text("label, description or type"),
            );
            if start.changed() || end.changed() || search.changed() {
                self.graph_dirty = true;
            }

            ui.add_space(4.0);
            ui.label("Event types");
            for event_type in distinct_event_types(&self.events) {
                let mut checked = self.filters.selected_types.contains(&event_type);
                if ui.checkbox(&mut checked, humanize_tag(&event_type)).changed() {
                    if checked {
                        self.filters.selected_types.push(event_type);
                    } else {
                        self.filters.selected_types.retain(|t| t != &event_type);
                    }
                    self.graph_dirty = true;
                }
            }

            let filters_active = self.filters != Default::default();
            if filters_active && ui.button("Clear filters").clicked() {
                self.filters = Default::default();
                self.graph_dirty = true;
            }

            ui.separator();
            ui.heading("Snapshot");
            ui.add_space(4.0);
            if let Some(snapshot) = &self.snapshot {
                ui.label(format!("Nodes: {}", group_digits(snapshot.node_count() as u64)));
                ui.label(format!("Edges: {}", group_digits(snapshot.edge_count() as u64)));
                ui.label(format!(
                    "Entities: {}",
                    group_digits(snapshot.entity_count() as u64)
                ));
                ui.label(format!(
                    "Events shown: {} of {}",
                    self.visible_event_count(),
                    self.events.len()
                ));
            } else {
                ui.label("No snapshot loaded yet.");
            }

            ui.separator();
            egui::CollapsingHeader::new("Legend")
                .default_open(false)
                .show(ui, |ui| {
                    ui.colored_label(ENTITY_FILL, "■ Entity");
                    ui.colored_label(SEVERITY_HIGH, "● High severity event");
                    ui.colored_label(SEVERITY_MEDIUM, "● Medium severity event");
                    ui.colored_label(SEVERITY_LOW, "● Low severity event");
                    ui.label("→ evolves_to (arrow)");
                    ui.label("— involves");
                });
        });
    }
}
