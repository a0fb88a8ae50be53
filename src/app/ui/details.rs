use std::sync::Arc;

use eframe::egui::{self, RichText, Ui};

use crate::ekg::{Backend, NodeAttrs, NodeGroup};
use crate::util::humanize_tag;

use super::super::{GraphState, QueryState, spawn_query};
use super::severity_badge;

impl GraphState {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui, backend: &Arc<Backend>) {
        ui.heading("Details");
        ui.add_space(4.0);

        let Some(selected_id) = self.selected.clone() else {
            ui.label("Select a node to inspect it.");
            return;
        };

        let Some(node) = self
            .snapshot
            .as_ref()
            .and_then(|snapshot| snapshot.node(&selected_id))
        else {
            ui.label("The selected node is not in the current snapshot.");
            return;
        };

        let node_group = node.group;
        let node_label = node.label.clone();
        let node_type = node.node_type.clone();
        let attrs = node.attrs();

        ui.label(RichText::new(&node_label).strong().size(16.0));
        ui.label(humanize_tag(&node_type));
        ui.add_space(6.0);

        match attrs {
            NodeAttrs::Event(attrs) => {
                ui.horizontal(|ui| {
                    severity_badge(ui, attrs.severity);
                    if !attrs.date.is_empty() {
                        ui.label(&attrs.date);
                    }
                });
                if let Some(description) = &attrs.description {
                    ui.add_space(4.0);
                    ui.label(description);
                }
                if !attrs.actors.is_empty() {
                    ui.add_space(4.0);
                    ui.label(RichText::new("Actors").strong());
                    for actor in &attrs.actors {
                        ui.label(format!("• {actor}"));
                    }
                }
                if !attrs.targets.is_empty() {
                    ui.add_space(4.0);
                    ui.label(RichText::new("Targets").strong());
                    for target in &attrs.targets {
                        ui.label(format!("• {target}"));
                    }
                }
            }
            NodeAttrs::Entity(attrs) => {
                if node_group == NodeGroup::Entity && !attrs.extra.is_empty() {
                    egui::Grid::new("entity_attrs").num_columns(2).show(ui, |ui| {
                        for (key, value) in &attrs.extra {
                            ui.label(humanize_tag(key));
                            ui.label(value.to_string());
                            ui.end_row();
                        }
                    });
                }
            }
        }

        ui.add_space(10.0);
        let expanding = self.expand.is_loading();
        let button = ui.add_enabled(!expanding, egui::Button::new("Expand neighborhood"));
        if button.clicked() {
            let node_id = selected_id;
            self.expand = spawn_query(backend, move |backend| backend.neighborhood(&node_id));
        }
        if expanding {
            ui.spinner();
        }
        if let Some(message) = self.expand.error() {
            let message = message.to_owned();
            ui.colored_label(eframe::egui::Color32::LIGHT_RED, message);
            if ui.button("Dismiss").clicked() {
                self.expand = QueryState::Idle;
            }
        }
    }
}
