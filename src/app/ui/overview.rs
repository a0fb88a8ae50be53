use std::sync::Arc;
use std::time::Duration;

use eframe::egui::{self, RichText, Ui};

use crate::ekg::Backend;
use crate::util::{group_digits, humanize_tag};

use super::super::OverviewState;
use super::{draw_fetch_error, severity_badge};

/// Recent-events card row count.
const RECENT_EVENTS: usize = 5;
/// Score floor for the evolution-chain card.
const LINK_MIN_SCORE: f32 = 0.5;

impl OverviewState {
    pub(in crate::app) fn maintain(&mut self, backend: &Arc<Backend>) {
        self.stats.maintain(backend, (), |backend| backend.stats());
        self.recent.maintain(backend, (0, RECENT_EVENTS), |backend| {
            backend.events_page(0, RECENT_EVENTS)
        });
        self.entities.maintain(backend, (), |backend| backend.entities());

        let link_key = (LINK_MIN_SCORE * 100.0).round() as u32;
        self.links.maintain(backend, link_key, |backend| {
            backend.evolution_links(LINK_MIN_SCORE)
        });
    }

    pub(in crate::app) fn draw(&mut self, ui: &mut Ui, backend: &Arc<Backend>) {
        ui.heading("Knowledge graph overview");
        ui.add_space(8.0);

        if let Some(stats) = self.stats.value() {
            ui.horizontal(|ui| {
                stat_card(ui, "Events", stats.total_events);
                stat_card(ui, "Entities", stats.total_entities);
                stat_card(ui, "Evolution links", stats.evolution_links);
                stat_card(ui, "Relationships", stats.total_relationships);
            });

            if !stats.top_entities.is_empty() {
                ui.add_space(12.0);
                ui.label(RichText::new("Most connected entities").strong());
                for entity in stats.top_entities.iter().take(6) {
                    ui.label(format!(
                        "{} — {} connections",
                        entity.label,
                        group_digits(entity.degree)
                    ));
                }
            }
        } else if let Some(message) = self.stats.error() {
            let message = message.to_owned();
            if draw_fetch_error(ui, &message, &backend.location_hint()) {
                self.stats.retry();
                self.recent.retry();
            }
            return;
        } else {
            ui.spinner();
            ui.ctx().request_repaint_after(Duration::from_millis(100));
        }

        ui.add_space(12.0);
        ui.label(RichText::new("Recent events").strong());
        if let Some(page) = self.recent.value() {
            for event in &page.data {
                ui.horizontal(|ui| {
                    severity_badge(ui, event.severity);
                    if !event.date.is_empty() {
                        ui.label(&event.date);
                    }
                    ui.label(&event.label);
                });
            }
            ui.add_space(4.0);
            ui.label(format!(
                "Showing {} of {} events",
                page.data.len(),
                group_digits(page.total as u64)
            ));
        } else if let Some(message) = self.recent.error() {
            ui.label(message.to_owned());
        } else {
            ui.spinner();
            ui.ctx().request_repaint_after(Duration::from_millis(100));
        }

        ui.add_space(12.0);
        ui.label(RichText::new("Tracked entities").strong());
        if let Some(entities) = self.entities.value() {
            for entity in entities.iter().take(8) {
                ui.label(format!(
                    "{} ({})",
                    entity.label,
                    humanize_tag(&entity.entity_type)
                ));
            }
        } else if let Some(message) = self.entities.error() {
            ui.label(message.to_owned());
        } else {
            ui.spinner();
        }

        ui.add_space(12.0);
        ui.label(RichText::new("Strongest evolution links").strong());
        if let Some(links) = self.links.value() {
            let mut ranked = links.clone();
            ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
            for link in ranked.iter().take(5) {
                ui.label(format!(
                    "{} evolves to {}  (score {:.2})",
                    link.from, link.to, link.score
                ));
            }
        } else if let Some(message) = self.links.error() {
            ui.label(message.to_owned());
        } else {
            ui.spinner();
        }
    }
}

fn stat_card(ui: &mut Ui, title: &str, value: u64) {
    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.vertical(|ui| {
            ui.label(RichText::new(group_digits(value)).size(22.0).strong());
            ui.label(title);
        });
    });
}
