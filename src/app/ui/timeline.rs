use std::sync::Arc;
use std::time::Duration;

use eframe::egui::{self, RichText, Ui};

use crate::ekg::{Backend, EventRecord, FilterState, filter_events, group_by_year, sort_by_date};
use crate::util::humanize_tag;

use super::super::{AppConfig, TimelineState};
use super::{draw_fetch_error, severity_badge};

impl TimelineState {
    pub(in crate::app) fn maintain(&mut self, backend: &Arc<Backend>, page_size: usize) {
        let offset = self.offset;
        self.page.maintain(backend, (offset, page_size), move |backend| {
            backend.events_page(offset, page_size)
        });
    }

    pub(in crate::app) fn draw(&mut self, ui: &mut Ui, backend: &Arc<Backend>, config: &AppConfig) {
        ui.heading("Event timeline");
        ui.add_space(8.0);

        if self.page.value().is_none() {
            if let Some(message) = self.page.error() {
                let message = message.to_owned();
                if draw_fetch_error(ui, &message, &backend.location_hint()) {
                    self.page.retry();
                }
            } else {
                ui.spinner();
                ui.ctx().request_repaint_after(Duration::from_millis(100));
            }
            return;
        }
        let Some(page) = self.page.value() else {
            return;
        };

        if page.data.is_empty() {
            ui.label("No events to display");
            ui.label("Adjust filters to see more data");
            return;
        }

        let total = page.total;
        let offset = page.offset;
        let limit = page.limit.max(1);
        let fetched = page.data.len();
        let mut events = filter_events(&page.data, &FilterState::default(), &self.range);
        sort_by_date(&mut events);

        let mut flip = None;
        ui.horizontal(|ui| {
            let has_previous = offset > 0;
            if ui.add_enabled(has_previous, egui::Button::new("Previous")).clicked() {
                flip = Some(offset.saturating_sub(limit));
            }
            let has_next = offset + fetched < total;
            if ui.add_enabled(has_next, egui::Button::new("Next")).clicked() {
                flip = Some(offset + limit);
            }
            // Count runs against the unfiltered page.
            ui.label(format!(
                "Showing {}-{} of {} events",
                offset + 1,
                offset + fetched,
                total
            ));
        });

        ui.horizontal(|ui| {
            ui.label("From");
            ui.add(
                egui::TextEdit::singleline(&mut self.range.start_date)
                    .desired_width(90.0)
                    .hint_text("YYYY-MM-DD"),
            );
            ui.label("To");
            ui.add(
                egui::TextEdit::singleline(&mut self.range.end_date)
                    .desired_width(90.0)
                    .hint_text("YYYY-MM-DD"),
            );
            if !self.range.is_empty() {
                if ui.button("Clear").clicked() {
                    self.range.clear();
                }
                ui.label(format!("{} in range", events.len()));
            }
        });

        if events.is_empty() {
            ui.add_space(8.0);
            ui.label("No events to display");
            ui.label("Adjust filters to see more data");
        }

        let selected = self.selected.clone();
        let highlight_year = config
            .preselect_date
            .as_deref()
            .and_then(|date| date.get(0..4))
            .map(str::to_owned);

        egui::ScrollArea::vertical().show(ui, |ui| {
            for (year, group) in group_by_year(&events) {
                let header = RichText::new(&year).strong().size(15.0);
                let highlighted = highlight_year.as_deref() == Some(year.as_str());
                egui::CollapsingHeader::new(header)
                    .default_open(true)
                    .show(ui, |ui| {
                        if highlighted {
                            ui.label(RichText::new("Preselected year").italics());
                        }
                        for event in &group {
                            self.draw_event_row(
                                ui,
                                event,
                                selected.as_deref() == Some(event.event_id.as_str()),
                            );
                        }
                    });
            }
        });

        if let Some(next_offset) = flip {
            self.offset = next_offset;
        }
    }

    fn draw_event_row(&mut self, ui: &mut Ui, event: &EventRecord, is_selected: bool) {
        let response = ui.horizontal(|ui| {
            severity_badge(ui, event.severity);
            if !event.date.is_empty() {
                ui.label(&event.date);
            }
            let label = if is_selected {
                RichText::new(&event.label).strong()
            } else {
                RichText::new(&event.label)
            };
            ui.selectable_label(is_selected, label)
        });

        if response.inner.clicked() {
            self.selected = if is_selected {
                None
            } else {
                Some(event.event_id.clone())
            };
        }

        if is_selected {
            ui.indent(&event.event_id, |ui| {
                ui.label(humanize_tag(&event.event_type));
                if let Some(description) = &event.description {
                    ui.label(description);
                }
                if !event.actors.is_empty() {
                    ui.label(format!("Actors: {}", event.actors.join(", ")));
                }
                if !event.targets.is_empty() {
                    ui.label(format!("Targets: {}", event.targets.join(", ")));
                }
            });
        }
    }
}
