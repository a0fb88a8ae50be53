mod controls;
mod details;
mod overview;
mod timeline;

use eframe::egui::{Color32, RichText, Ui};

use crate::ekg::Severity;

use super::encoding::{SEVERITY_HIGH, SEVERITY_LOW, SEVERITY_MEDIUM};

/// Shared error card: the backend message verbatim, then where to look.
pub(super) fn draw_fetch_error(ui: &mut Ui, message: &str, location_hint: &str) -> bool {
    ui.heading("Request failed");
    ui.add_space(4.0);
    ui.label(message);
    ui.label(format!("Make sure the backend is running on {location_hint}"));
    ui.add_space(8.0);
    ui.button("Retry").clicked()
}

pub(super) fn severity_badge(ui: &mut Ui, severity: Option<Severity>) {
    let severity = severity.unwrap_or(Severity::Low);
    let color = match severity {
        Severity::High => SEVERITY_HIGH,
        Severity::Medium => SEVERITY_MEDIUM,
        Severity::Low => SEVERITY_LOW,
    };
    ui.label(RichText::new(severity.label()).color(Color32::BLACK).background_color(color));
}
