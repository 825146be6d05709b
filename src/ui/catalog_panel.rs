use eframe::egui;

use crate::chart::assemble::AssembleOutcome;
use crate::state::registry::Registry;
use crate::state::selection::{ChartSelection, Focus, FocusMode};

/// A row click in the catalog. The app applies both halves of the gesture:
/// toggle chart membership and toggle focus.
pub enum CatalogAction {
    None,
    ToggleIndicator(String),
    ToggleSeries(String),
}

/// Catalog sidebar: the indicator list, then series grouped by source.
pub fn show_catalog_panel(
    ui: &mut egui::Ui,
    registry: &Registry,
    selection: &ChartSelection,
    focus: &Focus,
    outcome: &AssembleOutcome,
) -> CatalogAction {
    let mut action = CatalogAction::None;

    ui.heading("Indicators");
    ui.add_space(2.0);
    egui::ScrollArea::vertical().show(ui, |ui| {
        if registry.loaded && registry.indicators.is_empty() {
            ui.label(egui::RichText::new("No indicators available").weak());
        }
        for ind in &registry.indicators {
            let charted = selection.has_indicator(&ind.id);
            if catalog_row(
                ui,
                &ind.name,
                &ind.id,
                units_badge(ind.units.as_deref()),
                charted,
                is_focused(focus, FocusMode::Indicator, &ind.id),
                trace_color(outcome, &ind.id),
            ) {
                action = CatalogAction::ToggleIndicator(ind.id.clone());
            }
        }

        ui.add_space(8.0);
        ui.heading("Series");
        ui.add_space(2.0);
        if registry.loaded && registry.series.is_empty() {
            ui.label(egui::RichText::new("No series available").weak());
        }
        for (source, members) in registry.series_by_source() {
            egui::CollapsingHeader::new(source)
                .default_open(true)
                .show(ui, |ui| {
                    for ser in members {
                        let charted = selection.has_series(&ser.id);
                        if catalog_row(
                            ui,
                            &ser.name,
                            &ser.id,
                            Some(ser.units.as_str()),
                            charted,
                            is_focused(focus, FocusMode::Series, &ser.id),
                            trace_color(outcome, &ser.id),
                        ) {
                            action = CatalogAction::ToggleSeries(ser.id.clone());
                        }
                    }
                });
        }
    });

    action
}

fn is_focused(focus: &Focus, mode: FocusMode, id: &str) -> bool {
    focus.current() == Some((mode, id))
}

fn units_badge(units: Option<&str>) -> Option<&str> {
    units.filter(|u| !u.is_empty())
}

/// Trace color this id got in the current plan, if it is plotted.
fn trace_color(outcome: &AssembleOutcome, id: &str) -> Option<egui::Color32> {
    let AssembleOutcome::Plan(plan) = outcome else {
        return None;
    };
    plan.traces.iter().find(|t| t.id == id).map(|t| {
        egui::Color32::from_rgba_unmultiplied(t.color[0], t.color[1], t.color[2], t.color[3])
    })
}

/// One selectable catalog row. Returns true when clicked.
fn catalog_row(
    ui: &mut egui::Ui,
    name: &str,
    id: &str,
    units: Option<&str>,
    charted: bool,
    focused: bool,
    color: Option<egui::Color32>,
) -> bool {
    let mut text = egui::RichText::new(name);
    if focused {
        text = text.strong();
    }
    let mut clicked = false;
    ui.horizontal(|ui| {
        if let Some(color) = color {
            ui.colored_label(color, "\u{25CF}");
        }
        let resp = ui.selectable_label(charted, text);
        if let Some(units) = units {
            ui.label(egui::RichText::new(units).weak().small());
        }
        if resp.on_hover_text(id).clicked() {
            clicked = true;
        }
    });
    clicked
}
