use eframe::egui;

use crate::state::registry::Registry;
use crate::state::selection::{Focus, FocusMode};

/// Navigation requested from the details panel. Cross-reference links only
/// ever move focus; they never touch the charted sets.
pub enum DetailsAction {
    None,
    FocusIndicator(String),
    FocusSeries(String),
    ClearFocus,
}

/// Read-only detail view for the focused catalog item.
pub fn show_details_panel(ui: &mut egui::Ui, registry: &Registry, focus: &Focus) -> DetailsAction {
    let mut action = DetailsAction::None;

    let Some((mode, id)) = focus.current() else {
        return action;
    };

    ui.horizontal(|ui| {
        ui.heading("Details");
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.small_button("Close").clicked() {
                action = DetailsAction::ClearFocus;
            }
        });
    });
    ui.separator();

    egui::ScrollArea::vertical().show(ui, |ui| match mode {
        FocusMode::Indicator => {
            let Some(ind) = registry.indicator(id) else {
                ui.label(egui::RichText::new("Unknown indicator").weak());
                return;
            };
            ui.strong(&ind.name);
            ui.monospace(&ind.id);
            ui.add_space(4.0);
            if let Some(category) = &ind.category {
                field(ui, "Category", category);
            }
            if let Some(directionality) = &ind.directionality {
                field(ui, "Directionality", directionality);
            }
            if let Some(units) = &ind.units {
                field(ui, "Units", units);
            }
            if let Some(description) = &ind.description {
                ui.add_space(6.0);
                ui.label(description);
            }
            if let Some(interpretation) = &ind.interpretation {
                ui.add_space(6.0);
                ui.label(egui::RichText::new(interpretation).italics());
            }

            if !ind.series.is_empty() {
                ui.add_space(8.0);
                ui.label(egui::RichText::new("Constituent series").strong());
                for sid in &ind.series {
                    let label = registry
                        .series(sid)
                        .map(|s| s.name.as_str())
                        .unwrap_or(sid.as_str());
                    if ui.link(label).on_hover_text(sid).clicked() {
                        action = DetailsAction::FocusSeries(sid.clone());
                    }
                }
            }
        }
        FocusMode::Series => {
            let Some(ser) = registry.series(id) else {
                ui.label(egui::RichText::new("Unknown series").weak());
                return;
            };
            ui.strong(&ser.name);
            ui.monospace(&ser.id);
            ui.add_space(4.0);
            field(ui, "Source", &ser.source);
            field(ui, "Cadence", &ser.cadence);
            field(ui, "Units", &ser.units);
            if let Some(description) = &ser.description {
                ui.add_space(6.0);
                ui.label(description);
            }
            if let Some(interpretation) = &ser.interpretation {
                ui.add_space(6.0);
                ui.label(egui::RichText::new(interpretation).italics());
            }

            let owners = registry.indicators_using(&ser.id);
            if !owners.is_empty() {
                ui.add_space(8.0);
                ui.label(egui::RichText::new("Used by indicators").strong());
                for ind in owners {
                    if ui.link(&ind.name).on_hover_text(&ind.id).clicked() {
                        action = DetailsAction::FocusIndicator(ind.id.clone());
                    }
                }
            }
        }
    });

    action
}

fn field(ui: &mut egui::Ui, label: &str, value: &str) {
    ui.horizontal(|ui| {
        ui.label(egui::RichText::new(label).weak());
        ui.label(value);
    });
}
