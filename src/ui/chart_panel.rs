use chrono::{DateTime, NaiveTime, Utc};
use eframe::egui;
use egui_plot::{AxisHints, GridMark, Legend, Line, Plot, PlotPoints};

use crate::chart::assemble::{AssembleOutcome, AxisSide, ChartPlan};
use crate::chart::format::{format_by_unit, format_large, UnitTag};
use crate::state::selection::ChartSelection;
use crate::state::theme::Theme;

/// Actions the chart panel can request from the app.
pub enum ChartAction {
    None,
    Clear,
}

/// Linear mapping between the secondary axis' value range and the primary
/// plot coordinate space, so both axes scale independently inside one plot.
#[derive(Debug, Clone, Copy)]
struct AxisMap {
    primary: (f64, f64),
    secondary: (f64, f64),
}

impl AxisMap {
    fn from_plan(plan: &ChartPlan) -> Option<Self> {
        let primary = value_range(plan, AxisSide::Primary);
        let secondary = value_range(plan, AxisSide::Secondary)?;
        // With no primary traces the secondary values plot in their own
        // coordinates; the identity map keeps tick labels honest.
        let primary = primary.unwrap_or(secondary);
        Some(Self { primary, secondary })
    }

    fn to_plot(&self, v: f64) -> f64 {
        let (smin, smax) = self.secondary;
        let (pmin, pmax) = self.primary;
        pmin + (v - smin) * (pmax - pmin) / (smax - smin)
    }

    fn to_secondary(&self, y: f64) -> f64 {
        let (smin, smax) = self.secondary;
        let (pmin, pmax) = self.primary;
        smin + (y - pmin) * (smax - smin) / (pmax - pmin)
    }
}

/// Min/max over the finite values of all traces on one axis, padded when
/// degenerate so the linear map stays invertible.
fn value_range(plan: &ChartPlan, axis: AxisSide) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for trace in plan.traces.iter().filter(|t| t.axis == axis) {
        for v in trace.values.iter().flatten() {
            if v.is_finite() {
                min = min.min(*v);
                max = max.max(*v);
            }
        }
    }
    if !min.is_finite() || !max.is_finite() {
        return None;
    }
    if (max - min).abs() < f64::EPSILON {
        let pad = (min.abs() * 0.05).max(1.0);
        return Some((min - pad, max + pad));
    }
    Some((min, max))
}

fn color32(c: [u8; 4]) -> egui::Color32 {
    egui::Color32::from_rgba_unmultiplied(c[0], c[1], c[2], c[3])
}

fn date_to_x(date: chrono::NaiveDate) -> f64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp() as f64
}

fn x_to_date_label(x: f64) -> String {
    match DateTime::<Utc>::from_timestamp(x as i64, 0) {
        Some(dt) => dt.format("%Y-%m-%d").to_string(),
        None => format!("{x:.0}"),
    }
}

/// Chart section: header with the lookback window and clear control, then
/// the rendered plan (or the empty / no-data placeholders).
pub fn show_chart_panel(
    ui: &mut egui::Ui,
    outcome: &AssembleOutcome,
    selection: &ChartSelection,
    days: &mut u32,
    busy: bool,
    theme: &Theme,
) -> ChartAction {
    let mut action = ChartAction::None;
    let total = selection.indicator_count() + selection.series_count();

    ui.horizontal(|ui| {
        ui.heading("Chart");
        let summary = if total > 0 {
            format!(
                "{} indicators, {} series selected",
                selection.indicator_count(),
                selection.series_count()
            )
        } else {
            "Add items from the catalog to chart them".to_string()
        };
        ui.label(egui::RichText::new(summary).weak());

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if total > 0 && ui.button("Clear Chart").clicked() {
                action = ChartAction::Clear;
            }
            ui.add(egui::DragValue::new(days).range(7..=3650));
            ui.label("Days:");
            if busy {
                ui.spinner();
                ui.label(egui::RichText::new("Refreshing...").weak());
            }
        });
    });
    ui.add_space(4.0);

    match outcome {
        AssembleOutcome::EmptySelection => {
            ui.add_space(ui.available_height() * 0.4);
            ui.vertical_centered(|ui| {
                ui.label(
                    egui::RichText::new("Select items from the catalog to visualize").weak(),
                );
            });
        }
        AssembleOutcome::NoData => {
            ui.add_space(ui.available_height() * 0.4);
            ui.vertical_centered(|ui| {
                ui.colored_label(
                    theme.error_color(),
                    "No data available for the selected items",
                );
            });
        }
        AssembleOutcome::Plan(plan) => {
            show_plot(ui, plan);
            ui.vertical_centered(|ui| {
                ui.small("Scroll to zoom \u{2022} Drag to pan \u{2022} Double-click to reset");
            });
        }
    }

    action
}

fn show_plot(ui: &mut egui::Ui, plan: &ChartPlan) {
    let xs: Vec<f64> = plan.dates.iter().copied().map(date_to_x).collect();
    let map = AxisMap::from_plan(plan);
    let secondary_unit = plan.secondary_unit;

    let mut axes = vec![AxisHints::new_y()
        .label("USD")
        .formatter(|mark: GridMark, _range: &std::ops::RangeInclusive<f64>| {
            format_large(mark.value)
        })];
    if plan.has_axis(AxisSide::Secondary) {
        if let Some(map) = map {
            axes.push(
                AxisHints::new_y()
                    .label(secondary_unit.axis_label())
                    .placement(egui_plot::Placement::RightTop)
                    .formatter(move |mark: GridMark, _range: &std::ops::RangeInclusive<f64>| {
                        format_by_unit(map.to_secondary(mark.value), secondary_unit)
                    }),
            );
        }
    }

    let plot_height = (ui.available_height() - 24.0).max(240.0);
    let mut hover: Option<egui_plot::PlotPoint> = None;
    let response = Plot::new("liquidity_chart")
        .height(plot_height)
        .legend(Legend::default())
        .custom_y_axes(axes)
        .x_axis_formatter(|mark: GridMark, _range: &std::ops::RangeInclusive<f64>| {
            x_to_date_label(mark.value)
        })
        .label_formatter(|_, _| String::new())
        .allow_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_boxed_zoom(true)
        .show(ui, |plot_ui| {
            for trace in &plan.traces {
                let points: Vec<[f64; 2]> = xs
                    .iter()
                    .zip(&trace.values)
                    .filter_map(|(&x, v)| {
                        v.map(|v| {
                            let y = match (trace.axis, map) {
                                (AxisSide::Secondary, Some(map)) => map.to_plot(v),
                                _ => v,
                            };
                            [x, y]
                        })
                    })
                    .collect();
                plot_ui.line(
                    Line::new(PlotPoints::from(points))
                        .color(color32(trace.color))
                        .width(2.0)
                        .name(&trace.id),
                );
            }
            hover = plot_ui.pointer_coordinate();
        });

    if response.response.hovered() {
        if let Some(coord) = hover {
            if let Some(idx) = nearest_date_index(&xs, coord.x) {
                show_hover_tooltip(ui, &response.response, plan, idx);
            }
        }
    }
}

/// Index of the axis date closest to the hovered x coordinate.
fn nearest_date_index(xs: &[f64], x: f64) -> Option<usize> {
    if xs.is_empty() {
        return None;
    }
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (i, &xv) in xs.iter().enumerate() {
        let dist = (xv - x).abs();
        if dist < best_dist {
            best = i;
            best_dist = dist;
        }
    }
    Some(best)
}

/// Tooltip for the hovered date: every trace with a value there, formatted
/// per its unit. Traces still unset at that date are skipped.
fn show_hover_tooltip(ui: &egui::Ui, response: &egui::Response, plan: &ChartPlan, idx: usize) {
    let rows: Vec<(&str, [u8; 4], String)> = plan
        .traces
        .iter()
        .filter_map(|t| {
            t.values.get(idx).copied().flatten().map(|v| {
                (t.id.as_str(), t.color, format_by_unit(v, t.unit))
            })
        })
        .collect();
    if rows.is_empty() {
        return;
    }

    egui::show_tooltip_at_pointer(
        ui.ctx(),
        response.layer_id,
        egui::Id::new("liquidity_chart_tooltip"),
        |ui| {
            ui.strong(plan.dates[idx].format("%Y-%m-%d").to_string());
            for (id, color, value) in rows {
                ui.horizontal(|ui| {
                    ui.colored_label(color32(color), "\u{25CF}");
                    ui.label(id);
                    ui.monospace(value);
                });
            }
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::assemble::Trace;
    use chrono::NaiveDate;

    fn plan_with(traces: Vec<Trace>) -> ChartPlan {
        ChartPlan {
            dates: vec![NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date")],
            traces,
            secondary_unit: UnitTag::Percent,
        }
    }

    fn trace(axis: AxisSide, unit: UnitTag, values: Vec<Option<f64>>) -> Trace {
        Trace {
            id: "t".to_string(),
            unit,
            axis,
            values,
            color: [0, 0, 0, 255],
        }
    }

    #[test]
    fn axis_map_round_trips_secondary_values() {
        let plan = plan_with(vec![
            trace(AxisSide::Primary, UnitTag::Usd, vec![Some(0.0), Some(100.0)]),
            trace(AxisSide::Secondary, UnitTag::Percent, vec![Some(2.0), Some(4.0)]),
        ]);
        let map = AxisMap::from_plan(&plan).expect("both axes present");
        assert_eq!(map.to_plot(2.0), 0.0);
        assert_eq!(map.to_plot(4.0), 100.0);
        let mid = map.to_plot(3.0);
        assert!((map.to_secondary(mid) - 3.0).abs() < 1e-9);
    }

    #[test]
    fn secondary_only_plans_use_the_identity_map() {
        let plan = plan_with(vec![trace(
            AxisSide::Secondary,
            UnitTag::Bps,
            vec![Some(1.0), Some(5.0)],
        )]);
        let map = AxisMap::from_plan(&plan).expect("secondary present");
        assert_eq!(map.to_plot(3.0), 3.0);
    }

    #[test]
    fn degenerate_ranges_stay_invertible() {
        let plan = plan_with(vec![
            trace(AxisSide::Primary, UnitTag::Usd, vec![Some(50.0)]),
            trace(AxisSide::Secondary, UnitTag::Percent, vec![Some(2.0)]),
        ]);
        let map = AxisMap::from_plan(&plan).expect("both axes present");
        let y = map.to_plot(2.0);
        assert!(y.is_finite());
        assert!((map.to_secondary(y) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn nearest_index_picks_the_closest_date() {
        let xs = [0.0, 10.0, 20.0];
        assert_eq!(nearest_date_index(&xs, -5.0), Some(0));
        assert_eq!(nearest_date_index(&xs, 11.0), Some(1));
        assert_eq!(nearest_date_index(&xs, 99.0), Some(2));
        assert_eq!(nearest_date_index(&[], 0.0), None);
    }
}
