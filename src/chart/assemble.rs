use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;

use crate::chart::fetch::RawSeries;
use crate::chart::format::UnitTag;

/// Trace color palette, cycled in successful-resolution order. Identifiers
/// whose fetch failed or returned no data do not reserve a color.
pub const TRACE_PALETTE: [[u8; 4]; 10] = [
    [34, 211, 238, 255],  // cyan
    [139, 92, 246, 255],  // violet
    [16, 185, 129, 255],  // emerald
    [245, 158, 11, 255],  // amber
    [239, 68, 68, 255],   // red
    [236, 72, 153, 255],  // pink
    [6, 182, 212, 255],   // teal
    [132, 204, 22, 255],  // lime
    [249, 115, 22, 255],  // orange
    [99, 102, 241, 255],  // indigo
];

pub fn color_for_slot(slot: usize) -> [u8; 4] {
    TRACE_PALETTE[slot % TRACE_PALETTE.len()]
}

/// Which y-axis a trace is plotted against. USD values take the primary
/// (left) axis, every other unit the secondary (right) axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisSide {
    Primary,
    Secondary,
}

/// One plottable trace, aligned to the plan's unified date axis.
/// `values[i]` is `None` before the identifier's first observation and
/// forward-filled everywhere after it.
#[derive(Debug, Clone)]
pub struct Trace {
    pub id: String,
    pub unit: UnitTag,
    pub axis: AxisSide,
    pub values: Vec<Option<f64>>,
    pub color: [u8; 4],
}

/// Assembled chart contents: the unified date axis plus every surviving trace.
#[derive(Debug, Clone)]
pub struct ChartPlan {
    /// Strictly ascending, no duplicates.
    pub dates: Vec<NaiveDate>,
    pub traces: Vec<Trace>,
    /// Unit labelling the secondary axis, chosen with precedence
    /// percent > bps > index across the non-USD units present.
    pub secondary_unit: UnitTag,
}

impl ChartPlan {
    pub fn has_axis(&self, axis: AxisSide) -> bool {
        self.traces.iter().any(|t| t.axis == axis)
    }
}

/// Outcome of an assembly pass. An empty selection is distinct from a
/// selection whose every fetch came back empty.
#[derive(Debug, Clone)]
pub enum AssembleOutcome {
    /// Nothing selected; the caller clears the rendered chart.
    EmptySelection,
    /// Identifiers were selected but none produced a data point.
    NoData,
    Plan(ChartPlan),
}

/// Build a [`ChartPlan`] from a batch of per-identifier fetch results.
///
/// Failed slots (`None`) and identifiers with zero points are dropped;
/// survivors are aligned onto the sorted union of all observed dates with
/// forward-fill (no back-fill before the first observation). No error
/// escapes: the worst case is `NoData`.
pub fn build_plan<F>(results: &[Option<RawSeries>], units_for: F) -> AssembleOutcome
where
    F: Fn(&str) -> UnitTag,
{
    if results.is_empty() {
        return AssembleOutcome::EmptySelection;
    }

    // Unified date axis: union of every observed date, calendar order.
    let dates: Vec<NaiveDate> = results
        .iter()
        .flatten()
        .flat_map(|raw| raw.points.iter().map(|(d, _)| *d))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut traces = Vec::new();
    let mut has_percent = false;
    let mut has_bps = false;
    for raw in results.iter().flatten() {
        if raw.points.is_empty() {
            continue;
        }
        let unit = units_for(&raw.id);
        let axis = if unit.is_large_scale() {
            AxisSide::Primary
        } else {
            AxisSide::Secondary
        };
        match unit {
            UnitTag::Percent => has_percent = true,
            UnitTag::Bps => has_bps = true,
            _ => {}
        }

        // Duplicate dates within one response keep the last value.
        let by_date: HashMap<NaiveDate, f64> = raw.points.iter().copied().collect();
        let mut values = Vec::with_capacity(dates.len());
        let mut last = None;
        for date in &dates {
            if let Some(v) = by_date.get(date) {
                last = Some(*v);
            }
            values.push(last);
        }

        let color = color_for_slot(traces.len());
        traces.push(Trace {
            id: raw.id.clone(),
            unit,
            axis,
            values,
            color,
        });
    }

    if traces.is_empty() {
        return AssembleOutcome::NoData;
    }

    let secondary_unit = if has_percent {
        UnitTag::Percent
    } else if has_bps {
        UnitTag::Bps
    } else {
        UnitTag::Index
    };

    AssembleOutcome::Plan(ChartPlan {
        dates,
        traces,
        secondary_unit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).expect("valid date")
    }

    fn raw(id: &str, points: &[(u32, f64)]) -> Option<RawSeries> {
        Some(RawSeries {
            id: id.to_string(),
            points: points.iter().map(|&(d, v)| (day(d), v)).collect(),
        })
    }

    fn usd_units(_: &str) -> UnitTag {
        UnitTag::Usd
    }

    #[test]
    fn empty_batch_is_the_empty_selection_state() {
        assert!(matches!(
            build_plan(&[], usd_units),
            AssembleOutcome::EmptySelection
        ));
    }

    #[test]
    fn all_failures_yield_no_data_not_empty() {
        let results = vec![None, None];
        assert!(matches!(
            build_plan(&results, usd_units),
            AssembleOutcome::NoData
        ));
        // A successful fetch with zero points counts as no data too.
        let results = vec![raw("a", &[])];
        assert!(matches!(
            build_plan(&results, usd_units),
            AssembleOutcome::NoData
        ));
    }

    #[test]
    fn disjoint_dates_union_forward_fill_no_back_fill() {
        let results = vec![raw("a", &[(1, 10.0)]), raw("b", &[(2, 20.0)])];
        let plan = match build_plan(&results, usd_units) {
            AssembleOutcome::Plan(p) => p,
            other => panic!("expected plan, got {other:?}"),
        };
        assert_eq!(plan.dates, vec![day(1), day(2)]);
        // A observed day 1 only: forward-filled onto day 2.
        assert_eq!(plan.traces[0].values, vec![Some(10.0), Some(10.0)]);
        // B starts on day 2: day 1 stays unset.
        assert_eq!(plan.traces[1].values, vec![None, Some(20.0)]);
    }

    #[test]
    fn own_value_wins_over_carry_forward() {
        let results = vec![raw("a", &[(1, 1.0), (3, 3.0)]), raw("b", &[(2, 9.0)])];
        let plan = match build_plan(&results, usd_units) {
            AssembleOutcome::Plan(p) => p,
            other => panic!("expected plan, got {other:?}"),
        };
        assert_eq!(plan.dates, vec![day(1), day(2), day(3)]);
        assert_eq!(plan.traces[0].values, vec![Some(1.0), Some(1.0), Some(3.0)]);
    }

    #[test]
    fn one_failed_fetch_leaves_the_other_traces() {
        let results = vec![raw("a", &[(1, 1.0)]), None, raw("c", &[(1, 3.0)])];
        let plan = match build_plan(&results, usd_units) {
            AssembleOutcome::Plan(p) => p,
            other => panic!("expected plan, got {other:?}"),
        };
        assert_eq!(plan.traces.len(), 2);
        assert_eq!(plan.traces[0].id, "a");
        assert_eq!(plan.traces[1].id, "c");
    }

    #[test]
    fn dropped_identifiers_do_not_reserve_a_color() {
        let results = vec![None, raw("b", &[(1, 1.0)]), raw("c", &[(1, 2.0)])];
        let plan = match build_plan(&results, usd_units) {
            AssembleOutcome::Plan(p) => p,
            other => panic!("expected plan, got {other:?}"),
        };
        assert_eq!(plan.traces[0].color, TRACE_PALETTE[0]);
        assert_eq!(plan.traces[1].color, TRACE_PALETTE[1]);
    }

    #[test]
    fn axis_assignment_and_secondary_label_precedence() {
        let units = |id: &str| match id {
            "usd" => UnitTag::Usd,
            "pct" => UnitTag::Percent,
            "bps" => UnitTag::Bps,
            _ => UnitTag::Index,
        };
        let results = vec![
            raw("usd", &[(1, 1.0)]),
            raw("bps", &[(1, 2.0)]),
            raw("idx", &[(1, 3.0)]),
        ];
        let plan = match build_plan(&results, units) {
            AssembleOutcome::Plan(p) => p,
            other => panic!("expected plan, got {other:?}"),
        };
        assert_eq!(plan.traces[0].axis, AxisSide::Primary);
        assert_eq!(plan.traces[1].axis, AxisSide::Secondary);
        assert_eq!(plan.traces[2].axis, AxisSide::Secondary);
        // bps present, percent absent.
        assert_eq!(plan.secondary_unit, UnitTag::Bps);

        let results = vec![raw("pct", &[(1, 1.0)]), raw("bps", &[(1, 2.0)])];
        let plan = match build_plan(&results, units) {
            AssembleOutcome::Plan(p) => p,
            other => panic!("expected plan, got {other:?}"),
        };
        assert_eq!(plan.secondary_unit, UnitTag::Percent);
    }
}
