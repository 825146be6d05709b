use serde::{Deserialize, Serialize};

/// Measurement unit attached to an indicator or series in the registry.
///
/// The unit decides two things: which y-axis a trace lands on (USD values go
/// left, everything else right) and how a value is rendered as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitTag {
    Usd,
    Percent,
    Bps,
    Index,
    /// Unit string the registry uses but this client does not know.
    /// Treated like an index value for formatting and axis routing.
    Other,
}

impl UnitTag {
    /// Parse the wire representation. Absent units default to `Usd` at the
    /// lookup site, not here.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "USD" => UnitTag::Usd,
            "percent" => UnitTag::Percent,
            "bps" => UnitTag::Bps,
            "index" => UnitTag::Index,
            _ => UnitTag::Other,
        }
    }

    /// USD values use the scaled T/B/M/K formatting and the primary axis.
    pub fn is_large_scale(self) -> bool {
        matches!(self, UnitTag::Usd)
    }

    /// Short label used for the secondary y-axis.
    pub fn axis_label(self) -> &'static str {
        match self {
            UnitTag::Usd => "USD",
            UnitTag::Percent => "%",
            UnitTag::Bps => "bps",
            UnitTag::Index | UnitTag::Other => "idx",
        }
    }
}

impl Default for UnitTag {
    fn default() -> Self {
        UnitTag::Usd
    }
}

/// Format a large-scale value with a T/B/M/K suffix, two decimals.
/// Non-finite input renders as `"N/A"`.
pub fn format_large(value: f64) -> String {
    if !value.is_finite() {
        return "N/A".to_string();
    }
    let abs = value.abs();
    if abs >= 1e12 {
        format!("{:.2}T", value / 1e12)
    } else if abs >= 1e9 {
        format!("{:.2}B", value / 1e9)
    } else if abs >= 1e6 {
        format!("{:.2}M", value / 1e6)
    } else if abs >= 1e3 {
        format!("{:.2}K", value / 1e3)
    } else {
        format!("{value:.2}")
    }
}

/// Format a value according to its unit. USD routes to [`format_large`];
/// everything else is two decimals plus the unit suffix.
pub fn format_by_unit(value: f64, unit: UnitTag) -> String {
    if !value.is_finite() {
        return "N/A".to_string();
    }
    match unit {
        UnitTag::Usd => format_large(value),
        UnitTag::Percent => format!("{value:.2}%"),
        UnitTag::Bps => format!("{value:.2} bps"),
        UnitTag::Index | UnitTag::Other => format!("{value:.2}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_values_render_raw_with_two_decimals() {
        assert_eq!(format_large(0.0), "0.00");
        assert_eq!(format_large(999.994), "999.99");
        assert_eq!(format_large(-42.5), "-42.50");
    }

    #[test]
    fn suffixes_pick_the_largest_cleared_threshold() {
        assert_eq!(format_large(1_000.0), "1.00K");
        assert_eq!(format_large(2_500_000.0), "2.50M");
        assert_eq!(format_large(5_200_000_000.0), "5.20B");
        assert_eq!(format_large(1.3e12), "1.30T");
        // Negative values scale on |v| but keep their sign.
        assert_eq!(format_large(-8e9), "-8.00B");
    }

    #[test]
    fn billions_match_direct_division() {
        for v in [1e9, 7.77e9, 999.99e9] {
            assert_eq!(format_large(v), format!("{:.2}B", v / 1e9));
            assert!(format_large(v).ends_with('B'));
        }
    }

    #[test]
    fn non_finite_degrades_to_na() {
        assert_eq!(format_large(f64::NAN), "N/A");
        assert_eq!(format_large(f64::INFINITY), "N/A");
        assert_eq!(format_large(f64::NEG_INFINITY), "N/A");
        assert_eq!(format_by_unit(f64::NAN, UnitTag::Percent), "N/A");
    }

    #[test]
    fn unit_formatting() {
        assert_eq!(format_by_unit(3.456, UnitTag::Percent), "3.46%");
        assert_eq!(format_by_unit(-12.0, UnitTag::Bps), "-12.00 bps");
        assert_eq!(format_by_unit(101.5, UnitTag::Index), "101.50");
        assert_eq!(format_by_unit(101.5, UnitTag::Other), "101.50");
        assert_eq!(format_by_unit(4.2e12, UnitTag::Usd), "4.20T");
    }

    #[test]
    fn unit_parsing() {
        assert_eq!(UnitTag::parse("USD"), UnitTag::Usd);
        assert_eq!(UnitTag::parse("percent"), UnitTag::Percent);
        assert_eq!(UnitTag::parse("bps"), UnitTag::Bps);
        assert_eq!(UnitTag::parse("index"), UnitTag::Index);
        assert_eq!(UnitTag::parse("ratio"), UnitTag::Other);
    }
}
