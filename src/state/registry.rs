use crate::api::client::ApiClient;
use crate::api::models::{Indicator, Series};
use crate::chart::format::UnitTag;

/// Result of the startup registry load. Each failed fetch leaves its list
/// empty; the error string combines whatever failed into one banner message.
#[derive(Debug)]
pub struct RegistryLoad {
    pub indicators: Vec<Indicator>,
    pub series: Vec<Series>,
    pub error: Option<String>,
}

/// Fetch both catalog lists concurrently. Never fails: a non-success
/// response degrades to an empty list plus a banner message.
pub async fn load_registry(client: &ApiClient) -> RegistryLoad {
    let (ind, ser) = tokio::join!(client.indicators(), client.series_list());

    let mut failures = Vec::new();
    let indicators = match ind {
        Ok(list) => list,
        Err(e) => {
            tracing::error!("indicator catalog load failed: {e}");
            failures.push("indicators");
            Vec::new()
        }
    };
    let series = match ser {
        Ok(list) => list,
        Err(e) => {
            tracing::error!("series catalog load failed: {e}");
            failures.push("series");
            Vec::new()
        }
    };

    let error = if failures.is_empty() {
        None
    } else {
        Some(format!("Failed to load registry: {}", failures.join(", ")))
    };
    RegistryLoad {
        indicators,
        series,
        error,
    }
}

/// The in-memory catalog of indicators and series. Loaded once, immutable
/// afterwards; everything else derives views from it.
#[derive(Debug, Default)]
pub struct Registry {
    pub indicators: Vec<Indicator>,
    pub series: Vec<Series>,
    pub loaded: bool,
}

impl Registry {
    /// Apply a finished load and hand back the banner error, if any.
    pub fn apply(&mut self, load: RegistryLoad) -> Option<String> {
        self.indicators = load.indicators;
        self.series = load.series;
        self.loaded = true;
        tracing::info!(
            "registry loaded: {} indicators, {} series",
            self.indicators.len(),
            self.series.len()
        );
        load.error
    }

    pub fn indicator(&self, id: &str) -> Option<&Indicator> {
        self.indicators.iter().find(|i| i.id == id)
    }

    pub fn series(&self, id: &str) -> Option<&Series> {
        self.series.iter().find(|s| s.id == id)
    }

    /// Unit lookup for axis assignment and formatting: indicators first,
    /// then series, defaulting to USD when neither carries a units field.
    pub fn units_for(&self, id: &str) -> UnitTag {
        if let Some(ind) = self.indicator(id) {
            if let Some(units) = &ind.units {
                return UnitTag::parse(units);
            }
        }
        if let Some(ser) = self.series(id) {
            return UnitTag::parse(&ser.units);
        }
        UnitTag::Usd
    }

    /// Series partitioned by source label. Groups appear in first-seen order
    /// of the fetched list and keep per-group insertion order.
    pub fn series_by_source(&self) -> Vec<(&str, Vec<&Series>)> {
        let mut groups: Vec<(&str, Vec<&Series>)> = Vec::new();
        for s in &self.series {
            match groups.iter_mut().find(|(src, _)| *src == s.source) {
                Some((_, members)) => members.push(s),
                None => groups.push((s.source.as_str(), vec![s])),
            }
        }
        groups
    }

    /// Indicators whose constituent list contains the given series, for the
    /// details panel's cross-references.
    pub fn indicators_using(&self, series_id: &str) -> Vec<&Indicator> {
        self.indicators
            .iter()
            .filter(|i| i.series.iter().any(|s| s == series_id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indicator(id: &str, units: Option<&str>, series: &[&str]) -> Indicator {
        Indicator {
            id: id.to_string(),
            name: id.to_uppercase(),
            category: None,
            directionality: None,
            units: units.map(str::to_string),
            series: series.iter().map(|s| s.to_string()).collect(),
            description: None,
            impact: None,
            interpretation: None,
        }
    }

    fn series(id: &str, source: &str, units: &str) -> Series {
        Series {
            id: id.to_string(),
            name: id.to_uppercase(),
            source: source.to_string(),
            cadence: "daily".to_string(),
            units: units.to_string(),
            description: None,
            impact: None,
            interpretation: None,
        }
    }

    fn registry() -> Registry {
        Registry {
            indicators: vec![
                indicator("net_liq", Some("USD"), &["walcl", "tga"]),
                indicator("real_rate", None, &["dfii10"]),
            ],
            series: vec![
                series("walcl", "FRED", "USD"),
                series("dfii10", "FRED", "percent"),
                series("tga", "Treasury", "USD"),
                series("rrp", "FRED", "USD"),
            ],
            loaded: true,
        }
    }

    #[test]
    fn unit_lookup_prefers_indicator_then_series_then_usd() {
        let reg = registry();
        assert_eq!(reg.units_for("net_liq"), UnitTag::Usd);
        // Indicator exists but has no units: falls through to series.
        assert_eq!(reg.units_for("dfii10"), UnitTag::Percent);
        // Unknown id defaults to USD.
        assert_eq!(reg.units_for("nope"), UnitTag::Usd);
    }

    #[test]
    fn grouping_preserves_first_seen_source_order() {
        let reg = registry();
        let groups = reg.series_by_source();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "FRED");
        assert_eq!(groups[1].0, "Treasury");
        let fred: Vec<&str> = groups[0].1.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(fred, vec!["walcl", "dfii10", "rrp"]);
    }

    #[test]
    fn cross_references_find_owning_indicators() {
        let reg = registry();
        let owners: Vec<&str> = reg
            .indicators_using("walcl")
            .iter()
            .map(|i| i.id.as_str())
            .collect();
        assert_eq!(owners, vec!["net_liq"]);
        assert!(reg.indicators_using("rrp").is_empty());
    }

    #[test]
    fn failed_load_surfaces_one_error_and_empty_list() {
        let mut reg = Registry::default();
        let err = reg.apply(RegistryLoad {
            indicators: Vec::new(),
            series: vec![series("walcl", "FRED", "USD")],
            error: Some("Failed to load registry: indicators".to_string()),
        });
        assert!(err.is_some());
        assert!(reg.indicators.is_empty());
        assert_eq!(reg.series.len(), 1);
        assert!(reg.loaded);
    }
}
