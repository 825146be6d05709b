use std::collections::BTreeSet;

/// The two independent charted-identifier sets. Membership is toggled by the
/// user; the app watches `revision` to know when to reschedule assembly.
#[derive(Debug, Default, Clone)]
pub struct ChartSelection {
    indicators: BTreeSet<String>,
    series: BTreeSet<String>,
    revision: u64,
}

impl ChartSelection {
    /// Add if absent, remove if present.
    pub fn toggle_indicator(&mut self, id: &str) {
        if !self.indicators.remove(id) {
            self.indicators.insert(id.to_string());
        }
        self.revision += 1;
    }

    pub fn toggle_series(&mut self, id: &str) {
        if !self.series.remove(id) {
            self.series.insert(id.to_string());
        }
        self.revision += 1;
    }

    pub fn clear(&mut self) {
        if !self.is_empty() {
            self.indicators.clear();
            self.series.clear();
            self.revision += 1;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.indicators.is_empty() && self.series.is_empty()
    }

    pub fn has_indicator(&self, id: &str) -> bool {
        self.indicators.contains(id)
    }

    pub fn has_series(&self, id: &str) -> bool {
        self.series.contains(id)
    }

    pub fn indicator_ids(&self) -> Vec<String> {
        self.indicators.iter().cloned().collect()
    }

    pub fn series_ids(&self) -> Vec<String> {
        self.series.iter().cloned().collect()
    }

    pub fn indicator_count(&self) -> usize {
        self.indicators.len()
    }

    pub fn series_count(&self) -> usize {
        self.series.len()
    }

    /// Bumped on every mutation; never reset.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

/// What kind of catalog item the read-only detail view points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusMode {
    Indicator,
    Series,
}

/// The single focused item driving the details panel. Decoupled from the
/// charted sets: changing focus never touches them and vice versa.
#[derive(Debug, Default, Clone)]
pub struct Focus {
    current: Option<(FocusMode, String)>,
}

impl Focus {
    /// Replace the focus unconditionally. This is the cross-reference
    /// navigation path: re-focusing the same item is a no-op, not a toggle.
    pub fn set(&mut self, mode: FocusMode, id: &str) {
        self.current = Some((mode, id.to_string()));
    }

    /// Catalog-row gesture: clicking the already-focused item clears focus,
    /// anything else focuses it.
    pub fn toggle(&mut self, mode: FocusMode, id: &str) {
        match &self.current {
            Some((m, i)) if *m == mode && i == id => self.current = None,
            _ => self.current = Some((mode, id.to_string())),
        }
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn current(&self) -> Option<(FocusMode, &str)> {
        self.current.as_ref().map(|(m, id)| (*m, id.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_round_trip_restores_the_set() {
        let mut sel = ChartSelection::default();
        sel.toggle_indicator("net_liq");
        sel.toggle_series("walcl");
        let before = sel.series_ids();

        sel.toggle_series("tga");
        sel.toggle_series("tga");
        assert_eq!(sel.series_ids(), before);
        assert!(sel.has_indicator("net_liq"));
    }

    #[test]
    fn sets_are_independent() {
        let mut sel = ChartSelection::default();
        sel.toggle_indicator("x");
        sel.toggle_series("x");
        sel.toggle_indicator("x");
        assert!(!sel.has_indicator("x"));
        assert!(sel.has_series("x"));
    }

    #[test]
    fn revision_moves_on_every_mutation() {
        let mut sel = ChartSelection::default();
        let r0 = sel.revision();
        sel.toggle_indicator("a");
        assert!(sel.revision() > r0);
        let r1 = sel.revision();
        sel.clear();
        assert!(sel.revision() > r1);
        // Clearing an already-empty selection changes nothing.
        let r2 = sel.revision();
        sel.clear();
        assert_eq!(sel.revision(), r2);
    }

    #[test]
    fn focus_toggle_clears_on_repeat_but_set_does_not() {
        let mut focus = Focus::default();
        focus.toggle(FocusMode::Series, "walcl");
        assert_eq!(focus.current(), Some((FocusMode::Series, "walcl")));

        // Same gesture again clears.
        focus.toggle(FocusMode::Series, "walcl");
        assert_eq!(focus.current(), None);

        // Cross-reference navigation sets unconditionally.
        focus.set(FocusMode::Series, "walcl");
        focus.set(FocusMode::Series, "walcl");
        assert_eq!(focus.current(), Some((FocusMode::Series, "walcl")));

        // Same id under a different mode is a different focus.
        focus.toggle(FocusMode::Indicator, "walcl");
        assert_eq!(focus.current(), Some((FocusMode::Indicator, "walcl")));
    }
}
