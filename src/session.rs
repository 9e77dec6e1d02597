//! Per-session panel state.
//!
//! Holds what each panel currently shows. The composer reads it to tell
//! whether a panel's interval changed and updates it after every build.

use std::collections::HashMap;

use serde::Serialize;

use crate::types::{MapSelection, PanelId};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PanelState {
    /// Last selection that produced a map; `None` until one resolves
    pub selection: Option<MapSelection>,
    /// Interval whose well layers the panel shows, if any
    pub well_interval: Option<String>,
    /// Number of builds that ended in a placeholder
    pub misses: u32,
}

#[derive(Debug, Clone, Default)]
pub struct SessionState {
    panels: HashMap<PanelId, PanelState>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn panel(&self, id: PanelId) -> Option<&PanelState> {
        self.panels.get(&id)
    }

    pub fn selection(&self, id: PanelId) -> Option<&MapSelection> {
        self.panel(id).and_then(|p| p.selection.as_ref())
    }

    /// Whether `interval` differs from the interval the panel shows wells for.
    pub fn interval_changed(&self, id: PanelId, interval: &str) -> bool {
        self.panel(id).and_then(|p| p.well_interval.as_deref()) != Some(interval)
    }

    pub fn record(&mut self, id: PanelId, selection: &MapSelection, well_interval: Option<&str>) {
        let panel = self.panels.entry(id).or_default();
        panel.selection = Some(selection.clone());
        panel.well_interval = well_interval.map(str::to_string);
    }

    /// Keep the previous selection; only count the miss.
    pub fn record_miss(&mut self, id: PanelId) {
        self.panels.entry(id).or_default().misses += 1;
    }

    pub fn reset(&mut self) {
        self.panels.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MapType;

    fn selection(interval: &str) -> MapSelection {
        MapSelection {
            attribute: "max".into(),
            name: "draupne_fm_1".into(),
            map_type: MapType::Observed,
            iteration: "iter-0".into(),
            realization: "---".into(),
            interval: interval.into(),
        }
    }

    #[test]
    fn panels_are_independent() {
        let mut session = SessionState::new();
        let a = selection("2020-10-01-2019-10-01");
        session.record(0, &a, Some(&a.interval));
        assert_eq!(session.selection(0), Some(&a));
        assert!(session.selection(1).is_none());
        assert!(!session.interval_changed(0, "2020-10-01-2019-10-01"));
        assert!(session.interval_changed(1, "2020-10-01-2019-10-01"));
    }

    #[test]
    fn misses_keep_previous_selection() {
        let mut session = SessionState::new();
        let a = selection("2020-10-01-2019-10-01");
        session.record(2, &a, None);
        session.record_miss(2);
        let panel = session.panel(2).unwrap();
        assert_eq!(panel.misses, 1);
        assert_eq!(panel.selection.as_ref(), Some(&a));
        session.reset();
        assert!(session.panel(2).is_none());
    }
}
