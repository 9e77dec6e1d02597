//! Selection types: MapType, IntervalMode, MapSelection, PanelId

use serde::{Deserialize, Serialize};

// ============================================================================
// Map Type
// ============================================================================

/// Whether a map comes from seismic observation or from a simulation model.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum MapType {
    #[default]
    Observed,
    Simulated,
}

impl MapType {
    /// Catalog spelling of the map type.
    pub fn as_str(self) -> &'static str {
        match self {
            MapType::Observed => "observed",
            MapType::Simulated => "simulated",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "observed" => Some(MapType::Observed),
            "simulated" => Some(MapType::Simulated),
            _ => None,
        }
    }
}

impl std::fmt::Display for MapType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Interval Ordering Convention
// ============================================================================

/// Per-deployment ordering convention of the two dates in an interval string.
///
/// - **Normal**: the earlier date is written first (`base-monitor`)
/// - **Reverse**: the monitor date is written first (`monitor-base`)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum IntervalMode {
    #[default]
    Normal,
    Reverse,
}

impl std::fmt::Display for IntervalMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntervalMode::Normal => write!(f, "normal"),
            IntervalMode::Reverse => write!(f, "reverse"),
        }
    }
}

// ============================================================================
// Map Selection
// ============================================================================

/// One user selection for a map panel.
///
/// Constructed fresh for every interaction and never mutated once resolved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct MapSelection {
    pub attribute: String,
    /// Zone / surface name
    pub name: String,
    pub map_type: MapType,
    /// Ensemble / iteration identifier (e.g. `iter-0`)
    pub iteration: String,
    /// Realization identifier (e.g. `realization-0`, `mean`, `---`)
    pub realization: String,
    /// 4D interval string, `YYYY-MM-DD-YYYY-MM-DD`
    pub interval: String,
}

impl std::fmt::Display for MapSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{} {} {} {} {} {}]",
            self.map_type, self.realization, self.iteration, self.name, self.attribute, self.interval
        )
    }
}

/// Index of a map panel in the viewer (0-based).
pub type PanelId = usize;

/// Kind of surface behind a selection, derived from the realization name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceKind {
    /// A single model realization (`realization-N`)
    Realization,
    /// Observed data (realization written as `---`)
    Observation,
    /// Statistical aggregation over realizations (`mean`, `std`, ...)
    Aggregation,
}

impl SurfaceKind {
    pub fn from_realization(realization: &str) -> Self {
        if realization.contains("realization") {
            SurfaceKind::Realization
        } else if realization.contains("---") {
            SurfaceKind::Observation
        } else {
            SurfaceKind::Aggregation
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_kind_from_realization_names() {
        assert_eq!(SurfaceKind::from_realization("realization-3"), SurfaceKind::Realization);
        assert_eq!(SurfaceKind::from_realization("---"), SurfaceKind::Observation);
        assert_eq!(SurfaceKind::from_realization("mean"), SurfaceKind::Aggregation);
    }

    #[test]
    fn map_type_round_trips_catalog_spelling() {
        assert_eq!(MapType::parse("observed"), Some(MapType::Observed));
        assert_eq!(MapType::parse(" simulated "), Some(MapType::Simulated));
        assert_eq!(MapType::parse("other"), None);
        assert_eq!(MapType::Simulated.to_string(), "simulated");
    }
}
