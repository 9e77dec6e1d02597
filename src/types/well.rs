//! Well status vocabulary: which well layer is requested, fluids, flow direction

use serde::{Deserialize, Serialize};

/// Produced or injected fluid.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Fluid {
    Oil,
    Gas,
    Water,
}

impl Fluid {
    pub fn as_str(self) -> &'static str {
        match self {
            Fluid::Oil => "oil",
            Fluid::Gas => "gas",
            Fluid::Water => "water",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "oil" => Some(Fluid::Oil),
            "gas" => Some(Fluid::Gas),
            "water" => Some(Fluid::Water),
            _ => None,
        }
    }

    /// Volume unit used in tooltips.
    pub fn unit(self) -> &'static str {
        match self {
            Fluid::Oil => "[kSm3]",
            Fluid::Gas => "[MSm3]",
            Fluid::Water => "[Sm3]",
        }
    }
}

impl std::fmt::Display for Fluid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Direction of flow recorded in the production tables.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FlowDirection {
    Production,
    Injection,
}

impl FlowDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            FlowDirection::Production => "production",
            FlowDirection::Injection => "injection",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" => Some(FlowDirection::Production),
            "injection" => Some(FlowDirection::Injection),
            _ => None,
        }
    }

    /// Short form used in well tooltips.
    pub fn short(self) -> &'static str {
        match self {
            FlowDirection::Production => "prod",
            FlowDirection::Injection => "inj",
        }
    }

    /// Fluids looked up when no explicit fluid list is given.
    pub fn default_fluids(self) -> &'static [Fluid] {
        match self {
            FlowDirection::Production => &[Fluid::Oil],
            FlowDirection::Injection => &[Fluid::Gas, Fluid::Water],
        }
    }
}

/// Which part of the interval logic a flowing-well selection applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusPhase {
    /// Currently flowing, interval ignored
    Active,
    /// First flow strictly inside the interval
    Started,
    /// Flowing in the interval, drawn over the completed MD range
    Completed,
    /// Flowing in the interval
    Interval,
}

/// Requested well layer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum WellSelection {
    DrilledWells,
    ReservoirSection,
    Planned,
    ActiveProduction,
    ActiveInjection,
    Production,
    ProductionStart,
    ProductionCompleted,
    Injection,
    InjectionStart,
    InjectionCompleted,
}

impl WellSelection {
    pub const BASIC: [WellSelection; 4] = [
        WellSelection::DrilledWells,
        WellSelection::ReservoirSection,
        WellSelection::ActiveProduction,
        WellSelection::ActiveInjection,
    ];

    pub const INTERVAL: [WellSelection; 6] = [
        WellSelection::Production,
        WellSelection::ProductionStart,
        WellSelection::ProductionCompleted,
        WellSelection::Injection,
        WellSelection::InjectionStart,
        WellSelection::InjectionCompleted,
    ];

    pub fn key(self) -> &'static str {
        match self {
            WellSelection::DrilledWells => "drilled_wells",
            WellSelection::ReservoirSection => "reservoir_section",
            WellSelection::Planned => "planned",
            WellSelection::ActiveProduction => "active_production",
            WellSelection::ActiveInjection => "active_injection",
            WellSelection::Production => "production",
            WellSelection::ProductionStart => "production_start",
            WellSelection::ProductionCompleted => "production_completed",
            WellSelection::Injection => "injection",
            WellSelection::InjectionStart => "injection_start",
            WellSelection::InjectionCompleted => "injection_completed",
        }
    }

    pub fn parse(key: &str) -> Option<Self> {
        let all = Self::BASIC
            .iter()
            .chain(Self::INTERVAL.iter())
            .chain(std::iter::once(&WellSelection::Planned));
        all.copied().find(|s| s.key() == key.trim())
    }

    /// Flow direction for production/injection selections.
    pub fn direction(self) -> Option<FlowDirection> {
        match self {
            WellSelection::ActiveProduction
            | WellSelection::Production
            | WellSelection::ProductionStart
            | WellSelection::ProductionCompleted => Some(FlowDirection::Production),
            WellSelection::ActiveInjection
            | WellSelection::Injection
            | WellSelection::InjectionStart
            | WellSelection::InjectionCompleted => Some(FlowDirection::Injection),
            _ => None,
        }
    }

    pub fn phase(self) -> Option<StatusPhase> {
        match self {
            WellSelection::ActiveProduction | WellSelection::ActiveInjection => Some(StatusPhase::Active),
            WellSelection::ProductionStart | WellSelection::InjectionStart => Some(StatusPhase::Started),
            WellSelection::ProductionCompleted | WellSelection::InjectionCompleted => {
                Some(StatusPhase::Completed)
            }
            WellSelection::Production | WellSelection::Injection => Some(StatusPhase::Interval),
            _ => None,
        }
    }
}

impl std::fmt::Display for WellSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_keys_parse_back() {
        for s in WellSelection::BASIC.iter().chain(WellSelection::INTERVAL.iter()) {
            assert_eq!(WellSelection::parse(s.key()), Some(*s));
        }
        assert_eq!(WellSelection::parse("planned"), Some(WellSelection::Planned));
        assert_eq!(WellSelection::parse("bogus"), None);
    }

    #[test]
    fn direction_and_phase() {
        assert_eq!(WellSelection::InjectionStart.direction(), Some(FlowDirection::Injection));
        assert_eq!(WellSelection::InjectionStart.phase(), Some(StatusPhase::Started));
        assert_eq!(WellSelection::DrilledWells.direction(), None);
        assert_eq!(WellSelection::DrilledWells.phase(), None);
    }
}
