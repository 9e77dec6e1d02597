//! Well status layers.
//!
//! One state machine decides, per wellbore, whether it belongs to a
//! requested well layer and how it is drawn. Basic selections (drilled,
//! reservoir section, planned) depend only on wellbore metadata. Flowing
//! selections (active, started, completed, generic production/injection)
//! combine production table dates and volumes with the selected interval.
//!
//! Lookup misses never fail the layer: the affected well is left out and a
//! debug event records why.

use std::collections::BTreeMap;

use tracing::debug;

use super::{TrajectoryStore, WellMetadata, WellboreMetadata};
use crate::config::defaults;
use crate::interval::{self, DatePosition};
use crate::production::{ProductionInfo, ProductionTable};
use crate::types::{Feature, FlowDirection, Fluid, Layer, StatusPhase, WellSelection};

/// Everything needed to build one well layer.
#[derive(Debug, Clone, Copy)]
pub struct WellLayerRequest<'a> {
    /// Selected 4D interval; may be empty for basic layers
    pub interval: &'a str,
    pub trajectories: &'a TrajectoryStore,
    pub metadata: &'a WellMetadata,
    pub production: Option<&'a ProductionTable>,
    /// Status code (`oil_production`, `wag_injection`, ...) → colour
    pub colors: &'a BTreeMap<String, String>,
    pub selection: WellSelection,
    /// Fluids to consider; empty means the direction's defaults
    pub fluids: &'a [Fluid],
    /// Layer name; also selects the planned-well group
    pub label: &'a str,
}

/// What a flowing well is flowing, for colour and tooltip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlowKind {
    Single(Fluid),
    /// Water alternating gas injection
    Wag,
}

impl FlowKind {
    fn code(self, direction: FlowDirection) -> String {
        match self {
            FlowKind::Single(f) => format!("{}_{}", f.as_str(), direction.as_str()),
            FlowKind::Wag => format!("wag_{}", direction.as_str()),
        }
    }
}

/// Combined production status of one well over the interval.
#[derive(Debug, Clone)]
struct FlowStatus {
    kind: FlowKind,
    start: String,
    stop: Option<String>,
    interval_volume: Option<f64>,
    total_volume: Option<f64>,
}

impl FlowStatus {
    fn from_info(fluid: Fluid, info: ProductionInfo) -> Option<Self> {
        let start = info.start_date?;
        if info.interval_volume.is_none() && info.total_volume.is_none() {
            return None;
        }
        Some(Self {
            kind: FlowKind::Single(fluid),
            start,
            stop: info.stop_date,
            interval_volume: info.interval_volume,
            total_volume: info.total_volume,
        })
    }

    fn has_interval_volume(&self) -> bool {
        self.kind == FlowKind::Wag || self.interval_volume.is_some()
    }

    fn has_total_volume(&self) -> bool {
        self.kind == FlowKind::Wag || self.total_volume.is_some_and(|v| v > 0.0)
    }

    /// `"gas 120 [MSm3] Start: 2019 Last: ---"` or `"(WAG) Start: 2019 Last: 2021"`
    fn info(&self, volume: Option<f64>) -> String {
        let year = |d: &str| d.get(0..4).unwrap_or(d).to_string();
        let last = self.stop.as_deref().map_or_else(|| "---".to_string(), year);
        match self.kind {
            FlowKind::Wag => format!("(WAG) Start: {} Last: {last}", year(&self.start)),
            FlowKind::Single(f) => format!(
                "{} {:.0} {} Start: {} Last: {last}",
                f.as_str(),
                volume.unwrap_or(0.0),
                f.unit(),
                year(&self.start)
            ),
        }
    }
}

/// Resolve what a well produces or injects over an interval.
///
/// Injection of both gas and water merges into one status: WAG when both
/// have interval volume, otherwise the fluid with interval volume, then the
/// fluid with total volume.
fn flow_status(
    production: &ProductionTable,
    pdm_name: &str,
    direction: FlowDirection,
    fluids: &[Fluid],
    interval: &str,
) -> Option<FlowStatus> {
    let fluids = if fluids.is_empty() { direction.default_fluids() } else { fluids };
    let info = |fluid| production.extract(pdm_name, direction, fluid, interval);

    if direction == FlowDirection::Injection && fluids.contains(&Fluid::Gas) && fluids.contains(&Fluid::Water) {
        let gas = info(Fluid::Gas).unwrap_or_default();
        let water = info(Fluid::Water).unwrap_or_default();
        if let (Some(gs), Some(ws)) = (&gas.start_date, &water.start_date) {
            let start = gs.min(ws).clone();
            let stop = match (&gas.stop_date, &water.stop_date) {
                (Some(a), Some(b)) => Some(a.max(b).clone()),
                _ => None,
            };
            let (kind, picked) = match (gas.interval_volume, water.interval_volume) {
                (Some(_), Some(_)) => (FlowKind::Wag, None),
                (Some(_), None) => (FlowKind::Single(Fluid::Gas), Some(&gas)),
                (None, Some(_)) => (FlowKind::Single(Fluid::Water), Some(&water)),
                (None, None) if gas.total_volume.is_some() => (FlowKind::Single(Fluid::Gas), Some(&gas)),
                (None, None) if water.total_volume.is_some() => (FlowKind::Single(Fluid::Water), Some(&water)),
                (None, None) => return None,
            };
            return Some(FlowStatus {
                kind,
                start,
                stop,
                interval_volume: picked.and_then(|p| p.interval_volume),
                total_volume: picked.and_then(|p| p.total_volume),
            });
        }
    }

    fluids
        .iter()
        .find_map(|&fluid| info(fluid).and_then(|i| FlowStatus::from_info(fluid, i)))
}

/// Polyline for one qualifying well: colour, MD range and tooltip.
struct Drawn {
    color: String,
    md_start: f64,
    md_end: Option<f64>,
    tooltip: String,
}

fn color_for(colors: &BTreeMap<String, String>, code: &str) -> String {
    colors
        .get(code)
        .or_else(|| colors.get("default"))
        .cloned()
        .unwrap_or_else(|| defaults::WELL_DEFAULT_COLOR.to_string())
}

fn default_color(colors: &BTreeMap<String, String>) -> String {
    color_for(colors, "default")
}

/// Decide whether `well` belongs to the requested layer.
fn classify(req: &WellLayerRequest<'_>, well: &WellboreMetadata) -> Option<Drawn> {
    let basic = |md_start: f64, color: String| Drawn {
        color,
        md_start,
        md_end: None,
        tooltip: well.default_tooltip(),
    };

    match req.selection {
        WellSelection::DrilledWells => {
            return well.is_drilled().then(|| basic(0.0, default_color(req.colors)));
        }
        WellSelection::ReservoirSection => {
            let top = well.top_res_md.filter(|_| well.is_drilled())?;
            return Some(basic(top, default_color(req.colors)));
        }
        WellSelection::Planned => {
            let wanted = well.is_planned() && well.layer_name == req.label;
            return wanted.then(|| basic(0.0, color_for(req.colors, "planned")));
        }
        _ => {}
    }

    let (direction, phase) = (req.selection.direction()?, req.selection.phase()?);
    if !well.is_drilled() || well.pdm_name.is_empty() {
        return None;
    }
    let Some(top_res) = well.top_res_md else {
        debug!(well = %well.wellbore_name, "No top reservoir depth, not a flowing well");
        return None;
    };
    let production = req.production?;
    let span = interval::normalize(req.interval);
    let Some(status) = flow_status(production, &well.pdm_name, direction, req.fluids, &span) else {
        debug!(well = %well.wellbore_name, pdm = %well.pdm_name, "No production record");
        return None;
    };
    if !status.has_total_volume() {
        return None;
    }

    let started = interval::is_date_within(&span, Some(status.start.as_str()));
    let stopped = interval::is_date_within(&span, status.stop.as_deref());
    let overlaps = started != DatePosition::Greater && stopped != DatePosition::Less;
    let tooltip = |info: String| format!("{}: {} ({info})", well.short_name, direction.short());
    let flowing_color = color_for(req.colors, &status.kind.code(direction));

    let drawn = |color: String, md_start: f64, md_end: Option<f64>, info: String| Drawn {
        color,
        md_start,
        md_end,
        tooltip: tooltip(info),
    };

    match phase {
        StatusPhase::Active => status.stop.is_none().then(|| {
            drawn(default_color(req.colors), top_res, None, status.info(status.total_volume))
        }),
        StatusPhase::Started => (started == DatePosition::Inside && status.has_interval_volume())
            .then(|| drawn(flowing_color, top_res, None, status.info(status.interval_volume))),
        StatusPhase::Completed => {
            let (Some(top), Some(base)) = (well.top_completion_md, well.base_completion_md) else {
                return None;
            };
            (overlaps && status.has_interval_volume())
                .then(|| drawn(flowing_color, top, Some(base), status.info(status.interval_volume)))
        }
        StatusPhase::Interval => (overlaps && status.has_interval_volume())
            .then(|| drawn(flowing_color, top_res, None, status.info(status.interval_volume))),
    }
}

/// Build the layer for one well selection.
///
/// Wells are visited in wellbore name order. A well without a trajectory,
/// or with no samples in its MD range, is left out.
pub fn derive_well_layer(req: &WellLayerRequest<'_>) -> Layer {
    let mut data = Vec::new();
    for well in req.metadata.iter() {
        let Some(drawn) = classify(req, well) else {
            continue;
        };
        let Some(trajectory) = req.trajectories.get(&well.wellbore_name) else {
            debug!(well = %well.wellbore_name, layer = %req.label, "No trajectory, skipping well");
            continue;
        };
        let positions = trajectory.positions(drawn.md_start, drawn.md_end);
        if positions.is_empty() {
            debug!(well = %well.wellbore_name, md_start = drawn.md_start, "No trajectory samples in MD range");
            continue;
        }
        data.push(Feature::polyline(drawn.color, positions, drawn.tooltip));
    }
    debug!(layer = %req.label, selection = %req.selection, wells = data.len(), "Built well layer");
    Layer::overlay(req.label, false, data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wells::{TrajectorySample, WellTrajectory};

    const PROD: &str = "\
PDM well name,Production type,Fluid,Start date,Last date,2019-01-01-2019-07-01,2019-01-01-2020-01-01,2019-01-01-2020-07-01,Total
A-1,injection,gas,2019-01-01,,100.0,250.0,400.0,400.0
A-2,production,oil,2019-08-01,2020-03-01,0.0,80.0,80.0,80.0
A-3,injection,gas,2019-02-01,,10.0,20.0,30.0,30.0
A-3,injection,water,2019-03-01,,5.0,15.0,25.0,25.0
A-4,production,oil,,,0.0,10.0,20.0,20.0
";

    struct Fixture {
        _dir: tempfile::TempDir,
        production: ProductionTable,
        metadata: WellMetadata,
        trajectories: TrajectoryStore,
        colors: BTreeMap<String, String>,
    }

    fn well(name: &str, kind: &str, layer: &str) -> WellboreMetadata {
        WellboreMetadata {
            wellbore_name: format!("NO 1/1-{name}"),
            short_name: name.into(),
            pdm_name: if kind == "planned" { String::new() } else { name.into() },
            wellbore_type: kind.into(),
            top_res_md: Some(2000.0),
            top_completion_md: Some(2100.0),
            base_completion_md: Some(2200.0),
            fluids: "gas".into(),
            layer_name: layer.into(),
            ..Default::default()
        }
    }

    fn straight_hole(name: &str) -> WellTrajectory {
        WellTrajectory {
            name: name.into(),
            samples: (0_i32..=25)
                .map(|i| {
                    let md = f64::from(i) * 100.0;
                    TrajectorySample { x: md, y: 0.0, z: md, md }
                })
                .collect(),
        }
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("BORE_GI_VOL.csv"), PROD).unwrap();
        let production = ProductionTable::load(dir.path()).unwrap();
        let metadata = WellMetadata::from_rows(vec![
            well("A-1", "injection", "Drilled wells"),
            well("A-2", "production", "Drilled wells"),
            well("A-3", "injection", "Drilled wells"),
            well("A-4", "production", "Drilled wells"),
            well("P-1", "planned", "Planned 2025"),
        ]);
        let mut trajectories = TrajectoryStore::default();
        for w in metadata.iter() {
            trajectories.insert(&w.wellbore_name, straight_hole(&w.wellbore_name));
        }
        Fixture {
            _dir: dir,
            production,
            metadata,
            trajectories,
            colors: defaults::well_colors(),
        }
    }

    fn layer(f: &Fixture, selection: WellSelection, interval: &str, label: &str) -> Layer {
        derive_well_layer(&WellLayerRequest {
            interval,
            trajectories: &f.trajectories,
            metadata: &f.metadata,
            production: Some(&f.production),
            colors: &f.colors,
            selection,
            fluids: &[],
            label,
        })
    }

    fn tooltips(layer: &Layer) -> Vec<&str> {
        layer.data.iter().filter_map(Feature::tooltip).collect()
    }

    #[test]
    fn active_injector_without_last_date_is_black() {
        let f = fixture();
        let l = layer(&f, WellSelection::ActiveInjection, "2019-07-01-2020-07-01", "Current injectors");
        let a1 = l.data.iter().find(|d| d.tooltip().is_some_and(|t| t.starts_with("A-1"))).unwrap();
        assert_eq!(a1.color(), Some("black"));
        assert_eq!(a1.tooltip(), Some("A-1: inj (gas 400 [MSm3] Start: 2019 Last: ---)"));
    }

    #[test]
    fn null_start_never_active_or_started() {
        let f = fixture();
        for selection in [WellSelection::ActiveProduction, WellSelection::ProductionStart] {
            let l = layer(&f, selection, "2019-01-01-2020-07-01", "x");
            assert!(!tooltips(&l).iter().any(|t| t.starts_with("A-4")), "{selection}");
        }
    }

    #[test]
    fn stopped_producer_is_not_active() {
        let f = fixture();
        let l = layer(&f, WellSelection::ActiveProduction, "2019-01-01-2020-07-01", "x");
        assert!(!tooltips(&l).iter().any(|t| t.starts_with("A-2")));
    }

    #[test]
    fn started_inside_interval() {
        let f = fixture();
        let l = layer(&f, WellSelection::ProductionStart, "2019-07-01-2020-01-01", "x");
        assert_eq!(tooltips(&l), vec!["A-2: prod (oil 80 [kSm3] Start: 2019 Last: 2020)"]);
        assert_eq!(l.data[0].color(), Some("green"));

        let later = layer(&f, WellSelection::ProductionStart, "2020-01-01-2020-07-01", "x");
        assert!(later.is_empty());
    }

    #[test]
    fn zero_interval_volume_excludes_well() {
        let f = fixture();
        // A-2 produced nothing after 2020-01-01
        let l = layer(&f, WellSelection::Production, "2020-01-01-2020-07-01", "x");
        assert!(!tooltips(&l).iter().any(|t| t.starts_with("A-2")));
    }

    #[test]
    fn producer_stopped_before_interval_is_excluded_despite_volume() {
        let mut f = fixture();
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("BORE_OIL_VOL.csv"),
            "PDM well name,Production type,Fluid,Start date,Last date,\
             2019-01-01-2019-07-01,2019-01-01-2020-01-01,2019-01-01-2020-07-01,Total\n\
             A-5,production,oil,2019-01-01,2019-06-01,10.0,20.0,30.0,30.0\n",
        )
        .unwrap();
        f.production = ProductionTable::load(dir.path()).unwrap();
        f.metadata = WellMetadata::from_rows(vec![well("A-5", "production", "Drilled wells")]);
        f.trajectories.insert("NO 1/1-A-5", straight_hole("NO 1/1-A-5"));

        // 20 units booked after the stop date; the stop date still wins
        let after_stop = layer(&f, WellSelection::Production, "2019-07-01-2020-07-01", "Producers");
        assert!(after_stop.is_empty());

        let spanning = layer(&f, WellSelection::Production, "2019-01-01-2020-07-01", "Producers");
        assert_eq!(spanning.data.len(), 1);
    }

    #[test]
    fn simultaneous_gas_and_water_is_wag() {
        let f = fixture();
        let l = layer(&f, WellSelection::Injection, "2019-07-01-2020-07-01", "Injectors");
        let a3 = l.data.iter().find(|d| d.tooltip().is_some_and(|t| t.starts_with("A-3"))).unwrap();
        assert_eq!(a3.color(), Some("blueviolet"));
        assert_eq!(a3.tooltip(), Some("A-3: inj ((WAG) Start: 2019 Last: ---)"));
        let a1 = l.data.iter().find(|d| d.tooltip().is_some_and(|t| t.starts_with("A-1"))).unwrap();
        assert_eq!(a1.color(), Some("red"));
    }

    #[test]
    fn completed_uses_completion_range() {
        let f = fixture();
        let l = layer(&f, WellSelection::InjectionCompleted, "2019-07-01-2020-07-01", "x");
        let a1 = l.data.iter().find(|d| d.tooltip().is_some_and(|t| t.starts_with("A-1"))).unwrap();
        assert_eq!(a1.vertex_count(), 2);
    }

    #[test]
    fn basic_layers() {
        let f = fixture();
        let drilled = layer(&f, WellSelection::DrilledWells, "", "Drilled wells");
        assert_eq!(drilled.data.len(), 4);
        assert_eq!(drilled.data[0].vertex_count(), 26);
        assert_eq!(drilled.data[0].tooltip(), Some("A-1: injection (gas)"));

        let section = layer(&f, WellSelection::ReservoirSection, "", "Reservoir sections");
        assert_eq!(section.data[0].vertex_count(), 6);

        let planned = layer(&f, WellSelection::Planned, "", "Planned 2025");
        assert_eq!(planned.data.len(), 1);
        assert_eq!(planned.data[0].color(), Some("purple"));
        assert!(layer(&f, WellSelection::Planned, "", "Planned 2030").is_empty());
    }

    #[test]
    fn missing_trajectory_excludes_well() {
        let mut f = fixture();
        f.trajectories = TrajectoryStore::default();
        assert!(layer(&f, WellSelection::DrilledWells, "", "Drilled wells").is_empty());
    }

    #[test]
    fn no_production_table_means_no_flowing_wells() {
        let f = fixture();
        let l = derive_well_layer(&WellLayerRequest {
            interval: "2019-07-01-2020-07-01",
            trajectories: &f.trajectories,
            metadata: &f.metadata,
            production: None,
            colors: &f.colors,
            selection: WellSelection::Injection,
            fluids: &[],
            label: "Injectors",
        });
        assert!(l.is_empty());
        assert_eq!(l.name, "Injectors");
    }
}
