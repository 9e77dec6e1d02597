//! Layer Composer - assembles one map panel per user selection
//!
//! ```text
//! STAGE 1: Resolve the selection to a map file (catalog)
//! STAGE 2: Read the grid and scale it (surface, cached by path)
//! STAGE 3: Zone polygon layers for the selected zone (cached by path,
//!          default top-reservoir layer when the zone has none)
//! STAGE 4: Additional polygon layers (built once)
//! STAGE 5: Basic well layers (built once)
//! STAGE 6: Interval well layers (cached by interval, only for intervals
//!          starting on or before both the last observed date and the
//!          production update date)
//! ```
//!
//! A selection that does not resolve, or whose map file is missing or
//! unreadable, yields the placeholder panel. Nothing here fails a session.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::cache::KeyedCache;
use crate::catalog::SurfaceCatalog;
use crate::config::{defaults, PolygonLayerSpec, Selectors, ViewerConfig};
use crate::error::{Result, ViewerError};
use crate::interval;
use crate::polygons::{self, PolygonMapping};
use crate::production::ProductionTable;
use crate::session::SessionState;
use crate::surface::{self, MapScaling, SurfaceGrid, SurfaceScaling};
use crate::types::{Fluid, Layer, MapPanel, MapSelection, MapType, PanelId, WellSelection};
use crate::wells::{derive_well_layer, TrajectoryStore, UpdateDates, WellLayerRequest, WellMetadata};

// ============================================================================
// Loaded Inputs
// ============================================================================

/// Everything read from disk at start-up. Read-only afterwards.
#[derive(Debug)]
pub struct ViewerData {
    pub config: ViewerConfig,
    pub catalog: SurfaceCatalog,
    pub selectors: Selectors,
    pub wells: WellMetadata,
    pub trajectories: TrajectoryStore,
    pub production: Option<ProductionTable>,
    pub polygon_mapping: Option<PolygonMapping>,
    pub scaling: Option<SurfaceScaling>,
    pub updates: UpdateDates,
}

impl ViewerData {
    /// Load every configured input.
    ///
    /// Only the surface catalog is required. Every other input degrades to
    /// "absent" with a warning, which leaves the matching layers empty.
    pub fn load(config: ViewerConfig) -> Result<Self> {
        let catalog_path = config
            .data
            .surface_metadata_file
            .as_deref()
            .map(|p| config.resolve_path(p))
            .ok_or(ViewerError::NotConfigured("data.surface_metadata_file"))?;
        let catalog = SurfaceCatalog::load(&catalog_path)?;
        let foreign = catalog.files_without_suffix(&config.map_suffix);
        if let Some(first) = foreign.first() {
            warn!(
                files = foreign.len(),
                suffix = %config.map_suffix,
                example = %first,
                "Catalog lists map files without the map suffix"
            );
        }

        let selectors = match config.data.selector_file.as_deref().map(|p| config.resolve_path(p)) {
            Some(path) => Selectors::load(&path).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "Selector file unreadable, deriving options from catalog");
                derive_selectors(&catalog, &config)
            }),
            None => derive_selectors(&catalog, &config),
        };

        let well_dir = config.data.well_data.as_deref().map(|p| config.resolve_path(p));
        let (wells, trajectories) = match well_dir.as_deref() {
            Some(dir) => match WellMetadata::load(&dir.join(defaults::WELLBORE_INFO_FILE)) {
                Ok(wells) => {
                    let trajectories = TrajectoryStore::load(&wells, dir, config.wells.resample_md_spacing);
                    (wells, trajectories)
                }
                Err(e) => {
                    warn!(dir = %dir.display(), error = %e, "Well data unavailable, well layers will be empty");
                    (WellMetadata::default(), TrajectoryStore::default())
                }
            },
            None => (WellMetadata::default(), TrajectoryStore::default()),
        };

        let production = optional(&config, config.data.production_data.as_deref(), "production data", |p| {
            ProductionTable::load(p)
        });
        let polygon_mapping = optional(&config, config.data.polygon_mapping_file.as_deref(), "polygon mapping", |p| {
            PolygonMapping::load(p)
        });
        let scaling = optional(&config, config.data.surface_scaling_file.as_deref(), "surface scaling", |p| {
            SurfaceScaling::load(p)
        });
        let updates = UpdateDates::load(well_dir.as_deref(), production.as_ref());

        info!(
            maps = catalog.rows().len(),
            wells = wells.len(),
            trajectories = trajectories.len(),
            production = production.is_some(),
            "Viewer data loaded"
        );

        Ok(Self {
            config,
            catalog,
            selectors,
            wells,
            trajectories,
            production,
            polygon_mapping,
            scaling,
            updates,
        })
    }
}

fn derive_selectors(catalog: &SurfaceCatalog, config: &ViewerConfig) -> Selectors {
    Selectors {
        observed: Some(catalog.selector_options(MapType::Observed, config.interval_mode)),
        simulated: Some(catalog.selector_options(MapType::Simulated, config.interval_mode)),
    }
}

fn optional<T>(
    config: &ViewerConfig,
    path: Option<&Path>,
    what: &str,
    load: impl FnOnce(&Path) -> Result<T>,
) -> Option<T> {
    let path = config.resolve_path(path?);
    match load(&path) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Optional input unavailable: {}", what);
            None
        }
    }
}

// ============================================================================
// Viewer
// ============================================================================

pub struct Viewer {
    data: ViewerData,
    surfaces: KeyedCache<PathBuf, SurfaceGrid>,
    zone_layers: KeyedCache<PathBuf, Option<Layer>>,
    interval_layers: KeyedCache<String, Vec<Layer>>,
    /// Top-reservoir zone layer per configured zone polygon layer, same order
    default_zone_layers: Vec<Option<Layer>>,
    additional_layers: Vec<Layer>,
    basic_layers: Vec<Layer>,
    /// Interval well layers are offered up to this date
    last_observed_date: String,
}

impl Viewer {
    pub fn new(data: ViewerData) -> Self {
        let last_observed_date = data
            .selectors
            .last_observed_date()
            .unwrap_or_else(|| defaults::OPEN_ENDED_DATE.to_string());

        let mut viewer = Self {
            data,
            surfaces: KeyedCache::new(),
            zone_layers: KeyedCache::new(),
            interval_layers: KeyedCache::new(),
            default_zone_layers: Vec::new(),
            additional_layers: Vec::new(),
            basic_layers: Vec::new(),
            last_observed_date,
        };
        viewer.default_zone_layers = viewer
            .data
            .config
            .zone_polygon_layers
            .values()
            .map(|spec| viewer.zone_layer(None, spec))
            .collect();
        viewer.additional_layers = viewer.build_additional_layers();
        viewer.basic_layers = viewer.build_basic_layers();

        info!(
            zone_layers = viewer.default_zone_layers.iter().flatten().count(),
            additional_layers = viewer.additional_layers.len(),
            basic_well_layers = viewer.basic_layers.len(),
            last_observed_date = %viewer.last_observed_date,
            "Viewer initialised"
        );
        viewer
    }

    pub fn data(&self) -> &ViewerData {
        &self.data
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.data.config
    }

    pub fn last_observed_date(&self) -> &str {
        &self.last_observed_date
    }

    pub fn update_dates(&self) -> &UpdateDates {
        &self.data.updates
    }

    /// Drop every cached grid and layer. Layers built at start-up are kept.
    pub fn clear_caches(&self) {
        self.surfaces.clear();
        self.zone_layers.clear();
        self.interval_layers.clear();
    }

    // ========================================================================
    // Panel Assembly
    // ========================================================================

    /// Build the panel for `selection` and record it in the session.
    pub fn build_panel(&self, session: &mut SessionState, panel: PanelId, selection: &MapSelection) -> MapPanel {
        let config = &self.data.config;

        // STAGE 1
        let path = match self.data.catalog.resolve_map_path(selection, config.interval_mode) {
            Ok(p) => config.resolve_path(&p),
            Err(e) => {
                warn!(panel, error = %e, "Selected map not found");
                session.record_miss(panel);
                return self.placeholder();
            }
        };
        if !path.is_file() {
            warn!(panel, path = %path.display(), selection = %selection, "Selected map file does not exist");
            session.record_miss(panel);
            return self.placeholder();
        }

        // STAGE 2
        let grid = match self.surfaces.get_or_try_load(&path, || SurfaceGrid::load(&path)) {
            Ok(g) => g,
            Err(e) => {
                warn!(panel, error = %e, "Selected map could not be read");
                session.record_miss(panel);
                return self.placeholder();
            }
        };
        debug!(panel, nodes = grid.values.len(), defined = grid.defined_count(), "Map grid ready");
        let limits = self.data.scaling.as_ref().and_then(|s| s.limits(selection));
        let scaling = MapScaling::resolve(
            config.attribute_settings.get(&selection.attribute),
            &config.default_colormap,
            limits,
        );
        let mut layers = vec![surface::surface_layer(&path, &grid, &selection.attribute, &scaling)];

        // STAGE 3
        for (spec, fallback) in config.zone_polygon_layers.values().zip(&self.default_zone_layers) {
            match self.zone_layer(Some(selection), spec).or_else(|| fallback.clone()) {
                Some(layer) => layers.push(layer),
                None => debug!(tagname = %spec.tagname, zone = %selection.name, "No zone polygon layer"),
            }
        }

        // STAGE 4 & 5
        layers.extend(self.additional_layers.iter().cloned());
        layers.extend(self.basic_layers.iter().cloned());

        // STAGE 6
        let well_interval = self.offers_interval_wells(&selection.interval);
        if well_interval {
            if session.interval_changed(panel, &selection.interval) {
                debug!(panel, interval = %selection.interval, "Loading interval well layers");
            }
            layers.extend(self.interval_well_layers(&selection.interval).iter().cloned());
        }

        session.record(panel, selection, well_interval.then_some(selection.interval.as_str()));
        let (heading, sim_info) = heading(selection);
        info!(panel, selection = %selection, layers = layers.len(), "Built map panel");
        MapPanel {
            heading,
            sim_info,
            layers,
            label: interval::plot_label(&selection.interval, &config.date_labels),
            update_info: self.data.updates.info_text(),
        }
    }

    fn placeholder(&self) -> MapPanel {
        MapPanel {
            update_info: self.data.updates.info_text(),
            ..MapPanel::placeholder()
        }
    }

    /// Whether interval well layers are shown for `interval`.
    fn offers_interval_wells(&self, interval: &str) -> bool {
        let normalized = interval::normalize(interval);
        match interval::split(&normalized) {
            Some((start, _)) => {
                start <= self.last_observed_date.as_str() && self.data.updates.covers(start)
            }
            None => false,
        }
    }

    // ========================================================================
    // Polygon Layers
    // ========================================================================

    /// Zone polygon layer for a selection, or the default layer for `None`.
    fn zone_layer(&self, selection: Option<&MapSelection>, spec: &PolygonLayerSpec) -> Option<Layer> {
        let config = &self.data.config;
        let top = &config.top_reservoir;
        let mapped = selection.and_then(|s| {
            self.data
                .polygon_mapping
                .as_ref()
                .and_then(|m| m.polygon_name(&s.name, &spec.tagname))
        });
        let polygon_name = mapped.or(top.polygon_name.as_deref())?;

        let fmu_directory = config.resolve_path(&config.fmu_directory);
        let dir = polygons::zone_polygon_dir(&fmu_directory, top, selection);
        let path = polygons::zone_polygon_file(&dir, polygon_name, spec);
        if !path.is_file() {
            debug!(path = %path.display(), "Zone polygon file not found");
            return None;
        }
        let loaded = self.zone_layers.get_or_try_load(&path, || {
            polygons::load_zone_layer(&path, spec, polygon_name, &config.colors.polygons)
        });
        match loaded {
            Ok(layer) => (*layer).clone(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Skipping zone polygon layer");
                None
            }
        }
    }

    /// Default zone layers followed by the additional polygon layers.
    pub fn polygon_layers(&self) -> Vec<Layer> {
        self.default_zone_layers
            .iter()
            .flatten()
            .chain(&self.additional_layers)
            .cloned()
            .collect()
    }

    fn build_additional_layers(&self) -> Vec<Layer> {
        let config = &self.data.config;
        let Some(polygon_data) = config.data.polygon_data.as_deref() else {
            return Vec::new();
        };
        let polygon_data = config.resolve_path(polygon_data);
        config
            .additional_polygon_layers
            .values()
            .filter_map(|spec| {
                match polygons::load_additional_layer(&polygon_data, spec, &config.colors.polygons) {
                    Ok(layer) => layer,
                    Err(e) => {
                        warn!(tagname = %spec.tagname, error = %e, "Skipping additional polygon layer");
                        None
                    }
                }
            })
            .collect()
    }

    // ========================================================================
    // Well Layers
    // ========================================================================

    /// One well layer for a selection and interval.
    pub fn well_layer(&self, selection: WellSelection, interval: &str, label: &str, fluids: &[Fluid]) -> Layer {
        let colors = self.data.config.well_colors();
        derive_well_layer(&WellLayerRequest {
            interval,
            trajectories: &self.data.trajectories,
            metadata: &self.data.wells,
            production: self.data.production.as_ref(),
            colors: &colors,
            selection,
            fluids,
            label,
        })
    }

    fn build_basic_layers(&self) -> Vec<Layer> {
        let labels = self.data.config.basic_well_layers();
        let mut layers: Vec<Layer> = labels
            .iter()
            .filter_map(|(key, label)| configured_selection(key).map(|s| (s, label)))
            .filter(|(s, _)| *s != WellSelection::Planned)
            .map(|(s, label)| self.well_layer(s, "", label, &[]))
            .collect();
        for label in self.data.wells.planned_layer_names() {
            layers.push(self.well_layer(WellSelection::Planned, "", &label, &[]));
        }
        layers.retain(|l| !l.is_empty());
        layers
    }

    /// Interval well layers, cached per interval string.
    pub fn interval_well_layers(&self, interval: &str) -> Arc<Vec<Layer>> {
        self.interval_layers.get_or_load(&interval.to_string(), || {
            self.data
                .config
                .additional_well_layers()
                .iter()
                .filter_map(|(key, label)| configured_selection(key).map(|s| (s, label)))
                .map(|(s, label)| self.well_layer(s, interval, label, &[]))
                .filter(|l| !l.is_empty())
                .collect()
        })
    }

    // ========================================================================
    // Default Selections
    // ========================================================================

    /// Initial selection of every panel.
    ///
    /// Panel 0 shows an observed map and the others simulated maps when the
    /// selector offers them; each field takes the first option unless the
    /// configuration sets a per-panel default.
    pub fn default_selections(&self) -> Vec<MapSelection> {
        let selectors = &self.data.selectors;
        let config = &self.data.config;
        (0..defaults::PANEL_COUNT)
            .filter_map(|panel| {
                let preferred = if panel == 0 { MapType::Observed } else { MapType::Simulated };
                let configured = config.panels.get(panel);
                let map_type = configured
                    .and_then(|p| p.map_type)
                    .filter(|t| selectors.for_type(*t).is_some())
                    .or_else(|| Some(preferred).filter(|t| selectors.for_type(*t).is_some()))
                    .or_else(|| {
                        [MapType::Observed, MapType::Simulated]
                            .into_iter()
                            .find(|t| selectors.for_type(*t).is_some())
                    })?;
                let options = selectors.for_type(map_type)?;
                Some(MapSelection {
                    attribute: pick(configured.and_then(|p| p.attribute.as_ref()), &options.attribute),
                    name: pick(configured.and_then(|p| p.name.as_ref()), &options.name),
                    map_type,
                    iteration: pick(configured.and_then(|p| p.iteration.as_ref()), &options.iteration),
                    realization: pick(configured.and_then(|p| p.realization.as_ref()), &options.realization),
                    interval: pick(configured.and_then(|p| p.interval.as_ref()), &options.interval),
                })
            })
            .collect()
    }
}

fn pick(configured: Option<&String>, options: &[String]) -> String {
    configured.or(options.first()).cloned().unwrap_or_default()
}

fn configured_selection(key: &str) -> Option<WellSelection> {
    let selection = WellSelection::parse(key);
    if selection.is_none() {
        warn!(key, "Unknown well layer key in configuration");
    }
    selection
}

/// Panel heading and simulation info line.
pub fn heading(selection: &MapSelection) -> (String, String) {
    match selection.map_type {
        MapType::Observed => (
            format!("Observed map: {} ({})", selection.attribute, selection.name),
            "-".to_string(),
        ),
        MapType::Simulated => (
            format!("Simulated map: {} ({})", selection.attribute, selection.name),
            format!("{} {}", selection.iteration, selection.realization),
        ),
    }
}

/// JSON payload of a panel for the host.
pub fn panel_json(panel: &MapPanel) -> serde_json::Result<String> {
    serde_json::to_string_pretty(panel)
}
