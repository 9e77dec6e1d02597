//! Viewer Configuration - deployment settings as TOML values
//!
//! Every setting has a `Default` matching the built-in behaviour, so a
//! deployment only lists what it changes. Relative data paths are resolved
//! against the directory of the configuration file.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use super::defaults;
use crate::interval;
use crate::types::{IntervalMode, MapType};

// ============================================================================
// Config Provenance: tracks which keys the user explicitly set
// ============================================================================

/// Dotted key paths explicitly present in the user's TOML file.
///
/// After deserialization every `#[serde(default)]` field has a value; this
/// keeps the distinction so "falling back to default" can be reported.
#[derive(Debug, Clone, Default)]
pub struct ConfigProvenance {
    pub explicit_keys: HashSet<String>,
}

impl ConfigProvenance {
    pub fn is_user_set(&self, dotted_key: &str) -> bool {
        self.explicit_keys.contains(dotted_key)
    }
}

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for one viewer deployment.
///
/// Load with `ViewerConfig::load()` which searches:
/// 1. `$SV4D_CONFIG` env var
/// 2. `./viewer_config.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Root of the FMU case (realization/iteration folders live below it)
    #[serde(default)]
    pub fmu_directory: PathBuf,

    /// Free-text label shown above the viewer
    #[serde(default)]
    pub label: String,

    /// Ordering convention of interval strings
    #[serde(default)]
    pub interval_mode: IntervalMode,

    #[serde(default = "default_map_suffix")]
    pub map_suffix: String,

    #[serde(default = "default_colormap")]
    pub default_colormap: String,

    /// Input files and folders
    #[serde(default)]
    pub data: DataPaths,

    /// Well layer labels and trajectory handling
    #[serde(default)]
    pub wells: WellSettings,

    /// Where default (top reservoir) surfaces and polygons are found
    #[serde(default)]
    pub top_reservoir: TopReservoir,

    /// Polygon layers that follow the selected zone, keyed by polygon class
    #[serde(default)]
    pub zone_polygon_layers: BTreeMap<String, PolygonLayerSpec>,

    /// Static polygon layers (PRM lines, outlines, ...)
    #[serde(default)]
    pub additional_polygon_layers: BTreeMap<String, PolygonLayerSpec>,

    /// Colour overrides
    #[serde(default)]
    pub colors: ColorSettings,

    /// Colormap and value range per attribute
    #[serde(default)]
    pub attribute_settings: BTreeMap<String, AttributeSettings>,

    /// Survey names by compact date (`YYYYMMDD`), used in interval labels
    #[serde(default)]
    pub date_labels: BTreeMap<String, String>,

    /// Explicit per-panel default selections
    #[serde(default)]
    pub panels: Vec<PanelDefaults>,

    /// Directory the config was loaded from; relative paths resolve here
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            fmu_directory: PathBuf::new(),
            label: String::new(),
            interval_mode: IntervalMode::default(),
            map_suffix: default_map_suffix(),
            default_colormap: default_colormap(),
            data: DataPaths::default(),
            wells: WellSettings::default(),
            top_reservoir: TopReservoir::default(),
            zone_polygon_layers: BTreeMap::new(),
            additional_polygon_layers: BTreeMap::new(),
            colors: ColorSettings::default(),
            attribute_settings: BTreeMap::new(),
            date_labels: BTreeMap::new(),
            panels: Vec::new(),
            base_dir: PathBuf::new(),
        }
    }
}

fn default_map_suffix() -> String {
    defaults::MAP_SUFFIX.to_string()
}

fn default_colormap() -> String {
    defaults::DEFAULT_COLORMAP.to_string()
}

impl ViewerConfig {
    /// Load configuration using the standard search order:
    /// 1. `$SV4D_CONFIG` environment variable
    /// 2. `./viewer_config.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        Self::load_with_provenance().0
    }

    /// Same search order as `load()`, also returning which keys the user set.
    pub fn load_with_provenance() -> (Self, ConfigProvenance) {
        if let Ok(path) = std::env::var(defaults::CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file_with_provenance(&p) {
                    Ok((config, provenance)) => {
                        info!(path = %p.display(), "Loaded viewer config from {}", defaults::CONFIG_ENV_VAR);
                        return (config, provenance);
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load viewer config, falling back");
                    }
                }
            } else {
                warn!(path = %path, "{} points to non-existent file, falling back", defaults::CONFIG_ENV_VAR);
            }
        }

        let local = PathBuf::from(defaults::LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file_with_provenance(&local) {
                Ok((config, provenance)) => {
                    info!("Loaded viewer config from ./{}", defaults::LOCAL_CONFIG_FILE);
                    return (config, provenance);
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{}, using defaults", defaults::LOCAL_CONFIG_FILE);
                }
            }
        }

        info!("No viewer config found, using built-in defaults");
        (Self::default(), ConfigProvenance::default())
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let (config, _provenance) = Self::load_from_file_with_provenance(path)?;
        Ok(config)
    }

    pub fn load_from_file_with_provenance(path: &Path) -> Result<(Self, ConfigProvenance), ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Self::from_toml_str(&contents, base_dir)
    }

    /// Parse a TOML document. Unknown keys are reported as warnings only.
    pub fn from_toml_str(contents: &str, base_dir: PathBuf) -> Result<(Self, ConfigProvenance), ConfigError> {
        let typo_warnings = super::validation::validate_unknown_keys(contents);
        for w in &typo_warnings {
            warn!("{}", w);
        }

        let provenance = ConfigProvenance {
            explicit_keys: contents
                .parse::<toml::Value>()
                .map(|v| super::validation::walk_toml_keys(&v, ""))
                .unwrap_or_default()
                .into_iter()
                .collect(),
        };

        let mut config: Self = toml::from_str(contents).map_err(ConfigError::Parse)?;
        config.base_dir = base_dir;
        config.validate()?;
        config.report_fallbacks(&provenance);
        Ok((config, provenance))
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Resolve a configured path against the config directory.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() || self.base_dir.as_os_str().is_empty() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    /// Optional settings left out of the file; warned about once at load.
    fn report_fallbacks(&self, provenance: &ConfigProvenance) {
        if !provenance.is_user_set("colors.wells") {
            warn!("No well colours configured, using built-in palette");
        }
        if self.data.surface_scaling_file.is_none() {
            warn!("No surface scaling file configured, using attribute settings only");
        }
        if self.attribute_settings.is_empty() {
            warn!(colormap = %self.default_colormap, "No attribute settings configured, using default colormap");
        }
    }

    /// Validate settings for internal consistency, collecting every problem.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        let spacing = self.wells.resample_md_spacing;
        if !spacing.is_finite() || spacing < 0.0 {
            errors.push(format!(
                "wells.resample_md_spacing must be a finite value >= 0, got {spacing}"
            ));
        }

        for (section, layers) in [
            ("zone_polygon_layers", &self.zone_polygon_layers),
            ("additional_polygon_layers", &self.additional_polygon_layers),
        ] {
            for (key, spec) in layers {
                if spec.tagname.trim().is_empty() {
                    errors.push(format!("{section}.{key}.tagname must not be empty"));
                }
                if PolygonFormat::parse(&spec.format).is_none() {
                    errors.push(format!(
                        "{section}.{key}.format '{}' is not one of csv, rms, prm, pol",
                        spec.format
                    ));
                }
            }
        }

        for (attribute, s) in &self.attribute_settings {
            for (name, v) in [("min_value", s.min_value), ("max_value", s.max_value)] {
                if let Some(v) = v {
                    if !v.is_finite() {
                        errors.push(format!("attribute_settings.{attribute}.{name} must be finite"));
                    }
                }
            }
        }

        for key in self.date_labels.keys() {
            let iso = if key.len() == 8 && key.is_ascii() {
                format!("{}-{}-{}", &key[0..4], &key[4..6], &key[6..8])
            } else {
                String::new()
            };
            if interval::parse_date(&iso).is_none() {
                errors.push(format!("date_labels key '{key}' is not a YYYYMMDD date"));
            }
        }

        if self.panels.len() > defaults::PANEL_COUNT {
            errors.push(format!(
                "at most {} panels can be configured, got {}",
                defaults::PANEL_COUNT,
                self.panels.len()
            ));
        }
        for (i, panel) in self.panels.iter().enumerate() {
            if let Some(ref iv) = panel.interval {
                if !iv.is_empty() && interval::Interval::parse(iv).is_err() {
                    errors.push(format!("panels[{i}].interval '{iv}' is not a valid interval"));
                }
            }
        }

        for (section, colors) in [("colors.wells", &self.colors.wells), ("colors.polygons", &self.colors.polygons)] {
            for (k, v) in colors {
                if v.trim().is_empty() {
                    errors.push(format!("{section}.{k} must not be empty"));
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// All well colours: built-in palette overlaid with deployment overrides.
    pub fn well_colors(&self) -> BTreeMap<String, String> {
        let mut colors = defaults::well_colors();
        colors.extend(self.colors.wells.iter().map(|(k, v)| (k.clone(), v.clone())));
        colors
    }

    pub fn basic_well_layers(&self) -> BTreeMap<String, String> {
        self.wells
            .basic_layers
            .clone()
            .unwrap_or_else(defaults::basic_well_layers)
    }

    pub fn additional_well_layers(&self) -> BTreeMap<String, String> {
        self.wells
            .additional_layers
            .clone()
            .unwrap_or_else(defaults::additional_well_layers)
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config I/O error ({}): {1}", .0.display())]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Config parse error: {0}")]
    Parse(#[source] toml::de::Error),

    #[error("Config serialization error: {0}")]
    Serialize(#[source] toml::ser::Error),

    #[error("Config validation failed:\n  - {}", .0.join("\n  - "))]
    Validation(Vec<String>),
}

// ============================================================================
// Data Paths
// ============================================================================

/// Input locations. All optional: a missing input disables its layers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataPaths {
    /// Surface metadata catalog (CSV)
    #[serde(default)]
    pub surface_metadata_file: Option<PathBuf>,

    /// Folder holding `wellbore_info.csv` and the trajectory files it lists
    #[serde(default)]
    pub well_data: Option<PathBuf>,

    /// Folder holding the BORE_*_VOL.csv production tables
    #[serde(default)]
    pub production_data: Option<PathBuf>,

    /// Folder with `additional_layers/<tagname>.<format>` polygon files
    #[serde(default)]
    pub polygon_data: Option<PathBuf>,

    /// Surface name → polygon name per polygon type (CSV)
    #[serde(default)]
    pub polygon_mapping_file: Option<PathBuf>,

    /// Per-map lower/upper colour limits (CSV)
    #[serde(default)]
    pub surface_scaling_file: Option<PathBuf>,

    /// Available selections per map type (TOML); derived from the catalog when absent
    #[serde(default)]
    pub selector_file: Option<PathBuf>,
}

// ============================================================================
// Wells
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WellSettings {
    /// Minimum MD spacing between kept trajectory samples; 0 disables resampling
    #[serde(default = "default_resample_md")]
    pub resample_md_spacing: f64,

    /// Selection key → layer label for layers independent of the interval
    #[serde(default)]
    pub basic_layers: Option<BTreeMap<String, String>>,

    /// Selection key → layer label for layers computed per interval
    #[serde(default)]
    pub additional_layers: Option<BTreeMap<String, String>>,
}

impl Default for WellSettings {
    fn default() -> Self {
        Self {
            resample_md_spacing: default_resample_md(),
            basic_layers: None,
            additional_layers: None,
        }
    }
}

fn default_resample_md() -> f64 {
    defaults::WELL_RESAMPLE_MD
}

// ============================================================================
// Top Reservoir
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopReservoir {
    #[serde(default = "default_realization")]
    pub realization: String,

    #[serde(default = "default_iteration")]
    pub iteration: String,

    /// Results directory below the realization/iteration folder
    #[serde(default = "default_results_directory")]
    pub directory: String,

    #[serde(default = "default_polygons_directory")]
    pub polygons_directory: String,

    /// Polygon name used when the mapping has no entry for a zone
    #[serde(default)]
    pub polygon_name: Option<String>,
}

impl Default for TopReservoir {
    fn default() -> Self {
        Self {
            realization: default_realization(),
            iteration: default_iteration(),
            directory: default_results_directory(),
            polygons_directory: default_polygons_directory(),
            polygon_name: None,
        }
    }
}

fn default_realization() -> String {
    "realization-0".to_string()
}

fn default_iteration() -> String {
    "iter-0".to_string()
}

fn default_results_directory() -> String {
    "share/results".to_string()
}

fn default_polygons_directory() -> String {
    "polygons".to_string()
}

// ============================================================================
// Polygons
// ============================================================================

/// One configured polygon layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolygonLayerSpec {
    /// File tag, also the key for colour lookup
    pub tagname: String,
    /// Layer name shown in the layer toggle
    pub label: String,
    #[serde(default = "default_polygon_format")]
    pub format: String,
}

fn default_polygon_format() -> String {
    "csv".to_string()
}

/// On-disk polygon format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolygonFormat {
    /// `X,Y[,Z],ID` with header
    Csv,
    /// RMS export, same columns as csv
    Rms,
    /// Tab-separated PRM receiver listing
    Prm,
    /// Legacy headerless coordinates with separator rows
    Pol,
}

impl PolygonFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Some(PolygonFormat::Csv),
            "rms" => Some(PolygonFormat::Rms),
            "prm" => Some(PolygonFormat::Prm),
            "pol" => Some(PolygonFormat::Pol),
            _ => None,
        }
    }
}

// ============================================================================
// Colours & Attributes
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColorSettings {
    /// Status code (`oil_production`, `wag_injection`, ...) → colour
    #[serde(default)]
    pub wells: BTreeMap<String, String>,
    /// Polygon tagname → colour
    #[serde(default)]
    pub polygons: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttributeSettings {
    #[serde(default)]
    pub colormap: Option<String>,
    #[serde(default)]
    pub min_value: Option<f64>,
    #[serde(default)]
    pub max_value: Option<f64>,
    #[serde(default)]
    pub unit: String,
}

// ============================================================================
// Panel Defaults
// ============================================================================

/// Default selection for one panel; unset fields come from the selector options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PanelDefaults {
    #[serde(default)]
    pub map_type: Option<MapType>,
    #[serde(default)]
    pub attribute: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub iteration: Option<String>,
    #[serde(default)]
    pub realization: Option<String>,
    #[serde(default)]
    pub interval: Option<String>,
}
