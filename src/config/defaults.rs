//! System-wide default constants.
//!
//! Centralises the built-in values used when a deployment leaves a setting
//! out of its configuration. Grouped by subsystem for easy discovery.

use std::collections::BTreeMap;

// ============================================================================
// Configuration Files
// ============================================================================

/// Environment variable naming the viewer configuration file.
pub const CONFIG_ENV_VAR: &str = "SV4D_CONFIG";

/// Configuration file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "viewer_config.toml";

// ============================================================================
// Maps
// ============================================================================

/// Suffix of surface raster files.
pub const MAP_SUFFIX: &str = ".gri";

/// Colormap used when an attribute has no configured one.
pub const DEFAULT_COLORMAP: &str = "seismic_r";

/// Number of map panels shown side by side.
pub const PANEL_COUNT: usize = 3;

/// Upper bound on observed dates when the selector lists no observations.
pub const OPEN_ENDED_DATE: &str = "9999-12-31";

// ============================================================================
// Wells
// ============================================================================

/// Name of the wellbore metadata table inside the well data folder.
pub const WELLBORE_INFO_FILE: &str = "wellbore_info.csv";

/// Well data export stamp inside the well data folder.
pub const WELL_UPDATE_FILE: &str = ".welldata_update.yaml";

/// Production export stamp inside the well data folder.
pub const PRODUCTION_UPDATE_FILE: &str = ".production_update.yaml";

/// Production volume tables read from the production data folder.
pub const PRODUCTION_FILES: [&str; 3] = ["BORE_OIL_VOL.csv", "BORE_GI_VOL.csv", "BORE_WI_VOL.csv"];

/// Minimum MD spacing (m) between kept trajectory samples.
pub const WELL_RESAMPLE_MD: f64 = 40.0;

/// Colour of wells drawn without a production status.
pub const WELL_DEFAULT_COLOR: &str = "black";

/// Layer name of wells that have actually been drilled.
pub const DRILLED_WELLS_LABEL: &str = "Drilled wells";

pub fn basic_well_layers() -> BTreeMap<String, String> {
    [
        ("drilled_wells", "Drilled wells"),
        ("reservoir_section", "Reservoir sections"),
        ("active_production", "Current producers"),
        ("active_injection", "Current injectors"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

pub fn additional_well_layers() -> BTreeMap<String, String> {
    [
        ("production", "Producers"),
        ("production_start", "Producers - started"),
        ("production_completed", "Producers - completed"),
        ("injection", "Injectors"),
        ("injection_start", "Injectors - started"),
        ("injection_completed", "Injectors - completed"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

pub fn well_colors() -> BTreeMap<String, String> {
    [
        ("default", "black"),
        ("oil_production", "green"),
        ("gas_production", "magenta"),
        ("gas_injection", "red"),
        ("water_injection", "blue"),
        ("wag_injection", "blueviolet"),
        ("planned", "purple"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

// ============================================================================
// Polygons
// ============================================================================

/// Colour of polygons with neither an override nor a built-in default.
pub const POLYGON_FALLBACK_COLOR: &str = "gray";

/// Easting/northing at or below this value marks a separator row in
/// legacy headerless polygon files.
pub const LEGACY_COORDINATE_THRESHOLD: f64 = 1000.0;

/// Built-in polygon colours by tagname.
pub fn polygon_colors() -> BTreeMap<String, String> {
    [
        ("owc_outline", "lightslategray"),
        ("goc_outline", "red"),
        ("faults", "gray"),
        ("fault_lines", "gray"),
        ("prm_receivers", "darkgray"),
        ("4D_undershoot", "salmon"),
        ("injectites", "khaki"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Layer labels shown checked by default.
pub const CHECKED_POLYGON_LAYERS: [&str; 3] = ["Initial OWC", "Initial GOC", "Faults"];
