//! Config Validation Tests
//!
//! Typo detection on raw TOML, consistency checks on parsed configs and
//! data path checks against a scratch directory.

use std::path::PathBuf;

use surface_viewer_4d::config::validation::{
    known_config_keys, suggest_correction, validate_data_paths, validate_unknown_keys,
};
use surface_viewer_4d::config::ViewerConfig;
use surface_viewer_4d::IntervalMode;

fn parse(toml_str: &str) -> ViewerConfig {
    ViewerConfig::from_toml_str(toml_str, PathBuf::new())
        .expect("config should parse")
        .0
}

// ============================================================================
// Typo Detection
// ============================================================================

#[test]
fn typo_in_data_section_warns_with_suggestion() {
    let toml_str = r#"
[data]
surface_metadata_fle = "surface_metadata.csv"
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert_eq!(warnings.len(), 1, "Expected exactly 1 warning");
    assert!(warnings[0].field.contains("surface_metadata_fle"));
    assert_eq!(
        warnings[0].suggestion.as_deref(),
        Some("data.surface_metadata_file")
    );
}

#[test]
fn typo_in_top_reservoir_warns() {
    let toml_str = r#"
[top_reservoir]
iteraton = "iter-0"
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].suggestion.as_deref(), Some("top_reservoir.iteration"));
}

#[test]
fn valid_config_produces_zero_warnings() {
    let toml_str = r#"
fmu_directory = "/scratch/drogon/case"
label = "Drogon 4D"
interval_mode = "reverse"
map_suffix = ".gri"
default_colormap = "seismic_r"

[data]
surface_metadata_file = "share/surface_metadata.csv"
well_data = "well_data"
production_data = "production_data"
polygon_data = "polygons"
polygon_mapping_file = "polygon_mapping.csv"
surface_scaling_file = "surface_scaling.csv"
selector_file = "selectors.toml"

[wells]
resample_md_spacing = 20.0

[wells.basic_layers]
drilled_wells = "Drilled wells"
planned = "Planned wells"

[wells.additional_layers]
production = "Producers"
injection_start = "Injectors (start)"

[top_reservoir]
realization = "realization-0"
iteration = "iter-0"
directory = "share/results"
polygons_directory = "polygons"
polygon_name = "topvolantis"

[zone_polygon_layers.faults]
tagname = "gl_faultlines_extract_postprocess"
label = "Faults"
format = "csv"

[additional_polygon_layers.prm]
tagname = "prm_receivers"
label = "PRM receivers"
format = "prm"

[colors.wells]
oil_production = "green"

[colors.polygons]
prm_receivers = "darkgray"

[attribute_settings.amplitude_max]
colormap = "seismic"
min_value = -0.5
max_value = 0.5
unit = "m"

[date_labels]
20191001 = "PRM0"
20201001 = "PRM1"

[[panels]]
map_type = "observed"
attribute = "amplitude_max"

[[panels]]
map_type = "simulated"
realization = "realization-0"
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert!(
        warnings.is_empty(),
        "Valid config should produce 0 warnings, got: {:?}",
        warnings.iter().map(|w| &w.field).collect::<Vec<_>>()
    );

    let config = parse(toml_str);
    assert_eq!(config.interval_mode, IntervalMode::Reverse);
    assert_eq!(config.panels.len(), 2);
    assert_eq!(config.zone_polygon_layers["faults"].label, "Faults");
    assert_eq!(config.well_colors()["oil_production"], "green");
}

#[test]
fn unknown_section_warns() {
    let toml_str = r#"
[nonexistent_section]
some_field = 42
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert!(warnings.iter().any(|w| w.field.contains("nonexistent_section")));
}

#[test]
fn multiple_typos_all_warned() {
    let toml_str = r#"
[data]
welldata = "wells"

[wells]
resample_md = 10.0
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert_eq!(warnings.len(), 2, "Expected 2 warnings for 2 typos, got {warnings:?}");
}

#[test]
fn empty_toml_produces_zero_warnings() {
    assert!(validate_unknown_keys("").is_empty());
}

#[test]
fn known_keys_set_is_complete() {
    let toml_str = ViewerConfig::default()
        .to_toml()
        .expect("Default config should serialize");
    let warnings = validate_unknown_keys(&toml_str);
    assert!(
        warnings.is_empty(),
        "Default config serialization should produce 0 unknown-key warnings, got: {:?}",
        warnings.iter().map(|w| &w.field).collect::<Vec<_>>()
    );
}

#[test]
fn suggest_correction_returns_none_for_garbage() {
    let known = known_config_keys();
    assert!(suggest_correction("zzz_completely_invalid_xyz_12345", &known).is_none());
}

// ============================================================================
// Consistency Validation
// ============================================================================

#[test]
fn unknown_polygon_format_is_rejected() {
    let toml_str = r#"
[zone_polygon_layers.faults]
tagname = "faults"
label = "Faults"
format = "shp"
"#;
    let err = ViewerConfig::from_toml_str(toml_str, PathBuf::new()).unwrap_err();
    assert!(err.to_string().contains("zone_polygon_layers.faults.format"), "{err}");
}

#[test]
fn bad_date_label_key_is_rejected() {
    let toml_str = r#"
[date_labels]
2019-10 = "PRM0"
"#;
    let err = ViewerConfig::from_toml_str(toml_str, PathBuf::new()).unwrap_err();
    assert!(err.to_string().contains("date_labels"), "{err}");
}

#[test]
fn all_problems_reported_together() {
    let toml_str = r#"
[wells]
resample_md_spacing = -5.0

[[panels]]
interval = "not-an-interval"
"#;
    let err = ViewerConfig::from_toml_str(toml_str, PathBuf::new()).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("resample_md_spacing"), "{msg}");
    assert!(msg.contains("panels[0].interval"), "{msg}");
}

#[test]
fn interval_mode_defaults_to_normal() {
    let config = parse("label = \"x\"\n");
    assert_eq!(config.interval_mode, IntervalMode::Normal);
}

#[test]
fn config_roundtrip_preserves_values() {
    let config = parse(
        r#"
interval_mode = "reverse"
default_colormap = "viridis"

[top_reservoir]
polygon_name = "topvolantis"
"#,
    );
    let again = parse(&config.to_toml().expect("serialize"));
    assert_eq!(again.interval_mode, IntervalMode::Reverse);
    assert_eq!(again.default_colormap, "viridis");
    assert_eq!(again.top_reservoir.polygon_name.as_deref(), Some("topvolantis"));
}

// ============================================================================
// Data Paths
// ============================================================================

#[test]
fn relative_paths_resolve_against_config_dir() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("surface_metadata.csv"), "filename\n").unwrap();
    std::fs::create_dir(dir.path().join("well_data")).unwrap();
    let config_path = dir.path().join("viewer_config.toml");
    std::fs::write(
        &config_path,
        r#"
[data]
surface_metadata_file = "surface_metadata.csv"
well_data = "well_data"
production_data = "production_data"
"#,
    )
    .unwrap();

    let config = ViewerConfig::load_from_file(&config_path).unwrap();
    let (errors, warnings) = validate_data_paths(&config);
    assert!(errors.is_empty(), "{errors:?}");
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].field, "data.production_data");
}

#[test]
fn missing_catalog_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = ViewerConfig::default();
    config.base_dir = dir.path().to_path_buf();
    config.data.surface_metadata_file = Some(PathBuf::from("nope.csv"));
    let (errors, _) = validate_data_paths(&config);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("nope.csv"));
}
