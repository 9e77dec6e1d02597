//! Config validation: unknown-key detection with Levenshtein suggestions
//! and data path checks.
//!
//! Two-pass parse approach: first deserialize raw TOML into `toml::Value`,
//! walk the key tree, compare against known field names, and emit warnings
//! with "did you mean?" suggestions. Then proceed with normal serde
//! deserialization. Warnings never break existing configs.
//!
//! Several sections are keyed by free-form names (polygon classes,
//! attributes, survey dates). Those segments appear as `*` in the known key
//! list and match any name.

use std::collections::HashSet;
use std::path::Path;

use super::ViewerConfig;

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, ", did you mean '{s}'?")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Returns the complete set of valid dotted key paths for ViewerConfig.
///
/// Maintained by hand to match the struct hierarchy in viewer_config.rs.
/// Any new field added to ViewerConfig must be added here too.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        // top level
        "fmu_directory",
        "label",
        "interval_mode",
        "map_suffix",
        "default_colormap",
        // [data]
        "data",
        "data.surface_metadata_file",
        "data.well_data",
        "data.production_data",
        "data.polygon_data",
        "data.polygon_mapping_file",
        "data.surface_scaling_file",
        "data.selector_file",
        // [wells]
        "wells",
        "wells.resample_md_spacing",
        "wells.basic_layers",
        "wells.basic_layers.*",
        "wells.additional_layers",
        "wells.additional_layers.*",
        // [top_reservoir]
        "top_reservoir",
        "top_reservoir.realization",
        "top_reservoir.iteration",
        "top_reservoir.directory",
        "top_reservoir.polygons_directory",
        "top_reservoir.polygon_name",
        // [zone_polygon_layers.<class>]
        "zone_polygon_layers",
        "zone_polygon_layers.*",
        "zone_polygon_layers.*.tagname",
        "zone_polygon_layers.*.label",
        "zone_polygon_layers.*.format",
        // [additional_polygon_layers.<class>]
        "additional_polygon_layers",
        "additional_polygon_layers.*",
        "additional_polygon_layers.*.tagname",
        "additional_polygon_layers.*.label",
        "additional_polygon_layers.*.format",
        // [colors]
        "colors",
        "colors.wells",
        "colors.wells.*",
        "colors.polygons",
        "colors.polygons.*",
        // [attribute_settings.<attribute>]
        "attribute_settings",
        "attribute_settings.*",
        "attribute_settings.*.colormap",
        "attribute_settings.*.min_value",
        "attribute_settings.*.max_value",
        "attribute_settings.*.unit",
        // [date_labels]
        "date_labels",
        "date_labels.*",
        // [[panels]]
        "panels",
        "panels.map_type",
        "panels.attribute",
        "panels.name",
        "panels.iteration",
        "panels.realization",
        "panels.interval",
    ];
    keys.iter().copied().collect()
}

/// Whether a dotted key matches a known pattern, `*` matching one segment.
fn matches_pattern(key: &str, pattern: &str) -> bool {
    let mut k = key.split('.');
    let mut p = pattern.split('.');
    loop {
        match (k.next(), p.next()) {
            (None, None) => return true,
            (Some(ks), Some(ps)) if ps == "*" || ps == ks => {}
            _ => return false,
        }
    }
}

fn is_known(key: &str, known: &HashSet<&str>) -> bool {
    known.contains(key) || known.iter().any(|p| p.contains('*') && matches_pattern(key, p))
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Recursively walks a `toml::Value` tree and collects all dotted key paths.
///
/// For example, a table `{ a = { b = 1, c = 2 } }` yields:
/// `["a", "a.b", "a.c"]`. Arrays of tables contribute their entries' keys
/// under the array name (`[[panels]]` with `name` yields `panels.name`).
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            match v {
                toml::Value::Table(_) => keys.extend(walk_toml_keys(v, &path)),
                toml::Value::Array(items) => {
                    for item in items.iter().filter(|i| i.is_table()) {
                        for nested in walk_toml_keys(item, &path) {
                            if !keys.contains(&nested) {
                                keys.push(nested);
                            }
                        }
                    }
                }
                _ => {}
            }
        }
    }
    keys
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

/// Compute the Levenshtein edit distance between two strings.
fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Suggest the closest known key for an unknown key, if within edit distance 3.
///
/// Wildcard patterns are compared with their `*` replaced by the matching
/// segment of the unknown key, so `zone_polygon_layers.faults.tagnme`
/// suggests `zone_polygon_layers.faults.tagname`.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    let unknown_segments: Vec<&str> = unknown.split('.').collect();
    let mut best: Option<(String, usize)> = None;
    for &k in known {
        let candidate = if k.contains('*') {
            let pattern: Vec<&str> = k.split('.').collect();
            if pattern.len() != unknown_segments.len() {
                continue;
            }
            pattern
                .iter()
                .zip(&unknown_segments)
                .map(|(p, u)| if *p == "*" { *u } else { *p })
                .collect::<Vec<_>>()
                .join(".")
        } else {
            k.to_string()
        };
        let dist = levenshtein(unknown, &candidate);
        if dist <= 3 && best.as_ref().map_or(true, |(_, d)| dist < *d) {
            best = Some((candidate, dist));
        }
    }
    best.map(|(k, _)| k)
}

// ============================================================================
// Unknown Key Validation (entry point)
// ============================================================================

/// Parse a raw TOML string and return warnings for any unknown config keys.
///
/// This does NOT fail on unknown keys, it only warns. Existing configs
/// always continue to work.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let value: toml::Value = match raw_toml.parse() {
        Ok(v) => v,
        Err(_) => return Vec::new(), // parse errors are handled by serde later
    };

    let known = known_config_keys();
    let found = walk_toml_keys(&value, "");
    let mut warnings = Vec::new();

    for key in &found {
        if !is_known(key, &known) {
            let suggestion = suggest_correction(key, &known);
            let message = format!("Unknown config key '{key}'");
            warnings.push(ValidationWarning {
                field: key.clone(),
                message,
                suggestion,
            });
        }
    }

    warnings
}

// ============================================================================
// Data Path Validation
// ============================================================================

/// Check the configured inputs against the filesystem.
///
/// Returns (errors, warnings). Errors are inputs the viewer cannot start
/// without (the surface catalog); warnings are optional inputs that are
/// configured but missing, which only disable their layers.
pub fn validate_data_paths(config: &ViewerConfig) -> (Vec<String>, Vec<ValidationWarning>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    match config.data.surface_metadata_file {
        Some(ref p) => {
            let resolved = config.resolve_path(p);
            if !resolved.is_file() {
                errors.push(format!(
                    "data.surface_metadata_file = {} does not exist",
                    resolved.display()
                ));
            }
        }
        None => errors.push("data.surface_metadata_file is not set".to_string()),
    }

    let optional: [(&str, Option<&Path>, bool); 6] = [
        ("data.well_data", config.data.well_data.as_deref(), true),
        ("data.production_data", config.data.production_data.as_deref(), true),
        ("data.polygon_data", config.data.polygon_data.as_deref(), true),
        ("data.polygon_mapping_file", config.data.polygon_mapping_file.as_deref(), false),
        ("data.surface_scaling_file", config.data.surface_scaling_file.as_deref(), false),
        ("data.selector_file", config.data.selector_file.as_deref(), false),
    ];
    for (field, path, is_dir) in optional {
        let Some(path) = path else { continue };
        let resolved = config.resolve_path(path);
        let present = if is_dir { resolved.is_dir() } else { resolved.is_file() };
        if !present {
            warnings.push(ValidationWarning {
                field: field.to_string(),
                message: format!("{field} = {} does not exist, its layers are disabled", resolved.display()),
                suggestion: None,
            });
        }
    }

    if !config.fmu_directory.as_os_str().is_empty() && !config.resolve_path(&config.fmu_directory).is_dir() {
        warnings.push(ValidationWarning {
            field: "fmu_directory".to_string(),
            message: format!(
                "fmu_directory = {} does not exist, zone polygons will be missing",
                config.fmu_directory.display()
            ),
            suggestion: None,
        });
    }

    (errors, warnings)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_levenshtein_identical() {
        assert_eq!(levenshtein("hello", "hello"), 0);
    }

    #[test]
    fn test_levenshtein_one_edit() {
        assert_eq!(levenshtein("colormp", "colormap"), 1);
    }

    #[test]
    fn test_levenshtein_empty() {
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
    }

    #[test]
    fn test_walk_toml_keys_nested() {
        let toml: toml::Value = r#"
            [wells]
            [wells.basic_layers]
            drilled_wells = "Drilled wells"
        "#
        .parse()
        .unwrap();
        let keys = walk_toml_keys(&toml, "");
        assert!(keys.contains(&"wells".to_string()));
        assert!(keys.contains(&"wells.basic_layers".to_string()));
        assert!(keys.contains(&"wells.basic_layers.drilled_wells".to_string()));
    }

    #[test]
    fn test_walk_toml_keys_array_of_tables() {
        let toml: toml::Value = r#"
            [[panels]]
            map_type = "observed"
            [[panels]]
            map_type = "simulated"
            realization = "realization-0"
        "#
        .parse()
        .unwrap();
        let keys = walk_toml_keys(&toml, "");
        assert!(keys.contains(&"panels.map_type".to_string()));
        assert!(keys.contains(&"panels.realization".to_string()));
        assert_eq!(keys.iter().filter(|k| *k == "panels.map_type").count(), 1);
    }

    #[test]
    fn test_wildcard_sections_accept_any_name() {
        let toml_str = r#"
[zone_polygon_layers.faults]
tagname = "fault_lines"
label = "Faults"

[attribute_settings.4d_diff_rms]
colormap = "inferno"

[date_labels]
20191001 = "PRM0"
"#;
        let warnings = validate_unknown_keys(toml_str);
        assert!(warnings.is_empty(), "Expected 0 warnings, got: {:?}", warnings);
    }

    #[test]
    fn test_typo_in_wildcard_section_suggests_fix() {
        let toml_str = r#"
[zone_polygon_layers.faults]
tagnme = "fault_lines"
label = "Faults"
"#;
        let warnings = validate_unknown_keys(toml_str);
        assert_eq!(warnings.len(), 1);
        assert_eq!(
            warnings[0].suggestion.as_deref(),
            Some("zone_polygon_layers.faults.tagname")
        );
    }

    #[test]
    fn test_typo_key_produces_warning_with_suggestion() {
        let toml_str = r#"
[wells]
resample_md_spacin = 20.0
"#;
        let warnings = validate_unknown_keys(toml_str);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].suggestion.as_deref(), Some("wells.resample_md_spacing"));
    }

    #[test]
    fn test_suggest_correction_no_match_for_garbage() {
        let known = known_config_keys();
        assert!(suggest_correction("completely_unrelated_garbage_key_xyz", &known).is_none());
    }

    #[test]
    fn test_missing_catalog_is_an_error() {
        let config = ViewerConfig::default();
        let (errors, _) = validate_data_paths(&config);
        assert!(errors.iter().any(|e| e.contains("surface_metadata_file")));
    }

    #[test]
    fn test_missing_optional_input_is_a_warning() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = dir.path().join("surface_metadata.csv");
        std::fs::write(&catalog, "filename\n").unwrap();

        let mut config = ViewerConfig::default();
        config.base_dir = dir.path().to_path_buf();
        config.data.surface_metadata_file = Some(PathBuf::from("surface_metadata.csv"));
        config.data.well_data = Some(PathBuf::from("wells"));

        let (errors, warnings) = validate_data_paths(&config);
        assert!(errors.is_empty(), "{errors:?}");
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].field, "data.well_data");
    }
}
