//! Surface metadata catalog: which map file belongs to which selection.
//!
//! The catalog is a CSV export with one row per map file. It is loaded once
//! and only read afterwards. Resolution is an exact match on all seven key
//! fields; no fuzzy matching and no defaults.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::SelectorOptions;
use crate::error::{Result, ViewerError};
use crate::interval::{self, AvailableIntervals};
use crate::table::{cell, Table};
use crate::types::{IntervalMode, MapSelection, MapType};

/// One map file in the catalog. Missing cells are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SurfaceMetadataRow {
    pub realization: String,
    pub iteration: String,
    pub map_type: String,
    pub name: String,
    pub attribute: String,
    pub t1: String,
    pub t2: String,
    pub filename: String,
}

impl SurfaceMetadataRow {
    fn key(&self) -> [&str; 7] {
        [
            self.realization.as_str(),
            self.iteration.as_str(),
            self.map_type.as_str(),
            self.name.as_str(),
            self.attribute.as_str(),
            self.t1.as_str(),
            self.t2.as_str(),
        ]
    }
}

#[derive(Debug, Clone, Default)]
pub struct SurfaceCatalog {
    rows: Vec<SurfaceMetadataRow>,
}

impl SurfaceCatalog {
    /// Load the catalog CSV.
    ///
    /// Either `fmu_id.iteration` or the older `fmu_id.ensemble` column is
    /// accepted for the iteration, and `data.attribute` or `data.content`
    /// for the attribute.
    pub fn load(path: &Path) -> Result<Self> {
        let table = Table::read(path)?;
        let col = |primary: &str, legacy: &str| {
            table
                .optional_column(primary)
                .or_else(|| table.optional_column(legacy))
                .map_or_else(|| table.column(primary), Ok)
        };
        let realization = table.column("fmu_id.realization")?;
        let iteration = col("fmu_id.iteration", "fmu_id.ensemble")?;
        let map_type = table.column("map_type")?;
        let name = table.column("data.name")?;
        let attribute = col("data.attribute", "data.content")?;
        let t1 = table.column("data.time.t1")?;
        let t2 = table.column("data.time.t2")?;
        let filename = table.column("filename")?;

        let rows: Vec<SurfaceMetadataRow> = table
            .rows
            .iter()
            .map(|r| SurfaceMetadataRow {
                realization: cell(r, realization).to_string(),
                iteration: cell(r, iteration).to_string(),
                map_type: cell(r, map_type).to_string(),
                name: cell(r, name).to_string(),
                attribute: cell(r, attribute).to_string(),
                t1: interval::clean_date(cell(r, t1)).unwrap_or_default(),
                t2: interval::clean_date(cell(r, t2)).unwrap_or_default(),
                filename: cell(r, filename).to_string(),
            })
            .collect();

        info!(path = %path.display(), rows = rows.len(), "Loaded surface catalog");
        Ok(Self::from_rows(rows))
    }

    /// Build a catalog from rows, reporting duplicate keys once.
    pub fn from_rows(rows: Vec<SurfaceMetadataRow>) -> Self {
        let mut counts: HashMap<[&str; 7], usize> = HashMap::new();
        for row in &rows {
            *counts.entry(row.key()).or_default() += 1;
        }
        let duplicated: Vec<_> = counts.iter().filter(|(_, &n)| n > 1).collect();
        if !duplicated.is_empty() {
            let extra: usize = duplicated.iter().map(|(_, &n)| n - 1).sum();
            warn!(
                keys = duplicated.len(),
                extra_rows = extra,
                "Surface catalog has duplicate selections, the first row in file order is used"
            );
        }
        Self { rows }
    }

    pub fn rows(&self) -> &[SurfaceMetadataRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    // ========================================================================
    // Resolution
    // ========================================================================

    /// Path of the map file for a selection.
    ///
    /// The interval is turned into catalog `t1`/`t2` according to `mode`;
    /// the empty interval matches rows without dates. Duplicate rows resolve
    /// to the first in file order.
    pub fn resolve_map_path(&self, selection: &MapSelection, mode: IntervalMode) -> Result<PathBuf> {
        let (t1, t2) = interval::catalog_times(&selection.interval, mode).unwrap_or(("", ""));
        let wanted = [
            selection.realization.as_str(),
            selection.iteration.as_str(),
            selection.map_type.as_str(),
            selection.name.as_str(),
            selection.attribute.as_str(),
            t1,
            t2,
        ];

        match self.rows.iter().find(|row| row.key() == wanted) {
            Some(row) => {
                debug!(selection = %selection, path = %row.filename, "Resolved map");
                Ok(PathBuf::from(&row.filename))
            }
            None => Err(ViewerError::NotFound {
                selection: selection.clone(),
            }),
        }
    }

    /// Catalog rows describing a given map file.
    pub fn rows_for_file(&self, filename: &str) -> Vec<&SurfaceMetadataRow> {
        self.rows.iter().filter(|r| r.filename == filename).collect()
    }

    /// Map files that do not carry the deployment's map suffix.
    pub fn files_without_suffix(&self, suffix: &str) -> Vec<&str> {
        self.rows
            .iter()
            .map(|r| r.filename.as_str())
            .filter(|f| !f.is_empty() && !f.ends_with(suffix))
            .collect()
    }

    // ========================================================================
    // Selector Queries
    // ========================================================================

    fn of_type(&self, map_type: MapType) -> impl Iterator<Item = &SurfaceMetadataRow> {
        self.rows.iter().filter(move |r| r.map_type == map_type.as_str())
    }

    fn unique_sorted<'a>(values: impl Iterator<Item = &'a String>) -> Vec<String> {
        values
            .filter(|v| !v.is_empty())
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn attributes(&self, map_type: MapType) -> Vec<String> {
        Self::unique_sorted(self.of_type(map_type).map(|r| &r.attribute))
    }

    pub fn names(&self, map_type: MapType) -> Vec<String> {
        Self::unique_sorted(self.of_type(map_type).map(|r| &r.name))
    }

    pub fn iterations(&self, map_type: MapType) -> Vec<String> {
        Self::unique_sorted(self.of_type(map_type).map(|r| &r.iteration))
    }

    pub fn realizations(&self, map_type: MapType) -> Vec<String> {
        sort_realizations(Self::unique_sorted(self.of_type(map_type).map(|r| &r.realization)))
    }

    /// Intervals over the whole catalog.
    pub fn intervals(&self, mode: IntervalMode) -> AvailableIntervals {
        interval::enumerate_available(self.rows.iter().map(|r| (&r.t1, &r.t2)), mode)
    }

    pub fn intervals_for(&self, map_type: MapType, mode: IntervalMode) -> AvailableIntervals {
        interval::enumerate_available(self.of_type(map_type).map(|r| (&r.t1, &r.t2)), mode)
    }

    /// Selector options derived from the catalog, used without a selector file.
    pub fn selector_options(&self, map_type: MapType, mode: IntervalMode) -> SelectorOptions {
        SelectorOptions {
            attribute: self.attributes(map_type),
            name: self.names(map_type),
            interval: self.intervals_for(map_type, mode).all,
            iteration: self.iterations(map_type),
            realization: self.realizations(map_type),
        }
    }
}

fn realization_number() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^realization-(\d+)$").expect("static pattern"))
}

/// Numbered realizations in numeric order, then everything else (`mean`,
/// `std`, `---`) in lexicographic order.
pub fn sort_realizations(realizations: Vec<String>) -> Vec<String> {
    let re = realization_number();
    let mut numbered: Vec<(u64, String)> = Vec::new();
    let mut other: Vec<String> = Vec::new();
    for r in realizations {
        match re.captures(&r).and_then(|c| c[1].parse::<u64>().ok()) {
            Some(n) => numbered.push((n, r)),
            None => other.push(r),
        }
    }
    numbered.sort();
    other.sort();
    other.dedup();
    numbered.into_iter().map(|(_, r)| r).chain(other).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(map_type: &str, realization: &str, t1: &str, t2: &str, filename: &str) -> SurfaceMetadataRow {
        SurfaceMetadataRow {
            realization: realization.into(),
            iteration: "iter-0".into(),
            map_type: map_type.into(),
            name: "draupne_fm_1".into(),
            attribute: "4d_diff_rms".into(),
            t1: t1.into(),
            t2: t2.into(),
            filename: filename.into(),
        }
    }

    fn selection(map_type: MapType, realization: &str, interval: &str) -> MapSelection {
        MapSelection {
            attribute: "4d_diff_rms".into(),
            name: "draupne_fm_1".into(),
            map_type,
            iteration: "iter-0".into(),
            realization: realization.into(),
            interval: interval.into(),
        }
    }

    #[test]
    fn reverse_mode_resolves_monitor_first_interval() {
        let catalog = SurfaceCatalog::from_rows(vec![row(
            "simulated",
            "realization-0",
            "2019-10-01",
            "2020-10-01",
            "/data/a.gri",
        )]);
        let sel = selection(MapType::Simulated, "realization-0", "2020-10-01-2019-10-01");
        assert_eq!(
            catalog.resolve_map_path(&sel, IntervalMode::Reverse).unwrap(),
            PathBuf::from("/data/a.gri")
        );
        // Same interval read in normal mode asks for t1 after t2
        assert!(matches!(
            catalog.resolve_map_path(&sel, IntervalMode::Normal),
            Err(ViewerError::NotFound { .. })
        ));
    }

    #[test]
    fn resolution_is_repeatable_and_first_duplicate_wins() {
        let catalog = SurfaceCatalog::from_rows(vec![
            row("observed", "---", "2019-10-01", "2020-10-01", "/data/first.gri"),
            row("observed", "---", "2019-10-01", "2020-10-01", "/data/second.gri"),
        ]);
        let sel = selection(MapType::Observed, "---", "2019-10-01-2020-10-01");
        let a = catalog.resolve_map_path(&sel, IntervalMode::Normal).unwrap();
        let b = catalog.resolve_map_path(&sel, IntervalMode::Normal).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, PathBuf::from("/data/first.gri"));
    }

    #[test]
    fn empty_interval_matches_undated_rows() {
        let catalog = SurfaceCatalog::from_rows(vec![row("simulated", "mean", "", "", "/data/depth.gri")]);
        let sel = selection(MapType::Simulated, "mean", "");
        assert_eq!(
            catalog.resolve_map_path(&sel, IntervalMode::Normal).unwrap(),
            PathBuf::from("/data/depth.gri")
        );
    }

    #[test]
    fn not_found_carries_selection() {
        let catalog = SurfaceCatalog::default();
        let sel = selection(MapType::Observed, "---", "2019-10-01-2020-10-01");
        match catalog.resolve_map_path(&sel, IntervalMode::Normal) {
            Err(ViewerError::NotFound { selection }) => assert_eq!(selection, sel),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn realizations_sort_numerically_with_statistics_last() {
        let sorted = sort_realizations(vec![
            "realization-10".into(),
            "std".into(),
            "realization-2".into(),
            "mean".into(),
            "realization-0".into(),
        ]);
        assert_eq!(
            sorted,
            vec!["realization-0", "realization-2", "realization-10", "mean", "std"]
        );
    }

    #[test]
    fn selector_options_follow_map_type() {
        let catalog = SurfaceCatalog::from_rows(vec![
            row("observed", "---", "2019-10-01", "2020-10-01", "/o1.gri"),
            row("simulated", "realization-1", "2019-10-01", "2020-10-01", "/s1.gri"),
            row("simulated", "realization-0", "2020-10-01", "2021-10-01", "/s2.gri"),
        ]);
        let sim = catalog.selector_options(MapType::Simulated, IntervalMode::Normal);
        assert_eq!(sim.realization, vec!["realization-0", "realization-1"]);
        assert_eq!(sim.interval, vec!["2019-10-01-2020-10-01", "2020-10-01-2021-10-01"]);
        let obs = catalog.selector_options(MapType::Observed, IntervalMode::Normal);
        assert_eq!(obs.interval, vec!["2019-10-01-2020-10-01"]);
        assert_eq!(catalog.rows_for_file("/s2.gri").len(), 1);
    }

    #[test]
    fn files_without_suffix_skips_blank_filenames() {
        let catalog = SurfaceCatalog::from_rows(vec![
            row("observed", "---", "2019-10-01", "2020-10-01", "/o1.gri"),
            row("observed", "---", "2020-10-01", "2021-10-01", "/o2.irap"),
            row("simulated", "realization-0", "2019-10-01", "2020-10-01", ""),
        ]);
        assert_eq!(catalog.files_without_suffix(".gri"), vec!["/o2.irap"]);
    }
}
