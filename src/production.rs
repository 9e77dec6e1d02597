//! Production and injection volume tables.
//!
//! Each table (`BORE_OIL_VOL.csv`, `BORE_GI_VOL.csv`, `BORE_WI_VOL.csv`) has
//! one row per well, direction and fluid:
//!
//! ```text
//! PDM well name,Production type,Fluid,Start date,Last date,2019-01-01-2019-07-01,2019-01-01-2020-01-01,...,Total
//! ```
//!
//! Every interval column holds the cumulative volume from the table's first
//! date (the anchor) to the column's end date. The last column is the total
//! volume to date.

use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::defaults;
use crate::error::{Result, ViewerError};
use crate::interval;
use crate::table::{self, cell, Table};
use crate::types::{FlowDirection, Fluid};

fn interval_column() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}-\d{4}-\d{2}-\d{2}$").expect("static pattern"))
}

// ============================================================================
// Records
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ProductionRecord {
    pub pdm_name: String,
    pub direction: FlowDirection,
    pub fluid: Fluid,
    pub start_date: Option<String>,
    pub last_date: Option<String>,
    /// First date of the table this row came from
    pub anchor: String,
    /// Cumulative volume from the anchor, keyed by end date
    cumulative: HashMap<String, f64>,
    pub total_volume: Option<f64>,
}

impl ProductionRecord {
    /// Cumulative volume from the anchor to `date`; zero at the anchor itself.
    pub fn cumulative(&self, date: &str) -> Option<f64> {
        if date == self.anchor {
            return Some(0.0);
        }
        self.cumulative.get(date).copied()
    }

    /// Volume produced or injected within an interval.
    ///
    /// The interval is taken chronologically. A zero, missing or non-finite
    /// result is `None`, which excludes the well from interval layers.
    pub fn incremental(&self, interval: &str) -> Option<f64> {
        let normalized = interval::normalize(interval);
        let (d1, d2) = interval::split(&normalized)?;
        let volume = self.cumulative(d2)? - self.cumulative(d1)?;
        (volume.is_finite() && volume != 0.0).then_some(volume)
    }
}

/// Status inputs for one well, direction and fluid over an interval.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductionInfo {
    pub start_date: Option<String>,
    pub stop_date: Option<String>,
    pub interval_volume: Option<f64>,
    pub total_volume: Option<f64>,
}

// ============================================================================
// Table
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct ProductionTable {
    records: Vec<ProductionRecord>,
    last_date: Option<String>,
}

impl ProductionTable {
    /// Read the standard volume tables from a folder.
    ///
    /// Absent tables are skipped with a warning; a folder without any of them
    /// is a `MissingFile` error for the first expected table.
    pub fn load(dir: &Path) -> Result<Self> {
        let mut table = Self::default();
        let mut found = 0;
        for name in defaults::PRODUCTION_FILES {
            let path = dir.join(name);
            if !path.is_file() {
                warn!(path = %path.display(), "Production table not found, skipping");
                continue;
            }
            table.extend_from_csv(&path)?;
            found += 1;
        }
        if found == 0 {
            return Err(ViewerError::MissingFile {
                path: dir.join(defaults::PRODUCTION_FILES[0]),
            });
        }
        info!(dir = %dir.display(), records = table.records.len(), "Loaded production data");
        Ok(table)
    }

    /// Add the rows of one volume table.
    pub fn extend_from_csv(&mut self, path: &Path) -> Result<()> {
        let t = Table::read(path)?;
        let name = t.column("PDM well name")?;
        let kind = t.column("Production type")?;
        let fluid = t.column("Fluid")?;
        let start = t.column("Start date")?;
        let last = t.column("Last date")?;

        let columns: Vec<(usize, &str, &str)> = t
            .headers
            .iter()
            .enumerate()
            .filter(|(_, h)| interval_column().is_match(h))
            .filter_map(|(i, h)| interval::split(h).map(|(d1, d2)| (i, d1, d2)))
            .collect();
        let Some(&(_, anchor, _)) = columns.first() else {
            return Err(ViewerError::MissingColumn {
                path: path.to_path_buf(),
                column: "<date>-<date> volume column".to_string(),
            });
        };
        let total_index = t.headers.len().saturating_sub(1);

        let latest = columns.iter().map(|&(_, _, d2)| d2).max().map(str::to_string);
        if latest > self.last_date {
            self.last_date = latest;
        }

        for (row, r) in t.rows.iter().enumerate() {
            let (Some(direction), Some(fluid)) =
                (FlowDirection::parse(cell(r, kind)), Fluid::parse(cell(r, fluid)))
            else {
                debug!(path = %path.display(), row, "Skipping production row with unknown type or fluid");
                continue;
            };
            let cumulative = columns
                .iter()
                .filter(|&&(_, d1, _)| d1 == anchor)
                .filter_map(|&(i, _, d2)| table::number(r, i).map(|v| (d2.to_string(), v)))
                .collect();
            self.records.push(ProductionRecord {
                pdm_name: cell(r, name).to_string(),
                direction,
                fluid,
                start_date: interval::clean_date(cell(r, start)),
                last_date: interval::clean_date(cell(r, last)),
                anchor: anchor.to_string(),
                cumulative,
                total_volume: table::number(r, total_index),
            });
        }
        Ok(())
    }

    pub fn records(&self) -> &[ProductionRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Latest date covered by any volume column.
    pub fn last_date(&self) -> Option<&str> {
        self.last_date.as_deref()
    }

    pub fn find(&self, pdm_name: &str, direction: FlowDirection, fluid: Fluid) -> Option<&ProductionRecord> {
        self.records
            .iter()
            .find(|r| r.pdm_name == pdm_name && r.direction == direction && r.fluid == fluid)
    }

    /// Dates and volumes for a well over an interval.
    ///
    /// `None` when the table has no row for the well, direction and fluid.
    /// The empty interval gives no interval volume, only the total.
    pub fn extract(
        &self,
        pdm_name: &str,
        direction: FlowDirection,
        fluid: Fluid,
        interval: &str,
    ) -> Option<ProductionInfo> {
        let record = self.find(pdm_name, direction, fluid)?;
        Some(ProductionInfo {
            start_date: record.start_date.clone(),
            stop_date: record.last_date.clone(),
            interval_volume: record.incremental(interval),
            total_volume: record.total_volume,
        })
    }
}
