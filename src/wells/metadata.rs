//! Wellbore metadata from `wellbore_info.csv`.

use std::collections::BTreeMap;
use std::path::Path;

use csv::StringRecord;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::defaults;
use crate::error::Result;
use crate::table::{self, cell, Table};

/// One wellbore. Depths are measured depths in metres, `None` when unknown.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WellboreMetadata {
    pub wellbore_name: String,
    pub short_name: String,
    pub true_name: String,
    pub rms_name: String,
    /// Join key into the production tables
    pub pdm_name: String,
    /// `production`, `injection`, `planned`, `exploration`, ...
    pub wellbore_type: String,
    pub top_res_md: Option<f64>,
    pub top_completion_md: Option<f64>,
    pub base_completion_md: Option<f64>,
    /// Comma-separated fluid list as written in the table
    pub fluids: String,
    /// Layer the well belongs to (`Drilled wells` or a planned-well layer)
    pub layer_name: String,
    /// Trajectory file, absolute or relative to the well data folder
    pub file_name: String,
}

impl WellboreMetadata {
    pub fn is_drilled(&self) -> bool {
        self.layer_name == defaults::DRILLED_WELLS_LABEL
    }

    pub fn is_planned(&self) -> bool {
        self.wellbore_type == "planned"
    }

    /// `"<short>: <type> (<fluids>)"`
    pub fn default_tooltip(&self) -> String {
        format!("{}: {} ({})", self.short_name, self.wellbore_type, self.fluids)
    }
}

/// All wellbores, one entry per wellbore name in name order.
#[derive(Debug, Clone, Default)]
pub struct WellMetadata {
    wells: BTreeMap<String, WellboreMetadata>,
}

impl WellMetadata {
    pub fn load(path: &Path) -> Result<Self> {
        let t = Table::read(path)?;
        let name = t.column("wellbore.name")?;
        let short_name = t.column("wellbore.short_name")?;
        let wellbore_type = t.column("wellbore.type")?;
        let opt = |c: &str| t.optional_column(c);
        let true_name = opt("wellbore.true_name");
        let rms_name = opt("wellbore.rms_name");
        let pdm_name = opt("wellbore.pdm_name");
        let top_res = opt("wellbore.top_res_md");
        let top_completion = opt("top_completion_md");
        let base_completion = opt("base_completion_md");
        let fluids = opt("wellbore.fluids");
        let layer_name = opt("layer_name");
        let file_name = opt("file_name");

        let text = |r: &StringRecord, c: Option<usize>| c.map(|i| cell(r, i).to_string()).unwrap_or_default();
        let depth = |r: &StringRecord, c: Option<usize>| c.and_then(|i| table::number(r, i));

        let rows = t.rows.iter().map(|r| WellboreMetadata {
            wellbore_name: cell(r, name).to_string(),
            short_name: cell(r, short_name).to_string(),
            true_name: text(r, true_name),
            rms_name: text(r, rms_name),
            pdm_name: text(r, pdm_name),
            wellbore_type: cell(r, wellbore_type).to_string(),
            top_res_md: depth(r, top_res),
            top_completion_md: depth(r, top_completion),
            base_completion_md: depth(r, base_completion),
            fluids: text(r, fluids),
            layer_name: text(r, layer_name),
            file_name: text(r, file_name),
        });
        let metadata = Self::from_rows(rows);
        info!(path = %path.display(), wells = metadata.len(), "Loaded wellbore metadata");
        Ok(metadata)
    }

    /// Collapse rows to one per wellbore name.
    ///
    /// The first row wins except for the top-reservoir depth, which is the
    /// shallowest over all rows of the wellbore.
    pub fn from_rows(rows: impl IntoIterator<Item = WellboreMetadata>) -> Self {
        let mut wells: BTreeMap<String, WellboreMetadata> = BTreeMap::new();
        for row in rows {
            if row.wellbore_name.is_empty() {
                debug!("Skipping wellbore row without a name");
                continue;
            }
            match wells.get_mut(&row.wellbore_name) {
                Some(existing) => {
                    existing.top_res_md = match (existing.top_res_md, row.top_res_md) {
                        (Some(a), Some(b)) => Some(a.min(b)),
                        (a, b) => a.or(b),
                    };
                }
                None => {
                    wells.insert(row.wellbore_name.clone(), row);
                }
            }
        }
        Self { wells }
    }

    pub fn len(&self) -> usize {
        self.wells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wells.is_empty()
    }

    pub fn get(&self, wellbore_name: &str) -> Option<&WellboreMetadata> {
        self.wells.get(wellbore_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &WellboreMetadata> {
        self.wells.values()
    }

    /// Layer names of planned wells, one planned layer per name.
    pub fn planned_layer_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .iter()
            .filter(|w| w.is_planned() && !w.layer_name.is_empty())
            .map(|w| w.layer_name.clone())
            .collect();
        names.sort();
        names.dedup();
        names
    }
}
