//! Colour scale limits per map.
//!
//! The scaling table overrides the attribute settings for individual maps:
//!
//! ```text
//! map_type,data.attribute,interval,data.name,realization,lower_limit,upper_limit
//! observed,max,20201001_20191001,draupne_fm_1,---,-0.02,0.02
//! ```

use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::error::Result;
use crate::interval;
use crate::table::{self, cell, Table};
use crate::types::{MapSelection, MapType};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScalingRow {
    pub map_type: String,
    pub attribute: String,
    /// Compact interval, `YYYYMMDD_YYYYMMDD`
    pub interval: String,
    pub name: String,
    pub realization: String,
    pub lower_limit: Option<f64>,
    pub upper_limit: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct SurfaceScaling {
    rows: Vec<ScalingRow>,
}

impl SurfaceScaling {
    pub fn load(path: &Path) -> Result<Self> {
        let t = Table::read(path)?;
        let map_type = t.column("map_type")?;
        let attribute = t.column("data.attribute")?;
        let interval = t.column("interval")?;
        let name = t.column("data.name")?;
        let realization = t.column("realization")?;
        let lower = t.column("lower_limit")?;
        let upper = t.column("upper_limit")?;

        let rows = t
            .rows
            .iter()
            .map(|r| ScalingRow {
                map_type: cell(r, map_type).to_string(),
                attribute: cell(r, attribute).to_string(),
                interval: cell(r, interval).to_string(),
                name: cell(r, name).to_string(),
                realization: cell(r, realization).to_string(),
                lower_limit: table::number(r, lower),
                upper_limit: table::number(r, upper),
            })
            .collect();
        let scaling = Self::from_rows(rows);
        info!(path = %path.display(), rows = scaling.rows.len(), "Loaded surface scaling");
        Ok(scaling)
    }

    pub fn from_rows(rows: Vec<ScalingRow>) -> Self {
        Self { rows }
    }

    /// Limits for a selection, `None` when the table has no row for it.
    ///
    /// Standard deviation maps use the `std` row, observed maps the row of
    /// their own realization and every other simulated map the
    /// `realization-0` row.
    pub fn limits(&self, selection: &MapSelection) -> Option<(Option<f64>, Option<f64>)> {
        let compact = interval::compact(&selection.interval)?;
        let realization = if selection.realization.contains("std") {
            "std"
        } else if selection.map_type == MapType::Observed {
            selection.realization.as_str()
        } else {
            "realization-0"
        };
        self.rows
            .iter()
            .find(|r| {
                r.map_type == selection.map_type.as_str()
                    && r.attribute == selection.attribute
                    && r.interval == compact
                    && r.name == selection.name
                    && r.realization == realization
            })
            .map(|r| (r.lower_limit, r.upper_limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selection(map_type: MapType, realization: &str) -> MapSelection {
        MapSelection {
            attribute: "max".into(),
            name: "draupne_fm_1".into(),
            map_type,
            iteration: "iter-0".into(),
            realization: realization.into(),
            interval: "2020-10-01-2019-10-01".into(),
        }
    }

    #[test]
    fn realization_rule() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("surface_scaling.csv");
        std::fs::write(
            &path,
            "map_type,data.attribute,interval,data.name,realization,lower_limit,upper_limit\n\
             observed,max,20201001_20191001,draupne_fm_1,---,-0.02,0.02\n\
             simulated,max,20201001_20191001,draupne_fm_1,realization-0,-0.05,nan\n\
             simulated,max,20201001_20191001,draupne_fm_1,std,0,0.01\n",
        )
        .unwrap();
        let scaling = SurfaceScaling::load(&path).unwrap();
        assert_eq!(
            scaling.limits(&selection(MapType::Observed, "---")),
            Some((Some(-0.02), Some(0.02)))
        );
        assert_eq!(
            scaling.limits(&selection(MapType::Simulated, "realization-7")),
            Some((Some(-0.05), None))
        );
        assert_eq!(
            scaling.limits(&selection(MapType::Simulated, "std")),
            Some((Some(0.0), Some(0.01)))
        );
        assert_eq!(scaling.limits(&selection(MapType::Observed, "p10")), None);
    }
}
