//! Surface name → zone polygon file name.
//!
//! The mapping table has one row per surface and polygon type:
//!
//! ```text
//! surface,polygon_type,polygon_name
//! draupne_fm_1,faults,basevolantis
//! ```

use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::{PolygonLayerSpec, TopReservoir};
use crate::error::Result;
use crate::table::{cell, Table};
use crate::types::{MapSelection, SurfaceKind};

#[derive(Debug, Clone, PartialEq, Eq)]
struct MappingRow {
    surface: String,
    polygon_type: String,
    polygon_name: String,
}

#[derive(Debug, Clone, Default)]
pub struct PolygonMapping {
    rows: Vec<MappingRow>,
}

impl PolygonMapping {
    pub fn load(path: &Path) -> Result<Self> {
        let t = Table::read(path)?;
        let surface = t.column("surface")?;
        let polygon_type = t.column("polygon_type")?;
        let polygon_name = t.column("polygon_name")?;
        let rows: Vec<MappingRow> = t
            .rows
            .iter()
            .map(|r| MappingRow {
                surface: cell(r, surface).to_string(),
                polygon_type: cell(r, polygon_type).to_string(),
                polygon_name: cell(r, polygon_name).to_string(),
            })
            .filter(|r| !r.polygon_name.is_empty())
            .collect();
        info!(path = %path.display(), rows = rows.len(), "Loaded polygon mapping");
        Ok(Self { rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Polygon file name for a surface and polygon type; first match wins.
    pub fn polygon_name(&self, surface: &str, polygon_type: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|r| r.surface == surface && r.polygon_type == polygon_type)
            .map(|r| r.polygon_name.as_str())
    }
}

/// Folder holding zone polygons for a selection.
///
/// Realization maps read polygons from their own run, observed and
/// aggregated maps from the configured top-reservoir iteration. The default
/// layer (`selection == None`) comes from the top-reservoir realization.
pub fn zone_polygon_dir(fmu_directory: &Path, top: &TopReservoir, selection: Option<&MapSelection>) -> PathBuf {
    let base = match selection {
        Some(s) if SurfaceKind::from_realization(&s.realization) == SurfaceKind::Realization => {
            fmu_directory.join(&s.realization).join(&s.iteration)
        }
        Some(_) => fmu_directory.join(&top.iteration),
        None => fmu_directory.join(&top.realization).join(&top.iteration),
    };
    base.join(&top.directory).join(&top.polygons_directory)
}

/// `<dir>/<polygon_name>--<tagname>.<format>`
pub fn zone_polygon_file(dir: &Path, polygon_name: &str, spec: &PolygonLayerSpec) -> PathBuf {
    dir.join(format!("{polygon_name}--{}.{}", spec.tagname, spec.format))
}

/// `<polygon_data>/additional_layers/<tagname>.<format>`
pub fn additional_polygon_file(polygon_data: &Path, spec: &PolygonLayerSpec) -> PathBuf {
    polygon_data
        .join("additional_layers")
        .join(format!("{}.{}", spec.tagname, spec.format))
}
