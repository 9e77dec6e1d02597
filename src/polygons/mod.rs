//! Polygon layers: faults, fluid contacts, survey lines and zone outlines
//!
//! Files are grouped into polylines (`geometry`), read per on-disk format
//! (`reader`) and turned into layers with colour and tooltip (`layer`).
//! Zone polygon files are located through the mapping table (`mapping`).

mod geometry;
mod layer;
mod mapping;
mod reader;

pub use geometry::*;
pub use layer::*;
pub use mapping::*;
pub use reader::*;

use std::collections::BTreeMap;
use std::path::Path;

use tracing::warn;

use crate::config::{PolygonFormat, PolygonLayerSpec};
use crate::error::Result;
use crate::types::Layer;

fn format_of(spec: &PolygonLayerSpec) -> PolygonFormat {
    PolygonFormat::parse(&spec.format).unwrap_or_else(|| {
        warn!(tagname = %spec.tagname, format = %spec.format, "Unknown polygon format, reading as csv");
        PolygonFormat::Csv
    })
}

/// Zone polygon layer from `path`, labelled with the zone polygon name.
pub fn load_zone_layer(
    path: &Path,
    spec: &PolygonLayerSpec,
    polygon_name: &str,
    colors: &BTreeMap<String, String>,
) -> Result<Option<Layer>> {
    let format = format_of(spec);
    let polylines = read_polylines(path, format)?;
    let kind = match format {
        PolygonFormat::Prm => PolygonKind::Receivers,
        _ => PolygonKind::Zone(polygon_name.to_string()),
    };
    Ok(build_layer(polylines, &kind, &spec.label, &polygon_color(&spec.tagname, colors)))
}

/// Additional polygon layer from `<polygon_data>/additional_layers`.
pub fn load_additional_layer(
    polygon_data: &Path,
    spec: &PolygonLayerSpec,
    colors: &BTreeMap<String, String>,
) -> Result<Option<Layer>> {
    let format = format_of(spec);
    let polylines = read_polylines(&additional_polygon_file(polygon_data, spec), format)?;
    let kind = match format {
        PolygonFormat::Prm => PolygonKind::Receivers,
        _ => PolygonKind::for_tagname(&spec.tagname),
    };
    Ok(build_layer(polylines, &kind, &spec.label, &polygon_color(&spec.tagname, colors)))
}
