//! Surface base layer: grid reader, colour scaling and the image layer
//! handed to the renderer.

mod irap;
mod scaling;

pub use irap::SurfaceGrid;
pub use scaling::{ScalingRow, SurfaceScaling};

use std::path::Path;

use serde::Serialize;

use crate::config::AttributeSettings;
use crate::types::{Feature, Layer};

/// Colour scale for one map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapScaling {
    pub colormap: String,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub unit: String,
}

impl MapScaling {
    /// Attribute settings, with scaling-table limits taking precedence.
    ///
    /// When the lower limit exceeds the upper one the limits are swapped and
    /// the colormap reversed (`_r` added or removed).
    pub fn resolve(
        settings: Option<&AttributeSettings>,
        default_colormap: &str,
        limits: Option<(Option<f64>, Option<f64>)>,
    ) -> Self {
        let colormap = settings
            .and_then(|s| s.colormap.clone())
            .unwrap_or_else(|| default_colormap.to_string());
        let (lower, upper) = limits.unwrap_or_default();
        let min = lower.or_else(|| settings.and_then(|s| s.min_value));
        let max = upper.or_else(|| settings.and_then(|s| s.max_value));
        let unit = settings.map(|s| s.unit.clone()).unwrap_or_default();

        match (min, max) {
            (Some(lo), Some(hi)) if lo > hi => Self {
                colormap: reversed(&colormap),
                min: Some(hi),
                max: Some(lo),
                unit,
            },
            _ => Self { colormap, min, max, unit },
        }
    }
}

fn reversed(colormap: &str) -> String {
    match colormap.strip_suffix("_r") {
        Some(base) => base.to_string(),
        None => format!("{colormap}_r"),
    }
}

/// Base image layer for a grid. Unset limits come from the grid's value range.
pub fn surface_layer(path: &Path, grid: &SurfaceGrid, attribute: &str, scaling: &MapScaling) -> Layer {
    let range = grid.value_range();
    let min = scaling.min.or(range.map(|r| r.0));
    let max = scaling.max.or(range.map(|r| r.1));
    Layer {
        name: attribute.to_string(),
        checked: true,
        base_layer: true,
        data: vec![Feature::Image {
            path: path.display().to_string(),
            bounds: grid.bounds(),
            colormap: scaling.colormap.clone(),
            minvalue: min.map(|v| format!("{v:.2}")),
            maxvalue: max.map(|v| format!("{v:.2}")),
            unit: scaling.unit.clone(),
            allow_hillshading: false,
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> AttributeSettings {
        AttributeSettings {
            colormap: Some("seismic".into()),
            min_value: Some(-1.0),
            max_value: Some(1.0),
            unit: "m".into(),
        }
    }

    #[test]
    fn table_limits_override_settings() {
        let s = MapScaling::resolve(Some(&settings()), "viridis", Some((Some(-0.5), None)));
        assert_eq!(s.min, Some(-0.5));
        assert_eq!(s.max, Some(1.0));
        assert_eq!(s.colormap, "seismic");
        assert_eq!(s.unit, "m");
    }

    #[test]
    fn inverted_limits_flip_colormap() {
        let s = MapScaling::resolve(Some(&settings()), "viridis", Some((Some(0.2), Some(-0.2))));
        assert_eq!((s.min, s.max), (Some(-0.2), Some(0.2)));
        assert_eq!(s.colormap, "seismic_r");

        let s = MapScaling::resolve(None, "seismic_r", Some((Some(3.0), Some(1.0))));
        assert_eq!(s.colormap, "seismic");
    }

    #[test]
    fn defaults_without_settings() {
        let s = MapScaling::resolve(None, "seismic_r", None);
        assert_eq!(s.colormap, "seismic_r");
        assert_eq!((s.min, s.max), (None, None));
    }

    #[test]
    fn layer_falls_back_to_grid_range() {
        let grid = SurfaceGrid {
            nx: 2,
            ny: 1,
            xori: 0.0,
            yori: 0.0,
            xinc: 10.0,
            yinc: 10.0,
            rotation: 0.0,
            values: vec![-0.126, 0.5],
        };
        let scaling = MapScaling::resolve(None, "seismic_r", None);
        let layer = surface_layer(Path::new("/data/a.gri"), &grid, "max", &scaling);
        assert!(layer.base_layer && layer.checked);
        match &layer.data[0] {
            Feature::Image { minvalue, maxvalue, bounds, .. } => {
                assert_eq!(minvalue.as_deref(), Some("-0.13"));
                assert_eq!(maxvalue.as_deref(), Some("0.50"));
                assert_eq!(bounds, &[[0.0, 0.0], [10.0, 0.0]]);
            }
            other => panic!("expected image, got {other:?}"),
        }
    }
}
