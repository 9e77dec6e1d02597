//! Rendering payload types handed to the host dashboard

use serde::{Deserialize, Serialize};

/// Easting / northing pair.
pub type Position = [f64; 2];

/// A single drawable item in a layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Feature {
    Polyline {
        color: String,
        positions: Vec<Position>,
        tooltip: String,
    },
    /// Raster base map. Pixels are produced by the renderer from `path`.
    Image {
        path: String,
        /// `[[xmin, ymin], [xmax, ymax]]`
        bounds: [Position; 2],
        colormap: String,
        minvalue: Option<String>,
        maxvalue: Option<String>,
        unit: String,
        #[serde(rename = "allowHillshading")]
        allow_hillshading: bool,
    },
}

impl Feature {
    pub fn polyline(color: impl Into<String>, positions: Vec<Position>, tooltip: impl Into<String>) -> Self {
        Feature::Polyline {
            color: color.into(),
            positions,
            tooltip: tooltip.into(),
        }
    }

    pub fn tooltip(&self) -> Option<&str> {
        match self {
            Feature::Polyline { tooltip, .. } => Some(tooltip),
            Feature::Image { .. } => None,
        }
    }

    pub fn color(&self) -> Option<&str> {
        match self {
            Feature::Polyline { color, .. } => Some(color),
            Feature::Image { .. } => None,
        }
    }

    /// Number of vertices for polylines, zero for images.
    pub fn vertex_count(&self) -> usize {
        match self {
            Feature::Polyline { positions, .. } => positions.len(),
            Feature::Image { .. } => 0,
        }
    }
}

/// A named, toggleable collection of features.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Layer {
    pub name: String,
    /// Visible by default in the layer toggle UI
    pub checked: bool,
    pub base_layer: bool,
    pub data: Vec<Feature>,
}

impl Layer {
    pub fn overlay(name: impl Into<String>, checked: bool, data: Vec<Feature>) -> Self {
        Self {
            name: name.into(),
            checked,
            base_layer: false,
            data,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Tooltip of the first feature, used to identify zone layers.
    pub fn first_tooltip(&self) -> Option<&str> {
        self.data.first().and_then(Feature::tooltip)
    }
}

/// Everything one map panel shows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MapPanel {
    pub heading: String,
    pub sim_info: String,
    pub layers: Vec<Layer>,
    /// Formatted interval label, e.g. `PRM1 - PRM0`
    pub label: String,
    /// Export dates of the well and production data
    #[serde(default)]
    pub update_info: String,
}

impl MapPanel {
    /// Panel shown when the selected map cannot be resolved or read.
    pub fn placeholder() -> Self {
        Self {
            heading: "Selected map doesn't exist".to_string(),
            sim_info: "-".to_string(),
            layers: Vec::new(),
            label: "-".to_string(),
            update_info: String::new(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.layers.is_empty() && self.label == "-"
    }
}
