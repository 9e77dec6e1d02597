//! Polylines → renderable layers.

use std::collections::BTreeMap;

use crate::config::defaults;
use crate::types::{Feature, Layer};

use super::Polyline;

/// How features of a layer are labelled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolygonKind {
    /// Fluid contacts and field outlines; every polyline shows the layer label.
    Contact,
    /// PRM receiver lines; each polyline keeps its `"<year>-line <line>"` text.
    Receivers,
    /// Faults and other outlines; the file's per-line tooltip, else this identifier.
    Outline(String),
    /// Zone polygons; every polyline shows the zone polygon name.
    Zone(String),
}

impl PolygonKind {
    /// Kind for an additional polygon layer, from its tagname.
    pub fn for_tagname(tagname: &str) -> Self {
        if tagname.contains("outline") {
            PolygonKind::Contact
        } else if tagname.starts_with("prm") {
            PolygonKind::Receivers
        } else {
            PolygonKind::Outline(tagname.to_string())
        }
    }

    fn tooltip(&self, polyline: &Polyline, label: &str) -> String {
        match self {
            PolygonKind::Contact => label.to_string(),
            PolygonKind::Zone(name) => name.clone(),
            PolygonKind::Receivers => polyline.tooltip.clone().unwrap_or_else(|| label.to_string()),
            PolygonKind::Outline(id) => polyline.tooltip.clone().unwrap_or_else(|| id.clone()),
        }
    }
}

/// Deployment override, then built-in default, then gray.
pub fn polygon_color(tagname: &str, overrides: &BTreeMap<String, String>) -> String {
    overrides
        .get(tagname)
        .cloned()
        .or_else(|| defaults::polygon_colors().remove(tagname))
        .unwrap_or_else(|| defaults::POLYGON_FALLBACK_COLOR.to_string())
}

pub fn is_checked_by_default(label: &str) -> bool {
    defaults::CHECKED_POLYGON_LAYERS.contains(&label)
}

/// Build a layer; `None` when no polyline has a vertex.
pub fn build_layer(polylines: Vec<Polyline>, kind: &PolygonKind, label: &str, color: &str) -> Option<Layer> {
    let data: Vec<Feature> = polylines
        .into_iter()
        .filter(|p| !p.positions.is_empty())
        .map(|p| {
            let tooltip = kind.tooltip(&p, label);
            Feature::polyline(color, p.positions, tooltip)
        })
        .collect();
    if data.is_empty() {
        return None;
    }
    Some(Layer::overlay(label, is_checked_by_default(label), data))
}

/// First layer whose first feature is labelled with the zone name.
pub fn zone_layer<'a>(layers: &'a [Layer], zone: &str) -> Option<&'a Layer> {
    layers.iter().find(|l| l.first_tooltip() == Some(zone))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(n: usize, tooltip: Option<&str>) -> Polyline {
        Polyline {
            positions: (0..n).map(|i| [461_000.0 + i as f64, 5_934_000.0]).collect(),
            tooltip: tooltip.map(str::to_string),
        }
    }

    #[test]
    fn fault_layer_uses_tagname_and_default_color() {
        let color = polygon_color("faults", &BTreeMap::new());
        let layer = build_layer(vec![line(3, None)], &PolygonKind::for_tagname("faults"), "Faults", &color).unwrap();
        assert!(layer.checked);
        assert_eq!(layer.first_tooltip(), Some("faults"));
        assert_eq!(layer.data[0].color(), Some("gray"));
    }

    #[test]
    fn contact_layer_uses_label() {
        let color = polygon_color("owc_outline", &BTreeMap::new());
        let layer = build_layer(
            vec![line(2, None), line(4, None)],
            &PolygonKind::for_tagname("owc_outline"),
            "Initial OWC",
            &color,
        )
        .unwrap();
        assert!(layer.checked);
        assert_eq!(layer.data.len(), 2);
        assert!(layer.data.iter().all(|f| f.tooltip() == Some("Initial OWC")));
        assert_eq!(layer.data[0].color(), Some("lightslategray"));
    }

    #[test]
    fn receiver_layer_is_unchecked() {
        let color = polygon_color("prm_receivers", &BTreeMap::new());
        let layer = build_layer(
            vec![line(2, Some("2018-line 1"))],
            &PolygonKind::for_tagname("prm_receivers"),
            "PRM receivers",
            &color,
        )
        .unwrap();
        assert!(!layer.checked);
        assert_eq!(layer.first_tooltip(), Some("2018-line 1"));
        assert_eq!(color, "darkgray");
    }

    #[test]
    fn color_resolution_order() {
        let overrides: BTreeMap<String, String> = [("faults".to_string(), "black".to_string())].into();
        assert_eq!(polygon_color("faults", &overrides), "black");
        assert_eq!(polygon_color("injectites", &overrides), "khaki");
        assert_eq!(polygon_color("shadow_area", &overrides), "gray");
    }

    #[test]
    fn empty_input_builds_nothing() {
        assert!(build_layer(vec![], &PolygonKind::Contact, "Initial OWC", "red").is_none());
        assert!(build_layer(vec![line(0, None)], &PolygonKind::Contact, "Initial OWC", "red").is_none());
    }

    #[test]
    fn zone_layer_matches_first_tooltip() {
        let zone = |name: &str| {
            build_layer(vec![line(2, None)], &PolygonKind::Zone(name.into()), "Faults", "gray").unwrap()
        };
        let layers = vec![zone("basevolantis"), zone("topvolantis")];
        assert_eq!(zone_layer(&layers, "topvolantis"), Some(&layers[1]));
        assert!(zone_layer(&layers, "basetherys").is_none());
    }
}
