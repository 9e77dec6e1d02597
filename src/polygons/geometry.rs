//! Vertex rows → polylines.
//!
//! Three grouping rules, one per on-disk flavour:
//!
//! - explicit `ID` column: a new polyline starts when the ID changes; rows
//!   without a numeric ID are separators and carry no vertex
//! - legacy headerless coordinates: rows at or below the coordinate
//!   threshold are separators
//! - PRM receiver listings: one polyline per receiver line
//!
//! Every vertex that is not a separator ends up in exactly one polyline.

use serde::Serialize;

use crate::config::defaults::LEGACY_COORDINATE_THRESHOLD;
use crate::types::Position;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Polyline {
    pub positions: Vec<Position>,
    /// Per-line tooltip carried by the file, if any
    pub tooltip: Option<String>,
}

impl Polyline {
    fn new(positions: Vec<Position>, tooltip: Option<String>) -> Self {
        Self { positions, tooltip }
    }
}

/// A vertex row from a file with an `ID` column.
#[derive(Debug, Clone, PartialEq)]
pub struct IdVertex {
    pub position: Position,
    /// `None` for blank, NaN or non-numeric IDs
    pub id: Option<f64>,
    pub tooltip: Option<String>,
}

/// A receiver row from a PRM listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Receiver {
    /// Installation year
    pub installation: String,
    pub line: String,
    pub position: Position,
}

pub fn group_by_id(rows: &[IdVertex]) -> Vec<Polyline> {
    let mut polylines = Vec::new();
    let mut current: Vec<Position> = Vec::new();
    let mut current_id: Option<f64> = None;
    let mut tooltip: Option<String> = None;

    for row in rows {
        match row.id {
            Some(id) if current_id == Some(id) => current.push(row.position),
            Some(id) => {
                if !current.is_empty() {
                    polylines.push(Polyline::new(std::mem::take(&mut current), tooltip.take()));
                }
                current_id = Some(id);
                tooltip = row.tooltip.clone();
                current.push(row.position);
            }
            None => {
                if !current.is_empty() {
                    polylines.push(Polyline::new(std::mem::take(&mut current), tooltip.take()));
                }
                current_id = None;
            }
        }
    }
    if !current.is_empty() {
        polylines.push(Polyline::new(current, tooltip));
    }
    polylines
}

/// Split headerless coordinates on separator rows.
pub fn group_by_threshold(points: &[Position]) -> Vec<Polyline> {
    let mut polylines = Vec::new();
    let mut current: Vec<Position> = Vec::new();
    for &[x, y] in points {
        if x > LEGACY_COORDINATE_THRESHOLD && y > LEGACY_COORDINATE_THRESHOLD {
            current.push([x, y]);
        } else if !current.is_empty() {
            polylines.push(Polyline::new(std::mem::take(&mut current), None));
        }
    }
    if !current.is_empty() {
        polylines.push(Polyline::new(current, None));
    }
    polylines
}

/// One polyline per run of receivers on the same line, tooltip
/// `"<year>-line <line>"`.
pub fn group_prm(rows: &[Receiver]) -> Vec<Polyline> {
    let mut polylines: Vec<Polyline> = Vec::new();
    let mut current_line: Option<&str> = None;
    for r in rows {
        if current_line == Some(r.line.as_str()) {
            if let Some(p) = polylines.last_mut() {
                p.positions.push(r.position);
                continue;
            }
        }
        current_line = Some(&r.line);
        polylines.push(Polyline::new(
            vec![r.position],
            Some(format!("{}-line {}", r.installation, r.line)),
        ));
    }
    polylines
}

pub fn vertex_count(polylines: &[Polyline]) -> usize {
    polylines.iter().map(|p| p.positions.len()).sum()
}
