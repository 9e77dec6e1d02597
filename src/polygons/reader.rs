//! Polygon file readers.

use std::path::Path;

use tracing::debug;

use super::geometry::{self, IdVertex, Polyline, Receiver};
use crate::config::PolygonFormat;
use crate::error::{Result, ViewerError};
use crate::table::{self, cell, Table};
use crate::types::Position;

/// Read a polygon file into polylines.
///
/// `csv` and `rms` files with an `X,Y[,Z],ID` header are grouped by ID; if
/// the file has a `REAL` column only realization 0 is kept. Headerless
/// files (and `pol`) use the legacy separator rule.
pub fn read_polylines(path: &Path, format: PolygonFormat) -> Result<Vec<Polyline>> {
    let polylines = match format {
        PolygonFormat::Prm => read_prm(path)?,
        PolygonFormat::Pol => read_legacy(path)?,
        PolygonFormat::Csv | PolygonFormat::Rms => {
            if has_header(path)? {
                read_with_ids(path)?
            } else {
                read_legacy(path)?
            }
        }
    };
    debug!(
        path = %path.display(),
        polylines = polylines.len(),
        vertices = geometry::vertex_count(&polylines),
        "read polygons"
    );
    Ok(polylines)
}

fn has_header(path: &Path) -> Result<bool> {
    let text = std::fs::read_to_string(path).map_err(|e| ViewerError::io(path, e))?;
    let first = text
        .lines()
        .find(|l| !l.trim().is_empty())
        .and_then(|l| tokens(l).next());
    Ok(first.map_or(false, |t| t.parse::<f64>().is_err()))
}

fn tokens(line: &str) -> impl Iterator<Item = &str> {
    line.split(|c: char| c == ',' || c.is_whitespace()).filter(|t| !t.is_empty())
}

fn first_column(t: &Table, names: &[&str]) -> Result<usize> {
    names
        .iter()
        .find_map(|n| t.optional_column(n))
        .ok_or_else(|| ViewerError::MissingColumn {
            path: t.path.clone(),
            column: names.join("|"),
        })
}

fn read_with_ids(path: &Path) -> Result<Vec<Polyline>> {
    let t = Table::read(path)?;
    let x = first_column(&t, &["X", "X_UTME"])?;
    let y = first_column(&t, &["Y", "Y_UTMN"])?;
    let id = first_column(&t, &["ID", "POLY_ID"])?;
    let real = t.optional_column("REAL");
    let tooltip = t.optional_column("tooltip");

    let rows: Vec<IdVertex> = t
        .rows
        .iter()
        .filter(|r| real.map_or(true, |i| table::number(r, i) == Some(0.0)))
        .filter_map(|r| {
            let position = [table::number(r, x)?, table::number(r, y)?];
            Some(IdVertex {
                position,
                id: table::number(r, id),
                tooltip: tooltip.map(|i| cell(r, i).to_string()).filter(|s| !s.is_empty()),
            })
        })
        .collect();
    Ok(geometry::group_by_id(&rows))
}

/// Below the legacy threshold, so it splits runs like a `999.0` row.
const SEPARATOR: Position = [0.0, 0.0];

fn read_legacy(path: &Path) -> Result<Vec<Polyline>> {
    let text = std::fs::read_to_string(path).map_err(|e| ViewerError::io(path, e))?;
    let mut points = Vec::new();
    for (n, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let mut values = tokens(line).map(table::parse_number);
        match (values.next().flatten(), values.next().flatten()) {
            (Some(x), Some(y)) => points.push([x, y]),
            _ => {
                // Marker lines such as `END` close the current polyline.
                debug!(
                    path = %path.display(),
                    row = n + 1,
                    line = line.trim(),
                    "non-coordinate line, treated as separator"
                );
                points.push(SEPARATOR);
            }
        }
    }
    Ok(geometry::group_by_threshold(&points))
}

fn read_prm(path: &Path) -> Result<Vec<Polyline>> {
    let t = Table::read_delimited(path, b'\t')?;
    let installation = t.column("Installation")?;
    let line = t.column("RECEIVER_LINE")?;
    let x = t.column("RCV_UTMX")?;
    let y = t.column("RCV_UTMY")?;

    let rows: Vec<Receiver> = t
        .rows
        .iter()
        .filter_map(|r| {
            Some(Receiver {
                installation: integer_text(cell(r, installation)),
                line: integer_text(cell(r, line)),
                position: [table::number(r, x)?, table::number(r, y)?],
            })
        })
        .collect();
    Ok(geometry::group_prm(&rows))
}

/// `2018.0` → `2018`; anything else unchanged.
fn integer_text(s: &str) -> String {
    match table::parse_number(s) {
        Some(v) if v.fract() == 0.0 => format!("{}", v as i64),
        _ => s.to_string(),
    }
}
