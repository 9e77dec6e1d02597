//! Irap binary (`.gri`) regular surface grids.
//!
//! Big-endian Fortran unformatted records, each framed by a 4-byte length
//! before and after the payload:
//!
//! | record | payload                                                   |
//! |--------|-----------------------------------------------------------|
//! | 1      | `-996 ny xori xmax yori ymax xinc yinc` (i32 i32 6×f32)    |
//! | 2      | `nx rot xori yori` (i32 3×f32)                             |
//! | 3      | seven unused i32                                           |
//! | 4..    | `nx * ny` f32 values, column index fastest                |
//!
//! `9999900.0` marks an undefined node.

use std::path::Path;

use serde::Serialize;

use crate::error::{Result, ViewerError};
use crate::types::Position;

const IRAP_ID: i32 = -996;
const UNDEFINED: f32 = 9_999_900.0;
const DATA_RECORD_VALUES: usize = 2000;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurfaceGrid {
    pub nx: usize,
    pub ny: usize,
    pub xori: f64,
    pub yori: f64,
    pub xinc: f64,
    pub yinc: f64,
    /// Rotation in degrees, counter-clockwise around the origin
    pub rotation: f64,
    /// Row-major by `j`, NaN for undefined nodes
    #[serde(skip)]
    pub values: Vec<f32>,
}

struct Records<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Records<'a> {
    fn u32_at(&self, at: usize) -> std::result::Result<u32, String> {
        self.bytes
            .get(at..at + 4)
            .and_then(|b| b.try_into().ok())
            .map(u32::from_be_bytes)
            .ok_or_else(|| format!("truncated record marker at byte {at}"))
    }

    fn next(&mut self) -> std::result::Result<&'a [u8], String> {
        let len = self.u32_at(self.pos)? as usize;
        let start = self.pos + 4;
        let payload = self
            .bytes
            .get(start..start + len)
            .ok_or_else(|| format!("record at byte {} runs past end of file", self.pos))?;
        let trailer = self.u32_at(start + len)? as usize;
        if trailer != len {
            return Err(format!("record length mismatch at byte {}: {len} vs {trailer}", self.pos));
        }
        self.pos = start + len + 4;
        Ok(payload)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }
}

fn word(payload: &[u8], i: usize) -> std::result::Result<[u8; 4], String> {
    payload
        .get(i * 4..i * 4 + 4)
        .and_then(|b| b.try_into().ok())
        .ok_or_else(|| format!("header record too short for field {i}"))
}

fn int(payload: &[u8], i: usize) -> std::result::Result<i32, String> {
    word(payload, i).map(i32::from_be_bytes)
}

fn float(payload: &[u8], i: usize) -> std::result::Result<f64, String> {
    word(payload, i).map(|w| f32::from_be_bytes(w) as f64)
}

impl SurfaceGrid {
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| ViewerError::io(path, e))?;
        Self::decode(&bytes).map_err(|reason| ViewerError::Surface {
            path: path.to_path_buf(),
            reason,
        })
    }

    pub fn decode(bytes: &[u8]) -> std::result::Result<Self, String> {
        let mut records = Records { bytes, pos: 0 };

        let header = records.next()?;
        if int(header, 0)? != IRAP_ID {
            return Err(format!("not an Irap binary surface (id {})", int(header, 0)?));
        }
        let ny = int(header, 1)?;
        let yori = float(header, 4)?;
        let xinc = float(header, 6)?;
        let yinc = float(header, 7)?;

        let geometry = records.next()?;
        let nx = int(geometry, 0)?;
        let rotation = float(geometry, 1)?;
        let xori = float(geometry, 2)?;
        if nx <= 0 || ny <= 0 {
            return Err(format!("invalid grid dimensions {nx} x {ny}"));
        }
        let (nx, ny) = (nx as usize, ny as usize);

        records.next()?;

        let available = bytes.len().saturating_sub(records.pos) / 4;
        let expected = match nx.checked_mul(ny) {
            Some(n) if n <= available => n,
            _ => return Err(format!("grid dimensions {nx} x {ny} exceed the {available} values in the file")),
        };
        let mut values = Vec::with_capacity(expected);
        while values.len() < expected && !records.at_end() {
            let payload = records.next()?;
            values.extend(payload.chunks_exact(4).map(|c| {
                let v = f32::from_be_bytes([c[0], c[1], c[2], c[3]]);
                if v >= UNDEFINED {
                    f32::NAN
                } else {
                    v
                }
            }));
        }
        if values.len() != expected {
            return Err(format!("expected {expected} values, found {}", values.len()));
        }

        Ok(Self {
            nx,
            ny,
            xori,
            yori,
            xinc,
            yinc,
            rotation,
            values,
        })
    }

    /// Irap binary encoding of the grid.
    pub fn encode(&self) -> Vec<u8> {
        fn record(out: &mut Vec<u8>, payload: &[u8]) {
            let len = (payload.len() as u32).to_be_bytes();
            out.extend_from_slice(&len);
            out.extend_from_slice(payload);
            out.extend_from_slice(&len);
        }
        let f = |v: f64| (v as f32).to_be_bytes();
        let i = |v: i32| v.to_be_bytes();
        let xmax = self.xori + (self.nx.saturating_sub(1)) as f64 * self.xinc;
        let ymax = self.yori + (self.ny.saturating_sub(1)) as f64 * self.yinc;

        let mut out = Vec::new();
        let header: Vec<u8> = [
            i(IRAP_ID),
            i(self.ny as i32),
            f(self.xori),
            f(xmax),
            f(self.yori),
            f(ymax),
            f(self.xinc),
            f(self.yinc),
        ]
        .concat();
        record(&mut out, &header);
        record(&mut out, &[i(self.nx as i32), f(self.rotation), f(self.xori), f(self.yori)].concat());
        record(&mut out, &[0_i32; 7].map(i).concat());
        for chunk in self.values.chunks(DATA_RECORD_VALUES) {
            let payload: Vec<u8> = chunk
                .iter()
                .flat_map(|v| (if v.is_nan() { UNDEFINED } else { *v }).to_be_bytes())
                .collect();
            record(&mut out, &payload);
        }
        out
    }

    /// `[[xmin, ymin], [xmax, ymax]]` of the grid nodes, rotation applied.
    pub fn bounds(&self) -> [Position; 2] {
        let width = self.nx.saturating_sub(1) as f64 * self.xinc;
        let height = self.ny.saturating_sub(1) as f64 * self.yinc;
        let (sin, cos) = self.rotation.to_radians().sin_cos();
        let corners = [(0.0, 0.0), (width, 0.0), (0.0, height), (width, height)]
            .map(|(dx, dy)| [self.xori + dx * cos - dy * sin, self.yori + dx * sin + dy * cos]);
        let mut lo = corners[0];
        let mut hi = corners[0];
        for [x, y] in corners {
            lo = [lo[0].min(x), lo[1].min(y)];
            hi = [hi[0].max(x), hi[1].max(y)];
        }
        [lo, hi]
    }

    /// Smallest and largest defined value, `None` when every node is undefined.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.values
            .iter()
            .filter(|v| v.is_finite())
            .fold(None::<(f64, f64)>, |acc, &v| {
                let v = v as f64;
                Some(match acc {
                    None => (v, v),
                    Some((lo, hi)) => (f64::min(lo, v), f64::max(hi, v)),
                })
            })
    }

    pub fn defined_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_finite()).count()
    }
}
