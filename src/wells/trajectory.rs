//! Well trajectories from RMS well ASCII files.
//!
//! ```text
//! 1.0
//! Unknown
//! NO_1/1-A-1 461000.0 5934000.0 25.0
//! 2
//! MD UNK lin
//! Zonelog DISC 1 Above 2 Reservoir
//! 461000.0 5934000.0 -25.0 0.0 -999
//! ...
//! ```
//!
//! Line 3 is the well name and wellhead, line 4 the number of logs, then one
//! definition line per log and data rows of `X Y Z` followed by the log
//! values. `-999` marks an undefined value.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use super::WellMetadata;
use crate::error::{Result, ViewerError};
use crate::types::Position;

/// One survey point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrajectorySample {
    pub x: f64,
    pub y: f64,
    /// True vertical depth below sea level
    pub z: f64,
    /// Measured depth along the hole
    pub md: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WellTrajectory {
    pub name: String,
    pub samples: Vec<TrajectorySample>,
}

fn is_undefined(v: f64) -> bool {
    !v.is_finite() || (v + 999.0).abs() < 1.0
}

impl WellTrajectory {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| ViewerError::io(path, e))?;
        Self::parse(&text).map_err(|(row, reason)| ViewerError::MalformedRow {
            path: path.to_path_buf(),
            row,
            reason,
        })
    }

    /// Parse RMS well ASCII text. Errors carry the 1-based line number.
    pub fn parse(text: &str) -> std::result::Result<Self, (usize, String)> {
        let mut lines = text.lines().enumerate().map(|(i, l)| (i + 1, l.trim()));
        let mut next = |what: &str| {
            lines
                .by_ref()
                .find(|(_, l)| !l.is_empty())
                .ok_or_else(|| (0, format!("unexpected end of file, expected {what}")))
        };

        next("version")?;
        next("well type")?;
        let (n, header) = next("well name")?;
        let name = header
            .split_whitespace()
            .next()
            .ok_or_else(|| (n, "missing well name".to_string()))?
            .to_string();

        let (n, count) = next("log count")?;
        let log_count: usize = count
            .split_whitespace()
            .next()
            .and_then(|c| c.parse().ok())
            .ok_or_else(|| (n, format!("invalid log count '{count}'")))?;

        let mut md_log = None;
        for i in 0..log_count {
            let (_, def) = next("log definition")?;
            if def.split_whitespace().next().is_some_and(|l| l.eq_ignore_ascii_case("MD")) {
                md_log = Some(i);
            }
        }

        let mut samples: Vec<TrajectorySample> = Vec::new();
        let mut along_hole = 0.0;
        for (n, line) in lines {
            if line.is_empty() {
                continue;
            }
            let values: Vec<f64> = line
                .split_whitespace()
                .map(str::parse)
                .collect::<std::result::Result<_, _>>()
                .map_err(|_| (n, format!("non-numeric value in '{line}'")))?;
            if values.len() < 3 + log_count {
                return Err((n, format!("expected {} values, got {}", 3 + log_count, values.len())));
            }
            let (x, y, z) = (values[0], values[1], values[2]);
            if is_undefined(x) || is_undefined(y) || is_undefined(z) {
                continue;
            }
            let md = match md_log.map(|i| values[3 + i]) {
                Some(md) if !is_undefined(md) => md,
                _ => {
                    if let Some(p) = samples.last() {
                        along_hole += ((x - p.x).powi(2) + (y - p.y).powi(2) + (z - p.z).powi(2)).sqrt();
                    }
                    along_hole
                }
            };
            samples.push(TrajectorySample { x, y, z, md });
        }

        Ok(Self { name, samples })
    }

    /// Thin samples so consecutive kept points are at least `md_spacing`
    /// apart along the hole. First and last samples are always kept; a
    /// spacing of zero keeps everything.
    pub fn resample(&self, md_spacing: f64) -> Self {
        if md_spacing <= 0.0 || self.samples.len() <= 2 {
            return self.clone();
        }
        let mut kept: Vec<TrajectorySample> = Vec::new();
        let last_index = self.samples.len() - 1;
        for (i, s) in self.samples.iter().enumerate() {
            let far_enough = kept.last().map_or(true, |k| s.md - k.md >= md_spacing);
            if far_enough || i == last_index {
                kept.push(*s);
            }
        }
        Self {
            name: self.name.clone(),
            samples: kept,
        }
    }

    /// Map positions of samples with `md_start <= MD <= md_end`.
    pub fn positions(&self, md_start: f64, md_end: Option<f64>) -> Vec<Position> {
        self.samples
            .iter()
            .filter(|s| s.md >= md_start && md_end.map_or(true, |end| s.md <= end))
            .map(|s| [s.x, s.y])
            .collect()
    }
}

/// Trajectories keyed by wellbore name.
#[derive(Debug, Clone, Default)]
pub struct TrajectoryStore {
    trajectories: HashMap<String, WellTrajectory>,
}

impl TrajectoryStore {
    /// Load the trajectory file of every wellbore that lists one.
    ///
    /// Relative file names are resolved against `well_dir`. Unreadable files
    /// are skipped with a warning; those wells are left out of well layers.
    pub fn load(metadata: &WellMetadata, well_dir: &Path, md_spacing: f64) -> Self {
        let mut store = Self::default();
        for well in metadata.iter().filter(|w| !w.file_name.is_empty()) {
            let path = PathBuf::from(&well.file_name);
            let path = if path.is_absolute() { path } else { well_dir.join(path) };
            match WellTrajectory::load(&path) {
                Ok(t) => store.insert(&well.wellbore_name, t.resample(md_spacing)),
                Err(e) => warn!(well = %well.wellbore_name, error = %e, "Skipping well trajectory"),
            }
        }
        info!(wells = store.len(), md_spacing, "Loaded well trajectories");
        store
    }

    pub fn insert(&mut self, wellbore_name: &str, trajectory: WellTrajectory) {
        self.trajectories.insert(wellbore_name.to_string(), trajectory);
    }

    pub fn get(&self, wellbore_name: &str) -> Option<&WellTrajectory> {
        self.trajectories.get(wellbore_name)
    }

    pub fn len(&self) -> usize {
        self.trajectories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trajectories.is_empty()
    }
}
