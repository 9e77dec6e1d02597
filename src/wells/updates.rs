//! Data export stamps.
//!
//! The well data folder carries two small YAML stamps written by the export
//! jobs:
//!
//! ```text
//! .welldata_update.yaml      - welldata:
//!                                  update_time: 2021-05-04 10:12:00
//! .production_update.yaml    - production:
//!                                  start_date: 2019-01-01
//!                                  last_date: 2021-05-01
//! ```
//!
//! Only the dates are needed, so the stamps are scanned for their keys
//! rather than parsed as YAML.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::defaults;
use crate::production::ProductionTable;

fn stamp_date(key: &str) -> Regex {
    Regex::new(&format!(r#"(?m)^\s*{key}:\s*['"]?(\d{{4}}-\d{{2}}-\d{{2}})"#)).expect("static pattern")
}

fn update_time() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| stamp_date("update_time"))
}

fn last_date() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| stamp_date("last_date"))
}

/// When the well and production exports were last refreshed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateDates {
    pub well: Option<String>,
    /// Last production date; interval well layers stop here
    pub production: Option<String>,
}

impl UpdateDates {
    /// Read the stamps in `well_dir`. A missing or unreadable production
    /// stamp falls back to the last date of the production tables.
    pub fn load(well_dir: Option<&Path>, production: Option<&ProductionTable>) -> Self {
        let scan = |name: &str, re: &Regex| {
            let path = well_dir?.join(name);
            let text = match std::fs::read_to_string(&path) {
                Ok(text) => text,
                Err(e) => {
                    debug!(path = %path.display(), error = %e, "No update stamp");
                    return None;
                }
            };
            re.captures(&text).map(|c| c[1].to_string())
        };
        let dates = Self {
            well: scan(defaults::WELL_UPDATE_FILE, update_time()),
            production: scan(defaults::PRODUCTION_UPDATE_FILE, last_date())
                .or_else(|| production.and_then(|p| p.last_date().map(str::to_string))),
        };
        info!(well = ?dates.well, production = ?dates.production, "Data update dates");
        dates
    }

    /// Whether an interval starting on `start` is covered by production data.
    /// Without any production date nothing is excluded.
    pub fn covers(&self, start: &str) -> bool {
        self.production.as_deref().map_or(true, |last| start <= last)
    }

    /// `Well data update: <date>  Production data update: <date>`; the
    /// production part is left out when unknown.
    pub fn info_text(&self) -> String {
        let mut text = format!("Well data update: {}", self.well.as_deref().unwrap_or("-"));
        if let Some(production) = &self.production {
            text.push_str("  Production data update: ");
            text.push_str(production);
        }
        text
    }
}
