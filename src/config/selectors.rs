//! Selector options: the attributes, names, intervals, iterations and
//! realizations offered per map type.
//!
//! Read from an optional TOML selector file:
//!
//! ```toml
//! [observed]
//! attribute = ["4d_diff_rms"]
//! name = ["draupne_fm_1"]
//! interval = ["2020-10-01-2019-10-01"]
//! iteration = ["iter-0"]
//! realization = ["---"]
//! ```
//!
//! When no file is configured the options are derived from the surface
//! catalog instead.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::interval;
use crate::types::MapType;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorOptions {
    #[serde(default)]
    pub attribute: Vec<String>,
    #[serde(default)]
    pub name: Vec<String>,
    #[serde(default)]
    pub interval: Vec<String>,
    #[serde(default)]
    pub iteration: Vec<String>,
    #[serde(default)]
    pub realization: Vec<String>,
}

impl SelectorOptions {
    pub fn is_empty(&self) -> bool {
        self.attribute.is_empty() && self.name.is_empty() && self.interval.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selectors {
    #[serde(default)]
    pub observed: Option<SelectorOptions>,
    #[serde(default)]
    pub simulated: Option<SelectorOptions>,
}

impl Selectors {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        toml::from_str(&contents).map_err(ConfigError::Parse)
    }

    /// Options for a map type; `None` when that map type has none.
    pub fn for_type(&self, map_type: MapType) -> Option<&SelectorOptions> {
        let options = match map_type {
            MapType::Observed => self.observed.as_ref(),
            MapType::Simulated => self.simulated.as_ref(),
        };
        options.filter(|o| !o.is_empty())
    }

    /// Latest date covered by any observed interval.
    ///
    /// Interval well layers are only offered up to this date.
    pub fn last_observed_date(&self) -> Option<String> {
        self.for_type(MapType::Observed)
            .and_then(|o| interval::last_date(&o.interval))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_observed_date_spans_all_observed_intervals() {
        let selectors: Selectors = toml::from_str(
            r#"
[observed]
attribute = ["4d_diff_rms"]
interval = ["2019-10-01-2020-07-01", "2018-01-01-2019-10-01"]

[simulated]
interval = ["2019-10-01-2021-10-01"]
"#,
        )
        .unwrap();
        assert_eq!(selectors.last_observed_date().as_deref(), Some("2020-07-01"));
    }

    #[test]
    fn no_observations_means_no_last_date() {
        let selectors: Selectors = toml::from_str(
            r#"
[simulated]
attribute = ["4d_diff_rms"]
interval = ["2019-10-01-2021-10-01"]
"#,
        )
        .unwrap();
        assert!(selectors.for_type(MapType::Observed).is_none());
        assert_eq!(selectors.last_observed_date(), None);
    }
}
