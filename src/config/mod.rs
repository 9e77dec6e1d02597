//! Viewer Configuration Module
//!
//! Provides per-deployment configuration loaded from TOML files: where the
//! FMU case and input tables live, the interval ordering convention, layer
//! labels, colours and attribute scaling.
//!
//! ## Loading Order
//!
//! 1. `SV4D_CONFIG` environment variable (path to TOML file)
//! 2. `viewer_config.toml` in the current working directory
//! 3. Built-in defaults
//!
//! ## Usage
//!
//! The configuration is loaded once and handed to `ViewerData::load`:
//!
//! ```ignore
//! let config = ViewerConfig::load();
//! let viewer = Viewer::new(ViewerData::load(config)?);
//! ```

mod selectors;
mod viewer_config;
pub mod defaults;
pub mod validation;

pub use selectors::*;
pub use viewer_config::*;
