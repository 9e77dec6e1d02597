//! Surface Viewer 4D: map selection and layer assembly for 4D seismic monitoring
//!
//! Resolves a user's map selection (attribute, zone, interval, iteration,
//! realization) to a map file, derives per-well production and injection
//! status for the selected 4D interval, and assembles the layers of a map
//! panel for the host dashboard.
//!
//! ## Components
//!
//! - **catalog**: surface metadata catalog and map resolution
//! - **interval**: interval string arithmetic
//! - **wells** / **production**: well trajectories and status layers
//! - **polygons**: fault, contact, survey-line and zone polygon layers
//! - **surface**: grid reader and colour scaling for the base layer
//! - **composer**: panel assembly, with per-session state in **session**

pub mod cache;
pub mod catalog;
pub mod composer;
pub mod config;
pub mod error;
pub mod interval;
pub mod polygons;
pub mod production;
pub mod session;
pub mod surface;
pub mod types;
pub mod wells;

mod table;

pub use catalog::SurfaceCatalog;
pub use composer::{Viewer, ViewerData};
pub use config::ViewerConfig;
pub use error::{Result, ViewerError};
pub use session::SessionState;
pub use types::{
    Feature, IntervalMode, Layer, MapPanel, MapSelection, MapType, PanelId, Position, WellSelection,
};
