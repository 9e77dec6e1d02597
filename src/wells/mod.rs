//! Wells: metadata, trajectories and status layers
//!
//! - `metadata`: wellbore table (`wellbore_info.csv`)
//! - `trajectory`: RMS well ASCII trajectories, MD resampling
//! - `status`: per-interval production/injection status layers
//! - `updates`: export stamps of the well and production data

mod metadata;
mod status;
mod trajectory;
mod updates;

pub use metadata::*;
pub use status::*;
pub use trajectory::*;
pub use updates::*;
