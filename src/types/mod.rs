//! Shared data structures for the 4D map viewer
//!
//! This module defines the value types that flow through the resolution pipeline:
//! - Selection: MapSelection, MapType, IntervalMode (what the user asked for)
//! - Layer: Layer, Feature (what the host dashboard renders)
//! - Well: WellSelection, Fluid, FlowDirection (status layer vocabulary)

mod selection;
mod layer;
mod well;

pub use selection::*;
pub use layer::*;
pub use well::*;
