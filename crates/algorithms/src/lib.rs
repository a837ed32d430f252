//! # Gridmask Algorithms
//!
//! Inclusion-mask combination and contiguous-area filtering.
//!
//! The engine turns a set of per-layer policies over a raster exclusion
//! store into a per-pixel inclusion weight mask:
//!
//! - **policy**: per-layer rules converting raw values to weights
//! - **area_filter**: removal of inclusion regions below a minimum
//!   contiguous area
//! - **combiner**: windowed orchestration with boundary-correct padding
//! - **config**: declarative JSON layer mapping

pub mod area_filter;
pub mod combiner;
pub mod config;
pub mod policy;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::area_filter::{area_filter, Kernel, PIXEL_AREA_KM2};
    pub use crate::combiner::MaskCombiner;
    pub use crate::config::{LayerSpec, MaskConfig};
    pub use crate::policy::{LayerPolicy, PolicyRule};
    pub use gridmask_core::prelude::*;
}
