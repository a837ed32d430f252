//! # Gridmask Core
//!
//! Core primitives for the gridmask inclusion-mask engine.
//!
//! This crate provides:
//! - `Window`: rectangular or index-addressed sub-regions of the domain,
//!   plus the padding/cropping used for boundary-correct area filtering
//! - `LayerStore`: read-only contract for the exclusion layer catalogue
//! - `MemoryStore` and `GeoTiffStore`: reference store implementations
//! - The unified error type shared across the workspace

pub mod error;
pub mod io;
pub mod store;
pub mod window;

pub use error::{Error, Result};
pub use store::{LayerStore, MemoryStore};
pub use window::{CropOffset, Window};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::io::GeoTiffStore;
    pub use crate::store::{LayerStore, MemoryStore};
    pub use crate::window::{CropOffset, Window};
}
