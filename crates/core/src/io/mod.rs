//! File-backed layer storage
//!
//! The reference deployment keeps exclusion layers as single-band GeoTIFF
//! files, one per layer, in a directory. No GDAL dependency; decoding uses
//! the `tiff` crate.

mod geotiff;

pub use geotiff::{read_band, write_mask, GeoTiffStore};
