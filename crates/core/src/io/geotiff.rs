//! GeoTIFF-backed layer store
//!
//! [`GeoTiffStore`] maps every single-band `.tif`/`.tiff` file in a directory
//! to a layer named after the file stem. Reads decode the whole band and
//! slice the requested window out; acceptable for the layer sizes the CLI
//! targets, and it keeps file handles scoped to each read.

use crate::error::{Error, Result};
use crate::store::{extract_window, LayerStore};
use crate::window::Window;
use ndarray::Array2;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::colortype::Gray32Float;
use tiff::encoder::TiffEncoder;

/// Read a single-band TIFF into an `Array2<f32>`
pub fn read_band<P: AsRef<Path>>(path: P) -> Result<Array2<f32>> {
    let file = File::open(path.as_ref())?;
    let mut decoder =
        Decoder::new(file).map_err(|e| Error::Decode(format!("TIFF decode error: {e}")))?;

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| Error::Decode(format!("cannot read TIFF dimensions: {e}")))?;
    let (rows, cols) = (height as usize, width as usize);

    let image = decoder
        .read_image()
        .map_err(|e| Error::Decode(format!("cannot read TIFF image data: {e}")))?;

    let data: Vec<f32> = match image {
        DecodingResult::F32(buf) => buf,
        DecodingResult::F64(buf) => buf.iter().map(|&v| v as f32).collect(),
        DecodingResult::U8(buf) => cast_band(&buf),
        DecodingResult::U16(buf) => cast_band(&buf),
        DecodingResult::U32(buf) => cast_band(&buf),
        DecodingResult::I8(buf) => cast_band(&buf),
        DecodingResult::I16(buf) => cast_band(&buf),
        DecodingResult::I32(buf) => cast_band(&buf),
        _ => {
            return Err(Error::Decode(
                "unsupported TIFF pixel format for exclusion layers".to_string(),
            ))
        }
    };

    if data.len() != rows * cols {
        return Err(Error::Decode(format!(
            "TIFF band holds {} samples, expected {}x{}",
            data.len(),
            rows,
            cols
        )));
    }

    Array2::from_shape_vec((rows, cols), data).map_err(|e| Error::Other(e.to_string()))
}

fn cast_band<T: num_traits::NumCast + Copy>(buf: &[T]) -> Vec<f32> {
    buf.iter()
        .map(|&v| num_traits::cast(v).unwrap_or(f32::NAN))
        .collect()
}

/// Write a computed mask as a 32-bit float single-band TIFF
pub fn write_mask<P: AsRef<Path>>(mask: &Array2<f32>, path: P) -> Result<()> {
    let file = File::create(path.as_ref())?;
    let mut encoder =
        TiffEncoder::new(file).map_err(|e| Error::Decode(format!("TIFF encoder error: {e}")))?;

    let (rows, cols) = mask.dim();
    let data: Vec<f32> = mask.iter().copied().collect();
    encoder
        .write_image::<Gray32Float>(cols as u32, rows as u32, &data)
        .map_err(|e| Error::Decode(format!("cannot write TIFF image: {e}")))?;

    Ok(())
}

/// Layer store over a directory of single-band GeoTIFF files.
///
/// The catalogue and domain shape are fixed at open time; every layer must
/// share the domain shape.
#[derive(Debug)]
pub struct GeoTiffStore {
    paths: BTreeMap<String, PathBuf>,
    names: Vec<String>,
    shape: (usize, usize),
}

impl GeoTiffStore {
    /// Open a directory of layer files.
    ///
    /// Fails when the directory holds no TIFF files or when layer shapes
    /// disagree.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let mut paths = BTreeMap::new();
        for entry in std::fs::read_dir(dir.as_ref())? {
            let path = entry?.path();
            let is_tiff = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("tif") || ext.eq_ignore_ascii_case("tiff"));
            if !is_tiff {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                paths.insert(stem.to_string(), path);
            }
        }

        if paths.is_empty() {
            return Err(Error::Decode(format!(
                "no TIFF layers found in {}",
                dir.as_ref().display()
            )));
        }

        let mut shape = None;
        for (name, path) in &paths {
            let dims = band_shape(path)?;
            match shape {
                None => shape = Some(dims),
                Some((er, ec)) if dims != (er, ec) => {
                    return Err(Error::ShapeMismatch {
                        layer: name.clone(),
                        er,
                        ec,
                        ar: dims.0,
                        ac: dims.1,
                    });
                }
                Some(_) => {}
            }
        }

        let names = paths.keys().cloned().collect();
        Ok(Self {
            paths,
            names,
            // paths is non-empty, checked above
            shape: shape.ok_or_else(|| Error::Other("empty layer store".to_string()))?,
        })
    }
}

fn band_shape(path: &Path) -> Result<(usize, usize)> {
    let file = File::open(path)?;
    let mut decoder =
        Decoder::new(file).map_err(|e| Error::Decode(format!("TIFF decode error: {e}")))?;
    let (width, height) = decoder
        .dimensions()
        .map_err(|e| Error::Decode(format!("cannot read TIFF dimensions: {e}")))?;
    Ok((height as usize, width as usize))
}

impl LayerStore for GeoTiffStore {
    fn catalogue(&self) -> &[String] {
        &self.names
    }

    fn shape(&self) -> (usize, usize) {
        self.shape
    }

    fn read(&self, layer: &str, window: &Window) -> Result<Array2<f32>> {
        let path = self.paths.get(layer).ok_or_else(|| Error::UnknownLayer {
            layer: layer.to_string(),
        })?;
        let data = read_band(path)?;
        extract_window(&data, window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(rows: usize, cols: usize) -> Array2<f32> {
        Array2::from_shape_fn((rows, cols), |(r, c)| (r * cols + c) as f32)
    }

    #[test]
    fn test_mask_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mask.tif");
        let mask = ramp(6, 4);

        write_mask(&mask, &path).unwrap();
        let decoded = read_band(&path).unwrap();
        assert_eq!(decoded, mask);
    }

    #[test]
    fn test_store_catalogue_and_windowed_read() {
        let dir = tempfile::tempdir().unwrap();
        write_mask(&ramp(8, 8), dir.path().join("slope.tif")).unwrap();
        write_mask(&Array2::ones((8, 8)), dir.path().join("protected.tif")).unwrap();

        let store = GeoTiffStore::open(dir.path()).unwrap();
        assert_eq!(store.shape(), (8, 8));
        assert_eq!(store.catalogue(), ["protected", "slope"]);

        let sub = store.read("slope", &Window::ranges(2..4, 0..3)).unwrap();
        assert_eq!(sub.dim(), (2, 3));
        assert_eq!(sub[(0, 0)], 16.0);
    }

    #[test]
    fn test_store_rejects_mismatched_shapes() {
        let dir = tempfile::tempdir().unwrap();
        write_mask(&ramp(8, 8), dir.path().join("slope.tif")).unwrap();
        write_mask(&ramp(4, 8), dir.path().join("protected.tif")).unwrap();

        let err = GeoTiffStore::open(dir.path()).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
    }

    #[test]
    fn test_open_empty_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(GeoTiffStore::open(dir.path()).is_err());
    }
}
