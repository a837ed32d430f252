//! Layer store contract and the in-memory reference store
//!
//! The engine reads raw exclusion values through the [`LayerStore`] trait and
//! never writes back. Implementations must tolerate concurrent reads; the
//! combiner holds one store handle for the lifetime of an analysis session.

use crate::error::{Error, Result};
use crate::window::Window;
use ndarray::{s, Array2};
use std::collections::BTreeMap;

/// Read access to a catalogue of named exclusion layers over a common domain.
pub trait LayerStore {
    /// Names of the layers available in this store
    fn catalogue(&self) -> &[String];

    /// Domain shape as (rows, cols)
    fn shape(&self) -> (usize, usize);

    /// Read the raw values of `layer` over `window`.
    ///
    /// The returned array matches the window's shape and indexing mode.
    /// Out-of-bounds windows are an error, never a truncated read.
    fn read(&self, layer: &str, window: &Window) -> Result<Array2<f32>>;

    /// Whether `layer` exists in the catalogue
    fn contains(&self, layer: &str) -> bool {
        self.catalogue().iter().any(|name| name == layer)
    }
}

/// Extract `window` from a full-domain array.
///
/// Shared by stores that decode whole layers and slice afterwards. Explicit
/// index sequences select rows then columns (cross product).
pub fn extract_window(data: &Array2<f32>, window: &Window) -> Result<Array2<f32>> {
    window.check_bounds(data.dim())?;

    match window {
        Window::Full => Ok(data.clone()),
        Window::Ranges { rows, cols } => {
            Ok(data.slice(s![rows.clone(), cols.clone()]).to_owned())
        }
        Window::Indices { rows, cols } => {
            let mut out = Array2::zeros((rows.len(), cols.len()));
            for (i, &row) in rows.iter().enumerate() {
                for (j, &col) in cols.iter().enumerate() {
                    out[(i, j)] = data[(row, col)];
                }
            }
            Ok(out)
        }
    }
}

/// In-memory layer store.
///
/// Used by tests and by library consumers that already hold their exclusion
/// layers as arrays. All layers share one domain shape, fixed at construction.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    layers: BTreeMap<String, Array2<f32>>,
    names: Vec<String>,
    shape: (usize, usize),
}

impl MemoryStore {
    /// Create an empty store over a domain of `shape`
    pub fn new(shape: (usize, usize)) -> Self {
        Self {
            layers: BTreeMap::new(),
            names: Vec::new(),
            shape,
        }
    }

    /// Insert a layer; its shape must match the store domain
    pub fn insert(&mut self, name: impl Into<String>, data: Array2<f32>) -> Result<()> {
        let name = name.into();
        let (ar, ac) = data.dim();
        if (ar, ac) != self.shape {
            return Err(Error::ShapeMismatch {
                layer: name,
                er: self.shape.0,
                ec: self.shape.1,
                ar,
                ac,
            });
        }
        if !self.layers.contains_key(&name) {
            self.names.push(name.clone());
        }
        self.layers.insert(name, data);
        Ok(())
    }

    /// Build a store from (name, layer) pairs
    pub fn from_layers<I, N>(shape: (usize, usize), layers: I) -> Result<Self>
    where
        I: IntoIterator<Item = (N, Array2<f32>)>,
        N: Into<String>,
    {
        let mut store = Self::new(shape);
        for (name, data) in layers {
            store.insert(name, data)?;
        }
        Ok(store)
    }
}

impl LayerStore for MemoryStore {
    fn catalogue(&self) -> &[String] {
        &self.names
    }

    fn shape(&self) -> (usize, usize) {
        self.shape
    }

    fn read(&self, layer: &str, window: &Window) -> Result<Array2<f32>> {
        let data = self.layers.get(layer).ok_or_else(|| Error::UnknownLayer {
            layer: layer.to_string(),
        })?;
        extract_window(data, window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(rows: usize, cols: usize) -> Array2<f32> {
        Array2::from_shape_fn((rows, cols), |(r, c)| (r * cols + c) as f32)
    }

    #[test]
    fn test_insert_rejects_shape_mismatch() {
        let mut store = MemoryStore::new((10, 10));
        let err = store.insert("slope", ramp(5, 10)).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
    }

    #[test]
    fn test_read_full_and_ranges() {
        let store = MemoryStore::from_layers((4, 5), [("slope", ramp(4, 5))]).unwrap();

        let full = store.read("slope", &Window::Full).unwrap();
        assert_eq!(full.dim(), (4, 5));
        assert_eq!(full[(3, 4)], 19.0);

        let sub = store.read("slope", &Window::ranges(1..3, 2..5)).unwrap();
        assert_eq!(sub.dim(), (2, 3));
        assert_eq!(sub[(0, 0)], 7.0);
        assert_eq!(sub[(1, 2)], 14.0);
    }

    #[test]
    fn test_read_indices_is_cross_product() {
        let store = MemoryStore::from_layers((4, 5), [("slope", ramp(4, 5))]).unwrap();

        let window = Window::indices(vec![0, 3], vec![1, 4]);
        let sub = store.read("slope", &window).unwrap();
        assert_eq!(sub.dim(), (2, 2));
        assert_eq!(sub[(0, 0)], 1.0);
        assert_eq!(sub[(0, 1)], 4.0);
        assert_eq!(sub[(1, 0)], 16.0);
        assert_eq!(sub[(1, 1)], 19.0);
    }

    #[test]
    fn test_read_out_of_bounds_fails() {
        let store = MemoryStore::from_layers((4, 5), [("slope", ramp(4, 5))]).unwrap();
        let err = store
            .read("slope", &Window::ranges(0..5, 0..5))
            .unwrap_err();
        assert!(matches!(err, Error::WindowOutOfBounds { .. }));
    }

    #[test]
    fn test_read_unknown_layer_fails() {
        let store = MemoryStore::new((4, 5));
        let err = store.read("slope", &Window::Full).unwrap_err();
        assert!(matches!(err, Error::UnknownLayer { .. }));
    }
}
