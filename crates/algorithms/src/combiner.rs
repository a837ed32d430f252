//! Mask combination over a layer store
//!
//! [`MaskCombiner`] owns the ordered set of layer policies and one store
//! handle for the lifetime of an analysis session. A mask request reads each
//! layer over the (possibly padded) window, applies its policy, folds the
//! results into an elementwise product, filters small regions when a minimum
//! area is configured, and crops back to the requested window.

use crate::area_filter::{area_filter, Kernel, PIXEL_AREA_KM2};
use crate::policy::LayerPolicy;
use gridmask_core::{Error, LayerStore, Result, Window};
use ndarray::Array2;
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Combines per-layer inclusion policies into a single windowed mask.
///
/// Construction caches the store catalogue once; `mask()` is stateless per
/// call and side-effect-free beyond store reads, so concurrent calls are safe
/// whenever the store tolerates concurrent reads.
#[derive(Debug)]
pub struct MaskCombiner<S: LayerStore> {
    store: S,
    catalogue: BTreeSet<String>,
    layers: Vec<LayerPolicy>,
    min_area: Option<f64>,
    kernel: Kernel,
    pixel_area: f64,
}

impl<S: LayerStore> MaskCombiner<S> {
    /// Build a combiner over `store` from an initial set of policies.
    ///
    /// Every policy's layer must exist in the store catalogue; duplicate
    /// layer names among `policies` are a configuration error.
    pub fn new(
        store: S,
        policies: Vec<LayerPolicy>,
        min_area: Option<f64>,
        kernel: Kernel,
    ) -> Result<Self> {
        let catalogue = store.catalogue().iter().cloned().collect();
        let mut combiner = Self {
            store,
            catalogue,
            layers: Vec::new(),
            min_area,
            kernel,
            pixel_area: PIXEL_AREA_KM2,
        };
        for policy in policies {
            combiner.add_layer(policy, false)?;
        }
        debug!(
            min_area = ?combiner.min_area,
            kernel = combiner.kernel.name(),
            layers = combiner.layers.len(),
            "initialized mask combiner"
        );
        Ok(combiner)
    }

    /// Override the per-pixel area constant (km² per pixel)
    pub fn with_pixel_area(mut self, pixel_area: f64) -> Self {
        self.pixel_area = pixel_area;
        self
    }

    /// Add a layer policy to the set to be combined.
    ///
    /// Fails when the layer is absent from the store catalogue, or when it
    /// was already added and `replace` is false. Replacement overwrites the
    /// prior policy and emits a warning.
    pub fn add_layer(&mut self, policy: LayerPolicy, replace: bool) -> Result<()> {
        if !self.catalogue.contains(policy.layer()) {
            return Err(Error::UnknownLayer {
                layer: policy.layer().to_string(),
            });
        }

        if let Some(existing) = self
            .layers
            .iter_mut()
            .find(|existing| existing.layer() == policy.layer())
        {
            if !replace {
                return Err(Error::DuplicateLayer {
                    layer: policy.layer().to_string(),
                });
            }
            warn!(layer = policy.layer(), "replacing existing layer policy");
            *existing = policy;
            return Ok(());
        }

        self.layers.push(policy);
        Ok(())
    }

    /// Names of the configured layers, in insertion order
    pub fn layer_names(&self) -> impl Iterator<Item = &str> {
        self.layers.iter().map(|policy| policy.layer())
    }

    /// Number of configured layers
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Whether no layers are configured
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Domain shape as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.store.shape()
    }

    /// The wrapped store handle
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Release the store handle, consuming the combiner
    pub fn into_store(self) -> S {
        self.store
    }

    /// Compute the inclusion mask over `window`.
    ///
    /// When a minimum area is configured and the window is range-shaped, the
    /// read is padded by one window extent per side so that region sizes at
    /// the window edge are measured correctly, and the result is cropped back
    /// afterwards. Layer order never affects the result.
    pub fn mask(&self, window: &Window) -> Result<Array2<f32>> {
        let domain = self.store.shape();
        window.check_bounds(domain)?;

        let filtering = self.min_area.is_some();
        if filtering && matches!(window, Window::Indices { .. }) {
            warn!(
                "minimum-area filtering over an explicit-index window: region sizes \
                 at the window edge may be underestimated"
            );
        }

        let (read_window, crop) = if filtering {
            window.expand(domain, 1)
        } else {
            let (rows, cols) = window.shape(domain);
            (
                window.clone(),
                gridmask_core::CropOffset {
                    row: 0,
                    col: 0,
                    rows,
                    cols,
                },
            )
        };

        let mut mask: Option<Array2<f32>> = None;
        for policy in &self.layers {
            let raw = self.store.read(policy.layer(), &read_window)?;
            let layer_mask = policy.apply(raw.view())?;
            mask = Some(match mask {
                Some(mut product) => {
                    product *= &layer_mask;
                    product
                }
                None => layer_mask,
            });
        }

        // Product over an empty layer set is all-ones.
        let mut mask = match mask {
            Some(mask) => mask,
            None => Array2::ones(read_window.shape(domain)),
        };

        if let Some(min_area) = self.min_area {
            area_filter(&mut mask, self.kernel, min_area, self.pixel_area);
            mask = crop.crop(mask);
        }

        Ok(mask)
    }

    /// Inclusion mask for the entire domain.
    ///
    /// Equivalent to `mask(&Window::Full)`; no padding is ever needed since
    /// the window already covers the domain.
    pub fn full_mask(&self) -> Result<Array2<f32>> {
        self.mask(&Window::Full)
    }

    /// Build a combiner, compute the full-domain mask, and release the store
    pub fn run(
        store: S,
        policies: Vec<LayerPolicy>,
        min_area: Option<f64>,
        kernel: Kernel,
    ) -> Result<Array2<f32>> {
        Self::new(store, policies, min_area, kernel)?.full_mask()
    }
}
