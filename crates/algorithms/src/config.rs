//! Declarative mask configuration
//!
//! Translates a mapping of `{layer name -> policy fields}` into layer
//! policies and a [`MaskCombiner`]. Validation errors surface exactly as they
//! do for direct construction.

use crate::area_filter::Kernel;
use crate::combiner::MaskCombiner;
use crate::policy::LayerPolicy;
use gridmask_core::{Error, LayerStore, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Policy fields for one layer, as they appear in a JSON config
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayerSpec {
    /// `[min, max]` inclusion thresholds; either entry may be null
    #[serde(default)]
    pub inclusion_range: (Option<f32>, Option<f32>),
    /// Values to include
    #[serde(default)]
    pub include_values: Option<Vec<f32>>,
    /// Values to exclude
    #[serde(default)]
    pub exclude_values: Option<Vec<f32>>,
    /// Use the layer's raw values as the inclusion weights
    #[serde(default)]
    pub use_as_weights: bool,
    /// Weight factor in [0, 1]
    #[serde(default = "default_weight")]
    pub weight: f32,
}

fn default_weight() -> f32 {
    1.0
}

impl LayerSpec {
    /// Build the policy for `layer` from these fields
    pub fn build(&self, layer: &str) -> Result<LayerPolicy> {
        LayerPolicy::from_parts(
            layer,
            self.inclusion_range,
            self.include_values.clone(),
            self.exclude_values.clone(),
            self.use_as_weights,
            self.weight,
        )
    }
}

/// Top-level mask configuration: layer policies plus filter settings
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MaskConfig {
    /// Layer name to policy fields
    pub layers: BTreeMap<String, LayerSpec>,
    /// Minimum contiguous inclusion area in km²
    #[serde(default)]
    pub min_area: Option<f64>,
    /// Connectivity kernel name, "queen" or "rook"
    #[serde(default = "default_kernel")]
    pub kernel: String,
}

fn default_kernel() -> String {
    "queen".to_string()
}

impl MaskConfig {
    /// Parse a configuration from JSON text
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::Decode(format!("invalid mask config: {e}")))
    }

    /// Parse a configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Build the layer policies this config describes
    pub fn policies(&self) -> Result<Vec<LayerPolicy>> {
        self.layers
            .iter()
            .map(|(layer, spec)| spec.build(layer))
            .collect()
    }

    /// Build a [`MaskCombiner`] over `store` from this config
    pub fn build<S: LayerStore>(&self, store: S) -> Result<MaskCombiner<S>> {
        let kernel: Kernel = self.kernel.parse()?;
        MaskCombiner::new(store, self.policies()?, self.min_area, kernel)
    }
}
