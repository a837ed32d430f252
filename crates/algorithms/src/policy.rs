//! Per-layer inclusion policies
//!
//! A [`LayerPolicy`] converts one exclusion layer's raw raster values into
//! per-pixel inclusion weights. The rule is an explicit tagged variant chosen
//! and validated once at construction; applying a policy never branches on
//! which configuration fields were set.

use gridmask_core::{Error, Result};
use ndarray::{Array2, ArrayView2};
use rayon::prelude::*;

/// How a layer's raw values map to inclusion.
#[derive(Debug, Clone, PartialEq)]
pub enum PolicyRule {
    /// Include values inside the (optional) min/max thresholds, inclusive
    Range { min: Option<f32>, max: Option<f32> },
    /// Include only these values
    IncludeValues(Vec<f32>),
    /// Include everything except these values
    ExcludeValues(Vec<f32>),
    /// Pass raw values through as weights (assumed already in [0, 1])
    RawWeights,
}

impl PolicyRule {
    /// Short rule name used in error messages
    pub fn name(&self) -> &'static str {
        match self {
            PolicyRule::Range { .. } => "range",
            PolicyRule::IncludeValues(_) => "include",
            PolicyRule::ExcludeValues(_) => "exclude",
            PolicyRule::RawWeights => "weights",
        }
    }
}

/// Policy converting one exclusion layer into an inclusion weight layer.
///
/// Immutable once constructed. The weight factor scales the rule's output
/// multiplicatively and must fall in [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct LayerPolicy {
    layer: String,
    rule: PolicyRule,
    weight: f32,
}

impl LayerPolicy {
    /// Create a policy with an explicit rule and weight factor
    pub fn new(layer: impl Into<String>, rule: PolicyRule, weight: f32) -> Result<Self> {
        let layer = layer.into();
        if !(0.0..=1.0).contains(&weight) {
            return Err(Error::InvalidWeight { layer, weight });
        }
        if matches!(
            rule,
            PolicyRule::Range {
                min: None,
                max: None
            }
        ) {
            return Err(Error::MissingRule { layer });
        }
        Ok(Self {
            layer,
            rule,
            weight,
        })
    }

    /// Build a policy from the declarative field set, rejecting conflicting
    /// or missing rule sources.
    ///
    /// `use_as_weights` takes precedence: the raw values become the weights
    /// and the other fields are ignored.
    pub fn from_parts(
        layer: impl Into<String>,
        inclusion_range: (Option<f32>, Option<f32>),
        include_values: Option<Vec<f32>>,
        exclude_values: Option<Vec<f32>>,
        use_as_weights: bool,
        weight: f32,
    ) -> Result<Self> {
        let layer = layer.into();

        if use_as_weights {
            return Self::new(layer, PolicyRule::RawWeights, weight);
        }

        let (min, max) = inclusion_range;
        let mut rule: Option<PolicyRule> = None;
        let sources: [(bool, PolicyRule); 3] = [
            (
                min.is_some() || max.is_some(),
                PolicyRule::Range { min, max },
            ),
            (
                include_values.is_some(),
                PolicyRule::IncludeValues(include_values.unwrap_or_default()),
            ),
            (
                exclude_values.is_some(),
                PolicyRule::ExcludeValues(exclude_values.unwrap_or_default()),
            ),
        ];

        for (supplied, candidate) in sources {
            if !supplied {
                continue;
            }
            match rule {
                None => rule = Some(candidate),
                Some(first) => {
                    return Err(Error::ConflictingRules {
                        layer,
                        first: first.name(),
                        second: candidate.name(),
                    });
                }
            }
        }

        match rule {
            Some(rule) => Self::new(layer, rule, weight),
            None => Err(Error::MissingRule { layer }),
        }
    }

    /// Range rule with weight 1
    pub fn range(layer: impl Into<String>, min: Option<f32>, max: Option<f32>) -> Result<Self> {
        Self::new(layer, PolicyRule::Range { min, max }, 1.0)
    }

    /// Include-values rule with weight 1
    pub fn include(layer: impl Into<String>, values: Vec<f32>) -> Result<Self> {
        Self::new(layer, PolicyRule::IncludeValues(values), 1.0)
    }

    /// Exclude-values rule with weight 1
    pub fn exclude(layer: impl Into<String>, values: Vec<f32>) -> Result<Self> {
        Self::new(layer, PolicyRule::ExcludeValues(values), 1.0)
    }

    /// Raw-weights rule with weight 1
    pub fn raw_weights(layer: impl Into<String>) -> Result<Self> {
        Self::new(layer, PolicyRule::RawWeights, 1.0)
    }

    /// Replace the weight factor, re-validating it
    pub fn with_weight(self, weight: f32) -> Result<Self> {
        Self::new(self.layer, self.rule, weight)
    }

    /// Layer name this policy reads from the store catalogue
    pub fn layer(&self) -> &str {
        &self.layer
    }

    /// The rule variant
    pub fn rule(&self) -> &PolicyRule {
        &self.rule
    }

    /// The weight factor in [0, 1]
    pub fn weight(&self) -> f32 {
        self.weight
    }

    /// Apply the policy to raw layer values, producing inclusion weights.
    ///
    /// Boolean rules yield `weight` where the rule holds and 0 elsewhere;
    /// `RawWeights` yields `value * weight` with no boolean test.
    pub fn apply(&self, data: ArrayView2<'_, f32>) -> Result<Array2<f32>> {
        let (rows, cols) = data.dim();
        let weight = self.weight;
        let rule = &self.rule;

        let out: Vec<f32> = (0..rows)
            .into_par_iter()
            .flat_map(|row| {
                let mut row_data = vec![0.0f32; cols];
                for col in 0..cols {
                    let value = data[(row, col)];
                    row_data[col] = match rule {
                        PolicyRule::Range { min, max } => {
                            let above = min.map_or(true, |m| value >= m);
                            let below = max.map_or(true, |m| value <= m);
                            if above && below {
                                weight
                            } else {
                                0.0
                            }
                        }
                        PolicyRule::IncludeValues(values) => {
                            if values.contains(&value) {
                                weight
                            } else {
                                0.0
                            }
                        }
                        PolicyRule::ExcludeValues(values) => {
                            if values.contains(&value) {
                                0.0
                            } else {
                                weight
                            }
                        }
                        PolicyRule::RawWeights => value * weight,
                    };
                }
                row_data
            })
            .collect();

        Array2::from_shape_vec((rows, cols), out).map_err(|e| Error::Other(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_range_max_is_indicator() {
        let policy = LayerPolicy::range("slope", None, Some(5.0)).unwrap();
        let data = array![[1.0, 5.0, 5.1], [10.0, -3.0, 0.0]];
        let mask = policy.apply(data.view()).unwrap();
        assert_eq!(mask, array![[1.0, 1.0, 0.0], [0.0, 1.0, 1.0]]);
    }

    #[test]
    fn test_range_min_and_max() {
        let policy = LayerPolicy::range("slope", Some(2.0), Some(4.0)).unwrap();
        let data = array![[1.0, 2.0, 3.0, 4.0, 5.0]];
        let mask = policy.apply(data.view()).unwrap();
        assert_eq!(mask, array![[0.0, 1.0, 1.0, 1.0, 0.0]]);
    }

    #[test]
    fn test_boolean_outputs_are_zero_or_weight() {
        let policy = LayerPolicy::include("landuse", vec![3.0, 7.0])
            .unwrap()
            .with_weight(0.25)
            .unwrap();
        let data = array![[3.0, 4.0], [7.0, 0.0]];
        let mask = policy.apply(data.view()).unwrap();
        for &v in mask.iter() {
            assert!(v == 0.0 || v == 0.25, "unexpected weight {v}");
        }
        assert_eq!(mask, array![[0.25, 0.0], [0.25, 0.0]]);
    }

    #[test]
    fn test_exclude_values() {
        let policy = LayerPolicy::exclude("protected", vec![1.0]).unwrap();
        let data = array![[0.0, 1.0], [1.0, 2.0]];
        let mask = policy.apply(data.view()).unwrap();
        assert_eq!(mask, array![[1.0, 0.0], [0.0, 1.0]]);
    }

    #[test]
    fn test_raw_weights_pass_through() {
        let policy = LayerPolicy::raw_weights("density")
            .unwrap()
            .with_weight(0.5)
            .unwrap();
        let data = array![[0.0, 0.4], [1.0, 0.8]];
        let mask = policy.apply(data.view()).unwrap();
        assert_eq!(mask, array![[0.0, 0.2], [0.5, 0.4]]);
    }

    #[test]
    fn test_weight_outside_unit_interval_fails() {
        let err = LayerPolicy::new(
            "slope",
            PolicyRule::Range {
                min: None,
                max: Some(5.0),
            },
            1.5,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidWeight { .. }));
        assert!(err.is_config());

        let err = LayerPolicy::raw_weights("density")
            .unwrap()
            .with_weight(-0.1)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidWeight { .. }));
    }

    #[test]
    fn test_include_and_exclude_together_fails() {
        let err = LayerPolicy::from_parts(
            "landuse",
            (None, None),
            Some(vec![1.0]),
            Some(vec![2.0]),
            false,
            1.0,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::ConflictingRules {
                first: "include",
                second: "exclude",
                ..
            }
        ));
    }

    #[test]
    fn test_range_and_include_together_fails() {
        let err = LayerPolicy::from_parts(
            "slope",
            (None, Some(5.0)),
            Some(vec![1.0]),
            None,
            false,
            1.0,
        )
        .unwrap_err();
        assert!(matches!(err, Error::ConflictingRules { .. }));
    }

    #[test]
    fn test_no_rule_fails() {
        let err =
            LayerPolicy::from_parts("slope", (None, None), None, None, false, 1.0).unwrap_err();
        assert!(matches!(err, Error::MissingRule { .. }));
    }

    #[test]
    fn test_use_as_weights_ignores_other_fields() {
        let policy = LayerPolicy::from_parts(
            "density",
            (None, Some(5.0)),
            None,
            None,
            true,
            1.0,
        )
        .unwrap();
        assert_eq!(*policy.rule(), PolicyRule::RawWeights);
    }
}
