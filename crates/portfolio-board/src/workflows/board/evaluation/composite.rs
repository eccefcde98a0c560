use serde::{Serialize, Serializer};

use super::criteria::{Criterion, CriterionScores};
use super::error::EvaluationError;
use super::weights::{WeightVector, WEIGHT_SUM_TOLERANCE};

pub const MIN_COMPOSITE: f64 = 1.0;
pub const MAX_COMPOSITE: f64 = 5.0;

/// Largest drift a tolerated weight-sum error can push a valid composite past its bounds.
const COMPOSITE_TOLERANCE: f64 = MAX_COMPOSITE * WEIGHT_SUM_TOLERANCE;

/// Weighted sums are snapped to this grid so that float noise like 3.9999999999999996 compares
/// as 4.0. Snapping rounds to the nearest 1e-9, so a raw sum in `[t - 5e-10, t)` is promoted to
/// a threshold `t`; anything at least 5e-10 below stays in the lower band.
const COMPARISON_SCALE: f64 = 1e9;

/// Weighted composite of the six criterion ratings, always within [1.0, 5.0].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct CompositeScore(f64);

impl CompositeScore {
    /// Rejects values the classifier must never see: NaN, infinities, or anything outside
    /// [1.0, 5.0].
    pub fn try_new(value: f64) -> Result<Self, EvaluationError> {
        if !value.is_finite()
            || value < MIN_COMPOSITE - COMPOSITE_TOLERANCE
            || value > MAX_COMPOSITE + COMPOSITE_TOLERANCE
        {
            return Err(EvaluationError::ContractViolation { composite: value });
        }
        Ok(Self(value))
    }

    /// Full precision value used for threshold comparison.
    pub fn value(self) -> f64 {
        self.0
    }

    /// Two-decimal value for display only.
    pub fn rounded(self) -> f64 {
        (self.0 * 100.0).round() / 100.0
    }
}

impl Serialize for CompositeScore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.0)
    }
}

/// Contribution of one criterion to the composite, kept for audit trails.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeightedComponent {
    pub criterion: Criterion,
    pub score: u8,
    pub weight: f64,
    pub contribution: f64,
}

pub(crate) fn weighted_components(
    scores: &CriterionScores,
    weights: &WeightVector,
) -> Vec<WeightedComponent> {
    Criterion::ALL
        .into_iter()
        .map(|criterion| {
            let score = scores.get(criterion);
            let weight = weights.get(criterion);
            WeightedComponent {
                criterion,
                score,
                weight,
                contribution: f64::from(score) * weight,
            }
        })
        .collect()
}

/// `Σ score × weight` over the six criteria.
pub fn aggregate(
    scores: &CriterionScores,
    weights: &WeightVector,
) -> Result<CompositeScore, EvaluationError> {
    let raw: f64 = weighted_components(scores, weights)
        .iter()
        .map(|component| component.contribution)
        .sum();
    CompositeScore::try_new(snap(raw))
}

/// Rounds to the nearest point of the 1e-9 comparison grid.
fn snap(raw: f64) -> f64 {
    (raw * COMPARISON_SCALE).round() / COMPARISON_SCALE
}
