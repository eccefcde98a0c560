//! Weighted funding decision model: six criterion ratings, a fixed weight vector, and the
//! threshold classifier that turns the composite into a board outcome.

mod composite;
mod criteria;
mod error;
mod policy;
mod weights;

pub use composite::{aggregate, CompositeScore, WeightedComponent, MAX_COMPOSITE, MIN_COMPOSITE};
pub use criteria::{Criterion, CriterionScores, MAX_SCORE, MIN_SCORE};
pub use error::{EvaluationError, ValidationError};
pub use policy::{
    classify, threshold_bands, DecisionOutcome, ThresholdBand, APPROVE_THRESHOLD,
    CONDITIONAL_THRESHOLD, DEFER_THRESHOLD,
};
pub use weights::{WeightVector, WEIGHT_SUM_TOLERANCE};

use super::domain::{Initiative, InitiativeId};
use serde::Serialize;
use tracing::info;

/// Stateless evaluator bound to one weight vector.
#[derive(Debug, Clone, Copy, Default)]
pub struct FundingEvaluator {
    weights: WeightVector,
}

impl FundingEvaluator {
    pub fn new(weights: WeightVector) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &WeightVector {
        &self.weights
    }

    /// Scores an initiative, optionally with a per-call weight override.
    pub fn evaluate(
        &self,
        initiative: &Initiative,
        scores: &CriterionScores,
        weights: Option<&WeightVector>,
    ) -> Result<FundingEvaluation, EvaluationError> {
        let weights = weights.unwrap_or(&self.weights);
        let composite = aggregate(scores, weights)?;
        let outcome = classify(composite);
        let initiative_id = initiative.reference();

        info!(
            initiative_id = %initiative_id,
            composite = composite.value(),
            outcome = outcome.label(),
            "initiative evaluated"
        );

        Ok(FundingEvaluation {
            initiative_id,
            composite_score: composite.rounded(),
            composite,
            outcome,
            scores: *scores,
            weights: *weights,
            components: composite::weighted_components(scores, weights),
        })
    }
}

/// Scores an initiative against `weights`, or the standard board weights when `None`.
pub fn evaluate(
    initiative: &Initiative,
    scores: &CriterionScores,
    weights: Option<&WeightVector>,
) -> Result<FundingEvaluation, EvaluationError> {
    FundingEvaluator::default().evaluate(initiative, scores, weights)
}

/// Result of one evaluation with the trail needed to audit it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FundingEvaluation {
    pub initiative_id: InitiativeId,
    /// Rounded to two decimals for display.
    pub composite_score: f64,
    #[serde(rename = "composite_score_exact")]
    pub composite: CompositeScore,
    pub outcome: DecisionOutcome,
    pub scores: CriterionScores,
    pub weights: WeightVector,
    pub components: Vec<WeightedComponent>,
}

impl FundingEvaluation {
    pub fn summary(&self) -> String {
        format!(
            "composite {:.2} -> {}",
            self.composite_score,
            self.outcome.label()
        )
    }
}
