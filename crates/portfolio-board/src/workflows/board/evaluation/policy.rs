use std::fmt;

use serde::{Deserialize, Serialize};

use super::composite::{CompositeScore, MAX_COMPOSITE, MIN_COMPOSITE};

pub const APPROVE_THRESHOLD: f64 = 4.0;
pub const CONDITIONAL_THRESHOLD: f64 = 3.2;
pub const DEFER_THRESHOLD: f64 = 2.5;

/// Funding decision bucket produced by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DecisionOutcome {
    #[serde(rename = "Approve")]
    Approve,
    #[serde(rename = "Approve with conditions")]
    ApproveWithConditions,
    #[serde(rename = "Defer")]
    Defer,
    #[serde(rename = "Reject")]
    Reject,
}

impl DecisionOutcome {
    pub const ALL: [DecisionOutcome; 4] = [
        DecisionOutcome::Approve,
        DecisionOutcome::ApproveWithConditions,
        DecisionOutcome::Defer,
        DecisionOutcome::Reject,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            DecisionOutcome::Approve => "Approve",
            DecisionOutcome::ApproveWithConditions => "Approve with conditions",
            DecisionOutcome::Defer => "Defer",
            DecisionOutcome::Reject => "Reject",
        }
    }

    /// Case-insensitive; accepts the display label or its snake_case key.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_lowercase().replace(['_', '-'], " ");
        Self::ALL
            .into_iter()
            .find(|outcome| outcome.label().to_ascii_lowercase() == normalized)
    }

    /// Whether the outcome releases funding.
    pub const fn funds(self) -> bool {
        matches!(
            self,
            DecisionOutcome::Approve | DecisionOutcome::ApproveWithConditions
        )
    }
}

impl fmt::Display for DecisionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Bands are closed below and open above; the top band has no upper bound.
pub fn classify(composite: CompositeScore) -> DecisionOutcome {
    let value = composite.value();
    if value >= APPROVE_THRESHOLD {
        DecisionOutcome::Approve
    } else if value >= CONDITIONAL_THRESHOLD {
        DecisionOutcome::ApproveWithConditions
    } else if value >= DEFER_THRESHOLD {
        DecisionOutcome::Defer
    } else {
        DecisionOutcome::Reject
    }
}

/// Published view of one classifier band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ThresholdBand {
    pub outcome: DecisionOutcome,
    /// Inclusive.
    pub lower: f64,
    /// Exclusive, except for the top band where it is the scale maximum.
    pub upper: f64,
    pub upper_inclusive: bool,
}

pub fn threshold_bands() -> [ThresholdBand; 4] {
    [
        ThresholdBand {
            outcome: DecisionOutcome::Approve,
            lower: APPROVE_THRESHOLD,
            upper: MAX_COMPOSITE,
            upper_inclusive: true,
        },
        ThresholdBand {
            outcome: DecisionOutcome::ApproveWithConditions,
            lower: CONDITIONAL_THRESHOLD,
            upper: APPROVE_THRESHOLD,
            upper_inclusive: false,
        },
        ThresholdBand {
            outcome: DecisionOutcome::Defer,
            lower: DEFER_THRESHOLD,
            upper: CONDITIONAL_THRESHOLD,
            upper_inclusive: false,
        },
        ThresholdBand {
            outcome: DecisionOutcome::Reject,
            lower: MIN_COMPOSITE,
            upper: DEFER_THRESHOLD,
            upper_inclusive: false,
        },
    ]
}
