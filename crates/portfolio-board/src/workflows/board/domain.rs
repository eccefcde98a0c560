use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::evaluation::DecisionOutcome;

/// Identifier wrapper for initiatives submitted to the board.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InitiativeId(pub String);

impl fmt::Display for InitiativeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for ledger entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DecisionId(pub String);

impl DecisionId {
    pub fn generate() -> Self {
        Self(format!("BD-{}", uuid::Uuid::new_v4().simple()))
    }
}

impl fmt::Display for DecisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Transformation proposal under review. The narratives are opaque to the scoring model and
/// only ever forwarded to a score provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Initiative {
    #[serde(alias = "initiative_id")]
    pub id: InitiativeId,
    #[serde(alias = "initiative_name")]
    pub name: String,
    #[serde(alias = "strategic_objective_alignment_description")]
    pub strategic_alignment: String,
    #[serde(alias = "expected_financial_benefit")]
    pub financial_benefit: String,
    #[serde(alias = "expected_non_financial_benefit")]
    pub non_financial_benefit: String,
    #[serde(alias = "delivery_risk_assessment")]
    pub delivery_risk: String,
    #[serde(alias = "cross_program_dependencies")]
    pub dependencies: String,
    #[serde(alias = "resource_capacity_impact")]
    pub capacity: String,
    #[serde(alias = "regulatory_or_compliance_impact")]
    pub regulatory: String,
    #[serde(alias = "timeline_estimate")]
    pub timeline: String,
    #[serde(alias = "investment_size_estimate")]
    pub investment_size: String,
}

impl Initiative {
    pub fn named(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: InitiativeId(id.into()),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn has_name(&self) -> bool {
        !self.name.trim().is_empty()
    }

    /// Falls back to a slug of the name when the caller did not assign an id.
    pub fn reference(&self) -> InitiativeId {
        if !self.id.0.trim().is_empty() {
            return self.id.clone();
        }

        let slug: String = self
            .name
            .trim()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_lowercase()
                } else {
                    '-'
                }
            })
            .collect();
        let slug = slug
            .split('-')
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("-");
        InitiativeId(slug)
    }
}

/// Immutable ledger entry recorded once per board decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardDecisionRecord {
    pub decision_id: DecisionId,
    pub initiative_id: InitiativeId,
    pub composite_score: f64,
    pub decision_outcome: DecisionOutcome,
    pub board_rationale: String,
    pub timestamp: DateTime<Utc>,
}

/// Caller-supplied decision awaiting validation before it reaches the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionDraft {
    #[serde(default)]
    pub decision_id: Option<DecisionId>,
    pub initiative_id: InitiativeId,
    pub composite_score: f64,
    pub decision_outcome: String,
    #[serde(default)]
    pub board_rationale: String,
}
