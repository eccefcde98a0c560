//! Score providers: whatever turns an initiative's narratives into the six criterion ratings.
//!
//! The funding model never trusts a provider's arithmetic. Providers only contribute ratings
//! and free text; the composite and outcome are always recomputed locally.

mod generative;
mod prompt;

pub use generative::GenerativeScoreProvider;
pub use prompt::system_instruction;

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Serialize;

use super::domain::{Initiative, InitiativeId};
use super::evaluation::{CriterionScores, ValidationError};

/// Ratings and narrative returned for one initiative.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreAssessment {
    pub scores: CriterionScores,
    pub rationale: String,
    pub conditions: Vec<String>,
    pub recommendation: String,
    /// Composite the provider claims to have computed, if it reported one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reported_composite: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reported_outcome: Option<String>,
}

impl ScoreAssessment {
    pub fn new(scores: CriterionScores, rationale: impl Into<String>) -> Self {
        Self {
            scores,
            rationale: rationale.into(),
            conditions: Vec::new(),
            recommendation: String::new(),
            reported_composite: None,
            reported_outcome: None,
        }
    }
}

/// Capability producing criterion ratings from free-text initiative descriptions.
#[async_trait]
pub trait ScoreProvider: Send + Sync {
    async fn assess(&self, initiative: &Initiative) -> Result<ScoreAssessment, OracleError>;
}

/// Errors raised while obtaining ratings.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error("score provider is not configured: {0}")]
    NotConfigured(String),
    #[error("score provider request failed: {0}")]
    Transport(String),
    #[error("score provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("score provider returned an empty response")]
    EmptyResponse,
    #[error("score provider response is not valid JSON: {0}")]
    Malformed(String),
    #[error("score provider returned invalid ratings: {0}")]
    InvalidScores(#[from] ValidationError),
    #[error("no fixture scores for initiative '{0}'")]
    UnknownInitiative(InitiativeId),
}

/// Fixture provider returning pre-set assessments keyed by initiative reference, with an
/// optional fallback for anything else.
#[derive(Debug, Clone, Default)]
pub struct FixedScoreProvider {
    fixtures: HashMap<InitiativeId, ScoreAssessment>,
    fallback: Option<ScoreAssessment>,
}

impl FixedScoreProvider {
    pub fn uniform(assessment: ScoreAssessment) -> Self {
        Self {
            fixtures: HashMap::new(),
            fallback: Some(assessment),
        }
    }

    pub fn with_fixture(mut self, id: impl Into<String>, assessment: ScoreAssessment) -> Self {
        self.fixtures.insert(InitiativeId(id.into()), assessment);
        self
    }
}

#[async_trait]
impl ScoreProvider for FixedScoreProvider {
    async fn assess(&self, initiative: &Initiative) -> Result<ScoreAssessment, OracleError> {
        let reference = initiative.reference();
        self.fixtures
            .get(&reference)
            .or(self.fallback.as_ref())
            .cloned()
            .ok_or(OracleError::UnknownInitiative(reference))
    }
}

/// Stand-in used when no generative backend is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredScoreProvider;

#[async_trait]
impl ScoreProvider for UnconfiguredScoreProvider {
    async fn assess(&self, _initiative: &Initiative) -> Result<ScoreAssessment, OracleError> {
        Err(OracleError::NotConfigured(
            "set GEMINI_API_KEY to enable board simulations".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixed_provider_prefers_fixture_over_fallback() {
        let fixture = ScoreAssessment::new(CriterionScores::uniform(5).unwrap(), "strong");
        let fallback = ScoreAssessment::new(CriterionScores::uniform(2).unwrap(), "weak");
        let provider =
            FixedScoreProvider::uniform(fallback).with_fixture("INIT-9", fixture.clone());

        let hit = provider
            .assess(&Initiative::named("INIT-9", "Data Lake"))
            .await
            .expect("fixture");
        assert_eq!(hit, fixture);

        let miss = provider
            .assess(&Initiative::named("INIT-1", "Other"))
            .await
            .expect("fallback");
        assert_eq!(miss.rationale, "weak");
    }

    #[tokio::test]
    async fn fixed_provider_without_fallback_reports_unknown_initiative() {
        let provider = FixedScoreProvider::default();
        match provider.assess(&Initiative::named("INIT-2", "x")).await {
            Err(OracleError::UnknownInitiative(id)) => assert_eq!(id.0, "INIT-2"),
            other => panic!("expected unknown initiative, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unconfigured_provider_refuses() {
        let result = UnconfiguredScoreProvider
            .assess(&Initiative::named("INIT-3", "x"))
            .await;
        assert!(matches!(result, Err(OracleError::NotConfigured(_))));
    }
}
