use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::to_bytes;
use axum::http::StatusCode;
use axum::response::Response;
use serde_json::Value;

use crate::workflows::board::domain::{BoardDecisionRecord, Initiative};
use crate::workflows::board::evaluation::{CriterionScores, WeightVector};
use crate::workflows::board::oracle::{
    FixedScoreProvider, OracleError, ScoreAssessment, ScoreProvider,
};
use crate::workflows::board::repository::{DecisionLedger, LedgerError};
use crate::workflows::board::service::BoardSimulationService;

#[derive(Default)]
pub(super) struct MemoryLedger {
    records: Mutex<Vec<BoardDecisionRecord>>,
}

impl MemoryLedger {
    pub(super) fn len(&self) -> usize {
        self.records.lock().expect("ledger mutex poisoned").len()
    }
}

impl DecisionLedger for MemoryLedger {
    fn append(&self, record: BoardDecisionRecord) -> Result<BoardDecisionRecord, LedgerError> {
        let mut guard = self.records.lock().expect("ledger mutex poisoned");
        if guard
            .iter()
            .any(|existing| existing.decision_id == record.decision_id)
        {
            return Err(LedgerError::Conflict);
        }
        guard.push(record.clone());
        Ok(record)
    }

    fn recent(&self, limit: Option<usize>) -> Result<Vec<BoardDecisionRecord>, LedgerError> {
        let guard = self.records.lock().expect("ledger mutex poisoned");
        let newest_first = guard.iter().rev().cloned();
        Ok(match limit {
            Some(limit) => newest_first.take(limit).collect(),
            None => newest_first.collect(),
        })
    }
}

pub(super) struct UnavailableLedger;

impl DecisionLedger for UnavailableLedger {
    fn append(&self, _record: BoardDecisionRecord) -> Result<BoardDecisionRecord, LedgerError> {
        Err(LedgerError::Unavailable("database locked".to_string()))
    }

    fn recent(&self, _limit: Option<usize>) -> Result<Vec<BoardDecisionRecord>, LedgerError> {
        Err(LedgerError::Unavailable("database locked".to_string()))
    }
}

/// Provider whose backend always fails: an HTTP status when one is set, otherwise a transport
/// error.
pub(super) struct FailingScoreProvider {
    status: Option<u16>,
}

impl FailingScoreProvider {
    pub(super) fn status(status: u16) -> Self {
        Self {
            status: Some(status),
        }
    }

    pub(super) fn unreachable() -> Self {
        Self { status: None }
    }
}

#[async_trait]
impl ScoreProvider for FailingScoreProvider {
    async fn assess(&self, _initiative: &Initiative) -> Result<ScoreAssessment, OracleError> {
        Err(match self.status {
            Some(status) => OracleError::Status {
                status,
                body: "quota exhausted".to_string(),
            },
            None => OracleError::Transport("connection refused".to_string()),
        })
    }
}

pub(super) fn scores(values: [u8; 6]) -> CriterionScores {
    CriterionScores::new(
        values[0], values[1], values[2], values[3], values[4], values[5],
    )
    .expect("valid scores")
}

/// Ratings 5,4,3,4,3,5: composite 4.15 under the standard weights.
pub(super) fn strong_scores() -> CriterionScores {
    scores([5, 4, 3, 4, 3, 5])
}

pub(super) fn claims_platform() -> Initiative {
    let mut initiative = Initiative::named("INIT-42", "Claims Platform Renewal");
    initiative.strategic_alignment = "Directly delivers the 2027 digital claims objective".into();
    initiative.financial_benefit = "EUR 4.2m annual run-rate saving".into();
    initiative.delivery_risk = "Vendor onboarding is the main schedule risk".into();
    initiative
}

pub(super) fn strong_assessment() -> ScoreAssessment {
    let mut assessment = ScoreAssessment::new(strong_scores(), "Strong strategic fit.");
    assessment.conditions = vec!["Stage-gate vendor onboarding".to_string()];
    assessment.recommendation = "Fund in Q3.".to_string();
    assessment
}

pub(super) type TestService = BoardSimulationService<FixedScoreProvider, MemoryLedger>;

pub(super) fn build_service(
    provider: FixedScoreProvider,
) -> (Arc<TestService>, Arc<MemoryLedger>) {
    build_service_with(provider)
}

pub(super) fn build_service_with<P: ScoreProvider + 'static>(
    provider: P,
) -> (Arc<BoardSimulationService<P, MemoryLedger>>, Arc<MemoryLedger>) {
    let ledger = Arc::new(MemoryLedger::default());
    let service = Arc::new(BoardSimulationService::new(
        Arc::new(provider),
        ledger.clone(),
        WeightVector::STANDARD,
    ));
    (service, ledger)
}

pub(super) async fn json_body(response: Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    let value = serde_json::from_slice(&bytes).expect("json body");
    (status, value)
}
