use std::collections::BTreeMap;
use std::io::Read;
use std::sync::Arc;

use axum::http::StatusCode;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use super::domain::{BoardDecisionRecord, DecisionDraft, DecisionId, Initiative, InitiativeId};
use super::evaluation::{
    CriterionScores, DecisionOutcome, EvaluationError, FundingEvaluation, FundingEvaluator,
    ValidationError, WeightVector, MAX_COMPOSITE, MIN_COMPOSITE,
};
use super::framework::GovernanceFramework;
use super::import::{ScoreSheetError, ScoreSheetImporter};
use super::oracle::{OracleError, ScoreProvider};
use super::repository::{DecisionLedger, LedgerError};

/// Largest gap between a provider's reported composite and the local one that still counts as
/// agreement. Providers report two decimals.
const REPORTED_COMPOSITE_TOLERANCE: f64 = 0.005 + 1e-9;

/// Explicit ratings submitted for scoring, with an optional weight override.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EvaluationRequest {
    #[serde(default)]
    pub initiative: Initiative,
    pub scores: BTreeMap<String, f64>,
    #[serde(default)]
    pub weights: Option<BTreeMap<String, f64>>,
}

/// Initiative handed to the score provider.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SimulationRequest {
    pub initiative: Initiative,
    /// Append the resulting decision to the ledger.
    #[serde(default)]
    pub persist: bool,
}

/// Provider narrative plus the locally recomputed evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    pub evaluation: FundingEvaluation,
    pub rationale: String,
    pub conditions: Vec<String>,
    pub recommendation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reported_composite: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reported_outcome: Option<String>,
    /// `None` when the provider made no claim to compare against.
    pub provider_consistent: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision: Option<BoardDecisionRecord>,
}

/// Per-row result of a batch evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchLine {
    pub line: usize,
    pub initiative_id: InitiativeId,
    #[serde(flatten)]
    pub result: BatchLineResult,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchLineResult {
    Evaluated {
        composite_score: f64,
        outcome: DecisionOutcome,
    },
    Rejected {
        error: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    pub evaluated: usize,
    pub rejected: usize,
    pub lines: Vec<BatchLine>,
}

/// Service composing the funding model, a score provider, and the decision ledger.
pub struct BoardSimulationService<P: ?Sized, L: ?Sized> {
    provider: Arc<P>,
    ledger: Arc<L>,
    evaluator: FundingEvaluator,
}

impl<P, L> BoardSimulationService<P, L>
where
    P: ScoreProvider + ?Sized + 'static,
    L: DecisionLedger + ?Sized + 'static,
{
    pub fn new(provider: Arc<P>, ledger: Arc<L>, weights: WeightVector) -> Self {
        Self {
            provider,
            ledger,
            evaluator: FundingEvaluator::new(weights),
        }
    }

    pub fn weights(&self) -> &WeightVector {
        self.evaluator.weights()
    }

    /// Charter content built around the weights this service scores with.
    pub fn framework(&self) -> GovernanceFramework {
        GovernanceFramework::with_weights(self.evaluator.weights())
    }

    /// Scores explicit ratings. Nothing is persisted.
    pub fn evaluate(
        &self,
        request: EvaluationRequest,
    ) -> Result<FundingEvaluation, BoardServiceError> {
        let scores = CriterionScores::from_entries(request.scores)?;
        let weights = request.weights.map(WeightVector::try_from).transpose()?;
        self.score(&request.initiative, &scores, weights.as_ref())
    }

    /// Evaluates every row of a CSV score sheet. Rows with invalid ratings are reported and
    /// skipped; a malformed sheet aborts the batch.
    pub fn evaluate_batch<R: Read>(&self, reader: R) -> Result<BatchReport, BoardServiceError> {
        evaluate_score_sheet(&self.evaluator, reader)
    }

    /// Asks the provider for ratings, recomputes the outcome locally, and optionally records
    /// the decision.
    pub async fn simulate(
        &self,
        request: SimulationRequest,
    ) -> Result<SimulationReport, BoardServiceError> {
        let initiative = request.initiative;
        if !initiative.has_name() {
            return Err(ValidationError::MissingInitiativeName.into());
        }

        let assessment = self.provider.assess(&initiative).await?;
        let evaluation = self.score(&initiative, &assessment.scores, None)?;
        let provider_consistent = provider_agrees(
            &evaluation,
            assessment.reported_composite,
            assessment.reported_outcome.as_deref(),
        );

        if provider_consistent == Some(false) {
            warn!(
                initiative_id = %evaluation.initiative_id,
                reported_composite = ?assessment.reported_composite,
                reported_outcome = ?assessment.reported_outcome,
                composite = evaluation.composite_score,
                outcome = evaluation.outcome.label(),
                "score provider arithmetic disagrees with the funding model"
            );
        }

        let decision = if request.persist {
            let record = BoardDecisionRecord {
                decision_id: DecisionId::generate(),
                initiative_id: evaluation.initiative_id.clone(),
                composite_score: evaluation.composite_score,
                decision_outcome: evaluation.outcome,
                board_rationale: assessment.rationale.clone(),
                timestamp: Utc::now(),
            };
            Some(self.append(record)?)
        } else {
            None
        };

        Ok(SimulationReport {
            evaluation,
            rationale: assessment.rationale,
            conditions: assessment.conditions,
            recommendation: assessment.recommendation,
            reported_composite: assessment.reported_composite,
            reported_outcome: assessment.reported_outcome,
            provider_consistent,
            decision,
        })
    }

    /// Validates a caller-supplied decision and appends it to the ledger.
    pub fn record(&self, draft: DecisionDraft) -> Result<BoardDecisionRecord, BoardServiceError> {
        let decision_outcome = DecisionOutcome::parse(&draft.decision_outcome).ok_or_else(|| {
            ValidationError::UnknownOutcome {
                label: draft.decision_outcome.clone(),
            }
        })?;

        let composite = draft.composite_score;
        if !composite.is_finite() || !(MIN_COMPOSITE..=MAX_COMPOSITE).contains(&composite) {
            return Err(ValidationError::RecordedCompositeOutOfRange { value: composite }.into());
        }

        let record = BoardDecisionRecord {
            decision_id: draft
                .decision_id
                .filter(|id| !id.0.trim().is_empty())
                .unwrap_or_else(DecisionId::generate),
            initiative_id: draft.initiative_id,
            composite_score: composite,
            decision_outcome,
            board_rationale: draft.board_rationale,
            timestamp: Utc::now(),
        };
        self.append(record)
    }

    /// Newest decisions first; `None` lists the whole ledger.
    pub fn decisions(
        &self,
        limit: Option<usize>,
    ) -> Result<Vec<BoardDecisionRecord>, BoardServiceError> {
        Ok(self.ledger.recent(limit)?)
    }

    fn score(
        &self,
        initiative: &Initiative,
        scores: &CriterionScores,
        weights: Option<&WeightVector>,
    ) -> Result<FundingEvaluation, BoardServiceError> {
        self.evaluator
            .evaluate(initiative, scores, weights)
            .map_err(|err| {
                if err.is_contract_violation() {
                    contract_failure(&initiative.reference(), err)
                } else {
                    err.into()
                }
            })
    }

    fn append(&self, record: BoardDecisionRecord) -> Result<BoardDecisionRecord, BoardServiceError> {
        let stored = self.ledger.append(record)?;
        info!(
            decision_id = %stored.decision_id,
            initiative_id = %stored.initiative_id,
            outcome = stored.decision_outcome.label(),
            composite = stored.composite_score,
            "board decision recorded"
        );
        Ok(stored)
    }
}

/// Scores a CSV score sheet row by row with the evaluator's weights.
pub fn evaluate_score_sheet<R: Read>(
    evaluator: &FundingEvaluator,
    reader: R,
) -> Result<BatchReport, BoardServiceError> {
    let rows = ScoreSheetImporter::from_reader(reader)?;
    let mut lines = Vec::with_capacity(rows.len());

    for row in rows {
        let initiative_id = row.initiative.reference();
        let evaluation = row
            .scores
            .map_err(EvaluationError::from)
            .and_then(|scores| evaluator.evaluate(&row.initiative, &scores, None));
        let result = match evaluation {
            Ok(evaluation) => BatchLineResult::Evaluated {
                composite_score: evaluation.composite_score,
                outcome: evaluation.outcome,
            },
            Err(EvaluationError::Validation(err)) => BatchLineResult::Rejected {
                error: err.to_string(),
            },
            Err(err) => return Err(contract_failure(&initiative_id, err)),
        };
        lines.push(BatchLine {
            line: row.line,
            initiative_id,
            result,
        });
    }

    let evaluated = lines
        .iter()
        .filter(|line| matches!(line.result, BatchLineResult::Evaluated { .. }))
        .count();
    let rejected = lines.len() - evaluated;
    info!(evaluated, rejected, "score sheet evaluated");

    Ok(BatchReport {
        evaluated,
        rejected,
        lines,
    })
}

fn contract_failure(initiative_id: &InitiativeId, err: EvaluationError) -> BoardServiceError {
    error!(initiative_id = %initiative_id, error = %err, "funding model contract violated");
    BoardServiceError::Evaluation(err)
}

fn provider_agrees(
    evaluation: &FundingEvaluation,
    reported_composite: Option<f64>,
    reported_outcome: Option<&str>,
) -> Option<bool> {
    if reported_composite.is_none() && reported_outcome.is_none() {
        return None;
    }

    let composite_agrees = reported_composite.map_or(true, |reported| {
        (reported - evaluation.composite.value()).abs() <= REPORTED_COMPOSITE_TOLERANCE
    });
    let outcome_agrees = reported_outcome.map_or(true, |reported| {
        DecisionOutcome::parse(reported) == Some(evaluation.outcome)
    });
    Some(composite_agrees && outcome_agrees)
}

/// Error raised by the board service.
#[derive(Debug, thiserror::Error)]
pub enum BoardServiceError {
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
    #[error(transparent)]
    Oracle(#[from] OracleError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Import(#[from] ScoreSheetError),
}

impl From<ValidationError> for BoardServiceError {
    fn from(value: ValidationError) -> Self {
        BoardServiceError::Evaluation(EvaluationError::Validation(value))
    }
}

impl BoardServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            BoardServiceError::Evaluation(EvaluationError::Validation(_)) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            BoardServiceError::Evaluation(EvaluationError::ContractViolation { .. }) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            BoardServiceError::Oracle(OracleError::NotConfigured(_)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            BoardServiceError::Oracle(_) => StatusCode::BAD_GATEWAY,
            BoardServiceError::Ledger(LedgerError::Conflict) => StatusCode::CONFLICT,
            BoardServiceError::Ledger(_) => StatusCode::INTERNAL_SERVER_ERROR,
            BoardServiceError::Import(_) => StatusCode::BAD_REQUEST,
        }
    }
}
