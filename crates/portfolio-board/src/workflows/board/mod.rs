//! Board funding decisions: the weighted decision model, score providers, the decision ledger,
//! and the governance charter the board operates under.

pub mod domain;
pub mod evaluation;
pub mod framework;
pub mod import;
pub mod monitoring;
pub mod oracle;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{BoardDecisionRecord, DecisionDraft, DecisionId, Initiative, InitiativeId};
pub use evaluation::{
    classify, evaluate, CompositeScore, Criterion, CriterionScores, DecisionOutcome,
    EvaluationError, FundingEvaluation, FundingEvaluator, ValidationError, WeightVector,
};
pub use framework::GovernanceFramework;
pub use import::{ScoreSheetError, ScoreSheetImporter, ScoreSheetRow};
pub use monitoring::{MonitoringReview, MonitoringSnapshot, MonitoringTrigger, RiskLevel};
pub use oracle::{
    FixedScoreProvider, GenerativeScoreProvider, OracleError, ScoreAssessment, ScoreProvider,
    UnconfiguredScoreProvider,
};
pub use repository::{DecisionLedger, LedgerError};
pub use router::board_router;
pub use service::{
    evaluate_score_sheet, BatchLine, BatchLineResult, BatchReport, BoardServiceError,
    BoardSimulationService, EvaluationRequest, SimulationReport, SimulationRequest,
};
