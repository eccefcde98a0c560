use super::criteria::Criterion;

/// Input rejected before any scoring happens.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("unknown criterion '{name}'")]
    UnknownCriterion { name: String },
    #[error("criterion {criterion} supplied more than once")]
    DuplicateCriterion { criterion: Criterion },
    #[error("criterion {criterion} is missing")]
    MissingCriterion { criterion: Criterion },
    #[error("criterion {criterion} score {value} is outside the 1-5 scale")]
    ScoreOutOfRange { criterion: Criterion, value: f64 },
    #[error("criterion {criterion} score {value} is not a whole number")]
    NonIntegerScore { criterion: Criterion, value: f64 },
    #[error("criterion {criterion} score '{raw}' is not a number")]
    UnreadableScore { criterion: Criterion, raw: String },
    #[error("weight for {criterion} must be a finite, non-negative number (found {weight})")]
    InvalidWeight { criterion: Criterion, weight: f64 },
    #[error("weight for {criterion} is missing")]
    MissingWeight { criterion: Criterion },
    #[error("weights must sum to 1.0 (found {sum})")]
    WeightSum { sum: f64 },
    #[error("initiative name is required")]
    MissingInitiativeName,
    #[error("unknown decision outcome '{label}'")]
    UnknownOutcome { label: String },
    #[error("recorded composite score {value} is outside [1.0, 5.0]")]
    RecordedCompositeOutOfRange { value: f64 },
}

impl ValidationError {
    /// The dimension the error is about, when there is one.
    pub fn criterion(&self) -> Option<Criterion> {
        match self {
            ValidationError::DuplicateCriterion { criterion }
            | ValidationError::MissingCriterion { criterion }
            | ValidationError::ScoreOutOfRange { criterion, .. }
            | ValidationError::NonIntegerScore { criterion, .. }
            | ValidationError::UnreadableScore { criterion, .. }
            | ValidationError::InvalidWeight { criterion, .. }
            | ValidationError::MissingWeight { criterion } => Some(*criterion),
            _ => None,
        }
    }
}

/// Failure of a single evaluation. Validation failures mean bad input; a contract violation
/// means the aggregation itself produced something the classifier must not see.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvaluationError {
    #[error("invalid evaluation input: {0}")]
    Validation(#[from] ValidationError),
    #[error("composite score {composite} outside [1.0, 5.0]: aggregation contract violated")]
    ContractViolation { composite: f64 },
}

impl EvaluationError {
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, EvaluationError::ContractViolation { .. })
    }
}
