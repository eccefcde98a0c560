use serde::Serialize;

use super::evaluation::{
    threshold_bands, Criterion, DecisionOutcome, ThresholdBand, WeightVector, MAX_SCORE, MIN_SCORE,
};
use super::monitoring::MonitoringTrigger;

/// Static investment board charter published alongside the decision model.
#[derive(Debug, Clone, Serialize)]
pub struct GovernanceFramework {
    pub role: &'static str,
    pub mandate: &'static str,
    pub evaluation_standard: &'static str,
    pub purpose: &'static str,
    pub decision_authorities: Vec<DecisionAuthority>,
    pub review_cadence: Vec<ReviewCadence>,
    pub funding_algorithm: FundingAlgorithm,
    pub monitoring: MonitoringPolicy,
}

#[derive(Debug, Clone, Serialize)]
pub struct DecisionAuthority {
    pub forum: &'static str,
    pub decisions: Vec<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewCadence {
    pub review: &'static str,
    pub frequency: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct FundingAlgorithm {
    pub scoring_method: &'static str,
    pub scale: String,
    pub criteria: Vec<CriterionWeight>,
    pub thresholds: Vec<ThresholdBand>,
    pub outcomes: Vec<DecisionOutcome>,
    /// Board actions that sit outside the classifier, such as terminating a funded initiative
    /// after a continuation review.
    pub governance_actions: Vec<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CriterionWeight {
    pub criterion: Criterion,
    pub label: &'static str,
    pub weight: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonitoringPolicy {
    pub frequency: &'static str,
    pub triggers: Vec<TriggerDescription>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TriggerDescription {
    pub trigger: MonitoringTrigger,
    pub description: String,
}

impl GovernanceFramework {
    pub fn standard() -> Self {
        Self::with_weights(&WeightVector::STANDARD)
    }

    pub fn with_weights(weights: &WeightVector) -> Self {
        Self {
            role: "Enterprise Investment Board Simulation Engine",
            mandate: "Evaluate transformation initiatives using a weighted strategic funding decision model and produce structured executive-level investment recommendations.",
            evaluation_standard: "Value-based, risk-informed, strategy-aligned capital allocation",
            purpose: "Provide executive-level governance over enterprise transformation investments to ensure strategic alignment, value delivery, and risk transparency.",
            decision_authorities: vec![
                DecisionAuthority {
                    forum: "Investment Board",
                    decisions: vec![
                        "Funding approval",
                        "Strategic initiative prioritisation",
                        "Continuation or termination decisions",
                    ],
                },
                DecisionAuthority {
                    forum: "Executive Steering Committee",
                    decisions: vec![
                        "Risk acceptance",
                        "Dependency resolution",
                        "Organisational change endorsement",
                    ],
                },
            ],
            review_cadence: vec![
                ReviewCadence {
                    review: "Strategic portfolio review",
                    frequency: "Quarterly",
                },
                ReviewCadence {
                    review: "Investment funding review",
                    frequency: "Bi-annual",
                },
                ReviewCadence {
                    review: "Risk and delivery review",
                    frequency: "Monthly",
                },
            ],
            funding_algorithm: FundingAlgorithm {
                scoring_method: "Weighted multi-criteria scoring",
                scale: format!(
                    "{MIN_SCORE} = Very Low / Negative Impact, {MAX_SCORE} = Very High / Strong Positive Impact"
                ),
                criteria: weights
                    .iter()
                    .map(|(criterion, weight)| CriterionWeight {
                        criterion,
                        label: criterion.label(),
                        weight,
                    })
                    .collect(),
                thresholds: threshold_bands().to_vec(),
                outcomes: DecisionOutcome::ALL.to_vec(),
                governance_actions: vec!["Terminate"],
            },
            monitoring: MonitoringPolicy {
                frequency: "Quarterly",
                triggers: MonitoringTrigger::ALL
                    .into_iter()
                    .map(|trigger| TriggerDescription {
                        trigger,
                        description: trigger.description(),
                    })
                    .collect(),
            },
        }
    }

    /// Threshold table rendered the way the board pack prints it.
    pub fn threshold_lines(&self) -> Vec<String> {
        self.funding_algorithm
            .thresholds
            .iter()
            .map(|band| match band.outcome {
                DecisionOutcome::Approve => format!("{}: >= {:.1}", band.outcome, band.lower),
                DecisionOutcome::Reject => format!("{}: < {:.1}", band.outcome, band.upper),
                _ => format!(
                    "{}: >= {:.1} and < {:.1}",
                    band.outcome, band.lower, band.upper
                ),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_framework_publishes_classifier_bands() {
        let framework = GovernanceFramework::standard();
        let algorithm = &framework.funding_algorithm;
        assert_eq!(algorithm.criteria.len(), 6);
        assert_eq!(algorithm.criteria[0].weight, 0.30);
        assert_eq!(algorithm.outcomes.len(), 4);
        assert!(!algorithm
            .outcomes
            .iter()
            .any(|outcome| outcome.label() == "Terminate"));
        assert_eq!(algorithm.governance_actions, vec!["Terminate"]);

        let lines = framework.threshold_lines();
        assert_eq!(lines[0], "Approve: >= 4.0");
        assert_eq!(lines[1], "Approve with conditions: >= 3.2 and < 4.0");
        assert_eq!(lines[3], "Reject: < 2.5");
    }

    #[test]
    fn framework_serializes_monitoring_triggers() {
        let value = serde_json::to_value(GovernanceFramework::standard()).expect("json");
        let triggers = value["monitoring"]["triggers"]
            .as_array()
            .expect("trigger list");
        assert_eq!(triggers.len(), 4);
        assert_eq!(value["funding_algorithm"]["thresholds"][0]["lower"], 4.0);
    }
}
