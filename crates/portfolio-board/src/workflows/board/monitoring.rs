use serde::{Deserialize, Serialize};

use super::domain::InitiativeId;

pub const MIN_BENEFIT_REALISATION_PCT: f64 = 70.0;
pub const MAX_BUDGET_OVERRUN_PCT: f64 = 15.0;
pub const MAX_SCHEDULE_DELAY_PCT: f64 = 20.0;

/// Risk index reported by the portfolio RAID log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

/// Quarterly delivery snapshot for a funded initiative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoringSnapshot {
    pub initiative_id: InitiativeId,
    /// Realised benefit as a percentage of plan.
    pub benefit_realisation_pct: f64,
    pub budget_overrun_pct: f64,
    pub schedule_delay_pct: f64,
    pub risk_level: RiskLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonitoringTrigger {
    BenefitShortfall,
    BudgetOverrun,
    ScheduleDelay,
    CriticalRisk,
}

impl MonitoringTrigger {
    pub const ALL: [MonitoringTrigger; 4] = [
        MonitoringTrigger::BenefitShortfall,
        MonitoringTrigger::BudgetOverrun,
        MonitoringTrigger::ScheduleDelay,
        MonitoringTrigger::CriticalRisk,
    ];

    pub fn description(self) -> String {
        match self {
            MonitoringTrigger::BenefitShortfall => {
                format!("Benefit realisation < {MIN_BENEFIT_REALISATION_PCT:.0}% of planned")
            }
            MonitoringTrigger::BudgetOverrun => {
                format!("Budget overrun > {MAX_BUDGET_OVERRUN_PCT:.0}%")
            }
            MonitoringTrigger::ScheduleDelay => {
                format!("Schedule delay > {MAX_SCHEDULE_DELAY_PCT:.0}%")
            }
            MonitoringTrigger::CriticalRisk => "Risk index escalation to critical".to_string(),
        }
    }
}

/// Triggers fired by a snapshot. Any trigger sends the initiative to a continuation review;
/// whether it is terminated is a board decision, not a computed outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonitoringReview {
    pub initiative_id: InitiativeId,
    pub triggers: Vec<MonitoringTrigger>,
    pub continuation_review_required: bool,
}

impl MonitoringSnapshot {
    pub fn review(&self) -> MonitoringReview {
        let mut triggers = Vec::new();

        if self.benefit_realisation_pct < MIN_BENEFIT_REALISATION_PCT {
            triggers.push(MonitoringTrigger::BenefitShortfall);
        }
        if self.budget_overrun_pct > MAX_BUDGET_OVERRUN_PCT {
            triggers.push(MonitoringTrigger::BudgetOverrun);
        }
        if self.schedule_delay_pct > MAX_SCHEDULE_DELAY_PCT {
            triggers.push(MonitoringTrigger::ScheduleDelay);
        }
        if self.risk_level == RiskLevel::Critical {
            triggers.push(MonitoringTrigger::CriticalRisk);
        }

        MonitoringReview {
            initiative_id: self.initiative_id.clone(),
            continuation_review_required: !triggers.is_empty(),
            triggers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn healthy() -> MonitoringSnapshot {
        MonitoringSnapshot {
            initiative_id: InitiativeId("INIT-1".to_string()),
            benefit_realisation_pct: 85.0,
            budget_overrun_pct: 5.0,
            schedule_delay_pct: 10.0,
            risk_level: RiskLevel::Medium,
        }
    }

    #[test]
    fn healthy_snapshot_fires_nothing() {
        let review = healthy().review();
        assert!(review.triggers.is_empty());
        assert!(!review.continuation_review_required);
    }

    #[test]
    fn thresholds_are_strict() {
        let mut snapshot = healthy();
        snapshot.benefit_realisation_pct = 70.0;
        snapshot.budget_overrun_pct = 15.0;
        snapshot.schedule_delay_pct = 20.0;
        assert!(snapshot.review().triggers.is_empty());

        snapshot.benefit_realisation_pct = 69.9;
        snapshot.budget_overrun_pct = 15.1;
        snapshot.schedule_delay_pct = 20.5;
        snapshot.risk_level = RiskLevel::Critical;
        let review = snapshot.review();
        assert_eq!(review.triggers, MonitoringTrigger::ALL.to_vec());
        assert!(review.continuation_review_required);
    }
}
