//! Read side of the portfolio decision mart: projects with their planned benefit and risk.

pub mod router;

pub use router::portfolio_router;

use serde::{Deserialize, Serialize};

pub const DEFAULT_PORTFOLIO_LIMIT: usize = 100;

/// One project joined with its benefit profile and risk register entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioInitiative {
    pub project_id: i64,
    pub project_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program_name: Option<String>,
    pub planned_benefit_value: Option<f64>,
    pub risk_severity: Option<String>,
}

/// Storage abstraction for portfolio queries.
pub trait PortfolioRepository: Send + Sync {
    fn initiatives(&self, limit: usize) -> Result<Vec<PortfolioInitiative>, PortfolioError>;
}

#[derive(Debug, thiserror::Error)]
pub enum PortfolioError {
    #[error("portfolio store unavailable: {0}")]
    Unavailable(String),
}

/// Headline figures shown above the portfolio table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioSummary {
    pub initiatives: usize,
    pub total_planned_benefit: f64,
    pub high_risk: usize,
}

impl PortfolioSummary {
    pub fn from_rows(rows: &[PortfolioInitiative]) -> Self {
        Self {
            initiatives: rows.len(),
            total_planned_benefit: rows
                .iter()
                .filter_map(|row| row.planned_benefit_value)
                .sum(),
            high_risk: rows
                .iter()
                .filter(|row| {
                    row.risk_severity.as_deref().is_some_and(|severity| {
                        matches!(
                            severity.trim().to_ascii_lowercase().as_str(),
                            "high" | "critical"
                        )
                    })
                })
                .count(),
        }
    }
}
