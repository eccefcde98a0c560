use crate::commands::render_decisions;
use clap::Args;
use portfolio_board::error::AppError;
use portfolio_board::storage::SqliteStore;
use portfolio_board::workflows::board::{
    BoardSimulationService, CriterionScores, DecisionLedger, FixedScoreProvider,
    GovernanceFramework, Initiative, InitiativeId, MonitoringSnapshot, RiskLevel,
    ScoreAssessment, SimulationRequest, ValidationError, WeightVector,
};
use portfolio_board::workflows::portfolio::{
    PortfolioRepository, PortfolioSummary, DEFAULT_PORTFOLIO_LIMIT,
};
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Skip the portfolio overview section
    #[arg(long)]
    pub(crate) skip_portfolio: bool,
    /// Skip the quarterly monitoring section
    #[arg(long)]
    pub(crate) skip_monitoring: bool,
}

struct DemoCase {
    id: &'static str,
    name: &'static str,
    scores: [u8; 6],
    rationale: &'static str,
    conditions: &'static [&'static str],
}

const DEMO_CASES: [DemoCase; 4] = [
    DemoCase {
        id: "INIT-101",
        name: "Claims Platform Renewal",
        scores: [5, 4, 3, 4, 3, 5],
        rationale: "Directly delivers the digital claims objective with a clear benefit case.",
        conditions: &["Stage-gate vendor onboarding", "Quarterly benefit check-in"],
    },
    DemoCase {
        id: "INIT-102",
        name: "Broker Portal Modernisation",
        scores: [4, 4, 4, 4, 4, 4],
        rationale: "Balanced case with no dominant risk.",
        conditions: &[],
    },
    DemoCase {
        id: "INIT-201",
        name: "Enterprise Data Lake",
        scores: [3, 3, 3, 3, 3, 3],
        rationale: "Benefit case not yet quantified; dependencies on three programmes.",
        conditions: &["Return with a quantified benefit profile"],
    },
    DemoCase {
        id: "INIT-301",
        name: "Legacy Intranet Refresh",
        scores: [1, 1, 1, 1, 1, 1],
        rationale: "No link to current strategic objectives.",
        conditions: &[],
    },
];

fn demo_provider() -> Result<FixedScoreProvider, ValidationError> {
    let mut provider = FixedScoreProvider::default();
    for case in &DEMO_CASES {
        let [a, b, c, d, e, f] = case.scores;
        let mut assessment =
            ScoreAssessment::new(CriterionScores::new(a, b, c, d, e, f)?, case.rationale);
        assessment.conditions = case.conditions.iter().map(|c| c.to_string()).collect();
        provider = provider.with_fixture(case.id, assessment);
    }
    Ok(provider)
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let store = Arc::new(SqliteStore::open_in_memory()?);
    store.seed_sample_portfolio()?;

    println!("Investment board demo");
    let framework = GovernanceFramework::standard();
    println!("Decision thresholds:");
    for line in framework.threshold_lines() {
        println!("  - {line}");
    }

    if !args.skip_portfolio {
        match store.initiatives(DEFAULT_PORTFOLIO_LIMIT) {
            Ok(rows) => {
                let summary = PortfolioSummary::from_rows(&rows);
                println!(
                    "\nPortfolio: {} initiatives | planned benefit {:.0} | {} high risk",
                    summary.initiatives, summary.total_planned_benefit, summary.high_risk
                );
                for row in rows {
                    println!(
                        "  - {} {} ({}) risk {}",
                        row.project_id,
                        row.project_name,
                        row.program_name.as_deref().unwrap_or("unassigned"),
                        row.risk_severity.as_deref().unwrap_or("unknown")
                    );
                }
            }
            Err(err) => println!("\nPortfolio unavailable: {err}"),
        }
    }

    let service = BoardSimulationService::new(
        Arc::new(demo_provider()?),
        store.clone(),
        WeightVector::STANDARD,
    );

    println!("\nBoard simulations");
    for case in &DEMO_CASES {
        let report = match service
            .simulate(SimulationRequest {
                initiative: Initiative::named(case.id, case.name),
                persist: true,
            })
            .await
        {
            Ok(report) => report,
            Err(err) => {
                println!("  {}: simulation failed: {err}", case.name);
                continue;
            }
        };
        println!("  {}: {}", case.name, report.evaluation.summary());
        println!("    {}", report.rationale);
        for condition in &report.conditions {
            println!("    condition: {condition}");
        }
    }

    println!("\nDecision ledger (newest first)");
    match store.recent(None) {
        Ok(records) => render_decisions(&records),
        Err(err) => println!("  Ledger unavailable: {err}"),
    }

    if args.skip_monitoring {
        return Ok(());
    }

    println!("\nQuarterly monitoring");
    let snapshots = [
        MonitoringSnapshot {
            initiative_id: InitiativeId("INIT-101".to_string()),
            benefit_realisation_pct: 92.0,
            budget_overrun_pct: 6.0,
            schedule_delay_pct: 10.0,
            risk_level: RiskLevel::Medium,
        },
        MonitoringSnapshot {
            initiative_id: InitiativeId("INIT-102".to_string()),
            benefit_realisation_pct: 64.0,
            budget_overrun_pct: 18.5,
            schedule_delay_pct: 12.0,
            risk_level: RiskLevel::Critical,
        },
    ];
    for snapshot in snapshots {
        let review = snapshot.review();
        if review.continuation_review_required {
            let triggers: Vec<String> = review
                .triggers
                .iter()
                .map(|trigger| trigger.description())
                .collect();
            println!(
                "  - {}: continuation review required ({})",
                review.initiative_id,
                triggers.join("; ")
            );
        } else {
            println!("  - {}: on track", review.initiative_id);
        }
    }

    Ok(())
}
