use crate::infra::parse_weights;
use clap::Args;
use portfolio_board::config::AppConfig;
use portfolio_board::error::AppError;
use portfolio_board::storage::SqliteStore;
use portfolio_board::workflows::board::{
    evaluate_score_sheet, BatchLineResult, BatchReport, BoardDecisionRecord, BoardServiceError,
    CriterionScores, DecisionLedger, FundingEvaluation, FundingEvaluator, Initiative,
    WeightVector,
};
use std::fs::File;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct EvaluateArgs {
    /// Initiative name shown in the output
    #[arg(long, default_value = "")]
    pub(crate) name: String,
    #[arg(long)]
    pub(crate) strategic_alignment: u8,
    #[arg(long)]
    pub(crate) benefit_value: u8,
    #[arg(long)]
    pub(crate) delivery_risk: u8,
    #[arg(long)]
    pub(crate) dependency_complexity: u8,
    #[arg(long)]
    pub(crate) capacity_availability: u8,
    #[arg(long)]
    pub(crate) regulatory_impact: u8,
    /// Six weights in criterion order, or criterion=weight pairs. Must sum to 1.0.
    #[arg(long, value_parser = parse_weights)]
    pub(crate) weights: Option<WeightVector>,
    /// Print the full evaluation as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct BatchArgs {
    /// CSV score sheet: initiative_id, initiative_name, and one column per criterion
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Print the report as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct DecisionsArgs {
    /// Only show the newest N decisions
    #[arg(long)]
    pub(crate) limit: Option<usize>,
    /// Override the configured decision mart path
    #[arg(long)]
    pub(crate) database: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct InspectArgs {
    /// Rows shown per table
    #[arg(long, default_value_t = 5)]
    pub(crate) rows: usize,
    /// Override the configured decision mart path
    #[arg(long)]
    pub(crate) database: Option<PathBuf>,
}

pub(crate) fn run_evaluate(args: EvaluateArgs) -> Result<(), AppError> {
    let scores = CriterionScores::new(
        args.strategic_alignment,
        args.benefit_value,
        args.delivery_risk,
        args.dependency_complexity,
        args.capacity_availability,
        args.regulatory_impact,
    )?;
    let initiative = Initiative::named("", args.name);
    let evaluation = FundingEvaluator::default()
        .evaluate(&initiative, &scores, args.weights.as_ref())
        .map_err(BoardServiceError::from)?;

    if args.json {
        print_json(&evaluation);
    } else {
        render_evaluation(&initiative, &evaluation);
    }
    Ok(())
}

pub(crate) fn run_batch(args: BatchArgs) -> Result<(), AppError> {
    let file = File::open(&args.csv)?;
    let report = evaluate_score_sheet(&FundingEvaluator::default(), file)?;

    if args.json {
        print_json(&report);
    } else {
        render_batch(&report);
    }
    Ok(())
}

pub(crate) fn run_decisions(args: DecisionsArgs) -> Result<(), AppError> {
    let store = open_store(args.database)?;
    let records = store
        .recent(args.limit)
        .map_err(BoardServiceError::from)?;
    render_decisions(&records);
    Ok(())
}

pub(crate) fn run_inspect(args: InspectArgs) -> Result<(), AppError> {
    let store = open_store(args.database)?;
    println!("--- Decision mart tables ---");
    for table in store.inspect(args.rows)? {
        println!("\nTable: {} ({} rows shown)", table.name, table.rows.len());
        println!("  {}", table.columns.join(" | "));
        for row in table.rows {
            let cells: Vec<String> = row.iter().map(render_cell).collect();
            println!("  {}", cells.join(" | "));
        }
    }
    Ok(())
}

fn open_store(database: Option<PathBuf>) -> Result<SqliteStore, AppError> {
    let path = match database {
        Some(path) => path,
        None => AppConfig::load()?.storage.database_path,
    };
    Ok(SqliteStore::open(path)?)
}

pub(crate) fn render_evaluation(initiative: &Initiative, evaluation: &FundingEvaluation) {
    let title = if initiative.has_name() {
        initiative.name.as_str()
    } else {
        "Initiative"
    };
    println!("{title}: {}", evaluation.summary());
    for component in &evaluation.components {
        println!(
            "  - {:<24} score {} x weight {:.2} = {:.2}",
            component.criterion.label(),
            component.score,
            component.weight,
            component.contribution
        );
    }
}

fn render_batch(report: &BatchReport) {
    println!(
        "Score sheet: {} evaluated, {} rejected",
        report.evaluated, report.rejected
    );
    for line in &report.lines {
        match &line.result {
            BatchLineResult::Evaluated {
                composite_score,
                outcome,
            } => println!(
                "  line {:>3} {:<28} {:.2} -> {}",
                line.line, line.initiative_id, composite_score, outcome
            ),
            BatchLineResult::Rejected { error } => println!(
                "  line {:>3} {:<28} rejected: {}",
                line.line, line.initiative_id, error
            ),
        }
    }
}

pub(crate) fn render_decisions(records: &[BoardDecisionRecord]) {
    if records.is_empty() {
        println!("No board decisions recorded");
        return;
    }
    for record in records {
        println!(
            "{} | {} | {:.2} | {} | {}",
            record.timestamp.format("%Y-%m-%d %H:%M:%S"),
            record.initiative_id,
            record.composite_score,
            record.decision_outcome,
            record.decision_id
        );
        if !record.board_rationale.is_empty() {
            println!("    {}", record.board_rationale);
        }
    }
}

fn render_cell(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => "NULL".to_string(),
        serde_json::Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(err) => eprintln!("failed to render JSON: {err}"),
    }
}
