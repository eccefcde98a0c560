use crate::commands::{
    run_batch, run_decisions, run_evaluate, run_inspect, BatchArgs, DecisionsArgs, EvaluateArgs,
    InspectArgs,
};
use crate::demo::{run_demo, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use portfolio_board::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Portfolio Board",
    about = "Score transformation initiatives and keep the investment board's decision ledger",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Score one initiative from explicit criterion ratings
    Evaluate(EvaluateArgs),
    /// Score every row of a CSV score sheet
    Batch(BatchArgs),
    /// List recorded board decisions, newest first
    Decisions(DecisionsArgs),
    /// Dump the first rows of every decision mart table
    Inspect(InspectArgs),
    /// Run the board simulation demo against an in-memory decision mart
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Override the configured decision mart path
    #[arg(long)]
    pub(crate) database: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Evaluate(args) => run_evaluate(args),
        Command::Batch(args) => run_batch(args),
        Command::Decisions(args) => run_decisions(args),
        Command::Inspect(args) => run_inspect(args),
        Command::Demo(args) => run_demo(args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_defaults_to_serve() {
        let cli = Cli::try_parse_from(["portfolio-board"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn evaluate_accepts_ratings_and_weights() {
        let cli = Cli::try_parse_from([
            "portfolio-board",
            "evaluate",
            "--strategic-alignment",
            "5",
            "--benefit-value",
            "4",
            "--delivery-risk",
            "3",
            "--dependency-complexity",
            "4",
            "--capacity-availability",
            "3",
            "--regulatory-impact",
            "5",
            "--weights",
            "0.3,0.25,0.15,0.1,0.1,0.1",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Evaluate(args)) => {
                assert_eq!(args.strategic_alignment, 5);
                assert!(args.weights.is_some());
            }
            other => panic!("expected evaluate command, got {other:?}"),
        }
    }

    #[test]
    fn invalid_weights_are_rejected_at_parse_time() {
        let result = Cli::try_parse_from([
            "portfolio-board",
            "evaluate",
            "--strategic-alignment",
            "5",
            "--benefit-value",
            "4",
            "--delivery-risk",
            "3",
            "--dependency-complexity",
            "4",
            "--capacity-availability",
            "3",
            "--regulatory-impact",
            "5",
            "--weights",
            "0.5,0.5,0.5,0.5,0.5,0.5",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn batch_requires_csv_path() {
        assert!(Cli::try_parse_from(["portfolio-board", "batch"]).is_err());
        let cli = Cli::try_parse_from(["portfolio-board", "batch", "--csv", "sheet.csv"])
            .expect("parses");
        assert!(matches!(cli.command, Some(Command::Batch(_))));
    }
}
