//! Headless planning runner.
//!
//! # Usage
//!
//! ```bash
//! # Compiled requests of the built-in layout
//! cargo run -p algo_headless -- requests
//!
//! # One agent turn on a board scenario
//! cargo run -p algo_headless -- plan --board scenarios/opening.ron --strategy strategy.ron
//!
//! # Simulate five pings from (13, 0)
//! cargo run -p algo_headless -- simulate --board scenarios/opening.ron --x 13 --y 0 --count 5
//!
//! # Replay recorded action frames
//! cargo run -p algo_headless -- frames < frames.jsonl
//! ```

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use algo_core::action_frame::ScoredOnLog;
use algo_core::error::AlgoError;
use algo_core::grid::GridCoordinate;
use algo_core::strategy::StrategyConfig;
use algo_core::units::UnitCatalog;
use algo_headless::runner::{list_requests, plan_turn, replay_frames, simulate};
use algo_headless::scenario::{load_catalog, load_strategy, BoardScenario, ScenarioError};
use algo_headless::Response;

#[derive(Parser)]
#[command(name = "algo_headless")]
#[command(about = "Offline planning runner for the tower-defense agent")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Engine configuration JSON with unit statistics
    #[arg(long, global = true)]
    engine_config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the compiled build requests
    Requests {
        /// Strategy RON file (built-in defaults when absent)
        #[arg(short, long)]
        strategy: Option<PathBuf>,
    },

    /// Play one agent turn on a board scenario
    Plan {
        /// Board scenario RON file
        #[arg(short, long)]
        board: PathBuf,

        /// Strategy RON file (built-in defaults when absent)
        #[arg(short, long)]
        strategy: Option<PathBuf>,
    },

    /// Simulate a troop group walking its path
    Simulate {
        /// Board scenario RON file
        #[arg(short, long)]
        board: PathBuf,

        /// Deploy column
        #[arg(long)]
        x: i32,

        /// Deploy row
        #[arg(long)]
        y: i32,

        /// Mobile unit shorthand
        #[arg(short, long, default_value = "PI")]
        unit: String,

        /// Group size (as many as affordable when absent)
        #[arg(short, long)]
        count: Option<u32>,
    },

    /// Read action frames from stdin and record opponent breaches
    Frames,
}

#[derive(Error, Debug)]
enum CliError {
    #[error(transparent)]
    Scenario(#[from] ScenarioError),
    #[error(transparent)]
    Core(#[from] AlgoError),
    #[error("Failed to write output: {0}")]
    Output(#[from] io::Error),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging to stderr (stdout is for JSON output)
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let catalog = match &cli.engine_config {
        Some(path) => load_catalog(path)?,
        None => UnitCatalog::default(),
    };

    let responses = match cli.command {
        Commands::Requests { strategy } => list_requests(&strategy_or_default(strategy)?),
        Commands::Plan { board, strategy } => {
            let board = BoardScenario::load(board)?;
            plan_turn(&board, strategy_or_default(strategy)?, catalog)?
        }
        Commands::Simulate {
            board,
            x,
            y,
            unit,
            count,
        } => {
            let board = BoardScenario::load(board)?;
            let unit_type = catalog.by_shorthand(&unit)?;
            vec![simulate(
                &board,
                catalog,
                GridCoordinate::new(x, y),
                unit_type,
                count,
            )?]
        }
        Commands::Frames => {
            let mut log = ScoredOnLog::new();
            let responses = replay_frames(io::stdin().lock(), &mut log);
            tracing::info!(scored_on = log.locations().len(), "Action frames replayed");
            responses
        }
    };

    write_responses(&responses)?;
    Ok(())
}

fn strategy_or_default(path: Option<PathBuf>) -> Result<StrategyConfig, ScenarioError> {
    path.map_or_else(|| Ok(StrategyConfig::default()), load_strategy)
}

fn write_responses(responses: &[Response]) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    for response in responses {
        stdout.write_all(response.to_json_line().as_bytes())?;
    }
    stdout.flush()
}
