//! Command implementations shared by the binary and the tests.
//!
//! Each function returns the [`Response`] records to print instead of
//! writing them, so the binary only decides where output goes.

use std::io::BufRead;

use algo_core::action_frame::ScoredOnLog;
use algo_core::combat::CombatSimulator;
use algo_core::grid::GridCoordinate;
use algo_core::layout::compile;
use algo_core::math::affordable_count;
use algo_core::strategy::{Agent, StrategyConfig};
use algo_core::units::{ResourceKind, UnitCatalog, UnitType};
use tracing::{info, warn};

use crate::protocol::Response;
use crate::scenario::{BoardScenario, ScenarioError};

/// Compiled build requests of a strategy's layout, in replay order.
#[must_use]
pub fn list_requests(strategy: &StrategyConfig) -> Vec<Response> {
    compile(&strategy.layout).iter().map(Response::from).collect()
}

/// Play one agent turn on the board and report what it submitted.
pub fn plan_turn(
    board: &BoardScenario,
    strategy: StrategyConfig,
    catalog: UnitCatalog,
) -> Result<Vec<Response>, ScenarioError> {
    let mut engine = board.to_sandbox(catalog.clone())?;
    let mut agent = Agent::on_game_start(strategy, catalog);

    let summary = agent.on_turn(&mut engine);
    let turn = summary.turn;
    let actions = engine.submitted_turns().last().cloned().unwrap_or_default();
    info!(turn, actions = actions.len(), "Planned turn");

    let mut responses = vec![Response::Turn(summary)];
    responses.extend(
        actions
            .into_iter()
            .map(|action| Response::Action { turn, action }),
    );
    Ok(responses)
}

/// Simulate a group of `troops` units deployed at `at`.
///
/// Without `troops`, the group is as large as the own balance affords.
pub fn simulate(
    board: &BoardScenario,
    catalog: UnitCatalog,
    at: GridCoordinate,
    unit_type: UnitType,
    troops: Option<u32>,
) -> Result<Response, ScenarioError> {
    let engine = board.to_sandbox(catalog.clone())?;
    let troops = troops.unwrap_or_else(|| {
        let balance = match unit_type.cost_resource() {
            ResourceKind::Cores => board.own.cores,
            ResourceKind::Bits => board.own.bits,
        };
        affordable_count(balance, catalog.stats(unit_type).cost)
    });

    let outcome = CombatSimulator::new(&engine, &catalog).simulate_path(at, unit_type, troops);
    Ok(Response::outcome(at, unit_type, troops, outcome))
}

/// Feed action frames, one JSON document per line, into `log`.
///
/// Blank lines are skipped. A malformed frame yields an error record and
/// processing continues; a read failure ends the replay.
pub fn replay_frames<R: BufRead>(reader: R, log: &mut ScoredOnLog) -> Vec<Response> {
    let mut responses = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!(line = index, error = %e, "Failed to read action frame");
                responses.push(Response::error(format!("read failed: {e}"), Some(index)));
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match log.record_frame(&line) {
            Ok(added) => responses.push(Response::ScoredOn {
                frame: index,
                added,
                total: log.locations().len(),
            }),
            Err(e) => {
                warn!(line = index, error = %e, "Skipping malformed action frame");
                responses.push(Response::error(e.to_string(), Some(index)));
            }
        }
    }
    responses
}
