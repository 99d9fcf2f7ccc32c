//! End-to-end planning scenarios against the in-memory engine.

use algo_core::combat::CombatSimulator;
use algo_core::engine::GameEngine;
use algo_core::grid::{GridCoordinate, Player};
use algo_core::layout::{compile, LayoutTable, PlacementCell, RequestKind};
use algo_core::planner::BuildPlanner;
use algo_core::sandbox::{CommittedAction, Purse};
use algo_core::strategy::{Agent, StrategyConfig, TurnPosture};
use algo_core::units::{ResourceKind, UnitCatalog, UnitType};
use algo_test_utils::determinism::{hash_of, verify_determinism};
use algo_test_utils::fixtures::{center_lane, fixed, funded_sandbox, layout_of, staircase};

#[test]
fn test_empty_table_plans_nothing() {
    let mut engine = funded_sandbox(10, 10);
    let requests = compile(&LayoutTable::default());

    let report = BuildPlanner::default().complete_requests(&mut engine, &requests, None);

    assert!(requests.is_empty());
    assert_eq!(report.processed(), 0);
    assert_eq!(engine.resource(ResourceKind::Cores, Player::Own), fixed(10));
    assert!(engine.committed().is_empty());
}

#[test]
fn test_single_cell_without_upgrade() {
    let layout = layout_of(&[(0, 4, UnitType::Encryptor, 3, -1)]);

    let requests = compile(&layout);

    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].kind, RequestKind::Spawn);
    assert_eq!(requests[0].priority, 3);
}

#[test]
fn test_equal_priorities_keep_insertion_order() {
    let layout = layout_of(&[
        (2, 10, UnitType::Filter, 5, -1),
        (2, 17, UnitType::Destructor, 5, -1),
    ]);

    let requests = compile(&layout);

    assert_eq!(requests[0].unit_type, UnitType::Filter);
    assert_eq!(requests[1].unit_type, UnitType::Destructor);
}

#[test]
fn test_blocked_path_is_invalid_regardless_of_defenders() {
    let mut engine = funded_sandbox(0, 0);
    let start = GridCoordinate::new(13, 0);
    engine.set_path(start, center_lane()[..4].to_vec());
    assert!(engine.place_structure(
        UnitType::Destructor,
        GridCoordinate::new(13, 16),
        Player::Opponent
    ));
    let catalog = UnitCatalog::default();

    let outcome = CombatSimulator::new(&engine, &catalog).simulate_path(start, UnitType::Ping, 10);

    assert_eq!(outcome.as_tuple(), (fixed(0), 0, fixed(0), -1));
}

#[test]
fn test_short_clear_path_breaches_single_troop() {
    let mut engine = funded_sandbox(0, 0);
    let start = GridCoordinate::new(13, 25);
    engine.set_path(start, center_lane()[25..].to_vec());
    let catalog = UnitCatalog::default();

    let outcome = CombatSimulator::new(&engine, &catalog).simulate_path(start, UnitType::Ping, 1);

    assert_eq!(outcome.as_tuple(), (fixed(0), 0, fixed(0), 1));
}

#[test]
fn test_lane_through_defence_loses_troops() {
    let mut engine = funded_sandbox(0, 0);
    let start = GridCoordinate::new(13, 0);
    engine.set_path(start, center_lane());
    assert!(engine.place_structure(
        UnitType::Destructor,
        GridCoordinate::new(11, 18),
        Player::Opponent
    ));
    assert!(engine.place_structure(
        UnitType::Filter,
        GridCoordinate::new(14, 15),
        Player::Opponent
    ));
    let catalog = UnitCatalog::default();
    let simulator = CombatSimulator::new(&engine, &catalog);

    let outcome = simulator.simulate_path(start, UnitType::Ping, 8);

    assert!(outcome.is_valid());
    let breaches = outcome.breaches.unwrap_or_default();
    assert!(breaches < 8, "turret must take some troops");
    assert!(outcome.total_damage > fixed(0));
    assert!(outcome.frames <= 28);
    assert_eq!(engine.stationary_units().len(), 2, "simulation leaves the board alone");
}

#[test]
fn test_full_match_opening() {
    let mut engine = funded_sandbox(40, 6);
    engine.set_purse(
        Player::Opponent,
        Purse::new(fixed(2), fixed(0)),
    );
    let start = GridCoordinate::new(13, 0);
    engine.set_path(start, staircase(start, GridCoordinate::new(13, 27)));
    let config = StrategyConfig {
        attack_locations: vec![GridCoordinate::new(14, 0), start],
        ..StrategyConfig::default()
    };
    let mut agent = Agent::on_game_start(config, UnitCatalog::default());

    let summary = agent.on_turn(&mut engine);

    assert_eq!(summary.posture, TurnPosture::Attack);
    let attack = summary.attack.expect("attack launched");
    assert_eq!(attack.at, start, "only the registered lane reaches an edge");
    assert_eq!(attack.deployed, 6);
    let actions = &engine.submitted_turns()[0];
    assert!(matches!(
        actions.first(),
        Some(CommittedAction::Spawn { unit_type: UnitType::Filter, .. })
    ));
    assert_eq!(engine.resource(ResourceKind::Bits, Player::Own), fixed(0));
    assert!(engine.resource(ResourceKind::Cores, Player::Own) < fixed(1));
}

#[test]
fn test_layout_is_replayed_each_turn() {
    let mut engine = funded_sandbox(3, 0);
    let layout = layout_of(&[
        (0, 10, UnitType::Filter, 0, -1),
        (0, 11, UnitType::Filter, 1, -1),
        (0, 12, UnitType::Filter, 2, -1),
        (0, 13, UnitType::Filter, 3, -1),
    ]);
    let requests = compile(&layout);
    let planner = BuildPlanner::default();

    let first = planner.complete_requests(&mut engine, &requests, None);
    engine.submit_turn();
    engine.set_purse(Player::Own, Purse::new(fixed(3), fixed(0)));
    let second = planner.complete_requests(&mut engine, &requests, None);

    assert_eq!(first.spawned, 3);
    assert_eq!(first.halted_at, Some(3));
    assert_eq!(second.spawned, 1);
    assert_eq!(second.skipped, 3, "built cells are occupied");
}

#[test]
fn test_turns_are_deterministic() {
    let setup = || {
        let mut engine = funded_sandbox(25, 12);
        let start = GridCoordinate::new(14, 0);
        engine.set_path(start, staircase(start, GridCoordinate::new(14, 27)));
        assert!(engine.place_structure(
            UnitType::Destructor,
            GridCoordinate::new(16, 20),
            Player::Opponent
        ));
        let config = StrategyConfig {
            attack_locations: vec![GridCoordinate::new(13, 0), start],
            ..StrategyConfig::default()
        };
        (engine, Agent::on_game_start(config, UnitCatalog::default()))
    };

    let result = verify_determinism(
        3,
        4,
        setup,
        |(engine, agent)| {
            let turn = engine.turn_number();
            let _ = agent.on_turn(engine);
            engine.set_turn(turn + 1);
            engine.set_purse(Player::Own, Purse::new(fixed(8), fixed(5)));
        },
        |(engine, _)| hash_of(engine.submitted_turns()),
    );

    result.assert_deterministic();
}

#[test]
fn test_defensive_turns_only_reach_ceiling() {
    let mut engine = funded_sandbox(50, 0);
    engine.set_purse(Player::Opponent, Purse::new(fixed(20), fixed(0)));
    engine.set_turn(2);
    let config = StrategyConfig {
        layout: LayoutTable::from_placements([
            (0, 10, PlacementCell::spawn(UnitType::Filter, 2)),
            (0, 11, PlacementCell::spawn(UnitType::Filter, 7)),
        ])
        .expect("fits"),
        ..StrategyConfig::default()
    };
    let mut agent = Agent::on_game_start(config, UnitCatalog::default());

    let summary = agent.on_turn(&mut engine);

    assert_eq!(summary.posture, TurnPosture::Defend);
    assert!(!summary.interceptor_deployed, "no bits for the interceptor");
    assert!(engine.contains_stationary_unit(GridCoordinate::new(10, 13)));
    assert!(!engine.contains_stationary_unit(GridCoordinate::new(11, 13)));
}
