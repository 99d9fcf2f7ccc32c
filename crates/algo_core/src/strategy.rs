//! Per-turn decision policy of the agent.
//!
//! The agent compiles its layout once at game start and then, every turn,
//! replays the compiled requests through the [`BuildPlanner`] and decides
//! whether to attack or to hold the line with an interceptor:
//!
//! - turn 0 always builds the layout first;
//! - while the opponent sits on a large cores bank, the agent only attacks
//!   when it also has a large bits bank, otherwise it sends an interceptor and
//!   restricts building to the early priorities;
//! - otherwise it builds and attacks.
//!
//! Attacks pick the candidate deploy location whose simulated walk breaches
//! most, then deals most damage.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::action_frame::ScoredOnLog;
use crate::combat::{CombatSimulator, PathOutcome};
use crate::engine::GameEngine;
use crate::error::Result;
use crate::grid::{GridCoordinate, Player};
use crate::layout::{compile, LayoutTable, PlacementCell, Request};
use crate::math::{affordable_count, fixed_serde, from_count, Fixed};
use crate::planner::{BuildPlanner, PlanReport, DEFAULT_RESOURCE_FLOOR};
use crate::units::{ResourceKind, UnitCatalog, UnitType};

/// Tunable parameters of the agent, loadable from RON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    /// Cores kept in reserve by the build planner.
    #[serde(with = "fixed_serde")]
    pub resource_floor: Fixed,
    /// Opponent cores above which the agent plays defensively.
    #[serde(with = "fixed_serde")]
    pub opponent_cores_threshold: Fixed,
    /// Own bits above which the agent attacks despite a rich opponent.
    #[serde(with = "fixed_serde")]
    pub bits_attack_threshold: Fixed,
    /// Priority ceiling for building on defensive turns.
    pub defensive_priority_ceiling: u32,
    /// Mobile unit used for attacks.
    pub attack_unit: UnitType,
    /// Candidate deploy locations for attacks, in preference order.
    pub attack_locations: Vec<GridCoordinate>,
    /// Mobile unit sent on defensive turns.
    pub interceptor_unit: UnitType,
    /// Deploy location of the interceptor.
    pub interceptor_at: GridCoordinate,
    /// Cell briefly walled off (and released again) on defensive turns.
    pub decoy_at: GridCoordinate,
    /// Desired own half.
    pub layout: LayoutTable,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            resource_floor: DEFAULT_RESOURCE_FLOOR,
            opponent_cores_threshold: Fixed::const_from_int(6),
            bits_attack_threshold: Fixed::const_from_int(8),
            defensive_priority_ceiling: 6,
            attack_unit: UnitType::Ping,
            attack_locations: vec![GridCoordinate::new(5, 8)],
            interceptor_unit: UnitType::Scrambler,
            interceptor_at: GridCoordinate::new(14, 0),
            decoy_at: GridCoordinate::new(6, 8),
            layout: default_layout(),
        }
    }
}

impl StrategyConfig {
    /// Parse a configuration from RON; missing fields take their defaults.
    pub fn from_ron_str(ron: &str) -> Result<Self> {
        Ok(ron::from_str(ron)?)
    }
}

/// `(row, column, unit, spawn priority, upgrade priority or -1)`.
const DEFAULT_PLACEMENTS: &[(usize, usize, UnitType, u32, i64)] = &[
    (0, 0, UnitType::Filter, 0, 2),
    (0, 1, UnitType::Filter, 0, 2),
    (0, 13, UnitType::Filter, 3, 5),
    (0, 15, UnitType::Filter, 3, 5),
    (0, 26, UnitType::Filter, 0, 2),
    (0, 27, UnitType::Filter, 0, 2),
    (1, 1, UnitType::Destructor, 1, -1),
    (1, 2, UnitType::Filter, 0, 6),
    (1, 13, UnitType::Filter, 3, 5),
    (1, 15, UnitType::Filter, 3, 5),
    (1, 25, UnitType::Filter, 0, 17),
    (1, 26, UnitType::Destructor, 1, -1),
    (2, 2, UnitType::Filter, 16, -1),
    (2, 3, UnitType::Filter, 0, 6),
    (2, 4, UnitType::Filter, 0, 6),
    (2, 13, UnitType::Filter, 3, 18),
    (2, 15, UnitType::Filter, 3, 18),
    (2, 25, UnitType::Filter, 0, 17),
    (3, 3, UnitType::Encryptor, 8, 9),
    (3, 4, UnitType::Encryptor, 6, 7),
    (3, 5, UnitType::Filter, 0, 6),
    (3, 13, UnitType::Filter, 3, 18),
    (3, 15, UnitType::Filter, 3, 18),
    (3, 24, UnitType::Filter, 0, 17),
    (4, 4, UnitType::Encryptor, 4, 5),
    (4, 5, UnitType::Filter, 0, 6),
    (4, 13, UnitType::Filter, 3, 18),
    (4, 15, UnitType::Filter, 3, 18),
    (4, 23, UnitType::Filter, 0, 17),
    (5, 5, UnitType::Encryptor, 10, 11),
    (5, 7, UnitType::Filter, 0, 17),
    (5, 8, UnitType::Filter, 0, 17),
    (5, 9, UnitType::Filter, 0, 17),
    (5, 10, UnitType::Filter, 0, 17),
    (5, 11, UnitType::Filter, 0, 17),
    (5, 12, UnitType::Filter, 0, 17),
    (5, 13, UnitType::Filter, 0, 2),
    (5, 15, UnitType::Filter, 0, 2),
    (5, 16, UnitType::Filter, 0, 17),
    (5, 17, UnitType::Filter, 0, 17),
    (5, 18, UnitType::Filter, 0, 17),
    (5, 19, UnitType::Filter, 0, 17),
    (5, 20, UnitType::Filter, 0, 17),
    (5, 21, UnitType::Filter, 0, 17),
    (5, 22, UnitType::Filter, 0, 17),
    (6, 8, UnitType::Encryptor, 12, 13),
    (6, 9, UnitType::Encryptor, 14, 15),
    (6, 13, UnitType::Destructor, 1, -1),
    (6, 15, UnitType::Destructor, 1, -1),
];

/// The built-in funnel layout: corner walls, twin central lanes and a
/// mid-field wall line backed by encryptors.
#[must_use]
pub fn default_layout() -> LayoutTable {
    LayoutTable::from_placements(DEFAULT_PLACEMENTS.iter().map(
        |&(row, column, unit_type, spawn, upgrade)| {
            (row, column, PlacementCell::from((unit_type, spawn, upgrade)))
        },
    ))
    // Every entry above is inside the 14 x 28 table.
    .unwrap_or_default()
}

/// Which branch of the turn policy ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnPosture {
    /// Built the full layout and attacked.
    Attack,
    /// Opponent was rich but so were we: built and attacked.
    CounterAttack,
    /// Sent an interceptor and built up to the defensive ceiling.
    Defend,
}

/// Attack launched during a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackReport {
    /// Deploy location.
    pub at: GridCoordinate,
    /// Units actually spawned.
    pub deployed: u32,
    /// Simulated outcome that selected the location.
    pub forecast: PathOutcome,
}

/// Everything the agent did in one turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnSummary {
    /// Turn number.
    pub turn: u32,
    /// Policy branch taken.
    pub posture: TurnPosture,
    /// Planner calls, in order.
    pub plans: Vec<PlanReport>,
    /// Attack, when one was launched.
    pub attack: Option<AttackReport>,
    /// Whether the interceptor was deployed.
    pub interceptor_deployed: bool,
}

/// Stateful agent living for one match.
#[derive(Debug, Clone)]
pub struct Agent {
    config: StrategyConfig,
    catalog: UnitCatalog,
    planner: BuildPlanner,
    requests: Vec<Request>,
    scored_on: ScoredOnLog,
}

impl Agent {
    /// Set up the agent at game start; compiles the layout once.
    #[must_use]
    pub fn on_game_start(config: StrategyConfig, catalog: UnitCatalog) -> Self {
        let requests = compile(&config.layout);
        info!(
            placements = config.layout.placement_count(),
            requests = requests.len(),
            "Compiled layout"
        );
        Self {
            planner: BuildPlanner::new(config.resource_floor),
            config,
            catalog,
            requests,
            scored_on: ScoredOnLog::new(),
        }
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    /// Unit statistics the agent plays with.
    #[must_use]
    pub fn catalog(&self) -> &UnitCatalog {
        &self.catalog
    }

    /// Compiled build requests, replayed every turn.
    #[must_use]
    pub fn requests(&self) -> &[Request] {
        &self.requests
    }

    /// Opponent breach locations seen so far.
    #[must_use]
    pub fn scored_on(&self) -> &ScoredOnLog {
        &self.scored_on
    }

    /// Play one turn and submit it.
    pub fn on_turn<E: GameEngine + ?Sized>(&mut self, engine: &mut E) -> TurnSummary {
        let turn = engine.turn_number();
        let mut plans = Vec::new();
        let mut attack = None;
        let mut interceptor_deployed = false;

        if turn == 0 {
            plans.push(self.planner.complete_requests(engine, &self.requests, None));
        }

        let opponent_cores = engine.resource(ResourceKind::Cores, Player::Opponent);
        let bits = engine.resource(ResourceKind::Bits, Player::Own);

        let posture = if opponent_cores > self.config.opponent_cores_threshold {
            if bits > self.config.bits_attack_threshold {
                TurnPosture::CounterAttack
            } else {
                TurnPosture::Defend
            }
        } else {
            TurnPosture::Attack
        };

        match posture {
            TurnPosture::Attack | TurnPosture::CounterAttack => {
                plans.push(self.planner.complete_requests(engine, &self.requests, None));
                attack = self.launch_attack(engine);
            }
            TurnPosture::Defend => {
                interceptor_deployed = self.deploy_interceptor(engine);
                plans.push(self.planner.complete_requests(
                    engine,
                    &self.requests,
                    Some(self.config.defensive_priority_ceiling),
                ));
            }
        }

        info!(
            turn,
            ?posture,
            opponent_cores = %opponent_cores,
            bits = %bits,
            attacked = attack.is_some(),
            "Turn planned"
        );
        engine.submit_turn();

        TurnSummary {
            turn,
            posture,
            plans,
            attack,
            interceptor_deployed,
        }
    }

    /// Record opponent breaches from one action frame.
    pub fn on_action_frame(&mut self, frame: &str) -> Result<usize> {
        self.scored_on.record_frame(frame)
    }

    fn launch_attack<E: GameEngine + ?Sized>(&self, engine: &mut E) -> Option<AttackReport> {
        let unit = self.config.attack_unit;
        let (at, forecast) =
            choose_attack_location(&*engine, &self.catalog, unit, &self.config.attack_locations)?;

        let mut deployed = 0;
        while engine.can_spawn(unit, at) && engine.attempt_spawn(unit, at) {
            deployed += 1;
        }
        debug!(%at, deployed, ?unit, "Attack launched");
        Some(AttackReport {
            at,
            deployed,
            forecast,
        })
    }

    fn deploy_interceptor<E: GameEngine + ?Sized>(&self, engine: &mut E) -> bool {
        let decoy = self.config.decoy_at;
        if engine.can_spawn(UnitType::Filter, decoy) {
            let _ = engine.attempt_spawn(UnitType::Filter, decoy);
        }
        let unit = self.config.interceptor_unit;
        let at = self.config.interceptor_at;
        let deployed = engine.can_spawn(unit, at) && engine.attempt_spawn(unit, at);
        if engine.contains_stationary_unit(decoy) {
            let _ = engine.attempt_remove(decoy);
        }
        deployed
    }
}

/// Rank candidate deploy locations by simulating the affordable group.
///
/// Best means most breaches (paths that never reach an edge rank lowest),
/// then most damage; the earlier candidate wins ties.
pub fn choose_attack_location<E: GameEngine + ?Sized>(
    engine: &E,
    catalog: &UnitCatalog,
    unit_type: UnitType,
    candidates: &[GridCoordinate],
) -> Option<(GridCoordinate, PathOutcome)> {
    let bits = engine.resource(unit_type.cost_resource(), Player::Own);
    let troops = affordable_count(bits, catalog.stats(unit_type).cost);
    let simulator = CombatSimulator::new(engine, catalog);

    let mut best: Option<(GridCoordinate, PathOutcome)> = None;
    for &at in candidates {
        let outcome = simulator.simulate_path(at, unit_type, troops);
        let better = best.map_or(true, |(_, current)| rank(&outcome) > rank(&current));
        if better {
            best = Some((at, outcome));
        }
    }
    best
}

fn rank(outcome: &PathOutcome) -> (i64, Fixed) {
    (outcome.breaches.map_or(-1, i64::from), outcome.total_damage)
}

/// Pick the option whose path crosses the least turret fire.
///
/// Each path cell contributes its attacker count times turret unit damage.
/// The earlier option wins ties.
pub fn least_damage_spawn_location<E: GameEngine + ?Sized>(
    engine: &E,
    catalog: &UnitCatalog,
    options: &[GridCoordinate],
) -> Option<GridCoordinate> {
    let turret_damage = catalog.stats(UnitType::Destructor).damage_to_unit;
    options
        .iter()
        .map(|&at| {
            let damage = engine
                .find_path_to_edge(at)
                .into_iter()
                .map(|cell| {
                    let attackers = u32::try_from(engine.attackers(cell, Player::Own).len())
                        .unwrap_or(u32::MAX);
                    from_count(attackers).saturating_mul(turret_damage)
                })
                .fold(Fixed::ZERO, Fixed::saturating_add);
            (at, damage)
        })
        .min_by_key(|&(_, damage)| damage)
        .map(|(at, _)| at)
}

/// Filter for counting opponent structures.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnemyUnitFilter {
    /// Only this type, when set.
    pub unit_type: Option<UnitType>,
    /// Only these columns, when set.
    pub valid_x: Option<Vec<i32>>,
    /// Only these rows, when set.
    pub valid_y: Option<Vec<i32>>,
}

/// Count opponent structures matching `filter`.
pub fn detect_enemy_units<E: GameEngine + ?Sized>(engine: &E, filter: &EnemyUnitFilter) -> usize {
    engine
        .stationary_units()
        .iter()
        .filter(|unit| unit.owner == Player::Opponent)
        .filter(|unit| filter.unit_type.map_or(true, |t| unit.unit_type == t))
        .filter(|unit| {
            filter
                .valid_x
                .as_ref()
                .map_or(true, |xs| xs.contains(&unit.position.x))
        })
        .filter(|unit| {
            filter
                .valid_y
                .as_ref()
                .map_or(true, |ys| ys.contains(&unit.position.y))
        })
        .count()
}

/// Keep only locations not occupied by a structure.
pub fn filter_blocked_locations<E: GameEngine + ?Sized>(
    engine: &E,
    locations: &[GridCoordinate],
) -> Vec<GridCoordinate> {
    locations
        .iter()
        .copied()
        .filter(|&at| !engine.contains_stationary_unit(at))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::RequestKind;
    use crate::sandbox::{CommittedAction, Purse, SandboxEngine};

    fn engine_with(cores: i32, bits: i32, opponent_cores: i32) -> SandboxEngine {
        let mut engine = SandboxEngine::new(UnitCatalog::default());
        engine.set_purse(Player::Own, Purse::new(Fixed::from_num(cores), Fixed::from_num(bits)));
        engine.set_purse(
            Player::Opponent,
            Purse::new(Fixed::from_num(opponent_cores), Fixed::ZERO),
        );
        engine
    }

    #[test]
    fn test_default_layout_matches_table() {
        let layout = default_layout();
        assert_eq!(layout.placement_count(), DEFAULT_PLACEMENTS.len());

        let requests = compile(&layout);
        let upgrades = requests.iter().filter(|r| r.kind == RequestKind::Upgrade).count();
        assert_eq!(upgrades, DEFAULT_PLACEMENTS.iter().filter(|p| p.4 != -1).count());
        assert_eq!(requests[0].at, GridCoordinate::new(0, 13));
        assert_eq!(requests.last().map(|r| r.priority), Some(18));
    }

    #[test]
    fn test_config_from_partial_ron() {
        let config = StrategyConfig::from_ron_str(
            "(resource_floor: 0.5, attack_locations: [(13, 0), (14, 0)], layout: [[Some((Destructor, 0, -1))]])",
        )
        .expect("valid ron");

        assert_eq!(config.resource_floor, Fixed::from_num(0.5));
        assert_eq!(config.attack_locations.len(), 2);
        assert_eq!(config.layout.placement_count(), 1);
        assert_eq!(config.attack_unit, UnitType::Ping);
    }

    #[test]
    fn test_attack_turn_builds_then_spawns_pings() {
        let mut engine = engine_with(3, 4, 0);
        engine.set_turn(3);
        let config = StrategyConfig {
            layout: LayoutTable::from_placements([(
                0,
                13,
                PlacementCell::spawn(UnitType::Filter, 0),
            )])
            .expect("fits"),
            ..StrategyConfig::default()
        };
        let mut agent = Agent::on_game_start(config, UnitCatalog::default());

        let summary = agent.on_turn(&mut engine);

        assert_eq!(summary.posture, TurnPosture::Attack);
        assert_eq!(summary.plans.len(), 1);
        let attack = summary.attack.expect("attack launched");
        assert_eq!(attack.at, GridCoordinate::new(5, 8));
        assert_eq!(attack.deployed, 4);
        assert!(!attack.forecast.is_valid(), "no projected path from (5, 8)");
        assert_eq!(engine.submitted_turns().len(), 1);
        let ping = CommittedAction::Spawn {
            unit_type: UnitType::Ping,
            at: GridCoordinate::new(5, 8),
        };
        assert_eq!(
            engine.submitted_turns()[0],
            vec![
                CommittedAction::Spawn {
                    unit_type: UnitType::Filter,
                    at: GridCoordinate::new(13, 13),
                },
                ping.clone(),
                ping.clone(),
                ping.clone(),
                ping,
            ]
        );
    }

    #[test]
    fn test_attack_spends_all_bits() {
        let mut engine = engine_with(0, 4, 0);
        engine.set_turn(1);
        let config = StrategyConfig {
            attack_locations: vec![GridCoordinate::new(13, 0)],
            ..StrategyConfig::default()
        };
        let mut agent = Agent::on_game_start(config, UnitCatalog::default());

        let summary = agent.on_turn(&mut engine);

        assert_eq!(summary.attack.map(|a| a.deployed), Some(4));
        assert_eq!(engine.resource(ResourceKind::Bits, Player::Own), Fixed::ZERO);
    }

    #[test]
    fn test_defensive_turn_sends_interceptor_and_caps_priority() {
        let mut engine = engine_with(100, 2, 10);
        engine.set_turn(5);
        let mut agent = Agent::on_game_start(StrategyConfig::default(), UnitCatalog::default());

        let summary = agent.on_turn(&mut engine);

        assert_eq!(summary.posture, TurnPosture::Defend);
        assert!(summary.interceptor_deployed);
        assert!(summary.attack.is_none());
        let plan = &summary.plans[0];
        assert_eq!(plan.halted, Some(crate::planner::HaltReason::PriorityCeiling));

        let actions = &engine.submitted_turns()[0];
        assert_eq!(
            actions[..3],
            [
                CommittedAction::Spawn {
                    unit_type: UnitType::Filter,
                    at: GridCoordinate::new(6, 8),
                },
                CommittedAction::Spawn {
                    unit_type: UnitType::Scrambler,
                    at: GridCoordinate::new(14, 0),
                },
                CommittedAction::Remove {
                    at: GridCoordinate::new(6, 8),
                },
            ]
        );
    }

    #[test]
    fn test_counter_attack_when_both_rich() {
        let mut engine = engine_with(0, 9, 10);
        engine.set_turn(7);
        let mut agent = Agent::on_game_start(StrategyConfig::default(), UnitCatalog::default());

        let summary = agent.on_turn(&mut engine);

        assert_eq!(summary.posture, TurnPosture::CounterAttack);
        assert!(!summary.interceptor_deployed);
        assert!(summary.attack.is_some());
    }

    #[test]
    fn test_turn_zero_runs_planner_twice() {
        let mut engine = engine_with(0, 0, 0);
        let mut agent = Agent::on_game_start(StrategyConfig::default(), UnitCatalog::default());

        let summary = agent.on_turn(&mut engine);

        assert_eq!(summary.turn, 0);
        assert_eq!(summary.plans.len(), 2);
        assert!(summary
            .plans
            .iter()
            .all(|plan| plan.halted == Some(crate::planner::HaltReason::ResourceFloor)));
    }

    #[test]
    fn test_choose_attack_location_prefers_breaching_path() {
        let mut engine = engine_with(0, 5, 0);
        let blocked = GridCoordinate::new(13, 0);
        let open = GridCoordinate::new(14, 0);
        engine.set_path(open, vec![open, GridCoordinate::new(14, 27)]);

        let catalog = UnitCatalog::default();
        let chosen = choose_attack_location(&engine, &catalog, UnitType::Ping, &[blocked, open]);

        let (at, outcome) = chosen.expect("candidates given");
        assert_eq!(at, open);
        assert_eq!(outcome.breaches, Some(5));
        assert!(choose_attack_location(&engine, &catalog, UnitType::Ping, &[]).is_none());
    }

    #[test]
    fn test_least_damage_spawn_location() {
        let mut engine = engine_with(0, 0, 0);
        let exposed = GridCoordinate::new(13, 0);
        let safe = GridCoordinate::new(14, 0);
        engine.set_path(exposed, vec![exposed, GridCoordinate::new(13, 1)]);
        engine.set_path(safe, vec![safe, GridCoordinate::new(20, 6)]);
        assert!(engine.place_structure(
            UnitType::Destructor,
            GridCoordinate::new(11, 2),
            Player::Opponent
        ));

        let pick = least_damage_spawn_location(&engine, &UnitCatalog::default(), &[exposed, safe]);

        assert_eq!(pick, Some(safe));
    }

    #[test]
    fn test_detect_and_filter_helpers() {
        let mut engine = engine_with(0, 0, 0);
        assert!(engine.place_structure(
            UnitType::Destructor,
            GridCoordinate::new(13, 14),
            Player::Opponent
        ));
        assert!(engine.place_structure(
            UnitType::Filter,
            GridCoordinate::new(10, 16),
            Player::Opponent
        ));
        assert!(engine.place_structure(UnitType::Filter, GridCoordinate::new(10, 13), Player::Own));

        let all = detect_enemy_units(&engine, &EnemyUnitFilter::default());
        let walls = detect_enemy_units(
            &engine,
            &EnemyUnitFilter {
                unit_type: Some(UnitType::Filter),
                ..EnemyUnitFilter::default()
            },
        );
        let front = detect_enemy_units(
            &engine,
            &EnemyUnitFilter {
                valid_y: Some(vec![14, 15]),
                ..EnemyUnitFilter::default()
            },
        );
        assert_eq!((all, walls, front), (2, 1, 1));

        let open = filter_blocked_locations(
            &engine,
            &[GridCoordinate::new(10, 13), GridCoordinate::new(11, 13)],
        );
        assert_eq!(open, vec![GridCoordinate::new(11, 13)]);
    }
}
