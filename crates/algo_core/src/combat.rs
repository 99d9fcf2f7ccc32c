//! What-if simulation of a troop group walking its projected path.
//!
//! A group of identical mobile units is modelled as a survivor count plus a
//! single shared health pool for the unit currently absorbing fire. The walk
//! advances one frame at a time:
//!
//! 1. the group hits the closest opponent structure in range with its
//!    combined structure damage;
//! 2. every opponent attacker covering the current cell hits the shared pool;
//!    when the pool is exhausted one troop is lost and the pool refills;
//! 3. after `speed` frames in a cell the group moves to the next cell.
//!
//! Structures damaged during the walk live in a private copy taken before the
//! first frame; the engine's board is only read.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::engine::GameEngine;
use crate::grid::{GridCoordinate, Player};
use crate::math::{fixed_serde, from_count, Fixed};
use crate::units::{UnitCatalog, UnitType};

/// Aggregate result of one simulated walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathOutcome {
    /// Structure health removed by the group, destroyed targets credited with
    /// the health they had left.
    #[serde(with = "fixed_serde")]
    pub total_damage: Fixed,
    /// Removable walls destroyed.
    pub walls_removed: u32,
    /// Portion of `total_damage` dealt to heavy defenders.
    #[serde(with = "fixed_serde")]
    pub defender_damage: Fixed,
    /// Troops reaching the edge; `None` when the path never reaches an edge.
    pub breaches: Option<u32>,
    /// Frames simulated before the walk ended.
    pub frames: u32,
}

impl PathOutcome {
    /// Outcome of a path that does not end on a scoring edge.
    pub const INVALID_PATH: Self = Self {
        total_damage: Fixed::ZERO,
        walls_removed: 0,
        defender_damage: Fixed::ZERO,
        breaches: None,
        frames: 0,
    };

    /// Whether the path reached a scoring edge.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.breaches.is_some()
    }

    /// Engine-facing tuple `(damage, walls, defender damage, breaches)`,
    /// with `-1` breaches for an invalid path.
    #[must_use]
    pub fn as_tuple(&self) -> (Fixed, u32, Fixed, i64) {
        (
            self.total_damage,
            self.walls_removed,
            self.defender_damage,
            self.breaches.map_or(-1, i64::from),
        )
    }
}

/// Opponent structure copied for the duration of one walk.
#[derive(Debug, Clone, Copy)]
struct TargetState {
    unit_type: UnitType,
    health: Fixed,
}

/// Read-only path simulator over a live engine.
#[derive(Debug)]
pub struct CombatSimulator<'a, E: GameEngine + ?Sized> {
    engine: &'a E,
    catalog: &'a UnitCatalog,
}

impl<'a, E: GameEngine + ?Sized> CombatSimulator<'a, E> {
    /// Create a simulator reading `engine` with unit stats from `catalog`.
    #[must_use]
    pub fn new(engine: &'a E, catalog: &'a UnitCatalog) -> Self {
        Self { engine, catalog }
    }

    /// Estimate deploying `troop_count` units of `unit_type` at `start`.
    #[must_use]
    pub fn simulate_path(
        &self,
        start: GridCoordinate,
        unit_type: UnitType,
        troop_count: u32,
    ) -> PathOutcome {
        let path = self.engine.find_path_to_edge(start);
        let edges = self.engine.edges();
        match path.last() {
            Some(&end) if edges.contains(end) => {}
            _ => {
                debug!(%start, path_len = path.len(), "Path does not reach an edge");
                return PathOutcome::INVALID_PATH;
            }
        }

        let unit = self.catalog.snapshot(unit_type, Player::Own, start);
        let speed = unit.speed.max(1);

        let mut targets: BTreeMap<GridCoordinate, TargetState> = self
            .engine
            .stationary_units()
            .into_iter()
            .filter(|structure| {
                structure.owner == Player::Opponent && structure.health > Fixed::ZERO
            })
            .map(|structure| {
                (
                    structure.position,
                    TargetState {
                        unit_type: structure.unit_type,
                        health: structure.health,
                    },
                )
            })
            .collect();
        let mut destroyed: HashSet<GridCoordinate> = HashSet::new();

        let mut outcome = PathOutcome {
            breaches: Some(0),
            ..PathOutcome::INVALID_PATH
        };
        let mut survivors = troop_count;
        let mut pool = unit.max_health;
        let mut index = 0;
        let mut frames_in_cell = 0;

        while index < path.len() && survivors > 0 {
            let at = path[index];
            outcome.frames += 1;

            if let Some(target_at) = select_target(&targets, at, unit.range) {
                let output = from_count(survivors).saturating_mul(unit.damage_to_structure);
                if let Some(target) = targets.get_mut(&target_at) {
                    if output >= target.health {
                        let remaining = target.health;
                        outcome.total_damage += remaining;
                        if target.unit_type.is_removable_wall() {
                            outcome.walls_removed += 1;
                        }
                        if target.unit_type.is_heavy_defender() {
                            outcome.defender_damage += remaining;
                        }
                        trace!(%target_at, unit = ?target.unit_type, "Target destroyed");
                        let _ = targets.remove(&target_at);
                        let _ = destroyed.insert(target_at);
                    } else if output > Fixed::ZERO {
                        target.health -= output;
                        outcome.total_damage += output;
                        if target.unit_type.is_heavy_defender() {
                            outcome.defender_damage += output;
                        }
                    }
                }
            }

            for attacker in self.engine.attackers(at, Player::Own) {
                if destroyed.contains(&attacker.position) {
                    continue;
                }
                pool -= attacker.damage_to_unit;
                if pool <= Fixed::ZERO {
                    survivors -= 1;
                    pool = unit.max_health;
                    if survivors == 0 {
                        break;
                    }
                }
            }

            frames_in_cell += 1;
            if frames_in_cell >= speed {
                frames_in_cell = 0;
                index += 1;
            }
        }

        outcome.breaches = Some(survivors);
        debug!(
            %start,
            ?unit_type,
            troop_count,
            breaches = survivors,
            damage = %outcome.total_damage,
            walls = outcome.walls_removed,
            frames = outcome.frames,
            "Simulated path"
        );
        outcome
    }
}

/// Closest live target within `range` of `at`; ties go to the weakest, then
/// the lowest coordinate.
fn select_target(
    targets: &BTreeMap<GridCoordinate, TargetState>,
    at: GridCoordinate,
    range: Fixed,
) -> Option<GridCoordinate> {
    targets
        .iter()
        .filter(|(&position, _)| at.within(position, range))
        .min_by_key(|(&position, target)| (at.distance_squared(position), target.health, position))
        .map(|(&position, _)| position)
}
