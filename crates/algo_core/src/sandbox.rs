//! In-memory [`GameEngine`] for offline planning, tests and benchmarks.
//!
//! The sandbox models the parts of the engine the agent relies on: diamond
//! arena bounds, spawn legality and cost, one-time upgrades, pending removals,
//! turret coverage and the committed-action log. Pathfinding is not modelled;
//! paths come from an explicit table filled with [`SandboxEngine::set_path`].

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::engine::GameEngine;
use crate::grid::{BoundaryEdges, Edge, GridCoordinate, Player};
use crate::math::{fixed_serde, Fixed};
use crate::units::{ResourceKind, UnitCatalog, UnitSnapshot, UnitType};

/// Action committed through the engine boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum CommittedAction {
    /// Unit placed.
    Spawn {
        /// Placed unit type.
        unit_type: UnitType,
        /// Target cell.
        at: GridCoordinate,
    },
    /// Structure upgraded.
    Upgrade {
        /// Target cell.
        at: GridCoordinate,
    },
    /// Structure marked for removal.
    Remove {
        /// Target cell.
        at: GridCoordinate,
    },
}

/// Resource balances of one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Purse {
    /// Structure resource.
    #[serde(with = "fixed_serde")]
    pub cores: Fixed,
    /// Mobile unit resource.
    #[serde(with = "fixed_serde")]
    pub bits: Fixed,
}

impl Purse {
    /// Create a purse.
    #[must_use]
    pub const fn new(cores: Fixed, bits: Fixed) -> Self {
        Self { cores, bits }
    }

    fn balance_mut(&mut self, kind: ResourceKind) -> &mut Fixed {
        match kind {
            ResourceKind::Cores => &mut self.cores,
            ResourceKind::Bits => &mut self.bits,
        }
    }

    fn balance(&self, kind: ResourceKind) -> Fixed {
        match kind {
            ResourceKind::Cores => self.cores,
            ResourceKind::Bits => self.bits,
        }
    }
}

#[derive(Debug, Clone)]
struct Structure {
    snapshot: UnitSnapshot,
    pending_removal: bool,
}

/// Board, purses and action log of a single offline match.
#[derive(Debug, Clone)]
pub struct SandboxEngine {
    catalog: UnitCatalog,
    turn: u32,
    purses: [Purse; 2],
    structures: BTreeMap<GridCoordinate, Structure>,
    mobile_deploys: Vec<(UnitType, GridCoordinate)>,
    paths: HashMap<GridCoordinate, Vec<GridCoordinate>>,
    committed: Vec<CommittedAction>,
    submitted: Vec<Vec<CommittedAction>>,
}

impl SandboxEngine {
    /// Empty board on turn 0 with empty purses.
    #[must_use]
    pub fn new(catalog: UnitCatalog) -> Self {
        Self {
            catalog,
            turn: 0,
            purses: [Purse::default(); 2],
            structures: BTreeMap::new(),
            mobile_deploys: Vec::new(),
            paths: HashMap::new(),
            committed: Vec::new(),
            submitted: Vec::new(),
        }
    }

    /// Unit statistics in use.
    #[must_use]
    pub fn catalog(&self) -> &UnitCatalog {
        &self.catalog
    }

    /// Mutable unit statistics, for tuning scenarios.
    pub fn catalog_mut(&mut self) -> &mut UnitCatalog {
        &mut self.catalog
    }

    /// Set the turn number.
    pub fn set_turn(&mut self, turn: u32) {
        self.turn = turn;
    }

    /// Replace a player's balances.
    pub fn set_purse(&mut self, player: Player, purse: Purse) {
        self.purses[player.index()] = purse;
    }

    /// A player's balances.
    #[must_use]
    pub fn purse(&self, player: Player) -> Purse {
        self.purses[player.index()]
    }

    /// Register the projected path of a unit deployed at `start`.
    pub fn set_path(&mut self, start: GridCoordinate, path: Vec<GridCoordinate>) {
        let _ = self.paths.insert(start, path);
    }

    /// Put a full-health structure on the board without paying for it.
    ///
    /// Returns `false` when the cell is outside the arena or occupied.
    pub fn place_structure(
        &mut self,
        unit_type: UnitType,
        at: GridCoordinate,
        owner: Player,
    ) -> bool {
        if !unit_type.is_stationary() || !at.in_arena() || self.structures.contains_key(&at) {
            return false;
        }
        let snapshot = self.catalog.snapshot(unit_type, owner, at);
        let _ = self.structures.insert(
            at,
            Structure {
                snapshot,
                pending_removal: false,
            },
        );
        true
    }

    /// Overwrite the health of the structure at `at`.
    pub fn set_structure_health(&mut self, at: GridCoordinate, health: Fixed) -> bool {
        match self.structures.get_mut(&at) {
            Some(structure) => {
                structure.snapshot.health = health;
                true
            }
            None => false,
        }
    }

    /// Actions committed since the last [`GameEngine::submit_turn`].
    #[must_use]
    pub fn committed(&self) -> &[CommittedAction] {
        &self.committed
    }

    /// Action lists flushed by previous [`GameEngine::submit_turn`] calls.
    #[must_use]
    pub fn submitted_turns(&self) -> &[Vec<CommittedAction>] {
        &self.submitted
    }

    /// Mobile units deployed this turn.
    #[must_use]
    pub fn mobile_deploys(&self) -> &[(UnitType, GridCoordinate)] {
        &self.mobile_deploys
    }

    /// Whether `at` is marked for removal.
    #[must_use]
    pub fn is_pending_removal(&self, at: GridCoordinate) -> bool {
        self.structures
            .get(&at)
            .is_some_and(|structure| structure.pending_removal)
    }

    fn on_deploy_edge(at: GridCoordinate, player: Player) -> bool {
        Edge::deploy_edges(player)
            .into_iter()
            .any(|edge| edge.cells().contains(&at))
    }

    fn own_structure_mut(&mut self, at: GridCoordinate) -> Option<&mut Structure> {
        self.structures
            .get_mut(&at)
            .filter(|structure| structure.snapshot.owner == Player::Own)
    }
}

impl GameEngine for SandboxEngine {
    fn turn_number(&self) -> u32 {
        self.turn
    }

    fn resource(&self, kind: ResourceKind, player: Player) -> Fixed {
        self.purses[player.index()].balance(kind)
    }

    fn can_spawn(&self, unit_type: UnitType, at: GridCoordinate) -> bool {
        let cost = self.catalog.stats(unit_type).cost;
        let affordable = self.resource(unit_type.cost_resource(), Player::Own) >= cost;
        let placeable = at.in_arena()
            && at.half() == Player::Own
            && !self.structures.contains_key(&at);
        let from_edge = !unit_type.is_stationary() && Self::on_deploy_edge(at, Player::Own);
        affordable && placeable && (unit_type.is_stationary() || from_edge)
    }

    fn attempt_spawn(&mut self, unit_type: UnitType, at: GridCoordinate) -> bool {
        if !self.can_spawn(unit_type, at) {
            return false;
        }
        let cost = self.catalog.stats(unit_type).cost;
        *self.purses[Player::Own.index()].balance_mut(unit_type.cost_resource()) -= cost;
        if unit_type.is_stationary() {
            let _ = self.place_structure(unit_type, at, Player::Own);
        } else {
            self.mobile_deploys.push((unit_type, at));
        }
        trace!(?unit_type, %at, "Sandbox spawn");
        self.committed.push(CommittedAction::Spawn { unit_type, at });
        true
    }

    fn attempt_upgrade(&mut self, at: GridCoordinate) -> bool {
        let cores = self.purses[Player::Own.index()].cores;
        let Some(unit_type) = self
            .structures
            .get(&at)
            .filter(|s| s.snapshot.owner == Player::Own && !s.snapshot.upgraded)
            .map(|s| s.snapshot.unit_type)
        else {
            return false;
        };
        let cost = self.catalog.stats(unit_type).upgrade_cost;
        if cores < cost {
            return false;
        }
        self.purses[Player::Own.index()].cores -= cost;
        if let Some(structure) = self.own_structure_mut(at) {
            structure.snapshot.upgraded = true;
        }
        self.committed.push(CommittedAction::Upgrade { at });
        true
    }

    fn attempt_remove(&mut self, at: GridCoordinate) -> bool {
        match self.own_structure_mut(at) {
            Some(structure) if !structure.pending_removal => {
                structure.pending_removal = true;
                self.committed.push(CommittedAction::Remove { at });
                true
            }
            _ => false,
        }
    }

    fn contains_stationary_unit(&self, at: GridCoordinate) -> bool {
        self.structures.contains_key(&at)
    }

    fn stationary_units(&self) -> Vec<UnitSnapshot> {
        self.structures
            .values()
            .map(|structure| structure.snapshot.clone())
            .collect()
    }

    fn attackers(&self, at: GridCoordinate, player: Player) -> Vec<UnitSnapshot> {
        self.structures
            .values()
            .map(|structure| &structure.snapshot)
            .filter(|unit| {
                unit.owner != player
                    && unit.damage_to_unit > Fixed::ZERO
                    && unit.health > Fixed::ZERO
                    && unit.position.within(at, unit.range)
            })
            .cloned()
            .collect()
    }

    fn find_path_to_edge(&self, start: GridCoordinate) -> Vec<GridCoordinate> {
        self.paths
            .get(&start)
            .cloned()
            .unwrap_or_else(|| vec![start])
    }

    fn edges(&self) -> BoundaryEdges {
        BoundaryEdges::scoring_for(Player::Own)
    }

    fn submit_turn(&mut self) {
        let actions = std::mem::take(&mut self.committed);
        self.mobile_deploys.clear();
        self.submitted.push(actions);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn funded() -> SandboxEngine {
        let mut engine = SandboxEngine::new(UnitCatalog::default());
        engine.set_purse(Player::Own, Purse::new(Fixed::from_num(10), Fixed::from_num(5)));
        engine
    }

    #[test]
    fn test_spawn_deducts_cost_and_logs() {
        let mut engine = funded();
        let at = GridCoordinate::new(13, 13);

        assert!(engine.attempt_spawn(UnitType::Destructor, at));

        assert_eq!(engine.resource(ResourceKind::Cores, Player::Own), Fixed::from_num(4));
        assert!(engine.contains_stationary_unit(at));
        assert_eq!(
            engine.committed(),
            &[CommittedAction::Spawn {
                unit_type: UnitType::Destructor,
                at
            }]
        );
        assert!(!engine.can_spawn(UnitType::Filter, at), "cell is occupied");
    }

    #[test]
    fn test_spawn_rules() {
        let engine = funded();
        assert!(!engine.can_spawn(UnitType::Filter, GridCoordinate::new(13, 14)), "opponent half");
        assert!(!engine.can_spawn(UnitType::Filter, GridCoordinate::new(0, 0)), "outside arena");
        assert!(engine.can_spawn(UnitType::Ping, GridCoordinate::new(13, 0)), "bottom edge");
        assert!(!engine.can_spawn(UnitType::Ping, GridCoordinate::new(13, 5)), "not an edge");
        assert!(engine.can_spawn(UnitType::Emp, GridCoordinate::new(0, 13)), "far end of an edge");
    }

    #[test]
    fn test_unaffordable_spawn_rejected() {
        let mut engine = funded();
        engine.set_purse(Player::Own, Purse::new(Fixed::from_num(5), Fixed::ZERO));

        assert!(!engine.attempt_spawn(UnitType::Destructor, GridCoordinate::new(13, 13)));
        assert!(!engine.attempt_spawn(UnitType::Ping, GridCoordinate::new(13, 0)));
        assert!(engine.committed().is_empty());
    }

    #[test]
    fn test_upgrade_once_and_only_own() {
        let mut engine = funded();
        let own = GridCoordinate::new(13, 13);
        let theirs = GridCoordinate::new(13, 14);
        assert!(engine.attempt_spawn(UnitType::Filter, own));
        assert!(engine.place_structure(UnitType::Filter, theirs, Player::Opponent));

        assert!(engine.attempt_upgrade(own));
        assert!(!engine.attempt_upgrade(own), "already upgraded");
        assert!(!engine.attempt_upgrade(theirs));
        assert!(!engine.attempt_upgrade(GridCoordinate::new(10, 13)), "empty cell");
        assert_eq!(engine.resource(ResourceKind::Cores, Player::Own), Fixed::from_num(8));
    }

    #[test]
    fn test_remove_marks_pending() {
        let mut engine = funded();
        let at = GridCoordinate::new(6, 8);
        assert!(engine.attempt_spawn(UnitType::Filter, at));

        assert!(engine.attempt_remove(at));
        assert!(!engine.attempt_remove(at));
        assert!(engine.is_pending_removal(at));
        assert!(engine.contains_stationary_unit(at), "removal happens after the turn");
    }

    #[test]
    fn test_attackers_respect_range_and_owner() {
        let mut engine = funded();
        assert!(engine.place_structure(
            UnitType::Destructor,
            GridCoordinate::new(13, 17),
            Player::Opponent
        ));
        assert!(engine.place_structure(
            UnitType::Filter,
            GridCoordinate::new(13, 15),
            Player::Opponent
        ));
        assert!(engine.place_structure(
            UnitType::Destructor,
            GridCoordinate::new(13, 12),
            Player::Own
        ));

        let near = engine.attackers(GridCoordinate::new(13, 14), Player::Own);
        assert_eq!(near.len(), 1);
        assert_eq!(near[0].unit_type, UnitType::Destructor);
        assert_eq!(near[0].owner, Player::Opponent);

        assert!(engine.attackers(GridCoordinate::new(13, 5), Player::Own).is_empty());
    }

    #[test]
    fn test_submit_flushes_committed() {
        let mut engine = funded();
        assert!(engine.attempt_spawn(UnitType::Ping, GridCoordinate::new(13, 0)));

        engine.submit_turn();

        assert!(engine.committed().is_empty());
        assert!(engine.mobile_deploys().is_empty());
        assert_eq!(engine.submitted_turns().len(), 1);
        assert_eq!(engine.submitted_turns()[0].len(), 1);
    }

    #[test]
    fn test_unknown_path_is_start_only() {
        let engine = funded();
        let start = GridCoordinate::new(5, 8);
        assert_eq!(engine.find_path_to_edge(start), vec![start]);
    }
}
