//! Engine boundary consumed by the planner, the simulator and the strategy.
//!
//! The real engine owns the turn snapshot and the wire protocol; this crate
//! only talks to it through [`GameEngine`]. [`crate::sandbox::SandboxEngine`]
//! is the in-memory implementation used offline.

use crate::grid::{BoundaryEdges, GridCoordinate, Player};
use crate::math::Fixed;
use crate::units::{ResourceKind, UnitSnapshot, UnitType};

/// Accessors and commit operations for one turn.
///
/// Commit operations (`attempt_*`) return `false` for illegal or unaffordable
/// actions; that is a normal outcome, never an error.
pub trait GameEngine {
    /// Turn number of the current snapshot (0 for the first turn).
    fn turn_number(&self) -> u32;

    /// Current balance of a resource pool for `player`.
    fn resource(&self, kind: ResourceKind, player: Player) -> Fixed;

    /// Whether one unit of `unit_type` can legally and affordably be placed.
    fn can_spawn(&self, unit_type: UnitType, at: GridCoordinate) -> bool;

    /// Commit a spawn, returning whether it was accepted.
    fn attempt_spawn(&mut self, unit_type: UnitType, at: GridCoordinate) -> bool;

    /// Commit an upgrade of the own structure at `at`.
    fn attempt_upgrade(&mut self, at: GridCoordinate) -> bool;

    /// Mark the own structure at `at` for removal.
    fn attempt_remove(&mut self, at: GridCoordinate) -> bool;

    /// Whether any stationary unit occupies `at`.
    fn contains_stationary_unit(&self, at: GridCoordinate) -> bool;

    /// Every stationary unit on the board.
    fn stationary_units(&self) -> Vec<UnitSnapshot>;

    /// Stationary units able to attack a unit of `player` standing at `at`.
    fn attackers(&self, at: GridCoordinate, player: Player) -> Vec<UnitSnapshot>;

    /// Projected path of a mobile unit deployed at `start`.
    ///
    /// The path includes `start`; it may end short of any edge when blocked.
    fn find_path_to_edge(&self, start: GridCoordinate) -> Vec<GridCoordinate>;

    /// The edges own mobile units score on.
    fn edges(&self) -> BoundaryEdges;

    /// Flush every action committed this turn.
    fn submit_turn(&mut self);
}
