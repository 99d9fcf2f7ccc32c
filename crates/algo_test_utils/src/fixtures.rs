//! Test fixtures and helpers.
//!
//! Pre-built boards, paths and layouts for consistent testing.

use algo_core::grid::{GridCoordinate, Player};
use algo_core::layout::{LayoutTable, PlacementCell};
use algo_core::sandbox::{Purse, SandboxEngine};
use algo_core::units::{UnitCatalog, UnitType};
use fixed::types::I32F32;

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
///
/// Note: planning code never uses floats.
/// This is only for convenient test setup.
#[must_use]
pub fn fixed_f(n: f64) -> I32F32 {
    I32F32::from_num(n)
}

/// Sandbox with default unit stats and the given own balances.
#[must_use]
pub fn funded_sandbox(cores: i32, bits: i32) -> SandboxEngine {
    let mut engine = SandboxEngine::new(UnitCatalog::default());
    engine.set_purse(Player::Own, Purse::new(fixed(cores), fixed(bits)));
    engine
}

/// Straight column from the own bottom-left corner cell `(13, 0)` to the
/// opponent's top-left corner cell `(13, 27)`.
#[must_use]
pub fn center_lane() -> Vec<GridCoordinate> {
    (0..28).map(|y| GridCoordinate::new(13, y)).collect()
}

/// Staircase path from `from` to `to`, alternating one step in x and one
/// in y until each axis is aligned.
#[must_use]
pub fn staircase(from: GridCoordinate, to: GridCoordinate) -> Vec<GridCoordinate> {
    let mut path = vec![from];
    let mut at = from;
    while at != to {
        if at.x != to.x {
            at.x += (to.x - at.x).signum();
            path.push(at);
        }
        if at.y != to.y {
            at.y += (to.y - at.y).signum();
            path.push(at);
        }
    }
    path
}

/// Build a layout from `(row, column, unit, spawn, upgrade or -1)` entries.
///
/// # Panics
///
/// Panics if an entry falls outside the 14 x 28 table.
#[must_use]
pub fn layout_of(entries: &[(usize, usize, UnitType, u32, i64)]) -> LayoutTable {
    LayoutTable::from_placements(entries.iter().map(|&(row, column, unit, spawn, upgrade)| {
        (row, column, PlacementCell::from((unit, spawn, upgrade)))
    }))
    .expect("fixture layout fits the table")
}
