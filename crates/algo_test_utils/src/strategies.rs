//! Proptest strategies for planning inputs.

use algo_core::grid::{GridCoordinate, HALF_ARENA};
use algo_core::layout::{LayoutTable, PlacementCell, MAX_COLUMNS, MAX_ROWS};
use algo_core::units::UnitType;
use proptest::prelude::*;

/// Any stationary unit type.
pub fn arb_structure_type() -> impl Strategy<Value = UnitType> {
    prop_oneof![
        Just(UnitType::Filter),
        Just(UnitType::Encryptor),
        Just(UnitType::Destructor),
    ]
}

/// Any mobile unit type.
pub fn arb_mobile_type() -> impl Strategy<Value = UnitType> {
    prop_oneof![Just(UnitType::Ping), Just(UnitType::Emp), Just(UnitType::Scrambler)]
}

/// Placement with a small priority range so ties are common; about one in
/// three cells never upgrades.
pub fn arb_placement_cell() -> impl Strategy<Value = PlacementCell> {
    (arb_structure_type(), 0_u32..8, -4_i64..8)
        .prop_map(|(unit, spawn, upgrade)| PlacementCell::from((unit, spawn, upgrade)))
}

/// Sparse layout table with up to `max_cells` placements.
pub fn arb_layout_table(max_cells: usize) -> impl Strategy<Value = LayoutTable> {
    prop::collection::vec((0..MAX_ROWS, 0..MAX_COLUMNS, arb_placement_cell()), 0..=max_cells)
        .prop_map(|entries| {
            LayoutTable::from_placements(entries).unwrap_or_default()
        })
}

/// Any cell inside the own half of the arena.
pub fn arb_own_cell() -> impl Strategy<Value = GridCoordinate> {
    (0..HALF_ARENA).prop_flat_map(|y| {
        (HALF_ARENA - 1 - y..=HALF_ARENA + y).prop_map(move |x| GridCoordinate::new(x, y))
    })
}

/// Any cell inside the opponent half of the arena.
pub fn arb_opponent_cell() -> impl Strategy<Value = GridCoordinate> {
    arb_own_cell().prop_map(|cell| GridCoordinate::new(cell.x, 2 * HALF_ARENA - 1 - cell.y))
}
