//! Declarative placement tables and their compilation into build requests.
//!
//! A [`LayoutTable`] describes the desired own half as rows of optional
//! [`PlacementCell`]s. [`compile`] flattens it once into a priority-ordered
//! list of [`Request`]s that the build planner replays every turn.
//!
//! # Coordinates
//!
//! Row 0 of the table is the front line of the own half. Table row `r`,
//! column `c` maps to grid coordinate `(c, 13 - r)`, so a table holds at most
//! 14 rows of 28 columns.

use serde::{Deserialize, Serialize};

use crate::error::{AlgoError, Result};
use crate::grid::{GridCoordinate, ARENA_SIZE, HALF_ARENA};
use crate::units::UnitType;

/// Maximum number of rows in a layout table.
pub const MAX_ROWS: usize = HALF_ARENA as usize;

/// Maximum number of columns in a layout table.
pub const MAX_COLUMNS: usize = ARENA_SIZE as usize;

/// Configuration-file form of a placement: `(unit, spawn, upgrade)` where an
/// upgrade priority of `-1` means "never upgrade".
type RawPlacementCell = (UnitType, u32, i64);

/// Desired structure for one cell of the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawPlacementCell", into = "RawPlacementCell")]
pub struct PlacementCell {
    /// Structure to place.
    pub unit_type: UnitType,
    /// Priority of the spawn request (lower runs first).
    pub spawn_priority: u32,
    /// Priority of the upgrade request, `None` to never upgrade.
    pub upgrade_priority: Option<u32>,
}

impl PlacementCell {
    /// Cell that is spawned and never upgraded.
    #[must_use]
    pub const fn spawn(unit_type: UnitType, spawn_priority: u32) -> Self {
        Self {
            unit_type,
            spawn_priority,
            upgrade_priority: None,
        }
    }

    /// Cell that is spawned and later upgraded.
    #[must_use]
    pub const fn upgraded(
        unit_type: UnitType,
        spawn_priority: u32,
        upgrade_priority: u32,
    ) -> Self {
        Self {
            unit_type,
            spawn_priority,
            upgrade_priority: Some(upgrade_priority),
        }
    }
}

impl From<RawPlacementCell> for PlacementCell {
    fn from((unit_type, spawn_priority, upgrade_priority): RawPlacementCell) -> Self {
        Self {
            unit_type,
            spawn_priority,
            // Any negative priority (the convention is -1) disables the upgrade.
            upgrade_priority: u32::try_from(upgrade_priority).ok(),
        }
    }
}

impl From<PlacementCell> for RawPlacementCell {
    fn from(cell: PlacementCell) -> Self {
        (
            cell.unit_type,
            cell.spawn_priority,
            cell.upgrade_priority.map_or(-1, i64::from),
        )
    }
}

/// Rows of optional placements, front line first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<Option<PlacementCell>>>", into = "Vec<Vec<Option<PlacementCell>>>")]
pub struct LayoutTable {
    rows: Vec<Vec<Option<PlacementCell>>>,
}

impl LayoutTable {
    /// Build a table, rejecting ones that do not fit the own half.
    pub fn new(rows: Vec<Vec<Option<PlacementCell>>>) -> Result<Self> {
        let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
        if rows.len() > MAX_ROWS || columns > MAX_COLUMNS {
            return Err(AlgoError::InvalidLayout {
                rows: rows.len(),
                columns,
                max_rows: MAX_ROWS,
                max_columns: MAX_COLUMNS,
            });
        }
        Ok(Self { rows })
    }

    /// Build a full-size table from sparse `(row, column, cell)` entries.
    pub fn from_placements(
        placements: impl IntoIterator<Item = (usize, usize, PlacementCell)>,
    ) -> Result<Self> {
        let mut rows = vec![vec![None; MAX_COLUMNS]; MAX_ROWS];
        for (row, column, cell) in placements {
            if row >= MAX_ROWS || column >= MAX_COLUMNS {
                return Err(AlgoError::InvalidLayout {
                    rows: row + 1,
                    columns: column + 1,
                    max_rows: MAX_ROWS,
                    max_columns: MAX_COLUMNS,
                });
            }
            rows[row][column] = Some(cell);
        }
        Ok(Self { rows })
    }

    /// Table rows, front line first.
    #[must_use]
    pub fn rows(&self) -> &[Vec<Option<PlacementCell>>] {
        &self.rows
    }

    /// Number of non-empty cells.
    #[must_use]
    pub fn placement_count(&self) -> usize {
        self.rows.iter().flatten().flatten().count()
    }

    /// Non-empty cells with their grid coordinates, in discovery order.
    pub fn placements(&self) -> impl Iterator<Item = (GridCoordinate, PlacementCell)> + '_ {
        self.rows.iter().enumerate().flat_map(|(row, cells)| {
            cells.iter().enumerate().filter_map(move |(column, cell)| {
                cell.map(|cell| (table_to_grid(row, column), cell))
            })
        })
    }
}

impl TryFrom<Vec<Vec<Option<PlacementCell>>>> for LayoutTable {
    type Error = AlgoError;

    fn try_from(rows: Vec<Vec<Option<PlacementCell>>>) -> Result<Self> {
        Self::new(rows)
    }
}

impl From<LayoutTable> for Vec<Vec<Option<PlacementCell>>> {
    fn from(table: LayoutTable) -> Self {
        table.rows
    }
}

/// Map table indices to the grid coordinate they describe.
#[must_use]
pub fn table_to_grid(row: usize, column: usize) -> GridCoordinate {
    // Bounded by MAX_ROWS / MAX_COLUMNS, so the casts cannot truncate.
    GridCoordinate::new(column as i32, HALF_ARENA - 1 - row as i32)
}

/// Kind of build action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    /// Place a new structure.
    Spawn,
    /// Upgrade an existing structure.
    Upgrade,
}

/// One prioritized build action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// Spawn or upgrade.
    pub kind: RequestKind,
    /// Structure concerned.
    pub unit_type: UnitType,
    /// Target cell.
    pub at: GridCoordinate,
    /// Ordering key (lower runs first).
    pub priority: u32,
}

/// Compile a layout table into requests sorted by ascending priority.
///
/// Every non-empty cell yields a spawn request, plus an upgrade request when
/// it has an upgrade priority. Equal priorities keep discovery order
/// (row-major, front line first).
#[must_use]
pub fn compile(table: &LayoutTable) -> Vec<Request> {
    let mut requests = Vec::with_capacity(table.placement_count() * 2);
    for (at, cell) in table.placements() {
        requests.push(Request {
            kind: RequestKind::Spawn,
            unit_type: cell.unit_type,
            at,
            priority: cell.spawn_priority,
        });
        if let Some(priority) = cell.upgrade_priority {
            requests.push(Request {
                kind: RequestKind::Upgrade,
                unit_type: cell.unit_type,
                at,
                priority,
            });
        }
    }
    // `sort_by_key` is stable; tie order is part of the contract.
    requests.sort_by_key(|request| request.priority);
    requests
}
