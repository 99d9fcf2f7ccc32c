//! Unit types, per-type statistics and unit snapshots.
//!
//! The engine announces its unit roster once, at game start, as the
//! `unitInformation` array of its configuration. [`UnitCatalog`] captures that
//! roster and is threaded explicitly through the planner, the simulator and
//! the strategy.

use serde::{Deserialize, Serialize};

use crate::error::{AlgoError, Result};
use crate::grid::{GridCoordinate, Player};
use crate::math::{fixed_serde, Fixed};

/// Every unit type the engine knows about, in engine config order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UnitType {
    /// Cheap removable wall.
    Filter,
    /// Support structure that shields friendly mobile units.
    Encryptor,
    /// Heavy defensive turret.
    Destructor,
    /// Fast mobile attacker.
    Ping,
    /// Long-range mobile demolisher.
    Emp,
    /// Mobile interceptor that only attacks other mobile units.
    Scrambler,
}

impl UnitType {
    /// All unit types in engine config order.
    pub const ALL: [Self; 6] = [
        Self::Filter,
        Self::Encryptor,
        Self::Destructor,
        Self::Ping,
        Self::Emp,
        Self::Scrambler,
    ];

    /// Index into the engine's `unitInformation` array.
    #[must_use]
    pub const fn config_index(self) -> usize {
        match self {
            Self::Filter => 0,
            Self::Encryptor => 1,
            Self::Destructor => 2,
            Self::Ping => 3,
            Self::Emp => 4,
            Self::Scrambler => 5,
        }
    }

    /// Whether this type is a stationary structure (paid with cores).
    #[must_use]
    pub const fn is_stationary(self) -> bool {
        matches!(self, Self::Filter | Self::Encryptor | Self::Destructor)
    }

    /// Removable wall type counted by the path simulator.
    #[must_use]
    pub const fn is_removable_wall(self) -> bool {
        matches!(self, Self::Filter)
    }

    /// Heavy defender type whose damage the path simulator accumulates.
    #[must_use]
    pub const fn is_heavy_defender(self) -> bool {
        matches!(self, Self::Destructor)
    }
}

/// Resource pool used to pay for units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    /// Structure resource.
    Cores,
    /// Mobile unit resource.
    Bits,
}

impl UnitType {
    /// Resource pool this unit type is paid from.
    #[must_use]
    pub const fn cost_resource(self) -> ResourceKind {
        if self.is_stationary() {
            ResourceKind::Cores
        } else {
            ResourceKind::Bits
        }
    }
}

/// Static statistics of a unit type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitStats {
    /// Engine shorthand identifier (e.g. `"FF"`).
    pub shorthand: String,
    /// Cost in the unit's resource pool.
    #[serde(with = "fixed_serde")]
    pub cost: Fixed,
    /// Additional cost to upgrade a placed structure.
    #[serde(with = "fixed_serde")]
    pub upgrade_cost: Fixed,
    /// Starting (and maximum) health.
    #[serde(with = "fixed_serde")]
    pub max_health: Fixed,
    /// Damage per frame against structures.
    #[serde(with = "fixed_serde")]
    pub damage_to_structure: Fixed,
    /// Damage per frame against mobile units.
    #[serde(with = "fixed_serde")]
    pub damage_to_unit: Fixed,
    /// Attack radius in cells.
    #[serde(with = "fixed_serde")]
    pub range: Fixed,
    /// Frames spent in each cell while moving (always at least 1).
    pub frames_per_cell: u32,
}

impl UnitStats {
    fn new(shorthand: &str, cost: i32, max_health: i32, to_structure: i32, to_unit: i32) -> Self {
        Self {
            shorthand: shorthand.to_string(),
            cost: Fixed::from_num(cost),
            upgrade_cost: Fixed::ZERO,
            max_health: Fixed::from_num(max_health),
            damage_to_structure: Fixed::from_num(to_structure),
            damage_to_unit: Fixed::from_num(to_unit),
            range: Fixed::ZERO,
            frames_per_cell: 1,
        }
    }

    fn with_range(mut self, range: f64) -> Self {
        self.range = Fixed::from_num(range);
        self
    }

    fn with_upgrade_cost(mut self, upgrade_cost: i32) -> Self {
        self.upgrade_cost = Fixed::from_num(upgrade_cost);
        self
    }

    fn with_frames_per_cell(mut self, frames: u32) -> Self {
        self.frames_per_cell = frames.max(1);
        self
    }
}

/// Per-type statistics for the whole roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitCatalog {
    stats: [UnitStats; 6],
}

impl Default for UnitCatalog {
    /// Season defaults of the engine, used when no config is supplied.
    fn default() -> Self {
        Self {
            stats: [
                UnitStats::new("FF", 1, 60, 0, 0).with_upgrade_cost(1),
                UnitStats::new("EF", 4, 30, 0, 0)
                    .with_range(3.5)
                    .with_upgrade_cost(4),
                UnitStats::new("DF", 6, 75, 0, 16)
                    .with_range(3.5)
                    .with_upgrade_cost(6),
                UnitStats::new("PI", 1, 15, 2, 2)
                    .with_range(3.5)
                    .with_frames_per_cell(1),
                UnitStats::new("EI", 3, 5, 8, 8)
                    .with_range(4.5)
                    .with_frames_per_cell(2),
                UnitStats::new("SI", 1, 40, 0, 20)
                    .with_range(4.5)
                    .with_frames_per_cell(4),
            ],
        }
    }
}

/// Subset of one `unitInformation` entry in the engine config.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UnitInformation {
    shorthand: String,
    #[serde(default)]
    cost1: f64,
    #[serde(default)]
    cost2: f64,
    #[serde(default)]
    start_health: f64,
    #[serde(default)]
    attack_damage_tower: f64,
    #[serde(default)]
    attack_damage_walker: f64,
    #[serde(default)]
    attack_range: f64,
    #[serde(default)]
    speed: f64,
    #[serde(default)]
    upgrade: Option<UpgradeInformation>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpgradeInformation {
    #[serde(default)]
    cost1: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EngineConfig {
    unit_information: Vec<UnitInformation>,
}

fn to_fixed(value: f64) -> Fixed {
    Fixed::saturating_from_num(if value.is_finite() { value } else { 0.0 })
}

impl UnitInformation {
    fn into_stats(self) -> UnitStats {
        // The engine reports speed in cells per frame; a stationary or
        // unknown speed dwells one frame per cell.
        let frames_per_cell = if self.speed > 0.0 && self.speed.is_finite() {
            (1.0 / self.speed).ceil().max(1.0) as u32
        } else {
            1
        };
        UnitStats {
            shorthand: self.shorthand,
            cost: to_fixed(self.cost1.max(self.cost2)),
            upgrade_cost: to_fixed(self.upgrade.and_then(|u| u.cost1).unwrap_or(0.0)),
            max_health: to_fixed(self.start_health),
            damage_to_structure: to_fixed(self.attack_damage_tower),
            damage_to_unit: to_fixed(self.attack_damage_walker),
            range: to_fixed(self.attack_range),
            frames_per_cell,
        }
    }
}

impl UnitCatalog {
    /// Build the catalog from the engine's JSON configuration.
    ///
    /// Only `unitInformation` is read; entries map to [`UnitType::ALL`] by
    /// position.
    pub fn from_engine_config(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json).map_err(AlgoError::EngineConfig)?;
        let mut entries = config.unit_information.into_iter();
        let mut take = |index: usize| {
            entries
                .next()
                .map(UnitInformation::into_stats)
                .ok_or(AlgoError::MissingUnitInformation(index))
        };
        Ok(Self {
            stats: [take(0)?, take(1)?, take(2)?, take(3)?, take(4)?, take(5)?],
        })
    }

    /// Statistics for a unit type.
    #[must_use]
    pub fn stats(&self, unit_type: UnitType) -> &UnitStats {
        &self.stats[unit_type.config_index()]
    }

    /// Mutable statistics, for tuning scenarios.
    pub fn stats_mut(&mut self, unit_type: UnitType) -> &mut UnitStats {
        &mut self.stats[unit_type.config_index()]
    }

    /// Engine shorthand for a unit type.
    #[must_use]
    pub fn shorthand(&self, unit_type: UnitType) -> &str {
        &self.stats(unit_type).shorthand
    }

    /// Resolve an engine shorthand back to a unit type.
    pub fn by_shorthand(&self, shorthand: &str) -> Result<UnitType> {
        UnitType::ALL
            .into_iter()
            .find(|&unit_type| self.shorthand(unit_type) == shorthand)
            .ok_or_else(|| AlgoError::UnknownUnit(shorthand.to_string()))
    }

    /// Fresh, full-health snapshot of a unit of `unit_type`.
    #[must_use]
    pub fn snapshot(
        &self,
        unit_type: UnitType,
        owner: Player,
        position: GridCoordinate,
    ) -> UnitSnapshot {
        let stats = self.stats(unit_type);
        UnitSnapshot {
            unit_type,
            position,
            owner,
            health: stats.max_health,
            max_health: stats.max_health,
            damage_to_structure: stats.damage_to_structure,
            damage_to_unit: stats.damage_to_unit,
            range: stats.range,
            speed: stats.frames_per_cell.max(1),
            upgraded: false,
        }
    }
}

/// Point-in-time view of one unit on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitSnapshot {
    /// Unit type.
    pub unit_type: UnitType,
    /// Cell the unit occupies.
    pub position: GridCoordinate,
    /// Owning player.
    pub owner: Player,
    /// Current health.
    #[serde(with = "fixed_serde")]
    pub health: Fixed,
    /// Maximum health.
    #[serde(with = "fixed_serde")]
    pub max_health: Fixed,
    /// Damage per frame against structures.
    #[serde(with = "fixed_serde")]
    pub damage_to_structure: Fixed,
    /// Damage per frame against mobile units.
    #[serde(with = "fixed_serde")]
    pub damage_to_unit: Fixed,
    /// Attack radius in cells.
    #[serde(with = "fixed_serde")]
    pub range: Fixed,
    /// Frames per cell while moving.
    pub speed: u32,
    /// Whether the structure has been upgraded.
    #[serde(default)]
    pub upgraded: bool,
}
