//! Board scenario loading and configuration.
//!
//! A board scenario describes one turn snapshot for offline planning: balances
//! of both players, the structures on the board and the projected paths of
//! deploy locations the agent may consider. Scenarios are RON files and are
//! turned into a [`SandboxEngine`].

use std::path::Path;

use algo_core::error::AlgoError;
use algo_core::grid::{GridCoordinate, Player};
use algo_core::math::Fixed;
use algo_core::sandbox::{Purse, SandboxEngine};
use algo_core::strategy::StrategyConfig;
use algo_core::units::{UnitCatalog, UnitType};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Error type for scenario and configuration loading.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// File not found.
    #[error("Scenario file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read scenario file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse scenario: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// A structure could not be placed on the board.
    #[error("Cannot place {unit:?} at {at}: outside the arena or occupied")]
    InvalidPlacement {
        /// Structure type.
        unit: UnitType,
        /// Requested cell.
        at: GridCoordinate,
    },
    /// A path entry has no cells.
    #[error("Path #{0} is empty")]
    EmptyPath(usize),
    /// Core configuration error.
    #[error(transparent)]
    Core(#[from] AlgoError),
}

/// Structure present on the board at scenario start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructurePlacement {
    /// Structure type.
    pub unit: UnitType,
    /// Cell it occupies.
    pub at: GridCoordinate,
    /// Owning player.
    #[serde(default)]
    pub owner: Player,
    /// Current health, full health when absent.
    #[serde(default, skip_serializing_if = "Option::is_none", with = "optional_fixed")]
    pub health: Option<Fixed>,
}

/// One turn snapshot for offline planning.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardScenario {
    /// Scenario name.
    pub name: String,
    /// Turn number.
    pub turn: u32,
    /// Own balances.
    pub own: Purse,
    /// Opponent balances.
    pub opponent: Purse,
    /// Structures on the board.
    pub structures: Vec<StructurePlacement>,
    /// Projected paths; each is keyed by its first cell.
    pub paths: Vec<Vec<GridCoordinate>>,
}

impl BoardScenario {
    /// Load a scenario from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let contents = read_existing(path.as_ref())?;
        Self::from_ron_str(&contents)
    }

    /// Load from a RON string.
    pub fn from_ron_str(ron: &str) -> Result<Self, ScenarioError> {
        let scenario: BoardScenario = ron::from_str(ron)?;
        Ok(scenario)
    }

    /// Build the in-memory engine for this snapshot.
    pub fn to_sandbox(&self, catalog: UnitCatalog) -> Result<SandboxEngine, ScenarioError> {
        let mut engine = SandboxEngine::new(catalog);
        engine.set_turn(self.turn);
        engine.set_purse(Player::Own, self.own);
        engine.set_purse(Player::Opponent, self.opponent);

        for structure in &self.structures {
            if !engine.place_structure(structure.unit, structure.at, structure.owner) {
                return Err(ScenarioError::InvalidPlacement {
                    unit: structure.unit,
                    at: structure.at,
                });
            }
            if let Some(health) = structure.health {
                let _ = engine.set_structure_health(structure.at, health);
            }
        }

        for (index, path) in self.paths.iter().enumerate() {
            let start = *path.first().ok_or(ScenarioError::EmptyPath(index))?;
            engine.set_path(start, path.clone());
        }

        debug!(
            name = %self.name,
            structures = self.structures.len(),
            paths = self.paths.len(),
            "Board scenario loaded"
        );
        Ok(engine)
    }
}

/// Load a strategy configuration from a RON file.
pub fn load_strategy<P: AsRef<Path>>(path: P) -> Result<StrategyConfig, ScenarioError> {
    let contents = read_existing(path.as_ref())?;
    Ok(StrategyConfig::from_ron_str(&contents)?)
}

/// Load unit statistics from an engine configuration JSON file.
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<UnitCatalog, ScenarioError> {
    let contents = read_existing(path.as_ref())?;
    Ok(UnitCatalog::from_engine_config(&contents)?)
}

fn read_existing(path: &Path) -> Result<String, ScenarioError> {
    if !path.exists() {
        return Err(ScenarioError::FileNotFound(path.display().to_string()));
    }
    Ok(std::fs::read_to_string(path)?)
}

mod optional_fixed {
    use algo_core::math::{fixed_serde, Fixed};
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(transparent)]
    struct Wrapped(#[serde(with = "fixed_serde")] Fixed);

    pub fn serialize<S: Serializer>(
        value: &Option<Fixed>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(value) => fixed_serde::serialize(value, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Fixed>, D::Error> {
        Ok(Option::<Wrapped>::deserialize(deserializer)?.map(|Wrapped(value)| value))
    }
}
