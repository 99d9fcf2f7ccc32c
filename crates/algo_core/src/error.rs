//! Error types for the planning core.

use thiserror::Error;

/// Result type alias using [`AlgoError`].
pub type Result<T> = std::result::Result<T, AlgoError>;

/// Top-level error type for all planning core errors.
///
/// Normal game outcomes (illegal placement, halted plans, destroyed troops,
/// unreachable edges) are never errors; only malformed input is.
#[derive(Debug, Error)]
pub enum AlgoError {
    /// Layout table does not fit the own half of the arena.
    #[error("Invalid layout: {rows} rows x {columns} columns exceeds {max_rows} x {max_columns}")]
    InvalidLayout {
        /// Number of rows in the rejected table.
        rows: usize,
        /// Widest row in the rejected table.
        columns: usize,
        /// Maximum supported rows.
        max_rows: usize,
        /// Maximum supported columns.
        max_columns: usize,
    },

    /// Engine configuration lacks an entry for a unit type.
    #[error("Engine config is missing unit information at index {0}")]
    MissingUnitInformation(usize),

    /// Unit shorthand not present in the catalog.
    #[error("Unknown unit shorthand: {0}")]
    UnknownUnit(String),

    /// Failed to parse engine configuration JSON.
    #[error("Failed to parse engine config: {0}")]
    EngineConfig(#[source] serde_json::Error),

    /// Failed to parse an action frame.
    #[error("Failed to parse action frame: {0}")]
    ActionFrame(#[source] serde_json::Error),

    /// Failed to parse a RON configuration string.
    #[error("Failed to parse strategy config: {0}")]
    StrategyConfig(#[from] ron::error::SpannedError),
}
