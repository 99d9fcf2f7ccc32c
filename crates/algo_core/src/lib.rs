//! # Algo Core
//!
//! Deterministic turn planning for a two-player tower-defense agent.
//!
//! This crate contains **only** planning logic:
//! - No IO beyond parsing strings handed to it
//! - No system randomness
//! - No floating-point math (uses fixed-point)
//!
//! The live game engine is reached through the [`engine::GameEngine`] trait;
//! [`sandbox::SandboxEngine`] implements it in memory for offline runs.
//!
//! ## Crate Structure
//!
//! - [`layout`] - Placement tables and their compilation into build requests
//! - [`planner`] - Greedy replay of build requests under a resource floor
//! - [`combat`] - What-if simulation of a troop group walking its path
//! - [`strategy`] - Per-turn decision policy
//! - [`action_frame`] - Breach bookkeeping from action frames
//! - [`math`] - Fixed-point math utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod action_frame;
pub mod combat;
pub mod engine;
pub mod error;
pub mod grid;
pub mod layout;
pub mod math;
pub mod planner;
pub mod sandbox;
pub mod strategy;
pub mod units;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::action_frame::ScoredOnLog;
    pub use crate::combat::{CombatSimulator, PathOutcome};
    pub use crate::engine::GameEngine;
    pub use crate::error::{AlgoError, Result};
    pub use crate::grid::{BoundaryEdges, Edge, GridCoordinate, Player};
    pub use crate::layout::{compile, LayoutTable, PlacementCell, Request, RequestKind};
    pub use crate::math::Fixed;
    pub use crate::planner::{BuildPlanner, HaltReason, PlanReport};
    pub use crate::sandbox::{CommittedAction, Purse, SandboxEngine};
    pub use crate::strategy::{Agent, StrategyConfig, TurnPosture, TurnSummary};
    pub use crate::units::{ResourceKind, UnitCatalog, UnitSnapshot, UnitType};
}
