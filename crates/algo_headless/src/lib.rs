//! Headless runner for offline planning and CI verification.
//!
//! This crate wraps the planning core in a command-line tool that works on
//! board scenario files instead of a live engine. This enables:
//!
//! - **Layout review**: dump the compiled build requests of a strategy
//! - **Dry runs**: play one agent turn on a sandbox board
//! - **Path checks**: simulate a troop group from a deploy location
//! - **Frame replay**: rebuild the scored-on log from recorded action frames
//!
//! # Output
//!
//! - **stdout**: JSON lines (see [`protocol`])
//! - **stderr**: logs (human-readable)
//!
//! # Example
//!
//! ```bash
//! cargo run -p algo_headless -- requests --strategy strategy.ron
//! cargo run -p algo_headless -- plan --board crates/algo_headless/scenarios/opening.ron
//! cargo run -p algo_headless -- simulate --board board.ron --x 13 --y 0 --unit PI
//! cargo run -p algo_headless -- frames < frames.jsonl
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod protocol;
pub mod runner;
pub mod scenario;

pub use protocol::Response;
pub use scenario::{BoardScenario, ScenarioError};
