//! Greedy, single-pass execution of compiled build requests.
//!
//! The planner walks the priority-ordered request list once per call. Before
//! each request it checks the own cores balance against the resource floor
//! and the request priority against the optional ceiling; the first failed
//! check ends the call. Later requests are not attempted even when they would
//! be affordable or inside the ceiling on their own. The next turn replays
//! the whole list from the start.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::engine::GameEngine;
use crate::grid::Player;
use crate::layout::{Request, RequestKind};
use crate::math::Fixed;
use crate::units::ResourceKind;

/// Default number of cores kept in reserve.
pub const DEFAULT_RESOURCE_FLOOR: Fixed = Fixed::const_from_int(1);

/// Why a planner call stopped before the end of the request list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HaltReason {
    /// Cores dropped below the resource floor.
    ResourceFloor,
    /// The next request exceeded the priority ceiling.
    PriorityCeiling,
}

/// Summary of one planner call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanReport {
    /// Spawns committed.
    pub spawned: u32,
    /// Upgrades handed to the engine (the engine may have no-oped them).
    pub upgrades_attempted: u32,
    /// Spawn requests skipped as illegal or unaffordable.
    pub skipped: u32,
    /// Set when the call stopped early.
    pub halted: Option<HaltReason>,
    /// Index of the first request not attempted when halted.
    pub halted_at: Option<usize>,
}

impl PlanReport {
    /// Total requests looked at before halting or finishing.
    #[must_use]
    pub const fn processed(&self) -> u32 {
        self.spawned + self.upgrades_attempted + self.skipped
    }
}

/// Replays build requests against the live engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildPlanner {
    resource_floor: Fixed,
}

impl Default for BuildPlanner {
    fn default() -> Self {
        Self::new(DEFAULT_RESOURCE_FLOOR)
    }
}

impl BuildPlanner {
    /// Create a planner keeping at least `resource_floor` cores in reserve.
    #[must_use]
    pub const fn new(resource_floor: Fixed) -> Self {
        Self { resource_floor }
    }

    /// Cores that must remain before any further action is committed.
    #[must_use]
    pub const fn resource_floor(&self) -> Fixed {
        self.resource_floor
    }

    /// Commit as many requests as the floor and ceiling allow, in order.
    ///
    /// `max_priority` of `None` means no ceiling. Upgrades are committed
    /// unconditionally; the engine rejects illegal ones.
    pub fn complete_requests<E: GameEngine + ?Sized>(
        &self,
        engine: &mut E,
        requests: &[Request],
        max_priority: Option<u32>,
    ) -> PlanReport {
        let mut report = PlanReport::default();

        for (index, request) in requests.iter().enumerate() {
            let cores = engine.resource(ResourceKind::Cores, Player::Own);
            let halt = if cores < self.resource_floor {
                Some(HaltReason::ResourceFloor)
            } else if max_priority.is_some_and(|ceiling| request.priority > ceiling) {
                Some(HaltReason::PriorityCeiling)
            } else {
                None
            };

            if let Some(reason) = halt {
                debug!(
                    ?reason,
                    index,
                    priority = request.priority,
                    cores = %cores,
                    remaining = requests.len() - index,
                    "Build plan halted"
                );
                report.halted = Some(reason);
                report.halted_at = Some(index);
                return report;
            }

            match request.kind {
                RequestKind::Spawn => {
                    if engine.can_spawn(request.unit_type, request.at)
                        && engine.attempt_spawn(request.unit_type, request.at)
                    {
                        report.spawned += 1;
                        trace!(
                            unit = ?request.unit_type,
                            at = %request.at,
                            cores_left = %engine.resource(ResourceKind::Cores, Player::Own),
                            "Spawned structure"
                        );
                    } else {
                        report.skipped += 1;
                    }
                }
                RequestKind::Upgrade => {
                    let _ = engine.attempt_upgrade(request.at);
                    report.upgrades_attempted += 1;
                }
            }
        }

        report
    }
}
