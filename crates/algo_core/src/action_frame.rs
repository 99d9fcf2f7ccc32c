//! Bookkeeping of where the opponent scored, from engine action frames.
//!
//! Action frames arrive many times per turn as JSON documents. Only the
//! `events.breach` list is read; each entry is
//! `[location, damage, unit_type, unit_id, owner]` where `owner` is `1` for
//! this agent and `2` for the opponent.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AlgoError, Result};
use crate::grid::GridCoordinate;

/// Owner value the engine uses for this agent's units inside action frames.
pub const SELF_OWNER: u8 = 1;

/// One breach event: `[location, damage, unit_type, unit_id, owner]`.
type BreachEvent = (GridCoordinate, f64, Value, Value, u8);

#[derive(Debug, Deserialize)]
struct ActionFrame {
    #[serde(default)]
    events: FrameEvents,
}

#[derive(Debug, Default, Deserialize)]
struct FrameEvents {
    #[serde(default)]
    breach: Vec<BreachEvent>,
}

/// Locations where opponent units reached this agent's edge, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredOnLog {
    locations: Vec<GridCoordinate>,
}

impl ScoredOnLog {
    /// Empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse one action frame and record its opponent breaches.
    ///
    /// Returns how many locations were added.
    pub fn record_frame(&mut self, frame: &str) -> Result<usize> {
        let frame: ActionFrame = serde_json::from_str(frame).map_err(AlgoError::ActionFrame)?;
        let before = self.locations.len();
        self.locations.extend(
            frame
                .events
                .breach
                .into_iter()
                .filter(|(_, _, _, _, owner)| *owner != SELF_OWNER)
                .map(|(location, ..)| location),
        );
        Ok(self.locations.len() - before)
    }

    /// Every recorded location, duplicates included.
    #[must_use]
    pub fn locations(&self) -> &[GridCoordinate] {
        &self.locations
    }

    /// How often the opponent scored at `at`.
    #[must_use]
    pub fn times_scored_at(&self, at: GridCoordinate) -> usize {
        self.locations.iter().filter(|&&location| location == at).count()
    }
}
