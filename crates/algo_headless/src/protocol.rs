//! JSON output records of the headless runner.
//!
//! Every command writes JSON lines (one JSON object per line) to stdout:
//!
//! ```text
//! $ algo_headless requests
//! {"type":"request","kind":"spawn","unit_type":"Filter","at":[0,13],"priority":0}
//! ...
//! $ algo_headless plan --board board.ron
//! {"type":"turn","turn":3,"posture":"attack",...}
//! {"type":"action","turn":3,"action":{"action":"spawn","unit_type":"Filter","at":[13,13]}}
//! $ algo_headless frames < frames.jsonl
//! {"type":"scored_on","frame":0,"added":1,"total":1}
//! ```

use algo_core::combat::PathOutcome;
use algo_core::grid::GridCoordinate;
use algo_core::layout::{Request, RequestKind};
use algo_core::sandbox::CommittedAction;
use algo_core::strategy::TurnSummary;
use algo_core::units::UnitType;
use serde::{Deserialize, Serialize};

/// Records written by the headless runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// One compiled build request.
    Request {
        /// Spawn or upgrade.
        kind: RequestKind,
        /// Structure concerned.
        unit_type: UnitType,
        /// Target cell.
        at: GridCoordinate,
        /// Ordering key.
        priority: u32,
    },

    /// Summary of a planned turn.
    Turn(TurnSummary),

    /// One action submitted by a planned turn.
    Action {
        /// Turn the action belongs to.
        turn: u32,
        /// Committed action.
        action: CommittedAction,
    },

    /// Simulated walk from a deploy location.
    Outcome {
        /// Deploy location.
        at: GridCoordinate,
        /// Mobile unit simulated.
        unit_type: UnitType,
        /// Group size.
        troops: u32,
        /// Aggregate result.
        outcome: PathOutcome,
        /// Engine-facing `[damage, walls, defender damage, breaches]`.
        tuple: (f64, u32, f64, i64),
    },

    /// Opponent breaches recorded from one action frame.
    ScoredOn {
        /// Zero-based line number of the frame.
        frame: usize,
        /// Locations added by this frame.
        added: usize,
        /// Locations recorded so far.
        total: usize,
    },

    /// Error processing input.
    Error {
        /// What went wrong.
        message: String,
        /// Zero-based input line, when the error is tied to one.
        #[serde(skip_serializing_if = "Option::is_none")]
        line: Option<usize>,
    },
}

impl Response {
    /// Create an error response.
    pub fn error(message: impl Into<String>, line: Option<usize>) -> Self {
        Self::Error {
            message: message.into(),
            line,
        }
    }

    /// Create a simulation response.
    #[must_use]
    pub fn outcome(
        at: GridCoordinate,
        unit_type: UnitType,
        troops: u32,
        outcome: PathOutcome,
    ) -> Self {
        let (damage, walls, defender_damage, breaches) = outcome.as_tuple();
        Self::Outcome {
            at,
            unit_type,
            troops,
            outcome,
            tuple: (damage.to_num(), walls, defender_damage.to_num(), breaches),
        }
    }

    /// Serialize to JSON line (with newline).
    #[must_use]
    pub fn to_json_line(&self) -> String {
        let mut json = serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"type":"error","message":"Serialization failed: {e}"}}"#)
        });
        json.push('\n');
        json
    }
}

impl From<&Request> for Response {
    fn from(request: &Request) -> Self {
        Self::Request {
            kind: request.kind,
            unit_type: request.unit_type,
            at: request.at,
            priority: request.priority,
        }
    }
}
