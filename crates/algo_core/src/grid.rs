//! Arena geometry: grid coordinates, players and boundary edges.
//!
//! The arena is a 28 x 28 diamond. The own half is `y < 14`, the opponent
//! half `y >= 14`. Mobile units deploy from one of the two bottom edges of
//! their half and score by reaching one of the two edges on the far side.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::math::Fixed;

/// Width and height of the arena in cells.
pub const ARENA_SIZE: i32 = 28;

/// Number of rows in each player's half.
pub const HALF_ARENA: i32 = ARENA_SIZE / 2;

/// Integer cell position on the arena grid.
///
/// Serialized as a two-element tuple (`[x, y]` in JSON, `(x, y)` in RON) to
/// match the engine's wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "(i32, i32)", into = "(i32, i32)")]
pub struct GridCoordinate {
    /// Column, growing to the right.
    pub x: i32,
    /// Row, growing towards the opponent.
    pub y: i32,
}

impl GridCoordinate {
    /// Create a new coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance in cells.
    #[must_use]
    pub const fn distance_squared(self, other: Self) -> i32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Whether `other` lies within `radius` cells of this coordinate.
    #[must_use]
    pub fn within(self, other: Self, radius: Fixed) -> bool {
        if radius < Fixed::ZERO {
            return false;
        }
        Fixed::saturating_from_num(self.distance_squared(other)) <= radius.saturating_mul(radius)
    }

    /// Whether this coordinate lies inside the diamond-shaped arena.
    #[must_use]
    pub const fn in_arena(self) -> bool {
        if self.y < 0 || self.y >= ARENA_SIZE {
            return false;
        }
        let row_size = if self.y < HALF_ARENA {
            self.y + 1
        } else {
            ARENA_SIZE - self.y
        };
        let start_x = HALF_ARENA - row_size;
        let end_x = start_x + 2 * row_size - 1;
        self.x >= start_x && self.x <= end_x
    }

    /// Which player's half contains this coordinate.
    #[must_use]
    pub const fn half(self) -> Player {
        if self.y < HALF_ARENA {
            Player::Own
        } else {
            Player::Opponent
        }
    }
}

impl From<(i32, i32)> for GridCoordinate {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

impl From<GridCoordinate> for (i32, i32) {
    fn from(coordinate: GridCoordinate) -> Self {
        (coordinate.x, coordinate.y)
    }
}

impl fmt::Display for GridCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.x, self.y)
    }
}

/// Player identity from this agent's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Player {
    /// This agent (engine player index 0).
    #[default]
    Own,
    /// The opponent (engine player index 1).
    Opponent,
}

impl Player {
    /// Engine player index.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Own => 0,
            Self::Opponent => 1,
        }
    }

    /// The other player.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Own => Self::Opponent,
            Self::Opponent => Self::Own,
        }
    }
}

/// The four diagonal edges of the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    /// Opponent-side edge on the right.
    TopRight,
    /// Opponent-side edge on the left.
    TopLeft,
    /// Own-side edge on the left.
    BottomLeft,
    /// Own-side edge on the right.
    BottomRight,
}

impl Edge {
    /// All cells on this edge, ordered from the centre outwards.
    #[must_use]
    pub fn cells(self) -> Vec<GridCoordinate> {
        (0..HALF_ARENA)
            .map(|n| match self {
                Self::TopRight => GridCoordinate::new(HALF_ARENA + n, ARENA_SIZE - 1 - n),
                Self::TopLeft => GridCoordinate::new(HALF_ARENA - 1 - n, ARENA_SIZE - 1 - n),
                Self::BottomLeft => GridCoordinate::new(HALF_ARENA - 1 - n, n),
                Self::BottomRight => GridCoordinate::new(HALF_ARENA + n, n),
            })
            .collect()
    }

    /// The two edges a player's mobile units deploy from.
    #[must_use]
    pub const fn deploy_edges(player: Player) -> [Self; 2] {
        match player {
            Player::Own => [Self::BottomLeft, Self::BottomRight],
            Player::Opponent => [Self::TopLeft, Self::TopRight],
        }
    }
}

/// The pair of edge sets a mobile unit can score on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoundaryEdges {
    /// Left-hand scoring edge.
    pub left: HashSet<GridCoordinate>,
    /// Right-hand scoring edge.
    pub right: HashSet<GridCoordinate>,
}

impl BoundaryEdges {
    /// Create boundary edges from explicit cell sets.
    #[must_use]
    pub fn new(
        left: impl IntoIterator<Item = GridCoordinate>,
        right: impl IntoIterator<Item = GridCoordinate>,
    ) -> Self {
        Self {
            left: left.into_iter().collect(),
            right: right.into_iter().collect(),
        }
    }

    /// Scoring edges for units deployed by `player`.
    #[must_use]
    pub fn scoring_for(player: Player) -> Self {
        let [left, right] = Edge::deploy_edges(player.opponent());
        Self::new(left.cells(), right.cells())
    }

    /// Whether the coordinate belongs to either edge set.
    #[must_use]
    pub fn contains(&self, coordinate: GridCoordinate) -> bool {
        self.left.contains(&coordinate) || self.right.contains(&coordinate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arena_diamond_bounds() {
        assert!(GridCoordinate::new(13, 0).in_arena());
        assert!(GridCoordinate::new(14, 0).in_arena());
        assert!(!GridCoordinate::new(12, 0).in_arena());
        assert!(GridCoordinate::new(0, 13).in_arena());
        assert!(GridCoordinate::new(27, 14).in_arena());
        assert!(!GridCoordinate::new(0, 27).in_arena());
        assert!(!GridCoordinate::new(14, 28).in_arena());
    }

    #[test]
    fn test_edges_lie_in_arena() {
        for edge in [Edge::TopRight, Edge::TopLeft, Edge::BottomLeft, Edge::BottomRight] {
            let cells = edge.cells();
            assert_eq!(cells.len(), HALF_ARENA as usize);
            assert!(cells.iter().all(|c| c.in_arena()), "{edge:?} leaves arena");
        }
    }

    #[test]
    fn test_scoring_edges_are_opponent_side() {
        let edges = BoundaryEdges::scoring_for(Player::Own);
        assert!(edges.contains(GridCoordinate::new(14, 27)));
        assert!(edges.contains(GridCoordinate::new(0, 14)));
        assert!(!edges.contains(GridCoordinate::new(13, 0)));
    }

    #[test]
    fn test_within_radius() {
        let origin = GridCoordinate::new(5, 5);
        assert!(origin.within(GridCoordinate::new(5, 5), Fixed::ZERO));
        assert!(!origin.within(GridCoordinate::new(6, 5), Fixed::ZERO));
        assert!(origin.within(GridCoordinate::new(7, 7), Fixed::from_num(3)));
        assert!(!origin.within(GridCoordinate::new(8, 8), Fixed::from_num(3.5)));
    }

    #[test]
    fn test_coordinate_serializes_as_pair() {
        let json = serde_json::to_string(&GridCoordinate::new(5, 8)).expect("serializable");
        assert_eq!(json, "[5,8]");
        let parsed: GridCoordinate = serde_json::from_str("[14, 0]").expect("valid pair");
        assert_eq!(parsed, GridCoordinate::new(14, 0));
    }
}
