//! # Game Module
//!
//! Core game state, entities, combat and turn sequencing.
//!
//! This module contains the fundamental building blocks of the crawler:
//! - Grid positions and directions
//! - The warrior and monster entities with their stat model
//! - Fog of war, combat resolution and experience
//! - The turn processor that sequences one round of play

pub mod combat;
pub mod entities;
pub mod experience;
pub mod fog;
pub mod items;
pub mod monsters;
pub mod skills;
pub mod state;
pub mod turn;
pub mod world;

pub use combat::*;
pub use entities::*;
pub use experience::*;
pub use fog::*;
pub use items::*;
pub use monsters::*;
pub use skills::*;
pub use state::*;
pub use turn::*;
pub use world::*;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a 2D tile coordinate in the game world.
///
/// Tile coordinates are authoritative; pixel positions are always derived.
///
/// # Examples
///
/// ```
/// use cairn::Position;
///
/// let pos = Position::new(10, 5);
/// assert_eq!(pos.x, 10);
/// assert_eq!(pos.y, 5);
///
/// let adjacent = pos.adjacent_positions();
/// assert_eq!(adjacent.len(), 8); // All 8 surrounding positions
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Creates a new position with the given coordinates.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the origin position (0, 0).
    pub fn origin() -> Self {
        Self::new(0, 0)
    }

    /// Calculates the Chebyshev distance to another position.
    ///
    /// This is the grid distance used for visibility, chase range and
    /// attack range alike, so diagonal neighbours are at distance 1.
    ///
    /// # Examples
    ///
    /// ```
    /// use cairn::Position;
    ///
    /// let pos1 = Position::new(0, 0);
    /// assert_eq!(pos1.chebyshev_distance(Position::new(3, 4)), 4);
    /// assert_eq!(pos1.chebyshev_distance(Position::new(1, 1)), 1);
    /// ```
    pub fn chebyshev_distance(self, other: Position) -> u32 {
        (self.x - other.x)
            .unsigned_abs()
            .max((self.y - other.y).unsigned_abs())
    }

    /// Returns all 8 adjacent positions (including diagonals).
    pub fn adjacent_positions(self) -> Vec<Position> {
        Direction::all()
            .into_iter()
            .map(|direction| self + direction.to_delta())
            .collect()
    }

    /// Returns only the 4 orthogonal neighbours, used for flood fills.
    pub fn cardinal_adjacent_positions(self) -> Vec<Position> {
        vec![
            Position::new(self.x, self.y - 1),
            Position::new(self.x, self.y + 1),
            Position::new(self.x + 1, self.y),
            Position::new(self.x - 1, self.y),
        ]
    }
}

impl std::ops::Add for Position {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl std::ops::Sub for Position {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Directions for movement and orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
    Northeast,
    Northwest,
    Southeast,
    Southwest,
}

impl Direction {
    /// Converts a direction to a position delta.
    ///
    /// # Examples
    ///
    /// ```
    /// use cairn::{Direction, Position};
    ///
    /// let delta = Direction::North.to_delta();
    /// assert_eq!(delta, Position::new(0, -1));
    /// ```
    pub fn to_delta(self) -> Position {
        match self {
            Direction::North => Position::new(0, -1),
            Direction::South => Position::new(0, 1),
            Direction::East => Position::new(1, 0),
            Direction::West => Position::new(-1, 0),
            Direction::Northeast => Position::new(1, -1),
            Direction::Northwest => Position::new(-1, -1),
            Direction::Southeast => Position::new(1, 1),
            Direction::Southwest => Position::new(-1, 1),
        }
    }

    /// Converts a position delta to a direction.
    ///
    /// Returns None if the delta doesn't correspond to a valid direction.
    pub fn from_delta(delta: Position) -> Option<Direction> {
        match (delta.x, delta.y) {
            (0, -1) => Some(Direction::North),
            (0, 1) => Some(Direction::South),
            (1, 0) => Some(Direction::East),
            (-1, 0) => Some(Direction::West),
            (1, -1) => Some(Direction::Northeast),
            (-1, -1) => Some(Direction::Northwest),
            (1, 1) => Some(Direction::Southeast),
            (-1, 1) => Some(Direction::Southwest),
            _ => None,
        }
    }

    /// Returns the single step that brings `from` closest to `to`.
    ///
    /// Each axis moves by at most one tile. Returns None when the positions
    /// are equal.
    pub fn toward(from: Position, to: Position) -> Option<Direction> {
        let delta = to - from;
        Direction::from_delta(Position::new(delta.x.signum(), delta.y.signum()))
    }

    /// Returns all 8 directions.
    pub fn all() -> Vec<Direction> {
        vec![
            Direction::North,
            Direction::South,
            Direction::East,
            Direction::West,
            Direction::Northeast,
            Direction::Northwest,
            Direction::Southeast,
            Direction::Southwest,
        ]
    }
}

/// Unique identifier for game entities.
pub type EntityId = Uuid;

/// Creates a new unique entity ID.
pub fn new_entity_id() -> EntityId {
    Uuid::new_v4()
}
