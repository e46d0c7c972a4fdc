//! # World Representation
//!
//! Tile maps for dungeons and the overworld, plus the monster spawn points a
//! map is populated from.

use crate::{CairnError, CairnResult, MonsterKind, Position};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a map, e.g. `"overworld"` or `"dungeon_1"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MapId(String);

impl MapId {
    /// Creates a map id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MapId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for MapId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Kinds of terrain a tile can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileType {
    Floor,
    Wall,
    Water,
    Door,
    StairsDown,
    StairsUp,
}

impl TileType {
    /// Whether entities may stand on this tile.
    pub fn is_passable(self) -> bool {
        !matches!(self, TileType::Wall | TileType::Water)
    }

    /// Character used by text dumps and debug output.
    pub fn glyph(self) -> char {
        match self {
            TileType::Floor => '.',
            TileType::Wall => '#',
            TileType::Water => '~',
            TileType::Door => '+',
            TileType::StairsDown => '>',
            TileType::StairsUp => '<',
        }
    }
}

/// A monster placement recorded on a map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnPoint {
    pub kind: MonsterKind,
    pub position: Position,
}

impl SpawnPoint {
    /// Creates a spawn point.
    pub fn new(kind: MonsterKind, position: Position) -> Self {
        Self { kind, position }
    }
}

/// A rectangular tile map.
///
/// # Examples
///
/// ```
/// use cairn::{DungeonMap, Position, TileType};
///
/// let map = DungeonMap::open_room("dungeon_1", 10, 8);
/// assert_eq!(map.get_tile(Position::new(0, 0)), Some(TileType::Wall));
/// assert!(map.is_passable(Position::new(3, 3)));
/// assert!(!map.is_passable(Position::new(20, 20)));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DungeonMap {
    /// Map identifier
    pub id: MapId,
    /// Width in tiles
    pub width: u32,
    /// Height in tiles
    pub height: u32,
    /// Row-major tiles, indexed as `tiles[y][x]`
    pub tiles: Vec<Vec<TileType>>,
    /// Where the warrior appears on entry
    pub player_spawn: Position,
    /// Monsters placed on this map, in spawn order
    pub spawns: Vec<SpawnPoint>,
}

impl DungeonMap {
    /// Creates a map filled entirely with walls.
    pub fn new(id: impl Into<MapId>, width: u32, height: u32) -> Self {
        Self {
            id: id.into(),
            width,
            height,
            tiles: vec![vec![TileType::Wall; width as usize]; height as usize],
            player_spawn: Position::new(1, 1),
            spawns: Vec::new(),
        }
    }

    /// Creates a single open room: floor everywhere except a wall border.
    pub fn open_room(id: impl Into<MapId>, width: u32, height: u32) -> Self {
        let mut map = Self::new(id, width, height);
        for y in 1..height.saturating_sub(1) {
            for x in 1..width.saturating_sub(1) {
                map.tiles[y as usize][x as usize] = TileType::Floor;
            }
        }
        map
    }

    /// Checks whether a position lies inside the map bounds.
    pub fn is_valid_position(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height
    }

    /// Returns the tile at a position, or None when out of bounds.
    pub fn get_tile(&self, pos: Position) -> Option<TileType> {
        if !self.is_valid_position(pos) {
            return None;
        }
        Some(self.tiles[pos.y as usize][pos.x as usize])
    }

    /// Replaces the tile at a position.
    pub fn set_tile(&mut self, pos: Position, tile: TileType) -> CairnResult<()> {
        if !self.is_valid_position(pos) {
            return Err(CairnError::InvalidState(format!(
                "Position {} is outside map {}",
                pos, self.id
            )));
        }
        self.tiles[pos.y as usize][pos.x as usize] = tile;
        Ok(())
    }

    /// Whether an entity may stand at a position. Out-of-bounds is impassable.
    pub fn is_passable(&self, pos: Position) -> bool {
        self.get_tile(pos).is_some_and(TileType::is_passable)
    }

    /// Adds a monster spawn point.
    pub fn add_spawn(&mut self, kind: MonsterKind, position: Position) {
        self.spawns.push(SpawnPoint::new(kind, position));
    }

    /// Iterates over every passable position.
    pub fn passable_positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.height as i32)
            .flat_map(move |y| (0..self.width as i32).map(move |x| Position::new(x, y)))
            .filter(move |pos| self.is_passable(*pos))
    }

    /// Renders the map as text, one row per line.
    pub fn to_ascii(&self) -> String {
        self.tiles
            .iter()
            .map(|row| row.iter().map(|tile| tile.glyph()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
