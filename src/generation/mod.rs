//! # Generation Module
//!
//! Procedural content generation for dungeons, encounters and loot.
//!
//! Dungeon layouts come from [`RoomGenerator`], monster placement from
//! [`EncounterGenerator`], and each monster kind's drops from
//! [`loot_table_for`]. All randomness flows from the seed in
//! [`GenerationConfig`], so the same seed always yields the same dungeon.

pub mod dungeon;
pub mod encounters;
pub mod loot;

pub use dungeon::*;
pub use encounters::*;
pub use loot::*;

use crate::{CairnError, CairnResult, DungeonMap, MapId, Position};
use log::info;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// Configuration for procedural generation.
///
/// Controls map size, room layout and monster density.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Random seed for reproducible generation
    pub seed: u64,
    /// Map width in tiles
    pub map_width: u32,
    /// Map height in tiles
    pub map_height: u32,
    /// Minimum room size, walls included
    pub min_room_size: u32,
    /// Maximum room size, walls included
    pub max_room_size: u32,
    /// Minimum number of rooms per map
    pub min_rooms: u32,
    /// Maximum number of rooms per map
    pub max_rooms: u32,
    /// Probability of extra connections between rooms (0.0 to 1.0)
    pub extra_connection_chance: f64,
    /// Fewest monsters placed in a non-spawn room
    pub min_monsters_per_room: u32,
    /// Most monsters placed in a non-spawn room
    pub max_monsters_per_room: u32,
}

impl GenerationConfig {
    /// Creates a default generation configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use cairn::GenerationConfig;
    ///
    /// let config = GenerationConfig::new(7);
    /// assert!(config.min_room_size >= 3);
    /// assert!(config.max_room_size >= config.min_room_size);
    /// assert!(config.map_width > config.max_room_size + 2);
    /// ```
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            map_width: 60,
            map_height: 40,
            min_room_size: 5,
            max_room_size: 11,
            min_rooms: 5,
            max_rooms: 9,
            extra_connection_chance: 0.15,
            min_monsters_per_room: 0,
            max_monsters_per_room: 2,
        }
    }

    /// Creates a configuration for testing with smaller, simpler maps.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            seed,
            map_width: 30,
            map_height: 24,
            min_room_size: 4,
            max_room_size: 7,
            min_rooms: 3,
            max_rooms: 5,
            extra_connection_chance: 0.0,
            min_monsters_per_room: 1,
            max_monsters_per_room: 1,
        }
    }

    /// Checks that rooms of the configured sizes can fit on the map.
    pub fn validate(&self) -> CairnResult<()> {
        if self.min_room_size < 3 || self.min_room_size > self.max_room_size {
            return Err(CairnError::GenerationFailed(format!(
                "Invalid room sizes {}..={}",
                self.min_room_size, self.max_room_size
            )));
        }
        if self.map_width < self.max_room_size + 3 || self.map_height < self.max_room_size + 3 {
            return Err(CairnError::GenerationFailed(format!(
                "Map {}x{} is too small for rooms up to {}",
                self.map_width, self.map_height, self.max_room_size
            )));
        }
        if self.min_rooms == 0 || self.min_rooms > self.max_rooms {
            return Err(CairnError::GenerationFailed(format!(
                "Invalid room counts {}..={}",
                self.min_rooms, self.max_rooms
            )));
        }
        if self.min_monsters_per_room > self.max_monsters_per_room {
            return Err(CairnError::GenerationFailed(format!(
                "Invalid monster counts {}..={}",
                self.min_monsters_per_room, self.max_monsters_per_room
            )));
        }
        Ok(())
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new(42)
    }
}

/// A rectangular room in the dungeon.
///
/// The outer ring of the rectangle is wall; the inside is floor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Unique identifier for this room
    pub id: u32,
    /// Top-left corner of the room
    pub top_left: Position,
    /// Width of the room (including walls)
    pub width: u32,
    /// Height of the room (including walls)
    pub height: u32,
    /// Rooms joined to this one by a corridor
    pub connections: Vec<u32>,
}

impl Room {
    /// Creates a new room with the given parameters.
    ///
    /// # Examples
    ///
    /// ```
    /// use cairn::{Position, Room};
    ///
    /// let room = Room::new(1, Position::new(5, 5), 10, 8);
    /// assert_eq!(room.center(), Position::new(10, 9));
    /// assert!(room.contains(Position::new(7, 7)));
    /// assert!(!room.contains(Position::new(20, 20)));
    /// ```
    pub fn new(id: u32, top_left: Position, width: u32, height: u32) -> Self {
        Self {
            id,
            top_left,
            width,
            height,
            connections: Vec::new(),
        }
    }

    /// Gets the bottom-right corner of the room.
    pub fn bottom_right(&self) -> Position {
        Position::new(
            self.top_left.x + self.width as i32 - 1,
            self.top_left.y + self.height as i32 - 1,
        )
    }

    /// Gets the center position of the room.
    pub fn center(&self) -> Position {
        Position::new(
            self.top_left.x + self.width as i32 / 2,
            self.top_left.y + self.height as i32 / 2,
        )
    }

    /// Gets the inner area (excluding walls) of the room.
    pub fn inner_area(&self) -> u32 {
        self.width.saturating_sub(2) * self.height.saturating_sub(2)
    }

    /// Checks if a position is inside this room, walls included.
    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= self.top_left.x
            && pos.y >= self.top_left.y
            && pos.x < self.top_left.x + self.width as i32
            && pos.y < self.top_left.y + self.height as i32
    }

    /// Checks if a position is on the border of this room.
    pub fn is_border(&self, pos: Position) -> bool {
        if !self.contains(pos) {
            return false;
        }

        let bottom_right = self.bottom_right();
        pos.x == self.top_left.x
            || pos.y == self.top_left.y
            || pos.x == bottom_right.x
            || pos.y == bottom_right.y
    }

    /// Checks if this room overlaps with another room.
    pub fn overlaps(&self, other: &Room) -> bool {
        !(self.top_left.x >= other.top_left.x + other.width as i32
            || other.top_left.x >= self.top_left.x + self.width as i32
            || self.top_left.y >= other.top_left.y + other.height as i32
            || other.top_left.y >= self.top_left.y + self.height as i32)
    }

    /// Gets all floor positions within this room.
    pub fn floor_positions(&self) -> Vec<Position> {
        let mut positions = Vec::new();

        for y in (self.top_left.y + 1)..(self.top_left.y + self.height as i32 - 1) {
            for x in (self.top_left.x + 1)..(self.top_left.x + self.width as i32 - 1) {
                positions.push(Position::new(x, y));
            }
        }

        positions
    }

    /// Adds a connection to another room.
    pub fn add_connection(&mut self, room_id: u32) {
        if !self.connections.contains(&room_id) {
            self.connections.push(room_id);
        }
    }
}

/// Trait for procedural generators.
///
/// All generation systems implement this trait so they share a seeded RNG
/// and a validation step.
pub trait Generator<T> {
    /// Generates content using the provided configuration and random number generator.
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> CairnResult<T>;

    /// Validates that the generated content meets requirements.
    fn validate(&self, content: &T, config: &GenerationConfig) -> CairnResult<()>;

    /// Gets the generator type name for logging and debugging.
    fn generator_type(&self) -> &'static str;
}

/// Generates a complete dungeon map: rooms, corridors and monster spawns.
///
/// # Examples
///
/// ```
/// use cairn::generation::generate_dungeon;
/// use cairn::GenerationConfig;
///
/// let map = generate_dungeon("dungeon_1", &GenerationConfig::for_testing(3)).unwrap();
/// assert!(map.is_passable(map.player_spawn));
/// assert!(!map.spawns.is_empty());
/// ```
pub fn generate_dungeon(id: impl Into<MapId>, config: &GenerationConfig) -> CairnResult<DungeonMap> {
    config.validate()?;
    let mut rng = utils::create_rng(config);

    let room_generator = RoomGenerator::new(id);
    let layout = room_generator.generate(config, &mut rng)?;
    room_generator.validate(&layout, config)?;

    let encounter_generator = EncounterGenerator::new(layout.rooms.clone(), layout.map.player_spawn);
    let spawns = encounter_generator.generate(config, &mut rng)?;
    encounter_generator.validate(&spawns, config)?;

    let mut map = layout.map;
    map.spawns = spawns;
    info!(
        "Generated {} ({}x{}) with {} rooms and {} monsters",
        map.id,
        map.width,
        map.height,
        layout.rooms.len(),
        map.spawns.len()
    );
    Ok(map)
}

/// Utility functions for generation algorithms.
pub mod utils {
    use super::*;
    use rand::SeedableRng;

    /// Creates a seeded random number generator from the config.
    pub fn create_rng(config: &GenerationConfig) -> StdRng {
        StdRng::seed_from_u64(config.seed)
    }

    /// Validates that a map has somewhere to stand.
    pub fn validate_map(map: &DungeonMap) -> CairnResult<()> {
        if map.passable_positions().next().is_none() {
            return Err(CairnError::GenerationFailed(format!(
                "Map {} has no floor tiles",
                map.id
            )));
        }
        if !map.is_passable(map.player_spawn) {
            return Err(CairnError::GenerationFailed(format!(
                "Player spawn {} on map {} is not walkable",
                map.player_spawn, map.id
            )));
        }
        Ok(())
    }
}
