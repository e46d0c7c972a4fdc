//! # Dungeon Generation
//!
//! Room-and-corridor dungeon layouts.
//!
//! The generator:
//! 1. Places non-overlapping rooms at random with collision detection
//! 2. Joins each room to the next with an L-shaped corridor, plus a few
//!    extra connections for loops
//! 3. Puts the player spawn at the centre of the first room
//! 4. Verifies every room floor is reachable from the spawn

use super::utils;
use crate::{
    CairnError, CairnResult, DungeonMap, GenerationConfig, Generator, MapId, Position, Room,
    TileType,
};
use log::debug;
use rand::{rngs::StdRng, Rng};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};

/// A generated map together with the rooms carved into it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DungeonLayout {
    pub map: DungeonMap,
    /// Rooms in placement order; the first holds the player spawn
    pub rooms: Vec<Room>,
}

/// Dungeon generator using the room-and-corridor algorithm.
#[derive(Debug, Clone)]
pub struct RoomGenerator {
    /// Id given to generated maps
    pub map_id: MapId,
    /// Maximum attempts to place a room before giving up on it
    pub max_placement_attempts: u32,
}

impl RoomGenerator {
    /// Creates a generator for maps with the given id.
    ///
    /// # Examples
    ///
    /// ```
    /// use cairn::{GenerationConfig, Generator, RoomGenerator};
    /// use cairn::generation::utils::create_rng;
    ///
    /// let config = GenerationConfig::for_testing(5);
    /// let generator = RoomGenerator::new("dungeon_1");
    /// let layout = generator.generate(&config, &mut create_rng(&config)).unwrap();
    /// assert_eq!(layout.map.id.as_str(), "dungeon_1");
    /// assert!(layout.rooms.len() >= 3);
    /// ```
    pub fn new(map_id: impl Into<MapId>) -> Self {
        Self {
            map_id: map_id.into(),
            max_placement_attempts: 100,
        }
    }

    /// Places rooms and carves their floors.
    fn place_rooms(
        &self,
        map: &mut DungeonMap,
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) -> CairnResult<Vec<Room>> {
        let mut rooms = Vec::new();
        let room_count = rng.gen_range(config.min_rooms..=config.max_rooms);

        for room_id in 0..room_count {
            if let Some(room) = self.try_place_room(map, config, rng, room_id, &rooms) {
                self.carve_room(map, &room)?;
                rooms.push(room);
            }
        }

        if (rooms.len() as u32) < config.min_rooms {
            return Err(CairnError::GenerationFailed(format!(
                "Placed {} rooms, need at least {}",
                rooms.len(),
                config.min_rooms
            )));
        }

        Ok(rooms)
    }

    /// Attempts to place a single room.
    fn try_place_room(
        &self,
        map: &DungeonMap,
        config: &GenerationConfig,
        rng: &mut StdRng,
        room_id: u32,
        existing_rooms: &[Room],
    ) -> Option<Room> {
        for _ in 0..self.max_placement_attempts {
            let width = rng.gen_range(config.min_room_size..=config.max_room_size);
            let height = rng.gen_range(config.min_room_size..=config.max_room_size);
            let x = rng.gen_range(1..(map.width as i32 - width as i32 - 1));
            let y = rng.gen_range(1..(map.height as i32 - height as i32 - 1));
            let room = Room::new(room_id, Position::new(x, y), width, height);

            if self.room_fits_in_map(map, &room)
                && !existing_rooms.iter().any(|existing| room.overlaps(existing))
            {
                return Some(room);
            }
        }

        debug!("Gave up placing room {}", room_id);
        None
    }

    /// Checks if a room leaves the outer map border intact.
    fn room_fits_in_map(&self, map: &DungeonMap, room: &Room) -> bool {
        room.top_left.x >= 1
            && room.top_left.y >= 1
            && room.top_left.x + (room.width as i32) < map.width as i32
            && room.top_left.y + (room.height as i32) < map.height as i32
    }

    /// Carves out a room by setting its floor tiles.
    fn carve_room(&self, map: &mut DungeonMap, room: &Room) -> CairnResult<()> {
        for pos in room.floor_positions() {
            map.set_tile(pos, TileType::Floor)?;
        }
        Ok(())
    }

    /// Connects rooms using L-shaped corridors.
    fn connect_rooms(
        &self,
        map: &mut DungeonMap,
        rooms: &mut [Room],
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) -> CairnResult<()> {
        if rooms.len() < 2 {
            return Ok(());
        }

        for i in 0..(rooms.len() - 1) {
            self.join(map, rooms, i, i + 1)?;
        }

        let extra_connections = (rooms.len() as f64 * config.extra_connection_chance) as usize;
        for _ in 0..extra_connections {
            let first = rng.gen_range(0..rooms.len());
            let second = rng.gen_range(0..rooms.len());
            if first != second {
                self.join(map, rooms, first, second)?;
            }
        }

        Ok(())
    }

    fn join(&self, map: &mut DungeonMap, rooms: &mut [Room], a: usize, b: usize) -> CairnResult<()> {
        self.carve_l_corridor(map, rooms[a].center(), rooms[b].center())?;
        let (id_a, id_b) = (rooms[a].id, rooms[b].id);
        rooms[a].add_connection(id_b);
        rooms[b].add_connection(id_a);
        Ok(())
    }

    /// Carves a corridor horizontally from `start`, then vertically to `end`.
    fn carve_l_corridor(&self, map: &mut DungeonMap, start: Position, end: Position) -> CairnResult<()> {
        let horizontal = (start.x.min(end.x)..=start.x.max(end.x)).map(|x| Position::new(x, start.y));
        let vertical = (start.y.min(end.y)..=start.y.max(end.y)).map(|y| Position::new(end.x, y));

        for pos in horizontal.chain(vertical) {
            if map.is_valid_position(pos) {
                map.set_tile(pos, TileType::Floor)?;
            }
        }
        Ok(())
    }

    /// Validates that every room floor is reachable from the first room.
    fn validate_connectivity(&self, map: &DungeonMap, rooms: &[Room]) -> CairnResult<()> {
        let Some(first) = rooms.first() else {
            return Ok(());
        };

        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        queue.push_back(first.center());
        visited.insert(first.center());

        while let Some(pos) = queue.pop_front() {
            for adjacent_pos in pos.cardinal_adjacent_positions() {
                if map.is_passable(adjacent_pos) && visited.insert(adjacent_pos) {
                    queue.push_back(adjacent_pos);
                }
            }
        }

        for room in rooms {
            if room.floor_positions().iter().any(|pos| !visited.contains(pos)) {
                return Err(CairnError::GenerationFailed(format!(
                    "Room {} is not connected to other rooms",
                    room.id
                )));
            }
        }

        Ok(())
    }
}

impl Generator<DungeonLayout> for RoomGenerator {
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> CairnResult<DungeonLayout> {
        config.validate()?;
        let mut map = DungeonMap::new(self.map_id.clone(), config.map_width, config.map_height);

        let mut rooms = self.place_rooms(&mut map, config, rng)?;
        self.connect_rooms(&mut map, &mut rooms, config, rng)?;

        if let Some(first) = rooms.first() {
            map.player_spawn = first.center();
        }

        Ok(DungeonLayout { map, rooms })
    }

    fn validate(&self, layout: &DungeonLayout, _config: &GenerationConfig) -> CairnResult<()> {
        utils::validate_map(&layout.map)?;
        self.validate_connectivity(&layout.map, &layout.rooms)
    }

    fn generator_type(&self) -> &'static str {
        "RoomGenerator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_fits_in_map() {
        let generator = RoomGenerator::new("dungeon_1");
        let map = DungeonMap::new("dungeon_1", 50, 40);

        let good_room = Room::new(1, Position::new(5, 5), 10, 8);
        let bad_room = Room::new(2, Position::new(45, 35), 10, 8);

        assert!(generator.room_fits_in_map(&map, &good_room));
        assert!(!generator.room_fits_in_map(&map, &bad_room));
    }

    #[test]
    fn test_room_fit_keeps_outer_border() {
        let generator = RoomGenerator::new("dungeon_1");
        let map = DungeonMap::new("dungeon_1", 20, 12);

        // Walls of the room may sit one tile inside the map edge
        let flush = Room::new(0, Position::new(1, 1), 18, 10);
        assert!(generator.room_fits_in_map(&map, &flush));

        let too_wide = Room::new(1, Position::new(1, 1), 19, 10);
        let too_tall = Room::new(2, Position::new(1, 1), 18, 11);
        let on_edge = Room::new(3, Position::new(0, 1), 5, 5);
        assert!(!generator.room_fits_in_map(&map, &too_wide));
        assert!(!generator.room_fits_in_map(&map, &too_tall));
        assert!(!generator.room_fits_in_map(&map, &on_edge));
    }

    #[test]
    fn test_generation_with_small_map() {
        let generator = RoomGenerator::new("dungeon_1");
        let config = GenerationConfig::for_testing(12345);
        let mut rng = utils::create_rng(&config);

        let layout = generator.generate(&config, &mut rng).unwrap();
        assert_eq!(layout.map.width, config.map_width);
        assert_eq!(layout.map.height, config.map_height);
        assert!(generator.validate(&layout, &config).is_ok());

        // Border stays solid
        for x in 0..config.map_width as i32 {
            assert!(!layout.map.is_passable(Position::new(x, 0)));
            assert!(!layout.map.is_passable(Position::new(x, config.map_height as i32 - 1)));
        }
    }

    #[test]
    fn test_rooms_do_not_overlap() {
        for seed in 0..10 {
            let config = GenerationConfig::new(seed);
            let layout = RoomGenerator::new("dungeon_1")
                .generate(&config, &mut utils::create_rng(&config))
                .unwrap();

            for (i, a) in layout.rooms.iter().enumerate() {
                for b in &layout.rooms[i + 1..] {
                    assert!(!a.overlaps(b), "seed {} rooms {} and {}", seed, a.id, b.id);
                }
            }
            assert_eq!(layout.map.player_spawn, layout.rooms[0].center());
        }
    }

    #[test]
    fn test_l_corridor_carving() {
        let generator = RoomGenerator::new("dungeon_1");
        let mut map = DungeonMap::new("dungeon_1", 20, 20);

        let start = Position::new(5, 5);
        let end = Position::new(15, 15);
        generator.carve_l_corridor(&mut map, start, end).unwrap();

        assert!(map.is_passable(start));
        assert!(map.is_passable(Position::new(15, 5)));
        assert!(map.is_passable(end));
        assert!(!map.is_passable(Position::new(5, 15)));
    }

    #[test]
    fn test_disconnected_rooms_fail_validation() {
        let generator = RoomGenerator::new("dungeon_1");
        let mut map = DungeonMap::new("dungeon_1", 30, 30);
        let rooms = vec![
            Room::new(0, Position::new(1, 1), 5, 5),
            Room::new(1, Position::new(20, 20), 5, 5),
        ];
        for room in &rooms {
            generator.carve_room(&mut map, room).unwrap();
        }

        assert!(generator.validate_connectivity(&map, &rooms).is_err());

        generator
            .carve_l_corridor(&mut map, rooms[0].center(), rooms[1].center())
            .unwrap();
        assert!(generator.validate_connectivity(&map, &rooms).is_ok());
    }
}
