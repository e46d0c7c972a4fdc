//! # Encounter Generation
//!
//! Monster placement for generated dungeons.
//!
//! The first room is left empty so the warrior starts in safety. Every other
//! room receives between `min_monsters_per_room` and `max_monsters_per_room`
//! monsters of random kinds on distinct floor tiles.

use crate::{
    CairnError, CairnResult, GenerationConfig, Generator, MonsterKind, Position, Room, SpawnPoint,
};
use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

/// Places monster spawn points in a set of rooms.
#[derive(Debug, Clone)]
pub struct EncounterGenerator {
    /// Rooms to populate; the first is the spawn room
    pub rooms: Vec<Room>,
    /// Tile the warrior starts on
    pub player_spawn: Position,
}

impl EncounterGenerator {
    /// Creates a generator for the given rooms.
    pub fn new(rooms: Vec<Room>, player_spawn: Position) -> Self {
        Self {
            rooms,
            player_spawn,
        }
    }
}

impl Generator<Vec<SpawnPoint>> for EncounterGenerator {
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> CairnResult<Vec<SpawnPoint>> {
        let kinds = MonsterKind::all();
        let mut spawns = Vec::new();

        for room in self.rooms.iter().skip(1) {
            let mut floor: Vec<Position> = room
                .floor_positions()
                .into_iter()
                .filter(|pos| *pos != self.player_spawn)
                .collect();
            floor.shuffle(rng);

            let count = rng.gen_range(config.min_monsters_per_room..=config.max_monsters_per_room);
            for position in floor.into_iter().take(count as usize) {
                let kind = *kinds.choose(rng).ok_or_else(|| {
                    CairnError::GenerationFailed("No monster kinds registered".to_string())
                })?;
                debug!("Room {}: {} at {}", room.id, kind, position);
                spawns.push(SpawnPoint::new(kind, position));
            }
        }

        Ok(spawns)
    }

    fn validate(&self, spawns: &Vec<SpawnPoint>, _config: &GenerationConfig) -> CairnResult<()> {
        let mut seen = HashSet::new();
        for spawn in spawns {
            if spawn.position == self.player_spawn {
                return Err(CairnError::GenerationFailed(format!(
                    "{} placed on the player spawn",
                    spawn.kind
                )));
            }
            let on_floor = self
                .rooms
                .iter()
                .any(|room| room.contains(spawn.position) && !room.is_border(spawn.position));
            if !on_floor {
                return Err(CairnError::GenerationFailed(format!(
                    "{} at {} is outside every room",
                    spawn.kind, spawn.position
                )));
            }
            if !seen.insert(spawn.position) {
                return Err(CairnError::GenerationFailed(format!(
                    "Two monsters share {}",
                    spawn.position
                )));
            }
        }
        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "EncounterGenerator"
    }
}
