//! # Cairn
//!
//! Turn-based combat and world-state core for a tile-based dungeon crawler.
//!
//! ## Architecture Overview
//!
//! A warrior explores dungeons inhabited by creatures of Irish myth. The crate
//! holds the logic that the rendering and input layers call into:
//!
//! - **Game State**: the current map, the warrior, the monster roster and loot
//! - **Entity System**: an `Entity` trait shared by the warrior and monsters,
//!   with monster subtypes expressed as immutable stat templates
//! - **Turn Processor**: resolves one player action followed by one full round
//!   of monster turns, producing events for the HUD and effects layers
//! - **Fog of War**: per-map discovery history and the currently visible square
//! - **Experience**: XP thresholds, level-ups and skill points
//! - **Skills**: five tiers of active and passive warrior skills bought with
//!   skill points
//! - **Generation System**: procedural rooms and monster placement
//!
//! Rendering, asset loading and frame pacing are external collaborators. The
//! game loop invokes [`TurnProcessor::resolve_round`] once per completed
//! player action, never per frame.

pub mod game;
pub mod generation;
pub mod utils;

// Core module re-exports
pub use game::*;
pub use generation::*;
pub use utils::*;

// Explicit re-exports for commonly used types
pub use game::{
    // From combat
    AttackOutcome,
    // From entities
    ConcreteEntity,
    Direction,
    Entity,
    EntityId,
    EntityStats,
    // From experience
    ExperienceSystem,
    // From fog
    FogOfWar,
    // From state
    GameEvent,
    GameState,
    GameStatistics,
    // From items
    GroundItem,
    Inventory,
    Item,
    ItemCategory,
    // From world
    DungeonMap,
    MapId,
    // From monsters
    Monster,
    MonsterBehavior,
    MonsterKind,
    MonsterState,
    MonsterTemplate,
    // From turn
    PlayerAction,
    Position,
    // From skills
    Skill,
    SkillId,
    SkillSet,
    SkillType,
    SpawnPoint,
    TileType,
    TurnOutcome,
    TurnProcessor,
    Warrior,
};

pub use generation::{EncounterGenerator, GenerationConfig, Generator, Room, RoomGenerator};

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Core error type for the Cairn engine.
#[derive(thiserror::Error, Debug)]
pub enum CairnError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Game state is invalid
    #[error("Invalid game state: {0}")]
    InvalidState(String),

    /// Action cannot be performed
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// Monster tag has no template
    #[error("Unknown monster type: {0}")]
    UnknownMonster(String),

    /// Generation failed
    #[error("Generation failed: {0}")]
    GenerationFailed(String),
}

/// Result type used throughout the Cairn codebase.
pub type CairnResult<T> = Result<T, CairnError>;

/// Version information for the game.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Game configuration constants.
pub mod config {
    /// Size of one grid tile in pixels
    pub const TILE_SIZE: i32 = 50;

    /// Frames per second target for the game loop
    pub const TARGET_FPS: u64 = 60;

    /// Default warrior starting health
    pub const WARRIOR_MAX_HEALTH: u32 = 100;

    /// Default warrior base attack damage
    pub const WARRIOR_ATTACK_DAMAGE: u32 = 15;

    /// Warrior movement in tiles per turn
    pub const WARRIOR_SPEED: u32 = 1;

    /// Max health gained per level
    pub const WARRIOR_HP_PER_LEVEL: u32 = 10;

    /// Chebyshev radius of the visible square around the warrior
    pub const DEFAULT_VISIBILITY_RADIUS: i32 = 2;

    /// Attack range for entities that do not declare one
    pub const MELEE_RANGE: u32 = 1;

    /// Number of backpack slots in the inventory
    pub const BACKPACK_SLOTS: usize = 10;

    /// Health restored by a standard potion
    pub const HEALTH_POTION_RESTORE: u32 = 30;

    /// Highest reachable character level
    pub const MAX_LEVEL: u32 = 5;

    /// Total XP needed to reach each level; index 0 is level 1.
    pub const XP_REQUIREMENTS: [u64; MAX_LEVEL as usize] = [0, 100, 250, 500, 1000];

    /// Name of the scroll that opens a portal back to town
    pub const TOWN_PORTAL: &str = "Town Portal";

    /// Map ids that never use fog of war
    pub const OVERWORLD_MAP_IDS: [&str; 2] = ["world", "overworld"];
}

/// Runtime-tunable game settings.
///
/// Defaults mirror the constants in [`config`]; a JSON file can override any
/// subset of the fields.
///
/// # Examples
///
/// ```
/// use cairn::GameConfig;
///
/// let config = GameConfig::from_json(r#"{ "visibility_radius": 4 }"#).unwrap();
/// assert_eq!(config.visibility_radius, 4);
/// assert_eq!(config.warrior_max_health, 100);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Chebyshev radius of the visible square
    pub visibility_radius: i32,
    /// Map ids where fog of war is disabled
    pub overworld_map_ids: Vec<String>,
    /// Warrior starting health
    pub warrior_max_health: u32,
    /// Warrior base attack damage
    pub warrior_attack_damage: u32,
    /// Max health gained per level
    pub hp_per_level: u32,
    /// Whether slain monsters drop loot
    pub loot_enabled: bool,
    /// Seed for loot rolls
    pub loot_seed: u64,
}

impl GameConfig {
    /// Creates a configuration for testing: no loot, fixed seed.
    pub fn for_testing() -> Self {
        Self {
            loot_enabled: false,
            loot_seed: 12345,
            ..Self::default()
        }
    }

    /// Parses a configuration from JSON. Missing fields take default values.
    pub fn from_json(json: &str) -> CairnResult<Self> {
        serde_json::from_str(json).map_err(CairnError::from)
    }

    /// Loads a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> CairnResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            visibility_radius: config::DEFAULT_VISIBILITY_RADIUS,
            overworld_map_ids: config::OVERWORLD_MAP_IDS
                .iter()
                .map(|id| id.to_string())
                .collect(),
            warrior_max_health: config::WARRIOR_MAX_HEALTH,
            warrior_attack_damage: config::WARRIOR_ATTACK_DAMAGE,
            hp_per_level: config::WARRIOR_HP_PER_LEVEL,
            loot_enabled: true,
            loot_seed: 42,
        }
    }
}
