//! # Game State Module
//!
//! Central game state shared by the turn processor and the rendering layer.
//!
//! `GameState` owns the current map, the warrior, the monster roster in
//! spawn order, loot on the ground and fog of war. The turn processor
//! mutates it once per player action; everything else only reads it.

use crate::generation::loot_table_for;
use crate::{
    CairnError, CairnResult, ConcreteEntity, DungeonMap, Entity, EntityId, ExperienceSystem,
    FogOfWar, GameConfig, GroundItem, Item, MapId, Monster, MonsterKind, Position, SkillId,
    Warrior,
};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Events produced while resolving a round.
///
/// The HUD and effects layers consume these to animate what happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// An entity stepped to a new tile
    EntityMoved {
        entity_id: EntityId,
        from: Position,
        to: Position,
    },
    /// One attack was resolved
    Attack {
        attacker: EntityId,
        target: EntityId,
        damage: u32,
        killed: bool,
        /// Set for ranged wail attacks
        wail: bool,
    },
    /// An entity's health reached zero
    EntityDied {
        entity_id: EntityId,
        name: String,
        position: Position,
        killer: Option<EntityId>,
    },
    /// A slain monster left an item behind
    LootDropped { item: Item, position: Position },
    /// The warrior stored an item
    ItemPickedUp { item: Item },
    /// The warrior scooped coins into the purse
    GoldPickedUp { amount: u32 },
    /// XP granted to the warrior
    ExperienceGained { amount: u32 },
    /// The warrior reached a new level
    LevelUp { level: u32 },
    /// The warrior drank a potion
    PotionUsed { restored: u32 },
    /// The warrior struck with an active skill
    SkillUsed { skill: SkillId },
    /// The warrior's blow was a critical hit
    CriticalHit { target: EntityId },
    /// Vampiric Strikes healed the warrior
    LifeLeeched { amount: u32 },
    /// A town portal scroll was read. The map transition layer moves the
    /// warrior to town.
    TownPortalOpened { map_id: MapId, position: Position },
    /// Free-form message for the log panel
    Message {
        text: String,
        importance: MessageImportance,
    },
}

/// How prominently a message should be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageImportance {
    Info,
    Warning,
    Critical,
}

/// Statistics tracking the warrior's progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStatistics {
    /// Number of monsters slain
    pub enemies_defeated: u32,
    /// Total damage dealt by the warrior
    pub damage_dealt: u64,
    /// Total damage taken by the warrior
    pub damage_taken: u64,
    /// Items stored in the inventory
    pub items_collected: u32,
    /// Gold picked up
    pub gold_collected: u64,
    /// Tiles walked by the warrior
    pub steps_taken: u64,
    /// Potions consumed
    pub potions_used: u32,
    /// Maps entered, counting re-entries
    pub maps_entered: u32,
    /// Rounds resolved
    pub rounds_played: u64,
    /// Active skills used
    #[serde(default)]
    pub skills_used: u32,
    /// Critical hits landed
    #[serde(default)]
    pub critical_hits: u32,
}

impl GameStatistics {
    /// Creates new empty statistics.
    pub fn new() -> Self {
        Self {
            enemies_defeated: 0,
            damage_dealt: 0,
            damage_taken: 0,
            items_collected: 0,
            gold_collected: 0,
            steps_taken: 0,
            potions_used: 0,
            maps_entered: 0,
            rounds_played: 0,
            skills_used: 0,
            critical_hits: 0,
        }
    }

    /// Updates statistics from an event, attributing it relative to the warrior.
    pub fn update_from_event(&mut self, event: &GameEvent, player_id: EntityId) {
        match event {
            GameEvent::EntityMoved { entity_id, .. } if *entity_id == player_id => {
                self.steps_taken += 1;
            }
            GameEvent::Attack {
                attacker, damage, ..
            } => {
                if *attacker == player_id {
                    self.damage_dealt += *damage as u64;
                } else {
                    self.damage_taken += *damage as u64;
                }
            }
            GameEvent::EntityDied { killer, .. } if *killer == Some(player_id) => {
                self.enemies_defeated += 1;
            }
            GameEvent::ItemPickedUp { .. } => {
                self.items_collected += 1;
            }
            GameEvent::GoldPickedUp { amount } => {
                self.gold_collected += *amount as u64;
            }
            GameEvent::PotionUsed { .. } => {
                self.potions_used += 1;
            }
            GameEvent::SkillUsed { .. } => {
                self.skills_used += 1;
            }
            GameEvent::CriticalHit { .. } => {
                self.critical_hits += 1;
            }
            _ => {}
        }
    }
}

impl Default for GameStatistics {
    fn default() -> Self {
        Self::new()
    }
}

fn unseeded_rng() -> StdRng {
    StdRng::seed_from_u64(0)
}

/// Central game state for one play session.
///
/// # Examples
///
/// ```
/// use cairn::{DungeonMap, GameState, MonsterKind, Position};
///
/// let mut map = DungeonMap::open_room("dungeon_1", 12, 12);
/// map.player_spawn = Position::new(2, 2);
/// map.add_spawn(MonsterKind::Selkie, Position::new(8, 8));
///
/// let state = GameState::for_testing(map);
/// assert_eq!(state.monsters().len(), 1);
/// assert!(state.fog().is_visible(4, 4));
/// assert!(!state.is_game_over());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Runtime settings
    pub config: GameConfig,
    /// The map the warrior is on
    pub map: DungeonMap,
    /// Discovery and visibility
    pub fog: FogOfWar,
    /// The player
    pub warrior: Warrior,
    /// Living monsters in spawn order
    pub monsters: Vec<Monster>,
    /// Loot lying on the current map
    pub ground_items: Vec<GroundItem>,
    /// Spawn indices already slain, per map
    pub killed_spawns: HashMap<MapId, HashSet<usize>>,
    /// Rounds resolved so far
    pub turn_number: u64,
    /// Progress counters
    pub statistics: GameStatistics,
    /// Loot and critical hit RNG; reseeded from the config on load
    #[serde(skip, default = "unseeded_rng")]
    rng: StdRng,
}

impl GameState {
    /// Starts a session on `map` with the given settings.
    pub fn new(config: GameConfig, map: DungeonMap) -> Self {
        let fog = FogOfWar::new(config.visibility_radius)
            .with_overworld_ids(config.overworld_map_ids.iter().map(String::as_str));
        let warrior = Warrior::from_config(&config, map.player_spawn);
        let rng = StdRng::seed_from_u64(config.loot_seed);

        let mut state = Self {
            config,
            map: DungeonMap::new(map.id.clone(), 0, 0),
            fog,
            warrior,
            monsters: Vec::new(),
            ground_items: Vec::new(),
            killed_spawns: HashMap::new(),
            turn_number: 0,
            statistics: GameStatistics::new(),
            rng,
        };
        state.enter_map(map, false);
        state
    }

    /// Starts a session with [`GameConfig::for_testing`].
    pub fn for_testing(map: DungeonMap) -> Self {
        Self::new(GameConfig::for_testing(), map)
    }

    /// Moves the warrior onto a map and populates it.
    ///
    /// Ground items are cleared and once-per-battle skills are ready again.
    /// When `regenerated` is set the map's fog history and kill records are
    /// forgotten, otherwise monsters already slain on this map stay dead.
    pub fn enter_map(&mut self, map: DungeonMap, regenerated: bool) {
        self.ground_items.clear();
        self.warrior.skills.reset_battle_state();
        if regenerated {
            self.fog.reset_for_map(&map.id);
            self.killed_spawns.remove(&map.id);
        }

        let killed = self.killed_spawns.get(&map.id);
        self.monsters = map
            .spawns
            .iter()
            .enumerate()
            .filter(|(index, _)| killed.map_or(true, |slain| !slain.contains(index)))
            .map(|(index, spawn)| Monster::new(spawn.kind, spawn.position, index))
            .collect();

        self.warrior.set_position(map.player_spawn);
        self.statistics.maps_entered += 1;
        info!(
            "Entered {} with {} monsters (regenerated: {})",
            map.id,
            self.monsters.len(),
            regenerated
        );

        self.map = map;
        self.refresh_fog();
    }

    /// Recomputes visibility around the warrior.
    pub fn refresh_fog(&mut self) {
        let position = self.warrior.position;
        self.fog
            .update_visibility(position.x, position.y, &self.map.id);
    }

    /// The player.
    pub fn warrior(&self) -> &Warrior {
        &self.warrior
    }

    /// Living monsters in spawn order.
    pub fn monsters(&self) -> &[Monster] {
        &self.monsters
    }

    /// The living monster standing on a tile, if any.
    pub fn monster_at(&self, position: Position) -> Option<&Monster> {
        self.monsters
            .iter()
            .find(|monster| monster.is_alive() && monster.position == position)
    }

    /// Whether the warrior or a living monster stands on a tile.
    pub fn is_occupied(&self, position: Position) -> bool {
        self.warrior.position == position || self.monster_at(position).is_some()
    }

    /// Whether an entity could step onto a tile.
    pub fn is_walkable(&self, position: Position) -> bool {
        self.map.is_passable(position) && !self.is_occupied(position)
    }

    /// Items lying on the current map.
    pub fn ground_items(&self) -> &[GroundItem] {
        &self.ground_items
    }

    /// Fog of war state.
    pub fn fog(&self) -> &FogOfWar {
        &self.fog
    }

    /// The warrior's experience.
    pub fn experience(&self) -> &ExperienceSystem {
        &self.warrior.experience
    }

    /// The current map.
    pub fn map(&self) -> &DungeonMap {
        &self.map
    }

    /// Whether the warrior has fallen.
    pub fn is_game_over(&self) -> bool {
        !self.warrior.is_alive()
    }

    /// Snapshot of the warrior followed by every living monster.
    pub fn entities(&self) -> Vec<ConcreteEntity> {
        std::iter::once(ConcreteEntity::Player(self.warrior.clone()))
            .chain(self.monsters.iter().cloned().map(ConcreteEntity::Monster))
            .collect()
    }

    /// Records a spawn slot as slain on the current map.
    pub fn record_kill(&mut self, spawn_index: usize) {
        self.killed_spawns
            .entry(self.map.id.clone())
            .or_default()
            .insert(spawn_index);
    }

    /// Whether a spawn slot on a map has been slain.
    pub fn is_spawn_killed(&self, map_id: &MapId, spawn_index: usize) -> bool {
        self.killed_spawns
            .get(map_id)
            .is_some_and(|slain| slain.contains(&spawn_index))
    }

    /// Rolls a monster kind's loot table, if loot is enabled.
    pub fn roll_loot(&mut self, kind: MonsterKind) -> Option<Item> {
        if !self.config.loot_enabled {
            return None;
        }
        loot_table_for(kind).roll(&mut self.rng)
    }

    /// Rolls a chance in `[0, 1]`. A zero chance never consumes randomness.
    pub fn roll_chance(&mut self, chance: f64) -> bool {
        chance > 0.0 && self.rng.gen_bool(chance.min(1.0))
    }

    /// Puts an item on a tile.
    pub fn drop_item(&mut self, item: Item, position: Position) {
        debug!("{} dropped at {}", item.name, position);
        self.ground_items.push(GroundItem::new(item, position));
    }

    /// Folds an event into the statistics.
    pub fn process_event(&mut self, event: &GameEvent) {
        self.statistics.update_from_event(event, self.warrior.id);
    }

    /// Advances to the next round.
    pub fn advance_turn(&mut self) {
        self.turn_number += 1;
        self.statistics.rounds_played += 1;
    }

    /// Saves the game state to JSON.
    pub fn save_to_json(&self) -> CairnResult<String> {
        serde_json::to_string_pretty(self).map_err(CairnError::from)
    }

    /// Loads game state from JSON.
    ///
    /// Saves describing an impossible character (level out of range, more
    /// skill points spent than earned) are rejected with `InvalidState`.
    pub fn load_from_json(json: &str) -> CairnResult<Self> {
        let mut state: Self = serde_json::from_str(json)?;
        state.warrior.experience.validate()?;
        state.rng = StdRng::seed_from_u64(state.config.loot_seed ^ state.turn_number);
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::new_entity_id;

    fn arena() -> DungeonMap {
        let mut map = DungeonMap::open_room("dungeon_1", 12, 12);
        map.player_spawn = Position::new(2, 2);
        map.add_spawn(MonsterKind::Pooka, Position::new(9, 9));
        map.add_spawn(MonsterKind::Merrow, Position::new(5, 9));
        map
    }

    #[test]
    fn test_new_state_places_everything() {
        let state = GameState::for_testing(arena());

        assert_eq!(state.warrior().position, Position::new(2, 2));
        assert_eq!(state.monsters().len(), 2);
        assert_eq!(state.monsters()[0].kind, MonsterKind::Pooka);
        assert_eq!(state.monsters()[1].spawn_index, 1);
        assert_eq!(state.turn_number, 0);
        assert_eq!(state.statistics.maps_entered, 1);
        assert!(state.fog().is_discovered(0, 0, &MapId::new("dungeon_1")));
    }

    #[test]
    fn test_occupancy_queries() {
        let state = GameState::for_testing(arena());

        assert!(state.is_occupied(Position::new(2, 2)));
        assert!(state.is_occupied(Position::new(9, 9)));
        assert!(!state.is_occupied(Position::new(3, 3)));
        assert!(state.is_walkable(Position::new(3, 3)));
        assert!(!state.is_walkable(Position::new(0, 0)));
        assert_eq!(
            state.monster_at(Position::new(5, 9)).map(|m| m.kind),
            Some(MonsterKind::Merrow)
        );
    }

    #[test]
    fn test_reentry_keeps_slain_monsters_dead() {
        let mut state = GameState::for_testing(arena());
        state.record_kill(0);

        state.enter_map(arena(), false);
        assert_eq!(state.monsters().len(), 1);
        assert_eq!(state.monsters()[0].kind, MonsterKind::Merrow);
        assert!(state.is_spawn_killed(&MapId::new("dungeon_1"), 0));
    }

    #[test]
    fn test_regenerated_map_forgets_history() {
        let mut state = GameState::for_testing(arena());
        let dungeon = MapId::new("dungeon_1");
        state.record_kill(0);
        state.drop_item(Item::gold(3), Position::new(4, 4));

        let mut fresh = arena();
        fresh.player_spawn = Position::new(9, 2);
        state.enter_map(fresh, true);

        assert_eq!(state.monsters().len(), 2);
        assert!(state.ground_items().is_empty());
        assert!(!state.is_spawn_killed(&dungeon, 0));
        // Old discovery near (2, 2) is gone, new spawn is discovered
        assert!(!state.fog().is_discovered(0, 0, &dungeon));
        assert!(state.fog().is_discovered(9, 2, &dungeon));
    }

    #[test]
    fn test_other_map_history_survives() {
        let mut state = GameState::for_testing(arena());
        let mut cave = DungeonMap::open_room("dungeon_2", 8, 8);
        cave.player_spawn = Position::new(3, 3);

        state.enter_map(cave, true);
        assert!(state.fog().is_discovered(0, 0, &MapId::new("dungeon_1")));
        assert!(state.fog().is_discovered(3, 3, &MapId::new("dungeon_2")));
        assert!(state.monsters().is_empty());
    }

    #[test]
    fn test_loot_disabled_for_testing() {
        let mut state = GameState::for_testing(arena());
        for _ in 0..20 {
            assert!(state.roll_loot(MonsterKind::Leprechaun).is_none());
        }
    }

    #[test]
    fn test_entities_snapshot() {
        let state = GameState::for_testing(arena());
        let entities = state.entities();
        assert_eq!(entities.len(), 3);
        assert!(matches!(entities[0], ConcreteEntity::Player(_)));
        assert_eq!(entities[2].position(), Position::new(5, 9));
    }

    #[test]
    fn test_turn_advancement() {
        let mut state = GameState::for_testing(arena());
        state.advance_turn();
        state.advance_turn();
        assert_eq!(state.turn_number, 2);
        assert_eq!(state.statistics.rounds_played, 2);
    }

    #[test]
    fn test_statistics_update() {
        let player = new_entity_id();
        let monster = new_entity_id();
        let mut stats = GameStatistics::new();

        stats.update_from_event(
            &GameEvent::EntityMoved {
                entity_id: player,
                from: Position::new(0, 0),
                to: Position::new(1, 0),
            },
            player,
        );
        stats.update_from_event(
            &GameEvent::EntityMoved {
                entity_id: monster,
                from: Position::new(5, 0),
                to: Position::new(4, 0),
            },
            player,
        );
        assert_eq!(stats.steps_taken, 1);

        let hit = |attacker, target, damage| GameEvent::Attack {
            attacker,
            target,
            damage,
            killed: false,
            wail: false,
        };
        stats.update_from_event(&hit(player, monster, 15), player);
        stats.update_from_event(&hit(monster, player, 12), player);
        assert_eq!(stats.damage_dealt, 15);
        assert_eq!(stats.damage_taken, 12);

        stats.update_from_event(
            &GameEvent::EntityDied {
                entity_id: monster,
                name: "Pooka".to_string(),
                position: Position::new(4, 0),
                killer: Some(player),
            },
            player,
        );
        stats.update_from_event(&GameEvent::GoldPickedUp { amount: 7 }, player);
        assert_eq!(stats.enemies_defeated, 1);
        assert_eq!(stats.gold_collected, 7);

        stats.update_from_event(&GameEvent::SkillUsed { skill: SkillId::Cleave }, player);
        stats.update_from_event(&GameEvent::CriticalHit { target: monster }, player);
        assert_eq!(stats.skills_used, 1);
        assert_eq!(stats.critical_hits, 1);
    }

    #[test]
    fn test_entering_a_map_renews_last_stand() {
        let mut state = GameState::for_testing(arena());
        state.warrior.gain_experience(1000);
        state.warrior.learn_skill(SkillId::LastStand).unwrap();
        state.warrior.skills.mark_last_stand_used();

        state.enter_map(arena(), false);
        assert!(!state.warrior().skills.last_stand_used());
        assert!(state.warrior().skills.knows(SkillId::LastStand));
    }

    #[test]
    fn test_roll_chance_bounds() {
        let mut state = GameState::for_testing(arena());
        assert!((0..100).all(|_| !state.roll_chance(0.0)));
        assert!((0..100).all(|_| state.roll_chance(1.0)));
    }

    #[test]
    fn test_game_state_serialization() {
        let state = GameState::for_testing(arena());
        let json = state.save_to_json().unwrap();

        let _: serde_json::Value = serde_json::from_str(&json).unwrap();

        let loaded = GameState::load_from_json(&json).unwrap();
        assert_eq!(loaded.warrior, state.warrior);
        assert_eq!(loaded.monsters, state.monsters);
        assert_eq!(loaded.fog, state.fog);
    }

    #[test]
    fn test_load_rejects_out_of_range_level() {
        let state = GameState::for_testing(arena());
        let mut value: serde_json::Value =
            serde_json::from_str(&state.save_to_json().unwrap()).unwrap();

        value["warrior"]["experience"]["current_level"] = serde_json::json!(0);
        let result = GameState::load_from_json(&value.to_string());
        assert!(matches!(result, Err(CairnError::InvalidState(_))));

        value["warrior"]["experience"]["current_level"] = serde_json::json!(6);
        assert!(GameState::load_from_json(&value.to_string()).is_err());
    }
}
