//! # Entity System
//!
//! The stat model shared by the warrior and every monster.
//!
//! Entities are anything with a position, health and combat stats. The
//! warrior is the single player-controlled entity; monsters live in
//! [`crate::game::monsters`] and implement the same [`Entity`] trait.

use crate::config::{
    MELEE_RANGE, TOWN_PORTAL, WARRIOR_ATTACK_DAMAGE, WARRIOR_MAX_HEALTH, WARRIOR_SPEED,
};
use crate::{
    new_entity_id, CairnError, CairnResult, EntityId, ExperienceSystem, GameConfig, Inventory,
    Monster, Position, SkillId, SkillSet,
};
use log::info;
use serde::{Deserialize, Serialize};

/// Common behavior for all entities in the game.
///
/// Range and damage queries have defaults so any entity can be attacked and
/// can attack under a melee policy.
pub trait Entity {
    /// Gets the unique identifier for this entity.
    fn id(&self) -> EntityId;

    /// Gets the display name of this entity.
    fn name(&self) -> &str;

    /// Gets the current tile position.
    fn position(&self) -> Position;

    /// Moves the entity to a new tile.
    fn set_position(&mut self, position: Position);

    /// Gets the entity's stats.
    fn stats(&self) -> &EntityStats;

    /// Gets mutable access to the entity's stats.
    fn stats_mut(&mut self) -> &mut EntityStats;

    /// Checks if the entity is alive.
    fn is_alive(&self) -> bool {
        self.stats().is_alive()
    }

    /// Maximum Chebyshev distance at which this entity can deal damage.
    fn attack_range(&self) -> u32 {
        MELEE_RANGE
    }

    /// Damage dealt per attack.
    fn attack_damage(&self) -> u32 {
        self.stats().attack_damage
    }

    /// Flat reduction applied to incoming damage.
    fn defense(&self) -> u32 {
        0
    }

    /// Short description shown in the HUD.
    fn description(&self) -> String;

    /// Applies incoming damage after defense. Returns the damage taken.
    fn take_damage(&mut self, amount: u32) -> u32 {
        let defense = self.defense();
        self.stats_mut().take_damage(amount, defense)
    }
}

/// Base attributes shared by every entity.
///
/// Health always stays within `0..=max_health`.
///
/// # Examples
///
/// ```
/// use cairn::EntityStats;
///
/// let mut stats = EntityStats::new(50, 10, 1);
/// assert_eq!(stats.take_damage(20, 5), 15);
/// assert_eq!(stats.health, 35);
/// assert_eq!(stats.heal(100), 15);
/// assert_eq!(stats.health, 50);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityStats {
    /// Current health points
    pub health: u32,
    /// Maximum health points
    pub max_health: u32,
    /// Base damage per attack
    pub attack_damage: u32,
    /// Tiles moved per turn
    pub speed: u32,
}

impl EntityStats {
    /// Creates stats at full health.
    pub fn new(max_health: u32, attack_damage: u32, speed: u32) -> Self {
        Self {
            health: max_health,
            max_health,
            attack_damage,
            speed,
        }
    }

    /// Checks if health is above zero.
    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Checks if health is at its maximum.
    pub fn is_full_health(&self) -> bool {
        self.health >= self.max_health
    }

    /// Reduces health by `amount - defense`, clamped at zero.
    ///
    /// Returns the damage actually applied.
    pub fn take_damage(&mut self, amount: u32, defense: u32) -> u32 {
        let damage = amount.saturating_sub(defense).min(self.health);
        self.health -= damage;
        damage
    }

    /// Restores health up to the maximum. Returns the amount restored.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let healed = amount.min(self.max_health - self.health);
        self.health += healed;
        healed
    }

    /// Health as a fraction of the maximum.
    pub fn health_fraction(&self) -> f32 {
        if self.max_health == 0 {
            return 0.0;
        }
        self.health as f32 / self.max_health as f32
    }
}

/// The player-controlled warrior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warrior {
    pub id: EntityId,
    pub name: String,
    pub position: Position,
    pub stats: EntityStats,
    pub inventory: Inventory,
    pub gold: u32,
    pub experience: ExperienceSystem,
    #[serde(default)]
    pub skills: SkillSet,
    /// Max health gained per level
    pub hp_per_level: u32,
}

impl Warrior {
    /// Creates a warrior with the default starting stats.
    ///
    /// # Examples
    ///
    /// ```
    /// use cairn::{Entity, Position, Warrior};
    ///
    /// let warrior = Warrior::new(Position::new(2, 3));
    /// assert_eq!(warrior.stats().health, 100);
    /// assert_eq!(warrior.attack_damage(), 15);
    /// assert_eq!(warrior.attack_range(), 1);
    /// ```
    pub fn new(position: Position) -> Self {
        Self {
            id: new_entity_id(),
            name: "Warrior".to_string(),
            position,
            stats: EntityStats::new(WARRIOR_MAX_HEALTH, WARRIOR_ATTACK_DAMAGE, WARRIOR_SPEED),
            inventory: Inventory::new(),
            gold: 0,
            experience: ExperienceSystem::new(),
            skills: SkillSet::new(),
            hp_per_level: crate::config::WARRIOR_HP_PER_LEVEL,
        }
    }

    /// Creates a warrior using the starting stats from a configuration.
    pub fn from_config(config: &GameConfig, position: Position) -> Self {
        let mut warrior = Self::new(position);
        warrior.stats = EntityStats::new(
            config.warrior_max_health,
            config.warrior_attack_damage,
            WARRIOR_SPEED,
        );
        warrior.hp_per_level = config.hp_per_level;
        warrior
    }

    /// Grants XP, raising max health and fully healing on each level gained.
    ///
    /// Returns the number of levels gained.
    pub fn gain_experience(&mut self, amount: i64) -> u32 {
        let level_before = self.experience.current_level();
        if !self.experience.add_xp(amount) {
            return 0;
        }

        let levels = self.experience.current_level() - level_before;
        self.stats.max_health += self.hp_per_level * levels;
        self.stats.health = self.stats.max_health;
        info!(
            "{} reached level {} (max health {})",
            self.name,
            self.experience.current_level(),
            self.stats.max_health
        );
        levels
    }

    /// Drinks the first restorative consumable in the backpack.
    ///
    /// Refuses at full health or without a potion; nothing is consumed in
    /// either case. Returns the health restored.
    pub fn use_health_potion(&mut self) -> CairnResult<u32> {
        if self.stats.is_full_health() {
            return Err(CairnError::InvalidAction(
                "Already at full health".to_string(),
            ));
        }

        let potion = self
            .inventory
            .take_first_restorative()
            .ok_or_else(|| CairnError::InvalidAction("No health potion to drink".to_string()))?;

        Ok(self.stats.heal(potion.health_restore))
    }

    /// Reads the first town portal scroll in the backpack.
    ///
    /// The scroll is consumed; opening the portal itself is up to the map
    /// transition layer.
    pub fn use_town_portal(&mut self) -> CairnResult<()> {
        self.inventory
            .take_named(TOWN_PORTAL)
            .map(|_| ())
            .ok_or_else(|| CairnError::InvalidAction("No town portal scroll".to_string()))
    }

    /// Learns a skill with one of the warrior's skill points.
    pub fn learn_skill(&mut self, id: SkillId) -> CairnResult<()> {
        self.skills.learn(id, &mut self.experience)?;
        info!("{} learned {}", self.name, id);
        Ok(())
    }

    /// Selects the active skill used by skill attacks.
    pub fn set_active_skill(&mut self, id: Option<SkillId>) -> CairnResult<()> {
        self.skills.set_active(id)
    }

    /// Chance that a strike is critical.
    pub fn crit_chance(&self) -> f64 {
        if self.skills.has_passive(SkillId::BattleHardened)
            && self.stats.health * 4 > self.stats.max_health * 3
        {
            0.10
        } else {
            0.0
        }
    }

    /// Percentage shaved off incoming damage before armor.
    pub fn damage_reduction_percent(&self) -> u32 {
        let mut reduction = 0;
        if self.skills.has_passive(SkillId::IronSkin) {
            reduction += 10;
        }
        reduction.min(75)
    }

    /// Heals from damage dealt when Vampiric Strikes is known. Returns the
    /// amount healed.
    pub fn leech(&mut self, damage_dealt: u32) -> u32 {
        if !self.skills.has_passive(SkillId::VampiricStrikes) {
            return 0;
        }
        self.stats.heal(damage_dealt * 15 / 100)
    }

    /// Adds gold to the purse.
    pub fn add_gold(&mut self, amount: u32) {
        self.gold = self.gold.saturating_add(amount);
    }

    /// Removes gold if enough is carried. Returns false otherwise.
    pub fn remove_gold(&mut self, amount: u32) -> bool {
        if self.gold < amount {
            return false;
        }
        self.gold -= amount;
        true
    }
}

impl Entity for Warrior {
    fn id(&self) -> EntityId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn position(&self) -> Position {
        self.position
    }

    fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    fn stats(&self) -> &EntityStats {
        &self.stats
    }

    fn stats_mut(&mut self) -> &mut EntityStats {
        &mut self.stats
    }

    fn attack_damage(&self) -> u32 {
        let damage = self.stats.attack_damage + self.inventory.total_attack_bonus();
        if self.skills.has_passive(SkillId::BerserkerRage)
            && self.stats.health * 2 < self.stats.max_health
        {
            damage * 5 / 4
        } else {
            damage
        }
    }

    fn defense(&self) -> u32 {
        self.inventory.total_defense_bonus()
    }

    /// Applies skill reduction, then armor. Last Stand may kick in after.
    fn take_damage(&mut self, amount: u32) -> u32 {
        let reduced = amount * (100 - self.damage_reduction_percent()) / 100;
        let defense = self.defense();
        let damage = self.stats.take_damage(reduced, defense);

        let max = self.stats.max_health;
        if self.skills.has_passive(SkillId::LastStand)
            && !self.skills.last_stand_used()
            && self.stats.is_alive()
            && self.stats.health * 5 <= max
        {
            let restored = self.stats.heal(max * 3 / 10);
            self.skills.mark_last_stand_used();
            info!("{} makes a last stand (+{} HP)", self.name, restored);
        }
        damage
    }

    fn description(&self) -> String {
        format!(
            "Level {} warrior ({}/{} HP)",
            self.experience.current_level(),
            self.stats.health,
            self.stats.max_health
        )
    }
}

/// Enum wrapper for all concrete entity types.
///
/// Used for read-only snapshots handed to the rendering layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConcreteEntity {
    Player(Warrior),
    Monster(Monster),
}

impl Entity for ConcreteEntity {
    fn id(&self) -> EntityId {
        match self {
            ConcreteEntity::Player(warrior) => warrior.id(),
            ConcreteEntity::Monster(monster) => monster.id(),
        }
    }

    fn name(&self) -> &str {
        match self {
            ConcreteEntity::Player(warrior) => warrior.name(),
            ConcreteEntity::Monster(monster) => monster.name(),
        }
    }

    fn position(&self) -> Position {
        match self {
            ConcreteEntity::Player(warrior) => warrior.position(),
            ConcreteEntity::Monster(monster) => monster.position(),
        }
    }

    fn set_position(&mut self, position: Position) {
        match self {
            ConcreteEntity::Player(warrior) => warrior.set_position(position),
            ConcreteEntity::Monster(monster) => monster.set_position(position),
        }
    }

    fn stats(&self) -> &EntityStats {
        match self {
            ConcreteEntity::Player(warrior) => warrior.stats(),
            ConcreteEntity::Monster(monster) => monster.stats(),
        }
    }

    fn stats_mut(&mut self) -> &mut EntityStats {
        match self {
            ConcreteEntity::Player(warrior) => warrior.stats_mut(),
            ConcreteEntity::Monster(monster) => monster.stats_mut(),
        }
    }

    fn attack_range(&self) -> u32 {
        match self {
            ConcreteEntity::Player(warrior) => warrior.attack_range(),
            ConcreteEntity::Monster(monster) => monster.attack_range(),
        }
    }

    fn attack_damage(&self) -> u32 {
        match self {
            ConcreteEntity::Player(warrior) => warrior.attack_damage(),
            ConcreteEntity::Monster(monster) => monster.attack_damage(),
        }
    }

    fn defense(&self) -> u32 {
        match self {
            ConcreteEntity::Player(warrior) => warrior.defense(),
            ConcreteEntity::Monster(monster) => monster.defense(),
        }
    }

    fn description(&self) -> String {
        match self {
            ConcreteEntity::Player(warrior) => warrior.description(),
            ConcreteEntity::Monster(monster) => monster.description(),
        }
    }
}
