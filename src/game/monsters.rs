//! # Monsters
//!
//! The ten monster kinds, their immutable stat templates and the monster
//! instances that roam a map.
//!
//! A monster kind is data, not behavior: adding a new monster means adding a
//! [`MonsterKind`] variant and one [`MonsterTemplate`] record. Per-kind turn
//! behavior is a closed [`MonsterBehavior`] tag the turn processor matches on.

use crate::{new_entity_id, CairnError, CairnResult, Entity, EntityId, EntityStats, Position};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The monster subtypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MonsterKind {
    Banshee,
    Leprechaun,
    Pooka,
    Selkie,
    Dullahan,
    Changeling,
    Clurichaun,
    Merrow,
    FearGorta,
    CatSi,
}

impl MonsterKind {
    /// Returns every kind in registry order.
    pub fn all() -> [MonsterKind; 10] {
        [
            MonsterKind::Banshee,
            MonsterKind::Leprechaun,
            MonsterKind::Pooka,
            MonsterKind::Selkie,
            MonsterKind::Dullahan,
            MonsterKind::Changeling,
            MonsterKind::Clurichaun,
            MonsterKind::Merrow,
            MonsterKind::FearGorta,
            MonsterKind::CatSi,
        ]
    }

    /// The lowercase type tag, e.g. `"fear_gorta"`.
    pub fn tag(self) -> &'static str {
        match self {
            MonsterKind::Banshee => "banshee",
            MonsterKind::Leprechaun => "leprechaun",
            MonsterKind::Pooka => "pooka",
            MonsterKind::Selkie => "selkie",
            MonsterKind::Dullahan => "dullahan",
            MonsterKind::Changeling => "changeling",
            MonsterKind::Clurichaun => "clurichaun",
            MonsterKind::Merrow => "merrow",
            MonsterKind::FearGorta => "fear_gorta",
            MonsterKind::CatSi => "cat_si",
        }
    }

    /// Parses a type tag.
    ///
    /// # Examples
    ///
    /// ```
    /// use cairn::MonsterKind;
    ///
    /// assert_eq!(MonsterKind::from_tag("cat_si").unwrap(), MonsterKind::CatSi);
    /// assert!(MonsterKind::from_tag("goblin").is_err());
    /// ```
    pub fn from_tag(tag: &str) -> CairnResult<MonsterKind> {
        Self::all()
            .into_iter()
            .find(|kind| kind.tag() == tag)
            .ok_or_else(|| CairnError::UnknownMonster(tag.to_string()))
    }

    /// Human-readable name, e.g. `"Fear Gorta"`.
    pub fn display_name(self) -> &'static str {
        match self {
            MonsterKind::Banshee => "Banshee",
            MonsterKind::Leprechaun => "Leprechaun",
            MonsterKind::Pooka => "Pooka",
            MonsterKind::Selkie => "Selkie",
            MonsterKind::Dullahan => "Dullahan",
            MonsterKind::Changeling => "Changeling",
            MonsterKind::Clurichaun => "Clurichaun",
            MonsterKind::Merrow => "Merrow",
            MonsterKind::FearGorta => "Fear Gorta",
            MonsterKind::CatSi => "Cat Si",
        }
    }

    /// The stat template for this kind.
    pub fn template(self) -> &'static MonsterTemplate {
        MonsterTemplate::get(self)
    }
}

impl fmt::Display for MonsterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for MonsterKind {
    type Err = CairnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s)
    }
}

/// Per-kind turn behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MonsterBehavior {
    /// Chase then strike
    Standard,
    /// Strikes from range with a wail
    RangedWail,
}

/// Immutable stat record for one monster kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonsterTemplate {
    pub kind: MonsterKind,
    pub health: u32,
    pub attack_damage: u32,
    /// Tiles moved per turn while chasing
    pub speed: u32,
    /// Distance at which the monster notices the warrior
    pub chase_range: u32,
    /// Distance at which the monster can strike
    pub attack_range: u32,
    /// XP granted to the warrior on a kill
    pub xp_value: u32,
    pub behavior: MonsterBehavior,
    pub description: &'static str,
}

const fn template(
    kind: MonsterKind,
    stats: [u32; 6],
    behavior: MonsterBehavior,
    description: &'static str,
) -> MonsterTemplate {
    MonsterTemplate {
        kind,
        health: stats[0],
        attack_damage: stats[1],
        speed: stats[2],
        chase_range: stats[3],
        attack_range: stats[4],
        xp_value: stats[5],
        behavior,
        description,
    }
}

use MonsterBehavior::{RangedWail, Standard};

// health, damage, speed, chase, attack, xp; indexed by MonsterKind
static MONSTER_TEMPLATES: [MonsterTemplate; 10] = [
    template(MonsterKind::Banshee, [60, 12, 1, 6, 2, 40], RangedWail, "Ghostly spirit - fast, ranged attacks"),
    template(MonsterKind::Leprechaun, [40, 8, 2, 4, 1, 25], Standard, "Mischievous fairy - weak but very fast"),
    template(MonsterKind::Pooka, [100, 15, 1, 7, 1, 60], Standard, "Shape-shifter - high health, relentless pursuit"),
    template(MonsterKind::Selkie, [70, 10, 1, 5, 1, 35], Standard, "Seal-human hybrid - balanced stats"),
    template(MonsterKind::Dullahan, [120, 20, 1, 8, 1, 100], Standard, "Headless rider - very powerful, deadly"),
    template(MonsterKind::Changeling, [50, 14, 1, 4, 1, 30], Standard, "Fairy child - deceptively dangerous"),
    template(MonsterKind::Clurichaun, [45, 9, 1, 3, 1, 20], Standard, "Drunken fairy - weak but unpredictable"),
    template(MonsterKind::Merrow, [75, 11, 1, 5, 1, 40], Standard, "Sea being - moderate threat"),
    template(MonsterKind::FearGorta, [55, 13, 1, 6, 1, 35], Standard, "Hunger spirit - drains vitality"),
    template(MonsterKind::CatSi, [65, 16, 2, 5, 1, 45], Standard, "Fairy cat - fast and deadly"),
];

impl MonsterTemplate {
    /// Looks up the template for a kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use cairn::{MonsterBehavior, MonsterKind, MonsterTemplate};
    ///
    /// let banshee = MonsterTemplate::get(MonsterKind::Banshee);
    /// assert_eq!(banshee.attack_range, 2);
    /// assert_eq!(banshee.behavior, MonsterBehavior::RangedWail);
    /// ```
    pub fn get(kind: MonsterKind) -> &'static MonsterTemplate {
        &MONSTER_TEMPLATES[kind as usize]
    }

    /// Looks up a template by type tag.
    pub fn by_tag(tag: &str) -> CairnResult<&'static MonsterTemplate> {
        MonsterKind::from_tag(tag).map(Self::get)
    }
}

/// Where a monster is in its turn state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MonsterState {
    /// Warrior out of chase range
    Idle,
    /// Closing the distance
    Chasing,
    /// Warrior within attack range
    Attacking,
    /// Terminal
    Dead,
}

/// A live monster on the current map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Monster {
    pub id: EntityId,
    pub kind: MonsterKind,
    pub position: Position,
    pub stats: EntityStats,
    pub state: MonsterState,
    /// Index in the map's spawn list; fixes turn order
    pub spawn_index: usize,
}

impl Monster {
    /// Creates a monster at full health from its kind's template.
    pub fn new(kind: MonsterKind, position: Position, spawn_index: usize) -> Self {
        let template = MonsterTemplate::get(kind);
        Self {
            id: new_entity_id(),
            kind,
            position,
            stats: EntityStats::new(template.health, template.attack_damage, template.speed),
            state: MonsterState::Idle,
            spawn_index,
        }
    }

    /// Creates a monster from a type tag.
    pub fn from_tag(tag: &str, position: Position, spawn_index: usize) -> CairnResult<Self> {
        Ok(Self::new(MonsterKind::from_tag(tag)?, position, spawn_index))
    }

    /// The kind's stat template.
    pub fn template(&self) -> &'static MonsterTemplate {
        MonsterTemplate::get(self.kind)
    }

    /// Chase range from the template.
    pub fn chase_range(&self) -> u32 {
        self.template().chase_range
    }

    /// XP granted when slain.
    pub fn xp_value(&self) -> u32 {
        self.template().xp_value
    }

    /// Turn behavior from the template.
    pub fn behavior(&self) -> MonsterBehavior {
        self.template().behavior
    }

    /// Picks the state for a warrior at the given distance.
    ///
    /// Attack range is checked before chase range.
    ///
    /// # Examples
    ///
    /// ```
    /// use cairn::{Monster, MonsterKind, MonsterState, Position};
    ///
    /// let banshee = Monster::new(MonsterKind::Banshee, Position::origin(), 0);
    /// assert_eq!(banshee.decide_state(7), MonsterState::Idle);
    /// assert_eq!(banshee.decide_state(6), MonsterState::Chasing);
    /// assert_eq!(banshee.decide_state(2), MonsterState::Attacking);
    /// ```
    pub fn decide_state(&self, distance: u32) -> MonsterState {
        if !self.is_alive() {
            MonsterState::Dead
        } else if distance <= self.attack_range() {
            MonsterState::Attacking
        } else if distance <= self.chase_range() {
            MonsterState::Chasing
        } else {
            MonsterState::Idle
        }
    }
}

impl Entity for Monster {
    fn id(&self) -> EntityId {
        self.id
    }

    fn name(&self) -> &str {
        self.kind.display_name()
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

    fn attack_range(&self) -> u32 {
        self.template().attack_range
    }

    fn description(&self) -> String {
        self.template().description.to_string()
    }

    fn take_damage(&mut self, amount: u32) -> u32 {
        let defense = self.defense();
        let damage = self.stats.take_damage(amount, defense);
        if !self.stats.is_alive() {
            self.state = MonsterState::Dead;
        }
        damage
    }
}
