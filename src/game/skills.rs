//! # Warrior Skills
//!
//! Ten skills in five tiers, bought with the skill points earned on level-up.
//!
//! Each tier holds one active skill, which replaces the basic attack when the
//! player strikes with it, and one passive skill that changes combat
//! automatically once learned. Tier `N` unlocks at level `N + 1`, except the
//! last tier which shares the level cap with tier 4.
//!
//! Cooldowns are counted in rounds. A skill used this round becomes ready
//! again `cooldown_turns` rounds later.

use crate::config::MAX_LEVEL;
use crate::{CairnError, CairnResult, ExperienceSystem};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Identifier of every skill in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillId {
    PowerStrike,
    BattleHardened,
    ShieldBash,
    IronSkin,
    Whirlwind,
    VampiricStrikes,
    Cleave,
    BerserkerRage,
    Earthsplitter,
    LastStand,
}

/// Whether a skill is triggered by the player or always on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkillType {
    Active,
    Passive,
}

/// Immutable registry record for one skill.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Skill {
    pub id: SkillId,
    pub name: &'static str,
    pub description: &'static str,
    /// 1 to 5
    pub tier: u32,
    pub skill_type: SkillType,
    /// Rounds before an active skill can be used again
    pub cooldown_turns: u32,
    /// Multiplier on the warrior's attack damage when used
    pub damage_multiplier: f32,
}

const fn active(
    id: SkillId,
    name: &'static str,
    tier: u32,
    cooldown_turns: u32,
    damage_multiplier: f32,
    description: &'static str,
) -> Skill {
    Skill {
        id,
        name,
        description,
        tier,
        skill_type: SkillType::Active,
        cooldown_turns,
        damage_multiplier,
    }
}

const fn passive(id: SkillId, name: &'static str, tier: u32, description: &'static str) -> Skill {
    Skill {
        id,
        name,
        description,
        tier,
        skill_type: SkillType::Passive,
        cooldown_turns: 0,
        damage_multiplier: 1.0,
    }
}

static WARRIOR_SKILLS: [Skill; 10] = [
    active(SkillId::PowerStrike, "Power Strike", 1, 6, 1.5, "Deliver a mighty blow that deals 150% weapon damage"),
    passive(SkillId::BattleHardened, "Battle Hardened", 1, "+10% critical hit chance when health exceeds 75%"),
    active(SkillId::ShieldBash, "Shield Bash", 2, 10, 0.75, "Bash an enemy for 75% damage"),
    passive(SkillId::IronSkin, "Iron Skin", 2, "Reduce all incoming damage by 10%"),
    active(SkillId::Whirlwind, "Whirlwind", 3, 15, 1.0, "Spin attack for 100% damage"),
    passive(SkillId::VampiricStrikes, "Vampiric Strikes", 3, "Heal for 15% of damage dealt"),
    active(SkillId::Cleave, "Cleave", 4, 20, 2.0, "Powerful strike dealing 200% damage"),
    passive(SkillId::BerserkerRage, "Berserker Rage", 4, "+25% attack damage when below 50% health"),
    active(SkillId::Earthsplitter, "Earthsplitter", 5, 25, 2.5, "Smash the ground for 250% damage"),
    passive(SkillId::LastStand, "Last Stand", 5, "Below 20% health, recover 30% of max HP once per battle"),
];

impl SkillId {
    /// Every skill, in registry order.
    pub fn all() -> [SkillId; 10] {
        [
            SkillId::PowerStrike,
            SkillId::BattleHardened,
            SkillId::ShieldBash,
            SkillId::IronSkin,
            SkillId::Whirlwind,
            SkillId::VampiricStrikes,
            SkillId::Cleave,
            SkillId::BerserkerRage,
            SkillId::Earthsplitter,
            SkillId::LastStand,
        ]
    }

    /// Registry record for this skill.
    pub fn skill(self) -> &'static Skill {
        &WARRIOR_SKILLS[self as usize]
    }

    /// The snake_case tag used in save files.
    pub fn tag(self) -> &'static str {
        match self {
            SkillId::PowerStrike => "power_strike",
            SkillId::BattleHardened => "battle_hardened",
            SkillId::ShieldBash => "shield_bash",
            SkillId::IronSkin => "iron_skin",
            SkillId::Whirlwind => "whirlwind",
            SkillId::VampiricStrikes => "vampiric_strikes",
            SkillId::Cleave => "cleave",
            SkillId::BerserkerRage => "berserker_rage",
            SkillId::Earthsplitter => "earthsplitter",
            SkillId::LastStand => "last_stand",
        }
    }

    /// Parses a skill tag.
    pub fn from_tag(tag: &str) -> CairnResult<SkillId> {
        SkillId::all()
            .into_iter()
            .find(|id| id.tag() == tag)
            .ok_or_else(|| CairnError::InvalidAction(format!("Unknown skill: {}", tag)))
    }
}

impl fmt::Display for SkillId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.skill().name)
    }
}

impl Skill {
    /// Registry lookup.
    pub fn get(id: SkillId) -> &'static Skill {
        id.skill()
    }

    /// Both skills of a tier, active first.
    pub fn in_tier(tier: u32) -> impl Iterator<Item = &'static Skill> {
        WARRIOR_SKILLS.iter().filter(move |skill| skill.tier == tier)
    }

    /// Character level at which the skill can be learned.
    pub fn required_level(&self) -> u32 {
        (self.tier + 1).min(MAX_LEVEL)
    }

    pub fn is_passive(&self) -> bool {
        self.skill_type == SkillType::Passive
    }
}

/// Skills the warrior has learned, the selected active skill and cooldowns.
///
/// # Examples
///
/// ```
/// use cairn::{ExperienceSystem, SkillId, SkillSet};
///
/// let mut xp = ExperienceSystem::new();
/// xp.add_xp(250);
///
/// let mut skills = SkillSet::new();
/// skills.learn(SkillId::IronSkin, &mut xp).unwrap();
/// assert!(skills.has_passive(SkillId::IronSkin));
/// assert_eq!(xp.available_skill_points(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SkillSet {
    learned: BTreeSet<SkillId>,
    active: Option<SkillId>,
    cooldowns: BTreeMap<SkillId, u32>,
    last_stand_used: bool,
}

impl SkillSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Learns a skill, spending one point from `experience`.
    ///
    /// Fails without spending anything if the skill is already known, its
    /// tier is still locked, or no point is available.
    pub fn learn(&mut self, id: SkillId, experience: &mut ExperienceSystem) -> CairnResult<()> {
        let skill = id.skill();
        if self.knows(id) {
            return Err(CairnError::InvalidAction(format!("{} is already learned", skill.name)));
        }
        if experience.current_level() < skill.required_level() {
            return Err(CairnError::InvalidAction(format!(
                "{} requires level {}",
                skill.name,
                skill.required_level()
            )));
        }
        if !experience.spend_skill_point() {
            return Err(CairnError::InvalidAction("No skill points available".to_string()));
        }

        self.learned.insert(id);
        Ok(())
    }

    pub fn knows(&self, id: SkillId) -> bool {
        self.learned.contains(&id)
    }

    /// Whether a passive skill is learned and therefore in effect.
    pub fn has_passive(&self, id: SkillId) -> bool {
        self.knows(id) && id.skill().is_passive()
    }

    /// Selects the active skill used by skill attacks, or clears it.
    pub fn set_active(&mut self, id: Option<SkillId>) -> CairnResult<()> {
        if let Some(id) = id {
            if !self.knows(id) {
                return Err(CairnError::InvalidAction(format!("{} is not learned", id)));
            }
            if id.skill().is_passive() {
                return Err(CairnError::InvalidAction(format!("{} is passive", id)));
            }
        }
        self.active = id;
        Ok(())
    }

    /// The selected active skill.
    pub fn active(&self) -> Option<&'static Skill> {
        self.active.map(SkillId::skill)
    }

    /// Rounds until a skill can be used again.
    pub fn remaining_cooldown(&self, id: SkillId) -> u32 {
        self.cooldowns.get(&id).copied().unwrap_or(0)
    }

    pub fn is_ready(&self, id: SkillId) -> bool {
        self.remaining_cooldown(id) == 0
    }

    pub fn start_cooldown(&mut self, id: SkillId) {
        let turns = id.skill().cooldown_turns;
        if turns > 0 {
            self.cooldowns.insert(id, turns);
        }
    }

    /// Counts one round off every cooldown.
    pub fn tick_cooldowns(&mut self) {
        self.cooldowns.retain(|_, turns| {
            *turns = turns.saturating_sub(1);
            *turns > 0
        });
    }

    /// Learned skills of one tier.
    pub fn learned_in_tier(&self, tier: u32) -> Vec<SkillId> {
        self.learned
            .iter()
            .copied()
            .filter(|id| id.skill().tier == tier)
            .collect()
    }

    pub fn learned(&self) -> impl Iterator<Item = SkillId> + '_ {
        self.learned.iter().copied()
    }

    pub fn last_stand_used(&self) -> bool {
        self.last_stand_used
    }

    pub fn mark_last_stand_used(&mut self) {
        self.last_stand_used = true;
    }

    /// Clears per-battle state such as Last Stand.
    pub fn reset_battle_state(&mut self) {
        self.last_stand_used = false;
    }
}
