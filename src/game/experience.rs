//! # Experience and Leveling
//!
//! Converts accumulated XP into character levels and skill points.

use crate::config::{MAX_LEVEL, XP_REQUIREMENTS};
use crate::{CairnError, CairnResult};
use log::{info, warn};
use serde::{Deserialize, Serialize};

/// Experience points, level and skill points for the warrior.
///
/// The level is always the highest `L` whose threshold in
/// [`XP_REQUIREMENTS`] has been reached, capped at [`MAX_LEVEL`]. Each level
/// gained grants one skill point.
///
/// # Examples
///
/// ```
/// use cairn::ExperienceSystem;
///
/// let mut xp = ExperienceSystem::new();
/// assert!(xp.add_xp(100));
/// assert_eq!(xp.current_level(), 2);
/// assert_eq!(xp.available_skill_points(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceSystem {
    current_xp: u64,
    current_level: u32,
    skill_points: u32,
    spent_skill_points: u32,
}

impl ExperienceSystem {
    /// Creates a level 1 character with no XP.
    pub fn new() -> Self {
        Self {
            current_xp: 0,
            current_level: 1,
            skill_points: 0,
            spent_skill_points: 0,
        }
    }

    /// XP threshold for a level (1-based), clamped to the table.
    fn threshold(level: u32) -> u64 {
        XP_REQUIREMENTS[(level.clamp(1, MAX_LEVEL) - 1) as usize]
    }

    /// Checks that restored data describes a reachable character.
    ///
    /// The level must lie in `1..=MAX_LEVEL` and no more skill points may be
    /// spent than were earned.
    pub fn validate(&self) -> CairnResult<()> {
        if !(1..=MAX_LEVEL).contains(&self.current_level) {
            return Err(CairnError::InvalidState(format!(
                "Level {} is outside 1..={}",
                self.current_level, MAX_LEVEL
            )));
        }
        if self.spent_skill_points > self.skill_points {
            return Err(CairnError::InvalidState(format!(
                "{} skill points spent but only {} earned",
                self.spent_skill_points, self.skill_points
            )));
        }
        Ok(())
    }

    /// Adds XP and applies every level-up it crosses.
    ///
    /// Non-positive amounts are ignored. At max level the XP is discarded and
    /// the counter stays where it was. Returns true if at least one level was
    /// gained.
    pub fn add_xp(&mut self, amount: i64) -> bool {
        if amount < 0 {
            warn!("Ignoring negative XP grant of {}", amount);
            return false;
        }
        if amount == 0 || self.is_max_level() {
            return false;
        }

        self.current_xp = self.current_xp.saturating_add(amount as u64);

        let mut leveled_up = false;
        while self.current_level < MAX_LEVEL
            && self.current_xp >= Self::threshold(self.current_level + 1)
        {
            self.current_level += 1;
            self.skill_points += 1;
            leveled_up = true;
            info!("Level up! Now level {}", self.current_level);
        }

        leveled_up
    }

    /// Total XP needed for the next level, or 0 at max level.
    pub fn xp_for_next_level(&self) -> u64 {
        if self.is_max_level() {
            return 0;
        }
        Self::threshold(self.current_level + 1)
    }

    /// Fraction of the way from the current level's threshold to the next.
    ///
    /// Returns 1.0 at max level or when the two thresholds coincide.
    pub fn xp_progress(&self) -> f32 {
        if self.is_max_level() {
            return 1.0;
        }

        let floor = Self::threshold(self.current_level);
        let ceil = Self::threshold(self.current_level + 1);
        if ceil <= floor {
            return 1.0;
        }

        self.current_xp.saturating_sub(floor) as f32 / (ceil - floor) as f32
    }

    /// Number of skill points earned but not yet spent.
    pub fn available_skill_points(&self) -> u32 {
        self.skill_points.saturating_sub(self.spent_skill_points)
    }

    /// Total skill points ever earned.
    pub fn total_skill_points(&self) -> u32 {
        self.skill_points
    }

    /// Spends one skill point. Returns false if none are available.
    pub fn spend_skill_point(&mut self) -> bool {
        if self.available_skill_points() == 0 {
            return false;
        }
        self.spent_skill_points += 1;
        true
    }

    /// Current character level.
    pub fn current_level(&self) -> u32 {
        self.current_level
    }

    /// Current experience points.
    pub fn current_xp(&self) -> u64 {
        self.current_xp
    }

    /// Whether the level cap has been reached.
    pub fn is_max_level(&self) -> bool {
        self.current_level >= MAX_LEVEL
    }
}

impl Default for ExperienceSystem {
    fn default() -> Self {
        Self::new()
    }
}
