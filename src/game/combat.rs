//! # Combat Resolver
//!
//! Range checks and damage application between two entities.
//!
//! Damage is deterministic: the attacker's damage minus the target's
//! defense, with the target's health clamped at zero.

use crate::{Entity, Position};
use serde::{Deserialize, Serialize};

/// Grid distance used by every range check in the game.
///
/// This is the Chebyshev distance, so diagonal neighbours are adjacent.
pub fn grid_distance(a: Position, b: Position) -> u32 {
    a.chebyshev_distance(b)
}

/// Checks whether `target` is within `attacker`'s attack range.
///
/// # Examples
///
/// ```
/// use cairn::{is_in_attack_range, Monster, MonsterKind, Position, Warrior};
///
/// let banshee = Monster::new(MonsterKind::Banshee, Position::new(0, 0), 0);
/// let warrior = Warrior::new(Position::new(0, 2));
/// assert!(is_in_attack_range(&banshee, &warrior));
/// assert!(!is_in_attack_range(&warrior, &banshee));
/// ```
pub fn is_in_attack_range<A, T>(attacker: &A, target: &T) -> bool
where
    A: Entity + ?Sized,
    T: Entity + ?Sized,
{
    grid_distance(attacker.position(), target.position()) <= attacker.attack_range()
}

/// Result of one resolved attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackOutcome {
    /// Health actually removed from the target
    pub damage: u32,
    /// Whether the target died from this attack
    pub killed: bool,
}

/// Applies one attack from `attacker` to `target`.
///
/// Range is not checked here; callers decide when an attack happens.
pub fn resolve_attack<A, T>(attacker: &A, target: &mut T) -> AttackOutcome
where
    A: Entity + ?Sized,
    T: Entity + ?Sized,
{
    resolve_strike(target, attacker.attack_damage())
}

/// Applies a blow of `damage` raw damage, before the target's defense.
///
/// Used when the damage was already scaled, e.g. by a skill or a critical
/// hit.
pub fn resolve_strike<T>(target: &mut T, damage: u32) -> AttackOutcome
where
    T: Entity + ?Sized,
{
    let was_alive = target.is_alive();
    let damage = target.take_damage(damage);
    AttackOutcome {
        damage,
        killed: was_alive && !target.is_alive(),
    }
}
