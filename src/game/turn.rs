//! # Turn Processor
//!
//! Resolves one player action followed by one full round of monster turns.
//!
//! A round runs in a fixed order:
//! 1. The player's action is validated and performed. A rejected action
//!    leaves the state untouched and no monster acts.
//! 2. After a move, fog of war is refreshed and loot on the new tile is
//!    picked up.
//! 3. Monsters slain by the player are removed, drop loot and grant XP.
//! 4. Every surviving monster, in spawn order, goes idle, chases or attacks
//!    and finishes its turn before the next one starts. If the warrior
//!    falls the remaining monsters do not act.
//! 5. The turn counter and statistics advance and skill cooldowns tick.
//!
//! The warrior's strikes may be critical (150% damage) when a passive grants
//! a crit chance, and heal the warrior when Vampiric Strikes is learned.

use crate::utils::navigation::plan_chase;
use crate::{
    grid_distance, is_in_attack_range, resolve_attack, resolve_strike, CairnError, CairnResult,
    ConcreteEntity, Direction, Entity, GameEvent, GameState, GroundItem, ItemCategory,
    MessageImportance, MonsterBehavior, MonsterState, Skill,
};
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// An action chosen by the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerAction {
    /// Step one tile
    Move(Direction),
    /// Strike the nearest monster in range
    Attack,
    /// Let the monsters act
    Wait,
    /// Drink the first health potion in the backpack
    UseHealthPotion,
    /// Strike the nearest monster in range with the selected active skill
    SkillAttack,
    /// Read a town portal scroll
    UseTownPortal,
}

/// Everything that happened during one round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnOutcome {
    /// Turn number after this round
    pub turn: u64,
    /// Events in the order they happened
    pub events: Vec<GameEvent>,
    /// Whether the warrior fell this round
    pub player_defeated: bool,
    /// Whether the warrior gained a level this round
    pub leveled_up: bool,
    /// Warrior and surviving monsters after the round
    pub entities: Vec<ConcreteEntity>,
}

/// Sequences player and monster turns.
pub struct TurnProcessor;

impl TurnProcessor {
    /// Resolves one player action and the monster round that follows it.
    ///
    /// # Examples
    ///
    /// ```
    /// use cairn::{Direction, DungeonMap, GameState, PlayerAction, Position, TurnProcessor};
    ///
    /// let mut map = DungeonMap::open_room("dungeon_1", 10, 10);
    /// map.player_spawn = Position::new(2, 2);
    /// let mut state = GameState::for_testing(map);
    ///
    /// let outcome = TurnProcessor::resolve_round(&mut state, PlayerAction::Move(Direction::East)).unwrap();
    /// assert_eq!(outcome.turn, 1);
    /// assert_eq!(state.warrior().position, Position::new(3, 2));
    ///
    /// // Walking into the border wall is rejected and costs nothing
    /// state.warrior.position = Position::new(1, 1);
    /// assert!(TurnProcessor::resolve_round(&mut state, PlayerAction::Move(Direction::North)).is_err());
    /// assert_eq!(state.turn_number, 1);
    /// ```
    pub fn resolve_round(state: &mut GameState, action: PlayerAction) -> CairnResult<TurnOutcome> {
        if state.is_game_over() {
            return Err(CairnError::InvalidState(
                "The warrior has fallen".to_string(),
            ));
        }

        let level_before = state.experience().current_level();
        let mut events = Vec::new();

        Self::perform_player_action(state, action, &mut events)?;
        Self::remove_slain_monsters(state, &mut events);
        let player_defeated = Self::run_monster_turns(state, &mut events);

        state.advance_turn();
        state.warrior.skills.tick_cooldowns();
        for event in &events {
            state.process_event(event);
        }

        Ok(TurnOutcome {
            turn: state.turn_number,
            events,
            player_defeated,
            leveled_up: state.experience().current_level() > level_before,
            entities: state.entities(),
        })
    }

    fn perform_player_action(
        state: &mut GameState,
        action: PlayerAction,
        events: &mut Vec<GameEvent>,
    ) -> CairnResult<()> {
        match action {
            PlayerAction::Move(direction) => {
                let from = state.warrior.position;
                let to = from + direction.to_delta();

                if !state.map.is_passable(to) {
                    return Err(CairnError::InvalidAction(format!(
                        "Cannot move into {}",
                        to
                    )));
                }
                if let Some(monster) = state.monster_at(to) {
                    return Err(CairnError::InvalidAction(format!(
                        "{} blocks the way",
                        monster.name()
                    )));
                }

                state.warrior.set_position(to);
                events.push(GameEvent::EntityMoved {
                    entity_id: state.warrior.id,
                    from,
                    to,
                });
                state.refresh_fog();
                Self::pick_up_items(state, events);
            }
            PlayerAction::Attack => Self::player_strike(state, None, events)?,
            PlayerAction::SkillAttack => {
                let skill = state.warrior.skills.active().ok_or_else(|| {
                    CairnError::InvalidAction("No active skill selected".to_string())
                })?;
                let remaining = state.warrior.skills.remaining_cooldown(skill.id);
                if remaining > 0 {
                    return Err(CairnError::InvalidAction(format!(
                        "{} is ready in {} rounds",
                        skill.name, remaining
                    )));
                }
                Self::player_strike(state, Some(skill), events)?;
            }
            PlayerAction::Wait => {}
            PlayerAction::UseHealthPotion => {
                let restored = state.warrior.use_health_potion()?;
                events.push(GameEvent::PotionUsed { restored });
            }
            PlayerAction::UseTownPortal => {
                state.warrior.use_town_portal()?;
                info!("Town portal opened at {} on {}", state.warrior.position, state.map.id);
                events.push(GameEvent::TownPortalOpened {
                    map_id: state.map.id.clone(),
                    position: state.warrior.position,
                });
            }
        }
        Ok(())
    }

    /// The warrior strikes the nearest living monster in range.
    ///
    /// Ties go to spawn order. A skill scales the warrior's damage by its
    /// multiplier and starts its cooldown. Fails without touching anything
    /// when no monster is within reach.
    fn player_strike(
        state: &mut GameState,
        skill: Option<&'static Skill>,
        events: &mut Vec<GameEvent>,
    ) -> CairnResult<()> {
        let index = state
            .monsters
            .iter()
            .enumerate()
            .filter(|(_, monster)| {
                monster.is_alive() && is_in_attack_range(&state.warrior, *monster)
            })
            .min_by_key(|(index, monster)| {
                (grid_distance(state.warrior.position, monster.position), *index)
            })
            .map(|(index, _)| index)
            .ok_or_else(|| CairnError::InvalidAction("No monster within reach".to_string()))?;

        let mut damage = state.warrior.attack_damage();
        if let Some(skill) = skill {
            damage = (damage as f32 * skill.damage_multiplier) as u32;
            state.warrior.skills.start_cooldown(skill.id);
            events.push(GameEvent::SkillUsed { skill: skill.id });
        }
        let critical = state.roll_chance(state.warrior.crit_chance());
        if critical {
            damage = damage * 3 / 2;
        }

        let target = &mut state.monsters[index];
        let outcome = resolve_strike(target, damage);
        debug!(
            "Warrior hits {} for {} ({} HP left)",
            target.name(),
            outcome.damage,
            target.stats.health
        );
        if critical {
            events.push(GameEvent::CriticalHit { target: target.id });
        }
        events.push(GameEvent::Attack {
            attacker: state.warrior.id,
            target: target.id,
            damage: outcome.damage,
            killed: outcome.killed,
            wail: false,
        });

        let healed = state.warrior.leech(outcome.damage);
        if healed > 0 {
            events.push(GameEvent::LifeLeeched { amount: healed });
        }
        Ok(())
    }

    /// Collects everything on the warrior's tile that fits.
    fn pick_up_items(state: &mut GameState, events: &mut Vec<GameEvent>) {
        let position = state.warrior.position;
        let (here, elsewhere): (Vec<GroundItem>, Vec<GroundItem>) =
            std::mem::take(&mut state.ground_items)
                .into_iter()
                .partition(|ground| ground.position == position);
        state.ground_items = elsewhere;

        for ground in here {
            if ground.item.category == ItemCategory::Gold {
                let amount = ground.item.gold_value;
                state.warrior.add_gold(amount);
                events.push(GameEvent::GoldPickedUp { amount });
                continue;
            }

            match state.warrior.inventory.add_item(ground.item.clone()) {
                Ok(()) => events.push(GameEvent::ItemPickedUp { item: ground.item }),
                Err(item) => {
                    events.push(GameEvent::Message {
                        text: format!("No room for {}", item.name),
                        importance: MessageImportance::Warning,
                    });
                    state.ground_items.push(GroundItem::new(item, position));
                }
            }
        }
    }

    /// Removes dead monsters, dropping loot and granting XP for each.
    fn remove_slain_monsters(state: &mut GameState, events: &mut Vec<GameEvent>) {
        let (slain, living): (Vec<_>, Vec<_>) = std::mem::take(&mut state.monsters)
            .into_iter()
            .partition(|monster| !monster.is_alive());
        state.monsters = living;

        for monster in slain {
            info!("{} slain at {}", monster.name(), monster.position);
            events.push(GameEvent::EntityDied {
                entity_id: monster.id,
                name: monster.name().to_string(),
                position: monster.position,
                killer: Some(state.warrior.id),
            });
            state.record_kill(monster.spawn_index);

            if let Some(item) = state.roll_loot(monster.kind) {
                events.push(GameEvent::LootDropped {
                    item: item.clone(),
                    position: monster.position,
                });
                state.drop_item(item, monster.position);
            }

            let amount = monster.xp_value();
            events.push(GameEvent::ExperienceGained { amount });
            if state.warrior.gain_experience(amount as i64) > 0 {
                events.push(GameEvent::LevelUp {
                    level: state.experience().current_level(),
                });
            }
        }
    }

    /// Runs every monster's turn in spawn order. Returns true if the warrior fell.
    fn run_monster_turns(state: &mut GameState, events: &mut Vec<GameEvent>) -> bool {
        for index in 0..state.monsters.len() {
            let target = state.warrior.position;
            let monster = &mut state.monsters[index];
            let distance = grid_distance(monster.position, target);
            let next = monster.decide_state(distance);
            if monster.state != next {
                debug!(
                    "{} #{}: {:?} -> {:?} at distance {}",
                    monster.name(),
                    monster.spawn_index,
                    monster.state,
                    next,
                    distance
                );
            }
            monster.state = next;

            match next {
                MonsterState::Idle | MonsterState::Dead => {}
                MonsterState::Chasing => Self::chase(state, index, events),
                MonsterState::Attacking => {
                    if Self::strike(state, index, events) {
                        return true;
                    }
                }
            }
        }
        false
    }

    /// Moves a monster up to its speed toward the warrior.
    ///
    /// The monster follows an 8-connected path over passable tiles not held
    /// by another monster, and stops once the warrior is within its attack
    /// range.
    fn chase(state: &mut GameState, index: usize, events: &mut Vec<GameEvent>) {
        let target = state.warrior.position;
        let monster = &state.monsters[index];
        let from = monster.position;

        let steps = plan_chase(
            from,
            target,
            monster.attack_range(),
            monster.stats.speed,
            |pos| {
                state.map.is_passable(pos)
                    && state
                        .monsters
                        .iter()
                        .enumerate()
                        .all(|(other, m)| other == index || m.position != pos)
            },
        );

        let Some(&to) = steps.last() else {
            debug!("{} #{} has no way forward", monster.name(), monster.spawn_index);
            return;
        };

        let monster = &mut state.monsters[index];
        monster.set_position(to);
        events.push(GameEvent::EntityMoved {
            entity_id: monster.id,
            from,
            to,
        });
    }

    /// A monster attacks the warrior. Returns true if the blow was fatal.
    fn strike(state: &mut GameState, index: usize, events: &mut Vec<GameEvent>) -> bool {
        let monster = &state.monsters[index];
        let wail = monster.behavior() == MonsterBehavior::RangedWail;
        let outcome = resolve_attack(monster, &mut state.warrior);

        if wail {
            debug!("{} wails for {} damage", monster.name(), outcome.damage);
        } else {
            debug!("{} hits for {} damage", monster.name(), outcome.damage);
        }
        events.push(GameEvent::Attack {
            attacker: monster.id,
            target: state.warrior.id,
            damage: outcome.damage,
            killed: outcome.killed,
            wail,
        });

        if outcome.killed {
            info!("The warrior was slain by a {}", monster.name());
            events.push(GameEvent::EntityDied {
                entity_id: state.warrior.id,
                name: state.warrior.name.clone(),
                position: state.warrior.position,
                killer: Some(monster.id),
            });
        }
        outcome.killed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TOWN_PORTAL;
    use crate::generation::town_portal;
    use crate::{DungeonMap, GameConfig, Item, MapId, MonsterKind, Position, SkillId, TileType};

    fn arena(spawns: &[(MonsterKind, Position)]) -> DungeonMap {
        let mut map = DungeonMap::open_room("dungeon_1", 20, 20);
        map.player_spawn = Position::new(5, 5);
        for (kind, position) in spawns {
            map.add_spawn(*kind, *position);
        }
        map
    }

    fn attacks(events: &[GameEvent]) -> Vec<&GameEvent> {
        events
            .iter()
            .filter(|event| matches!(event, GameEvent::Attack { .. }))
            .collect()
    }

    #[test]
    fn test_monster_out_of_chase_range_stays_idle() {
        let mut state = GameState::for_testing(arena(&[(MonsterKind::Banshee, Position::new(12, 5))]));

        let outcome = TurnProcessor::resolve_round(&mut state, PlayerAction::Wait).unwrap();

        assert!(outcome.events.is_empty());
        assert_eq!(state.monsters()[0].state, MonsterState::Idle);
        assert_eq!(state.monsters()[0].position, Position::new(12, 5));
    }

    #[test]
    fn test_monster_in_chase_range_closes_in() {
        let mut state = GameState::for_testing(arena(&[(MonsterKind::Banshee, Position::new(11, 5))]));

        TurnProcessor::resolve_round(&mut state, PlayerAction::Wait).unwrap();

        let banshee = &state.monsters()[0];
        assert_eq!(banshee.state, MonsterState::Chasing);
        assert_eq!(grid_distance(banshee.position, state.warrior().position), 5);
        assert_eq!(state.warrior().stats.health, 100);
    }

    #[test]
    fn test_monster_in_attack_range_strikes_instead_of_moving() {
        let mut state = GameState::for_testing(arena(&[(MonsterKind::Banshee, Position::new(7, 5))]));

        let outcome = TurnProcessor::resolve_round(&mut state, PlayerAction::Wait).unwrap();

        let banshee = &state.monsters()[0];
        assert_eq!(banshee.state, MonsterState::Attacking);
        assert_eq!(banshee.position, Position::new(7, 5));
        assert_eq!(state.warrior().stats.health, 88);
        assert_eq!(
            outcome.events,
            vec![GameEvent::Attack {
                attacker: banshee.id,
                target: state.warrior().id,
                damage: 12,
                killed: false,
                wail: true,
            }]
        );
    }

    #[test]
    fn test_fast_monster_moves_up_to_speed() {
        let mut state = GameState::for_testing(arena(&[(MonsterKind::Leprechaun, Position::new(9, 5))]));

        let outcome = TurnProcessor::resolve_round(&mut state, PlayerAction::Wait).unwrap();

        let leprechaun = &state.monsters()[0];
        assert_eq!(grid_distance(leprechaun.position, state.warrior().position), 2);
        // Both steps collapse into a single move event
        assert_eq!(outcome.events.len(), 1);
    }

    #[test]
    fn test_walled_in_monster_cannot_chase() {
        let mut map = arena(&[(MonsterKind::Pooka, Position::new(10, 5))]);
        for y in 4..=6 {
            for x in 9..=11 {
                if (x, y) != (10, 5) {
                    map.set_tile(Position::new(x, y), TileType::Wall).unwrap();
                }
            }
        }
        let mut state = GameState::for_testing(map);

        let outcome = TurnProcessor::resolve_round(&mut state, PlayerAction::Wait).unwrap();

        assert_eq!(state.monsters()[0].state, MonsterState::Chasing);
        assert_eq!(state.monsters()[0].position, Position::new(10, 5));
        assert!(outcome.events.is_empty());
    }

    #[test]
    fn test_monsters_act_in_spawn_order() {
        let mut state = GameState::for_testing(arena(&[
            (MonsterKind::Pooka, Position::new(6, 5)),
            (MonsterKind::Selkie, Position::new(4, 5)),
        ]));
        let pooka = state.monsters()[0].id;
        let selkie = state.monsters()[1].id;

        let outcome = TurnProcessor::resolve_round(&mut state, PlayerAction::Wait).unwrap();

        let attackers: Vec<_> = attacks(&outcome.events)
            .into_iter()
            .filter_map(|event| match event {
                GameEvent::Attack { attacker, .. } => Some(*attacker),
                _ => None,
            })
            .collect();
        assert_eq!(attackers, vec![pooka, selkie]);
        assert_eq!(state.warrior().stats.health, 75);
    }

    #[test]
    fn test_warrior_death_stops_the_round() {
        let mut state = GameState::for_testing(arena(&[
            (MonsterKind::Dullahan, Position::new(6, 5)),
            (MonsterKind::Pooka, Position::new(4, 5)),
        ]));
        state.warrior.stats.health = 10;

        let outcome = TurnProcessor::resolve_round(&mut state, PlayerAction::Wait).unwrap();

        assert!(outcome.player_defeated);
        assert_eq!(attacks(&outcome.events).len(), 1);
        assert_eq!(state.monsters()[1].state, MonsterState::Idle);
        assert!(state.is_game_over());
        assert!(matches!(
            outcome.events.last(),
            Some(GameEvent::EntityDied { killer: Some(_), .. })
        ));

        assert!(matches!(
            TurnProcessor::resolve_round(&mut state, PlayerAction::Wait),
            Err(CairnError::InvalidState(_))
        ));
    }

    #[test]
    fn test_rejected_actions_do_not_consume_the_round() {
        let mut state = GameState::for_testing(arena(&[(MonsterKind::Pooka, Position::new(6, 5))]));

        for action in [
            PlayerAction::Move(Direction::East),
            PlayerAction::UseHealthPotion,
            PlayerAction::SkillAttack,
            PlayerAction::UseTownPortal,
        ] {
            assert!(matches!(
                TurnProcessor::resolve_round(&mut state, action),
                Err(CairnError::InvalidAction(_))
            ));
        }

        state.warrior.position = Position::new(1, 1);
        assert!(TurnProcessor::resolve_round(&mut state, PlayerAction::Move(Direction::North)).is_err());
        assert!(TurnProcessor::resolve_round(&mut state, PlayerAction::Attack).is_err());

        assert_eq!(state.turn_number, 0);
        assert_eq!(state.warrior().stats.health, 100);
        assert_eq!(state.monsters()[0].position, Position::new(6, 5));
    }

    #[test]
    fn test_attack_targets_nearest_monster() {
        let mut state = GameState::for_testing(arena(&[
            (MonsterKind::Banshee, Position::new(7, 5)),
            (MonsterKind::Merrow, Position::new(6, 6)),
        ]));
        let merrow = state.monsters()[1].id;

        let outcome = TurnProcessor::resolve_round(&mut state, PlayerAction::Attack).unwrap();

        assert!(matches!(
            outcome.events[0],
            GameEvent::Attack { target, damage: 15, .. } if target == merrow
        ));
        assert_eq!(state.monsters()[1].stats.health, 60);
    }

    #[test]
    fn test_killing_a_monster_removes_it_and_grants_xp() {
        let mut state = GameState::for_testing(arena(&[
            (MonsterKind::Leprechaun, Position::new(6, 5)),
            (MonsterKind::Dullahan, Position::new(15, 15)),
        ]));
        state
            .warrior
            .inventory
            .add_item(Item::weapon("Headless Blade", 25))
            .unwrap();

        let outcome = TurnProcessor::resolve_round(&mut state, PlayerAction::Attack).unwrap();

        assert_eq!(state.monsters().len(), 1);
        assert_eq!(state.monsters()[0].kind, MonsterKind::Dullahan);
        assert!(state.is_spawn_killed(&MapId::new("dungeon_1"), 0));
        assert_eq!(state.experience().current_xp(), 25);
        assert_eq!(state.statistics.enemies_defeated, 1);
        assert!(outcome
            .events
            .contains(&GameEvent::ExperienceGained { amount: 25 }));
        assert!(!outcome.leveled_up);
        assert_eq!(outcome.entities.len(), 2);
    }

    #[test]
    fn test_kill_can_level_up() {
        let mut state = GameState::for_testing(arena(&[(MonsterKind::Leprechaun, Position::new(6, 5))]));
        state
            .warrior
            .inventory
            .add_item(Item::weapon("Headless Blade", 25))
            .unwrap();
        state.warrior.gain_experience(90);
        state.warrior.stats.health = 50;

        let outcome = TurnProcessor::resolve_round(&mut state, PlayerAction::Attack).unwrap();

        assert!(outcome.leveled_up);
        assert!(outcome.events.contains(&GameEvent::LevelUp { level: 2 }));
        assert_eq!(state.warrior().stats.max_health, 110);
        assert_eq!(state.warrior().stats.health, 110);
    }

    #[test]
    fn test_loot_drops_onto_the_corpse_tile() {
        let map = arena(&[(MonsterKind::Leprechaun, Position::new(6, 5))]);
        let config = GameConfig {
            loot_enabled: true,
            ..GameConfig::for_testing()
        };
        let mut state = GameState::new(config, map);
        state.warrior.stats.attack_damage = 100;

        let outcome = TurnProcessor::resolve_round(&mut state, PlayerAction::Attack).unwrap();

        let drops = outcome
            .events
            .iter()
            .filter(|event| matches!(event, GameEvent::LootDropped { .. }))
            .count();
        assert_eq!(drops, state.ground_items().len());
        assert!(state
            .ground_items()
            .iter()
            .all(|ground| ground.position == Position::new(6, 5)));
    }

    #[test]
    fn test_move_refreshes_fog_and_picks_up_loot() {
        let mut state = GameState::for_testing(arena(&[]));
        state.drop_item(Item::gold(12), Position::new(6, 5));
        state.drop_item(Item::potion("Sea Kelp"), Position::new(6, 5));

        let outcome =
            TurnProcessor::resolve_round(&mut state, PlayerAction::Move(Direction::East)).unwrap();

        assert_eq!(state.warrior().gold, 12);
        assert_eq!(state.warrior().inventory.count_restoratives(), 1);
        assert!(state.ground_items().is_empty());
        assert!(state.fog().is_visible(8, 5));
        assert!(!state.fog().is_visible(3, 5));
        assert!(outcome
            .events
            .contains(&GameEvent::GoldPickedUp { amount: 12 }));
        assert_eq!(state.statistics.steps_taken, 1);
        assert_eq!(state.statistics.items_collected, 1);
    }

    #[test]
    fn test_full_inventory_leaves_item_on_the_ground() {
        let mut state = GameState::for_testing(arena(&[]));
        for i in 0..crate::config::BACKPACK_SLOTS {
            state
                .warrior
                .inventory
                .add_item(Item::misc(format!("Stone {}", i), "A stone", 1))
                .unwrap();
        }
        state.drop_item(Item::misc("Four-Leaf Clover", "Lucky", 50), Position::new(6, 5));

        let outcome =
            TurnProcessor::resolve_round(&mut state, PlayerAction::Move(Direction::East)).unwrap();

        assert_eq!(state.ground_items().len(), 1);
        assert!(matches!(
            outcome.events.last(),
            Some(GameEvent::Message { importance: MessageImportance::Warning, .. })
        ));
    }

    #[test]
    fn test_potion_use_consumes_a_round() {
        let mut state = GameState::for_testing(arena(&[]));
        state.warrior.inventory.add_item(Item::potion("Dark Berry")).unwrap();
        state.warrior.stats.health = 60;

        let outcome =
            TurnProcessor::resolve_round(&mut state, PlayerAction::UseHealthPotion).unwrap();

        assert_eq!(outcome.events, vec![GameEvent::PotionUsed { restored: 30 }]);
        assert_eq!(state.warrior().stats.health, 90);
        assert_eq!(state.turn_number, 1);
        assert_eq!(state.statistics.potions_used, 1);
    }

    fn hardy_warrior_with(state: &mut GameState, xp: i64, skill: SkillId) {
        state.warrior.gain_experience(xp);
        state.warrior.learn_skill(skill).unwrap();
        state.warrior.stats.max_health = 1000;
        state.warrior.stats.health = 1000;
    }

    #[test]
    fn test_skill_attack_scales_damage_and_cools_down() {
        let mut state = GameState::for_testing(arena(&[(MonsterKind::Merrow, Position::new(6, 5))]));
        hardy_warrior_with(&mut state, 100, SkillId::PowerStrike);
        state.warrior.set_active_skill(Some(SkillId::PowerStrike)).unwrap();
        let merrow = state.monsters()[0].id;

        let outcome = TurnProcessor::resolve_round(&mut state, PlayerAction::SkillAttack).unwrap();

        assert_eq!(outcome.events[0], GameEvent::SkillUsed { skill: SkillId::PowerStrike });
        assert!(matches!(
            outcome.events[1],
            GameEvent::Attack { target, damage: 22, .. } if target == merrow
        ));
        assert_eq!(state.monsters()[0].stats.health, 53);
        assert_eq!(state.statistics.skills_used, 1);
        assert_eq!(state.warrior().skills.remaining_cooldown(SkillId::PowerStrike), 5);

        assert!(matches!(
            TurnProcessor::resolve_round(&mut state, PlayerAction::SkillAttack),
            Err(CairnError::InvalidAction(_))
        ));
        assert_eq!(state.turn_number, 1);

        for _ in 0..5 {
            TurnProcessor::resolve_round(&mut state, PlayerAction::Wait).unwrap();
        }
        assert!(state.warrior().skills.is_ready(SkillId::PowerStrike));
        TurnProcessor::resolve_round(&mut state, PlayerAction::SkillAttack).unwrap();
        assert_eq!(state.monsters()[0].stats.health, 31);
    }

    #[test]
    fn test_skill_attack_needs_a_target_and_a_selection() {
        let mut state = GameState::for_testing(arena(&[(MonsterKind::Merrow, Position::new(9, 5))]));
        hardy_warrior_with(&mut state, 100, SkillId::PowerStrike);

        assert!(TurnProcessor::resolve_round(&mut state, PlayerAction::SkillAttack).is_err());

        state.warrior.set_active_skill(Some(SkillId::PowerStrike)).unwrap();
        assert!(TurnProcessor::resolve_round(&mut state, PlayerAction::SkillAttack).is_err());
        assert!(state.warrior().skills.is_ready(SkillId::PowerStrike));
        assert_eq!(state.turn_number, 0);
    }

    #[test]
    fn test_critical_hits_deal_half_again() {
        let mut state = GameState::for_testing(arena(&[(MonsterKind::Merrow, Position::new(6, 5))]));
        hardy_warrior_with(&mut state, 100, SkillId::BattleHardened);
        state.monsters[0].stats.max_health = 100_000;
        state.monsters[0].stats.health = 100_000;

        let (mut crits, mut plain) = (0, 0);
        for _ in 0..200 {
            state.warrior.stats.health = state.warrior.stats.max_health;
            let outcome = TurnProcessor::resolve_round(&mut state, PlayerAction::Attack).unwrap();
            let critical = matches!(outcome.events[0], GameEvent::CriticalHit { .. });
            let dealt = outcome.events.iter().find_map(|event| match event {
                GameEvent::Attack { attacker, damage, .. } if *attacker == state.warrior.id => {
                    Some(*damage)
                }
                _ => None,
            });
            if critical {
                crits += 1;
                assert_eq!(dealt, Some(22));
            } else {
                plain += 1;
                assert_eq!(dealt, Some(15));
            }
        }
        assert!(crits > 0 && plain > crits);
        assert_eq!(state.statistics.critical_hits, crits);
    }

    #[test]
    fn test_vampiric_strikes_heal_the_warrior() {
        let mut state = GameState::for_testing(arena(&[(MonsterKind::Merrow, Position::new(6, 5))]));
        state.warrior.gain_experience(500);
        state.warrior.learn_skill(SkillId::VampiricStrikes).unwrap();
        state.warrior.stats.health = 50;

        let outcome = TurnProcessor::resolve_round(&mut state, PlayerAction::Attack).unwrap();

        assert_eq!(outcome.events[1], GameEvent::LifeLeeched { amount: 2 });
    }

    #[test]
    fn test_town_portal_emits_transition_event() {
        let mut state = GameState::for_testing(arena(&[]));
        assert!(matches!(
            TurnProcessor::resolve_round(&mut state, PlayerAction::UseTownPortal),
            Err(CairnError::InvalidAction(_))
        ));
        assert_eq!(state.turn_number, 0);

        state.warrior.inventory.add_item(town_portal()).unwrap();
        let outcome =
            TurnProcessor::resolve_round(&mut state, PlayerAction::UseTownPortal).unwrap();

        assert_eq!(
            outcome.events,
            vec![GameEvent::TownPortalOpened {
                map_id: MapId::new("dungeon_1"),
                position: Position::new(5, 5),
            }]
        );
        assert_eq!(state.warrior().inventory.count_named(TOWN_PORTAL), 0);
        assert_eq!(state.turn_number, 1);
    }
}
