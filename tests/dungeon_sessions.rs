//! Sessions on generated dungeons and across map transitions.

use cairn::generation::generate_dungeon;
use cairn::{
    CairnResult, Direction, DungeonMap, GameState, GenerationConfig, MonsterKind, PlayerAction, Position,
    TurnProcessor,
};
use std::collections::HashSet;

#[test]
fn test_generated_dungeon_starts_clean() -> CairnResult<()> {
    for seed in [1, 7, 42, 12345] {
        let map = generate_dungeon("dungeon_1", &GenerationConfig::for_testing(seed))?;
        let state = GameState::for_testing(map);

        assert!(state.map().is_passable(state.warrior().position));
        assert!(state.fog().is_visible(state.warrior().position.x, state.warrior().position.y));
        assert!(state
            .monsters()
            .iter()
            .all(|monster| monster.position != state.warrior().position));
    }
    Ok(())
}

#[test]
fn test_monsters_never_stack_or_enter_walls() -> CairnResult<()> {
    let map = generate_dungeon("dungeon_1", &GenerationConfig::for_testing(99))?;
    let mut state = GameState::for_testing(map);

    for _ in 0..60 {
        if state.is_game_over() {
            break;
        }
        TurnProcessor::resolve_round(&mut state, PlayerAction::Wait)?;

        let mut seen = HashSet::new();
        for monster in state.monsters() {
            assert!(state.map().is_passable(monster.position));
            assert_ne!(monster.position, state.warrior().position);
            assert!(seen.insert(monster.position), "stacked at {}", monster.position);
        }
        assert!(state.warrior().stats.health <= state.warrior().stats.max_health);
    }
    Ok(())
}

#[test]
fn test_same_seed_same_dungeon() -> CairnResult<()> {
    let config = GenerationConfig::for_testing(2024);
    let first = generate_dungeon("dungeon_1", &config)?;
    let second = generate_dungeon("dungeon_1", &config)?;
    assert_eq!(first, second);
    Ok(())
}

fn two_room_maps() -> (DungeonMap, DungeonMap) {
    let mut cave = DungeonMap::open_room("cave", 10, 10);
    cave.player_spawn = Position::new(2, 2);
    cave.add_spawn(MonsterKind::Clurichaun, Position::new(3, 2));
    cave.add_spawn(MonsterKind::Selkie, Position::new(8, 8));

    let mut town = DungeonMap::open_room("overworld", 10, 10);
    town.player_spawn = Position::new(5, 5);
    (cave, town)
}

#[test]
fn test_slain_monsters_stay_dead_on_return() -> CairnResult<()> {
    let (cave, town) = two_room_maps();
    let mut state = GameState::for_testing(cave.clone());

    while state.monsters().iter().any(|m| m.kind == MonsterKind::Clurichaun) {
        TurnProcessor::resolve_round(&mut state, PlayerAction::Attack)?;
    }
    assert!(state.fog().discovered_count(&cave.id) > 0);

    state.enter_map(town, false);
    assert!(state.monsters().is_empty());
    assert!(!state.fog().is_fog_enabled_for_map(&state.map().id));

    state.enter_map(cave.clone(), false);
    assert_eq!(state.monsters().len(), 1);
    assert_eq!(state.monsters()[0].kind, MonsterKind::Selkie);
    assert!(state.fog().is_discovered(4, 4, &cave.id));
    assert_eq!(state.statistics.maps_entered, 3);
    Ok(())
}

#[test]
fn test_regenerated_map_forgets_history() -> CairnResult<()> {
    let (cave, _) = two_room_maps();
    let mut state = GameState::for_testing(cave.clone());

    while state.monsters().iter().any(|m| m.kind == MonsterKind::Clurichaun) {
        TurnProcessor::resolve_round(&mut state, PlayerAction::Attack)?;
    }

    for _ in 0..3 {
        TurnProcessor::resolve_round(&mut state, PlayerAction::Move(Direction::East))?;
    }
    assert!(state.fog().is_discovered(7, 2, &cave.id));

    state.enter_map(cave.clone(), true);
    assert_eq!(state.monsters().len(), 2);
    assert!(!state.is_spawn_killed(&cave.id, 0));
    assert!(!state.fog().is_discovered(7, 2, &cave.id));
    assert!(state.fog().is_discovered(4, 4, &cave.id));
    Ok(())
}
