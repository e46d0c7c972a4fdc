//! # Cairn Simulator
//!
//! Generates a dungeon and lets a simple autopilot play it headlessly,
//! logging every round. Useful for watching the turn processor, monster AI
//! and fog of war work together without a renderer.

use cairn::generation::generate_dungeon;
use cairn::utils::navigation::find_path;
use cairn::{
    CairnError, CairnResult, Direction, Entity, GameConfig, GameEvent, GameState,
    GenerationConfig, PlayerAction, Position, SkillId, TurnProcessor,
};
use clap::Parser;
use log::{debug, info, warn};

/// Command line arguments for the simulator.
#[derive(Parser, Debug)]
#[command(name = "cairn")]
#[command(about = "Headless turn-based dungeon crawl simulator")]
#[command(version)]
struct Args {
    /// Random seed for dungeon generation
    #[arg(short, long)]
    seed: Option<u64>,

    /// Maximum number of rounds to play
    #[arg(short, long, default_value_t = 500)]
    turns: u64,

    /// JSON file overriding game settings
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    /// Print the map when the run ends
    #[arg(long)]
    show_map: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> CairnResult<()> {
    let args = Args::parse();
    initialize_logging(&args.log_level);

    info!("Starting Cairn simulator v{}", cairn::VERSION);

    let game_config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    let seed = args.seed.unwrap_or(12345);
    info!("Generating dungeon level with seed: {}", seed);

    let map = generate_dungeon("dungeon_1", &GenerationConfig::new(seed))?;
    let mut state = GameState::new(game_config, map);

    run_simulation(&mut state, args.turns)?;
    report(&state);

    if args.show_map {
        println!("{}", state.map().to_ascii());
    }
    Ok(())
}

/// Initializes the logger. `RUST_LOG` takes precedence over the flag.
fn initialize_logging(log_level: &str) {
    let level = match log_level.to_lowercase().as_str() {
        "error" => "error",
        "warn" => "warn",
        "debug" => "debug",
        "trace" => "trace",
        _ => "info",
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_target(false)
        .init();
}

/// Plays rounds until the warrior falls, the dungeon is cleared or the
/// turn limit is hit.
fn run_simulation(state: &mut GameState, max_turns: u64) -> CairnResult<()> {
    while state.turn_number < max_turns {
        if state.is_game_over() {
            info!("The warrior has fallen on turn {}", state.turn_number);
            break;
        }
        if state.monsters().is_empty() {
            info!("Dungeon cleared on turn {}", state.turn_number);
            break;
        }

        let action = choose_action(state);
        let outcome = match TurnProcessor::resolve_round(state, action) {
            Ok(outcome) => outcome,
            Err(CairnError::InvalidAction(reason)) => {
                debug!("{:?} rejected: {}", action, reason);
                TurnProcessor::resolve_round(state, PlayerAction::Wait)?
            }
            Err(err) => return Err(err),
        };

        for event in &outcome.events {
            log_event(state, event);
        }
        if outcome.leveled_up {
            spend_skill_points(state);
        }
    }
    Ok(())
}

/// Learns the lowest unlocked skills and selects the hardest-hitting active one.
fn spend_skill_points(state: &mut GameState) {
    for id in SkillId::all() {
        if state.experience().available_skill_points() == 0 {
            break;
        }
        if state.warrior.skills.knows(id) {
            continue;
        }
        if let Err(err) = state.warrior.learn_skill(id) {
            debug!("Skipping {}: {}", id, err);
        }
    }

    let strongest = state
        .warrior
        .skills
        .learned()
        .filter(|id| !id.skill().is_passive())
        .max_by(|a, b| a.skill().damage_multiplier.total_cmp(&b.skill().damage_multiplier));
    if let Err(err) = state.warrior.set_active_skill(strongest) {
        warn!("Could not select {:?}: {}", strongest, err);
    }
}

/// Picks the next action for the autopilot.
fn choose_action(state: &GameState) -> PlayerAction {
    let warrior = state.warrior();
    let here = warrior.position();

    if warrior.stats().health_fraction() < 0.4 && warrior.inventory.count_restoratives() > 0 {
        return PlayerAction::UseHealthPotion;
    }

    if state
        .monsters()
        .iter()
        .any(|monster| here.chebyshev_distance(monster.position()) <= warrior.attack_range())
    {
        let skill_ready = warrior
            .skills
            .active()
            .is_some_and(|skill| warrior.skills.is_ready(skill.id));
        return if skill_ready {
            PlayerAction::SkillAttack
        } else {
            PlayerAction::Attack
        };
    }

    let visible_target = state
        .monsters()
        .iter()
        .map(|monster| monster.position())
        .filter(|pos| state.fog().is_visible(pos.x, pos.y))
        .min_by_key(|pos| here.chebyshev_distance(*pos));

    let goal = visible_target.or_else(|| nearest_undiscovered(state, here));
    goal.and_then(|goal| step_toward(state, here, goal))
        .map(PlayerAction::Move)
        .unwrap_or(PlayerAction::Wait)
}

/// The closest passable tile the warrior has not yet seen.
fn nearest_undiscovered(state: &GameState, here: Position) -> Option<Position> {
    let map_id = &state.map().id;
    state
        .map()
        .passable_positions()
        .filter(|pos| !state.fog().is_discovered(pos.x, pos.y, map_id))
        .min_by_key(|pos| (here.chebyshev_distance(*pos), pos.y, pos.x))
}

fn step_toward(state: &GameState, here: Position, goal: Position) -> Option<Direction> {
    let path = find_path(here, goal, |pos| state.is_walkable(pos))?;
    let next = *path.first()?;
    if state.is_occupied(next) {
        return None;
    }
    Direction::toward(here, next)
}

fn log_event(state: &GameState, event: &GameEvent) {
    match event {
        GameEvent::Attack {
            damage,
            killed,
            wail,
            ..
        } => {
            let verb = if *wail { "wails at" } else { "hits" };
            debug!("Attack {} for {} (killed: {})", verb, damage, killed);
        }
        GameEvent::EntityDied { name, position, .. } => {
            info!("Turn {}: {} died at {}", state.turn_number, name, position);
        }
        GameEvent::LevelUp { level } => {
            info!("Turn {}: reached level {}", state.turn_number, level);
        }
        GameEvent::SkillUsed { skill } => {
            debug!("Turn {}: used {}", state.turn_number, skill);
        }
        GameEvent::LootDropped { item, position } => {
            info!("{} dropped at {}", item.name, position);
        }
        GameEvent::Message { text, .. } => warn!("{}", text),
        other => debug!("{:?}", other),
    }
}

fn report(state: &GameState) {
    let warrior = state.warrior();
    let stats = &state.statistics;
    info!(
        "Finished after {} turns: level {}, {}/{} HP, {} gold",
        state.turn_number,
        state.experience().current_level(),
        warrior.stats().health,
        warrior.stats().max_health,
        warrior.gold
    );
    info!(
        "Defeated {} monsters, dealt {} damage ({} crits, {} skills), took {} damage, explored {} tiles",
        stats.enemies_defeated,
        stats.damage_dealt,
        stats.critical_hits,
        stats.skills_used,
        stats.damage_taken,
        state.fog().discovered_count(&state.map().id)
    );
}
