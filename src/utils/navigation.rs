//! # Navigation
//!
//! Pathfinding for monster movement on the tile grid.
//!
//! Movement is 8-connected with unit cost per step, which matches the
//! Chebyshev metric used for every range check. A* from the `pathfinding`
//! crate finds the route; when the target is unreachable a greedy single
//! step is attempted instead.

use crate::{Direction, Position};
use pathfinding::prelude::astar;

/// Finds a shortest 8-connected path from `start` to `goal`.
///
/// `walkable` decides which tiles may be entered. The goal itself is always
/// accepted so a path can end next to (or on) an occupied target tile. The
/// returned path excludes `start` and includes `goal`.
pub fn find_path<F>(start: Position, goal: Position, walkable: F) -> Option<Vec<Position>>
where
    F: Fn(Position) -> bool,
{
    let (mut path, _cost) = astar(
        &start,
        |&pos| {
            pos.adjacent_positions()
                .into_iter()
                .filter(|&next| next == goal || walkable(next))
                .map(|next| (next, 1u32))
                .collect::<Vec<_>>()
        },
        |&pos| pos.chebyshev_distance(goal),
        |&pos| pos == goal,
    )?;

    path.remove(0);
    Some(path)
}

/// Plans the tiles a chaser visits this turn while approaching `target`.
///
/// At most `max_steps` tiles are returned, the chaser never enters the
/// target's tile, and movement stops as soon as the chaser is within
/// `stop_within` of the target. An empty result means the chaser stays put.
pub fn plan_chase<F>(
    start: Position,
    target: Position,
    stop_within: u32,
    max_steps: u32,
    walkable: F,
) -> Vec<Position>
where
    F: Fn(Position) -> bool,
{
    let mut steps = Vec::new();
    if start.chebyshev_distance(target) <= stop_within {
        return steps;
    }

    match find_path(start, target, &walkable) {
        Some(path) => {
            for pos in path {
                if steps.len() as u32 >= max_steps || pos == target {
                    break;
                }
                steps.push(pos);
                if pos.chebyshev_distance(target) <= stop_within {
                    break;
                }
            }
        }
        None => {
            if max_steps > 0 {
                if let Some(step) = greedy_step(start, target, &walkable) {
                    steps.push(step);
                }
            }
        }
    }

    steps
}

/// Takes one step that reduces the distance to `target`, if any is open.
///
/// Tries the diagonal first, then the axis with the larger gap, then the
/// other axis.
pub fn greedy_step<F>(start: Position, target: Position, walkable: F) -> Option<Position>
where
    F: Fn(Position) -> bool,
{
    let delta = target - start;
    let (sx, sy) = (delta.x.signum(), delta.y.signum());

    let mut candidates = vec![Position::new(sx, sy)];
    if delta.x.abs() > delta.y.abs() {
        candidates.push(Position::new(sx, 0));
        candidates.push(Position::new(0, sy));
    } else {
        candidates.push(Position::new(0, sy));
        candidates.push(Position::new(sx, 0));
    }

    let current = start.chebyshev_distance(target);
    candidates
        .into_iter()
        .filter(|offset| Direction::from_delta(*offset).is_some())
        .map(|offset| start + offset)
        .find(|&next| next != target && walkable(next) && next.chebyshev_distance(target) < current)
}
