//! # Fog of War
//!
//! Tracks which tiles the warrior has discovered on each map and which tiles
//! are visible right now.
//!
//! Discovery is remembered per map id so a regenerated dungeon never leaks
//! history from an earlier instance. The visible set is a single transient
//! square of Chebyshev radius `visibility_radius` around the warrior and is
//! rebuilt from scratch on every update.

use crate::config::{DEFAULT_VISIBILITY_RADIUS, OVERWORLD_MAP_IDS};
use crate::{MapId, Position};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Discovered and visible tile sets for a play session.
///
/// # Examples
///
/// ```
/// use cairn::{FogOfWar, MapId};
///
/// let dungeon = MapId::new("dungeon_1");
/// let mut fog = FogOfWar::new(2);
/// fog.update_visibility(5, 5, &dungeon);
///
/// assert!(fog.is_visible(7, 7));
/// assert!(!fog.is_visible(8, 5));
/// assert!(fog.is_discovered(3, 3, &dungeon));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FogOfWar {
    visibility_radius: i32,
    overworld_ids: HashSet<MapId>,
    discovered: HashMap<MapId, HashSet<Position>>,
    visible: HashSet<Position>,
}

impl FogOfWar {
    /// Creates an empty fog with the given visibility radius.
    ///
    /// A negative radius is treated as zero (only the warrior's own tile).
    pub fn new(visibility_radius: i32) -> Self {
        Self {
            visibility_radius: visibility_radius.max(0),
            overworld_ids: OVERWORLD_MAP_IDS.iter().map(|id| MapId::new(*id)).collect(),
            discovered: HashMap::new(),
            visible: HashSet::new(),
        }
    }

    /// Replaces the set of map ids treated as overworld (fog disabled).
    pub fn with_overworld_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<MapId>,
    {
        self.overworld_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Returns the Chebyshev radius of the visible square.
    pub fn visibility_radius(&self) -> i32 {
        self.visibility_radius
    }

    /// Recomputes visibility around the warrior and records discoveries.
    ///
    /// The visible set is replaced by the `(2r+1)x(2r+1)` square centred on
    /// the warrior; each of those tiles is added to the map's discovered set.
    pub fn update_visibility(&mut self, player_x: i32, player_y: i32, map_id: &MapId) {
        let radius = self.visibility_radius;
        let discovered = self.discovered.entry(map_id.clone()).or_default();

        self.visible.clear();
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let tile = Position::new(player_x + dx, player_y + dy);
                self.visible.insert(tile);
                discovered.insert(tile);
            }
        }

        debug!(
            "Fog updated on {} around ({}, {}): {} visible, {} discovered",
            map_id,
            player_x,
            player_y,
            self.visible.len(),
            discovered.len()
        );
    }

    /// Checks whether a tile is in the current visible set.
    ///
    /// The visible set belongs to the map of the last update call.
    pub fn is_visible(&self, x: i32, y: i32) -> bool {
        self.visible.contains(&Position::new(x, y))
    }

    /// Checks whether a tile has ever been discovered on a map.
    ///
    /// Maps without any history report false.
    pub fn is_discovered(&self, x: i32, y: i32, map_id: &MapId) -> bool {
        self.discovered
            .get(map_id)
            .is_some_and(|tiles| tiles.contains(&Position::new(x, y)))
    }

    /// Forgets discovery history for one map only.
    pub fn reset_for_map(&mut self, map_id: &MapId) {
        if let Some(tiles) = self.discovered.get_mut(map_id) {
            tiles.clear();
            debug!("Fog history reset for {}", map_id);
        }
    }

    /// Whether fog applies to a map. Only overworld maps are exempt.
    pub fn is_fog_enabled_for_map(&self, map_id: &MapId) -> bool {
        !self.overworld_ids.contains(map_id)
    }

    /// Iterates over the currently visible tiles.
    pub fn visible_tiles(&self) -> impl Iterator<Item = Position> + '_ {
        self.visible.iter().copied()
    }

    /// Number of tiles discovered on a map.
    pub fn discovered_count(&self, map_id: &MapId) -> usize {
        self.discovered.get(map_id).map_or(0, HashSet::len)
    }
}

impl Default for FogOfWar {
    fn default() -> Self {
        Self::new(DEFAULT_VISIBILITY_RADIUS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn dungeon() -> MapId {
        MapId::new("dungeon_1")
    }

    #[test]
    fn test_default_radius() {
        let fog = FogOfWar::default();
        assert_eq!(fog.visibility_radius(), 2);
        assert_eq!(fog.visible_tiles().count(), 0);
    }

    #[test]
    fn test_visible_square_is_chebyshev() {
        let mut fog = FogOfWar::new(2);
        fog.update_visibility(10, 10, &dungeon());

        assert_eq!(fog.visible_tiles().count(), 25);
        // Corners of the square are visible, unlike a Euclidean circle
        assert!(fog.is_visible(8, 8));
        assert!(fog.is_visible(12, 12));
        assert!(!fog.is_visible(13, 10));
        assert!(!fog.is_visible(10, 7));
    }

    #[test]
    fn test_visible_set_is_replaced() {
        let mut fog = FogOfWar::new(1);
        fog.update_visibility(0, 0, &dungeon());
        fog.update_visibility(10, 0, &dungeon());

        assert!(!fog.is_visible(0, 0));
        assert!(fog.is_visible(10, 0));
        // Earlier tiles stay discovered
        assert!(fog.is_discovered(0, 0, &dungeon()));
    }

    #[test]
    fn test_unknown_map_is_not_discovered() {
        let fog = FogOfWar::new(2);
        assert!(!fog.is_discovered(0, 0, &MapId::new("never_seen")));
        assert_eq!(fog.discovered_count(&MapId::new("never_seen")), 0);
    }

    #[test]
    fn test_reset_only_touches_one_map() {
        let other = MapId::new("dungeon_2");
        let mut fog = FogOfWar::new(1);
        fog.update_visibility(3, 3, &other);
        fog.update_visibility(3, 3, &dungeon());

        fog.reset_for_map(&dungeon());

        assert!(!fog.is_discovered(3, 3, &dungeon()));
        assert!(fog.is_discovered(3, 3, &other));
        // Current visible set is untouched
        assert!(fog.is_visible(3, 3));
    }

    #[test]
    fn test_reset_unknown_map_is_noop() {
        let mut fog = FogOfWar::new(1);
        fog.reset_for_map(&MapId::new("nowhere"));
        assert_eq!(fog.discovered_count(&MapId::new("nowhere")), 0);
    }

    #[test]
    fn test_fog_policy() {
        let fog = FogOfWar::default();
        assert!(!fog.is_fog_enabled_for_map(&MapId::new("overworld")));
        assert!(!fog.is_fog_enabled_for_map(&MapId::new("world")));
        assert!(fog.is_fog_enabled_for_map(&dungeon()));

        let custom = FogOfWar::default().with_overworld_ids(["town"]);
        assert!(!custom.is_fog_enabled_for_map(&MapId::new("town")));
        assert!(custom.is_fog_enabled_for_map(&MapId::new("overworld")));
    }

    #[test]
    fn test_zero_radius_sees_own_tile() {
        let mut fog = FogOfWar::new(-3);
        fog.update_visibility(4, 4, &dungeon());
        assert_eq!(fog.visible_tiles().count(), 1);
        assert!(fog.is_visible(4, 4));
    }

    proptest! {
        #[test]
        fn prop_visible_square_is_discovered(
            px in -50i32..50,
            py in -50i32..50,
            radius in 0i32..5,
            qx in -60i32..60,
            qy in -60i32..60,
        ) {
            let mut fog = FogOfWar::new(radius);
            fog.update_visibility(px, py, &dungeon());

            let inside = Position::new(px, py).chebyshev_distance(Position::new(qx, qy)) <= radius as u32;
            prop_assert_eq!(fog.is_visible(qx, qy), inside);
            if inside {
                prop_assert!(fog.is_discovered(qx, qy, &dungeon()));
            }
        }

        #[test]
        fn prop_visible_subset_of_discovered(
            moves in proptest::collection::vec((-20i32..20, -20i32..20), 1..10),
        ) {
            let mut fog = FogOfWar::new(2);
            for (x, y) in moves {
                fog.update_visibility(x, y, &dungeon());
                for tile in fog.visible_tiles() {
                    prop_assert!(fog.is_discovered(tile.x, tile.y, &dungeon()));
                }
            }
        }

        #[test]
        fn prop_update_is_idempotent(px in -30i32..30, py in -30i32..30) {
            let mut fog = FogOfWar::new(2);
            fog.update_visibility(px, py, &dungeon());
            let once = fog.clone();
            fog.update_visibility(px, py, &dungeon());
            prop_assert_eq!(once, fog);
        }

        #[test]
        fn prop_reset_clears_everything(px in -30i32..30, py in -30i32..30, qx in -40i32..40, qy in -40i32..40) {
            let other = MapId::new("dungeon_2");
            let mut fog = FogOfWar::new(2);
            fog.update_visibility(px, py, &other);
            fog.update_visibility(px, py, &dungeon());
            let other_before = fog.is_discovered(qx, qy, &other);

            fog.reset_for_map(&dungeon());

            prop_assert!(!fog.is_discovered(qx, qy, &dungeon()));
            prop_assert_eq!(fog.is_discovered(qx, qy, &other), other_before);
        }
    }
}
