//! # Grid Mathematics
//!
//! Conversions between tile coordinates and pixel coordinates.
//!
//! Tile coordinates are the source of truth for every entity; pixel positions
//! are derived on demand for the rendering layer.

use crate::config::TILE_SIZE;
use crate::Position;

/// Converts a tile coordinate to the pixel coordinate of its top-left corner.
///
/// # Examples
///
/// ```
/// use cairn::{grid_to_pixel, Position};
///
/// assert_eq!(grid_to_pixel(Position::new(3, 2)), (150, 100));
/// ```
pub fn grid_to_pixel(pos: Position) -> (i32, i32) {
    (pos.x * TILE_SIZE, pos.y * TILE_SIZE)
}

/// Converts a pixel coordinate to the tile that contains it.
///
/// Uses floor division so negative pixels map to negative tiles.
pub fn pixel_to_grid(pixel_x: i32, pixel_y: i32) -> Position {
    Position::new(pixel_x.div_euclid(TILE_SIZE), pixel_y.div_euclid(TILE_SIZE))
}

/// Converts a tile coordinate to screen pixels given the camera's tile offset.
pub fn grid_to_screen(pos: Position, camera: Position) -> (i32, i32) {
    grid_to_pixel(pos - camera)
}

/// Returns the pixel coordinate of the centre of a tile.
pub fn tile_center(pos: Position) -> (i32, i32) {
    let (x, y) = grid_to_pixel(pos);
    (x + TILE_SIZE / 2, y + TILE_SIZE / 2)
}
