//! # Utilities Module
//!
//! Grid/pixel conversion and pathfinding helpers for monster movement.

pub mod math;
pub mod navigation;

pub use math::*;
pub use navigation::*;
