/// Shared data structures used across the pathfinding modules
///
/// This module contains the leaf terrain data that regions are made of.

mod grid;

pub use grid::{Cell, Grid, Terrain, TerrainCosts};
