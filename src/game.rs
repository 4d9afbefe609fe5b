use bevy::prelude::*;

pub mod config;
pub mod fixed_math;
pub mod structures;
pub mod pathfinding;

use config::ConfigPlugin;
use pathfinding::PathfindingPlugin;

/// Config loading, world construction and the pathfinding systems.
pub struct KestrelPlugin;

impl Plugin for KestrelPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((ConfigPlugin, PathfindingPlugin));
    }
}
