mod types;
mod region;
mod astar;
mod portals;
mod graph;
mod graph_build;
mod world;
mod navigation;
mod systems;
mod debug;


// ============================================================================
// PUBLIC API
// ============================================================================

pub use types::{
    manhattan, CellId, Direction, NodeId, NodeKind, NodeTag, Path, PathError, Portal, PortalScan,
    RegionId, SearchMode,
};
pub use region::{Region, RegionLattice};
pub use astar::{find_path_local, find_path_local_observed};
pub use portals::extract_portals;
pub use graph::{AbstractGraph, AbstractNode, Arcs};
pub use graph_build::build_graph;
pub use world::World;
pub use navigation::{Mover, MoverEvent};
pub use systems::{MoverUpdate, PathRequest};
pub use debug::{NoTrace, SearchEvent, SearchEventKind, SearchObserver, SearchTrace};

use bevy::prelude::*;

pub struct PathfindingPlugin;

impl Plugin for PathfindingPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<PathRequest>();
        app.add_message::<MoverUpdate>();
        app.add_systems(
            FixedUpdate,
            (systems::process_path_requests, systems::follow_path)
                .chain()
                .run_if(resource_exists::<World>),
        );
    }
}
