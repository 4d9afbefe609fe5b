use bevy::log::{info, warn};
use bevy::prelude::Resource;

use crate::game::config::PathfindingConfig;
use crate::game::fixed_math::FixedNum;
use crate::game::structures::{Cell, Terrain};
use crate::profile_log;
use super::astar::find_path_local_observed;
use super::debug::{NoTrace, SearchObserver};
use super::graph::AbstractGraph;
use super::graph_build::build_graph;
use super::region::{Region, RegionLattice};
use super::types::{CellId, Path, PathError, RegionId};

/// The navigable world: the region lattice plus the abstract graph built over it.
///
/// Terrain edits go through the setters below. They do not touch the graph;
/// portals stay as extracted until [`World::rebuild_graph`] is called, and
/// queries against a stale graph still run (with a warning).
#[derive(Resource, Clone, Debug)]
pub struct World {
    lattice: RegionLattice,
    graph: AbstractGraph,
    config: PathfindingConfig,
    graph_stale: bool,
    stale_warned: bool,
    queries_served: u64,
}

impl World {
    /// All-grass, fully walkable world shaped by `config`.
    pub fn new(config: PathfindingConfig) -> Self {
        Self::with_terrain(config, |_, _| (Terrain::Grass, true))
    }

    /// World whose cells come from `terrain_at(global_x, global_z) -> (terrain, walkable)`.
    pub fn with_terrain(
        config: PathfindingConfig,
        mut terrain_at: impl FnMut(usize, usize) -> (Terrain, bool),
    ) -> Self {
        let costs = config.terrain_costs;
        let lattice = RegionLattice::from_fn(config.world_size, config.region_size, |gx, gz| {
            let (terrain, walkable) = terrain_at(gx, gz);
            Cell::new(terrain, walkable, &costs)
        });
        let graph = build_graph(&lattice, config.search_mode, config.portal_scan);

        Self {
            lattice,
            graph,
            config,
            graph_stale: false,
            stale_warned: false,
            queries_served: 0,
        }
    }

    pub fn config(&self) -> &PathfindingConfig {
        &self.config
    }

    pub fn lattice(&self) -> &RegionLattice {
        &self.lattice
    }

    pub fn graph(&self) -> &AbstractGraph {
        &self.graph
    }

    /// Regions along each lattice axis.
    pub fn size(&self) -> usize {
        self.lattice.size()
    }

    pub fn region_size(&self) -> usize {
        self.lattice.region_size()
    }

    /// Cells along each world axis.
    pub fn world_cells(&self) -> usize {
        self.lattice.world_cells()
    }

    pub fn is_graph_stale(&self) -> bool {
        self.graph_stale
    }

    pub fn queries_served(&self) -> u64 {
        self.queries_served
    }

    pub fn cell_at(&self, gx: usize, gz: usize) -> Option<CellId> {
        self.lattice.cell_at(gx, gz)
    }

    #[track_caller]
    pub fn cell(&self, id: CellId) -> &Cell {
        self.lattice.cell(id)
    }

    #[track_caller]
    pub fn region(&self, id: RegionId) -> &Region {
        self.lattice.region(id)
    }

    pub fn set_walkable(&mut self, id: CellId, walkable: bool) {
        let cell = self.lattice.cell_mut(id);
        if cell.walkable != walkable {
            cell.walkable = walkable;
            self.mark_stale();
        }
    }

    /// Change a cell's terrain, resolving its cost from the configured terrain costs.
    pub fn set_terrain(&mut self, id: CellId, terrain: Terrain) {
        let cost = self.config.terrain_costs.cost_of(terrain);
        let cell = self.lattice.cell_mut(id);
        if cell.terrain != terrain || cell.cost != cost {
            cell.terrain = terrain;
            cell.cost = cost;
            self.mark_stale();
        }
    }

    /// Override a cell's cost multiplier, independent of its terrain.
    pub fn set_cost_multiplier(&mut self, id: CellId, multiplier: FixedNum) {
        assert!(multiplier > FixedNum::ZERO, "cost multiplier must be positive, got {multiplier}");
        let cell = self.lattice.cell_mut(id);
        if cell.cost != multiplier {
            cell.cost = multiplier;
            self.mark_stale();
        }
    }

    fn mark_stale(&mut self) {
        self.graph_stale = true;
    }

    /// Re-extract portals and rebuild the abstract graph from current terrain.
    pub fn rebuild_graph(&mut self) {
        self.graph = build_graph(&self.lattice, self.config.search_mode, self.config.portal_scan);
        self.graph_stale = false;
        self.stale_warned = false;
        info!("[PATHFINDING] Abstract graph rebuilt ({} nodes)", self.graph.node_count());
    }

    /// Shortest path from `start` to `target`, local or hierarchical as appropriate.
    pub fn find_path(&mut self, start: CellId, target: CellId) -> Result<Path, PathError> {
        self.find_path_observed(start, target, &mut NoTrace)
    }

    pub fn find_path_observed<O: SearchObserver>(
        &mut self,
        start: CellId,
        target: CellId,
        observer: &mut O,
    ) -> Result<Path, PathError> {
        self.queries_served += 1;
        profile_log!(
            self.queries_served,
            "[PATHFINDING] Served {} path queries ({} graph nodes)",
            self.queries_served,
            self.graph.node_count()
        );

        if !self.lattice.cell(target).walkable {
            return Err(PathError::InvalidTarget(target));
        }
        if start.region == target.region {
            return find_path_local_observed(
                self.lattice.region(start.region),
                start,
                target,
                self.config.search_mode,
                observer,
            );
        }

        if self.graph_stale && !self.stale_warned {
            warn!("[PATHFINDING] Terrain changed since the last graph build; portals may be outdated until rebuild_graph()");
            self.stale_warned = true;
        }
        self.graph.create_abstract_path(&self.lattice, start, target, observer)
    }

    /// Cell-by-cell path between two cells of the same region.
    #[track_caller]
    pub fn find_local_path(&self, start: CellId, target: CellId) -> Result<Path, PathError> {
        assert_eq!(start.region, target.region, "local path across regions");
        find_path_local_observed(
            self.lattice.region(start.region),
            start,
            target,
            self.config.search_mode,
            &mut NoTrace,
        )
    }
}
