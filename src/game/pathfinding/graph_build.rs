use bevy::log::info;
use kestrel_macros::profile;
use std::time::Instant;

use super::astar::find_path_local;
use super::graph::AbstractGraph;
use super::portals::extract_portals;
use super::region::RegionLattice;
use super::types::{NodeKind, PortalScan, RegionId, SearchMode};
use crate::game::fixed_math::FixedNum;

/// Build the abstract graph for `lattice` from scratch.
///
/// Two passes over the regions in row-major order:
/// 1. extract each region's portals, creating (or reusing) a permanent node on
///    both sides and linking them with an arc of weight 1;
/// 2. link every reachable pair of nodes inside each region with the cost of
///    their local path.
#[profile(5)]
pub fn build_graph(lattice: &RegionLattice, mode: SearchMode, scan: PortalScan) -> AbstractGraph {
    let build_start = Instant::now();
    info!(
        "[GRAPH BUILD] Start: {}x{} regions of {}x{} cells ({:?}, {:?})",
        lattice.size(),
        lattice.size(),
        lattice.region_size(),
        lattice.region_size(),
        mode,
        scan
    );

    let mut graph = AbstractGraph::new(mode);

    let mut portal_count = 0;
    for region in lattice.iter() {
        for portal in extract_portals(lattice, region.id, scan) {
            let entrance = graph.add_node(lattice, portal.entrance, NodeKind::Permanent);
            let exit = graph.add_node(lattice, portal.exit, NodeKind::Permanent);
            graph.add_arc(entrance, exit, FixedNum::ONE);
            portal_count += 1;
        }
    }
    info!(
        "[GRAPH BUILD] Found {} portals, {} nodes",
        portal_count,
        graph.node_count()
    );

    let mut intra_arcs = 0;
    for region in lattice.iter() {
        intra_arcs += connect_region(&mut graph, lattice, region.id);
    }

    info!(
        "[GRAPH BUILD] Complete: {} nodes, {} portal links, {} intra-region links in {:?}",
        graph.node_count(),
        portal_count,
        intra_arcs,
        build_start.elapsed()
    );
    graph
}

/// Link every pair of `region_id`'s nodes that local search can connect. Returns the number of links.
fn connect_region(graph: &mut AbstractGraph, lattice: &RegionLattice, region_id: RegionId) -> usize {
    let region = lattice.region(region_id);
    let nodes = graph.region_nodes(region_id).to_vec();
    let mode = graph.mode();

    let mut links = 0;
    for (i, &a) in nodes.iter().enumerate() {
        for &b in &nodes[i + 1..] {
            let (cell_a, cell_b) = (graph[a].cell, graph[b].cell);
            if let Ok(path) = find_path_local(region, cell_a, cell_b, mode) {
                graph.add_arc(a, b, path.cost);
                links += 1;
            }
        }
    }
    links
}
