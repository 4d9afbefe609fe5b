use bevy::log::debug;
use fixedbitset::FixedBitSet;
use kestrel_macros::profile;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::ops::{Index, IndexMut};

use crate::game::fixed_math::{FixedNum, UNREACHED};
use super::astar::{find_path_local, find_path_local_observed, heuristic};
use super::debug::SearchObserver;
use super::region::RegionLattice;
use super::types::{CellId, NodeId, NodeKind, NodeTag, Path, PathError, RegionId, SearchMode};

pub type Arcs = SmallVec<[(NodeId, FixedNum); 8]>;

/// A portal cell (permanent) or a query endpoint (temporary) in the abstract graph.
#[derive(Clone, Debug)]
pub struct AbstractNode {
    pub cell: CellId,
    pub kind: NodeKind,
    /// Outgoing arcs. Every arc has a reverse twin with the same weight.
    pub arcs: Arcs,
    // Per-query search state, reset at the start of every abstract search.
    pub g: FixedNum,
    pub h: FixedNum,
    pub previous: Option<NodeId>,
}

impl AbstractNode {
    fn new(cell: CellId, kind: NodeKind) -> Self {
        Self {
            cell,
            kind,
            arcs: Arcs::new(),
            g: UNREACHED,
            h: FixedNum::ZERO,
            previous: None,
        }
    }

    pub fn arc_to(&self, other: NodeId) -> Option<FixedNum> {
        self.arcs.iter().find(|(n, _)| *n == other).map(|&(_, w)| w)
    }
}

/// Sparse graph over portal cells, used for cross-region queries.
///
/// Nodes live in an arena addressed by [`NodeId`]; freed slots are reused.
/// Besides the arena the graph keeps the global node list (insertion order,
/// which is also the search tie-break order), one node list per region, and a
/// cell to node lookup. A node is present in all of them or in none.
///
/// Searches write into the nodes' `g`/`h`/`previous` fields and graft
/// temporary nodes, so queries need exclusive access (`&mut self`).
#[derive(Clone, Debug, Default)]
pub struct AbstractGraph {
    mode: SearchMode,
    nodes: Vec<Option<AbstractNode>>,
    free: Vec<NodeId>,
    order: Vec<NodeId>,
    region_nodes: BTreeMap<RegionId, Vec<NodeId>>,
    node_at: FxHashMap<CellId, NodeId>,
}

impl Index<NodeId> for AbstractGraph {
    type Output = AbstractNode;

    #[track_caller]
    fn index(&self, id: NodeId) -> &AbstractNode {
        self.nodes[id.index()]
            .as_ref()
            .unwrap_or_else(|| panic!("stale node handle {id:?}"))
    }
}

impl IndexMut<NodeId> for AbstractGraph {
    #[track_caller]
    fn index_mut(&mut self, id: NodeId) -> &mut AbstractNode {
        self.nodes[id.index()]
            .as_mut()
            .unwrap_or_else(|| panic!("stale node handle {id:?}"))
    }
}

impl AbstractGraph {
    pub fn new(mode: SearchMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    /// Live nodes, permanent and temporary.
    pub fn node_count(&self) -> usize {
        self.order.len()
    }

    pub fn node(&self, id: NodeId) -> Option<&AbstractNode> {
        self.nodes.get(id.index()).and_then(Option::as_ref)
    }

    pub fn node_at(&self, cell: CellId) -> Option<NodeId> {
        self.node_at.get(&cell).copied()
    }

    pub fn tag(&self, cell: CellId) -> NodeTag {
        self.node_at(cell)
            .map(|id| self[id].kind.into())
            .unwrap_or_default()
    }

    /// Nodes of `region`, in insertion order.
    pub fn region_nodes(&self, region: RegionId) -> &[NodeId] {
        self.region_nodes.get(&region).map_or(&[], Vec::as_slice)
    }

    /// Live nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &AbstractNode)> + '_ {
        self.order.iter().map(move |&id| (id, &self[id]))
    }

    /// Directed arcs, counting each undirected link twice.
    pub fn arc_count(&self) -> usize {
        self.nodes().map(|(_, node)| node.arcs.len()).sum()
    }

    /// Set the weight of the link between `a` and `b` in both directions.
    pub fn add_arc(&mut self, a: NodeId, b: NodeId, weight: FixedNum) {
        debug_assert_ne!(a, b, "self-loop on {a:?}");
        self.set_arc(a, b, weight);
        self.set_arc(b, a, weight);
    }

    fn set_arc(&mut self, from: NodeId, to: NodeId, weight: FixedNum) {
        let arcs = &mut self[from].arcs;
        match arcs.iter_mut().find(|(n, _)| *n == to) {
            Some(arc) => arc.1 = weight,
            None => arcs.push((to, weight)),
        }
    }

    /// Node for `cell`, creating it if the cell has none yet.
    ///
    /// A cell never holds more than one node: if one exists (of either kind)
    /// it is returned unchanged. A new temporary node is linked to every other
    /// node of its region it can reach by local search.
    pub fn add_node(&mut self, lattice: &RegionLattice, cell: CellId, kind: NodeKind) -> NodeId {
        if let Some(id) = self.node_at(cell) {
            return id;
        }

        let node = AbstractNode::new(cell, kind);
        let id = match self.free.pop() {
            Some(id) => {
                self.nodes[id.index()] = Some(node);
                id
            }
            None => {
                self.nodes.push(Some(node));
                NodeId((self.nodes.len() - 1) as u32)
            }
        };

        let peers = self.region_nodes.entry(cell.region).or_default();
        let peers_before = peers.clone();
        peers.push(id);
        self.order.push(id);
        self.node_at.insert(cell, id);

        if kind == NodeKind::Temporary {
            let region = lattice.region(cell.region);
            for peer in peers_before {
                let peer_cell = self[peer].cell;
                if let Ok(path) = find_path_local(region, cell, peer_cell, self.mode) {
                    self.add_arc(id, peer, path.cost);
                }
            }
            debug!(
                "[PATHFINDING] Grafted temporary node {:?} at {:?} with {} arcs",
                id,
                cell,
                self[id].arcs.len()
            );
        }

        id
    }

    /// Remove a temporary node and every arc pointing at it. Permanent nodes are left alone.
    #[track_caller]
    pub fn remove_node(&mut self, id: NodeId) {
        if self[id].kind == NodeKind::Permanent {
            return;
        }
        let Some(node) = self.nodes[id.index()].take() else {
            return;
        };

        for (other, _) in &node.arcs {
            self[*other].arcs.retain(|(n, _)| *n != id);
        }
        self.order.retain(|&n| n != id);
        if let Some(peers) = self.region_nodes.get_mut(&node.cell.region) {
            peers.retain(|&n| n != id);
        }
        self.node_at.remove(&node.cell);
        self.free.push(id);
    }

    /// Structural check: list membership agrees with the arena, and every arc
    /// points at a live node that links back with the same weight.
    pub fn is_consistent(&self) -> bool {
        let live = self.nodes.iter().filter(|n| n.is_some()).count();
        if live != self.order.len() || live != self.node_at.len() {
            return false;
        }
        let listed: usize = self.region_nodes.values().map(Vec::len).sum();
        if listed != live {
            return false;
        }

        self.order.iter().all(|&id| {
            let Some(node) = self.node(id) else {
                return false;
            };
            self.node_at(node.cell) == Some(id)
                && self.region_nodes(node.cell.region).contains(&id)
                && node.arcs.iter().all(|&(other, weight)| {
                    self.node(other)
                        .is_some_and(|peer| peer.arc_to(id) == Some(weight))
                })
        })
    }

    /// Path from `start` to `target` across regions, at portal granularity.
    ///
    /// Same-region queries go straight to local search. Otherwise temporary
    /// endpoint nodes are grafted in, the whole graph is searched with the
    /// same first-minimum selection as the local search, and the endpoints are
    /// removed again whatever the outcome. The returned cells are node cells
    /// (portal cells plus the target), excluding `start`.
    #[profile(2)]
    pub fn create_abstract_path<O: SearchObserver>(
        &mut self,
        lattice: &RegionLattice,
        start: CellId,
        target: CellId,
        observer: &mut O,
    ) -> Result<Path, PathError> {
        if !lattice.cell(target).walkable {
            return Err(PathError::InvalidTarget(target));
        }
        if start.region == target.region {
            return find_path_local_observed(lattice.region(start.region), start, target, self.mode, observer);
        }

        let start_node = self.add_node(lattice, start, NodeKind::Temporary);
        let target_node = self.add_node(lattice, target, NodeKind::Temporary);

        let result = self.search(lattice.region_size(), start_node, target_node, observer);

        self.remove_node(target_node);
        self.remove_node(start_node);
        debug_assert!(self.is_consistent(), "temporary nodes left dangling arcs");

        result.ok_or(PathError::Unreachable { start, target })
    }

    fn search<O: SearchObserver>(
        &mut self,
        region_size: usize,
        start: NodeId,
        target: NodeId,
        observer: &mut O,
    ) -> Option<Path> {
        let mode = self.mode;
        let target_cell = self[target].cell;

        let mut open = FixedBitSet::with_capacity(self.nodes.len());
        for i in 0..self.order.len() {
            let id = self.order[i];
            let node = &mut self[id];
            node.g = UNREACHED;
            node.h = FixedNum::ZERO;
            node.previous = None;
            open.insert(id.index());
        }
        let start_h = heuristic(mode, self[start].cell, target_cell, region_size);
        self[start].g = FixedNum::ZERO;
        self[start].h = start_h;

        let mut iteration: u32 = 0;
        loop {
            let mut best: Option<(NodeId, FixedNum)> = None;
            for &id in &self.order {
                if !open.contains(id.index()) {
                    continue;
                }
                let node = &self[id];
                let f = node.g.saturating_add(node.h);
                if best.map_or(true, |(_, best_f)| f < best_f) {
                    best = Some((id, f));
                }
            }

            let current = match best {
                Some((id, _)) if self[id].g != UNREACHED => id,
                _ => {
                    debug!(
                        "[PATHFINDING] Abstract search exhausted after {} iterations ({} nodes)",
                        iteration,
                        self.order.len()
                    );
                    return None;
                }
            };

            open.set(current.index(), false);
            observer.visited(self[current].cell, iteration);

            if current == target {
                break;
            }

            let current_g = self[current].g;
            let arcs = self[current].arcs.clone();
            for (neighbor, weight) in arcs {
                if !open.contains(neighbor.index()) {
                    continue;
                }
                let neighbor_cell = self[neighbor].cell;
                observer.relaxed(neighbor_cell, iteration);

                let tentative_g = current_g + weight;
                let tentative_h = heuristic(mode, neighbor_cell, target_cell, region_size);

                let node = &mut self[neighbor];
                if tentative_g.saturating_add(tentative_h) < node.g.saturating_add(node.h) {
                    node.g = tentative_g;
                    node.h = tentative_h;
                    node.previous = Some(current);
                }
            }

            iteration += 1;
        }

        let mut cells = Vec::new();
        let mut tail = target;
        while tail != start {
            let node = &self[tail];
            observer.on_path(node.cell, iteration + cells.len() as u32 + 1);
            cells.push(node.cell);
            let Some(previous) = node.previous else {
                unreachable!("settled node {:?} has no predecessor", node.cell);
            };
            tail = previous;
        }
        cells.reverse();

        Some(Path::new(cells, self[target].g))
    }
}
