use crate::game::fixed_math::FixedNum;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Position of a region in the world lattice.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize, PartialOrd, Ord)]
pub struct RegionId {
    pub x: usize,
    pub z: usize,
}

impl RegionId {
    pub const fn new(x: usize, z: usize) -> Self {
        Self { x, z }
    }
}

/// Identity of a cell: its region plus region-local coordinates.
///
/// Cells are never relocated, so a `CellId` stays valid for the lifetime of the world.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize, PartialOrd, Ord)]
pub struct CellId {
    pub region: RegionId,
    pub x: usize,
    pub z: usize,
}

impl CellId {
    pub const fn new(region: RegionId, x: usize, z: usize) -> Self {
        Self { region, x, z }
    }

    /// World-space coordinates of this cell.
    #[inline]
    pub fn global(&self, region_size: usize) -> (i64, i64) {
        (
            (self.region.x * region_size + self.x) as i64,
            (self.region.z * region_size + self.z) as i64,
        )
    }

    /// Build a cell id from world-space coordinates.
    #[inline]
    pub fn from_global(gx: usize, gz: usize, region_size: usize) -> Self {
        Self {
            region: RegionId::new(gx / region_size, gz / region_size),
            x: gx % region_size,
            z: gz % region_size,
        }
    }
}

/// Manhattan distance between two cells in world space.
#[inline]
pub fn manhattan(a: CellId, b: CellId, region_size: usize) -> i64 {
    let (ax, az) = a.global(region_size);
    let (bx, bz) = b.global(region_size);
    (ax - bx).abs() + (az - bz).abs()
}

/// A found path: the cells to walk, in order, excluding the start cell, plus the
/// accumulated cost of entering each of them.
///
/// An empty path is only produced when start equals target and means "already arrived".
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Path {
    pub cells: Vec<CellId>,
    pub cost: FixedNum,
}

impl Path {
    pub fn new(cells: Vec<CellId>, cost: FixedNum) -> Self {
        Self { cells, cost }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn last(&self) -> Option<CellId> {
        self.cells.last().copied()
    }
}

/// Expected, recoverable query failures. Callers branch on these; neither is retried.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("target cell {0:?} is not walkable")]
    InvalidTarget(CellId),
    #[error("no path from {start:?} to {target:?}")]
    Unreachable { start: CellId, target: CellId },
}

/// Node selection policy shared by the local and abstract searches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SearchMode {
    /// Pure accumulated cost.
    Dijkstra,
    /// Accumulated cost plus Manhattan distance to the target in world space.
    #[default]
    AStar,
}

/// Which lattice borders a region scans for portals.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortalScan {
    /// Each shared border is scanned once, from its left/bottom region.
    #[default]
    RightAndTop,
    /// Every region scans all four borders; shared borders are seen twice.
    AllSides,
}

/// Lattice directions for region borders.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// +z
    North,
    /// -z
    South,
    /// +x
    East,
    /// -x
    West,
}

impl Direction {
    /// Scan order for [`PortalScan::AllSides`]: left, bottom, right, top.
    pub const ALL: [Direction; 4] = [
        Direction::West,
        Direction::South,
        Direction::East,
        Direction::North,
    ];

    /// Scan order for [`PortalScan::RightAndTop`].
    pub const RIGHT_AND_TOP: [Direction; 2] = [Direction::East, Direction::North];

    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }
}

/// A pair of mutually walkable cells straddling a region border.
///
/// Only used to seed abstract graph arcs at build time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Portal {
    /// Cell on the scanning region's side.
    pub entrance: CellId,
    /// Lattice counterpart in the neighboring region.
    pub exit: CellId,
    pub direction: Direction,
}

/// Handle of a node in the abstract graph.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Lifetime of an abstract node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Portal cell; lives as long as the graph.
    Permanent,
    /// Query endpoint; removed when the query completes.
    Temporary,
}

/// Node membership of a cell, as seen from the graph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum NodeTag {
    #[default]
    None,
    Permanent,
    Temporary,
}

impl From<NodeKind> for NodeTag {
    fn from(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Permanent => NodeTag::Permanent,
            NodeKind::Temporary => NodeTag::Temporary,
        }
    }
}
