use crate::game::structures::{Cell, Grid};
use super::types::{CellId, Direction, RegionId};

/// One square partition of the world: the unit of local search and of portal extraction.
///
/// A region owns its grid exclusively. Its shape is fixed at world-build time;
/// only cell contents change afterwards.
#[derive(Clone, Debug)]
pub struct Region {
    pub id: RegionId,
    pub grid: Grid,
}

impl Region {
    pub fn new(id: RegionId, grid: Grid) -> Self {
        Self { id, grid }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.grid.size()
    }

    #[inline]
    pub fn contains(&self, cell: CellId) -> bool {
        cell.region == self.id && self.grid.in_bounds(cell.x, cell.z)
    }

    #[inline]
    pub fn cell_id(&self, x: usize, z: usize) -> CellId {
        CellId::new(self.id, x, z)
    }

    #[track_caller]
    pub fn cell(&self, id: CellId) -> &Cell {
        debug_assert_eq!(id.region, self.id, "cell {id:?} looked up in region {:?}", self.id);
        self.grid.cell(id.x, id.z)
    }
}

/// The 2D lattice of regions making up a world, stored row-major (`z * size + x`).
#[derive(Clone, Debug)]
pub struct RegionLattice {
    size: usize,
    region_size: usize,
    regions: Vec<Region>,
}

impl RegionLattice {
    /// Build a `size` x `size` lattice; `cell_at` receives world-space coordinates.
    pub fn from_fn(
        size: usize,
        region_size: usize,
        mut cell_at: impl FnMut(usize, usize) -> Cell,
    ) -> Self {
        assert!(size > 0, "world must contain at least one region");
        let mut regions = Vec::with_capacity(size * size);
        for rz in 0..size {
            for rx in 0..size {
                let grid = Grid::from_fn(region_size, |x, z| {
                    cell_at(rx * region_size + x, rz * region_size + z)
                });
                regions.push(Region::new(RegionId::new(rx, rz), grid));
            }
        }
        Self {
            size,
            region_size,
            regions,
        }
    }

    /// Regions along each lattice axis.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Cells along each region axis.
    #[inline]
    pub fn region_size(&self) -> usize {
        self.region_size
    }

    /// Cells along each world axis.
    #[inline]
    pub fn world_cells(&self) -> usize {
        self.size * self.region_size
    }

    pub fn get(&self, id: RegionId) -> Option<&Region> {
        if id.x < self.size && id.z < self.size {
            Some(&self.regions[id.z * self.size + id.x])
        } else {
            None
        }
    }

    /// Whether `cell` names a region inside the lattice and a cell inside that region.
    pub fn contains(&self, cell: CellId) -> bool {
        self.get(cell.region).is_some_and(|region| region.contains(cell))
    }

    #[track_caller]
    pub fn region(&self, id: RegionId) -> &Region {
        self.get(id)
            .unwrap_or_else(|| panic!("region {id:?} outside {0}x{0} lattice", self.size))
    }

    #[track_caller]
    pub fn region_mut(&mut self, id: RegionId) -> &mut Region {
        assert!(id.x < self.size && id.z < self.size, "region {id:?} outside {0}x{0} lattice", self.size);
        &mut self.regions[id.z * self.size + id.x]
    }

    /// Regions in row-major lattice order.
    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter()
    }

    #[track_caller]
    pub fn cell(&self, id: CellId) -> &Cell {
        self.region(id.region).cell(id)
    }

    #[track_caller]
    pub fn cell_mut(&mut self, id: CellId) -> &mut Cell {
        self.region_mut(id.region).grid.cell_mut(id.x, id.z)
    }

    pub fn cell_at(&self, gx: usize, gz: usize) -> Option<CellId> {
        let bound = self.world_cells();
        (gx < bound && gz < bound).then(|| CellId::from_global(gx, gz, self.region_size))
    }

    /// Lattice neighbor of `id` in `direction`, if any.
    pub fn neighbor(&self, id: RegionId, direction: Direction) -> Option<RegionId> {
        let (x, z) = match direction {
            Direction::North => (id.x, id.z + 1),
            Direction::South => (id.x, id.z.checked_sub(1)?),
            Direction::East => (id.x + 1, id.z),
            Direction::West => (id.x.checked_sub(1)?, id.z),
        };
        (x < self.size && z < self.size).then_some(RegionId::new(x, z))
    }
}
