use crate::game::fixed_math::FixedNum;
use serde::{Deserialize, Serialize};

/// Kind of ground a cell is made of.
///
/// Blocking content (trees, rocks) is not a terrain kind: it sits on top of a
/// cell and is expressed through [`Cell::walkable`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Terrain {
    #[default]
    Grass,
    River,
}

/// Movement-cost multiplier per terrain kind, resolved once when a cell is created
/// or its terrain changes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainCosts {
    pub grass: f32,
    pub river: f32,
}

impl Default for TerrainCosts {
    fn default() -> Self {
        Self {
            grass: 1.0,
            river: 2.0,
        }
    }
}

impl TerrainCosts {
    pub fn cost_of(&self, terrain: Terrain) -> FixedNum {
        let multiplier = match terrain {
            Terrain::Grass => self.grass,
            Terrain::River => self.river,
        };
        FixedNum::from_num(multiplier)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub terrain: Terrain,
    pub walkable: bool,
    /// Cost of stepping into this cell.
    pub cost: FixedNum,
}

impl Cell {
    pub fn new(terrain: Terrain, walkable: bool, costs: &TerrainCosts) -> Self {
        Self {
            terrain,
            walkable,
            cost: costs.cost_of(terrain),
        }
    }
}

/// Fixed-size square array of cells, stored row-major (`z * size + x`).
///
/// The grid knows nothing about pathfinding; it answers bounds, neighbor and
/// per-cell cost questions for the searches built on top of it.
#[derive(Clone, Debug)]
pub struct Grid {
    size: usize,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn new(size: usize, fill: Cell) -> Self {
        assert!(size > 0, "grid size must be positive");
        Self {
            size,
            cells: vec![fill; size * size],
        }
    }

    /// Build a grid cell by cell from local coordinates.
    pub fn from_fn(size: usize, mut cell_at: impl FnMut(usize, usize) -> Cell) -> Self {
        assert!(size > 0, "grid size must be positive");
        let mut cells = Vec::with_capacity(size * size);
        for z in 0..size {
            for x in 0..size {
                cells.push(cell_at(x, z));
            }
        }
        Self { size, cells }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    pub fn get_index(&self, x: usize, z: usize) -> usize {
        z * self.size + x
    }

    #[inline]
    pub fn coords(&self, index: usize) -> (usize, usize) {
        (index % self.size, index / self.size)
    }

    #[inline]
    pub fn in_bounds(&self, x: usize, z: usize) -> bool {
        x < self.size && z < self.size
    }

    #[track_caller]
    pub fn cell(&self, x: usize, z: usize) -> &Cell {
        assert!(self.in_bounds(x, z), "cell ({x}, {z}) outside {0}x{0} grid", self.size);
        &self.cells[self.get_index(x, z)]
    }

    #[track_caller]
    pub fn cell_mut(&mut self, x: usize, z: usize) -> &mut Cell {
        assert!(self.in_bounds(x, z), "cell ({x}, {z}) outside {0}x{0} grid", self.size);
        let idx = self.get_index(x, z);
        &mut self.cells[idx]
    }

    #[inline]
    pub fn cell_by_index(&self, index: usize) -> &Cell {
        &self.cells[index]
    }

    pub fn is_walkable(&self, x: usize, z: usize) -> bool {
        self.in_bounds(x, z) && self.cells[self.get_index(x, z)].walkable
    }

    pub fn cost(&self, x: usize, z: usize) -> FixedNum {
        self.cell(x, z).cost
    }

    /// Axis-aligned in-grid neighbors of `(x, z)` in the order left, down, right, up.
    pub fn neighbors(&self, x: usize, z: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        let candidates = [
            (x.wrapping_sub(1), z),
            (x, z.wrapping_sub(1)),
            (x + 1, z),
            (x, z + 1),
        ];
        candidates
            .into_iter()
            .filter(move |&(nx, nz)| self.in_bounds(nx, nz))
    }

    pub fn walkable_count(&self) -> usize {
        self.cells.iter().filter(|c| c.walkable).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grass() -> Cell {
        Cell::new(Terrain::Grass, true, &TerrainCosts::default())
    }

    #[test]
    fn test_neighbor_order_and_bounds() {
        let grid = Grid::new(3, grass());

        let inner: Vec<_> = grid.neighbors(1, 1).collect();
        assert_eq!(inner, vec![(0, 1), (1, 0), (2, 1), (1, 2)]);

        let corner: Vec<_> = grid.neighbors(0, 0).collect();
        assert_eq!(corner, vec![(1, 0), (0, 1)]);

        let far_corner: Vec<_> = grid.neighbors(2, 2).collect();
        assert_eq!(far_corner, vec![(1, 2), (2, 1)]);
    }

    #[test]
    fn test_row_major_layout() {
        let grid = Grid::from_fn(4, |x, z| {
            let terrain = if x == 3 { Terrain::River } else { Terrain::Grass };
            Cell::new(terrain, z != 2, &TerrainCosts::default())
        });

        assert_eq!(grid.len(), 16);
        assert_eq!(grid.get_index(3, 1), 7);
        assert_eq!(grid.coords(7), (3, 1));
        assert_eq!(grid.cost(3, 0), FixedNum::from_num(2));
        assert_eq!(grid.cost(0, 0), FixedNum::ONE);
        assert!(!grid.is_walkable(1, 2));
        assert!(!grid.is_walkable(4, 0));
        assert_eq!(grid.walkable_count(), 12);
    }

    #[test]
    fn test_custom_terrain_costs() {
        let costs = TerrainCosts { grass: 1.5, river: 4.0 };
        assert_eq!(costs.cost_of(Terrain::Grass), FixedNum::from_num(1.5));
        assert_eq!(Cell::new(Terrain::River, true, &costs).cost, FixedNum::from_num(4));
    }

    #[test]
    #[should_panic]
    fn test_out_of_bounds_cell_panics() {
        let grid = Grid::new(2, grass());
        let _ = grid.cell(2, 0);
    }
}
