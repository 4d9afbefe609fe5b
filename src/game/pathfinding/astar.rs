use bevy::log::debug;
use fixedbitset::FixedBitSet;
use kestrel_macros::profile;

use crate::game::fixed_math::{FixedNum, UNREACHED};
use super::debug::{NoTrace, SearchObserver};
use super::region::Region;
use super::types::{manhattan, CellId, Path, PathError, SearchMode};

/// Heuristic term for `cell` under `mode`: zero for Dijkstra, world-space
/// Manhattan distance to `target` for A*.
#[inline]
pub(super) fn heuristic(mode: SearchMode, cell: CellId, target: CellId, region_size: usize) -> FixedNum {
    match mode {
        SearchMode::Dijkstra => FixedNum::ZERO,
        SearchMode::AStar => FixedNum::from_num(manhattan(cell, target, region_size)),
    }
}

/// Weighted shortest path between two cells of one region.
///
/// See [`find_path_local_observed`].
pub fn find_path_local(
    region: &Region,
    start: CellId,
    target: CellId,
    mode: SearchMode,
) -> Result<Path, PathError> {
    find_path_local_observed(region, start, target, mode, &mut NoTrace)
}

/// Weighted shortest path between two cells of one region, reporting progress to `observer`.
///
/// Every walkable cell (plus the start cell) is a search node. Each iteration
/// closes the unvisited node with the lowest `g + h`, taking the first one in
/// row-major order on ties, and relaxes its up to four axis-aligned unvisited
/// neighbors. Entering a cell costs that cell's multiplier; the start cell is
/// free. Linear minimum scan, so O(N²) in the number of cells, which is fine
/// for the bounded region sizes this runs on.
///
/// Returns the cells after `start` up to and including `target`, and the
/// accumulated cost. `start == target` yields an empty path with zero cost.
#[profile(1)]
pub fn find_path_local_observed<O: SearchObserver>(
    region: &Region,
    start: CellId,
    target: CellId,
    mode: SearchMode,
    observer: &mut O,
) -> Result<Path, PathError> {
    assert!(region.contains(start), "start {start:?} is not in region {:?}", region.id);
    assert!(region.contains(target), "target {target:?} is not in region {:?}", region.id);

    let grid = &region.grid;
    if !grid.cell(target.x, target.z).walkable {
        return Err(PathError::InvalidTarget(target));
    }

    let region_size = grid.size();
    let count = grid.len();
    let start_idx = grid.get_index(start.x, start.z);
    let target_idx = grid.get_index(target.x, target.z);

    let mut g = vec![UNREACHED; count];
    let mut h = vec![FixedNum::ZERO; count];
    let mut previous: Vec<Option<usize>> = vec![None; count];

    // Unvisited set. Unwalkable cells never enter it.
    let mut open = FixedBitSet::with_capacity(count);
    for idx in 0..count {
        if idx == start_idx || grid.cell_by_index(idx).walkable {
            open.insert(idx);
        }
    }
    g[start_idx] = FixedNum::ZERO;
    h[start_idx] = heuristic(mode, start, target, region_size);

    let mut iteration: u32 = 0;
    loop {
        let mut best: Option<(usize, FixedNum)> = None;
        for idx in open.ones() {
            let f = g[idx].saturating_add(h[idx]);
            if best.map_or(true, |(_, best_f)| f < best_f) {
                best = Some((idx, f));
            }
        }

        let current = match best {
            Some((idx, _)) if g[idx] != UNREACHED => idx,
            _ => {
                debug!(
                    "[PATHFINDING] Local search {:?} -> {:?} exhausted after {} iterations",
                    start, target, iteration
                );
                return Err(PathError::Unreachable { start, target });
            }
        };

        open.set(current, false);
        let (cx, cz) = grid.coords(current);
        observer.visited(region.cell_id(cx, cz), iteration);

        if current == target_idx {
            break;
        }

        let current_g = g[current];
        for (nx, nz) in grid.neighbors(cx, cz) {
            let ni = grid.get_index(nx, nz);
            if !open.contains(ni) {
                continue;
            }

            let neighbor = region.cell_id(nx, nz);
            observer.relaxed(neighbor, iteration);

            let tentative_g = current_g + grid.cell_by_index(ni).cost;
            let tentative_h = heuristic(mode, neighbor, target, region_size);

            if tentative_g.saturating_add(tentative_h) < g[ni].saturating_add(h[ni]) {
                g[ni] = tentative_g;
                h[ni] = tentative_h;
                previous[ni] = Some(current);
            }
        }

        iteration += 1;
    }

    let mut cells = Vec::new();
    let mut tail = target_idx;
    while tail != start_idx {
        let (x, z) = grid.coords(tail);
        let cell = region.cell_id(x, z);
        observer.on_path(cell, iteration + cells.len() as u32 + 1);
        cells.push(cell);
        let Some(prev) = previous[tail] else {
            unreachable!("closed cell {cell:?} has no predecessor");
        };
        tail = prev;
    }
    cells.reverse();

    Ok(Path::new(cells, g[target_idx]))
}
