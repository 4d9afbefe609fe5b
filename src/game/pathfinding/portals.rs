use super::region::RegionLattice;
use super::types::{CellId, Direction, Portal, PortalScan, RegionId};

/// Border cell pair at `offset` along the border of `region` facing `direction`.
///
/// The first cell is on `region`'s side, the second is its lattice counterpart in `neighbor`.
fn border_pair(
    region: RegionId,
    neighbor: RegionId,
    direction: Direction,
    offset: usize,
    region_size: usize,
) -> (CellId, CellId) {
    let last = region_size - 1;
    match direction {
        Direction::East => (
            CellId::new(region, last, offset),
            CellId::new(neighbor, 0, offset),
        ),
        Direction::West => (
            CellId::new(region, 0, offset),
            CellId::new(neighbor, last, offset),
        ),
        Direction::North => (
            CellId::new(region, offset, last),
            CellId::new(neighbor, offset, 0),
        ),
        Direction::South => (
            CellId::new(region, offset, 0),
            CellId::new(neighbor, offset, last),
        ),
    }
}

/// Emit one portal at the median of the open run `[run_start, run_end]`.
fn push_portal(
    portals: &mut Vec<Portal>,
    region: RegionId,
    neighbor: RegionId,
    direction: Direction,
    run_start: usize,
    run_end: usize,
    region_size: usize,
) {
    let len = run_end - run_start + 1;
    let (entrance, exit) = border_pair(region, neighbor, direction, run_start + (len >> 1), region_size);
    portals.push(Portal {
        entrance,
        exit,
        direction,
    });
}

/// Portals from `region_id` to its lattice neighbors.
///
/// Each border is scanned pairwise. A maximal run of positions where both
/// sides are walkable collapses into a single portal at the run's median
/// (`len / 2`, rounded down). Borders without a neighbor region, and fully
/// blocked borders, produce nothing.
pub fn extract_portals(lattice: &RegionLattice, region_id: RegionId, scan: PortalScan) -> Vec<Portal> {
    let directions: &[Direction] = match scan {
        PortalScan::RightAndTop => &Direction::RIGHT_AND_TOP,
        PortalScan::AllSides => &Direction::ALL,
    };
    let region_size = lattice.region_size();
    let mut portals = Vec::new();

    for &direction in directions {
        let Some(neighbor) = lattice.neighbor(region_id, direction) else {
            continue;
        };

        let mut start_segment = None;
        for offset in 0..region_size {
            let (inside, outside) = border_pair(region_id, neighbor, direction, offset, region_size);
            let open = lattice.cell(inside).walkable && lattice.cell(outside).walkable;

            if open {
                if start_segment.is_none() {
                    start_segment = Some(offset);
                }
            } else if let Some(start) = start_segment.take() {
                push_portal(&mut portals, region_id, neighbor, direction, start, offset - 1, region_size);
            }
        }
        if let Some(start) = start_segment {
            push_portal(&mut portals, region_id, neighbor, direction, start, region_size - 1, region_size);
        }
    }

    portals
}
