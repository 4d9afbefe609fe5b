//! Path following.
//!
//! A [`Mover`] walks a queue of waypoints one cell per step. Hierarchical paths
//! only contain portal-level waypoints, so whenever the next waypoint is more
//! than one step away the mover asks for a fresh path to it and splices the
//! result in its place. This is how coarse paths become walkable cell sequences.

use bevy::log::{debug, warn};
use bevy::prelude::Component;
use std::collections::VecDeque;

use crate::game::fixed_math::to_f32;
use super::types::{manhattan, CellId, Path, PathError};
use super::world::World;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoverEvent {
    /// Moved into a cell.
    Stepped(CellId),
    /// A distant waypoint was replaced by `cells` intermediate cells.
    Refined { waypoint: CellId, cells: usize },
    /// The remaining path cannot be followed; the queue was dropped.
    Blocked { waypoint: CellId, error: PathError },
    /// The last waypoint was reached.
    Arrived(CellId),
}

#[derive(Component, Clone, Debug)]
pub struct Mover {
    current: CellId,
    waypoints: VecDeque<CellId>,
    /// Seconds per step into a cell with cost multiplier 1.
    step_duration: f32,
    /// Time left before the next step may be taken.
    wait: f32,
}

impl Mover {
    pub fn new(current: CellId, step_duration: f32) -> Self {
        Self {
            current,
            waypoints: VecDeque::new(),
            step_duration,
            wait: 0.0,
        }
    }

    pub fn current(&self) -> CellId {
        self.current
    }

    pub fn waypoints(&self) -> &VecDeque<CellId> {
        &self.waypoints
    }

    pub fn is_idle(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Replace the queue with `path`. The mover keeps any remaining wait from its last step.
    pub fn set_path(&mut self, path: &Path) {
        self.waypoints.clear();
        self.waypoints.extend(path.cells.iter().copied());
    }

    pub fn clear(&mut self) {
        self.waypoints.clear();
    }

    /// Advance the mover by `dt` seconds, taking every step that falls due within them.
    ///
    /// A step is due once the wait left by the previous one has elapsed; each
    /// step into a cell adds `step_duration` times that cell's cost multiplier
    /// to the wait. An idle mover starting a path steps straight away.
    pub fn advance(&mut self, dt: f32, world: &mut World) -> Vec<MoverEvent> {
        let mut events = Vec::new();
        if self.waypoints.is_empty() {
            return events;
        }

        let region_size = world.region_size();
        while self.wait < dt {
            let Some(&next) = self.waypoints.front() else {
                break;
            };

            if manhattan(self.current, next, region_size) > 1 {
                match self.refine(next, world) {
                    Ok(path) => {
                        self.waypoints.pop_front();
                        for &cell in path.cells.iter().rev() {
                            self.waypoints.push_front(cell);
                        }
                        debug!(
                            "[MOVER] Refined waypoint {:?} into {} cells",
                            next,
                            path.len()
                        );
                        events.push(MoverEvent::Refined {
                            waypoint: next,
                            cells: path.len(),
                        });
                        continue;
                    }
                    Err(error) => {
                        self.block(next, error, &mut events);
                        return events;
                    }
                }
            }

            if !world.cell(next).walkable {
                self.block(next, PathError::InvalidTarget(next), &mut events);
                return events;
            }

            self.waypoints.pop_front();
            self.current = next;
            self.wait += self.step_duration * to_f32(world.cell(next).cost);
            events.push(MoverEvent::Stepped(next));

            if self.waypoints.is_empty() {
                events.push(MoverEvent::Arrived(next));
                self.wait = 0.0;
                return events;
            }
        }

        self.wait -= dt;
        events
    }

    fn refine(&self, waypoint: CellId, world: &mut World) -> Result<Path, PathError> {
        if self.current.region == waypoint.region {
            world.find_local_path(self.current, waypoint)
        } else {
            world.find_path(self.current, waypoint)
        }
    }

    fn block(&mut self, waypoint: CellId, error: PathError, events: &mut Vec<MoverEvent>) {
        warn!("[MOVER] Path from {:?} blocked at {:?}: {}", self.current, waypoint, error);
        self.waypoints.clear();
        self.wait = 0.0;
        events.push(MoverEvent::Blocked { waypoint, error });
    }
}
