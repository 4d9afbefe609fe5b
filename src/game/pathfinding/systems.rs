use bevy::prelude::*;

use super::navigation::{Mover, MoverEvent};
use super::types::CellId;
use super::world::World as NavWorld;

/// Ask for `entity`'s [`Mover`] to be routed to `goal`.
#[derive(Message, Debug, Clone, Copy)]
pub struct PathRequest {
    pub entity: Entity,
    pub goal: CellId,
}

/// Something happened to a mover during [`follow_path`].
#[derive(Message, Debug, Clone, Copy)]
pub struct MoverUpdate {
    pub entity: Entity,
    pub event: MoverEvent,
}

/// Resolve pending path requests against the world, one at a time.
pub(super) fn process_path_requests(
    mut path_requests: MessageReader<PathRequest>,
    mut world: ResMut<NavWorld>,
    mut movers: Query<&mut Mover>,
    mut updates: MessageWriter<MoverUpdate>,
) {
    if path_requests.is_empty() {
        return;
    }

    let request_count = path_requests.len();
    if request_count > 10 {
        warn!("[PATHFINDING] High path request count: {} pending requests!", request_count);
    }

    for request in path_requests.read() {
        let Ok(mut mover) = movers.get_mut(request.entity) else {
            warn!("[PATHFINDING] Path request for {:?} which has no Mover", request.entity);
            continue;
        };

        let start = mover.current();
        if !world.lattice().contains(request.goal) {
            warn!(
                "[PATHFINDING] Goal {:?} for {:?} is OUT OF BOUNDS! Skipping request",
                request.goal, request.entity
            );
            continue;
        }
        if !world.lattice().contains(start) {
            warn!(
                "[PATHFINDING] Mover {:?} stands at {:?}, outside the world. Skipping request",
                request.entity, start
            );
            continue;
        }

        match world.find_path(start, request.goal) {
            Ok(path) => {
                debug!(
                    "[PATHFINDING] {:?}: {:?} -> {:?}, {} waypoints, cost {}",
                    request.entity,
                    start,
                    request.goal,
                    path.len(),
                    path.cost
                );
                mover.set_path(&path);
                if path.is_empty() {
                    updates.write(MoverUpdate {
                        entity: request.entity,
                        event: MoverEvent::Arrived(start),
                    });
                }
            }
            Err(e) => {
                warn!("[PATHFINDING] {:?}: {}", request.entity, e);
                mover.clear();
            }
        }
    }
}

/// Step every mover by one fixed tick and report what happened.
pub(super) fn follow_path(
    fixed_time: Res<Time<Fixed>>,
    mut world: ResMut<NavWorld>,
    mut movers: Query<(Entity, &mut Mover)>,
    mut updates: MessageWriter<MoverUpdate>,
) {
    let dt = fixed_time.timestep().as_secs_f32();
    for (entity, mut mover) in movers.iter_mut() {
        if mover.is_idle() {
            continue;
        }
        for event in mover.advance(dt, &mut world) {
            updates.write(MoverUpdate { entity, event });
        }
    }
}
