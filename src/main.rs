use bevy::ecs::message::Messages;
use bevy::prelude::*;

use kestrel::game::config::{PathfindingConfig, INITIAL_CONFIG_PATH};
use kestrel::game::fixed_math::to_f32;
use kestrel::game::pathfinding::{CellId, Mover, MoverEvent, MoverUpdate, PathRequest, World as NavWorld};
use kestrel::game::structures::Terrain;
use kestrel::game::KestrelPlugin;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use std::fs;
use std::path::PathBuf;

const DEMO_QUERIES: usize = 8;
const MAX_TICKS: usize = 100_000;

fn setup_file_logging() -> String {
    let log_dir = PathBuf::from("logs");
    if !log_dir.exists() {
        if let Err(e) = fs::create_dir_all(&log_dir) {
            eprintln!("Failed to create logs directory: {e}");
        }
    }

    // Keep only the last 25 runs
    cleanup_old_logs(&log_dir, 25);

    let now = chrono::Local::now();
    let log_filename = format!("kestrel_{}.log", now.format("%Y%m%d_%H%M%S"));
    let log_path_str = log_dir.join(&log_filename).to_string_lossy().to_string();

    let file_appender = RollingFileAppender::new(
        Rotation::NEVER, // one file per run
        &log_dir,
        &log_filename,
    );

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false);

    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(false);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("bevy_ecs=info,kestrel=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    log_path_str
}

fn cleanup_old_logs(log_dir: &PathBuf, keep_count: usize) {
    if let Ok(entries) = fs::read_dir(log_dir) {
        let mut log_files: Vec<_> = entries
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .file_name()
                    .and_then(|n| n.to_str())
                    .map(|s| s.starts_with("kestrel") && s.ends_with(".log"))
                    .unwrap_or(false)
            })
            .collect();

        // Oldest first
        log_files.sort_by_key(|e| e.metadata().ok().and_then(|m| m.modified().ok()));

        if log_files.len() > keep_count {
            for file in log_files.iter().take(log_files.len() - keep_count) {
                let _ = fs::remove_file(file.path());
            }
        }
    }
}

/// Build a world with trees and river cells scattered from the configured seed.
/// The two corners used by the walking demo are always left open.
fn scatter_world(config: &PathfindingConfig, rng: &mut StdRng) -> NavWorld {
    let blocked = config.demo_blocked_chance;
    let river = config.demo_river_chance;
    let last = config.world_size * config.region_size - 1;

    NavWorld::with_terrain(config.clone(), |gx, gz| {
        let roll: f32 = rng.random();
        if (gx, gz) == (0, 0) || (gx, gz) == (last, last) {
            (Terrain::Grass, true)
        } else if roll < blocked {
            (Terrain::Grass, false)
        } else if roll < blocked + river {
            (Terrain::River, true)
        } else {
            (Terrain::Grass, true)
        }
    })
}

fn random_walkable(world: &NavWorld, rng: &mut StdRng) -> Option<CellId> {
    let bound = world.world_cells();
    (0..64)
        .filter_map(|_| world.cell_at(rng.random_range(0..bound), rng.random_range(0..bound)))
        .find(|&cell| world.cell(cell).walkable)
}

fn run_queries(world: &mut NavWorld, rng: &mut StdRng) {
    for _ in 0..DEMO_QUERIES {
        let (Some(start), Some(target)) = (random_walkable(world, rng), random_walkable(world, rng)) else {
            continue;
        };
        match world.find_path(start, target) {
            Ok(path) => info!(
                "Query {:?} -> {:?}: {} waypoints, cost {:.1}",
                start,
                target,
                path.len(),
                to_f32(path.cost)
            ),
            Err(e) => info!("Query {:?} -> {:?}: {}", start, target, e),
        }
    }
}

/// Walk one mover corner to corner through the ECS systems and report how it went.
fn walk_mover(config: &PathfindingConfig, world: NavWorld) {
    let start = world.cell_at(0, 0);
    let last = world.world_cells() - 1;
    let goal = world.cell_at(last, last);
    let (Some(start), Some(goal)) = (start, goal) else {
        warn!("World too small for the walking demo");
        return;
    };

    let mut app = App::new();
    app.add_plugins(MinimalPlugins).add_plugins(KestrelPlugin);
    app.insert_resource(config.clone());
    app.insert_resource(world);
    app.update();

    let mover = app
        .world_mut()
        .spawn(Mover::new(start, config.step_duration))
        .id();
    app.world_mut().write_message(PathRequest { entity: mover, goal });

    let mut steps = 0;
    for tick in 0..MAX_TICKS {
        app.world_mut().run_schedule(FixedUpdate);

        let updates: Vec<MoverUpdate> = app
            .world_mut()
            .resource_mut::<Messages<MoverUpdate>>()
            .drain()
            .collect();
        for update in updates {
            match update.event {
                MoverEvent::Stepped(_) => steps += 1,
                MoverEvent::Refined { .. } => {}
                MoverEvent::Arrived(cell) => {
                    info!("Mover arrived at {:?} after {} steps ({} ticks)", cell, steps, tick + 1);
                    return;
                }
                MoverEvent::Blocked { waypoint, error } => {
                    info!("Mover blocked at {:?} after {} steps: {}", waypoint, steps, error);
                    return;
                }
            }
        }

        if app.world().get::<Mover>(mover).is_some_and(Mover::is_idle) {
            info!("Mover has nowhere to go from {:?}", start);
            return;
        }
    }
    warn!("Mover still walking after {} ticks", MAX_TICKS);
}

fn main() {
    let log_file = setup_file_logging();

    println!("╔══════════════════════════════════════════════════════════╗");
    println!("║  Kestrel pathfinding demo - Logging to file             ║");
    println!("╠══════════════════════════════════════════════════════════╣");
    println!("║  Log file: {:<45} ║", log_file);
    println!("╚══════════════════════════════════════════════════════════╝");

    let config = PathfindingConfig::load_or_default(INITIAL_CONFIG_PATH);
    let mut rng = StdRng::seed_from_u64(config.seed);

    let mut world = scatter_world(&config, &mut rng);
    info!(
        "World: {}x{} regions, {} abstract nodes, {} arcs",
        world.size(),
        world.size(),
        world.graph().node_count(),
        world.graph().arc_count()
    );

    run_queries(&mut world, &mut rng);
    walk_mover(&config, world);
}
