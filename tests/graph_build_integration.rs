use bevy::prelude::*;
use kestrel::game::config::PathfindingConfig;
use kestrel::game::pathfinding::{NodeTag, PortalScan, SearchMode, World as NavWorld};
use kestrel::game::KestrelPlugin;

fn app_with_config(config: Option<PathfindingConfig>) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    if let Some(config) = config {
        app.insert_resource(config);
    }
    app.add_plugins(KestrelPlugin);
    app.update(); // Startup: config + world
    app
}

#[test]
fn test_startup_builds_world_from_config_file() {
    let app = app_with_config(None);

    let config = app.world().resource::<PathfindingConfig>();
    assert_eq!(*config, PathfindingConfig::default());

    let world = app.world().resource::<NavWorld>();
    assert_eq!(world.size(), 4);
    assert_eq!(world.region_size(), 10);
    // 4x4 open lattice: 24 shared borders, one portal each.
    assert_eq!(world.graph().node_count(), 48);
    assert!(world.graph().is_consistent());
}

#[test]
fn test_startup_respects_inserted_config() {
    let app = app_with_config(Some(PathfindingConfig {
        world_size: 3,
        region_size: 6,
        search_mode: SearchMode::Dijkstra,
        portal_scan: PortalScan::AllSides,
        ..Default::default()
    }));

    let world = app.world().resource::<NavWorld>();
    assert_eq!(world.world_cells(), 18);
    assert_eq!(world.graph().mode(), SearchMode::Dijkstra);
    assert_eq!(world.graph().node_count(), 24);
}

#[test]
fn test_invalid_inserted_config_falls_back_to_default() {
    let app = app_with_config(Some(PathfindingConfig {
        world_size: 2,
        region_size: 0,
        ..Default::default()
    }));

    assert_eq!(*app.world().resource::<PathfindingConfig>(), PathfindingConfig::default());
    let world = app.world().resource::<NavWorld>();
    assert_eq!(world.size(), 4);
    assert_eq!(world.region_size(), 10);
    assert!(world.graph().is_consistent());
}

#[test]
fn test_startup_keeps_existing_world() {
    let config = PathfindingConfig {
        world_size: 2,
        region_size: 4,
        ..Default::default()
    };
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.insert_resource(config.clone());
    app.insert_resource(NavWorld::with_terrain(config, |gx, _| {
        (Default::default(), gx != 3)
    }));
    app.add_plugins(KestrelPlugin);
    app.update();

    let world = app.world().resource::<NavWorld>();
    // The east borders of the left regions are blocked, so only the two north borders carry portals.
    assert_eq!(world.graph().node_count(), 4);
}

#[test]
fn test_large_world_graph_is_consistent() {
    let mut rng = fastrand::Rng::with_seed(1234);
    let config = PathfindingConfig {
        world_size: 6,
        region_size: 8,
        ..Default::default()
    };
    let world = NavWorld::with_terrain(config, |_, _| (Default::default(), rng.f32() > 0.3));
    let graph = world.graph();

    assert!(graph.is_consistent());
    for (_, node) in graph.nodes() {
        assert!(world.cell(node.cell).walkable, "{:?}", node.cell);
        assert_eq!(graph.tag(node.cell), NodeTag::Permanent);
    }
    for region in world.lattice().iter() {
        for &id in graph.region_nodes(region.id) {
            assert_eq!(graph[id].cell.region, region.id);
        }
    }
}

#[test]
fn test_rebuild_after_edits() {
    let mut app = app_with_config(Some(PathfindingConfig {
        world_size: 2,
        region_size: 5,
        ..Default::default()
    }));

    {
        let mut world = app.world_mut().resource_mut::<NavWorld>();
        // Close the whole east border of region (0,0).
        for z in 0..5 {
            let cell = world.cell_at(4, z).unwrap();
            world.set_walkable(cell, false);
        }
        assert!(world.is_graph_stale());
        world.rebuild_graph();
    }

    let world = app.world().resource::<NavWorld>();
    assert!(!world.is_graph_stale());
    assert_eq!(world.graph().node_count(), 6);
    assert!(world.graph().is_consistent());
}
