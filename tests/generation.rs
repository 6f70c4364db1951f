use std::sync::{Arc, Mutex};

use territory_mapgen::config::GuaranteedResources;
use territory_mapgen::rivers::MAX_RIVER_STEPS;
use territory_mapgen::{
    ConfigError, GridPosition, GridStore, PlacedObjectRef, ResourceKind, TerrainCategory,
    Territory, WorldConfig, WorldGenerator, audit,
};

fn generate(config: WorldConfig, width: u32, height: u32, seed: u64) -> GridStore {
    let mut grid = GridStore::new(width, height, 1.0);
    let mut generator = WorldGenerator::new(config).expect("valid config");
    generator.generate(&mut grid, seed).expect("generation succeeds");
    grid
}

fn is_border(grid: &GridStore, pos: GridPosition) -> bool {
    pos.x == 0 || pos.y == 0 || pos.x == grid.width() as i32 - 1 || pos.y == grid.height() as i32 - 1
}

#[test]
fn same_seed_gives_identical_world() {
    let a = generate(WorldConfig::default(), 48, 40, 2024);
    let b = generate(WorldConfig::default(), 48, 40, 2024);
    assert_eq!(a.cells(), b.cells());
}

#[test]
fn regeneration_on_same_grid_is_reproducible() {
    let mut grid = GridStore::new(32, 32, 1.0);
    let mut generator = WorldGenerator::new(WorldConfig::default()).unwrap();

    generator.generate(&mut grid, 5).unwrap();
    let first = grid.cells().to_vec();
    generator.generate(&mut grid, 99).unwrap();
    let report = generator.generate(&mut grid, 5).unwrap();

    assert_eq!(grid.cells(), first.as_slice());
    assert_eq!(report.seed, 5);
}

#[test]
fn random_seeds_give_different_worlds() {
    let mut generator = WorldGenerator::new(WorldConfig::default()).unwrap();
    let mut grid = GridStore::new(48, 48, 1.0);

    let first = generator.generate_random(&mut grid).unwrap();
    let first_terrain: Vec<_> = grid.cells().iter().map(|c| c.terrain).collect();
    let second = generator.generate_random(&mut grid).unwrap();
    let second_terrain: Vec<_> = grid.cells().iter().map(|c| c.terrain).collect();

    assert_ne!(first.seed, second.seed);
    assert_ne!(first_terrain, second_terrain);
}

#[test]
fn outer_ring_is_always_water() {
    for (width, height) in [(3, 3), (3, 8), (7, 4), (10, 10), (25, 13), (40, 40)] {
        for seed in [0, 1, 77] {
            let grid = generate(WorldConfig::default(), width, height, seed);
            for pos in grid.positions() {
                if is_border(&grid, pos) {
                    assert_eq!(
                        grid.terrain_at(pos.x, pos.y),
                        TerrainCategory::Water,
                        "{width}x{height} seed {seed} at {pos}"
                    );
                }
            }
        }
    }
}

#[test]
fn buildability_follows_terrain() {
    for seed in 0..8 {
        let grid = generate(WorldConfig::default(), 40, 30, seed);
        for cell in grid.cells() {
            assert_eq!(
                cell.is_buildable,
                cell.terrain.is_buildable_by_default(),
                "{cell:?}"
            );
        }
    }
}

#[test]
fn guaranteed_minimums_hold_per_territory() {
    let config = WorldConfig {
        guaranteed: GuaranteedResources {
            min_wood_nodes: 3,
            min_iron_nodes: 2,
        },
        ..WorldConfig::default()
    };

    for seed in [1, 12345, 54321, 99999] {
        let mut grid = GridStore::new(40, 40, 1.0);
        let mut generator = WorldGenerator::new(config.clone()).unwrap();
        let report = generator.generate(&mut grid, seed).unwrap();
        assert!(!report.has_shortfall(), "seed {seed}: {:?}", report.shortfalls);

        let balance = audit(&grid);
        for territory in Territory::ALL {
            assert!(balance.territory_count(territory, ResourceKind::Wood) >= 3);
            assert!(balance.territory_count(territory, ResourceKind::Iron) >= 2);
        }
    }
}

#[test]
fn resources_sit_on_matching_terrain() {
    for seed in 0..6 {
        let grid = generate(WorldConfig::default(), 36, 36, seed);
        for cell in grid.cells() {
            if let Some(resource) = cell.natural_resource {
                assert_eq!(Some(cell.terrain), resource.kind.target_terrain());
                let range = match resource.kind {
                    ResourceKind::Wood => 2..=5,
                    ResourceKind::Iron => 1..=4,
                    ResourceKind::Food => panic!("food is never generated"),
                };
                assert!(range.contains(&resource.amount));
            }
        }
    }
}

#[test]
fn rivers_are_bounded_and_survive_outside_bases() {
    let mut config = WorldConfig::default();
    config.rivers.count = 6;
    let generator = WorldGenerator::new(config).unwrap();

    for seed in 0..10 {
        let (_, report) = generator.build_tiles(60, 60, seed).unwrap();
        for river in &report.rivers {
            assert!(river.cells.len() <= MAX_RIVER_STEPS);
            assert!(!river.cells.contains(&river.source));
        }
    }

    // Вне стартовых баз русла доживают до итоговой карты
    let mut grid = GridStore::new(60, 60, 1.0);
    let mut generator = generator;
    let report = generator.generate(&mut grid, 3).unwrap();
    let in_base = |pos: &GridPosition| {
        report.bases.iter().any(|base| {
            (pos.x - base.center.x).unsigned_abs() <= base.radius
                && (pos.y - base.center.y).unsigned_abs() <= base.radius
        })
    };
    for river in &report.rivers {
        for pos in &river.cells {
            if in_base(pos) {
                continue;
            }
            assert_eq!(grid.terrain_at(pos.x, pos.y), TerrainCategory::River, "{pos}");
            assert!(!grid.is_buildable(pos.x, pos.y));
        }
    }
}

#[test]
fn small_map_scenario() {
    let mut config = WorldConfig::default();
    config.rivers.count = 0;
    config.guaranteed = GuaranteedResources {
        min_wood_nodes: 1,
        min_iron_nodes: 1,
    };
    config.resources.wood_density = 0.0;
    config.resources.iron_density = 0.0;

    let mut grid = GridStore::new(10, 10, 1.0);
    let mut generator = WorldGenerator::new(config).unwrap();
    let report = generator.generate(&mut grid, 0).unwrap();

    for pos in grid.positions() {
        if is_border(&grid, pos) {
            assert_eq!(grid.terrain_at(pos.x, pos.y), TerrainCategory::Water);
        }
    }
    // Центральные строки у середины по горизонтали расчищены базами
    assert_eq!(grid.terrain_at(5, 4), TerrainCategory::Grass);
    assert_eq!(grid.terrain_at(5, 5), TerrainCategory::Grass);
    assert!(grid.is_buildable(5, 4));

    assert!(!report.has_shortfall());
    let balance = audit(&grid);
    for territory in Territory::ALL {
        assert_eq!(balance.territory_count(territory, ResourceKind::Wood), 1);
        assert_eq!(balance.territory_count(territory, ResourceKind::Iron), 1);
    }
    assert!(!balance.is_imbalanced());
}

#[test]
fn small_map_with_default_density_has_one_node_per_territory() {
    let mut config = WorldConfig::default();
    config.rivers.count = 0;
    config.guaranteed = GuaranteedResources {
        min_wood_nodes: 1,
        min_iron_nodes: 1,
    };

    let mut grid = GridStore::new(10, 10, 1.0);
    let mut generator = WorldGenerator::new(config).unwrap();
    let report = generator.generate(&mut grid, 0).unwrap();

    assert!(!report.has_shortfall());
    let balance = audit(&grid);
    for territory in Territory::ALL {
        assert_eq!(balance.territory_count(territory, ResourceKind::Wood), 1);
        assert_eq!(balance.territory_count(territory, ResourceKind::Iron), 1);
    }
}

#[test]
fn tiny_grid_reports_shortfall() {
    // 3x2: нет внутренних клеток, только вода
    let mut grid = GridStore::new(3, 2, 1.0);
    let mut generator = WorldGenerator::new(WorldConfig::default()).unwrap();
    let report = generator.generate(&mut grid, 8).unwrap();

    assert!(report.has_shortfall());
    assert_eq!(report.shortfalls.len(), 4);
    assert!(grid.cells().iter().all(|c| c.terrain == TerrainCategory::Water));
}

#[test]
fn generation_keeps_occupants_and_notifies() {
    let mut grid = GridStore::new(20, 20, 1.0);
    let building = GridPosition::new(10, 2);
    grid.set_occupant(building, PlacedObjectRef(1));

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    grid.subscribe(move |pos| sink.lock().unwrap().push(pos));

    let mut generator = WorldGenerator::new(WorldConfig::default()).unwrap();
    let report = generator.generate(&mut grid, 42).unwrap();

    assert_eq!(grid.occupant(building), Some(PlacedObjectRef(1)));
    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), report.changed_cells);
    // Вода по краю отличается от травы по умолчанию
    assert!(seen.contains(&GridPosition::new(0, 0)));
}

#[test]
fn invalid_thresholds_abort_before_mutation() {
    let mut config = WorldConfig::default();
    config.continent.water_level = 0.9;
    assert!(matches!(
        WorldGenerator::new(config),
        Err(ConfigError::ThresholdOrder { .. })
    ));
}

#[test]
fn configured_seed_is_used() {
    let config = WorldConfig {
        seed: 31337,
        ..WorldConfig::default()
    };
    let mut grid = GridStore::from_settings(&config.grid);
    let mut generator = WorldGenerator::new(config).unwrap();
    let report = generator.generate_from_config(&mut grid).unwrap();
    assert_eq!(report.seed, 31337);
    assert_eq!(generator.last_seed(), Some(31337));
}

#[test]
fn sample_config_file_loads() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/world.toml");
    let config = WorldConfig::from_toml_file(path).expect("sample config is valid");

    assert_eq!(config.grid.width, 40);
    assert_eq!(config.grid.height, 32);
    assert_eq!(config.continent, WorldConfig::default().continent);
    assert_eq!(config.resources, WorldConfig::default().resources);

    let grid = {
        let mut grid = GridStore::from_settings(&config.grid);
        let mut generator = WorldGenerator::new(config).unwrap();
        generator.generate_from_config(&mut grid).unwrap();
        grid
    };
    assert_eq!(grid.cells().len(), 40 * 32);
}
