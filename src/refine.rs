use crate::terrain::{TerrainCategory, TerrainTile, TileMap, count_neighbors};
use rand::Rng;
use serde::Serialize;

/// Вероятность пляжа на траве у воды
pub const BEACH_CHANCE: f32 = 0.7;
/// Вероятность зарастания травой одинокого леса
pub const FOREST_PRUNE_CHANCE: f32 = 0.3;
/// Лес с меньшим числом лесных соседей считается одиноким
const MIN_FOREST_NEIGHBORS: usize = 2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RefineStats {
    pub beaches: usize,
    pub pruned_forests: usize,
}

/// Один проход сглаживания местности
///
/// Решения принимаются по копии слоя категорий, снятой до прохода: правила
/// не видят результатов друг друга и уже изменённых соседей.
pub fn refine_terrain<R: Rng + ?Sized>(tiles: &mut TileMap, rng: &mut R) -> RefineStats {
    let (width, height) = (tiles.width, tiles.height);
    let snapshot = tiles.categories();
    let mut stats = RefineStats::default();

    for y in 0..height {
        for x in 0..width {
            match snapshot[tiles.index(x, y)] {
                TerrainCategory::Grass => {
                    let near_water =
                        count_neighbors(&snapshot, width, height, x, y, TerrainCategory::Water) > 0;
                    if near_water && rng.gen_range(0.0..1.0) < BEACH_CHANCE {
                        tiles.set(x, y, TerrainTile::new(TerrainCategory::Sand));
                        stats.beaches += 1;
                    }
                }
                TerrainCategory::Forest => {
                    let forests =
                        count_neighbors(&snapshot, width, height, x, y, TerrainCategory::Forest);
                    if forests < MIN_FOREST_NEIGHBORS && rng.gen_range(0.0..1.0) < FOREST_PRUNE_CHANCE
                    {
                        tiles.set(x, y, TerrainTile::new(TerrainCategory::Grass));
                        stats.pruned_forests += 1;
                    }
                }
                _ => {}
            }
        }
    }

    tracing::debug!(
        target: "mapgen::refine",
        beaches = stats.beaches,
        pruned_forests = stats.pruned_forests,
        "terrain refined"
    );
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn beaches_only_appear_next_to_water() {
        let mut tiles = TileMap::new(12, 12, TerrainCategory::Grass);
        crate::continent::flood_border(&mut tiles);
        let before = tiles.clone();

        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let stats = refine_terrain(&mut tiles, &mut rng);

        assert!(stats.beaches > 0);
        assert_eq!(stats.pruned_forests, 0);
        assert_eq!(tiles.count(TerrainCategory::Sand), stats.beaches);
        for y in 0..12 {
            for x in 0..12 {
                if tiles.category(x, y) == TerrainCategory::Sand {
                    // Песок только во втором кольце от края
                    assert!(x == 1 || y == 1 || x == 10 || y == 10, "({x}, {y})");
                    assert_eq!(before.category(x, y), TerrainCategory::Grass);
                }
            }
        }
        // Центр далеко от воды и не меняется
        assert_eq!(tiles.category(5, 5), TerrainCategory::Grass);
    }

    #[test]
    fn decisions_use_pre_pass_snapshot() {
        // Лес в (1, 1) касается травы (1, 2), которая может стать песком.
        // Правило леса должно видеть исходную траву, а не песок.
        let mut tiles = TileMap::new(4, 4, TerrainCategory::Grass);
        tiles.set(0, 0, TerrainTile::new(TerrainCategory::Water));
        tiles.set(1, 1, TerrainTile::new(TerrainCategory::Forest));
        tiles.set(2, 2, TerrainTile::new(TerrainCategory::Forest));
        tiles.set(3, 3, TerrainTile::new(TerrainCategory::Forest));

        for seed in 0..32 {
            let mut map = tiles.clone();
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            refine_terrain(&mut map, &mut rng);

            // Песок только у воды в (0, 0): соседи (1, 0) и (0, 1)
            for y in 0..4 {
                for x in 0..4 {
                    if map.category(x, y) == TerrainCategory::Sand {
                        assert!((x, y) == (1, 0) || (x, y) == (0, 1), "({x}, {y})");
                    }
                }
            }
            // Лес в (2, 2) имеет двух лесных соседей и не исчезает
            assert_eq!(map.category(2, 2), TerrainCategory::Forest);
        }
    }

    #[test]
    fn isolated_forests_are_sometimes_pruned() {
        let mut pruned = 0;
        let mut kept = 0;
        for seed in 0..64 {
            let mut tiles = TileMap::new(5, 5, TerrainCategory::Grass);
            tiles.set(2, 2, TerrainTile::new(TerrainCategory::Forest));
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let stats = refine_terrain(&mut tiles, &mut rng);
            match tiles.category(2, 2) {
                TerrainCategory::Grass => {
                    pruned += 1;
                    assert_eq!(stats.pruned_forests, 1);
                }
                TerrainCategory::Forest => kept += 1,
                other => panic!("unexpected {other:?}"),
            }
        }
        assert!(pruned > 0 && kept > 0, "pruned={pruned} kept={kept}");
    }
}
