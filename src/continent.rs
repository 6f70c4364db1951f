use crate::config::ContinentSettings;
use crate::noise::NoiseField;
use crate::terrain::{TerrainCategory, TerrainTile, TileMap};

/// Сдвиг поля деталей относительно поля континента
const DETAIL_OFFSET: f32 = 1000.0;

const CONTINENT_WEIGHT: f32 = 0.6;
const DETAIL_WEIGHT: f32 = 0.2;
const RADIAL_WEIGHT: f32 = 0.2;

/// Радиус затухания к краям в долях от большей стороны карты
const FALLOFF_RADIUS: f32 = 0.6;

/// Генерирует базовую местность: материк посередине, вода по краям
///
/// Высота клетки = `0.6 * континент + 0.2 * детали + 0.2 * радиальный градиент`,
/// затем раскладывается по порогам из `settings`. Внешнее кольцо клеток всегда вода.
/// Пороги должны быть упорядочены (см. [`crate::config::WorldConfig::validate`]).
pub fn shape_continent(
    width: u32,
    height: u32,
    seed: u64,
    offset: (f32, f32),
    settings: &ContinentSettings,
) -> TileMap {
    let elevation = elevation_field(width, height, seed, offset, settings);

    let mut tiles = TileMap {
        width,
        height,
        data: elevation
            .iter()
            .map(|&value| TerrainTile::new(classify(value, settings)))
            .collect(),
    };

    flood_border(&mut tiles);
    tiles
}

/// Смешанная высота для каждой клетки, построчно
pub fn elevation_field(
    width: u32,
    height: u32,
    seed: u64,
    offset: (f32, f32),
    settings: &ContinentSettings,
) -> Vec<f32> {
    let continent = NoiseField::new(seed, settings.continent_noise_scale, offset);
    let detail = NoiseField::new(
        seed,
        settings.detail_noise_scale,
        (offset.0 + DETAIL_OFFSET, offset.1 + DETAIL_OFFSET),
    );

    let continent_values = continent.sample_grid(width, height);
    let detail_values = detail.sample_grid(width, height);

    let center = (width as f32 / 2.0, height as f32 / 2.0);
    let max_distance = width.max(height) as f32 * FALLOFF_RADIUS;

    continent_values
        .iter()
        .zip(&detail_values)
        .enumerate()
        .map(|(i, (&c, &d))| {
            let x = (i as u32 % width) as f32;
            let y = (i as u32 / width) as f32;
            let distance = (x - center.0).hypot(y - center.1);
            let radial = (1.0 - distance / max_distance).clamp(0.0, 1.0);

            c * CONTINENT_WEIGHT + d * DETAIL_WEIGHT + radial * RADIAL_WEIGHT
        })
        .collect()
}

/// Раскладывает высоту по типам местности
pub fn classify(value: f32, settings: &ContinentSettings) -> TerrainCategory {
    if value < settings.water_level {
        TerrainCategory::Water
    } else if value > settings.mountain_level {
        TerrainCategory::Mountain
    } else if value > settings.forest_level {
        TerrainCategory::Forest
    } else {
        TerrainCategory::Grass
    }
}

/// Края карты — вода, чтобы суша всегда была островом
pub fn flood_border(tiles: &mut TileMap) {
    let (width, height) = (tiles.width, tiles.height);
    if width == 0 || height == 0 {
        return;
    }
    for x in 0..width {
        tiles.set(x, 0, TerrainTile::new(TerrainCategory::Water));
        tiles.set(x, height - 1, TerrainTile::new(TerrainCategory::Water));
    }
    for y in 0..height {
        tiles.set(0, y, TerrainTile::new(TerrainCategory::Water));
        tiles.set(width - 1, y, TerrainTile::new(TerrainCategory::Water));
    }
}
