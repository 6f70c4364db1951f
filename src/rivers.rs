use crate::grid::GridPosition;
use crate::terrain::{TerrainCategory, TerrainTile, TileMap};
use rand::Rng;
use serde::Serialize;

/// Максимальная длина пути реки
pub const MAX_RIVER_STEPS: usize = 50;

/// Порядок обхода соседей фиксирован: при равенстве побеждает первый
const DIRECTIONS: [(i32, i32); 8] = [
    (0, 1),
    (0, -1),
    (1, 0),
    (-1, 0),
    (1, 1),
    (-1, -1),
    (1, -1),
    (-1, 1),
];

/// Проложенная река: исток и клетки, превращённые в реку
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RiverPath {
    pub source: GridPosition,
    pub cells: Vec<GridPosition>,
}

/// Прокладывает `river_count` рек от случайных гор внутри карты вниз к воде
///
/// Река — жадный спуск: на каждом шаге выбирается сосед с наименьшим рангом
/// (вода, затем трава, затем лес, затем всё остальное). Путь может оборваться
/// на плато, не дойдя до воды.
pub fn carve_rivers<R: Rng + ?Sized>(
    tiles: &mut TileMap,
    river_count: u32,
    rng: &mut R,
) -> Vec<RiverPath> {
    let mut rivers = Vec::new();

    for _ in 0..river_count {
        let sources = interior_mountains(tiles);
        if sources.is_empty() {
            continue;
        }

        let source = sources[rng.gen_range(0..sources.len())];
        let cells = flow_downhill(tiles, source);

        tracing::debug!(
            target: "mapgen::rivers",
            source = %source,
            length = cells.len(),
            "river carved"
        );
        rivers.push(RiverPath { source, cells });
    }

    rivers
}

fn interior_mountains(tiles: &TileMap) -> Vec<GridPosition> {
    let mut mountains = Vec::new();
    for y in 1..tiles.height.saturating_sub(1) {
        for x in 1..tiles.width.saturating_sub(1) {
            if tiles.category(x, y) == TerrainCategory::Mountain {
                mountains.push(GridPosition::new(x as i32, y as i32));
            }
        }
    }
    mountains
}

fn flow_downhill(tiles: &mut TileMap, source: GridPosition) -> Vec<GridPosition> {
    let mut carved = Vec::new();
    let mut current = source;

    for _ in 0..MAX_RIVER_STEPS {
        let (x, y) = (current.x as u32, current.y as u32);
        // Горы и вода руслом не становятся
        if !matches!(
            tiles.category(x, y),
            TerrainCategory::Water | TerrainCategory::Mountain
        ) {
            let mut river = TerrainTile::new(TerrainCategory::River);
            river.is_buildable = false;
            tiles.set(x, y, river);
            carved.push(current);
        }

        let Some(next) = next_river_position(tiles, current) else {
            break;
        };
        if next == current
            || tiles.category(next.x as u32, next.y as u32) == TerrainCategory::Water
        {
            break;
        }
        current = next;
    }

    carved
}

fn flow_rank(category: TerrainCategory) -> u8 {
    match category {
        TerrainCategory::Water => 0,
        TerrainCategory::Grass => 1,
        TerrainCategory::Forest => 2,
        _ => 3,
    }
}

/// Лучший внутренний сосед по рангу местности
fn next_river_position(tiles: &TileMap, current: GridPosition) -> Option<GridPosition> {
    DIRECTIONS
        .iter()
        .map(|&(dx, dy)| GridPosition::new(current.x + dx, current.y + dy))
        .filter(|next| tiles.is_interior(next.x, next.y))
        .min_by_key(|next| flow_rank(tiles.category(next.x as u32, next.y as u32)))
}
