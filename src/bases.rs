use crate::grid::GridPosition;
use crate::terrain::{TerrainCategory, TerrainTile, TileMap};
use serde::Serialize;

/// Расчищенная стартовая площадка
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BaseArea {
    pub center: GridPosition,
    pub radius: u32,
}

/// Расчищает площадки игрока (у нижнего края) и противника (у верхнего), обе по центру по горизонтали
pub fn clear_starting_areas(tiles: &mut TileMap, radius: u32) -> [BaseArea; 2] {
    let center_x = (tiles.width / 2) as i32;
    let player = BaseArea {
        center: GridPosition::new(center_x, 1),
        radius,
    };
    let opponent = BaseArea {
        center: GridPosition::new(center_x, tiles.height as i32 - 2),
        radius,
    };

    for base in [player, opponent] {
        clear_base(tiles, base.center.x, base.center.y, radius);
    }
    [player, opponent]
}

/// Превращает квадрат `[cx-r, cx+r] × [cy-r, cy+r]` в траву без ресурсов.
///
/// Внешнее кольцо карты не трогается: края остаются водой.
pub fn clear_base(tiles: &mut TileMap, center_x: i32, center_y: i32, radius: u32) {
    let r = radius as i32;
    for y in (center_y - r)..=(center_y + r) {
        for x in (center_x - r)..=(center_x + r) {
            if tiles.is_interior(x, y) {
                let mut tile = TerrainTile::new(TerrainCategory::Grass);
                tile.is_buildable = true;
                tiles.set(x as u32, y as u32, tile);
            }
        }
    }
}
