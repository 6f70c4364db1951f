use serde::{Deserialize, Serialize};

/// Тип местности клетки
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum TerrainCategory {
    Water,
    #[default]
    Grass,
    Forest,
    Mountain,
    Sand,
    River,
}

impl TerrainCategory {
    pub const ALL: [TerrainCategory; 6] = [
        TerrainCategory::Water,
        TerrainCategory::Grass,
        TerrainCategory::Forest,
        TerrainCategory::Mountain,
        TerrainCategory::Sand,
        TerrainCategory::River,
    ];

    /// Строить можно на траве, песке и в лесу, но не на воде, горах и реках
    #[must_use]
    pub fn is_buildable_by_default(self) -> bool {
        !matches!(
            self,
            TerrainCategory::Water | TerrainCategory::Mountain | TerrainCategory::River
        )
    }

    /// Символ для текстового дампа карты
    #[must_use]
    pub fn glyph(self) -> char {
        match self {
            TerrainCategory::Water => '~',
            TerrainCategory::Grass => '.',
            TerrainCategory::Forest => 'T',
            TerrainCategory::Mountain => '^',
            TerrainCategory::Sand => ':',
            TerrainCategory::River => '=',
        }
    }
}

/// Вид ресурса. Еда есть в общем словаре ресурсов, но на местности не генерируется.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Food,
    Wood,
    Iron,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 3] = [ResourceKind::Food, ResourceKind::Wood, ResourceKind::Iron];

    /// Виды, которые генератор размещает на карте, в порядке размещения
    pub const NATURAL: [ResourceKind; 2] = [ResourceKind::Wood, ResourceKind::Iron];

    /// Местность, на которой встречается ресурс
    #[must_use]
    pub fn target_terrain(self) -> Option<TerrainCategory> {
        match self {
            ResourceKind::Wood => Some(TerrainCategory::Forest),
            ResourceKind::Iron => Some(TerrainCategory::Mountain),
            ResourceKind::Food => None,
        }
    }

    #[must_use]
    pub fn glyph(self) -> char {
        match self {
            ResourceKind::Food => 'f',
            ResourceKind::Wood => 'w',
            ResourceKind::Iron => 'i',
        }
    }
}

/// Природное месторождение на клетке
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NaturalResource {
    pub kind: ResourceKind,
    pub amount: u32,
}

/// Рабочая клетка во время генерации. После генерации переносится в [`crate::grid::GridStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainTile {
    pub category: TerrainCategory,
    pub is_buildable: bool,
    pub resource: Option<NaturalResource>,
}

impl TerrainTile {
    /// Новая клетка без ресурса с проходимостью по умолчанию для типа местности
    #[must_use]
    pub fn new(category: TerrainCategory) -> Self {
        Self {
            category,
            is_buildable: category.is_buildable_by_default(),
            resource: None,
        }
    }

    #[must_use]
    pub fn has_resource(&self) -> bool {
        self.resource.is_some()
    }

    /// Количество ресурса; 0, если месторождения нет
    #[must_use]
    pub fn resource_amount(&self) -> u32 {
        self.resource.map_or(0, |r| r.amount)
    }
}

/// 8 соседей клетки
pub(crate) const NEIGHBORS_8: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Двумерная карта рабочих клеток, построчно (`y * width + x`)
#[derive(Debug, Clone, PartialEq)]
pub struct TileMap {
    pub width: u32,
    pub height: u32,
    pub data: Vec<TerrainTile>,
}

impl TileMap {
    pub fn new(width: u32, height: u32, fill: TerrainCategory) -> Self {
        Self {
            width,
            height,
            data: vec![TerrainTile::new(fill); width as usize * height as usize],
        }
    }

    /// Клетка не на внешнем кольце карты
    pub fn is_interior(&self, x: i32, y: i32) -> bool {
        x > 0 && y > 0 && x < self.width as i32 - 1 && y < self.height as i32 - 1
    }

    pub fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    pub fn get(&self, x: u32, y: u32) -> &TerrainTile {
        &self.data[self.index(x, y)]
    }

    pub fn get_mut(&mut self, x: u32, y: u32) -> &mut TerrainTile {
        let idx = self.index(x, y);
        &mut self.data[idx]
    }

    pub fn set(&mut self, x: u32, y: u32, tile: TerrainTile) {
        let idx = self.index(x, y);
        self.data[idx] = tile;
    }

    pub fn category(&self, x: u32, y: u32) -> TerrainCategory {
        self.get(x, y).category
    }

    /// Слой категорий (копия, для чтения "до прохода")
    pub fn categories(&self) -> Vec<TerrainCategory> {
        self.data.iter().map(|t| t.category).collect()
    }

    pub fn count(&self, category: TerrainCategory) -> usize {
        self.data.iter().filter(|t| t.category == category).count()
    }
}

/// Число соседей (включая диагонали) с заданной категорией в построчном слое
pub(crate) fn count_neighbors(
    layer: &[TerrainCategory],
    width: u32,
    height: u32,
    x: u32,
    y: u32,
    category: TerrainCategory,
) -> usize {
    NEIGHBORS_8
        .iter()
        .filter(|&&(dx, dy)| {
            let nx = x as i32 + dx;
            let ny = y as i32 + dy;
            nx >= 0
                && ny >= 0
                && nx < width as i32
                && ny < height as i32
                && layer[ny as usize * width as usize + nx as usize] == category
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buildability_defaults() {
        for category in TerrainCategory::ALL {
            let expected = !matches!(
                category,
                TerrainCategory::Water | TerrainCategory::Mountain | TerrainCategory::River
            );
            assert_eq!(category.is_buildable_by_default(), expected, "{category:?}");
            assert_eq!(TerrainTile::new(category).is_buildable, expected);
        }
    }

    #[test]
    fn tile_without_resource_has_zero_amount() {
        let mut tile = TerrainTile::new(TerrainCategory::Forest);
        assert!(!tile.has_resource());
        assert_eq!(tile.resource_amount(), 0);

        tile.resource = Some(NaturalResource {
            kind: ResourceKind::Wood,
            amount: 4,
        });
        assert!(tile.has_resource());
        assert_eq!(tile.resource_amount(), 4);
    }

    #[test]
    fn neighbor_count_clips_at_edges() {
        let mut map = TileMap::new(3, 3, TerrainCategory::Forest);
        map.set(1, 1, TerrainTile::new(TerrainCategory::Grass));
        let layer = map.categories();

        assert_eq!(count_neighbors(&layer, 3, 3, 0, 0, TerrainCategory::Forest), 2);
        assert_eq!(count_neighbors(&layer, 3, 3, 0, 0, TerrainCategory::Grass), 1);
        assert_eq!(count_neighbors(&layer, 3, 3, 1, 1, TerrainCategory::Forest), 8);
    }

    #[test]
    fn interior_excludes_outer_ring() {
        let map = TileMap::new(4, 3, TerrainCategory::Water);
        assert!(map.is_interior(1, 1));
        assert!(map.is_interior(2, 1));
        assert!(!map.is_interior(0, 1));
        assert!(!map.is_interior(3, 1));
        assert!(!map.is_interior(1, 2));
        assert!(!map.is_interior(-1, 1));
    }
}
