//! Хранилище клеток сетки
//!
//! `GridStore` владеет `width × height` клетками и ничего не знает о генерации.
//! Любое изменение клетки через сеттеры оповещает подписчиков позицией клетки.

use crate::config::GridSettings;
use crate::terrain::{NaturalResource, TerrainCategory};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Позиция клетки. Знаковая, чтобы можно было спросить о клетке за краем карты.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridPosition {
    pub x: i32,
    pub y: i32,
}

impl GridPosition {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for GridPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Ссылка на постройку, которой управляет внешняя логика строительства
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlacedObjectRef(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridCell {
    pub terrain: TerrainCategory,
    pub is_buildable: bool,
    pub occupant: Option<PlacedObjectRef>,
    pub natural_resource: Option<NaturalResource>,
}

impl Default for GridCell {
    fn default() -> Self {
        let terrain = TerrainCategory::default();
        Self {
            terrain,
            is_buildable: terrain.is_buildable_by_default(),
            occupant: None,
            natural_resource: None,
        }
    }
}

impl GridCell {
    /// Символ для текстового дампа: ресурс поверх местности
    pub fn glyph(&self) -> char {
        self.natural_resource
            .map_or(self.terrain.glyph(), |r| r.kind.glyph())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type CellListener = Box<dyn FnMut(GridPosition) + Send>;

pub struct GridStore {
    width: u32,
    height: u32,
    cell_size: f32,
    cells: Vec<GridCell>,
    listeners: Vec<(SubscriptionId, CellListener)>,
    next_subscription: u64,
}

impl fmt::Debug for GridStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridStore")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("cell_size", &self.cell_size)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl GridStore {
    /// Создаёт сетку с клетками по умолчанию (трава, можно строить, без ресурсов)
    pub fn new(width: u32, height: u32, cell_size: f32) -> Self {
        Self {
            width,
            height,
            cell_size,
            cells: vec![GridCell::default(); width as usize * height as usize],
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn from_settings(settings: &GridSettings) -> Self {
        Self::new(settings.width, settings.height, settings.cell_size)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn is_valid_position(&self, pos: GridPosition) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height
    }

    fn index(&self, pos: GridPosition) -> Option<usize> {
        self.is_valid_position(pos)
            .then(|| pos.y as usize * self.width as usize + pos.x as usize)
    }

    pub fn world_position(&self, pos: GridPosition) -> (f32, f32) {
        (pos.x as f32 * self.cell_size, pos.y as f32 * self.cell_size)
    }

    /// Ближайшая клетка к мировой точке. Результат может лежать вне сетки.
    pub fn grid_position(&self, world: (f32, f32)) -> GridPosition {
        GridPosition::new(
            (world.0 / self.cell_size).round() as i32,
            (world.1 / self.cell_size).round() as i32,
        )
    }

    pub fn cell(&self, pos: GridPosition) -> Option<&GridCell> {
        self.index(pos).map(|idx| &self.cells[idx])
    }

    /// Все клетки построчно (`y * width + x`)
    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    pub fn positions(&self) -> impl Iterator<Item = GridPosition> + '_ {
        (0..self.height as i32)
            .flat_map(move |y| (0..self.width as i32).map(move |x| GridPosition::new(x, y)))
    }

    /// Текстовый дамп: строки сверху вниз
    pub fn to_ascii(&self) -> String {
        let width = self.width as usize;
        let mut out = String::with_capacity((width + 1) * self.height as usize);
        if width == 0 {
            return out;
        }
        for row in self.cells.chunks(width).rev() {
            out.extend(row.iter().map(GridCell::glyph));
            out.push('\n');
        }
        out
    }

    // Запросы для логики строительства. За краем карты — вода, строить нельзя.

    pub fn is_buildable(&self, x: i32, y: i32) -> bool {
        self.cell(GridPosition::new(x, y))
            .is_some_and(|cell| cell.is_buildable)
    }

    pub fn terrain_at(&self, x: i32, y: i32) -> TerrainCategory {
        self.cell(GridPosition::new(x, y))
            .map_or(TerrainCategory::Water, |cell| cell.terrain)
    }

    pub fn is_occupied(&self, x: i32, y: i32) -> bool {
        self.cell(GridPosition::new(x, y))
            .is_some_and(|cell| cell.occupant.is_some())
    }

    /// Клетка на карте, пригодна для стройки и свободна
    pub fn can_place(&self, x: i32, y: i32) -> bool {
        self.cell(GridPosition::new(x, y))
            .is_some_and(|cell| cell.is_buildable && cell.occupant.is_none())
    }

    pub fn occupant(&self, pos: GridPosition) -> Option<PlacedObjectRef> {
        self.cell(pos).and_then(|cell| cell.occupant)
    }

    // Сеттеры. Возвращают `false`, если позиция вне сетки.

    pub fn set_terrain(&mut self, pos: GridPosition, terrain: TerrainCategory) -> bool {
        self.update(pos, |cell| cell.terrain = terrain)
    }

    pub fn set_buildable(&mut self, pos: GridPosition, is_buildable: bool) -> bool {
        self.update(pos, |cell| cell.is_buildable = is_buildable)
    }

    pub fn set_natural_resource(
        &mut self,
        pos: GridPosition,
        resource: Option<NaturalResource>,
    ) -> bool {
        self.update(pos, |cell| cell.natural_resource = resource)
    }

    /// Заменяет всё состояние местности клетки одним изменением (одно оповещение).
    /// Постройку не трогает.
    pub fn set_terrain_state(
        &mut self,
        pos: GridPosition,
        terrain: TerrainCategory,
        is_buildable: bool,
        resource: Option<NaturalResource>,
    ) -> bool {
        self.update(pos, |cell| {
            cell.terrain = terrain;
            cell.is_buildable = is_buildable;
            cell.natural_resource = resource;
        })
    }

    pub fn set_occupant(&mut self, pos: GridPosition, occupant: PlacedObjectRef) -> bool {
        self.update(pos, |cell| cell.occupant = Some(occupant))
    }

    pub fn clear_occupant(&mut self, pos: GridPosition) -> bool {
        self.update(pos, |cell| cell.occupant = None)
    }

    fn update(&mut self, pos: GridPosition, apply: impl FnOnce(&mut GridCell)) -> bool {
        let Some(idx) = self.index(pos) else {
            return false;
        };
        let before = self.cells[idx];
        apply(&mut self.cells[idx]);
        if self.cells[idx] != before {
            self.notify(pos);
        }
        true
    }

    /// Подписка на изменения клеток. Подписчик получает только позицию.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(GridPosition) + Send + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sub, _)| *sub != id);
        self.listeners.len() != before
    }

    fn notify(&mut self, pos: GridPosition) {
        for (_, listener) in &mut self.listeners {
            listener(pos);
        }
    }
}
