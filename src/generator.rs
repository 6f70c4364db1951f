//! Полный конвейер генерации мира
//!
//! Порядок шагов фиксирован: материк → реки → сглаживание → стартовые базы → ресурсы.
//! Все случайные решения берутся из одного `ChaCha8Rng`, созданного из сида в начале
//! генерации, поэтому одинаковые сид и конфигурация дают одинаковую карту.

use crate::bases::{BaseArea, clear_starting_areas};
use crate::config::{ConfigError, WorldConfig, validate_dimensions};
use crate::continent::shape_continent;
use crate::grid::{GridPosition, GridStore};
use crate::refine::refine_terrain;
use crate::resources::{ResourceShortfall, allocate_resources};
use crate::rivers::{RiverPath, carve_rivers};
use crate::terrain::TileMap;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

/// Диапазон случайного смещения шума по каждой оси
const NOISE_OFFSET_RANGE: f32 = 10_000.0;

/// Итог одной генерации
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationReport {
    pub seed: u64,
    pub width: u32,
    pub height: u32,
    pub rivers: Vec<RiverPath>,
    pub beaches: usize,
    pub pruned_forests: usize,
    pub bases: [BaseArea; 2],
    /// Недостачи гарантированных ресурсов (не ошибка)
    pub shortfalls: Vec<ResourceShortfall>,
    /// Сколько клеток сетки изменилось при записи
    pub changed_cells: usize,
}

impl GenerationReport {
    pub fn has_shortfall(&self) -> bool {
        !self.shortfalls.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct WorldGenerator {
    config: WorldConfig,
    last_seed: Option<u64>,
}

impl WorldGenerator {
    pub fn new(config: WorldConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            last_seed: None,
        })
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Сид последней успешной генерации
    pub fn last_seed(&self) -> Option<u64> {
        self.last_seed
    }

    /// Генерация с сидом и флагом случайного сида из конфигурации
    pub fn generate_from_config(
        &mut self,
        grid: &mut GridStore,
    ) -> Result<GenerationReport, ConfigError> {
        if self.config.use_random_seed {
            self.generate_random(grid)
        } else {
            self.generate(grid, self.config.seed)
        }
    }

    /// Генерация со свежим случайным сидом
    pub fn generate_random(&mut self, grid: &mut GridStore) -> Result<GenerationReport, ConfigError> {
        let seed: u64 = rand::random();
        self.generate(grid, seed)
    }

    /// Перегенерирует местность и ресурсы всей сетки
    ///
    /// Карта строится целиком до записи в сетку; постройки на клетках не трогаются.
    /// Ошибка конфигурации возвращается до любых изменений сетки.
    pub fn generate(
        &mut self,
        grid: &mut GridStore,
        seed: u64,
    ) -> Result<GenerationReport, ConfigError> {
        let (tiles, mut report) = self.build_tiles(grid.width(), grid.height(), seed)?;
        report.changed_cells = write_to_grid(&tiles, grid);
        self.last_seed = Some(seed);

        tracing::info!(
            target: "mapgen::generator",
            seed,
            changed_cells = report.changed_cells,
            shortfalls = report.shortfalls.len(),
            "world generation complete"
        );
        Ok(report)
    }

    /// Строит карту без записи в сетку
    pub fn build_tiles(
        &self,
        width: u32,
        height: u32,
        seed: u64,
    ) -> Result<(TileMap, GenerationReport), ConfigError> {
        validate_dimensions(width, height)?;
        self.config.validate()?;

        tracing::info!(target: "mapgen::generator", seed, width, height, "generating world");
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let offset = (
            rng.gen_range(0.0..NOISE_OFFSET_RANGE),
            rng.gen_range(0.0..NOISE_OFFSET_RANGE),
        );
        let mut tiles = shape_continent(width, height, seed, offset, &self.config.continent);

        let rivers = if self.config.rivers.enabled {
            carve_rivers(&mut tiles, self.config.rivers.count, &mut rng)
        } else {
            Vec::new()
        };

        let refine = refine_terrain(&mut tiles, &mut rng);
        let bases = clear_starting_areas(&mut tiles, self.config.bases.radius);

        let shortfalls = allocate_resources(
            &mut tiles,
            &self.config.resources,
            &self.config.guaranteed,
            &mut rng,
        );

        let report = GenerationReport {
            seed,
            width,
            height,
            rivers,
            beaches: refine.beaches,
            pruned_forests: refine.pruned_forests,
            bases,
            shortfalls,
            changed_cells: 0,
        };
        Ok((tiles, report))
    }
}

/// Переносит рабочую карту в сетку. Возвращает число изменённых клеток.
fn write_to_grid(tiles: &TileMap, grid: &mut GridStore) -> usize {
    let mut changed = 0;
    for y in 0..tiles.height {
        for x in 0..tiles.width {
            let tile = tiles.get(x, y);
            let pos = GridPosition::new(x as i32, y as i32);
            let before = grid.cell(pos).copied();
            grid.set_terrain_state(pos, tile.category, tile.is_buildable, tile.resource);
            if grid.cell(pos).copied() != before {
                changed += 1;
            }
        }
    }
    changed
}
