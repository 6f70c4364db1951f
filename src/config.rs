// src/config.rs
//! Конфигурация генерации мира
//!
//! Этот модуль определяет все параметры, управляющие процедурной генерацией карты:
//! - Размеры сетки и размер клетки в мировых координатах
//! - Масштабы шума и пороги высот для типов местности
//! - Настройки рек и стартовых баз
//! - Плотность ресурсов и гарантированные минимумы на территорию
//!
//! Все структуры поддерживают сериализацию в TOML/JSON для удобной настройки через конфигурационные файлы.

use crate::terrain::ResourceKind;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Ошибки конфигурации. Генерация с такой конфигурацией не запускается.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "terrain thresholds must satisfy water < forest < mountain (got water={water}, forest={forest}, mountain={mountain})"
    )]
    ThresholdOrder {
        water: f32,
        forest: f32,
        mountain: f32,
    },
    #[error("grid dimensions must be positive (got {width}x{height})")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("cell size must be a positive finite number (got {0})")]
    InvalidCellSize(f32),
    #[error("noise scale `{field}` must be a positive finite number (got {value})")]
    InvalidNoiseScale { field: &'static str, value: f32 },
    #[error("{kind:?} density must lie in [0, 1] (got {value})")]
    InvalidDensity { kind: ResourceKind, value: f32 },
    #[error("{kind:?} amount range is empty (min={min}, max={max})")]
    InvalidAmountRange { kind: ResourceKind, min: u32, max: u32 },
    #[error("failed to parse world config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to read world config from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Размеры сетки
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GridSettings {
    /// Ширина сетки в клетках
    #[serde(default = "default_width")]
    pub width: u32,

    /// Высота сетки в клетках
    #[serde(default = "default_height")]
    pub height: u32,

    /// Размер клетки в мировых единицах (`world = grid * cell_size`)
    #[serde(default = "default_cell_size")]
    pub cell_size: f32,
}

fn default_width() -> u32 {
    32
}
fn default_height() -> u32 {
    32
}
fn default_cell_size() -> f32 {
    1.0
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            width: 32,
            height: 32,
            cell_size: 1.0,
        }
    }
}

/// Форма континента и пороги местности
///
/// Итоговая высота клетки лежит в `[0, 1]` и сравнивается с порогами:
/// ниже `water_level` — вода, выше `mountain_level` — горы, выше `forest_level` — лес, иначе трава.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContinentSettings {
    /// Масштаб крупного шума (форма материка)
    #[serde(default = "default_continent_noise_scale")]
    pub continent_noise_scale: f32,

    /// Масштаб мелкого шума (детали рельефа)
    #[serde(default = "default_detail_noise_scale")]
    pub detail_noise_scale: f32,

    /// Меньше — больше суши
    #[serde(default = "default_water_level")]
    pub water_level: f32,

    #[serde(default = "default_forest_level")]
    pub forest_level: f32,

    /// Больше — меньше гор
    #[serde(default = "default_mountain_level")]
    pub mountain_level: f32,
}

fn default_continent_noise_scale() -> f32 {
    0.05
}
fn default_detail_noise_scale() -> f32 {
    0.15
}
fn default_water_level() -> f32 {
    0.35
}
fn default_forest_level() -> f32 {
    0.55
}
fn default_mountain_level() -> f32 {
    0.75
}

impl Default for ContinentSettings {
    fn default() -> Self {
        Self {
            continent_noise_scale: 0.05,
            detail_noise_scale: 0.15,
            water_level: 0.35,
            forest_level: 0.55,
            mountain_level: 0.75,
        }
    }
}

/// Настройки рек
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiverSettings {
    /// Генерировать ли реки вообще
    #[serde(default = "default_rivers_enabled")]
    pub enabled: bool,

    /// Количество попыток проложить реку (каждая стартует со случайной горы)
    #[serde(default = "default_river_count")]
    pub count: u32,
}

fn default_rivers_enabled() -> bool {
    true
}
fn default_river_count() -> u32 {
    2
}

impl Default for RiverSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            count: 2,
        }
    }
}

/// Стартовые базы игрока и противника
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BaseSettings {
    /// Полуширина расчищаемого квадрата (квадрат `(2r+1)×(2r+1)`)
    #[serde(default = "default_base_radius")]
    pub radius: u32,
}

fn default_base_radius() -> u32 {
    3
}

impl Default for BaseSettings {
    fn default() -> Self {
        Self { radius: 3 }
    }
}

/// Включительный диапазон количества ресурса в одном месторождении
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AmountRange {
    pub min: u32,
    pub max: u32,
}

impl AmountRange {
    #[must_use]
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }
}

/// Плотность случайных месторождений и их размер
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourceSettings {
    /// Вероятность дерева на клетке леса (0.0..=1.0)
    #[serde(default = "default_wood_density")]
    pub wood_density: f32,

    /// Вероятность железа на клетке гор (0.0..=1.0)
    #[serde(default = "default_iron_density")]
    pub iron_density: f32,

    #[serde(default = "default_wood_amount")]
    pub wood_amount: AmountRange,

    #[serde(default = "default_iron_amount")]
    pub iron_amount: AmountRange,
}

fn default_wood_density() -> f32 {
    0.3
}
fn default_iron_density() -> f32 {
    0.2
}
fn default_wood_amount() -> AmountRange {
    AmountRange::new(2, 5)
}
fn default_iron_amount() -> AmountRange {
    AmountRange::new(1, 4)
}

impl ResourceSettings {
    /// Плотность для вида ресурса. У еды нет природной местности, поэтому 0.
    #[must_use]
    pub fn density(&self, kind: ResourceKind) -> f32 {
        match kind {
            ResourceKind::Wood => self.wood_density,
            ResourceKind::Iron => self.iron_density,
            ResourceKind::Food => 0.0,
        }
    }

    #[must_use]
    pub fn amount(&self, kind: ResourceKind) -> AmountRange {
        match kind {
            ResourceKind::Wood => self.wood_amount,
            ResourceKind::Iron => self.iron_amount,
            ResourceKind::Food => AmountRange::new(0, 0),
        }
    }
}

impl Default for ResourceSettings {
    fn default() -> Self {
        Self {
            wood_density: 0.3,
            iron_density: 0.2,
            wood_amount: AmountRange::new(2, 5),
            iron_amount: AmountRange::new(1, 4),
        }
    }
}

/// Минимум месторождений на территорию каждого игрока
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GuaranteedResources {
    #[serde(default = "default_min_wood_nodes")]
    pub min_wood_nodes: u32,

    #[serde(default = "default_min_iron_nodes")]
    pub min_iron_nodes: u32,
}

fn default_min_wood_nodes() -> u32 {
    3
}
fn default_min_iron_nodes() -> u32 {
    2
}

impl GuaranteedResources {
    #[must_use]
    pub fn minimum(&self, kind: ResourceKind) -> u32 {
        match kind {
            ResourceKind::Wood => self.min_wood_nodes,
            ResourceKind::Iron => self.min_iron_nodes,
            ResourceKind::Food => 0,
        }
    }
}

impl Default for GuaranteedResources {
    fn default() -> Self {
        Self {
            min_wood_nodes: 3,
            min_iron_nodes: 2,
        }
    }
}

/// Основные параметры генерации мира
///
/// Полная конфигурация генератора. Поддерживает загрузку из TOML-файлов.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorldConfig {
    /// Сид генератора случайных чисел (детерминированная генерация)
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Игнорировать `seed` и брать случайный при каждой генерации
    #[serde(default)]
    pub use_random_seed: bool,

    #[serde(default)]
    pub grid: GridSettings,

    #[serde(default)]
    pub continent: ContinentSettings,

    #[serde(default)]
    pub rivers: RiverSettings,

    #[serde(default)]
    pub bases: BaseSettings,

    #[serde(default)]
    pub resources: ResourceSettings,

    #[serde(default)]
    pub guaranteed: GuaranteedResources,
}

fn default_seed() -> u64 {
    12345
}

impl WorldConfig {
    /// Загружает параметры из TOML-файла
    ///
    /// # Пример
    /// ```toml
    /// # world.toml
    /// seed = 42
    ///
    /// [grid]
    /// width = 48
    /// height = 32
    ///
    /// [guaranteed]
    /// min_wood_nodes = 4
    /// ```
    ///
    /// Файл проходит [`WorldConfig::validate`] до возврата.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Проверяет внутреннюю согласованность параметров.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_dimensions(self.grid.width, self.grid.height)?;
        if !(self.grid.cell_size.is_finite() && self.grid.cell_size > 0.0) {
            return Err(ConfigError::InvalidCellSize(self.grid.cell_size));
        }

        let c = &self.continent;
        for (field, value) in [
            ("continent_noise_scale", c.continent_noise_scale),
            ("detail_noise_scale", c.detail_noise_scale),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::InvalidNoiseScale { field, value });
            }
        }
        // NaN тоже отсекается: сравнения с NaN ложны
        if !(c.water_level < c.forest_level && c.forest_level < c.mountain_level) {
            return Err(ConfigError::ThresholdOrder {
                water: c.water_level,
                forest: c.forest_level,
                mountain: c.mountain_level,
            });
        }

        for kind in [ResourceKind::Wood, ResourceKind::Iron] {
            let value = self.resources.density(kind);
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidDensity { kind, value });
            }
            let AmountRange { min, max } = self.resources.amount(kind);
            if min > max {
                return Err(ConfigError::InvalidAmountRange { kind, min, max });
            }
        }

        Ok(())
    }
}

pub(crate) fn validate_dimensions(width: u32, height: u32) -> Result<(), ConfigError> {
    // Индексы клеток считаются в u32
    let cells = u64::from(width) * u64::from(height);
    if cells == 0 || cells > u64::from(u32::MAX) {
        return Err(ConfigError::InvalidDimensions { width, height });
    }
    Ok(())
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: 12345,
            use_random_seed: false,
            grid: GridSettings::default(),
            continent: ContinentSettings::default(),
            rivers: RiverSettings::default(),
            bases: BaseSettings::default(),
            resources: ResourceSettings::default(),
            guaranteed: GuaranteedResources::default(),
        }
    }
}
