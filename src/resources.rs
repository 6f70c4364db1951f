//! Размещение природных ресурсов
//!
//! Карта делится на две горизонтальные половины: строки `[0, h/2)` — территория игрока,
//! `[h/2, h)` — территория противника (при нечётной высоте лишняя строка уходит противнику).
//! Сначала на каждой территории гарантируется минимум дерева и железа, затем по всей
//! карте разбрасываются дополнительные месторождения с заданной плотностью.

use crate::config::{AmountRange, GuaranteedResources, ResourceSettings};
use crate::terrain::{NaturalResource, ResourceKind, TerrainCategory, TerrainTile, TileMap};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Territory {
    Player,
    Opponent,
}

impl Territory {
    pub const ALL: [Territory; 2] = [Territory::Player, Territory::Opponent];

    /// Территория, которой принадлежит строка `y`
    #[must_use]
    pub fn of_row(y: u32, height: u32) -> Self {
        if y < height / 2 {
            Territory::Player
        } else {
            Territory::Opponent
        }
    }

    #[must_use]
    pub fn rows(self, height: u32) -> Range<u32> {
        match self {
            Territory::Player => 0..height / 2,
            Territory::Opponent => height / 2..height,
        }
    }
}

/// Территория не получила гарантированного минимума даже после конвертации травы
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResourceShortfall {
    pub territory: Territory,
    pub kind: ResourceKind,
    pub required: u32,
    pub placed: u32,
}

impl fmt::Display for ResourceShortfall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}: {:?} размещено {} из {}",
            self.territory, self.kind, self.placed, self.required
        )
    }
}

/// Размещает ресурсы: сначала гарантированные минимумы, затем случайные по плотности.
/// Возвращает список недостач.
pub fn allocate_resources<R: Rng + ?Sized>(
    tiles: &mut TileMap,
    settings: &ResourceSettings,
    guarantees: &GuaranteedResources,
    rng: &mut R,
) -> Vec<ResourceShortfall> {
    let mut shortfalls = Vec::new();

    for territory in Territory::ALL {
        for kind in ResourceKind::NATURAL {
            let required = guarantees.minimum(kind);
            let placed = place_guaranteed(tiles, territory, kind, required, settings, rng);
            if placed < required {
                tracing::warn!(
                    target: "mapgen::resources",
                    ?territory,
                    ?kind,
                    required,
                    placed,
                    "guaranteed resource minimum not reached"
                );
                shortfalls.push(ResourceShortfall {
                    territory,
                    kind,
                    required,
                    placed,
                });
            }
        }
    }

    let scattered = scatter_by_density(tiles, settings, rng);
    tracing::debug!(target: "mapgen::resources", scattered, "density phase done");

    shortfalls
}

/// Гарантированная фаза для одной территории и одного вида ресурса.
/// Возвращает число размещённых месторождений.
pub fn place_guaranteed<R: Rng + ?Sized>(
    tiles: &mut TileMap,
    territory: Territory,
    kind: ResourceKind,
    count: u32,
    settings: &ResourceSettings,
    rng: &mut R,
) -> u32 {
    let Some(terrain) = kind.target_terrain() else {
        return 0;
    };
    let count = count as usize;
    let rows = territory.rows(tiles.height);

    let mut selected = free_cells(tiles, rows.clone(), terrain);
    selected.truncate(count);

    // Не хватает подходящей местности — превращаем траву
    if selected.len() < count {
        for (x, y) in free_cells(tiles, rows, TerrainCategory::Grass) {
            if selected.len() >= count {
                break;
            }
            tiles.set(x, y, TerrainTile::new(terrain));
            selected.push((x, y));
        }
    }

    let amount = settings.amount(kind);
    for &(x, y) in &selected {
        tiles.get_mut(x, y).resource = Some(NaturalResource {
            kind,
            amount: roll_amount(amount, rng),
        });
    }

    selected.len() as u32
}

/// Клетки заданной местности без ресурса, построчно
fn free_cells(tiles: &TileMap, rows: Range<u32>, terrain: TerrainCategory) -> Vec<(u32, u32)> {
    rows.flat_map(|y| (0..tiles.width).map(move |x| (x, y)))
        .filter(|&(x, y)| {
            let tile = tiles.get(x, y);
            tile.category == terrain && !tile.has_resource()
        })
        .collect()
}

/// Фаза плотности по всей карте. Возвращает число новых месторождений.
pub fn scatter_by_density<R: Rng + ?Sized>(
    tiles: &mut TileMap,
    settings: &ResourceSettings,
    rng: &mut R,
) -> usize {
    let mut placed = 0;

    for y in 0..tiles.height {
        for x in 0..tiles.width {
            let tile = *tiles.get(x, y);
            if tile.has_resource() {
                continue;
            }
            let Some(kind) = ResourceKind::NATURAL
                .into_iter()
                .find(|kind| kind.target_terrain() == Some(tile.category))
            else {
                continue;
            };

            let roll: f32 = rng.gen_range(0.0..1.0);
            if roll < settings.density(kind) {
                let amount = roll_amount(settings.amount(kind), rng);
                tiles.get_mut(x, y).resource = Some(NaturalResource { kind, amount });
                placed += 1;
            }
        }
    }

    placed
}

fn roll_amount<R: Rng + ?Sized>(range: AmountRange, rng: &mut R) -> u32 {
    rng.gen_range(range.min..=range.max)
}
