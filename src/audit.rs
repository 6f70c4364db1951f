// src/audit.rs
//! Анализ сгенерированной карты
//!
//! Только чтение: считает местность и ресурсы, в том числе по территориям,
//! и оценивает дисбаланс ресурсов между игроком и противником.
//! Генерация по результату не перезапускается.

use crate::grid::GridStore;
use crate::resources::Territory;
use crate::terrain::{ResourceKind, TerrainCategory};
use serde::Serialize;
use std::collections::BTreeMap;

/// Порог, выше которого распределение считается несбалансированным
pub const IMBALANCE_THRESHOLD: f32 = 0.3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceReport {
    pub width: u32,
    pub height: u32,
    pub total_cells: usize,
    pub buildable_cells: usize,
    pub terrain_counts: BTreeMap<TerrainCategory, usize>,
    /// Число месторождений каждого вида
    pub resource_counts: BTreeMap<ResourceKind, usize>,
    /// Суммарное количество ресурса каждого вида
    pub resource_amounts: BTreeMap<ResourceKind, u64>,
    pub territory_resource_counts: BTreeMap<Territory, BTreeMap<ResourceKind, usize>>,
    /// `|A - B| / max(1, всего)` для каждого вида
    pub imbalance_ratios: BTreeMap<ResourceKind, f32>,
}

/// Собирает отчёт по текущему состоянию сетки
pub fn audit(grid: &GridStore) -> BalanceReport {
    let zero_kinds = || ResourceKind::ALL.into_iter().map(|k| (k, 0)).collect::<BTreeMap<_, _>>();

    let mut terrain_counts: BTreeMap<TerrainCategory, usize> =
        TerrainCategory::ALL.into_iter().map(|c| (c, 0)).collect();
    let mut resource_counts = zero_kinds();
    let mut resource_amounts: BTreeMap<ResourceKind, u64> =
        ResourceKind::ALL.into_iter().map(|k| (k, 0)).collect();
    let mut territory_resource_counts: BTreeMap<Territory, BTreeMap<ResourceKind, usize>> =
        Territory::ALL.into_iter().map(|t| (t, zero_kinds())).collect();
    let mut buildable_cells = 0;

    let height = grid.height();
    for (pos, cell) in grid.positions().zip(grid.cells()) {
        *terrain_counts.entry(cell.terrain).or_default() += 1;
        if cell.is_buildable {
            buildable_cells += 1;
        }

        if let Some(resource) = cell.natural_resource {
            *resource_counts.entry(resource.kind).or_default() += 1;
            *resource_amounts.entry(resource.kind).or_default() += u64::from(resource.amount);

            let territory = Territory::of_row(pos.y as u32, height);
            *territory_resource_counts
                .entry(territory)
                .or_default()
                .entry(resource.kind)
                .or_default() += 1;
        }
    }

    let imbalance_ratios = ResourceKind::ALL
        .into_iter()
        .map(|kind| {
            let a = territory_resource_counts[&Territory::Player][&kind];
            let b = territory_resource_counts[&Territory::Opponent][&kind];
            (kind, imbalance_ratio(a, b))
        })
        .collect();

    BalanceReport {
        width: grid.width(),
        height,
        total_cells: grid.cells().len(),
        buildable_cells,
        terrain_counts,
        resource_counts,
        resource_amounts,
        territory_resource_counts,
        imbalance_ratios,
    }
}

#[must_use]
pub fn imbalance_ratio(a: usize, b: usize) -> f32 {
    a.abs_diff(b) as f32 / (a + b).max(1) as f32
}

impl BalanceReport {
    pub fn terrain(&self, category: TerrainCategory) -> usize {
        self.terrain_counts.get(&category).copied().unwrap_or(0)
    }

    pub fn territory_count(&self, territory: Territory, kind: ResourceKind) -> usize {
        self.territory_resource_counts
            .get(&territory)
            .and_then(|counts| counts.get(&kind))
            .copied()
            .unwrap_or(0)
    }

    /// Доля от всех клеток в процентах, с округлением
    pub fn percentage(&self, count: usize) -> u32 {
        if self.total_cells == 0 {
            return 0;
        }
        (count as f32 / self.total_cells as f32 * 100.0).round() as u32
    }

    pub fn imbalanced_kinds(&self, threshold: f32) -> Vec<ResourceKind> {
        self.imbalance_ratios
            .iter()
            .filter(|&(_, &ratio)| ratio > threshold)
            .map(|(&kind, _)| kind)
            .collect()
    }

    pub fn is_imbalanced(&self) -> bool {
        !self.imbalanced_kinds(IMBALANCE_THRESHOLD).is_empty()
    }

    /// Итог для пользователя по порогу `IMBALANCE_THRESHOLD`
    pub fn verdict(&self) -> String {
        let imbalanced = self.imbalanced_kinds(IMBALANCE_THRESHOLD);
        if imbalanced.is_empty() {
            return "Ресурсы распределены сбалансированно".to_string();
        }
        let kinds: Vec<String> = imbalanced.iter().map(|kind| format!("{kind:?}")).collect();
        format!(
            "Ресурсы распределены несбалансированно ({}), попробуйте другой сид",
            kinds.join(", ")
        )
    }
}
