use clap::Parser;
use std::path::PathBuf;
use territory_mapgen::{
    GridStore, IMBALANCE_THRESHOLD, ResourceKind, TerrainCategory, Territory, WorldConfig,
    WorldGenerator, audit,
};

/// Генератор тайловых карт с балансом ресурсов по территориям
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Путь к конфигурационному файлу в формате TOML (по умолчанию — встроенные настройки)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Сид генерации (перекрывает значение из конфигурации)
    #[arg(short, long, conflicts_with = "random")]
    seed: Option<u64>,

    /// Случайный сид
    #[arg(short, long)]
    random: bool,

    /// Путь для сохранения карты и отчёта в JSON
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Напечатать карту символами
    #[arg(long)]
    ascii: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => {
            println!("🔍 Загрузка конфигурации из {}...", path.display());
            WorldConfig::from_toml_file(path)?
        }
        None => WorldConfig::default(),
    };

    let mut grid = GridStore::from_settings(&config.grid);
    let mut generator = WorldGenerator::new(config)?;

    println!(
        "Генерация карты (размер: {}×{})...",
        grid.width(),
        grid.height()
    );
    let report = match (cli.seed, cli.random) {
        (Some(seed), _) => generator.generate(&mut grid, seed)?,
        (None, true) => generator.generate_random(&mut grid)?,
        (None, false) => generator.generate_from_config(&mut grid)?,
    };
    println!("Сид: {}", report.seed);

    if cli.ascii {
        println!("\n{}", grid.to_ascii());
    }

    let balance = audit(&grid);

    println!("\n=== АНАЛИЗ КАРТЫ ===");
    println!(
        "Размер: {}×{} = {} клеток",
        balance.width, balance.height, balance.total_cells
    );
    println!("--- Местность ---");
    for category in TerrainCategory::ALL {
        let count = balance.terrain(category);
        println!(
            "{category:?}: {count} ({}%)",
            balance.percentage(count)
        );
    }
    println!(
        "Можно строить: {} ({}%)",
        balance.buildable_cells,
        balance.percentage(balance.buildable_cells)
    );
    println!("Реки: {}", report.rivers.len());

    println!("--- Ресурсы ---");
    for territory in Territory::ALL {
        let counts: Vec<String> = ResourceKind::ALL
            .iter()
            .map(|&kind| format!("{kind:?}={}", balance.territory_count(territory, kind)))
            .collect();
        println!("{territory:?}: {}", counts.join(", "));
    }
    for (kind, ratio) in &balance.imbalance_ratios {
        println!("Дисбаланс {kind:?}: {:.0}%", ratio * 100.0);
    }

    for shortfall in &report.shortfalls {
        println!("⚠️ Недостача: {shortfall}");
        tracing::warn!(
            territory = ?shortfall.territory,
            kind = ?shortfall.kind,
            required = shortfall.required,
            placed = shortfall.placed,
            "guaranteed minimum not reached"
        );
    }
    println!("{}", balance.verdict());
    let imbalanced = balance.imbalanced_kinds(IMBALANCE_THRESHOLD);
    if !imbalanced.is_empty() {
        tracing::warn!(?imbalanced, "resource distribution is imbalanced, consider another seed");
    }

    if let Some(path) = &cli.output {
        let export = serde_json::json!({
            "report": report,
            "balance": balance,
            "cells": grid.cells(),
        });
        std::fs::write(path, serde_json::to_string_pretty(&export)?)?;
        println!("Сохранено в {}", path.display());
    }

    println!("\nГотово!");
    Ok(())
}
