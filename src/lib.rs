pub mod audit;
pub mod bases;
pub mod config;
pub mod continent;
pub mod generator;
pub mod grid;
pub mod noise;
pub mod refine;
pub mod resources;
pub mod rivers;
pub mod terrain;

pub use audit::{BalanceReport, IMBALANCE_THRESHOLD, audit};
pub use config::{ConfigError, WorldConfig};
pub use generator::{GenerationReport, WorldGenerator};
pub use grid::{GridCell, GridPosition, GridStore, PlacedObjectRef, SubscriptionId};
pub use resources::{ResourceShortfall, Territory};
pub use terrain::{NaturalResource, ResourceKind, TerrainCategory, TerrainTile, TileMap};
