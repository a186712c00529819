use crate::ecs::EntityId;

/// Failures that indicate a construction-order bug or bad input data.
///
/// Gameplay outcomes (missing target, blocked path, full inventory) are never
/// errors; they are return values or state transitions.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("Grid map queried before a dungeon was loaded")]
    GridNotInitialized,
    #[error("Entity capacity exhausted ({capacity} slots)")]
    CapacityExhausted { capacity: usize },
    #[error("Unknown entity: {0}")]
    UnknownEntity(EntityId),
    #[error("Invalid grid: expected {expected} tiles, got {actual}")]
    InvalidGrid { expected: usize, actual: usize },
    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
    #[error("Loot table error: {0}")]
    LootTable(#[from] ron::error::SpannedError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SimResult<T> = Result<T, SimError>;
