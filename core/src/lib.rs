pub mod combat_log;
pub mod context;
pub mod encounter;
pub mod game_data;
pub mod metrics;
pub mod timeline;

// Re-exports for convenience
pub use combat_log::*;
pub use context::{EngineConfig, EngineConfigExt, WorkerPool};
pub use encounter::{
    AggregateError, BuffState, DamageSummary, EncounterInfo, EncounterReport, EnemyReport, Hits,
    PlayerReport, Series, SeriesPoint, aggregate,
};
pub use game_data::*;
pub use metrics::{PlayerMetrics, summarize};
pub use timeline::{EncounterBounds, Timeline};
