//! Encounter aggregation
//!
//! ```text
//!   EncounterInput ──► Timeline::build ──┬──► aggregate_player (per player) ─┐
//!                                        │                                   ├──► assemble ──► EncounterReport
//!                                        └──► enemy_series   (per boss)   ───┘
//! ```
//!
//! The timeline is the first barrier: every fold reads the same sorted,
//! immutable events. Per-agent folds run on the worker pool with no shared
//! mutable state; assembly waits for all of them.

mod activation;
mod buffs;
mod error;
mod hits;
mod player;
mod report;
mod series;

#[cfg(test)]
mod buffs_tests;

use rayon::prelude::*;

use crate::combat_log::EncounterInput;
use crate::context::{EngineConfig, EngineConfigExt, WorkerPool};
use crate::game_data::BuffCatalog;
use crate::timeline::Timeline;

pub use activation::{ActivationLog, ActivationLogBuilder, ActivationRecord};
pub use buffs::{BuffState, BuffTable, PresenceInterval};
pub use error::{AggregateError, TimelineFault};
pub use hits::{DamageRange, DamageSummary, Hit, HitSink, Hits};
pub use player::{
    PlayerAggregate, PlayerGroup, SourceAggregate, aggregate_player, damage_sources, enemy_series,
    group_players,
};
pub use report::{EncounterInfo, EncounterReport, EnemyReport, PlayerReport, SourceReport, assemble};
pub use series::{FULL_HEALTH, Series, SeriesBuilder, SeriesPoint};

/// Aggregate one parsed log into its report.
///
/// Either the whole report is produced or the run fails; partial results are
/// never returned.
pub fn aggregate(
    input: EncounterInput,
    catalog: &BuffCatalog,
    config: &EngineConfig,
) -> Result<EncounterReport, AggregateError> {
    let EncounterInput {
        meta,
        agents,
        skills,
        events,
    } = input;

    let timeline = Timeline::build(agents, events, meta.boss_species)?;
    let groups = group_players(&timeline);
    let quickness = config.quickness();

    tracing::debug!(
        players = groups.len(),
        bosses = timeline.bosses().len(),
        workers = config.workers,
        "Aggregating encounter"
    );

    let pool = WorkerPool::with_workers(config.workers);
    let (players, enemies) = pool.install(|| {
        let players = groups
            .par_iter()
            .map(|group| aggregate_player(&timeline, group, catalog, quickness))
            .collect::<Result<Vec<_>, _>>();
        let enemies = timeline
            .bosses()
            .par_iter()
            .map(|&id| enemy_series(&timeline, id).map(|series| (id, series)))
            .collect::<Result<Vec<_>, _>>();
        (players, enemies)
    })?;
    let (players, enemies) = (players?, enemies?);

    let report = assemble(&timeline, meta, catalog, skills, players, enemies)?;
    for &buff in &report.encounter.unknown_buffs {
        let err = AggregateError::UnknownBuffType { buff };
        tracing::warn!(%buff, "{err}; treated as a single duration stack");
    }

    tracing::info!(
        boss = %report.encounter.boss,
        success = report.encounter.success,
        players = report.players.len(),
        duration_ms = report.duration_ms(),
        "Encounter aggregated"
    );

    Ok(report)
}
