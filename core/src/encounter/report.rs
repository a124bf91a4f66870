//! Report assembly
//!
//! Pure combination of finished per-agent aggregates into the
//! [`EncounterReport`]. No statistics are recomputed here.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::combat_log::{Agent, AgentId, Language, LogMeta, SkillId};
use crate::game_data::{BuffCatalog, BuffDefinition, boss_name};
use crate::timeline::{EncounterBounds, Timeline};

use super::AggregateError;
use super::activation::ActivationLog;
use super::buffs::BuffState;
use super::hits::DamageSummary;
use super::player::{PlayerAggregate, SourceAggregate};
use super::series::Series;

/// Encounter metadata
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EncounterInfo {
    pub boss: String,
    pub game_build: u64,
    pub lang: Language,
    pub log_start: u32,
    pub log_end: u32,
    pub log_name: String,
    pub server_shard: u64,
    /// Every boss agent died
    pub success: bool,
    #[serde(flatten)]
    pub bounds: EncounterBounds,
    /// Buff ids seen without a catalog entry, ascending
    pub unknown_buffs: Vec<SkillId>,
}

/// Boss hits of one damage source of a player
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceReport {
    /// Earliest-seen agent of the source
    pub agent: Agent,
    pub agent_ids: Vec<AgentId>,
    pub boss_hits: DamageSummary,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerReport {
    pub agent: Agent,
    /// Every agent record merged into this player
    pub agent_ids: Vec<AgentId>,
    pub boss_hits: DamageSummary,
    /// The player's own boss hits first, then one entry per minion species
    pub agents: Vec<SourceReport>,
    pub hits: DamageSummary,
    pub buffs: BTreeMap<SkillId, BuffState>,
    pub series: Series,
    pub activation_log: ActivationLog,
    pub incoming_damage: DamageSummary,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnemyReport {
    pub agent: Agent,
    pub series: Series,
}

/// Root aggregate for one log
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EncounterReport {
    pub buffs: BTreeMap<SkillId, BuffDefinition>,
    pub encounter: EncounterInfo,
    pub enemies: Vec<EnemyReport>,
    pub players: Vec<PlayerReport>,
    pub skills: BTreeMap<SkillId, String>,
}

fn agent_record(timeline: &Timeline, id: AgentId) -> Result<Agent, AggregateError> {
    timeline
        .agent(id)
        .cloned()
        .ok_or(AggregateError::IncompleteAggregate { agent: id })
}

fn source_report(
    timeline: &Timeline,
    source: SourceAggregate,
) -> Result<SourceReport, AggregateError> {
    Ok(SourceReport {
        agent: agent_record(timeline, source.primary)?,
        agent_ids: source.agent_ids,
        boss_hits: source.boss_hits,
    })
}

impl EncounterReport {
    pub fn player(&self, id: AgentId) -> Option<&PlayerReport> {
        self.players
            .iter()
            .find(|p| p.agent.id == id || p.agent_ids.contains(&id))
    }

    pub fn enemy(&self, id: AgentId) -> Option<&EnemyReport> {
        self.enemies.iter().find(|e| e.agent.id == id)
    }

    pub fn duration_ms(&self) -> u64 {
        self.encounter.bounds.duration_ms()
    }
}

/// Join finished aggregates into the report.
///
/// Fails with `IncompleteAggregate` when a player or enemy id has no agent
/// record in the timeline.
pub fn assemble(
    timeline: &Timeline,
    meta: LogMeta,
    catalog: &BuffCatalog,
    skills: BTreeMap<SkillId, String>,
    players: Vec<PlayerAggregate>,
    enemies: Vec<(AgentId, Series)>,
) -> Result<EncounterReport, AggregateError> {
    let mut unknown_buffs = BTreeSet::new();
    let mut player_reports = Vec::with_capacity(players.len());
    for player in players {
        let agent = agent_record(timeline, player.primary)?;
        let agents = player
            .sources
            .into_iter()
            .map(|source| source_report(timeline, source))
            .collect::<Result<Vec<_>, _>>()?;
        unknown_buffs.extend(player.unknown_buffs);
        player_reports.push(PlayerReport {
            agent,
            agent_ids: player.agent_ids,
            boss_hits: player.boss_hits,
            agents,
            hits: player.hits,
            buffs: player.buffs,
            series: player.series,
            activation_log: player.activation_log,
            incoming_damage: player.incoming_damage,
        });
    }

    let mut enemy_reports = Vec::with_capacity(enemies.len());
    for (id, series) in enemies {
        let agent = agent_record(timeline, id)?;
        enemy_reports.push(EnemyReport { agent, series });
    }

    let success = !timeline.bosses().is_empty()
        && timeline
            .bosses()
            .iter()
            .all(|id| timeline.agent(*id).is_some_and(Agent::did_die));

    let encounter = EncounterInfo {
        boss: boss_name(meta.boss_species).to_string(),
        game_build: meta.game_build,
        lang: meta.lang,
        log_start: meta.log_start,
        log_end: meta.log_end,
        log_name: meta.log_name,
        server_shard: meta.server_shard,
        success,
        bounds: *timeline.bounds(),
        unknown_buffs: unknown_buffs.into_iter().collect(),
    };

    Ok(EncounterReport {
        buffs: catalog.to_map(),
        encounter,
        enemies: enemy_reports,
        players: player_reports,
        skills,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat_log::{EventKind, Profession, SkillEvent, SpeciesId, StateChange};
    use crate::context::intern;
    use crate::encounter::{ActivationLog, SeriesBuilder};

    const BOSS_SPECIES: SpeciesId = SpeciesId(0x3c4e);

    fn make_timeline() -> Timeline {
        let player = Agent {
            id: AgentId(1),
            name: intern("Present"),
            profession: Profession::Guardian,
            last_aware: 1000,
            ..Default::default()
        };
        let boss = Agent {
            id: AgentId(9),
            profession: Profession::NonPlayableCharacter,
            species_id: Some(BOSS_SPECIES),
            last_aware: 1000,
            ..Default::default()
        };
        let events = vec![SkillEvent {
            time: 0,
            source: AgentId(9),
            target: None,
            skill: SkillId(0),
            kind: EventKind::StateChange {
                change: StateChange::HealthUpdate(10_000),
            },
        }];
        Timeline::build(vec![player, boss], events, BOSS_SPECIES).unwrap()
    }

    fn make_aggregate(primary: AgentId) -> PlayerAggregate {
        PlayerAggregate {
            primary,
            agent_ids: vec![primary],
            hits: DamageSummary::default(),
            boss_hits: DamageSummary::default(),
            sources: vec![SourceAggregate {
                primary,
                agent_ids: vec![primary],
                boss_hits: DamageSummary::default(),
            }],
            incoming_damage: DamageSummary::default(),
            buffs: BTreeMap::new(),
            unknown_buffs: BTreeSet::new(),
            series: SeriesBuilder::new(0).finish(1000, false),
            activation_log: ActivationLog::default(),
        }
    }

    fn run(
        timeline: &Timeline,
        players: Vec<PlayerAggregate>,
        enemies: Vec<(AgentId, Series)>,
    ) -> Result<EncounterReport, AggregateError> {
        let catalog = BuffCatalog::bundled().unwrap();
        assemble(
            timeline,
            LogMeta {
                boss_species: BOSS_SPECIES,
                ..Default::default()
            },
            &catalog,
            BTreeMap::new(),
            players,
            enemies,
        )
    }

    #[test]
    fn joins_known_agents() {
        let timeline = make_timeline();
        let enemies = vec![(AgentId(9), Series::default())];
        let report = run(&timeline, vec![make_aggregate(AgentId(1))], enemies).unwrap();

        assert_eq!(report.players.len(), 1);
        assert_eq!(report.players[0].agent.name_str(), "Present");
        assert_eq!(report.players[0].agents.len(), 1);
        assert_eq!(report.enemies[0].agent.id, AgentId(9));
        assert_eq!(report.encounter.boss, "Vale Guardian");
    }

    #[test]
    fn missing_player_record_fails_assembly() {
        let timeline = make_timeline();
        let err = run(&timeline, vec![make_aggregate(AgentId(42))], Vec::new()).unwrap_err();
        assert!(matches!(
            err,
            AggregateError::IncompleteAggregate { agent: AgentId(42) }
        ));
    }

    #[test]
    fn missing_source_record_fails_assembly() {
        let timeline = make_timeline();
        let mut player = make_aggregate(AgentId(1));
        player.sources.push(SourceAggregate {
            primary: AgentId(77),
            agent_ids: vec![AgentId(77)],
            boss_hits: DamageSummary::default(),
        });
        let err = run(&timeline, vec![player], Vec::new()).unwrap_err();
        assert!(matches!(
            err,
            AggregateError::IncompleteAggregate { agent: AgentId(77) }
        ));
    }

    #[test]
    fn missing_enemy_record_fails_assembly() {
        let timeline = make_timeline();
        let enemies = vec![(AgentId(99), Series::default())];
        let err = run(&timeline, vec![make_aggregate(AgentId(1))], enemies).unwrap_err();
        assert!(matches!(
            err,
            AggregateError::IncompleteAggregate { agent: AgentId(99) }
        ));
    }
}
