//! Per-agent folds
//!
//! Each player (and each boss) is aggregated independently from the shared
//! [`Timeline`]; nothing here is shared between workers except read access
//! to the timeline and catalog.

use std::collections::{BTreeMap, BTreeSet};

use crate::combat_log::{AgentId, EventKind, SkillId, SpeciesId, StateChange};
use crate::game_data::BuffCatalog;
use crate::timeline::Timeline;

use super::AggregateError;
use super::activation::{ActivationLog, ActivationLogBuilder};
use super::buffs::{BuffState, BuffTable};
use super::hits::{DamageSummary, Hit, HitSink};
use super::series::{Series, SeriesBuilder};

/// One logical player: every agent record of the same account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerGroup {
    /// Earliest-seen member, reported as the player's agent
    pub primary: AgentId,
    /// All member ids in ascending order
    pub members: Vec<AgentId>,
}

impl PlayerGroup {
    #[inline]
    pub fn contains(&self, id: AgentId) -> bool {
        self.members.contains(&id)
    }
}

/// Group player-character agents by account name.
///
/// Agents without an account name form their own group. Groups are returned
/// in ascending order of their primary id.
pub fn group_players(timeline: &Timeline) -> Vec<PlayerGroup> {
    let mut by_account: BTreeMap<&'static str, Vec<AgentId>> = BTreeMap::new();
    let mut groups = Vec::new();

    for agent in timeline.agents() {
        if !agent.is_player_character() || agent.master.is_some() {
            continue;
        }
        let account = agent.account_str();
        if account.is_empty() {
            groups.push(vec![agent.id]);
        } else {
            by_account.entry(account).or_default().push(agent.id);
        }
    }
    groups.extend(by_account.into_values());

    let mut groups: Vec<PlayerGroup> = groups
        .into_iter()
        .filter_map(|mut members| {
            members.sort();
            let primary = members
                .iter()
                .filter_map(|id| timeline.agent(*id))
                .min_by_key(|a| (a.first_aware, a.id))?
                .id;
            Some(PlayerGroup { primary, members })
        })
        .collect();
    groups.sort_by_key(|g| g.primary);
    groups
}

/// Boss hits of one damage source: the player's own agents, or every
/// minion of one species
#[derive(Debug, Clone)]
pub struct SourceAggregate {
    pub primary: AgentId,
    pub agent_ids: Vec<AgentId>,
    pub boss_hits: DamageSummary,
}

impl SourceAggregate {
    fn new(primary: AgentId, agent_ids: Vec<AgentId>) -> Self {
        Self {
            primary,
            agent_ids,
            boss_hits: DamageSummary::default(),
        }
    }
}

/// The player's own source first, then one source per minion species in
/// ascending species order. Minions without a species id are left out.
pub fn damage_sources(timeline: &Timeline, group: &PlayerGroup) -> Vec<SourceAggregate> {
    let mut by_species: BTreeMap<SpeciesId, Vec<AgentId>> = BTreeMap::new();
    for agent in timeline.agents() {
        if agent.master.is_none() || !group.contains(timeline.owner_of(agent.id)) {
            continue;
        }
        if let Some(species) = agent.species_id {
            by_species.entry(species).or_default().push(agent.id);
        }
    }

    let mut sources = vec![SourceAggregate::new(group.primary, group.members.clone())];
    for members in by_species.into_values() {
        let primary = members
            .iter()
            .filter_map(|id| timeline.agent(*id))
            .min_by_key(|a| (a.first_aware, a.id))
            .map(|a| a.id);
        if let Some(primary) = primary {
            sources.push(SourceAggregate::new(primary, members));
        }
    }
    sources
}

/// Everything computed for one player before assembly
#[derive(Debug, Clone)]
pub struct PlayerAggregate {
    pub primary: AgentId,
    pub agent_ids: Vec<AgentId>,
    pub hits: DamageSummary,
    pub boss_hits: DamageSummary,
    pub sources: Vec<SourceAggregate>,
    pub incoming_damage: DamageSummary,
    pub buffs: BTreeMap<SkillId, BuffState>,
    pub unknown_buffs: BTreeSet<SkillId>,
    pub series: Series,
    pub activation_log: ActivationLog,
}

/// Fold the timeline for one player.
///
/// Damage, buff and series state are built in one pass. Activations are
/// paired in a second pass once buff presence is final, so the quickness
/// flag sees the complete presence windows.
pub fn aggregate_player(
    timeline: &Timeline,
    group: &PlayerGroup,
    catalog: &BuffCatalog,
    quickness: SkillId,
) -> Result<PlayerAggregate, AggregateError> {
    let bounds = timeline.bounds();
    let members: Vec<_> = group
        .members
        .iter()
        .map(|id| {
            timeline
                .agent(*id)
                .ok_or(AggregateError::IncompleteAggregate { agent: *id })
        })
        .collect::<Result<_, _>>()?;

    let first_aware = members.iter().map(|a| a.first_aware).min().unwrap_or(0);
    let last_member = members.iter().max_by_key(|a| a.end_of_life());

    let mut hits = DamageSummary::default();
    let mut boss_hits = DamageSummary::default();
    let mut sources = damage_sources(timeline, group);
    let mut incoming_damage = DamageSummary::default();
    let mut buffs = BuffTable::new();
    let mut series = SeriesBuilder::new(first_aware);

    // ─── Damage, buffs, life state ──────────────────────────────────────────
    for event in timeline.events() {
        if let Some((damage, flags, condition)) = event.damage() {
            let owner = timeline.owner_of(event.source);
            if group.contains(owner) {
                let hit = Hit {
                    agent: owner,
                    skill: event.skill,
                    damage,
                    flags,
                    condition,
                };
                let to_boss = event.target.is_some_and(|t| timeline.is_boss(t));
                hits.add_hit(&hit)?;
                if to_boss {
                    boss_hits.add_hit(&hit)?;
                    let source = sources
                        .iter_mut()
                        .find(|s| s.agent_ids.contains(&event.source));
                    if let Some(source) = source {
                        source.boss_hits.add_hit(&hit)?;
                    }
                }
                series.add_damage(&hit, to_boss)?;
            }
            if let Some(target) = event.target.filter(|t| group.contains(*t)) {
                incoming_damage.add_hit(&Hit {
                    agent: target,
                    skill: event.skill,
                    damage,
                    flags,
                    condition,
                })?;
            }
            continue;
        }

        if event.is_buff_event() {
            if group.contains(event.buff_holder()) {
                buffs.record(event, catalog);
            }
            continue;
        }

        if let Some(change) = event.state_change() {
            if !group.contains(event.source) {
                continue;
            }
            match change {
                StateChange::HealthUpdate(health) => series.health(event.time, health),
                StateChange::ChangeDown => series.downed(event.time),
                StateChange::ChangeUp => series.up(event.time),
                StateChange::ChangeDead => series.dead(event.time),
                StateChange::WeaponSwap => series.weapon_swap(event.time),
                _ => {}
            }
        }
    }
    buffs.finalize(bounds.encounter_end);

    // ─── Activations ────────────────────────────────────────────────────────
    let mut activations = ActivationLogBuilder::new();
    for event in timeline.events() {
        let is_activation = matches!(
            event.kind,
            EventKind::ActivationStart { .. }
                | EventKind::ActivationCancel
                | EventKind::ActivationComplete
        );
        if !is_activation || !group.contains(timeline.owner_of(event.source)) {
            continue;
        }
        match event.kind {
            EventKind::ActivationStart { expected_duration } => activations.start(
                event.time,
                event.source,
                event.skill,
                expected_duration,
                buffs.is_active_at(quickness, event.time),
            ),
            EventKind::ActivationCancel => {
                activations.cancel(event.time, event.source, event.skill)
            }
            EventKind::ActivationComplete => {
                activations.complete(event.time, event.source, event.skill)
            }
            _ => {}
        }
    }

    let series = match last_member {
        Some(agent) => series.finish(agent.end_of_life(), agent.did_die()),
        None => series.finish(bounds.encounter_end, false),
    };
    let (buffs, unknown_buffs) = buffs.into_parts();

    tracing::trace!(
        player = %group.primary,
        hits = hits.power.hits() + hits.condi.hits(),
        buffs = buffs.len(),
        "Player aggregated"
    );

    Ok(PlayerAggregate {
        primary: group.primary,
        agent_ids: group.members.clone(),
        hits,
        boss_hits,
        sources,
        incoming_damage,
        buffs,
        unknown_buffs,
        series,
        activation_log: activations.finish(bounds.encounter_end),
    })
}

/// Series for a boss: damage taken, health and life state
pub fn enemy_series(timeline: &Timeline, id: AgentId) -> Result<Series, AggregateError> {
    let agent = timeline
        .agent(id)
        .ok_or(AggregateError::IncompleteAggregate { agent: id })?;

    let mut series = SeriesBuilder::new(agent.first_aware);
    for event in timeline.events() {
        if let Some((damage, flags, condition)) = event.damage() {
            if event.target == Some(id) {
                let owner = timeline.owner_of(event.source);
                let from_player = timeline
                    .agent(owner)
                    .is_some_and(|a| a.is_player_character());
                let hit = Hit {
                    agent: owner,
                    skill: event.skill,
                    damage,
                    flags,
                    condition,
                };
                series.add_damage(&hit, from_player)?;
            }
            continue;
        }
        if event.source != id {
            continue;
        }
        match event.state_change() {
            Some(StateChange::HealthUpdate(health)) => series.health(event.time, health),
            Some(StateChange::ChangeDown) => series.downed(event.time),
            Some(StateChange::ChangeUp) => series.up(event.time),
            Some(StateChange::ChangeDead) => series.dead(event.time),
            Some(StateChange::WeaponSwap) => series.weapon_swap(event.time),
            _ => {}
        }
    }

    Ok(series.finish(agent.end_of_life(), agent.did_die()))
}
