//! Timeline indexing
//!
//! Orders the parser's events, validates agent references and derives the
//! encounter bounds every downstream aggregator reads. The resulting
//! [`Timeline`] is immutable and shared by reference across workers.

use std::collections::BTreeMap;

use hashbrown::HashMap;
use serde::Serialize;

use crate::combat_log::{Agent, AgentId, SkillEvent, SpeciesId, StateChange};
use crate::encounter::{AggregateError, TimelineFault};

/// Upper bound on master -> minion chains followed when resolving owners
const MAX_OWNER_DEPTH: usize = 8;

/// Encounter-wide time bounds, in log milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EncounterBounds {
    /// First event timestamp
    pub encounter_start: u64,
    /// Last event timestamp
    pub encounter_end: u64,
    /// First time any boss reported health above zero
    pub boss_active_start: Option<u64>,
    /// Last time any boss reported health above zero
    pub boss_active_end: Option<u64>,
}

impl EncounterBounds {
    #[inline]
    pub fn duration_ms(&self) -> u64 {
        self.encounter_end - self.encounter_start
    }
}

/// First and last timestamps an agent appears in any event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentActivity {
    pub first_seen: u64,
    pub last_seen: u64,
}

/// Sorted, validated event sequence plus the agent set it refers to
#[derive(Debug, Clone)]
pub struct Timeline {
    events: Vec<SkillEvent>,
    agents: BTreeMap<AgentId, Agent>,
    bosses: Vec<AgentId>,
    bounds: EncounterBounds,
    activity: HashMap<AgentId, AgentActivity>,
}

impl Timeline {
    /// Index an event sequence.
    ///
    /// Events are stably sorted by timestamp, so events sharing a timestamp
    /// keep their log order. Fails when the sequence is empty or an event
    /// references an agent missing from `agents`.
    pub fn build(
        agents: Vec<Agent>,
        mut events: Vec<SkillEvent>,
        boss_species: SpeciesId,
    ) -> Result<Self, AggregateError> {
        if events.is_empty() {
            return Err(TimelineFault::NoEvents.into());
        }

        let mut agent_map = BTreeMap::new();
        for agent in agents {
            let id = agent.id;
            if agent_map.insert(id, agent).is_some() {
                return Err(TimelineFault::DuplicateAgent { agent: id }.into());
            }
        }

        events.sort_by_key(|e| e.time);

        let mut activity: HashMap<AgentId, AgentActivity> = HashMap::new();
        for event in &events {
            for id in event.referenced_agents() {
                if !agent_map.contains_key(&id) {
                    return Err(TimelineFault::UnknownAgent {
                        time: event.time,
                        agent: id,
                    }
                    .into());
                }
                activity
                    .entry(id)
                    .and_modify(|a| a.last_seen = event.time)
                    .or_insert(AgentActivity {
                        first_seen: event.time,
                        last_seen: event.time,
                    });
            }
        }

        let bosses: Vec<AgentId> = agent_map
            .values()
            .filter(|a| a.species_id == Some(boss_species))
            .map(|a| a.id)
            .collect();

        let mut boss_active_start = None;
        let mut boss_active_end = None;
        for event in &events {
            let boss_alive = matches!(
                event.state_change(),
                Some(StateChange::HealthUpdate(hp)) if hp > 0
            );
            if boss_alive && bosses.contains(&event.source) {
                boss_active_start.get_or_insert(event.time);
                boss_active_end = Some(event.time);
            }
        }

        // Non-empty checked above
        let bounds = EncounterBounds {
            encounter_start: events[0].time,
            encounter_end: events[events.len() - 1].time,
            boss_active_start,
            boss_active_end,
        };

        tracing::debug!(
            events = events.len(),
            agents = agent_map.len(),
            bosses = bosses.len(),
            duration_ms = bounds.duration_ms(),
            "Timeline indexed"
        );

        Ok(Self {
            events,
            agents: agent_map,
            bosses,
            bounds,
            activity,
        })
    }

    /// Events in time order
    #[inline]
    pub fn events(&self) -> &[SkillEvent] {
        &self.events
    }

    /// Events with `start <= time <= end`
    pub fn events_between(&self, start: u64, end: u64) -> &[SkillEvent] {
        let lo = self.events.partition_point(|e| e.time < start);
        let hi = self.events.partition_point(|e| e.time <= end);
        &self.events[lo..hi.max(lo)]
    }

    #[inline]
    pub fn bounds(&self) -> &EncounterBounds {
        &self.bounds
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(&id)
    }

    /// All agents in id order
    pub fn agents(&self) -> impl Iterator<Item = &Agent> {
        self.agents.values()
    }

    /// Boss-class agents in id order
    #[inline]
    pub fn bosses(&self) -> &[AgentId] {
        &self.bosses
    }

    #[inline]
    pub fn is_boss(&self, id: AgentId) -> bool {
        self.bosses.contains(&id)
    }

    pub fn activity(&self, id: AgentId) -> Option<AgentActivity> {
        self.activity.get(&id).copied()
    }

    /// Agent credited for actions of `id`: its top-level master, or itself.
    pub fn owner_of(&self, id: AgentId) -> AgentId {
        let mut current = id;
        for _ in 0..MAX_OWNER_DEPTH {
            match self.agents.get(&current).and_then(|a| a.master) {
                Some(master) if master != current && self.agents.contains_key(&master) => {
                    current = master;
                }
                _ => break,
            }
        }
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat_log::{EventKind, HitFlags, Profession, SkillId};

    const BOSS_SPECIES: SpeciesId = SpeciesId(0x3c4e);

    fn player(id: u64) -> Agent {
        Agent {
            id: AgentId(id),
            profession: Profession::Guardian,
            ..Default::default()
        }
    }

    fn boss(id: u64) -> Agent {
        Agent {
            id: AgentId(id),
            profession: Profession::NonPlayableCharacter,
            species_id: Some(BOSS_SPECIES),
            ..Default::default()
        }
    }

    fn hit(time: u64, source: u64, target: u64, damage: i64) -> SkillEvent {
        SkillEvent {
            time,
            source: AgentId(source),
            target: Some(AgentId(target)),
            skill: SkillId(1),
            kind: EventKind::DirectDamage {
                damage,
                flags: HitFlags::default(),
            },
        }
    }

    fn health(time: u64, source: u64, hp: u16) -> SkillEvent {
        SkillEvent {
            time,
            source: AgentId(source),
            target: None,
            skill: SkillId(0),
            kind: EventKind::StateChange {
                change: StateChange::HealthUpdate(hp),
            },
        }
    }

    #[test]
    fn sorts_by_time_keeping_log_order_for_ties() {
        let events = vec![
            hit(300, 1, 9, 3),
            hit(100, 1, 9, 1),
            hit(300, 1, 9, 4),
            hit(200, 1, 9, 2),
        ];
        let timeline = Timeline::build(vec![player(1), boss(9)], events, BOSS_SPECIES).unwrap();

        let damages: Vec<i64> = timeline
            .events()
            .iter()
            .filter_map(|e| e.damage().map(|d| d.0))
            .collect();
        assert_eq!(damages, vec![1, 2, 3, 4]);
    }

    #[test]
    fn derives_encounter_and_boss_bounds() {
        let events = vec![
            hit(50, 1, 9, 10),
            health(100, 9, 10000),
            health(400, 9, 5000),
            health(450, 9, 0),
            hit(500, 1, 9, 10),
        ];
        let timeline = Timeline::build(vec![player(1), boss(9)], events, BOSS_SPECIES).unwrap();
        let bounds = timeline.bounds();

        assert_eq!(bounds.encounter_start, 50);
        assert_eq!(bounds.encounter_end, 500);
        assert_eq!(bounds.duration_ms(), 450);
        assert_eq!(bounds.boss_active_start, Some(100));
        assert_eq!(bounds.boss_active_end, Some(400));
        assert_eq!(timeline.bosses(), &[AgentId(9)]);
    }

    #[test]
    fn empty_sequence_is_malformed() {
        let err = Timeline::build(vec![player(1)], Vec::new(), BOSS_SPECIES).unwrap_err();
        assert!(matches!(
            err,
            AggregateError::MalformedTimeline(TimelineFault::NoEvents)
        ));
    }

    #[test]
    fn unknown_agent_reference_is_malformed() {
        let err = Timeline::build(vec![player(1)], vec![hit(10, 1, 77, 5)], BOSS_SPECIES)
            .unwrap_err();
        assert!(matches!(
            err,
            AggregateError::MalformedTimeline(TimelineFault::UnknownAgent {
                time: 10,
                agent: AgentId(77)
            })
        ));
    }

    #[test]
    fn duplicate_agents_are_malformed() {
        let err = Timeline::build(vec![player(1), player(1)], vec![hit(10, 1, 1, 5)], BOSS_SPECIES)
            .unwrap_err();
        assert!(matches!(
            err,
            AggregateError::MalformedTimeline(TimelineFault::DuplicateAgent { .. })
        ));
    }

    #[test]
    fn tracks_first_and_last_seen() {
        let events = vec![hit(10, 1, 9, 1), hit(20, 9, 1, 1), hit(90, 1, 9, 1)];
        let timeline = Timeline::build(vec![player(1), boss(9)], events, BOSS_SPECIES).unwrap();

        assert_eq!(
            timeline.activity(AgentId(1)),
            Some(AgentActivity { first_seen: 10, last_seen: 90 })
        );
    }

    #[test]
    fn owner_follows_master_chain() {
        let mut minion = player(2);
        minion.profession = Profession::Gadget;
        minion.master = Some(AgentId(1));
        let mut turret_shot = player(3);
        turret_shot.profession = Profession::Gadget;
        turret_shot.master = Some(AgentId(2));

        let timeline = Timeline::build(
            vec![player(1), minion, turret_shot, boss(9)],
            vec![hit(10, 3, 9, 1)],
            BOSS_SPECIES,
        )
        .unwrap();

        assert_eq!(timeline.owner_of(AgentId(3)), AgentId(1));
        assert_eq!(timeline.owner_of(AgentId(1)), AgentId(1));
    }

    #[test]
    fn events_between_is_inclusive() {
        let events = vec![hit(10, 1, 9, 1), hit(20, 1, 9, 2), hit(30, 1, 9, 3)];
        let timeline = Timeline::build(vec![player(1), boss(9)], events, BOSS_SPECIES).unwrap();

        assert_eq!(timeline.events_between(20, 30).len(), 2);
        assert!(timeline.events_between(31, 40).is_empty());
    }
}
