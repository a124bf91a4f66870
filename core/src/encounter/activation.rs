//! Activation log
//!
//! Pairs activation starts with their cancel or completion for the same
//! (agent, skill) and records one [`ActivationRecord`] per cast attempt.
//! Records keep the order of their start events.

use hashbrown::HashMap;
use serde::Serialize;

use crate::combat_log::{AgentId, SkillId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivationRecord {
    pub time: u64,
    pub skill: SkillId,
    /// Quickness was held at activation start
    pub quickness: bool,
    pub canceled: bool,
    /// Milliseconds from start to close
    pub duration: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ActivationLog {
    records: Vec<ActivationRecord>,
}

impl ActivationLog {
    pub fn records(&self) -> &[ActivationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn canceled(&self) -> impl Iterator<Item = &ActivationRecord> {
        self.records.iter().filter(|r| r.canceled)
    }
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    slot: usize,
    expected: u64,
}

/// Incremental activation pairing in event order
#[derive(Debug, Default)]
pub struct ActivationLogBuilder {
    log: ActivationLog,
    pending: HashMap<(AgentId, SkillId), Pending>,
}

impl ActivationLogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cast begins. A still-pending cast of the same skill by the same
    /// agent is closed first.
    pub fn start(
        &mut self,
        time: u64,
        agent: AgentId,
        skill: SkillId,
        expected: u64,
        quickness: bool,
    ) {
        if let Some(previous) = self.pending.remove(&(agent, skill)) {
            self.close_interrupted(previous, time);
        }

        let slot = self.log.records.len();
        self.log.records.push(ActivationRecord {
            time,
            skill,
            quickness,
            // Provisional until closed
            canceled: true,
            duration: 0,
        });
        self.pending.insert((agent, skill), Pending { slot, expected });
    }

    /// Canceled only when the cast was cut short of its expected duration
    pub fn cancel(&mut self, time: u64, agent: AgentId, skill: SkillId) {
        match self.pending.remove(&(agent, skill)) {
            Some(pending) => self.close_interrupted(pending, time),
            None => {
                tracing::trace!(%agent, %skill, time, "Cancel without a pending activation");
            }
        }
    }

    pub fn complete(&mut self, time: u64, agent: AgentId, skill: SkillId) {
        match self.pending.remove(&(agent, skill)) {
            Some(pending) => {
                let record = &mut self.log.records[pending.slot];
                record.canceled = false;
                record.duration = time.saturating_sub(record.time);
            }
            None => {
                tracing::trace!(%agent, %skill, time, "Completion without a pending activation");
            }
        }
    }

    fn close_interrupted(&mut self, pending: Pending, time: u64) {
        let record = &mut self.log.records[pending.slot];
        let elapsed = time.saturating_sub(record.time);
        record.canceled = elapsed < pending.expected;
        record.duration = elapsed;
    }

    /// Close everything still pending as canceled at `end`
    pub fn finish(mut self, end: u64) -> ActivationLog {
        for (_, pending) in self.pending.drain() {
            let record = &mut self.log.records[pending.slot];
            record.canceled = true;
            record.duration = end.saturating_sub(record.time);
        }
        self.log
    }
}
