//! Hit statistics
//!
//! Per-skill and per-damage-type accumulators fed by damage events. Only
//! summed totals and counts live here; rates are derived by consumers from
//! these totals and the encounter duration.

use std::collections::BTreeMap;

use serde::Serialize;

use super::AggregateError;
use crate::combat_log::{AgentId, HitFlags, SkillId};

/// A damage event as seen by the accumulators
#[derive(Debug, Clone, Copy)]
pub struct Hit {
    /// Agent the damage is credited to
    pub agent: AgentId,
    pub skill: SkillId,
    pub damage: i64,
    pub flags: HitFlags,
    pub condition: bool,
}

/// A sink for hit statistics
pub trait HitSink {
    fn add_hit(&mut self, hit: &Hit) -> Result<(), AggregateError>;
}

/// Smallest and largest single hit recorded so far
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DamageRange {
    pub min_damage: i64,
    pub max_damage: i64,
}

/// Statistics for hits
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Hits {
    /// Exact sum of every recorded hit
    total_damage: i64,
    /// Part of the total from hits that never landed
    wasted_damage: i64,
    /// Total number of hits
    hits: u64,
    criticals: u64,
    /// Hits done while source was flanking target
    flanking: u64,
    /// Hits while source was above the scholar threshold
    scholar: u64,
    glancing: u64,
    /// Hits done while source was moving
    moving: u64,
    interrupted: u64,
    blocked: u64,
    evaded: u64,
    missed: u64,
    absorbed: u64,
    killing_blows: u64,
    /// None until the first hit is recorded
    #[serde(flatten)]
    range: Option<DamageRange>,
}

impl HitSink for Hits {
    fn add_hit(&mut self, hit: &Hit) -> Result<(), AggregateError> {
        self.total_damage = self.total_damage.checked_add(hit.damage).ok_or(
            AggregateError::ArithmeticOverflow {
                agent: hit.agent,
                skill: hit.skill,
            },
        )?;

        if hit.flags.is_wasted() {
            self.wasted_damage = self.wasted_damage.checked_add(hit.damage).ok_or(
                AggregateError::ArithmeticOverflow {
                    agent: hit.agent,
                    skill: hit.skill,
                },
            )?;
        }
        self.hits += 1;

        let f = hit.flags;
        if f.critical {
            self.criticals += 1;
        }
        if f.flanking {
            self.flanking += 1;
        }
        if f.scholar {
            self.scholar += 1;
        }
        if f.glancing {
            self.glancing += 1;
        }
        if f.moving {
            self.moving += 1;
        }
        if f.interrupted {
            self.interrupted += 1;
        }
        if f.blocked {
            self.blocked += 1;
        }
        if f.evaded {
            self.evaded += 1;
        }
        if f.missed {
            self.missed += 1;
        }
        if f.absorbed {
            self.absorbed += 1;
        }
        if f.killing_blow {
            self.killing_blows += 1;
        }

        self.range = Some(match self.range {
            None => DamageRange {
                min_damage: hit.damage,
                max_damage: hit.damage,
            },
            Some(r) => DamageRange {
                min_damage: r.min_damage.min(hit.damage),
                max_damage: r.max_damage.max(hit.damage),
            },
        });

        Ok(())
    }
}

impl Hits {
    pub fn total_damage(&self) -> i64 {
        self.total_damage
    }

    pub fn wasted_damage(&self) -> i64 {
        self.wasted_damage
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn criticals(&self) -> u64 {
        self.criticals
    }

    pub fn non_criticals(&self) -> u64 {
        self.hits - self.criticals
    }

    pub fn flanking(&self) -> u64 {
        self.flanking
    }

    pub fn scholar(&self) -> u64 {
        self.scholar
    }

    pub fn glancing(&self) -> u64 {
        self.glancing
    }

    pub fn moving(&self) -> u64 {
        self.moving
    }

    pub fn interrupted(&self) -> u64 {
        self.interrupted
    }

    pub fn blocked(&self) -> u64 {
        self.blocked
    }

    pub fn evaded(&self) -> u64 {
        self.evaded
    }

    pub fn missed(&self) -> u64 {
        self.missed
    }

    pub fn absorbed(&self) -> u64 {
        self.absorbed
    }

    pub fn killing_blows(&self) -> u64 {
        self.killing_blows
    }

    /// None when no hit has been recorded
    pub fn range(&self) -> Option<DamageRange> {
        self.range
    }

    pub fn min_damage(&self) -> Option<i64> {
        self.range.map(|r| r.min_damage)
    }

    pub fn max_damage(&self) -> Option<i64> {
        self.range.map(|r| r.max_damage)
    }

    pub fn is_empty(&self) -> bool {
        self.hits == 0
    }
}

/// Hit statistics split by damage type, plus a per-skill breakdown
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DamageSummary {
    pub power: Hits,
    pub condi: Hits,
    /// Per-skill statistics, both damage types, ordered by skill id
    pub abilities: BTreeMap<SkillId, Hits>,
}

impl HitSink for DamageSummary {
    fn add_hit(&mut self, hit: &Hit) -> Result<(), AggregateError> {
        if hit.condition {
            self.condi.add_hit(hit)?;
        } else {
            self.power.add_hit(hit)?;
        }
        self.abilities.entry(hit.skill).or_default().add_hit(hit)
    }
}

impl DamageSummary {
    /// Power plus condition damage, None on overflow
    pub fn total_damage(&self) -> Option<i64> {
        self.power
            .total_damage()
            .checked_add(self.condi.total_damage())
    }

    pub fn ability(&self, skill: SkillId) -> Option<&Hits> {
        self.abilities.get(&skill)
    }
}
