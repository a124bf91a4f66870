use serde::{Deserialize, Serialize};

use super::agent::{AgentId, SkillId};

/// Outcome properties of a damaging hit.
///
/// These are independent properties reported by the log, not mutually
/// exclusive outcomes: a flanking critical hit sets both flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HitFlags {
    pub critical: bool,
    pub flanking: bool,
    pub glancing: bool,
    pub moving: bool,
    /// Source was above the scholar health threshold when the hit landed
    pub scholar: bool,
    pub blocked: bool,
    pub evaded: bool,
    pub absorbed: bool,
    pub missed: bool,
    pub interrupted: bool,
    pub killing_blow: bool,
}

impl HitFlags {
    /// The damage never landed: blocked, evaded, interrupted, absorbed or
    /// missed
    pub fn is_wasted(&self) -> bool {
        self.blocked || self.evaded || self.interrupted || self.absorbed || self.missed
    }
}

/// How a buff removal event removes stacks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuffRemoval {
    /// Every stack removed
    All,
    /// A single stack removed
    Single,
    /// Stack ran out on its own (not a strip)
    Expired,
}

/// State updates for agents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateChange {
    /// Agent entered combat in subgroup
    EnterCombat(u64),
    ExitCombat,
    /// Agent got rallied
    ChangeUp,
    ChangeDown,
    ChangeDead,
    Spawn,
    Despawn,
    /// Health in basis points (99.5% is 9950)
    HealthUpdate(u16),
    MaxHealthUpdate(u64),
    WeaponSwap,
    PointOfView,
}

/// What happened in a [`SkillEvent`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum EventKind {
    DirectDamage {
        damage: i64,
        #[serde(default)]
        flags: HitFlags,
    },
    ConditionTick {
        damage: i64,
        #[serde(default)]
        flags: HitFlags,
    },
    BuffApply {
        /// Contributed duration in milliseconds, 0 when unbounded
        duration: u64,
        #[serde(default = "one_stack")]
        stacks: u32,
    },
    BuffStrip {
        removal: BuffRemoval,
    },
    StateChange {
        change: StateChange,
    },
    ActivationStart {
        /// Expected cast time in milliseconds
        expected_duration: u64,
    },
    ActivationCancel,
    ActivationComplete,
}

fn one_stack() -> u32 {
    1
}

/// A single combat log event.
///
/// Events are produced once by the log parser and never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillEvent {
    /// Milliseconds on the log clock
    pub time: u64,
    pub source: AgentId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<AgentId>,
    #[serde(default = "no_skill")]
    pub skill: SkillId,
    #[serde(flatten)]
    pub kind: EventKind,
}

fn no_skill() -> SkillId {
    SkillId(0)
}

impl SkillEvent {
    /// Damage amount and flags, with `true` for condition damage
    #[inline]
    pub fn damage(&self) -> Option<(i64, HitFlags, bool)> {
        match self.kind {
            EventKind::DirectDamage { damage, flags } => Some((damage, flags, false)),
            EventKind::ConditionTick { damage, flags } => Some((damage, flags, true)),
            _ => None,
        }
    }

    #[inline]
    pub fn state_change(&self) -> Option<StateChange> {
        match self.kind {
            EventKind::StateChange { change } => Some(change),
            _ => None,
        }
    }

    #[inline]
    pub fn is_buff_event(&self) -> bool {
        matches!(
            self.kind,
            EventKind::BuffApply { .. } | EventKind::BuffStrip { .. }
        )
    }

    /// Agent carrying the buff for apply/strip events
    #[inline]
    pub fn buff_holder(&self) -> AgentId {
        self.target.unwrap_or(self.source)
    }

    /// Every agent id this event references
    pub fn referenced_agents(&self) -> impl Iterator<Item = AgentId> {
        std::iter::once(self.source).chain(self.target)
    }
}
