//! Buff stack tracking
//!
//! Every (agent, buff) pair owns a [`BuffState`] driven by apply and strip
//! events in time order. Uptime is integrated between state-affecting events
//! over intervals where the stack set is constant, so short-lived stacks are
//! credited exactly rather than sampled.
//!
//! Duration stacking keeps a queue of remaining times consumed front to back:
//! the buff is present while the queue is non-empty and uptime is measured in
//! milliseconds. Intensity stacking gives every stack its own expiry and
//! uptime is measured in stack-milliseconds.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde::Serialize;

use crate::combat_log::{BuffRemoval, EventKind, SkillEvent, SkillId};
use crate::game_data::{BuffCatalog, BuffDefinition, Stacking};

/// Remaining time of a stack applied with no duration: it lasts until stripped
/// or until the encounter ends.
const UNBOUNDED: u64 = u64::MAX;

/// Half-open window `[start, end)` during which at least one stack was held
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresenceInterval {
    pub start: u64,
    pub end: u64,
}

#[derive(Debug, Clone)]
enum Stacks {
    /// Remaining milliseconds per stack, consumed front to back
    Duration(VecDeque<u64>),
    /// Absolute expiry time per stack
    Intensity(Vec<u64>),
}

impl Stacks {
    fn len(&self) -> usize {
        match self {
            Stacks::Duration(queue) => queue.len(),
            Stacks::Intensity(expiries) => expiries.len(),
        }
    }
}

/// Overstack credited when a duration stack is discarded
#[inline]
fn discarded_ms(remaining: u64) -> u64 {
    if remaining == UNBOUNDED { 0 } else { remaining }
}

/// Stack state and accumulated statistics for one buff on one player
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuffState {
    stacking: Stacking,
    /// Stacks held when the state was last advanced
    stacks: u32,
    /// Milliseconds present (duration) or stack-milliseconds (intensity)
    uptime: u64,
    /// Milliseconds (duration) or stacks (intensity) beyond the caps
    overstack: u64,
    /// Strip events that removed at least one stack
    stripped: u32,
    applications: u32,

    #[serde(skip)]
    max_stacks: usize,
    #[serde(skip)]
    max_duration_ms: Option<u64>,
    #[serde(skip)]
    held: Stacks,
    #[serde(skip)]
    last_update: Option<u64>,
    #[serde(skip)]
    open_since: Option<u64>,
    #[serde(skip)]
    presence: Vec<PresenceInterval>,
}

impl BuffState {
    pub fn new(definition: &BuffDefinition) -> Self {
        let held = match definition.stacking {
            Stacking::Duration => Stacks::Duration(VecDeque::new()),
            Stacking::Intensity => Stacks::Intensity(Vec::new()),
        };
        Self {
            stacking: definition.stacking,
            stacks: 0,
            uptime: 0,
            overstack: 0,
            stripped: 0,
            applications: 0,
            max_stacks: definition.max_stacks.max(1) as usize,
            max_duration_ms: definition.max_duration_ms,
            held,
            last_update: None,
            open_since: None,
            presence: Vec::new(),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Event Handling
    // ═══════════════════════════════════════════════════════════════════════

    /// Apply `count` stacks lasting `duration` ms (0 = until stripped)
    pub fn apply(&mut self, time: u64, duration: u64, count: u32) {
        self.advance(time);
        self.applications += 1;

        let mut over = 0u64;
        match &mut self.held {
            Stacks::Duration(queue) => {
                let length = if duration == 0 { UNBOUNDED } else { duration };
                for _ in 0..count {
                    if queue.len() < self.max_stacks {
                        queue.push_back(length);
                        continue;
                    }
                    // Full: a longer stack displaces the shortest one
                    let shortest = queue
                        .iter()
                        .copied()
                        .enumerate()
                        .min_by_key(|&(_, remaining)| remaining);
                    match shortest {
                        Some((idx, remaining)) if remaining < length => {
                            queue[idx] = length;
                            over = over.saturating_add(discarded_ms(remaining));
                        }
                        _ => over = over.saturating_add(discarded_ms(length)),
                    }
                }

                if let Some(cap) = self.max_duration_ms {
                    let total = queue.iter().fold(0u64, |acc, r| acc.saturating_add(*r));
                    let mut excess = total.saturating_sub(cap);
                    while excess > 0 {
                        let Some(back) = queue.back_mut() else { break };
                        if *back <= excess {
                            excess -= *back;
                            over = over.saturating_add(discarded_ms(*back));
                            queue.pop_back();
                        } else {
                            if *back != UNBOUNDED {
                                over = over.saturating_add(excess);
                            }
                            *back -= excess;
                            excess = 0;
                        }
                    }
                }
            }
            Stacks::Intensity(expiries) => {
                let expiry = if duration == 0 {
                    UNBOUNDED
                } else {
                    time.saturating_add(duration)
                };
                let room = self.max_stacks.saturating_sub(expiries.len());
                let accepted = (count as usize).min(room);
                expiries.extend(std::iter::repeat_n(expiry, accepted));
                over = (count as usize - accepted) as u64;
            }
        }

        self.overstack = self.overstack.saturating_add(over);
        self.sync_presence(time);
    }

    /// Remove stacks. Returns whether anything was removed.
    ///
    /// Natural expiry removals do not count as strips.
    pub fn strip(&mut self, time: u64, removal: BuffRemoval) -> bool {
        self.advance(time);

        let removed = match (&mut self.held, removal) {
            (Stacks::Duration(queue), BuffRemoval::All) => {
                let any = !queue.is_empty();
                queue.clear();
                any
            }
            (Stacks::Intensity(expiries), BuffRemoval::All) => {
                let any = !expiries.is_empty();
                expiries.clear();
                any
            }
            (Stacks::Duration(queue), _) => queue.pop_front().is_some(),
            (Stacks::Intensity(expiries), _) => {
                let soonest = expiries
                    .iter()
                    .enumerate()
                    .min_by_key(|&(_, expiry)| *expiry)
                    .map(|(idx, _)| idx);
                match soonest {
                    Some(idx) => {
                        expiries.swap_remove(idx);
                        true
                    }
                    None => false,
                }
            }
        };

        if removed && removal != BuffRemoval::Expired {
            self.stripped += 1;
        }
        self.sync_presence(time);
        removed
    }

    /// Credit the remaining interval up to `end` and close any open presence.
    pub fn finalize(&mut self, end: u64) {
        self.advance(end);
        self.close_presence(end);
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Integration
    // ═══════════════════════════════════════════════════════════════════════

    /// Integrate uptime from the previous update to `time` and drop stacks
    /// that ran out in between.
    fn advance(&mut self, time: u64) {
        let from = match self.last_update {
            Some(prev) if time > prev => prev,
            Some(_) => return,
            None => {
                self.last_update = Some(time);
                return;
            }
        };
        let elapsed = time - from;

        let mut credited = 0u64;
        let mut emptied_at = None;
        match &mut self.held {
            Stacks::Duration(queue) => {
                let was_present = !queue.is_empty();
                let mut left = elapsed;
                while left > 0 {
                    let Some(front) = queue.front_mut() else { break };
                    let used = (*front).min(left);
                    if *front != UNBOUNDED {
                        *front -= used;
                    }
                    credited += used;
                    left -= used;
                    if *front == 0 {
                        queue.pop_front();
                    }
                }
                if was_present && queue.is_empty() {
                    emptied_at = Some(from + credited);
                }
            }
            Stacks::Intensity(expiries) => {
                let was_present = !expiries.is_empty();
                let mut last_expiry = from;
                for &expiry in expiries.iter() {
                    credited = credited.saturating_add(expiry.min(time).saturating_sub(from));
                    if expiry <= time {
                        last_expiry = last_expiry.max(expiry);
                    }
                }
                expiries.retain(|&expiry| expiry > time);
                if was_present && expiries.is_empty() {
                    emptied_at = Some(last_expiry);
                }
            }
        }

        self.uptime = self.uptime.saturating_add(credited);
        self.last_update = Some(time);
        if let Some(at) = emptied_at {
            self.close_presence(at);
        }
        self.stacks = self.held.len() as u32;
    }

    fn sync_presence(&mut self, time: u64) {
        let count = self.held.len();
        self.stacks = count as u32;
        if count > 0 && self.open_since.is_none() {
            self.open_since = Some(time);
        } else if count == 0 {
            self.close_presence(time);
        }
    }

    fn close_presence(&mut self, end: u64) {
        if let Some(start) = self.open_since.take() {
            if end > start {
                self.presence.push(PresenceInterval { start, end });
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Queries
    // ═══════════════════════════════════════════════════════════════════════

    pub fn stacking(&self) -> Stacking {
        self.stacking
    }

    pub fn stacks(&self) -> u32 {
        self.stacks
    }

    pub fn uptime(&self) -> u64 {
        self.uptime
    }

    pub fn overstack(&self) -> u64 {
        self.overstack
    }

    pub fn stripped(&self) -> u32 {
        self.stripped
    }

    pub fn applications(&self) -> u32 {
        self.applications
    }

    /// Closed presence windows in time order
    pub fn presence(&self) -> &[PresenceInterval] {
        &self.presence
    }

    /// Whether at least one stack was held at `time`
    pub fn is_active_at(&self, time: u64) -> bool {
        if self.open_since.is_some_and(|start| time >= start) {
            return true;
        }
        let idx = self.presence.partition_point(|p| p.start <= time);
        idx > 0 && self.presence[idx - 1].end > time
    }
}

/// Buff states held by one player, keyed by buff id
#[derive(Debug, Clone, Default)]
pub struct BuffTable {
    states: BTreeMap<SkillId, BuffState>,
    unknown: BTreeSet<SkillId>,
}

impl BuffTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a buff event whose holder belongs to this table's owner
    pub fn record(&mut self, event: &SkillEvent, catalog: &BuffCatalog) {
        match event.kind {
            EventKind::BuffApply { duration, stacks } => {
                self.state_for(event.skill, catalog)
                    .apply(event.time, duration, stacks);
            }
            EventKind::BuffStrip { removal } => match self.states.get_mut(&event.skill) {
                Some(state) => {
                    state.strip(event.time, removal);
                }
                None => {
                    tracing::trace!(
                        buff = %event.skill,
                        time = event.time,
                        "Strip of a buff never applied"
                    );
                }
            },
            _ => {}
        }
    }

    fn state_for(&mut self, skill: SkillId, catalog: &BuffCatalog) -> &mut BuffState {
        match self.states.entry(skill) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let state = match catalog.get(skill) {
                    Some(def) => BuffState::new(def),
                    None => {
                        self.unknown.insert(skill);
                        BuffState::new(&BuffDefinition::fallback(skill))
                    }
                };
                entry.insert(state)
            }
        }
    }

    pub fn finalize(&mut self, end: u64) {
        for state in self.states.values_mut() {
            state.finalize(end);
        }
    }

    pub fn get(&self, skill: SkillId) -> Option<&BuffState> {
        self.states.get(&skill)
    }

    pub fn is_active_at(&self, skill: SkillId, time: u64) -> bool {
        self.states.get(&skill).is_some_and(|s| s.is_active_at(time))
    }

    /// Buff ids seen without a catalog entry
    pub fn unknown(&self) -> &BTreeSet<SkillId> {
        &self.unknown
    }

    pub fn into_parts(self) -> (BTreeMap<SkillId, BuffState>, BTreeSet<SkillId>) {
        (self.states, self.unknown)
    }
}
