//! Tests for BuffState stacking and uptime integration
//!
//! Verifies that:
//! - Duration buffs accrue presence time and respect stack and time caps
//! - Intensity buffs accrue stack-time and cap stack counts
//! - Strips, expiry and encounter end close presence correctly

use crate::combat_log::{AgentId, BuffRemoval, EventKind, SkillEvent, SkillId};
use crate::game_data::{BuffCatalog, BuffCategory, BuffDefinition, Stacking};

use super::buffs::{BuffState, BuffTable, PresenceInterval};

// ═══════════════════════════════════════════════════════════════════════════
// Test Helpers
// ═══════════════════════════════════════════════════════════════════════════

fn make_def(stacking: Stacking, max_stacks: u32) -> BuffDefinition {
    BuffDefinition {
        id: SkillId(1000),
        name: "Test Buff".to_string(),
        stacking,
        max_stacks,
        max_duration_ms: None,
        category: BuffCategory::Boon,
    }
}

fn duration_buff(max_stacks: u32) -> BuffState {
    BuffState::new(&make_def(Stacking::Duration, max_stacks))
}

fn intensity_buff(max_stacks: u32) -> BuffState {
    BuffState::new(&make_def(Stacking::Intensity, max_stacks))
}

fn apply_event(time: u64, skill: u32, duration: u64) -> SkillEvent {
    SkillEvent {
        time,
        source: AgentId(2),
        target: Some(AgentId(1)),
        skill: SkillId(skill),
        kind: EventKind::BuffApply { duration, stacks: 1 },
    }
}

fn strip_event(time: u64, skill: u32, removal: BuffRemoval) -> SkillEvent {
    SkillEvent {
        time,
        source: AgentId(2),
        target: Some(AgentId(1)),
        skill: SkillId(skill),
        kind: EventKind::BuffStrip { removal },
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Duration Stacking
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn strip_cuts_uptime_short() {
    let mut state = duration_buff(5);
    state.apply(0, 3000, 1);
    assert!(state.strip(1000, BuffRemoval::Single));
    state.finalize(5000);

    assert_eq!(state.uptime(), 1000);
    assert_eq!(state.stripped(), 1);
    assert_eq!(state.overstack(), 0);
    assert_eq!(state.presence(), &[PresenceInterval { start: 0, end: 1000 }]);
}

#[test]
fn natural_expiry_stops_uptime() {
    let mut state = duration_buff(5);
    state.apply(100, 2000, 1);
    state.finalize(10_000);

    assert_eq!(state.uptime(), 2000);
    assert_eq!(state.stacks(), 0);
    assert!(state.is_active_at(100));
    assert!(state.is_active_at(2099));
    assert!(!state.is_active_at(2100));
}

#[test]
fn queued_stacks_extend_presence() {
    let mut state = duration_buff(5);
    state.apply(0, 1000, 1);
    state.apply(500, 1000, 1);
    state.finalize(10_000);

    // 500ms consumed from the first stack, then 500 + 1000 remain
    assert_eq!(state.uptime(), 2000);
    assert_eq!(state.presence(), &[PresenceInterval { start: 0, end: 2000 }]);
}

#[test]
fn full_queue_displaces_shortest_stack() {
    let mut state = duration_buff(1);
    state.apply(0, 1000, 1);
    state.apply(0, 4000, 1);
    state.apply(0, 500, 1);
    state.finalize(10_000);

    // 1000 displaced by 4000, then 500 rejected
    assert_eq!(state.overstack(), 1500);
    assert_eq!(state.uptime(), 4000);
}

#[test]
fn duration_cap_trims_queue() {
    let mut def = make_def(Stacking::Duration, 9);
    def.max_duration_ms = Some(3000);
    let mut state = BuffState::new(&def);
    state.apply(0, 2000, 1);
    state.apply(0, 2000, 1);
    state.finalize(10_000);

    assert_eq!(state.overstack(), 1000);
    assert_eq!(state.uptime(), 3000);
}

#[test]
fn unbounded_apply_lasts_until_encounter_end() {
    let mut state = duration_buff(1);
    state.apply(200, 0, 1);
    state.finalize(1200);

    assert_eq!(state.uptime(), 1000);
    assert_eq!(state.stacks(), 1);
    assert_eq!(state.presence(), &[PresenceInterval { start: 200, end: 1200 }]);
}

#[test]
fn expired_removal_is_not_a_strip() {
    let mut state = duration_buff(1);
    state.apply(0, 5000, 1);
    assert!(state.strip(1000, BuffRemoval::Expired));
    state.finalize(5000);

    assert_eq!(state.stripped(), 0);
    assert_eq!(state.uptime(), 1000);
}

#[test]
fn stripping_nothing_is_not_counted() {
    let mut state = duration_buff(1);
    state.apply(0, 100, 1);
    assert!(!state.strip(500, BuffRemoval::All));
    state.finalize(1000);

    assert_eq!(state.stripped(), 0);
    assert_eq!(state.uptime(), 100);
}

#[test]
fn reapply_after_gap_opens_new_interval() {
    let mut state = duration_buff(1);
    state.apply(0, 100, 1);
    state.apply(300, 100, 1);
    state.finalize(1000);

    assert_eq!(state.uptime(), 200);
    assert_eq!(
        state.presence(),
        &[
            PresenceInterval { start: 0, end: 100 },
            PresenceInterval { start: 300, end: 400 },
        ]
    );
    assert!(!state.is_active_at(200));
    assert!(state.is_active_at(350));
}

// ═══════════════════════════════════════════════════════════════════════════
// Intensity Stacking
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn intensity_caps_stacks_and_counts_overstack() {
    let mut state = intensity_buff(25);
    state.apply(0, 10_000, 10);
    state.apply(0, 10_000, 10);
    state.apply(0, 10_000, 10);
    state.finalize(0);

    assert_eq!(state.stacks(), 25);
    assert_eq!(state.overstack(), 5);
    assert_eq!(state.applications(), 3);
}

#[test]
fn intensity_uptime_is_stack_time() {
    let mut state = intensity_buff(25);
    state.apply(0, 1000, 2);
    state.apply(500, 1000, 1);
    state.finalize(3000);

    // 2 stacks for 1000ms + 1 stack for 1000ms
    assert_eq!(state.uptime(), 3000);
    assert_eq!(state.stacks(), 0);
    assert_eq!(state.presence(), &[PresenceInterval { start: 0, end: 1500 }]);
}

#[test]
fn intensity_strip_removes_soonest_stack() {
    let mut state = intensity_buff(25);
    state.apply(0, 1000, 1);
    state.apply(0, 5000, 1);
    state.strip(200, BuffRemoval::Single);
    state.finalize(10_000);

    // 2 stacks for 200ms, then the 5000ms stack alone
    assert_eq!(state.uptime(), 400 + 4800);
    assert_eq!(state.stripped(), 1);
}

#[test]
fn intensity_strip_all_clears_every_stack() {
    let mut state = intensity_buff(25);
    state.apply(0, 5000, 4);
    state.strip(100, BuffRemoval::All);
    state.finalize(1000);

    assert_eq!(state.uptime(), 400);
    assert_eq!(state.stripped(), 1);
    assert_eq!(state.stacks(), 0);
}

// ═══════════════════════════════════════════════════════════════════════════
// Buff Table
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn table_uses_catalog_rules() {
    let catalog = BuffCatalog::bundled().unwrap();
    let mut table = BuffTable::new();
    for _ in 0..30 {
        table.record(&apply_event(0, 740, 1000), &catalog);
    }
    table.finalize(0);

    let might = table.get(SkillId(740)).unwrap();
    assert_eq!(might.stacking(), Stacking::Intensity);
    assert_eq!(might.stacks(), 25);
    assert_eq!(might.overstack(), 5);
    assert!(table.unknown().is_empty());
}

#[test]
fn unknown_buffs_fall_back_to_single_duration_stack() {
    let catalog = BuffCatalog::bundled().unwrap();
    let mut table = BuffTable::new();
    table.record(&apply_event(0, 999_999, 1000), &catalog);
    table.record(&apply_event(0, 999_999, 1000), &catalog);
    table.finalize(5000);

    let state = table.get(SkillId(999_999)).unwrap();
    assert_eq!(state.stacking(), Stacking::Duration);
    assert_eq!(state.uptime(), 1000);
    assert_eq!(state.overstack(), 1000);
    assert!(table.unknown().contains(&SkillId(999_999)));
}

#[test]
fn strip_of_unseen_buff_is_ignored() {
    let catalog = BuffCatalog::bundled().unwrap();
    let mut table = BuffTable::new();
    table.record(&strip_event(10, 1187, BuffRemoval::All), &catalog);
    table.finalize(100);

    assert!(table.get(SkillId(1187)).is_none());
    assert!(!table.is_active_at(SkillId(1187), 10));
}

#[test]
fn uptime_never_exceeds_encounter_duration() {
    let catalog = BuffCatalog::bundled().unwrap();
    let mut table = BuffTable::new();
    for t in (0..10_000).step_by(250) {
        table.record(&apply_event(t, 1187, 4000), &catalog);
    }
    table.finalize(10_000);

    let quickness = table.get(SkillId(1187)).unwrap();
    assert!(quickness.uptime() <= 10_000);
    assert!(quickness.overstack() > 0);
}
