//! Presentation helpers
//!
//! Rates, percentages and time formatting derived from finished reports.
//! The engine itself never calls these; front ends do.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::combat_log::{Profession, SkillId};
use crate::encounter::{EncounterReport, PlayerReport};
use crate::game_data::Stacking;

/// `total` per second over `duration_ms`, None for an empty window
pub fn rate_per_second(total: i64, duration_ms: u64) -> Option<f64> {
    if duration_ms == 0 {
        return None;
    }
    Some(total as f64 * 1000.0 / duration_ms as f64)
}

/// `part` as a percentage of `whole`, None when `whole` is zero
pub fn percent(part: i64, whole: i64) -> Option<f64> {
    if whole == 0 {
        return None;
    }
    Some(part as f64 * 100.0 / whole as f64)
}

/// Mean stack count over the window, from a stack-millisecond uptime
pub fn average_stacks(uptime: u64, duration_ms: u64) -> Option<f64> {
    if duration_ms == 0 {
        return None;
    }
    Some(uptime as f64 / duration_ms as f64)
}

/// `m:ss.mmm`
pub fn format_clock(ms: u64) -> String {
    let minutes = ms / 60_000;
    let seconds = (ms / 1000) % 60;
    let millis = ms % 1000;
    format!("{minutes}:{seconds:02}.{millis:03}")
}

/// ISO-8601 UTC time for a log's unix timestamp
pub fn format_log_time(unix_secs: u32) -> Option<String> {
    DateTime::<Utc>::from_timestamp(i64::from(unix_secs), 0)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
}

// ─────────────────────────────────────────────────────────────────────────────
// Player Summary
// ─────────────────────────────────────────────────────────────────────────────

/// One row of the per-player overview
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerMetrics {
    pub name: String,
    pub account: String,
    pub profession: Profession,
    pub subgroup: u8,
    pub boss_dps: Option<f64>,
    pub dps: Option<f64>,
    pub crit_pct: Option<f64>,
    pub scholar_pct: Option<f64>,
    pub flanking_pct: Option<f64>,
    /// Percentage of the encounter with quickness (duration buffs only)
    pub quickness_pct: Option<f64>,
    pub casts: usize,
    pub canceled_casts: usize,
    pub dead: bool,
}

impl PlayerMetrics {
    pub fn from_report(player: &PlayerReport, duration_ms: u64, quickness: SkillId) -> Self {
        let boss_total = player.boss_hits.total_damage();
        let total = player.hits.total_damage();
        let power = &player.boss_hits.power;
        let hits = power.hits() as i64;

        let quickness_pct = player
            .buffs
            .get(&quickness)
            .filter(|s| s.stacking() == Stacking::Duration)
            .and_then(|s| percent(s.uptime() as i64, duration_ms as i64));

        Self {
            name: player.agent.name_str().to_string(),
            account: player.agent.account_str().to_string(),
            profession: player.agent.profession,
            subgroup: player.agent.subgroup,
            boss_dps: boss_total.and_then(|t| rate_per_second(t, duration_ms)),
            dps: total.and_then(|t| rate_per_second(t, duration_ms)),
            crit_pct: percent(power.criticals() as i64, hits),
            scholar_pct: percent(power.scholar() as i64, hits),
            flanking_pct: percent(power.flanking() as i64, hits),
            quickness_pct,
            casts: player.activation_log.len(),
            canceled_casts: player.activation_log.canceled().count(),
            dead: player.agent.did_die(),
        }
    }
}

/// Overview rows, highest boss DPS first
pub fn summarize(report: &EncounterReport, quickness: SkillId) -> Vec<PlayerMetrics> {
    let duration = report.duration_ms();
    let mut rows: Vec<PlayerMetrics> = report
        .players
        .iter()
        .map(|p| PlayerMetrics::from_report(p, duration, quickness))
        .collect();
    rows.sort_by(|a, b| {
        b.boss_dps
            .unwrap_or(0.0)
            .total_cmp(&a.boss_dps.unwrap_or(0.0))
            .then_with(|| a.name.cmp(&b.name))
    });
    rows
}
