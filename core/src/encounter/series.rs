//! Health and downed series
//!
//! A per-agent time series of health, damage-to-date and life state. Damage
//! accrues silently into the carried state; a point is emitted on each health
//! or life-state change. Points are strictly increasing in time: a change at
//! the timestamp of the previous point overwrites it.

use serde::Serialize;

use super::AggregateError;
use super::hits::Hit;

/// Full health, in basis points
pub const FULL_HEALTH: u16 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    pub time: u64,
    /// Health in basis points (10000 = 100%)
    pub health: u16,
    /// Damage to date (dealt for players, taken for enemies)
    pub damage: i64,
    /// Damage to date dealt to a boss for players; damage to date taken
    /// from player-owned sources for enemies
    pub boss_damage: i64,
    pub downed: bool,
    /// Got back up from downed or dead at this point
    pub revived: bool,
    pub dead: bool,
    /// Swapped weapon sets at this point
    pub weapon_swap: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Series {
    points: Vec<SeriesPoint>,
}

impl Series {
    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Latest point at or before `time`
    pub fn at(&self, time: u64) -> Option<&SeriesPoint> {
        let idx = self.points.partition_point(|p| p.time <= time);
        idx.checked_sub(1).map(|i| &self.points[i])
    }

    fn push(&mut self, point: SeriesPoint) {
        match self.points.last_mut() {
            Some(last) if point.time <= last.time => {
                *last = SeriesPoint {
                    time: last.time,
                    revived: last.revived || point.revived,
                    weapon_swap: last.weapon_swap || point.weapon_swap,
                    ..point
                };
            }
            _ => self.points.push(point),
        }
    }
}

/// Incremental series construction in event order
#[derive(Debug, Clone)]
pub struct SeriesBuilder {
    series: Series,
    current: SeriesPoint,
}

impl SeriesBuilder {
    /// Start a series with a synthetic full-health point at `first_aware`
    pub fn new(first_aware: u64) -> Self {
        let current = SeriesPoint {
            time: first_aware,
            health: FULL_HEALTH,
            damage: 0,
            boss_damage: 0,
            downed: false,
            revived: false,
            dead: false,
            weapon_swap: false,
        };
        let mut series = Series::default();
        series.push(current);
        Self { series, current }
    }

    /// Accrue damage without emitting a point.
    ///
    /// Fails with `ArithmeticOverflow` when a running total would overflow;
    /// the carried state is left unchanged.
    pub fn add_damage(&mut self, hit: &Hit, involves_boss: bool) -> Result<(), AggregateError> {
        let overflow = || AggregateError::ArithmeticOverflow {
            agent: hit.agent,
            skill: hit.skill,
        };
        let damage = self.current.damage.checked_add(hit.damage).ok_or_else(overflow)?;
        let boss_damage = if involves_boss {
            self.current
                .boss_damage
                .checked_add(hit.damage)
                .ok_or_else(overflow)?
        } else {
            self.current.boss_damage
        };
        self.current.damage = damage;
        self.current.boss_damage = boss_damage;
        Ok(())
    }

    pub fn health(&mut self, time: u64, health: u16) {
        self.current.health = health.min(FULL_HEALTH);
        self.emit(time);
    }

    pub fn downed(&mut self, time: u64) {
        self.current.downed = true;
        self.emit(time);
    }

    /// Back up from downed, or revived from dead
    pub fn up(&mut self, time: u64) {
        self.current.downed = false;
        self.current.dead = false;
        self.current.revived = true;
        self.emit(time);
    }

    pub fn weapon_swap(&mut self, time: u64) {
        self.current.weapon_swap = true;
        self.emit(time);
    }

    pub fn dead(&mut self, time: u64) {
        self.current.downed = false;
        self.current.dead = true;
        self.current.health = 0;
        self.emit(time);
    }

    fn emit(&mut self, time: u64) {
        self.current.time = time;
        self.series.push(self.current);
        // Markers belong to the emitting point only
        self.current.revived = false;
        self.current.weapon_swap = false;
    }

    /// Close the series with a point at `end`, the death or last-aware time
    pub fn finish(mut self, end: u64, died: bool) -> Series {
        if died {
            self.dead(end);
        } else {
            self.emit(end);
        }
        self.series
    }
}
