//! Boss identification data
//!
//! Provides lookup from NPC species ids to raid boss information.

use phf::phf_map;
use serde::Serialize;

use crate::combat_log::SpeciesId;

/// Raid wing a boss belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Wing {
    SpiritVale,
    SalvationPass,
    StrongholdOfTheFaithful,
    BastionOfThePenitent,
    HallOfChains,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BossInfo {
    pub name: &'static str,
    pub wing: Wing,
}

impl BossInfo {
    const fn new(name: &'static str, wing: Wing) -> Self {
        Self { name, wing }
    }
}

/// Name reported for species without a table entry
pub const UNKNOWN_BOSS: &str = "Unknown";

/// Boss lookup table indexed by species id
static BOSS_INFO: phf::Map<u16, BossInfo> = phf_map! {
    // ═══════════════════════════════════════════════════════════════════════════
    // Wing 1
    // ═══════════════════════════════════════════════════════════════════════════
    0x3c4eu16 => BossInfo::new("Vale Guardian", Wing::SpiritVale),
    0x3c45u16 => BossInfo::new("Gorseval", Wing::SpiritVale),
    0x3c0fu16 => BossInfo::new("Sabetha", Wing::SpiritVale),

    // ═══════════════════════════════════════════════════════════════════════════
    // Wing 2
    // ═══════════════════════════════════════════════════════════════════════════
    0x3efbu16 => BossInfo::new("Slothasor", Wing::SalvationPass),
    0x3ef3u16 => BossInfo::new("Matthias", Wing::SalvationPass),

    // ═══════════════════════════════════════════════════════════════════════════
    // Wing 3
    // ═══════════════════════════════════════════════════════════════════════════
    0x3f6bu16 => BossInfo::new("Keep Construct", Wing::StrongholdOfTheFaithful),
    0x3f76u16 => BossInfo::new("Xera", Wing::StrongholdOfTheFaithful),

    // ═══════════════════════════════════════════════════════════════════════════
    // Wing 4
    // ═══════════════════════════════════════════════════════════════════════════
    0x432au16 => BossInfo::new("Cairn", Wing::BastionOfThePenitent),
    0x4314u16 => BossInfo::new("Mursaat Overseer", Wing::BastionOfThePenitent),
    0x4324u16 => BossInfo::new("Samarog", Wing::BastionOfThePenitent),
    0x4302u16 => BossInfo::new("Deimos", Wing::BastionOfThePenitent),

    // ═══════════════════════════════════════════════════════════════════════════
    // Wing 5
    // ═══════════════════════════════════════════════════════════════════════════
    0x4d37u16 => BossInfo::new("Soulless Horror", Wing::HallOfChains),
    0x4bfau16 => BossInfo::new("Dhuum", Wing::HallOfChains),
};

/// Get boss info for a species id
pub fn lookup_boss(species: SpeciesId) -> Option<&'static BossInfo> {
    BOSS_INFO.get(&species.0)
}

/// Display name for a species, `"Unknown"` when not a known boss
pub fn boss_name(species: SpeciesId) -> &'static str {
    lookup_boss(species).map(|b| b.name).unwrap_or(UNKNOWN_BOSS)
}
