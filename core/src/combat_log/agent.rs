use std::fmt;

use serde::{Deserialize, Serialize};

use crate::context::{IStr, empty_istr, istr_serde, resolve};

// ═══════════════════════════════════════════════════════════════════════════
// Identifiers
// ═══════════════════════════════════════════════════════════════════════════

/// Address of an agent in the log
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(pub u64);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Skill or buff id. Buffs are skills in the log, so both share one id space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillId(pub u32);

impl fmt::Display for SkillId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// NPC species (template) id
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpeciesId(pub u16);

impl fmt::Display for SpeciesId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "&{}", self.0)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Profession
// ═══════════════════════════════════════════════════════════════════════════

/// The type of profession, includes NPCs and Gadgets
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Default, Serialize, Deserialize)]
pub enum Profession {
    Gadget,
    NonPlayableCharacter,
    Guardian,
    Warrior,
    Engineer,
    Ranger,
    Thief,
    Elementalist,
    Mesmer,
    Necromancer,
    Revenant,
    Dragonhunter,
    Berserker,
    Scrapper,
    Druid,
    Daredevil,
    Tempest,
    Chronomancer,
    Reaper,
    Herald,
    Soulbeast,
    Weaver,
    Holosmith,
    Deadeye,
    Mirage,
    Scourge,
    Spellbreaker,
    Firebrand,
    Renegade,
    #[default]
    Unknown,
}

impl Profession {
    /// Base profession of an elite specialization
    pub fn core_profession(self) -> Profession {
        match self {
            Profession::Dragonhunter | Profession::Firebrand => Profession::Guardian,
            Profession::Berserker | Profession::Spellbreaker => Profession::Warrior,
            Profession::Herald | Profession::Renegade => Profession::Revenant,
            Profession::Scrapper | Profession::Holosmith => Profession::Engineer,
            Profession::Druid | Profession::Soulbeast => Profession::Ranger,
            Profession::Daredevil | Profession::Deadeye => Profession::Thief,
            Profession::Tempest | Profession::Weaver => Profession::Elementalist,
            Profession::Chronomancer | Profession::Mirage => Profession::Mesmer,
            Profession::Reaper | Profession::Scourge => Profession::Necromancer,
            x => x,
        }
    }

    #[inline]
    pub fn is_player_character(self) -> bool {
        !matches!(
            self,
            Profession::Gadget | Profession::NonPlayableCharacter | Profession::Unknown
        )
    }
}

impl fmt::Display for Profession {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Agent
// ═══════════════════════════════════════════════════════════════════════════

/// Core attribute ratings of an agent at log start
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoreStats {
    #[serde(default, rename = "conditionDmg")]
    pub condition_damage: u16,
    #[serde(default)]
    pub concentration: u16,
    #[serde(default)]
    pub toughness: u16,
    #[serde(default)]
    pub healing: u16,
}

/// A game actor present in the encounter.
///
/// Agents are immutable once the log parser has produced them. Times are
/// milliseconds on the same clock as the event timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: AgentId,
    #[serde(with = "istr_serde", default = "istr_serde::empty")]
    pub name: IStr,
    #[serde(with = "istr_serde", default = "istr_serde::empty")]
    pub account_name: IStr,
    #[serde(default)]
    pub profession: Profession,
    #[serde(default)]
    pub subgroup: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub species_id: Option<SpeciesId>,
    #[serde(flatten)]
    pub stats: CoreStats,
    /// Time when first observed
    pub first_aware: u64,
    /// Time when last observed
    pub last_aware: u64,
    /// Time of death, if the agent died during the encounter
    #[serde(default)]
    pub died_at: Option<u64>,
    /// Owner of a minion or gadget
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master: Option<AgentId>,
    /// Agent is the player recording the log
    #[serde(default)]
    pub is_pov: bool,
}

impl Default for Agent {
    fn default() -> Self {
        Self {
            id: AgentId(0),
            name: empty_istr(),
            account_name: empty_istr(),
            profession: Profession::Unknown,
            subgroup: 0,
            species_id: None,
            stats: CoreStats::default(),
            first_aware: 0,
            last_aware: 0,
            died_at: None,
            master: None,
            is_pov: false,
        }
    }
}

impl PartialEq for Agent {
    fn eq(&self, other: &Agent) -> bool {
        self.id == other.id
    }
}

impl fmt::Display for Agent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} ({}) {} {} [t={} h={} c={}]",
            resolve(self.name),
            resolve(self.account_name),
            self.profession,
            self.subgroup,
            self.stats.toughness,
            self.stats.healing,
            self.stats.condition_damage
        )
    }
}

impl Agent {
    #[inline]
    pub fn is_player_character(&self) -> bool {
        self.profession.is_player_character()
    }

    /// Returns true if the agent died during the encounter
    #[inline]
    pub fn did_die(&self) -> bool {
        self.died_at.is_some()
    }

    /// Last timestamp the agent is part of the encounter (death or last sighting)
    #[inline]
    pub fn end_of_life(&self) -> u64 {
        self.died_at.unwrap_or(self.last_aware)
    }

    pub fn name_str(&self) -> &'static str {
        resolve(self.name)
    }

    pub fn account_str(&self) -> &'static str {
        resolve(self.account_name)
    }
}
