use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::agent::{Agent, SkillId, SpeciesId};
use super::combat_event::SkillEvent;

/// Client language of the recording player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    English,
    French,
    German,
    Spanish,
}

/// Log-level metadata reported by the parser.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogMeta {
    /// Server unix timestamp (seconds) of log start
    #[serde(default)]
    pub log_start: u32,
    /// Server unix timestamp (seconds) of log end
    #[serde(default)]
    pub log_end: u32,
    #[serde(default)]
    pub game_build: u64,
    #[serde(default)]
    pub lang: Language,
    #[serde(default)]
    pub server_shard: u64,
    #[serde(default)]
    pub log_name: String,
    /// Species of the encounter's primary hostile
    pub boss_species: SpeciesId,
}

/// Everything the log parser hands to the engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EncounterInput {
    pub meta: LogMeta,
    pub agents: Vec<Agent>,
    /// Skill names known to the log, id -> name
    #[serde(default)]
    pub skills: BTreeMap<SkillId, String>,
    pub events: Vec<SkillEvent>,
}

impl EncounterInput {
    /// Parse a JSON event dump
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}
