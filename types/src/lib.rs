//! Shared configuration types for arcstat
//!
//! This crate contains serializable configuration types that are shared between
//! the aggregation engine (arcstat-core) and its front ends (arcstat-cli).

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Engine Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Skill id of the Quickness boon
pub const QUICKNESS_BUFF_ID: u32 = 1187;

/// Configuration for an aggregation run.
///
/// Persisted as TOML. Every field has a default so partial files load cleanly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Number of worker threads for per-player aggregation.
    /// 0 uses the global rayon pool (all cores).
    #[serde(default)]
    pub workers: usize,

    /// Buff whose presence marks an activation as a quickness cast
    #[serde(default = "default_quickness_buff_id")]
    pub quickness_buff_id: u32,

    /// External buff catalog (TOML). None uses the bundled catalog.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<String>,

    /// Pretty-print report JSON
    #[serde(default)]
    pub pretty_json: bool,
}

fn default_quickness_buff_id() -> u32 {
    QUICKNESS_BUFF_ID
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            workers: 0,
            quickness_buff_id: QUICKNESS_BUFF_ID,
            catalog_path: None,
            pretty_json: false,
        }
    }
}

impl EngineConfig {
    /// Create a config that reads buffs from the given catalog file.
    /// Other fields use their default values.
    pub fn with_catalog_path(catalog_path: String) -> Self {
        Self {
            catalog_path: Some(catalog_path),
            ..Self::default()
        }
    }
}
