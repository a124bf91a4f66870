//! Error types for catalog loading

use std::path::PathBuf;
use thiserror::Error;

use crate::combat_log::SkillId;

/// Errors during buff catalog loading and validation
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog TOML in {path}")]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("duplicate buff id {id} in {path}")]
    DuplicateEntry { path: PathBuf, id: SkillId },

    #[error("invalid buff {id} in {path}: {reason}")]
    InvalidEntry {
        path: PathBuf,
        id: SkillId,
        reason: String,
    },
}
