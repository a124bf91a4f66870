//! Engine configuration
//!
//! Re-exports the shared config type from arcstat-types and adds persistence
//! and catalog resolution on top of it.

use std::path::Path;

pub use arcstat_types::{EngineConfig, QUICKNESS_BUFF_ID};

use crate::combat_log::SkillId;
use crate::game_data::{BuffCatalog, CatalogError};

const APP_NAME: &str = "arcstat";
const CONFIG_NAME: &str = "config";

// ─────────────────────────────────────────────────────────────────────────────
// EngineConfig Extensions
// ─────────────────────────────────────────────────────────────────────────────

/// Extension trait for EngineConfig persistence
pub trait EngineConfigExt {
    fn load() -> Self;
    fn save(&self) -> Result<(), confy::ConfyError>;
    fn config_path() -> Option<std::path::PathBuf>;
    fn load_catalog(&self) -> Result<BuffCatalog, CatalogError>;
    fn quickness(&self) -> SkillId;
}

impl EngineConfigExt for EngineConfig {
    /// Stored config, or defaults when none exists or it cannot be read
    fn load() -> Self {
        confy::load(APP_NAME, CONFIG_NAME).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "Failed to load config, using defaults");
            Self::default()
        })
    }

    fn save(&self) -> Result<(), confy::ConfyError> {
        confy::store(APP_NAME, CONFIG_NAME, self)
    }

    fn config_path() -> Option<std::path::PathBuf> {
        confy::get_configuration_file_path(APP_NAME, CONFIG_NAME).ok()
    }

    /// External catalog when configured, bundled otherwise
    fn load_catalog(&self) -> Result<BuffCatalog, CatalogError> {
        match &self.catalog_path {
            Some(path) => BuffCatalog::load(Path::new(path)),
            None => BuffCatalog::bundled(),
        }
    }

    #[inline]
    fn quickness(&self) -> SkillId {
        SkillId(self.quickness_buff_id)
    }
}
