//! Buff catalog
//!
//! The catalog is configuration data: it is loaded from TOML (a bundled copy
//! ships with the crate) and validated on load. Structural problems reject
//! the file; suspicious display names are flagged and kept.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::CatalogError;
use crate::combat_log::SkillId;

const BUNDLED_CATALOG: &str = include_str!("../../data/buffs.toml");
const BUNDLED_ORIGIN: &str = "<bundled buffs.toml>";

/// How repeated applications of a buff combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stacking {
    /// Binary presence; applications queue up remaining time
    Duration,
    /// Additive magnitude; each stack counts
    Intensity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuffCategory {
    Boon,
    Condition,
    Offensive,
    #[default]
    Other,
}

/// One catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct BuffDefinition {
    #[serde(rename(serialize = "skillId"))]
    pub id: SkillId,
    pub name: String,
    pub stacking: Stacking,
    pub max_stacks: u32,
    /// Cap on total queued time (duration stacking only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_duration_ms: Option<u64>,
    #[serde(default)]
    pub category: BuffCategory,
}

impl BuffDefinition {
    /// Rule used for buffs missing from the catalog
    pub fn fallback(id: SkillId) -> Self {
        Self {
            id,
            name: id.to_string(),
            stacking: Stacking::Duration,
            max_stacks: 1,
            max_duration_ms: None,
            category: BuffCategory::Other,
        }
    }

    /// Name looks mangled (empty, replacement characters, control characters)
    fn has_suspicious_name(&self) -> bool {
        self.name.trim().is_empty()
            || self
                .name
                .chars()
                .any(|c| c == char::REPLACEMENT_CHARACTER || c.is_control())
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default, rename = "buff")]
    buffs: Vec<BuffDefinition>,
}

/// Validated buff catalog, keyed and iterated by id
#[derive(Debug, Clone, Default)]
pub struct BuffCatalog {
    buffs: BTreeMap<SkillId, BuffDefinition>,
    flagged: Vec<SkillId>,
}

impl BuffCatalog {
    /// Catalog shipped with the crate
    pub fn bundled() -> Result<Self, CatalogError> {
        Self::from_toml_str(BUNDLED_CATALOG, Path::new(BUNDLED_ORIGIN))
    }

    /// Load a catalog file from disk
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = fs::read_to_string(path).map_err(|source| CatalogError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content, path)
    }

    /// Parse and validate catalog TOML. `origin` is only used in errors.
    pub fn from_toml_str(content: &str, origin: &Path) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(content).map_err(|source| {
            CatalogError::ParseToml {
                path: origin.to_path_buf(),
                source,
            }
        })?;
        Self::from_definitions(file.buffs, origin)
    }

    /// Build from already-parsed definitions, applying the same validation
    pub fn from_definitions(
        definitions: Vec<BuffDefinition>,
        origin: &Path,
    ) -> Result<Self, CatalogError> {
        let mut catalog = Self::default();
        for def in definitions {
            if def.max_stacks == 0 {
                return Err(CatalogError::InvalidEntry {
                    path: PathBuf::from(origin),
                    id: def.id,
                    reason: "max_stacks must be at least 1".to_string(),
                });
            }
            if def.max_duration_ms == Some(0) {
                return Err(CatalogError::InvalidEntry {
                    path: PathBuf::from(origin),
                    id: def.id,
                    reason: "max_duration_ms must be positive".to_string(),
                });
            }
            if catalog.buffs.contains_key(&def.id) {
                return Err(CatalogError::DuplicateEntry {
                    path: PathBuf::from(origin),
                    id: def.id,
                });
            }
            if def.has_suspicious_name() {
                tracing::warn!(
                    buff = %def.id,
                    name = ?def.name,
                    origin = %origin.display(),
                    "Buff catalog entry has a malformed name"
                );
                catalog.flagged.push(def.id);
            }
            catalog.buffs.insert(def.id, def);
        }
        Ok(catalog)
    }

    pub fn get(&self, id: SkillId) -> Option<&BuffDefinition> {
        self.buffs.get(&id)
    }

    pub fn contains(&self, id: SkillId) -> bool {
        self.buffs.contains_key(&id)
    }

    /// Ids whose names were flagged during validation
    pub fn flagged(&self) -> &[SkillId] {
        &self.flagged
    }

    pub fn len(&self) -> usize {
        self.buffs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffs.is_empty()
    }

    /// Definitions in id order
    pub fn iter(&self) -> impl Iterator<Item = &BuffDefinition> {
        self.buffs.values()
    }

    /// Id-ordered copy of the definitions for the report
    pub fn to_map(&self) -> BTreeMap<SkillId, BuffDefinition> {
        self.buffs.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> &'static Path {
        Path::new("test.toml")
    }

    #[test]
    fn bundled_catalog_is_valid() {
        let catalog = BuffCatalog::bundled().unwrap();
        assert!(catalog.flagged().is_empty());

        let might = catalog.get(SkillId(740)).unwrap();
        assert_eq!(might.stacking, Stacking::Intensity);
        assert_eq!(might.max_stacks, 25);

        let quickness = catalog.get(SkillId(1187)).unwrap();
        assert_eq!(quickness.stacking, Stacking::Duration);
        assert_eq!(quickness.category, BuffCategory::Boon);
    }

    #[test]
    fn entries_iterate_in_id_order() {
        let catalog = BuffCatalog::bundled().unwrap();
        let ids: Vec<_> = catalog.iter().map(|b| b.id).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let toml = r#"
            [[buff]]
            id = 1
            name = "A"
            stacking = "duration"
            max_stacks = 1

            [[buff]]
            id = 1
            name = "B"
            stacking = "intensity"
            max_stacks = 3
        "#;
        let err = BuffCatalog::from_toml_str(toml, origin()).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateEntry { id: SkillId(1), .. }));
    }

    #[test]
    fn zero_max_stacks_is_rejected() {
        let toml = r#"
            [[buff]]
            id = 7
            name = "Broken"
            stacking = "intensity"
            max_stacks = 0
        "#;
        let err = BuffCatalog::from_toml_str(toml, origin()).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidEntry { id: SkillId(7), .. }));
    }

    #[test]
    fn mangled_names_are_flagged_not_rejected() {
        let toml = "[[buff]]\nid = 9\nname = \"Sp\u{FFFD}tter\"\nstacking = \"duration\"\nmax_stacks = 1\n";
        let catalog = BuffCatalog::from_toml_str(toml, origin()).unwrap();
        assert_eq!(catalog.flagged(), &[SkillId(9)]);
        assert!(catalog.contains(SkillId(9)));
    }

    #[test]
    fn bad_toml_reports_origin() {
        let err = BuffCatalog::from_toml_str("[[buff]\nid =", origin()).unwrap_err();
        match err {
            CatalogError::ParseToml { path, .. } => assert_eq!(path, PathBuf::from("test.toml")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn fallback_is_single_duration_stack() {
        let def = BuffDefinition::fallback(SkillId(42));
        assert_eq!(def.stacking, Stacking::Duration);
        assert_eq!(def.max_stacks, 1);
        assert_eq!(def.name, "42");
    }
}
