mod bosses;
mod buffs;
mod error;

pub use bosses::{BossInfo, UNKNOWN_BOSS, Wing, boss_name, lookup_boss};
pub use buffs::{BuffCatalog, BuffCategory, BuffDefinition, Stacking};
pub use error::CatalogError;
