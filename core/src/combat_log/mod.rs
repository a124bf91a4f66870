mod agent;
mod combat_event;
mod input;

pub use agent::*;
pub use combat_event::*;
pub use input::{EncounterInput, Language, LogMeta};
