mod config;
mod interner;
mod pool;

pub use config::{EngineConfig, EngineConfigExt, QUICKNESS_BUFF_ID};
pub use interner::{IStr, empty_istr, intern, istr_serde, resolve};
pub use pool::WorkerPool;
