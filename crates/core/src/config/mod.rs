//! Configuration loading and schema definitions
//!
//! Settings are read from TOML and turned into the engine's explicit
//! parameter types by the caller; the engine itself never sees this module.

mod loader;
mod schema;

pub use loader::Config;
pub use schema::*;
