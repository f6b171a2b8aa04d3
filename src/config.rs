//! Configuration loader and schema types.
//!
//! This module exposes the settings schema shared by the renderer and the
//! art watcher, plus helpers to load it from disk and the environment.

mod load;
mod schema;

pub use load::resolve_config_path;
pub use schema::*;

#[cfg(test)]
mod tests;
