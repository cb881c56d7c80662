//! Parsing of `quill.toml` and resolution of run settings.
//!
//! Settings come from two layers: an optional `quill.toml` file
//! ([`FileConfig`]) and the command line ([`Overrides`]). [`merge`] combines
//! them into the [`Settings`] every document run reads from, including the
//! per-language prover configurations that key the cache.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod resolve;
pub mod types;

pub use error::ConfigError;
pub use loader::{find_config, load_config, load_config_from_str, CONFIG_FILE};
pub use resolve::{merge, parse_mark_point, validate_inputs, MarkPoint, Overrides, Settings};
pub use types::*;
