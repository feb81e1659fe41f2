//! Populate a typed configuration struct from a config file, environment
//! variables and command-line flags, driven by field tags.
//!
//! ```ignore
//! use appconfig::{AppConfig, Settings};
//!
//! #[derive(Settings, Default, Clone, serde::Deserialize)]
//! #[serde(default)]
//! struct Server {
//!     #[config(env = "SERVER_HOST", arg = "host", short = "H")]
//!     host: String,
//!     port: u16,
//!     #[config(nested)]
//!     database: Database,
//! }
//!
//! let mut builder = AppConfig::builder::<Server>()?
//!     .with(|o| o.config_file_argument("config,c"));
//! builder.load("server.json")?;
//! let server = builder.build()?;
//! ```
//!
//! # Sources
//!
//! Every build starts from a base value: `T::default()`, or the file last
//! passed to [`AppConfigBuilder::load`]. Command-line flags and environment
//! variables are then written field by field on top of it.
//!
//! ```text
//! Base value            T::default() or load(path)
//!        ↑ replaced by
//! Config file flag      --config=path (optional)
//!        ↑ overridden by
//! CLI flags             --host, -H, --p:port
//!        ↑ overridden by
//! Environment vars      SERVER_HOST, PORT, DATABASE_URL
//! ```
//!
//! The last two layers swap with [`Precedence::CliOverEnv`].
//!
//! # Field tags
//!
//! Tags are written as `#[config(...)]` attributes on the struct fields:
//!
//! | Tag | Effect |
//! |-----|--------|
//! | `env = "NAME"` | environment variable name for the field; on a nested field, the prefix of its children |
//! | `arg = "name"` | long flag `--name` |
//! | `short = "n"` | short flag `-n` |
//! | `nested` | the field is a struct (or `Option`, `Box`, `Vec`, array of one) contributing its own fields |
//! | `skip` | the field is ignored |
//!
//! A field without `arg` or `short` gets the flag `--p:<field name>`. A field
//! without `env` gets a variable derived from its name with
//! [`env_variable_name`] (`logLevel` becomes `LOG_LEVEL`), prefixed by its
//! parent's variable and `_`. So `log_level` inside `inner` inside `outer`
//! reads `OUTER_INNER_LOG_LEVEL`.
//!
//! File key names are serde's business: use `#[serde(rename = "...")]` for
//! them.
//!
//! # Values
//!
//! Leaf fields are integers, floats, booleans, strings and paths, or
//! `Option`s of those. Flags and variables are parsed by [`Kind`]; booleans
//! accept `1 t T TRUE true True` and `0 f F FALSE false False`. Writing a
//! field below an `Option` that is `None`, or below an empty `Vec`, fails with
//! [`AppConfigError::Unaddressable`]: load a file that provides the value
//! first. A write below a non-empty `Vec` reaches every element.
//!
//! # Errors
//!
//! All fallible operations return [`AppConfigError`]. A failed
//! [`load`](AppConfigBuilder::load) keeps the previous base value and a failed
//! [`apply_to`](AppConfigBuilder::apply_to) leaves its target untouched.
//!
//! # Logging
//!
//! The crate emits [`tracing`](https://docs.rs/tracing) events: `debug` for
//! loads and builds, `trace` for every field written. No subscriber is
//! installed.

extern crate self as appconfig;

pub mod error;
pub mod naming;
pub mod schema;

mod builder;
mod cli;
mod decode;
mod env;
mod options;
mod property;

#[cfg(test)]
mod fixtures;

pub use appconfig_derive::Settings;
pub use builder::{AppConfig, AppConfigBuilder};
pub use cli::{Flag, candidate_flags};
pub use decode::{BoxError, DEFAULT_MAX_CONFIG_FILE_SIZE, FileFormat};
pub use error::AppConfigError;
pub use naming::env_variable_name;
pub use options::{CliSyntax, Options, Precedence};
pub use property::{Anchor, AnchorId, Property, PropertyList, TagKey, Tags};
pub use schema::{
    AccessError, AssignError, ConversionError, FieldValue, Kind, Leaf, Settings,
};
