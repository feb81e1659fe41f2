//! Derive macro for [appconfig](https://docs.rs/appconfig).
//!
//! `#[derive(Settings)]` describes a struct's fields to the appconfig
//! resolvers and lets them write parsed values by field path.
//!
//! ```rust,ignore
//! use appconfig::Settings;
//!
//! #[derive(Settings, Default, Clone, serde::Deserialize)]
//! struct Server {
//!     #[config(env = "SERVER_HOST", arg = "host", short = "H")]
//!     host: String,
//!     port: u16,
//!     #[config(nested)]
//!     tls: Option<Tls>,
//!     #[config(skip)]
//!     cache: Vec<u8>,
//! }
//! ```
//!
//! Field attributes:
//!
//! - `env = "NAME"`: environment variable, replacing the derived name.
//! - `arg = "name"`: long flag `--name`.
//! - `short = "n"`: short flag `-n` (a long flag when longer than one character).
//! - `nested`: the field is itself `Settings` (possibly inside `Option`,
//!   `Box`, `Vec` or an array) and contributes its own fields.
//! - `skip`: the field is invisible to appconfig.
//!
//! Fields without `nested` or `skip` must implement `appconfig::Leaf`.

mod settings;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

#[proc_macro_derive(Settings, attributes(config))]
pub fn derive_settings(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    settings::expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
