//! # envbind
//!
//! Bind typed configuration structs from a configuration file and
//! environment variables, driven by field annotations.
//!
//! A struct derives [`Bindable`] and tags its fields with `#[env(...)]`. A
//! binding pass optionally decodes a YAML, JSON, TOML or dotenv file into the
//! struct, then resolves every annotated field from the environment:
//!
//! 1. the first listed environment variable that is set;
//! 2. otherwise the field's default, but only while the field is zero;
//! 3. otherwise the field keeps whatever it already holds.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use envbind::Bindable;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Bindable, Default, Deserialize, Serialize)]
//! struct Config {
//!     /// Address the server listens on.
//!     #[env(var = "LISTEN_ADDR,ADDR", default = "0.0.0.0:8080")]
//!     listen: String,
//!
//!     #[env(var = "LOG_LEVEL", default = "info", upd)]
//!     log_level: String,
//!
//!     #[env(var = "PEERS", separator = ";")]
//!     peers: Vec<String>,
//!
//!     #[env(prefix = "DB_")]
//!     database: Database,
//! }
//!
//! #[derive(Bindable, Default, Deserialize, Serialize)]
//! struct Database {
//!     #[env(var = "URL", required)]
//!     url: String,
//! }
//!
//! fn main() -> miette::Result<()> {
//!     let mut config = Config::default();
//!     envbind::read_config("config.yaml", &mut config)?;
//!
//!     // Later: refresh only the fields tagged `upd`.
//!     envbind::update_env(&mut config)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Field Attributes
//!
//! | Attribute | Description |
//! |-----------|-------------|
//! | `var = "A,B"` | Environment variables, first one set wins |
//! | `default = "value"` | Applied when no variable is set and the field is zero |
//! | `layout = "%Y-%m-%d"` | Layout hint for timestamp fields |
//! | `separator = ";"` | Separator for list and map fields (default `,`) |
//! | `description = "..."` | Help text; defaults to the doc comment |
//! | `upd` | Field is refreshed by [`update_env`] |
//! | `required` | Fail when unresolved and zero |
//! | `prefix = "DB_"` | Prefix for variables inside a nested struct |
//! | `skip` | Field is not bound |
//!
//! ## Struct Attributes
//!
//! `#[env_config(updater)]` runs the struct's [`Updater`] impl before every
//! pass.
//!
//! ## Supported Field Types
//!
//! | Type | Raw format |
//! |------|------------|
//! | `bool` | `1 t T TRUE true True 0 f F FALSE false False` |
//! | integers, floats | base-10 / decimal |
//! | `String` | verbatim |
//! | `Vec<T>` | `a,b,c` |
//! | `HashMap<K, V>`, `BTreeMap<K, V>` | `k1=v1,k2=v2` |
//! | `chrono` timestamps | RFC 3339 or `layout` |
//! | `url::Url`, `Option<Url>` | absolute URL |
//! | `Option<chrono_tz::Tz>` | IANA name, empty is UTC |
//!
//! Other types implement [`Setter`] and use [`impl_setter_field!`], or
//! register a converter in the [`registry`] and use [`impl_leaf_field!`].
//!
//! ## Feature Flags
//!
//! | Feature | Description | Default |
//! |---------|-------------|---------|
//! | `dotenv` | `.env` files in the file loader | **Yes** |
//! | `toml` | TOML files | **Yes** |
//! | `yaml` | YAML files | **Yes** |
//! | `file-all` | All structured formats (toml + yaml) | **Yes** |
//!
//! JSON files are always supported.
//!
//! ## Error Handling
//!
//! Every entry point returns [`Error`], which integrates with [`miette`]:
//!
//! ```rust,ignore
//! if let Err(e) = envbind::read_env(&mut config) {
//!     eprintln!("{:?}", miette::Report::from(e));
//! }
//! ```

#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

// Generated code refers to `::envbind`, which must also resolve inside this crate.
extern crate self as envbind;

// Re-export the derive macro
pub use envbind_macro::Bindable;

/// Re-export miette for error handling.
pub use miette;

// ============================================================================
// Core Modules
// ============================================================================

mod error;
pub use error::Error;

mod field;
pub use field::{
    AsAny, BoxError, ElementFill, EntryFill, Field, Kind, MapSlot, SeqSlot, Setter, Slot, Updater,
};

pub mod meta;
pub use meta::{Bindable, Descriptor, FieldEntry, FieldInfo, FieldSpec};

pub mod registry;

pub mod parse;

pub mod binder;
pub use binder::Mode;

// ============================================================================
// Sources
// ============================================================================

pub mod file;
pub use file::{FileError, FileFormat};

pub mod legacy;

mod loader;
pub use loader::{describe, load_config, read_config, read_env, update_env};
