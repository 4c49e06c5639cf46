//! # envbind_macro
//!
//! Procedural macro implementation for the `envbind` crate.
//!
//! This crate provides `#[derive(Bindable)]`, which exposes a struct's fields
//! and their `#[env(...)]` annotations to the `envbind` binding engine.
//! It is a proc-macro crate and can only export procedural macros.
//!
//! **Note:** Users should depend on the `envbind` crate, not this one directly.
//! The `envbind` crate re-exports this macro along with runtime types.
//!
//! # Module Structure
//!
//! - `parse` - Attribute parsing for `#[env(...)]` and `#[env_config(...)]`
//! - `field` - Per-field code fragments
//! - `expand` - Macro expansion orchestration and code generation
//!
//! # Generated Code
//!
//! | Impl | Description |
//! |------|-------------|
//! | `envbind::Field` | Struct kind, zero check, nested-structure access |
//! | `envbind::Bindable` | Field list with binding options, optional updater |

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

// Internal modules - not exposed publicly
mod expand;
mod field;
mod parse;

/// Derive macro for binding a struct from configuration files and
/// environment variables.
///
/// Every named field is bound unless it carries `#[env(skip)]`, so each
/// field type must implement `envbind::Field`. Fields without an `#[env]`
/// attribute read no variables; nested `Bindable` structs are still entered.
///
/// # Field Attributes
///
/// | Attribute | Description |
/// |-----------|-------------|
/// | `var = "A,B"` | Environment variables, first one set wins |
/// | `default = "value"` | Applied when no variable is set and the field is zero |
/// | `layout = "%Y-%m-%d"` | Layout hint for timestamp converters |
/// | `separator = ";"` | List and map separator (default `,`) |
/// | `description = "..."` | Help text, defaults to the doc comment |
/// | `upd` | Refreshed by update-only passes |
/// | `required` | Fail when unresolved and zero |
/// | `prefix = "DB_"` | Prefix for variables of a nested struct |
/// | `skip` | Not bound; cannot be combined with other options |
///
/// # Struct Attributes
///
/// | Attribute | Description |
/// |-----------|-------------|
/// | `updater` | Run the struct's `envbind::Updater` impl before each pass |
///
/// # Example
///
/// ```rust,ignore
/// use envbind::Bindable;
///
/// #[derive(Bindable, Default)]
/// struct Config {
///     #[env(var = "PORT", default = "8080")]
///     port: u16,
///
///     #[env(prefix = "DB_")]
///     database: Database,
/// }
///
/// #[derive(Bindable, Default)]
/// struct Database {
///     #[env(var = "HOST", required)]
///     host: String,
/// }
/// ```
///
/// # Compile Errors
///
/// The macro rejects tuple structs, enums and unions, unknown or duplicate
/// options, an empty `separator`, and `skip` combined with any other option.
#[proc_macro_derive(Bindable, attributes(env, env_config))]
pub fn derive_bindable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    expand::Expander::expand(&input).unwrap_or_else(|err| err.to_compile_error().into())
}
