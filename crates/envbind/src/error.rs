//! Error types for configuration binding.
//!
//! This module contains the [`Error`] enum returned by every entry point.
//! It integrates with [`miette`] for rich diagnostics: each variant carries
//! a stable code and help text, and file errors render the offending
//! snippet of the configuration file.
//!
//! # Error Variants
//!
//! | Variant | When It Occurs |
//! |---------|----------------|
//! | [`Error::UnsupportedRootKind`] | Binding target is not a struct |
//! | [`Error::RequiredFieldMissing`] | Required field unresolved and still zero |
//! | [`Error::Conversion`] | Raw text cannot become the target type |
//! | [`Error::UnsupportedFieldKind`] | No setter, converter or parser for a field |
//! | [`Error::UnsupportedFileFormat`] | Configuration file extension not recognised |
//! | [`Error::Updater`] | The whole-structure refresh hook failed |
//! | [`Error::InvalidUtf8`] | Environment variable is not valid UTF-8 |
//! | [`Error::CyclicStructure`] | The same struct instance was reached twice |
//! | [`Error::File`] | Reading or decoding a configuration file failed |
//!
//! # Fail-fast Semantics
//!
//! A binding pass stops at the first failure. Fields bound before the
//! failure keep their new values; nothing is rolled back. The failing field
//! itself is left as it was, including sequences and maps.

use miette::Diagnostic;
use thiserror::Error as ThisError;

use crate::field::{BoxError, Kind};
use crate::file::FileError;

/// Errors that can occur while binding a configuration structure.
///
/// # Example
///
/// ```rust,ignore
/// match envbind::read_env(&mut config) {
///     Ok(()) => { /* use config */ }
///     Err(envbind::Error::RequiredFieldMissing { field, .. }) => {
///         eprintln!("{field} must be set");
///     }
///     Err(e) => eprintln!("{:?}", miette::Report::from(e)),
/// }
/// ```
#[derive(Debug, Diagnostic, ThisError)]
pub enum Error {
    /// The binding target is not a struct.
    #[error("cannot bind into {type_name}: expected a struct, found {kind}")]
    #[diagnostic(
        code(envbind::unsupported_root_kind),
        help("bind into a struct that derives `Bindable`")
    )]
    UnsupportedRootKind {
        /// The type that was passed as the root.
        type_name: &'static str,

        /// Its kind.
        kind: Kind,
    },

    /// A required field has no environment value and is still zero.
    #[error("field {field:?} is required but the value is not provided")]
    #[diagnostic(code(envbind::required_field_missing), severity(Error))]
    RequiredFieldMissing {
        /// Display name of the field.
        field: String,

        /// Environment variables that were checked.
        vars: Vec<String>,

        /// Dynamic help message naming the variables to set.
        #[help]
        help: String,
    },

    /// A raw value could not be converted into the field's type.
    #[error("failed to parse {field}: expected {expected_type}, got {value:?}")]
    #[diagnostic(code(envbind::conversion))]
    Conversion {
        /// Display name of the field.
        field: String,

        /// The raw text that failed to convert.
        value: String,

        /// The target type name.
        expected_type: &'static str,

        /// Dynamic help text generated from the expected type.
        #[help]
        help: String,

        /// The underlying parse error.
        #[source]
        source: BoxError,
    },

    /// No setter, registered converter or built-in parser handles the field.
    #[error("field {field} has unsupported type {type_name} ({kind})")]
    #[diagnostic(
        code(envbind::unsupported_field_kind),
        help("register a converter for the type or implement `Setter` for it")
    )]
    UnsupportedFieldKind {
        /// Display name of the field.
        field: String,

        /// The field's type name.
        type_name: &'static str,

        /// The field's kind.
        kind: Kind,
    },

    /// The configuration file extension is not recognised.
    #[error("file format '{extension}' is not supported")]
    #[diagnostic(
        code(envbind::unsupported_file_format),
        help("supported formats: .yaml, .yml, .json, .toml, .env")
    )]
    UnsupportedFileFormat {
        /// The extension, including the leading dot (empty if none).
        extension: String,
    },

    /// The whole-structure refresh hook failed.
    #[error("configuration updater failed: {source}")]
    #[diagnostic(code(envbind::updater))]
    Updater {
        /// The error returned by the hook.
        #[source]
        source: BoxError,
    },

    /// An environment variable holds bytes that are not valid UTF-8.
    #[error("environment variable {var} contains invalid UTF-8")]
    #[diagnostic(
        code(envbind::invalid_utf8),
        help("ensure the variable contains valid UTF-8 text")
    )]
    InvalidUtf8 {
        /// The variable name.
        var: String,
    },

    /// The same struct instance was reached twice while reading metadata.
    #[error("structure {type_name} is reachable more than once")]
    #[diagnostic(
        code(envbind::cyclic_structure),
        help("self-referential configuration structures are not supported")
    )]
    CyclicStructure {
        /// The struct's type name.
        type_name: &'static str,
    },

    /// Reading or decoding a configuration file failed.
    #[error("configuration file error: {source}")]
    #[diagnostic(transparent)]
    File {
        /// The underlying file error with source location.
        #[from]
        #[diagnostic_source]
        source: FileError,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// Constructor helpers for ergonomic error creation
// ─────────────────────────────────────────────────────────────────────────────

impl Error {
    /// Creates a `RequiredFieldMissing` error with a help message listing
    /// the checked variables.
    pub fn required(field: impl Into<String>, vars: Vec<String>) -> Self {
        let help = if vars.is_empty() {
            "the field has no environment variable; provide it in the configuration file"
                .to_string()
        } else {
            format!("set {} in your environment or .env file", vars.join(" or "))
        };

        Self::RequiredFieldMissing {
            field: field.into(),
            vars,
            help,
        }
    }

    /// Creates a `Conversion` error with help text derived from the type.
    pub fn conversion(
        field: impl Into<String>,
        value: impl Into<String>,
        expected_type: &'static str,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::Conversion {
            field: field.into(),
            value: value.into(),
            expected_type,
            help: format!("expected a valid {expected_type}"),
            source: source.into(),
        }
    }

    /// Creates an `UnsupportedFieldKind` error.
    pub fn unsupported_kind(field: impl Into<String>, type_name: &'static str, kind: Kind) -> Self {
        Self::UnsupportedFieldKind {
            field: field.into(),
            type_name,
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_names_vars_in_help() {
        let err = Error::required("Port", vec!["PORT".into(), "HTTP_PORT".into()]);
        assert_eq!(
            err.to_string(),
            "field \"Port\" is required but the value is not provided"
        );

        let Error::RequiredFieldMissing { help, .. } = err else {
            panic!("Expected RequiredFieldMissing variant");
        };
        assert!(help.contains("PORT or HTTP_PORT"));
    }

    #[test]
    fn test_conversion_display() {
        let err = Error::conversion("Port", "abc", "u16", "invalid digit found in string");
        let display = err.to_string();
        assert!(display.contains("Port"));
        assert!(display.contains("u16"));
        assert!(display.contains("\"abc\""));
    }

    #[test]
    fn test_conversion_keeps_source() {
        use std::error::Error as _;

        let source = "x".parse::<i32>().unwrap_err();
        let err = Error::conversion("Count", "x", "i32", source);
        assert!(err.source().is_some());
    }

    #[test]
    fn test_unsupported_kind_display() {
        let err = Error::unsupported_kind("Inner", "app::Inner", Kind::Struct);
        assert_eq!(
            err.to_string(),
            "field Inner has unsupported type app::Inner (struct)"
        );
    }
}
