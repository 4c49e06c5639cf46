//! File error types with rich diagnostics.

use miette::{Diagnostic, NamedSource, SourceSpan};

/// Errors raised while loading a configuration file.
///
/// Syntax and type errors carry the file content and a span, so
/// [`miette`] renders the offending line:
///
/// ```text
/// Error: YAML parse error in config.yaml
///    ╭─[config.yaml:3:7]
///    │
///  3 │ port: [1, 2
///    │       ^^^^^ did not find expected ',' or ']'
///    ╰────
///   help: check indentation and ensure proper YAML syntax
/// ```
#[derive(Debug, Diagnostic, thiserror::Error)]
pub enum FileError {
    /// The file could not be read.
    #[error("failed to read configuration file: {path}")]
    #[diagnostic(
        code(envbind::file::read_error),
        help("check that the file exists and is readable")
    )]
    Read {
        /// Path to the file
        path: String,

        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Syntax error with source location
    #[error("{format} parse error in {path}")]
    #[diagnostic(code(envbind::file::parse_error))]
    Parse {
        /// Format name (JSON, TOML, YAML)
        format: &'static str,

        /// Path to the file
        path: String,

        /// The file content for display
        #[source_code]
        src: NamedSource<String>,

        /// The location of the error
        #[label("{message}")]
        span: SourceSpan,

        /// Description of what went wrong
        message: String,

        /// Suggestion for how to fix
        #[help]
        help: String,
    },

    /// Syntax error without source location
    #[error("{format} parse error: {message}")]
    #[diagnostic(code(envbind::file::parse_error))]
    ParseNoSpan {
        /// Format name
        format: &'static str,

        /// Error message
        message: String,

        /// Suggestion for how to fix
        #[help]
        help: String,
    },

    /// A value in the file does not fit the destination field
    #[error("type mismatch at `{key_path}` in {file_path}")]
    #[diagnostic(code(envbind::file::type_mismatch))]
    TypeMismatch {
        /// Dotted path of the offending key (e.g. "database.port")
        key_path: String,

        /// Path to the file
        file_path: String,

        /// The file content for display
        #[source_code]
        src: NamedSource<String>,

        /// The location of the value
        #[label("{message}")]
        span: SourceSpan,

        /// Description of what went wrong
        message: String,

        /// Suggestion for how to fix
        #[help]
        help: String,
    },

    /// The destination could not be converted to a mergeable document
    #[error("cannot merge file values into {type_name}: {message}")]
    #[diagnostic(
        code(envbind::file::snapshot),
        help("fields the file does not set must serialize to finite JSON values")
    )]
    Snapshot {
        /// The destination type
        type_name: &'static str,

        /// Serializer message
        message: String,
    },

    /// A dotenv file could not be loaded
    #[cfg(feature = "dotenv")]
    #[error("failed to load dotenv file: {path}")]
    #[diagnostic(
        code(envbind::file::dotenv),
        help("each line must be KEY=VALUE; quote values containing spaces or '#'")
    )]
    Dotenv {
        /// Path to the file
        path: String,

        /// The underlying dotenv error
        #[source]
        source: dotenvy::Error,
    },
}
