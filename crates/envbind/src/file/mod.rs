//! Configuration file loading.
//!
//! A file is decoded into the destination before the environment pass, so
//! environment variables always win over file values.
//!
//! # Supported Formats
//!
//! | Format | Feature Flag | Extensions | Target |
//! |--------|--------------|------------|--------|
//! | JSON | always | `.json` | destination struct |
//! | TOML | `toml` | `.toml` | destination struct |
//! | YAML | `yaml` | `.yaml`, `.yml` | destination struct |
//! | dotenv | `dotenv` | `.env` | process environment |
//!
//! # Merging
//!
//! Structured files are decoded into a document, merged over the
//! destination's current serialized state and deserialized back. Keys the
//! file does not mention keep their current values:
//!
//! ```rust,ignore
//! let mut cfg = Config { host: "localhost".into(), port: 8080 };
//!
//! // config.yaml contains only `port: 9090`
//! envbind::file::parse_file("config.yaml", &mut cfg)?;
//!
//! assert_eq!(cfg.host, "localhost");
//! assert_eq!(cfg.port, 9090);
//! ```
//!
//! dotenv files are written into the process environment, replacing
//! variables that are already set; the environment pass then picks them up.
//!
//! # Error Handling
//!
//! Syntax and type errors carry source spans for [`miette`]:
//!
//! ```text
//! Error: type mismatch at `db.port` in config.json
//!    ╭─[config.json:1:17]
//!  1 │ {"db": {"port": "high"}}
//!    ·                 ───┬──
//!    ·                    ╰── invalid type: string "high", expected u16
//!    ╰────
//!   help: check that the value matches the expected type
//! ```

// FileError is intentionally large to provide rich miette diagnostics with source spans
#![allow(clippy::result_large_err)]

mod error;
mod format;
mod utils;

use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json as SJSON;

pub use error::FileError;
pub use format::FileFormat;
pub use utils::FileUtils;

use crate::Error;

/// Decodes the file at `path` into `cfg`.
///
/// The file is read before its format is checked.
///
/// # Errors
///
/// - [`FileError::Read`] when the file cannot be read.
/// - [`Error::UnsupportedFileFormat`] for an unrecognised extension.
/// - [`FileError::Parse`] / [`FileError::ParseNoSpan`] for syntax errors.
/// - [`FileError::TypeMismatch`] when a value does not fit its field.
/// - [`FileError::Snapshot`] when the destination's current state cannot be
///   carried through the merge. A non-finite `f32`/`f64` serializes as JSON
///   `null`, so a structured file must set such a field itself.
/// - [`FileError::Dotenv`] when a dotenv line is malformed.
pub fn parse_file<T>(path: impl AsRef<Path>, cfg: &mut T) -> Result<(), Error>
where
    T: Serialize + DeserializeOwned,
{
    let path = path.as_ref();

    let content = std::fs::read_to_string(path).map_err(|source| FileError::Read {
        path: path.display().to_string(),
        source,
    })?;

    let Some(format) = FileFormat::from_path(path) else {
        return Err(Error::UnsupportedFileFormat {
            extension: FileFormat::extension(path)
                .map(|ext| format!(".{ext}"))
                .unwrap_or_default(),
        });
    };

    tracing::debug!(path = %path.display(), format = format.name(), "loading configuration file");

    match format {
        #[cfg(feature = "dotenv")]
        FileFormat::Dotenv => load_dotenv(path),

        _ => decode_into(&content, format, path, cfg),
    }
}

fn decode_into<T>(content: &str, format: FileFormat, path: &Path, cfg: &mut T) -> Result<(), Error>
where
    T: Serialize + DeserializeOwned,
{
    let document = FileUtils::parse_str(content, format, path)?;
    if document.is_null() {
        tracing::debug!(path = %path.display(), "configuration file is empty");
        return Ok(());
    }

    let mut merged = SJSON::to_value(&*cfg).map_err(|e| FileError::Snapshot {
        type_name: std::any::type_name::<T>(),
        message: e.to_string(),
    })?;
    let overlay = document.clone();
    FileUtils::deep_merge(&mut merged, document);

    *cfg = serde_path_to_error::deserialize(&merged).map_err(|e| {
        let key_path = e.path().to_string();

        // The file never mentioned this key, so the failing value is the
        // destination's own, nulled by JSON (NaN and infinite floats).
        if FileUtils::value_at(&overlay, e.path()).is_none()
            && FileUtils::value_at(&merged, e.path()).is_some_and(SJSON::Value::is_null)
        {
            return FileError::Snapshot {
                type_name: std::any::type_name::<T>(),
                message: format!("current value of `{key_path}` has no JSON form"),
            };
        }

        FileUtils::type_mismatch_error(&key_path, &e.inner().to_string(), content, path, format)
    })?;

    Ok(())
}

#[cfg(feature = "dotenv")]
fn load_dotenv(path: &Path) -> Result<(), Error> {
    dotenvy::from_path_override(path).map_err(|source| FileError::Dotenv {
        path: path.display().to_string(),
        source,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Default, Deserialize, PartialEq, Serialize)]
    struct Db {
        host: String,
        port: u16,
    }

    #[derive(Debug, Default, Deserialize, PartialEq, Serialize)]
    struct Settings {
        name: String,
        tags: Vec<String>,
        db: Db,
    }

    fn write_file(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(suffix)
            .tempfile()
            .expect("tempfile");
        file.write_all(content.as_bytes()).expect("write");
        file
    }

    #[test]
    fn test_json_merges_over_current_values() {
        let file = write_file(".json", r#"{"db": {"port": 5433}, "tags": ["a"]}"#);
        let mut settings = Settings {
            name: "kept".into(),
            tags: vec!["x".into(), "y".into()],
            db: Db {
                host: "localhost".into(),
                port: 5432,
            },
        };

        parse_file(file.path(), &mut settings).unwrap();

        assert_eq!(settings.name, "kept");
        assert_eq!(settings.tags, vec!["a"]);
        assert_eq!(settings.db.host, "localhost");
        assert_eq!(settings.db.port, 5433);
    }

    #[test]
    fn test_type_mismatch_names_key() {
        let file = write_file(".json", r#"{"db": {"port": "high"}}"#);
        let mut settings = Settings::default();

        let err = parse_file(file.path(), &mut settings).unwrap_err();
        let Error::File {
            source: FileError::TypeMismatch { key_path, .. },
        } = err
        else {
            panic!("Expected TypeMismatch variant");
        };
        assert_eq!(key_path, "db.port");
    }

    #[test]
    fn test_unsupported_extension() {
        let file = write_file(".ini", "a=1");
        let err = parse_file(file.path(), &mut Settings::default()).unwrap_err();

        let Error::UnsupportedFileFormat { extension } = err else {
            panic!("Expected UnsupportedFileFormat variant");
        };
        assert_eq!(extension, ".ini");
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = parse_file("/nonexistent/envbind/config.json", &mut Settings::default())
            .unwrap_err();
        assert!(matches!(
            err,
            Error::File {
                source: FileError::Read { .. }
            }
        ));
    }

    #[derive(Debug, Default, Deserialize, Serialize)]
    struct Tuning {
        name: String,
        ratio: f64,
    }

    #[test]
    fn test_non_finite_value_left_by_file_is_snapshot_error() {
        let file = write_file(".json", r#"{"name": "x"}"#);
        let mut tuning = Tuning {
            name: "kept".into(),
            ratio: f64::NAN,
        };

        let err = parse_file(file.path(), &mut tuning).unwrap_err();
        let Error::File {
            source: FileError::Snapshot { message, .. },
        } = err
        else {
            panic!("Expected Snapshot variant");
        };
        assert!(message.contains("`ratio`"), "{message}");
        assert_eq!(tuning.name, "kept");
        assert!(tuning.ratio.is_nan());
    }

    #[test]
    fn test_non_finite_value_set_by_file_loads() {
        let file = write_file(".json", r#"{"name": "x", "ratio": 0.5}"#);
        let mut tuning = Tuning {
            name: String::new(),
            ratio: f64::INFINITY,
        };

        parse_file(file.path(), &mut tuning).unwrap();

        assert_eq!(tuning.name, "x");
        assert!((tuning.ratio - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_null_written_by_file_is_type_mismatch() {
        let file = write_file(".json", r#"{"ratio": null}"#);
        let mut tuning = Tuning::default();

        let err = parse_file(file.path(), &mut tuning).unwrap_err();
        assert!(matches!(
            err,
            Error::File {
                source: FileError::TypeMismatch { .. }
            }
        ));
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn test_yaml() {
        let file = write_file(".yaml", "name: svc\ndb:\n  host: db.internal\n");
        let mut settings = Settings::default();

        parse_file(file.path(), &mut settings).unwrap();

        assert_eq!(settings.name, "svc");
        assert_eq!(settings.db.host, "db.internal");
        assert_eq!(settings.db.port, 0);
    }

    #[cfg(feature = "toml")]
    #[test]
    fn test_toml() {
        let file = write_file(".toml", "tags = [\"p\", \"q\"]\n[db]\nport = 7\n");
        let mut settings = Settings::default();

        parse_file(file.path(), &mut settings).unwrap();

        assert_eq!(settings.tags, vec!["p", "q"]);
        assert_eq!(settings.db.port, 7);
    }
}
