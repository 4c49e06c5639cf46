//! Decoding helpers and diagnostic construction for configuration files.

use std::path::Path;

use miette::{NamedSource, SourceSpan};
use serde_json as SJSON;

#[cfg(feature = "yaml")]
use serde_saphyr as YAML;

#[cfg(feature = "toml")]
use toml as TOML;

use super::error::FileError;
use super::format::FileFormat;

/// Stateless helpers shared by the file loader.
pub struct FileUtils;

impl FileUtils {
    /// Converts a byte offset to a [`SourceSpan`] covering the token there.
    ///
    /// Offsets past the end or inside a multi-byte character are moved back
    /// to the nearest character boundary.
    pub(crate) fn offset_to_span(offset: usize, content: &str) -> SourceSpan {
        let offset = Self::floor_char_boundary(content, offset);
        let remaining = &content[offset..];
        let len = remaining
            .find(|c: char| c.is_whitespace() || c == ',' || c == '}' || c == ']')
            .unwrap_or(remaining.len().min(20))
            .max(1);

        SourceSpan::new(offset.into(), len)
    }

    /// The largest character boundary of `content` at or before `offset`.
    pub(crate) fn floor_char_boundary(content: &str, offset: usize) -> usize {
        let mut offset = offset.min(content.len());
        while !content.is_char_boundary(offset) {
            offset -= 1;
        }
        offset
    }

    /// Convert line/column (1-indexed) to byte offset.
    ///
    /// Line starts come from the actual `\n` positions, so `\r\n` endings
    /// are counted in full. The result is always a character boundary.
    pub(crate) fn line_col_to_offset(content: &str, line: usize, col: usize) -> usize {
        let line_start = match line.saturating_sub(1) {
            0 => 0,
            skipped => content
                .match_indices('\n')
                .nth(skipped - 1)
                .map_or(content.len(), |(index, _)| index + 1),
        };

        Self::floor_char_boundary(content, line_start + col.saturating_sub(1))
    }

    /// Locates the value of the last key in a dotted `key_path`.
    ///
    /// Sequence indices (`tags[2]`) are dropped, so the span points at the
    /// start of the whole sequence.
    pub(crate) fn find_field_offset(
        content: &str,
        key_path: &str,
        format: FileFormat,
    ) -> Option<usize> {
        let leaf = key_path
            .rsplit('.')
            .map(|segment| segment.split('[').next().unwrap_or(segment))
            .find(|segment| !segment.is_empty())?;

        let patterns = match format {
            FileFormat::Json => vec![format!("\"{leaf}\":"), format!("\"{leaf}\" :")],

            #[cfg(feature = "toml")]
            FileFormat::Toml => vec![format!("{leaf} ="), format!("{leaf}=")],

            #[cfg(feature = "yaml")]
            FileFormat::Yaml => vec![format!("{leaf}:"), format!("{leaf} :")],

            #[cfg(feature = "dotenv")]
            FileFormat::Dotenv => return None,
        };

        patterns.iter().find_map(|pattern| {
            let after = content.find(pattern.as_str())? + pattern.len();
            let start = content[after..].find(|c: char| !c.is_whitespace())?;
            Some(Self::floor_char_boundary(content, after + start))
        })
    }

    // ============================================================================
    // Parse Errors
    // ============================================================================

    pub(crate) fn json_parse_error(e: &SJSON::Error, content: &str, path: &Path) -> FileError {
        let offset = Self::line_col_to_offset(content, e.line(), e.column());

        FileError::Parse {
            format: "JSON",
            path: path.display().to_string(),
            src: NamedSource::new(path.display().to_string(), content.to_string()),
            span: Self::offset_to_span(offset, content),
            message: e.to_string(),
            help: "check for missing commas, quotes, or brackets".to_string(),
        }
    }

    #[cfg(feature = "toml")]
    pub(crate) fn toml_parse_error(e: &TOML::de::Error, content: &str, path: &Path) -> FileError {
        let help = "check for missing quotes, invalid values, or syntax errors".to_string();

        match e.span() {
            Some(span) => FileError::Parse {
                format: "TOML",
                path: path.display().to_string(),
                src: NamedSource::new(path.display().to_string(), content.to_string()),
                span: SourceSpan::new(span.start.into(), span.end - span.start),
                message: e.message().to_string(),
                help,
            },

            None => FileError::ParseNoSpan {
                format: "TOML",
                message: e.to_string(),
                help,
            },
        }
    }

    #[cfg(feature = "yaml")]
    pub(crate) fn yaml_parse_error(e: &YAML::Error, content: &str, path: &Path) -> FileError {
        let message = e.to_string();
        let help = "check indentation and ensure proper YAML syntax".to_string();

        match Self::extract_yaml_location(&message) {
            Some((line, col)) => {
                let offset = Self::line_col_to_offset(content, line, col);

                FileError::Parse {
                    format: "YAML",
                    path: path.display().to_string(),
                    src: NamedSource::new(path.display().to_string(), content.to_string()),
                    span: Self::offset_to_span(offset, content),
                    message,
                    help,
                }
            }

            None => FileError::ParseNoSpan {
                format: "YAML",
                message,
                help,
            },
        }
    }

    /// Try to extract line/column from a YAML error message.
    #[cfg(feature = "yaml")]
    pub(crate) fn extract_yaml_location(msg: &str) -> Option<(usize, usize)> {
        let line_idx = msg.find("line ")?;
        let after_line = &msg[(line_idx + 5)..];
        let line_end = after_line.find(|c: char| !c.is_ascii_digit())?;
        let line = after_line[..line_end].parse::<usize>().ok()?;

        let col_idx = after_line.find("column ")?;
        let after_col = &after_line[(col_idx + 7)..];
        let col_end = after_col
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(after_col.len());
        let col = after_col[..col_end].parse::<usize>().ok()?;

        Some((line, col))
    }

    /// Builds the error for a file value that does not fit its field.
    pub(crate) fn type_mismatch_error(
        key_path: &str,
        message: &str,
        content: &str,
        path: &Path,
        format: FileFormat,
    ) -> FileError {
        let help = "check that the value matches the expected type".to_string();

        match Self::find_field_offset(content, key_path, format) {
            Some(offset) => FileError::TypeMismatch {
                key_path: key_path.to_string(),
                file_path: path.display().to_string(),
                src: NamedSource::new(path.display().to_string(), content.to_string()),
                span: Self::offset_to_span(offset, content),
                message: message.to_string(),
                help,
            },

            None => FileError::ParseNoSpan {
                format: format.name(),
                message: format!("at `{key_path}`: {message}"),
                help,
            },
        }
    }

    // ============================================================================
    // Decoding
    // ============================================================================

    /// Decodes structured file content into a JSON document.
    ///
    /// An empty document decodes to `Null`.
    pub(crate) fn parse_str(
        content: &str,
        format: FileFormat,
        path: &Path,
    ) -> Result<SJSON::Value, FileError> {
        if content.trim().is_empty() {
            return Ok(SJSON::Value::Null);
        }

        match format {
            FileFormat::Json => {
                SJSON::from_str(content).map_err(|e| Self::json_parse_error(&e, content, path))
            }

            #[cfg(feature = "toml")]
            FileFormat::Toml => {
                let table: TOML::Table = TOML::from_str(content)
                    .map_err(|e| Self::toml_parse_error(&e, content, path))?;
                Ok(Self::toml_to_json(TOML::Value::Table(table)))
            }

            #[cfg(feature = "yaml")]
            FileFormat::Yaml => {
                YAML::from_str(content).map_err(|e| Self::yaml_parse_error(&e, content, path))
            }

            #[cfg(feature = "dotenv")]
            FileFormat::Dotenv => Ok(SJSON::Value::Null),
        }
    }

    /// Convert a TOML value to a JSON value. Datetimes become strings.
    #[cfg(feature = "toml")]
    fn toml_to_json(toml: TOML::Value) -> SJSON::Value {
        match toml {
            TOML::Value::String(s) => SJSON::Value::String(s),

            TOML::Value::Integer(i) => SJSON::Value::Number(i.into()),

            TOML::Value::Float(f) => {
                SJSON::Number::from_f64(f).map_or(SJSON::Value::Null, SJSON::Value::Number)
            }

            TOML::Value::Boolean(b) => SJSON::Value::Bool(b),

            TOML::Value::Datetime(dt) => SJSON::Value::String(dt.to_string()),

            TOML::Value::Array(arr) => {
                SJSON::Value::Array(arr.into_iter().map(Self::toml_to_json).collect())
            }

            TOML::Value::Table(table) => SJSON::Value::Object(
                table
                    .into_iter()
                    .map(|(k, v)| (k, Self::toml_to_json(v)))
                    .collect(),
            ),
        }
    }

    /// Deep merges `overlay` into `base`.
    ///
    /// Objects merge key by key; any other value in `overlay` replaces the
    /// one in `base`, so file sequences replace existing sequences.
    ///
    /// ```rust
    /// use envbind::file::FileUtils;
    /// use serde_json::json;
    ///
    /// let mut base = json!({ "db": { "host": "localhost", "port": 5432 } });
    /// FileUtils::deep_merge(&mut base, json!({ "db": { "port": 5433 } }));
    ///
    /// assert_eq!(base, json!({ "db": { "host": "localhost", "port": 5433 } }));
    /// ```
    pub fn deep_merge(base: &mut SJSON::Value, overlay: SJSON::Value) {
        match (base, overlay) {
            (SJSON::Value::Object(base_map), SJSON::Value::Object(overlay_map)) => {
                for (key, overlay_value) in overlay_map {
                    if let Some(base_value) = base_map.get_mut(&key) {
                        Self::deep_merge(base_value, overlay_value);
                    } else {
                        base_map.insert(key, overlay_value);
                    }
                }
            }

            (base, overlay) => {
                *base = overlay;
            }
        }
    }

    /// The value at a deserializer error path, if the document has one.
    pub(crate) fn value_at<'v>(
        value: &'v SJSON::Value,
        path: &serde_path_to_error::Path,
    ) -> Option<&'v SJSON::Value> {
        path.iter().try_fold(value, |current, segment| match segment {
            serde_path_to_error::Segment::Map { key } => current.get(key),
            serde_path_to_error::Segment::Seq { index } => current.get(index),
            _ => None,
        })
    }
}
