//! File format detection.
//!
//! | Format | Feature | Extensions |
//! |--------|---------|------------|
//! | JSON | always | `.json` |
//! | TOML | `toml` | `.toml` |
//! | YAML | `yaml` | `.yaml`, `.yml` |
//! | dotenv | `dotenv` | `.env` |
//!
//! Extensions are matched case-insensitively. A bare dotfile counts as its
//! own extension, so `.env` is a dotenv file.

use std::path::Path;

/// Supported configuration file formats.
///
/// Formats whose feature flag is disabled are not detected.
///
/// ```rust
/// use envbind::file::FileFormat;
/// use std::path::Path;
///
/// assert_eq!(FileFormat::from_path(Path::new("config.json")), Some(FileFormat::Json));
/// assert_eq!(FileFormat::from_path(Path::new("config.txt")), None);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FileFormat {
    /// JSON format (`.json` extension).
    Json,

    /// TOML format (`.toml` extension).
    ///
    /// Requires the `toml` feature flag.
    #[cfg(feature = "toml")]
    Toml,

    /// YAML format (`.yaml` or `.yml` extension).
    ///
    /// Requires the `yaml` feature flag.
    #[cfg(feature = "yaml")]
    Yaml,

    /// dotenv format (`.env` extension).
    ///
    /// Entries are written to the process environment instead of the
    /// destination struct. Requires the `dotenv` feature flag.
    #[cfg(feature = "dotenv")]
    Dotenv,
}

impl FileFormat {
    /// Detects the format from the file extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        match Self::extension(path)?.as_str() {
            "json" => Some(FileFormat::Json),

            #[cfg(feature = "toml")]
            "toml" => Some(FileFormat::Toml),

            #[cfg(feature = "yaml")]
            "yaml" | "yml" => Some(FileFormat::Yaml),

            #[cfg(feature = "dotenv")]
            "env" => Some(FileFormat::Dotenv),

            _ => None,
        }
    }

    /// The lowercased extension of `path`, without the dot.
    ///
    /// For a bare dotfile such as `.env` the name after the dot is returned.
    #[must_use]
    pub fn extension(path: &Path) -> Option<String> {
        if let Some(ext) = path.extension() {
            return ext.to_str().map(str::to_lowercase);
        }

        path.file_name()?
            .to_str()?
            .strip_prefix('.')
            .filter(|name| !name.is_empty())
            .map(str::to_lowercase)
    }

    /// Get the format name for error messages.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            FileFormat::Json => "JSON",

            #[cfg(feature = "toml")]
            FileFormat::Toml => "TOML",

            #[cfg(feature = "yaml")]
            FileFormat::Yaml => "YAML",

            #[cfg(feature = "dotenv")]
            FileFormat::Dotenv => "dotenv",
        }
    }
}
