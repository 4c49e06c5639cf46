//! Entry points for binding a configuration struct.
//!
//! | Function | File | Environment |
//! |----------|------|-------------|
//! | [`read_config`] | yes | every field |
//! | [`read_env`] | no | every field |
//! | [`update_env`] | no | fields tagged `upd` |
//! | [`load_config`] | if a path is given | every field |
//!
//! Every call rebuilds the field metadata; nothing is cached between calls.

use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::Error;
use crate::binder::{self, Mode};
use crate::field::Field;
use crate::file;
use crate::meta::{self, FieldInfo};

/// Loads `path` into `cfg`, then binds environment variables over it.
///
/// # Errors
///
/// Fails if the file cannot be loaded, or as [`read_env`] does.
///
/// # Example
///
/// ```rust,ignore
/// let mut cfg = Config::default();
/// envbind::read_config("config.yaml", &mut cfg)?;
/// ```
pub fn read_config<T>(path: impl AsRef<Path>, cfg: &mut T) -> Result<(), Error>
where
    T: Field + Serialize + DeserializeOwned,
{
    file::parse_file(path, cfg)?;
    read_env(cfg)
}

/// Binds every annotated field of `cfg` from the environment.
///
/// # Errors
///
/// - [`Error::UnsupportedRootKind`] when `cfg` is not a bindable struct.
/// - [`Error::RequiredFieldMissing`] for an unresolved required zero field.
/// - [`Error::Conversion`] / [`Error::UnsupportedFieldKind`] from parsing.
/// - [`Error::Updater`] when the struct's updater fails.
pub fn read_env<T: Field>(cfg: &mut T) -> Result<(), Error> {
    binder::bind(cfg, Mode::Full)
}

/// Binds only fields tagged `upd`, leaving the rest untouched.
///
/// The configuration file is not re-read.
///
/// # Errors
///
/// As [`read_env`], restricted to updatable fields.
pub fn update_env<T: Field>(cfg: &mut T) -> Result<(), Error> {
    binder::bind(cfg, Mode::UpdateOnly)
}

/// [`read_config`] when `path` is given and non-empty, otherwise [`read_env`].
///
/// # Errors
///
/// As the function it delegates to.
pub fn load_config<T>(path: Option<&Path>, cfg: &mut T) -> Result<(), Error>
where
    T: Field + Serialize + DeserializeOwned,
{
    match path.filter(|p| !p.as_os_str().is_empty()) {
        Some(path) => read_config(path, cfg),
        None => read_env(cfg),
    }
}

/// Lists the annotated fields of `cfg`, for help and usage output.
///
/// # Errors
///
/// Fails as the metadata walk does, e.g. when `cfg` is not a struct.
pub fn describe<T: Field>(cfg: &mut T) -> Result<Vec<FieldInfo>, Error> {
    let descriptors = meta::read_metadata(cfg)?;
    Ok(descriptors.iter().map(FieldInfo::from).collect())
}
