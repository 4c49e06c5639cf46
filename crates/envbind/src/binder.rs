//! Source resolution and policy for one binding pass.
//!
//! For every descriptor the raw value is chosen by strict precedence:
//!
//! 1. The first environment variable in the descriptor's list that is set.
//! 2. The descriptor's default, but only while the field is zero.
//! 3. Nothing: the field keeps its current value.
//!
//! A required field that is still zero after step 1 fails the pass before
//! any default is considered.

use std::env::VarError;

use crate::Error;
use crate::field::Field;
use crate::meta::{self, Descriptor};
use crate::parse;

/// Which fields a binding pass writes.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Mode {
    /// Every field.
    #[default]
    Full,

    /// Only fields tagged `upd`.
    UpdateOnly,
}

/// Where a field's raw value came from.
enum Source<'d> {
    Env(&'d str),
    Default,
}

/// Runs one binding pass over `root`.
///
/// The root's updater hook, if any, runs first. The pass stops at the first
/// failure; fields bound before it keep their new values.
///
/// # Errors
///
/// Any error from the updater, the metadata walk, environment lookup, policy
/// checks or conversion.
pub fn bind(root: &mut dyn Field, mode: Mode) -> Result<(), Error> {
    run_updater(root)?;

    let descriptors = meta::read_metadata(root)?;
    tracing::debug!(?mode, fields = descriptors.len(), "binding environment");

    for descriptor in descriptors {
        bind_field(descriptor, mode)?;
    }

    Ok(())
}

fn run_updater(root: &mut dyn Field) -> Result<(), Error> {
    let Some(updater) = root.as_bindable().and_then(|node| node.as_updater()) else {
        return Ok(());
    };

    tracing::debug!("running configuration updater");
    updater.update().map_err(|source| Error::Updater { source })
}

fn bind_field(descriptor: Descriptor<'_>, mode: Mode) -> Result<(), Error> {
    let Descriptor {
        value,
        env,
        name,
        default,
        layout,
        separator,
        updatable,
        required,
        ..
    } = descriptor;

    if mode == Mode::UpdateOnly && !updatable {
        tracing::trace!(field = name, "not updatable, skipped");
        return Ok(());
    }

    let (raw, source) = match lookup_env(&env)? {
        Some((var, raw)) => (raw, Source::Env(var)),

        None if value.is_zero() => {
            if required {
                return Err(Error::required(name, env.clone()));
            }

            match default {
                Some(default) => (default.to_owned(), Source::Default),
                None => return Ok(()),
            }
        }

        None => {
            tracing::trace!(field = name, "no source, keeping current value");
            return Ok(());
        }
    };

    match source {
        Source::Env(var) => tracing::debug!(field = name, var, "binding from environment"),
        Source::Default => tracing::debug!(field = name, "binding from default"),
    }

    parse::parse_value(value, &raw, separator, layout, name)
}

/// Returns the first set variable of `names` and its value.
fn lookup_env(names: &[String]) -> Result<Option<(&str, String)>, Error> {
    for name in names {
        match std::env::var(name) {
            Ok(raw) => return Ok(Some((name.as_str(), raw))),

            Err(VarError::NotPresent) => {}

            Err(VarError::NotUnicode(_)) => {
                return Err(Error::InvalidUtf8 { var: name.clone() });
            }
        }
    }

    Ok(None)
}
