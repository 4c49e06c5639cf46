//! Flat key-value binding without annotations.
//!
//! [`load_map`] copies string values into the top-level fields of a struct by
//! field name. It predates the annotation-driven binder and ignores `var`,
//! `prefix` and `default`; only integer, string and boolean fields can be
//! filled.

use std::collections::HashMap;

use crate::Error;
use crate::field::{Field, Kind};
use crate::meta::{DEFAULT_SEPARATOR, FieldEntry};
use crate::parse;

/// Copies entries of `values` into the fields of `cfg` with the same name.
///
/// Keys without a matching field are ignored. Nested structs are not
/// entered.
///
/// # Errors
///
/// - [`Error::UnsupportedRootKind`] when `cfg` is not a bindable struct.
/// - [`Error::UnsupportedFieldKind`] when a matched field is not an integer,
///   string or boolean.
/// - [`Error::Conversion`] when a value does not parse.
///
/// # Example
///
/// ```rust,ignore
/// let values = HashMap::from([("port".to_string(), "8080".to_string())]);
/// envbind::legacy::load_map(&values, &mut cfg)?;
/// ```
pub fn load_map(values: &HashMap<String, String>, cfg: &mut dyn Field) -> Result<(), Error> {
    let shared: &dyn Field = &*cfg;
    let (type_name, kind) = (shared.type_name(), shared.kind());

    let root = cfg
        .as_bindable()
        .ok_or(Error::UnsupportedRootKind { type_name, kind })?;

    for FieldEntry { spec, value } in root.fields() {
        let Some(raw) = values.get(spec.name) else {
            continue;
        };

        let shared: &dyn Field = &*value;
        match shared.kind() {
            Kind::Int { .. } | Kind::Uint { .. } | Kind::String | Kind::Bool => {
                parse::parse_value(value, raw, DEFAULT_SEPARATOR, None, spec.name)?;
            }

            other => {
                return Err(Error::unsupported_kind(
                    spec.name,
                    shared.type_name(),
                    other,
                ));
            }
        }
    }

    Ok(())
}
