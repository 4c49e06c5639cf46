//! Conversion of one raw string into one field.
//!
//! Dispatch order, applied to the field itself and again to every sequence
//! element and map key/value:
//!
//! 1. [`Setter`](crate::Setter) capability of the field.
//! 2. A converter registered for the field's exact type.
//! 3. The built-in parser for the field's [`Kind`](crate::Kind).

use std::str::FromStr;

use crate::Error;
use crate::field::{BoxError, Field, Slot, type_id_of};
use crate::registry;

/// Literals accepted for `true`.
const TRUE_LITERALS: [&str; 6] = ["1", "t", "T", "TRUE", "true", "True"];

/// Literals accepted for `false`.
const FALSE_LITERALS: [&str; 6] = ["0", "f", "F", "FALSE", "false", "False"];

/// Writes the value parsed from `raw` into `field`.
///
/// `separator` splits sequences and map entries, `layout` is forwarded to
/// registered converters and `name` labels errors.
///
/// # Errors
///
/// - [`Error::Conversion`] when the text is not valid for the type, or a map
///   entry is not exactly `key=value`.
/// - [`Error::UnsupportedFieldKind`] when nothing can parse the type.
pub fn parse_value(
    field: &mut dyn Field,
    raw: &str,
    separator: &str,
    layout: Option<&str>,
    name: &str,
) -> Result<(), Error> {
    let shared: &dyn Field = &*field;
    let type_name = shared.type_name();
    let type_id = type_id_of(shared);
    let kind = shared.kind();

    if let Some(setter) = field.as_setter() {
        return setter
            .set_value(raw)
            .map_err(|e| Error::conversion(name, raw, type_name, e));
    }

    if let Some(convert) = registry::lookup(type_id) {
        return convert(field.as_any_mut(), raw, layout)
            .map_err(|e| Error::conversion(name, raw, type_name, e));
    }

    match field.slot() {
        Slot::Bool(v) => *v = parse_bool(raw, name)?,

        Slot::I8(v) => *v = parse_number(raw, name, "i8")?,
        Slot::I16(v) => *v = parse_number(raw, name, "i16")?,
        Slot::I32(v) => *v = parse_number(raw, name, "i32")?,
        Slot::I64(v) => *v = parse_number(raw, name, "i64")?,
        Slot::Isize(v) => *v = parse_number(raw, name, "isize")?,

        Slot::U8(v) => *v = parse_number(raw, name, "u8")?,
        Slot::U16(v) => *v = parse_number(raw, name, "u16")?,
        Slot::U32(v) => *v = parse_number(raw, name, "u32")?,
        Slot::U64(v) => *v = parse_number(raw, name, "u64")?,
        Slot::Usize(v) => *v = parse_number(raw, name, "usize")?,

        Slot::F32(v) => *v = parse_number(raw, name, "f32")?,
        Slot::F64(v) => *v = parse_number(raw, name, "f64")?,

        Slot::String(v) => raw.clone_into(v),

        Slot::Seq(seq) => {
            let parts: Vec<&str> = raw.split(separator).collect();

            seq.replace_with(parts.len(), &mut |index: usize, element: &mut dyn Field| {
                parse_value(element, parts[index], separator, layout, name)
            })?;
        }

        Slot::Map(map) => {
            let entries: Vec<&str> = raw.split(separator).collect();

            map.replace_with(
                entries.len(),
                &mut |index: usize, k: &mut dyn Field, v: &mut dyn Field| {
                    let (key, value) = split_entry(entries[index], name)?;
                    parse_value(k, key, separator, layout, name)?;
                    parse_value(v, value, separator, layout, name)
                },
            )?;
        }

        Slot::None => return Err(Error::unsupported_kind(name, type_name, kind)),
    }

    Ok(())
}

/// Parses a boolean from the accepted literal set.
///
/// # Errors
///
/// Returns [`Error::Conversion`] for anything outside the literal set.
pub fn parse_bool(raw: &str, name: &str) -> Result<bool, Error> {
    if TRUE_LITERALS.contains(&raw) {
        Ok(true)
    } else if FALSE_LITERALS.contains(&raw) {
        Ok(false)
    } else {
        Err(Error::conversion(
            name,
            raw,
            "bool",
            format!("invalid boolean literal {raw:?}"),
        ))
    }
}

/// Parses a base-10 integer or decimal float of the exact target type.
fn parse_number<T>(raw: &str, name: &str, expected: &'static str) -> Result<T, Error>
where
    T: FromStr,
    T::Err: Into<BoxError>,
{
    raw.parse::<T>()
        .map_err(|e| Error::conversion(name, raw, expected, e))
}

/// Splits a map entry into exactly one key and one value.
fn split_entry<'r>(entry: &'r str, name: &str) -> Result<(&'r str, &'r str), Error> {
    let mut parts = entry.split('=');

    match (parts.next(), parts.next(), parts.next()) {
        (Some(key), Some(value), None) => Ok((key, value)),
        _ => Err(Error::conversion(
            name,
            entry,
            "key=value",
            format!("invalid map item: {entry:?}"),
        )),
    }
}
