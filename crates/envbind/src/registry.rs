//! Process-wide converter registry for leaf types.
//!
//! The registry maps a concrete type to a converter that owns parsing for
//! that type. Registered types are *leaves*: the metadata reader never
//! recurses into them and the parser never applies its kind-based rules to
//! them. Lookup is by exact [`TypeId`]; there is no structural matching.
//!
//! # Built-in Entries
//!
//! | Type | Format |
//! |------|--------|
//! | `chrono::DateTime<FixedOffset>` | RFC 3339, or the field's `layout` (strftime) |
//! | `chrono::DateTime<Utc>` | RFC 3339, or the field's `layout` (strftime) |
//! | `chrono::NaiveDateTime` | RFC 3339, or the field's `layout` (strftime) |
//! | `url::Url`, `Option<url::Url>` | Absolute URL |
//! | `Option<chrono_tz::Tz>` | IANA timezone name, empty means UTC |
//!
//! # Registration
//!
//! The table is created with the built-ins on first access and is
//! append-only afterwards: [`register`] never replaces an entry and there is
//! no removal. Register custom types before the first binding pass.
//!
//! ```rust,ignore
//! #[derive(Debug, PartialEq)]
//! struct Port(u16);
//!
//! envbind::impl_leaf_field!(Port, |p| p.0 == 0);
//!
//! envbind::registry::register::<Port, _, _>(|raw, _layout| raw.parse::<u16>().map(Port));
//! ```

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Arc, LazyLock};

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use parking_lot::RwLock;
use url::Url;

use crate::field::BoxError;

/// A type-erased converter: writes the value parsed from `raw` into `target`.
///
/// The optional second string is the field's layout hint.
pub type Converter =
    Arc<dyn Fn(&mut dyn Any, &str, Option<&str>) -> Result<(), BoxError> + Send + Sync>;

static REGISTRY: LazyLock<RwLock<HashMap<TypeId, Converter>>> =
    LazyLock::new(|| RwLock::new(builtins()));

/// Forces creation of the registry with its built-in entries.
///
/// Binding passes initialise the registry on demand; calling this up front
/// only moves that cost to a predictable point during startup.
pub fn init() {
    LazyLock::force(&REGISTRY);
}

/// Registers a converter for `T`.
///
/// Returns `false`, leaving the existing entry in place, if `T` already has
/// a converter.
pub fn register<T, F, E>(convert: F) -> bool
where
    T: Any,
    F: Fn(&str, Option<&str>) -> Result<T, E> + Send + Sync + 'static,
    E: Into<BoxError>,
{
    let converter = typed(convert);

    match REGISTRY.write().entry(TypeId::of::<T>()) {
        Entry::Occupied(_) => {
            tracing::debug!(
                type_name = std::any::type_name::<T>(),
                "converter already registered"
            );
            false
        }

        Entry::Vacant(slot) => {
            slot.insert(converter);
            tracing::debug!(type_name = std::any::type_name::<T>(), "converter registered");
            true
        }
    }
}

/// Returns the converter registered for `type_id`.
///
/// The converter is cloned out so it runs without holding the registry lock.
#[must_use]
pub fn lookup(type_id: TypeId) -> Option<Converter> {
    REGISTRY.read().get(&type_id).cloned()
}

/// Whether a converter is registered for `type_id`.
#[must_use]
pub fn is_registered(type_id: TypeId) -> bool {
    REGISTRY.read().contains_key(&type_id)
}

/// Wraps a typed parse function into a [`Converter`].
fn typed<T, F, E>(convert: F) -> Converter
where
    T: Any,
    F: Fn(&str, Option<&str>) -> Result<T, E> + Send + Sync + 'static,
    E: Into<BoxError>,
{
    Arc::new(move |target: &mut dyn Any, raw: &str, layout: Option<&str>| {
        let slot = target.downcast_mut::<T>().ok_or_else(|| {
            BoxError::from(format!(
                "converter target is not a {}",
                std::any::type_name::<T>()
            ))
        })?;

        *slot = convert(raw, layout).map_err(Into::into)?;
        Ok(())
    })
}

fn builtins() -> HashMap<TypeId, Converter> {
    let mut table: HashMap<TypeId, Converter> = HashMap::new();

    table.insert(
        TypeId::of::<DateTime<FixedOffset>>(),
        typed(|raw: &str, layout: Option<&str>| parse_timestamp(raw, layout)),
    );
    table.insert(
        TypeId::of::<DateTime<Utc>>(),
        typed(|raw: &str, layout: Option<&str>| {
            parse_timestamp(raw, layout).map(|dt| dt.with_timezone(&Utc))
        }),
    );
    table.insert(
        TypeId::of::<NaiveDateTime>(),
        typed(|raw: &str, layout: Option<&str>| {
            parse_timestamp(raw, layout).map(|dt| dt.naive_utc())
        }),
    );
    table.insert(
        TypeId::of::<Url>(),
        typed(|raw: &str, _: Option<&str>| Url::parse(raw)),
    );
    table.insert(
        TypeId::of::<Option<Url>>(),
        typed(|raw: &str, _: Option<&str>| Url::parse(raw).map(Some)),
    );
    table.insert(
        TypeId::of::<Option<chrono_tz::Tz>>(),
        typed(|raw: &str, _: Option<&str>| parse_location(raw).map(Some)),
    );

    table
}

/// Parses a timestamp with an optional strftime layout.
///
/// Without a layout the value must be RFC 3339. With a layout, input that
/// carries no offset is taken as UTC, and a date-only layout yields
/// midnight UTC.
///
/// # Errors
///
/// Returns the chrono parse error of the last attempted interpretation.
pub fn parse_timestamp(
    raw: &str,
    layout: Option<&str>,
) -> Result<DateTime<FixedOffset>, chrono::ParseError> {
    let Some(layout) = layout else {
        return DateTime::parse_from_rfc3339(raw);
    };

    DateTime::parse_from_str(raw, layout)
        .or_else(|_| {
            NaiveDateTime::parse_from_str(raw, layout).map(|naive| naive.and_utc().fixed_offset())
        })
        .or_else(|_| {
            NaiveDate::parse_from_str(raw, layout)
                .map(|date| date.and_time(NaiveTime::default()).and_utc().fixed_offset())
        })
}

/// Parses a named location. The empty string is UTC.
fn parse_location(raw: &str) -> Result<chrono_tz::Tz, String> {
    if raw.is_empty() {
        return Ok(chrono_tz::Tz::UTC);
    }

    raw.parse::<chrono_tz::Tz>()
        .map_err(|e| format!("unknown time zone {raw:?}: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_registered() {
        init();
        assert!(is_registered(TypeId::of::<DateTime<FixedOffset>>()));
        assert!(is_registered(TypeId::of::<DateTime<Utc>>()));
        assert!(is_registered(TypeId::of::<Url>()));
        assert!(is_registered(TypeId::of::<Option<chrono_tz::Tz>>()));
        assert!(!is_registered(TypeId::of::<String>()));
    }

    #[test]
    fn test_register_is_append_only() {
        struct Celsius(f64);

        assert!(register::<Celsius, _, _>(|raw, _| raw.parse::<f64>().map(Celsius)));
        assert!(!register::<Celsius, _, _>(|_, _| Ok::<_, BoxError>(Celsius(0.0))));

        let convert = lookup(TypeId::of::<Celsius>()).expect("registered");
        let mut value = Celsius(0.0);
        convert(&mut value, "21.5", None).expect("converts");
        assert!((value.0 - 21.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_converter_rejects_wrong_target() {
        let convert = lookup(TypeId::of::<Url>()).expect("builtin");
        let mut wrong = 0u32;
        assert!(convert(&mut wrong, "https://example.com", None).is_err());
    }

    #[test]
    fn test_parse_timestamp_default_layout() {
        let dt = parse_timestamp("2024-03-01T10:20:30+02:00", None).expect("rfc3339");
        assert_eq!(dt.offset().local_minus_utc(), 2 * 3600);
        assert!(parse_timestamp("2024-03-01", None).is_err());
    }

    #[test]
    fn test_parse_timestamp_date_layout_is_utc_midnight() {
        let dt = parse_timestamp("2024-03-01", Some("%Y-%m-%d")).expect("date layout");
        assert_eq!(dt.to_rfc3339(), "2024-03-01T00:00:00+00:00");
    }

    #[test]
    fn test_parse_timestamp_naive_layout_is_utc() {
        let dt = parse_timestamp("2024-03-01 08:15", Some("%Y-%m-%d %H:%M")).expect("naive");
        assert_eq!(dt.to_rfc3339(), "2024-03-01T08:15:00+00:00");
    }

    #[test]
    fn test_parse_location() {
        assert_eq!(parse_location("").unwrap(), chrono_tz::Tz::UTC);
        assert_eq!(
            parse_location("Europe/Berlin").unwrap(),
            chrono_tz::Tz::Europe__Berlin
        );
        assert!(parse_location("Mars/Olympus").is_err());
    }
}
