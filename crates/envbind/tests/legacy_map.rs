//! Flat key-value binding with `legacy::load_map`.

#![allow(clippy::pedantic)]

use std::collections::HashMap;

use envbind::{Bindable, Error, Kind};

#[derive(Bindable, Debug, Default)]
struct Flat {
    #[env(var = "FLAT_PORT", default = "9999")]
    port: u16,

    offset: i32,

    host: String,

    verbose: bool,

    peers: Vec<String>,

    nested: Nested,
}

#[derive(Bindable, Debug, Default)]
struct Nested {
    level: u8,
}

fn map(entries: &[(&str, &str)]) -> HashMap<String, String> {
    entries
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

#[test]
fn test_copies_matching_fields() {
    let values = map(&[
        ("port", "8080"),
        ("offset", "-3"),
        ("host", "example.org"),
        ("verbose", "TRUE"),
        ("unknown", "ignored"),
    ]);

    let mut cfg = Flat::default();
    envbind::legacy::load_map(&values, &mut cfg).unwrap();

    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.offset, -3);
    assert_eq!(cfg.host, "example.org");
    assert!(cfg.verbose);
}

#[test]
fn test_ignores_annotations() {
    let mut cfg = Flat::default();
    envbind::legacy::load_map(&HashMap::new(), &mut cfg).unwrap();

    assert_eq!(cfg.port, 0, "defaults are not applied");
}

#[test]
fn test_matched_sequence_is_unsupported() {
    let values = map(&[("peers", "a,b")]);

    let mut cfg = Flat::default();
    let err = envbind::legacy::load_map(&values, &mut cfg).unwrap_err();

    let Error::UnsupportedFieldKind { field, kind, .. } = err else {
        panic!("Expected UnsupportedFieldKind variant");
    };
    assert_eq!(field, "peers");
    assert_eq!(kind, Kind::Seq);
}

#[test]
fn test_nested_struct_not_entered() {
    let values = map(&[("level", "3")]);

    let mut cfg = Flat::default();
    envbind::legacy::load_map(&values, &mut cfg).unwrap();
    assert_eq!(cfg.nested.level, 0);

    let values = map(&[("nested", "3")]);
    let err = envbind::legacy::load_map(&values, &mut cfg).unwrap_err();
    assert!(matches!(err, Error::UnsupportedFieldKind { .. }));
}

#[test]
fn test_bad_values_fail() {
    let mut cfg = Flat::default();

    let err = envbind::legacy::load_map(&map(&[("port", "high")]), &mut cfg).unwrap_err();
    assert!(matches!(err, Error::Conversion { .. }));

    let err = envbind::legacy::load_map(&map(&[("verbose", "yes")]), &mut cfg).unwrap_err();
    assert!(matches!(err, Error::Conversion { .. }));
}
