//! Struct metadata: field specs and the descriptor walk.
//!
//! A bindable struct exposes its fields as [`FieldEntry`] values, each pairing
//! the static [`FieldSpec`] written in `#[env(...)]` with mutable access to
//! the field. [`read_metadata`] walks the root and every nested struct and
//! flattens them into one ordered list of [`Descriptor`]s.
//!
//! # Traversal Order
//!
//! Structs are expanded through a work queue. The root's fields come first,
//! in declaration order; each nested struct's fields follow in the order the
//! nested structs were reached.
//!
//! ```text
//! Config { name, db: Db { host, port }, cache: Cache { ttl } }
//!
//! descriptors: name, db.host, db.port, cache.ttl
//! ```
//!
//! # Prefix Composition
//!
//! A nested field's `prefix` is appended to the prefix accumulated so far,
//! and every environment name declared inside it is prefixed with the result.
//! `prefix = "DB_"` on `db` turns `var = "HOST"` into `DB_HOST`.

use std::any::TypeId;
use std::collections::{HashSet, VecDeque};
use std::fmt::{self, Debug, Formatter};

use crate::Error;
use crate::field::{Field, Kind, Updater, type_id_of};
use crate::registry;

/// Separator used for sequences and maps when the field declares none.
pub const DEFAULT_SEPARATOR: &str = ",";

/// The static annotation record of one field.
///
/// Emitted by `#[derive(Bindable)]`; hand-written impls build it with the
/// `const` builder methods.
///
/// ```rust
/// use envbind::FieldSpec;
///
/// const PORT: FieldSpec = FieldSpec::new("port")
///     .env("PORT,HTTP_PORT")
///     .default_value("8080")
///     .required();
///
/// assert_eq!(PORT.env_names("APP_"), vec!["APP_PORT", "APP_HTTP_PORT"]);
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct FieldSpec {
    /// Display name used in errors.
    pub name: &'static str,

    /// Raw comma-separated environment variable list.
    pub env: Option<&'static str>,

    /// Layout hint passed to registered converters.
    pub layout: Option<&'static str>,

    /// Raw default value.
    pub default: Option<&'static str>,

    /// List and map separator override.
    pub separator: Option<&'static str>,

    /// Free-text description.
    pub description: Option<&'static str>,

    /// Bound during update-only passes.
    pub updatable: bool,

    /// Fails the pass when unresolved and zero.
    pub required: bool,

    /// Prefix added to names inside a nested struct.
    pub prefix: Option<&'static str>,
}

impl FieldSpec {
    /// A spec with only a display name.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            env: None,
            layout: None,
            default: None,
            separator: None,
            description: None,
            updatable: false,
            required: false,
            prefix: None,
        }
    }

    /// Sets the comma-separated environment variable list.
    #[must_use]
    pub const fn env(mut self, env: &'static str) -> Self {
        self.env = Some(env);
        self
    }

    /// Sets the layout hint.
    #[must_use]
    pub const fn layout(mut self, layout: &'static str) -> Self {
        self.layout = Some(layout);
        self
    }

    /// Sets the raw default value.
    #[must_use]
    pub const fn default_value(mut self, default: &'static str) -> Self {
        self.default = Some(default);
        self
    }

    /// Sets the separator for sequences and maps.
    #[must_use]
    pub const fn separator(mut self, separator: &'static str) -> Self {
        self.separator = Some(separator);
        self
    }

    /// Sets the description.
    #[must_use]
    pub const fn description(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }

    /// Marks the field as updatable.
    #[must_use]
    pub const fn updatable(mut self) -> Self {
        self.updatable = true;
        self
    }

    /// Marks the field as required.
    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets the prefix for a nested struct.
    #[must_use]
    pub const fn prefix(mut self, prefix: &'static str) -> Self {
        self.prefix = Some(prefix);
        self
    }

    /// The environment names to look up, each prefixed with `prefix`.
    ///
    /// An absent or empty list yields no names.
    #[must_use]
    pub fn env_names(&self, prefix: &str) -> Vec<String> {
        match self.env {
            Some(raw) if !raw.is_empty() => raw
                .split(',')
                .map(|name| format!("{prefix}{name}"))
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// One field of a bindable struct: its spec and mutable access to it.
pub struct FieldEntry<'a> {
    /// The field's annotations.
    pub spec: FieldSpec,

    /// The field's storage.
    pub value: &'a mut dyn Field,
}

impl<'a> FieldEntry<'a> {
    /// Pairs a spec with the field it describes.
    pub fn new(spec: FieldSpec, value: &'a mut dyn Field) -> Self {
        Self { spec, value }
    }
}

/// A struct whose fields can be bound.
///
/// Implemented by `#[derive(Bindable)]`. Fields tagged `#[env(skip)]` are
/// left out of [`fields`](Self::fields).
pub trait Bindable: Field {
    /// The bindable fields, in declaration order.
    fn fields(&mut self) -> Vec<FieldEntry<'_>>;

    /// The whole-structure refresh hook, if the struct has one.
    fn as_updater(&mut self) -> Option<&mut dyn Updater> {
        None
    }
}

/// Binding metadata for one field, produced per pass.
pub struct Descriptor<'a> {
    /// The field's storage.
    pub value: &'a mut dyn Field,

    /// Environment names to look up; the first one set wins.
    pub env: Vec<String>,

    /// Display name used in errors.
    pub name: &'static str,

    /// Raw default, applied only while the field is zero.
    pub default: Option<&'static str>,

    /// Layout hint for registered converters.
    pub layout: Option<&'static str>,

    /// List and map separator.
    pub separator: &'static str,

    /// Free-text description.
    pub description: Option<&'static str>,

    /// Bound during update-only passes.
    pub updatable: bool,

    /// Fails the pass when unresolved and zero.
    pub required: bool,
}

impl<'a> Descriptor<'a> {
    fn new(spec: FieldSpec, value: &'a mut dyn Field, prefix: &str) -> Self {
        Self {
            value,
            env: spec.env_names(prefix),
            name: spec.name,
            default: spec.default,
            layout: spec.layout,
            separator: spec.separator.unwrap_or(DEFAULT_SEPARATOR),
            description: spec.description,
            updatable: spec.updatable,
            required: spec.required,
        }
    }
}

impl Debug for Descriptor<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let value: &dyn Field = &*self.value;

        f.debug_struct("Descriptor")
            .field("name", &self.name)
            .field("type", &value.type_name())
            .field("env", &self.env)
            .field("default", &self.default)
            .field("layout", &self.layout)
            .field("separator", &self.separator)
            .field("updatable", &self.updatable)
            .field("required", &self.required)
            .finish_non_exhaustive()
    }
}

/// Owned field metadata, for help output.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldInfo {
    /// Display name.
    pub name: &'static str,

    /// Environment names, fully prefixed.
    pub env: Vec<String>,

    /// Raw default value.
    pub default: Option<&'static str>,

    /// Layout hint.
    pub layout: Option<&'static str>,

    /// Free-text description.
    pub description: Option<&'static str>,

    /// Bound during update-only passes.
    pub updatable: bool,

    /// Fails the pass when unresolved and zero.
    pub required: bool,
}

impl From<&Descriptor<'_>> for FieldInfo {
    fn from(descriptor: &Descriptor<'_>) -> Self {
        Self {
            name: descriptor.name,
            env: descriptor.env.clone(),
            default: descriptor.default,
            layout: descriptor.layout,
            description: descriptor.description,
            updatable: descriptor.updatable,
            required: descriptor.required,
        }
    }
}

/// Flattens `root` and its nested structs into descriptors.
///
/// Types with a registered converter are leaves even when they are structs.
/// Reading metadata never changes a stored value.
///
/// # Errors
///
/// - [`Error::UnsupportedRootKind`] when `root` is not a bindable struct.
/// - [`Error::UnsupportedFieldKind`] when a field reports [`Kind::Struct`]
///   but is not bindable.
/// - [`Error::CyclicStructure`] when the same struct instance is reached
///   twice.
pub fn read_metadata(root: &mut dyn Field) -> Result<Vec<Descriptor<'_>>, Error> {
    let shared: &dyn Field = &*root;
    let (type_name, kind) = (shared.type_name(), shared.kind());

    let root = root
        .as_bindable()
        .ok_or(Error::UnsupportedRootKind { type_name, kind })?;

    let mut queue = VecDeque::from([(root, String::new())]);
    let mut visited: HashSet<(usize, TypeId)> = HashSet::new();
    let mut descriptors = Vec::new();

    while let Some((node, prefix)) = queue.pop_front() {
        let shared: &dyn Field = &*node;
        // Owned fields never alias, so only a `Bindable` impl that hands out
        // the same struct twice (through unsafe code) trips this.
        if std::mem::size_of_val(shared) != 0 {
            let address = std::ptr::from_ref(shared).cast::<()>() as usize;
            if !visited.insert((address, type_id_of(shared))) {
                return Err(Error::CyclicStructure {
                    type_name: shared.type_name(),
                });
            }
        }

        for FieldEntry { spec, value } in node.fields() {
            let shared: &dyn Field = &*value;
            let registered = registry::is_registered(type_id_of(shared));

            if !registered && shared.kind() == Kind::Struct {
                let type_name = shared.type_name();
                let nested = value.as_bindable().ok_or_else(|| {
                    Error::unsupported_kind(spec.name, type_name, Kind::Struct)
                })?;

                let nested_prefix = format!("{prefix}{}", spec.prefix.unwrap_or_default());
                queue.push_back((nested, nested_prefix));
                continue;
            }

            descriptors.push(Descriptor::new(spec, value, &prefix));
        }
    }

    tracing::trace!(
        root = type_name,
        count = descriptors.len(),
        "read structure metadata"
    );

    Ok(descriptors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Slot;

    #[derive(Default)]
    struct Db {
        host: String,
        port: u16,
    }

    impl Field for Db {
        fn kind(&self) -> Kind {
            Kind::Struct
        }

        fn is_zero(&self) -> bool {
            self.host.is_zero() && self.port.is_zero()
        }

        fn slot(&mut self) -> Slot<'_> {
            Slot::None
        }

        fn as_bindable(&mut self) -> Option<&mut dyn Bindable> {
            Some(self)
        }
    }

    impl Bindable for Db {
        fn fields(&mut self) -> Vec<FieldEntry<'_>> {
            vec![
                FieldEntry::new(FieldSpec::new("host").env("HOST"), &mut self.host),
                FieldEntry::new(
                    FieldSpec::new("port").env("PORT").default_value("5432"),
                    &mut self.port,
                ),
            ]
        }
    }

    #[derive(Default)]
    struct App {
        name: String,
        primary: Db,
        tags: Vec<String>,
        replica: Db,
    }

    impl Field for App {
        fn kind(&self) -> Kind {
            Kind::Struct
        }

        fn is_zero(&self) -> bool {
            self.name.is_zero()
        }

        fn slot(&mut self) -> Slot<'_> {
            Slot::None
        }

        fn as_bindable(&mut self) -> Option<&mut dyn Bindable> {
            Some(self)
        }
    }

    impl Bindable for App {
        fn fields(&mut self) -> Vec<FieldEntry<'_>> {
            vec![
                FieldEntry::new(FieldSpec::new("name").env("NAME,APP_NAME"), &mut self.name),
                FieldEntry::new(FieldSpec::new("primary").prefix("DB_"), &mut self.primary),
                FieldEntry::new(
                    FieldSpec::new("tags").env("TAGS").separator(";").updatable(),
                    &mut self.tags,
                ),
                FieldEntry::new(FieldSpec::new("replica").prefix("REPLICA_"), &mut self.replica),
            ]
        }
    }

    #[test]
    fn test_env_names() {
        let spec = FieldSpec::new("x").env("A,B");
        assert_eq!(spec.env_names("P_"), vec!["P_A", "P_B"]);
        assert!(FieldSpec::new("x").env_names("P_").is_empty());
        assert!(FieldSpec::new("x").env("").env_names("P_").is_empty());
    }

    #[test]
    fn test_queue_order_and_prefixes() {
        let mut app = App::default();
        let descriptors = read_metadata(&mut app).unwrap();

        let names: Vec<_> = descriptors.iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["name", "tags", "host", "port", "host", "port"]);

        let envs: Vec<_> = descriptors.iter().map(|d| d.env.join("|")).collect();
        assert_eq!(
            envs,
            vec![
                "NAME|APP_NAME",
                "TAGS",
                "DB_HOST",
                "DB_PORT",
                "REPLICA_HOST",
                "REPLICA_PORT"
            ]
        );
    }

    #[test]
    fn test_descriptor_defaults() {
        let mut app = App::default();
        let descriptors = read_metadata(&mut app).unwrap();

        let tags = &descriptors[1];
        assert_eq!(tags.separator, ";");
        assert!(tags.updatable);
        assert!(!tags.required);

        let name = &descriptors[0];
        assert_eq!(name.separator, DEFAULT_SEPARATOR);
        assert_eq!(descriptors[3].default, Some("5432"));
    }

    #[test]
    fn test_metadata_does_not_touch_values() {
        let mut app = App {
            name: "kept".into(),
            ..App::default()
        };
        let count = read_metadata(&mut app).unwrap().len();
        assert_eq!(count, 6);
        assert_eq!(app.name, "kept");
        assert_eq!(app.primary.port, 0);
    }

    #[test]
    fn test_non_struct_root_rejected() {
        let mut value = 5u32;
        let err = read_metadata(&mut value).unwrap_err();

        let Error::UnsupportedRootKind { kind, .. } = err else {
            panic!("Expected UnsupportedRootKind variant");
        };
        assert_eq!(kind, Kind::Uint { bits: 32 });
    }

    #[derive(Default)]
    struct Opaque {
        secret: u8,
    }

    impl Field for Opaque {
        fn kind(&self) -> Kind {
            Kind::Struct
        }

        fn is_zero(&self) -> bool {
            self.secret == 0
        }

        fn slot(&mut self) -> Slot<'_> {
            Slot::None
        }
    }

    #[derive(Default)]
    struct Holder {
        label: String,
        inner: Opaque,
    }

    impl Field for Holder {
        fn kind(&self) -> Kind {
            Kind::Struct
        }

        fn is_zero(&self) -> bool {
            self.label.is_zero()
        }

        fn slot(&mut self) -> Slot<'_> {
            Slot::None
        }

        fn as_bindable(&mut self) -> Option<&mut dyn Bindable> {
            Some(self)
        }
    }

    impl Bindable for Holder {
        fn fields(&mut self) -> Vec<FieldEntry<'_>> {
            vec![
                FieldEntry::new(FieldSpec::new("label").env("LABEL"), &mut self.label),
                FieldEntry::new(FieldSpec::new("inner"), &mut self.inner),
            ]
        }
    }

    #[test]
    fn test_struct_field_without_bindable_rejected() {
        let mut holder = Holder::default();
        let err = read_metadata(&mut holder).unwrap_err();

        let Error::UnsupportedFieldKind {
            field,
            type_name,
            kind,
        } = err
        else {
            panic!("Expected UnsupportedFieldKind variant");
        };
        assert_eq!(field, "inner");
        assert!(type_name.ends_with("Opaque"), "{type_name}");
        assert_eq!(kind, Kind::Struct);
    }

    #[test]
    fn test_field_info_from_descriptor() {
        let mut db = Db::default();
        let descriptors = read_metadata(&mut db).unwrap();
        let info = FieldInfo::from(&descriptors[1]);

        assert_eq!(info.name, "port");
        assert_eq!(info.env, vec!["PORT"]);
        assert_eq!(info.default, Some("5432"));
    }
}
