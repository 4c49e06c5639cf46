//! The field model: a small reflective type system for bindable values.
//!
//! Every value the engine can write into implements [`Field`]. A field
//! reports its [`Kind`], whether it currently holds its type's zero value,
//! and hands out a typed [`Slot`] the parser writes through. Capabilities
//! that only some types have are surfaced as optional accessors:
//!
//! | Accessor | Capability |
//! |----------|------------|
//! | [`Field::as_setter`] | The type parses its own text format ([`Setter`]) |
//! | [`Field::as_bindable`] | The type is a struct with bindable fields |
//!
//! # Built-in Fields
//!
//! | Kind | Rust Types |
//! |------|------------|
//! | `Bool` | `bool` |
//! | `Int` | `i8` - `i64`, `isize` |
//! | `Uint` | `u8` - `u64`, `usize` |
//! | `Float` | `f32`, `f64` |
//! | `String` | `String` |
//! | `Seq` | `Vec<T>` |
//! | `Map` | `HashMap<K, V>`, `BTreeMap<K, V>` |
//! | `Opaque` | chrono timestamps, `url::Url`, `Option<Url>`, `Option<chrono_tz::Tz>` |
//!
//! Opaque types are bound through the [converter registry](crate::registry).
//!
//! # Custom Types
//!
//! ```rust,ignore
//! #[derive(Default, PartialEq)]
//! struct Level(u8);
//!
//! impl envbind::Setter for Level {
//!     fn set_value(&mut self, raw: &str) -> Result<(), envbind::BoxError> {
//!         self.0 = match raw {
//!             "low" => 1,
//!             "high" => 9,
//!             other => return Err(format!("unknown level {other}").into()),
//!         };
//!         Ok(())
//!     }
//! }
//!
//! envbind::impl_setter_field!(Level);
//! ```

use std::any::{Any, TypeId};
use std::collections::{BTreeMap, HashMap};
use std::fmt::{self, Display, Formatter};
use std::hash::{BuildHasher, Hash};

use crate::Error;
use crate::meta::Bindable;

/// Boxed error returned by user hooks ([`Setter`], [`Updater`], converters).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The runtime kind of a bindable field.
///
/// The parser switches on the kind to pick a conversion; the metadata reader
/// uses it to decide whether a field is a nested structure.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Kind {
    /// `bool`.
    Bool,

    /// Signed integer of the given bit width.
    Int {
        /// Width in bits.
        bits: u32,
    },

    /// Unsigned integer of the given bit width.
    Uint {
        /// Width in bits.
        bits: u32,
    },

    /// Floating point number of the given bit width.
    Float {
        /// Width in bits.
        bits: u32,
    },

    /// `String`.
    String,

    /// Ordered sequence (`Vec<T>`).
    Seq,

    /// Key-value mapping.
    Map,

    /// A struct with bindable fields.
    Struct,

    /// A value with no built-in parser (registered leaf types, setters).
    Opaque,
}

impl Display for Kind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => write!(f, "bool"),

            Self::Int { bits } => write!(f, "i{bits}"),

            Self::Uint { bits } => write!(f, "u{bits}"),

            Self::Float { bits } => write!(f, "f{bits}"),

            Self::String => write!(f, "string"),

            Self::Seq => write!(f, "sequence"),

            Self::Map => write!(f, "map"),

            Self::Struct => write!(f, "struct"),

            Self::Opaque => write!(f, "opaque"),
        }
    }
}

/// Typed write access to a field's storage.
///
/// Returned by [`Field::slot`]. Kinds without a built-in parser return
/// [`Slot::None`].
pub enum Slot<'a> {
    /// `bool` storage.
    Bool(&'a mut bool),
    /// `i8` storage.
    I8(&'a mut i8),
    /// `i16` storage.
    I16(&'a mut i16),
    /// `i32` storage.
    I32(&'a mut i32),
    /// `i64` storage.
    I64(&'a mut i64),
    /// `isize` storage.
    Isize(&'a mut isize),
    /// `u8` storage.
    U8(&'a mut u8),
    /// `u16` storage.
    U16(&'a mut u16),
    /// `u32` storage.
    U32(&'a mut u32),
    /// `u64` storage.
    U64(&'a mut u64),
    /// `usize` storage.
    Usize(&'a mut usize),
    /// `f32` storage.
    F32(&'a mut f32),
    /// `f64` storage.
    F64(&'a mut f64),
    /// `String` storage.
    String(&'a mut String),
    /// Sequence storage.
    Seq(&'a mut dyn SeqSlot),
    /// Mapping storage.
    Map(&'a mut dyn MapSlot),
    /// No built-in storage access.
    None,
}

/// Object-safe access to the concrete type behind a `dyn Field`.
///
/// Implemented for every `'static` type; never implement it by hand. Call
/// [`as_any`](Self::as_any) and [`type_name`](Self::type_name) through a
/// `&dyn Field`, not a `&mut dyn Field`: method lookup on the latter
/// resolves to the reference type itself.
pub trait AsAny: Any {
    /// Returns `self` as `&dyn Any`.
    fn as_any(&self) -> &dyn Any;

    /// Returns `self` as `&mut dyn Any`.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Returns the concrete type name, for diagnostics.
    fn type_name(&self) -> &'static str;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// The [`TypeId`] of the concrete value behind `field`.
pub(crate) fn type_id_of(field: &dyn Field) -> TypeId {
    field.as_any().type_id()
}

/// A value the binding engine can write into.
///
/// Derived structs implement this through `#[derive(Bindable)]`; leaf types
/// use [`impl_leaf_field!`](crate::impl_leaf_field) or
/// [`impl_setter_field!`](crate::impl_setter_field).
pub trait Field: AsAny {
    /// The runtime kind of this value.
    fn kind(&self) -> Kind;

    /// Whether the value equals its type's zero value.
    ///
    /// Defaults only apply to zero fields, and required fields only fail
    /// when they are zero.
    fn is_zero(&self) -> bool;

    /// Typed storage access for the built-in kind parsers.
    fn slot(&mut self) -> Slot<'_>;

    /// The single-value setter capability, if the type has one.
    fn as_setter(&mut self) -> Option<&mut dyn Setter> {
        None
    }

    /// The nested-structure capability, if the type is a bindable struct.
    fn as_bindable(&mut self) -> Option<&mut dyn Bindable> {
        None
    }
}

/// A type that parses its own textual representation.
///
/// Preferred over the registry and the built-in kind parsers.
pub trait Setter {
    /// Replaces the value with the one parsed from `raw`.
    ///
    /// # Errors
    ///
    /// Returns an error when `raw` is not a valid representation.
    fn set_value(&mut self, raw: &str) -> Result<(), BoxError>;
}

/// A whole-structure refresh hook, run before per-field binding.
///
/// Wire it up with `#[env_config(updater)]` on the root struct.
pub trait Updater {
    /// Runs the refresh.
    ///
    /// # Errors
    ///
    /// Any error aborts the binding pass.
    fn update(&mut self) -> Result<(), BoxError>;
}

// ============================================================================
// Collection Slots
// ============================================================================

/// Callback parsing into the freshly created element at an index.
pub type ElementFill<'f> = dyn FnMut(usize, &mut dyn Field) -> Result<(), Error> + 'f;

/// Write access to a sequence field.
pub trait SeqSlot {
    /// Creates `len` zero elements, lets `fill` parse into each, then
    /// replaces the contents.
    ///
    /// # Errors
    ///
    /// Propagates the first error from `fill`; the sequence is untouched in
    /// that case.
    fn replace_with(&mut self, len: usize, fill: &mut ElementFill<'_>) -> Result<(), Error>;
}

/// Callback parsing into the freshly created key and value of an entry.
pub type EntryFill<'f> =
    dyn FnMut(usize, &mut dyn Field, &mut dyn Field) -> Result<(), Error> + 'f;

/// Write access to a mapping field.
pub trait MapSlot {
    /// Creates `len` zero entries, lets `fill` parse into each, then
    /// replaces the contents. Later entries win on duplicate keys.
    ///
    /// # Errors
    ///
    /// Propagates the first error from `fill`; the map is untouched in that
    /// case.
    fn replace_with(&mut self, len: usize, fill: &mut EntryFill<'_>) -> Result<(), Error>;
}

fn fill_entries<K, V>(len: usize, fill: &mut EntryFill<'_>) -> Result<Vec<(K, V)>, Error>
where
    K: Field + Default,
    V: Field + Default,
{
    (0..len)
        .map(|index| {
            let mut key = K::default();
            let mut value = V::default();
            fill(index, &mut key, &mut value)?;
            Ok((key, value))
        })
        .collect()
}

impl<T: Field + Default> SeqSlot for Vec<T> {
    fn replace_with(&mut self, len: usize, fill: &mut ElementFill<'_>) -> Result<(), Error> {
        let fresh = (0..len)
            .map(|index| {
                let mut element = T::default();
                fill(index, &mut element)?;
                Ok(element)
            })
            .collect::<Result<Self, Error>>()?;

        *self = fresh;
        Ok(())
    }
}

impl<K, V, S> MapSlot for HashMap<K, V, S>
where
    K: Field + Default + Eq + Hash,
    V: Field + Default,
    S: BuildHasher,
{
    fn replace_with(&mut self, len: usize, fill: &mut EntryFill<'_>) -> Result<(), Error> {
        let entries = fill_entries(len, fill)?;

        self.clear();
        self.extend(entries);
        Ok(())
    }
}

impl<K, V> MapSlot for BTreeMap<K, V>
where
    K: Field + Default + Ord,
    V: Field + Default,
{
    fn replace_with(&mut self, len: usize, fill: &mut EntryFill<'_>) -> Result<(), Error> {
        *self = fill_entries(len, fill)?.into_iter().collect();
        Ok(())
    }
}

// ============================================================================
// Built-in Field Implementations
// ============================================================================

/// Generates `Field` for integer types.
macro_rules! impl_integer_field {
    ($kind:ident: $($t:ty => $slot:ident),+ $(,)?) => {
        $(
            impl Field for $t {
                fn kind(&self) -> Kind {
                    Kind::$kind { bits: <$t>::BITS }
                }

                fn is_zero(&self) -> bool {
                    *self == 0
                }

                fn slot(&mut self) -> Slot<'_> {
                    Slot::$slot(self)
                }
            }
        )+
    };
}

impl_integer_field!(Int: i8 => I8, i16 => I16, i32 => I32, i64 => I64, isize => Isize);
impl_integer_field!(Uint: u8 => U8, u16 => U16, u32 => U32, u64 => U64, usize => Usize);

impl Field for bool {
    fn kind(&self) -> Kind {
        Kind::Bool
    }

    fn is_zero(&self) -> bool {
        !*self
    }

    fn slot(&mut self) -> Slot<'_> {
        Slot::Bool(self)
    }
}

impl Field for f32 {
    fn kind(&self) -> Kind {
        Kind::Float { bits: 32 }
    }

    fn is_zero(&self) -> bool {
        *self == 0.0
    }

    fn slot(&mut self) -> Slot<'_> {
        Slot::F32(self)
    }
}

impl Field for f64 {
    fn kind(&self) -> Kind {
        Kind::Float { bits: 64 }
    }

    fn is_zero(&self) -> bool {
        *self == 0.0
    }

    fn slot(&mut self) -> Slot<'_> {
        Slot::F64(self)
    }
}

impl Field for String {
    fn kind(&self) -> Kind {
        Kind::String
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }

    fn slot(&mut self) -> Slot<'_> {
        Slot::String(self)
    }
}

impl<T: Field + Default> Field for Vec<T> {
    fn kind(&self) -> Kind {
        Kind::Seq
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }

    fn slot(&mut self) -> Slot<'_> {
        Slot::Seq(self)
    }
}

impl<K, V, S> Field for HashMap<K, V, S>
where
    K: Field + Default + Eq + Hash,
    V: Field + Default,
    S: BuildHasher + 'static,
{
    fn kind(&self) -> Kind {
        Kind::Map
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }

    fn slot(&mut self) -> Slot<'_> {
        Slot::Map(self)
    }
}

impl<K, V> Field for BTreeMap<K, V>
where
    K: Field + Default + Ord,
    V: Field + Default,
{
    fn kind(&self) -> Kind {
        Kind::Map
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }

    fn slot(&mut self) -> Slot<'_> {
        Slot::Map(self)
    }
}

// ============================================================================
// Leaf Types
// ============================================================================

/// Implements [`Field`] for an opaque leaf type bound through the converter
/// registry.
///
/// The second argument is the zero test, written as a closure over `&Self`.
///
/// ```rust,ignore
/// envbind::impl_leaf_field!(MyId, |id| id.0 == 0);
/// envbind::registry::register::<MyId, _, _>(|raw, _layout| raw.parse::<u64>().map(MyId));
/// ```
#[macro_export]
macro_rules! impl_leaf_field {
    ($ty:ty, |$value:ident| $zero:expr) => {
        impl $crate::Field for $ty {
            fn kind(&self) -> $crate::Kind {
                $crate::Kind::Opaque
            }

            fn is_zero(&self) -> bool {
                let $value = self;
                $zero
            }

            fn slot(&mut self) -> $crate::Slot<'_> {
                $crate::Slot::None
            }
        }
    };
}

/// Implements [`Field`] for a type that implements [`Setter`].
///
/// The type must also implement `Default` and `PartialEq`; the zero value is
/// `Default::default()`.
#[macro_export]
macro_rules! impl_setter_field {
    ($ty:ty) => {
        impl $crate::Field for $ty {
            fn kind(&self) -> $crate::Kind {
                $crate::Kind::Opaque
            }

            fn is_zero(&self) -> bool {
                *self == <$ty as ::core::default::Default>::default()
            }

            fn slot(&mut self) -> $crate::Slot<'_> {
                $crate::Slot::None
            }

            fn as_setter(&mut self) -> ::core::option::Option<&mut dyn $crate::Setter> {
                ::core::option::Option::Some(self)
            }
        }
    };
}

impl_leaf_field!(chrono::DateTime<chrono::FixedOffset>, |v| v.timestamp() == 0
    && v.timestamp_subsec_nanos() == 0);
impl_leaf_field!(chrono::DateTime<chrono::Utc>, |v| v.timestamp() == 0
    && v.timestamp_subsec_nanos() == 0);
impl_leaf_field!(chrono::NaiveDateTime, |v| *v == chrono::NaiveDateTime::default());
impl_leaf_field!(url::Url, |_v| false);
impl_leaf_field!(Option<url::Url>, |v| v.is_none());
impl_leaf_field!(Option<chrono_tz::Tz>, |v| v.is_none());
