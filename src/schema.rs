//! Compile-time schema of a configuration type.
//!
//! `#[derive(Settings)]` produces a static table of [`Field`]s for a struct and
//! a `set_path` method that writes a [`FieldValue`] into the field addressed by
//! a list of field indices. Leaf field types implement [`Leaf`], which names
//! their [`Kind`] and performs the final (possibly narrowing) assignment.
//!
//! Containers are transparent: `Box<T>`, `Option<T>`, `Vec<T>` and `[T; N]`
//! expose the fields of `T` under the same indices. Writing through an absent
//! `Option` or an empty sequence fails with [`AccessError::Absent`].

use std::any::{TypeId, type_name};
use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Primitive category of a leaf field. Selects how raw text is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Int,
    Uint,
    Bool,
    Float,
    /// Strings and anything else taken verbatim.
    Str,
}

impl Kind {
    /// Parse raw command-line or environment text into a value of this kind.
    pub fn parse(self, raw: &str) -> Result<FieldValue, ConversionError> {
        let invalid = |reason: String| ConversionError {
            expected: self,
            reason,
        };
        match self {
            Kind::Int => raw
                .parse::<i64>()
                .map(FieldValue::Int)
                .map_err(|e| invalid(e.to_string())),
            Kind::Uint => raw
                .parse::<u64>()
                .map(FieldValue::Uint)
                .map_err(|e| invalid(e.to_string())),
            Kind::Bool => parse_bool(raw)
                .map(FieldValue::Bool)
                .ok_or_else(|| invalid("invalid syntax".into())),
            Kind::Float => raw
                .parse::<f64>()
                .map(FieldValue::Float)
                .map_err(|e| invalid(e.to_string())),
            Kind::Str => Ok(FieldValue::Str(raw.to_string())),
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Kind::Int => "an integer",
            Kind::Uint => "an unsigned integer",
            Kind::Bool => "a boolean",
            Kind::Float => "a float number",
            Kind::Str => "a string",
        })
    }
}

/// The spellings accepted for booleans on the command line and in the
/// environment.
fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Raw text could not be parsed as the expected kind.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("expected {expected}: {reason}")]
pub struct ConversionError {
    pub expected: Kind,
    pub reason: String,
}

/// A parsed value on its way into a leaf field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Int(i64),
    Uint(u64),
    Bool(bool),
    Float(f64),
    Str(String),
}

impl FieldValue {
    pub fn kind(&self) -> Kind {
        match self {
            FieldValue::Int(_) => Kind::Int,
            FieldValue::Uint(_) => Kind::Uint,
            FieldValue::Bool(_) => Kind::Bool,
            FieldValue::Float(_) => Kind::Float,
            FieldValue::Str(_) => Kind::Str,
        }
    }

    fn mismatch(&self, expected: Kind) -> AssignError {
        AssignError::Mismatch {
            expected,
            found: self.kind(),
        }
    }
}

/// A value could not be stored in its leaf field.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssignError {
    #[error("{value} is out of range for {target}")]
    OutOfRange { value: String, target: &'static str },

    #[error("expected {expected} value, got {found}")]
    Mismatch { expected: Kind, found: Kind },
}

/// A path could not be followed to a leaf field.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AccessError {
    #[error("field sits behind an absent value")]
    Absent,

    #[error("no field at index {0}")]
    NoSuchField(usize),

    #[error("path ends on a composite field")]
    NotALeaf,

    #[error(transparent)]
    Assign(#[from] AssignError),
}

/// A field type that directly holds a value.
pub trait Leaf {
    const KIND: Kind;

    fn assign(&mut self, value: FieldValue) -> Result<(), AssignError>;
}

macro_rules! signed_leaf {
    ($($ty:ty),*) => {$(
        impl Leaf for $ty {
            const KIND: Kind = Kind::Int;

            fn assign(&mut self, value: FieldValue) -> Result<(), AssignError> {
                let v = match value {
                    FieldValue::Int(v) => v,
                    other => return Err(other.mismatch(Kind::Int)),
                };
                *self = <$ty>::try_from(v).map_err(|_| AssignError::OutOfRange {
                    value: v.to_string(),
                    target: stringify!($ty),
                })?;
                Ok(())
            }
        }
    )*};
}

macro_rules! unsigned_leaf {
    ($($ty:ty),*) => {$(
        impl Leaf for $ty {
            const KIND: Kind = Kind::Uint;

            fn assign(&mut self, value: FieldValue) -> Result<(), AssignError> {
                let v = match value {
                    FieldValue::Uint(v) => v,
                    other => return Err(other.mismatch(Kind::Uint)),
                };
                *self = <$ty>::try_from(v).map_err(|_| AssignError::OutOfRange {
                    value: v.to_string(),
                    target: stringify!($ty),
                })?;
                Ok(())
            }
        }
    )*};
}

signed_leaf!(i8, i16, i32, i64, isize);
unsigned_leaf!(u8, u16, u32, u64, usize);

impl Leaf for f64 {
    const KIND: Kind = Kind::Float;

    fn assign(&mut self, value: FieldValue) -> Result<(), AssignError> {
        let v = match value {
            FieldValue::Float(v) => v,
            other => return Err(other.mismatch(Kind::Float)),
        };
        *self = v;
        Ok(())
    }
}

impl Leaf for f32 {
    const KIND: Kind = Kind::Float;

    fn assign(&mut self, value: FieldValue) -> Result<(), AssignError> {
        let v = match value {
            FieldValue::Float(v) => v,
            other => return Err(other.mismatch(Kind::Float)),
        };
        *self = v as f32;
        Ok(())
    }
}

impl Leaf for bool {
    const KIND: Kind = Kind::Bool;

    fn assign(&mut self, value: FieldValue) -> Result<(), AssignError> {
        let v = match value {
            FieldValue::Bool(v) => v,
            other => return Err(other.mismatch(Kind::Bool)),
        };
        *self = v;
        Ok(())
    }
}

impl Leaf for String {
    const KIND: Kind = Kind::Str;

    fn assign(&mut self, value: FieldValue) -> Result<(), AssignError> {
        let v = match value {
            FieldValue::Str(v) => v,
            other => return Err(other.mismatch(Kind::Str)),
        };
        *self = v;
        Ok(())
    }
}

impl Leaf for PathBuf {
    const KIND: Kind = Kind::Str;

    fn assign(&mut self, value: FieldValue) -> Result<(), AssignError> {
        let v = match value {
            FieldValue::Str(v) => v,
            other => return Err(other.mismatch(Kind::Str)),
        };
        *self = PathBuf::from(v);
        Ok(())
    }
}

impl<T: Leaf + Default> Leaf for Option<T> {
    const KIND: Kind = T::KIND;

    fn assign(&mut self, value: FieldValue) -> Result<(), AssignError> {
        self.get_or_insert_with(T::default).assign(value)
    }
}

/// Static description of one declared field.
#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    /// Raw `(key, value)` tags as written on the field.
    pub tags: &'static [(&'static str, &'static str)],
    /// Deferred so that self-referential types don't recurse at compile time.
    pub shape: fn() -> Shape,
}

#[derive(Debug, Clone, Copy)]
pub enum Shape {
    Leaf(Kind),
    Composite(Composite),
}

/// A struct reached through a nested field, possibly behind a container.
#[derive(Debug, Clone, Copy)]
pub struct Composite {
    pub type_id: TypeId,
    pub type_name: &'static str,
    pub fields: &'static [Field],
}

/// `shape` function for a leaf field of type `T`.
pub fn leaf<T: Leaf>() -> Shape {
    Shape::Leaf(T::KIND)
}

/// `shape` function for a nested field of type `T`.
pub fn nested<T: Settings>() -> Shape {
    Shape::Composite(T::composite())
}

/// A configuration type whose fields can be enumerated and written by path.
///
/// Implement with `#[derive(Settings)]`.
pub trait Settings: 'static {
    const FIELDS: &'static [Field];

    fn composite() -> Composite
    where
        Self: Sized,
    {
        Composite {
            type_id: TypeId::of::<Self>(),
            type_name: type_name::<Self>(),
            fields: Self::FIELDS,
        }
    }

    /// Write `value` into the leaf addressed by `path` (indices into
    /// [`FIELDS`](Self::FIELDS) at each level).
    fn set_path(&mut self, path: &[usize], value: FieldValue) -> Result<(), AccessError>;
}

impl<T: Settings> Settings for Box<T> {
    const FIELDS: &'static [Field] = T::FIELDS;

    fn composite() -> Composite {
        T::composite()
    }

    fn set_path(&mut self, path: &[usize], value: FieldValue) -> Result<(), AccessError> {
        (**self).set_path(path, value)
    }
}

impl<T: Settings> Settings for Option<T> {
    const FIELDS: &'static [Field] = T::FIELDS;

    fn composite() -> Composite {
        T::composite()
    }

    fn set_path(&mut self, path: &[usize], value: FieldValue) -> Result<(), AccessError> {
        match self {
            Some(inner) => inner.set_path(path, value),
            None => Err(AccessError::Absent),
        }
    }
}

impl<T: Settings> Settings for Vec<T> {
    const FIELDS: &'static [Field] = T::FIELDS;

    fn composite() -> Composite {
        T::composite()
    }

    fn set_path(&mut self, path: &[usize], value: FieldValue) -> Result<(), AccessError> {
        set_each(self, path, value)
    }
}

impl<T: Settings, const N: usize> Settings for [T; N] {
    const FIELDS: &'static [Field] = T::FIELDS;

    fn composite() -> Composite {
        T::composite()
    }

    fn set_path(&mut self, path: &[usize], value: FieldValue) -> Result<(), AccessError> {
        set_each(self, path, value)
    }
}

/// Sequences have no per-element path: a write reaches every element.
fn set_each<T: Settings>(
    items: &mut [T],
    path: &[usize],
    value: FieldValue,
) -> Result<(), AccessError> {
    if items.is_empty() {
        return Err(AccessError::Absent);
    }
    for item in items {
        item.set_path(path, value.clone())?;
    }
    Ok(())
}
