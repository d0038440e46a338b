//! Type-directed binding of a parsed [`Document`] onto caller types.
//!
//! A destination lists its bound fields in [`Decode::decode`], one
//! [`Scope::field`] call per field. Fields that are never listed stay untouched.
//!
//! ```ignore
//! #[derive(Default)]
//! struct Penalty {
//!     id: String,
//!     ban: Vec<Duration>,
//!     value: i64,
//! }
//!
//! impl Decode for Penalty {
//!     fn decode(&mut self, scope: &Scope<'_>) -> Result<(), DecodeError> {
//!         scope.field(Field::new("id").required(), &mut self.id)?;
//!         scope.field(Field::new("ban").default("3h30m"), &mut self.ban)?;
//!         scope.field(Field::new("value").default("50"), &mut self.value)
//!     }
//! }
//! ```

use std::any::type_name;
use std::time::Duration;

use crate::document::{Document, Record};
use crate::error::DecodeError;
use crate::scalar::{Scalar, ScalarKind};

/// Separates items of a default literal attached to an array field.
pub const DEFAULT_SEPARATOR: char = ',';

/// Binding annotations of one destination field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    name: &'static str,
    required: bool,
    default: Option<&'static str>,
}

impl Field {
    /// Bind to the section or key called `name`.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            required: false,
            default: None,
        }
    }

    /// Fail when nothing is bound to this field.
    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Literal converted in place of a missing key.
    #[must_use]
    pub const fn default(mut self, literal: &'static str) -> Self {
        self.default = Some(literal);
        self
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }

    #[must_use]
    pub const fn default_literal(&self) -> Option<&'static str> {
        self.default
    }
}

/// Declared shape of a destination, derived from its Rust type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Scalar(ScalarKind),
    Struct,
    ScalarArray(ScalarKind),
    StructArray,
}

impl Shape {
    #[must_use]
    pub const fn is_array(self) -> bool {
        matches!(self, Self::ScalarArray(_) | Self::StructArray)
    }
}

/// A type whose fields are filled from a document or from one record.
pub trait Decode {
    fn decode(&mut self, scope: &Scope<'_>) -> Result<(), DecodeError>;
}

/// A single bindable item: one value line, or one section record.
pub trait Element: Sized {
    const SHAPE: Shape;

    fn from_value(field: &Field, raw: &str) -> Result<Self, DecodeError>;

    fn from_record(field: &Field, record: &Record) -> Result<Self, DecodeError>;

    /// Fill `self` from `record`, keeping anything the record does not bind.
    fn merge_record(&mut self, field: &Field, record: &Record) -> Result<(), DecodeError> {
        *self = Self::from_record(field, record)?;
        Ok(())
    }
}

impl<T: Decode + Default> Element for T {
    const SHAPE: Shape = Shape::Struct;

    fn from_value(field: &Field, _raw: &str) -> Result<Self, DecodeError> {
        Err(DecodeError::BadRecordType {
            name: field.name,
            type_name: type_name::<T>(),
        })
    }

    fn from_record(_field: &Field, record: &Record) -> Result<Self, DecodeError> {
        let mut value = T::default();
        value.decode(&Scope::Record(record))?;
        Ok(value)
    }

    fn merge_record(&mut self, _field: &Field, record: &Record) -> Result<(), DecodeError> {
        self.decode(&Scope::Record(record))
    }
}

macro_rules! scalar_element {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Element for $ty {
                const SHAPE: Shape = Shape::Scalar(<$ty as Scalar>::KIND);

                fn from_value(field: &Field, raw: &str) -> Result<Self, DecodeError> {
                    <$ty as Scalar>::from_raw(raw).map_err(|source| DecodeError::InvalidValue {
                        name: field.name,
                        value: raw.to_owned(),
                        source,
                    })
                }

                fn from_record(field: &Field, _record: &Record) -> Result<Self, DecodeError> {
                    Err(DecodeError::BadSectionType {
                        name: field.name,
                        type_name: type_name::<$ty>(),
                    })
                }
            }
        )*
    };
}

scalar_element!(
    String, bool, Duration, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize,
);

/// Storage for a bound field: one element, or a `Vec` of them.
pub trait Bind {
    const SHAPE: Shape;

    /// Called with exactly one value unless `SHAPE` is an array.
    fn bind_values(&mut self, field: &Field, values: &[String]) -> Result<(), DecodeError>;

    /// Called with exactly one record unless `SHAPE` is an array.
    fn bind_records(&mut self, field: &Field, records: &[Record]) -> Result<(), DecodeError>;
}

impl<T: Element> Bind for T {
    const SHAPE: Shape = <T as Element>::SHAPE;

    fn bind_values(&mut self, field: &Field, values: &[String]) -> Result<(), DecodeError> {
        if let [value] = values {
            *self = T::from_value(field, value)?;
        }
        Ok(())
    }

    fn bind_records(&mut self, field: &Field, records: &[Record]) -> Result<(), DecodeError> {
        if let [record] = records {
            self.merge_record(field, record)?;
        }
        Ok(())
    }
}

impl<T: Element> Bind for Vec<T> {
    const SHAPE: Shape = match <T as Element>::SHAPE {
        Shape::Scalar(kind) | Shape::ScalarArray(kind) => Shape::ScalarArray(kind),
        Shape::Struct | Shape::StructArray => Shape::StructArray,
    };

    fn bind_values(&mut self, field: &Field, values: &[String]) -> Result<(), DecodeError> {
        *self = values
            .iter()
            .map(|value| T::from_value(field, value))
            .collect::<Result<_, _>>()?;
        Ok(())
    }

    fn bind_records(&mut self, field: &Field, records: &[Record]) -> Result<(), DecodeError> {
        *self = records
            .iter()
            .map(|record| T::from_record(field, record))
            .collect::<Result<_, _>>()?;
        Ok(())
    }
}

/// What names are resolved against: section names of a document, or keys of one record.
#[derive(Debug, Clone, Copy)]
pub enum Scope<'a> {
    Document(&'a Document),
    Record(&'a Record),
}

impl Scope<'_> {
    /// Resolve `field` in this scope and store the result in `dest`.
    pub fn field<T: Bind>(&self, field: Field, dest: &mut T) -> Result<(), DecodeError> {
        let name = field.name;
        let count = match *self {
            Scope::Document(document) => document.records(name).len(),
            Scope::Record(record) => record.values(name).len(),
        };

        if count == 0 {
            return self.missing(&field, dest);
        }
        if count > 1 && !T::SHAPE.is_array() {
            return Err(DecodeError::ExpectedArray { name, count });
        }

        match (*self, T::SHAPE) {
            (Scope::Document(document), Shape::Struct | Shape::StructArray) => {
                dest.bind_records(&field, document.records(name))
            }
            (Scope::Document(_), Shape::Scalar(_)) => Err(DecodeError::BadSectionType {
                name,
                type_name: type_name::<T>(),
            }),
            (Scope::Document(_), Shape::ScalarArray(_)) => Err(DecodeError::ExpectedStruct {
                name,
                type_name: type_name::<T>(),
            }),
            (Scope::Record(record), Shape::Scalar(_) | Shape::ScalarArray(_)) => {
                dest.bind_values(&field, record.values(name))
            }
            (Scope::Record(_), Shape::Struct | Shape::StructArray) => {
                Err(DecodeError::BadRecordType {
                    name,
                    type_name: type_name::<T>(),
                })
            }
        }
    }

    fn missing<T: Bind>(&self, field: &Field, dest: &mut T) -> Result<(), DecodeError> {
        if field.required {
            return Err(DecodeError::RequiredField { name: field.name });
        }

        // Defaults are value literals; they never stand in for whole sections.
        let (Scope::Record(_), Some(literal)) = (self, field.default) else {
            return Ok(());
        };

        tracing::debug!(field = field.name, literal, "using default");

        match T::SHAPE {
            Shape::Scalar(_) => dest.bind_values(field, &[literal.to_owned()]),
            Shape::ScalarArray(_) => dest.bind_values(field, &split_default(literal)),
            Shape::Struct | Shape::StructArray => Ok(()),
        }
    }
}

fn split_default(literal: &str) -> Vec<String> {
    if literal.is_empty() {
        return Vec::new();
    }

    literal
        .split(DEFAULT_SEPARATOR)
        .map(str::to_owned)
        .collect()
}

/// Fill `dest` from an already parsed document.
///
/// Binding runs on a copy of `dest`; on error `dest` is left as it was.
pub fn decode_document<T>(document: &Document, dest: &mut T) -> Result<(), DecodeError>
where
    T: Decode + Clone,
{
    let mut scratch = dest.clone();
    decode_into(document, &mut scratch)?;
    *dest = scratch;
    Ok(())
}

pub(crate) fn decode_into<T>(document: &Document, dest: &mut T) -> Result<(), DecodeError>
where
    T: Decode + ?Sized,
{
    tracing::debug!(
        target_type = type_name::<T>(),
        sections = document.sections().len(),
        "decoding document"
    );

    dest.decode(&Scope::Document(document))
}
