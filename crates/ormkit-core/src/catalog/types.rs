//! Field type hierarchy.
//!
//! A [`FieldType`] is a named node with an optional base type. Built-in types
//! have no base; custom types extend one, inheriting its storage mapping and
//! parameters unless they override them.

use serde::{Deserialize, Serialize};

/// Built-in field type names.
pub mod names {
    pub const BOOLEAN: &str = "BooleanField";
    pub const SMALL_INT: &str = "SmallIntField";
    pub const INT: &str = "IntField";
    pub const BIG_INT: &str = "BigIntField";
    pub const TEXT: &str = "TextField";
    pub const CHAR: &str = "CharField";
    pub const DATETIME: &str = "DatetimeField";
    pub const DATE: &str = "DateField";
    pub const TIME_DELTA: &str = "TimeDeltaField";
    pub const DECIMAL: &str = "DecimalField";
    pub const FLOAT: &str = "FloatField";
    pub const JSON: &str = "JSONField";
    pub const UUID: &str = "UUIDField";
    pub const BINARY: &str = "BinaryField";
}

/// Precision of a decimal field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecimalSpec {
    /// Total number of digits.
    pub max_digits: u32,
    /// Number of digits after the decimal point.
    pub decimal_places: u32,
}

/// A node in the field type hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldType {
    /// Type name.
    pub name: String,
    /// Parent type, if this type extends another.
    #[serde(default)]
    pub base: Option<Box<FieldType>>,
    /// Maximum length for character types.
    #[serde(default)]
    pub max_length: Option<u32>,
    /// Decimal precision.
    #[serde(default)]
    pub decimal: Option<DecimalSpec>,
}

impl FieldType {
    /// Create a root type with the given name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base: None,
            max_length: None,
            decimal: None,
        }
    }

    /// Create a type that extends `base`.
    pub fn extend(name: impl Into<String>, base: FieldType) -> Self {
        Self {
            name: name.into(),
            base: Some(Box::new(base)),
            max_length: None,
            decimal: None,
        }
    }

    /// `BooleanField`.
    pub fn boolean() -> Self {
        Self::named(names::BOOLEAN)
    }

    /// `SmallIntField`.
    pub fn small_int() -> Self {
        Self::named(names::SMALL_INT)
    }

    /// `IntField`.
    pub fn int() -> Self {
        Self::named(names::INT)
    }

    /// `BigIntField`.
    pub fn big_int() -> Self {
        Self::named(names::BIG_INT)
    }

    /// `TextField`.
    pub fn text() -> Self {
        Self::named(names::TEXT)
    }

    /// `CharField` limited to `max_length` characters.
    pub fn char(max_length: u32) -> Self {
        Self::named(names::CHAR).with_max_length(max_length)
    }

    /// `DatetimeField`.
    pub fn datetime() -> Self {
        Self::named(names::DATETIME)
    }

    /// `DateField`.
    pub fn date() -> Self {
        Self::named(names::DATE)
    }

    /// `TimeDeltaField`.
    pub fn time_delta() -> Self {
        Self::named(names::TIME_DELTA)
    }

    /// `DecimalField` with the given precision and scale.
    pub fn decimal(max_digits: u32, decimal_places: u32) -> Self {
        let mut ty = Self::named(names::DECIMAL);
        ty.decimal = Some(DecimalSpec {
            max_digits,
            decimal_places,
        });
        ty
    }

    /// `FloatField`.
    pub fn float() -> Self {
        Self::named(names::FLOAT)
    }

    /// `JSONField`.
    pub fn json() -> Self {
        Self::named(names::JSON)
    }

    /// `UUIDField`.
    pub fn uuid() -> Self {
        Self::named(names::UUID)
    }

    /// `BinaryField`.
    pub fn binary() -> Self {
        Self::named(names::BINARY)
    }

    /// Override the maximum length.
    pub fn with_max_length(mut self, max_length: u32) -> Self {
        self.max_length = Some(max_length);
        self
    }

    /// Iterate over this type and its ancestors, leaf first.
    pub fn lineage(&self) -> impl Iterator<Item = &FieldType> {
        std::iter::successors(Some(self), |ty| ty.base.as_deref())
    }

    /// Check whether this type is, or extends, the named type.
    pub fn is_a(&self, name: &str) -> bool {
        self.lineage().any(|ty| ty.name == name)
    }

    /// Maximum length, looked up along the hierarchy.
    pub fn max_length(&self) -> Option<u32> {
        self.lineage().find_map(|ty| ty.max_length)
    }

    /// Decimal precision, looked up along the hierarchy.
    pub fn decimal_spec(&self) -> Option<DecimalSpec> {
        self.lineage().find_map(|ty| ty.decimal)
    }

    /// Check whether this is one of the integer types.
    pub fn is_integer(&self) -> bool {
        self.is_a(names::SMALL_INT) || self.is_a(names::INT) || self.is_a(names::BIG_INT)
    }
}
