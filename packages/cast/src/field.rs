//! Rust field types: their declared type and how they take a cast `Value`.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};

use crate::error::CastError;
use crate::types::{DateKind, DeclaredType, TypeTag};
use crate::value::Value;

/// A type a target field can be declared with.
///
/// `declared_type` drives caster selection when a field is bound implicitly;
/// `from_value` receives whatever the chosen caster produced.
pub trait FieldType: Sized {
    fn declared_type() -> DeclaredType;

    fn from_value(value: Value) -> Result<Self, CastError>;
}

fn mismatch(value: &Value, type_name: &str) -> CastError {
    CastError::invalid(
        value.to_string(),
        type_name,
        format!("caster produced a {} value", value.kind()),
    )
}

impl FieldType for String {
    fn declared_type() -> DeclaredType {
        DeclaredType::new(TypeTag::String)
    }

    fn from_value(value: Value) -> Result<Self, CastError> {
        match value {
            Value::String(s) => Ok(s),
            Value::Enum(e) => Ok(e.case.to_string()),
            Value::Null => Err(CastError::not_nullable("string")),
            other => Ok(other.to_string()),
        }
    }
}

impl FieldType for bool {
    fn declared_type() -> DeclaredType {
        DeclaredType::new(TypeTag::Bool)
    }

    fn from_value(value: Value) -> Result<Self, CastError> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(mismatch(&other, "bool")),
        }
    }
}

impl FieldType for i64 {
    fn declared_type() -> DeclaredType {
        DeclaredType::new(TypeTag::Int)
    }

    // List items arrive as text unless the array caster was given an element
    // type, so integer text is accepted too.
    fn from_value(value: Value) -> Result<Self, CastError> {
        match value {
            Value::Integer(i) => Ok(i),
            Value::String(s) => s
                .trim()
                .parse()
                .map_err(|_| CastError::invalid(s, "int", "not an integer")),
            other => Err(mismatch(&other, "int")),
        }
    }
}

macro_rules! narrow_int {
    ($($ty:ty),+) => {
        $(
            impl FieldType for $ty {
                fn declared_type() -> DeclaredType {
                    DeclaredType::new(TypeTag::Int)
                }

                fn from_value(value: Value) -> Result<Self, CastError> {
                    let wide = i64::from_value(value)?;
                    <$ty>::try_from(wide).map_err(|_| {
                        CastError::invalid(
                            wide.to_string(),
                            stringify!($ty),
                            "out of range",
                        )
                    })
                }
            }
        )+
    };
}

narrow_int!(i8, i16, i32, u8, u16, u32);

// The int caster stops at `i64::MAX`. A field that needs the upper half of the
// unsigned range declares the string caster and is parsed here instead.
macro_rules! wide_unsigned {
    ($($ty:ty),+) => {
        $(
            impl FieldType for $ty {
                fn declared_type() -> DeclaredType {
                    DeclaredType::new(TypeTag::Int)
                }

                fn from_value(value: Value) -> Result<Self, CastError> {
                    match value {
                        Value::Integer(i) => <$ty>::try_from(i).map_err(|_| {
                            CastError::invalid(i.to_string(), stringify!($ty), "out of range")
                        }),
                        Value::String(s) => s.trim().parse().map_err(|_| {
                            CastError::invalid(s, stringify!($ty), "not an unsigned integer")
                        }),
                        other => Err(mismatch(&other, stringify!($ty))),
                    }
                }
            }
        )+
    };
}

wide_unsigned!(u64, usize);

impl FieldType for f64 {
    fn declared_type() -> DeclaredType {
        DeclaredType::new(TypeTag::Float)
    }

    fn from_value(value: Value) -> Result<Self, CastError> {
        match value {
            Value::Float(f) => Ok(f),
            Value::Integer(i) => Ok(i as f64),
            Value::String(s) => s
                .trim()
                .parse()
                .map_err(|_| CastError::invalid(s, "float", "not a number")),
            other => Err(mismatch(&other, "float")),
        }
    }
}

impl FieldType for f32 {
    fn declared_type() -> DeclaredType {
        DeclaredType::new(TypeTag::Float)
    }

    fn from_value(value: Value) -> Result<Self, CastError> {
        let wide = f64::from_value(value)?;
        let narrow = wide as f32;
        if wide.is_finite() && !narrow.is_finite() {
            return Err(CastError::invalid(wide.to_string(), "f32", "out of range"));
        }
        Ok(narrow)
    }
}

impl FieldType for NaiveDate {
    fn declared_type() -> DeclaredType {
        DeclaredType::new(TypeTag::Date(DateKind::Date))
    }

    fn from_value(value: Value) -> Result<Self, CastError> {
        match value {
            Value::Date(d) => Ok(d),
            Value::DateTime(dt) => Ok(dt.date()),
            Value::Timestamp(ts) => Ok(ts.date_naive()),
            other => Err(mismatch(&other, "date")),
        }
    }
}

impl FieldType for NaiveDateTime {
    fn declared_type() -> DeclaredType {
        DeclaredType::new(TypeTag::Date(DateKind::DateTime))
    }

    fn from_value(value: Value) -> Result<Self, CastError> {
        match value {
            Value::DateTime(dt) => Ok(dt),
            Value::Timestamp(ts) => Ok(ts.naive_local()),
            other => Err(mismatch(&other, "datetime")),
        }
    }
}

impl FieldType for DateTime<FixedOffset> {
    fn declared_type() -> DeclaredType {
        DeclaredType::new(TypeTag::Date(DateKind::Timestamp))
    }

    fn from_value(value: Value) -> Result<Self, CastError> {
        match value {
            Value::Timestamp(ts) => Ok(ts),
            other => Err(mismatch(&other, "timestamp")),
        }
    }
}

impl FieldType for DateTime<Utc> {
    fn declared_type() -> DeclaredType {
        DeclaredType::new(TypeTag::Date(DateKind::Timestamp))
    }

    fn from_value(value: Value) -> Result<Self, CastError> {
        DateTime::<FixedOffset>::from_value(value).map(|ts| ts.with_timezone(&Utc))
    }
}

impl<T: FieldType> FieldType for Vec<T> {
    fn declared_type() -> DeclaredType {
        DeclaredType::new(TypeTag::Array)
    }

    fn from_value(value: Value) -> Result<Self, CastError> {
        match value {
            Value::Array(items) => items.into_iter().map(T::from_value).collect(),
            Value::Map(map) => map.into_values().map(T::from_value).collect(),
            other => Err(mismatch(&other, "array")),
        }
    }
}

impl<T: FieldType> FieldType for BTreeMap<String, T> {
    fn declared_type() -> DeclaredType {
        DeclaredType::new(TypeTag::Array)
    }

    /// Lists are keyed by position.
    fn from_value(value: Value) -> Result<Self, CastError> {
        match value {
            Value::Map(map) => map
                .into_iter()
                .map(|(k, v)| Ok((k, T::from_value(v)?)))
                .collect(),
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(i, v)| Ok((i.to_string(), T::from_value(v)?)))
                .collect(),
            other => Err(mismatch(&other, "array")),
        }
    }
}

/// `mixed`: whatever the caster produced.
impl FieldType for Value {
    fn declared_type() -> DeclaredType {
        DeclaredType::new(TypeTag::Mixed)
    }

    fn from_value(value: Value) -> Result<Self, CastError> {
        Ok(value)
    }
}

impl<T: FieldType> FieldType for Option<T> {
    fn declared_type() -> DeclaredType {
        T::declared_type().nullable()
    }

    fn from_value(value: Value) -> Result<Self, CastError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}
