//! Enumeration descriptors.
//!
//! Rust enums carry no runtime case table, so a target enum describes itself
//! through [`Enumeration`]: its name, its cases, and optionally the scalar each
//! case is backed by.

use std::fmt;

use crate::error::CastError;
use crate::value::Value;

/// The scalar a backed case is looked up by.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Backed {
    Int(i64),
    Str(&'static str),
}

/// How the cases of an enumeration are matched against a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backing {
    /// Cells name the case.
    Unbacked,
    /// Cells hold the integer a case is backed by.
    Int,
    /// Cells hold the string a case is backed by.
    Str,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumCase {
    pub name: &'static str,
    pub value: Option<Backed>,
}

/// Runtime description of an enumeration type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumDescriptor {
    name: &'static str,
    backing: Backing,
    cases: Vec<EnumCase>,
}

impl EnumDescriptor {
    /// An enumeration whose cases are matched by name.
    pub fn unbacked(name: &'static str, cases: &[&'static str]) -> Self {
        Self {
            name,
            backing: Backing::Unbacked,
            cases: cases
                .iter()
                .map(|case| EnumCase {
                    name: case,
                    value: None,
                })
                .collect(),
        }
    }

    /// An enumeration whose cases are matched by an integer.
    pub fn int_backed(name: &'static str, cases: &[(&'static str, i64)]) -> Self {
        Self {
            name,
            backing: Backing::Int,
            cases: cases
                .iter()
                .map(|(case, value)| EnumCase {
                    name: case,
                    value: Some(Backed::Int(*value)),
                })
                .collect(),
        }
    }

    /// An enumeration whose cases are matched by a string.
    pub fn str_backed(name: &'static str, cases: &[(&'static str, &'static str)]) -> Self {
        Self {
            name,
            backing: Backing::Str,
            cases: cases
                .iter()
                .map(|(case, value)| EnumCase {
                    name: case,
                    value: Some(Backed::Str(value)),
                })
                .collect(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn backing(&self) -> Backing {
        self.backing
    }

    pub fn cases(&self) -> &[EnumCase] {
        &self.cases
    }

    /// Find a case by its name.
    pub fn case_named(&self, name: &str) -> Option<&EnumCase> {
        self.cases.iter().find(|case| case.name == name)
    }

    /// Find a case by its backing value. Unbacked enumerations never match.
    pub fn case_backed_by(&self, value: &Backed) -> Option<&EnumCase> {
        self.cases
            .iter()
            .find(|case| case.value.as_ref() == Some(value))
    }
}

/// A resolved case of an enumeration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnumValue {
    pub enum_name: &'static str,
    pub case: &'static str,
}

impl fmt::Display for EnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.enum_name, self.case)
    }
}

/// Implemented by target enums so the registry can cast cells into them.
///
/// Pair it with [`field_enum!`](crate::field_enum) to use the enum as a field
/// type.
pub trait Enumeration: Sized {
    fn descriptor() -> EnumDescriptor;

    /// Rebuild the enum from one of the case names in its descriptor.
    fn from_case(case: &str) -> Option<Self>;
}

/// Convert a cast `Value` into an enumeration.
pub fn enum_from_value<E: Enumeration>(value: Value) -> Result<E, CastError> {
    let descriptor = E::descriptor();
    match value {
        Value::Enum(v) if v.enum_name == descriptor.name() => {
            E::from_case(v.case).ok_or_else(|| unknown(v.case, &descriptor))
        }
        // A mixed-typed array element or a custom caster may hand back the case name.
        Value::String(s) => E::from_case(&s).ok_or_else(|| unknown(&s, &descriptor)),
        other => Err(unknown(&other.to_string(), &descriptor)),
    }
}

fn unknown(value: &str, descriptor: &EnumDescriptor) -> CastError {
    CastError::new(crate::error::CastFailure::UnknownEnumCase {
        value: value.to_string(),
        enum_name: descriptor.name().to_string(),
    })
}

/// Implement [`FieldType`](crate::FieldType) for a type implementing
/// [`Enumeration`].
///
/// ```rust
/// use cellmap_cast::{field_enum, EnumDescriptor, Enumeration};
///
/// enum Suit { Hearts, Spades }
///
/// impl Enumeration for Suit {
///     fn descriptor() -> EnumDescriptor {
///         EnumDescriptor::unbacked("Suit", &["Hearts", "Spades"])
///     }
///
///     fn from_case(case: &str) -> Option<Self> {
///         match case {
///             "Hearts" => Some(Suit::Hearts),
///             "Spades" => Some(Suit::Spades),
///             _ => None,
///         }
///     }
/// }
///
/// field_enum!(Suit);
/// ```
#[macro_export]
macro_rules! field_enum {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::FieldType for $ty {
                fn declared_type() -> $crate::DeclaredType {
                    $crate::DeclaredType::new($crate::TypeTag::Enum(
                        <$ty as $crate::Enumeration>::descriptor(),
                    ))
                }

                fn from_value(value: $crate::Value) -> Result<Self, $crate::CastError> {
                    $crate::enum_from_value::<$ty>(value)
                }
            }
        )+
    };
}
