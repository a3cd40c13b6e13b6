//! Casters: converters from a nullable text cell to a [`Value`].
//!
//! The built-in variants form a closed set ([`BuiltinCaster`]); anything else
//! plugs in through the [`Caster`] capability. Both are carried in a binding as
//! an [`AnyCaster`], picked once when bindings are resolved.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::args::CastArgs;
use crate::enumeration::EnumDescriptor;
use crate::error::{ArgumentError, CastError};
use crate::types::{DateKind, DeclaredType};
use crate::value::Value;

mod array;
mod boolean;
mod date;
mod enumeration;
mod numeric;
mod string;

pub use array::{ArrayShape, CastToArray, ElementType};
pub use boolean::CastToBool;
pub use date::CastToDate;
pub use enumeration::CastToEnum;
pub use numeric::{CastToFloat, CastToInt};
pub use string::CastToString;

/// Boxed error a custom caster constructor may fail with.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Convert a nullable text cell into a typed value.
///
/// Implementations must be immutable once built: one instance is shared by
/// every record a serializer hydrates.
pub trait Caster: Send + Sync + fmt::Debug {
    fn cast(&self, value: Option<&str>) -> Result<Value, CastError>;
}

/// A caster that can be named in a field declaration and constructed from
/// the field's declared type plus the declaration's arguments.
///
/// Returning one of the crate's own error types from `build` propagates it as
/// is; any other error is reported as a configuration failure of the field.
pub trait CustomCaster: Caster + Sized + 'static {
    fn build(declared: &DeclaredType, args: &CastArgs) -> Result<Self, BoxError>;
}

type FactoryFn = dyn Fn(&DeclaredType, &CastArgs) -> Result<Box<dyn Caster>, BoxError> + Send + Sync;

/// A type-erased constructor for a custom caster.
#[derive(Clone)]
pub struct CustomFactory {
    name: &'static str,
    build: Arc<FactoryFn>,
}

impl CustomFactory {
    pub fn of<C: CustomCaster>() -> Self {
        Self {
            name: std::any::type_name::<C>(),
            build: Arc::new(|declared: &DeclaredType, args: &CastArgs| {
                C::build(declared, args).map(|c| Box::new(c) as Box<dyn Caster>)
            }),
        }
    }

    /// Wrap a plain closure.
    pub fn from_fn<F>(name: &'static str, build: F) -> Self
    where
        F: Fn(&DeclaredType, &CastArgs) -> Result<Box<dyn Caster>, BoxError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            name,
            build: Arc::new(build),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn build(&self, declared: &DeclaredType, args: &CastArgs) -> Result<Box<dyn Caster>, BoxError> {
        (self.build)(declared, args)
    }
}

impl fmt::Debug for CustomFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomFactory")
            .field("name", &self.name)
            .finish()
    }
}

/// Null handling shared by every built-in caster.
#[derive(Clone, Debug, PartialEq)]
pub struct NullPolicy {
    type_name: String,
    nullable: bool,
    default: Value,
}

impl NullPolicy {
    pub fn new(type_name: impl Into<String>, nullable: bool, default: Value) -> Self {
        Self {
            type_name: type_name.into(),
            nullable,
            default,
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn default_value(&self) -> &Value {
        &self.default
    }

    /// The configured default for a nullable field, otherwise an error.
    pub fn on_null(&self) -> Result<Value, CastError> {
        if self.nullable {
            Ok(self.default.clone())
        } else {
            Err(CastError::not_nullable(&self.type_name))
        }
    }
}

/// The built-in caster variants, as named in declarations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CasterKind {
    String,
    Int,
    Float,
    Bool,
    Date,
    Array,
    Enum,
}

impl CasterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CasterKind::String => "string",
            CasterKind::Int => "int",
            CasterKind::Float => "float",
            CasterKind::Bool => "bool",
            CasterKind::Date => "date",
            CasterKind::Array => "array",
            CasterKind::Enum => "enum",
        }
    }
}

impl fmt::Display for CasterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the built-in casters, configured.
#[derive(Clone, Debug, PartialEq)]
pub enum BuiltinCaster {
    String(CastToString),
    Int(CastToInt),
    Float(CastToFloat),
    Bool(CastToBool),
    Date(CastToDate),
    Array(CastToArray),
    Enum(CastToEnum),
}

impl BuiltinCaster {
    /// Build a string, numeric, bool or array caster.
    ///
    /// Date and enum casters need more than a kind; use
    /// [`BuiltinCaster::date`] and [`BuiltinCaster::enumeration`].
    pub fn build(kind: CasterKind, nullable: bool, args: &CastArgs) -> Result<Self, ArgumentError> {
        match kind {
            CasterKind::String => CastToString::new(nullable, args).map(BuiltinCaster::String),
            CasterKind::Int => CastToInt::new(nullable, args).map(BuiltinCaster::Int),
            CasterKind::Float => CastToFloat::new(nullable, args).map(BuiltinCaster::Float),
            CasterKind::Bool => CastToBool::new(nullable, args).map(BuiltinCaster::Bool),
            CasterKind::Array => CastToArray::new(nullable, args).map(BuiltinCaster::Array),
            CasterKind::Date => Self::date(DateKind::Timestamp, nullable, args),
            CasterKind::Enum => Err(ArgumentError::new(
                "enum",
                "an enum caster needs the enumeration it casts into",
            )),
        }
    }

    pub fn date(kind: DateKind, nullable: bool, args: &CastArgs) -> Result<Self, ArgumentError> {
        CastToDate::new(kind, nullable, args).map(BuiltinCaster::Date)
    }

    pub fn enumeration(
        descriptor: EnumDescriptor,
        nullable: bool,
        args: &CastArgs,
    ) -> Result<Self, ArgumentError> {
        CastToEnum::new(descriptor, nullable, args).map(BuiltinCaster::Enum)
    }

    pub fn kind(&self) -> CasterKind {
        match self {
            BuiltinCaster::String(_) => CasterKind::String,
            BuiltinCaster::Int(_) => CasterKind::Int,
            BuiltinCaster::Float(_) => CasterKind::Float,
            BuiltinCaster::Bool(_) => CasterKind::Bool,
            BuiltinCaster::Date(_) => CasterKind::Date,
            BuiltinCaster::Array(_) => CasterKind::Array,
            BuiltinCaster::Enum(_) => CasterKind::Enum,
        }
    }

    pub fn null_policy(&self) -> &NullPolicy {
        match self {
            BuiltinCaster::String(c) => c.null_policy(),
            BuiltinCaster::Int(c) => c.null_policy(),
            BuiltinCaster::Float(c) => c.null_policy(),
            BuiltinCaster::Bool(c) => c.null_policy(),
            BuiltinCaster::Date(c) => c.null_policy(),
            BuiltinCaster::Array(c) => c.null_policy(),
            BuiltinCaster::Enum(c) => c.null_policy(),
        }
    }
}

impl Caster for BuiltinCaster {
    fn cast(&self, value: Option<&str>) -> Result<Value, CastError> {
        match self {
            BuiltinCaster::String(c) => c.cast(value),
            BuiltinCaster::Int(c) => c.cast(value),
            BuiltinCaster::Float(c) => c.cast(value),
            BuiltinCaster::Bool(c) => c.cast(value),
            BuiltinCaster::Date(c) => c.cast(value),
            BuiltinCaster::Array(c) => c.cast(value),
            BuiltinCaster::Enum(c) => c.cast(value),
        }
    }
}

/// The caster stored in a field binding.
#[derive(Debug)]
pub enum AnyCaster {
    Builtin(BuiltinCaster),
    Custom(Box<dyn Caster>),
}

impl AnyCaster {
    /// The built-in kind, or `None` for a custom caster.
    pub fn kind(&self) -> Option<CasterKind> {
        match self {
            AnyCaster::Builtin(c) => Some(c.kind()),
            AnyCaster::Custom(_) => None,
        }
    }
}

impl Caster for AnyCaster {
    fn cast(&self, value: Option<&str>) -> Result<Value, CastError> {
        match self {
            AnyCaster::Builtin(c) => c.cast(value),
            AnyCaster::Custom(c) => c.cast(value),
        }
    }
}

impl From<BuiltinCaster> for AnyCaster {
    fn from(c: BuiltinCaster) -> Self {
        AnyCaster::Builtin(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Upper;

    impl Caster for Upper {
        fn cast(&self, value: Option<&str>) -> Result<Value, CastError> {
            Ok(value.map(|v| Value::from(v.to_uppercase())).unwrap_or_default())
        }
    }

    impl CustomCaster for Upper {
        fn build(_declared: &DeclaredType, args: &CastArgs) -> Result<Self, BoxError> {
            if args.is_empty() {
                Ok(Upper)
            } else {
                Err("upper takes no arguments".into())
            }
        }
    }

    #[test]
    fn null_policy() {
        let nullable = NullPolicy::new("int", true, Value::Integer(7));
        assert_eq!(nullable.on_null().unwrap(), Value::Integer(7));

        let strict = NullPolicy::new("int", false, Value::Null);
        assert!(strict.on_null().is_err());
    }

    #[test]
    fn build_dispatches_on_kind() {
        let c = BuiltinCaster::build(CasterKind::Int, false, &CastArgs::new()).unwrap();
        assert_eq!(c.kind(), CasterKind::Int);
        assert_eq!(c.cast(Some("12")).unwrap(), Value::Integer(12));
    }

    #[test]
    fn enum_kind_needs_descriptor() {
        assert!(BuiltinCaster::build(CasterKind::Enum, false, &CastArgs::new()).is_err());
    }

    #[test]
    fn custom_factory_builds_and_rejects() {
        let factory = CustomFactory::of::<Upper>();
        let declared = DeclaredType::named("shout");
        let caster = factory.build(&declared, &CastArgs::new()).unwrap();
        assert_eq!(caster.cast(Some("hi")).unwrap(), Value::from("HI"));

        let err = factory
            .build(&declared, &CastArgs::new().with("x", 1))
            .unwrap_err();
        assert_eq!(err.to_string(), "upper takes no arguments");
    }

    #[test]
    fn caster_kind_names_deserialize() {
        let kind: CasterKind = serde_json::from_str("\"array\"").unwrap();
        assert_eq!(kind, CasterKind::Array);
        assert_eq!(kind.to_string(), "array");
    }
}
