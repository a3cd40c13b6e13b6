//! cellmap casting layer
//!
//! This layer turns one nullable text cell into a typed [`Value`]. It knows
//! nothing about headers, offsets or target structs. It provides:
//! - `Caster`: the capability every caster implements
//! - `BuiltinCaster`: string, int, float, bool, date, array and enum casters
//! - `DeclaredType` / `TypeTag`: the (possibly union, possibly nullable) type a
//!   field declares
//! - `FieldType`: how a Rust field type declares itself and accepts a `Value`
//! - `CastArgs`: construction arguments for casters
//!
//! # Example
//!
//! ```rust
//! use cellmap_cast::{BuiltinCaster, CastArgs, Caster, CasterKind, Value};
//!
//! let args = CastArgs::new().with("delimiter", "|");
//! let caster = BuiltinCaster::build(CasterKind::Array, false, &args).unwrap();
//!
//! assert_eq!(
//!     caster.cast(Some("a|b")).unwrap(),
//!     Value::from(vec!["a", "b"]),
//! );
//! assert_eq!(caster.cast(Some("")).unwrap(), Value::Array(vec![]));
//! ```

mod args;
mod caster;
mod enumeration;
mod error;
mod field;
mod types;
mod value;

pub use args::{Arg, ArgReader, CastArgs, Scalar};
pub use caster::{
    AnyCaster, ArrayShape, BoxError, BuiltinCaster, CastToArray, CastToBool, CastToDate,
    CastToEnum, CastToFloat, CastToInt, CastToString, Caster, CasterKind, CustomCaster,
    CustomFactory, ElementType, NullPolicy,
};
pub use enumeration::{
    enum_from_value, Backed, Backing, EnumCase, EnumDescriptor, EnumValue, Enumeration,
};
pub use error::{ArgumentError, CastContext, CastError, CastFailure};
pub use field::FieldType;
pub use types::{DateKind, DeclaredType, TypeTag};
pub use value::{json_to_value, Value};
