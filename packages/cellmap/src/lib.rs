//! cellmap: Record-to-Object Mapping Layer
//!
//! This layer maps already-tokenized records (ordered lists of nullable text
//! cells) onto typed Rust values:
//! - `Target` / `Describe`: the fields a type exposes to the mapper
//! - `MapCell`: an explicit per-field declaration (column, caster, options)
//! - `Registry`: declared type to caster dispatch, extensible with named types
//! - `Serializer`: resolves bindings once against a header, then hydrates
//!   many records
//!
//! Reading CSV files, filtering and writing records back are left to the
//! caller.
//!
//! # Example
//!
//! ```rust
//! use cellmap::{Describe, MapCell, Serializer, Target};
//!
//! #[derive(Default)]
//! struct Member {
//!     name: String,
//!     age: i64,
//!     active: bool,
//! }
//!
//! impl Target for Member {
//!     fn blank() -> Self {
//!         Member::default()
//!     }
//!
//!     fn describe(fields: &mut Describe<Self>) {
//!         fields.property("name", |m: &mut Member, v: String| m.name = v);
//!         fields.property("age", |m: &mut Member, v: i64| m.age = v);
//!         fields
//!             .property("active", |m: &mut Member, v: bool| m.active = v)
//!             .map(MapCell::column("enabled"));
//!     }
//! }
//!
//! let serializer = Serializer::<Member>::new(&["name", "age", "enabled"]).unwrap();
//! let member = serializer.hydrate(&["Ann", "37", "yes"]).unwrap();
//! assert_eq!(member.name, "Ann");
//! assert_eq!(member.age, 37);
//! assert!(member.active);
//!
//! assert!(serializer.hydrate(&["Bob", "x", "no"]).is_err());
//! ```

mod describe;
mod error;
mod map_cell;
mod registry;
mod resolver;
mod serializer;

pub use cellmap_cast::{
    field_enum, Arg, BoxError, CastArgs, CastContext, CastError, CastFailure, Caster,
    CasterKind, CustomCaster, CustomFactory, DateKind, DeclaredType, EnumDescriptor, EnumValue,
    Enumeration, FieldType, Scalar, TypeTag, Value,
};

/// The full cast layer, for callers writing their own casters.
pub use cellmap_cast as cast;

pub use describe::{AccessorKind, Describe, FieldBuilder, Target, Visibility};
pub use error::{ConfigError, Error};
pub use map_cell::{MapCell, Offset};
pub use registry::Registry;
pub use resolver::FieldBinding;
pub use serializer::{map, Cell, HydrateAll, Serializer};
