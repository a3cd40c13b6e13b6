//! Explicit field declarations.

use std::fmt;

use serde::{Deserialize, Serialize};

use cellmap_cast::{
    Arg, CastArgs, CasterKind, CustomCaster, CustomFactory, EnumDescriptor, Enumeration,
};

/// Where a field's cell lives: a header name or a position.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Offset {
    Index(i64),
    Name(String),
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Offset::Index(i) => write!(f, "{}", i),
            Offset::Name(name) => write!(f, "`{}`", name),
        }
    }
}

impl From<i64> for Offset {
    fn from(i: i64) -> Self {
        Offset::Index(i)
    }
}

impl From<i32> for Offset {
    fn from(i: i32) -> Self {
        Offset::Index(i as i64)
    }
}

impl From<usize> for Offset {
    fn from(i: usize) -> Self {
        Offset::Index(i64::try_from(i).unwrap_or(i64::MAX))
    }
}

impl From<&str> for Offset {
    fn from(name: &str) -> Self {
        Offset::Name(name.to_string())
    }
}

impl From<String> for Offset {
    fn from(name: String) -> Self {
        Offset::Name(name)
    }
}

/// An explicit cell declaration on a property or setter.
///
/// Every part is optional: without a `column` the field's own name is looked
/// up in the header, without a `cast` the caster follows the declared type.
///
/// Declarations can be written in code:
///
/// ```rust
/// use cellmap::{CasterKind, MapCell};
///
/// let cell = MapCell::column(2)
///     .cast(CasterKind::Array)
///     .option("delimiter", "|");
/// ```
///
/// or loaded from configuration:
///
/// ```rust
/// use cellmap::MapCell;
///
/// let cell: MapCell = serde_json::from_str(
///     r#"{"column": "tags", "cast": "array", "options": {"shape": "json"}}"#,
/// ).unwrap();
/// ```
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MapCell {
    #[serde(default)]
    pub column: Option<Offset>,
    #[serde(default)]
    pub cast: Option<CasterKind>,
    #[serde(default)]
    pub options: CastArgs,
    /// Keep the field out of binding altogether.
    #[serde(default)]
    pub ignore: bool,
    /// Trim surrounding whitespace from the cell before casting.
    #[serde(default)]
    pub trim: bool,
    #[serde(skip)]
    pub(crate) custom: Option<CustomFactory>,
    #[serde(skip)]
    pub(crate) enumeration: Option<EnumDescriptor>,
}

impl MapCell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn column(offset: impl Into<Offset>) -> Self {
        Self {
            column: Some(offset.into()),
            ..Self::default()
        }
    }

    pub fn ignored() -> Self {
        Self {
            ignore: true,
            ..Self::default()
        }
    }

    pub fn at(mut self, offset: impl Into<Offset>) -> Self {
        self.column = Some(offset.into());
        self
    }

    /// Override the caster with a built-in variant.
    pub fn cast(mut self, kind: CasterKind) -> Self {
        self.cast = Some(kind);
        self
    }

    /// Override the caster with a custom one.
    pub fn custom<C: CustomCaster>(mut self) -> Self {
        self.custom = Some(CustomFactory::of::<C>());
        self
    }

    pub fn custom_factory(mut self, factory: CustomFactory) -> Self {
        self.custom = Some(factory);
        self
    }

    /// Supply the enumeration for an enum caster on a field whose declared
    /// type does not name one (`mixed`, `string`, ...).
    pub fn enumeration<E: Enumeration>(mut self) -> Self {
        self.cast = Some(CasterKind::Enum);
        self.enumeration = Some(E::descriptor());
        self
    }

    pub fn option(mut self, key: impl Into<String>, value: impl Into<Arg>) -> Self {
        self.options.insert(key, value);
        self
    }

    pub fn options(mut self, options: CastArgs) -> Self {
        self.options = options;
        self
    }

    pub fn trim(mut self) -> Self {
        self.trim = true;
        self
    }
}
