//! Declared field types.
//!
//! A target field declares a type that may be a union of several named types
//! and may be nullable. The registry walks the members in declaration order to
//! pick a caster, so a union is kept as an ordered list of tags rather than a
//! set.

use std::borrow::Cow;
use std::fmt;

use crate::enumeration::EnumDescriptor;

/// Concrete temporal type a date field is declared with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DateKind {
    /// Calendar date (`NaiveDate`).
    Date,
    /// Wall-clock date and time (`NaiveDateTime`).
    DateTime,
    /// Date and time at a fixed offset (`DateTime<FixedOffset>`, `DateTime<Utc>`).
    Timestamp,
}

impl DateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DateKind::Date => "date",
            DateKind::DateTime => "datetime",
            DateKind::Timestamp => "timestamp",
        }
    }
}

/// One member of a declared type.
#[derive(Clone, Debug, PartialEq)]
pub enum TypeTag {
    Mixed,
    Null,
    String,
    Iterable,
    Array,
    Bool,
    True,
    False,
    Float,
    Int,
    Date(DateKind),
    Enum(EnumDescriptor),
    /// A type only a registered custom caster understands.
    Named(Cow<'static, str>),
}

impl TypeTag {
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        TypeTag::Named(name.into())
    }

    pub fn name(&self) -> &str {
        match self {
            TypeTag::Mixed => "mixed",
            TypeTag::Null => "null",
            TypeTag::String => "string",
            TypeTag::Iterable => "iterable",
            TypeTag::Array => "array",
            TypeTag::Bool => "bool",
            TypeTag::True => "true",
            TypeTag::False => "false",
            TypeTag::Float => "float",
            TypeTag::Int => "int",
            TypeTag::Date(kind) => kind.as_str(),
            TypeTag::Enum(descriptor) => descriptor.name(),
            TypeTag::Named(name) => name,
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The declared type of a candidate field: an ordered union of tags plus a
/// nullable marker.
#[derive(Clone, Debug, PartialEq)]
pub struct DeclaredType {
    members: Vec<TypeTag>,
    nullable: bool,
}

impl DeclaredType {
    pub fn new(tag: TypeTag) -> Self {
        Self {
            members: vec![tag],
            nullable: false,
        }
    }

    /// A union type. Member order is the order casters are tried in.
    pub fn union(members: impl IntoIterator<Item = TypeTag>) -> Self {
        Self {
            members: members.into_iter().collect(),
            nullable: false,
        }
    }

    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        Self::new(TypeTag::named(name))
    }

    /// Add the leading nullable marker (`?type`).
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn members(&self) -> &[TypeTag] {
        &self.members
    }

    /// A leading nullable marker, or `null`/`mixed` among the members.
    pub fn is_nullable(&self) -> bool {
        self.nullable
            || self
                .members
                .iter()
                .any(|tag| matches!(tag, TypeTag::Null | TypeTag::Mixed))
    }

    /// First enum member, if any.
    pub fn enumeration(&self) -> Option<&EnumDescriptor> {
        self.members.iter().find_map(|tag| match tag {
            TypeTag::Enum(descriptor) => Some(descriptor),
            _ => None,
        })
    }

    /// First temporal member, if any.
    pub fn date_kind(&self) -> Option<DateKind> {
        self.members.iter().find_map(|tag| match tag {
            TypeTag::Date(kind) => Some(*kind),
            _ => None,
        })
    }
}

impl From<TypeTag> for DeclaredType {
    fn from(tag: TypeTag) -> Self {
        DeclaredType::new(tag)
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nullable && self.members.len() == 1 {
            write!(f, "?")?;
        }
        for (i, tag) in self.members.iter().enumerate() {
            if i > 0 {
                write!(f, "|")?;
            }
            write!(f, "{}", tag)?;
        }
        if self.nullable && self.members.len() > 1 && !self.members.contains(&TypeTag::Null) {
            write!(f, "|null")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nullable_marker() {
        let t = DeclaredType::new(TypeTag::Int);
        assert!(!t.is_nullable());
        let t = t.nullable();
        assert!(t.is_nullable());
        assert_eq!(t.to_string(), "?int");
    }

    #[test]
    fn null_or_mixed_member_is_nullable() {
        assert!(DeclaredType::union([TypeTag::Int, TypeTag::Null]).is_nullable());
        assert!(DeclaredType::new(TypeTag::Mixed).is_nullable());
        assert!(!DeclaredType::union([TypeTag::Int, TypeTag::String]).is_nullable());
    }

    #[test]
    fn union_display_keeps_order() {
        let t = DeclaredType::union([TypeTag::Int, TypeTag::String]).nullable();
        assert_eq!(t.to_string(), "int|string|null");
        let t = DeclaredType::named("uuid");
        assert_eq!(t.to_string(), "uuid");
    }

    #[test]
    fn date_kind_lookup() {
        let t = DeclaredType::union([TypeTag::String, TypeTag::Date(DateKind::DateTime)]);
        assert_eq!(t.date_kind(), Some(DateKind::DateTime));
        assert!(t.enumeration().is_none());
    }
}
