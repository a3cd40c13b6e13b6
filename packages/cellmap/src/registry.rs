//! The type-cast registry: declared type in, configured caster out.

use std::collections::HashMap;

use cellmap_cast::{
    AnyCaster, BuiltinCaster, CastArgs, CasterKind, CustomCaster, CustomFactory, DateKind,
    DeclaredType, EnumDescriptor, TypeTag,
};

use crate::error::{ConfigError, Error};
use crate::map_cell::MapCell;

/// Picks and builds the caster for a field.
///
/// A union type is tried member by member in declaration order; the first
/// member any caster supports wins. Named types are looked up among the
/// registered custom casters before the built-in variants are considered.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    types: HashMap<String, CustomFactory>,
}

/// What a single declared member resolves to.
enum Choice {
    Builtin(CasterKind),
    Date(DateKind),
    Enum(EnumDescriptor),
    Custom(CustomFactory),
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a custom caster to a named type. Replaces any previous binding.
    pub fn register_type<C: CustomCaster>(&mut self, name: impl Into<String>) {
        self.types.insert(name.into(), CustomFactory::of::<C>());
    }

    pub fn register_factory(&mut self, name: impl Into<String>, factory: CustomFactory) {
        self.types.insert(name.into(), factory);
    }

    /// Returns whether a caster was registered under `name`.
    pub fn unregister_type(&mut self, name: &str) -> bool {
        self.types.remove(name).is_some()
    }

    pub fn supports(&self, declared: &DeclaredType) -> bool {
        declared
            .members()
            .iter()
            .any(|tag| self.choose(tag).is_some())
    }

    /// Build the caster for `field`.
    ///
    /// An explicit declaration may override the caster (custom first, then a
    /// built-in kind) and always supplies the construction arguments.
    pub fn lookup(
        &self,
        field: &str,
        declared: &DeclaredType,
        cell: Option<&MapCell>,
    ) -> Result<AnyCaster, Error> {
        let empty = CastArgs::new();
        let args = cell.map(|c| &c.options).unwrap_or(&empty);

        if let Some(factory) = cell.and_then(|c| c.custom.as_ref()) {
            return self.build_custom(field, factory, declared, args);
        }

        let choice = match cell.and_then(|c| c.cast) {
            Some(kind) => self.override_choice(field, kind, declared, cell)?,
            None => declared
                .members()
                .iter()
                .find_map(|tag| self.choose(tag))
                .ok_or_else(|| ConfigError::UnsupportedType {
                    field: field.to_string(),
                    declared: declared.to_string(),
                })?,
        };

        let nullable = declared.is_nullable();
        let built = match choice {
            Choice::Custom(factory) => return self.build_custom(field, &factory, declared, args),
            Choice::Builtin(kind) => BuiltinCaster::build(kind, nullable, args),
            Choice::Date(kind) => BuiltinCaster::date(kind, nullable, args),
            Choice::Enum(descriptor) => BuiltinCaster::enumeration(descriptor, nullable, args),
        };
        built
            .map(AnyCaster::Builtin)
            .map_err(|source| {
                ConfigError::InvalidCastArguments {
                    field: field.to_string(),
                    source,
                }
                .into()
            })
    }

    /// Fixed priority: mixed/null/string, iterable/array, bool/true/false,
    /// float, int, dates, enums.
    fn choose(&self, tag: &TypeTag) -> Option<Choice> {
        match tag {
            TypeTag::Mixed | TypeTag::Null | TypeTag::String => {
                Some(Choice::Builtin(CasterKind::String))
            }
            TypeTag::Iterable | TypeTag::Array => Some(Choice::Builtin(CasterKind::Array)),
            TypeTag::Bool | TypeTag::True | TypeTag::False => {
                Some(Choice::Builtin(CasterKind::Bool))
            }
            TypeTag::Float => Some(Choice::Builtin(CasterKind::Float)),
            TypeTag::Int => Some(Choice::Builtin(CasterKind::Int)),
            TypeTag::Date(kind) => Some(Choice::Date(*kind)),
            TypeTag::Enum(descriptor) => Some(Choice::Enum(descriptor.clone())),
            TypeTag::Named(name) => self.types.get(&**name).cloned().map(Choice::Custom),
        }
    }

    fn override_choice(
        &self,
        field: &str,
        kind: CasterKind,
        declared: &DeclaredType,
        cell: Option<&MapCell>,
    ) -> Result<Choice, ConfigError> {
        match kind {
            CasterKind::Date => Ok(Choice::Date(
                declared.date_kind().unwrap_or(DateKind::Timestamp),
            )),
            CasterKind::Enum => cell
                .and_then(|c| c.enumeration.clone())
                .or_else(|| declared.enumeration().cloned())
                .map(Choice::Enum)
                .ok_or_else(|| ConfigError::MissingEnumType {
                    field: field.to_string(),
                    declared: declared.to_string(),
                }),
            other => Ok(Choice::Builtin(other)),
        }
    }

    fn build_custom(
        &self,
        field: &str,
        factory: &CustomFactory,
        declared: &DeclaredType,
        args: &CastArgs,
    ) -> Result<AnyCaster, Error> {
        factory
            .build(declared, args)
            .map(AnyCaster::Custom)
            .map_err(|e| match Error::from_boxed(e) {
                Ok(domain) => domain,
                Err(source) => ConfigError::CustomCaster {
                    field: field.to_string(),
                    caster: factory.name().to_string(),
                    source,
                }
                .into(),
            })
    }
}
