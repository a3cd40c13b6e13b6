//! Binding resolution: which cell feeds which field, through which caster.

use std::collections::BTreeMap;

use cellmap_cast::{AnyCaster, CastContext};

use crate::describe::{AccessorKind, Assign, Candidate, Describe, Visibility};
use crate::error::{ConfigError, Error};
use crate::map_cell::{MapCell, Offset};
use crate::registry::Registry;

/// A resolved instruction: cast `record[offset]` and hand it to the field.
pub struct FieldBinding<T> {
    field: &'static str,
    kind: AccessorKind,
    offset: usize,
    column: Option<String>,
    trim: bool,
    caster: AnyCaster,
    pub(crate) candidate: usize,
    pub(crate) assign: Assign<T>,
}

impl<T> FieldBinding<T> {
    pub fn field(&self) -> &str {
        self.field
    }

    pub fn kind(&self) -> AccessorKind {
        self.kind
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Header name at the offset, when a header was supplied.
    pub fn column(&self) -> Option<&str> {
        self.column.as_deref()
    }

    pub fn caster(&self) -> &AnyCaster {
        &self.caster
    }

    pub(crate) fn trim(&self) -> bool {
        self.trim
    }

    pub(crate) fn context(&self) -> CastContext {
        CastContext {
            field: self.field.to_string(),
            offset: self.offset,
            column: self.column.clone(),
        }
    }
}

impl<T> std::fmt::Debug for FieldBinding<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldBinding")
            .field("field", &self.field)
            .field("kind", &self.kind)
            .field("offset", &self.offset)
            .field("column", &self.column)
            .field("caster", &self.caster)
            .finish()
    }
}

/// Resolve the bindings of a described target against a header.
///
/// Implicit bindings come from public properties whose name is in the
/// header. Explicit declarations are resolved next and replace any implicit
/// binding of the same field. The result keeps candidate declaration order.
pub(crate) fn resolve<T>(
    target: &str,
    describe: &Describe<T>,
    header: &[String],
    registry: &Registry,
) -> Result<Vec<FieldBinding<T>>, Error> {
    for candidate in &describe.candidates {
        if candidate.declarations.len() > 1 {
            return Err(ConfigError::DuplicateDeclaration {
                field: candidate.name.to_string(),
                count: candidate.declarations.len(),
            }
            .into());
        }
    }

    let mut bindings: BTreeMap<usize, FieldBinding<T>> = BTreeMap::new();

    for (index, candidate) in describe.candidates.iter().enumerate() {
        if !candidate.declarations.is_empty()
            || candidate.kind != AccessorKind::Property
            || candidate.visibility != Visibility::Public
        {
            continue;
        }

        // The type must be castable even when the header does not name the field.
        let caster = registry.lookup(candidate.name, &candidate.declared, None)?;
        let Some(offset) = header.iter().position(|h| h == candidate.name) else {
            continue;
        };
        bindings.insert(index, bind(index, candidate, offset, header, caster, false));
    }

    for (index, candidate) in describe.candidates.iter().enumerate() {
        let Some(cell) = candidate.declarations.first() else {
            continue;
        };
        if cell.ignore {
            continue;
        }

        let offset = resolve_offset(candidate, cell, header)?;
        let caster = registry.lookup(candidate.name, &candidate.declared, Some(cell))?;
        bindings.insert(
            index,
            bind(index, candidate, offset, header, caster, cell.trim),
        );
    }

    if bindings.is_empty() {
        return Err(ConfigError::NoBindableField {
            target: target.to_string(),
        }
        .into());
    }

    for binding in bindings.values() {
        log::trace!(
            "{}: `{}` <- offset {} via {}",
            target,
            binding.field,
            binding.offset,
            binding
                .caster
                .kind()
                .map(|k| k.as_str())
                .unwrap_or("custom caster"),
        );
    }

    Ok(bindings.into_values().collect())
}

fn bind<T>(
    index: usize,
    candidate: &Candidate<T>,
    offset: usize,
    header: &[String],
    caster: AnyCaster,
    trim: bool,
) -> FieldBinding<T> {
    FieldBinding {
        field: candidate.name,
        kind: candidate.kind,
        offset,
        column: header.get(offset).cloned(),
        trim,
        caster,
        candidate: index,
        assign: candidate.assign.clone(),
    }
}

fn resolve_offset<T>(
    candidate: &Candidate<T>,
    cell: &MapCell,
    header: &[String],
) -> Result<usize, ConfigError> {
    let offset = match &cell.column {
        Some(offset) => offset.clone(),
        None => Offset::Name(candidate.column_name()),
    };

    let resolved = match &offset {
        Offset::Index(i) => usize::try_from(*i)
            .ok()
            .filter(|i| header.is_empty() || *i < header.len()),
        // First match wins when a header repeats a name.
        Offset::Name(name) => header.iter().position(|h| h == name),
    };
    resolved.ok_or_else(|| ConfigError::offset(candidate.name, &offset, header))
}
