//! The target description surface.
//!
//! A target type tells the resolver, once, which fields it exposes. Each
//! candidate field is either a property (assigned directly) or a setter (a
//! method taking one parameter). Both carry a typed assignment closure, so
//! hydration needs no runtime type introspection.

use std::sync::Arc;

use cellmap_cast::{CastError, DeclaredType, FieldType, Value};

use crate::map_cell::MapCell;

/// A type records can be mapped onto.
///
/// `blank` builds the instance hydration starts from, bypassing whatever
/// domain constructor the type normally goes through. `describe` lists the
/// candidate fields.
///
/// ```rust
/// use cellmap::{Describe, Target};
///
/// #[derive(Default)]
/// struct Person {
///     name: String,
///     age: i64,
/// }
///
/// impl Target for Person {
///     fn blank() -> Self {
///         Person::default()
///     }
///
///     fn describe(fields: &mut Describe<Self>) {
///         fields.property("name", |p: &mut Person, v: String| p.name = v);
///         fields.property("age", |p: &mut Person, v: i64| p.age = v);
///     }
/// }
/// ```
pub trait Target: Sized + 'static {
    fn blank() -> Self;

    fn describe(fields: &mut Describe<Self>);
}

pub(crate) type Assign<T> = Arc<dyn Fn(&mut T, Value) -> Result<(), CastError> + Send + Sync>;
pub(crate) type Probe<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;
pub(crate) type Hook<T> = Arc<dyn Fn(&mut T) + Send + Sync>;

/// Property or setter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessorKind {
    Property,
    Setter,
}

/// Only public properties are bound implicitly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
}

/// How the post-hydration check decides a property was initialized.
pub(crate) enum Initialization<T> {
    /// Only if a binding assigned it.
    Assigned,
    /// The blank instance already holds a meaningful value.
    Defaulted,
    /// Ask the instance.
    Probe(Probe<T>),
}

pub(crate) struct Candidate<T> {
    pub(crate) name: &'static str,
    pub(crate) kind: AccessorKind,
    pub(crate) visibility: Visibility,
    pub(crate) declared: DeclaredType,
    pub(crate) assign: Assign<T>,
    pub(crate) declarations: Vec<MapCell>,
    pub(crate) initialization: Initialization<T>,
}

impl<T> Candidate<T> {
    /// Header name used when a declaration gives no column: the property
    /// name, or the setter name without its `set` prefix.
    pub(crate) fn column_name(&self) -> String {
        match self.kind {
            AccessorKind::Property => self.name.to_string(),
            AccessorKind::Setter => setter_column(self.name),
        }
    }
}

fn setter_column(name: &str) -> String {
    match name.strip_prefix("set") {
        Some(rest) if !rest.is_empty() => {
            let mut chars = rest.chars();
            match chars.next() {
                Some(first) => first.to_lowercase().chain(chars).collect(),
                None => rest.to_string(),
            }
        }
        _ => name.to_string(),
    }
}

/// Collects the candidate fields of a target type.
pub struct Describe<T> {
    pub(crate) candidates: Vec<Candidate<T>>,
    pub(crate) hooks: Vec<Hook<T>>,
}

impl<T: Target> Describe<T> {
    pub(crate) fn of() -> Self {
        let mut describe = Self {
            candidates: Vec::new(),
            hooks: Vec::new(),
        };
        T::describe(&mut describe);
        describe
    }
}

impl<T: 'static> Describe<T> {
    /// Declare a property. Its declared type follows `V`.
    pub fn property<V, F>(&mut self, name: &'static str, assign: F) -> FieldBuilder<'_, T>
    where
        V: FieldType + 'static,
        F: Fn(&mut T, V) + Send + Sync + 'static,
    {
        self.push(name, AccessorKind::Property, V::declared_type(), typed(assign))
    }

    /// Declare a single-parameter setter method. Setters are only bound
    /// through an explicit declaration.
    pub fn setter<V, F>(&mut self, name: &'static str, call: F) -> FieldBuilder<'_, T>
    where
        V: FieldType + 'static,
        F: Fn(&mut T, V) + Send + Sync + 'static,
    {
        self.push(name, AccessorKind::Setter, V::declared_type(), typed(call))
    }

    /// Declare a setter that may reject its argument.
    pub fn try_setter<V, F>(&mut self, name: &'static str, call: F) -> FieldBuilder<'_, T>
    where
        V: FieldType + 'static,
        F: Fn(&mut T, V) -> Result<(), CastError> + Send + Sync + 'static,
    {
        let assign: Assign<T> = Arc::new(move |target: &mut T, value: Value| {
            call(target, V::from_value(value)?)
        });
        self.push(name, AccessorKind::Setter, V::declared_type(), assign)
    }

    /// Run `hook` after every binding has been applied to a record.
    pub fn after_mapping<F>(&mut self, hook: F)
    where
        F: Fn(&mut T) + Send + Sync + 'static,
    {
        self.hooks.push(Arc::new(hook));
    }

    fn push(
        &mut self,
        name: &'static str,
        kind: AccessorKind,
        declared: DeclaredType,
        assign: Assign<T>,
    ) -> FieldBuilder<'_, T> {
        self.candidates.push(Candidate {
            name,
            kind,
            visibility: Visibility::Public,
            declared,
            assign,
            declarations: Vec::new(),
            initialization: Initialization::Assigned,
        });
        let index = self.candidates.len() - 1;
        FieldBuilder {
            candidate: &mut self.candidates[index],
        }
    }
}

fn typed<T, V, F>(assign: F) -> Assign<T>
where
    T: 'static,
    V: FieldType + 'static,
    F: Fn(&mut T, V) + Send + Sync + 'static,
{
    Arc::new(move |target: &mut T, value: Value| {
        assign(target, V::from_value(value)?);
        Ok(())
    })
}

/// Refines a freshly declared candidate field.
pub struct FieldBuilder<'a, T> {
    candidate: &'a mut Candidate<T>,
}

impl<'a, T> FieldBuilder<'a, T> {
    /// Attach an explicit cell declaration. A field may carry at most one;
    /// extra declarations fail resolution.
    pub fn map(self, cell: MapCell) -> Self {
        self.candidate.declarations.push(cell);
        self
    }

    /// Shorthand for `map(MapCell::column(offset))`.
    pub fn at(self, offset: impl Into<crate::Offset>) -> Self {
        self.map(MapCell::column(offset))
    }

    /// Override the type the caster is chosen from.
    pub fn declared(self, declared: DeclaredType) -> Self {
        self.candidate.declared = declared;
        self
    }

    /// Exclude the property from implicit binding by name.
    pub fn private(self) -> Self {
        self.candidate.visibility = Visibility::Private;
        self
    }

    /// The blank instance already initializes this property.
    pub fn defaulted(self) -> Self {
        self.candidate.initialization = Initialization::Defaulted;
        self
    }

    /// Decide initialization by inspecting the hydrated instance.
    pub fn probe<F>(self, probe: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.candidate.initialization = Initialization::Probe(Arc::new(probe));
        self
    }
}
