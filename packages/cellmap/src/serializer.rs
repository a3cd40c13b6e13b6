//! The serializer facade: resolve once, hydrate many.

use std::borrow::Cow;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};

use cellmap_cast::{CastError, Caster};

use crate::describe::{AccessorKind, Describe, Initialization, Target};
use crate::error::Error;
use crate::registry::Registry;
use crate::resolver::{resolve, FieldBinding};

/// One cell of an incoming record. `None` is a null cell.
pub trait Cell {
    fn as_cell(&self) -> Option<&str>;
}

impl Cell for str {
    fn as_cell(&self) -> Option<&str> {
        Some(self)
    }
}

impl Cell for String {
    fn as_cell(&self) -> Option<&str> {
        Some(self)
    }
}

impl<C: Cell + ?Sized> Cell for &C {
    fn as_cell(&self) -> Option<&str> {
        (**self).as_cell()
    }
}

impl Cell for Cow<'_, str> {
    fn as_cell(&self) -> Option<&str> {
        Some(self)
    }
}

impl<C: Cell> Cell for Option<C> {
    fn as_cell(&self) -> Option<&str> {
        self.as_ref().and_then(Cell::as_cell)
    }
}

/// Maps records onto instances of `T`.
///
/// Bindings are resolved once, in the constructor. After that the serializer
/// is read-only and can be shared between threads. The first hydration whose
/// casts all succeed additionally checks that every property of `T` ended up
/// initialized; later hydrations skip the check.
pub struct Serializer<T: Target> {
    describe: Describe<T>,
    bindings: Vec<FieldBinding<T>>,
    verified: AtomicBool,
}

impl<T: Target> Serializer<T> {
    /// Resolve the bindings of `T` against `header` with the built-in casters.
    /// An empty header allows integer offsets only.
    pub fn new<H: AsRef<str>>(header: &[H]) -> Result<Self, Error> {
        Self::with_registry(header, &Registry::new())
    }

    /// Resolve with a caller-supplied registry of named type casters.
    pub fn with_registry<H: AsRef<str>>(header: &[H], registry: &Registry) -> Result<Self, Error> {
        let header: Vec<String> = header.iter().map(|h| h.as_ref().to_string()).collect();
        let describe = Describe::<T>::of();
        let bindings = resolve(target_name::<T>(), &describe, &header, registry)?;
        log::debug!(
            "resolved {} binding(s) for {} against {} header column(s)",
            bindings.len(),
            target_name::<T>(),
            header.len()
        );

        Ok(Self {
            describe,
            bindings,
            verified: AtomicBool::new(false),
        })
    }

    pub fn bindings(&self) -> &[FieldBinding<T>] {
        &self.bindings
    }

    /// Map one record. Cells past the end of a short record read as null.
    pub fn hydrate<C: Cell>(&self, record: &[C]) -> Result<T, CastError> {
        let mut target = T::blank();
        let mut assigned = vec![false; self.describe.candidates.len()];

        for binding in &self.bindings {
            let cell = record.get(binding.offset()).and_then(Cell::as_cell);
            let cell = if binding.trim() { cell.map(str::trim) } else { cell };
            binding
                .caster()
                .cast(cell)
                .and_then(|value| (binding.assign)(&mut target, value))
                .map_err(|e| e.in_field(binding.context()))?;
            assigned[binding.candidate] = true;
        }

        for hook in &self.describe.hooks {
            hook(&mut target);
        }

        if !self.verified.swap(true, Ordering::AcqRel) {
            log::debug!("verifying initialization of {}", target_name::<T>());
            self.verify(&target, &assigned)?;
        }

        Ok(target)
    }

    /// Map records lazily, one per `next`. A failing record yields an error
    /// and iteration can continue with the next one.
    pub fn hydrate_all<I, C>(&self, records: I) -> HydrateAll<'_, T, I::IntoIter, C>
    where
        I: IntoIterator,
        I::Item: AsRef<[C]>,
        C: Cell,
    {
        HydrateAll {
            serializer: self,
            records: records.into_iter(),
            cells: PhantomData,
        }
    }

    fn verify(&self, target: &T, assigned: &[bool]) -> Result<(), CastError> {
        let pending = self
            .describe
            .candidates
            .iter()
            .zip(assigned)
            .filter(|(candidate, _)| candidate.kind == AccessorKind::Property)
            .find(|(candidate, assigned)| {
                let initialized = match &candidate.initialization {
                    Initialization::Assigned => **assigned,
                    Initialization::Defaulted => true,
                    Initialization::Probe(probe) => **assigned || probe(target),
                };
                !initialized
            });

        match pending {
            Some((candidate, _)) => Err(CastError::uninitialized(candidate.name)),
            None => Ok(()),
        }
    }
}

impl<T: Target> std::fmt::Debug for Serializer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Serializer")
            .field("target", &target_name::<T>())
            .field("bindings", &self.bindings)
            .field("verified", &self.verified.load(Ordering::Relaxed))
            .finish()
    }
}

/// Lazy sequence returned by [`Serializer::hydrate_all`].
pub struct HydrateAll<'a, T: Target, I, C> {
    serializer: &'a Serializer<T>,
    records: I,
    cells: PhantomData<fn() -> C>,
}

impl<'a, T, I, C> Iterator for HydrateAll<'a, T, I, C>
where
    T: Target,
    I: Iterator,
    I::Item: AsRef<[C]>,
    C: Cell,
{
    type Item = Result<T, CastError>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.records.next()?;
        Some(self.serializer.hydrate(record.as_ref()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.records.size_hint()
    }
}

/// Map a single keyed record in one call. The keys double as the header.
///
/// ```rust
/// use cellmap::{map, Describe, Target};
///
/// #[derive(Default)]
/// struct Point {
///     x: i64,
///     y: i64,
/// }
///
/// impl Target for Point {
///     fn blank() -> Self {
///         Point::default()
///     }
///
///     fn describe(fields: &mut Describe<Self>) {
///         fields.property("x", |p: &mut Point, v: i64| p.x = v);
///         fields.property("y", |p: &mut Point, v: i64| p.y = v);
///     }
/// }
///
/// let point: Point = map([("y", "4"), ("x", "3")]).unwrap();
/// assert_eq!((point.x, point.y), (3, 4));
/// ```
pub fn map<T, I, K, C>(record: I) -> Result<T, Error>
where
    T: Target,
    I: IntoIterator<Item = (K, C)>,
    K: AsRef<str>,
    C: Cell,
{
    let (header, cells): (Vec<K>, Vec<C>) = record.into_iter().unzip();
    let serializer = Serializer::<T>::new(&header)?;
    Ok(serializer.hydrate(&cells)?)
}

fn target_name<T>() -> &'static str {
    let name = std::any::type_name::<T>();
    name.rsplit("::").next().unwrap_or(name)
}
