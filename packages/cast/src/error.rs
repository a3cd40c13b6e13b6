//! Error types for the cast layer.
//!
//! Casting errors are per-cell failures. They never invalidate the caster that
//! raised them, so a caller mapping many records can skip the bad one and keep
//! going.

use std::fmt;

/// What went wrong while casting a single cell.
#[derive(thiserror::Error, Clone, Debug, PartialEq)]
pub enum CastFailure {
    /// A null cell reached a field that does not accept null.
    #[error("cannot cast null into non-nullable type `{type_name}`")]
    NotNullable { type_name: String },

    /// The cell text does not parse as the target type.
    #[error("cannot cast `{value}` into `{type_name}`: {reason}")]
    InvalidValue {
        value: String,
        type_name: String,
        reason: String,
    },

    /// One element of a list cell does not parse as the element type.
    #[error("element {index} (`{element}`) cannot be cast into `{type_name}`")]
    InvalidElement {
        index: usize,
        element: String,
        type_name: String,
    },

    /// No enumeration case matches the cell.
    #[error("`{value}` is not a case of enum `{enum_name}`")]
    UnknownEnumCase { value: String, enum_name: String },

    /// A declared field was never populated by a hydration.
    #[error("field `{field}` was left uninitialized")]
    Uninitialized { field: String },

    /// Failure reported by a user-supplied caster or setter.
    #[error("{message}")]
    Custom { message: String },
}

/// Where in the record a casting error happened.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CastContext {
    /// Target field (property or setter) being populated.
    pub field: String,
    /// Resolved index into the record.
    pub offset: usize,
    /// Header name at that offset, when a header was supplied.
    pub column: Option<String>,
}

impl fmt::Display for CastContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.column {
            Some(column) => write!(
                f,
                "field `{}` (offset {}, column `{}`)",
                self.field, self.offset, column
            ),
            None => write!(f, "field `{}` (offset {})", self.field, self.offset),
        }
    }
}

/// A casting error: a [`CastFailure`] plus, once hydration attaches it, the
/// field it happened in.
#[derive(Clone, Debug, PartialEq)]
pub struct CastError {
    failure: CastFailure,
    context: Option<CastContext>,
}

impl CastError {
    pub fn new(failure: CastFailure) -> Self {
        Self {
            failure,
            context: None,
        }
    }

    pub fn not_nullable(type_name: impl Into<String>) -> Self {
        Self::new(CastFailure::NotNullable {
            type_name: type_name.into(),
        })
    }

    pub fn invalid(
        value: impl Into<String>,
        type_name: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::new(CastFailure::InvalidValue {
            value: value.into(),
            type_name: type_name.into(),
            reason: reason.into(),
        })
    }

    pub fn uninitialized(field: impl Into<String>) -> Self {
        Self::new(CastFailure::Uninitialized {
            field: field.into(),
        })
    }

    pub fn custom(message: impl Into<String>) -> Self {
        Self::new(CastFailure::Custom {
            message: message.into(),
        })
    }

    /// Attach the field context. An existing context is kept.
    pub fn in_field(mut self, context: CastContext) -> Self {
        if self.context.is_none() {
            self.context = Some(context);
        }
        self
    }

    pub fn failure(&self) -> &CastFailure {
        &self.failure
    }

    pub fn context(&self) -> Option<&CastContext> {
        self.context.as_ref()
    }

    /// Name of the field the error happened in, if known.
    pub fn field(&self) -> Option<&str> {
        match (&self.context, &self.failure) {
            (Some(context), _) => Some(&context.field),
            (None, CastFailure::Uninitialized { field }) => Some(field),
            _ => None,
        }
    }
}

impl From<CastFailure> for CastError {
    fn from(failure: CastFailure) -> Self {
        CastError::new(failure)
    }
}

impl fmt::Display for CastError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.context {
            Some(context) => write!(f, "{}: {}", context, self.failure),
            None => write!(f, "{}", self.failure),
        }
    }
}

impl std::error::Error for CastError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.failure)
    }
}

/// A caster rejected its construction arguments.
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
#[error("invalid casting option `{option}`: {message}")]
pub struct ArgumentError {
    pub option: String,
    pub message: String,
}

impl ArgumentError {
    pub fn new(option: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            option: option.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as StdError;

    #[test]
    fn display_without_context() {
        let e = CastError::not_nullable("int");
        assert_eq!(
            e.to_string(),
            "cannot cast null into non-nullable type `int`"
        );
        assert!(e.field().is_none());
    }

    #[test]
    fn display_with_context() {
        let e = CastError::invalid("x", "int", "not an integer").in_field(CastContext {
            field: "age".to_string(),
            offset: 1,
            column: Some("age".to_string()),
        });
        let display = e.to_string();
        assert!(display.contains("field `age`"));
        assert!(display.contains("offset 1"));
        assert!(display.contains("cannot cast `x` into `int`"));
        assert_eq!(e.field(), Some("age"));
    }

    #[test]
    fn first_context_wins() {
        let first = CastContext {
            field: "inner".to_string(),
            offset: 0,
            column: None,
        };
        let second = CastContext {
            field: "outer".to_string(),
            offset: 3,
            column: None,
        };
        let e = CastError::custom("boom").in_field(first).in_field(second);
        assert_eq!(e.field(), Some("inner"));
    }

    #[test]
    fn uninitialized_names_field() {
        let e = CastError::uninitialized("score");
        assert_eq!(e.field(), Some("score"));
        assert!(StdError::source(&e).is_some());
    }

    #[test]
    fn argument_error_display() {
        let e = ArgumentError::new("shape", "unknown shape `xml`");
        assert_eq!(
            e.to_string(),
            "invalid casting option `shape`: unknown shape `xml`"
        );
    }
}
