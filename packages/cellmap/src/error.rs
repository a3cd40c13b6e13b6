//! Error types for binding resolution and hydration.

use cellmap_cast::{ArgumentError, BoxError, CastError};

use crate::map_cell::Offset;

/// Setup-time failures. Raised while a serializer resolves its bindings and
/// never per record.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// More than one explicit declaration on the same field.
    #[error("field `{field}` carries {count} cell declarations; at most one is allowed")]
    DuplicateDeclaration { field: String, count: usize },

    #[error("field `{field}`: offset {offset} must not be negative")]
    NegativeOffset { field: String, offset: i64 },

    #[error("field `{field}`: offset {offset} is out of range for a header of {len} columns")]
    OffsetOutOfRange {
        field: String,
        offset: i64,
        len: usize,
    },

    #[error("field `{field}`: column `{column}` is not in the header")]
    UnknownColumn { field: String, column: String },

    #[error("field `{field}`: column `{column}` cannot be resolved without a header")]
    ColumnWithoutHeader { field: String, column: String },

    /// No caster variant supports any member of the declared type.
    #[error("field `{field}`: no caster supports declared type `{declared}`")]
    UnsupportedType { field: String, declared: String },

    #[error("field `{field}`: {source}")]
    InvalidCastArguments {
        field: String,
        #[source]
        source: ArgumentError,
    },

    #[error("field `{field}`: an enum caster on `{declared}` needs an explicit enumeration")]
    MissingEnumType { field: String, declared: String },

    /// A custom caster failed to construct.
    #[error("field `{field}`: custom caster `{caster}` could not be built: {source}")]
    CustomCaster {
        field: String,
        caster: String,
        #[source]
        source: BoxError,
    },

    #[error("`{target}` exposes no field that can be bound")]
    NoBindableField { target: String },
}

impl ConfigError {
    pub(crate) fn offset(field: &str, offset: &Offset, header: &[String]) -> Self {
        let field = field.to_string();
        match offset {
            Offset::Index(i) if *i < 0 => ConfigError::NegativeOffset { field, offset: *i },
            Offset::Index(i) => ConfigError::OffsetOutOfRange {
                field,
                offset: *i,
                len: header.len(),
            },
            Offset::Name(column) if header.is_empty() => ConfigError::ColumnWithoutHeader {
                field,
                column: column.clone(),
            },
            Offset::Name(column) => ConfigError::UnknownColumn {
                field,
                column: column.clone(),
            },
        }
    }
}

/// Either error kind, as seen at the crate boundary.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("casting error: {0}")]
    Cast(#[from] CastError),
}

impl Error {
    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config(_))
    }

    pub fn is_cast(&self) -> bool {
        matches!(self, Error::Cast(_))
    }

    /// Recover one of the crate's error kinds from a boxed error, or hand the
    /// box back unchanged.
    pub(crate) fn from_boxed(error: BoxError) -> Result<Self, BoxError> {
        let error = match error.downcast::<Error>() {
            Ok(e) => return Ok(*e),
            Err(other) => other,
        };
        let error = match error.downcast::<ConfigError>() {
            Ok(e) => return Ok(Error::Config(*e)),
            Err(other) => other,
        };
        match error.downcast::<CastError>() {
            Ok(e) => Ok(Error::Cast(*e)),
            Err(other) => Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as StdError;

    #[test]
    fn offset_errors() {
        let header = vec!["a".to_string(), "b".to_string()];
        let e = ConfigError::offset("age", &Offset::Index(-1), &header);
        assert!(matches!(e, ConfigError::NegativeOffset { offset: -1, .. }));

        let e = ConfigError::offset("age", &Offset::Index(2), &header);
        assert!(e.to_string().contains("out of range"));

        let e = ConfigError::offset("age", &Offset::Name("c".into()), &header);
        assert!(matches!(e, ConfigError::UnknownColumn { .. }));

        let e = ConfigError::offset("age", &Offset::Name("c".into()), &[]);
        assert!(matches!(e, ConfigError::ColumnWithoutHeader { .. }));
    }

    #[test]
    fn from_boxed_recovers_domain_kinds() {
        let boxed: BoxError = Box::new(CastError::custom("bad"));
        assert!(Error::from_boxed(boxed).unwrap().is_cast());

        let boxed: BoxError = Box::new(ConfigError::NoBindableField {
            target: "T".to_string(),
        });
        assert!(Error::from_boxed(boxed).unwrap().is_config());

        let boxed: BoxError = "plain".into();
        assert_eq!(Error::from_boxed(boxed).unwrap_err().to_string(), "plain");
    }

    #[test]
    fn invalid_arguments_keep_source() {
        let e = ConfigError::InvalidCastArguments {
            field: "tags".to_string(),
            source: ArgumentError::new("shape", "unknown shape `xml`"),
        };
        assert!(e.to_string().contains("tags"));
        assert!(StdError::source(&e).is_some());
    }
}
