use crate::args::{Arg, CastArgs, Scalar};
use crate::caster::{Caster, NullPolicy};
use crate::error::{ArgumentError, CastError};
use crate::value::Value;

/// Passes the cell text through unchanged.
#[derive(Clone, Debug, PartialEq)]
pub struct CastToString {
    nulls: NullPolicy,
}

impl CastToString {
    /// Options: `default` (string).
    pub fn new(nullable: bool, args: &CastArgs) -> Result<Self, ArgumentError> {
        let mut reader = args.reader();
        let default = match reader.raw("default") {
            None => Value::Null,
            Some(Arg::Scalar(Scalar::Str(s))) => Value::String(s.clone()),
            Some(other) => {
                return Err(ArgumentError::new(
                    "default",
                    format!("expected a string, got `{}`", other),
                ))
            }
        };
        reader.finish()?;

        Ok(Self {
            nulls: NullPolicy::new("string", nullable, default),
        })
    }

    pub fn null_policy(&self) -> &NullPolicy {
        &self.nulls
    }
}

impl Caster for CastToString {
    fn cast(&self, value: Option<&str>) -> Result<Value, CastError> {
        match value {
            Some(text) => Ok(Value::String(text.to_string())),
            None => self.nulls.on_null(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_text_through() {
        let c = CastToString::new(false, &CastArgs::new()).unwrap();
        assert_eq!(c.cast(Some(" Ann ")).unwrap(), Value::from(" Ann "));
        assert_eq!(c.cast(Some("")).unwrap(), Value::from(""));
    }

    #[test]
    fn null_uses_default_when_nullable() {
        let args = CastArgs::new().with("default", "n/a");
        let c = CastToString::new(true, &args).unwrap();
        assert_eq!(c.cast(None).unwrap(), Value::from("n/a"));

        let c = CastToString::new(true, &CastArgs::new()).unwrap();
        assert_eq!(c.cast(None).unwrap(), Value::Null);
    }

    #[test]
    fn null_fails_when_not_nullable() {
        let c = CastToString::new(false, &CastArgs::new()).unwrap();
        assert!(c.cast(None).is_err());
    }

    #[test]
    fn rejects_non_string_default() {
        let args = CastArgs::new().with("default", 3);
        assert!(CastToString::new(true, &args).is_err());
    }
}
