use crate::args::{Arg, CastArgs, Scalar};
use crate::caster::{Caster, NullPolicy};
use crate::error::{ArgumentError, CastError};
use crate::value::Value;

/// Parses a base-10 integer, surrounding whitespace allowed.
#[derive(Clone, Debug, PartialEq)]
pub struct CastToInt {
    nulls: NullPolicy,
}

impl CastToInt {
    /// Options: `default` (int).
    pub fn new(nullable: bool, args: &CastArgs) -> Result<Self, ArgumentError> {
        let mut reader = args.reader();
        let default = match reader.raw("default") {
            None => Value::Null,
            Some(Arg::Scalar(Scalar::Int(i))) => Value::Integer(*i),
            Some(other) => {
                return Err(ArgumentError::new(
                    "default",
                    format!("expected an integer, got `{}`", other),
                ))
            }
        };
        reader.finish()?;

        Ok(Self {
            nulls: NullPolicy::new("int", nullable, default),
        })
    }

    pub fn null_policy(&self) -> &NullPolicy {
        &self.nulls
    }
}

impl Caster for CastToInt {
    fn cast(&self, value: Option<&str>) -> Result<Value, CastError> {
        let Some(text) = value else {
            return self.nulls.on_null();
        };
        parse_int(text)
            .map(Value::Integer)
            .ok_or_else(|| CastError::invalid(text, "int", "not an integer"))
    }
}

pub(crate) fn parse_int(text: &str) -> Option<i64> {
    text.trim().parse::<i64>().ok()
}

/// Parses a finite floating point number, surrounding whitespace allowed.
#[derive(Clone, Debug, PartialEq)]
pub struct CastToFloat {
    nulls: NullPolicy,
}

impl CastToFloat {
    /// Options: `default` (float or int).
    pub fn new(nullable: bool, args: &CastArgs) -> Result<Self, ArgumentError> {
        let mut reader = args.reader();
        let default = match reader.raw("default") {
            None => Value::Null,
            Some(Arg::Scalar(Scalar::Float(f))) => Value::Float(*f),
            Some(Arg::Scalar(Scalar::Int(i))) => Value::Float(*i as f64),
            Some(other) => {
                return Err(ArgumentError::new(
                    "default",
                    format!("expected a number, got `{}`", other),
                ))
            }
        };
        reader.finish()?;

        Ok(Self {
            nulls: NullPolicy::new("float", nullable, default),
        })
    }

    pub fn null_policy(&self) -> &NullPolicy {
        &self.nulls
    }
}

impl Caster for CastToFloat {
    fn cast(&self, value: Option<&str>) -> Result<Value, CastError> {
        let Some(text) = value else {
            return self.nulls.on_null();
        };
        parse_float(text)
            .map(Value::Float)
            .ok_or_else(|| CastError::invalid(text, "float", "not a number"))
    }
}

// `f64::from_str` also accepts "inf" and "NaN"; cells never mean those.
pub(crate) fn parse_float(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|f| f.is_finite())
}
