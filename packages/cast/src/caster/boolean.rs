use crate::args::{Arg, CastArgs, Scalar};
use crate::caster::{Caster, NullPolicy};
use crate::error::{ArgumentError, CastError};
use crate::value::Value;

const TRUTHY: &[&str] = &["1", "true", "on", "yes"];
const FALSY: &[&str] = &["0", "false", "off", "no", ""];

/// Matches the cell against truthy and falsy token sets.
///
/// Tokens are compared case-insensitively after trimming. A token in neither
/// set is a casting error.
#[derive(Clone, Debug, PartialEq)]
pub struct CastToBool {
    nulls: NullPolicy,
    truthy: Vec<String>,
    falsy: Vec<String>,
}

impl CastToBool {
    /// Options: `default` (bool), `true` and `false` (token lists replacing
    /// the built-in sets).
    pub fn new(nullable: bool, args: &CastArgs) -> Result<Self, ArgumentError> {
        let mut reader = args.reader();
        let default = match reader.raw("default") {
            None => Value::Null,
            Some(Arg::Scalar(Scalar::Bool(b))) => Value::Bool(*b),
            Some(other) => {
                return Err(ArgumentError::new(
                    "default",
                    format!("expected a boolean, got `{}`", other),
                ))
            }
        };
        let truthy = normalize(reader.tokens("true")?, TRUTHY);
        let falsy = normalize(reader.tokens("false")?, FALSY);
        reader.finish()?;

        if let Some(token) = truthy.iter().find(|t| falsy.contains(t)) {
            return Err(ArgumentError::new(
                "true",
                format!("token `{}` is both truthy and falsy", token),
            ));
        }

        Ok(Self {
            nulls: NullPolicy::new("bool", nullable, default),
            truthy,
            falsy,
        })
    }

    pub fn null_policy(&self) -> &NullPolicy {
        &self.nulls
    }
}

fn normalize(tokens: Option<Vec<String>>, fallback: &[&str]) -> Vec<String> {
    match tokens {
        Some(tokens) => tokens.iter().map(|t| t.trim().to_lowercase()).collect(),
        None => fallback.iter().map(|t| t.to_string()).collect(),
    }
}

/// Match against the built-in token sets.
pub(crate) fn default_token(text: &str) -> Option<bool> {
    let token = text.trim().to_lowercase();
    if TRUTHY.contains(&token.as_str()) {
        Some(true)
    } else if FALSY.contains(&token.as_str()) {
        Some(false)
    } else {
        None
    }
}

impl Caster for CastToBool {
    fn cast(&self, value: Option<&str>) -> Result<Value, CastError> {
        let Some(text) = value else {
            return self.nulls.on_null();
        };
        let token = text.trim().to_lowercase();
        if self.truthy.contains(&token) {
            Ok(Value::Bool(true))
        } else if self.falsy.contains(&token) {
            Ok(Value::Bool(false))
        } else {
            Err(CastError::invalid(text, "bool", "unrecognized boolean token"))
        }
    }
}
