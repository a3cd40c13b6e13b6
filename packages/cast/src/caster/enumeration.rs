use crate::args::{Arg, CastArgs, Scalar};
use crate::caster::numeric::parse_int;
use crate::caster::{Caster, NullPolicy};
use crate::enumeration::{Backed, Backing, EnumCase, EnumDescriptor, EnumValue};
use crate::error::{ArgumentError, CastError, CastFailure};
use crate::value::Value;

/// Resolves a cell to a case of an enumeration.
///
/// Unbacked enumerations match the case name. Backed ones match the backing
/// value; for integer-backed enumerations the cell is parsed as an integer
/// first.
#[derive(Clone, Debug, PartialEq)]
pub struct CastToEnum {
    nulls: NullPolicy,
    descriptor: EnumDescriptor,
}

impl CastToEnum {
    /// Options: `default` (a case name or backing value).
    pub fn new(
        descriptor: EnumDescriptor,
        nullable: bool,
        args: &CastArgs,
    ) -> Result<Self, ArgumentError> {
        let mut reader = args.reader();
        let default = reader.raw("default").cloned();
        reader.finish()?;

        let mut caster = Self {
            nulls: NullPolicy::new(descriptor.name(), nullable, Value::Null),
            descriptor,
        };
        if let Some(default) = default {
            let text = match &default {
                Arg::Scalar(Scalar::Str(s)) => s.clone(),
                Arg::Scalar(Scalar::Int(i)) => i.to_string(),
                other => {
                    return Err(ArgumentError::new(
                        "default",
                        format!("expected a case name or backing value, got `{}`", other),
                    ))
                }
            };
            // A default may name the case even for a backed enumeration.
            let case = caster
                .lookup(&text)
                .or_else(|| caster.descriptor.case_named(&text))
                .ok_or_else(|| {
                    ArgumentError::new(
                        "default",
                        format!("`{}` is not a case of `{}`", text, caster.descriptor.name()),
                    )
                })?;
            let value = caster.value_of(case);
            caster.nulls = NullPolicy::new(caster.descriptor.name(), nullable, value);
        }
        Ok(caster)
    }

    pub fn null_policy(&self) -> &NullPolicy {
        &self.nulls
    }

    pub fn descriptor(&self) -> &EnumDescriptor {
        &self.descriptor
    }

    fn lookup(&self, text: &str) -> Option<&EnumCase> {
        match self.descriptor.backing() {
            Backing::Unbacked => self.descriptor.case_named(text),
            Backing::Int => {
                let value = parse_int(text)?;
                self.descriptor.case_backed_by(&Backed::Int(value))
            }
            Backing::Str => self
                .descriptor
                .cases()
                .iter()
                .find(|case| matches!(case.value, Some(Backed::Str(s)) if s == text)),
        }
    }

    fn value_of(&self, case: &EnumCase) -> Value {
        Value::Enum(EnumValue {
            enum_name: self.descriptor.name(),
            case: case.name,
        })
    }
}

impl Caster for CastToEnum {
    fn cast(&self, value: Option<&str>) -> Result<Value, CastError> {
        let Some(text) = value else {
            return self.nulls.on_null();
        };
        match self.lookup(text) {
            Some(case) => Ok(self.value_of(case)),
            None => Err(CastError::new(CastFailure::UnknownEnumCase {
                value: text.to_string(),
                enum_name: self.descriptor.name().to_string(),
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level() -> EnumDescriptor {
        EnumDescriptor::int_backed("Level", &[("A", 1), ("B", 2)])
    }

    fn case(enum_name: &'static str, case: &'static str) -> Value {
        Value::Enum(EnumValue { enum_name, case })
    }

    #[test]
    fn int_backed_lookup() {
        let c = CastToEnum::new(level(), false, &CastArgs::new()).unwrap();
        assert_eq!(c.cast(Some("2")).unwrap(), case("Level", "B"));
        assert_eq!(c.cast(Some(" 1 ")).unwrap(), case("Level", "A"));
        assert!(c.cast(Some("9")).is_err());
        assert!(c.cast(Some("B")).is_err());
    }

    #[test]
    fn unbacked_lookup_by_name() {
        let d = EnumDescriptor::unbacked("Suit", &["Hearts", "Spades"]);
        let c = CastToEnum::new(d, false, &CastArgs::new()).unwrap();
        assert_eq!(c.cast(Some("Spades")).unwrap(), case("Suit", "Spades"));
        assert!(c.cast(Some("spades")).is_err());
    }

    #[test]
    fn string_backed_lookup() {
        let d = EnumDescriptor::str_backed("Color", &[("Red", "r"), ("Green", "g")]);
        let c = CastToEnum::new(d, false, &CastArgs::new()).unwrap();
        assert_eq!(c.cast(Some("g")).unwrap(), case("Color", "Green"));
        assert!(c.cast(Some("Green")).is_err());
    }

    #[test]
    fn default_by_value_or_name() {
        let c = CastToEnum::new(level(), true, &CastArgs::new().with("default", 2)).unwrap();
        assert_eq!(c.cast(None).unwrap(), case("Level", "B"));

        let c = CastToEnum::new(level(), true, &CastArgs::new().with("default", "A")).unwrap();
        assert_eq!(c.cast(None).unwrap(), case("Level", "A"));

        assert!(CastToEnum::new(level(), true, &CastArgs::new().with("default", 5)).is_err());
    }

    #[test]
    fn null_without_nullable_fails() {
        let c = CastToEnum::new(level(), false, &CastArgs::new()).unwrap();
        let err = c.cast(None).unwrap_err();
        assert!(matches!(err.failure(), CastFailure::NotNullable { .. }));
    }
}
