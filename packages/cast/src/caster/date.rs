use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone};

use crate::args::CastArgs;
use crate::caster::{Caster, NullPolicy};
use crate::error::{ArgumentError, CastError};
use crate::types::DateKind;
use crate::value::Value;

/// Patterns tried, in order, when no explicit format is configured.
/// RFC 3339 is tried before all of them.
const NAIVE_PATTERNS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];
const DATE_PATTERN: &str = "%Y-%m-%d";

/// What the text parsed into, before conversion to the declared kind.
enum Parsed {
    Zoned(DateTime<FixedOffset>),
    Naive(NaiveDateTime),
    Day(NaiveDate),
}

/// Parses a date, date-time or timestamp.
///
/// With a `format` (strftime syntax) the text must match it exactly;
/// otherwise RFC 3339 and a handful of ISO-8601 layouts are accepted. A
/// `timezone` is attached to naive input and used to convert zoned input.
#[derive(Clone, Debug, PartialEq)]
pub struct CastToDate {
    nulls: NullPolicy,
    kind: DateKind,
    format: Option<String>,
    timezone: Option<FixedOffset>,
}

impl CastToDate {
    /// Options: `default` (a date string in the same layout as cells),
    /// `format`, `timezone` (`UTC`, `Z` or `±HH:MM`).
    pub fn new(kind: DateKind, nullable: bool, args: &CastArgs) -> Result<Self, ArgumentError> {
        let mut reader = args.reader();
        let format = reader.string("format")?;
        let timezone = match reader.string("timezone")? {
            None => None,
            Some(tz) => Some(parse_timezone(&tz).ok_or_else(|| {
                ArgumentError::new("timezone", format!("unknown timezone `{}`", tz))
            })?),
        };
        let default = reader.string("default")?;
        reader.finish()?;

        let mut caster = Self {
            nulls: NullPolicy::new(kind.as_str(), nullable, Value::Null),
            kind,
            format,
            timezone,
        };
        if let Some(text) = default {
            let value = caster.convert(&text).ok_or_else(|| {
                ArgumentError::new("default", format!("`{}` is not a valid {}", text, kind.as_str()))
            })?;
            caster.nulls = NullPolicy::new(kind.as_str(), nullable, value);
        }
        Ok(caster)
    }

    pub fn null_policy(&self) -> &NullPolicy {
        &self.nulls
    }

    pub fn kind(&self) -> DateKind {
        self.kind
    }

    fn parse(&self, text: &str) -> Option<Parsed> {
        let text = text.trim();
        match &self.format {
            Some(format) => DateTime::parse_from_str(text, format)
                .ok()
                .map(Parsed::Zoned)
                .or_else(|| {
                    NaiveDateTime::parse_from_str(text, format)
                        .ok()
                        .map(Parsed::Naive)
                })
                .or_else(|| NaiveDate::parse_from_str(text, format).ok().map(Parsed::Day)),
            None => DateTime::parse_from_rfc3339(text)
                .ok()
                .map(Parsed::Zoned)
                .or_else(|| {
                    NAIVE_PATTERNS
                        .iter()
                        .find_map(|p| NaiveDateTime::parse_from_str(text, p).ok())
                        .map(Parsed::Naive)
                })
                .or_else(|| {
                    NaiveDate::parse_from_str(text, DATE_PATTERN)
                        .ok()
                        .map(Parsed::Day)
                }),
        }
    }

    fn convert(&self, text: &str) -> Option<Value> {
        let parsed = match self.parse(text)? {
            Parsed::Zoned(ts) => match self.timezone {
                Some(tz) => Parsed::Zoned(ts.with_timezone(&tz)),
                None => Parsed::Zoned(ts),
            },
            other => other,
        };

        let value = match (self.kind, parsed) {
            (DateKind::Date, Parsed::Zoned(ts)) => Value::Date(ts.date_naive()),
            (DateKind::Date, Parsed::Naive(dt)) => Value::Date(dt.date()),
            (DateKind::Date, Parsed::Day(d)) => Value::Date(d),
            (DateKind::DateTime, Parsed::Zoned(ts)) => Value::DateTime(ts.naive_local()),
            (DateKind::DateTime, Parsed::Naive(dt)) => Value::DateTime(dt),
            (DateKind::DateTime, Parsed::Day(d)) => Value::DateTime(d.and_hms_opt(0, 0, 0)?),
            (DateKind::Timestamp, Parsed::Zoned(ts)) => Value::Timestamp(ts),
            (DateKind::Timestamp, Parsed::Naive(dt)) => Value::Timestamp(self.localize(dt)?),
            (DateKind::Timestamp, Parsed::Day(d)) => {
                Value::Timestamp(self.localize(d.and_hms_opt(0, 0, 0)?)?)
            }
        };
        Some(value)
    }

    fn localize(&self, naive: NaiveDateTime) -> Option<DateTime<FixedOffset>> {
        let tz = match self.timezone {
            Some(tz) => tz,
            None => FixedOffset::east_opt(0)?,
        };
        tz.from_local_datetime(&naive).single()
    }
}

impl Caster for CastToDate {
    fn cast(&self, value: Option<&str>) -> Result<Value, CastError> {
        let Some(text) = value else {
            return self.nulls.on_null();
        };
        self.convert(text).ok_or_else(|| {
            let reason = match &self.format {
                Some(format) => format!("does not match format `{}`", format),
                None => "not a recognized date".to_string(),
            };
            CastError::invalid(text, self.kind.as_str(), reason)
        })
    }
}

/// `UTC`, `Z`, `+HH:MM`, `-HHMM` or `+HH`.
fn parse_timezone(tz: &str) -> Option<FixedOffset> {
    let tz = tz.trim();
    if tz.eq_ignore_ascii_case("utc") || tz == "Z" {
        return FixedOffset::east_opt(0);
    }

    let (sign, rest) = match tz.as_bytes().first()? {
        b'+' => (1, &tz[1..]),
        b'-' => (-1, &tz[1..]),
        _ => return None,
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let (hours, minutes) = match digits.len() {
        2 => (digits.parse::<i32>().ok()?, 0),
        4 => (digits[..2].parse::<i32>().ok()?, digits[2..].parse::<i32>().ok()?),
        _ => return None,
    };
    if hours > 23 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
