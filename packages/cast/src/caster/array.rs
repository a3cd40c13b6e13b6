use crate::args::{Arg, CastArgs};
use crate::caster::boolean::default_token;
use crate::caster::numeric::{parse_float, parse_int};
use crate::caster::{Caster, NullPolicy};
use crate::error::{ArgumentError, CastError, CastFailure};
use crate::value::{json_to_value, Value};

/// How an array cell is laid out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArrayShape {
    /// Items separated by a delimiter string, no quoting.
    List,
    /// A single CSV line with its own delimiter, enclosure and escape.
    Csv,
    /// A JSON array or object.
    Json,
}

impl ArrayShape {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "list" => Some(ArrayShape::List),
            "csv" => Some(ArrayShape::Csv),
            "json" => Some(ArrayShape::Json),
            _ => None,
        }
    }
}

/// Element type applied to list and CSV items.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementType {
    String,
    Int,
    Float,
    Bool,
}

impl ElementType {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "string" => Some(ElementType::String),
            "int" => Some(ElementType::Int),
            "float" => Some(ElementType::Float),
            "bool" => Some(ElementType::Bool),
            _ => None,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            ElementType::String => "string",
            ElementType::Int => "int",
            ElementType::Float => "float",
            ElementType::Bool => "bool",
        }
    }

    fn convert(&self, item: String) -> Option<Value> {
        match self {
            ElementType::String => Some(Value::String(item)),
            ElementType::Int => parse_int(&item).map(Value::Integer),
            ElementType::Float => parse_float(&item).map(Value::Float),
            ElementType::Bool => default_token(&item).map(Value::Bool),
        }
    }
}

/// Splits a cell into a collection.
///
/// An empty cell is always an empty collection, whatever the shape.
#[derive(Clone, Debug, PartialEq)]
pub struct CastToArray {
    nulls: NullPolicy,
    shape: ArrayShape,
    delimiter: String,
    enclosure: u8,
    escape: Option<u8>,
    element: ElementType,
}

impl CastToArray {
    /// Options: `default` (list), `shape` (`list`, `csv`, `json`; default
    /// `list`), `delimiter` (default `,`), `enclosure` (default `"`), `escape`
    /// (default: enclosure doubling), `type` (element type; default `string`).
    pub fn new(nullable: bool, args: &CastArgs) -> Result<Self, ArgumentError> {
        let mut reader = args.reader();
        let default = match reader.raw("default") {
            None => Value::Null,
            Some(Arg::List(items)) => Value::Array(items.iter().cloned().map(Value::from).collect()),
            Some(other) => {
                return Err(ArgumentError::new(
                    "default",
                    format!("expected a list, got `{}`", other),
                ))
            }
        };
        let shape = match reader.string("shape")? {
            None => ArrayShape::List,
            Some(s) => ArrayShape::parse(&s)
                .ok_or_else(|| ArgumentError::new("shape", format!("unknown shape `{}`", s)))?,
        };
        let delimiter = reader.string("delimiter")?.unwrap_or_else(|| ",".to_string());
        let enclosure = reader.byte("enclosure")?.unwrap_or(b'"');
        let escape = reader.byte("escape")?;
        let element = match reader.string("type")? {
            None => ElementType::String,
            Some(s) => ElementType::parse(&s)
                .ok_or_else(|| ArgumentError::new("type", format!("unknown element type `{}`", s)))?,
        };
        reader.finish()?;

        if delimiter.is_empty() {
            return Err(ArgumentError::new("delimiter", "must not be empty"));
        }
        if shape == ArrayShape::Csv && (delimiter.len() != 1 || !delimiter.is_ascii()) {
            return Err(ArgumentError::new(
                "delimiter",
                "a csv shape needs a single ASCII delimiter",
            ));
        }
        if shape == ArrayShape::Json && element != ElementType::String {
            return Err(ArgumentError::new(
                "type",
                "element types apply to list and csv shapes only",
            ));
        }

        Ok(Self {
            nulls: NullPolicy::new("array", nullable, default),
            shape,
            delimiter,
            enclosure,
            escape,
            element,
        })
    }

    pub fn null_policy(&self) -> &NullPolicy {
        &self.nulls
    }

    pub fn shape(&self) -> ArrayShape {
        self.shape
    }

    fn split_list(&self, text: &str) -> Vec<String> {
        text.split(self.delimiter.as_str()).map(str::to_string).collect()
    }

    fn split_csv(&self, text: &str) -> Result<Vec<String>, CastError> {
        if !self.quotes_balanced(text) {
            return Err(CastError::invalid(text, "array", "unbalanced enclosure"));
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(self.delimiter.as_bytes()[0])
            .quote(self.enclosure)
            .escape(self.escape)
            .double_quote(self.escape.is_none())
            .from_reader(text.as_bytes());

        let mut record = csv::StringRecord::new();
        let items = match reader.read_record(&mut record) {
            Ok(true) => record.iter().map(str::to_string).collect(),
            Ok(false) => return Ok(Vec::new()),
            Err(e) => return Err(CastError::invalid(text, "array", e.to_string())),
        };

        // An unquoted line break would otherwise cut the cell short.
        match reader.read_record(&mut record) {
            Ok(false) => Ok(items),
            Ok(true) => Err(CastError::invalid(
                text,
                "array",
                "cell spans more than one CSV line",
            )),
            Err(e) => Err(CastError::invalid(text, "array", e.to_string())),
        }
    }

    fn quotes_balanced(&self, text: &str) -> bool {
        let mut count = 0usize;
        let mut escaped = false;
        for byte in text.bytes() {
            if escaped {
                escaped = false;
                continue;
            }
            if Some(byte) == self.escape && byte != self.enclosure {
                escaped = true;
            } else if byte == self.enclosure {
                count += 1;
            }
        }
        count % 2 == 0
    }

    fn typed(&self, items: Vec<String>) -> Result<Value, CastError> {
        let mut values = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            match self.element.convert(item.clone()) {
                Some(value) => values.push(value),
                None => {
                    return Err(CastError::new(CastFailure::InvalidElement {
                        index,
                        element: item,
                        type_name: self.element.as_str().to_string(),
                    }))
                }
            }
        }
        Ok(Value::Array(values))
    }
}

impl Caster for CastToArray {
    fn cast(&self, value: Option<&str>) -> Result<Value, CastError> {
        let Some(text) = value else {
            return self.nulls.on_null();
        };
        if text.is_empty() {
            return Ok(Value::Array(Vec::new()));
        }

        match self.shape {
            ArrayShape::List => self.typed(self.split_list(text)),
            ArrayShape::Csv => self.typed(self.split_csv(text)?),
            ArrayShape::Json => {
                let json: serde_json::Value = serde_json::from_str(text)
                    .map_err(|e| CastError::invalid(text, "array", e.to_string()))?;
                match json {
                    serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
                        Ok(json_to_value(json))
                    }
                    _ => Err(CastError::invalid(
                        text,
                        "array",
                        "JSON document is not an array or object",
                    )),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caster(args: CastArgs) -> CastToArray {
        CastToArray::new(false, &args).unwrap()
    }

    fn strings(items: &[&str]) -> Value {
        Value::Array(items.iter().map(|s| Value::from(*s)).collect())
    }

    #[test]
    fn list_with_delimiter() {
        let c = caster(CastArgs::new().with("delimiter", "|"));
        assert_eq!(c.cast(Some("a|b|c")).unwrap(), strings(&["a", "b", "c"]));
    }

    #[test]
    fn empty_cell_is_empty_collection_in_every_shape() {
        for shape in ["list", "csv", "json"] {
            let c = caster(CastArgs::new().with("shape", shape));
            assert_eq!(c.cast(Some("")).unwrap(), Value::Array(Vec::new()), "{}", shape);
        }
    }

    #[test]
    fn csv_shape_honours_enclosure() {
        let c = caster(CastArgs::new().with("shape", "csv").with("delimiter", ";"));
        assert_eq!(
            c.cast(Some(r#"a;"b;c";d"#)).unwrap(),
            strings(&["a", "b;c", "d"])
        );
    }

    #[test]
    fn csv_shape_rejects_unbalanced_quotes() {
        let c = caster(CastArgs::new().with("shape", "csv"));
        assert!(c.cast(Some(r#"a,"b,c"#)).is_err());
    }

    #[test]
    fn csv_shape_rejects_unquoted_line_breaks() {
        let c = caster(CastArgs::new().with("shape", "csv"));
        assert!(c.cast(Some("a,b\nc,d")).is_err());
        assert!(c.cast(Some("a,b\r\nc")).is_err());

        assert_eq!(
            c.cast(Some("\"a\nb\",c")).unwrap(),
            strings(&["a\nb", "c"])
        );
        assert_eq!(c.cast(Some("a,b\n")).unwrap(), strings(&["a", "b"]));
    }

    #[test]
    fn csv_shape_with_escape() {
        let c = caster(
            CastArgs::new()
                .with("shape", "csv")
                .with("escape", "\\"),
        );
        assert_eq!(
            c.cast(Some(r#"a,"say \"hi\"""#)).unwrap(),
            strings(&["a", r#"say "hi""#])
        );
    }

    #[test]
    fn json_shape() {
        let c = caster(CastArgs::new().with("shape", "json"));
        assert_eq!(
            c.cast(Some(r#"[1, "x"]"#)).unwrap(),
            Value::Array(vec![Value::Integer(1), Value::from("x")])
        );
        assert!(c.cast(Some("[1, ")).is_err());
        assert!(c.cast(Some("42")).is_err());
    }

    #[test]
    fn element_type_conversion() {
        let c = caster(CastArgs::new().with("type", "int"));
        assert_eq!(
            c.cast(Some("1,2,3")).unwrap(),
            Value::Array(vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)])
        );
        let err = c.cast(Some("1,x")).unwrap_err();
        assert!(matches!(
            err.failure(),
            CastFailure::InvalidElement { index: 1, .. }
        ));
    }

    #[test]
    fn invalid_options() {
        assert!(CastToArray::new(false, &CastArgs::new().with("shape", "xml")).is_err());
        assert!(CastToArray::new(false, &CastArgs::new().with("delimiter", "")).is_err());
        assert!(CastToArray::new(
            false,
            &CastArgs::new().with("shape", "csv").with("delimiter", "::")
        )
        .is_err());
        assert!(CastToArray::new(
            false,
            &CastArgs::new().with("shape", "json").with("type", "int")
        )
        .is_err());
    }

    #[test]
    fn null_default_list() {
        let c = CastToArray::new(true, &CastArgs::new().with("default", vec!["x"])).unwrap();
        assert_eq!(c.cast(None).unwrap(), strings(&["x"]));
    }
}
