//! Schema combinators.
//!
//! Each combinator is a small builder-styled struct; `object()` and
//! `array()` compose them. Objects strip unknown keys on parse so the value
//! a handler sees contains exactly the declared fields.

use crate::error::Issue;
use crate::schema::{DynSchema, IntoSchema, Schema, SchemaKind};
use serde_json::Value;

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn invalid_type(expected: &str, received: &Value) -> Vec<Issue> {
    vec![Issue::new(
        "invalid_type",
        format!("Expected {}, received {}", expected, type_name(received)),
    )]
}

/// String values, with optional length bounds.
pub fn string() -> StringSchema {
    StringSchema {
        min_len: None,
        max_len: None,
    }
}

#[derive(Debug, Clone)]
pub struct StringSchema {
    min_len: Option<usize>,
    max_len: Option<usize>,
}

impl StringSchema {
    pub fn min_len(mut self, n: usize) -> Self {
        self.min_len = Some(n);
        self
    }

    pub fn max_len(mut self, n: usize) -> Self {
        self.max_len = Some(n);
        self
    }
}

impl Schema for StringSchema {
    fn safe_parse(&self, value: Option<&Value>) -> Result<Option<Value>, Vec<Issue>> {
        let value = value.ok_or_else(|| vec![Issue::required()])?;
        let s = match value {
            Value::String(s) => s,
            other => return Err(invalid_type("string", other)),
        };

        let mut issues = Vec::new();
        if let Some(min) = self.min_len {
            if s.chars().count() < min {
                issues.push(Issue::new(
                    "too_small",
                    format!("String must contain at least {} character(s)", min),
                ));
            }
        }
        if let Some(max) = self.max_len {
            if s.chars().count() > max {
                issues.push(Issue::new(
                    "too_big",
                    format!("String must contain at most {} character(s)", max),
                ));
            }
        }

        if issues.is_empty() {
            Ok(Some(value.clone()))
        } else {
            Err(issues)
        }
    }
}

/// Integer values (whole JSON numbers), with optional bounds.
pub fn integer() -> IntegerSchema {
    IntegerSchema {
        min: None,
        max: None,
    }
}

#[derive(Debug, Clone)]
pub struct IntegerSchema {
    min: Option<i64>,
    max: Option<i64>,
}

impl IntegerSchema {
    pub fn min(mut self, n: i64) -> Self {
        self.min = Some(n);
        self
    }

    pub fn max(mut self, n: i64) -> Self {
        self.max = Some(n);
        self
    }
}

impl Schema for IntegerSchema {
    fn safe_parse(&self, value: Option<&Value>) -> Result<Option<Value>, Vec<Issue>> {
        let value = value.ok_or_else(|| vec![Issue::required()])?;
        let n = match value {
            Value::Number(n) => match n.as_i64() {
                Some(n) => n,
                None => {
                    return Err(vec![Issue::new(
                        "invalid_type",
                        "Expected integer, received float",
                    )])
                }
            },
            other => return Err(invalid_type("integer", other)),
        };

        let mut issues = Vec::new();
        if let Some(min) = self.min {
            if n < min {
                issues.push(Issue::new(
                    "too_small",
                    format!("Number must be greater than or equal to {}", min),
                ));
            }
        }
        if let Some(max) = self.max {
            if n > max {
                issues.push(Issue::new(
                    "too_big",
                    format!("Number must be less than or equal to {}", max),
                ));
            }
        }

        if issues.is_empty() {
            Ok(Some(value.clone()))
        } else {
            Err(issues)
        }
    }
}

/// Any JSON number.
pub fn number() -> NumberSchema {
    NumberSchema {
        min: None,
        max: None,
    }
}

#[derive(Debug, Clone)]
pub struct NumberSchema {
    min: Option<f64>,
    max: Option<f64>,
}

impl NumberSchema {
    pub fn min(mut self, n: f64) -> Self {
        self.min = Some(n);
        self
    }

    pub fn max(mut self, n: f64) -> Self {
        self.max = Some(n);
        self
    }
}

impl Schema for NumberSchema {
    fn safe_parse(&self, value: Option<&Value>) -> Result<Option<Value>, Vec<Issue>> {
        let value = value.ok_or_else(|| vec![Issue::required()])?;
        let n = match value {
            Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
            other => return Err(invalid_type("number", other)),
        };

        let mut issues = Vec::new();
        if let Some(min) = self.min {
            if n < min {
                issues.push(Issue::new(
                    "too_small",
                    format!("Number must be greater than or equal to {}", min),
                ));
            }
        }
        if let Some(max) = self.max {
            if n > max {
                issues.push(Issue::new(
                    "too_big",
                    format!("Number must be less than or equal to {}", max),
                ));
            }
        }

        if issues.is_empty() {
            Ok(Some(value.clone()))
        } else {
            Err(issues)
        }
    }
}

/// Boolean values.
pub fn boolean() -> BooleanSchema {
    BooleanSchema
}

#[derive(Debug, Clone)]
pub struct BooleanSchema;

impl Schema for BooleanSchema {
    fn safe_parse(&self, value: Option<&Value>) -> Result<Option<Value>, Vec<Issue>> {
        let value = value.ok_or_else(|| vec![Issue::required()])?;
        match value {
            Value::Bool(_) => Ok(Some(value.clone())),
            other => Err(invalid_type("boolean", other)),
        }
    }
}

/// Exactly one JSON value.
pub fn literal(value: Value) -> LiteralSchema {
    LiteralSchema { value }
}

#[derive(Debug, Clone)]
pub struct LiteralSchema {
    value: Value,
}

impl Schema for LiteralSchema {
    fn safe_parse(&self, value: Option<&Value>) -> Result<Option<Value>, Vec<Issue>> {
        let value = value.ok_or_else(|| vec![Issue::required()])?;
        if *value == self.value {
            Ok(Some(value.clone()))
        } else {
            Err(vec![Issue::new(
                "invalid_literal",
                format!("Invalid literal value, expected {}", self.value),
            )])
        }
    }
}

/// Arrays with a uniform item schema.
pub fn array(item: impl IntoSchema) -> ArraySchema {
    ArraySchema {
        item: item.into_schema(),
    }
}

#[derive(Debug, Clone)]
pub struct ArraySchema {
    item: DynSchema,
}

impl Schema for ArraySchema {
    fn safe_parse(&self, value: Option<&Value>) -> Result<Option<Value>, Vec<Issue>> {
        let value = value.ok_or_else(|| vec![Issue::required()])?;
        let items = match value {
            Value::Array(items) => items,
            other => return Err(invalid_type("array", other)),
        };

        let mut parsed = Vec::with_capacity(items.len());
        let mut issues = Vec::new();
        for (index, item) in items.iter().enumerate() {
            match self.item.safe_parse(Some(item)) {
                Ok(Some(v)) => parsed.push(v),
                Ok(None) => parsed.push(Value::Null),
                Err(item_issues) => issues.extend(
                    item_issues
                        .into_iter()
                        .map(|i| i.nested_under(index.to_string())),
                ),
            }
        }

        if issues.is_empty() {
            Ok(Some(Value::Array(parsed)))
        } else {
            Err(issues)
        }
    }
}

/// Objects with declared fields. Unknown keys are stripped; a field wrapped
/// in [`optional`] may be absent and is then omitted from the output.
pub fn object() -> ObjectSchema {
    ObjectSchema { fields: Vec::new() }
}

#[derive(Debug, Clone, Default)]
pub struct ObjectSchema {
    fields: Vec<(String, DynSchema)>,
}

impl ObjectSchema {
    pub fn field(mut self, name: impl Into<String>, schema: impl IntoSchema) -> Self {
        self.fields.push((name.into(), schema.into_schema()));
        self
    }
}

impl Schema for ObjectSchema {
    fn safe_parse(&self, value: Option<&Value>) -> Result<Option<Value>, Vec<Issue>> {
        let value = value.ok_or_else(|| vec![Issue::required()])?;
        let map = match value {
            Value::Object(map) => map,
            other => return Err(invalid_type("object", other)),
        };

        let mut parsed = serde_json::Map::with_capacity(self.fields.len());
        let mut issues = Vec::new();
        for (name, schema) in &self.fields {
            match schema.safe_parse(map.get(name)) {
                Ok(Some(v)) => {
                    parsed.insert(name.clone(), v);
                }
                Ok(None) => {}
                Err(field_issues) => {
                    issues.extend(field_issues.into_iter().map(|i| i.nested_under(name)));
                }
            }
        }

        if issues.is_empty() {
            Ok(Some(Value::Object(parsed)))
        } else {
            Err(issues)
        }
    }
}

/// Accepts the first matching variant.
pub fn union() -> UnionSchema {
    UnionSchema {
        variants: Vec::new(),
    }
}

#[derive(Debug, Clone, Default)]
pub struct UnionSchema {
    variants: Vec<DynSchema>,
}

impl UnionSchema {
    pub fn variant(mut self, schema: impl IntoSchema) -> Self {
        self.variants.push(schema.into_schema());
        self
    }
}

impl Schema for UnionSchema {
    fn safe_parse(&self, value: Option<&Value>) -> Result<Option<Value>, Vec<Issue>> {
        for variant in &self.variants {
            if let Ok(parsed) = variant.safe_parse(value) {
                return Ok(parsed);
            }
        }
        Err(vec![Issue::new("invalid_union", "Invalid input")])
    }
}

/// Accepts an absent value; parses the inner schema otherwise.
pub fn optional(inner: impl IntoSchema) -> OptionalSchema {
    OptionalSchema {
        inner: inner.into_schema(),
    }
}

#[derive(Debug, Clone)]
pub struct OptionalSchema {
    inner: DynSchema,
}

impl Schema for OptionalSchema {
    fn safe_parse(&self, value: Option<&Value>) -> Result<Option<Value>, Vec<Issue>> {
        match value {
            None => Ok(None),
            Some(_) => self.inner.safe_parse(value),
        }
    }

    fn kind(&self) -> SchemaKind {
        SchemaKind::Optional
    }
}

/// Accepts an explicit null; parses the inner schema otherwise. An absent
/// value still fails.
pub fn nullable(inner: impl IntoSchema) -> NullableSchema {
    NullableSchema {
        inner: inner.into_schema(),
    }
}

#[derive(Debug, Clone)]
pub struct NullableSchema {
    inner: DynSchema,
}

impl Schema for NullableSchema {
    fn safe_parse(&self, value: Option<&Value>) -> Result<Option<Value>, Vec<Issue>> {
        match value {
            None => Err(vec![Issue::required()]),
            Some(Value::Null) => Ok(Some(Value::Null)),
            Some(_) => self.inner.safe_parse(value),
        }
    }

    fn kind(&self) -> SchemaKind {
        SchemaKind::Nullable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn string_rejects_absent_value() {
        let issues = string().safe_parse(None).unwrap_err();
        assert_eq!(issues[0].code, "invalid_type");
        assert_eq!(issues[0].message, "Required");
    }

    #[test]
    fn string_length_bounds() {
        let schema = string().min_len(2).max_len(4);
        assert!(schema.safe_parse(Some(&json!("ab"))).is_ok());
        assert_eq!(
            schema.safe_parse(Some(&json!("a"))).unwrap_err()[0].code,
            "too_small"
        );
        assert_eq!(
            schema.safe_parse(Some(&json!("abcde"))).unwrap_err()[0].code,
            "too_big"
        );
    }

    #[test]
    fn integer_rejects_float() {
        let issues = integer().safe_parse(Some(&json!(1.5))).unwrap_err();
        assert_eq!(issues[0].code, "invalid_type");
    }

    #[test]
    fn object_strips_unknown_keys() {
        let schema = object().field("name", string());
        let parsed = schema
            .safe_parse(Some(&json!({ "name": "bulbasaur", "level": 5 })))
            .unwrap();
        assert_eq!(parsed, Some(json!({ "name": "bulbasaur" })));
    }

    #[test]
    fn object_reports_nested_paths() {
        let schema = object().field("stats", object().field("hp", integer()));
        let issues = schema
            .safe_parse(Some(&json!({ "stats": { "hp": "high" } })))
            .unwrap_err();
        assert_eq!(issues[0].path, vec!["stats", "hp"]);
    }

    #[test]
    fn optional_field_absent_is_omitted() {
        let schema = object().field("nickname", optional(string()));
        assert_eq!(schema.safe_parse(Some(&json!({}))).unwrap(), Some(json!({})));
    }

    #[test]
    fn optional_accepts_absent_not_null() {
        let schema = optional(string());
        assert_eq!(schema.safe_parse(None).unwrap(), None);
        assert!(schema.safe_parse(Some(&Value::Null)).is_err());
    }

    #[test]
    fn nullable_accepts_null_not_absent() {
        let schema = nullable(string());
        assert_eq!(
            schema.safe_parse(Some(&Value::Null)).unwrap(),
            Some(Value::Null)
        );
        assert!(schema.safe_parse(None).is_err());
    }

    #[test]
    fn array_collects_indexed_issues() {
        let schema = array(integer());
        let issues = schema
            .safe_parse(Some(&json!([1, "two", 3, "four"])))
            .unwrap_err();
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].path, vec!["1"]);
        assert_eq!(issues[1].path, vec!["3"]);
    }

    #[test]
    fn union_takes_first_match() {
        let schema = union()
            .variant(literal(json!("fire")))
            .variant(literal(json!("water")));
        assert!(schema.safe_parse(Some(&json!("water"))).is_ok());
        assert_eq!(
            schema.safe_parse(Some(&json!("grass"))).unwrap_err()[0].code,
            "invalid_union"
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn string_bounds_agree_with_char_count(s in "\\PC{0,16}", min in 0usize..8, max in 8usize..16) {
            let schema = string().min_len(min).max_len(max);
            let count = s.chars().count();
            let result = schema.safe_parse(Some(&json!(s)));
            prop_assert_eq!(result.is_ok(), count >= min && count <= max);
        }

        #[test]
        fn integer_bounds_agree(n in -1000i64..1000, min in -500i64..0, max in 0i64..500) {
            let schema = integer().min(min).max(max);
            let result = schema.safe_parse(Some(&json!(n)));
            prop_assert_eq!(result.is_ok(), n >= min && n <= max);
        }
    }
}
