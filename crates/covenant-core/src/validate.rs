//! Request section validation.
//!
//! Every place a request meets a schema (endpoint triggers, middleware,
//! decorator wrappers, the client before sending) goes through
//! [`parse_section`], so the absent/null fallback rules behave identically
//! everywhere.

use crate::response::ResponseObject;
use covenant_schema::{DynSchema, Issue, Schema, SchemaKind};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// A validatable request section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    PathSegments,
    Headers,
    Query,
    Body,
}

impl Section {
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::PathSegments => "path-segments",
            Section::Headers => "headers",
            Section::Query => "query",
            Section::Body => "body",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed section validation, carrying the body of the BadRequest it
/// turns into: a plain message for a missing value, or the issue list.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionFailure {
    pub section: Section,
    pub body: Value,
}

impl SectionFailure {
    fn missing(section: Section) -> Self {
        let message = match section {
            Section::Body => {
                "'body' is required for this endpoint, { 'Content-Type': 'application/json' } header might be missing"
                    .to_string()
            }
            other => format!("'{}' is required for this endpoint", other),
        };
        Self {
            section,
            body: Value::String(message),
        }
    }

    fn issues(section: Section, issues: Vec<Issue>) -> Self {
        Self {
            section,
            // Issue serialization is infallible: plain strings and vecs.
            body: serde_json::to_value(issues).unwrap_or(Value::Null),
        }
    }

    pub fn into_response(self) -> ResponseObject {
        ResponseObject::bad_request(self.section.as_str(), self.body)
    }
}

impl fmt::Display for SectionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation failed for section '{}'", self.section)
    }
}

/// Validate one request section against an optional schema.
///
/// Without a schema the parsed value is `None` and the raw value is
/// ignored. With a schema, an absent or explicitly-null raw value is first
/// tried as-is, then normalized once in the direction the schema's kind
/// allows: optional schemas treat an explicit null as absent, nullable
/// schemas treat absence as null. Anything else fails.
pub fn parse_section(
    schema: Option<&DynSchema>,
    raw: Option<&Value>,
    section: Section,
) -> Result<Option<Value>, SectionFailure> {
    let Some(schema) = schema else {
        return Ok(None);
    };

    if matches!(raw, None | Some(Value::Null)) {
        if let Ok(parsed) = schema.safe_parse(raw) {
            return Ok(parsed);
        }
        let normalized = match (schema.kind(), raw) {
            (SchemaKind::Optional, Some(Value::Null)) => None,
            (SchemaKind::Nullable, None) => Some(&Value::Null),
            _ => return Err(SectionFailure::missing(section)),
        };
        return schema
            .safe_parse(normalized)
            .map_err(|_| SectionFailure::missing(section));
    }

    schema
        .safe_parse(raw)
        .map_err(|issues| SectionFailure::issues(section, issues))
}

/// The section schemas of an endpoint or middleware.
#[derive(Clone, Default)]
pub struct SectionSchemas {
    pub headers: Option<DynSchema>,
    pub query: Option<DynSchema>,
    pub body: Option<DynSchema>,
}

/// Successfully validated sections.
#[derive(Debug, Clone, Default)]
pub struct ParsedSections {
    pub headers: Option<Value>,
    pub query: Option<Value>,
    pub body: Option<Value>,
}

pub(crate) fn headers_to_value(headers: &HashMap<String, String>) -> Value {
    Value::Object(
        headers
            .iter()
            .map(|(name, value)| (name.clone(), Value::String(value.clone())))
            .collect(),
    )
}

/// Validate headers, query, and body in order; the first failure wins.
pub fn parse_sections(
    schemas: &SectionSchemas,
    headers: &HashMap<String, String>,
    query: Option<&Value>,
    body: Option<&Value>,
) -> Result<ParsedSections, SectionFailure> {
    let header_value = schemas.headers.as_ref().map(|_| headers_to_value(headers));
    Ok(ParsedSections {
        headers: parse_section(schemas.headers.as_ref(), header_value.as_ref(), Section::Headers)?,
        query: parse_section(schemas.query.as_ref(), query, Section::Query)?,
        body: parse_section(schemas.body.as_ref(), body, Section::Body)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::FAILED_VALIDATION_HEADER;
    use covenant_schema::{integer, nullable, object, optional, string, IntoSchema};
    use serde_json::json;

    #[test]
    fn no_schema_means_no_parsed_value() {
        let parsed = parse_section(None, Some(&json!({ "x": 1 })), Section::Body).unwrap();
        assert_eq!(parsed, None);
    }

    #[test]
    fn missing_body_reports_content_type_hint() {
        let schema = object().field("name", string()).into_schema();
        let failure = parse_section(Some(&schema), None, Section::Body).unwrap_err();
        assert_eq!(
            failure.body,
            json!("'body' is required for this endpoint, { 'Content-Type': 'application/json' } header might be missing")
        );

        let response = failure.into_response();
        assert_eq!(response.header(FAILED_VALIDATION_HEADER), Some(&json!("body")));
    }

    #[test]
    fn missing_query_reports_plain_message() {
        let schema = object().field("page", integer()).into_schema();
        let failure = parse_section(Some(&schema), None, Section::Query).unwrap_err();
        assert_eq!(failure.body, json!("'query' is required for this endpoint"));
    }

    #[test]
    fn optional_schema_accepts_absence_and_null() {
        let schema = optional(string()).into_schema();
        assert_eq!(parse_section(Some(&schema), None, Section::Query).unwrap(), None);
        // Explicit null normalizes to absence for optional schemas.
        assert_eq!(
            parse_section(Some(&schema), Some(&Value::Null), Section::Query).unwrap(),
            None
        );
    }

    #[test]
    fn nullable_schema_accepts_null_and_absence() {
        let schema = nullable(string()).into_schema();
        assert_eq!(
            parse_section(Some(&schema), Some(&Value::Null), Section::Body).unwrap(),
            Some(Value::Null)
        );
        // Absence normalizes to null for nullable schemas.
        assert_eq!(
            parse_section(Some(&schema), None, Section::Body).unwrap(),
            Some(Value::Null)
        );
    }

    #[test]
    fn plain_schema_rejects_absence_with_message_body() {
        let schema = string().into_schema();
        let failure = parse_section(Some(&schema), None, Section::Headers).unwrap_err();
        assert_eq!(failure.body, json!("'headers' is required for this endpoint"));
    }

    #[test]
    fn invalid_value_reports_issue_list() {
        let schema = object().field("level", integer()).into_schema();
        let failure =
            parse_section(Some(&schema), Some(&json!({ "level": "high" })), Section::Body)
                .unwrap_err();
        let issues = failure.body.as_array().unwrap();
        assert_eq!(issues[0]["path"], json!(["level"]));
        assert_eq!(issues[0]["code"], "invalid_type");
    }

    #[test]
    fn sections_fail_in_header_query_body_order() {
        let schemas = SectionSchemas {
            headers: Some(object().field("x-api-key", string()).into_schema()),
            query: Some(object().field("page", integer()).into_schema()),
            body: None,
        };
        let failure = parse_sections(&schemas, &HashMap::new(), None, None).unwrap_err();
        assert_eq!(failure.section, Section::Headers);
    }

    #[test]
    fn valid_sections_parse_together() {
        let schemas = SectionSchemas {
            headers: Some(object().field("x-api-key", string()).into_schema()),
            query: None,
            body: Some(object().field("name", string()).into_schema()),
        };
        let headers = HashMap::from([("x-api-key".to_string(), "secret".to_string())]);
        let parsed =
            parse_sections(&schemas, &headers, None, Some(&json!({ "name": "mew" }))).unwrap();
        assert_eq!(parsed.headers, Some(json!({ "x-api-key": "secret" })));
        assert_eq!(parsed.query, None);
        assert_eq!(parsed.body, Some(json!({ "name": "mew" })));
    }
}
