//! The core validation trait.

use crate::error::Issue;
use serde_json::Value;
use std::sync::Arc;

/// Shared, type-erased schema handle.
pub type DynSchema = Arc<dyn Schema>;

/// Outermost shape of a schema, used by callers that must decide what an
/// absent or explicitly-null input means before parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
    /// Requires a present, non-null-unless-declared value
    Plain,
    /// Accepts an absent value
    Optional,
    /// Accepts an explicit null
    Nullable,
}

/// A validator over loosely-typed JSON values.
///
/// `safe_parse` receives `None` when the value was absent entirely and
/// `Some(Value::Null)` for an explicit null; the distinction matters for
/// [`SchemaKind::Optional`] versus [`SchemaKind::Nullable`] wrappers. On
/// success it returns the parsed (possibly normalized) value, or `None` when
/// an optional value was legitimately absent.
pub trait Schema: Send + Sync + std::fmt::Debug {
    /// Validate `value`, returning the parsed value or every issue found.
    fn safe_parse(&self, value: Option<&Value>) -> Result<Option<Value>, Vec<Issue>>;

    /// Outermost shape of this schema.
    fn kind(&self) -> SchemaKind {
        SchemaKind::Plain
    }
}

impl Schema for DynSchema {
    fn safe_parse(&self, value: Option<&Value>) -> Result<Option<Value>, Vec<Issue>> {
        (**self).safe_parse(value)
    }

    fn kind(&self) -> SchemaKind {
        (**self).kind()
    }
}

/// Conversion into a shared schema handle, so builder-style combinator
/// values can be passed directly wherever a schema is expected.
pub trait IntoSchema {
    fn into_schema(self) -> DynSchema;
}

impl<S: Schema + 'static> IntoSchema for S {
    fn into_schema(self) -> DynSchema {
        Arc::new(self)
    }
}
