//! Dynamic JSON validation for Covenant contracts.
//!
//! Request and response sections in a Covenant contract are loosely typed
//! JSON values until they pass through a schema. This crate provides the
//! schema vocabulary: small composable validators over `serde_json::Value`
//! that parse-and-normalize on success and report a flat list of issues on
//! failure.
//!
//! # Example
//!
//! ```rust
//! use covenant_schema::{object, string, integer, optional};
//! use covenant_schema::Schema;
//! use serde_json::json;
//!
//! let pokemon = object()
//!     .field("name", string().min_len(1))
//!     .field("level", integer().min(1).max(100))
//!     .field("nickname", optional(string()));
//!
//! let parsed = pokemon
//!     .safe_parse(Some(&json!({ "name": "pikachu", "level": 12, "extra": true })))
//!     .unwrap();
//!
//! // Unknown keys are stripped, absent optional fields stay absent.
//! assert_eq!(parsed, Some(json!({ "name": "pikachu", "level": 12 })));
//! ```
//!
//! The engine-facing surface is deliberately small: [`Schema::safe_parse`]
//! for validation and [`Schema::kind`] for the optional/nullable
//! introspection the request pipeline needs when a section is absent.

mod combinators;
mod error;
mod schema;

pub use combinators::{
    array, boolean, integer, literal, nullable, number, object, optional, string, union,
    ArraySchema, BooleanSchema, IntegerSchema, LiteralSchema, NullableSchema, NumberSchema,
    ObjectSchema, OptionalSchema, StringSchema, UnionSchema,
};
pub use error::Issue;
pub use schema::{DynSchema, IntoSchema, Schema, SchemaKind};
