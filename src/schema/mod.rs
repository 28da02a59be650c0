//! Schema model, JSON text format and writer/reader resolution.
//!
//! This module defines the schema tree shared by generation and decoding,
//! the JSON parser and writer for it, named type lookup, and the resolution
//! of a writer schema against a reader schema into a read plan.

mod names;
mod parser;
mod resolution;
mod types;

pub use names::NamedTypes;
pub use parser::{is_valid_name, parse_schema, parse_schema_with_options, SchemaParser};
pub use resolution::{BlueprintCache, ResolvedSchemaPair, TypePromotion};
pub use types::*;
