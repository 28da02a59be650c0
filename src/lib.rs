//! Schema-governed binary serialization in the Avro wire format.
//!
//! Two subsystems share one schema model:
//!
//! - **Decoding**: a writer schema is resolved against a reader schema into a
//!   reusable read plan ([`ResolvedSchemaPair`]), and each input is walked by a
//!   [`StructureDecoder`] that emits a flat stream of [`Event`]s. Added,
//!   removed and renamed fields, enum symbol changes, union changes and
//!   numeric promotions are all handled by the plan.
//! - **Generation**: a type describes its serializable shape through the
//!   [`Describe`] trait and a [`ShapeVisitor`], and the generator derives a
//!   wire [`Schema`] from it, including recursive types.
//!
//! ```
//! use contrail::{collect_datum, encode_datum, parse_schema, Datum, ResolvedSchemaPair};
//!
//! let writer = parse_schema(
//!     r#"{"type": "record", "name": "User", "fields": [
//!         {"name": "id", "type": "long"},
//!         {"name": "nickname", "type": "string"}
//!     ]}"#,
//! ).unwrap();
//! let reader = parse_schema(
//!     r#"{"type": "record", "name": "User", "fields": [
//!         {"name": "id", "type": "long"},
//!         {"name": "active", "type": "boolean", "default": true}
//!     ]}"#,
//! ).unwrap();
//!
//! let bytes = encode_datum(
//!     &writer,
//!     &Datum::record([("id", Datum::Long(7)), ("nickname", Datum::String("q".into()))]),
//! ).unwrap();
//!
//! let pair = ResolvedSchemaPair::resolve(&writer, &reader).unwrap();
//! let mut decoder = pair.new_reader(&bytes);
//! let user = collect_datum(&mut decoder).unwrap().unwrap();
//! assert_eq!(user.field("id"), Some(&Datum::Long(7)));
//! assert_eq!(user.field("active"), Some(&Datum::Boolean(true)));
//! assert_eq!(user.field("nickname"), None);
//! ```

pub mod codec;
pub mod datum;
pub mod error;
pub mod generate;
pub mod reader;
pub mod schema;

pub use codec::{BufferPool, Encoder, PoolStrategy, PooledBuffer};
pub use datum::{
    collect_all, collect_datum, encode_all, encode_all_pooled, encode_datum, encode_datum_pooled,
    write_datum, Datum,
};
pub use error::{
    DecodeError, EncodeError, Error, ErrorKind, GenerationError, ResolutionError, SchemaError,
};
pub use generate::{
    generate_schema, generate_schema_with_config, Describe, FieldAnnotations, GeneratorConfig,
    Property, SchemaCache, SchemaRegistry, ShapeVisitor, TypeInfo,
};
pub use reader::{DecoderConfig, Event, Scalar, StructureDecoder};
pub use schema::{
    parse_schema, BlueprintCache, EnumSchema, FieldOrder, FieldSchema, FixedSchema, LogicalType,
    LogicalTypeName, NamedTypes, RecordSchema, ResolvedSchemaPair, Schema, TypePromotion,
};
