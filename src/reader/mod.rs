//! Structure readers.
//!
//! Decoding is split in two: a [`ReadPlan`] compiled once per schema pair
//! (see [`crate::schema::ResolvedSchemaPair`]), and a [`StructureDecoder`]
//! created per input that walks the plan and emits [`Event`]s.

pub mod default_value;
pub mod event;
pub mod field;
pub mod plan;
pub mod stream;

pub use default_value::{DefaultValue, DefaultValueReader};
pub use event::{Event, Scalar};
pub use field::{EnumMapping, FieldKind, FieldReader, ScalarReader, ValueReader};
pub use plan::{
    ArrayReader, MapReader, NodeId, ReadPlan, ReaderNode, RecordReader, UnionBranch, UnionReader,
};
pub use stream::{DecoderConfig, StructureDecoder};
