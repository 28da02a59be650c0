//! Read plans.
//!
//! A [`ReadPlan`] is the compiled form of a (writer, reader) schema pair:
//! an arena of structured reader nodes addressed by [`NodeId`], plus the
//! root value reader. Recursive records point back at their own node, so a
//! plan for a recursive schema is finite. Plans are immutable and shared
//! across every decoder created from them.

use std::sync::Arc;

use crate::codec::decode;
use crate::reader::field::{FieldKind, FieldReader, ScalarReader, ValueReader};
use crate::schema::NamedTypes;

/// Index of a node in a [`ReadPlan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

#[derive(Debug, Clone)]
pub struct RecordReader {
    /// Full name of the reader record.
    pub name: Arc<str>,
    /// Reader record aliases, fully qualified.
    pub aliases: Arc<[String]>,
    /// Writer wire order first, then reader-only fields.
    pub fields: Vec<FieldReader>,
    /// Whether fields may be skipped or defaulted.
    pub resolving: bool,
}

impl RecordReader {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct ArrayReader {
    pub items: ValueReader,
}

#[derive(Debug, Clone)]
pub struct MapReader {
    pub values: ValueReader,
}

/// One writer union member.
#[derive(Debug, Clone)]
pub enum UnionBranch {
    Value(ValueReader),
    /// The member has no counterpart in the reader schema.
    Incompatible(Arc<str>),
}

#[derive(Debug, Clone)]
pub struct UnionReader {
    /// Indexed by writer branch.
    pub branches: Vec<UnionBranch>,
}

#[derive(Debug, Clone)]
pub enum ReaderNode {
    Record(RecordReader),
    Array(ArrayReader),
    Map(MapReader),
    Union(UnionReader),
}

#[derive(Debug)]
pub struct ReadPlan {
    nodes: Vec<ReaderNode>,
    root: ValueReader,
    writer_names: NamedTypes,
    root_zero_width: bool,
}

impl ReadPlan {
    pub(crate) fn new(nodes: Vec<ReaderNode>, root: ValueReader, writer_names: NamedTypes) -> Self {
        let mut plan = Self {
            nodes,
            root,
            writer_names,
            root_zero_width: false,
        };
        plan.root_zero_width = plan.is_zero_width(&plan.root, &mut Vec::new());
        plan
    }

    /// Whether a root value occupies no wire bytes at all.
    pub fn root_is_zero_width(&self) -> bool {
        self.root_zero_width
    }

    fn is_zero_width(&self, value: &ValueReader, open: &mut Vec<NodeId>) -> bool {
        match value {
            ValueReader::Scalar(ScalarReader::Null) | ValueReader::Scalar(ScalarReader::Fixed(0)) => {
                true
            }
            ValueReader::Scalar(_) | ValueReader::Incompatible(_) => false,
            ValueReader::Structured(id) => {
                let ReaderNode::Record(record) = self.node(*id) else {
                    return false;
                };
                // Reaching an open record again means it nests itself.
                if open.contains(id) {
                    return false;
                }
                open.push(*id);
                let zero = record.fields.iter().all(|field| match &field.kind {
                    FieldKind::Materialize(value) => self.is_zero_width(value, open),
                    FieldKind::Skip(schema) => decode::is_zero_width(schema, &self.writer_names),
                    FieldKind::Default(_) | FieldKind::Missing => true,
                });
                open.pop();
                zero
            }
        }
    }

    pub fn root(&self) -> &ValueReader {
        &self.root
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &ReaderNode {
        &self.nodes[id.0]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Named types of the writer schema, used to size skipped fields.
    pub fn writer_names(&self) -> &NamedTypes {
        &self.writer_names
    }

}
