//! Event-streaming structure decoder.
//!
//! [`StructureDecoder`] walks a [`ReadPlan`] over a byte slice and produces
//! one [`Event`] per call. Nesting is tracked on an explicit frame stack, so
//! deeply nested input never grows the call stack; the depth is bounded by
//! [`DecoderConfig::max_depth`].
//!
//! The slice may hold any number of consecutive root values. The stream
//! ends cleanly when the input is exhausted between two root values. A root
//! that occupies no wire bytes (`null`, or a record made only of such
//! fields) yields exactly one value, and input left after it is an error.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::codec::decode::{self, SkipLimits};
use crate::error::DecodeError;
use crate::reader::event::Event;
use crate::reader::field::{FieldKind, ValueReader};
use crate::reader::plan::{
    ArrayReader, MapReader, NodeId, ReadPlan, ReaderNode, RecordReader, UnionBranch,
};

/// Limits applied while decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Maximum number of open records, arrays and maps (default: 512).
    pub max_depth: usize,
    /// Maximum item count accepted in a single array or map block
    /// (default: 16,777,216).
    pub max_block_items: usize,
    /// Defer incompatibilities to decode time instead of rejecting the
    /// schema pair (default: false).
    pub unsafe_resolution: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_depth: 512,
            max_block_items: 1 << 24,
            unsafe_resolution: false,
        }
    }
}

impl DecoderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_block_items(mut self, max_block_items: usize) -> Self {
        self.max_block_items = max_block_items;
        self
    }

    pub fn with_unsafe_resolution(mut self, enabled: bool) -> Self {
        self.unsafe_resolution = enabled;
        self
    }

    /// Limits for skipping writer-only values.
    pub fn skip_limits(&self) -> SkipLimits {
        SkipLimits {
            max_depth: self.max_depth,
            max_block_items: self.max_block_items,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecordState {
    Start,
    Name,
    Value,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockState {
    Start,
    Items,
    /// Map key emitted, value pending.
    Value,
}

#[derive(Debug)]
enum Frame {
    Record {
        node: NodeId,
        state: RecordState,
        index: usize,
    },
    Array {
        node: NodeId,
        state: BlockState,
        remaining: usize,
    },
    Map {
        node: NodeId,
        state: BlockState,
        remaining: usize,
    },
    Default {
        events: Arc<[Event]>,
        pos: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Ready,
    Finished,
    Closed,
}

/// Pull decoder producing [`Event`]s for consecutive root values.
///
/// Once the end of the stream has been reported, or any error returned,
/// every further call fails with [`DecodeError::ReaderClosed`].
pub struct StructureDecoder<'a> {
    plan: Arc<ReadPlan>,
    data: &'a [u8],
    total_len: usize,
    frames: Vec<Frame>,
    config: DecoderConfig,
    phase: Phase,
    values_read: u64,
    /// Offset at which the current root value started.
    root_start: u64,
}

impl<'a> StructureDecoder<'a> {
    pub fn new(plan: Arc<ReadPlan>, data: &'a [u8]) -> Self {
        Self::with_config(plan, data, DecoderConfig::default())
    }

    pub fn with_config(plan: Arc<ReadPlan>, data: &'a [u8], config: DecoderConfig) -> Self {
        debug!(
            bytes = data.len(),
            nodes = plan.node_count(),
            "Creating structure decoder"
        );
        Self {
            plan,
            data,
            total_len: data.len(),
            frames: Vec::new(),
            config,
            phase: Phase::Ready,
            values_read: 0,
            root_start: 0,
        }
    }

    /// Bytes consumed so far.
    pub fn offset(&self) -> u64 {
        (self.total_len - self.data.len()) as u64
    }

    /// Input not yet consumed.
    pub fn remaining(&self) -> &'a [u8] {
        self.data
    }

    /// Number of open structured values.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Number of root values started so far.
    pub fn values_read(&self) -> u64 {
        self.values_read
    }

    pub fn is_closed(&self) -> bool {
        self.phase != Phase::Ready
    }

    /// Full name of the innermost open record.
    pub fn current_type_name(&self) -> Option<&str> {
        self.current_record().map(|record| &*record.name)
    }

    /// Aliases of the innermost open record.
    pub fn current_type_aliases(&self) -> &[String] {
        self.current_record()
            .map(|record| &*record.aliases)
            .unwrap_or(&[])
    }

    /// Items left in the current block of the innermost array or map.
    pub fn remaining_in_block(&self) -> Option<usize> {
        self.frames.iter().rev().find_map(|frame| match frame {
            Frame::Array { remaining, .. } | Frame::Map { remaining, .. } => Some(*remaining),
            _ => None,
        })
    }

    /// Produce the next event, or `None` at the end of the stream.
    pub fn next_event(&mut self) -> Result<Option<Event>, DecodeError> {
        if self.phase != Phase::Ready {
            return Err(DecodeError::ReaderClosed);
        }
        match self.step() {
            Ok(Some(event)) => Ok(Some(event)),
            Ok(None) => {
                debug!(values = self.values_read, "Structure decoder reached end of input");
                self.phase = Phase::Finished;
                Ok(None)
            }
            Err(err) => {
                let offset = self.offset();
                self.phase = Phase::Closed;
                self.frames.clear();
                Err(err.at(offset))
            }
        }
    }

    /// Consume events until the innermost open value is closed.
    ///
    /// Call right after a begin event to skip that whole value. Returns the
    /// number of events consumed.
    pub fn skip_current(&mut self) -> Result<usize, DecodeError> {
        let target = self.frames.len().saturating_sub(1);
        let mut consumed = 0;
        while self.frames.len() > target {
            if self.next_event()?.is_none() {
                break;
            }
            consumed += 1;
        }
        Ok(consumed)
    }

    fn current_record(&self) -> Option<&RecordReader> {
        self.frames.iter().rev().find_map(|frame| match frame {
            Frame::Record { node, .. } => match self.plan.node(*node) {
                ReaderNode::Record(record) => Some(record),
                _ => None,
            },
            _ => None,
        })
    }

    fn step(&mut self) -> Result<Option<Event>, DecodeError> {
        let plan = Arc::clone(&self.plan);
        loop {
            let depth = self.frames.len();
            let frame = match self.frames.last_mut() {
                Some(frame) => frame,
                None => {
                    if !self.root_has_more(&plan)? {
                        return Ok(None);
                    }
                    self.values_read += 1;
                    self.root_start = self.offset();
                    match self.start_value(&plan, plan.root())? {
                        Some(event) => return Ok(Some(event)),
                        None => continue,
                    }
                }
            };

            match frame {
                Frame::Record { node, state, index } => {
                    let record = record_node(&plan, *node)?;
                    match *state {
                        RecordState::Start => {
                            *state = if record.is_empty() {
                                RecordState::End
                            } else {
                                RecordState::Name
                            };
                            return Ok(Some(Event::BeginRecord));
                        }
                        RecordState::Name => {
                            // Only resolving records carry writer-only fields.
                            while record.resolving {
                                let Some(field) = record.fields.get(*index) else {
                                    break;
                                };
                                let FieldKind::Skip(schema) = &field.kind else {
                                    break;
                                };
                                trace!(
                                    record = %record.name,
                                    field = %field.name,
                                    field_type = %field.type_name,
                                    "Skipping writer-only field"
                                );
                                decode::skip_value_with(
                                    &mut self.data,
                                    schema,
                                    plan.writer_names(),
                                    &self.config.skip_limits(),
                                    depth,
                                )?;
                                *index += 1;
                            }
                            match record.fields.get(*index) {
                                Some(field) => {
                                    *state = RecordState::Value;
                                    return Ok(Some(Event::FieldName(Arc::clone(&field.name))));
                                }
                                None => *state = RecordState::End,
                            }
                        }
                        RecordState::Value => {
                            let field = &record.fields[*index];
                            *index += 1;
                            *state = RecordState::Name;
                            match &field.kind {
                                FieldKind::Materialize(value) => {
                                    if let Some(event) = self.start_value(&plan, value)? {
                                        return Ok(Some(event));
                                    }
                                }
                                FieldKind::Default(reader) => {
                                    let events = Arc::clone(reader.events());
                                    self.push(Frame::Default { events, pos: 0 })?;
                                }
                                FieldKind::Missing => {
                                    return Err(DecodeError::MissingField {
                                        record: record.name.to_string(),
                                        field: field.name.to_string(),
                                        field_type: field.type_name.clone(),
                                    });
                                }
                                FieldKind::Skip(schema) => {
                                    decode::skip_value_with(
                                        &mut self.data,
                                        schema,
                                        plan.writer_names(),
                                        &self.config.skip_limits(),
                                        depth,
                                    )?;
                                }
                            }
                        }
                        RecordState::End => {
                            self.frames.pop();
                            return Ok(Some(Event::EndRecord));
                        }
                    }
                }
                Frame::Array {
                    node,
                    state,
                    remaining,
                } => {
                    let array = array_node(&plan, *node)?;
                    match *state {
                        BlockState::Start => {
                            *state = BlockState::Items;
                            return Ok(Some(Event::BeginArray));
                        }
                        _ => {
                            if *remaining == 0 {
                                *remaining =
                                    block_count(&mut self.data, self.config.max_block_items)?;
                                if *remaining == 0 {
                                    self.frames.pop();
                                    return Ok(Some(Event::EndArray));
                                }
                            }
                            *remaining -= 1;
                            if let Some(event) = self.start_value(&plan, &array.items)? {
                                return Ok(Some(event));
                            }
                        }
                    }
                }
                Frame::Map {
                    node,
                    state,
                    remaining,
                } => {
                    let map = map_node(&plan, *node)?;
                    match *state {
                        BlockState::Start => {
                            *state = BlockState::Items;
                            return Ok(Some(Event::BeginMap));
                        }
                        BlockState::Items => {
                            if *remaining == 0 {
                                *remaining =
                                    block_count(&mut self.data, self.config.max_block_items)?;
                                if *remaining == 0 {
                                    self.frames.pop();
                                    return Ok(Some(Event::EndMap));
                                }
                            }
                            *state = BlockState::Value;
                            let key = decode::decode_string_ref(&mut self.data)?;
                            return Ok(Some(Event::FieldName(Arc::from(key))));
                        }
                        BlockState::Value => {
                            *remaining -= 1;
                            *state = BlockState::Items;
                            if let Some(event) = self.start_value(&plan, &map.values)? {
                                return Ok(Some(event));
                            }
                        }
                    }
                }
                Frame::Default { events, pos } => {
                    let event = events[*pos].clone();
                    *pos += 1;
                    if *pos >= events.len() {
                        self.frames.pop();
                    }
                    return Ok(Some(event));
                }
            }
        }
    }

    /// Begin a value. Scalars are read and returned immediately; structured
    /// values push a frame and return `None`. Unions select their member and
    /// leave no frame behind.
    fn start_value<'p>(
        &mut self,
        plan: &'p ReadPlan,
        value: &'p ValueReader,
    ) -> Result<Option<Event>, DecodeError> {
        let mut value = value;
        loop {
            let id = match value {
                ValueReader::Scalar(reader) => {
                    return Ok(Some(Event::Scalar(reader.read(&mut self.data)?)));
                }
                ValueReader::Incompatible(reason) => {
                    return Err(DecodeError::Incompatible(reason.to_string()));
                }
                ValueReader::Structured(id) => *id,
            };
            let frame = match plan.node(id) {
                ReaderNode::Union(union) => {
                    let index = decode::decode_union_index(&mut self.data, union.branches.len())?;
                    match &union.branches[index] {
                        UnionBranch::Value(member) => {
                            value = member;
                            continue;
                        }
                        UnionBranch::Incompatible(reason) => {
                            return Err(DecodeError::IncompatibleBranch {
                                index,
                                reason: reason.to_string(),
                            });
                        }
                    }
                }
                ReaderNode::Record(_) => Frame::Record {
                    node: id,
                    state: RecordState::Start,
                    index: 0,
                },
                ReaderNode::Array(_) => Frame::Array {
                    node: id,
                    state: BlockState::Start,
                    remaining: 0,
                },
                ReaderNode::Map(_) => Frame::Map {
                    node: id,
                    state: BlockState::Start,
                    remaining: 0,
                },
            };
            self.push(frame)?;
            return Ok(None);
        }
    }

    fn push(&mut self, frame: Frame) -> Result<(), DecodeError> {
        if self.frames.len() >= self.config.max_depth {
            return Err(DecodeError::DepthExceeded(self.config.max_depth));
        }
        self.frames.push(frame);
        Ok(())
    }

    /// Whether another root value starts here. A root that occupies no
    /// bytes is read exactly once, and must not leave input behind.
    fn root_has_more(&self, plan: &ReadPlan) -> Result<bool, DecodeError> {
        if plan.root_is_zero_width() && self.values_read == 0 {
            return Ok(true);
        }
        if self.data.is_empty() {
            return Ok(false);
        }
        if self.values_read > 0 && self.offset() == self.root_start {
            return Err(DecodeError::InvalidData(format!(
                "{} trailing bytes after a value that occupies no bytes",
                self.data.len()
            )));
        }
        Ok(true)
    }
}

impl Iterator for StructureDecoder<'_> {
    type Item = Result<Event, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.is_closed() {
            return None;
        }
        self.next_event().transpose()
    }
}

fn block_count(data: &mut &[u8], limit: usize) -> Result<usize, DecodeError> {
    let count = decode::decode_block_count(data)?;
    if count > limit {
        return Err(DecodeError::InvalidData(format!(
            "Block of {} items exceeds limit of {}",
            count, limit
        )));
    }
    Ok(count)
}

fn record_node(plan: &ReadPlan, id: NodeId) -> Result<&RecordReader, DecodeError> {
    match plan.node(id) {
        ReaderNode::Record(record) => Ok(record),
        _ => Err(DecodeError::InvalidData("read plan node is not a record".to_string())),
    }
}

fn array_node(plan: &ReadPlan, id: NodeId) -> Result<&ArrayReader, DecodeError> {
    match plan.node(id) {
        ReaderNode::Array(array) => Ok(array),
        _ => Err(DecodeError::InvalidData("read plan node is not an array".to_string())),
    }
}

fn map_node(plan: &ReadPlan, id: NodeId) -> Result<&MapReader, DecodeError> {
    match plan.node(id) {
        ReaderNode::Map(map) => Ok(map),
        _ => Err(DecodeError::InvalidData("read plan node is not a map".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Encoder;
    use crate::reader::event::Scalar;
    use crate::schema::{parse_schema, ResolvedSchemaPair};

    fn identity(json: &str) -> ResolvedSchemaPair {
        ResolvedSchemaPair::identity(&parse_schema(json).unwrap()).unwrap()
    }

    fn drain(decoder: &mut StructureDecoder<'_>) -> Vec<Event> {
        let mut events = Vec::new();
        while let Some(event) = decoder.next_event().unwrap() {
            events.push(event);
        }
        events
    }

    // ========================================================================
    // Event Sequence Tests
    // ========================================================================

    #[test]
    fn test_record_events() {
        let pair = identity(
            r#"{"type": "record", "name": "R", "fields": [
                {"name": "a", "type": "int"},
                {"name": "b", "type": "string"}
            ]}"#,
        );
        let mut enc = Encoder::new();
        enc.write_int(3);
        enc.write_string("x");
        let bytes = enc.finish();

        let mut decoder = pair.new_reader(&bytes);
        let events = drain(&mut decoder);
        assert_eq!(
            events,
            vec![
                Event::BeginRecord,
                Event::FieldName("a".into()),
                Event::Scalar(Scalar::Int(3)),
                Event::FieldName("b".into()),
                Event::Scalar(Scalar::String("x".into())),
                Event::EndRecord,
            ]
        );
        assert_eq!(decoder.offset(), bytes.len() as u64);
        assert_eq!(decoder.values_read(), 1);
    }

    #[test]
    fn test_consecutive_root_values() {
        let pair = identity(r#""long""#);
        let mut enc = Encoder::new();
        for v in [1i64, -2, 300] {
            enc.write_long(v);
        }
        let bytes = enc.finish();

        let mut decoder = pair.new_reader(&bytes);
        let events = drain(&mut decoder);
        assert_eq!(
            events,
            vec![
                Event::Scalar(Scalar::Long(1)),
                Event::Scalar(Scalar::Long(-2)),
                Event::Scalar(Scalar::Long(300)),
            ]
        );
    }

    #[test]
    fn test_map_events() {
        let pair = identity(r#"{"type": "map", "values": "int"}"#);
        let mut enc = Encoder::new();
        enc.write_block_count(2);
        enc.write_string("k1");
        enc.write_int(1);
        enc.write_string("k2");
        enc.write_int(2);
        enc.write_block_count(0);
        let bytes = enc.finish();

        let mut decoder = pair.new_reader(&bytes);
        assert_eq!(
            drain(&mut decoder),
            vec![
                Event::BeginMap,
                Event::FieldName("k1".into()),
                Event::Scalar(Scalar::Int(1)),
                Event::FieldName("k2".into()),
                Event::Scalar(Scalar::Int(2)),
                Event::EndMap,
            ]
        );
    }

    #[test]
    fn test_negative_block_count_with_byte_size() {
        let pair = identity(r#"{"type": "array", "items": "int"}"#);
        let mut enc = Encoder::new();
        enc.write_long(-2);
        enc.write_long(2);
        enc.write_int(5);
        enc.write_int(6);
        enc.write_block_count(0);
        let bytes = enc.finish();

        let mut decoder = pair.new_reader(&bytes);
        assert_eq!(
            drain(&mut decoder),
            vec![
                Event::BeginArray,
                Event::Scalar(Scalar::Int(5)),
                Event::Scalar(Scalar::Int(6)),
                Event::EndArray,
            ]
        );
    }

    #[test]
    fn test_union_is_transparent() {
        let pair = identity(r#"["null", "string"]"#);
        let mut enc = Encoder::new();
        enc.write_union_index(1);
        enc.write_string("hi");
        enc.write_union_index(0);
        let bytes = enc.finish();

        let mut decoder = pair.new_reader(&bytes);
        assert_eq!(
            drain(&mut decoder),
            vec![
                Event::Scalar(Scalar::String("hi".into())),
                Event::Scalar(Scalar::Null),
            ]
        );
        assert_eq!(decoder.depth(), 0);
    }

    #[test]
    fn test_empty_root_record_yields_once() {
        let pair = identity(r#"{"type": "record", "name": "Empty", "fields": []}"#);
        let mut decoder = pair.new_reader(&[]);
        assert_eq!(drain(&mut decoder), vec![Event::BeginRecord, Event::EndRecord]);
    }

    #[test]
    fn test_null_root_yields_once() {
        let pair = identity(r#""null""#);
        let mut decoder = pair.new_reader(&[]);
        assert_eq!(drain(&mut decoder), vec![Event::Scalar(Scalar::Null)]);
    }

    #[test]
    fn test_record_of_zero_width_fields_yields_once() {
        let pair = identity(
            r#"{"type": "record", "name": "Unit", "fields": [
                {"name": "a", "type": "null"},
                {"name": "b", "type": {"type": "record", "name": "Nothing", "fields": []}}
            ]}"#,
        );
        let mut decoder = pair.new_reader(&[]);
        assert_eq!(
            drain(&mut decoder),
            vec![
                Event::BeginRecord,
                Event::FieldName("a".into()),
                Event::Scalar(Scalar::Null),
                Event::FieldName("b".into()),
                Event::BeginRecord,
                Event::EndRecord,
                Event::EndRecord,
            ]
        );
    }

    #[test]
    fn test_trailing_bytes_after_zero_width_root() {
        let pair = identity(r#""null""#);
        let mut decoder = pair.new_reader(&[0x00]);
        assert_eq!(decoder.next_event().unwrap(), Some(Event::Scalar(Scalar::Null)));
        let err = decoder.next_event().unwrap_err();
        assert!(matches!(err.root(), DecodeError::InvalidData(msg) if msg.contains("trailing")));
        assert!(decoder.is_closed());
    }

    // ========================================================================
    // Navigation Tests
    // ========================================================================

    #[test]
    fn test_current_type_name_and_block_remaining() {
        let pair = identity(
            r#"{"type": "record", "name": "Outer", "namespace": "ns", "aliases": ["Old"], "fields": [
                {"name": "xs", "type": {"type": "array", "items": "int"}}
            ]}"#,
        );
        let mut enc = Encoder::new();
        enc.write_block_count(2);
        enc.write_int(1);
        enc.write_int(2);
        enc.write_block_count(0);
        let bytes = enc.finish();

        let mut decoder = pair.new_reader(&bytes);
        assert_eq!(decoder.next_event().unwrap(), Some(Event::BeginRecord));
        assert_eq!(decoder.current_type_name(), Some("ns.Outer"));
        assert!(!decoder.current_type_aliases().is_empty());

        decoder.next_event().unwrap();
        assert_eq!(decoder.next_event().unwrap(), Some(Event::BeginArray));
        assert_eq!(decoder.remaining_in_block(), Some(0));
        assert_eq!(
            decoder.next_event().unwrap(),
            Some(Event::Scalar(Scalar::Int(1)))
        );
        assert_eq!(decoder.remaining_in_block(), Some(1));
    }

    #[test]
    fn test_skip_current_value() {
        let pair = identity(
            r#"{"type": "record", "name": "R", "fields": [
                {"name": "xs", "type": {"type": "array", "items": "int"}},
                {"name": "tail", "type": "boolean"}
            ]}"#,
        );
        let mut enc = Encoder::new();
        enc.write_block_count(3);
        for v in 0..3 {
            enc.write_int(v);
        }
        enc.write_block_count(0);
        enc.write_boolean(true);
        let bytes = enc.finish();

        let mut decoder = pair.new_reader(&bytes);
        decoder.next_event().unwrap();
        decoder.next_event().unwrap();
        assert_eq!(decoder.next_event().unwrap(), Some(Event::BeginArray));
        assert_eq!(decoder.skip_current().unwrap(), 4);
        assert_eq!(
            decoder.next_event().unwrap(),
            Some(Event::FieldName("tail".into()))
        );
    }

    // ========================================================================
    // Failure Tests
    // ========================================================================

    #[test]
    fn test_depth_limit() {
        let pair = identity(
            r#"{"type": "array", "items": {"type": "array", "items": {"type": "array", "items": "int"}}}"#,
        );
        let mut enc = Encoder::new();
        enc.write_block_count(1);
        enc.write_block_count(1);
        enc.write_block_count(1);
        let bytes = enc.finish();

        let config = DecoderConfig::new().with_max_depth(2);
        let mut decoder = pair.new_reader_with_config(&bytes, config);
        let err = loop {
            match decoder.next_event() {
                Ok(Some(_)) => continue,
                Ok(None) => panic!("expected depth error"),
                Err(err) => break err,
            }
        };
        assert_eq!(err.root(), &DecodeError::DepthExceeded(2));
    }

    #[test]
    fn test_block_item_limit() {
        let pair = identity(r#"{"type": "array", "items": "int"}"#);
        let mut enc = Encoder::new();
        enc.write_block_count(10);
        let bytes = enc.finish();

        let config = DecoderConfig::new().with_max_block_items(4);
        let mut decoder = pair.new_reader_with_config(&bytes, config);
        decoder.next_event().unwrap();
        let err = decoder.next_event().unwrap_err();
        assert!(matches!(err.root(), DecodeError::InvalidData(_)));
    }

    #[test]
    fn test_skipped_field_respects_depth_limit() {
        let writer = parse_schema(
            r#"{"type": "record", "name": "R", "fields": [
                {"name": "id", "type": "int"},
                {"name": "chain", "type": ["null", {"type": "record", "name": "Link", "fields": [
                    {"name": "next", "type": ["null", "Link"]}
                ]}]}
            ]}"#,
        )
        .unwrap();
        let reader = parse_schema(
            r#"{"type": "record", "name": "R", "fields": [{"name": "id", "type": "int"}]}"#,
        )
        .unwrap();
        let pair = ResolvedSchemaPair::resolve(&writer, &reader).unwrap();

        let mut bytes = vec![0x02];
        bytes.extend(std::iter::repeat(0x02).take(100_000));
        bytes.push(0x00);

        let config = DecoderConfig::new().with_max_depth(64);
        let mut decoder = pair.new_reader_with_config(&bytes, config);
        let err = loop {
            match decoder.next_event() {
                Ok(Some(_)) => continue,
                Ok(None) => panic!("expected depth error"),
                Err(err) => break err,
            }
        };
        assert_eq!(err.root(), &DecodeError::DepthExceeded(64));
    }

    #[test]
    fn test_skipped_block_respects_item_limit() {
        let writer = parse_schema(
            r#"{"type": "record", "name": "R", "fields": [
                {"name": "gaps", "type": {"type": "array", "items": "null"}}
            ]}"#,
        )
        .unwrap();
        let reader = parse_schema(r#"{"type": "record", "name": "R", "fields": []}"#).unwrap();
        let pair = ResolvedSchemaPair::resolve(&writer, &reader).unwrap();

        let mut enc = Encoder::new();
        enc.write_long(1 << 40);
        let bytes = enc.finish();

        let mut decoder = pair.new_reader(&bytes);
        assert_eq!(decoder.next_event().unwrap(), Some(Event::BeginRecord));
        let err = decoder.next_event().unwrap_err();
        assert!(matches!(err.root(), DecodeError::InvalidData(msg) if msg.contains("exceeds limit")));
    }

    #[test]
    fn test_error_closes_reader_and_carries_offset() {
        let pair = identity(
            r#"{"type": "record", "name": "R", "fields": [
                {"name": "a", "type": "int"},
                {"name": "b", "type": "string"}
            ]}"#,
        );
        let mut enc = Encoder::new();
        enc.write_int(1);
        enc.write_long(10);
        let bytes = enc.finish();

        let mut decoder = pair.new_reader(&bytes);
        let err = loop {
            match decoder.next_event() {
                Ok(Some(_)) => continue,
                Ok(None) => panic!("expected truncation error"),
                Err(err) => break err,
            }
        };
        assert_eq!(err.root(), &DecodeError::UnexpectedEof);
        assert!(matches!(err, DecodeError::At { offset, .. } if offset > 0));
        assert!(decoder.is_closed());
        assert_eq!(decoder.next_event(), Err(DecodeError::ReaderClosed));
        assert!(decoder.next().is_none());
    }

    #[test]
    fn test_read_after_end_is_closed() {
        let pair = identity(r#""int""#);
        let mut decoder = pair.new_reader(&[]);
        assert_eq!(decoder.next_event().unwrap(), None);
        assert_eq!(decoder.next_event(), Err(DecodeError::ReaderClosed));
    }

    #[test]
    fn test_union_index_out_of_range() {
        let pair = identity(r#"["null", "int"]"#);
        let mut enc = Encoder::new();
        enc.write_long(7);
        let bytes = enc.finish();

        let mut decoder = pair.new_reader(&bytes);
        let err = decoder.next_event().unwrap_err();
        assert!(matches!(
            err.root(),
            DecodeError::UnionBranchOutOfRange { index: 7, count: 2 }
        ));
    }
}
