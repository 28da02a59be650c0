//! Writer/reader schema resolution.
//!
//! Resolution compiles a (writer, reader) schema pair into a [`ReadPlan`]:
//! the fields to read, skip or default, the enum symbol mappings, the union
//! member choices and the numeric promotions. Incompatibilities are found
//! here, once, instead of on every decode.
//!
//! Strict resolution rejects an incompatible pair up front. Unsafe
//! resolution always builds a plan and leaves each incompatibility in it, to
//! be raised only if a decode actually reaches it.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::error::{ResolutionError, SchemaError};
use crate::reader::default_value::DefaultValueReader;
use crate::reader::field::{EnumMapping, FieldKind, FieldReader, ScalarReader, ValueReader};
use crate::reader::plan::{
    ArrayReader, MapReader, NodeId, ReadPlan, ReaderNode, RecordReader, UnionBranch, UnionReader,
};
use crate::reader::{DecoderConfig, StructureDecoder};
use crate::schema::{
    EnumSchema, FieldSchema, FixedSchema, LogicalTypeName, NamedTypes, RecordSchema, Schema,
};

/// Type promotions supported by schema resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypePromotion {
    /// int → long
    IntToLong,
    /// int → float
    IntToFloat,
    /// int → double
    IntToDouble,
    /// long → float
    LongToFloat,
    /// long → double
    LongToDouble,
    /// float → double
    FloatToDouble,
    /// string → bytes
    StringToBytes,
    /// bytes → string
    BytesToString,
}

impl TypePromotion {
    /// The promotion from one primitive to another, if one exists.
    ///
    /// Identical types need no promotion and return `None`, as do pairs
    /// that cannot be promoted.
    pub fn between(writer: &Schema, reader: &Schema) -> Option<Self> {
        match (writer.base(), reader.base()) {
            (Schema::Int, Schema::Long) => Some(TypePromotion::IntToLong),
            (Schema::Int, Schema::Float) => Some(TypePromotion::IntToFloat),
            (Schema::Int, Schema::Double) => Some(TypePromotion::IntToDouble),
            (Schema::Long, Schema::Float) => Some(TypePromotion::LongToFloat),
            (Schema::Long, Schema::Double) => Some(TypePromotion::LongToDouble),
            (Schema::Float, Schema::Double) => Some(TypePromotion::FloatToDouble),
            (Schema::String, Schema::Bytes) => Some(TypePromotion::StringToBytes),
            (Schema::Bytes, Schema::String) => Some(TypePromotion::BytesToString),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Reading data with the schema it was written with.
    Identity,
    Strict,
    Unsafe,
}

/// A writer schema resolved against a reader schema.
///
/// Holds the compiled [`ReadPlan`]. The plan is immutable and shared, so a
/// pair can hand out any number of independent decoders, from any thread.
#[derive(Debug, Clone)]
pub struct ResolvedSchemaPair {
    writer: Arc<Schema>,
    reader: Arc<Schema>,
    plan: Arc<ReadPlan>,
    deferred: Arc<[String]>,
    identity: bool,
}

impl ResolvedSchemaPair {
    /// Plan for reading data with the schema it was written with.
    pub fn identity(schema: &Schema) -> Result<Self, ResolutionError> {
        Self::build(schema, schema, Mode::Identity)
    }

    /// Resolve `writer` against `reader`, failing on any incompatibility.
    pub fn resolve(writer: &Schema, reader: &Schema) -> Result<Self, ResolutionError> {
        Self::build(writer, reader, Mode::Strict)
    }

    /// Resolve `writer` against `reader`, deferring incompatibilities to
    /// decode time.
    ///
    /// Only malformed schemas (e.g. dangling named references) fail here.
    pub fn resolve_unsafe(writer: &Schema, reader: &Schema) -> Result<Self, ResolutionError> {
        Self::build(writer, reader, Mode::Unsafe)
    }

    fn build(writer: &Schema, reader: &Schema, mode: Mode) -> Result<Self, ResolutionError> {
        let writer_names = NamedTypes::build_from_schema(writer);
        let reader_names = if mode == Mode::Identity {
            writer_names.clone()
        } else {
            NamedTypes::build_from_schema(reader)
        };

        let mut builder = PlanBuilder {
            writer_names: &writer_names,
            reader_names: &reader_names,
            mode,
            nodes: Vec::new(),
            records: HashMap::new(),
            record_log: Vec::new(),
            deferred: Vec::new(),
        };

        let root = match builder.value_or_defer(writer, reader, "") {
            Ok(root) => root,
            Err(BuildError::Schema(err)) => return Err(ResolutionError::Schema(err)),
            Err(BuildError::Incompatible(reason)) => {
                return Err(ResolutionError::Incompatible {
                    writer: display_name(writer),
                    reader: display_name(reader),
                    reason,
                })
            }
        };

        let PlanBuilder {
            nodes, deferred, ..
        } = builder;

        debug!(
            writer = %display_name(writer),
            reader = %display_name(reader),
            mode = ?mode,
            nodes = nodes.len(),
            deferred = deferred.len(),
            "Built read plan"
        );

        Ok(Self {
            writer: Arc::new(writer.clone()),
            reader: Arc::new(reader.clone()),
            plan: Arc::new(ReadPlan::new(nodes, root, writer_names)),
            deferred: Arc::from(deferred),
            identity: mode == Mode::Identity,
        })
    }

    pub fn writer(&self) -> &Schema {
        &self.writer
    }

    pub fn reader(&self) -> &Schema {
        &self.reader
    }

    pub fn plan(&self) -> &Arc<ReadPlan> {
        &self.plan
    }

    /// Whether the plan reads data with the schema it was written with.
    pub fn is_identity(&self) -> bool {
        self.identity
    }

    /// Incompatibilities left in the plan by unsafe resolution.
    pub fn deferred_issues(&self) -> &[String] {
        &self.deferred
    }

    /// A fresh decoder over `data`.
    pub fn new_reader<'a>(&self, data: &'a [u8]) -> StructureDecoder<'a> {
        StructureDecoder::new(Arc::clone(&self.plan), data)
    }

    pub fn new_reader_with_config<'a>(
        &self,
        data: &'a [u8],
        config: DecoderConfig,
    ) -> StructureDecoder<'a> {
        StructureDecoder::with_config(Arc::clone(&self.plan), data, config)
    }
}

fn display_name(schema: &Schema) -> String {
    schema.fullname().unwrap_or_else(|| schema.type_name())
}

#[derive(Debug)]
enum BuildError {
    Incompatible(String),
    Schema(SchemaError),
}

impl From<SchemaError> for BuildError {
    fn from(err: SchemaError) -> Self {
        BuildError::Schema(err)
    }
}

type BuildResult<T> = Result<T, BuildError>;

fn incompatible<T>(reason: String) -> BuildResult<T> {
    Err(BuildError::Incompatible(reason))
}

struct PlanBuilder<'n> {
    writer_names: &'n NamedTypes,
    reader_names: &'n NamedTypes,
    mode: Mode,
    nodes: Vec<ReaderNode>,
    /// Record pairs already planned, by (writer, reader) full name.
    records: HashMap<(String, String), NodeId>,
    /// Insertion order of `records`, for rollback.
    record_log: Vec<(String, String)>,
    deferred: Vec<String>,
}

impl<'n> PlanBuilder<'n> {
    /// Resolve a value, turning an incompatibility into a deferred failure
    /// when resolving unsafely.
    fn value_or_defer(&mut self, writer: &Schema, reader: &Schema, path: &str) -> BuildResult<ValueReader> {
        match self.value(writer, reader, path) {
            Err(BuildError::Incompatible(reason)) if self.mode == Mode::Unsafe => {
                debug!(%reason, "Deferring incompatibility to decode time");
                self.deferred.push(reason.clone());
                Ok(ValueReader::Incompatible(Arc::from(reason.as_str())))
            }
            other => other,
        }
    }

    /// Run `f`, discarding every node and record it added if it fails.
    fn attempt<T>(&mut self, f: impl FnOnce(&mut Self) -> BuildResult<T>) -> BuildResult<T> {
        let nodes = self.nodes.len();
        let records = self.record_log.len();
        let deferred = self.deferred.len();
        let result = f(self);
        if result.is_err() {
            self.nodes.truncate(nodes);
            for key in self.record_log.drain(records..) {
                self.records.remove(&key);
            }
            self.deferred.truncate(deferred);
        }
        result
    }

    fn value(&mut self, writer: &Schema, reader: &Schema, path: &str) -> BuildResult<ValueReader> {
        let (writer_names, reader_names) = (self.writer_names, self.reader_names);
        let writer = writer_names.resolve(writer)?;
        let reader = reader_names.resolve(reader)?;

        if let (Schema::Logical(w), Schema::Logical(r)) = (writer, reader) {
            if let (
                LogicalTypeName::Decimal {
                    precision: wp,
                    scale: ws,
                },
                LogicalTypeName::Decimal {
                    precision: rp,
                    scale: rs,
                },
            ) = (&w.logical_type, &r.logical_type)
            {
                if wp != rp || ws != rs {
                    return incompatible(format!(
                        "{}decimal({}, {}) cannot be read as decimal({}, {})",
                        at(path),
                        wp,
                        ws,
                        rp,
                        rs
                    ));
                }
            }
        }
        let writer = writer_names.resolve(writer.base())?;
        let reader = reader_names.resolve(reader.base())?;

        match (writer, reader) {
            (Schema::Union(branches), _) => self.writer_union(branches, reader, path),
            (_, Schema::Union(branches)) => {
                let chosen = self.select_branch(writer, branches).ok_or_else(|| {
                    BuildError::Incompatible(format!(
                        "{}{} matches no member of the reader union",
                        at(path),
                        writer.type_name()
                    ))
                })?;
                self.value(writer, chosen, path)
            }
            (Schema::Record(w), Schema::Record(r)) => self.record(w, r, path),
            (Schema::Enum(w), Schema::Enum(r)) => self.enumeration(w, r, path),
            (Schema::Fixed(w), Schema::Fixed(r)) => {
                self.check_names(&w.fullname(), &w.qualified_aliases(), &r.fullname(), &r.qualified_aliases(), path)?;
                if w.size != r.size {
                    return incompatible(format!(
                        "{}fixed '{}' has size {} but the reader expects {}",
                        at(path),
                        w.fullname(),
                        w.size,
                        r.size
                    ));
                }
                Ok(ValueReader::Scalar(ScalarReader::Fixed(w.size)))
            }
            (Schema::Array(w), Schema::Array(r)) => {
                let items = self.value_or_defer(w, r, &join(path, "[]"))?;
                Ok(self.push(ReaderNode::Array(ArrayReader { items })))
            }
            (Schema::Map(w), Schema::Map(r)) => {
                let values = self.value_or_defer(w, r, &join(path, "{}"))?;
                Ok(self.push(ReaderNode::Map(MapReader { values })))
            }
            (w, r) => match primitive_reader(w, r) {
                Some(scalar) => Ok(ValueReader::Scalar(scalar)),
                None => incompatible(format!(
                    "{}{} cannot be read as {}",
                    at(path),
                    w.type_name(),
                    r.type_name()
                )),
            },
        }
    }

    fn writer_union(&mut self, branches: &[Schema], reader: &Schema, path: &str) -> BuildResult<ValueReader> {
        let mut resolved = Vec::with_capacity(branches.len());
        for (index, branch) in branches.iter().enumerate() {
            let branch_path = join(path, &format!("<{}>", index));
            let target = match reader {
                Schema::Union(reader_branches) => self.select_branch(branch, reader_branches),
                other => Some(other),
            };
            let outcome = match target {
                Some(target) => self.attempt(|b| b.value(branch, target, &branch_path)),
                None => Err(BuildError::Incompatible(format!(
                    "{}{} matches no member of the reader union",
                    at(&branch_path),
                    branch.type_name()
                ))),
            };
            match outcome {
                Ok(value) => resolved.push(UnionBranch::Value(value)),
                Err(BuildError::Incompatible(reason)) => {
                    resolved.push(UnionBranch::Incompatible(Arc::from(reason.as_str())))
                }
                Err(err) => return Err(err),
            }
        }

        let any_readable = resolved
            .iter()
            .any(|branch| matches!(branch, UnionBranch::Value(_)));
        if !any_readable && !branches.is_empty() && self.mode != Mode::Unsafe {
            return incompatible(format!(
                "{}no member of the writer union can be read as {}",
                at(path),
                reader.type_name()
            ));
        }

        Ok(self.push(ReaderNode::Union(UnionReader { branches: resolved })))
    }

    /// Pick the reader union member for a writer value: the first member of
    /// the same type, else the first the writer type promotes to.
    fn select_branch<'r>(&self, writer: &Schema, branches: &'r [Schema]) -> Option<&'r Schema> {
        let writer = self.writer_names.resolve(writer).ok()?.base();
        let writer = self.writer_names.resolve(writer).ok()?;
        for allow_promotion in [false, true] {
            for branch in branches {
                let Ok(candidate) = self.reader_names.resolve(branch) else {
                    continue;
                };
                let Ok(candidate) = self.reader_names.resolve(candidate.base()) else {
                    continue;
                };
                if branch_matches(writer, candidate, allow_promotion) {
                    return Some(branch);
                }
            }
        }
        None
    }

    fn record(&mut self, writer: &RecordSchema, reader: &RecordSchema, path: &str) -> BuildResult<ValueReader> {
        let key = (writer.fullname(), reader.fullname());
        if let Some(id) = self.records.get(&key) {
            return Ok(ValueReader::Structured(*id));
        }
        self.check_names(&key.0, &writer.qualified_aliases(), &key.1, &reader.qualified_aliases(), path)?;

        let resolving = self.mode != Mode::Identity;
        let id = NodeId(self.nodes.len());
        self.nodes.push(ReaderNode::Record(RecordReader {
            name: Arc::from(key.1.as_str()),
            aliases: Arc::from(reader.qualified_aliases()),
            fields: Vec::new(),
            resolving,
        }));
        self.records.insert(key.clone(), id);
        self.record_log.push(key);

        let record_path = if path.is_empty() {
            reader.fullname()
        } else {
            path.to_string()
        };

        let fields = if resolving {
            self.resolving_fields(writer, reader, &record_path)?
        } else {
            let mut fields = Vec::with_capacity(writer.fields.len());
            for field in &writer.fields {
                let value = self.value(&field.schema, &field.schema, &join(&record_path, &field.name))?;
                fields.push(FieldReader::new(
                    &field.name,
                    field.schema.type_name(),
                    FieldKind::Materialize(value),
                ));
            }
            fields
        };

        if let ReaderNode::Record(record) = &mut self.nodes[id.0] {
            record.fields = fields;
        }
        Ok(ValueReader::Structured(id))
    }

    /// Fields in writer wire order, then reader-only fields.
    fn resolving_fields(&mut self, writer: &RecordSchema, reader: &RecordSchema, path: &str) -> BuildResult<Vec<FieldReader>> {
        let mut fields = Vec::with_capacity(writer.fields.len() + reader.fields.len());
        let mut matched = vec![false; reader.fields.len()];

        for writer_field in &writer.fields {
            match find_reader_field(reader, writer_field, &matched) {
                Some(index) => {
                    matched[index] = true;
                    let reader_field = &reader.fields[index];
                    let value = self.value_or_defer(
                        &writer_field.schema,
                        &reader_field.schema,
                        &join(path, &reader_field.name),
                    )?;
                    fields.push(FieldReader::new(
                        &reader_field.name,
                        reader_field.schema.type_name(),
                        FieldKind::Materialize(value),
                    ));
                }
                None => fields.push(FieldReader::new(
                    &writer_field.name,
                    writer_field.schema.type_name(),
                    FieldKind::Skip(writer_field.schema.clone()),
                )),
            }
        }

        for (reader_field, _) in reader.fields.iter().zip(&matched).filter(|(_, m)| !**m) {
            let kind = match &reader_field.default {
                Some(default) => {
                    match DefaultValueReader::build(default, &reader_field.schema, self.reader_names) {
                        Ok(reader) => FieldKind::Default(reader),
                        Err(err) if self.mode == Mode::Unsafe => {
                            self.deferred.push(err.to_string());
                            FieldKind::Missing
                        }
                        Err(err) => {
                            return incompatible(format!(
                                "{}: {}",
                                join(path, &reader_field.name),
                                err
                            ))
                        }
                    }
                }
                None if self.mode == Mode::Unsafe => {
                    self.deferred.push(format!(
                        "field '{}' is missing from the writer and has no default",
                        join(path, &reader_field.name)
                    ));
                    FieldKind::Missing
                }
                None => {
                    return incompatible(format!(
                        "field '{}' is missing from the writer and has no default",
                        join(path, &reader_field.name)
                    ))
                }
            };
            fields.push(FieldReader::new(
                &reader_field.name,
                reader_field.schema.type_name(),
                kind,
            ));
        }

        Ok(fields)
    }

    fn enumeration(&mut self, writer: &EnumSchema, reader: &EnumSchema, path: &str) -> BuildResult<ValueReader> {
        if self.mode == Mode::Identity {
            let mapping = EnumMapping::identity(writer.fullname(), &writer.symbols);
            return Ok(ValueReader::Scalar(ScalarReader::Enum(Arc::new(mapping))));
        }
        self.check_names(
            &writer.fullname(),
            &writer.qualified_aliases(),
            &reader.fullname(),
            &reader.qualified_aliases(),
            path,
        )?;

        let fallback = reader
            .default
            .as_deref()
            .and_then(|symbol| reader.symbol_index(symbol).map(|index| (index, symbol)));
        let targets: Vec<Option<(usize, Arc<str>)>> = writer
            .symbols
            .iter()
            .map(|symbol| match reader.symbol_index(symbol) {
                Some(index) => Some((index, Arc::from(symbol.as_str()))),
                None => fallback.map(|(index, symbol)| (index, Arc::from(symbol))),
            })
            .collect();

        let mapping = EnumMapping {
            name: reader.fullname(),
            writer_symbols: writer.symbols.clone(),
            targets,
        };
        Ok(ValueReader::Scalar(ScalarReader::Enum(Arc::new(mapping))))
    }

    /// Named types match by full name, or by an alias of either side.
    /// Unsafe resolution lets mismatches through.
    fn check_names(
        &mut self,
        writer: &str,
        writer_aliases: &[String],
        reader: &str,
        reader_aliases: &[String],
        path: &str,
    ) -> BuildResult<()> {
        if self.mode == Mode::Identity || names_match(writer, writer_aliases, reader, reader_aliases) {
            return Ok(());
        }
        let reason = format!(
            "{}writer type '{}' does not match reader type '{}'",
            at(path),
            writer,
            reader
        );
        if self.mode == Mode::Unsafe {
            self.deferred.push(reason);
            return Ok(());
        }
        incompatible(reason)
    }

    fn push(&mut self, node: ReaderNode) -> ValueReader {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        ValueReader::Structured(id)
    }
}

fn names_match(writer: &str, writer_aliases: &[String], reader: &str, reader_aliases: &[String]) -> bool {
    if writer == reader {
        return true;
    }
    let short = |name: &str| name.rsplit('.').next().unwrap_or(name).to_string();
    reader_aliases
        .iter()
        .any(|alias| alias == writer || short(alias) == writer)
        || writer_aliases.iter().any(|alias| alias == reader)
}

fn branch_matches(writer: &Schema, reader: &Schema, allow_promotion: bool) -> bool {
    match (writer, reader) {
        (Schema::Record(w), Schema::Record(r)) => names_match(
            &w.fullname(),
            &w.qualified_aliases(),
            &r.fullname(),
            &r.qualified_aliases(),
        ),
        (Schema::Enum(w), Schema::Enum(r)) => names_match(
            &w.fullname(),
            &w.qualified_aliases(),
            &r.fullname(),
            &r.qualified_aliases(),
        ),
        (Schema::Fixed(w), Schema::Fixed(r)) => fixed_matches(w, r),
        (Schema::Array(_), Schema::Array(_)) | (Schema::Map(_), Schema::Map(_)) => true,
        (w, r) if w.is_primitive() && w == r => true,
        (w, r) => allow_promotion && TypePromotion::between(w, r).is_some(),
    }
}

fn fixed_matches(writer: &FixedSchema, reader: &FixedSchema) -> bool {
    writer.size == reader.size
        && names_match(
            &writer.fullname(),
            &writer.qualified_aliases(),
            &reader.fullname(),
            &reader.qualified_aliases(),
        )
}

/// Reader field for a writer field: by name, then reader aliases, then
/// writer aliases.
fn find_reader_field(reader: &RecordSchema, writer_field: &FieldSchema, matched: &[bool]) -> Option<usize> {
    let free = |index: &usize| !matched[*index];
    let fields = &reader.fields;
    (0..fields.len())
        .filter(free)
        .find(|&i| fields[i].name == writer_field.name)
        .or_else(|| {
            (0..fields.len())
                .filter(free)
                .find(|&i| fields[i].aliases.iter().any(|a| *a == writer_field.name))
        })
        .or_else(|| {
            (0..fields.len())
                .filter(free)
                .find(|&i| writer_field.aliases.iter().any(|a| *a == fields[i].name))
        })
}

fn primitive_reader(writer: &Schema, reader: &Schema) -> Option<ScalarReader> {
    if writer != reader {
        return TypePromotion::between(writer, reader).map(ScalarReader::Promote);
    }
    let scalar = match writer {
        Schema::Null => ScalarReader::Null,
        Schema::Boolean => ScalarReader::Boolean,
        Schema::Int => ScalarReader::Int,
        Schema::Long => ScalarReader::Long,
        Schema::Float => ScalarReader::Float,
        Schema::Double => ScalarReader::Double,
        Schema::Bytes => ScalarReader::Bytes,
        Schema::String => ScalarReader::String,
        _ => return None,
    };
    Some(scalar)
}

fn join(path: &str, segment: &str) -> String {
    if path.is_empty() {
        segment.to_string()
    } else {
        format!("{}.{}", path, segment)
    }
}

fn at(path: &str) -> String {
    if path.is_empty() {
        String::new()
    } else {
        format!("at '{}': ", path)
    }
}

// ============================================================================
// Blueprint cache
// ============================================================================

/// Shares resolved plans between callers.
///
/// Keyed by the canonical JSON of the (writer, reader) pair, so each
/// distinct pair is resolved once. Whether pairs are resolved strictly or
/// unsafely is fixed by the cache's [`DecoderConfig`].
#[derive(Debug, Default)]
pub struct BlueprintCache {
    entries: RwLock<HashMap<(String, String), Arc<ResolvedSchemaPair>>>,
    config: DecoderConfig,
}

impl BlueprintCache {
    pub fn new(config: DecoderConfig) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            config,
        }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// The plan for `writer` read as `reader`, resolving it on first use.
    pub fn get_or_resolve(&self, writer: &Schema, reader: &Schema) -> Result<Arc<ResolvedSchemaPair>, ResolutionError> {
        let key = (writer.to_json(), reader.to_json());
        if let Some(pair) = self.entries.read().get(&key) {
            debug!(writer = %display_name(writer), "Read plan cache hit");
            return Ok(Arc::clone(pair));
        }

        debug!(writer = %display_name(writer), reader = %display_name(reader), "Read plan cache miss");
        let pair = if key.0 == key.1 {
            ResolvedSchemaPair::identity(writer)?
        } else if self.config.unsafe_resolution {
            ResolvedSchemaPair::resolve_unsafe(writer, reader)?
        } else {
            ResolvedSchemaPair::resolve(writer, reader)?
        };

        // Another thread may have resolved the same pair meanwhile; keep the first.
        let mut entries = self.entries.write();
        let entry = entries.entry(key).or_insert_with(|| Arc::new(pair));
        Ok(Arc::clone(entry))
    }

    /// The plan for reading `schema` with itself.
    pub fn identity(&self, schema: &Schema) -> Result<Arc<ResolvedSchemaPair>, ResolutionError> {
        self.get_or_resolve(schema, schema)
    }

    /// Decoder over `data` for `writer` read as `reader`, configured with
    /// this cache's limits.
    pub fn new_reader<'a>(
        &self,
        writer: &Schema,
        reader: &Schema,
        data: &'a [u8],
    ) -> Result<StructureDecoder<'a>, ResolutionError> {
        let pair = self.get_or_resolve(writer, reader)?;
        Ok(pair.new_reader_with_config(data, self.config.clone()))
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}
