//! The visitor that turns shape reports into schemas.

use serde_json::Value;
use tracing::debug;

use super::annotations::{KeyShape, LogicalHint, NumberKind, TypeInfo};
use super::registry::SchemaRegistry;
use super::visitor::{ArrayShape, Element, MapShape, Property, RecordShape, ShapeVisitor};
use super::GeneratorConfig;
use crate::error::GenerationError;
use crate::schema::{
    parse_schema, EnumSchema, FieldOrder, FieldSchema, FixedSchema, RecordSchema, Schema,
};

/// Context a parent hands down to the element it is generating.
#[derive(Debug, Clone, Default)]
pub(crate) struct Hints {
    pub fixed: Option<usize>,
    pub logical: Option<LogicalHint>,
    /// Name for an inline fixed type.
    pub fixed_name: Option<String>,
}

enum State {
    Empty,
    Done(Schema),
    Record {
        ty: TypeInfo,
        fields: Vec<FieldSchema>,
    },
    Array {
        ty: TypeInfo,
        items: Option<(Schema, bool)>,
    },
    Map {
        values: Option<Schema>,
    },
}

/// Generate the schema of one element, registering named types on the way.
pub(crate) fn generate_element(
    registry: &mut SchemaRegistry,
    config: &GeneratorConfig,
    element: &Element,
    hints: Hints,
) -> Result<Schema, GenerationError> {
    let ty = element.type_info();
    generate_with(registry, config, element, &ty, hints).map(|(schema, _)| schema)
}

/// Like [`generate_element`], also reporting whether the element was a byte.
fn generate_with(
    registry: &mut SchemaRegistry,
    config: &GeneratorConfig,
    element: &Element,
    ty: &TypeInfo,
    hints: Hints,
) -> Result<(Schema, bool), GenerationError> {
    if let Some(text) = &ty.schema_override {
        let schema = parse_override(text, ty.rust_name)?;
        return Ok((schema, false));
    }

    let mut visitor = SchemaVisitor {
        registry,
        config,
        hints,
        state: State::Empty,
        byte: false,
    };
    (element.describe)(&mut visitor)?;
    let byte = visitor.byte;
    let schema = visitor.finish(ty)?;

    let schema = if ty.nullable { with_null(schema) } else { schema };
    Ok((schema, byte))
}

fn parse_override(text: &str, owner: &str) -> Result<Schema, GenerationError> {
    parse_schema(text).map_err(|source| GenerationError::InvalidOverride {
        owner: owner.to_string(),
        source,
    })
}

/// `["null", T]`, or `T` with a null branch prepended if it is a union.
fn with_null(schema: Schema) -> Schema {
    match schema {
        Schema::Union(branches) if branches.contains(&Schema::Null) => Schema::Union(branches),
        Schema::Union(mut branches) => {
            branches.insert(0, Schema::Null);
            Schema::Union(branches)
        }
        Schema::Null => Schema::Null,
        other => Schema::Union(vec![Schema::Null, other]),
    }
}

/// Move the branch the default belongs to into first position.
fn reorder_for_default(schema: Schema, default: Option<&Value>) -> Schema {
    let mut branches = match schema {
        Schema::Union(branches) => branches,
        other => return other,
    };
    let wants_null = matches!(default, None | Some(Value::Null));
    let target = branches
        .iter()
        .position(|b| (*b == Schema::Null) == wants_null);
    if let Some(idx) = target {
        if idx != 0 {
            let branch = branches.remove(idx);
            branches.insert(0, branch);
        }
    }
    Schema::Union(branches)
}

fn fixed_schema(hints: &Hints, ty: &TypeInfo, size: usize) -> Schema {
    let name = hints
        .fixed_name
        .clone()
        .unwrap_or_else(|| ty.schema_name());
    let mut fixed = FixedSchema::new(name, size);
    if hints.fixed_name.is_none() {
        fixed.namespace = ty.schema_namespace();
    }
    Schema::Fixed(fixed)
}

fn is_valid_symbol(symbol: &str) -> bool {
    crate::schema::is_valid_name(symbol)
}

pub(crate) struct SchemaVisitor<'r> {
    registry: &'r mut SchemaRegistry,
    config: &'r GeneratorConfig,
    hints: Hints,
    state: State,
    byte: bool,
}

impl<'r> SchemaVisitor<'r> {
    fn ensure_empty(&self, ty: &TypeInfo) -> Result<(), GenerationError> {
        match self.state {
            State::Empty => Ok(()),
            _ => Err(GenerationError::UnsupportedShape {
                type_name: ty.rust_name.to_string(),
                reason: "more than one shape reported".to_string(),
            }),
        }
    }

    fn hint(&self, ty: &TypeInfo) -> Option<LogicalHint> {
        if !self.config.logical_types {
            return None;
        }
        self.hints.logical.or(ty.logical)
    }

    fn fixed_size(&self, ty: &TypeInfo) -> Option<usize> {
        self.hints.fixed.or(ty.fixed)
    }

    /// Record a terminal shape, tagging it with a logical type if hinted.
    fn scalar(&mut self, ty: &TypeInfo, plain: Schema) -> Result<(), GenerationError> {
        self.ensure_empty(ty)?;
        let schema = match self.hint(ty) {
            Some(hint @ LogicalHint::Decimal { .. }) => {
                let fixed = self
                    .fixed_size(ty)
                    .map(|size| fixed_schema(&self.hints, ty, size));
                hint.to_schema(fixed)
            }
            Some(hint) => hint.to_schema(None),
            None => plain,
        };
        self.state = State::Done(schema);
        Ok(())
    }

    fn integer_schema(kind: NumberKind) -> Schema {
        match kind {
            NumberKind::Byte | NumberKind::Short | NumberKind::Int => Schema::Int,
            NumberKind::Long => Schema::Long,
            NumberKind::BigInteger => Schema::String,
            NumberKind::Float => Schema::Float,
            NumberKind::Double => Schema::Double,
            NumberKind::BigDecimal => Schema::String,
            NumberKind::Unknown => Schema::Union(vec![Schema::Int, Schema::Long]),
        }
    }

    fn number_schema(kind: NumberKind) -> Schema {
        match kind {
            NumberKind::Unknown => Schema::Union(vec![Schema::Int, Schema::Long, Schema::Double]),
            other => Self::integer_schema(other),
        }
    }

    /// Child hints for a record field.
    fn field_hints(&self, owner: &TypeInfo, property: &Property) -> Hints {
        let ann = &property.annotations;
        Hints {
            fixed: ann.fixed,
            logical: ann.logical,
            fixed_name: ann
                .fixed
                .map(|_| format!("{}_{}", owner.schema_name(), property.name)),
        }
    }

    fn build_field(
        &mut self,
        owner: &TypeInfo,
        property: Property,
    ) -> Result<FieldSchema, GenerationError> {
        let ty = property.element.type_info();
        let ann = &property.annotations;

        let overridden = ann.schema_override.is_some();
        let schema = match &ann.schema_override {
            Some(text) => {
                parse_override(text, &format!("{}.{}", owner.rust_name, property.name))?
            }
            None => {
                let hints = self.field_hints(owner, &property);
                generate_with(&mut *self.registry, self.config, &property.element, &ty, hints)?.0
            }
        };

        let mut default = if ann.required && !self.config.always_allow_default {
            None
        } else {
            ann.declared_default()
        };
        if ann.required && ty.primitive && default == Some(Value::Null) {
            default = None;
        }

        let schema = if overridden {
            schema
        } else {
            let widened = if !ann.required && !ty.primitive && !matches!(schema, Schema::Union(_))
            {
                with_null(schema)
            } else {
                schema
            };
            reorder_for_default(widened, default.as_ref())
        };

        Ok(FieldSchema {
            name: property.name.clone(),
            schema,
            default,
            doc: ann.doc.clone(),
            order: ann.order.unwrap_or(FieldOrder::Ascending),
            aliases: ann.aliases.clone(),
            properties: ann.meta.clone(),
        })
    }

    fn finish(self, ty: &TypeInfo) -> Result<Schema, GenerationError> {
        let missing = |reason: &str| GenerationError::MissingContext {
            type_name: ty.rust_name.to_string(),
            reason: reason.to_string(),
        };

        let SchemaVisitor {
            registry,
            hints,
            state,
            ..
        } = self;

        match state {
            State::Empty => Err(missing("no shape was reported")),
            State::Done(schema) => Ok(schema),
            State::Record { ty, fields } => {
                let mut record = RecordSchema::new(ty.schema_name(), fields);
                record.namespace = ty.schema_namespace();
                record.doc = ty.doc.clone();
                record.aliases = ty.aliases.clone();
                record.properties = ty.meta.clone();
                let schema = Schema::Record(record);
                registry.complete(ty.id, schema.clone());
                debug!("Generated record schema {}", ty.fullname());
                Ok(schema)
            }
            State::Array { items: None, .. } => Err(missing("array element was not described")),
            State::Array {
                ty,
                items: Some((items, byte)),
            } => {
                if byte {
                    let size = hints.fixed.or(ty.fixed);
                    Ok(match size {
                        Some(size) => fixed_schema(&hints, &ty, size),
                        None => Schema::Bytes,
                    })
                } else {
                    Ok(Schema::Array(Box::new(items)))
                }
            }
            State::Map { values: None } => Err(missing("map value was not described")),
            State::Map {
                values: Some(values),
            } => Ok(Schema::Map(Box::new(values))),
        }
    }
}

impl<'r> ShapeVisitor for SchemaVisitor<'r> {
    fn expect_record(
        &mut self,
        ty: &TypeInfo,
    ) -> Result<Option<&mut dyn RecordShape>, GenerationError> {
        self.ensure_empty(ty)?;
        if let Some(named) = self.registry.reference(ty.id) {
            self.state = State::Done(named);
            return Ok(None);
        }
        self.registry.begin(ty)?;
        self.state = State::Record {
            ty: ty.clone(),
            fields: Vec::new(),
        };
        Ok(Some(self))
    }

    fn expect_array(&mut self, ty: &TypeInfo) -> Result<&mut dyn ArrayShape, GenerationError> {
        self.ensure_empty(ty)?;
        self.state = State::Array {
            ty: ty.clone(),
            items: None,
        };
        Ok(self)
    }

    fn expect_map(
        &mut self,
        ty: &TypeInfo,
        key: KeyShape,
    ) -> Result<&mut dyn MapShape, GenerationError> {
        self.ensure_empty(ty)?;
        if !key.is_stringable() {
            return Err(GenerationError::UnsupportedShape {
                type_name: ty.rust_name.to_string(),
                reason: format!("map keys must be stringable, found {:?}", key),
            });
        }
        self.state = State::Map { values: None };
        Ok(self)
    }

    fn expect_enum(&mut self, ty: &TypeInfo, symbols: &[&str]) -> Result<(), GenerationError> {
        self.ensure_empty(ty)?;
        if let Some(named) = self.registry.reference(ty.id) {
            self.state = State::Done(named);
            return Ok(());
        }

        let fullname = ty.fullname();
        let mut seen = std::collections::HashSet::new();
        for symbol in symbols {
            if !is_valid_symbol(symbol) {
                return Err(GenerationError::IllegalSymbol {
                    symbol: symbol.to_string(),
                    type_name: fullname,
                });
            }
            if !seen.insert(*symbol) {
                return Err(GenerationError::UnsupportedShape {
                    type_name: fullname,
                    reason: format!("duplicate enum symbol '{}'", symbol),
                });
            }
        }

        self.registry.begin(ty)?;
        let mut schema = EnumSchema::new(
            ty.schema_name(),
            symbols.iter().map(|s| s.to_string()).collect(),
        );
        schema.namespace = ty.schema_namespace();
        schema.doc = ty.doc.clone();
        schema.aliases = ty.aliases.clone();
        schema.properties = ty.meta.clone();
        let schema = Schema::Enum(schema);
        self.registry.complete(ty.id, schema.clone());
        debug!("Generated enum schema {}", fullname);
        self.state = State::Done(schema);
        Ok(())
    }

    fn expect_string(&mut self, ty: &TypeInfo) -> Result<(), GenerationError> {
        self.scalar(ty, Schema::String)
    }

    fn expect_integer(&mut self, ty: &TypeInfo, kind: NumberKind) -> Result<(), GenerationError> {
        self.byte = kind == NumberKind::Byte;
        self.scalar(ty, Self::integer_schema(kind))
    }

    fn expect_number(&mut self, ty: &TypeInfo, kind: NumberKind) -> Result<(), GenerationError> {
        self.scalar(ty, Self::number_schema(kind))
    }

    fn expect_boolean(&mut self, ty: &TypeInfo) -> Result<(), GenerationError> {
        self.scalar(ty, Schema::Boolean)
    }

    fn expect_null(&mut self, ty: &TypeInfo) -> Result<(), GenerationError> {
        self.scalar(ty, Schema::Null)
    }
}

impl<'r> RecordShape for SchemaVisitor<'r> {
    fn property(&mut self, property: Property) -> Result<(), GenerationError> {
        let owner = match &self.state {
            State::Record { ty, .. } => ty.clone(),
            _ => {
                return Err(GenerationError::MissingContext {
                    type_name: property.element.type_info().rust_name.to_string(),
                    reason: format!("property '{}' reported outside a record", property.name),
                })
            }
        };

        let field = self.build_field(&owner, property)?;
        if let State::Record { fields, .. } = &mut self.state {
            if fields.iter().any(|f| f.name == field.name) {
                return Err(GenerationError::UnsupportedShape {
                    type_name: owner.fullname(),
                    reason: format!("duplicate field '{}'", field.name),
                });
            }
            fields.push(field);
        }
        Ok(())
    }
}

impl<'r> ArrayShape for SchemaVisitor<'r> {
    fn items(&mut self, element: Element) -> Result<(), GenerationError> {
        let ty = element.type_info();
        let generated = generate_with(
            &mut *self.registry,
            self.config,
            &element,
            &ty,
            Hints::default(),
        )?;
        match &mut self.state {
            State::Array { items, .. } => {
                *items = Some(generated);
                Ok(())
            }
            _ => Err(GenerationError::MissingContext {
                type_name: ty.rust_name.to_string(),
                reason: "element reported outside an array".to_string(),
            }),
        }
    }
}

impl<'r> MapShape for SchemaVisitor<'r> {
    fn values(&mut self, element: Element) -> Result<(), GenerationError> {
        let ty = element.type_info();
        let schema = generate_element(&mut *self.registry, self.config, &element, Hints::default())?;
        match &mut self.state {
            State::Map { values } => {
                *values = Some(schema);
                Ok(())
            }
            _ => Err(GenerationError::MissingContext {
                type_name: ty.rust_name.to_string(),
                reason: "value reported outside a map".to_string(),
            }),
        }
    }
}
