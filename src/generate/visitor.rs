//! The protocol through which a type reports its serializable shape.
//!
//! A [`Describe`] implementation receives a [`ShapeVisitor`] and calls
//! exactly one `expect_*` method on it. Composite shapes hand back a
//! secondary visitor ([`RecordShape`], [`ArrayShape`], [`MapShape`]) through
//! which the children are reported as [`Property`] and [`Element`] values.

use super::annotations::{FieldAnnotations, KeyShape, NumberKind, TypeInfo};
use crate::error::GenerationError;
use crate::schema::FieldOrder;

/// A type with a statically known serializable shape.
pub trait Describe: 'static {
    fn type_info() -> TypeInfo;

    fn describe(visitor: &mut dyn ShapeVisitor) -> Result<(), GenerationError>;

    /// How this type behaves as a map key.
    fn key_shape() -> KeyShape {
        KeyShape::Unsupported
    }
}

/// Receiver of shape reports.
pub trait ShapeVisitor {
    /// Report a record. `None` means the record is already defined and its
    /// properties must not be reported again.
    fn expect_record(
        &mut self,
        ty: &TypeInfo,
    ) -> Result<Option<&mut dyn RecordShape>, GenerationError>;

    fn expect_array(&mut self, ty: &TypeInfo) -> Result<&mut dyn ArrayShape, GenerationError>;

    fn expect_map(
        &mut self,
        ty: &TypeInfo,
        key: KeyShape,
    ) -> Result<&mut dyn MapShape, GenerationError>;

    fn expect_enum(&mut self, ty: &TypeInfo, symbols: &[&str]) -> Result<(), GenerationError>;

    fn expect_string(&mut self, ty: &TypeInfo) -> Result<(), GenerationError>;

    fn expect_integer(&mut self, ty: &TypeInfo, kind: NumberKind) -> Result<(), GenerationError>;

    fn expect_number(&mut self, ty: &TypeInfo, kind: NumberKind) -> Result<(), GenerationError>;

    fn expect_boolean(&mut self, ty: &TypeInfo) -> Result<(), GenerationError>;

    fn expect_null(&mut self, ty: &TypeInfo) -> Result<(), GenerationError>;
}

pub trait RecordShape {
    fn property(&mut self, property: Property) -> Result<(), GenerationError>;
}

pub trait ArrayShape {
    fn items(&mut self, element: Element) -> Result<(), GenerationError>;
}

pub trait MapShape {
    fn values(&mut self, element: Element) -> Result<(), GenerationError>;
}

/// A deferred reference to a describable type.
#[derive(Clone, Copy)]
pub struct Element {
    pub(crate) type_info: fn() -> TypeInfo,
    pub(crate) describe: fn(&mut dyn ShapeVisitor) -> Result<(), GenerationError>,
}

impl Element {
    pub fn of<T: Describe>() -> Self {
        Self {
            type_info: T::type_info,
            describe: T::describe,
        }
    }

    pub fn type_info(&self) -> TypeInfo {
        (self.type_info)()
    }
}

impl std::fmt::Debug for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Element")
            .field(&(self.type_info)().rust_name)
            .finish()
    }
}

/// A named record member.
#[derive(Debug, Clone)]
pub struct Property {
    pub name: String,
    pub element: Element,
    pub annotations: FieldAnnotations,
}

impl Property {
    pub fn of<T: Describe>(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            element: Element::of::<T>(),
            annotations: FieldAnnotations::default(),
        }
    }

    pub fn with_annotations(mut self, annotations: FieldAnnotations) -> Self {
        self.annotations = annotations;
        self
    }

    pub fn required(mut self) -> Self {
        self.annotations.required = true;
        self
    }

    pub fn with_default(mut self, default: serde_json::Value) -> Self {
        self.annotations.default = Some(default);
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.annotations.doc = Some(doc.into());
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.annotations.aliases.push(alias.into());
        self
    }

    pub fn with_order(mut self, order: FieldOrder) -> Self {
        self.annotations.order = Some(order);
        self
    }
}
