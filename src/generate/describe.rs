//! [`Describe`] implementations for standard library and ecosystem types.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use uuid::Uuid;

use super::annotations::{KeyShape, LogicalHint, NumberKind, TypeInfo};
use super::visitor::{Describe, Element, ShapeVisitor};
use crate::error::GenerationError;

macro_rules! describe_integer {
    ($($ty:ty => $kind:expr),* $(,)?) => {
        $(
            impl Describe for $ty {
                fn type_info() -> TypeInfo {
                    TypeInfo::of::<$ty>().primitive()
                }

                fn describe(visitor: &mut dyn ShapeVisitor) -> Result<(), GenerationError> {
                    visitor.expect_integer(&Self::type_info(), $kind)
                }

                fn key_shape() -> KeyShape {
                    KeyShape::Integer
                }
            }
        )*
    };
}

// Unsigned types widen to the next signed class that holds every value.
describe_integer! {
    i8 => NumberKind::Byte,
    i16 => NumberKind::Short,
    i32 => NumberKind::Int,
    i64 => NumberKind::Long,
    i128 => NumberKind::BigInteger,
    u8 => NumberKind::Byte,
    u16 => NumberKind::Int,
    u32 => NumberKind::Long,
    u64 => NumberKind::BigInteger,
    u128 => NumberKind::BigInteger,
}

impl Describe for f32 {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<f32>().primitive()
    }

    fn describe(visitor: &mut dyn ShapeVisitor) -> Result<(), GenerationError> {
        visitor.expect_number(&Self::type_info(), NumberKind::Float)
    }
}

impl Describe for f64 {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<f64>().primitive()
    }

    fn describe(visitor: &mut dyn ShapeVisitor) -> Result<(), GenerationError> {
        visitor.expect_number(&Self::type_info(), NumberKind::Double)
    }
}

impl Describe for bool {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<bool>().primitive()
    }

    fn describe(visitor: &mut dyn ShapeVisitor) -> Result<(), GenerationError> {
        visitor.expect_boolean(&Self::type_info())
    }

    fn key_shape() -> KeyShape {
        KeyShape::Boolean
    }
}

impl Describe for char {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<char>().primitive()
    }

    fn describe(visitor: &mut dyn ShapeVisitor) -> Result<(), GenerationError> {
        visitor.expect_string(&Self::type_info())
    }

    fn key_shape() -> KeyShape {
        KeyShape::Char
    }
}

impl Describe for String {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<String>()
    }

    fn describe(visitor: &mut dyn ShapeVisitor) -> Result<(), GenerationError> {
        visitor.expect_string(&Self::type_info())
    }

    fn key_shape() -> KeyShape {
        KeyShape::String
    }
}

impl Describe for &'static str {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<&'static str>()
    }

    fn describe(visitor: &mut dyn ShapeVisitor) -> Result<(), GenerationError> {
        visitor.expect_string(&Self::type_info())
    }

    fn key_shape() -> KeyShape {
        KeyShape::String
    }
}

impl Describe for () {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<()>()
    }

    fn describe(visitor: &mut dyn ShapeVisitor) -> Result<(), GenerationError> {
        visitor.expect_null(&Self::type_info())
    }
}

// Wrappers are transparent: they share the inner type's identity.

impl<T: Describe> Describe for Option<T> {
    fn type_info() -> TypeInfo {
        T::type_info().nullable()
    }

    fn describe(visitor: &mut dyn ShapeVisitor) -> Result<(), GenerationError> {
        T::describe(visitor)
    }
}

impl<T: Describe> Describe for Box<T> {
    fn type_info() -> TypeInfo {
        T::type_info()
    }

    fn describe(visitor: &mut dyn ShapeVisitor) -> Result<(), GenerationError> {
        T::describe(visitor)
    }

    fn key_shape() -> KeyShape {
        T::key_shape()
    }
}

impl<T: Describe> Describe for Arc<T> {
    fn type_info() -> TypeInfo {
        T::type_info()
    }

    fn describe(visitor: &mut dyn ShapeVisitor) -> Result<(), GenerationError> {
        T::describe(visitor)
    }

    fn key_shape() -> KeyShape {
        T::key_shape()
    }
}

impl<T: Describe> Describe for Vec<T> {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<Vec<T>>()
    }

    fn describe(visitor: &mut dyn ShapeVisitor) -> Result<(), GenerationError> {
        visitor
            .expect_array(&Self::type_info())?
            .items(Element::of::<T>())
    }
}

impl<T: Describe, const N: usize> Describe for [T; N] {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<[T; N]>()
    }

    fn describe(visitor: &mut dyn ShapeVisitor) -> Result<(), GenerationError> {
        visitor
            .expect_array(&Self::type_info())?
            .items(Element::of::<T>())
    }
}

impl<K: Describe, V: Describe, S: 'static> Describe for HashMap<K, V, S> {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<HashMap<K, V, S>>()
    }

    fn describe(visitor: &mut dyn ShapeVisitor) -> Result<(), GenerationError> {
        visitor
            .expect_map(&Self::type_info(), K::key_shape())?
            .values(Element::of::<V>())
    }
}

impl<K: Describe, V: Describe> Describe for BTreeMap<K, V> {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<BTreeMap<K, V>>()
    }

    fn describe(visitor: &mut dyn ShapeVisitor) -> Result<(), GenerationError> {
        visitor
            .expect_map(&Self::type_info(), K::key_shape())?
            .values(Element::of::<V>())
    }
}

impl Describe for NaiveDate {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<NaiveDate>().with_logical(LogicalHint::Date)
    }

    fn describe(visitor: &mut dyn ShapeVisitor) -> Result<(), GenerationError> {
        visitor.expect_integer(&Self::type_info(), NumberKind::Int)
    }
}

impl Describe for NaiveTime {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<NaiveTime>().with_logical(LogicalHint::TimeMillis)
    }

    fn describe(visitor: &mut dyn ShapeVisitor) -> Result<(), GenerationError> {
        visitor.expect_integer(&Self::type_info(), NumberKind::Int)
    }
}

impl Describe for NaiveDateTime {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<NaiveDateTime>().with_logical(LogicalHint::LocalTimestampMillis)
    }

    fn describe(visitor: &mut dyn ShapeVisitor) -> Result<(), GenerationError> {
        visitor.expect_integer(&Self::type_info(), NumberKind::Long)
    }
}

impl Describe for DateTime<Utc> {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<DateTime<Utc>>().with_logical(LogicalHint::TimestampMillis)
    }

    fn describe(visitor: &mut dyn ShapeVisitor) -> Result<(), GenerationError> {
        visitor.expect_integer(&Self::type_info(), NumberKind::Long)
    }
}

impl Describe for Uuid {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<Uuid>().with_logical(LogicalHint::Uuid)
    }

    fn describe(visitor: &mut dyn ShapeVisitor) -> Result<(), GenerationError> {
        visitor.expect_string(&Self::type_info())
    }

    fn key_shape() -> KeyShape {
        KeyShape::String
    }
}
