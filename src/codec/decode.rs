//! Binary decoding of primitive values, plus schema-driven skipping.
//!
//! All functions take a `&mut &[u8]` cursor and advance it past what they
//! consume:
//! - ints and longs are zigzag varints
//! - floats and doubles are little-endian IEEE 754
//! - bytes and strings are length-prefixed
//! - fixed values are exactly their declared size
//!
//! `skip_value` consumes exactly the bytes a full decode of the same schema
//! would. The structure readers rely on this to stay aligned when a writer
//! field has no reader counterpart.

use std::collections::HashSet;

use crate::codec::varint;
use crate::error::DecodeError;
use crate::schema::{NamedTypes, Schema};

/// Decode a boolean (one byte, 0 or 1).
#[inline]
pub fn decode_boolean(data: &mut &[u8]) -> Result<bool, DecodeError> {
    let (&byte, rest) = data.split_first().ok_or(DecodeError::UnexpectedEof)?;
    *data = rest;
    match byte {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(DecodeError::InvalidData(format!(
            "Invalid boolean value: {}, expected 0 or 1",
            byte
        ))),
    }
}

/// Decode a 32-bit signed integer.
#[inline]
pub fn decode_int(data: &mut &[u8]) -> Result<i32, DecodeError> {
    let long = decode_long(data)?;
    i32::try_from(long).map_err(|_| {
        DecodeError::InvalidData(format!("Integer overflow: {} does not fit in i32", long))
    })
}

/// Decode a 64-bit signed integer.
#[inline]
pub fn decode_long(data: &mut &[u8]) -> Result<i64, DecodeError> {
    varint::decode_zigzag(data)
}

#[inline]
pub fn decode_float(data: &mut &[u8]) -> Result<f32, DecodeError> {
    let bytes = take(data, 4)?;
    Ok(f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

#[inline]
pub fn decode_double(data: &mut &[u8]) -> Result<f64, DecodeError> {
    let bytes = take(data, 8)?;
    let mut buf = [0u8; 8];
    buf.copy_from_slice(bytes);
    Ok(f64::from_le_bytes(buf))
}

/// Read a bytes/string length prefix.
///
/// A length of zero or below yields an empty payload. Negative lengths are
/// not rejected: older writers are known to emit them for empty values, so
/// this is kept for wire compatibility even though it hides malformed input.
#[inline]
pub fn decode_len(data: &mut &[u8]) -> Result<usize, DecodeError> {
    let len = decode_long(data)?;
    if len <= 0 {
        return Ok(0);
    }
    usize::try_from(len).map_err(|_| DecodeError::InvalidData(format!("Length {} too large", len)))
}

/// Decode length-prefixed bytes without copying.
#[inline]
pub fn decode_bytes_ref<'a>(data: &mut &'a [u8]) -> Result<&'a [u8], DecodeError> {
    let len = decode_len(data)?;
    take(data, len)
}

/// Decode length-prefixed bytes into an owned vector.
#[inline]
pub fn decode_bytes(data: &mut &[u8]) -> Result<Vec<u8>, DecodeError> {
    decode_bytes_ref(data).map(<[u8]>::to_vec)
}

/// Decode a UTF-8 string without copying.
#[inline]
pub fn decode_string_ref<'a>(data: &mut &'a [u8]) -> Result<&'a str, DecodeError> {
    let bytes = decode_bytes_ref(data)?;
    Ok(std::str::from_utf8(bytes)?)
}

#[inline]
pub fn decode_string(data: &mut &[u8]) -> Result<String, DecodeError> {
    decode_string_ref(data).map(str::to_owned)
}

/// Decode exactly `size` raw bytes.
#[inline]
pub fn decode_fixed_ref<'a>(data: &mut &'a [u8], size: usize) -> Result<&'a [u8], DecodeError> {
    take(data, size)
}

/// Decode an enum index and check it against the symbol count.
#[inline]
pub fn decode_enum_index(data: &mut &[u8], num_symbols: usize) -> Result<usize, DecodeError> {
    let index = decode_int(data)?;
    if index < 0 || index as usize >= num_symbols {
        return Err(DecodeError::InvalidData(format!(
            "Enum index {} out of range (0..{})",
            index, num_symbols
        )));
    }
    Ok(index as usize)
}

/// Decode a union branch index and check it against the member count.
#[inline]
pub fn decode_union_index(data: &mut &[u8], count: usize) -> Result<usize, DecodeError> {
    let index = decode_long(data)?;
    if index < 0 || index as u64 >= count as u64 {
        return Err(DecodeError::UnionBranchOutOfRange { index, count });
    }
    Ok(index as usize)
}

/// Read the header of the next array/map block.
///
/// Returns the number of items in the block, `0` for the terminating block.
/// A negative count `-n` announces `n` items followed by the block's byte
/// size, which is read and discarded here.
#[inline]
pub fn decode_block_count(data: &mut &[u8]) -> Result<usize, DecodeError> {
    let count = decode_long(data)?;
    if count >= 0 {
        return Ok(count as usize);
    }
    let _byte_size = decode_long(data)?;
    count
        .checked_neg()
        .map(|n| n as usize)
        .ok_or_else(|| DecodeError::InvalidData(format!("Invalid block count: {}", count)))
}

#[inline]
fn take<'a>(data: &mut &'a [u8], len: usize) -> Result<&'a [u8], DecodeError> {
    if data.len() < len {
        return Err(DecodeError::UnexpectedEof);
    }
    let (head, rest) = data.split_at(len);
    *data = rest;
    Ok(head)
}

// ============================================================================
// Skipping
// ============================================================================

/// Skip over a fixed number of bytes.
#[inline]
pub fn skip_fixed(data: &mut &[u8], size: usize) -> Result<(), DecodeError> {
    take(data, size).map(|_| ())
}

/// Skip over a bytes or string value.
#[inline]
pub fn skip_bytes(data: &mut &[u8]) -> Result<(), DecodeError> {
    let len = decode_len(data)?;
    skip_fixed(data, len)
}

/// Bounds applied while skipping a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkipLimits {
    /// Maximum number of nested records, arrays and maps.
    pub max_depth: usize,
    /// Maximum item count accepted in a single array or map block.
    pub max_block_items: usize,
}

impl Default for SkipLimits {
    fn default() -> Self {
        Self {
            max_depth: 512,
            max_block_items: 1 << 24,
        }
    }
}

enum SkipTask<'s> {
    Value {
        schema: &'s Schema,
        depth: usize,
    },
    /// Items left in the current block of an array or map.
    Block {
        item: &'s Schema,
        map: bool,
        zero_width: bool,
        remaining: u64,
        depth: usize,
    },
}

/// Skip any value of `schema` with the default [`SkipLimits`].
pub fn skip_value(data: &mut &[u8], schema: &Schema, names: &NamedTypes) -> Result<(), DecodeError> {
    skip_value_with(data, schema, names, &SkipLimits::default(), 0)
}

/// Skip any value of `schema`, following named references through `names`.
///
/// Nesting is tracked on an explicit work stack; `depth` is the nesting
/// already open around the value. Fails instead of guessing when a value
/// cannot be sized (an unresolved reference).
pub fn skip_value_with<'s>(
    data: &mut &[u8],
    schema: &'s Schema,
    names: &'s NamedTypes,
    limits: &SkipLimits,
    depth: usize,
) -> Result<(), DecodeError> {
    let enter = |depth: usize| {
        if depth >= limits.max_depth {
            Err(DecodeError::DepthExceeded(limits.max_depth))
        } else {
            Ok(depth + 1)
        }
    };

    let mut stack = vec![SkipTask::Value { schema, depth }];
    while let Some(task) = stack.pop() {
        match task {
            SkipTask::Value { schema, depth } => match schema {
                Schema::Null => {}
                Schema::Boolean => skip_fixed(data, 1)?,
                Schema::Int | Schema::Long | Schema::Enum(_) => varint::skip_varint(data)?,
                Schema::Float => skip_fixed(data, 4)?,
                Schema::Double => skip_fixed(data, 8)?,
                Schema::Bytes | Schema::String => skip_bytes(data)?,
                Schema::Fixed(fixed) => skip_fixed(data, fixed.size)?,
                Schema::Union(variants) => {
                    let index = decode_union_index(data, variants.len())?;
                    stack.push(SkipTask::Value {
                        schema: &variants[index],
                        depth,
                    });
                }
                Schema::Record(record) => {
                    let depth = enter(depth)?;
                    stack.extend(
                        record
                            .fields
                            .iter()
                            .rev()
                            .map(|field| SkipTask::Value {
                                schema: &field.schema,
                                depth,
                            }),
                    );
                }
                Schema::Array(items) => stack.push(SkipTask::Block {
                    item: items,
                    map: false,
                    zero_width: is_zero_width(items, names),
                    remaining: 0,
                    depth: enter(depth)?,
                }),
                Schema::Map(values) => stack.push(SkipTask::Block {
                    item: values,
                    map: true,
                    zero_width: false,
                    remaining: 0,
                    depth: enter(depth)?,
                }),
                Schema::Named(name) => {
                    let resolved = names
                        .get(name)
                        .ok_or_else(|| DecodeError::Unresolved(name.clone()))?;
                    stack.push(SkipTask::Value {
                        schema: resolved,
                        depth,
                    });
                }
                Schema::Logical(logical) => stack.push(SkipTask::Value {
                    schema: &logical.base,
                    depth,
                }),
            },
            SkipTask::Block {
                item,
                map,
                zero_width,
                remaining,
                depth,
            } => {
                if remaining > 0 {
                    stack.push(SkipTask::Block {
                        item,
                        map,
                        zero_width,
                        remaining: remaining - 1,
                        depth,
                    });
                    if map {
                        skip_bytes(data)?;
                    }
                    stack.push(SkipTask::Value {
                        schema: item,
                        depth,
                    });
                    continue;
                }

                let count = decode_long(data)?;
                if count == 0 {
                    continue;
                }
                let items = count.unsigned_abs();
                if items > limits.max_block_items as u64 {
                    return Err(DecodeError::InvalidData(format!(
                        "Block of {} items exceeds limit of {}",
                        items, limits.max_block_items
                    )));
                }
                let remaining = if count < 0 {
                    // The byte size hint lets the whole block be jumped.
                    let byte_size = decode_long(data)?;
                    if byte_size < 0 {
                        return Err(DecodeError::InvalidData(format!(
                            "Negative block byte size: {}",
                            byte_size
                        )));
                    }
                    skip_fixed(data, byte_size as usize)?;
                    0
                } else if zero_width {
                    0
                } else {
                    items
                };
                stack.push(SkipTask::Block {
                    item,
                    map,
                    zero_width,
                    remaining,
                    depth,
                });
            }
        }
    }
    Ok(())
}

/// Whether every value of `schema` is encoded in zero bytes: null, empty
/// fixed types, and records made only of such fields.
pub fn is_zero_width(schema: &Schema, names: &NamedTypes) -> bool {
    let mut open = HashSet::new();
    zero_width(schema, names, &mut open)
}

fn zero_width(schema: &Schema, names: &NamedTypes, open: &mut HashSet<String>) -> bool {
    match schema {
        Schema::Null => true,
        Schema::Fixed(fixed) => fixed.size == 0,
        Schema::Record(record) => {
            let fullname = record.fullname();
            // A record that contains itself without a union has no finite value.
            if !open.insert(fullname.clone()) {
                return false;
            }
            let result = record
                .fields
                .iter()
                .all(|field| zero_width(&field.schema, names, open));
            open.remove(&fullname);
            result
        }
        Schema::Named(name) => names
            .get(name)
            .is_some_and(|resolved| zero_width(resolved, names, open)),
        Schema::Logical(logical) => zero_width(&logical.base, names, open),
        _ => false,
    }
}
