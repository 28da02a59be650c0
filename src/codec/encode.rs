//! Binary encoding of primitive values.
//!
//! [`Encoder`] appends to a [`BytesMut`], either owned or leased from a
//! [`BufferPool`]. It writes array and map blocks with positive item counts
//! only; readers accept both forms.

use bytes::{BufMut, Bytes, BytesMut};

use crate::codec::pool::{BufferPool, PooledBuffer};
use crate::codec::varint::{put_varint, put_zigzag};

#[derive(Debug)]
enum Target {
    Owned,
    /// Receives the buffer back when the encoder is dropped.
    Pooled(PooledBuffer),
}

/// Appends binary-encoded values to a buffer.
#[derive(Debug)]
pub struct Encoder {
    target: Target,
    buf: BytesMut,
}

impl Default for Encoder {
    fn default() -> Self {
        Self::with_buffer(BytesMut::new())
    }
}

impl Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode into an existing buffer.
    pub fn with_buffer(buf: BytesMut) -> Self {
        Self {
            target: Target::Owned,
            buf,
        }
    }

    /// Encode into a buffer leased from `pool`. The buffer goes back to the
    /// pool when the lease returned by [`into_pooled`](Self::into_pooled)
    /// is dropped, or when [`finish`](Self::finish) has copied it out.
    pub fn pooled(pool: &BufferPool, min_capacity: usize) -> Self {
        Self::with_lease(pool.acquire(min_capacity))
    }

    /// Encode into an already leased buffer, appending to its contents.
    pub fn with_lease(mut lease: PooledBuffer) -> Self {
        let buf = std::mem::take(&mut *lease);
        Self {
            target: Target::Pooled(lease),
            buf,
        }
    }

    pub fn is_pooled(&self) -> bool {
        matches!(self.target, Target::Pooled(_))
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[inline]
    pub fn write_null(&mut self) {}

    #[inline]
    pub fn write_boolean(&mut self, value: bool) {
        self.buf.put_u8(value as u8);
    }

    #[inline]
    pub fn write_int(&mut self, value: i32) {
        put_zigzag(&mut self.buf, value as i64);
    }

    #[inline]
    pub fn write_long(&mut self, value: i64) {
        put_zigzag(&mut self.buf, value);
    }

    #[inline]
    pub fn write_float(&mut self, value: f32) {
        self.buf.put_f32_le(value);
    }

    #[inline]
    pub fn write_double(&mut self, value: f64) {
        self.buf.put_f64_le(value);
    }

    /// Length-prefixed bytes.
    #[inline]
    pub fn write_bytes(&mut self, value: &[u8]) {
        put_zigzag(&mut self.buf, value.len() as i64);
        self.buf.put_slice(value);
    }

    #[inline]
    pub fn write_string(&mut self, value: &str) {
        self.write_bytes(value.as_bytes());
    }

    /// Raw bytes with no length prefix.
    #[inline]
    pub fn write_fixed(&mut self, value: &[u8]) {
        self.buf.put_slice(value);
    }

    #[inline]
    pub fn write_enum_index(&mut self, index: usize) {
        put_zigzag(&mut self.buf, index as i64);
    }

    #[inline]
    pub fn write_union_index(&mut self, index: usize) {
        put_zigzag(&mut self.buf, index as i64);
    }

    /// Block header. A count of zero terminates the array or map.
    #[inline]
    pub fn write_block_count(&mut self, count: usize) {
        put_zigzag(&mut self.buf, count as i64);
    }

    /// Raw unsigned varint, for framing that sits outside the value encoding.
    #[inline]
    pub fn write_varint(&mut self, value: u64) {
        put_varint(&mut self.buf, value);
    }

    /// Everything written so far.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// The encoded bytes. A pooled encoder copies them out and returns its
    /// buffer to the pool.
    pub fn finish(mut self) -> Bytes {
        match self.target {
            Target::Owned => std::mem::take(&mut self.buf).freeze(),
            Target::Pooled(_) => Bytes::copy_from_slice(&self.buf),
        }
    }

    /// The lease holding the encoded bytes, or `None` for an owned buffer.
    pub fn into_pooled(mut self) -> Option<PooledBuffer> {
        match std::mem::replace(&mut self.target, Target::Owned) {
            Target::Owned => None,
            Target::Pooled(mut lease) => {
                *lease = std::mem::take(&mut self.buf);
                Some(lease)
            }
        }
    }

    /// The underlying buffer, taken out of any pool's custody.
    pub fn into_inner(mut self) -> BytesMut {
        if let Target::Pooled(lease) = std::mem::replace(&mut self.target, Target::Owned) {
            lease.detach();
        }
        std::mem::take(&mut self.buf)
    }
}

impl Drop for Encoder {
    fn drop(&mut self) {
        if let Target::Pooled(lease) = &mut self.target {
            **lease = std::mem::take(&mut self.buf);
        }
    }
}
