//! Binary wire codec.
//!
//! Low-level encoding and decoding of the binary value format: varints,
//! primitives, length-prefixed payloads and block-framed collections. The
//! structure readers in [`crate::reader`] and the datum writer in
//! [`crate::datum`] are built on these functions.

pub mod decode;
pub mod encode;
pub mod pool;
pub mod varint;

pub use decode::{is_zero_width, skip_value, skip_value_with, SkipLimits};
pub use encode::Encoder;
pub use pool::{BufferPool, PoolStats, PoolStrategy, PooledBuffer};
