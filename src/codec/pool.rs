//! Reusable encode buffers.
//!
//! A [`BufferPool`] hands out [`PooledBuffer`]s that give their `BytesMut`
//! back when dropped. The pooling strategy is chosen at construction:
//! no pooling, one free list per thread, or a shared free list capped at a
//! fixed number of buffers.

use std::cell::RefCell;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bytes::BytesMut;
use parking_lot::Mutex;

/// Capacity of freshly allocated buffers.
pub const DEFAULT_BUFFER_CAPACITY: usize = 1024;

/// Buffers larger than this are dropped instead of being returned.
pub const MAX_RETAINED_CAPACITY: usize = 1 << 20;

/// Per-thread free list length for [`PoolStrategy::ThreadLocal`].
const THREAD_LOCAL_LIMIT: usize = 16;

thread_local! {
    static LOCAL_FREE_LIST: RefCell<Vec<BytesMut>> = const { RefCell::new(Vec::new()) };
}

/// How released buffers are kept for reuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PoolStrategy {
    /// Every acquire allocates; released buffers are freed.
    Unpooled,
    /// Released buffers go to a free list owned by the releasing thread.
    #[default]
    ThreadLocal,
    /// A shared free list holding at most this many buffers.
    Bounded(usize),
}

/// Pool of encode buffers. Cloning shares the underlying free list.
#[derive(Debug, Clone, Default)]
pub struct BufferPool {
    inner: Arc<PoolInner>,
}

#[derive(Debug, Default)]
struct PoolInner {
    strategy: PoolStrategy,
    shared: Mutex<Vec<BytesMut>>,
    allocations: AtomicUsize,
    reuses: AtomicUsize,
}

/// Allocation counters for a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    pub allocations: usize,
    pub reuses: usize,
    /// Buffers currently held in the shared free list.
    pub available: usize,
}

impl BufferPool {
    pub fn new(strategy: PoolStrategy) -> Self {
        Self {
            inner: Arc::new(PoolInner {
                strategy,
                ..PoolInner::default()
            }),
        }
    }

    pub fn strategy(&self) -> PoolStrategy {
        self.inner.strategy
    }

    /// Take a cleared buffer with at least `min_capacity` bytes of room.
    pub fn acquire(&self, min_capacity: usize) -> PooledBuffer {
        let reused = match self.inner.strategy {
            PoolStrategy::Unpooled => None,
            PoolStrategy::ThreadLocal => LOCAL_FREE_LIST.with(|list| {
                let mut list = list.borrow_mut();
                take_fitting(&mut list, min_capacity)
            }),
            PoolStrategy::Bounded(_) => {
                let mut list = self.inner.shared.lock();
                take_fitting(&mut list, min_capacity)
            }
        };

        let buf = match reused {
            Some(buf) => {
                self.inner.reuses.fetch_add(1, Ordering::Relaxed);
                buf
            }
            None => {
                self.inner.allocations.fetch_add(1, Ordering::Relaxed);
                BytesMut::with_capacity(min_capacity.max(DEFAULT_BUFFER_CAPACITY))
            }
        };

        PooledBuffer {
            buf: Some(buf),
            pool: Arc::clone(&self.inner),
        }
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            allocations: self.inner.allocations.load(Ordering::Relaxed),
            reuses: self.inner.reuses.load(Ordering::Relaxed),
            available: self.inner.shared.lock().len(),
        }
    }

    /// Drop every buffer held by the shared free list and the calling
    /// thread's free list. Returns how many were dropped.
    pub fn clear(&self) -> usize {
        let shared = std::mem::take(&mut *self.inner.shared.lock()).len();
        let local = LOCAL_FREE_LIST.with(|list| std::mem::take(&mut *list.borrow_mut()).len());
        shared + local
    }
}

impl PoolInner {
    fn release(&self, mut buf: BytesMut) {
        if buf.capacity() > MAX_RETAINED_CAPACITY {
            return;
        }
        buf.clear();
        match self.strategy {
            PoolStrategy::Unpooled => {}
            PoolStrategy::ThreadLocal => LOCAL_FREE_LIST.with(|list| {
                let mut list = list.borrow_mut();
                if list.len() < THREAD_LOCAL_LIMIT {
                    list.push(buf);
                }
            }),
            PoolStrategy::Bounded(limit) => {
                let mut list = self.shared.lock();
                if list.len() < limit {
                    list.push(buf);
                }
            }
        }
    }
}

fn take_fitting(list: &mut Vec<BytesMut>, min_capacity: usize) -> Option<BytesMut> {
    let index = list.iter().position(|buf| buf.capacity() >= min_capacity)?;
    Some(list.swap_remove(index))
}

/// A leased buffer. Returns to its pool on drop unless detached.
#[derive(Debug)]
pub struct PooledBuffer {
    buf: Option<BytesMut>,
    pool: Arc<PoolInner>,
}

impl PooledBuffer {
    /// Take the buffer out of the pool's custody.
    pub fn detach(mut self) -> BytesMut {
        self.buf.take().unwrap_or_default()
    }
}

impl Deref for PooledBuffer {
    type Target = BytesMut;

    fn deref(&self) -> &BytesMut {
        // Only `detach` and `drop` take the buffer, and both consume self.
        self.buf.as_ref().unwrap_or_else(|| unreachable!("buffer already released"))
    }
}

impl DerefMut for PooledBuffer {
    fn deref_mut(&mut self) -> &mut BytesMut {
        self.buf.as_mut().unwrap_or_else(|| unreachable!("buffer already released"))
    }
}

impl Drop for PooledBuffer {
    fn drop(&mut self) {
        if let Some(buf) = self.buf.take() {
            self.pool.release(buf);
        }
    }
}
