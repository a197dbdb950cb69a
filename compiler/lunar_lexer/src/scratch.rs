//! Pooled byte buffers for decoding string values.
//!
//! String scans borrow a buffer from the pool for the decoded value and
//! return it when the guard drops, whichever path the scan leaves by.
//! Buffers keep their capacity, so after warm-up decoding a literal
//! allocates only the final boxed value.

use std::cell::RefCell;
use std::ops::{Deref, DerefMut};
use std::rc::Rc;

/// Buffers larger than this are dropped instead of pooled.
const MAX_RETAINED_CAPACITY: usize = 64 * 1024;

/// Upper bound on idle buffers. Interpolation nesting is the only way to
/// hold several at once.
const MAX_POOLED: usize = 8;

type FreeList = Rc<RefCell<Vec<Vec<u8>>>>;

#[derive(Clone, Debug, Default)]
pub(crate) struct ScratchPool {
    free: FreeList,
}

impl ScratchPool {
    pub(crate) fn new() -> Self {
        ScratchPool::default()
    }

    /// Take an empty buffer from the pool, allocating if none is idle.
    pub(crate) fn acquire(&self) -> PooledBuffer {
        let buffer = self
            .free
            .try_borrow_mut()
            .ok()
            .and_then(|mut free| free.pop())
            .unwrap_or_default();
        PooledBuffer {
            buffer,
            pool: Rc::clone(&self.free),
        }
    }

    #[cfg(test)]
    pub(crate) fn idle(&self) -> usize {
        self.free.borrow().len()
    }
}

/// RAII guard over a pooled buffer.
#[derive(Debug)]
pub(crate) struct PooledBuffer {
    buffer: Vec<u8>,
    pool: FreeList,
}

impl Deref for PooledBuffer {
    type Target = Vec<u8>;

    fn deref(&self) -> &Vec<u8> {
        &self.buffer
    }
}

impl DerefMut for PooledBuffer {
    fn deref_mut(&mut self) -> &mut Vec<u8> {
        &mut self.buffer
    }
}

impl Drop for PooledBuffer {
    fn drop(&mut self) {
        let mut buffer = std::mem::take(&mut self.buffer);
        if buffer.capacity() > MAX_RETAINED_CAPACITY {
            return;
        }
        buffer.clear();
        if let Ok(mut free) = self.pool.try_borrow_mut() {
            if free.len() < MAX_POOLED {
                free.push(buffer);
            }
        }
    }
}
