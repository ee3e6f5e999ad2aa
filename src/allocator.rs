use crate::error::*;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

/// Memory hooks used for dynamically sized working buffers.
///
/// Every buffer obtained from `allocate` or `zero_allocate` is handed back to `release` of the
/// same allocator. Implementations shared between threads must be reentrant.
pub trait BufferAllocator: Send + Sync {
    /// Allocate a buffer of exactly `size` bytes, or `None` if memory is exhausted.
    fn allocate(&self, size: usize) -> Option<Vec<u8>>;

    /// Allocate a zeroed buffer of `count * size` bytes.
    fn zero_allocate(&self, count: usize, size: usize) -> Option<Vec<u8>>;

    /// Return a buffer obtained from this allocator.
    fn release(&self, buffer: Vec<u8>);
}

/// The platform allocator.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemAllocator;

impl BufferAllocator for SystemAllocator {
    fn allocate(&self, size: usize) -> Option<Vec<u8>> {
        let mut buf = Vec::new();
        buf.try_reserve_exact(size).ok()?;
        buf.resize(size, 0);
        Some(buf)
    }

    fn zero_allocate(&self, count: usize, size: usize) -> Option<Vec<u8>> {
        self.allocate(count.checked_mul(size)?)
    }

    fn release(&self, buffer: Vec<u8>) {
        drop(buffer);
    }
}

/// A buffer that is released to its allocator when dropped.
pub struct Allocation {
    buffer: Option<Vec<u8>>,
    allocator: Arc<dyn BufferAllocator>,
}

impl Allocation {
    /// Allocate `size` bytes from `allocator`.
    pub fn new(allocator: &Arc<dyn BufferAllocator>, size: usize) -> Result<Allocation> {
        let buffer = allocator
            .allocate(size)
            .ok_or_else(|| Error::NoMem(format!("unable to allocate {} bytes", size)))?;
        if buffer.len() != size {
            let got = buffer.len();
            allocator.release(buffer);
            return Err(Error::NoMem(format!(
                "allocator returned {} bytes, {} requested",
                got, size
            )));
        }
        Ok(Allocation {
            buffer: Some(buffer),
            allocator: Arc::clone(allocator),
        })
    }
}

impl Deref for Allocation {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.buffer.as_deref().unwrap_or(&[])
    }
}

impl DerefMut for Allocation {
    fn deref_mut(&mut self) -> &mut [u8] {
        self.buffer.as_deref_mut().unwrap_or(&mut [])
    }
}

impl Drop for Allocation {
    fn drop(&mut self) {
        if let Some(buffer) = self.buffer.take() {
            self.allocator.release(buffer);
        }
    }
}

impl fmt::Debug for Allocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Allocation({} bytes)", self.len())
    }
}
