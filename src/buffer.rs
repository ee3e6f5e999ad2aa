//! Two-pass output production: calculate the exact length, then write into a buffer of that
//! size.
//!
//! Everything that produces variable-length output implements `Emit` once; the length
//! calculation and the write are both driven by that single emitter so they cannot disagree.

use crate::allocator::{Allocation, BufferAllocator};
use crate::error::*;
use crate::time;
use std::sync::Arc;

/// Base strings up to this size are built in a buffer on the stack.
pub const BASE_BUFFER_SIZE: usize = 512;

/// Base strings larger than `BASE_BUFFER_SIZE` are built in a dynamically allocated buffer of
/// at most this size. Anything larger is refused with `Error::BufferTooLarge`.
pub const MAX_DYN_BASE_BUFFER_SIZE: usize = 2048;

/// Destination for emitted bytes.
pub trait Sink {
    fn put(&mut self, bytes: &[u8]) -> Result<()>;

    fn put_time(&mut self, t: i64) -> Result<()> {
        let mut buf = [0u8; 20];
        let len = time::format_time(t, &mut buf)?;
        self.put(&buf[..len])
    }
}

/// A sink that only counts.
#[derive(Debug, Default)]
pub struct LengthCounter(usize);

impl LengthCounter {
    pub fn len(&self) -> usize {
        self.0
    }
}

impl Sink for LengthCounter {
    fn put(&mut self, bytes: &[u8]) -> Result<()> {
        self.0 = self
            .0
            .checked_add(bytes.len())
            .ok_or_else(|| Error::Overflow("output length".to_string()))?;
        Ok(())
    }

    fn put_time(&mut self, t: i64) -> Result<()> {
        self.0 = self
            .0
            .checked_add(time::number_of_digits(t))
            .ok_or_else(|| Error::Overflow("output length".to_string()))?;
        Ok(())
    }
}

/// A sink writing into a caller-supplied slice.
#[derive(Debug)]
pub struct SliceWriter<'b> {
    buf: &'b mut [u8],
    pos: usize,
}

impl<'b> SliceWriter<'b> {
    pub fn new(buf: &'b mut [u8]) -> Self {
        SliceWriter { buf, pos: 0 }
    }

    pub fn written(&self) -> usize {
        self.pos
    }
}

impl<'b> Sink for SliceWriter<'b> {
    fn put(&mut self, bytes: &[u8]) -> Result<()> {
        let end = self.pos + bytes.len();
        if end > self.buf.len() {
            return Err(Error::Other(format!(
                "output buffer of {} bytes is too small",
                self.buf.len()
            )));
        }
        self.buf[self.pos..end].copy_from_slice(bytes);
        self.pos = end;
        Ok(())
    }
}

/// Variable-length output following the calculate-then-write contract.
pub trait Emit {
    fn emit<S: Sink>(&self, sink: &mut S) -> Result<()>;

    /// The exact number of bytes `write` will produce.
    fn calculate_length(&self) -> Result<usize> {
        let mut counter = LengthCounter::default();
        self.emit(&mut counter)?;
        Ok(counter.len())
    }

    /// Write into `buf`, which must be at least `calculate_length()` bytes long. Returns the
    /// number of bytes written.
    fn write(&self, buf: &mut [u8]) -> Result<usize> {
        let mut writer = SliceWriter::new(buf);
        self.emit(&mut writer)?;
        Ok(writer.written())
    }
}

/// A fixed-capacity buffer owned by a context, holding its current contents and length.
#[derive(Clone, Copy)]
pub struct FixedBuffer<const N: usize> {
    bytes: [u8; N],
    len: usize,
}

impl<const N: usize> FixedBuffer<N> {
    pub fn new() -> Self {
        FixedBuffer {
            bytes: [0; N],
            len: 0,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Let `f` fill the buffer, recording the length it reports.
    pub fn fill_with<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut [u8; N]) -> Result<usize>,
    {
        self.len = 0;
        let len = f(&mut self.bytes)?;
        if len > N {
            return Err(Error::Overflow(format!("{} bytes in a {} byte buffer", len, N)));
        }
        self.len = len;
        Ok(())
    }
}

impl<const N: usize> Default for FixedBuffer<N> {
    fn default() -> Self {
        FixedBuffer::new()
    }
}

impl<const N: usize> std::fmt::Debug for FixedBuffer<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FixedBuffer<{}>({} bytes)", N, self.len)
    }
}

/// Build `source` into a scratch buffer and hand the bytes to `f`.
///
/// Small outputs use a stack buffer; larger ones are allocated from `allocator` up to
/// `MAX_DYN_BASE_BUFFER_SIZE`. The allocation is released on every exit path.
pub fn with_scratch_buffer<E, T, F>(
    source: &E,
    allocator: &Arc<dyn BufferAllocator>,
    f: F,
) -> Result<T>
where
    E: Emit,
    F: FnOnce(&[u8]) -> Result<T>,
{
    let len = source.calculate_length()?;
    if len <= BASE_BUFFER_SIZE {
        let mut buf = [0u8; BASE_BUFFER_SIZE];
        let written = source.write(&mut buf[..len])?;
        f(&buf[..written])
    } else if len <= MAX_DYN_BASE_BUFFER_SIZE {
        log::debug!("allocating {} byte base string buffer", len);
        let mut buf = Allocation::new(allocator, len)?;
        let written = source.write(&mut buf)?;
        f(&buf[..written])
    } else {
        Err(Error::BufferTooLarge(format!(
            "base string needs {} bytes, maximum is {}",
            len, MAX_DYN_BASE_BUFFER_SIZE
        )))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::allocator::test::CountingAllocator;
    use crate::allocator::SystemAllocator;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::Ordering;

    struct Filler(usize);

    impl Emit for Filler {
        fn emit<S: Sink>(&self, sink: &mut S) -> Result<()> {
            for _ in 0..self.0 {
                sink.put(b"x")?;
            }
            Ok(())
        }
    }

    struct Stamp(i64);

    impl Emit for Stamp {
        fn emit<S: Sink>(&self, sink: &mut S) -> Result<()> {
            sink.put(b"ts=")?;
            sink.put_time(self.0)
        }
    }

    #[test]
    fn length_matches_write() {
        for t in &[0, 7, -7, 1353832234, i64::MIN, i64::MAX] {
            let s = Stamp(*t);
            let len = s.calculate_length().unwrap();
            let mut buf = vec![0u8; len];
            assert_eq!(s.write(&mut buf).unwrap(), len);
            assert_eq!(buf, format!("ts={}", t).into_bytes());
        }
    }

    #[test]
    fn write_small_buffer() {
        let mut buf = [0u8; 4];
        assert_eq!(
            Stamp(12345).write(&mut buf).unwrap_err().code(),
            ErrorCode::Other
        );
    }

    #[test]
    fn scratch_static_and_dynamic() {
        let counting = Arc::new(CountingAllocator::default());
        let allocator: Arc<dyn BufferAllocator> = counting.clone();
        for &n in &[0, 1, 511, 512] {
            let len = with_scratch_buffer(&Filler(n), &allocator, |b| Ok(b.len())).unwrap();
            assert_eq!(len, n);
        }
        assert_eq!(counting.allocated.load(Ordering::SeqCst), 0);

        for &n in &[513, 2047, 2048] {
            let len = with_scratch_buffer(&Filler(n), &allocator, |b| Ok(b.len())).unwrap();
            assert_eq!(len, n);
        }
        assert_eq!(counting.allocated.load(Ordering::SeqCst), 3);
        assert_eq!(counting.released.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn scratch_too_large() {
        let allocator: Arc<dyn BufferAllocator> = Arc::new(SystemAllocator);
        let err = with_scratch_buffer(&Filler(2049), &allocator, |b| Ok(b.len())).unwrap_err();
        assert_eq!(err.code(), ErrorCode::BufferTooLarge);
    }

    #[test]
    fn scratch_released_on_error() {
        let counting = Arc::new(CountingAllocator::default());
        let allocator: Arc<dyn BufferAllocator> = counting.clone();
        let res: Result<()> = with_scratch_buffer(&Filler(1000), &allocator, |_| {
            Err(Error::Crypto("boom".to_string()))
        });
        assert_eq!(res.unwrap_err().code(), ErrorCode::Crypto);
        assert_eq!(counting.allocated.load(Ordering::SeqCst), 1);
        assert_eq!(counting.released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn fixed_buffer() {
        let mut b: FixedBuffer<4> = FixedBuffer::new();
        assert!(b.is_empty());
        b.fill_with(|buf| {
            buf[..3].copy_from_slice(b"abc");
            Ok(3)
        })
        .unwrap();
        assert_eq!(b.as_bytes(), b"abc");
        assert!(b
            .fill_with(|_| Err(Error::Crypto("x".to_string())))
            .is_err());
        assert!(b.is_empty());
        b.clear();
        assert_eq!(b.as_bytes(), b"");
    }

    #[test]
    fn scratch_no_mem() {
        let allocator: Arc<dyn BufferAllocator> = Arc::new(CountingAllocator {
            fail: true,
            ..Default::default()
        });
        let err = with_scratch_buffer(&Filler(600), &allocator, |b| Ok(b.len())).unwrap_err();
        assert_eq!(err.code(), ErrorCode::NoMem);
        // static path never touches the allocator
        assert!(with_scratch_buffer(&Filler(10), &allocator, |b| Ok(b.len())).is_ok());
    }
}
