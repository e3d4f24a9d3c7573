use std::sync::Arc;

/// Read access to a term buffer.
///
/// All multi-byte values are little-endian on the wire regardless of the host.
/// Every accessor panics if the addressed range falls outside
/// [`capacity`](TermBuffer::capacity), the same contract as slice indexing.
pub trait TermBuffer {
    /// Total number of bytes in the buffer. Fixed for the buffer's lifetime.
    fn capacity(&self) -> usize;

    /// Load a 32-bit value with acquire ordering.
    ///
    /// Observing a value written by a release store (see
    /// [`AtomicBuffer::put_i32_ordered`](crate::AtomicBuffer::put_i32_ordered))
    /// makes every byte the writer stored before it visible to the caller.
    /// `index` must be 4-byte aligned.
    fn get_i32_volatile(&self, index: usize) -> i32;

    fn get_u8(&self, index: usize) -> u8;

    fn get_u16(&self, index: usize) -> u16;

    fn get_i32(&self, index: usize) -> i32;

    fn get_i64(&self, index: usize) -> i64;

    /// Borrow `len` bytes starting at `index` without copying.
    fn slice(&self, index: usize, len: usize) -> &[u8];

    /// Copy `dst.len()` bytes starting at `index` into `dst`.
    fn get_bytes(&self, index: usize, dst: &mut [u8]) {
        dst.copy_from_slice(self.slice(index, dst.len()));
    }
}

impl<T: TermBuffer + ?Sized> TermBuffer for &T {
    fn capacity(&self) -> usize {
        (**self).capacity()
    }

    fn get_i32_volatile(&self, index: usize) -> i32 {
        (**self).get_i32_volatile(index)
    }

    fn get_u8(&self, index: usize) -> u8 {
        (**self).get_u8(index)
    }

    fn get_u16(&self, index: usize) -> u16 {
        (**self).get_u16(index)
    }

    fn get_i32(&self, index: usize) -> i32 {
        (**self).get_i32(index)
    }

    fn get_i64(&self, index: usize) -> i64 {
        (**self).get_i64(index)
    }

    fn slice(&self, index: usize, len: usize) -> &[u8] {
        (**self).slice(index, len)
    }
}

impl<T: TermBuffer + ?Sized> TermBuffer for Arc<T> {
    fn capacity(&self) -> usize {
        (**self).capacity()
    }

    fn get_i32_volatile(&self, index: usize) -> i32 {
        (**self).get_i32_volatile(index)
    }

    fn get_u8(&self, index: usize) -> u8 {
        (**self).get_u8(index)
    }

    fn get_u16(&self, index: usize) -> u16 {
        (**self).get_u16(index)
    }

    fn get_i32(&self, index: usize) -> i32 {
        (**self).get_i32(index)
    }

    fn get_i64(&self, index: usize) -> i64 {
        (**self).get_i64(index)
    }

    fn slice(&self, index: usize, len: usize) -> &[u8] {
        (**self).slice(index, len)
    }
}
