use std::alloc::{self, Layout};
use std::fs::OpenOptions;
use std::path::Path;
use std::ptr::{self, NonNull};
use std::sync::atomic::{AtomicI32, Ordering};

use memmap2::MmapMut;
use tracing::debug;

use crate::error::{BufferError, Result};
use crate::traits::TermBuffer;

/// Heap-backed buffers start on a cache line so frame offsets keep their
/// natural alignment.
const HEAP_ALIGNMENT: usize = 64;

enum Backing {
    Heap(Layout),
    Mapped(MmapMut),
}

/// A fixed-capacity byte buffer shared between one writer and many readers.
///
/// The buffer owns its memory: either a zeroed heap block or a shared,
/// read-write mapping of a term file (so a writer in another process is
/// observed through the page cache). It is `Send + Sync` and is normally
/// shared through an `Arc`.
///
/// Readers only ever need `&self` and every read is safe. Every store is
/// `unsafe`: the writer fills a frame with the plain `put_*` methods and
/// publishes it with [`put_i32_ordered`](Self::put_i32_ordered), and only
/// the single writer following that order can rule out a store racing a
/// reader's borrow.
pub struct AtomicBuffer {
    ptr: NonNull<u8>,
    capacity: usize,
    backing: Backing,
}

// SAFETY: the buffer owns its allocation or mapping for its whole lifetime.
// Safe shared access is limited to reads; every store is `unsafe` and carries
// the single-writer, write-before-commit contract.
unsafe impl Send for AtomicBuffer {}
unsafe impl Sync for AtomicBuffer {}

impl AtomicBuffer {
    /// Allocate a zeroed buffer of `capacity` bytes on the heap.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(BufferError::ZeroCapacity);
        }
        let layout = Layout::from_size_align(capacity, HEAP_ALIGNMENT).map_err(|_| {
            BufferError::CapacityTooLarge {
                capacity: capacity as u64,
            }
        })?;

        // SAFETY: `layout` has a non-zero size.
        let raw = unsafe { alloc::alloc_zeroed(layout) };
        let Some(ptr) = NonNull::new(raw) else {
            alloc::handle_alloc_error(layout);
        };

        Ok(Self {
            ptr,
            capacity,
            backing: Backing::Heap(layout),
        })
    }

    /// Allocate a heap buffer holding a copy of `bytes`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let buffer = Self::with_capacity(bytes.len())?;
        // SAFETY: the buffer was just allocated with exactly `bytes.len()`
        // bytes and is not shared yet.
        unsafe { buffer.put_bytes(0, bytes) };
        Ok(buffer)
    }

    /// Map an existing term file read-write and shared.
    ///
    /// The capacity is the file length at the time of mapping.
    pub fn map_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|source| BufferError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        let len = file
            .metadata()
            .map_err(|source| BufferError::Open {
                path: path.to_path_buf(),
                source,
            })?
            .len();
        if len == 0 {
            return Err(BufferError::ZeroCapacity);
        }
        let capacity =
            usize::try_from(len).map_err(|_| BufferError::CapacityTooLarge { capacity: len })?;

        // SAFETY: other processes may map the same file; all access through
        // this type follows the single-writer protocol.
        let mut mmap = unsafe { MmapMut::map_mut(&file) }.map_err(|source| BufferError::Map {
            path: path.to_path_buf(),
            source,
        })?;
        let ptr = NonNull::new(mmap.as_mut_ptr()).ok_or_else(|| BufferError::Map {
            path: path.to_path_buf(),
            source: std::io::Error::other("mapping returned a null address"),
        })?;

        debug!(?path, capacity, "mapped term file");
        Ok(Self {
            ptr,
            capacity,
            backing: Backing::Mapped(mmap),
        })
    }

    /// Create (or truncate) a zero-filled term file of `capacity` bytes and map it.
    pub fn create_file(path: impl AsRef<Path>, capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(BufferError::ZeroCapacity);
        }
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(|source| BufferError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        file.set_len(capacity as u64)
            .map_err(|source| BufferError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        drop(file);

        debug!(?path, capacity, "created term file");
        Self::map_file(path)
    }

    /// Whether this buffer is backed by a memory-mapped file.
    pub fn is_mapped(&self) -> bool {
        matches!(self.backing, Backing::Mapped(_))
    }

    /// Store a 32-bit value with release ordering.
    ///
    /// This is the commit: every byte written before this call becomes
    /// visible to a reader whose [`get_i32_volatile`](TermBuffer::get_i32_volatile)
    /// observes `value`. `index` must be 4-byte aligned.
    ///
    /// # Safety
    ///
    /// The caller must be the only writer of the buffer. Readers take plain
    /// loads and `&[u8]` views of committed frames, so the word at `index`
    /// must belong to a frame no reader has observed as committed yet (or be
    /// unreachable by readers altogether).
    ///
    /// Publishing without `unsafe` does not compile:
    ///
    /// ```compile_fail,E0133
    /// use logbuf_buffer::AtomicBuffer;
    ///
    /// let buffer = AtomicBuffer::with_capacity(64).unwrap();
    /// buffer.put_i32_ordered(0, 32);
    /// ```
    pub unsafe fn put_i32_ordered(&self, index: usize, value: i32) {
        self.atomic_i32(index).store(value.to_le(), Ordering::Release);
    }

    /// Store a single byte.
    ///
    /// # Safety
    ///
    /// The caller must be the only writer of the buffer, and no reader may
    /// be reading the addressed bytes concurrently. In practice: only write
    /// into a frame before its length is published with
    /// [`put_i32_ordered`](Self::put_i32_ordered).
    pub unsafe fn put_u8(&self, index: usize, value: u8) {
        // SAFETY: forwarded to the caller.
        unsafe { self.put_bytes(index, &[value]) }
    }

    /// Store a little-endian `u16`.
    ///
    /// # Safety
    ///
    /// Same contract as [`put_u8`](Self::put_u8).
    pub unsafe fn put_u16(&self, index: usize, value: u16) {
        // SAFETY: forwarded to the caller.
        unsafe { self.put_bytes(index, &value.to_le_bytes()) }
    }

    /// Store a little-endian `i32` without ordering.
    ///
    /// # Safety
    ///
    /// Same contract as [`put_u8`](Self::put_u8). Never use this for a frame
    /// length that readers may already be polling.
    pub unsafe fn put_i32(&self, index: usize, value: i32) {
        // SAFETY: forwarded to the caller.
        unsafe { self.put_bytes(index, &value.to_le_bytes()) }
    }

    /// Store a little-endian `i64`.
    ///
    /// # Safety
    ///
    /// Same contract as [`put_u8`](Self::put_u8).
    pub unsafe fn put_i64(&self, index: usize, value: i64) {
        // SAFETY: forwarded to the caller.
        unsafe { self.put_bytes(index, &value.to_le_bytes()) }
    }

    /// Copy `src` into the buffer starting at `index`.
    ///
    /// # Safety
    ///
    /// Same contract as [`put_u8`](Self::put_u8).
    pub unsafe fn put_bytes(&self, index: usize, src: &[u8]) {
        self.check_bounds(index, src.len());
        // SAFETY: the range is in bounds, `src` cannot overlap memory this
        // buffer owns through a live shared borrow the caller holds, and the
        // caller guarantees exclusive access to the range.
        unsafe { ptr::copy_nonoverlapping(src.as_ptr(), self.ptr.as_ptr().add(index), src.len()) }
    }

    /// Fill `len` bytes starting at `index` with `value`.
    ///
    /// # Safety
    ///
    /// Same contract as [`put_u8`](Self::put_u8).
    pub unsafe fn set_memory(&self, index: usize, len: usize, value: u8) {
        self.check_bounds(index, len);
        // SAFETY: the range is in bounds and the caller guarantees exclusive
        // access to it.
        unsafe { ptr::write_bytes(self.ptr.as_ptr().add(index), value, len) }
    }

    #[inline]
    fn check_bounds(&self, index: usize, len: usize) {
        let in_bounds = index
            .checked_add(len)
            .is_some_and(|end| end <= self.capacity);
        assert!(
            in_bounds,
            "range {index}..{index}+{len} out of bounds for buffer of capacity {}",
            self.capacity
        );
    }

    #[inline]
    fn atomic_i32(&self, index: usize) -> &AtomicI32 {
        self.check_bounds(index, 4);
        assert!(
            index % 4 == 0,
            "atomic access at index {index} is not 4-byte aligned"
        );
        // SAFETY: the word is in bounds and 4-byte aligned (the base address
        // is cache-line or page aligned). Concurrent access to commit words
        // only happens through atomics.
        unsafe { AtomicI32::from_ptr(self.ptr.as_ptr().add(index).cast::<i32>()) }
    }

    #[inline]
    fn read_array<const N: usize>(&self, index: usize) -> [u8; N] {
        self.check_bounds(index, N);
        let mut out = [0u8; N];
        // SAFETY: the source range is in bounds and `out` is a distinct local.
        unsafe { ptr::copy_nonoverlapping(self.ptr.as_ptr().add(index), out.as_mut_ptr(), N) };
        out
    }
}

impl TermBuffer for AtomicBuffer {
    fn capacity(&self) -> usize {
        self.capacity
    }

    fn get_i32_volatile(&self, index: usize) -> i32 {
        i32::from_le(self.atomic_i32(index).load(Ordering::Acquire))
    }

    fn get_u8(&self, index: usize) -> u8 {
        self.read_array::<1>(index)[0]
    }

    fn get_u16(&self, index: usize) -> u16 {
        u16::from_le_bytes(self.read_array(index))
    }

    fn get_i32(&self, index: usize) -> i32 {
        i32::from_le_bytes(self.read_array(index))
    }

    fn get_i64(&self, index: usize) -> i64 {
        i64::from_le_bytes(self.read_array(index))
    }

    fn slice(&self, index: usize, len: usize) -> &[u8] {
        self.check_bounds(index, len);
        // SAFETY: the range is in bounds and lives as long as `self`. Readers
        // only borrow ranges the writer has already published.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr().add(index), len) }
    }
}

impl Drop for AtomicBuffer {
    fn drop(&mut self) {
        if let Backing::Heap(layout) = self.backing {
            // SAFETY: `ptr` was returned by `alloc_zeroed` with this layout.
            unsafe { alloc::dealloc(self.ptr.as_ptr(), layout) };
        }
    }
}

impl std::fmt::Debug for AtomicBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let backing = match self.backing {
            Backing::Heap(_) => "heap",
            Backing::Mapped(_) => "mapped",
        };
        f.debug_struct("AtomicBuffer")
            .field("capacity", &self.capacity)
            .field("backing", &backing)
            .finish()
    }
}
