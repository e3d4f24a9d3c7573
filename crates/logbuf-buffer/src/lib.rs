//! Shared term buffers for lock-free log scanning.
//!
//! A term buffer is a fixed-capacity region of memory written by a single
//! producer and read by any number of concurrent consumers. The only
//! synchronization between them is a release store / acquire load of a
//! 32-bit field, so this crate exposes exactly those two primitives next to
//! plain little-endian loads and stores.
//!
//! This is the lowest layer of logbuf. The frame layer reads through the
//! [`TermBuffer`] trait; [`AtomicBuffer`] is the concrete memory, either
//! heap-allocated or backed by a memory-mapped term file.

pub mod atomic;
pub mod error;
pub mod traits;

pub use atomic::AtomicBuffer;
pub use error::{BufferError, Result};
pub use traits::TermBuffer;
