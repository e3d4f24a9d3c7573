//! Lock-free scanning of shared-memory term buffers.
//!
//! A single writer appends length-prefixed frames to a term buffer and
//! publishes each one with a release store of its length; any number of
//! readers scan the same memory and deliver committed payloads without locks.
//!
//! # Crate Structure
//!
//! - [`buffer`] — Shared term memory (heap or memory-mapped file) with acquire/release access
//! - [`frame`] — Frame layout, header views, and the term reader

/// Re-export buffer types.
pub mod buffer {
    pub use logbuf_buffer::*;
}

/// Re-export frame types.
pub mod frame {
    pub use logbuf_frame::*;
}
