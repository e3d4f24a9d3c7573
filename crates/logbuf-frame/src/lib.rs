//! Frame layout and lock-free scanning of term buffers.
//!
//! A term buffer holds a sequence of frames, each aligned to
//! [`FRAME_ALIGNMENT`] and laid out as:
//! - a 32-byte little-endian header whose first field, the frame length,
//!   is the commit marker published with a release store
//! - the payload, `frame_length - HEADER_LENGTH` bytes
//!
//! [`TermReader`] walks committed frames from a caller-owned offset and hands
//! each data frame's payload to a [`FragmentHandler`], skipping padding.
//! Nothing is copied unless the handler asks for a [`Fragment`].

pub mod descriptor;
pub mod error;
pub mod fragment;
pub mod handler;
pub mod header;
pub mod reader;

#[cfg(test)]
pub(crate) mod testing;

pub use descriptor::{
    align, compute_position, is_padding_frame, type_offset, FrameKind, FRAME_ALIGNMENT,
    HDR_TYPE_DATA, HDR_TYPE_PAD, HEADER_LENGTH, PADDING_FRAME_TYPE, TERM_MAX_LENGTH,
    TERM_MIN_LENGTH,
};
pub use error::{FrameError, Result};
pub use fragment::{Fragment, FragmentCollector};
pub use handler::FragmentHandler;
pub use header::Header;
pub use logbuf_buffer::{AtomicBuffer, TermBuffer};
pub use reader::{ScanOutcome, ScanStop, TermReader};
