use std::convert::Infallible;

use bytes::Bytes;
use logbuf_buffer::TermBuffer;

use crate::descriptor::{BEGIN_FRAG_FLAG, END_FRAG_FLAG};
use crate::handler::FragmentHandler;
use crate::header::Header;

/// An owned copy of one delivered fragment and its header fields.
///
/// Handlers receive borrowed views that die with the callback; take a
/// `Fragment` to keep the data around.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    /// Offset of the frame start within the term buffer.
    pub frame_offset: usize,
    pub frame_type: u16,
    pub flags: u8,
    pub term_id: i32,
    pub term_offset: i32,
    pub session_id: i32,
    pub stream_id: i32,
    pub reserved_value: i64,
    /// Stream position immediately after the frame.
    pub position: i64,
    pub payload: Bytes,
}

impl Fragment {
    /// Copy the payload at `buffer[offset..offset + length]` and the header fields.
    pub fn copy_from<B: TermBuffer + ?Sized>(
        buffer: &B,
        offset: usize,
        length: usize,
        header: &Header<'_, B>,
    ) -> Self {
        Self {
            frame_offset: header.offset(),
            frame_type: header.frame_type(),
            flags: header.flags(),
            term_id: header.term_id(),
            term_offset: header.term_offset(),
            session_id: header.session_id(),
            stream_id: header.stream_id(),
            reserved_value: header.reserved_value(),
            position: header.position(),
            payload: Bytes::copy_from_slice(buffer.slice(offset, length)),
        }
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    pub fn is_begin_fragment(&self) -> bool {
        self.flags & BEGIN_FRAG_FLAG == BEGIN_FRAG_FLAG
    }

    pub fn is_end_fragment(&self) -> bool {
        self.flags & END_FRAG_FLAG == END_FRAG_FLAG
    }
}

/// A handler that keeps a [`Fragment`] copy of everything it is given.
#[derive(Debug, Default)]
pub struct FragmentCollector {
    fragments: Vec<Fragment>,
}

impl FragmentCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// Take the collected fragments, leaving the collector empty.
    pub fn drain(&mut self) -> Vec<Fragment> {
        std::mem::take(&mut self.fragments)
    }

    pub fn into_fragments(self) -> Vec<Fragment> {
        self.fragments
    }
}

impl<B: TermBuffer + ?Sized> FragmentHandler<B> for FragmentCollector {
    type Error = Infallible;

    fn on_fragment(
        &mut self,
        buffer: &B,
        offset: usize,
        length: usize,
        header: &Header<'_, B>,
    ) -> Result<(), Infallible> {
        self.fragments
            .push(Fragment::copy_from(buffer, offset, length, header));
        Ok(())
    }
}
