use logbuf_buffer::TermBuffer;

use crate::descriptor::{
    align, compute_position, flags_offset, length_offset, reserved_value_offset,
    session_id_offset, stream_id_offset, term_id_offset, term_offset_offset, type_offset,
    version_offset, FrameKind, BEGIN_FRAG_FLAG, END_FRAG_FLAG, FRAME_ALIGNMENT,
};

/// Read-only view over the header of the frame at `offset`.
///
/// Every accessor reads straight from the term buffer, so a `Header` is only
/// meaningful while the frame it describes is being delivered. The reader
/// builds a fresh one per frame; copy out whatever must outlive the callback
/// (see [`Fragment`](crate::Fragment)).
pub struct Header<'a, B: TermBuffer + ?Sized> {
    buffer: &'a B,
    offset: usize,
    initial_term_id: i32,
}

impl<'a, B: TermBuffer + ?Sized> Header<'a, B> {
    /// View the frame header starting at `offset` in `buffer`.
    pub fn new(buffer: &'a B, offset: usize, initial_term_id: i32) -> Self {
        Self {
            buffer,
            offset,
            initial_term_id,
        }
    }

    /// Term buffer the frame lives in.
    pub fn buffer(&self) -> &'a B {
        self.buffer
    }

    /// Offset of the frame start within the term buffer.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Initial term id of the stream the term belongs to.
    pub fn initial_term_id(&self) -> i32 {
        self.initial_term_id
    }

    /// Term length the position arithmetic uses (the buffer capacity).
    pub fn term_length(&self) -> usize {
        self.buffer.capacity()
    }

    /// Frame length, read with the same acquire load the reader commits on.
    pub fn frame_length(&self) -> i32 {
        self.buffer.get_i32_volatile(length_offset(self.offset))
    }

    pub fn version(&self) -> u8 {
        self.buffer.get_u8(version_offset(self.offset))
    }

    pub fn flags(&self) -> u8 {
        self.buffer.get_u8(flags_offset(self.offset))
    }

    pub fn frame_type(&self) -> u16 {
        self.buffer.get_u16(type_offset(self.offset))
    }

    pub fn kind(&self) -> FrameKind {
        FrameKind::of(self.frame_type())
    }

    pub fn term_offset(&self) -> i32 {
        self.buffer.get_i32(term_offset_offset(self.offset))
    }

    pub fn session_id(&self) -> i32 {
        self.buffer.get_i32(session_id_offset(self.offset))
    }

    pub fn stream_id(&self) -> i32 {
        self.buffer.get_i32(stream_id_offset(self.offset))
    }

    pub fn term_id(&self) -> i32 {
        self.buffer.get_i32(term_id_offset(self.offset))
    }

    pub fn reserved_value(&self) -> i64 {
        self.buffer.get_i64(reserved_value_offset(self.offset))
    }

    /// Number of term rotations between the initial term and this frame's term.
    pub fn term_count(&self) -> i32 {
        self.term_id().wrapping_sub(self.initial_term_id)
    }

    pub fn is_begin_fragment(&self) -> bool {
        self.flags() & BEGIN_FRAG_FLAG == BEGIN_FRAG_FLAG
    }

    pub fn is_end_fragment(&self) -> bool {
        self.flags() & END_FRAG_FLAG == END_FRAG_FLAG
    }

    /// Stream position immediately after this frame.
    pub fn position(&self) -> i64 {
        let frame_end = self.offset + align(self.frame_length().max(0) as usize, FRAME_ALIGNMENT);
        compute_position(
            self.term_id(),
            frame_end,
            self.term_length(),
            self.initial_term_id,
        )
    }
}

impl<B: TermBuffer + ?Sized> std::fmt::Debug for Header<'_, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Header")
            .field("offset", &self.offset)
            .field("frame_length", &self.frame_length())
            .field("frame_type", &self.frame_type())
            .field("flags", &self.flags())
            .field("term_id", &self.term_id())
            .field("session_id", &self.session_id())
            .field("stream_id", &self.stream_id())
            .finish()
    }
}
