//! Frame publishing helpers for unit tests.

use logbuf_buffer::AtomicBuffer;

use crate::descriptor::{
    align, flags_offset, length_offset, reserved_value_offset, session_id_offset,
    stream_id_offset, term_id_offset, term_offset_offset, type_offset, version_offset,
    CURRENT_VERSION, FRAME_ALIGNMENT, HDR_TYPE_DATA, HDR_TYPE_PAD, HEADER_LENGTH, UNFRAGMENTED,
};

pub(crate) const INITIAL_TERM_ID: i32 = 7;

pub(crate) struct FrameSpec<'a> {
    pub frame_type: u16,
    pub flags: u8,
    pub term_id: i32,
    pub session_id: i32,
    pub stream_id: i32,
    pub reserved_value: i64,
    pub payload: &'a [u8],
}

impl<'a> FrameSpec<'a> {
    pub fn data(payload: &'a [u8]) -> Self {
        Self {
            frame_type: HDR_TYPE_DATA,
            flags: UNFRAGMENTED,
            term_id: INITIAL_TERM_ID,
            session_id: 1,
            stream_id: 10,
            reserved_value: 0,
            payload,
        }
    }

    pub fn padding(payload_len: usize) -> FrameSpec<'static> {
        static ZEROS: [u8; 4096] = [0; 4096];
        FrameSpec {
            frame_type: HDR_TYPE_PAD,
            ..FrameSpec::data(&ZEROS[..payload_len])
        }
    }
}

/// Write header and payload, then publish the frame length with a release
/// store. Returns the aligned footprint.
pub(crate) fn write_frame(buffer: &AtomicBuffer, offset: usize, spec: &FrameSpec<'_>) -> usize {
    let frame_length = HEADER_LENGTH + spec.payload.len();
    // SAFETY: tests own the buffer and write each frame before committing it.
    unsafe {
        buffer.put_u8(version_offset(offset), CURRENT_VERSION);
        buffer.put_u8(flags_offset(offset), spec.flags);
        buffer.put_u16(type_offset(offset), spec.frame_type);
        buffer.put_i32(term_offset_offset(offset), offset as i32);
        buffer.put_i32(session_id_offset(offset), spec.session_id);
        buffer.put_i32(stream_id_offset(offset), spec.stream_id);
        buffer.put_i32(term_id_offset(offset), spec.term_id);
        buffer.put_i64(reserved_value_offset(offset), spec.reserved_value);
        buffer.put_bytes(offset + HEADER_LENGTH, spec.payload);
        buffer.put_i32_ordered(length_offset(offset), frame_length as i32);
    }
    align(frame_length, FRAME_ALIGNMENT)
}
