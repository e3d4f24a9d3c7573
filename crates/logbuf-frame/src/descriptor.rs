//! Binary layout of frames within a term buffer.
//!
//! Wire format (little-endian, offsets relative to the frame start):
//! ```text
//! 0                   1                   2                   3
//! ┌───────────────────────────────────────────────────────────────┐
//! │                     Frame Length (i32)                        │  0
//! ├───────────────┬───────────────┬───────────────────────────────┤
//! │ Version (u8)  │ Flags (u8)    │ Type (u16)                    │  4
//! ├───────────────┴───────────────┴───────────────────────────────┤
//! │                     Term Offset (i32)                         │  8
//! │                     Session ID (i32)                          │ 12
//! │                     Stream ID (i32)                           │ 16
//! │                     Term ID (i32)                             │ 20
//! │                     Reserved Value (i64)                      │ 24
//! ├───────────────────────────────────────────────────────────────┤
//! │                     Payload ...                               │ 32
//! └───────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{FrameError, Result};

/// Every frame's footprint is rounded up to this many bytes.
pub const FRAME_ALIGNMENT: usize = 32;

/// Fixed header size preceding each payload.
pub const HEADER_LENGTH: usize = 32;

/// Protocol version written into the version field.
pub const CURRENT_VERSION: u8 = 0;

/// Padding frame: fills the tail of a term, never delivered.
pub const HDR_TYPE_PAD: u16 = 0x00;
/// Application data frame.
pub const HDR_TYPE_DATA: u16 = 0x01;
pub const HDR_TYPE_NAK: u16 = 0x02;
pub const HDR_TYPE_SM: u16 = 0x03;
pub const HDR_TYPE_ERR: u16 = 0x04;
pub const HDR_TYPE_SETUP: u16 = 0x05;
pub const HDR_TYPE_EXT: u16 = 0xFFFF;

/// Type code marking a padding frame.
pub const PADDING_FRAME_TYPE: u16 = HDR_TYPE_PAD;

/// First fragment of a message.
pub const BEGIN_FRAG_FLAG: u8 = 0x80;
/// Last fragment of a message.
pub const END_FRAG_FLAG: u8 = 0x40;
/// A message carried in a single frame.
pub const UNFRAGMENTED: u8 = BEGIN_FRAG_FLAG | END_FRAG_FLAG;

pub const FRAME_LENGTH_FIELD_OFFSET: usize = 0;
pub const VERSION_FIELD_OFFSET: usize = 4;
pub const FLAGS_FIELD_OFFSET: usize = 5;
pub const TYPE_FIELD_OFFSET: usize = 6;
pub const TERM_OFFSET_FIELD_OFFSET: usize = 8;
pub const SESSION_ID_FIELD_OFFSET: usize = 12;
pub const STREAM_ID_FIELD_OFFSET: usize = 16;
pub const TERM_ID_FIELD_OFFSET: usize = 20;
pub const RESERVED_VALUE_FIELD_OFFSET: usize = 24;

/// Smallest term length accepted when creating term files: 64 KiB.
pub const TERM_MIN_LENGTH: usize = 64 * 1024;

/// Largest term length accepted when creating term files: 1 GiB.
pub const TERM_MAX_LENGTH: usize = 1024 * 1024 * 1024;

/// Round `value` up to the next multiple of `alignment` (a power of two).
#[inline]
pub const fn align(value: usize, alignment: usize) -> usize {
    (value + (alignment - 1)) & !(alignment - 1)
}

/// Whether `offset` sits on a frame boundary.
#[inline]
pub const fn is_frame_aligned(offset: usize) -> bool {
    offset & (FRAME_ALIGNMENT - 1) == 0
}

#[inline]
pub const fn length_offset(frame_offset: usize) -> usize {
    frame_offset + FRAME_LENGTH_FIELD_OFFSET
}

#[inline]
pub const fn version_offset(frame_offset: usize) -> usize {
    frame_offset + VERSION_FIELD_OFFSET
}

#[inline]
pub const fn flags_offset(frame_offset: usize) -> usize {
    frame_offset + FLAGS_FIELD_OFFSET
}

/// Absolute offset of the type field for a frame starting at `frame_offset`.
#[inline]
pub const fn type_offset(frame_offset: usize) -> usize {
    frame_offset + TYPE_FIELD_OFFSET
}

#[inline]
pub const fn term_offset_offset(frame_offset: usize) -> usize {
    frame_offset + TERM_OFFSET_FIELD_OFFSET
}

#[inline]
pub const fn session_id_offset(frame_offset: usize) -> usize {
    frame_offset + SESSION_ID_FIELD_OFFSET
}

#[inline]
pub const fn stream_id_offset(frame_offset: usize) -> usize {
    frame_offset + STREAM_ID_FIELD_OFFSET
}

#[inline]
pub const fn term_id_offset(frame_offset: usize) -> usize {
    frame_offset + TERM_ID_FIELD_OFFSET
}

#[inline]
pub const fn reserved_value_offset(frame_offset: usize) -> usize {
    frame_offset + RESERVED_VALUE_FIELD_OFFSET
}

/// Whether a type code denotes a padding frame.
#[inline]
pub const fn is_padding_frame(frame_type: u16) -> bool {
    frame_type == PADDING_FRAME_TYPE
}

/// How the reader treats a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// Payload is delivered to the fragment handler.
    Data,
    /// Skipped; only advances the scan offset.
    Padding,
}

impl FrameKind {
    /// Classify a type code. Anything other than padding is data.
    pub const fn of(frame_type: u16) -> Self {
        if is_padding_frame(frame_type) {
            Self::Padding
        } else {
            Self::Data
        }
    }
}

/// Returns a human-readable name for a frame type code.
pub fn frame_type_name(frame_type: u16) -> &'static str {
    match frame_type {
        HDR_TYPE_PAD => "PAD",
        HDR_TYPE_DATA => "DATA",
        HDR_TYPE_NAK => "NAK",
        HDR_TYPE_SM => "SM",
        HDR_TYPE_ERR => "ERR",
        HDR_TYPE_SETUP => "SETUP",
        HDR_TYPE_EXT => "EXT",
        _ => "UNKNOWN",
    }
}

/// Check that a term length is a power of two within
/// [`TERM_MIN_LENGTH`]..=[`TERM_MAX_LENGTH`].
pub fn check_term_length(length: usize) -> Result<()> {
    if !(TERM_MIN_LENGTH..=TERM_MAX_LENGTH).contains(&length) || !length.is_power_of_two() {
        return Err(FrameError::InvalidTermLength {
            length,
            min: TERM_MIN_LENGTH,
            max: TERM_MAX_LENGTH,
        });
    }
    Ok(())
}

/// Absolute stream position of `term_offset` within `term_id`.
///
/// Counts the terms elapsed since `initial_term_id` (wrapping, so term ids
/// may roll over) and scales by `term_length`. Within
/// [`TERM_MAX_LENGTH`] the result is exact; beyond it the arithmetic wraps
/// instead of overflowing.
pub fn compute_position(
    term_id: i32,
    term_offset: usize,
    term_length: usize,
    initial_term_id: i32,
) -> i64 {
    let term_count = i64::from(term_id.wrapping_sub(initial_term_id));
    term_count
        .wrapping_mul(term_length as i64)
        .wrapping_add(term_offset as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align_rounds_up_to_boundary() {
        assert_eq!(align(0, FRAME_ALIGNMENT), 0);
        assert_eq!(align(1, FRAME_ALIGNMENT), 32);
        assert_eq!(align(32, FRAME_ALIGNMENT), 32);
        assert_eq!(align(HEADER_LENGTH + 1, FRAME_ALIGNMENT), 64);
        assert_eq!(align(100, 8), 104);
    }

    #[test]
    fn field_offsets_relative_to_frame() {
        assert_eq!(type_offset(0), 6);
        assert_eq!(type_offset(64), 70);
        assert_eq!(length_offset(96), 96);
        assert_eq!(flags_offset(32), 37);
        assert_eq!(term_id_offset(32), 52);
        assert_eq!(reserved_value_offset(0) + 8, HEADER_LENGTH);
    }

    #[test]
    fn padding_classification() {
        assert!(is_padding_frame(PADDING_FRAME_TYPE));
        assert!(!is_padding_frame(HDR_TYPE_DATA));
        assert_eq!(FrameKind::of(HDR_TYPE_PAD), FrameKind::Padding);
        assert_eq!(FrameKind::of(HDR_TYPE_DATA), FrameKind::Data);
        assert_eq!(FrameKind::of(HDR_TYPE_EXT), FrameKind::Data);
        assert_eq!(FrameKind::of(0x1234), FrameKind::Data);
    }

    #[test]
    fn frame_alignment_check() {
        assert!(is_frame_aligned(0));
        assert!(is_frame_aligned(TERM_MIN_LENGTH - FRAME_ALIGNMENT));
        assert!(!is_frame_aligned(33));
    }

    #[test]
    fn type_names() {
        assert_eq!(frame_type_name(HDR_TYPE_PAD), "PAD");
        assert_eq!(frame_type_name(HDR_TYPE_DATA), "DATA");
        assert_eq!(frame_type_name(0x77), "UNKNOWN");
    }

    #[test]
    fn term_length_bounds() {
        assert!(check_term_length(TERM_MIN_LENGTH).is_ok());
        assert!(check_term_length(TERM_MAX_LENGTH).is_ok());
        assert!(check_term_length(TERM_MIN_LENGTH / 2).is_err());
        assert!(check_term_length(TERM_MIN_LENGTH + FRAME_ALIGNMENT).is_err());
        assert!(matches!(
            check_term_length(TERM_MAX_LENGTH * 2),
            Err(FrameError::InvalidTermLength { .. })
        ));
    }

    #[test]
    fn position_spans_terms() {
        assert_eq!(compute_position(7, 0, TERM_MIN_LENGTH, 7), 0);
        assert_eq!(compute_position(7, 96, TERM_MIN_LENGTH, 7), 96);
        assert_eq!(
            compute_position(9, 64, TERM_MIN_LENGTH, 7),
            2 * TERM_MIN_LENGTH as i64 + 64
        );
        assert_eq!(
            compute_position(i32::MIN, 0, TERM_MIN_LENGTH, i32::MAX),
            TERM_MIN_LENGTH as i64
        );
    }

    #[test]
    fn position_exact_at_max_term_length() {
        assert_eq!(
            compute_position(i32::MAX, 32, TERM_MAX_LENGTH, 0),
            i64::from(i32::MAX) * TERM_MAX_LENGTH as i64 + 32
        );
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn position_wraps_for_oversized_terms() {
        let term_length = 1usize << 40;
        assert_eq!(
            compute_position(i32::MAX, 0, term_length, 0),
            i64::from(i32::MAX).wrapping_mul(1 << 40)
        );
    }
}
