use logbuf_buffer::TermBuffer;
use tracing::{debug, trace};

use crate::descriptor::{
    align, is_padding_frame, length_offset, type_offset, FRAME_ALIGNMENT, HEADER_LENGTH,
};
use crate::error::{FrameError, Result};
use crate::handler::FragmentHandler;
use crate::header::Header;

/// Why a scan returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStop {
    /// The next frame is not committed yet. Poll again later.
    Tail,
    /// The fragment limit was reached.
    Limit,
    /// The scan reached the end of the term; the caller should rotate.
    End,
}

impl ScanStop {
    pub fn as_str(self) -> &'static str {
        match self {
            ScanStop::Tail => "tail",
            ScanStop::Limit => "limit",
            ScanStop::End => "end",
        }
    }
}

/// Result of one [`TermReader::scan`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOutcome {
    /// Data frames delivered to the handler. Padding is not counted.
    pub fragments_read: usize,
    /// Offset of the first frame not consumed; pass it to the next scan.
    pub offset: usize,
    pub stop: ScanStop,
}

/// Scans committed frames in one term buffer.
///
/// The reader holds no position: each scan starts from the offset the caller
/// passes and reports where it stopped. Any number of readers may scan the
/// same buffer from different threads while a single writer appends to it;
/// the only synchronization is the acquire load of each frame's length.
#[derive(Debug)]
pub struct TermReader<B> {
    initial_term_id: i32,
    term_buffer: B,
}

impl<B: TermBuffer> TermReader<B> {
    /// Bind a reader to `term_buffer`.
    ///
    /// Fails if the buffer capacity is not a positive multiple of
    /// [`FRAME_ALIGNMENT`].
    pub fn new(initial_term_id: i32, term_buffer: B) -> Result<Self> {
        let capacity = term_buffer.capacity();
        if capacity == 0 || capacity % FRAME_ALIGNMENT != 0 {
            return Err(FrameError::InvalidCapacity {
                capacity,
                alignment: FRAME_ALIGNMENT,
            });
        }

        debug!(initial_term_id, capacity, "bound term reader");
        Ok(Self {
            initial_term_id,
            term_buffer,
        })
    }

    pub fn initial_term_id(&self) -> i32 {
        self.initial_term_id
    }

    pub fn capacity(&self) -> usize {
        self.term_buffer.capacity()
    }

    pub fn term_buffer(&self) -> &B {
        &self.term_buffer
    }

    /// Consume the reader and return the term buffer.
    pub fn into_inner(self) -> B {
        self.term_buffer
    }

    /// Deliver up to `fragment_limit` data frames starting at `term_offset`.
    ///
    /// `term_offset` must be a frame boundary: 0 or an offset previously
    /// returned in [`ScanOutcome::offset`]. Pass `usize::MAX` for no limit.
    ///
    /// Stops at the first uncommitted frame, at the limit, or at the end of
    /// the term. A handler error ends the scan at that frame and is returned
    /// as is.
    pub fn scan<H>(
        &self,
        term_offset: usize,
        handler: &mut H,
        fragment_limit: usize,
    ) -> std::result::Result<ScanOutcome, H::Error>
    where
        H: FragmentHandler<B>,
    {
        let capacity = self.term_buffer.capacity();
        let mut offset = term_offset;
        let mut fragments_read = 0usize;

        let stop = loop {
            if offset >= capacity {
                break ScanStop::End;
            }
            if fragments_read >= fragment_limit {
                break ScanStop::Limit;
            }

            // Commit marker first: nothing else in the frame may be read
            // before this acquire load observes a positive length.
            let frame_length = self.term_buffer.get_i32_volatile(length_offset(offset));
            if frame_length <= 0 {
                break ScanStop::Tail;
            }
            let frame_length = frame_length as usize;

            if !is_padding_frame(self.term_buffer.get_u16(type_offset(offset))) {
                let header = Header::new(&self.term_buffer, offset, self.initial_term_id);
                handler.on_fragment(
                    &self.term_buffer,
                    offset + HEADER_LENGTH,
                    frame_length.saturating_sub(HEADER_LENGTH),
                    &header,
                )?;
                fragments_read += 1;
            }

            offset += align(frame_length, FRAME_ALIGNMENT);
        };

        trace!(
            term_offset,
            offset,
            fragments_read,
            stop = stop.as_str(),
            "term scan stopped"
        );

        Ok(ScanOutcome {
            fragments_read,
            offset,
            stop,
        })
    }

    /// Like [`scan`](Self::scan), returning only the number of fragments delivered.
    pub fn read<H>(
        &self,
        term_offset: usize,
        handler: &mut H,
        fragment_limit: usize,
    ) -> std::result::Result<usize, H::Error>
    where
        H: FragmentHandler<B>,
    {
        self.scan(term_offset, handler, fragment_limit)
            .map(|outcome| outcome.fragments_read)
    }
}
