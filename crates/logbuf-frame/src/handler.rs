use logbuf_buffer::TermBuffer;

use crate::header::Header;

/// Receives the payload of each data frame a [`TermReader`](crate::TermReader)
/// scans.
///
/// `buffer[offset..offset + length]` is the payload, borrowed straight from
/// the term buffer. Neither the bytes nor `header` may be retained after
/// returning; copy what you need (see [`Fragment`](crate::Fragment)).
///
/// Returning `Err` stops the scan at this frame and hands the error to the
/// scan's caller unchanged.
pub trait FragmentHandler<B: TermBuffer + ?Sized> {
    type Error;

    fn on_fragment(
        &mut self,
        buffer: &B,
        offset: usize,
        length: usize,
        header: &Header<'_, B>,
    ) -> Result<(), Self::Error>;
}

impl<B, E, F> FragmentHandler<B> for F
where
    B: TermBuffer + ?Sized,
    F: FnMut(&B, usize, usize, &Header<'_, B>) -> Result<(), E>,
{
    type Error = E;

    fn on_fragment(
        &mut self,
        buffer: &B,
        offset: usize,
        length: usize,
        header: &Header<'_, B>,
    ) -> Result<(), E> {
        self(buffer, offset, length, header)
    }
}
