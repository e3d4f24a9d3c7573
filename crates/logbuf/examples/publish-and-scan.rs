//! One writer thread publishes frames into a shared term while the main
//! thread polls it with a `TermReader`.
//!
//! Run with:
//!   cargo run --example publish-and-scan

use std::convert::Infallible;
use std::sync::Arc;
use std::thread;

use logbuf::buffer::{AtomicBuffer, TermBuffer};
use logbuf::frame::descriptor::{
    length_offset, term_id_offset, type_offset, HDR_TYPE_DATA, HDR_TYPE_PAD,
};
use logbuf::frame::{align, Header, ScanStop, TermReader, FRAME_ALIGNMENT, HEADER_LENGTH};

const TERM_LENGTH: usize = 64 * 1024;
const INITIAL_TERM_ID: i32 = 0;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let term = Arc::new(AtomicBuffer::with_capacity(TERM_LENGTH)?);
    let reader = TermReader::new(INITIAL_TERM_ID, Arc::clone(&term))?;

    let writer = {
        let term = Arc::clone(&term);
        thread::spawn(move || {
            let mut offset = 0;
            for i in 0.. {
                let payload = format!("message {i}");
                let frame_length = HEADER_LENGTH + payload.len();
                let footprint = align(frame_length, FRAME_ALIGNMENT);
                if offset + footprint > TERM_LENGTH {
                    break;
                }
                // SAFETY: this thread is the only writer and publishes the
                // frame length last.
                unsafe {
                    term.put_u16(type_offset(offset), HDR_TYPE_DATA);
                    term.put_i32(term_id_offset(offset), INITIAL_TERM_ID);
                    term.put_bytes(offset + HEADER_LENGTH, payload.as_bytes());
                    term.put_i32_ordered(length_offset(offset), frame_length as i32);
                }
                offset += footprint;
            }

            // Pad out the tail so readers reach the end of the term.
            if offset < TERM_LENGTH {
                // SAFETY: as above.
                unsafe {
                    term.put_u16(type_offset(offset), HDR_TYPE_PAD);
                    term.put_i32_ordered(length_offset(offset), (TERM_LENGTH - offset) as i32);
                }
            }
        })
    };

    let mut received = 0usize;
    let mut handler = |buffer: &Arc<AtomicBuffer>,
                       offset: usize,
                       length: usize,
                       header: &Header<'_, Arc<AtomicBuffer>>|
     -> Result<(), Infallible> {
        if received % 200 == 0 {
            let text = String::from_utf8_lossy(buffer.slice(offset, length));
            eprintln!("position {:>6}: {text}", header.position());
        }
        received += 1;
        Ok(())
    };

    let mut offset = 0;
    loop {
        let outcome = reader.scan(offset, &mut handler, 64)?;
        offset = outcome.offset;
        match outcome.stop {
            ScanStop::End => break,
            ScanStop::Tail if outcome.fragments_read == 0 => thread::yield_now(),
            _ => {}
        }
    }

    writer.join().map_err(|_| "writer thread panicked")?;
    eprintln!("read {received} fragments, term exhausted at offset {offset}");
    Ok(())
}
