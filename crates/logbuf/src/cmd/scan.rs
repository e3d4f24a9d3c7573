use std::convert::Infallible;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use logbuf_buffer::AtomicBuffer;
use logbuf_frame::descriptor::is_frame_aligned;
use logbuf_frame::{Fragment, FragmentHandler, Header, ScanStop, TermReader};

use crate::cmd::ScanArgs;
use crate::exit::{buffer_error, frame_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_fragment, print_summary, OutputFormat};

const DEFAULT_IDLE: Duration = Duration::from_millis(1);

/// Prints every delivered fragment as it arrives.
struct FragmentPrinter {
    format: OutputFormat,
}

impl FragmentHandler<AtomicBuffer> for FragmentPrinter {
    type Error = Infallible;

    fn on_fragment(
        &mut self,
        buffer: &AtomicBuffer,
        offset: usize,
        length: usize,
        header: &Header<'_, AtomicBuffer>,
    ) -> Result<(), Infallible> {
        let fragment = Fragment::copy_from(buffer, offset, length, header);
        print_fragment(&fragment, self.format);
        Ok(())
    }
}

pub fn run(args: ScanArgs, format: OutputFormat) -> CliResult<i32> {
    let buffer =
        AtomicBuffer::map_file(&args.path).map_err(|err| buffer_error("map failed", err))?;
    let reader = TermReader::new(args.initial_term_id, buffer)
        .map_err(|err| frame_error("bind failed", err))?;

    if !is_frame_aligned(args.offset) || args.offset > reader.capacity() {
        return Err(CliError::new(
            USAGE,
            format!(
                "offset {} is not a frame boundary within a term of {} bytes",
                args.offset,
                reader.capacity()
            ),
        ));
    }

    let running = Arc::new(AtomicBool::new(true));
    if args.follow {
        install_ctrlc_handler(running.clone())?;
    }
    let idle = args.idle_ms.map(Duration::from_millis).unwrap_or(DEFAULT_IDLE);

    let mut printer = FragmentPrinter { format };
    let mut offset = args.offset;
    let mut delivered = 0usize;
    let limit = args.limit.unwrap_or(usize::MAX);

    let last = loop {
        let outcome = reader
            .scan(offset, &mut printer, limit - delivered)
            .unwrap_or_else(|never| match never {});
        delivered += outcome.fragments_read;
        offset = outcome.offset;

        let keep_polling = args.follow
            && outcome.stop == ScanStop::Tail
            && running.load(Ordering::SeqCst);
        if !keep_polling {
            break outcome;
        }
        if outcome.fragments_read == 0 {
            std::thread::sleep(idle);
        }
    };

    tracing::debug!(
        path = %args.path.display(),
        fragments = delivered,
        next_offset = last.offset,
        stop = last.stop.as_str(),
        "scan finished"
    );

    print_summary(
        &args.path.display().to_string(),
        reader.capacity(),
        args.offset,
        delivered,
        &last,
        format,
    );

    Ok(SUCCESS)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}
