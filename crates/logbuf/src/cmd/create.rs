use logbuf_buffer::AtomicBuffer;
use logbuf_frame::descriptor::check_term_length;
use serde::Serialize;

use crate::cmd::CreateArgs;
use crate::exit::{buffer_error, frame_error, CliError, CliResult, FAILURE, SUCCESS};
use crate::output::OutputFormat;

#[derive(Serialize)]
struct CreatedOutput<'a> {
    kind: &'static str,
    path: &'a str,
    term_length: usize,
}

/// Create a zeroed term file a writer can publish into and `scan` can read.
pub fn run(args: CreateArgs, format: OutputFormat) -> CliResult<i32> {
    check_term_length(args.term_length).map_err(|err| frame_error("invalid term length", err))?;

    if args.path.exists() && !args.force {
        return Err(CliError::new(
            FAILURE,
            format!(
                "{} already exists (pass --force to overwrite)",
                args.path.display()
            ),
        ));
    }

    let buffer = AtomicBuffer::create_file(&args.path, args.term_length)
        .map_err(|err| buffer_error("create failed", err))?;
    tracing::debug!(path = %args.path.display(), term_length = buffer.capacity(), "term file created");

    let path = args.path.display().to_string();
    match format {
        OutputFormat::Json => {
            let out = CreatedOutput {
                kind: "created",
                path: &path,
                term_length: args.term_length,
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("{path}: created term of {} bytes", args.term_length);
        }
        OutputFormat::Raw => {}
    }

    Ok(SUCCESS)
}
