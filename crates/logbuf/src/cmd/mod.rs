use clap::{Args, Subcommand};
use logbuf_frame::TERM_MIN_LENGTH;
use std::path::PathBuf;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod create;
pub mod layout;
pub mod scan;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scan a term file and print committed fragments.
    Scan(ScanArgs),
    /// Create a zeroed term file.
    Create(CreateArgs),
    /// Print the frame layout constants.
    Layout(LayoutArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Scan(args) => scan::run(args, format),
        Command::Create(args) => create::run(args, format),
        Command::Layout(args) => layout::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Term file to map.
    pub path: PathBuf,
    /// Frame-aligned byte offset to start scanning from.
    #[arg(long, default_value = "0")]
    pub offset: usize,
    /// Stop after delivering N fragments.
    #[arg(long)]
    pub limit: Option<usize>,
    /// Initial term id of the stream, used for positions.
    #[arg(long, default_value = "0", env = "LOGBUF_INITIAL_TERM_ID")]
    pub initial_term_id: i32,
    /// Keep polling for new frames until the end of the term or Ctrl-C.
    #[arg(long)]
    pub follow: bool,
    /// Sleep between empty polls when --follow is set (milliseconds, default 1).
    #[arg(long, requires = "follow")]
    pub idle_ms: Option<u64>,
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Term file to create.
    pub path: PathBuf,
    /// Term length in bytes: a power of two between 64 KiB and 1 GiB.
    #[arg(long, default_value_t = TERM_MIN_LENGTH)]
    pub term_length: usize,
    /// Overwrite an existing file.
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug, Default)]
pub struct LayoutArgs {}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
