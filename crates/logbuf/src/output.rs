use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use logbuf_frame::descriptor::frame_type_name;
use logbuf_frame::{Fragment, ScanOutcome};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct FragmentOutput<'a> {
    kind: &'static str,
    frame_offset: usize,
    frame_type: &'a str,
    flags: u8,
    term_id: i32,
    term_offset: i32,
    session_id: i32,
    stream_id: i32,
    position: i64,
    payload_size: usize,
    payload: String,
}

pub fn print_fragment(fragment: &Fragment, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = FragmentOutput {
                kind: "fragment",
                frame_offset: fragment.frame_offset,
                frame_type: frame_type_name(fragment.frame_type),
                flags: fragment.flags,
                term_id: fragment.term_id,
                term_offset: fragment.term_offset,
                session_id: fragment.session_id,
                stream_id: fragment.stream_id,
                position: fragment.position,
                payload_size: fragment.len(),
                payload: payload_preview(fragment.payload.as_ref()),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["OFFSET", "TERM", "SESSION", "STREAM", "SIZE", "PAYLOAD"])
                .add_row(vec![
                    fragment.frame_offset.to_string(),
                    fragment.term_id.to_string(),
                    fragment.session_id.to_string(),
                    fragment.stream_id.to_string(),
                    fragment.len().to_string(),
                    payload_preview(fragment.payload.as_ref()),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "offset={} type={} term={} session={} stream={} position={} size={} payload={}",
                fragment.frame_offset,
                frame_type_name(fragment.frame_type),
                fragment.term_id,
                fragment.session_id,
                fragment.stream_id,
                fragment.position,
                fragment.len(),
                payload_preview(fragment.payload.as_ref())
            );
        }
        OutputFormat::Raw => {
            print_raw(fragment.payload.as_ref());
        }
    }
}

#[derive(Serialize)]
struct SummaryOutput<'a> {
    kind: &'static str,
    path: &'a str,
    capacity: usize,
    start_offset: usize,
    next_offset: usize,
    fragments: usize,
    stop: &'static str,
}

pub fn print_summary(
    path: &str,
    capacity: usize,
    start_offset: usize,
    fragments: usize,
    last: &ScanOutcome,
    format: OutputFormat,
) {
    match format {
        OutputFormat::Json => {
            let out = SummaryOutput {
                kind: "summary",
                path,
                capacity,
                start_offset,
                next_offset: last.offset,
                fragments,
                stop: last.stop.as_str(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table | OutputFormat::Pretty => {
            println!(
                "{path}: {fragments} fragment(s) from offset {start_offset}, next offset {} of {capacity} (stopped at {})",
                last.offset,
                last.stop.as_str()
            );
        }
        OutputFormat::Raw => {}
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn payload_preview(payload: &[u8]) -> String {
    match std::str::from_utf8(payload) {
        Ok(text) => text.to_string(),
        Err(_) => format!("<binary {} bytes>", payload.len()),
    }
}
