use logbuf_frame::descriptor::{
    FLAGS_FIELD_OFFSET, FRAME_LENGTH_FIELD_OFFSET, RESERVED_VALUE_FIELD_OFFSET, SESSION_ID_FIELD_OFFSET,
    STREAM_ID_FIELD_OFFSET, TERM_ID_FIELD_OFFSET, TERM_OFFSET_FIELD_OFFSET, TYPE_FIELD_OFFSET,
    VERSION_FIELD_OFFSET,
};
use logbuf_frame::{
    FRAME_ALIGNMENT, HEADER_LENGTH, PADDING_FRAME_TYPE, TERM_MAX_LENGTH, TERM_MIN_LENGTH,
};
use serde::Serialize;

use crate::cmd::LayoutArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::OutputFormat;

#[derive(Serialize)]
struct FieldOutput {
    name: &'static str,
    offset: usize,
    size: usize,
}

#[derive(Serialize)]
struct LayoutOutput {
    frame_alignment: usize,
    header_length: usize,
    padding_frame_type: u16,
    term_min_length: usize,
    term_max_length: usize,
    fields: Vec<FieldOutput>,
}

pub fn run(_args: LayoutArgs, format: OutputFormat) -> CliResult<i32> {
    let fields = vec![
        field("frame_length", FRAME_LENGTH_FIELD_OFFSET, 4),
        field("version", VERSION_FIELD_OFFSET, 1),
        field("flags", FLAGS_FIELD_OFFSET, 1),
        field("type", TYPE_FIELD_OFFSET, 2),
        field("term_offset", TERM_OFFSET_FIELD_OFFSET, 4),
        field("session_id", SESSION_ID_FIELD_OFFSET, 4),
        field("stream_id", STREAM_ID_FIELD_OFFSET, 4),
        field("term_id", TERM_ID_FIELD_OFFSET, 4),
        field("reserved_value", RESERVED_VALUE_FIELD_OFFSET, 8),
    ];

    let output = LayoutOutput {
        frame_alignment: FRAME_ALIGNMENT,
        header_length: HEADER_LENGTH,
        padding_frame_type: PADDING_FRAME_TYPE,
        term_min_length: TERM_MIN_LENGTH,
        term_max_length: TERM_MAX_LENGTH,
        fields,
    };

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(&output).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table | OutputFormat::Pretty | OutputFormat::Raw => {
            println!("frame_alignment: {}", output.frame_alignment);
            println!("header_length: {}", output.header_length);
            println!("padding_frame_type: {:#06x}", output.padding_frame_type);
            println!(
                "term_length: {}..={}",
                output.term_min_length, output.term_max_length
            );
            for f in &output.fields {
                println!("  {:<16} offset={:<3} size={}", f.name, f.offset, f.size);
            }
        }
    }

    Ok(SUCCESS)
}

fn field(name: &'static str, offset: usize, size: usize) -> FieldOutput {
    FieldOutput { name, offset, size }
}
