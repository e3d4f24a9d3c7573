use logbuf_frame::{FRAME_ALIGNMENT, HEADER_LENGTH, TERM_MAX_LENGTH, TERM_MIN_LENGTH};

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("logbuf {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: logbuf");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "target: {}",
        option_env!("LOGBUF_BUILD_TARGET").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!(
        "rustc: {}",
        option_env!("RUSTC_VERSION").unwrap_or("unknown")
    );
    println!("git_hash: {}", option_env!("GIT_HASH").unwrap_or("unknown"));
    println!("features: {}", enabled_features().join(","));
    println!("frame_alignment: {FRAME_ALIGNMENT}");
    println!("header_length: {HEADER_LENGTH}");
    println!("term_length: {TERM_MIN_LENGTH}..={TERM_MAX_LENGTH}");

    Ok(SUCCESS)
}

fn enabled_features() -> Vec<&'static str> {
    [("cli", cfg!(feature = "cli"))]
        .into_iter()
        .filter_map(|(name, enabled)| enabled.then_some(name))
        .collect()
}
