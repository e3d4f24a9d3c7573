use std::fmt;
use std::io;

use logbuf_buffer::BufferError;
use logbuf_frame::FrameError;

// Process exit codes. 64 follows sysexits(3) EX_USAGE.
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::NotFound => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn buffer_error(context: &str, err: BufferError) -> CliError {
    match err {
        BufferError::Open { path, source } | BufferError::Map { path, source } => {
            io_error(&format!("{context} ({})", path.display()), source)
        }
        BufferError::ZeroCapacity | BufferError::CapacityTooLarge { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
    }
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::InvalidCapacity { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        FrameError::InvalidTermLength { .. } => CliError::new(USAGE, format!("{context}: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn maps_capacity_errors_to_data_invalid() {
        let err = frame_error(
            "bind failed",
            FrameError::InvalidCapacity {
                capacity: 100,
                alignment: 32,
            },
        );
        assert_eq!(err.code, DATA_INVALID);
        assert!(err.message.starts_with("bind failed: "));

        let err = buffer_error("map failed", BufferError::ZeroCapacity);
        assert_eq!(err.code, DATA_INVALID);
    }

    #[test]
    fn maps_bad_term_length_to_usage() {
        let err = frame_error(
            "invalid term length",
            FrameError::InvalidTermLength {
                length: 1000,
                min: 64 * 1024,
                max: 1024 * 1024 * 1024,
            },
        );
        assert_eq!(err.code, USAGE);
        assert!(err.message.contains("1000"));
    }

    #[test]
    fn maps_missing_file_to_failure() {
        let err = buffer_error(
            "map failed",
            BufferError::Open {
                path: PathBuf::from("/nope"),
                source: io::Error::from(io::ErrorKind::NotFound),
            },
        );
        assert_eq!(err.code, FAILURE);
        assert!(err.message.contains("/nope"));
    }
}
