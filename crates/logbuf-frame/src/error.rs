/// Errors raised while binding to a term buffer.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FrameError {
    /// The term buffer capacity is zero or not a multiple of the frame alignment.
    #[error("term buffer capacity {capacity} is not a positive multiple of {alignment}")]
    InvalidCapacity { capacity: usize, alignment: usize },

    /// A term length is outside the supported range or not a power of two.
    #[error("term length {length} must be a power of two between {min} and {max}")]
    InvalidTermLength { length: usize, min: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, FrameError>;
