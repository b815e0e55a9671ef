#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The stream ended before a declared field could be read.
    #[error("unexpected end of input reading {context}: wanted {wanted} bytes")]
    UnexpectedEof {
        /// What was being read
        context: &'static str,
        /// Number of bytes requested
        wanted: usize,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A fixed size record was not the expected size.
    #[error("size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// Unrecognized tag or a read past the bounds of a timeseries block.
    #[error("malformed record at offset {offset}: {reason}")]
    MalformedRecord { offset: usize, reason: String },

    /// Framed string marker bytes did not match `FF FE FF`.
    #[error("unexpected string marker {found:02x?}")]
    Framing { found: [u8; 3] },
}

impl Error {
    pub(crate) fn malformed(offset: usize, reason: impl Into<String>) -> Self {
        Error::MalformedRecord {
            offset,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
