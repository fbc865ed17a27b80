//! Error types shared by every stage of the codec.

/// Errors produced while compressing or decompressing.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Bad magic number or a tree header that ends or misbehaves before it is complete.
    #[error("malformed header: {0}")]
    MalformedHeader(String),

    /// The compressed body ran out before the end-of-stream codeword.
    #[error("truncated stream: {0}")]
    TruncatedStream(String),

    /// The frequency table or tree cannot produce a usable code.
    #[error("construction error: {0}")]
    Construction(String),

    /// The caller passed an argument the codec cannot honour.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Failure from the underlying byte stream.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns true if the error describes corrupt compressed data.
    pub fn is_format_error(&self) -> bool {
        matches!(self, Error::MalformedHeader(_) | Error::TruncatedStream(_))
    }
}

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
