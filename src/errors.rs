use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("input stream closed")]
    Closed,
    #[error("malformed message: {0}")]
    Malformed(String),
    #[error("stream i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode response: {0}")]
    Encode(#[source] serde_json::Error),
}

impl CodecError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }

    /// Terminal errors end the read loop; the rest only lose the current message.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed | Self::Io(_))
    }
}
