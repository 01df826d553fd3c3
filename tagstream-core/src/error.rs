use std::fmt;

/// Boxed error returned by caller-supplied transforms.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Which transform failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformStage {
    /// The success transform, applied to every non-error record.
    Success,
    /// The error transform, applied to `error` records.
    Error,
}

impl fmt::Display for TransformStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformStage::Success => f.write_str("success"),
            TransformStage::Error => f.write_str("error"),
        }
    }
}

/// Errors that terminate a session.
///
/// Cancellation is not an error; see [`Outcome::Cancelled`](crate::Outcome).
/// Every variant is terminal: no further reads are issued and pending
/// tokenizer state is discarded unflushed.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The stream delivered an `error` event.
    ///
    /// `message` is the output of the error transform.
    #[error("stream error: {message}")]
    Stream { message: String },

    /// A success or error transform failed.
    #[error("{stage} transform failed: {source}")]
    Transform {
        stage: TransformStage,
        #[source]
        source: BoxError,
    },

    /// Reading from the source failed.
    #[error("source read failed: {0}")]
    Source(#[source] std::io::Error),

    /// The session was already run; sessions are single-use.
    #[error("session already finished")]
    SessionFinished,
}

/// A specialized Result type for tagstream operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a transform error.
    pub fn transform(stage: TransformStage, source: impl Into<BoxError>) -> Self {
        Self::Transform {
            stage,
            source: source.into(),
        }
    }

    /// Check if the stream itself reported the failure.
    pub fn is_stream_error(&self) -> bool {
        matches!(self, Error::Stream { .. })
    }

    /// Check if a caller-supplied transform failed.
    pub fn is_transform_error(&self) -> bool {
        matches!(self, Error::Transform { .. })
    }

    /// The message carried by a stream error.
    pub fn stream_message(&self) -> Option<&str> {
        match self {
            Error::Stream { message } => Some(message),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Source(err)
    }
}
