//! Error taxonomy for the request pipeline.
//!
//! Every stage reports its own kind. The connection layer is the single place
//! these are caught, logged and turned into a silent connection close.

use shared::FrameError;
use thiserror::Error;

use crate::scorer::ScorerError;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Malformed length prefix or stream closed before the payload was complete.
    #[error("framing error: {0}")]
    Framing(FrameError),

    /// Payload is not a valid drawing request.
    #[error("parse error: {message}")]
    Parse { message: String },

    #[error("scorer error: {0}")]
    Scorer(#[from] ScorerError),

    /// The response could not be serialized.
    #[error("encode error: {message}")]
    Encode { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServiceError {
    pub fn parse(message: impl Into<String>) -> Self {
        ServiceError::Parse {
            message: message.into(),
        }
    }

    /// Short label used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::Framing(_) => "framing",
            ServiceError::Parse { .. } => "parse",
            ServiceError::Scorer(_) => "scorer",
            ServiceError::Encode { .. } => "encode",
            ServiceError::Io(_) => "io",
        }
    }
}

impl From<FrameError> for ServiceError {
    fn from(err: FrameError) -> Self {
        match err {
            FrameError::Io(e) => ServiceError::Io(e),
            other => ServiceError::Framing(other),
        }
    }
}
