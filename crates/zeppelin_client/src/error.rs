use std::time::Duration;

use thiserror::Error;
use zeppelin_core::EnvelopeError;

use crate::TransportError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),
    /// The envelope status was not `OK`; carries the server's message as-is.
    #[error("server rejected request: {message}")]
    ServerRejected { message: String },
    #[error("{target} did not finish within {limit:?}")]
    Timeout { target: String, limit: Duration },
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl From<EnvelopeError> for ClientError {
    fn from(err: EnvelopeError) -> Self {
        match err {
            EnvelopeError::Rejected { message } => ClientError::ServerRejected { message },
            other => ClientError::MalformedResponse(other.to_string()),
        }
    }
}
