use serde_json::Value;
use thiserror::Error;

const SUCCESS_STATUS: &str = "OK";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EnvelopeError {
    #[error("response is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("response envelope has no status field")]
    MissingStatus,
    #[error("server rejected request: {message}")]
    Rejected { message: String },
}

/// The `{status, message, body}` wrapper every REST response uses.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub status: String,
    pub message: Option<String>,
    pub body: Value,
}

impl Envelope {
    /// Parse a raw response body. Only the top-level shape is checked here;
    /// see [`Envelope::into_accepted`] for the status check.
    pub fn parse(raw: &str) -> Result<Self, EnvelopeError> {
        let value: Value =
            serde_json::from_str(raw).map_err(|err| EnvelopeError::InvalidJson(err.to_string()))?;
        Self::from_value(value)
    }

    pub fn from_value(mut value: Value) -> Result<Self, EnvelopeError> {
        let status = value
            .get("status")
            .and_then(Value::as_str)
            .ok_or(EnvelopeError::MissingStatus)?
            .to_string();
        let message = value
            .get("message")
            .and_then(Value::as_str)
            .map(ToOwned::to_owned);
        let body = value
            .get_mut("body")
            .map(Value::take)
            .unwrap_or(Value::Null);
        Ok(Self {
            status,
            message,
            body,
        })
    }

    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case(SUCCESS_STATUS)
    }

    /// Pass the envelope through when the server reported success, otherwise
    /// fail with the server's message verbatim.
    pub fn into_accepted(self) -> Result<Self, EnvelopeError> {
        if self.is_ok() {
            Ok(self)
        } else {
            Err(EnvelopeError::Rejected {
                message: self.message.unwrap_or_default(),
            })
        }
    }

    /// The body as a string, for commands that return a bare id.
    pub fn body_str(&self) -> Option<&str> {
        self.body.as_str()
    }
}
