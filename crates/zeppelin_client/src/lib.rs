//! Zeppelin client: REST transport, command surface and completion polling.
mod client;
mod clock;
mod config;
mod error;
mod transport;
mod wait;

pub use client::{ExecutionClient, Parameters, RunMode};
pub use clock::{Clock, TokioClock};
pub use config::{AuthMode, ClientConfig, DEFAULT_QUERY_INTERVAL_MS};
pub use error::ClientError;
pub use transport::{
    ApiRequest, FailureKind, HttpMethod, ReqwestTransport, Transport, TransportError,
};
pub use zeppelin_core::{NoteResult, ParagraphResult, ResultSegment, Status};
