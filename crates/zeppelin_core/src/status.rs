use std::fmt;

use serde::Serialize;

/// Lifecycle state of a paragraph or note job as reported by the server.
///
/// Transitions happen remotely; the client only observes them. The nominal
/// order is `Ready -> Pending -> Running -> {Finished | Error | Abort}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    /// Job not found remotely, or the reported literal was not recognised.
    #[default]
    Unknown,
    Ready,
    Pending,
    Running,
    Finished,
    Error,
    Abort,
}

impl Status {
    pub const ALL: [Status; 7] = [
        Status::Unknown,
        Status::Ready,
        Status::Pending,
        Status::Running,
        Status::Finished,
        Status::Error,
        Status::Abort,
    ];

    /// Decode a server literal. Never fails: anything unrecognised is `Unknown`.
    pub fn from_literal(literal: &str) -> Self {
        let literal = literal.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(literal))
            .unwrap_or(Status::Unknown)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Unknown => "UNKNOWN",
            Status::Ready => "READY",
            Status::Pending => "PENDING",
            Status::Running => "RUNNING",
            Status::Finished => "FINISHED",
            Status::Error => "ERROR",
            Status::Abort => "ABORT",
        }
    }

    /// `Finished`, `Error` and `Abort` end a job; nothing follows them.
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Finished | Status::Error | Status::Abort)
    }
}

impl From<Option<&str>> for Status {
    fn from(literal: Option<&str>) -> Self {
        literal.map(Status::from_literal).unwrap_or_default()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
