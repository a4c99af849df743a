use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_QUERY_INTERVAL_MS: u64 = 1000;

/// How requests authenticate against the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AuthMode {
    /// Talk to the notebook server directly; `login` posts credentials.
    #[default]
    Direct,
    /// The server sits behind a Knox gateway; `login` authenticates against
    /// the gateway with HTTP basic auth.
    KnoxGateway,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the server, e.g. `http://localhost:8080`. The REST prefix
    /// `/api` is appended by the transport.
    pub rest_url: String,
    /// Sleep between two polls of a wait loop.
    #[serde(default = "default_query_interval_ms")]
    pub query_interval_ms: u64,
    #[serde(default)]
    pub auth_mode: AuthMode,
}

impl ClientConfig {
    pub fn new(rest_url: impl Into<String>) -> Self {
        Self {
            rest_url: rest_url.into(),
            query_interval_ms: DEFAULT_QUERY_INTERVAL_MS,
            auth_mode: AuthMode::Direct,
        }
    }

    pub fn with_query_interval(mut self, interval: Duration) -> Self {
        self.query_interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_auth_mode(mut self, auth_mode: AuthMode) -> Self {
        self.auth_mode = auth_mode;
        self
    }

    pub fn query_interval(&self) -> Duration {
        Duration::from_millis(self.query_interval_ms)
    }
}

fn default_query_interval_ms() -> u64 {
    DEFAULT_QUERY_INTERVAL_MS
}
