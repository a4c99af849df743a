use std::fs;
use std::path::Path;

use anyhow::{bail, Context};
use zeppelin_client::{AuthMode, ClientConfig};
use zeppelin_logging::zeppelin_info;

use crate::cli::ConnectionArgs;

/// Build the client config: the RON file named by `--config` if any, then
/// command-line overrides on top.
pub fn resolve(args: &ConnectionArgs) -> anyhow::Result<ClientConfig> {
    let mut config = match (&args.config, &args.url) {
        (Some(path), _) => load(path)?,
        (None, Some(url)) => ClientConfig::new(url.clone()),
        (None, None) => bail!("no server configured; pass --url or --config"),
    };

    if let Some(url) = &args.url {
        config.rest_url = url.clone();
    }
    if let Some(interval_ms) = args.interval_ms {
        config.query_interval_ms = interval_ms;
    }
    if args.knox {
        config.auth_mode = AuthMode::KnoxGateway;
    }
    Ok(config)
}

/// Read a config file such as:
///
/// ```text
/// (rest_url: "http://localhost:8080", query_interval_ms: 500, auth_mode: KnoxGateway)
/// ```
pub fn load(path: &Path) -> anyhow::Result<ClientConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config from {}", path.display()))?;
    let config: ClientConfig = ron::from_str(&content)
        .with_context(|| format!("failed to parse config from {}", path.display()))?;
    zeppelin_info!("Loaded client config from {:?}", path);
    Ok(config)
}
