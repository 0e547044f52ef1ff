//! The `quizdeck serve` command.

use std::path::PathBuf;

use anyhow::Result;
use quizdeck_server::config::load_config_from;

pub async fn execute(config: Option<PathBuf>, port: Option<u16>, memory: bool) -> Result<()> {
    let mut config = load_config_from(config.as_deref())?;
    if let Some(port) = port {
        config.port = port;
    }
    if memory {
        config.database_url = "memory:".to_string();
    }
    tracing::debug!(?config, "starting server");

    quizdeck_server::serve(config).await
}
