//! Board HTTP server command — `taskboard serve`.

use anyhow::Result;
use taskboard::board::server::{ServerConfig, start_server};

pub async fn cmd_serve(config: ServerConfig) -> Result<()> {
    start_server(config).await
}
