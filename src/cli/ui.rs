//! Interactive TUI startup.

use anyhow::Result;
use std::sync::Arc;

use crate::api::ApiClient;
use crate::config::Config;
use crate::tui::{self, App};

/// Start the interactive client
pub(crate) async fn cmd_tui(config: &Config) -> Result<()> {
    let client = ApiClient::new(&config.api)?;
    tracing::info!("Starting TUI against {}", client.base_url());

    let app = App::new(Arc::new(client), config);
    tui::run(app).await
}
