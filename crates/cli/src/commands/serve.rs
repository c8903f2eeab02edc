//! Serve command handler.

use clap::Args;
use docqa_core::{AppResult, Settings};
use docqa_knowledge::Services;
use docqa_server::DocQaServer;

/// Run the HTTP API
#[derive(Args, Debug)]
pub struct ServeCommand {
    /// Bind address (default from settings: 0.0.0.0)
    #[arg(long, env = "DOCQA_HOST")]
    pub host: Option<String>,

    /// Port (default from settings: 8000)
    #[arg(short, long, env = "DOCQA_PORT")]
    pub port: Option<u16>,
}

impl ServeCommand {
    pub async fn execute(self, mut settings: Settings) -> AppResult<()> {
        if let Some(host) = self.host {
            settings.server.host = host;
        }
        if let Some(port) = self.port {
            settings.server.port = port;
        }

        let services = Services::build(&settings).await?;
        let server = DocQaServer::new(services, &settings.server);
        tracing::info!("Starting server on {}", server.address());

        server.start().await
    }
}
