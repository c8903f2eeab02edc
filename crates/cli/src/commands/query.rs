//! Query command handler.

use crate::commands::remote::RemoteClient;
use clap::Args;
use docqa_core::{AppResult, Settings};
use docqa_knowledge::{QueryResult, Services};

/// Answer a question from the ingested documents
#[derive(Args, Debug)]
pub struct QueryCommand {
    /// Question text
    pub query: String,

    /// Ask a running server instead of answering in-process
    #[arg(long, env = "DOCQA_SERVER")]
    pub server: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Print only the answer
    #[arg(long)]
    pub no_sources: bool,
}

impl QueryCommand {
    pub async fn execute(&self, settings: &Settings) -> AppResult<()> {
        tracing::info!("Executing query command");

        let result = match &self.server {
            Some(server) => RemoteClient::new(server).query(&self.query).await?,
            None => {
                let services = Services::build(settings).await?;
                let interrupted = async { interrupted_by(tokio::signal::ctrl_c().await).await };
                services.pipeline.answer_until(&self.query, interrupted).await?
            }
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            self.print(&result);
        }

        Ok(())
    }

    fn print(&self, result: &QueryResult) {
        println!("{}", result.answer);
        if self.no_sources {
            return;
        }

        println!();
        if result.sources.is_empty() {
            println!("Sources: (none)");
            return;
        }

        println!("Sources:");
        for source in &result.sources {
            let name = source.source().unwrap_or("unknown");
            match source.page_number() {
                Some(page) => println!(
                    "- {} (page {}) [relevance {:.3}]",
                    name, page, source.relevance_score
                ),
                None => println!("- {} [relevance {:.3}]", name, source.relevance_score),
            }
        }
    }
}

/// Resolves once Ctrl-C arrives. Without a signal handler the query can only
/// finish on its own, so this never resolves.
async fn interrupted_by(signal: std::io::Result<()>) {
    if let Err(e) = signal {
        tracing::warn!("Could not listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
