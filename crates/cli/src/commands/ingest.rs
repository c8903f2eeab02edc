//! Ingest command handler.

use crate::commands::remote::RemoteClient;
use clap::Args;
use docqa_core::{AppResult, Settings};
use docqa_knowledge::{IngestReport, Services};
use std::path::PathBuf;

/// Load, chunk and embed every document in a directory
#[derive(Args, Debug)]
pub struct IngestCommand {
    /// Directory to ingest (default: files_directory from settings)
    #[arg(short, long)]
    pub dir: Option<PathBuf>,

    /// Trigger ingestion on a running server instead of in-process
    #[arg(long, env = "DOCQA_SERVER")]
    pub server: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl IngestCommand {
    pub async fn execute(&self, settings: &Settings) -> AppResult<()> {
        if let Some(server) = &self.server {
            tracing::info!("Triggering ingestion on {}", server);
            let ack = RemoteClient::new(server).ingest().await?;
            if self.json {
                println!("{}", serde_json::to_string_pretty(&ack)?);
            } else {
                println!("{}", ack["message"].as_str().unwrap_or("Ingestion accepted"));
            }
            return Ok(());
        }

        let dir = self
            .dir
            .clone()
            .unwrap_or_else(|| settings.files_directory.clone());
        tracing::info!("Executing ingest command for {:?}", dir);

        let services = Services::build(settings).await?;
        let report = services.ingestion.ingest_directory(&dir).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print_report(&report);
        }

        Ok(())
    }
}

fn print_report(report: &IngestReport) {
    println!(
        "Ingested {} files ({} chunks) in {:.2}s",
        report.processed, report.chunks_added, report.duration_secs
    );

    if !report.failed.is_empty() {
        println!("Failed ({}):", report.failed.len());
        for failure in &report.failed {
            println!("- {}: {}", failure.path.display(), failure.error);
        }
    }
}
