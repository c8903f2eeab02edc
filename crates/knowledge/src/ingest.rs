//! Directory ingestion: load, chunk, embed, store.

use crate::chunker::Chunker;
use crate::embeddings::EmbeddingProvider;
use crate::loader::load_document;
use crate::store::VectorStore;
use crate::types::{EmbeddedChunk, FailedFile, IngestReport};
use docqa_core::{AppError, AppResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use walkdir::WalkDir;

/// Feeds a directory of documents into one vector store collection.
///
/// Runs are serialized: a second `ingest_directory` call waits for the first
/// to finish before touching the store.
pub struct IngestionService {
    chunker: Chunker,
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    batch_size: usize,
    write_lock: Mutex<()>,
}

impl IngestionService {
    pub fn new(
        chunker: Chunker,
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
        batch_size: usize,
    ) -> Self {
        Self {
            chunker,
            embedder,
            store,
            batch_size: batch_size.max(1),
            write_lock: Mutex::new(()),
        }
    }

    /// Ingest every regular file directly inside `dir` (no recursion).
    ///
    /// Files that fail are recorded in the report and skipped; only an
    /// unreadable directory fails the whole call.
    pub async fn ingest_directory(&self, dir: &Path) -> AppResult<IngestReport> {
        let _guard = self.write_lock.lock().await;
        let started = Instant::now();

        let (files, unreadable) = list_files(dir)?;
        tracing::info!("Ingesting {} files from {:?}", files.len(), dir);

        let mut report = IngestReport {
            failed: unreadable,
            ..IngestReport::default()
        };
        for path in files {
            match self.ingest_file(&path).await {
                Ok(added) => {
                    report.processed += 1;
                    report.chunks_added += added;
                }
                Err(e) => {
                    let error = match e {
                        AppError::IngestionItem { .. } => e,
                        other => AppError::ingestion_item(&path, other),
                    };
                    tracing::warn!("{}", error);
                    report.failed.push(FailedFile {
                        path,
                        error: error.to_string(),
                    });
                }
            }
        }

        report.duration_secs = started.elapsed().as_secs_f64();
        tracing::info!(
            processed = report.processed,
            failed = report.failed.len(),
            chunks_added = report.chunks_added,
            "Ingestion finished in {:.2}s",
            report.duration_secs
        );

        Ok(report)
    }

    /// Load, chunk and embed one file, then write its chunks in one call.
    ///
    /// Returns the number of chunks written.
    async fn ingest_file(&self, path: &Path) -> AppResult<usize> {
        tracing::debug!("Processing file: {:?}", path);

        let owned = path.to_path_buf();
        let units = tokio::task::spawn_blocking(move || load_document(&owned))
            .await
            .map_err(|e| AppError::Other(format!("Loader task failed: {}", e)))??;

        let chunks = self.chunker.split_all(&units);
        if chunks.is_empty() {
            tracing::warn!("No text extracted from {:?}", path);
            return Ok(0);
        }

        let mut embedded = Vec::with_capacity(chunks.len());
        for batch in chunks.chunks(self.batch_size) {
            let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
            let vectors = self.embedder.embed_batch(&texts).await?;
            if vectors.len() != batch.len() {
                return Err(AppError::Embedding(format!(
                    "Expected {} embeddings, got {}",
                    batch.len(),
                    vectors.len()
                )));
            }

            embedded.extend(
                batch
                    .iter()
                    .cloned()
                    .zip(vectors)
                    .map(|(chunk, embedding)| EmbeddedChunk { chunk, embedding }),
            );
        }

        let written = self.store.add_documents(&embedded).await?;
        tracing::debug!("Stored {} chunks from {:?}", written, path);
        Ok(written)
    }
}

/// Regular files directly inside `dir`, sorted by name, plus the entries
/// that could not be read.
///
/// Only a failure to read `dir` itself is an error.
fn list_files(dir: &Path) -> AppResult<(Vec<PathBuf>, Vec<FailedFile>)> {
    if !std::fs::metadata(dir)?.is_dir() {
        return Err(AppError::Config(format!("{:?} is not a directory", dir)));
    }

    let mut files = Vec::new();
    let mut unreadable = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        match entry {
            Ok(entry) => {
                if entry.file_type().is_file() {
                    files.push(entry.into_path());
                }
            }
            Err(e) if e.depth() == 0 => return Err(AppError::Io(e.into())),
            Err(e) => {
                let path = e
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| dir.to_path_buf());
                let error = AppError::ingestion_item(&path, AppError::Io(e.into()));
                tracing::warn!("{}", error);
                unreadable.push(FailedFile {
                    path,
                    error: error.to_string(),
                });
            }
        }
    }
    Ok((files, unreadable))
}
