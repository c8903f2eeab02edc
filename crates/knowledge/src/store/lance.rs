//! LanceDB-backed vector store.

use super::VectorStore;
use crate::types::{Chunk, EmbeddedChunk, Metadata, ScoreKind, ScoredChunk};
use arrow_array::{
    Array, FixedSizeListArray, Float32Array, RecordBatch, RecordBatchIterator, StringArray,
};
use arrow_schema::{DataType, Field, Schema, SchemaRef};
use async_trait::async_trait;
use docqa_core::{AppError, AppResult, SimilarityMetric};
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{Connection, DistanceType, Table};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

const VECTOR_COLUMN: &str = "vector";
const DISTANCE_COLUMN: &str = "_distance";

/// Persistent store backed by a single LanceDB table.
///
/// The table is created on the first write, so a fresh database reports
/// "not ready" until something has been ingested. Scores are LanceDB
/// distances for every metric: lower is better.
pub struct LanceDbStore {
    conn: Connection,
    collection: String,
    dimensions: usize,
    metric: SimilarityMetric,
    table: RwLock<Option<Table>>,
}

impl LanceDbStore {
    /// Connect to the database at `db_path`, opening `collection` if it exists.
    pub async fn open(
        db_path: &str,
        collection: &str,
        dimensions: usize,
        metric: SimilarityMetric,
    ) -> AppResult<Self> {
        if is_local_path(db_path) {
            std::fs::create_dir_all(Path::new(db_path)).map_err(|e| {
                AppError::Store(format!("Failed to create store directory {}: {}", db_path, e))
            })?;
        }

        let conn = lancedb::connect(db_path)
            .execute()
            .await
            .map_err(|e| AppError::Store(format!("Failed to connect to LanceDB: {}", e)))?;

        let store = Self {
            conn,
            collection: collection.to_string(),
            dimensions,
            metric,
            table: RwLock::new(None),
        };

        let table = store.open_existing().await?;
        tracing::debug!(
            path = db_path,
            collection,
            exists = table.is_some(),
            "Opened LanceDB store"
        );
        *store.table.write().await = table;

        Ok(store)
    }

    async fn open_existing(&self) -> AppResult<Option<Table>> {
        let names = self
            .conn
            .table_names()
            .execute()
            .await
            .map_err(|e| AppError::Store(format!("Failed to list tables: {}", e)))?;

        if !names.contains(&self.collection) {
            return Ok(None);
        }

        let table = self
            .conn
            .open_table(&self.collection)
            .execute()
            .await
            .map_err(|e| AppError::Store(format!("Failed to open table: {}", e)))?;
        Ok(Some(table))
    }

    /// Current table handle, picking up a table created by another process.
    async fn current_table(&self) -> AppResult<Option<Table>> {
        if let Some(table) = self.table.read().await.as_ref() {
            return Ok(Some(table.clone()));
        }

        let mut slot = self.table.write().await;
        if slot.is_none() {
            *slot = self.open_existing().await?;
        }
        Ok(slot.clone())
    }

    fn schema(&self) -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("id", DataType::Utf8, false),
            Field::new("text", DataType::Utf8, false),
            Field::new("metadata", DataType::Utf8, false),
            Field::new(
                VECTOR_COLUMN,
                DataType::FixedSizeList(
                    Arc::new(Field::new("item", DataType::Float32, true)),
                    self.dimensions as i32,
                ),
                false,
            ),
        ]))
    }

    fn to_batch(&self, chunks: &[EmbeddedChunk]) -> AppResult<RecordBatch> {
        let mut ids = Vec::with_capacity(chunks.len());
        let mut texts = Vec::with_capacity(chunks.len());
        let mut metadata = Vec::with_capacity(chunks.len());
        let mut values = Vec::with_capacity(chunks.len() * self.dimensions);

        for entry in chunks {
            if entry.embedding.len() != self.dimensions {
                return Err(AppError::Store(format!(
                    "Embedding dimension mismatch: expected {}, got {}",
                    self.dimensions,
                    entry.embedding.len()
                )));
            }
            ids.push(entry.chunk.id.as_str());
            texts.push(entry.chunk.text.as_str());
            metadata.push(serde_json::to_string(&entry.chunk.metadata)?);
            values.extend_from_slice(&entry.embedding);
        }

        let vectors = FixedSizeListArray::try_new(
            Arc::new(Field::new("item", DataType::Float32, true)),
            self.dimensions as i32,
            Arc::new(Float32Array::from(values)),
            None,
        )
        .map_err(|e| AppError::Store(format!("Failed to build vector column: {}", e)))?;

        RecordBatch::try_new(
            self.schema(),
            vec![
                Arc::new(StringArray::from(ids)),
                Arc::new(StringArray::from(texts)),
                Arc::new(StringArray::from(metadata)),
                Arc::new(vectors),
            ],
        )
        .map_err(|e| AppError::Store(format!("Failed to build record batch: {}", e)))
    }

    fn distance_type(&self) -> DistanceType {
        match self.metric {
            SimilarityMetric::L2 => DistanceType::L2,
            SimilarityMetric::Cosine => DistanceType::Cosine,
            SimilarityMetric::InnerProduct => DistanceType::Dot,
        }
    }
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> AppResult<&'a StringArray> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .ok_or_else(|| AppError::Retrieval(format!("Missing or invalid column '{}'", name)))
}

fn batch_to_scored(batch: &RecordBatch) -> AppResult<Vec<ScoredChunk>> {
    let ids = string_column(batch, "id")?;
    let texts = string_column(batch, "text")?;
    let metadata = string_column(batch, "metadata")?;
    let distances = batch
        .column_by_name(DISTANCE_COLUMN)
        .and_then(|c| c.as_any().downcast_ref::<Float32Array>())
        .ok_or_else(|| AppError::Retrieval("Search result has no distance column".to_string()))?;

    (0..batch.num_rows())
        .map(|i| -> AppResult<ScoredChunk> {
            let meta: Metadata = serde_json::from_str(metadata.value(i))?;
            Ok(ScoredChunk {
                chunk: Chunk {
                    id: ids.value(i).to_string(),
                    text: texts.value(i).to_string(),
                    metadata: meta,
                },
                vector_score: distances.value(i),
                score_kind: ScoreKind::Distance,
            })
        })
        .collect()
}

#[async_trait]
impl VectorStore for LanceDbStore {
    fn backend_name(&self) -> &str {
        "lancedb"
    }

    fn score_kind(&self) -> ScoreKind {
        ScoreKind::Distance
    }

    async fn add_documents(&self, chunks: &[EmbeddedChunk]) -> AppResult<usize> {
        if chunks.is_empty() {
            return Ok(0);
        }

        let batch = self.to_batch(chunks)?;
        let schema = batch.schema();
        let mut slot = self.table.write().await;

        if slot.is_none() {
            *slot = self.open_existing().await?;
        }

        match slot.as_ref() {
            Some(table) => {
                table
                    .add(RecordBatchIterator::new(vec![Ok(batch)], schema))
                    .execute()
                    .await
                    .map_err(|e| AppError::Store(format!("Failed to add chunks: {}", e)))?;
            }
            None => {
                let table = self
                    .conn
                    .create_table(
                        &self.collection,
                        RecordBatchIterator::new(vec![Ok(batch)], schema),
                    )
                    .execute()
                    .await
                    .map_err(|e| AppError::Store(format!("Failed to create table: {}", e)))?;
                tracing::info!(collection = %self.collection, "Created LanceDB table");
                *slot = Some(table);
            }
        }

        Ok(chunks.len())
    }

    async fn similarity_search(&self, query: &[f32], k: usize) -> AppResult<Vec<ScoredChunk>> {
        let table = self.current_table().await?.ok_or_else(|| {
            AppError::StoreNotReady(format!("collection '{}' does not exist", self.collection))
        })?;

        let rows = table
            .count_rows(None)
            .await
            .map_err(|e| AppError::Retrieval(format!("Failed to count rows: {}", e)))?;
        if rows == 0 {
            return Err(AppError::StoreNotReady(format!(
                "collection '{}' is empty",
                self.collection
            )));
        }

        let batches = table
            .query()
            .nearest_to(query.to_vec())
            .map_err(|e| AppError::Retrieval(format!("Invalid query vector: {}", e)))?
            .column(VECTOR_COLUMN)
            .distance_type(self.distance_type())
            .limit(k)
            .execute()
            .await
            .map_err(|e| AppError::Retrieval(format!("Search failed: {}", e)))?
            .try_collect::<Vec<_>>()
            .await
            .map_err(|e| AppError::Retrieval(format!("Failed to read results: {}", e)))?;

        let mut results = Vec::with_capacity(k);
        for batch in &batches {
            results.extend(batch_to_scored(batch)?);
        }
        results.truncate(k);

        Ok(results)
    }

    async fn count(&self) -> AppResult<usize> {
        match self.current_table().await? {
            Some(table) => table
                .count_rows(None)
                .await
                .map_err(|e| AppError::Store(format!("Failed to count rows: {}", e))),
            None => Ok(0),
        }
    }
}

/// False for object-store URIs such as `s3://bucket/db`.
fn is_local_path(db_path: &str) -> bool {
    !db_path.contains("://")
}
