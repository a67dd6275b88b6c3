
use arrow::array::{
    Array, FixedSizeListArray, Float32Array, RecordBatchIterator, StringArray, UInt32Array,
};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use futures::TryStreamExt;
use lancedb::{
    Connection,
    query::{ExecutableQuery, QueryBase},
};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use crate::docs::{Category, DocChunk};
use crate::embeddings::Embedder;
use crate::{ChimeraxMcpError, Result};

const TABLE_NAME: &str = "chimerax_docs";

/// LanceDB-backed store for documentation chunks. Chunk text is embedded on
/// insert, and chunk metadata lives alongside the vectors in the same table.
pub struct DocStore {
    connection: Connection,
    embedder: Arc<dyn Embedder>,
    vector_dimension: usize,
}

/// One chunk returned from a search or lookup
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub content: String,
    pub source_file: String,
    pub category: String,
    pub title: String,
    pub section: String,
    pub command_name: String,
    /// Similarity to the query, 1.0 for exact lookups
    pub score: f32,
}

impl DocStore {
    /// Open (or create) the store at `data_dir` using `embedder` for both
    /// document and query vectors.
    #[inline]
    pub async fn new(data_dir: &Path, embedder: Arc<dyn Embedder>) -> Result<Self> {
        std::fs::create_dir_all(data_dir)?;

        let uri = format!("file://{}", data_dir.display());
        debug!("Connecting to LanceDB at {}", uri);

        let connection = lancedb::connect(&uri)
            .execute()
            .await
            .map_err(|e| ChimeraxMcpError::Store(format!("Failed to connect to LanceDB: {}", e)))?;

        let store = Self {
            vector_dimension: embedder.dimension(),
            connection,
            embedder,
        };

        store.ensure_table().await?;
        Ok(store)
    }

    /// Add chunks to the store under the given ids.
    ///
    /// Ids are not checked for collisions: callers assign them from a
    /// per-file ordinal and every rebuild starts from a cleared table, so
    /// uniqueness holds by construction.
    #[inline]
    pub async fn add_documents(&self, ids: &[String], chunks: &[DocChunk]) -> Result<()> {
        if chunks.is_empty() {
            return Ok(());
        }
        debug_assert_eq!(ids.len(), chunks.len());

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let vectors = self
            .embedder
            .embed(&texts)
            .map_err(|e| ChimeraxMcpError::Embedding(format!("Failed to embed chunks: {}", e)))?;

        // Insertion ordinal continues from the current row count so lookups
        // can return chunks in the order they were added
        let base_index = self.count().await? as u32;

        let batch = self.create_record_batch(ids, chunks, &vectors, base_index)?;
        let schema = batch.schema();
        let reader = RecordBatchIterator::new(std::iter::once(Ok(batch)), schema);

        let table = self.open_table().await?;
        table
            .add(reader)
            .execute()
            .await
            .map_err(|e| ChimeraxMcpError::Store(format!("Failed to insert chunks: {}", e)))?;

        debug!("Stored {} chunks", chunks.len());
        Ok(())
    }

    /// Similarity search over stored chunks, optionally restricted to one
    /// category. An empty store yields an empty result list, and the limit
    /// is clamped to the collection size.
    #[inline]
    pub async fn search(
        &self,
        query: &str,
        category: Option<Category>,
        max_results: usize,
    ) -> Result<Vec<SearchResult>> {
        let count = self.count().await?;
        let limit = max_results.min(count);
        if limit == 0 {
            return Ok(Vec::new());
        }

        let query_vector = self
            .embedder
            .embed(std::slice::from_ref(&query.to_string()))
            .map_err(|e| ChimeraxMcpError::Embedding(format!("Failed to embed query: {}", e)))?
            .pop()
            .ok_or_else(|| ChimeraxMcpError::Embedding("Embedder returned no vector".to_string()))?;

        let table = self.open_table().await?;
        let mut search = table
            .vector_search(query_vector)
            .map_err(|e| ChimeraxMcpError::Store(format!("Failed to build vector search: {}", e)))?
            .column("vector")
            .limit(limit);

        if let Some(category) = category {
            search = search.only_if(format!("category = '{}'", category.as_str()));
        }

        let stream = search
            .execute()
            .await
            .map_err(|e| ChimeraxMcpError::Store(format!("Failed to execute search: {}", e)))?;

        // Vector search results arrive ranked by distance
        Self::collect_results(stream, false).await
    }

    /// Exact-match lookup by command name, in insertion order
    #[inline]
    pub async fn lookup_command(&self, command_name: &str) -> Result<Vec<SearchResult>> {
        let count = self.count().await?;
        if count == 0 {
            return Ok(Vec::new());
        }

        let escaped = command_name.replace('\'', "''");
        let table = self.open_table().await?;
        let stream = table
            .query()
            .only_if(format!("command_name = '{}'", escaped))
            .limit(count)
            .execute()
            .await
            .map_err(|e| ChimeraxMcpError::Store(format!("Failed to execute lookup: {}", e)))?;

        Self::collect_results(stream, true).await
    }

    /// True iff the store contains at least one chunk
    #[inline]
    pub async fn is_indexed(&self) -> Result<bool> {
        Ok(self.count().await? > 0)
    }

    /// Number of chunks currently stored
    #[inline]
    pub async fn count(&self) -> Result<usize> {
        let table = self.open_table().await?;
        table
            .count_rows(None)
            .await
            .map_err(|e| ChimeraxMcpError::Store(format!("Failed to count rows: {}", e)))
    }

    /// Delete every chunk by dropping and recreating the table
    #[inline]
    pub async fn clear(&self) -> Result<()> {
        let table_names = self
            .connection
            .table_names()
            .execute()
            .await
            .map_err(|e| ChimeraxMcpError::Store(format!("Failed to list tables: {}", e)))?;

        if table_names.contains(&TABLE_NAME.to_string()) {
            self.connection
                .drop_table(TABLE_NAME)
                .await
                .map_err(|e| ChimeraxMcpError::Store(format!("Failed to drop table: {}", e)))?;
        }

        self.ensure_table().await?;
        info!("Cleared document store");
        Ok(())
    }

    async fn ensure_table(&self) -> Result<()> {
        let table_names = self
            .connection
            .table_names()
            .execute()
            .await
            .map_err(|e| ChimeraxMcpError::Store(format!("Failed to list tables: {}", e)))?;

        if table_names.contains(&TABLE_NAME.to_string()) {
            return Ok(());
        }

        self.connection
            .create_empty_table(TABLE_NAME, self.schema())
            .execute()
            .await
            .map_err(|e| ChimeraxMcpError::Store(format!("Failed to create table: {}", e)))?;

        debug!(
            "Created table '{}' with {} dimensions",
            TABLE_NAME, self.vector_dimension
        );
        Ok(())
    }

    async fn open_table(&self) -> Result<lancedb::Table> {
        self.connection
            .open_table(TABLE_NAME)
            .execute()
            .await
            .map_err(|e| ChimeraxMcpError::Store(format!("Failed to open table: {}", e)))
    }

    fn schema(&self) -> Arc<Schema> {
        Arc::new(Schema::new(vec![
            Field::new("id", DataType::Utf8, false),
            Field::new(
                "vector",
                DataType::FixedSizeList(
                    Arc::new(Field::new("item", DataType::Float32, false)),
                    self.vector_dimension as i32,
                ),
                false,
            ),
            Field::new("content", DataType::Utf8, false),
            Field::new("source_file", DataType::Utf8, false),
            Field::new("category", DataType::Utf8, false),
            Field::new("title", DataType::Utf8, false),
            Field::new("section", DataType::Utf8, false),
            Field::new("command_name", DataType::Utf8, false),
            Field::new("chunk_index", DataType::UInt32, false),
        ]))
    }

    fn create_record_batch(
        &self,
        ids: &[String],
        chunks: &[DocChunk],
        vectors: &[Vec<f32>],
        base_index: u32,
    ) -> Result<RecordBatch> {
        let len = chunks.len();
        let dim = self.vector_dimension;

        let mut flat_values = Vec::with_capacity(len * dim);
        for vector in vectors {
            if vector.len() != dim {
                return Err(ChimeraxMcpError::Embedding(format!(
                    "Embedder produced a {}-dimensional vector, expected {}",
                    vector.len(),
                    dim
                )));
            }
            flat_values.extend_from_slice(vector);
        }
        let field = Arc::new(Field::new("item", DataType::Float32, false));
        let vector_array =
            FixedSizeListArray::try_new(field, dim as i32, Arc::new(Float32Array::from(flat_values)), None)
                .map_err(|e| {
                    ChimeraxMcpError::Store(format!("Failed to build vector array: {}", e))
                })?;

        let id_values: Vec<&str> = ids.iter().map(String::as_str).collect();
        let contents: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        let source_files: Vec<&str> = chunks.iter().map(|c| c.source_file.as_str()).collect();
        let categories: Vec<&str> = chunks.iter().map(|c| c.category.as_str()).collect();
        let titles: Vec<&str> = chunks.iter().map(|c| c.title.as_str()).collect();
        let sections: Vec<&str> = chunks.iter().map(|c| c.section.as_str()).collect();
        let command_names: Vec<&str> = chunks.iter().map(|c| c.command_name.as_str()).collect();
        let chunk_indices: Vec<u32> = (0..len as u32).map(|i| base_index + i).collect();

        let arrays: Vec<Arc<dyn Array>> = vec![
            Arc::new(StringArray::from(id_values)),
            Arc::new(vector_array),
            Arc::new(StringArray::from(contents)),
            Arc::new(StringArray::from(source_files)),
            Arc::new(StringArray::from(categories)),
            Arc::new(StringArray::from(titles)),
            Arc::new(StringArray::from(sections)),
            Arc::new(StringArray::from(command_names)),
            Arc::new(UInt32Array::from(chunk_indices)),
        ];

        RecordBatch::try_new(self.schema(), arrays)
            .map_err(|e| ChimeraxMcpError::Store(format!("Failed to build record batch: {}", e)))
    }

    async fn collect_results(
        mut stream: lancedb::arrow::SendableRecordBatchStream,
        sort_by_insertion: bool,
    ) -> Result<Vec<SearchResult>> {
        let mut results: Vec<(u32, SearchResult)> = Vec::new();

        while let Some(batch) = stream
            .try_next()
            .await
            .map_err(|e| ChimeraxMcpError::Store(format!("Failed to read result stream: {}", e)))?
        {
            results.extend(Self::parse_batch(&batch)?);
        }

        if sort_by_insertion {
            results.sort_by_key(|(index, _)| *index);
        }

        Ok(results.into_iter().map(|(_, result)| result).collect())
    }

    fn parse_batch(batch: &RecordBatch) -> Result<Vec<(u32, SearchResult)>> {
        fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
            batch
                .column_by_name(name)
                .ok_or_else(|| ChimeraxMcpError::Store(format!("Missing {} column", name)))?
                .as_any()
                .downcast_ref::<StringArray>()
                .ok_or_else(|| ChimeraxMcpError::Store(format!("Invalid {} column type", name)))
        }

        let contents = string_column(batch, "content")?;
        let source_files = string_column(batch, "source_file")?;
        let categories = string_column(batch, "category")?;
        let titles = string_column(batch, "title")?;
        let sections = string_column(batch, "section")?;
        let command_names = string_column(batch, "command_name")?;

        let chunk_indices = batch
            .column_by_name("chunk_index")
            .ok_or_else(|| ChimeraxMcpError::Store("Missing chunk_index column".to_string()))?
            .as_any()
            .downcast_ref::<UInt32Array>()
            .ok_or_else(|| ChimeraxMcpError::Store("Invalid chunk_index column type".to_string()))?;

        let distances = batch
            .column_by_name("_distance")
            .and_then(|col| col.as_any().downcast_ref::<Float32Array>());

        let mut results = Vec::with_capacity(batch.num_rows());
        for row in 0..batch.num_rows() {
            let score = distances.map_or(1.0, |d| {
                if d.is_null(row) { 0.0 } else { 1.0 - d.value(row) }
            });

            results.push((
                chunk_indices.value(row),
                SearchResult {
                    content: contents.value(row).to_string(),
                    source_file: source_files.value(row).to_string(),
                    category: categories.value(row).to_string(),
                    title: titles.value(row).to_string(),
                    section: sections.value(row).to_string(),
                    command_name: command_names.value(row).to_string(),
                    score,
                },
            ));
        }

        Ok(results)
    }
}
