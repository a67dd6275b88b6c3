
use anyhow::{Context, Result, bail};
use std::path::PathBuf;
use tracing::{info, warn};

use crate::docs::chunker::{ChunkingConfig, chunk_page};
use crate::docs::parser::parse_page;
use crate::docs::store::{DocStore, SearchResult};
use crate::docs::{Category, discover_html_files};

/// Aggregate counts from one index build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexStats {
    /// Number of HTML files discovered, including any that failed to parse
    pub files_processed: usize,
    /// Number of chunks added to the store
    pub chunks_created: usize,
}

/// Orchestrates indexing and retrieval over the ChimeraX documentation tree.
///
/// One instance is constructed at startup and shared by all tool handlers;
/// the index itself is built lazily via [`ensure_index`](Self::ensure_index).
/// Rebuilds are not locked against concurrent readers, so a search racing a
/// rebuild may briefly observe a partially repopulated store.
pub struct DocSearch {
    docs_path: PathBuf,
    store: DocStore,
    chunking: ChunkingConfig,
}

impl DocSearch {
    #[inline]
    pub fn new(docs_path: PathBuf, store: DocStore, chunking: ChunkingConfig) -> Self {
        Self {
            docs_path,
            store,
            chunking,
        }
    }

    /// Rebuild the index from scratch: clear the store, then parse and chunk
    /// every HTML file under the documentation root in sorted order. A file
    /// that cannot be read is logged and skipped; a missing root fails
    /// before any store state is touched.
    #[inline]
    pub async fn build_index(&self) -> Result<IndexStats> {
        if !self.docs_path.is_dir() {
            bail!(
                "Documentation root not found: {}",
                self.docs_path.display()
            );
        }

        self.store.clear().await?;

        let html_files = discover_html_files(&self.docs_path);
        let mut chunks_created = 0;

        for html_file in &html_files {
            let relative = html_file
                .strip_prefix(&self.docs_path)
                .unwrap_or(html_file)
                .to_string_lossy()
                .replace('\\', "/");

            let bytes = match std::fs::read(html_file) {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!("Failed to read {}, skipping: {}", relative, e);
                    continue;
                }
            };
            let html = String::from_utf8_lossy(&bytes);

            let page = parse_page(&html);
            let chunks = chunk_page(&page, &relative, &self.chunking);
            if chunks.is_empty() {
                continue;
            }

            let ids: Vec<String> = (0..chunks.len())
                .map(|i| format!("{}#{}", relative, i))
                .collect();

            self.store
                .add_documents(&ids, &chunks)
                .await
                .with_context(|| format!("Failed to store chunks for {}", relative))?;
            chunks_created += chunks.len();
        }

        info!(
            "Indexed {} files, {} chunks",
            html_files.len(),
            chunks_created
        );
        Ok(IndexStats {
            files_processed: html_files.len(),
            chunks_created,
        })
    }

    /// Semantic search over indexed documentation
    #[inline]
    pub async fn search(
        &self,
        query: &str,
        category: Option<Category>,
        max_results: usize,
    ) -> Result<Vec<SearchResult>> {
        Ok(self.store.search(query, category, max_results).await?)
    }

    /// All chunks documenting the given command, in document order
    #[inline]
    pub async fn lookup(&self, command_name: &str) -> Result<Vec<SearchResult>> {
        Ok(self.store.lookup_command(command_name).await?)
    }

    #[inline]
    pub async fn is_indexed(&self) -> Result<bool> {
        Ok(self.store.is_indexed().await?)
    }

    /// Number of chunks currently indexed
    #[inline]
    pub async fn chunk_count(&self) -> Result<usize> {
        Ok(self.store.count().await?)
    }

    /// Build the index if it has not been built yet
    #[inline]
    pub async fn ensure_index(&self) -> Result<()> {
        if !self.is_indexed().await? {
            info!("Index not found, building");
            self.build_index()
                .await
                .context("Failed to build documentation index")?;
        }
        Ok(())
    }
}
