
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::docs::parser::ParsedPage;
use crate::docs::{Category, categorize_path, extract_command_name};

/// Configuration for splitting page text into chunks. Sizes are in
/// characters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Minimum chunk size; smaller sections and pieces are skipped
    pub min_chunk_size: usize,
    /// Maximum chunk size before splitting at paragraph boundaries
    pub max_chunk_size: usize,
    /// Nominal size of the paragraph carried into the next chunk when a
    /// section is split
    pub overlap_size: usize,
}

impl Default for ChunkingConfig {
    #[inline]
    fn default() -> Self {
        Self {
            min_chunk_size: 100,
            max_chunk_size: 1500,
            overlap_size: 100,
        }
    }
}

/// A chunk of documentation ready for embedding, with its page metadata
#[derive(Debug, Clone, PartialEq)]
pub struct DocChunk {
    /// The chunk text
    pub content: String,
    /// Path of the source page relative to the docs root
    pub source_file: String,
    /// Category derived from the source path
    pub category: Category,
    /// The page title
    pub title: String,
    /// Heading of the section this chunk came from, or the page title for
    /// content outside any heading
    pub section: String,
    /// Command documented by the page, empty for non-command pages
    pub command_name: String,
}

/// Split a parsed page into searchable chunks with metadata. Pages whose
/// sections are all below the minimum size produce a single whole-page chunk.
#[inline]
pub fn chunk_page(page: &ParsedPage, source_file: &str, config: &ChunkingConfig) -> Vec<DocChunk> {
    let category = categorize_path(Path::new(source_file));
    let command_name = extract_command_name(&page.title, category);

    let mut chunks = Vec::new();

    for section in &page.sections {
        if section.text.trim().chars().count() < config.min_chunk_size {
            continue;
        }

        let section_name = if section.heading.is_empty() {
            &page.title
        } else {
            &section.heading
        };

        for piece in split_large_text(&section.text, config.max_chunk_size) {
            let content = piece.trim();
            if content.chars().count() < config.min_chunk_size {
                continue;
            }

            chunks.push(DocChunk {
                content: content.to_string(),
                source_file: source_file.to_string(),
                category,
                title: page.title.clone(),
                section: section_name.clone(),
                command_name: command_name.clone(),
            });
        }
    }

    // Fall back to a single whole-page chunk so short pages stay searchable
    if chunks.is_empty() && !page.full_text.trim().is_empty() {
        chunks.push(DocChunk {
            content: page.full_text.trim().to_string(),
            source_file: source_file.to_string(),
            category,
            title: page.title.clone(),
            section: page.title.clone(),
            command_name,
        });
    }

    debug!("Chunked '{}' into {} chunks", source_file, chunks.len());

    chunks
}

/// Split text exceeding `max_size` characters into pieces at paragraph
/// boundaries. The paragraph that overflows a piece starts the next one. A
/// single paragraph longer than `max_size` is kept whole rather than
/// truncated.
#[inline]
pub fn split_large_text(text: &str, max_size: usize) -> Vec<String> {
    if text.chars().count() <= max_size {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_len = 0;

    for para in text.split('\n') {
        let para_len = para.chars().count() + 1;
        if current_len + para_len > max_size && !current.is_empty() {
            chunks.push(current.join("\n"));
            current = vec![para];
            current_len = para_len;
        } else {
            current.push(para);
            current_len += para_len;
        }
    }

    if !current.is_empty() {
        chunks.push(current.join("\n"));
    }

    chunks
}
