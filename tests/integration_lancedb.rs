#![expect(
    clippy::tests_outside_test_module,
    reason = "integration tests are only compiled in test mode"
)]

//! Integration tests for the LanceDB-backed document store

use chimerax_mcp::docs::{Category, DocChunk, DocStore};
use chimerax_mcp::embeddings::Embedder;
use std::sync::Arc;
use tempfile::TempDir;

/// Deterministic embedder so tests run without a model server
struct HashEmbedder;

impl Embedder for HashEmbedder {
    fn embed(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|text| {
                let mut vector = vec![0.0_f32; 8];
                for word in text.split_whitespace() {
                    let mut hash: u32 = 2_166_136_261;
                    for byte in word.bytes() {
                        hash = (hash ^ u32::from(byte)).wrapping_mul(16_777_619);
                    }
                    vector[(hash % 8) as usize] += 1.0;
                }
                let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
                if norm > 0.0 {
                    for x in &mut vector {
                        *x /= norm;
                    }
                }
                vector
            })
            .collect())
    }

    fn dimension(&self) -> usize {
        8
    }
}

fn command_chunk(content: &str, command_name: &str, section: &str) -> DocChunk {
    DocChunk {
        content: content.to_string(),
        source_file: format!("user/commands/{command_name}.html"),
        category: Category::Commands,
        title: format!("Command: {command_name}"),
        section: section.to_string(),
        command_name: command_name.to_string(),
    }
}

fn concept_chunk(content: &str, title: &str) -> DocChunk {
    DocChunk {
        content: content.to_string(),
        source_file: "user/selection.html".to_string(),
        category: Category::Concepts,
        title: title.to_string(),
        section: title.to_string(),
        command_name: String::new(),
    }
}

#[tokio::test]
async fn store_persists_across_reopens() {
    let temp_dir = TempDir::new().expect("should create temp dir");

    {
        let store = DocStore::new(temp_dir.path(), Arc::new(HashEmbedder))
            .await
            .expect("should create store");
        store
            .add_documents(
                &["user/commands/color.html#0".to_string()],
                &[command_chunk(
                    "The color command assigns colors to atoms and cartoons",
                    "color",
                    "Coloring",
                )],
            )
            .await
            .expect("add should succeed");
        assert_eq!(store.count().await.expect("count should succeed"), 1);
    }

    // A second store over the same directory sees the same table
    let reopened = DocStore::new(temp_dir.path(), Arc::new(HashEmbedder))
        .await
        .expect("should reopen store");
    assert!(
        reopened
            .is_indexed()
            .await
            .expect("is_indexed should succeed")
    );
    assert_eq!(reopened.count().await.expect("count should succeed"), 1);

    let results = reopened
        .lookup_command("color")
        .await
        .expect("lookup should succeed");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].title, "Command: color");
    assert_eq!(results[0].section, "Coloring");
    assert_eq!(results[0].source_file, "user/commands/color.html");
}

#[tokio::test]
async fn lookup_preserves_order_across_batches() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let store = DocStore::new(temp_dir.path(), Arc::new(HashEmbedder))
        .await
        .expect("should create store");

    // Two add calls, as the indexer issues one per source file
    store
        .add_documents(
            &[
                "user/commands/color.html#0".to_string(),
                "user/commands/color.html#1".to_string(),
            ],
            &[
                command_chunk("Usage overview for the color command", "color", "Usage"),
                command_chunk("Palette options for the color command", "color", "Palettes"),
            ],
        )
        .await
        .expect("first add should succeed");
    store
        .add_documents(
            &["user/commands/color.html#2".to_string()],
            &[command_chunk(
                "Examples of coloring by attribute value",
                "color",
                "Examples",
            )],
        )
        .await
        .expect("second add should succeed");

    let results = store
        .lookup_command("color")
        .await
        .expect("lookup should succeed");
    assert_eq!(results.len(), 3);
    let sections: Vec<&str> = results.iter().map(|r| r.section.as_str()).collect();
    assert_eq!(sections, ["Usage", "Palettes", "Examples"]);
}

#[tokio::test]
async fn search_limit_caps_result_count() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let store = DocStore::new(temp_dir.path(), Arc::new(HashEmbedder))
        .await
        .expect("should create store");

    let chunks: Vec<DocChunk> = (0..6)
        .map(|i| concept_chunk(&format!("Selection concepts part {i}"), "Selection"))
        .collect();
    let ids: Vec<String> = (0..6).map(|i| format!("user/selection.html#{i}")).collect();
    store
        .add_documents(&ids, &chunks)
        .await
        .expect("add should succeed");

    let results = store
        .search("selecting atoms", None, 3)
        .await
        .expect("search should succeed");
    assert_eq!(results.len(), 3);

    // Scores come back as similarity, highest first
    for pair in results.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[tokio::test]
async fn category_filter_excludes_other_categories() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let store = DocStore::new(temp_dir.path(), Arc::new(HashEmbedder))
        .await
        .expect("should create store");

    store
        .add_documents(
            &["a#0".to_string(), "b#0".to_string()],
            &[
                command_chunk(
                    "Select atoms by name with the select command",
                    "select",
                    "Usage",
                ),
                concept_chunk("Selection persists across commands", "Selection"),
            ],
        )
        .await
        .expect("add should succeed");

    let results = store
        .search("selection", Some(Category::Commands), 5)
        .await
        .expect("search should succeed");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].category, "commands");
    assert_eq!(results[0].command_name, "select");
}

#[tokio::test]
async fn clear_then_reindex_starts_ordinals_over() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let store = DocStore::new(temp_dir.path(), Arc::new(HashEmbedder))
        .await
        .expect("should create store");

    store
        .add_documents(
            &["old#0".to_string()],
            &[command_chunk("Old content to be replaced", "color", "Old")],
        )
        .await
        .expect("add should succeed");
    store.clear().await.expect("clear should succeed");

    store
        .add_documents(
            &["new#0".to_string(), "new#1".to_string()],
            &[
                command_chunk("New first chunk", "color", "First"),
                command_chunk("New second chunk", "color", "Second"),
            ],
        )
        .await
        .expect("add after clear should succeed");

    let results = store
        .lookup_command("color")
        .await
        .expect("lookup should succeed");
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].section, "First");
    assert_eq!(results[1].section, "Second");
}
