#![expect(
    clippy::tests_outside_test_module,
    reason = "integration tests are only compiled in test mode"
)]

//! End-to-end indexing tests over an on-disk documentation tree

use chimerax_mcp::config::Config;
use chimerax_mcp::docs::{Category, DocSearch, DocStore};
use chimerax_mcp::embeddings::Embedder;
use std::fs;
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

fn page(title: &str, body: &str) -> String {
    format!(
        "<html><head><title>{title}</title></head><body>\
         <h1>{title}</h1><p>{body}</p></body></html>"
    )
}

/// A small documentation tree shaped like a real ChimeraX install:
/// command pages, a tool page, a top-level concept page, and a devel page.
fn write_corpus(docs_root: &std::path::Path) {
    let commands = docs_root.join("user").join("commands");
    fs::create_dir_all(&commands).expect("should create commands dir");
    fs::write(
        commands.join("color.html"),
        page(
            "Command: color",
            "The color command assigns colors to atoms, bonds, cartoons and \
             molecular surfaces, by element, by chain, or with a named color.",
        ),
    )
    .expect("should write color page");
    fs::write(
        commands.join("open.html"),
        page(
            "Command: open",
            "The open command reads local files and fetches structures from \
             the Protein Data Bank by their four character identifier.",
        ),
    )
    .expect("should write open page");

    let tools = docs_root.join("user").join("tools");
    fs::create_dir_all(&tools).expect("should create tools dir");
    fs::write(
        tools.join("modelpanel.html"),
        page(
            "Model Panel",
            "The Model Panel is a table listing the models currently open in \
             the session, with buttons for showing, hiding and closing them.",
        ),
    )
    .expect("should write tool page");

    fs::write(
        docs_root.join("user").join("selection.html"),
        page(
            "Selection",
            "A selection designates the atoms, bonds and models that later \
             commands act on when given the sel keyword.",
        ),
    )
    .expect("should write concept page");

    let devel = docs_root.join("devel");
    fs::create_dir_all(&devel).expect("should create devel dir");
    fs::write(
        devel.join("bundles.html"),
        page(
            "Building Bundles",
            "Bundles extend ChimeraX with new commands, tools and file \
             formats. A bundle declares its contents in bundle metadata.",
        ),
    )
    .expect("should write devel page");

    // Not HTML, must be ignored by discovery
    fs::write(docs_root.join("notes.txt"), "scratch notes").expect("should write txt file");
}

async fn setup() -> (DocSearch, TempDir, TempDir) {
    let docs_dir = TempDir::new().expect("should create docs dir");
    let data_dir = TempDir::new().expect("should create data dir");
    write_corpus(docs_dir.path());

    let store = DocStore::new(data_dir.path(), Arc::new(HashEmbedder))
        .await
        .expect("should create store");
    let search = DocSearch::new(
        docs_dir.path().to_path_buf(),
        store,
        Config::default().chunking,
    );
    (search, docs_dir, data_dir)
}

#[tokio::test]
async fn indexes_nested_directories() {
    let (search, _docs_dir, _data_dir) = setup().await;

    let stats = search.build_index().await.expect("build should succeed");
    assert_eq!(stats.files_processed, 5, "txt file must not be counted");
    assert!(stats.chunks_created >= 5);
    assert_eq!(
        search.chunk_count().await.expect("count should succeed"),
        stats.chunks_created
    );
}

#[tokio::test]
async fn categories_follow_directory_layout() {
    let (search, _docs_dir, _data_dir) = setup().await;
    search.build_index().await.expect("build should succeed");

    let commands = search
        .search("color", Some(Category::Commands), 10)
        .await
        .expect("search should succeed");
    assert!(!commands.is_empty());
    assert!(commands.iter().all(|r| r.category == "commands"));

    let tools = search
        .search("model panel", Some(Category::Tools), 10)
        .await
        .expect("search should succeed");
    assert!(!tools.is_empty());
    assert!(
        tools
            .iter()
            .all(|r| r.source_file == "user/tools/modelpanel.html")
    );

    let devel = search
        .search("bundles", Some(Category::Devel), 10)
        .await
        .expect("search should succeed");
    assert!(!devel.is_empty());
    assert!(devel.iter().all(|r| r.source_file.starts_with("devel/")));
}

#[tokio::test]
async fn command_lookup_spans_only_that_commands_page() {
    let (search, _docs_dir, _data_dir) = setup().await;
    search.build_index().await.expect("build should succeed");

    let results = search.lookup("open").await.expect("lookup should succeed");
    assert!(!results.is_empty());
    assert!(
        results
            .iter()
            .all(|r| r.source_file == "user/commands/open.html")
    );

    // Tool and concept pages carry no command name
    let results = search
        .lookup("modelpanel")
        .await
        .expect("lookup should succeed");
    assert!(results.is_empty());
}

#[tokio::test]
async fn pages_without_structure_still_get_indexed() {
    let (search, docs_dir, _data_dir) = setup().await;

    // A page with no title, headings or paragraphs, just bare text
    fs::write(
        docs_dir.path().join("user").join("bare.html"),
        "<html><body>Bare text with no markup structure at all</body></html>",
    )
    .expect("should write bare page");

    let stats = search.build_index().await.expect("build should succeed");
    assert_eq!(stats.files_processed, 6);

    let results = search
        .search("bare text markup", Some(Category::Concepts), 10)
        .await
        .expect("search should succeed");
    assert!(
        results.iter().any(|r| r.source_file == "user/bare.html"),
        "whole-page fallback chunk should be searchable"
    );
}

#[tokio::test]
async fn rebuild_drops_deleted_pages() {
    let (search, docs_dir, _data_dir) = setup().await;
    search.build_index().await.expect("build should succeed");
    assert!(
        !search
            .lookup("open")
            .await
            .expect("lookup should succeed")
            .is_empty()
    );

    fs::remove_file(
        docs_dir
            .path()
            .join("user")
            .join("commands")
            .join("open.html"),
    )
    .expect("should remove page");

    let stats = search.build_index().await.expect("rebuild should succeed");
    assert_eq!(stats.files_processed, 4);
    assert!(
        search
            .lookup("open")
            .await
            .expect("lookup should succeed")
            .is_empty()
    );
}

#[tokio::test]
async fn empty_docs_tree_builds_an_empty_index() {
    let docs_dir = TempDir::new().expect("should create docs dir");
    let data_dir = TempDir::new().expect("should create data dir");

    let store = DocStore::new(data_dir.path(), Arc::new(HashEmbedder))
        .await
        .expect("should create store");
    let search = DocSearch::new(
        docs_dir.path().to_path_buf(),
        store,
        Config::default().chunking,
    );

    let stats = search.build_index().await.expect("build should succeed");
    assert_eq!(stats.files_processed, 0);
    assert_eq!(stats.chunks_created, 0);
    assert!(
        search
            .search("anything", None, 5)
            .await
            .expect("search should succeed")
            .is_empty()
    );
}
