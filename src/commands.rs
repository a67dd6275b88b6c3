use anyhow::{Context, Result, bail};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::chimerax::ChimeraxClient;
use crate::config::Config;
use crate::docs::{DocSearch, DocStore};
use crate::embeddings::{Embedder, OllamaClient};
use crate::mcp::McpServer;
use crate::mcp::tools::{
    ChimeraxRunHandler, ChimeraxStatusHandler, DocsLookupHandler, DocsSearchHandler,
};

fn load_config(data_dir: Option<PathBuf>) -> Result<Config> {
    let base_dir = match data_dir {
        Some(dir) => dir,
        None => crate::config::get_config_dir()
            .context("Failed to resolve configuration directory")?,
    };
    Config::load(base_dir)
}

fn build_ollama_client(config: &Config) -> Result<OllamaClient> {
    OllamaClient::new(config).context("Failed to create Ollama client")
}

async fn build_doc_search(
    config: &Config,
    docs_root: Option<PathBuf>,
    ollama: OllamaClient,
) -> Result<DocSearch> {
    let docs_path = config.docs_path(docs_root).ok_or_else(|| {
        anyhow::anyhow!(
            "Documentation root not configured. Pass --docs-root or set [docs] path in {}",
            config.config_file_path().display()
        )
    })?;

    let embedder: Arc<dyn Embedder> = Arc::new(ollama);
    let store = DocStore::new(&config.vector_database_path(), embedder).await?;

    Ok(DocSearch::new(docs_path, store, config.chunking.clone()))
}

/// Run the MCP server on stdio. The documentation index is built lazily on
/// the first docs tool call, so startup stays independent of corpus size.
#[inline]
pub async fn serve_mcp() -> Result<()> {
    let config = load_config(None)?;

    let search = Arc::new(build_doc_search(&config, None, build_ollama_client(&config)?).await?);
    let chimerax = Arc::new(
        ChimeraxClient::new(&config.chimerax).context("Failed to create ChimeraX client")?,
    );

    let server = McpServer::new(
        env!("CARGO_PKG_NAME").to_string(),
        env!("CARGO_PKG_VERSION").to_string(),
    );

    server
        .register_tool(
            DocsSearchHandler::tool_definition(),
            DocsSearchHandler::new(Arc::clone(&search)),
        )
        .await;
    server
        .register_tool(
            DocsLookupHandler::tool_definition(),
            DocsLookupHandler::new(Arc::clone(&search)),
        )
        .await;
    server
        .register_tool(
            ChimeraxRunHandler::tool_definition(),
            ChimeraxRunHandler::new(Arc::clone(&chimerax)),
        )
        .await;
    server
        .register_tool(
            ChimeraxStatusHandler::tool_definition(),
            ChimeraxStatusHandler::new(chimerax),
        )
        .await;

    info!("MCP server configured, serving on stdio");
    Arc::new(server).serve_stdio().await
}

/// Rebuild the documentation index from scratch
#[inline]
pub async fn index_docs(docs_root: Option<PathBuf>, data_dir: Option<PathBuf>) -> Result<()> {
    let config = load_config(data_dir)?;

    if let Some(root) = &docs_root {
        if !root.is_dir() {
            bail!("Documentation root not found: {}", root.display());
        }
    }

    // Indexing drops the existing table before re-embedding, so make sure
    // Ollama can actually serve embeddings before touching the store.
    let ollama = build_ollama_client(&config)?;
    ollama
        .health_check()
        .context("Ollama is not ready; existing index left untouched")?;

    let search = build_doc_search(&config, docs_root, ollama).await?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}").expect("valid progress template"),
    );
    spinner.set_message("Indexing ChimeraX documentation...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let stats = search.build_index().await;
    spinner.finish_and_clear();
    let stats = stats?;

    println!(
        "{} Indexed {} files into {} chunks",
        style("✓").green(),
        style(stats.files_processed).bold(),
        style(stats.chunks_created).bold()
    );
    Ok(())
}

/// Show index and ChimeraX connectivity status
#[inline]
pub async fn show_status() -> Result<()> {
    let config = load_config(None)?;

    println!("{}", style("Documentation index").bold());
    let search = match build_ollama_client(&config) {
        Ok(ollama) => build_doc_search(&config, None, ollama).await,
        Err(e) => Err(e),
    };
    match search {
        Ok(search) => {
            if search.is_indexed().await? {
                let count = search.chunk_count().await?;
                println!("  indexed: yes ({} chunks)", count);
            } else {
                println!("  indexed: no (run `chimerax-mcp index` or wait for first search)");
            }
        }
        Err(e) => println!("  unavailable: {:#}", e),
    }

    println!();
    println!("{}", style("Ollama").bold());
    match build_ollama_client(&config) {
        Ok(client) => match client.health_check() {
            Ok(()) => {
                println!("  reachable: yes");
                println!("  model: {}", config.ollama.model);
            }
            Err(e) => println!("  reachable: no ({:#})", e),
        },
        Err(e) => println!("  unavailable: {:#}", e),
    }

    println!();
    println!("{}", style("ChimeraX").bold());
    let chimerax =
        ChimeraxClient::new(&config.chimerax).context("Failed to create ChimeraX client")?;
    if chimerax.is_running() {
        let version = chimerax.version().unwrap_or_else(|_| "unknown".to_string());
        let models = chimerax.models().unwrap_or_default();
        println!("  running: yes");
        println!("  version: {}", version);
        println!("  open models: {}", models.len());
    } else {
        println!(
            "  running: no (start ChimeraX with `remotecontrol rest start port {} json true`)",
            config.chimerax.port
        );
    }

    Ok(())
}

/// Print the resolved configuration
#[inline]
pub fn show_config() -> Result<()> {
    let config = load_config(None)?;

    println!(
        "{} {}",
        style("Config file:").bold(),
        config.config_file_path().display()
    );
    println!();

    let rendered =
        toml::to_string_pretty(&config).context("Failed to serialize configuration")?;
    print!("{}", rendered);
    Ok(())
}
