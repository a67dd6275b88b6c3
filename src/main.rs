use chimerax_mcp::commands::{index_docs, serve_mcp, show_config, show_status};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "chimerax-mcp")]
#[command(about = "MCP server for ChimeraX documentation search and command execution")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start MCP server on stdio
    Serve,
    /// Build (or rebuild) the documentation index
    Index {
        /// Root directory of the ChimeraX HTML documentation
        #[arg(long)]
        docs_root: Option<PathBuf>,
        /// Override the directory holding the config file and vector database
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Show index and ChimeraX connectivity status
    Status,
    /// Show the resolved configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries the MCP protocol stream.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve => {
            serve_mcp().await?;
        }
        Commands::Index {
            docs_root,
            data_dir,
        } => {
            index_docs(docs_root, data_dir).await?;
        }
        Commands::Status => {
            show_status().await?;
        }
        Commands::Config => {
            show_config()?;
        }
    }

    Ok(())
}
