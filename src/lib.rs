use thiserror::Error;

pub type Result<T> = std::result::Result<T, ChimeraxMcpError>;

#[derive(Error, Debug)]
pub enum ChimeraxMcpError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Vector store error: {0}")]
    Store(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub mod chimerax;
pub mod commands;
pub mod config;
pub mod docs;
pub mod embeddings;
pub mod mcp;
