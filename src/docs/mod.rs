// ChimeraX documentation indexing and retrieval
// Parses the installed HTML manual, chunks it, and serves semantic search

pub mod chunker;
pub mod parser;
pub mod search;
pub mod store;


pub use chunker::{ChunkingConfig, DocChunk};
pub use search::{DocSearch, IndexStats};
pub use store::{DocStore, SearchResult};

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use fancy_regex::Regex;
use walkdir::WalkDir;

/// Topic category assigned to a documentation page from its location in the
/// docs tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Commands,
    Tools,
    Tutorials,
    Concepts,
    Devel,
    Other,
}

impl Category {
    #[inline]
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Commands => "commands",
            Category::Tools => "tools",
            Category::Tutorials => "tutorials",
            Category::Concepts => "concepts",
            Category::Devel => "devel",
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "commands" => Ok(Category::Commands),
            "tools" => Ok(Category::Tools),
            "tutorials" => Ok(Category::Tutorials),
            "concepts" => Ok(Category::Concepts),
            "devel" => Ok(Category::Devel),
            "other" => Ok(Category::Other),
            unknown => Err(format!("Unknown category: {}", unknown)),
        }
    }
}

/// Determine the category of a doc file from its path relative to the docs
/// root.
#[inline]
pub fn categorize_path(relative_path: &Path) -> Category {
    let parts: Vec<&str> = relative_path
        .iter()
        .filter_map(|part| part.to_str())
        .collect();

    if parts.len() >= 2 && parts[0] == "user" {
        return match parts[1] {
            "commands" => Category::Commands,
            "tools" => Category::Tools,
            "tutorials" => Category::Tutorials,
            _ => Category::Concepts,
        };
    }

    if parts.first() == Some(&"devel") {
        return Category::Devel;
    }

    Category::Other
}

static COMMAND_TITLE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Command:\s*(\w+)").expect("valid regex"));

/// Extract the primary command name from a page title. Command pages in the
/// ChimeraX manual are titled "Command: <name>". Returns an empty string for
/// pages outside the commands category.
#[inline]
pub fn extract_command_name(title: &str, category: Category) -> String {
    if category != Category::Commands {
        return String::new();
    }

    COMMAND_TITLE_PATTERN
        .captures(title)
        .ok()
        .flatten()
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Find all HTML files under the docs root, sorted for deterministic
/// indexing order.
#[inline]
pub fn discover_html_files(docs_path: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(docs_path)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(|path| {
            path.extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("html"))
        })
        .collect();
    files.sort();
    files
}
