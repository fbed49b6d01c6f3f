//! Grammar selection and parsing.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tree_sitter::{Language, Parser};

use super::{lower, Statement};
use crate::error::DoclyError;

/// Source languages docly reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceLanguage {
    JavaScript,
    TypeScript,
}

impl SourceLanguage {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "js" => Some(SourceLanguage::JavaScript),
            "ts" => Some(SourceLanguage::TypeScript),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceLanguage::JavaScript => "javascript",
            SourceLanguage::TypeScript => "typescript",
        }
    }

    fn grammar(&self) -> Language {
        match self {
            SourceLanguage::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            SourceLanguage::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        }
    }
}

/// A parsed tree together with the bytes it was parsed from.
pub struct ParsedFile {
    pub tree: tree_sitter::Tree,
    pub source: Vec<u8>,
    pub path: PathBuf,
    pub language: SourceLanguage,
}

impl ParsedFile {
    /// Get text for a tree-sitter node.
    pub fn node_text(&self, node: tree_sitter::Node) -> &str {
        node.utf8_text(&self.source).unwrap_or("")
    }

    /// Whether error recovery kicked in anywhere in the tree.
    pub fn has_errors(&self) -> bool {
        self.tree.root_node().has_error()
    }

    /// Lower the tree into statements, in source order.
    pub fn statements(&self) -> Vec<Statement> {
        lower::statements(self)
    }
}

/// Parse in-memory source. The language is chosen from `path`'s extension.
///
/// Malformed source still yields a tree; only an unknown extension or a
/// grammar load failure is an error.
pub fn parse_source(path: &Path, source: &[u8]) -> Result<ParsedFile, DoclyError> {
    let language = SourceLanguage::from_path(path)
        .ok_or_else(|| DoclyError::UnsupportedLanguage(path.to_path_buf()))?;

    let mut parser = Parser::new();
    parser.set_language(&language.grammar())?;
    let tree = parser
        .parse(source, None)
        .ok_or_else(|| DoclyError::ParseAborted(path.to_path_buf()))?;

    Ok(ParsedFile {
        tree,
        source: source.to_vec(),
        path: path.to_path_buf(),
        language,
    })
}

/// Read and parse a file from disk.
pub fn parse_file(path: &Path) -> anyhow::Result<ParsedFile> {
    let source = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let parsed = parse_source(path, &source)?;
    tracing::debug!("{}: parsed as {}", path.display(), parsed.language.as_str());
    if parsed.has_errors() {
        tracing::debug!("{}: syntax errors, extracting from partial tree", path.display());
    }
    Ok(parsed)
}
