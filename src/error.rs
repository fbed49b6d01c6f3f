//! Typed errors for configuration-level failures.
//!
//! Anything below configuration level (unresolved bindings, unmatched call
//! shapes, missing import targets) is expressed as `None` rather than an
//! error; see the `extract` module.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a run.
#[derive(Error, Debug)]
pub enum DoclyError {
    #[error("no source folder given")]
    MissingRoot,
    #[error("folder not found: {0}")]
    RootNotFound(PathBuf),
    #[error("invalid config {path}: {source}")]
    InvalidConfig {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("unsupported source file: {0}")]
    UnsupportedLanguage(PathBuf),
    #[error("failed to load grammar: {0}")]
    Grammar(#[from] tree_sitter::LanguageError),
    #[error("parser produced no tree for {0}")]
    ParseAborted(PathBuf),
}
