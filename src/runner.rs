//! Run orchestration: discover files, extract each one, aggregate.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::aggregate::aggregate;
use crate::config::Config;
use crate::extract::{extract_file, ExtractOptions, FileExtract};
use crate::model::AggregatedDocument;
use crate::syntax::{self, SourceLanguage};

/// Result of a complete run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub files: Vec<PathBuf>,
    pub document: AggregatedDocument,
}

/// Extracts an API document from every source file under a root directory.
pub struct Runner {
    root: PathBuf,
    config: Config,
}

impl Runner {
    /// Create a runner with default configuration.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            config: Config::default(),
        }
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Enable or disable mount prefix resolution, overriding the config.
    pub fn resolve_mounts(mut self, enabled: bool) -> Self {
        self.config.resolve_mounts = enabled;
        self
    }

    fn options(&self) -> ExtractOptions {
        ExtractOptions {
            resolve_mounts: self.config.resolve_mounts,
            framework: self.config.framework.clone(),
        }
    }

    /// Source files under the root, in a stable order.
    ///
    /// Entries are sorted by name within each directory. Excluded paths are
    /// pruned before descending.
    pub fn collect_files(&self) -> anyhow::Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        let walker = WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                let relative = e.path().strip_prefix(&self.root).unwrap_or(e.path());
                relative.as_os_str().is_empty() || !self.config.is_path_excluded(relative)
            });

        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if SourceLanguage::from_path(path).is_some() {
                files.push(path.to_path_buf());
            }
        }

        Ok(files)
    }

    /// Parse and extract the given files one after another.
    pub fn extract_files(&self, files: &[PathBuf]) -> anyhow::Result<Vec<FileExtract>> {
        let options = self.options();
        let mut extracts = Vec::with_capacity(files.len());
        for file in files {
            let parsed = syntax::parse_file(file)?;
            let extract = extract_file(&parsed, &options);
            tracing::debug!(
                "{}: {} route(s), {} binding(s)",
                file.display(),
                extract.routes.len(),
                extract.bindings.len()
            );
            extracts.push(extract);
        }
        Ok(extracts)
    }

    /// Discover, extract and aggregate.
    pub fn run(&self) -> anyhow::Result<RunOutput> {
        let files = self.collect_files()?;
        let extracts = self.extract_files(&files)?;
        let document = aggregate(&extracts);
        tracing::info!(
            "extracted {} route(s) from {} file(s)",
            document.routes.len(),
            files.len()
        );
        Ok(RunOutput { files, document })
    }
}
