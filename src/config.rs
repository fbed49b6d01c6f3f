//! Configuration file schema for docly.
//!
//! The file is YAML; since JSON is valid YAML, a `doclyConfig.json` is read
//! the same way.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::error::DoclyError;

/// Config file names searched in the working directory, in order.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["docly.yaml", ".docly.yaml", "doclyConfig.json"];

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Path patterns to skip, matched against the path relative to the root.
    /// Plain patterns match as substrings; patterns containing `*`, `?` or
    /// `[` are globs.
    #[serde(default = "default_excluded")]
    pub excluded: Vec<String>,
    /// Follow `use("/prefix", router)` mounts into imported files.
    #[serde(default)]
    pub resolve_mounts: bool,
    #[serde(default)]
    pub framework: FrameworkConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            excluded: default_excluded(),
            resolve_mounts: false,
            framework: FrameworkConfig::default(),
        }
    }
}

fn default_excluded() -> Vec<String> {
    vec!["node_modules".to_string()]
}

/// Names of the framework factories that create apps and routers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FrameworkConfig {
    /// `express` in `const app = express()`.
    #[serde(default = "default_app_factory")]
    pub app_factory: String,
    /// `Router` in `const router = express.Router()`.
    #[serde(default = "default_router_factory")]
    pub router_factory: String,
}

impl Default for FrameworkConfig {
    fn default() -> Self {
        Self {
            app_factory: default_app_factory(),
            router_factory: default_router_factory(),
        }
    }
}

fn default_app_factory() -> String {
    "express".to_string()
}

fn default_router_factory() -> String {
    "Router".to_string()
}

impl Config {
    /// Parse a config from a YAML (or JSON) file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = Self::parse_str(&content).map_err(|source| DoclyError::InvalidConfig {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(config)
    }

    pub fn parse_str(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Load `explicit` if given, else the first default name present in
    /// `dir`, else defaults.
    pub fn load(explicit: Option<&Path>, dir: &Path) -> anyhow::Result<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit {
            return Ok((Self::parse_file(path)?, Some(path.to_path_buf())));
        }
        match discover(dir) {
            Some(path) => Ok((Self::parse_file(&path)?, Some(path))),
            None => Ok((Self::default(), None)),
        }
    }

    /// Check whether a root-relative path matches an exclusion pattern.
    pub fn is_path_excluded(&self, relative: &Path) -> bool {
        let path_str = relative.to_string_lossy();

        self.excluded.iter().any(|pattern| {
            if is_glob(pattern) {
                globset::Glob::new(pattern)
                    .map(|glob| glob.compile_matcher().is_match(&*path_str))
                    .unwrap_or(false)
            } else {
                path_str.contains(pattern.as_str())
            }
        })
    }
}

/// Find a config file in `dir`.
pub fn discover(dir: &Path) -> Option<PathBuf> {
    DEFAULT_CONFIG_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

fn is_glob(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}
