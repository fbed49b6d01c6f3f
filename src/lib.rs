//! Docly - API documentation from Express application sources.
//!
//! Docly reads JavaScript and TypeScript files, finds the Express app and
//! its routers, and reconstructs the HTTP surface: routes, middleware and
//! the `listen()` configuration. Nothing is executed; everything comes from
//! the syntax tree.
//!
//! # Architecture
//!
//! - `syntax`: tree-sitter parsing and lowering into a typed statement model
//! - `extract`: per-file bindings, import resolution and call-site matching
//! - `aggregate`: cross-file merge and router mount prefixing
//! - `runner`: file discovery and the sequential extraction pipeline
//! - `report`: JSON, HTML and terminal output
//! - `config`: YAML/JSON configuration

pub mod aggregate;
pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod model;
pub mod report;
pub mod runner;
pub mod syntax;

pub use aggregate::{aggregate, join_path, RouterPrefixMap};
pub use config::Config;
pub use error::DoclyError;
pub use extract::{extract_file, extract_source, ExtractOptions, FileExtract};
pub use model::{AggregatedDocument, HttpMethod, RouteDeclaration, ServerConfig};
pub use runner::{RunOutput, Runner};
