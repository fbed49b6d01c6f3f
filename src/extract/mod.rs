//! Per-file extraction of Express API facts.
//!
//! Each file is processed on its own: statements are visited in source
//! order, declarations grow the [`BindingTable`], imports grow the alias
//! table, and call statements are classified by the matcher against
//! whatever has been declared up to that point.
//!
//! Lookups that cannot be satisfied (forward references, non-literal values,
//! unresolvable imports, unrecognized call shapes) produce `None` or nothing
//! at all. Extraction itself never fails.

mod bindings;
mod imports;
mod matcher;

pub use bindings::{Binding, BindingTable, Role};
pub use imports::resolve_import;
pub use matcher::{description, DESCRIPTION_MARKER};

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::config::FrameworkConfig;
use crate::model::{Middlewares, Mount, RouteDeclaration, ServerConfig};
use crate::syntax::{Expr, ParsedFile, Statement};

/// Knobs for a single extraction pass.
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Record `use("/prefix", router)` mounts for cross-file prefixing.
    pub resolve_mounts: bool,
    pub framework: FrameworkConfig,
}

/// Everything extracted from one file.
#[derive(Debug, Clone)]
pub struct FileExtract {
    pub file: PathBuf,
    /// Import alias to resolved absolute file path.
    pub imports: BTreeMap<String, PathBuf>,
    pub mounts: Vec<Mount>,
    /// Set by the last `listen` call in the file.
    pub server: Option<ServerConfig>,
    pub routes: Vec<RouteDeclaration>,
    pub middlewares: Middlewares,
    pub bindings: BindingTable,
}

impl FileExtract {
    /// Create an empty extract for a file.
    pub fn new(file: PathBuf) -> Self {
        Self {
            file,
            imports: BTreeMap::new(),
            mounts: Vec::new(),
            server: None,
            routes: Vec::new(),
            middlewares: Middlewares::default(),
            bindings: BindingTable::new(),
        }
    }

    fn record_import(&mut self, alias: &str, source: &str) {
        match resolve_import(&self.file, source) {
            Some(target) => {
                self.imports.insert(alias.to_string(), target);
            }
            None => {
                tracing::debug!("{}: import {:?} not resolved", self.file.display(), source);
            }
        }
    }
}

/// Extract all facts from a parsed file.
pub fn extract_file(parsed: &ParsedFile, options: &ExtractOptions) -> FileExtract {
    let mut out = FileExtract::new(parsed.path.clone());
    let mut table = BindingTable::new();

    for statement in parsed.statements() {
        match statement {
            Statement::Import { alias, source } => out.record_import(&alias, &source),
            Statement::Declaration { name, init } => {
                if let Some(source) = init.as_ref().and_then(require_source) {
                    out.record_import(&name, source);
                }
                table.declare(&name, init.as_ref(), &options.framework);
            }
            Statement::Call {
                call,
                leading_comments,
                line,
            } => {
                let before = out.routes.len();
                matcher::match_call(&call, &leading_comments, &table, options, &mut out);
                if out.routes.len() > before {
                    tracing::debug!("{}:{}: route recorded", out.file.display(), line);
                }
            }
        }
    }

    out.bindings = table;
    out
}

/// Convenience for callers holding raw source rather than a parsed tree.
pub fn extract_source(
    path: &Path,
    source: &str,
    options: &ExtractOptions,
) -> anyhow::Result<FileExtract> {
    let parsed = crate::syntax::parse_source(path, source.as_bytes())?;
    Ok(extract_file(&parsed, options))
}

/// `require("./x")` initializers act as imports.
fn require_source(init: &Expr) -> Option<&str> {
    let Expr::Call(call) = init else {
        return None;
    };
    match (call.callee.as_identifier(), call.args.as_slice()) {
        (Some("require"), [arg]) => arg.as_string_literal(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::HttpMethod;
    use crate::syntax::Literal;
    use std::fs;
    use tempfile::TempDir;

    fn extract(source: &str) -> FileExtract {
        extract_source(Path::new("/srv/app.js"), source, &ExtractOptions::default()).unwrap()
    }

    #[test]
    fn test_env_port_and_health_route() {
        let out = extract(
            r#"
const express = require('express');
const app = express();
const port = process.env.PORT || 4000;

app.get('/health', (req, res) => res.send('ok'));
app.listen(port, 'localhost');
"#,
        );

        let server = out.server.as_ref().unwrap();
        assert_eq!(server.port_number, Some(Literal::Int(4000)));
        assert!(server.is_port_env);
        assert_eq!(server.host, Some(Literal::Str("localhost".to_string())));
        assert_eq!(server.backlog, None);

        assert_eq!(out.routes.len(), 1);
        assert_eq!(out.routes[0].path, "/health");
        assert_eq!(out.routes[0].method, HttpMethod::Get);
        assert_eq!(out.routes[0].source_file, PathBuf::from("/srv/app.js"));
    }

    #[test]
    fn test_forward_reference_is_unresolved() {
        let out = extract(
            r#"
const app = express();
app.listen(port);
const port = 8080;
"#,
        );
        let server = out.server.unwrap();
        assert_eq!(server.port_number, None);
        assert!(!server.is_port_env);
        assert_eq!(out.bindings.lookup("port").unwrap().value, Some(Literal::Int(8080)));
    }

    #[test]
    fn test_role_must_precede_use() {
        let out = extract("app.get('/early', h);\nconst app = express();\napp.get('/late', h);");
        let paths: Vec<_> = out.routes.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["/late"]);
    }

    #[test]
    fn test_description_marker() {
        let out = extract(
            r#"
const app = express();
// --Docly-- Returns health status
app.get('/health', handler);
"#,
        );
        assert_eq!(out.routes[0].description.as_deref(), Some("Returns health status"));
    }

    #[test]
    fn test_malformed_source_does_not_error() {
        let result = extract_source(
            Path::new("/srv/broken.ts"),
            "const app = express();\napp.get('/ok', h);\napp.post('/broken', (req, res => {\n",
            &ExtractOptions::default(),
        );
        let out = result.expect("malformed source must still extract");
        assert!(out.routes.iter().any(|r| r.path == "/ok"));
    }

    #[test]
    fn test_imports_and_require_resolve() {
        let temp = TempDir::new().unwrap();
        let app = temp.path().join("app.ts");
        fs::create_dir_all(temp.path().join("routes")).unwrap();
        fs::write(temp.path().join("routes/users.ts"), "").unwrap();
        fs::write(temp.path().join("orders.js"), "").unwrap();
        let source = r#"
import express from 'express';
import users from './routes/users';
const orders = require('./orders');
"#;
        fs::write(&app, source).unwrap();

        let out = extract_source(&app, source, &ExtractOptions::default()).unwrap();
        assert_eq!(out.imports.len(), 2);
        assert_eq!(out.imports["users"], temp.path().join("routes/users.ts"));
        assert_eq!(out.imports["orders"], temp.path().join("orders.js"));
    }

    #[test]
    fn test_nested_statements_are_visited() {
        let out = extract(
            r#"
const router = express.Router();
function register() {
  router.delete('/items/:id', requireAuth, remove);
}
"#,
        );
        assert_eq!(out.routes.len(), 1);
        assert_eq!(out.routes[0].router.as_deref(), Some("router"));
        assert_eq!(out.routes[0].middleware, vec!["requireAuth"]);
    }
}
