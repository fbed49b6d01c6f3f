//! Integration tests for the full extraction pipeline.
//!
//! These tests run the runner against the testdata fixture app and against
//! small projects written to temporary directories.

use std::fs;
use std::path::{Path, PathBuf};

use docly::config::Config;
use docly::model::{HttpMethod, MiddlewarePath, ANONYMOUS_MIDDLEWARE};
use docly::syntax::Literal;
use docly::Runner;
use tempfile::TempDir;

fn fixture_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata/express_app")
}

fn write(root: &Path, rel: &str, content: &str) -> PathBuf {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, content).unwrap();
    path
}

fn paths(runner: Runner) -> Vec<String> {
    runner
        .run()
        .expect("run should succeed")
        .document
        .routes
        .into_iter()
        .map(|r| r.path)
        .collect()
}

// =============================================================================
// Fixture app
// =============================================================================

#[test]
fn test_fixture_discovery_skips_node_modules() {
    let output = Runner::new(fixture_root()).run().unwrap();
    assert_eq!(output.files.len(), 3, "files: {:?}", output.files);
    assert!(output
        .document
        .routes
        .iter()
        .all(|r| r.path != "/vendored"));
}

#[test]
fn test_fixture_routes_in_file_order() {
    let output = Runner::new(fixture_root()).run().unwrap();
    let routes = &output.document.routes;

    let summary: Vec<_> = routes
        .iter()
        .map(|r| (r.method, r.path.as_str(), r.router.as_deref()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (HttpMethod::Get, "/health", None),
            (HttpMethod::Get, "/", Some("router")),
            (HttpMethod::Get, "/:id", Some("router")),
            (HttpMethod::Post, "/", Some("router")),
            (HttpMethod::Delete, "/:id", Some("router")),
        ]
    );

    assert_eq!(routes[0].description.as_deref(), Some("Returns health status"));
    assert_eq!(routes[1].description.as_deref(), Some("Lists all users"));
    assert_eq!(routes[2].description, None);
    assert_eq!(routes[2].middleware, vec!["validateId"]);
    assert_eq!(routes[3].middleware, vec!["requireAuth", "validateBody"]);
    assert_eq!(routes[4].source_file, fixture_root().join("routes/users.ts"));
}

#[test]
fn test_fixture_server_and_middleware() {
    let doc = Runner::new(fixture_root()).run().unwrap().document;

    let details = doc.api_details.expect("listen() should be found");
    assert_eq!(details.port_number, Some(Literal::Int(4000)));
    assert!(details.is_port_env);
    assert_eq!(details.host, Some(Literal::Str("localhost".to_string())));
    assert_eq!(details.backlog, None);

    let global: Vec<_> = doc.middlewares.global.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(global, vec!["cors", ANONYMOUS_MIDDLEWARE]);
    assert_eq!(
        doc.middlewares.local["requireAuth"],
        vec![MiddlewarePath { path: "/admin".to_string() }]
    );
}

#[test]
fn test_fixture_mount_prefixes_behind_flag() {
    assert_eq!(
        paths(Runner::new(fixture_root())),
        vec!["/health", "/", "/:id", "/", "/:id"]
    );
    assert_eq!(
        paths(Runner::new(fixture_root()).resolve_mounts(true)),
        vec!["/health", "/users/", "/users/:id", "/users/", "/users/:id"]
    );
}

#[test]
fn test_mount_flag_from_config() {
    let config = Config::parse_str("resolve_mounts: true").unwrap();
    let routes = paths(Runner::new(fixture_root()).with_config(config));
    assert_eq!(routes[2], "/users/:id");
}

// =============================================================================
// Temporary projects
// =============================================================================

#[test]
fn test_two_file_end_to_end() {
    let temp = TempDir::new().unwrap();
    let app = write(
        temp.path(),
        "a.js",
        r#"
const express = require('express');
const server = express();
const port = process.env.PORT || 4000;

server.get("/health", handler);
server.listen(port, "localhost");
"#,
    );
    write(
        temp.path(),
        "b.js",
        r#"
function helper() {
  return 42;
}
module.exports = helper;
"#,
    );

    let output = Runner::new(temp.path()).run().unwrap();
    assert_eq!(output.files.len(), 2);

    let json = serde_json::to_value(&output.document).unwrap();
    assert_eq!(
        json["apiDetails"],
        serde_json::json!({
            "portNumber": 4000,
            "isPortEnv": true,
            "host": "localhost",
            "backlog": null
        })
    );
    assert_eq!(
        json["routes"],
        serde_json::json!([{
            "path": "/health",
            "method": "get",
            "router": null,
            "sourceFile": app.to_string_lossy(),
            "middleware": [],
            "description": null
        }])
    );
}

#[test]
fn test_double_mount_duplicates_routes() {
    let temp = TempDir::new().unwrap();
    write(
        temp.path(),
        "app.ts",
        r#"
import express from 'express';
import v1 from './api';
const app = express();
app.use('/v1', v1);
app.use('/v2/', v1);
"#,
    );
    let api = write(
        temp.path(),
        "api/index.ts",
        r#"
import express from 'express';
const router = express.Router();
router.get('/items', list);
export default router;
"#,
    );

    let doc = Runner::new(temp.path()).resolve_mounts(true).run().unwrap().document;
    let routes: Vec<_> = doc.routes.iter().map(|r| r.path.as_str()).collect();
    assert_eq!(routes, vec!["/v1/items", "/v2/items"]);
    assert!(doc.routes.iter().all(|r| r.source_file == api));
}

#[test]
fn test_nested_router_mount_prefixes() {
    let temp = TempDir::new().unwrap();
    write(
        temp.path(),
        "app.js",
        "const app = express();\nconst api = require('./api');\napp.use('/api', api);\n",
    );
    write(
        temp.path(),
        "api.js",
        "const router = express.Router();\nconst users = require('./users');\nrouter.use('/users', users);\nrouter.get('/status', status);\nmodule.exports = router;\n",
    );
    write(
        temp.path(),
        "users.js",
        "const router = express.Router();\nrouter.get('/:id', show);\nmodule.exports = router;\n",
    );

    let mounted = paths(Runner::new(temp.path()).resolve_mounts(true));
    assert_eq!(mounted, vec!["/api/status", "/api/users/:id"]);

    let plain = paths(Runner::new(temp.path()));
    assert_eq!(plain, vec!["/status", "/:id"]);
}

#[test]
fn test_malformed_file_does_not_abort_run() {
    let temp = TempDir::new().unwrap();
    write(
        temp.path(),
        "app.js",
        "const app = express();\napp.get('/fine', ok);\n",
    );
    write(
        temp.path(),
        "broken.js",
        "const = = ;;\nfunction (\n  app.get('/x'",
    );

    let output = Runner::new(temp.path()).run().expect("malformed input must not fail the run");
    assert!(output.document.routes.iter().any(|r| r.path == "/fine"));
}

#[test]
fn test_server_config_last_file_wins() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "a.js", "const app = express();\napp.listen(3000, '0.0.0.0', 100);\n");
    write(temp.path(), "b.js", "const app = express();\napp.listen(8080);\n");

    let details = Runner::new(temp.path()).run().unwrap().document.api_details.unwrap();
    assert_eq!(details.port_number, Some(Literal::Int(8080)));
    assert_eq!(details.host, None);
    assert_eq!(details.backlog, None);
}
