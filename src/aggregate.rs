//! Cross-file aggregation and router prefix resolution.
//!
//! Runs once after every file has been extracted. Files are folded in
//! discovery order, so the output depends only on that order and the file
//! contents.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::extract::FileExtract;
use crate::model::{AggregatedDocument, Middlewares, RouteDeclaration, ServerConfig};

/// Mount paths keyed by the file whose router is mounted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouterPrefixMap {
    prefixes: BTreeMap<PathBuf, Vec<String>>,
}

/// Direct mounts: a mounted file's `(mounting file, mount path)` pairs.
type MountEdges = BTreeMap<PathBuf, Vec<(PathBuf, String)>>;

impl RouterPrefixMap {
    /// Follow every file's mounts through its import table.
    ///
    /// A router mounted inside a mounted router gets every prefix of its
    /// parent joined onto its own mount path.
    pub fn build(extracts: &[FileExtract]) -> Self {
        let edges = mount_edges(extracts);
        let mut map = Self::default();
        for file in edges.keys() {
            let mut visiting = Vec::new();
            for prefix in full_prefixes(file, &edges, &mut visiting) {
                map.insert(file.clone(), &prefix);
            }
        }
        map
    }

    /// Record `prefix` for `file`, ignoring repeats.
    pub fn insert(&mut self, file: PathBuf, prefix: &str) {
        let prefixes = self.prefixes.entry(file).or_default();
        if !prefixes.iter().any(|p| p == prefix) {
            prefixes.push(prefix.to_string());
        }
    }

    pub fn get(&self, file: &Path) -> Option<&[String]> {
        self.prefixes.get(file).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    /// Rewrite route paths with their file's mount prefixes.
    ///
    /// A file mounted at several prefixes yields one copy of each route per
    /// prefix; unmapped routes pass through unchanged.
    pub fn apply(&self, routes: Vec<RouteDeclaration>) -> Vec<RouteDeclaration> {
        let mut updated = Vec::with_capacity(routes.len());
        for route in routes {
            match self.get(&route.source_file) {
                Some([single]) => updated.push(RouteDeclaration {
                    path: join_path(single, &route.path),
                    ..route
                }),
                Some(prefixes) if !prefixes.is_empty() => {
                    for prefix in prefixes {
                        updated.push(RouteDeclaration {
                            path: join_path(prefix, &route.path),
                            ..route.clone()
                        });
                    }
                }
                _ => updated.push(route),
            }
        }
        updated
    }
}

fn mount_edges(extracts: &[FileExtract]) -> MountEdges {
    let mut edges = MountEdges::new();
    for extract in extracts {
        for mount in &extract.mounts {
            match extract.imports.get(&mount.alias) {
                Some(target) => {
                    let parents = edges.entry(target.clone()).or_default();
                    if !parents
                        .iter()
                        .any(|(file, path)| *file == extract.file && *path == mount.path)
                    {
                        parents.push((extract.file.clone(), mount.path.clone()));
                    }
                }
                None => tracing::debug!(
                    "{}: mount {} is not an import, skipped",
                    extract.file.display(),
                    mount.alias
                ),
            }
        }
    }
    edges
}

/// Every absolute prefix of `file`, outermost mount first.
///
/// A parent already on the current chain is treated as unmounted, which
/// cuts mount cycles.
fn full_prefixes(file: &Path, edges: &MountEdges, visiting: &mut Vec<PathBuf>) -> Vec<String> {
    let Some(parents) = edges.get(file) else {
        return Vec::new();
    };
    visiting.push(file.to_path_buf());

    let mut prefixes = Vec::new();
    for (parent, path) in parents {
        let outer = if visiting.iter().any(|v| v == parent) {
            tracing::debug!("mount cycle through {}", parent.display());
            Vec::new()
        } else {
            full_prefixes(parent, edges, visiting)
        };
        if outer.is_empty() {
            prefixes.push(path.clone());
        } else {
            prefixes.extend(outer.iter().map(|o| join_path(o, path)));
        }
    }

    visiting.pop();
    prefixes
}

/// Join a mount prefix and a route path with exactly one `/` between them.
///
/// Only one trailing slash is stripped from the prefix; nothing else is
/// normalized.
pub fn join_path(prefix: &str, route_path: &str) -> String {
    let prefix = prefix.strip_suffix('/').unwrap_or(prefix);
    if route_path.starts_with('/') {
        format!("{}{}", prefix, route_path)
    } else {
        format!("{}/{}", prefix, route_path)
    }
}

/// Merge per-file extracts into the final document.
pub fn aggregate(extracts: &[FileExtract]) -> AggregatedDocument {
    let mut api_details: Option<ServerConfig> = None;
    let mut middlewares = Middlewares::default();

    for extract in extracts {
        if let Some(server) = &extract.server {
            merge_server(&mut api_details, server);
        }
        middlewares
            .global
            .extend(extract.middlewares.global.iter().cloned());
        for (name, paths) in &extract.middlewares.local {
            middlewares.local.insert(name.clone(), paths.clone());
        }
    }

    let prefix_map = RouterPrefixMap::build(extracts);
    if !prefix_map.is_empty() {
        tracing::debug!("{} file(s) mounted under a prefix", prefix_map.len());
    }
    let routes = extracts
        .iter()
        .flat_map(|e| e.routes.iter().cloned())
        .collect();

    AggregatedDocument {
        api_details,
        routes: prefix_map.apply(routes),
        middlewares,
    }
}

/// Later files overwrite earlier ones field by field.
fn merge_server(target: &mut Option<ServerConfig>, later: &ServerConfig) {
    let merged = target.get_or_insert_with(ServerConfig::default);
    merged.port_number = later.port_number.clone();
    merged.is_port_env = later.is_port_env;
    merged.host = later.host.clone();
    merged.backlog = later.backlog.clone();
}
