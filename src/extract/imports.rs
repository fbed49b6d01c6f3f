//! Resolution of relative import specifiers to files on disk.

use std::path::{Component, Path, PathBuf};

/// Suffixes probed after the literal path, in order.
const PROBE_SUFFIXES: &[&str] = &[".ts", ".js", "/index.ts", "/index.js"];

/// Resolve `specifier` as imported from `importing_file`.
///
/// Only relative specifiers (starting with `.`) resolve. Candidates are the
/// literal path followed by [`PROBE_SUFFIXES`]; the first existing regular
/// file wins. Returns `None` when nothing matches.
pub fn resolve_import(importing_file: &Path, specifier: &str) -> Option<PathBuf> {
    if !specifier.starts_with('.') {
        return None;
    }

    let base_dir = importing_file.parent().unwrap_or_else(|| Path::new(""));
    let raw = normalize(&base_dir.join(specifier));

    std::iter::once(raw.clone())
        .chain(PROBE_SUFFIXES.iter().map(|suffix| {
            let mut candidate = raw.clone().into_os_string();
            candidate.push(suffix);
            PathBuf::from(candidate)
        }))
        .find(|candidate| candidate.is_file())
}

/// Lexically resolve `.` and `..` components without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}
