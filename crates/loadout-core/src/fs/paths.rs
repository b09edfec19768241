//! Path conversion and normalization.
//!
//! Lockfiles and project descriptors record paths with either separator
//! convention; everything is converted to the host convention before any
//! filesystem probe.

use std::path::{Component, Path, PathBuf};

/// Convert a logical path using either separator convention into a native
/// path.
pub fn to_native(raw: &str) -> PathBuf {
    let mut path = if raw.starts_with('/') || raw.starts_with('\\') {
        PathBuf::from(std::path::MAIN_SEPARATOR_STR)
    } else {
        PathBuf::new()
    };
    for part in raw.split(['/', '\\']).filter(|part| !part.is_empty()) {
        path.push(part);
    }
    path
}

/// Lexically normalize a path: drop `.` components and fold `..` into the
/// preceding component where one exists.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // Keep leading `..` on relative paths; `/..` collapses to `/`.
                if !out.pop() && out.as_os_str().is_empty() {
                    out.push(Component::ParentDir);
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Resolve `raw` against `base` and normalize the result.
pub fn absolutize(base: &Path, raw: &str) -> PathBuf {
    let native = to_native(raw);
    if native.is_absolute() {
        normalize(&native)
    } else {
        normalize(&base.join(native))
    }
}

/// Canonical form of a path, for cache and visited-set keys.
///
/// Falls back to a lexical normalization against the current directory when
/// the file does not exist (yet), so keys stay stable either way.
pub fn canonicalize_lenient(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| {
        if path.is_absolute() {
            normalize(path)
        } else {
            match std::env::current_dir() {
                Ok(cwd) => normalize(&cwd.join(path)),
                Err(_) => normalize(path),
            }
        }
    })
}
