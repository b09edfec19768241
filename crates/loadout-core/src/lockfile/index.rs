//! Bare-name lookup index over lockfile libraries.
//!
//! Built once per parsed lockfile so the resolver never scans the library
//! map per lookup. Keys follow the `name/version` convention.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::diagnostics::Diagnostics;
use crate::lockfile::model::{Lockfile, KEY_SEPARATOR};

/// Maps a bare package name to its versioned library key(s).
#[derive(Debug)]
pub struct NameIndex {
    entries: HashMap<String, Vec<IndexedKey>>,
}

#[derive(Debug)]
struct IndexedKey {
    key: String,
    version: String,
}

impl NameIndex {
    /// Index every key in `libraries`. Buckets are sorted highest version
    /// first so ambiguous lookups have a defined winner.
    pub fn build(lockfile: &Lockfile) -> Self {
        let mut entries: HashMap<String, Vec<IndexedKey>> = HashMap::new();
        for key in lockfile.libraries.keys() {
            let (name, version) = key
                .split_once(KEY_SEPARATOR)
                .unwrap_or((key.as_str(), ""));
            entries.entry(name.to_string()).or_default().push(IndexedKey {
                key: key.clone(),
                version: version.to_string(),
            });
        }
        for bucket in entries.values_mut() {
            bucket.sort_by(|a, b| {
                compare_versions(&b.version, &a.version).then_with(|| b.key.cmp(&a.key))
            });
        }
        Self { entries }
    }

    /// Resolve a bare package name to its versioned key.
    ///
    /// When several versions of one name exist, the highest wins and the
    /// ambiguity is reported once. Returns `None` for unknown names; whether
    /// that is an inconsistency is the caller's call.
    pub fn resolve(&self, name: &str, diagnostics: &Diagnostics) -> Option<&str> {
        let bucket = self.entries.get(name)?;
        if bucket.len() > 1 {
            diagnostics.warn_once(format!(
                "multiple library entries for package {name}; using {}",
                bucket[0].key
            ));
        }
        Some(&bucket[0].key)
    }
}

/// Compare two version strings: semver when both parse, lexicographic
/// fallback otherwise.
fn compare_versions(a: &str, b: &str) -> Ordering {
    match (semver::Version::parse(a), semver::Version::parse(b)) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        _ => a.cmp(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn lockfile_with_libraries(keys: &[&str]) -> Lockfile {
        let mut libraries = serde_json::Map::new();
        for key in keys {
            libraries.insert((*key).to_string(), serde_json::json!({ "type": "package" }));
        }
        let text = serde_json::json!({
            "targets": {},
            "libraries": libraries,
            "packageFolders": {},
            "project": { "frameworks": {} }
        })
        .to_string();
        Lockfile::parse(Path::new("test.assets.json"), &text).unwrap()
    }

    #[test]
    fn test_resolve_single_version() {
        let lockfile = lockfile_with_libraries(&["Foo/1.0.0"]);
        let index = NameIndex::build(&lockfile);
        let (diagnostics, sink) = Diagnostics::collecting();

        assert_eq!(index.resolve("Foo", &diagnostics), Some("Foo/1.0.0"));
        assert!(sink.messages().is_empty());
    }

    #[test]
    fn test_resolve_unknown_name() {
        let lockfile = lockfile_with_libraries(&["Foo/1.0.0"]);
        let index = NameIndex::build(&lockfile);
        let (diagnostics, _) = Diagnostics::collecting();

        assert_eq!(index.resolve("Bar", &diagnostics), None);
    }

    #[test]
    fn test_ambiguity_picks_highest_semver_and_warns_once() {
        let lockfile = lockfile_with_libraries(&["Foo/2.0.0", "Foo/10.0.0", "Foo/9.1.0"]);
        let index = NameIndex::build(&lockfile);
        let (diagnostics, sink) = Diagnostics::collecting();

        assert_eq!(index.resolve("Foo", &diagnostics), Some("Foo/10.0.0"));
        assert_eq!(index.resolve("Foo", &diagnostics), Some("Foo/10.0.0"));
        assert_eq!(sink.messages().len(), 1);
    }

    #[test]
    fn test_non_semver_versions_fall_back_to_lexicographic() {
        let lockfile = lockfile_with_libraries(&["Foo/beta", "Foo/alpha"]);
        let index = NameIndex::build(&lockfile);
        let (diagnostics, _) = Diagnostics::collecting();

        assert_eq!(index.resolve("Foo", &diagnostics), Some("Foo/beta"));
    }
}
