//! Typed lockfile model and parser.
//!
//! The lockfile is the resolved-dependency artifact produced by the package
//! manager: exact versions, per-target compile file sets, and full file
//! manifests per package. Parsing is purely structural; semantic gaps
//! (missing paths, absent entries) are handled downstream by the resolver.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ResolveError;

/// Entry kind eligible for resolution; project-type entries are skipped.
pub const PACKAGE_KIND: &str = "package";

/// Separator between package name and version in lockfile keys.
pub const KEY_SEPARATOR: char = '/';

/// In-memory representation of a lockfile.
///
/// Top-level sections are required; everything below them tolerates partial
/// information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lockfile {
    /// Per-framework view of resolved packages, keyed `name/version`.
    pub targets: BTreeMap<String, BTreeMap<String, TargetLibrary>>,

    /// Global manifest of every resolved package, keyed `name/version`.
    pub libraries: BTreeMap<String, LibraryEntry>,

    /// Package probe roots, in declaration order; first existing file wins.
    #[serde(rename = "packageFolders", with = "package_folders")]
    pub package_folders: Vec<PathBuf>,

    /// Declared (non-transitive) project dependencies.
    pub project: ProjectSection,
}

impl Lockfile {
    /// Parse lockfile text. `path` labels errors only; no I/O happens here.
    pub fn parse(path: &Path, text: &str) -> Result<Self, ResolveError> {
        serde_json::from_str(text).map_err(|source| ResolveError::MalformedLockfile {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read and parse a lockfile from disk.
    pub fn load(path: &Path) -> Result<Self, ResolveError> {
        let text = std::fs::read_to_string(path).map_err(|source| ResolveError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &text)
    }
}

/// A resolved package node inside one target framework.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetLibrary {
    #[serde(rename = "type")]
    pub kind: String,

    /// Files usable at compile time, keyed by relative path.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub compile: BTreeMap<String, CompileAsset>,

    /// Outgoing edges: package name to resolved version.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dependencies: BTreeMap<String, String>,
}

impl TargetLibrary {
    pub fn is_package(&self) -> bool {
        self.kind == PACKAGE_KIND
    }
}

/// Properties attached to a compile-time asset. Only the key (the file path)
/// matters for resolution; properties ride along for round-tripping.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompileAsset {
    #[serde(flatten)]
    pub properties: BTreeMap<String, serde_json::Value>,
}

/// Global manifest of one resolved package.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryEntry {
    #[serde(rename = "type")]
    pub kind: String,

    /// Package subfolder under a package-folder root. A missing path is a
    /// valid state; the resolver skips such packages with a diagnostic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Every file shipped by the package.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<String>,
}

impl LibraryEntry {
    pub fn is_package(&self) -> bool {
        self.kind == PACKAGE_KIND
    }
}

/// The `project` section; only `frameworks` is relevant here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSection {
    pub frameworks: BTreeMap<String, FrameworkSection>,
}

/// One framework's declared dependencies.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrameworkSection {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dependencies: BTreeMap<String, FrameworkDependency>,
}

/// A declared direct dependency of the project.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameworkDependency {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Implicitly added by tooling; its full file manifest must always be
    /// included in resolution output.
    #[serde(default)]
    pub auto_referenced: bool,
}

/// `packageFolders` is an object whose keys are the probe roots. Declaration
/// order is semantic (probe order), so the keys are kept as an ordered list
/// instead of a sorted map.
mod package_folders {
    use std::path::PathBuf;

    use serde::de::{MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserializer, Serializer};

    use crate::fs::to_native;

    #[derive(serde::Serialize)]
    struct Empty {}

    pub fn serialize<S: Serializer>(
        folders: &[PathBuf],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(folders.len()))?;
        for folder in folders {
            map.serialize_entry(folder, &Empty {})?;
        }
        map.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<PathBuf>, D::Error> {
        struct FoldersVisitor;

        impl<'de> Visitor<'de> for FoldersVisitor {
            type Value = Vec<PathBuf>;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("a map keyed by package folder paths")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut folders = Vec::new();
                while let Some((key, _)) =
                    map.next_entry::<String, serde::de::IgnoredAny>()?
                {
                    folders.push(to_native(&key));
                }
                Ok(folders)
            }
        }

        deserializer.deserialize_map(FoldersVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn minimal() -> &'static str {
        r#"{
            "targets": {
                "net8.0": {
                    "Newtonsoft.Json/13.0.3": {
                        "type": "package",
                        "compile": { "lib/net6.0/Newtonsoft.Json.dll": {} },
                        "dependencies": { "System.Memory": "4.5.5" }
                    }
                }
            },
            "libraries": {
                "Newtonsoft.Json/13.0.3": {
                    "type": "package",
                    "path": "newtonsoft.json/13.0.3",
                    "files": ["lib/net6.0/Newtonsoft.Json.dll"]
                }
            },
            "packageFolders": {
                "/home/user/.nuget/packages": {},
                "/usr/share/dotnet/packs": {}
            },
            "project": {
                "frameworks": {
                    "net8.0": {
                        "dependencies": {
                            "Newtonsoft.Json": { "target": "Package", "version": "[13.0.3, )" }
                        }
                    }
                }
            }
        }"#
    }

    #[test]
    fn test_parse_minimal_lockfile() {
        let lockfile = Lockfile::parse(Path::new("test.assets.json"), minimal()).unwrap();

        let target = &lockfile.targets["net8.0"]["Newtonsoft.Json/13.0.3"];
        assert!(target.is_package());
        assert_eq!(target.compile.len(), 1);
        assert_eq!(target.dependencies["System.Memory"], "4.5.5");

        let library = &lockfile.libraries["Newtonsoft.Json/13.0.3"];
        assert_eq!(library.path.as_deref(), Some("newtonsoft.json/13.0.3"));
        assert_eq!(library.files.len(), 1);

        let framework = &lockfile.project.frameworks["net8.0"];
        assert!(!framework.dependencies["Newtonsoft.Json"].auto_referenced);
    }

    #[test]
    fn test_package_folders_keep_declaration_order() {
        let lockfile = Lockfile::parse(Path::new("test.assets.json"), minimal()).unwrap();
        assert_eq!(
            lockfile.package_folders,
            vec![
                PathBuf::from("/home/user/.nuget/packages"),
                PathBuf::from("/usr/share/dotnet/packs"),
            ]
        );
    }

    #[test]
    fn test_optional_fields_default() {
        let text = r#"{
            "targets": { "net8.0": { "Bare/1.0.0": { "type": "package" } } },
            "libraries": { "Bare/1.0.0": { "type": "package" } },
            "packageFolders": {},
            "project": { "frameworks": { "net8.0": {} } }
        }"#;
        let lockfile = Lockfile::parse(Path::new("test.assets.json"), text).unwrap();

        let target = &lockfile.targets["net8.0"]["Bare/1.0.0"];
        assert!(target.compile.is_empty());
        assert!(target.dependencies.is_empty());

        let library = &lockfile.libraries["Bare/1.0.0"];
        assert!(library.path.is_none());
        assert!(library.files.is_empty());

        assert!(lockfile.project.frameworks["net8.0"].dependencies.is_empty());
    }

    #[test]
    fn test_missing_required_section_is_malformed() {
        for section in ["targets", "libraries", "packageFolders", "project"] {
            let mut value: serde_json::Value = serde_json::from_str(minimal()).unwrap();
            value.as_object_mut().unwrap().remove(section);
            let text = value.to_string();

            let err = Lockfile::parse(Path::new("test.assets.json"), &text).unwrap_err();
            assert!(
                matches!(err, ResolveError::MalformedLockfile { .. }),
                "removing {section} should be a malformed-lockfile error"
            );
        }
    }

    #[test]
    fn test_missing_frameworks_is_malformed() {
        let mut value: serde_json::Value = serde_json::from_str(minimal()).unwrap();
        value["project"].as_object_mut().unwrap().remove("frameworks");
        let err =
            Lockfile::parse(Path::new("test.assets.json"), &value.to_string()).unwrap_err();
        assert!(matches!(err, ResolveError::MalformedLockfile { .. }));
    }

    #[test]
    fn test_not_json_is_malformed() {
        let err = Lockfile::parse(Path::new("test.assets.json"), "not json").unwrap_err();
        assert!(matches!(err, ResolveError::MalformedLockfile { .. }));
    }

    #[test]
    fn test_roundtrip_preserves_structure() {
        let lockfile = Lockfile::parse(Path::new("test.assets.json"), minimal()).unwrap();
        let reserialized = serde_json::to_string(&lockfile).unwrap();
        let reparsed = Lockfile::parse(Path::new("test.assets.json"), &reserialized).unwrap();

        assert_eq!(
            lockfile.targets.keys().collect::<Vec<_>>(),
            reparsed.targets.keys().collect::<Vec<_>>()
        );
        for (framework, packages) in &lockfile.targets {
            let reparsed_packages = &reparsed.targets[framework];
            for (key, target) in packages {
                let other = &reparsed_packages[key];
                assert_eq!(target.kind, other.kind);
                assert_eq!(
                    target.compile.keys().collect::<Vec<_>>(),
                    other.compile.keys().collect::<Vec<_>>()
                );
                assert_eq!(target.dependencies, other.dependencies);
            }
        }
        assert_eq!(
            lockfile.libraries.keys().collect::<Vec<_>>(),
            reparsed.libraries.keys().collect::<Vec<_>>()
        );
        assert_eq!(lockfile.package_folders, reparsed.package_folders);
    }
}
