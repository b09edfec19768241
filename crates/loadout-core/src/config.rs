//! Resolver configuration.
//!
//! Every defaultable knob lives here, with the defaults enumerated once in
//! the `Default` impl. Frontends may load overrides from a `loadout.toml`.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Relative location of the lockfile next to a project descriptor.
const DEFAULT_LOCKFILE_PATH: &str = "obj/project.assets.json";

/// Tunables for lockfile and project-graph resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ResolverConfig {
    /// Lockfile location, relative to the descriptor's directory.
    pub lockfile_path: PathBuf,

    /// File extensions considered binary references (lowercase, with dot).
    pub binary_extensions: Vec<String>,

    /// Build output directory name under a project's directory.
    pub output_dir: PathBuf,

    /// Subdirectory of `output_dir` used for synthesized placeholder paths
    /// when no built binary exists yet.
    pub placeholder_dir: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            lockfile_path: PathBuf::from(DEFAULT_LOCKFILE_PATH),
            binary_extensions: vec![".dll".to_string()],
            output_dir: PathBuf::from("bin"),
            placeholder_dir: "placeholder".to_string(),
        }
    }
}

impl ResolverConfig {
    /// Whether `file` carries one of the configured binary extensions.
    pub fn is_binary(&self, file: &str) -> bool {
        let file = file.to_ascii_lowercase();
        self.binary_extensions.iter().any(|ext| file.ends_with(ext))
    }

    /// The extension used when deriving build-output binary names.
    pub fn binary_extension(&self) -> &str {
        self.binary_extensions
            .first()
            .map(String::as_str)
            .unwrap_or(".dll")
    }

    /// Load configuration from a `loadout.toml` file.
    pub fn load_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let file: ConfigFile = toml::from_str(&text)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        Ok(file.resolver)
    }

    /// Discover configuration for a project: `loadout.toml` in the project's
    /// directory, then the platform config dir, then built-in defaults.
    pub fn discover(project_dir: &Path) -> anyhow::Result<Self> {
        let mut candidates = vec![project_dir.join("loadout.toml")];
        if let Some(config_dir) = dirs::config_dir() {
            candidates.push(config_dir.join("loadout").join("loadout.toml"));
        }
        for candidate in candidates {
            if candidate.exists() {
                return Self::load_file(&candidate);
            }
        }
        Ok(Self::default())
    }
}

/// On-disk layout of `loadout.toml`.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct ConfigFile {
    resolver: ResolverConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ResolverConfig::default();
        assert_eq!(config.lockfile_path, PathBuf::from("obj/project.assets.json"));
        assert_eq!(config.binary_extensions, vec![".dll".to_string()]);
        assert_eq!(config.output_dir, PathBuf::from("bin"));
        assert_eq!(config.placeholder_dir, "placeholder");
    }

    #[test]
    fn test_is_binary_ignores_case() {
        let config = ResolverConfig::default();
        assert!(config.is_binary("lib/net8.0/Foo.DLL"));
        assert!(config.is_binary("lib/net8.0/Foo.dll"));
        assert!(!config.is_binary("lib/net8.0/_._"));
        assert!(!config.is_binary("lib/net8.0/Foo.xml"));
    }

    #[test]
    fn test_load_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loadout.toml");
        std::fs::write(
            &path,
            "[resolver]\nbinary-extensions = [\".dll\", \".exe\"]\n",
        )
        .unwrap();

        let config = ResolverConfig::load_file(&path).unwrap();
        assert_eq!(config.binary_extensions.len(), 2);
        // Unspecified knobs keep their defaults.
        assert_eq!(config.output_dir, PathBuf::from("bin"));
    }

    #[test]
    fn test_discover_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ResolverConfig::discover(dir.path()).unwrap();
        assert_eq!(config.lockfile_path, PathBuf::from("obj/project.assets.json"));
    }
}
