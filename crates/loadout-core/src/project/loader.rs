//! Project graph traversal.
//!
//! Depth-first walk over the descriptor reference graph, resolving each
//! project's lockfile along the way. A path re-entered while still on the
//! traversal stack is a cycle and fails the resolution; a path completed
//! earlier in the walk (diamond) is reused.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::config::ResolverConfig;
use crate::descriptor::ProjectDescriptor;
use crate::diagnostics::Diagnostics;
use crate::error::ResolveError;
use crate::fs::canonicalize_lenient;
use crate::lockfile::Lockfile;
use crate::project::options::{ProjectReference, ReferencePath, ResolvedProject};
use crate::resolver::resolve_binaries;

/// Resolve the full compile configuration for the descriptor at `path`.
pub(crate) fn load_project(
    path: &Path,
    config: &ResolverConfig,
    diagnostics: &Diagnostics,
) -> Result<ResolvedProject, ResolveError> {
    let canonical = canonicalize_lenient(path);
    let last_load_time = Utc::now();

    let descriptor = ProjectDescriptor::load(&canonical)?;
    let binaries = resolve_lockfile_binaries(&canonical, config, diagnostics)?;

    let mut walker = Walker {
        config,
        diagnostics,
        stack: vec![canonical.clone()],
        finished: HashMap::new(),
        ancestors: Vec::new(),
    };
    let mut references = Vec::new();
    for child in &descriptor.project_references {
        references.push(walker.walk(child)?);
    }

    let ancestors = walker
        .ancestors
        .iter()
        .filter_map(|ancestor| {
            walker.finished.get(ancestor).map(|node| ReferencePath {
                descriptor_path: ancestor.clone(),
                output_binary: node.output_binary.clone(),
            })
        })
        .collect::<Vec<_>>();

    tracing::debug!(
        project = %canonical.display(),
        ancestors = ancestors.len(),
        binaries = binaries.len(),
        "loaded project"
    );

    Ok(ResolvedProject {
        descriptor_path: canonical,
        sources: descriptor.sources,
        binaries,
        references,
        ancestors,
        last_load_time,
    })
}

struct Walker<'a> {
    config: &'a ResolverConfig,
    diagnostics: &'a Diagnostics,
    /// Canonical paths on the current traversal stack; membership means a
    /// cycle.
    stack: Vec<PathBuf>,
    /// Completed nodes, reused when a diamond reaches a path twice.
    finished: HashMap<PathBuf, ProjectReference>,
    /// First-visit order of every reachable descriptor.
    ancestors: Vec<PathBuf>,
}

impl Walker<'_> {
    fn walk(&mut self, path: &Path) -> Result<ProjectReference, ResolveError> {
        let canonical = canonicalize_lenient(path);
        if let Some(done) = self.finished.get(&canonical) {
            return Ok(done.clone());
        }
        if self.stack.contains(&canonical) {
            return Err(ResolveError::CyclicProjectReference { path: canonical });
        }

        self.stack.push(canonical.clone());
        let descriptor = ProjectDescriptor::load(&canonical)?;
        let binaries = resolve_lockfile_binaries(&canonical, self.config, self.diagnostics)?;
        self.ancestors.push(canonical.clone());

        let mut references = Vec::new();
        for child in &descriptor.project_references {
            references.push(self.walk(child)?);
        }
        self.stack.pop();

        let node = ProjectReference {
            output_binary: derive_output_binary(&canonical, self.config),
            descriptor_path: canonical.clone(),
            binaries,
            references,
        };
        self.finished.insert(canonical, node.clone());
        Ok(node)
    }
}

/// Resolve the binaries of the lockfile sitting next to `descriptor_path`.
/// A missing lockfile is the no-package-dependencies case, not an error.
fn resolve_lockfile_binaries(
    descriptor_path: &Path,
    config: &ResolverConfig,
    diagnostics: &Diagnostics,
) -> Result<BTreeSet<PathBuf>, ResolveError> {
    let dir = descriptor_path.parent().unwrap_or_else(|| Path::new("."));
    let lockfile_path = dir.join(&config.lockfile_path);
    if !lockfile_path.exists() {
        diagnostics.warn_once(format!(
            "no lockfile at {}; treating project as having no package dependencies",
            lockfile_path.display()
        ));
        return Ok(BTreeSet::new());
    }
    let lockfile = Lockfile::load(&lockfile_path)?;
    Ok(resolve_binaries(&lockfile, config, diagnostics))
}

/// Conventional build-output binary for a descriptor: the first existing
/// `<dir>/bin/<config>/<target>/<name>` match, scanning subdirectories in
/// sorted order, else a synthesized placeholder path.
fn derive_output_binary(descriptor_path: &Path, config: &ResolverConfig) -> PathBuf {
    let dir = descriptor_path.parent().unwrap_or_else(|| Path::new("."));
    let stem = descriptor_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "project".to_string());
    let name = format!("{stem}{}", config.binary_extension());

    let output_root = dir.join(&config.output_dir);
    for level_one in sorted_subdirs(&output_root) {
        for level_two in sorted_subdirs(&level_one) {
            let candidate = level_two.join(&name);
            if candidate.exists() {
                return candidate;
            }
        }
    }
    output_root.join(&config.placeholder_dir).join(name)
}

fn sorted_subdirs(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut subdirs: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    subdirs.sort();
    subdirs
}
