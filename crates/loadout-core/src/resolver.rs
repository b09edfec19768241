//! Binary dependency resolution over a parsed lockfile.
//!
//! Starting from the project's declared framework dependencies, walks the
//! transitive package closure, selects compile-time binaries, overlays the
//! full file manifests of auto-referenced packages, and maps every selected
//! file to an absolute path by probing the package folders in order.
//!
//! Inconsistencies in the lockfile are soft: they are reported once through
//! [`Diagnostics`] and the affected entry is skipped. An empty result is
//! valid and means "no extra binaries needed".

use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::config::ResolverConfig;
use crate::diagnostics::Diagnostics;
use crate::fs::{normalize, to_native};
use crate::lockfile::{Lockfile, NameIndex};

/// Resolve the deduplicated set of absolute binary paths required to compile
/// against `lockfile`.
pub fn resolve_binaries(
    lockfile: &Lockfile,
    config: &ResolverConfig,
    diagnostics: &Diagnostics,
) -> BTreeSet<PathBuf> {
    let index = NameIndex::build(lockfile);

    let closure = package_closure(lockfile, &index, diagnostics);
    let mut selected = select_compile_files(lockfile, config, diagnostics, &closure);
    add_auto_referenced(lockfile, config, diagnostics, &index, &mut selected);

    let resolved = probe_package_folders(lockfile, diagnostics, &selected);
    tracing::debug!(
        packages = closure.len(),
        files = selected.len(),
        resolved = resolved.len(),
        "resolved lockfile binaries"
    );
    resolved
}

/// Transitive closure of versioned package keys reachable from the declared
/// framework dependencies. Cycles terminate on the member check.
fn package_closure(
    lockfile: &Lockfile,
    index: &NameIndex,
    diagnostics: &Diagnostics,
) -> BTreeSet<String> {
    let mut closure = BTreeSet::new();
    let mut pending = Vec::new();

    for framework in lockfile.project.frameworks.values() {
        for name in framework.dependencies.keys() {
            // A declared name without a library entry may be a
            // non-package-kind reference; not an inconsistency here.
            if let Some(key) = index.resolve(name, diagnostics) {
                if closure.insert(key.to_string()) {
                    pending.push(key.to_string());
                }
            }
        }
    }

    while let Some(key) = pending.pop() {
        for (framework, packages) in &lockfile.targets {
            let Some(target) = packages.get(&key) else {
                diagnostics
                    .warn_once(format!("package {key} is not listed under target {framework}"));
                continue;
            };
            if !target.is_package() {
                continue;
            }
            for name in target.dependencies.keys() {
                let Some(dep_key) = index.resolve(name, diagnostics) else {
                    diagnostics.warn_once(format!(
                        "dependency {name} of {key} has no library entry"
                    ));
                    continue;
                };
                if closure.insert(dep_key.to_string()) {
                    pending.push(dep_key.to_string());
                }
            }
        }
    }

    closure
}

/// Collect `(key, file)` pairs from the compile-time file lists of every
/// package in the closure, filtered to binary extensions.
fn select_compile_files(
    lockfile: &Lockfile,
    config: &ResolverConfig,
    diagnostics: &Diagnostics,
    closure: &BTreeSet<String>,
) -> BTreeSet<(String, String)> {
    let mut selected = BTreeSet::new();
    for key in closure {
        for (framework, packages) in &lockfile.targets {
            let Some(target) = packages.get(key) else {
                continue;
            };
            if !target.is_package() {
                continue;
            }
            let mut found = false;
            for file in target.compile.keys() {
                if config.is_binary(file) {
                    selected.insert((key.clone(), file.clone()));
                    found = true;
                } else {
                    diagnostics.warn_once(format!(
                        "compile asset {file} of {key} has no binary extension"
                    ));
                }
            }
            if !found {
                diagnostics.warn_once(format!(
                    "no compile-time binaries for {key} under {framework}"
                ));
            }
        }
    }
    selected
}

/// Packages flagged auto-referenced contribute their full file manifest,
/// whether or not the compile closure selected them.
fn add_auto_referenced(
    lockfile: &Lockfile,
    config: &ResolverConfig,
    diagnostics: &Diagnostics,
    index: &NameIndex,
    selected: &mut BTreeSet<(String, String)>,
) {
    for framework in lockfile.project.frameworks.values() {
        for (name, dependency) in &framework.dependencies {
            if !dependency.auto_referenced {
                continue;
            }
            let Some(key) = index.resolve(name, diagnostics) else {
                diagnostics.warn_once(format!(
                    "auto-referenced package {name} has no library entry"
                ));
                continue;
            };
            let Some(library) = lockfile.libraries.get(key) else {
                continue;
            };
            if !library.is_package() {
                continue;
            }
            for file in &library.files {
                if config.is_binary(file) {
                    selected.insert((key.to_string(), file.clone()));
                }
            }
        }
    }
}

/// Map each `(key, file)` pair to an absolute path by probing the package
/// folders in order. Pairs with no on-disk match are dropped silently;
/// optional platform-specific binaries are routinely absent.
fn probe_package_folders(
    lockfile: &Lockfile,
    diagnostics: &Diagnostics,
    selected: &BTreeSet<(String, String)>,
) -> BTreeSet<PathBuf> {
    let mut resolved = BTreeSet::new();
    for (key, file) in selected {
        let Some(library) = lockfile.libraries.get(key) else {
            diagnostics.warn_once(format!("package {key} is missing from libraries"));
            continue;
        };
        let Some(library_path) = &library.path else {
            diagnostics.warn_once(format!("package {key} has no path in libraries"));
            continue;
        };
        if !library.files.iter().any(|listed| listed == file) {
            diagnostics.warn_once(format!("file {file} is not in the file list of {key}"));
            continue;
        }
        let relative = to_native(library_path).join(to_native(file));
        for root in &lockfile.package_folders {
            let candidate = normalize(&root.join(&relative));
            if candidate.exists() {
                resolved.insert(candidate);
                break;
            }
        }
    }
    resolved
}
