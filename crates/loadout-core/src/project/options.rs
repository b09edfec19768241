//! Resolved compile-configuration artifacts.
//!
//! These are the values handed across the boundary to a compilation or
//! analysis engine; everything is plain data, serializable to JSON.

use std::collections::BTreeSet;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A node in the reference tree: one transitively referenced project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectReference {
    /// Canonical descriptor path of the referenced project.
    pub descriptor_path: PathBuf,

    /// Conventional build-output binary of the referenced project. Always a
    /// stable, non-empty path; a placeholder is synthesized when the project
    /// has not been built yet.
    pub output_binary: PathBuf,

    /// Binary dependencies resolved from the referenced project's lockfile.
    pub binaries: BTreeSet<PathBuf>,

    /// The referenced project's own references.
    pub references: Vec<ProjectReference>,
}

/// Flat-list entry for one transitively reachable ancestor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferencePath {
    pub descriptor_path: PathBuf,
    pub output_binary: PathBuf,
}

/// Fully resolved compile configuration for one project descriptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedProject {
    /// Canonical descriptor path.
    pub descriptor_path: PathBuf,

    /// Source files, in descriptor declaration order.
    pub sources: Vec<PathBuf>,

    /// Binary dependencies resolved from this project's lockfile.
    pub binaries: BTreeSet<PathBuf>,

    /// Directly referenced projects, nested.
    pub references: Vec<ProjectReference>,

    /// Every transitively reachable ancestor, order-preserving and
    /// deduplicated.
    pub ancestors: Vec<ReferencePath>,

    /// When this snapshot was computed; drives cache staleness checks.
    pub last_load_time: DateTime<Utc>,
}
