//! Hard-failure error tier.
//!
//! Soft inconsistencies never surface here; they go through
//! [`crate::diagnostics::Diagnostics`] and resolution continues.

use std::path::PathBuf;

use thiserror::Error;

/// Failures that abort the current resolution.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Lockfile text is not a well-formed lockfile object, or lacks one of
    /// the required top-level sections.
    #[error("malformed lockfile {}: {source}", .path.display())]
    MalformedLockfile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Project descriptor could not be parsed as well-formed markup.
    #[error("malformed project descriptor {}: {source}", .path.display())]
    MalformedDescriptor {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },

    /// A project is reachable from itself through its reference chain.
    #[error("cyclic project reference involving {}", .path.display())]
    CyclicProjectReference { path: PathBuf },

    /// An input file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
