//! Loadout Core Library
//!
//! Resolves the compile configuration of lockfile-based project units:
//! binary dependencies from the package manager's lockfile, plus the
//! transitive graph of project-to-project references, memoized per project
//! with modification-time staleness detection.

pub mod cache;
pub mod config;
pub mod descriptor;
pub mod diagnostics;
pub mod error;
pub mod fs;
pub mod lockfile;
pub mod project;
pub mod resolver;

/// Re-exports of commonly used types
pub mod prelude {
    // Configuration
    pub use crate::config::ResolverConfig;

    // Diagnostics
    pub use crate::diagnostics::{Diagnostics, DiagnosticsSink, MemorySink, TracingSink};

    // Errors
    pub use crate::error::ResolveError;

    // Lockfile
    pub use crate::lockfile::{
        FrameworkDependency, LibraryEntry, Lockfile, NameIndex, TargetLibrary,
    };

    // Resolution
    pub use crate::cache::ProjectResolver;
    pub use crate::descriptor::ProjectDescriptor;
    pub use crate::project::{ProjectReference, ReferencePath, ResolvedProject};
    pub use crate::resolver::resolve_binaries;
}
