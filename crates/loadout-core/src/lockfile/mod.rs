//! Lockfile model, parser, and name index.

pub mod index;
pub mod model;

pub use index::NameIndex;
pub use model::{
    CompileAsset, FrameworkDependency, FrameworkSection, LibraryEntry, Lockfile, ProjectSection,
    TargetLibrary, KEY_SEPARATOR, PACKAGE_KIND,
};
