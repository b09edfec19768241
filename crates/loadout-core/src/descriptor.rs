//! Project descriptor reading.
//!
//! A descriptor is an XML file listing the project's compile units and its
//! references to other project descriptors. Only those two lists are
//! extracted; everything else in the markup is ignored.

use std::path::{Path, PathBuf};

use crate::error::ResolveError;
use crate::fs::absolutize;

/// Element name carrying a source file entry.
const COMPILE_TAG: &str = "Compile";
/// Element name carrying a reference to another descriptor.
const REFERENCE_TAG: &str = "ProjectReference";
/// Attribute holding the entry's path.
const PATH_ATTRIBUTE: &str = "Include";

/// Source-file and project-reference lists of one descriptor.
#[derive(Debug, Clone)]
pub struct ProjectDescriptor {
    pub path: PathBuf,
    /// Compile units, in declaration order, absolutized.
    pub sources: Vec<PathBuf>,
    /// Referenced project descriptors, in declaration order, absolutized.
    pub project_references: Vec<PathBuf>,
}

impl ProjectDescriptor {
    /// Read and parse the descriptor at `path`.
    pub fn load(path: &Path) -> Result<Self, ResolveError> {
        let text = std::fs::read_to_string(path).map_err(|source| ResolveError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &text)
    }

    /// Parse descriptor text. Entry paths are converted to the host
    /// separator convention and resolved relative to the descriptor's
    /// directory.
    pub fn parse(path: &Path, text: &str) -> Result<Self, ResolveError> {
        let document = roxmltree::Document::parse(text).map_err(|source| {
            ResolveError::MalformedDescriptor {
                path: path.to_path_buf(),
                source,
            }
        })?;

        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let mut sources = Vec::new();
        let mut project_references = Vec::new();

        for node in document.descendants().filter(|n| n.is_element()) {
            let Some(include) = node.attribute(PATH_ATTRIBUTE) else {
                continue;
            };
            match node.tag_name().name() {
                COMPILE_TAG => sources.push(absolutize(dir, include)),
                REFERENCE_TAG => project_references.push(absolutize(dir, include)),
                _ => {}
            }
        }

        Ok(Self {
            path: path.to_path_buf(),
            sources,
            project_references,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DESCRIPTOR: &str = r#"<Project Sdk="Microsoft.NET.Sdk">
  <PropertyGroup>
    <TargetFramework>net8.0</TargetFramework>
  </PropertyGroup>
  <ItemGroup>
    <Compile Include="Program.cs" />
    <Compile Include="Util\Helpers.cs" />
  </ItemGroup>
  <ItemGroup>
    <ProjectReference Include="..\lib\lib.csproj" />
  </ItemGroup>
</Project>
"#;

    #[test]
    fn test_parse_extracts_sources_and_references() {
        let descriptor =
            ProjectDescriptor::parse(Path::new("/projects/app/app.csproj"), DESCRIPTOR).unwrap();

        assert_eq!(
            descriptor.sources,
            vec![
                PathBuf::from("/projects/app/Program.cs"),
                PathBuf::from("/projects/app").join("Util").join("Helpers.cs"),
            ]
        );
        assert_eq!(
            descriptor.project_references,
            vec![PathBuf::from("/projects/lib/lib.csproj")]
        );
    }

    #[test]
    fn test_elements_without_path_attribute_are_ignored() {
        let text = r#"<Project><ItemGroup><Compile /><ProjectReference /></ItemGroup></Project>"#;
        let descriptor =
            ProjectDescriptor::parse(Path::new("/projects/app/app.csproj"), text).unwrap();
        assert!(descriptor.sources.is_empty());
        assert!(descriptor.project_references.is_empty());
    }

    #[test]
    fn test_malformed_markup_is_rejected() {
        let err = ProjectDescriptor::parse(
            Path::new("/projects/app/app.csproj"),
            "<Project><unterminated",
        )
        .unwrap_err();
        assert!(matches!(err, ResolveError::MalformedDescriptor { .. }));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ProjectDescriptor::load(&dir.path().join("absent.csproj")).unwrap_err();
        assert!(matches!(err, ResolveError::Io { .. }));
    }
}
