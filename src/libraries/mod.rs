//! External library repository.
//!
//! Prebuilt third-party libraries are described by an on-disk TOML index.
//! The collection consults the repository by name during library
//! resolution; the descriptors it hands back carry everything the backend
//! needs to wire the library into a project file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

pub const LIBRARY_INDEX_NAME: &str = "libraries.toml";

/// Descriptor for one resolved external library.
#[derive(Debug, Clone, Default)]
pub struct ExternalLibrary {
    pub name: String,

    /// Primary public include directory.
    pub include_path: Option<PathBuf>,

    /// Extra include directories attached to dependent projects.
    pub additional_include_paths: Vec<PathBuf>,

    /// Binary artifacts linked into dependents.
    pub library_files: Vec<PathBuf>,

    /// System libraries the platform must link alongside this library.
    pub system_libraries: Vec<String>,

    /// Frameworks (Darwin families only).
    pub system_frameworks: Vec<String>,
}

/// Resolves a library name to a descriptor.
pub trait LibraryRepository {
    fn resolve(&self, name: &str) -> Option<&ExternalLibrary>;
}

/// An always-empty repository, for workspaces without external libraries.
#[derive(Debug, Default)]
pub struct EmptyLibraryRepository;

impl LibraryRepository for EmptyLibraryRepository {
    fn resolve(&self, _name: &str) -> Option<&ExternalLibrary> {
        None
    }
}

/// Repository backed by a `libraries.toml` index.
///
/// The index is per-platform: prebuilt SDK packs ship one tree per target,
/// so selecting a platform means pointing the generator at that tree's
/// index file. Relative paths resolve against the index file's directory.
#[derive(Debug, Default)]
pub struct TomlLibraryRepository {
    libraries: HashMap<String, ExternalLibrary>,
}

#[derive(Debug, Deserialize)]
struct RawIndex {
    #[serde(default, rename = "library")]
    libraries: Vec<RawLibrary>,
}

#[derive(Debug, Deserialize)]
struct RawLibrary {
    name: String,

    #[serde(default)]
    include_path: Option<PathBuf>,

    #[serde(default)]
    additional_include_paths: Vec<PathBuf>,

    #[serde(default)]
    library_files: Vec<PathBuf>,

    #[serde(default)]
    system_libraries: Vec<String>,

    #[serde(default)]
    system_frameworks: Vec<String>,
}

impl TomlLibraryRepository {
    /// Load an index from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read library index: {}", path.display()))?;
        let base = path.parent().unwrap_or(Path::new("."));

        Self::parse(&content, base)
            .with_context(|| format!("failed to parse library index: {}", path.display()))
    }

    /// Parse index content against a base directory.
    pub fn parse(content: &str, base: &Path) -> Result<Self> {
        let raw: RawIndex = toml::from_str(content)?;

        let mut libraries = HashMap::new();
        for lib in raw.libraries {
            let entry = ExternalLibrary {
                name: lib.name.clone(),
                include_path: lib.include_path.map(|p| absolutize(base, p)),
                additional_include_paths: lib
                    .additional_include_paths
                    .into_iter()
                    .map(|p| absolutize(base, p))
                    .collect(),
                library_files: lib
                    .library_files
                    .into_iter()
                    .map(|p| absolutize(base, p))
                    .collect(),
                system_libraries: lib.system_libraries,
                system_frameworks: lib.system_frameworks,
            };
            libraries.insert(lib.name, entry);
        }

        Ok(TomlLibraryRepository { libraries })
    }

    pub fn len(&self) -> usize {
        self.libraries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.libraries.is_empty()
    }
}

impl LibraryRepository for TomlLibraryRepository {
    fn resolve(&self, name: &str) -> Option<&ExternalLibrary> {
        self.libraries.get(name)
    }
}

fn absolutize(base: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}
