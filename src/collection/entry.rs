//! A resolved project entry and its content scan.
//!
//! `ProjectEntry` wraps one declared project with everything resolution
//! adds: the effective kind, scanned files, resolved dependencies, and
//! resolved external libraries. Entries reference each other by index into
//! the owning collection, so the collection can rebuild its list without
//! leaving dangling references.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use walkdir::WalkDir;

use crate::collection::ProjectIndex;
use crate::core::config::{Configuration, Linkage};
use crate::core::manifest::{
    DependencySpec, ModuleManifest, ProjectKind, ProjectManifest, ProjectOptions,
};
use crate::libraries::ExternalLibrary;

/// Classified kind of a scanned file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Source,
    Header,
    Other,
}

impl FileKind {
    /// Classify by file extension.
    pub fn classify(path: &Path) -> FileKind {
        match path.extension().and_then(|e| e.to_str()) {
            Some("c") | Some("cc") | Some("cpp") | Some("cxx") => FileKind::Source,
            Some("h") | Some("hh") | Some("hpp") | Some("hxx") | Some("inl") => FileKind::Header,
            _ => FileKind::Other,
        }
    }
}

/// One file discovered during the content scan.
#[derive(Debug, Clone)]
pub struct ProjectFile {
    pub path: PathBuf,
    pub name: String,
    pub kind: FileKind,
    pub use_precompiled_header: bool,
}

/// One project with its resolution state.
#[derive(Debug, Clone)]
pub struct ProjectEntry {
    /// Globally unique within the collection.
    pub name: String,
    pub group: String,

    /// Name of the owning module.
    pub module: String,
    pub module_local: bool,

    pub root_path: Option<PathBuf>,

    /// Effective kind: `AutoLibrary` is already resolved to shared or
    /// static here, so consumers never see it.
    pub kind: ProjectKind,

    pub options: ProjectOptions,
    pub declared_dependencies: Vec<DependencySpec>,
    pub declared_libraries: Vec<String>,

    /// Populated by the content scan.
    pub files: Vec<ProjectFile>,

    /// Resolved direct dependencies, in declared order.
    pub dependencies: Vec<ProjectIndex>,

    /// Resolved external library descriptors, in declared order.
    pub libraries: Vec<ExternalLibrary>,

    /// Include paths attached during library resolution.
    pub additional_include_paths: Vec<PathBuf>,

    /// Where this project's generated files land.
    pub generated_path: PathBuf,
}

impl ProjectEntry {
    /// Build an entry from a declared project.
    pub fn from_manifest(
        manifest: &ProjectManifest,
        module: &ModuleManifest,
        config: &Configuration,
    ) -> Self {
        let kind = match manifest.kind {
            ProjectKind::AutoLibrary => match config.linkage {
                Linkage::Shared => ProjectKind::SharedLibrary,
                Linkage::Static => ProjectKind::StaticLibrary,
            },
            other => other,
        };

        ProjectEntry {
            name: manifest.name.clone(),
            group: manifest.group.clone(),
            module: module.name.clone(),
            module_local: module.local,
            root_path: manifest.root_path.clone(),
            kind,
            options: manifest.options.clone(),
            declared_dependencies: manifest.dependencies.clone(),
            declared_libraries: manifest.libraries.clone(),
            files: Vec::new(),
            dependencies: Vec::new(),
            libraries: Vec::new(),
            additional_include_paths: Vec::new(),
            generated_path: config.generated_dir().join(&manifest.name),
        }
    }

    /// Enumerate this project's on-disk sources and headers.
    ///
    /// Walks the `src` and `include` subtrees of the project root. Projects
    /// without a root path scan to an empty list. Returns the number of
    /// files found.
    pub fn scan_content(&mut self) -> Result<usize> {
        self.files.clear();

        let root = match &self.root_path {
            Some(root) => root.clone(),
            None => return Ok(0),
        };

        if !root.is_dir() {
            bail!("project root does not exist: {}", root.display());
        }

        for subdir in ["src", "include"] {
            let dir = root.join(subdir);
            if !dir.is_dir() {
                continue;
            }

            for entry in WalkDir::new(&dir) {
                let entry = entry?;
                if !entry.file_type().is_file() {
                    continue;
                }

                let path = entry.path().to_path_buf();
                let kind = FileKind::classify(&path);
                let name = entry.file_name().to_string_lossy().into_owned();
                let use_precompiled_header =
                    kind == FileKind::Source && self.options.use_precompiled_headers;

                self.files.push(ProjectFile {
                    path,
                    name,
                    kind,
                    use_precompiled_header,
                });
            }
        }

        // Stable order keeps regenerated project files byte-identical.
        self.files.sort_by(|a, b| a.path.cmp(&b.path));

        Ok(self.files.len())
    }

    pub fn sources(&self) -> impl Iterator<Item = &ProjectFile> {
        self.files.iter().filter(|f| f.kind == FileKind::Source)
    }

    pub fn headers(&self) -> impl Iterator<Item = &ProjectFile> {
        self.files.iter().filter(|f| f.kind == FileKind::Header)
    }
}
