//! Module and project manifest schema.
//!
//! A module is a named grouping of projects, declared in a `module.toml`.
//! Modules are either local (built in this workspace) or external
//! (referenced; their test applications are never built). Manifests are
//! immutable after parsing — resolution state lives on the derived
//! collection entries, never here.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Declared project type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectKind {
    /// Console or windowed executable.
    Application,
    /// Executable only built for local modules and dev builds.
    TestApplication,
    SharedLibrary,
    StaticLibrary,
    /// Becomes shared or static depending on the configured linkage.
    AutoLibrary,
    /// Parsed but never built.
    Disabled,
}

impl ProjectKind {
    /// Only libraries can be dependency targets.
    pub fn is_library(&self) -> bool {
        matches!(self, ProjectKind::SharedLibrary | ProjectKind::StaticLibrary)
    }

    /// Anything that ends up as a build target in the emitted solution.
    pub fn is_buildable(&self) -> bool {
        matches!(
            self,
            ProjectKind::Application
                | ProjectKind::TestApplication
                | ProjectKind::SharedLibrary
                | ProjectKind::StaticLibrary
        )
    }

    pub fn is_application(&self) -> bool {
        matches!(self, ProjectKind::Application | ProjectKind::TestApplication)
    }
}

/// A declared dependency on another project.
///
/// The name may end in `*`, matching every direct-child library under the
/// prefix. Soft dependencies are optional: their absence is not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencySpec {
    pub name: String,
    pub soft: bool,
}

impl DependencySpec {
    pub fn new(name: impl Into<String>) -> Self {
        DependencySpec {
            name: name.into(),
            soft: false,
        }
    }

    pub fn soft(name: impl Into<String>) -> Self {
        DependencySpec {
            name: name.into(),
            soft: true,
        }
    }

    /// Trailing-wildcard pattern? Returns the prefix if so.
    pub fn wildcard_prefix(&self) -> Option<&str> {
        self.name.strip_suffix('*')
    }
}

/// Per-project options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectOptions {
    /// Only built when the dev flag is set.
    #[serde(default)]
    pub dev_only: bool,

    /// C++ exceptions on POSIX platforms (default: true).
    #[serde(default = "default_true")]
    pub use_exceptions: bool,

    /// Windowed subsystem instead of console on Windows.
    #[serde(default)]
    pub use_window_subsystem: bool,

    /// Mark sources as precompiled-header consumers on Windows.
    #[serde(default)]
    pub use_precompiled_headers: bool,
}

fn default_true() -> bool {
    true
}

/// Static declaration of a single project.
#[derive(Debug, Clone)]
pub struct ProjectManifest {
    /// Globally unique name; may be path-like (`lib/core`).
    pub name: String,

    /// Grouping name used by solution-level organization.
    pub group: String,

    /// Source root, absolute once loaded. None for projects that only exist
    /// as generated code.
    pub root_path: Option<PathBuf>,

    pub kind: ProjectKind,
    pub dependencies: Vec<DependencySpec>,
    pub libraries: Vec<String>,
    pub options: ProjectOptions,
}

/// A named unit owning zero or more projects.
#[derive(Debug, Clone)]
pub struct ModuleManifest {
    pub name: String,

    /// Declared in this workspace, as opposed to pulled in as a reference.
    pub local: bool,

    /// Include paths contributed to every project in the solution.
    pub global_include_paths: Vec<PathBuf>,

    pub projects: Vec<ProjectManifest>,
}

pub const MODULE_MANIFEST_NAME: &str = "module.toml";

/// Raw dependency as written in TOML: either `"name"` (possibly with a
/// trailing `*`) or a detailed table with a `soft` marker.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawDependency {
    Simple(String),
    Detailed {
        name: String,
        #[serde(default)]
        soft: bool,
    },
}

/// Raw project as deserialized from `module.toml`.
#[derive(Debug, Deserialize)]
struct RawProject {
    name: String,

    #[serde(default)]
    group: Option<String>,

    #[serde(default)]
    root: Option<PathBuf>,

    #[serde(rename = "type")]
    kind: ProjectKind,

    #[serde(default)]
    dependencies: Vec<RawDependency>,

    #[serde(default)]
    libraries: Vec<String>,

    #[serde(flatten)]
    options: ProjectOptions,
}

/// Raw module manifest.
#[derive(Debug, Deserialize)]
struct RawModule {
    module: RawModuleHeader,

    #[serde(default, rename = "project")]
    projects: Vec<RawProject>,
}

#[derive(Debug, Deserialize)]
struct RawModuleHeader {
    name: String,

    #[serde(default)]
    include_paths: Vec<PathBuf>,
}

impl ModuleManifest {
    /// Load a module manifest from `<dir>/module.toml`.
    ///
    /// Relative project roots and include paths are resolved against the
    /// module directory. `local` is decided by the workspace that references
    /// the module, not by the module itself.
    pub fn load(dir: &Path, local: bool) -> Result<Self> {
        let path = dir.join(MODULE_MANIFEST_NAME);
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read module manifest: {}", path.display()))?;

        Self::parse(&content, dir, local)
            .with_context(|| format!("failed to parse module manifest: {}", path.display()))
    }

    /// Parse manifest content against a module directory.
    pub fn parse(content: &str, dir: &Path, local: bool) -> Result<Self> {
        let raw: RawModule = toml::from_str(content)?;

        let global_include_paths = raw
            .module
            .include_paths
            .into_iter()
            .map(|p| absolutize(dir, p))
            .collect();

        let projects = raw
            .projects
            .into_iter()
            .map(|p| convert_project(p, dir))
            .collect();

        Ok(ModuleManifest {
            name: raw.module.name,
            local,
            global_include_paths,
            projects,
        })
    }
}

fn convert_project(raw: RawProject, dir: &Path) -> ProjectManifest {
    let RawProject {
        name,
        group,
        root,
        kind,
        dependencies,
        libraries,
        options,
    } = raw;

    let group = group.unwrap_or_else(|| name.clone());

    let dependencies = dependencies
        .into_iter()
        .map(|d| match d {
            RawDependency::Simple(name) => DependencySpec::new(name),
            RawDependency::Detailed { name, soft } => DependencySpec { name, soft },
        })
        .collect();

    ProjectManifest {
        name,
        group,
        root_path: root.map(|p| absolutize(dir, p)),
        kind,
        dependencies,
        libraries,
        options,
    }
}

fn absolutize(dir: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        dir.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_module_manifest() {
        let content = r#"
[module]
name = "engine"
include_paths = ["include"]

[[project]]
name = "lib/core"
type = "static-library"

[[project]]
name = "app/editor"
type = "application"
root = "src/editor"
dependencies = ["lib/core", { name = "lib/audio", soft = true }, "lib/*"]
libraries = ["zlib"]
use_window_subsystem = true
"#;
        let module = ModuleManifest::parse(content, Path::new("/ws/engine"), true).unwrap();

        assert_eq!(module.name, "engine");
        assert!(module.local);
        assert_eq!(
            module.global_include_paths,
            vec![PathBuf::from("/ws/engine/include")]
        );
        assert_eq!(module.projects.len(), 2);

        let core = &module.projects[0];
        assert_eq!(core.name, "lib/core");
        assert_eq!(core.kind, ProjectKind::StaticLibrary);
        assert_eq!(core.group, "lib/core");
        assert!(core.root_path.is_none());

        let editor = &module.projects[1];
        assert_eq!(editor.kind, ProjectKind::Application);
        assert_eq!(
            editor.root_path.as_deref(),
            Some(Path::new("/ws/engine/src/editor"))
        );
        assert_eq!(editor.dependencies.len(), 3);
        assert!(!editor.dependencies[0].soft);
        assert!(editor.dependencies[1].soft);
        assert_eq!(editor.dependencies[2].wildcard_prefix(), Some("lib/"));
        assert_eq!(editor.libraries, vec!["zlib".to_string()]);
        assert!(editor.options.use_window_subsystem);
        assert!(editor.options.use_exceptions);
    }

    #[test]
    fn test_parse_rejects_unknown_type() {
        let content = r#"
[module]
name = "m"

[[project]]
name = "x"
type = "plugin"
"#;
        assert!(ModuleManifest::parse(content, Path::new("/m"), true).is_err());
    }

    #[test]
    fn test_wildcard_prefix_detection() {
        assert_eq!(DependencySpec::new("lib/*").wildcard_prefix(), Some("lib/"));
        assert_eq!(DependencySpec::new("lib/core").wildcard_prefix(), None);
        assert!(DependencySpec::soft("missing").soft);
    }

    #[test]
    fn test_options_defaults() {
        let content = r#"
[module]
name = "m"

[[project]]
name = "x"
type = "application"
"#;
        let module = ModuleManifest::parse(content, Path::new("/m"), false).unwrap();
        assert!(!module.local);

        let options = &module.projects[0].options;
        assert!(options.use_exceptions);
        assert!(!options.dev_only);
        assert!(!options.use_window_subsystem);
        assert!(!options.use_precompiled_headers);
    }

    #[test]
    fn test_absolute_root_kept() {
        let content = r#"
[module]
name = "m"

[[project]]
name = "x"
type = "application"
root = "/abs/elsewhere"
"#;
        let module = ModuleManifest::parse(content, Path::new("/m"), true).unwrap();
        assert_eq!(
            module.projects[0].root_path.as_deref(),
            Some(Path::new("/abs/elsewhere"))
        );
    }
}
