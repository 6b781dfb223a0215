//! Workspace manifest — the root `drydock.toml`.
//!
//! The workspace names the solution and lists the modules to load, each
//! with a `local` flag. Externally referenced modules contribute their
//! libraries but never their test applications.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::core::manifest::ModuleManifest;

pub const WORKSPACE_MANIFEST_NAME: &str = "drydock.toml";

/// A reference to one module directory.
#[derive(Debug, Clone, Deserialize)]
pub struct ModuleRef {
    /// Module directory containing a `module.toml`, relative to the
    /// workspace root unless absolute.
    pub path: PathBuf,

    /// Built in this workspace (true) or pulled in as a reference (false).
    #[serde(default = "default_true")]
    pub local: bool,
}

fn default_true() -> bool {
    true
}

/// The parsed workspace manifest.
#[derive(Debug, Clone)]
pub struct WorkspaceManifest {
    /// Solution name, used for the top-level aggregate project.
    pub name: String,

    pub modules: Vec<ModuleRef>,

    /// The directory containing the manifest.
    pub root: PathBuf,
}

#[derive(Debug, Deserialize)]
struct RawWorkspace {
    workspace: RawWorkspaceHeader,

    #[serde(default, rename = "module")]
    modules: Vec<ModuleRef>,
}

#[derive(Debug, Deserialize)]
struct RawWorkspaceHeader {
    name: String,
}

impl WorkspaceManifest {
    /// Load the workspace manifest from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read workspace manifest: {}", path.display()))?;

        Self::parse(&content, path)
            .with_context(|| format!("failed to parse workspace manifest: {}", path.display()))
    }

    /// Parse workspace manifest content.
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let raw: RawWorkspace = toml::from_str(content)?;
        let root = path.parent().unwrap_or(Path::new(".")).to_path_buf();

        Ok(WorkspaceManifest {
            name: raw.workspace.name,
            modules: raw.modules,
            root,
        })
    }

    /// Load every referenced module manifest, in declaration order.
    pub fn load_modules(&self) -> Result<Vec<ModuleManifest>> {
        self.modules
            .iter()
            .map(|m| {
                let dir = if m.path.is_absolute() {
                    m.path.clone()
                } else {
                    self.root.join(&m.path)
                };
                ModuleManifest::load(&dir, m.local)
            })
            .collect()
    }
}

/// Walk up from `start` looking for a workspace manifest.
pub fn find_workspace_manifest(start: &Path) -> Option<PathBuf> {
    let mut dir = Some(start);
    while let Some(d) = dir {
        let candidate = d.join(WORKSPACE_MANIFEST_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        dir = d.parent();
    }
    None
}
