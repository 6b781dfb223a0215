//! Core data structures for Drydock.
//!
//! This module contains the foundational types used throughout Drydock:
//! - Build-target configuration (platform, flavor, linkage)
//! - Module and project manifests
//! - Workspace discovery and module loading

pub mod config;
pub mod manifest;
pub mod workspace;

pub use config::{BuildKind, Configuration, Linkage, Platform};
pub use manifest::{
    DependencySpec, ModuleManifest, ProjectKind, ProjectManifest, ProjectOptions,
    MODULE_MANIFEST_NAME,
};
pub use workspace::{find_workspace_manifest, WorkspaceManifest, WORKSPACE_MANIFEST_NAME};
