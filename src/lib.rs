//! Drydock - A meta-build generator for C/C++ workspaces
//!
//! This crate provides the core library functionality for Drydock:
//! building a resolved project collection from declarative module
//! manifests and emitting native build-tool project files from it.

pub mod collection;
pub mod core;
pub mod generator;
pub mod libraries;
pub mod ops;
pub mod util;

pub use crate::core::config::Configuration;
pub use crate::core::manifest::ModuleManifest;
pub use crate::core::workspace::WorkspaceManifest;
pub use collection::{ProjectCollection, ProjectIndex};
pub use generator::{CmakeGenerator, FileSet, SolutionGenerator};
