//! End-to-end solution generation.
//!
//! Drives the whole pipeline: load modules, populate, scan, filter,
//! resolve, emit, write. Per-project failures are logged here and counted,
//! but never stop the run — everything that resolved still gets generated.
//! Only a tooling precondition failure aborts before emission.

use anyhow::Result;

use crate::collection::ProjectCollection;
use crate::core::config::Configuration;
use crate::core::workspace::WorkspaceManifest;
use crate::generator::{CmakeGenerator, FileSet, SolutionGenerator};
use crate::libraries::LibraryRepository;

/// Summary of one generation run.
#[derive(Debug)]
pub struct GenerateSummary {
    /// Projects surviving the filter.
    pub projects: usize,

    /// Files found by the content scan.
    pub scanned_files: usize,

    /// Generated files actually written (unchanged ones are skipped).
    pub files_written: usize,

    /// Accumulated per-project failures across scan, resolution, and
    /// emission.
    pub failures: usize,
}

impl GenerateSummary {
    pub fn is_ok(&self) -> bool {
        self.failures == 0
    }
}

/// Generate the solution for a workspace.
pub fn generate(
    workspace: &WorkspaceManifest,
    libraries: &dyn LibraryRepository,
    config: &Configuration,
) -> Result<GenerateSummary> {
    let modules = workspace.load_modules()?;

    let mut collection = ProjectCollection::from_modules(&modules, config)?;
    tracing::info!(
        "Loaded {} project(s) from {} module(s)",
        collection.len(),
        modules.len()
    );

    let scan = collection.scan_content();
    for error in &scan.errors {
        tracing::error!("{}", error);
    }
    tracing::info!("Found {} file(s)", scan.total_files);

    let removed = collection.filter(config);
    if removed > 0 {
        tracing::info!(
            "Filtered {} project(s) from the solution due to development flag",
            removed
        );
    }

    let deps = collection.resolve_dependencies();
    for error in &deps.errors {
        tracing::error!("{}", error);
    }

    let libs = collection.resolve_libraries(libraries);
    for error in &libs.errors {
        tracing::error!("{}", error);
    }

    let generator = CmakeGenerator::new(config.clone(), workspace.name.clone());
    let mut files = FileSet::new();

    generator.generate_solution(&collection, &mut files)?;

    let emit = generator.generate_projects(&collection, &mut files);
    for failure in &emit.errors {
        tracing::error!(
            "project `{}`: generation failed: {:#}",
            failure.project,
            failure.reason
        );
    }

    let files_written = files.write_all()?;
    tracing::info!("Wrote {} of {} generated file(s)", files_written, files.len());

    Ok(GenerateSummary {
        projects: collection.len(),
        scanned_files: scan.total_files,
        files_written,
        failures: scan.errors.len() + deps.errors.len() + libs.errors.len() + emit.errors.len(),
    })
}
