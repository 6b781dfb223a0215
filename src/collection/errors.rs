//! Population, scan, and resolution error types.
//!
//! The collection never logs; it returns structured errors and aggregate
//! reports, and the ops layer decides what to surface. A single project's
//! failure accumulates into the report without stopping its siblings.

use thiserror::Error;

/// Fatal error during collection population.
#[derive(Debug, Error)]
pub enum PopulateError {
    /// Two modules declared the same project name. A silent index overwrite
    /// would corrupt the whole graph, so this aborts population.
    #[error(
        "duplicate project name `{name}` (declared by module `{first_module}` and module `{second_module}`)"
    )]
    DuplicateProject {
        name: String,
        first_module: String,
        second_module: String,
    },
}

/// Error while resolving one declared dependency or library.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("project `{project}`: dependency `{dependency}` is not a library")]
    NotALibrary { project: String, dependency: String },

    #[error("project `{project}`: no project named `{dependency}` found in any loaded module")]
    DependencyNotFound { project: String, dependency: String },

    #[error("project `{project}`: external library `{library}` could not be resolved")]
    LibraryNotFound { project: String, library: String },
}

impl ResolveError {
    /// Name of the project the error is scoped to.
    pub fn project(&self) -> &str {
        match self {
            ResolveError::NotALibrary { project, .. }
            | ResolveError::DependencyNotFound { project, .. }
            | ResolveError::LibraryNotFound { project, .. } => project,
        }
    }
}

/// Aggregate outcome of a resolution pass across the whole collection.
#[derive(Debug, Default)]
pub struct ResolveReport {
    pub errors: Vec<ResolveError>,
}

impl ResolveReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn merge(&mut self, other: ResolveReport) {
        self.errors.extend(other.errors);
    }
}

/// A single project's content-scan failure.
#[derive(Debug, Error)]
#[error("project `{project}`: content scan failed: {reason}")]
pub struct ScanError {
    pub project: String,
    pub reason: anyhow::Error,
}

/// Aggregate result of the parallel content scan.
///
/// `total_files` sums the projects that scanned successfully even when the
/// outcome as a whole is invalid.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub total_files: usize,
    pub errors: Vec<ScanError>,
}

impl ScanOutcome {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}
