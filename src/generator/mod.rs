//! Solution generation: the backend contract and the in-memory file set.
//!
//! Backends walk a finalized `ProjectCollection` and append generated files
//! to a `FileSet`; the file set is then handed to the writer. Generation is
//! a pure transform — nothing touches disk until `FileSet::write_all`.

pub mod cmake;

use std::path::PathBuf;

use anyhow::Result;

use crate::collection::ProjectCollection;
use crate::util::fs::write_if_changed;

pub use cmake::CmakeGenerator;

/// One generated file.
#[derive(Debug, Clone)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub content: String,
}

impl GeneratedFile {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        GeneratedFile {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// Ordered set of generated files.
#[derive(Debug, Default)]
pub struct FileSet {
    files: Vec<GeneratedFile>,
}

impl FileSet {
    pub fn new() -> Self {
        FileSet::default()
    }

    pub fn push(&mut self, file: GeneratedFile) {
        self.files.push(file);
    }

    pub fn extend(&mut self, files: impl IntoIterator<Item = GeneratedFile>) {
        self.files.extend(files);
    }

    pub fn files(&self) -> &[GeneratedFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Persist every file, skipping ones whose on-disk content already
    /// matches. Returns the number of files actually written.
    pub fn write_all(&self) -> Result<usize> {
        let mut written = 0;
        for file in &self.files {
            if write_if_changed(&file.path, &file.content)? {
                written += 1;
            }
        }
        Ok(written)
    }
}

/// A single project's emission failure.
#[derive(Debug)]
pub struct GenerateFailure {
    pub project: String,
    pub reason: anyhow::Error,
}

/// Aggregate result of the per-project emission fan-out.
#[derive(Debug, Default)]
pub struct GenerateOutcome {
    pub errors: Vec<GenerateFailure>,
}

impl GenerateOutcome {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// A backend that renders a resolved collection into native build files.
pub trait SolutionGenerator {
    /// Emit the single top-level aggregate file.
    ///
    /// Validates the backend's tooling precondition first; a missing or
    /// too-old tool fails the whole generation.
    fn generate_solution(&self, collection: &ProjectCollection, out: &mut FileSet) -> Result<()>;

    /// Emit one file per buildable project.
    ///
    /// Projects are independent; emission runs concurrently, and one
    /// project's failure never stops its siblings.
    fn generate_projects(
        &self,
        collection: &ProjectCollection,
        out: &mut FileSet,
    ) -> GenerateOutcome;
}
