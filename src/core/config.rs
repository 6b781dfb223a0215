//! Build target configuration.
//!
//! A `Configuration` pins down everything the generator needs to know about
//! the target: platform, build flavor, library linkage, and the derived
//! output directories. It is immutable once constructed.

use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Target platform for the generated solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Windows,
    Uwp,
    Linux,
    Darwin,
    #[serde(rename = "darwin-arm")]
    #[value(name = "darwin-arm")]
    DarwinArm,
}

impl Platform {
    /// Windows and UWP share compiler, linker, and PCH handling.
    pub fn is_windows_family(&self) -> bool {
        matches!(self, Platform::Windows | Platform::Uwp)
    }

    /// Everything that is not Windows-family gets POSIX-style flags.
    pub fn is_posix_family(&self) -> bool {
        !self.is_windows_family()
    }

    pub fn is_darwin_family(&self) -> bool {
        matches!(self, Platform::Darwin | Platform::DarwinArm)
    }

    /// Stable lowercase token, used in output directory names.
    pub fn key(&self) -> &'static str {
        match self {
            Platform::Windows => "windows",
            Platform::Uwp => "uwp",
            Platform::Linux => "linux",
            Platform::Darwin => "darwin",
            Platform::DarwinArm => "darwin-arm",
        }
    }
}

/// Build flavor. Each maps to a distinct optimization level and a distinct
/// set of preprocessor markers in the emitted project files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BuildKind {
    Debug,
    Checked,
    Release,
    Final,
}

impl BuildKind {
    /// Name used for CMAKE_CONFIGURATION_TYPES.
    pub fn cmake_name(&self) -> &'static str {
        match self {
            BuildKind::Debug => "Debug",
            BuildKind::Checked => "Checked",
            BuildKind::Release => "Release",
            BuildKind::Final => "Final",
        }
    }

    /// Stable lowercase token, used in output directory names.
    pub fn key(&self) -> &'static str {
        match self {
            BuildKind::Debug => "debug",
            BuildKind::Checked => "checked",
            BuildKind::Release => "release",
            BuildKind::Final => "final",
        }
    }
}

/// How auto-libraries are linked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Linkage {
    Static,
    Shared,
}

/// Immutable build-target knobs consumed by the whole pipeline.
#[derive(Debug, Clone)]
pub struct Configuration {
    pub platform: Platform,
    pub build: BuildKind,
    pub linkage: Linkage,

    /// Development build: test applications and dev-only projects survive
    /// filtering.
    pub dev_build: bool,

    /// Root directory for the generated solution and per-project files.
    pub solution_dir: PathBuf,

    /// Directory where runtime binaries land.
    pub binary_dir: PathBuf,
}

impl Configuration {
    pub fn new(
        platform: Platform,
        build: BuildKind,
        linkage: Linkage,
        dev_build: bool,
        solution_dir: impl Into<PathBuf>,
        binary_dir: impl Into<PathBuf>,
    ) -> Self {
        Configuration {
            platform,
            build,
            linkage,
            dev_build,
            solution_dir: solution_dir.into(),
            binary_dir: binary_dir.into(),
        }
    }

    /// Root of all generated per-project directories.
    pub fn generated_dir(&self) -> PathBuf {
        self.solution_dir.join("generated")
    }

    /// Generated directory shared by every project.
    pub fn shared_generated_dir(&self) -> PathBuf {
        self.generated_dir().join("_shared")
    }

    /// Directory for static/import libraries produced by the build.
    pub fn library_dir(&self) -> PathBuf {
        self.solution_dir.join("lib")
    }
}
