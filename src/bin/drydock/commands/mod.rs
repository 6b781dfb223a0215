//! Command implementations

pub mod generate;
pub mod tree;

use std::path::{Path, PathBuf};

use anyhow::Result;
use drydock::core::config::Platform;
use drydock::core::workspace::find_workspace_manifest;

/// Resolve the workspace manifest path from an explicit argument or by
/// walking up from the current directory.
pub(crate) fn locate_manifest(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    let cwd = std::env::current_dir()?;
    find_workspace_manifest(&cwd).ok_or_else(|| {
        anyhow::anyhow!(
            "could not find drydock.toml in {} or any parent directory\n\
             help: Create a drydock.toml naming your modules",
            cwd.display()
        )
    })
}

/// Platform drydock is running on, used when `--platform` is omitted.
pub(crate) fn host_platform() -> Platform {
    if cfg!(windows) {
        Platform::Windows
    } else if cfg!(target_os = "macos") {
        if cfg!(target_arch = "aarch64") {
            Platform::DarwinArm
        } else {
            Platform::Darwin
        }
    } else {
        Platform::Linux
    }
}
