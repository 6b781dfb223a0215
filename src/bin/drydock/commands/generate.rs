//! `drydock generate` command

use anyhow::{bail, Result};
use drydock::core::config::Configuration;
use drydock::core::workspace::WorkspaceManifest;
use drydock::libraries::{
    EmptyLibraryRepository, LibraryRepository, TomlLibraryRepository, LIBRARY_INDEX_NAME,
};
use drydock::ops;

use crate::cli::GenerateArgs;
use crate::commands::{host_platform, locate_manifest};

pub fn execute(args: GenerateArgs) -> Result<()> {
    let manifest_path = locate_manifest(args.manifest.as_deref())?;
    let workspace = WorkspaceManifest::load(&manifest_path)?;

    let platform = args.platform.unwrap_or_else(host_platform);

    let solution_dir = args.output.clone().unwrap_or_else(|| {
        workspace
            .root
            .join(".drydock")
            .join(format!("{}.{}", platform.key(), args.config.key()))
    });
    let binary_dir = args
        .bin_dir
        .clone()
        .unwrap_or_else(|| solution_dir.join("bin"));

    let libraries: Box<dyn LibraryRepository> = match &args.libraries {
        Some(path) => Box::new(TomlLibraryRepository::load(path)?),
        None => {
            let default = workspace.root.join(LIBRARY_INDEX_NAME);
            if default.is_file() {
                Box::new(TomlLibraryRepository::load(&default)?)
            } else {
                Box::new(EmptyLibraryRepository)
            }
        }
    };

    let config = Configuration::new(
        platform,
        args.config,
        args.libs,
        args.dev,
        solution_dir,
        binary_dir,
    );

    let summary = ops::generate(&workspace, libraries.as_ref(), &config)?;

    println!(
        "Generated {} project(s): {} file(s) scanned, {} file(s) written",
        summary.projects, summary.scanned_files, summary.files_written
    );

    if !summary.is_ok() {
        bail!("generation completed with {} error(s)", summary.failures);
    }

    Ok(())
}
