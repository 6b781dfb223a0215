//! `drydock tree` command

use anyhow::Result;
use drydock::collection::ProjectCollection;
use drydock::core::config::{BuildKind, Configuration};
use drydock::core::manifest::ProjectKind;
use drydock::core::workspace::WorkspaceManifest;
use drydock::ProjectIndex;

use crate::cli::TreeArgs;
use crate::commands::{host_platform, locate_manifest};

pub fn execute(args: TreeArgs) -> Result<()> {
    let manifest_path = locate_manifest(args.manifest.as_deref())?;
    let workspace = WorkspaceManifest::load(&manifest_path)?;
    let modules = workspace.load_modules()?;

    // dev configuration so the full graph shows, including tests
    let platform = args.platform.unwrap_or_else(host_platform);
    let scratch = workspace.root.join(".drydock");
    let config = Configuration::new(
        platform,
        BuildKind::Debug,
        args.libs,
        true,
        scratch.clone(),
        scratch.join("bin"),
    );

    let mut collection = ProjectCollection::from_modules(&modules, &config)?;
    collection.filter(&config);

    let report = collection.resolve_dependencies();
    for error in &report.errors {
        tracing::error!("{}", error);
    }

    for idx in collection.indices() {
        print_project(&collection, idx);
    }

    if !report.is_ok() {
        anyhow::bail!("{} project(s) failed to resolve", report.errors.len());
    }

    Ok(())
}

fn print_project(collection: &ProjectCollection, idx: ProjectIndex) {
    let entry = collection.entry(idx);
    println!("{} [{}]", entry.name, kind_label(entry.kind));

    let deps = entry.dependencies.len();
    for (i, &dep) in entry.dependencies.iter().enumerate() {
        let glyph = if i + 1 == deps && entry.declared_libraries.is_empty() {
            "└──"
        } else {
            "├──"
        };
        println!("{} {}", glyph, collection.entry(dep).name);
    }

    let libs = entry.declared_libraries.len();
    for (i, lib) in entry.declared_libraries.iter().enumerate() {
        let glyph = if i + 1 == libs { "└──" } else { "├──" };
        println!("{} {} (external)", glyph, lib);
    }
}

fn kind_label(kind: ProjectKind) -> &'static str {
    match kind {
        ProjectKind::Application => "application",
        ProjectKind::TestApplication => "test application",
        ProjectKind::SharedLibrary => "shared library",
        ProjectKind::StaticLibrary => "static library",
        ProjectKind::AutoLibrary => "auto library",
        ProjectKind::Disabled => "disabled",
    }
}
