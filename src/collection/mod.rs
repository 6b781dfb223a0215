//! The project collection: population, filtering, and resolution.
//!
//! The collection owns every resolved project entry plus a name index and
//! the root include paths aggregated from all modules. The index maps every
//! live name to exactly one entry and is rebuilt from scratch whenever the
//! entry list is replaced.
//!
//! Pipeline order matters: populate → scan → filter → resolve dependencies
//! → resolve libraries. Resolution runs against the filtered collection, so
//! the `ProjectIndex` values it hands out stay valid for the backend.

pub mod entry;
pub mod errors;

use std::collections::HashMap;
use std::path::PathBuf;

use rayon::prelude::*;

use crate::core::config::Configuration;
use crate::core::manifest::{DependencySpec, ModuleManifest, ProjectKind};
use crate::libraries::LibraryRepository;

pub use entry::{FileKind, ProjectEntry, ProjectFile};
pub use errors::{PopulateError, ResolveError, ResolveReport, ScanError, ScanOutcome};

/// Identifier of an entry within its collection.
///
/// Indices are only valid against the collection state that produced them;
/// `filter` invalidates previously handed-out indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProjectIndex(usize);

/// The full set of resolved project entries.
#[derive(Debug, Default)]
pub struct ProjectCollection {
    entries: Vec<ProjectEntry>,
    index: HashMap<String, ProjectIndex>,
    root_include_paths: Vec<PathBuf>,
}

impl ProjectCollection {
    /// Build the initial entry list from a set of modules.
    ///
    /// Test applications of non-local modules are skipped entirely: they
    /// transit through references but are never built. A duplicate project
    /// name across modules is a hard error.
    pub fn from_modules(
        modules: &[ModuleManifest],
        config: &Configuration,
    ) -> Result<Self, PopulateError> {
        let mut collection = ProjectCollection::default();

        for module in modules {
            for path in &module.global_include_paths {
                if !collection.root_include_paths.contains(path) {
                    collection.root_include_paths.push(path.clone());
                }
            }

            for project in &module.projects {
                if project.kind == ProjectKind::TestApplication && !module.local {
                    continue;
                }

                if let Some(&existing) = collection.index.get(&project.name) {
                    return Err(PopulateError::DuplicateProject {
                        name: project.name.clone(),
                        first_module: collection.entries[existing.0].module.clone(),
                        second_module: module.name.clone(),
                    });
                }

                let entry = ProjectEntry::from_manifest(project, module, config);
                let idx = ProjectIndex(collection.entries.len());
                collection.index.insert(entry.name.clone(), idx);
                collection.entries.push(entry);
            }
        }

        Ok(collection)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ProjectEntry] {
        &self.entries
    }

    pub fn entry(&self, idx: ProjectIndex) -> &ProjectEntry {
        &self.entries[idx.0]
    }

    /// Look up a project by name.
    pub fn find(&self, name: &str) -> Option<ProjectIndex> {
        self.index.get(name).copied()
    }

    /// Indices of all entries, in collection order.
    pub fn indices(&self) -> impl Iterator<Item = ProjectIndex> {
        (0..self.entries.len()).map(ProjectIndex)
    }

    /// Include paths contributed by all modules, first-seen order.
    pub fn root_include_paths(&self) -> &[PathBuf] {
        &self.root_include_paths
    }

    /// Scan every project's content concurrently.
    ///
    /// Per-project scans are independent; a failing project marks the
    /// outcome invalid without stopping the others, and the total only
    /// counts projects that scanned cleanly.
    pub fn scan_content(&mut self) -> ScanOutcome {
        let results: Vec<(String, anyhow::Result<usize>)> = self
            .entries
            .par_iter_mut()
            .map(|entry| {
                let result = entry.scan_content();
                (entry.name.clone(), result)
            })
            .collect();

        let mut outcome = ScanOutcome::default();
        for (project, result) in results {
            match result {
                Ok(count) => outcome.total_files += count,
                Err(reason) => outcome.errors.push(ScanError { project, reason }),
            }
        }
        outcome
    }

    /// Drop projects that should not ship for this configuration.
    ///
    /// Disabled projects always go; without the dev flag, dev-only projects
    /// and test applications go too. Surviving entries keep their relative
    /// order and the name index is rebuilt wholesale. Returns the number of
    /// projects removed.
    pub fn filter(&mut self, config: &Configuration) -> usize {
        let old = std::mem::take(&mut self.entries);
        let before = old.len();
        self.index.clear();

        for entry in old {
            if !config.dev_build
                && (entry.options.dev_only || entry.kind == ProjectKind::TestApplication)
            {
                continue;
            }

            if entry.kind == ProjectKind::Disabled {
                continue;
            }

            let idx = ProjectIndex(self.entries.len());
            self.index.insert(entry.name.clone(), idx);
            self.entries.push(entry);
        }

        before - self.entries.len()
    }

    /// Resolve every project's declared dependencies against the filtered
    /// collection.
    ///
    /// Matching is two-phase: candidates are selected against the immutable
    /// entry list first, then written back, so sibling lookups see a
    /// consistent collection throughout. Errors accumulate per project; a
    /// failed project keeps whatever did resolve.
    pub fn resolve_dependencies(&mut self) -> ResolveReport {
        let mut report = ResolveReport::default();

        let resolved: Vec<Vec<ProjectIndex>> = self
            .entries
            .iter()
            .map(|entry| {
                let mut deps = Vec::new();
                for spec in &entry.declared_dependencies {
                    if let Err(e) = self.resolve_dependency(&entry.name, spec, &mut deps) {
                        report.errors.push(e);
                    }
                }
                deps
            })
            .collect();

        for (entry, deps) in self.entries.iter_mut().zip(resolved) {
            entry.dependencies = deps;
        }

        report
    }

    /// Resolve one declared dependency into `out`.
    ///
    /// Wildcards (`prefix*`) select every library whose name extends the
    /// prefix by exactly one path level; zero matches is still a success.
    /// Exact names must name a library; a missing name only passes when the
    /// declaration is soft.
    fn resolve_dependency(
        &self,
        project: &str,
        spec: &DependencySpec,
        out: &mut Vec<ProjectIndex>,
    ) -> Result<(), ResolveError> {
        if let Some(prefix) = spec.wildcard_prefix() {
            for (i, candidate) in self.entries.iter().enumerate() {
                // only libraries are tracked
                if !candidate.kind.is_library() {
                    continue;
                }

                if let Some(rest) = candidate.name.strip_prefix(prefix) {
                    if !rest.contains('/') {
                        push_unique(out, ProjectIndex(i));
                    }
                }
            }

            return Ok(());
        }

        match self.find(&spec.name) {
            Some(idx) => {
                if self.entry(idx).kind.is_library() {
                    push_unique(out, idx);
                    Ok(())
                } else {
                    Err(ResolveError::NotALibrary {
                        project: project.to_string(),
                        dependency: spec.name.clone(),
                    })
                }
            }
            None if spec.soft => Ok(()),
            None => Err(ResolveError::DependencyNotFound {
                project: project.to_string(),
                dependency: spec.name.clone(),
            }),
        }
    }

    /// Resolve every project's declared external libraries.
    pub fn resolve_libraries(&mut self, repo: &dyn LibraryRepository) -> ResolveReport {
        let mut report = ResolveReport::default();

        for entry in &mut self.entries {
            let mut resolved = Vec::new();

            for name in &entry.declared_libraries {
                match repo.resolve(name) {
                    Some(lib) => resolved.push(lib.clone()),
                    None => report.errors.push(ResolveError::LibraryNotFound {
                        project: entry.name.clone(),
                        library: name.clone(),
                    }),
                }
            }

            for lib in resolved {
                for path in &lib.additional_include_paths {
                    if !entry.additional_include_paths.contains(path) {
                        entry.additional_include_paths.push(path.clone());
                    }
                }
                entry.libraries.push(lib);
            }
        }

        report
    }

    /// Transitive dependency set of a project, deduplicated first-seen.
    ///
    /// Direct dependencies lead in declared order; each pulls its own
    /// dependencies in behind it. The backend's link ordering is defined
    /// over this sequence.
    pub fn collect_dependencies(&self, root: ProjectIndex) -> Vec<ProjectIndex> {
        let mut ordered = Vec::new();
        self.collect_into(root, &mut ordered);
        ordered
    }

    fn collect_into(&self, idx: ProjectIndex, ordered: &mut Vec<ProjectIndex>) {
        for &dep in &self.entry(idx).dependencies {
            if !ordered.contains(&dep) {
                ordered.push(dep);
                self.collect_into(dep, ordered);
            }
        }
    }
}

fn push_unique(out: &mut Vec<ProjectIndex>, idx: ProjectIndex) {
    if !out.contains(&idx) {
        out.push(idx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{BuildKind, Linkage, Platform};
    use crate::core::manifest::{ProjectManifest, ProjectOptions};
    use crate::libraries::{ExternalLibrary, LibraryRepository};
    use std::path::Path;

    fn config(dev_build: bool, linkage: Linkage) -> Configuration {
        Configuration::new(
            Platform::Linux,
            BuildKind::Debug,
            linkage,
            dev_build,
            "/tmp/sol",
            "/tmp/sol/bin",
        )
    }

    fn project(name: &str, kind: ProjectKind) -> ProjectManifest {
        ProjectManifest {
            name: name.to_string(),
            group: name.to_string(),
            root_path: None,
            kind,
            dependencies: Vec::new(),
            libraries: Vec::new(),
            options: ProjectOptions::default(),
        }
    }

    fn module(name: &str, local: bool, projects: Vec<ProjectManifest>) -> ModuleManifest {
        ModuleManifest {
            name: name.to_string(),
            local,
            global_include_paths: Vec::new(),
            projects,
        }
    }

    struct FixedRepository(Vec<ExternalLibrary>);

    impl LibraryRepository for FixedRepository {
        fn resolve(&self, name: &str) -> Option<&ExternalLibrary> {
            self.0.iter().find(|l| l.name == name)
        }
    }

    #[test]
    fn test_population_excludes_external_tests() {
        let modules = vec![
            module(
                "external",
                false,
                vec![
                    project("ext/lib", ProjectKind::StaticLibrary),
                    project("ext/test", ProjectKind::TestApplication),
                ],
            ),
            module(
                "local",
                true,
                vec![project("local/test", ProjectKind::TestApplication)],
            ),
        ];

        let collection =
            ProjectCollection::from_modules(&modules, &config(true, Linkage::Static)).unwrap();

        assert!(collection.find("ext/lib").is_some());
        assert!(collection.find("ext/test").is_none());
        assert!(collection.find("local/test").is_some());
    }

    #[test]
    fn test_population_rejects_duplicate_names() {
        let modules = vec![
            module("a", true, vec![project("lib/core", ProjectKind::StaticLibrary)]),
            module("b", true, vec![project("lib/core", ProjectKind::SharedLibrary)]),
        ];

        let err = ProjectCollection::from_modules(&modules, &config(true, Linkage::Static))
            .unwrap_err();

        match err {
            PopulateError::DuplicateProject {
                name,
                first_module,
                second_module,
            } => {
                assert_eq!(name, "lib/core");
                assert_eq!(first_module, "a");
                assert_eq!(second_module, "b");
            }
        }
    }

    #[test]
    fn test_population_merges_include_paths_unique() {
        let mut m1 = module("a", true, vec![]);
        m1.global_include_paths =
            vec![Path::new("/inc/a").to_path_buf(), Path::new("/inc/shared").to_path_buf()];
        let mut m2 = module("b", true, vec![]);
        m2.global_include_paths =
            vec![Path::new("/inc/shared").to_path_buf(), Path::new("/inc/b").to_path_buf()];

        let collection =
            ProjectCollection::from_modules(&[m1, m2], &config(true, Linkage::Static)).unwrap();

        let paths: Vec<_> = collection
            .root_include_paths()
            .iter()
            .map(|p| p.to_str().unwrap())
            .collect();
        assert_eq!(paths, vec!["/inc/a", "/inc/shared", "/inc/b"]);
    }

    #[test]
    fn test_auto_library_follows_configured_linkage() {
        let modules = vec![module(
            "m",
            true,
            vec![project("lib/auto", ProjectKind::AutoLibrary)],
        )];

        let shared =
            ProjectCollection::from_modules(&modules, &config(true, Linkage::Shared)).unwrap();
        let idx = shared.find("lib/auto").unwrap();
        assert_eq!(shared.entry(idx).kind, ProjectKind::SharedLibrary);

        let static_ =
            ProjectCollection::from_modules(&modules, &config(true, Linkage::Static)).unwrap();
        let idx = static_.find("lib/auto").unwrap();
        assert_eq!(static_.entry(idx).kind, ProjectKind::StaticLibrary);
    }

    fn filtering_fixture() -> Vec<ModuleManifest> {
        let mut dev_tool = project("tool/dev", ProjectKind::Application);
        dev_tool.options.dev_only = true;

        vec![module(
            "m",
            true,
            vec![
                project("lib/core", ProjectKind::StaticLibrary),
                project("app/main", ProjectKind::Application),
                project("test/core", ProjectKind::TestApplication),
                dev_tool,
                project("old/thing", ProjectKind::Disabled),
            ],
        )]
    }

    #[test]
    fn test_filter_ship_configuration() {
        let cfg = config(false, Linkage::Static);
        let mut collection =
            ProjectCollection::from_modules(&filtering_fixture(), &cfg).unwrap();

        let removed = collection.filter(&cfg);

        assert_eq!(removed, 3);
        let names: Vec<_> = collection.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["lib/core", "app/main"]);
        assert!(collection.find("test/core").is_none());
        assert!(collection.find("old/thing").is_none());
        assert_eq!(collection.find("app/main"), Some(ProjectIndex(1)));
    }

    #[test]
    fn test_filter_dev_keeps_tests_drops_disabled() {
        let cfg = config(true, Linkage::Static);
        let mut collection =
            ProjectCollection::from_modules(&filtering_fixture(), &cfg).unwrap();

        let removed = collection.filter(&cfg);

        assert_eq!(removed, 1);
        assert!(collection.find("test/core").is_some());
        assert!(collection.find("tool/dev").is_some());
        assert!(collection.find("old/thing").is_none());
    }

    #[test]
    fn test_filter_is_idempotent() {
        let cfg = config(false, Linkage::Static);
        let mut collection =
            ProjectCollection::from_modules(&filtering_fixture(), &cfg).unwrap();

        collection.filter(&cfg);
        let first: Vec<_> = collection.entries().iter().map(|e| e.name.clone()).collect();

        let removed_again = collection.filter(&cfg);
        let second: Vec<_> = collection.entries().iter().map(|e| e.name.clone()).collect();

        assert_eq!(removed_again, 0);
        assert_eq!(first, second);
    }

    fn wildcard_fixture() -> Vec<ModuleManifest> {
        let mut app = project("app", ProjectKind::Application);
        app.dependencies = vec![DependencySpec::new("lib/*")];

        vec![module(
            "m",
            true,
            vec![
                project("lib/core", ProjectKind::StaticLibrary),
                project("lib/net", ProjectKind::SharedLibrary),
                project("lib/net/http", ProjectKind::StaticLibrary),
                app,
            ],
        )]
    }

    #[test]
    fn test_wildcard_matches_direct_children_only() {
        let cfg = config(true, Linkage::Static);
        let mut collection =
            ProjectCollection::from_modules(&wildcard_fixture(), &cfg).unwrap();

        let report = collection.resolve_dependencies();
        assert!(report.is_ok());

        let app = collection.find("app").unwrap();
        let deps: Vec<_> = collection
            .entry(app)
            .dependencies
            .iter()
            .map(|&d| collection.entry(d).name.as_str())
            .collect();
        assert_eq!(deps, vec!["lib/core", "lib/net"]);
    }

    #[test]
    fn test_wildcard_without_matches_is_success() {
        let mut app = project("app", ProjectKind::Application);
        app.dependencies = vec![DependencySpec::new("plugins/*")];
        let modules = vec![module("m", true, vec![app])];

        let cfg = config(true, Linkage::Static);
        let mut collection = ProjectCollection::from_modules(&modules, &cfg).unwrap();

        let report = collection.resolve_dependencies();
        assert!(report.is_ok());
        let app = collection.find("app").unwrap();
        assert!(collection.entry(app).dependencies.is_empty());
    }

    #[test]
    fn test_non_library_dependency_fails_project_only() {
        let mut bad = project("app/bad", ProjectKind::Application);
        bad.dependencies = vec![DependencySpec::new("app/other")];
        let mut good = project("app/good", ProjectKind::Application);
        good.dependencies = vec![DependencySpec::new("lib/core")];

        let modules = vec![module(
            "m",
            true,
            vec![
                project("lib/core", ProjectKind::StaticLibrary),
                project("app/other", ProjectKind::Application),
                bad,
                good,
            ],
        )];

        let cfg = config(true, Linkage::Static);
        let mut collection = ProjectCollection::from_modules(&modules, &cfg).unwrap();

        let report = collection.resolve_dependencies();
        assert!(!report.is_ok());
        assert_eq!(report.errors.len(), 1);
        assert!(matches!(
            &report.errors[0],
            ResolveError::NotALibrary { project, dependency }
                if project == "app/bad" && dependency == "app/other"
        ));

        // the sibling still resolved
        let good = collection.find("app/good").unwrap();
        assert_eq!(collection.entry(good).dependencies.len(), 1);
    }

    #[test]
    fn test_soft_dependency_tolerates_absence() {
        let mut app = project("app", ProjectKind::Application);
        app.dependencies = vec![DependencySpec::soft("lib/optional")];
        let modules = vec![module("m", true, vec![app])];

        let cfg = config(true, Linkage::Static);
        let mut collection = ProjectCollection::from_modules(&modules, &cfg).unwrap();

        let report = collection.resolve_dependencies();
        assert!(report.is_ok());
        let app = collection.find("app").unwrap();
        assert!(collection.entry(app).dependencies.is_empty());
    }

    #[test]
    fn test_required_dependency_missing_fails() {
        let mut app = project("app", ProjectKind::Application);
        app.dependencies = vec![DependencySpec::new("lib/missing")];
        let modules = vec![module("m", true, vec![app])];

        let cfg = config(true, Linkage::Static);
        let mut collection = ProjectCollection::from_modules(&modules, &cfg).unwrap();

        let report = collection.resolve_dependencies();
        assert_eq!(report.errors.len(), 1);
        assert!(matches!(
            &report.errors[0],
            ResolveError::DependencyNotFound { dependency, .. } if dependency == "lib/missing"
        ));
    }

    #[test]
    fn test_transitive_closure_first_seen_order() {
        let mut app = project("app", ProjectKind::Application);
        app.dependencies = vec![
            DependencySpec::new("lib/a"),
            DependencySpec::new("lib/b"),
            DependencySpec::new("lib/c"),
        ];
        let mut lib_a = project("lib/a", ProjectKind::StaticLibrary);
        lib_a.dependencies = vec![DependencySpec::new("lib/base")];
        let mut lib_b = project("lib/b", ProjectKind::StaticLibrary);
        lib_b.dependencies = vec![DependencySpec::new("lib/base")];

        let modules = vec![module(
            "m",
            true,
            vec![
                app,
                lib_a,
                lib_b,
                project("lib/c", ProjectKind::StaticLibrary),
                project("lib/base", ProjectKind::StaticLibrary),
            ],
        )];

        let cfg = config(true, Linkage::Static);
        let mut collection = ProjectCollection::from_modules(&modules, &cfg).unwrap();
        assert!(collection.resolve_dependencies().is_ok());

        let app = collection.find("app").unwrap();
        let closure: Vec<_> = collection
            .collect_dependencies(app)
            .iter()
            .map(|&d| collection.entry(d).name.clone())
            .collect();
        assert_eq!(closure, vec!["lib/a", "lib/base", "lib/b", "lib/c"]);
    }

    #[test]
    fn test_resolve_libraries_accumulates_misses() {
        let mut uses_both = project("app/a", ProjectKind::Application);
        uses_both.libraries = vec!["zlib".to_string(), "missing".to_string()];
        let mut uses_one = project("app/b", ProjectKind::Application);
        uses_one.libraries = vec!["zlib".to_string()];

        let modules = vec![module("m", true, vec![uses_both, uses_one])];
        let cfg = config(true, Linkage::Static);
        let mut collection = ProjectCollection::from_modules(&modules, &cfg).unwrap();

        let repo = FixedRepository(vec![ExternalLibrary {
            name: "zlib".to_string(),
            include_path: Some(Path::new("/sdk/zlib/include").to_path_buf()),
            additional_include_paths: vec![Path::new("/sdk/zlib/extra").to_path_buf()],
            ..Default::default()
        }]);

        let report = collection.resolve_libraries(&repo);
        assert_eq!(report.errors.len(), 1);
        assert!(matches!(
            &report.errors[0],
            ResolveError::LibraryNotFound { project, library }
                if project == "app/a" && library == "missing"
        ));

        let a = collection.find("app/a").unwrap();
        assert_eq!(collection.entry(a).libraries.len(), 1);
        assert_eq!(
            collection.entry(a).additional_include_paths,
            vec![Path::new("/sdk/zlib/extra").to_path_buf()]
        );

        let b = collection.find("app/b").unwrap();
        assert_eq!(collection.entry(b).libraries.len(), 1);
    }

    #[test]
    fn test_scan_aggregates_partial_failure() {
        use tempfile::TempDir;

        let tmp = TempDir::new().unwrap();
        let mut projects = Vec::new();

        for i in 0..4 {
            let root = tmp.path().join(format!("proj{i}"));
            let src = root.join("src");
            std::fs::create_dir_all(&src).unwrap();
            std::fs::write(src.join("main.cpp"), "").unwrap();
            std::fs::write(src.join("util.h"), "").unwrap();

            let mut p = project(&format!("proj{i}"), ProjectKind::StaticLibrary);
            p.root_path = Some(root);
            projects.push(p);
        }

        let mut broken = project("broken", ProjectKind::StaticLibrary);
        broken.root_path = Some(tmp.path().join("does-not-exist"));
        projects.push(broken);

        let cfg = config(true, Linkage::Static);
        let mut collection =
            ProjectCollection::from_modules(&[module("m", true, projects)], &cfg).unwrap();

        let outcome = collection.scan_content();

        assert!(!outcome.is_ok());
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].project, "broken");
        assert_eq!(outcome.total_files, 8);
    }
}
