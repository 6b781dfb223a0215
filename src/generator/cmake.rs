//! CMake backend.
//!
//! Renders one top-level `CMakeLists.txt` aggregating every buildable
//! project, plus one `CMakeLists.txt` per project under its generated
//! directory. Line order within a file is fixed so regenerated output stays
//! byte-identical for an unchanged collection.

use std::path::{Path, PathBuf};

use anyhow::Result;
use rayon::prelude::*;
use semver::Version;

use crate::collection::{FileKind, ProjectCollection, ProjectEntry, ProjectIndex};
use crate::core::config::{BuildKind, Configuration, Platform};
use crate::core::manifest::ProjectKind;
use crate::generator::{
    FileSet, GenerateFailure, GenerateOutcome, GeneratedFile, SolutionGenerator,
};
use crate::util::process::ensure_cmake;

/// Oldest CMake the emitted files are known to work with.
pub fn minimum_cmake_version() -> Version {
    Version::new(3, 22, 0)
}

macro_rules! wl {
    ($dst:expr) => {{
        use std::fmt::Write as _;
        let _ = writeln!($dst);
    }};
    ($dst:expr, $($arg:tt)*) => {{
        use std::fmt::Write as _;
        let _ = writeln!($dst, $($arg)*);
    }};
}

/// CMake solution generator.
pub struct CmakeGenerator {
    config: Configuration,
    solution_name: String,
}

impl CmakeGenerator {
    pub fn new(config: Configuration, solution_name: impl Into<String>) -> Self {
        CmakeGenerator {
            config,
            solution_name: solution_name.into(),
        }
    }

    /// Include directories for one project, in emission order: collection
    /// roots, the project's own `src`/`include`, the shared generated
    /// directory, the project's generated directory, then everything
    /// attached during library resolution.
    fn include_paths(&self, collection: &ProjectCollection, entry: &ProjectEntry) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = collection.root_include_paths().to_vec();

        if let Some(root) = &entry.root_path {
            paths.push(root.join("src"));
            paths.push(root.join("include"));
        }

        paths.push(self.config.shared_generated_dir());
        paths.push(entry.generated_path.clone());
        paths.extend(entry.additional_include_paths.iter().cloned());
        paths
    }

    fn emit_solution(&self, collection: &ProjectCollection) -> GeneratedFile {
        let minimum = minimum_cmake_version();
        let mut f = String::new();

        wl!(f, "# Drydock");
        wl!(f, "# AutoGenerated file. Please DO NOT MODIFY.");
        wl!(f);
        wl!(f, "project({})", target_name(&self.solution_name));
        wl!(f);
        wl!(f, "cmake_minimum_required(VERSION {}.{})", minimum.major, minimum.minor);
        wl!(f);
        wl!(f, "set(CMAKE_VERBOSE_MAKEFILE ON)");
        wl!(f, "set(CMAKE_COLOR_MAKEFILE ON)");
        wl!(f, "set(CMAKE_CONFIGURATION_TYPES \"{}\")", self.config.build.cmake_name());
        wl!(f, "set(CMAKE_ARCHIVE_OUTPUT_DIRECTORY {})", escape_path(&self.config.library_dir()));
        wl!(f, "set(CMAKE_LIBRARY_OUTPUT_DIRECTORY {})", escape_path(&self.config.library_dir()));
        wl!(f, "set(CMAKE_RUNTIME_OUTPUT_DIRECTORY {})", escape_path(&self.config.binary_dir));
        wl!(f, "set_property(GLOBAL PROPERTY USE_FOLDERS ON)");
        wl!(f);

        for entry in collection.entries() {
            if entry.kind.is_buildable() {
                wl!(f, "add_subdirectory({})", escape_path(&entry.generated_path));
            }
        }

        GeneratedFile::new(self.config.solution_dir.join("CMakeLists.txt"), f)
    }

    fn emit_project(
        &self,
        collection: &ProjectCollection,
        idx: ProjectIndex,
    ) -> Result<GeneratedFile> {
        let entry = collection.entry(idx);
        let windows = self.config.platform.is_windows_family();
        let target = target_name(&entry.name);
        let static_link = entry.kind == ProjectKind::StaticLibrary;

        let mut f = String::new();

        wl!(f, "# Drydock");
        wl!(f, "# AutoGenerated file. Please DO NOT MODIFY.");
        wl!(f);
        wl!(f, "project({})", target);
        wl!(f);
        wl!(f, "set(CMAKE_CXX_STANDARD 17)");
        wl!(f, "set(CMAKE_CXX_STANDARD_REQUIRED ON)");
        wl!(f, "set(CMAKE_CXX_EXTENSIONS OFF)");
        wl!(f);
        wl!(f, "add_definitions(-DPROJECT_NAME={})", target);
        wl!(f, "set(CMAKE_CONFIGURATION_TYPES \"{}\")", self.config.build.cmake_name());

        if static_link {
            wl!(f, "add_definitions(-DBUILD_AS_LIBS)");
        } else {
            wl!(f, "add_definitions(-D{}_EXPORTS)", macro_name(&entry.name));
            if entry.kind == ProjectKind::SharedLibrary {
                wl!(f, "add_definitions(-DBUILD_DLL)");
            }
        }

        // existence flags let sources detect optional dependencies
        for &dep in &entry.dependencies {
            let dep = collection.entry(dep);
            if dep.kind.is_library() {
                wl!(f, "add_definitions(-DHAS_{})", macro_name(&dep.name));
            }
        }

        wl!(f, "set(CMAKE_EXE_LINKER_FLAGS_CHECKED \"${{CMAKE_EXE_LINKER_FLAGS_RELEASE}}\")");
        wl!(f, "set(CMAKE_SHARED_LINKER_FLAGS_CHECKED \"${{CMAKE_SHARED_LINKER_FLAGS_RELEASE}}\")");

        if self.config.platform == Platform::Windows {
            wl!(f, "set(CMAKE_CXX_FLAGS \"${{CMAKE_CXX_FLAGS}} /MP\")");
        }

        match self.config.build {
            BuildKind::Debug => {
                wl!(f, "set(CMAKE_CXX_FLAGS \"${{CMAKE_CXX_FLAGS}} -DBUILD_DEBUG -D_DEBUG -DDEBUG\")")
            }
            BuildKind::Checked => {
                wl!(f, "set(CMAKE_CXX_FLAGS \"${{CMAKE_CXX_FLAGS}} -DBUILD_CHECKED -DNDEBUG\")")
            }
            BuildKind::Release => {
                wl!(f, "set(CMAKE_CXX_FLAGS \"${{CMAKE_CXX_FLAGS}} -DBUILD_RELEASE -DNDEBUG\")")
            }
            BuildKind::Final => {
                wl!(f, "set(CMAKE_CXX_FLAGS \"${{CMAKE_CXX_FLAGS}} -DBUILD_RELEASE -DBUILD_FINAL -DNDEBUG\")")
            }
        }

        if windows {
            wl!(f, "add_definitions(-DUNICODE -D_UNICODE -D_WIN64 -D_WINDOWS -DWIN32_LEAN_AND_MEAN -DNOMINMAX)");
            wl!(f, "add_definitions(-D_SILENCE_ALL_CXX17_DEPRECATION_WARNINGS)");

            if !entry.options.use_window_subsystem {
                wl!(f, "add_definitions(-DCONSOLE)");
            }
        } else {
            wl!(f, "set(CMAKE_CXX_FLAGS \"${{CMAKE_CXX_FLAGS}} -pthread\")");

            if entry.options.use_exceptions {
                wl!(f, "set(CMAKE_CXX_FLAGS \"${{CMAKE_CXX_FLAGS}} -fexceptions\")");
            } else {
                wl!(f, "set(CMAKE_CXX_FLAGS \"${{CMAKE_CXX_FLAGS}} -fno-exceptions\")");
            }

            wl!(f, "set(CMAKE_CXX_FLAGS \"${{CMAKE_CXX_FLAGS}} -g\")");

            match self.config.build {
                BuildKind::Debug => {
                    wl!(f, "set(CMAKE_CXX_FLAGS \"${{CMAKE_CXX_FLAGS}} -O0 -m64 -fstack-protector-all\")")
                }
                BuildKind::Checked => {
                    wl!(f, "set(CMAKE_CXX_FLAGS \"${{CMAKE_CXX_FLAGS}} -O2 -m64 -fstack-protector-all\")")
                }
                BuildKind::Release | BuildKind::Final => {
                    wl!(f, "set(CMAKE_CXX_FLAGS \"${{CMAKE_CXX_FLAGS}} -O3 -m64 -fno-stack-protector\")")
                }
            }
        }

        wl!(f);
        wl!(f, "# Project include directories");
        for path in self.include_paths(collection, entry) {
            wl!(f, "include_directories({})", escape_path(&path));
        }

        wl!(f);
        wl!(f, "# Project library includes");
        for lib in &entry.libraries {
            if let Some(include) = &lib.include_path {
                wl!(f, "include_directories({})", escape_path(include));
            }

            for file in &lib.library_files {
                wl!(f, "link_libraries({})", escape_path(file));
            }
        }

        wl!(f);
        wl!(f, "# Project files");
        for file in &entry.files {
            match file.kind {
                FileKind::Source => wl!(f, "list(APPEND FILE_SOURCES {})", escape_path(&file.path)),
                FileKind::Header => wl!(f, "list(APPEND FILE_HEADERS {})", escape_path(&file.path)),
                FileKind::Other => {}
            }
        }

        wl!(f);
        wl!(f, "# Project output");
        if entry.kind.is_application() {
            if entry.options.use_window_subsystem && self.config.platform == Platform::Windows {
                wl!(f, "add_executable({} WIN32 ${{FILE_SOURCES}} ${{FILE_HEADERS}})", target);
            } else {
                wl!(f, "add_executable({} ${{FILE_SOURCES}} ${{FILE_HEADERS}})", target);
            }
        } else if static_link {
            wl!(f, "add_library({} ${{FILE_SOURCES}} ${{FILE_HEADERS}})", target);
        } else {
            wl!(f, "add_library({} SHARED ${{FILE_SOURCES}} ${{FILE_HEADERS}})", target);
        }
        wl!(f);

        if entry.kind.is_application() {
            wl!(f, "# Project dependencies");

            let mut deps = collection.collect_dependencies(idx);
            if !windows {
                // single-pass linkers need dependents before dependencies
                deps.reverse();
            }

            for dep in deps {
                wl!(f, "target_link_libraries({} {})", target, target_name(&collection.entry(dep).name));
            }
            wl!(f);
        }

        if self.config.platform.is_posix_family() {
            wl!(f, "# Hardcoded system libraries");

            let mut libs: Vec<String> = vec!["dl".to_string()];
            if self.config.platform == Platform::Linux {
                libs.push("rt".to_string());
            } else if self.config.platform.is_darwin_family() {
                libs.push("stdc++".to_string());
            }

            let mut frameworks: Vec<String> = Vec::new();
            for lib in &entry.libraries {
                for name in &lib.system_libraries {
                    if !libs.contains(name) {
                        libs.push(name.clone());
                    }
                }
                for name in &lib.system_frameworks {
                    if !frameworks.contains(name) {
                        frameworks.push(name.clone());
                    }
                }
            }

            if self.config.platform.is_darwin_family() {
                let had_frameworks = !frameworks.is_empty();
                for name in frameworks {
                    libs.push(format!("\"-framework {}\"", name));
                }
                if had_frameworks {
                    libs.push("objc".to_string());
                }
            }

            wl!(f, "target_link_libraries({} {})", target, libs.join(" "));
        } else {
            wl!(f, "# Precompiled header setup");

            for file in &entry.files {
                if file.kind != FileKind::Source {
                    continue;
                }

                if file.name == "build.cpp" || file.name == "build.cxx" {
                    wl!(f, "set_source_files_properties({} PROPERTIES COMPILE_FLAGS \"/Ycbuild.h\")", escape_path(&file.path));
                } else if file.use_precompiled_header {
                    wl!(f, "set_source_files_properties({} PROPERTIES COMPILE_FLAGS \"/Yubuild.h\")", escape_path(&file.path));
                }
            }
        }
        wl!(f);

        if entry.kind == ProjectKind::SharedLibrary && self.config.platform.is_posix_family() {
            let artifact = if self.config.platform.is_darwin_family() {
                format!("lib{}.dylib", target)
            } else {
                format!("lib{}.so", target)
            };

            wl!(f, "# Final copy of the shared library to the binary folder");
            wl!(f, "add_custom_command(TARGET {} POST_BUILD", target);
            wl!(f, "\tCOMMAND ${{CMAKE_COMMAND}} -E copy");
            wl!(f, "\t${{CMAKE_LIBRARY_OUTPUT_DIRECTORY}}/{}", artifact);
            wl!(f, "\t${{CMAKE_RUNTIME_OUTPUT_DIRECTORY}}/{})", artifact);
        }

        Ok(GeneratedFile::new(entry.generated_path.join("CMakeLists.txt"), f))
    }
}

impl SolutionGenerator for CmakeGenerator {
    fn generate_solution(&self, collection: &ProjectCollection, out: &mut FileSet) -> Result<()> {
        ensure_cmake(&minimum_cmake_version())?;
        out.push(self.emit_solution(collection));
        Ok(())
    }

    fn generate_projects(
        &self,
        collection: &ProjectCollection,
        out: &mut FileSet,
    ) -> GenerateOutcome {
        let buildable: Vec<ProjectIndex> = collection
            .indices()
            .filter(|&i| collection.entry(i).kind.is_buildable())
            .collect();

        let results: Vec<(ProjectIndex, Result<GeneratedFile>)> = buildable
            .par_iter()
            .map(|&idx| (idx, self.emit_project(collection, idx)))
            .collect();

        let mut outcome = GenerateOutcome::default();
        for (idx, result) in results {
            match result {
                Ok(file) => out.push(file),
                Err(reason) => outcome.errors.push(GenerateFailure {
                    project: collection.entry(idx).name.clone(),
                    reason,
                }),
            }
        }
        outcome
    }
}

/// CMake target identifier for a possibly path-like project name.
fn target_name(name: &str) -> String {
    name.replace(['/', '-'], "_")
}

/// Preprocessor macro fragment for a project name.
fn macro_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Quote a path for CMake, with forward slashes throughout.
fn escape_path(path: &Path) -> String {
    format!("\"{}\"", path.display().to_string().replace('\\', "/"))
}
