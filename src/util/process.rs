//! Subprocess execution and tool probing.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use anyhow::{bail, Context, Result};
use semver::Version;

/// Builder for subprocess execution.
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
    cwd: Option<PathBuf>,
}

impl ProcessBuilder {
    /// Create a new process builder for the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            cwd: None,
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    /// Set the working directory.
    pub fn cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    /// Execute and capture output.
    pub fn exec(&self) -> Result<Output> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        if let Some(cwd) = &self.cwd {
            cmd.current_dir(cwd);
        }

        cmd.output()
            .with_context(|| format!("failed to execute {}", self.program.display()))
    }

    /// Execute, failing on a non-zero exit status.
    pub fn exec_and_check(&self) -> Result<Output> {
        let output = self.exec()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "{} exited with {}\n{}",
                self.program.display(),
                output.status,
                stderr
            );
        }
        Ok(output)
    }
}

/// Find an executable in PATH.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}

/// Find the CMake executable.
pub fn find_cmake() -> Option<PathBuf> {
    find_executable("cmake")
}

/// Query the installed CMake version.
pub fn cmake_version() -> Result<Version> {
    let cmake = find_cmake().context(
        "CMake not found\n\
         \n\
         CMake is required to consume the generated solution.\n\
         Install CMake and ensure it's in your PATH.",
    )?;

    let output = ProcessBuilder::new(&cmake).arg("--version").exec_and_check()?;
    parse_cmake_version(&String::from_utf8_lossy(&output.stdout))
}

/// Parse the first line of `cmake --version` output.
pub fn parse_cmake_version(text: &str) -> Result<Version> {
    let token = text
        .lines()
        .find_map(|l| l.trim().strip_prefix("cmake version "))
        .context("unrecognized `cmake --version` output")?;

    // nightly builds carry -gHASH style suffixes
    let core = token.split(['-', '+']).next().unwrap_or(token).trim();

    Version::parse(core).with_context(|| format!("unparsable cmake version `{token}`"))
}

/// Verify that the installed CMake meets a minimum version.
pub fn ensure_cmake(minimum: &Version) -> Result<()> {
    let version = cmake_version()?;
    if version < *minimum {
        bail!(
            "cmake {} is too old: {} or newer is required",
            version,
            minimum
        );
    }
    Ok(())
}
