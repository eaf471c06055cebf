//! Executable path resolution for sub-commands.

use std::path::{Path, PathBuf};

/// Directory, relative to the consuming project, that holds installed
/// package dependencies.
pub const DEPENDENCY_DIR: &str = "node_modules";

/// How the running and-cli instance was deployed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InstallMode {
    /// Consumed as a package dependency of another project.
    InstalledDependency,
    /// Running from the and-cli checkout itself.
    #[default]
    DevelopmentCheckout,
}

impl InstallMode {
    pub fn from_installed_flag(is_installed_dependency: bool) -> Self {
        if is_installed_dependency {
            InstallMode::InstalledDependency
        } else {
            InstallMode::DevelopmentCheckout
        }
    }
}

impl std::fmt::Display for InstallMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InstallMode::InstalledDependency => write!(f, "installed dependency"),
            InstallMode::DevelopmentCheckout => write!(f, "development checkout"),
        }
    }
}

/// Computes `<cli-name>-<command>` executable paths.
///
/// Resolution never touches the filesystem. A missing executable is reported
/// by whoever spawns the path.
#[derive(Debug, Clone)]
pub struct PathResolver {
    cli_name: String,
    project_dir: PathBuf,
}

impl PathResolver {
    pub fn new(cli_name: impl Into<String>, project_dir: impl AsRef<Path>) -> Self {
        Self {
            cli_name: cli_name.into(),
            project_dir: project_dir.as_ref().to_path_buf(),
        }
    }

    pub fn cli_name(&self) -> &str {
        &self.cli_name
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// File name of the executable for `command`.
    pub fn file_name(&self, command: &str) -> String {
        format!(
            "{}-{}{}",
            self.cli_name,
            command,
            std::env::consts::EXE_SUFFIX
        )
    }

    /// Directory that executables are rooted under for the given mode.
    pub fn root(&self, mode: InstallMode) -> PathBuf {
        match mode {
            InstallMode::InstalledDependency => {
                self.project_dir.join(DEPENDENCY_DIR).join(&self.cli_name)
            }
            InstallMode::DevelopmentCheckout => self.project_dir.clone(),
        }
    }

    pub fn resolve(&self, command: &str, mode: InstallMode) -> PathBuf {
        self.root(mode).join(self.file_name(command))
    }
}
