use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::error::PackageError;
use crate::request::Runtime;

pub trait DependencyInstaller {
    /// Installs everything declared in `manifest` into `target_dir`.
    fn install(&self, manifest: &Path, target_dir: &Path) -> Result<(), PackageError>;
}

/// Resolves dependencies with `<runtime> -m pip install --target ...`.
#[derive(Debug, Clone)]
pub struct PipInstaller {
    interpreter: String,
}

impl PipInstaller {
    pub fn for_runtime(runtime: &Runtime) -> Self {
        Self {
            interpreter: runtime.identifier().to_string(),
        }
    }

    fn command(&self, manifest: &Path, target_dir: &Path) -> Command {
        let mut command = Command::new(&self.interpreter);
        command
            .args(["-m", "pip", "-q", "install", "--target"])
            .arg(target_dir)
            .arg("--requirement")
            .arg(manifest);
        command
    }
}

impl DependencyInstaller for PipInstaller {
    fn install(&self, manifest: &Path, target_dir: &Path) -> Result<(), PackageError> {
        let mut command = self.command(manifest, target_dir);
        debug!(command = ?command, "installing dependencies");

        let status = command
            .status()
            .map_err(|source| PackageError::InstallerSpawn {
                program: self.interpreter.clone(),
                source,
            })?;

        if !status.success() {
            return Err(PackageError::Install { status });
        }
        Ok(())
    }
}
