use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::PackageError;

pub(crate) const BUILD_ROOT: &str = ".build";
const BUILD_ID_LEN: usize = 8;

/// Intermediate directories of one packaging run.
///
/// Dropping the workspace removes the build and package directories, and
/// also the artifact unless [`BuildWorkspace::commit`] was called, so a
/// failed run leaves no half-written output behind.
pub(crate) struct BuildWorkspace {
    pub(crate) build_id: String,
    pub(crate) build_dir: PathBuf,
    pub(crate) package_dir: PathBuf,
    pub(crate) out_dir: PathBuf,
    pub(crate) zip_file: PathBuf,
    committed: bool,
    remove: fn(&Path) -> io::Result<()>,
}

impl BuildWorkspace {
    /// Discards `<work_dir>/.build` and creates fresh, uniquely named build
    /// and package directories inside it.
    pub(crate) fn create(work_dir: &Path) -> Result<Self, PackageError> {
        let build_root = work_dir.join(BUILD_ROOT);
        if let Err(error) = fs::remove_dir_all(&build_root) {
            if error.kind() != std::io::ErrorKind::NotFound {
                debug!(
                    path = %build_root.display(),
                    error = %error,
                    "could not clear previous build"
                );
            }
        }

        let build_id = Uuid::new_v4().simple().to_string()[..BUILD_ID_LEN].to_string();
        let workspace = Self {
            build_dir: build_root.join(format!("{build_id}_build")),
            package_dir: build_root.join(format!("{build_id}_package")),
            out_dir: build_root.join(format!("{build_id}_out")),
            zip_file: build_root.join(format!("{build_id}.zip")),
            build_id,
            committed: false,
            remove: remove_path,
        };

        for dir in [&workspace.build_dir, &workspace.package_dir] {
            fs::create_dir_all(dir)
                .map_err(PackageError::io(format!("failed to create {}", dir.display())))?;
        }

        debug!(work_dir = %work_dir.display(), "working directory");
        debug!(build_dir = %workspace.build_dir.display(), "build directory");
        Ok(workspace)
    }

    pub(crate) fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for BuildWorkspace {
    fn drop(&mut self) {
        let mut doomed = vec![self.build_dir.clone(), self.package_dir.clone()];
        if !self.committed {
            doomed.push(self.out_dir.clone());
            doomed.push(self.zip_file.clone());
        }
        for path in doomed {
            match (self.remove)(&path) {
                Ok(()) => {}
                Err(error) if error.kind() == io::ErrorKind::NotFound => {}
                Err(error) => {
                    warn!(path = %path.display(), error = %error, "failed to clean up build path")
                }
            }
        }
    }
}

/// Removes a file, symlink or whole directory tree without following links.
pub(crate) fn remove_path(path: &Path) -> io::Result<()> {
    if fs::symlink_metadata(path)?.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drop_removes_uncommitted_outputs() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let workspace = BuildWorkspace::create(dir.path()).expect("workspace should be created");
        fs::write(&workspace.zip_file, b"partial").expect("zip should be written");
        let build_dir = workspace.build_dir.clone();
        let zip_file = workspace.zip_file.clone();

        drop(workspace);

        assert!(!build_dir.exists());
        assert!(!zip_file.exists());
    }

    #[test]
    fn commit_keeps_the_artifact() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let workspace = BuildWorkspace::create(dir.path()).expect("workspace should be created");
        fs::write(&workspace.zip_file, b"done").expect("zip should be written");
        let package_dir = workspace.package_dir.clone();
        let zip_file = workspace.zip_file.clone();

        workspace.commit();

        assert!(!package_dir.exists());
        assert!(zip_file.exists());
    }

    #[test]
    fn failed_cleanup_is_skipped_and_the_rest_still_removed() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let mut workspace =
            BuildWorkspace::create(dir.path()).expect("workspace should be created");
        workspace.remove = |path: &Path| {
            if path.to_string_lossy().ends_with("_build") {
                Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
            } else {
                remove_path(path)
            }
        };
        let build_dir = workspace.build_dir.clone();
        let package_dir = workspace.package_dir.clone();

        drop(workspace);

        assert!(build_dir.exists());
        assert!(!package_dir.exists());
    }

    #[test]
    fn create_discards_previous_build_state() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let stale = dir.path().join(BUILD_ROOT).join("stale_build/file.txt");
        fs::create_dir_all(stale.parent().expect("stale path has a parent"))
            .expect("stale dir should be created");
        fs::write(&stale, b"old").expect("stale file should be written");

        let workspace = BuildWorkspace::create(dir.path()).expect("workspace should be created");

        assert!(!stale.exists());
        assert_eq!(workspace.build_id.len(), BUILD_ID_LEN);
        assert!(workspace.build_dir.is_dir());
    }
}
