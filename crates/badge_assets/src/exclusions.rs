use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use glob::Pattern;
use tracing::debug;

use crate::error::PackageError;
use crate::workspace::remove_path;

/// Libraries the function runtime already provides.
pub const EXCLUDE_DEPENDENCIES: &[&str] = &[
    "urllib3",
    "six",
    "s3transfer",
    "python-dateutil",
    "jmespath",
    "docutils",
    "botocore",
    "boto3",
    "setuptools",
    "pip",
];

/// Install metadata and bytecode caches.
pub const EXCLUDE_FILES: &[&str] = &["*.dist-info", "__pycache__", "*.pyc", "*.pyo"];

pub fn exclusion_patterns() -> impl Iterator<Item = &'static str> {
    EXCLUDE_DEPENDENCIES
        .iter()
        .chain(EXCLUDE_FILES.iter())
        .copied()
}

/// Removes every excluded entry at any depth under `build_dir`.
///
/// Removal is best effort: failures are logged and skipped. Returns the
/// paths that were actually removed.
pub fn prune_build_dir(build_dir: &Path) -> Result<Vec<PathBuf>, PackageError> {
    prune_with(build_dir, remove_path)
}

fn prune_with(
    build_dir: &Path,
    remove: impl Fn(&Path) -> io::Result<()>,
) -> Result<Vec<PathBuf>, PackageError> {
    let escaped_root = Pattern::escape(&build_dir.to_string_lossy());
    let mut matches = Vec::new();

    for name in exclusion_patterns() {
        let pattern = format!("{escaped_root}/**/{name}");
        debug!(pattern = %pattern, "excluding");
        let paths = glob::glob(&pattern).map_err(|source| PackageError::Pattern {
            pattern: pattern.clone(),
            source,
        })?;
        for entry in paths {
            match entry {
                Ok(path) => matches.push(path),
                Err(error) => debug!(error = %error, "skipping unreadable path"),
            }
        }
    }

    // Parents sort before their children, so nested matches disappear with
    // the parent and are skipped below.
    matches.sort();
    matches.dedup();

    let mut removed = Vec::new();
    for path in matches {
        if fs::symlink_metadata(&path).is_err() {
            continue;
        }
        match remove(&path) {
            Ok(()) => removed.push(path),
            Err(error) => {
                debug!(path = %path.display(), error = %error, "error while deleting file")
            }
        }
    }

    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("parent should be created");
        }
        fs::write(path, b"x").expect("file should be written");
    }

    #[test]
    fn removes_runtime_dependencies_and_caches() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let build = dir.path();
        touch(&build.join("boto3/__init__.py"));
        touch(&build.join("botocore/data/s3.json"));
        touch(&build.join("requests/__init__.py"));
        touch(&build.join("requests/__pycache__/api.cpython-38.pyc"));
        touch(&build.join("requests-2.25.1.dist-info/METADATA"));
        touch(&build.join("handler.pyc"));

        let removed = prune_build_dir(build).expect("prune should succeed");

        assert!(!build.join("boto3").exists());
        assert!(!build.join("botocore").exists());
        assert!(!build.join("requests/__pycache__").exists());
        assert!(!build.join("requests-2.25.1.dist-info").exists());
        assert!(!build.join("handler.pyc").exists());
        assert!(build.join("requests/__init__.py").exists());
        assert!(removed.len() >= 5);
    }

    #[test]
    fn removal_failures_are_skipped() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let build = dir.path();
        touch(&build.join("boto3/__init__.py"));
        touch(&build.join("six.py"));
        touch(&build.join("six/moves.py"));

        let removed = prune_with(build, |path| {
            if path.ends_with("boto3") {
                Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only parent"))
            } else {
                remove_path(path)
            }
        })
        .expect("prune should succeed despite a failed removal");

        assert!(build.join("boto3/__init__.py").exists());
        assert!(!removed.iter().any(|path| path.ends_with("boto3")));
        assert!(!build.join("six").exists());
        assert_eq!(removed.len(), 1);
        assert!(removed[0].ends_with("six"));
    }

    #[test]
    fn handles_build_dirs_with_glob_metacharacters() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let build = dir.path().join("odd[name]");
        touch(&build.join("pip/__init__.py"));
        touch(&build.join("app.py"));

        prune_build_dir(&build).expect("prune should succeed");

        assert!(!build.join("pip").exists());
        assert!(build.join("app.py").exists());
    }
}
