use std::fs;
use std::io::Write;
use std::path::Path;

use tracing::debug;
use walkdir::WalkDir;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::PackageError;

const DEFAULT_FILE_MODE: u32 = 0o644;
const DEFAULT_DIR_MODE: u32 = 0o755;

/// Compresses the contents of `root_dir` (not the directory itself) into
/// `zip_path`, keeping unix permissions. Symlinks are stored as the
/// entries they point to.
pub fn zip_directory(root_dir: &Path, zip_path: &Path) -> Result<(), PackageError> {
    let file = fs::File::create(zip_path)
        .map_err(PackageError::io(format!("failed to create {}", zip_path.display())))?;
    let mut zip = ZipWriter::new(file);
    let archive_error = |source| PackageError::Archive {
        path: zip_path.to_path_buf(),
        source,
    };

    for entry in WalkDir::new(root_dir)
        .min_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|source| PackageError::Walk {
            path: root_dir.to_path_buf(),
            source,
        })?;
        let Ok(relative) = entry.path().strip_prefix(root_dir) else {
            continue;
        };
        let name = archive_name(relative);
        let metadata = entry.metadata().map_err(|source| PackageError::Walk {
            path: entry.path().to_path_buf(),
            source,
        })?;

        if metadata.is_dir() {
            let options =
                FileOptions::default().unix_permissions(mode_of(&metadata, DEFAULT_DIR_MODE));
            zip.add_directory(format!("{name}/"), options)
                .map_err(archive_error)?;
            continue;
        }

        debug!(entry = %name, "adding file to archive");
        let options = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(mode_of(&metadata, DEFAULT_FILE_MODE));
        let contents = fs::read(entry.path())
            .map_err(PackageError::io(format!("failed to read {}", entry.path().display())))?;
        zip.start_file(name, options).map_err(archive_error)?;
        zip.write_all(&contents)
            .map_err(PackageError::io(format!("failed to write {}", zip_path.display())))?;
    }

    zip.finish().map_err(archive_error)?;
    Ok(())
}

/// Writes a zip holding the single file `source` stored as `entry_name` with
/// the given unix mode, e.g. a compiled handler as an executable `bootstrap`.
pub fn zip_single_file(
    source: &Path,
    entry_name: &str,
    mode: u32,
    zip_path: &Path,
) -> Result<(), PackageError> {
    let contents =
        fs::read(source).map_err(PackageError::io(format!("failed to read {}", source.display())))?;
    let file = fs::File::create(zip_path)
        .map_err(PackageError::io(format!("failed to create {}", zip_path.display())))?;
    let archive_error = |source| PackageError::Archive {
        path: zip_path.to_path_buf(),
        source,
    };

    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(mode);
    zip.start_file(entry_name, options).map_err(archive_error)?;
    zip.write_all(&contents)
        .map_err(PackageError::io(format!("failed to write {}", zip_path.display())))?;
    zip.finish().map_err(archive_error)?;
    Ok(())
}

fn archive_name(relative: &Path) -> String {
    relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(unix)]
fn mode_of(metadata: &fs::Metadata, _default: u32) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn mode_of(_metadata: &fs::Metadata, default: u32) -> u32 {
    default
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn archives_nested_contents_relative_to_root() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let root = dir.path().join("package");
        fs::create_dir_all(root.join("python/requests")).expect("dirs should be created");
        fs::write(root.join("python/requests/__init__.py"), b"# requests")
            .expect("file should be written");
        fs::write(root.join("python/handler.py"), b"def main(): pass")
            .expect("file should be written");

        let zip_path = dir.path().join("asset.zip");
        zip_directory(&root, &zip_path).expect("zip should be written");

        let file = fs::File::open(&zip_path).expect("zip should open");
        let archive = zip::ZipArchive::new(file).expect("zip should parse");
        let mut names: Vec<&str> = archive.file_names().collect();
        names.sort_unstable();
        assert_eq!(
            names,
            vec![
                "python/",
                "python/handler.py",
                "python/requests/",
                "python/requests/__init__.py"
            ]
        );
    }

    #[test]
    fn single_file_archive_stores_executable_entry() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let binary = dir.path().join("badge_uploader_lambda");
        fs::write(&binary, b"\x7fELF").expect("binary should be written");
        let zip_path = dir.path().join("badge_uploader_lambda.zip");

        zip_single_file(&binary, "bootstrap", 0o755, &zip_path).expect("zip should be written");

        let file = fs::File::open(&zip_path).expect("zip should open");
        let mut archive = zip::ZipArchive::new(file).expect("zip should parse");
        assert_eq!(archive.len(), 1);
        let entry = archive.by_name("bootstrap").expect("bootstrap entry should exist");
        assert_eq!(entry.unix_mode().map(|mode| mode & 0o777), Some(0o755));
        assert_eq!(entry.size(), 4);
    }

    #[test]
    fn single_file_archive_reports_missing_source() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let error = zip_single_file(
            &dir.path().join("missing"),
            "bootstrap",
            0o755,
            &dir.path().join("out.zip"),
        )
        .expect_err("missing binary should fail");
        assert!(matches!(error, PackageError::Io { .. }));
        assert!(!dir.path().join("out.zip").exists());
    }
}
