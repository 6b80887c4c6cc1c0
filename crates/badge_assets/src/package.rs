use std::fs;
use std::path::{Path, PathBuf};

use glob::MatchOptions;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::archive::zip_directory;
use crate::error::PackageError;
use crate::exclusions::prune_build_dir;
use crate::installer::{DependencyInstaller, PipInstaller};
use crate::request::{
    AssetType, OutputKind, PackageRequest, DEPENDENCY_MANIFEST, LAYER_SUBDIRECTORY,
};
use crate::workspace::{BuildWorkspace, BUILD_ROOT};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagedAsset {
    /// Zip file or directory, depending on the requested output.
    pub path: PathBuf,
    pub output: OutputKind,
    /// Identifier embedded in every intermediate path of the run.
    pub build_id: String,
}

pub fn package_with_runtime_installer(
    request: &PackageRequest,
) -> Result<PackagedAsset, PackageError> {
    package_asset(request, &PipInstaller::for_runtime(&request.runtime))
}

/// Builds a deployable asset from `request.work_dir`.
///
/// Dependency installation failures abort the run; cleanup of intermediate
/// directories happens on every exit path.
pub fn package_asset(
    request: &PackageRequest,
    installer: &dyn DependencyInstaller,
) -> Result<PackagedAsset, PackageError> {
    let work_dir = fs::canonicalize(&request.work_dir).map_err(|_| PackageError::MissingWorkDir {
        path: request.work_dir.clone(),
    })?;

    // Sources are resolved before the previous build output is discarded.
    let sources = resolve_sources(&work_dir, &request.sources)?;
    let workspace = BuildWorkspace::create(&work_dir)?;

    let manifest = work_dir.join(DEPENDENCY_MANIFEST);
    if manifest.is_file() {
        debug!(
            manifest = %manifest.display(),
            runtime = %request.runtime,
            "installing dependencies"
        );
        installer.install(&manifest, &workspace.build_dir)?;
    }

    debug!("removing dependencies bundled in the runtime and caches");
    let removed = prune_build_dir(&workspace.build_dir)?;
    debug!(count = removed.len(), "pruned build entries");

    for source in &sources {
        debug!(source = %source.display(), "adding source");
        copy_into(source, &workspace.build_dir)?;
    }

    let layout_dir = match request.asset_type {
        AssetType::Function => workspace.package_dir.clone(),
        AssetType::Layer => {
            let nested = workspace.package_dir.join(LAYER_SUBDIRECTORY);
            fs::create_dir_all(&nested)
                .map_err(PackageError::io(format!("failed to create {}", nested.display())))?;
            nested
        }
    };
    move_entries(&workspace.build_dir, &layout_dir)?;

    let path = match request.output {
        OutputKind::Zip => {
            info!(zip = %workspace.zip_file.display(), "packaging asset into archive");
            zip_directory(&workspace.package_dir, &workspace.zip_file)?;
            workspace.zip_file.clone()
        }
        OutputKind::Directory => {
            fs::create_dir_all(&workspace.out_dir).map_err(PackageError::io(format!(
                "failed to create {}",
                workspace.out_dir.display()
            )))?;
            move_entries(&workspace.package_dir, &workspace.out_dir)?;
            info!(dir = %workspace.out_dir.display(), "packaged asset as directory");
            workspace.out_dir.clone()
        }
    };

    let asset = PackagedAsset {
        path,
        output: request.output,
        build_id: workspace.build_id.clone(),
    };
    workspace.commit();
    Ok(asset)
}

fn resolve_sources(work_dir: &Path, patterns: &[String]) -> Result<Vec<PathBuf>, PackageError> {
    let build_root = work_dir.join(BUILD_ROOT);
    let options = MatchOptions {
        require_literal_leading_dot: true,
        ..MatchOptions::new()
    };
    let escaped_root = glob::Pattern::escape(&work_dir.to_string_lossy());

    let mut sources = Vec::new();
    for pattern in patterns {
        let full_pattern = format!("{escaped_root}/{}", pattern.trim_start_matches('/'));
        let paths = glob::glob_with(&full_pattern, options).map_err(|source| {
            PackageError::Pattern {
                pattern: pattern.clone(),
                source,
            }
        })?;

        let mut matched = false;
        for path in paths.flatten() {
            if path.starts_with(&build_root) {
                continue;
            }
            matched = true;
            if !sources.contains(&path) {
                sources.push(path);
            }
        }
        if !matched {
            return Err(PackageError::MissingSource {
                pattern: pattern.clone(),
                work_dir: work_dir.to_path_buf(),
            });
        }
    }
    Ok(sources)
}

/// Copies `source` (file or directory tree) into `dest_dir` under its own
/// name, replacing same-named files. Symlinks are followed, so linked files
/// and directories land in the build as regular entries.
fn copy_into(source: &Path, dest_dir: &Path) -> Result<(), PackageError> {
    let Some(name) = source.file_name() else {
        return Ok(());
    };
    let target = dest_dir.join(name);

    if !source.is_dir() {
        fs::copy(source, &target).map_err(PackageError::io(format!(
            "failed to copy {}",
            source.display()
        )))?;
        return Ok(());
    }

    for entry in WalkDir::new(source).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(|error| PackageError::Walk {
            path: source.to_path_buf(),
            source: error,
        })?;
        let Ok(relative) = entry.path().strip_prefix(source) else {
            continue;
        };
        let destination = target.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&destination).map_err(PackageError::io(format!(
                "failed to create {}",
                destination.display()
            )))?;
        } else {
            fs::copy(entry.path(), &destination).map_err(PackageError::io(format!(
                "failed to copy {}",
                entry.path().display()
            )))?;
        }
    }
    Ok(())
}

fn move_entries(from: &Path, to: &Path) -> Result<(), PackageError> {
    let entries = fs::read_dir(from)
        .map_err(PackageError::io(format!("failed to read {}", from.display())))?;
    for entry in entries {
        let entry = entry.map_err(PackageError::io(format!("failed to read {}", from.display())))?;
        let target = to.join(entry.file_name());
        fs::rename(entry.path(), &target).map_err(PackageError::io(format!(
            "failed to move {}",
            entry.path().display()
        )))?;
    }
    Ok(())
}
