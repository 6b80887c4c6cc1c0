//! Deployable asset packaging for badge functions and shared layers.
//!
//! `package_asset` turns a function working directory (sources plus an
//! optional `requirements.txt`) into a zip archive or a directory tree that
//! a serverless runtime can load. Dependencies already shipped with the
//! runtime and build caches are stripped before packaging.

pub mod archive;
pub mod error;
pub mod exclusions;
pub mod installer;
pub mod package;
pub mod request;
mod workspace;

pub use archive::zip_single_file;
pub use error::PackageError;
pub use installer::{DependencyInstaller, PipInstaller};
pub use package::{package_asset, package_with_runtime_installer, PackagedAsset};
pub use request::{AssetType, OutputKind, PackageRequest, Runtime};
