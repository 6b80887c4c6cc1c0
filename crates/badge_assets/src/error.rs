use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PackageError {
    #[error("work directory {path} does not exist")]
    MissingWorkDir { path: PathBuf },

    #[error("source pattern `{pattern}` matched nothing under {work_dir}")]
    MissingSource { pattern: String, work_dir: PathBuf },

    #[error("invalid glob pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        source: glob::PatternError,
    },

    #[error("failed to start dependency installer `{program}`: {source}")]
    InstallerSpawn { program: String, source: io::Error },

    #[error("dependency installation failed ({status})")]
    Install { status: ExitStatus },

    #[error("{context}: {source}")]
    Io { context: String, source: io::Error },

    #[error("failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },

    #[error("failed to write archive {path}: {source}")]
    Archive {
        path: PathBuf,
        source: zip::result::ZipError,
    },
}

impl PackageError {
    pub(crate) fn io(context: impl Into<String>) -> impl FnOnce(io::Error) -> Self {
        let context = context.into();
        move |source| Self::Io { context, source }
    }
}
