use std::fmt;
use std::path::PathBuf;

pub const DEFAULT_SOURCE_PATTERN: &str = "*";
pub const DEPENDENCY_MANIFEST: &str = "requirements.txt";
pub const LAYER_SUBDIRECTORY: &str = "python";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetType {
    /// Package contents sit at the archive root.
    Function,
    /// Package contents sit under [`LAYER_SUBDIRECTORY`].
    Layer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Zip,
    Directory,
}

/// Runtime identifier such as `python3.8`; doubles as the interpreter used
/// to resolve dependencies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Runtime(String);

impl Runtime {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self(identifier.into())
    }

    pub fn identifier(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRequest {
    pub work_dir: PathBuf,
    /// Glob patterns relative to `work_dir`.
    pub sources: Vec<String>,
    pub runtime: Runtime,
    pub asset_type: AssetType,
    pub output: OutputKind,
}

impl PackageRequest {
    pub fn new(work_dir: impl Into<PathBuf>, runtime: Runtime) -> Self {
        Self {
            work_dir: work_dir.into(),
            sources: vec![DEFAULT_SOURCE_PATTERN.to_string()],
            runtime,
            asset_type: AssetType::Function,
            output: OutputKind::Zip,
        }
    }

    pub fn with_sources<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sources = sources.into_iter().map(Into::into).collect();
        if self.sources.is_empty() {
            self.sources.push(DEFAULT_SOURCE_PATTERN.to_string());
        }
        self
    }

    pub fn with_asset_type(mut self, asset_type: AssetType) -> Self {
        self.asset_type = asset_type;
        self
    }

    pub fn with_output(mut self, output: OutputKind) -> Self {
        self.output = output;
        self
    }
}
