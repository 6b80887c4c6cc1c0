use std::fs;
use std::path::{Path, PathBuf};
use std::process::{exit, Command, ExitStatus};

use badge_assets::{
    package_with_runtime_installer, zip_single_file, AssetType, OutputKind, PackageRequest,
    Runtime,
};
use badge_stacks::{badge_manager_stack, badge_uploader_stack, FunctionSettings};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const LAMBDA_BINARIES: [&str; 2] = ["badge_uploader_lambda", "badge_manager_lambda"];
const DIST_DIR: &str = "infra/dist";
const BOOTSTRAP_ENTRY: &str = "bootstrap";
const BOOTSTRAP_MODE: u32 = 0o755;

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "xtask",
    about = "Task runner for the coverage badge workspace",
    long_about = "A unified CLI for packaging function assets, building the badge\n\
                  Lambda binaries, synthesizing stack templates and running CI checks."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Package a function working directory into a deployable asset
    PackageAsset {
        /// Directory holding the function sources and optional requirements.txt
        #[arg(long)]
        work_dir: PathBuf,
        /// Source glob relative to the work dir (repeatable)
        #[arg(long = "source", default_value = "*")]
        sources: Vec<String>,
        /// Runtime identifier, also used as the dependency installer interpreter
        #[arg(long, env = "ASSET_RUNTIME", default_value = "python3.8")]
        runtime: String,
        /// Function asset or shared layer
        #[arg(value_enum, long, default_value_t = AssetKind::Function)]
        asset_type: AssetKind,
        /// Produce a zip archive or leave a directory tree
        #[arg(value_enum, long, default_value_t = OutputFormat::Zip)]
        output: OutputFormat,
    },
    /// Build and package the badge Lambda binaries
    ServerlessPackage {
        /// Compilation target triple for Lambda binaries
        #[arg(long, default_value = "x86_64-unknown-linux-gnu")]
        target: String,
        /// Build profile used for binaries
        #[arg(value_enum, long, default_value_t = BuildProfile::Release)]
        profile: BuildProfile,
    },
    /// Write the badge manager and badge uploader stack templates
    Synth {
        /// Output directory for the templates
        #[arg(long, default_value = "infra/templates")]
        out: PathBuf,
    },
    /// Run CI checks (fmt, clippy, tests)
    Ci {
        /// Job to run
        #[arg(value_enum, default_value_t = CiJob::Check)]
        job: CiJob,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum AssetKind {
    Function,
    Layer,
}

impl From<AssetKind> for AssetType {
    fn from(kind: AssetKind) -> Self {
        match kind {
            AssetKind::Function => Self::Function,
            AssetKind::Layer => Self::Layer,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Zip,
    Directory,
}

impl From<OutputFormat> for OutputKind {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Zip => Self::Zip,
            OutputFormat::Directory => Self::Directory,
        }
    }
}

#[derive(Clone, ValueEnum)]
enum CiJob {
    /// Formatting, clippy, and tests
    Check,
    /// Check, then package lambdas and synthesize templates
    All,
}

#[derive(Clone, Copy, ValueEnum)]
enum BuildProfile {
    Debug,
    Release,
}

impl BuildProfile {
    fn dir_name(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Release => "release",
        }
    }

    fn as_cargo_flag(self) -> Option<&'static str> {
        match self {
            Self::Debug => None,
            Self::Release => Some("--release"),
        }
    }
}

// ── helpers ────────────────────────────────────────────────────────

fn step(label: &str) {
    info!("=== {label} ===");
}

fn cargo(args: &[&str]) -> ExitStatus {
    info!("+ cargo {}", args.join(" "));
    Command::new("cargo")
        .args(args)
        .status()
        .expect("failed to execute cargo")
}

fn run_cargo(args: &[&str]) {
    let status = cargo(args);
    if !status.success() {
        exit(status.code().unwrap_or(1));
    }
}

fn package_asset(
    work_dir: PathBuf,
    sources: Vec<String>,
    runtime: String,
    asset_type: AssetKind,
    output: OutputFormat,
) {
    step("Package function asset");
    let request = PackageRequest::new(work_dir, Runtime::new(runtime))
        .with_sources(sources)
        .with_asset_type(asset_type.into())
        .with_output(output.into());

    match package_with_runtime_installer(&request) {
        Ok(asset) => {
            info!(build_id = %asset.build_id, "packaged asset");
            println!("{}", asset.path.display());
        }
        Err(err) => {
            error!("asset packaging failed: {err}");
            exit(1);
        }
    }
}

fn package_serverless_lambdas(target: &str, profile: BuildProfile) {
    ensure_rust_target_installed(target);

    step("Build badge lambda binaries");

    let mut cargo_args = vec!["build", "-p", "badge_lambda", "--target", target];
    for bin in LAMBDA_BINARIES {
        cargo_args.extend(["--bin", bin]);
    }
    if let Some(flag) = profile.as_cargo_flag() {
        cargo_args.push(flag);
    }
    run_cargo(&cargo_args);

    step("Package lambda zip artifacts");
    let target_dir = Path::new("target").join(target).join(profile.dir_name());
    let dist_dir = Path::new(DIST_DIR);
    fs::create_dir_all(dist_dir).expect("failed to create lambda dist directory");

    for bin in LAMBDA_BINARIES {
        let zip_path = dist_dir.join(format!("{bin}.zip"));
        if let Err(err) =
            zip_single_file(&target_dir.join(bin), BOOTSTRAP_ENTRY, BOOTSTRAP_MODE, &zip_path)
        {
            error!("failed to package {bin}: {err}");
            exit(1);
        }
        info!("packaged artifact: {}", zip_path.display());
    }
}

fn ensure_rust_target_installed(target: &str) {
    let output = Command::new("rustup")
        .args(["target", "list", "--installed"])
        .output();

    let output = match output {
        Ok(value) => value,
        Err(err) => {
            warn!(
                "failed to run `rustup target list --installed` ({err}); continuing without target preflight"
            );
            return;
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!(
            "failed to list installed rust targets; run `rustup target list --installed` manually. details: {}",
            stderr.trim()
        );
    }

    let installed = String::from_utf8_lossy(&output.stdout);
    if !installed.lines().any(|line| line.trim() == target) {
        panic!(
            "required rust target `{target}` is not installed. install it with `rustup target add {target}` and re-run `cargo run -p xtask -- serverless-package`"
        );
    }
}

fn synth_templates(out: &Path) {
    step("Synthesize stack templates");
    fs::create_dir_all(out).expect("failed to create template output directory");

    let stacks = [
        badge_manager_stack(&FunctionSettings::rust_function(
            "badge_manager_lambda.zip",
        )),
        badge_uploader_stack(&FunctionSettings::rust_function(
            "badge_uploader_lambda.zip",
        )),
    ];

    for stack in stacks {
        let path = out.join(format!("{}.template.json", stack.name));
        let rendered = match stack
            .synthesize()
            .and_then(|template| serde_json::to_string_pretty(&template))
        {
            Ok(rendered) => rendered,
            Err(err) => {
                error!(stack = %stack.name, "failed to synthesize template: {err}");
                exit(1);
            }
        };
        fs::write(&path, rendered).expect("failed to write stack template");
        info!(
            stack = %stack.name,
            resources = stack.resources.len(),
            "wrote {}",
            path.display()
        );
    }
}

// ── CI jobs ────────────────────────────────────────────────────────

fn ci_check() {
    step("Check formatting");
    run_cargo(&["fmt", "--all", "--", "--check"]);

    step("Clippy");
    run_cargo(&[
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ]);

    step("Test workspace");
    run_cargo(&["test", "--workspace"]);
}

// ── main ───────────────────────────────────────────────────────────

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::PackageAsset {
            work_dir,
            sources,
            runtime,
            asset_type,
            output,
        } => {
            package_asset(work_dir, sources, runtime, asset_type, output);
        }
        Commands::ServerlessPackage { target, profile } => {
            package_serverless_lambdas(&target, profile);
        }
        Commands::Synth { out } => {
            synth_templates(&out);
        }
        Commands::Ci { job } => {
            match job {
                CiJob::Check => ci_check(),
                CiJob::All => {
                    ci_check();
                    package_serverless_lambdas("x86_64-unknown-linux-gnu", BuildProfile::Release);
                    synth_templates(Path::new("infra/templates"));
                }
            }
            info!("CI job passed.");
        }
    }
}
