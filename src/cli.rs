//! Command-line interface for docly.

use clap::Parser;
use std::path::PathBuf;

use crate::config::Config;
use crate::error::DoclyError;
use crate::report;
use crate::runner::Runner;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_ERROR: i32 = 1;

/// Generate API documentation from an Express application's sources.
///
/// Docly reads every .js and .ts file under the given folder, finds the
/// app, its routers, middleware and listen() call, and writes output.json
/// and apidoc.html.
#[derive(Parser)]
#[command(name = "docly")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Source folder of the application
    pub path: Option<PathBuf>,

    /// Path to config file (default: auto-discover in the working directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Prefix routes of mounted routers with their mount path
    #[arg(long)]
    pub resolve_mounts: bool,

    /// Directory to write output.json and apidoc.html into
    #[arg(short, long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Print debug logging to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

/// Install the tracing subscriber; `RUST_LOG` takes precedence over `--verbose`.
pub fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("docly={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Run docly with parsed arguments.
pub fn run(args: &Cli) -> anyhow::Result<i32> {
    // Resolve root
    let root = match &args.path {
        Some(p) => p,
        None => {
            eprintln!("Error: {}", DoclyError::MissingRoot);
            eprintln!("Usage: docly <src-folder>");
            return Ok(EXIT_ERROR);
        }
    };
    let abs_root = match root.canonicalize() {
        Ok(p) if p.is_dir() => p,
        _ => {
            eprintln!("Error: {}", DoclyError::RootNotFound(absolute(root)));
            return Ok(EXIT_ERROR);
        }
    };

    // Load config
    let cwd = std::env::current_dir()?;
    let config = match Config::load(args.config.as_deref(), &cwd) {
        Ok((config, found)) => {
            if let Some(path) = found {
                tracing::debug!("using config {}", path.display());
            }
            config
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return Ok(EXIT_ERROR);
        }
    };
    let resolve_mounts = args.resolve_mounts || config.resolve_mounts;

    let runner = Runner::new(&abs_root)
        .with_config(config)
        .resolve_mounts(resolve_mounts);
    let output = runner.run()?;

    if output.files.is_empty() {
        tracing::warn!("no .js or .ts files under {}", abs_root.display());
    }

    let written = vec![
        report::write_json(&output.document, &args.out_dir)?,
        report::write_html(&output.document, &args.out_dir)?,
    ];

    report::write_pretty(
        &abs_root.to_string_lossy(),
        output.files.len(),
        &output.document,
        &written,
    );

    Ok(EXIT_SUCCESS)
}

fn absolute(path: &std::path::Path) -> PathBuf {
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}
