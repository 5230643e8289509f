use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;

use godep::{GodepOptions, LayoutArgs, TraversalArgs, run_main, write_output};
use godep_error::Result;

#[derive(Parser, Debug)]
#[command(
    name = "godep",
    about = "godep: render the package dependency graph of a Go project as DOT",
    version
)]
pub struct Cli {
    /// Packages to start from (import paths, or paths relative to the project)
    #[arg(value_name = "PACKAGE", required = true)]
    roots: Vec<String>,

    #[command(flatten)]
    traversal: TraversalArgs,

    #[command(flatten)]
    layout: LayoutArgs,

    /// Project directory containing go.mod
    #[arg(short = 'C', long = "project", value_name = "DIR")]
    project: Option<PathBuf>,

    /// Go installation root used to locate standard library packages
    #[arg(long, env = "GOROOT", value_name = "DIR")]
    goroot: Option<PathBuf>,

    /// Output file path (writes to file instead of stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    output: Option<String>,
}

pub fn run(args: Cli) -> Result<()> {
    let total_start = Instant::now();

    // Initialize tracing subscriber for logging
    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .init();
    }

    let opts = GodepOptions {
        roots: args.roots,
        project_dir: args.project,
        goroot: args.goroot,
        mod_cache: None,
        build: args.traversal.to_build_context(),
        resolve: args.traversal.to_resolve_options(),
        render: args.layout.to_render_options(),
        output: args.output,
    };

    let document = run_main(&opts)?;
    write_output(&document, opts.output.as_deref())?;

    let total_secs = total_start.elapsed().as_secs_f64();
    tracing::info!(total_secs, "complete");
    Ok(())
}

pub fn main() -> ExitCode {
    let args = Cli::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            tracing::error!(error = %e, "execution failed");
            ExitCode::FAILURE
        }
    }
}
