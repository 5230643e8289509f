//! godep command-line interface.
//!
pub mod discovery;
pub mod options;
pub mod output;

use std::path::PathBuf;
use std::time::Instant;

use godep_core::{BuildContext, GoSourceTree, Manifest};
use godep_dot::RenderOptions;
use godep_error::{Error, Result};
use godep_resolver::{ResolveOptions, resolve};
use tracing::info;

pub use options::{LayoutArgs, TraversalArgs};
pub use output::{generate_dot_output, write_output};

/// Options for running godep.
#[derive(Debug, Clone, Default)]
pub struct GodepOptions {
    /// Packages to start from.
    pub roots: Vec<String>,
    /// Directory holding `go.mod`; the current directory when unset.
    pub project_dir: Option<PathBuf>,
    /// Standard library root; discovered from the `go` tool when unset.
    pub goroot: Option<PathBuf>,
    /// Module cache override; derived from the Go environment when unset.
    pub mod_cache: Option<PathBuf>,
    /// Platform and tags used to select package files.
    pub build: BuildContext,
    pub resolve: ResolveOptions,
    pub render: RenderOptions,
    /// Write the document here instead of standard output.
    pub output: Option<String>,
}

/// Main entry point: read the manifest, resolve the roots, render DOT.
pub fn run_main(opts: &GodepOptions) -> Result<String> {
    if opts.roots.is_empty() {
        return Err(Error::usage("need one package name to process").with_operation("run_main"));
    }

    let project_root = discovery::project_root(opts.project_dir.as_deref())?;
    let manifest = Manifest::read(&project_root)?;
    info!(
        module = %manifest.module,
        requires = manifest.requires.len(),
        "read manifest"
    );

    let required = manifest.required_deps();
    let goroot = discovery::discover_goroot(opts.goroot.clone());
    let build = opts.build.clone();
    info!(goos = build.goos(), goarch = build.goarch(), "build context");

    let mut source = GoSourceTree::new(&project_root, manifest)
        .with_goroot(goroot)
        .with_build_context(build);
    if opts.mod_cache.is_some() {
        source = source.with_mod_cache(opts.mod_cache.clone());
    }

    let resolve_start = Instant::now();
    let graph = resolve(
        &source,
        &opts.roots,
        source.project_root(),
        required,
        &opts.resolve,
    )?;
    info!(
        "Resolution: {:.2}s ({} packages)",
        resolve_start.elapsed().as_secs_f64(),
        graph.len()
    );

    Ok(generate_dot_output(&graph, &opts.render))
}
