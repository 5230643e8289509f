//! Depth-first traversal over an explicit worklist.
//!
//! Children are pushed in reverse so units are visited in the same order a
//! recursive walk would visit them. A name is claimed in the graph exactly once;
//! later frames for it are dropped when popped.

use std::path::{Path, PathBuf};

use godep_core::{PackageSource, RequiredDeps, Unit, VisibilityPolicy};
use godep_error::{Error, ErrorKind, Result};
use tracing::{debug, info, trace, warn};

use crate::graph::DepGraph;
use crate::option::{FailurePolicy, ResolveOptions};

const ROOT_IMPORTER: &str = "<root>";

/// One pending resolution.
#[derive(Debug)]
struct Frame {
    name: String,
    search_dir: PathBuf,
    depth: usize,
    importer: Option<String>,
}

/// Owns the traversal state for a single run.
pub struct Resolver<S> {
    source: S,
    options: ResolveOptions,
    graph: DepGraph,
}

impl<S: PackageSource> Resolver<S> {
    pub fn new(source: S, required: RequiredDeps, options: ResolveOptions) -> Self {
        let policy = VisibilityPolicy::new(required, options.honor_manifest);
        debug!(
            required = policy.required().len(),
            honor_manifest = policy.honor_manifest(),
            max_depth = options.max_depth,
            "visibility policy"
        );
        Self {
            source,
            options,
            graph: DepGraph::new(Vec::new(), policy),
        }
    }

    /// Resolve everything reachable from `roots`, which are looked up relative to `search_dir`.
    pub fn run(mut self, roots: &[String], search_dir: &Path) -> Result<DepGraph> {
        if roots.is_empty() {
            return Err(Error::usage("need at least one package name to process")
                .with_operation("resolver::run"));
        }

        let policy = self.graph.policy().clone();
        self.graph = DepGraph::new(roots.to_vec(), policy);

        let mut stack: Vec<Frame> = roots
            .iter()
            .rev()
            .map(|name| Frame {
                name: name.clone(),
                search_dir: search_dir.to_path_buf(),
                depth: 0,
                importer: None,
            })
            .collect();

        while let Some(frame) = stack.pop() {
            if frame.depth > self.options.max_depth {
                trace!(package = %frame.name, depth = frame.depth, "depth bound reached");
                continue;
            }
            if self.graph.contains(&frame.name) {
                continue;
            }

            let unit = self.resolve_unit(&frame)?;

            if self.graph.policy().is_filtered(&unit) {
                trace!(package = %frame.name, "filtered, not expanding");
            } else {
                for dep in unit.deps().iter().rev() {
                    if self.graph.contains(dep) {
                        continue;
                    }
                    stack.push(Frame {
                        name: dep.clone(),
                        search_dir: unit.dir().to_path_buf(),
                        depth: frame.depth + 1,
                        importer: Some(unit.name().to_string()),
                    });
                }
            }

            self.graph.insert(unit);
        }

        let failed = self.graph.failed_units().count();
        let visible = self.graph.visible_units().count();
        info!(
            units = self.graph.len(),
            visible,
            filtered = self.graph.len() - visible,
            failed,
            "resolution complete"
        );

        Ok(self.graph)
    }

    fn resolve_unit(&self, frame: &Frame) -> Result<Unit> {
        let importer = frame.importer.as_deref().unwrap_or(ROOT_IMPORTER);
        debug!(package = %frame.name, depth = frame.depth, importer, "resolving");

        let declared = self.graph.policy().is_declared(&frame.name);
        match self.source.resolve(&frame.name, &frame.search_dir) {
            Ok(facts) => Ok(Unit::resolved(
                frame.name.clone(),
                facts,
                declared,
                self.options.with_tests,
            )),
            Err(err) => match self.options.on_failure {
                FailurePolicy::Abort => Err(Error::new(
                    ErrorKind::ResolutionFailed,
                    format!(
                        "failed to import {} (imported at level {} by {}): {}",
                        frame.name,
                        frame.depth + 1,
                        importer,
                        err.message()
                    ),
                )
                .with_operation("resolver::resolve")
                .with_context("package", frame.name.clone())
                .with_context("depth", frame.depth.to_string())
                .with_context("importer", importer)
                .set_source(err)),
                FailurePolicy::Continue => {
                    warn!(
                        package = %frame.name,
                        depth = frame.depth,
                        importer,
                        error = %err,
                        "recording unresolved package"
                    );
                    Ok(Unit::failed(
                        frame.name.clone(),
                        &frame.search_dir,
                        declared,
                        err.message(),
                    ))
                }
            },
        }
    }
}

/// Resolve `roots` against `source` in one call.
pub fn resolve<S: PackageSource>(
    source: S,
    roots: &[String],
    search_dir: &Path,
    required: RequiredDeps,
    options: &ResolveOptions,
) -> Result<DepGraph> {
    Resolver::new(source, required, options.clone()).run(roots, search_dir)
}
