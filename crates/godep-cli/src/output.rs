//! Output generation (DOT graphs).

use std::time::Instant;

use godep_dot::{RenderOptions, render_graph};
use godep_error::{Error, Result};
use godep_resolver::DepGraph;
use tracing::info;

/// Render the resolved graph to a DOT document.
pub fn generate_dot_output(graph: &DepGraph, options: &RenderOptions) -> String {
    let render_start = Instant::now();
    let result = render_graph(graph, options);
    info!(
        "Graph rendering: {:.2}s",
        render_start.elapsed().as_secs_f64()
    );
    result
}

/// Write the document to `path`, or to standard output when no path is given.
pub fn write_output(document: &str, path: Option<&str>) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, document).map_err(|e| {
                Error::from(e)
                    .with_operation("output::write")
                    .with_context("path", path)
            })?;
            info!(path, "output written");
        }
        None => print!("{document}"),
    }
    Ok(())
}
