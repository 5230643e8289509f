//! Graph rendering module for producing DOT format output.
//!
//! Every visible package becomes one node, sorted by name, colored by its
//! category. Edges follow each node's dependency order and never touch a
//! filtered package.
//!
//! - [`dot`]: DOT format utilities and helpers

mod dot;

use godep_core::IdTable;
use godep_resolver::DepGraph;
use tracing::debug;

pub use dot::DotBuilder;

/// Name of the emitted digraph.
pub const GRAPH_NAME: &str = "godep";

/// Layout direction of the rendered graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    /// Top to bottom (graphviz default).
    #[default]
    Vertical,
    /// Left to right.
    Horizontal,
}

impl Orientation {
    pub fn from_horizontal(horizontal: bool) -> Self {
        if horizontal {
            Orientation::Horizontal
        } else {
            Orientation::Vertical
        }
    }
}

/// Options for graph rendering.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub orientation: Orientation,
}

impl RenderOptions {
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }
}

/// Render the resolved graph to DOT format.
pub fn render_graph(graph: &DepGraph, options: &RenderOptions) -> String {
    let mut ids = IdTable::new();
    let mut dot = DotBuilder::new(GRAPH_NAME);

    if options.orientation == Orientation::Horizontal {
        dot.attr("rankdir", "LR");
    }
    dot.attr("splines", "spline")
        .attr("nodesep", "0.4")
        .attr("ranksep", "0.8")
        .node_style(&[("shape", "box"), ("style", "rounded,filled")])
        .edge_style(&[("arrowsize", "0.5")])
        .blank();

    let mut node_count = 0usize;
    for unit in graph.visible_units() {
        let category = unit.category();
        dot.node_full(
            ids.id(unit.name()),
            &[
                ("label", unit.name()),
                ("color", category.color()),
                ("target", "_blank"),
            ],
        );
        node_count += 1;
    }

    let mut edge_count = 0usize;
    let mut first_edge = true;
    for unit in graph.visible_units() {
        let from = ids.id(unit.name()).to_string();
        for dep in graph.visible_deps(unit) {
            if first_edge {
                dot.blank();
                first_edge = false;
            }
            dot.edge(&from, ids.id(dep.name()));
            edge_count += 1;
        }
    }

    debug!(nodes = node_count, edges = edge_count, "rendered graph");
    dot.build()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};

    use godep_core::{Error, PackageSource, RequiredDeps, Result, UnitFacts};
    use godep_resolver::{FailurePolicy, ResolveOptions, resolve};
    use pretty_assertions::assert_eq;

    use super::*;

    #[derive(Default)]
    struct MemSource {
        packages: HashMap<String, UnitFacts>,
    }

    impl MemSource {
        fn pkg(mut self, name: &str, imports: &[&str]) -> Self {
            self.packages.insert(
                name.to_string(),
                UnitFacts {
                    dir: PathBuf::from("/src").join(name),
                    imports: imports.iter().map(|s| s.to_string()).collect(),
                    ..UnitFacts::default()
                },
            );
            self
        }

        fn native(mut self, name: &str) -> Self {
            if let Some(facts) = self.packages.get_mut(name) {
                facts.has_native = true;
            }
            self
        }

        fn stdlib(mut self, name: &str) -> Self {
            if let Some(facts) = self.packages.get_mut(name) {
                facts.is_stdlib = true;
            }
            self
        }
    }

    impl PackageSource for MemSource {
        fn resolve(&self, name: &str, _search_dir: &Path) -> Result<UnitFacts> {
            self.packages
                .get(name)
                .cloned()
                .ok_or_else(|| Error::resolution_failed(name, "cannot find package"))
        }
    }

    fn graph_of(source: &MemSource, roots: &[&str], required: &[&str], options: ResolveOptions) -> DepGraph {
        let roots: Vec<String> = roots.iter().map(|s| s.to_string()).collect();
        resolve(
            source,
            &roots,
            Path::new("/src"),
            RequiredDeps::new(required.iter().copied()),
            &options,
        )
        .expect("resolve")
    }

    const HEADER: &str = "digraph godep {\n  splines=\"spline\";\n  nodesep=\"0.4\";\n  ranksep=\"0.8\";\n  node [shape=\"box\", style=\"rounded,filled\"];\n  edge [arrowsize=\"0.5\"];\n\n";

    #[test]
    fn test_render_full_document() {
        let source = MemSource::default()
            .pkg("app", &["fmt", "app/b", "app/a"])
            .pkg("fmt", &[])
            .stdlib("fmt")
            .pkg("app/a", &["app/b"])
            .pkg("app/b", &[]);
        let graph = graph_of(&source, &["app"], &[], ResolveOptions::default());

        let expected = format!(
            "{HEADER}  \"app\"[label=\"app\", color=\"paleturquoise\", target=\"_blank\"];\n  \"app/a\"[label=\"app/a\", color=\"paleturquoise\", target=\"_blank\"];\n  \"app/b\"[label=\"app/b\", color=\"paleturquoise\", target=\"_blank\"];\n\n  \"app\" -> \"app/b\";\n  \"app\" -> \"app/a\";\n  \"app/a\" -> \"app/b\";\n}}\n"
        );
        assert_eq!(render_graph(&graph, &RenderOptions::default()), expected);
    }

    #[test]
    fn test_horizontal_layout() {
        let source = MemSource::default().pkg("app", &[]);
        let graph = graph_of(&source, &["app"], &[], ResolveOptions::default());
        let options = RenderOptions::default().with_orientation(Orientation::Horizontal);
        let out = render_graph(&graph, &options);
        assert!(out.starts_with("digraph godep {\n  rankdir=\"LR\";\n"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let source = MemSource::default()
            .pkg("z", &["y", "x"])
            .pkg("y", &["x"])
            .pkg("x", &["z"]);
        let first = render_graph(
            &graph_of(&source, &["z"], &[], ResolveOptions::default()),
            &RenderOptions::default(),
        );
        let second = render_graph(
            &graph_of(&source, &["x"], &[], ResolveOptions::default()),
            &RenderOptions::default(),
        );
        assert_eq!(first, second);
    }

    #[test]
    fn test_cycle_renders_each_node_once() {
        let source = MemSource::default().pkg("a", &["b"]).pkg("b", &["a"]);
        let out = render_graph(
            &graph_of(&source, &["a"], &[], ResolveOptions::default()),
            &RenderOptions::default(),
        );
        assert_eq!(out.matches("[label=\"a\"").count(), 1);
        assert_eq!(out.matches("[label=\"b\"").count(), 1);
        assert!(out.contains("\"a\" -> \"b\";"));
        assert!(out.contains("\"b\" -> \"a\";"));
    }

    #[test]
    fn test_no_self_edges() {
        let source = MemSource::default().pkg("a", &["a"]);
        let out = render_graph(
            &graph_of(&source, &["a"], &[], ResolveOptions::default()),
            &RenderOptions::default(),
        );
        assert!(!out.contains("->"));
    }

    #[test]
    fn test_declared_dependency_hidden() {
        let source = MemSource::default()
            .pkg("app", &["github.com/x/dep/sub"])
            .pkg("github.com/x/dep/sub", &[]);
        let out = render_graph(
            &graph_of(&source, &["app"], &["github.com/x/dep"], ResolveOptions::default()),
            &RenderOptions::default(),
        );
        assert!(!out.contains("github.com/x/dep"));
        assert!(!out.contains("->"));
    }

    #[test]
    fn test_native_beats_declared() {
        let source = MemSource::default()
            .pkg("app", &["github.com/x/sqlite"])
            .pkg("github.com/x/sqlite", &[])
            .native("github.com/x/sqlite");
        let options = ResolveOptions::default().with_honor_manifest(false);
        let out = render_graph(
            &graph_of(&source, &["app"], &["github.com/x/sqlite"], options),
            &RenderOptions::default(),
        );
        assert!(out.contains(
            "\"github.com/x/sqlite\"[label=\"github.com/x/sqlite\", color=\"darkgoldenrod1\", target=\"_blank\"];"
        ));
    }

    #[test]
    fn test_failed_unit_rendered_red() {
        let source = MemSource::default().pkg("app", &["broken"]);
        let options = ResolveOptions::default().with_on_failure(FailurePolicy::Continue);
        let out = render_graph(
            &graph_of(&source, &["app"], &[], options),
            &RenderOptions::default(),
        );
        assert!(out.contains("\"broken\"[label=\"broken\", color=\"red\", target=\"_blank\"];"));
        assert!(out.contains("\"app\" -> \"broken\";"));
    }

    #[test]
    fn test_depth_bound_rendering() {
        let source = MemSource::default().pkg("r", &["x"]).pkg("x", &["y"]).pkg("y", &[]);
        let out = render_graph(
            &graph_of(&source, &["r"], &[], ResolveOptions::default().with_max_depth(1)),
            &RenderOptions::default(),
        );
        assert!(out.contains("\"r\" -> \"x\";"));
        assert!(!out.contains("\"y\""));
    }
}
