//! Depth-bounded, cycle-safe discovery of the package dependency graph.

mod graph;
mod option;
mod traverse;

pub use graph::DepGraph;
pub use option::{DEFAULT_MAX_DEPTH, FailurePolicy, ResolveOptions};
pub use traverse::{Resolver, resolve};
