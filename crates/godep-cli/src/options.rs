//! Command-line option groups.
//!
//! Boolean switches that default to on take an optional value: a bare `--mod`
//! means true, `--mod false` or `--mod=false` turns it off.

use clap::{ArgAction, Args};
use godep_core::BuildContext;
use godep_dot::{Orientation, RenderOptions};
use godep_resolver::{DEFAULT_MAX_DEPTH, FailurePolicy, ResolveOptions};

/// Options controlling dependency traversal.
#[derive(Args, Debug, Clone)]
pub struct TraversalArgs {
    /// Hide packages provided by modules required in go.mod
    #[arg(
        short = 'm',
        long = "mod",
        default_value_t = true,
        num_args = 0..=1,
        default_missing_value = "true",
        action = ArgAction::Set
    )]
    pub honor_manifest: bool,

    /// Stop on the first package that cannot be imported
    #[arg(
        long = "stoponerror",
        default_value_t = true,
        num_args = 0..=1,
        default_missing_value = "true",
        action = ArgAction::Set
    )]
    pub stop_on_error: bool,

    /// Include test packages
    #[arg(short = 't', long = "withtests")]
    pub with_tests: bool,

    /// Max level of the dependency graph
    #[arg(short = 'l', long = "maxlevel", default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_level: usize,

    /// Extra build tags to satisfy when selecting files (comma separated)
    #[arg(long = "tags", value_name = "TAG", value_delimiter = ',')]
    pub tags: Vec<String>,
}

impl Default for TraversalArgs {
    fn default() -> Self {
        Self {
            honor_manifest: true,
            stop_on_error: true,
            with_tests: false,
            max_level: DEFAULT_MAX_DEPTH,
            tags: Vec::new(),
        }
    }
}

impl TraversalArgs {
    pub fn to_resolve_options(&self) -> ResolveOptions {
        ResolveOptions::default()
            .with_max_depth(self.max_level)
            .with_on_failure(FailurePolicy::from_stop_on_error(self.stop_on_error))
            .with_tests(self.with_tests)
            .with_honor_manifest(self.honor_manifest)
    }

    /// Host build context extended with `--tags`.
    pub fn to_build_context(&self) -> BuildContext {
        BuildContext::host().with_tags(self.tags.iter().cloned())
    }
}

/// Options controlling graph layout.
#[derive(Args, Debug, Clone, Default)]
pub struct LayoutArgs {
    /// Lay out the dependency graph horizontally instead of vertically
    #[arg(long)]
    pub horizontal: bool,
}

impl LayoutArgs {
    pub fn to_render_options(&self) -> RenderOptions {
        RenderOptions::default().with_orientation(Orientation::from_horizontal(self.horizontal))
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Parser, Debug)]
    struct Harness {
        #[command(flatten)]
        traversal: TraversalArgs,
        #[command(flatten)]
        layout: LayoutArgs,
    }

    #[test]
    fn test_defaults() {
        let args = Harness::parse_from(["godep"]);
        let resolve = args.traversal.to_resolve_options();
        assert!(resolve.honor_manifest);
        assert_eq!(resolve.on_failure, FailurePolicy::Abort);
        assert!(!resolve.with_tests);
        assert_eq!(resolve.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(args.layout.to_render_options().orientation, Orientation::Vertical);
        assert!(args.traversal.tags.is_empty());
    }

    #[test]
    fn test_bare_boolean_switches_mean_true() {
        let args = Harness::parse_from(["godep", "--mod", "--stoponerror", "-t"]);
        let resolve = args.traversal.to_resolve_options();
        assert!(resolve.honor_manifest);
        assert_eq!(resolve.on_failure, FailurePolicy::Abort);
        assert!(resolve.with_tests);

        let args = Harness::parse_from(["godep", "--mod=false", "--stoponerror=false"]);
        let resolve = args.traversal.to_resolve_options();
        assert!(!resolve.honor_manifest);
        assert_eq!(resolve.on_failure, FailurePolicy::Continue);
    }

    #[test]
    fn test_tags() {
        let args = Harness::parse_from(["godep", "--tags", "tools,integration"]);
        assert_eq!(args.traversal.tags, ["tools", "integration"]);
        let build = args.traversal.to_build_context();
        assert!(build.matches_tag("tools"));
        assert!(build.matches_tag("integration"));
        assert!(!build.matches_tag("e2e"));
    }

    #[test]
    fn test_overrides() {
        let args = Harness::parse_from([
            "godep",
            "--mod",
            "false",
            "--stoponerror",
            "false",
            "-t",
            "-l",
            "3",
            "--horizontal",
        ]);
        let resolve = args.traversal.to_resolve_options();
        assert!(!resolve.honor_manifest);
        assert_eq!(resolve.on_failure, FailurePolicy::Continue);
        assert!(resolve.with_tests);
        assert_eq!(resolve.max_depth, 3);
        assert_eq!(args.layout.to_render_options().orientation, Orientation::Horizontal);
    }
}
