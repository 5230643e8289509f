/// Default bound on traversal depth.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// What to do when a package cannot be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Stop the whole run at the first failure.
    #[default]
    Abort,
    /// Record the failure on the unit and keep going.
    Continue,
}

impl FailurePolicy {
    pub fn from_stop_on_error(stop_on_error: bool) -> Self {
        if stop_on_error {
            FailurePolicy::Abort
        } else {
            FailurePolicy::Continue
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Units deeper than this (roots are depth 0) are not resolved.
    pub max_depth: usize,
    pub on_failure: FailurePolicy,
    /// Fold test imports into each unit's dependencies.
    pub with_tests: bool,
    /// Hide packages matching the manifest's required modules.
    pub honor_manifest: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            on_failure: FailurePolicy::Abort,
            with_tests: false,
            honor_manifest: true,
        }
    }
}

impl ResolveOptions {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_on_failure(mut self, on_failure: FailurePolicy) -> Self {
        self.on_failure = on_failure;
        self
    }

    pub fn with_tests(mut self, with_tests: bool) -> Self {
        self.with_tests = with_tests;
        self
    }

    pub fn with_honor_manifest(mut self, honor_manifest: bool) -> Self {
        self.honor_manifest = honor_manifest;
        self
    }
}
