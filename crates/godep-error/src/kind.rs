//! Error kinds for godep operations

use strum_macros::{Display, IntoStaticStr};

/// The kind of error that occurred.
///
/// Callers match on the kind to tell fatal setup problems (manifest, usage)
/// apart from per-package resolution failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoStaticStr, Display)]
#[non_exhaustive]
pub enum ErrorKind {
    // =========================================================================
    // General errors
    // =========================================================================
    /// An unexpected error occurred - catch-all for unhandled cases
    Unexpected,

    /// Invalid parameters passed to a library entry point
    InvalidArgument,

    /// Command line misuse (e.g. no root packages supplied)
    Usage,

    // =========================================================================
    // Manifest errors
    // =========================================================================
    /// The project manifest (go.mod) could not be read
    ManifestReadFailed,

    /// The project manifest (go.mod) is malformed
    ManifestParseFailed,

    // =========================================================================
    // Resolution errors
    // =========================================================================
    /// A package could not be located or loaded
    ResolutionFailed,

    /// The package directory exists but holds no Go source files
    NoGoFiles,

    // =========================================================================
    // File/IO errors
    // =========================================================================
    /// File not found
    FileNotFound,

    /// Permission denied
    PermissionDenied,

    /// IO operation failed
    IoFailed,
}

impl ErrorKind {
    /// Returns the error kind as a static string
    pub fn as_str(&self) -> &'static str {
        (*self).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_display() {
        assert_eq!(ErrorKind::ManifestParseFailed.to_string(), "ManifestParseFailed");
        assert_eq!(ErrorKind::ResolutionFailed.as_str(), "ResolutionFailed");
    }
}
