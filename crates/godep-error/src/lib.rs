//! # godep-error
//!
//! Unified error handling for godep.
//!
//! - **ErrorKind**: what went wrong (e.g. ManifestParseFailed, ResolutionFailed)
//! - **Error context**: the operation plus key/value pairs locating the cause
//! - **Error source**: the underlying error, boxed so raw types don't leak
//!
//! ## Usage
//!
//! ```rust
//! use godep_error::{Error, ErrorKind};
//!
//! fn example() -> Result<(), Error> {
//!     Err(Error::new(ErrorKind::ResolutionFailed, "cannot find package")
//!         .with_operation("resolver::resolve")
//!         .with_context("package", "example.com/app/missing")
//!         .with_context("depth", "2"))
//! }
//! ```
//!
//! Resolution failures are permanent, so there is no retry classification.

mod error;
mod kind;

pub use error::Error;
pub use kind::ErrorKind;

/// Result type alias using godep Error
pub type Result<T> = std::result::Result<T, Error>;
