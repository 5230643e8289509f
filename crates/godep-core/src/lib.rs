pub mod constraint;
pub mod ids;
pub mod manifest;
pub mod policy;
pub mod scan;
pub mod source;
pub mod unit;

pub use godep_error::{Error, ErrorKind, Result};

pub use constraint::BuildContext;
pub use ids::{IdTable, derive_node_id, escape_label};
pub use manifest::{MANIFEST_FILE, Manifest, Requirement};
pub use policy::{Category, RequiredDeps, VisibilityPolicy};
pub use scan::{GoFile, parse_go_file};
pub use source::{GoSourceTree, PackageSource};
pub use unit::{Outcome, Unit, UnitFacts};
