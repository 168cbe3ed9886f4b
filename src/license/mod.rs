//! Mapping reported license identifiers onto the license taxonomy.
//!
//! - [`resolver`] — reuse, create-as-candidate, create-as-license, or report a
//!   name collision, with a per-import cache.

pub mod resolver;

pub use resolver::{LicenseResolver, Resolution};
