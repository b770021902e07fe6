//! System package collaborator.
//!
//! - [`PackageManager`] synchronous query interface implemented outside the crate
//! - [`scan_dependencies`] builds a sorted [`DependencyList`] from it
//!
//! Package detection and shell invocation belong to the implementations; this
//! module holds only the contract and the report logic.

mod dependency;
mod package;

pub use dependency::{Dependency, DependencyList, scan_dependencies};
pub use package::{Package, PackageManager, PackageMap};
