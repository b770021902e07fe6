//! # Dependency report.
//!
//! [`scan_dependencies`] asks a [`PackageManager`] about every dependency it
//! knows and builds a [`DependencyList`] sorted by name.
//!
//! ## Resolution
//! ```text
//! for (dependency, candidates) in manager.packages():
//!   for pkg in candidates:
//!     ├─► record optional/external/install command of the candidate
//!     └─► available? ──► package_name, version = pkg
//!                        installed? ──► installed = true
//!                                       version = pkg.version (library)
//!                                               | app_version(dependency) (application)
//!                        stop at the first available candidate
//! ```

use std::ops::Deref;

use tracing::trace;

use super::package::PackageManager;
use crate::error::PackageError;

/// A system package required (or optionally used) by the application.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dependency {
    /// Logical dependency name (e.g. `gcc`).
    pub name: String,
    /// Package satisfying it; `None` if no candidate is available.
    pub package_name: Option<String>,
    /// Whether the package is installed.
    pub installed: bool,
    /// Command installing the package.
    pub install_command: String,
    /// Installed or available version.
    pub version: String,
    /// Not required for a working setup.
    pub optional: bool,
    /// Installed outside the system package manager.
    pub external: bool,
}

/// Dependencies sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyList(Vec<Dependency>);

impl DependencyList {
    /// Command installing every missing required dependency.
    ///
    /// Empty if nothing is missing.
    pub fn install_all_required_command(&self) -> String {
        self.install_all_command(false)
    }

    /// Command installing every missing optional dependency.
    ///
    /// Empty if nothing is missing.
    pub fn install_all_optional_command(&self) -> String {
        self.install_all_command(true)
    }

    /// Dependencies that are required but not installed.
    pub fn missing_required(&self) -> impl Iterator<Item = &Dependency> {
        self.0.iter().filter(|d| !d.installed && !d.optional)
    }

    /// Consumes the list.
    pub fn into_inner(self) -> Vec<Dependency> {
        self.0
    }

    // The first missing package contributes its full install command; the
    // others only append their package names to it.
    fn install_all_command(&self, optional: bool) -> String {
        let mut result = String::new();
        for dep in self.0.iter().filter(|d| !d.installed && d.optional == optional) {
            let Some(package) = dep.package_name.as_deref() else {
                continue;
            };
            if result.is_empty() {
                result = dep.install_command.clone();
            } else {
                result.push(' ');
                result.push_str(package);
            }
        }
        result
    }
}

impl Deref for DependencyList {
    type Target = [Dependency];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<Dependency>> for DependencyList {
    fn from(mut deps: Vec<Dependency>) -> Self {
        deps.sort_by(|a, b| a.name.cmp(&b.name));
        Self(deps)
    }
}

/// Scans the system for the dependencies `manager` knows about.
///
/// Fails on the first query error reported by the manager.
pub fn scan_dependencies(manager: &dyn PackageManager) -> Result<DependencyList, PackageError> {
    let mut dependencies = Vec::new();

    for (name, packages) in manager.packages() {
        let mut dependency = Dependency {
            name: name.clone(),
            ..Dependency::default()
        };

        for pkg in &packages {
            dependency.optional = pkg.optional;
            dependency.external = !pkg.system_package;
            dependency.install_command = manager.install_command(pkg);

            if !manager.package_available(pkg)? {
                continue;
            }
            dependency.version = pkg.version.clone();
            dependency.package_name = Some(pkg.name.clone());

            if manager.package_installed(pkg)? {
                dependency.installed = true;
                if !pkg.library {
                    if let Some(version) = manager.app_version(&name) {
                        dependency.version = version;
                    }
                }
            }
            break;
        }

        trace!(
            manager = manager.name(),
            dependency = %dependency.name,
            installed = dependency.installed,
            "dependency scanned"
        );
        dependencies.push(dependency);
    }

    Ok(DependencyList::from(dependencies))
}
