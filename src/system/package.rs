//! # Package-manager collaborator contract.
//!
//! [`PackageManager`] is a synchronous query interface over the host's package
//! database. Implementations (apt, pacman, ...) live outside this crate; the
//! dependency report in [`super::dependency`] only consumes the trait.

use std::collections::{BTreeMap, HashMap};

use crate::error::PackageError;

/// A system package that may satisfy a dependency.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Package {
    /// Package name in the host's package database.
    pub name: String,
    /// Version string reported for the package.
    pub version: String,
    /// Install command per OS id, when the manager needs one.
    pub install_command: HashMap<String, String>,
    /// Installed by the system package manager (as opposed to an external installer).
    pub system_package: bool,
    /// A library (version comes from the package, not from running an application).
    pub library: bool,
    /// Not required for a working setup.
    pub optional: bool,
}

impl Package {
    /// Creates a required, non-library system package.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            system_package: true,
            ..Self::default()
        }
    }

    /// Marks the package as a library.
    pub fn library(mut self) -> Self {
        self.library = true;
        self
    }

    /// Marks the package as optional.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Marks the package as installed outside the system package manager.
    pub fn external(mut self) -> Self {
        self.system_package = false;
        self
    }
}

/// Dependency name → candidate packages, in order of preference.
pub type PackageMap = BTreeMap<String, Vec<Package>>;

/// Common interface across system package managers.
pub trait PackageManager: Send + Sync {
    /// Manager name (e.g. `apt`).
    fn name(&self) -> &str;

    /// Dependencies this manager knows how to satisfy.
    fn packages(&self) -> PackageMap;

    /// Whether the package exists in the package database.
    fn package_available(&self, pkg: &Package) -> Result<bool, PackageError>;

    /// Whether the package is installed.
    fn package_installed(&self, pkg: &Package) -> Result<bool, PackageError>;

    /// Command that installs the package.
    fn install_command(&self, pkg: &Package) -> String;

    /// Version of the application behind a non-library dependency, if it can be determined.
    fn app_version(&self, _dependency: &str) -> Option<String> {
        None
    }
}
