use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::requirement::Requirement;

lazy_static! {
    static ref NAME_SEPARATORS: Regex = Regex::new(r"[-_.]+").unwrap();
}

/// Normalize a distribution name the way package indexes compare them.
///
/// Lower-cases the name and collapses every run of `-`, `_` and `.` into a
/// single `-`, so `Zope.Interface` and `zope_interface` share a key.
///
/// # Examples
///
/// ```
/// use pybrew_pm::package::canonicalize_name;
///
/// assert_eq!(canonicalize_name("Zope.Interface"), "zope-interface");
/// assert_eq!(canonicalize_name("typing_extensions"), "typing-extensions");
/// assert_eq!(canonicalize_name("requests"), "requests");
/// ```
pub fn canonicalize_name(name: &str) -> String {
    NAME_SEPARATORS
        .replace_all(name.trim(), "-")
        .to_lowercase()
}

/// A distribution installed in the active environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledPackage {
    /// Canonical name used for lookups and deduplication
    pub key: String,
    /// Name as declared in the distribution metadata
    pub project_name: String,
    /// Installed version
    pub version: String,
    /// Direct requirements declared by the distribution
    #[serde(default)]
    pub requires: Vec<Requirement>,
}

impl InstalledPackage {
    pub fn new(project_name: impl Into<String>, version: impl Into<String>) -> Self {
        let project_name = project_name.into();
        Self {
            key: canonicalize_name(&project_name),
            project_name,
            version: version.into(),
            requires: Vec::new(),
        }
    }

    pub fn with_requires(mut self, requires: Vec<Requirement>) -> Self {
        self.requires = requires;
        self
    }

    /// Whether `name` refers to this distribution, by key or by display name.
    pub fn matches_name(&self, name: &str) -> bool {
        self.key == canonicalize_name(name) || self.project_name == name
    }

    pub fn to_dependency(&self) -> Dependency {
        Dependency {
            package_name: self.project_name.clone(),
            installed_version: self.version.clone(),
        }
    }
}

impl fmt::Display for InstalledPackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.project_name, self.version)
    }
}

/// One entry of the flattened, install-ordered dependency list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dependency {
    pub package_name: String,
    pub installed_version: String,
}

impl Dependency {
    pub fn new(package_name: impl Into<String>, installed_version: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            installed_version: installed_version.into(),
        }
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.package_name, self.installed_version)
    }
}
