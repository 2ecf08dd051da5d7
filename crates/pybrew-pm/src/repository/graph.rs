use indexmap::IndexMap;

use crate::package::{canonicalize_name, InstalledPackage, MarkerEnvironment, Requirement};

/// Installed distributions indexed by canonical key.
///
/// The same key may appear more than once when a distribution is installed
/// in several directories of the search path; lookups by key then return
/// the first one, matching import precedence.
///
/// When the marker environment of the interpreter is known, requirement
/// markers are evaluated against it.
#[derive(Debug, Clone, Default)]
pub struct InstalledGraph {
    packages: Vec<InstalledPackage>,
    by_key: IndexMap<String, Vec<usize>>,
    environment: Option<MarkerEnvironment>,
}

/// Outcome of following one requirement edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge<'a> {
    /// The requirement is installed
    Installed(&'a InstalledPackage),
    /// Optional extra, not part of a default install
    Extra,
    /// Marker is false for the environment, or undecidable and the
    /// requirement is not installed
    Inapplicable,
    /// Applicable requirement that is not installed
    Missing,
}

impl InstalledGraph {
    pub fn new(packages: Vec<InstalledPackage>) -> Self {
        let mut by_key: IndexMap<String, Vec<usize>> = IndexMap::new();
        for (index, package) in packages.iter().enumerate() {
            by_key.entry(package.key.clone()).or_default().push(index);
        }

        Self {
            packages,
            by_key,
            environment: None,
        }
    }

    pub fn with_environment(mut self, environment: Option<MarkerEnvironment>) -> Self {
        self.environment = environment;
        self
    }

    pub fn environment(&self) -> Option<&MarkerEnvironment> {
        self.environment.as_ref()
    }

    pub fn packages(&self) -> &[InstalledPackage] {
        &self.packages
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// All nodes whose key or display name matches `name`.
    pub fn find(&self, name: &str) -> Vec<&InstalledPackage> {
        self.packages
            .iter()
            .filter(|package| package.matches_name(name))
            .collect()
    }

    /// First node installed under the canonical form of `name`.
    pub fn get(&self, name: &str) -> Option<&InstalledPackage> {
        self.by_key
            .get(&canonicalize_name(name))
            .and_then(|indexes| indexes.first())
            .map(|&index| &self.packages[index])
    }

    /// Resolve a requirement edge against the installed set.
    pub fn edge(&self, requirement: &Requirement) -> Edge<'_> {
        if requirement.is_extra() {
            return Edge::Extra;
        }

        let applies = match (&self.environment, requirement.has_marker()) {
            (_, false) => Some(true),
            (Some(environment), true) => requirement.applies_to(environment),
            (None, true) => None,
        };

        match (applies, self.get(&requirement.key)) {
            (Some(false), _) => Edge::Inapplicable,
            (_, Some(package)) => Edge::Installed(package),
            (Some(true), None) => Edge::Missing,
            (None, None) => Edge::Inapplicable,
        }
    }
}
