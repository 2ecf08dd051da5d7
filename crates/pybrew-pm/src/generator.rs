//! End-to-end formula generation.

use crate::dependency_graph;
use crate::downloader::HashFetcher;
use crate::formula::{self, formula_class_name};
use crate::http::Transport;
use crate::index::ArtifactLocator;
use crate::package::{Dependency, ResolvedPackage};
use crate::repository::InstalledSource;
use crate::{BrewError, Result};

/// Distribution suffixes tried in order when none are configured.
pub const DEFAULT_SUFFIXES: [&str; 3] = ["py2.py3-none-any.whl", ".tar.gz", ".zip"];

pub fn default_suffixes() -> Vec<String> {
    DEFAULT_SUFFIXES.iter().map(|s| s.to_string()).collect()
}

/// Split a comma separated suffix list, ignoring blank entries.
pub fn parse_suffixes(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// What to generate a formula for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormulaRequest {
    pub package_name: String,
    pub formula_name: String,
    pub description: String,
    pub homepage: String,
    pub git_repo_url: String,
    /// Download for the primary `url`, replacing the index lookup
    pub release_url: Option<String>,
}

impl FormulaRequest {
    /// A request with the formula name derived from the package name and
    /// every other field empty.
    pub fn new(package_name: impl Into<String>) -> Self {
        let package_name = package_name.into();
        Self {
            formula_name: formula_class_name(&package_name),
            package_name,
            description: String::new(),
            homepage: String::new(),
            git_repo_url: String::new(),
            release_url: None,
        }
    }

    pub fn with_formula_name(mut self, formula_name: impl Into<String>) -> Self {
        self.formula_name = formula_name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_homepage(mut self, homepage: impl Into<String>) -> Self {
        self.homepage = homepage.into();
        self
    }

    pub fn with_git_repo_url(mut self, git_repo_url: impl Into<String>) -> Self {
        self.git_repo_url = git_repo_url.into();
        self
    }

    pub fn with_release_url(mut self, release_url: impl Into<String>) -> Self {
        self.release_url = Some(release_url.into());
        self
    }
}

/// Flattens, locates, hashes and renders in one sequential pass.
pub struct FormulaGenerator<S, T> {
    source: S,
    locator: ArtifactLocator<T>,
    fetcher: HashFetcher<T>,
    suffixes: Vec<String>,
}

impl<S: InstalledSource, T: Transport + Clone> FormulaGenerator<S, T> {
    pub fn new(source: S, transport: T, index_url: &str) -> Result<Self> {
        Ok(Self {
            source,
            locator: ArtifactLocator::new(transport.clone(), index_url)?,
            fetcher: HashFetcher::new(transport),
            suffixes: default_suffixes(),
        })
    }

    /// Replace the suffix preferences, highest precedence first.
    pub fn with_suffixes(mut self, suffixes: Vec<String>) -> Self {
        self.suffixes = suffixes;
        self
    }

    pub fn suffixes(&self) -> &[String] {
        &self.suffixes
    }

    /// Produce the complete formula text for `request`.
    ///
    /// Fails on the first dependency that cannot be located or hashed.
    pub fn generate(&self, request: &FormulaRequest) -> Result<String> {
        let deps = dependency_graph::resolve(&self.source, &request.package_name)?;
        log::info!(
            "Found {} unique dependencies for Python package {}:",
            deps.len(),
            request.package_name
        );
        for dep in &deps {
            log::info!(" - {}", dep);
        }

        log::info!("");
        log::info!("Downloading packages and calculating SHA256 hashes:");

        let (last, resources) = match deps.split_last() {
            Some((last, resources)) => (Some(last), resources),
            None => (None, &deps[..]),
        };

        let mut resolved = resources
            .iter()
            .map(|dep| self.resolve_dependency(dep))
            .collect::<Result<Vec<_>>>()?;

        log::info!("");
        log::info!("Downloading release package:");
        let release = match (&request.release_url, last) {
            (Some(release_url), _) => {
                log::info!(" - Calculating SHA256 hash of release file: {}", release_url);
                let hash = self.fetcher.fetch_and_hash(release_url)?;
                ResolvedPackage::new(&request.package_name, release_url, hash.sha256)
            }
            (None, Some(dep)) => self.resolve_dependency(dep)?,
            (None, None) => return Err(BrewError::NoReleaseSpecified),
        };
        resolved.push(release);
        log::info!("");

        formula::render(
            &request.formula_name,
            &request.description,
            &request.homepage,
            &request.git_repo_url,
            &resolved,
            None,
        )
    }

    fn resolve_dependency(&self, dep: &Dependency) -> Result<ResolvedPackage> {
        log::info!(
            " - Calculating SHA256 hash of dependency: {}, version: {}",
            dep.package_name,
            dep.installed_version
        );

        let candidates = self.locator.locate(
            &dep.package_name,
            &dep.installed_version,
            Some(self.suffixes.as_slice()),
        )?;
        let candidate = candidates
            .first()
            .ok_or_else(|| BrewError::not_found(&dep.package_name))?;
        log::debug!("Using {} for {}", candidate.url, dep);

        let hash = self.fetcher.fetch_and_hash(&candidate.url)?;
        Ok(ResolvedPackage::new(
            &dep.package_name,
            candidate.download_url(),
            hash.sha256,
        ))
    }
}
