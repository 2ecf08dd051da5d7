//! Artifact locator for PEP 503 indexes.

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

use crate::http::Transport;
use crate::package::CandidateArtifact;
use crate::{BrewError, Result};

use super::html::parse_links;

/// Public PyPI simple index.
pub const DEFAULT_INDEX_URL: &str = "https://pypi.org/simple/";

lazy_static! {
    static ref PADDED_SEGMENT: Regex = Regex::new(r"\.0+(\d+)").unwrap();
}

/// Normalize a distribution filename for prefix matching.
///
/// Trims, lower-cases and collapses zero-padded numeric segments
/// (`foo-1.01.tar.gz` becomes `foo-1.1.tar.gz`).
pub fn normalize_filename(filename: &str) -> String {
    PADDED_SEGMENT
        .replace_all(&filename.trim().to_lowercase(), ".$1")
        .into_owned()
}

/// Filename prefixes a distribution of `name` at `version` may start with.
///
/// Wheels replace `-` in the project name with `_`, so both spellings are
/// accepted.
pub fn expected_prefixes(name: &str, version: &str) -> [String; 2] {
    let name = name.to_lowercase();
    let version = version.to_lowercase();
    [
        format!("{}-{}", name, version),
        format!("{}-{}", name.replace('-', "_"), version),
    ]
}

/// Finds downloadable files for a package version on a simple index
pub struct ArtifactLocator<T> {
    transport: T,
    index_url: Url,
}

impl<T: Transport> ArtifactLocator<T> {
    /// Create a locator for the index at `index_url`.
    ///
    /// A missing trailing slash is added so package paths join beneath it.
    pub fn new(transport: T, index_url: &str) -> Result<Self> {
        let mut normalized = index_url.trim().to_string();
        if !normalized.ends_with('/') {
            normalized.push('/');
        }

        let index_url = Url::parse(&normalized).map_err(|e| BrewError::InvalidUrl {
            url: index_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            transport,
            index_url,
        })
    }

    pub fn index_url(&self) -> &Url {
        &self.index_url
    }

    /// Listing page URL for a package: `{index}/{package_name}/`.
    pub fn listing_url(&self, package_name: &str) -> Result<Url> {
        let path = format!("{}/", package_name);
        self.index_url.join(&path).map_err(|e| BrewError::InvalidUrl {
            url: format!("{}{}", self.index_url, path),
            reason: e.to_string(),
        })
    }

    /// Candidate files for `package_name` at `version`.
    ///
    /// With suffix preferences, candidates are ordered by the first
    /// preference their filename ends with and files matching none are
    /// dropped. Without preferences every file with a matching prefix is
    /// returned in page order.
    pub fn locate(
        &self,
        package_name: &str,
        version: &str,
        suffix_preferences: Option<&[String]>,
    ) -> Result<Vec<CandidateArtifact>> {
        let listing_url = self.listing_url(package_name)?;
        log::debug!("Fetching index page {}", listing_url);

        let response = self.transport.get(listing_url.as_str())?;
        if !response.is_success() {
            log::debug!("Index returned HTTP {} for {}", response.status, listing_url);
            return Err(BrewError::not_found(package_name));
        }

        let prefixes = expected_prefixes(package_name, version);
        let preferences = suffix_preferences.filter(|p| !p.is_empty());

        let mut buckets: IndexMap<&str, Vec<CandidateArtifact>> = IndexMap::new();
        if let Some(preferences) = preferences {
            for suffix in preferences {
                buckets.entry(suffix.as_str()).or_default();
            }
        }
        let mut unordered = Vec::new();

        for link in parse_links(&response.text()) {
            let filename = normalize_filename(&link.filename);
            if !prefixes.iter().any(|prefix| filename.starts_with(prefix.as_str())) {
                continue;
            }

            let url = listing_url.join(&link.href).map_err(|e| BrewError::InvalidUrl {
                url: link.href.clone(),
                reason: e.to_string(),
            })?;

            match preferences {
                Some(preferences) => {
                    let matched = preferences
                        .iter()
                        .find(|suffix| filename.ends_with(suffix.to_lowercase().as_str()));
                    match matched {
                        Some(suffix) => buckets
                            .entry(suffix.as_str())
                            .or_default()
                            .push(CandidateArtifact::new(url.as_str(), suffix.as_str())),
                        None => log::debug!("Skipping {}: no preferred suffix", filename),
                    }
                }
                None => unordered.push(CandidateArtifact::new(url.as_str(), "")),
            }
        }

        if preferences.is_none() {
            return Ok(unordered);
        }

        Ok(buckets.into_values().flatten().collect())
    }
}
