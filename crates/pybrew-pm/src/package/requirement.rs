use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::marker::{MarkerEnvironment, MarkerTree};
use super::package::canonicalize_name;

lazy_static! {
    static ref REQUIREMENT_NAME: Regex = Regex::new(r"^\s*([A-Za-z0-9](?:[A-Za-z0-9._-]*[A-Za-z0-9])?)").unwrap();
    static ref EXTRA_MARKER: Regex = Regex::new(r"\bextra\s*==").unwrap();
}

/// A direct requirement declared by an installed distribution
/// (one `Requires-Dist` entry).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    /// Name as written in the requirement
    pub name: String,
    /// Canonical name of the required distribution
    pub key: String,
    /// Environment marker after `;`, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker: Option<String>,
}

impl Requirement {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            key: canonicalize_name(&name),
            name,
            marker: None,
        }
    }

    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = Some(marker.into());
        self
    }

    /// Parse a PEP 508 requirement string such as
    /// `charset-normalizer (<4,>=2)` or `PySocks!=1.5.7 ; extra == "socks"`.
    ///
    /// Only the name and the marker are kept; version specifiers, extras and
    /// direct URLs do not influence the installed graph. Returns `None` when
    /// the string does not start with a valid distribution name.
    pub fn parse(spec: &str) -> Option<Self> {
        let (head, marker) = match spec.split_once(';') {
            Some((head, marker)) => {
                let marker = marker.trim();
                (head, (!marker.is_empty()).then(|| marker.to_string()))
            }
            None => (spec, None),
        };

        let name = REQUIREMENT_NAME.captures(head)?.get(1)?.as_str();
        let mut requirement = Requirement::new(name);
        requirement.marker = marker;
        Some(requirement)
    }

    /// Whether this requirement only applies when an optional extra is
    /// requested.
    pub fn is_extra(&self) -> bool {
        self.marker
            .as_deref()
            .is_some_and(|marker| EXTRA_MARKER.is_match(marker))
    }

    pub fn has_marker(&self) -> bool {
        self.marker.is_some()
    }

    /// Evaluate the marker in `env`.
    ///
    /// A requirement without a marker always applies. `None` means the
    /// marker could not be decided: it reads a variable `env` lacks, or it
    /// does not parse.
    pub fn applies_to(&self, env: &MarkerEnvironment) -> Option<bool> {
        let Some(marker) = &self.marker else {
            return Some(true);
        };

        match MarkerTree::parse(marker) {
            Ok(tree) => tree.evaluate(env),
            Err(e) => {
                log::warn!("Ignoring marker of requirement {}: {}", self.name, e);
                None
            }
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.marker {
            Some(marker) => write!(f, "{}; {}", self.name, marker),
            None => write!(f, "{}", self.name),
        }
    }
}
