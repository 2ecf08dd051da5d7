use thiserror::Error;

use crate::http::HttpError;

#[derive(Error, Debug)]
pub enum BrewError {
    // Package errors
    #[error("Package cannot be found: {name}")]
    PackageNotFound { name: String },

    #[error("Multiple packages found: {name}")]
    AmbiguousPackage { name: String },

    // Download errors
    #[error("Package cannot be fetched: {url} ({reason})")]
    FetchError { url: String, reason: String },

    #[error("Hash validation for file {url} failed. Expected: {expected}. Actual: {actual}")]
    HashMismatch {
        url: String,
        expected: String,
        actual: String,
    },

    // Formula errors
    #[error("No release package specified: no dependencies were resolved and no release URL was given")]
    NoReleaseSpecified,

    // Installed-package metadata errors
    #[error("Invalid package metadata in {origin}: {message}")]
    InvalidMetadata { origin: String, message: String },

    #[error("Could not read installed packages: {0}")]
    InstalledSource(String),

    // Network errors
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    // JSON/parsing errors
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Config errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl BrewError {
    pub fn not_found(name: impl Into<String>) -> Self {
        BrewError::PackageNotFound { name: name.into() }
    }
}

pub type Result<T> = std::result::Result<T, BrewError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = BrewError::not_found("requests");
        assert_eq!(err.to_string(), "Package cannot be found: requests");

        let err = BrewError::AmbiguousPackage { name: "foo".to_string() };
        assert_eq!(err.to_string(), "Multiple packages found: foo");

        let err = BrewError::HashMismatch {
            url: "https://example.com/a.tar.gz".to_string(),
            expected: "aa".to_string(),
            actual: "bb".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Hash validation for file https://example.com/a.tar.gz failed. Expected: aa. Actual: bb"
        );
    }
}
