use serde::{Deserialize, Serialize};
use std::fmt;

/// Digest algorithms an index may advertise in a link fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecksumAlgorithm {
    Md5,
    Sha256,
}

impl ChecksumAlgorithm {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "md5" => Some(ChecksumAlgorithm::Md5),
            "sha256" => Some(ChecksumAlgorithm::Sha256),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChecksumAlgorithm::Md5 => "md5",
            ChecksumAlgorithm::Sha256 => "sha256",
        }
    }
}

impl fmt::Display for ChecksumAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Expected digest carried in a URL fragment (`#md5=...`, `#sha256=...`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddedChecksum {
    pub algorithm: ChecksumAlgorithm,
    pub hex_digest: String,
}

impl EmbeddedChecksum {
    pub fn new(algorithm: ChecksumAlgorithm, hex_digest: impl Into<String>) -> Self {
        Self {
            algorithm,
            hex_digest: hex_digest.into(),
        }
    }

    /// Split a URL into its fragment-free part and the checksum advertised in
    /// the fragment.
    ///
    /// Fragments that are not `md5=` or `sha256=` are dropped without a
    /// checksum.
    ///
    /// # Examples
    ///
    /// ```
    /// use pybrew_pm::package::{ChecksumAlgorithm, EmbeddedChecksum};
    ///
    /// let (base, checksum) = EmbeddedChecksum::split_url("https://h/six-1.16.0.tar.gz#md5=abc");
    /// assert_eq!(base, "https://h/six-1.16.0.tar.gz");
    /// assert_eq!(checksum.unwrap().algorithm, ChecksumAlgorithm::Md5);
    /// ```
    pub fn split_url(url: &str) -> (&str, Option<Self>) {
        let Some((base, fragment)) = url.split_once('#') else {
            return (url, None);
        };

        let checksum = fragment.split_once('=').and_then(|(algorithm, digest)| {
            let algorithm = ChecksumAlgorithm::parse(algorithm)?;
            let digest = digest.trim();
            (!digest.is_empty()).then(|| EmbeddedChecksum::new(algorithm, digest))
        });

        (base, checksum)
    }

    /// Whether `actual` equals the expected digest, ignoring hex case.
    pub fn matches(&self, actual: &str) -> bool {
        self.hex_digest.eq_ignore_ascii_case(actual)
    }
}

impl fmt::Display for EmbeddedChecksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.algorithm, self.hex_digest)
    }
}

/// A distribution file on the index that matches a dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateArtifact {
    /// Absolute URL, including the checksum fragment when the index gave one
    pub url: String,
    /// Preference suffix the filename matched, empty without preferences
    pub suffix: String,
    pub embedded_checksum: Option<EmbeddedChecksum>,
}

impl CandidateArtifact {
    pub fn new(url: impl Into<String>, suffix: impl Into<String>) -> Self {
        let url = url.into();
        let (_, embedded_checksum) = EmbeddedChecksum::split_url(&url);
        Self {
            suffix: suffix.into(),
            embedded_checksum,
            url,
        }
    }

    /// The URL without its checksum fragment.
    pub fn download_url(&self) -> &str {
        EmbeddedChecksum::split_url(&self.url).0
    }
}

/// Final per-package record consumed by the formula renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPackage {
    pub package_name: String,
    pub url: String,
    pub sha256: String,
}

impl ResolvedPackage {
    pub fn new(
        package_name: impl Into<String>,
        url: impl Into<String>,
        sha256: impl Into<String>,
    ) -> Self {
        Self {
            package_name: package_name.into(),
            url: url.into(),
            sha256: sha256.into(),
        }
    }
}
