//! Checksum computation for downloaded content.

use md5::Md5;
use sha2::{Digest, Sha256};

use crate::package::ChecksumAlgorithm;

/// Compute the lower-case hex digest of `content` with `algorithm`
pub fn compute_digest(content: &[u8], algorithm: ChecksumAlgorithm) -> String {
    match algorithm {
        ChecksumAlgorithm::Md5 => compute_md5(content),
        ChecksumAlgorithm::Sha256 => compute_sha256(content),
    }
}

/// Compute SHA-256 checksum of a buffer
pub fn compute_sha256(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}

/// Compute MD5 checksum of a buffer
pub fn compute_md5(content: &[u8]) -> String {
    let mut hasher = Md5::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_sha256() {
        // SHA-256 of "hello world"
        assert_eq!(
            compute_sha256(b"hello world"),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_compute_md5() {
        assert_eq!(compute_md5(b"hello world"), "5eb63bbbe01eeed093cb22bb8f5acdc3");
    }

    #[test]
    fn test_compute_digest_dispatch() {
        assert_eq!(
            compute_digest(b"", ChecksumAlgorithm::Sha256),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            compute_digest(b"", ChecksumAlgorithm::Md5),
            "d41d8cd98f00b204e9800998ecf8427e"
        );
    }
}
