//! Distribution downloading and hashing.
//!
//! This module downloads distribution files into memory, verifies any
//! checksum the index advertised for them and computes the SHA-256 digest
//! recorded in the formula.

mod checksum;
mod fetcher;

pub use checksum::{compute_digest, compute_md5, compute_sha256};
pub use fetcher::{FetchedHash, HashFetcher};
