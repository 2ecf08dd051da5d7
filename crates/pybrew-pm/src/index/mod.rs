//! Package index access.
//!
//! Locates distribution files for an installed version on a PEP 503
//! "simple" index. Listing pages are reduced to plain `(filename, href)`
//! pairs by [`html::parse_links`] so the matching rules never depend on
//! how the page was marked up.

pub mod html;
mod locator;

pub use html::IndexLink;
pub use locator::{expected_prefixes, normalize_filename, ArtifactLocator, DEFAULT_INDEX_URL};
