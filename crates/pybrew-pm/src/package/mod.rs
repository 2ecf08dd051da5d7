// Package model for installed Python distributions
//
// This module provides the types that flow through formula generation:
// installed distributions and their requirements, the flattened dependency
// list, index candidates and the resolved records handed to the renderer.

mod artifact;
mod marker;
mod package;
mod requirement;

pub use artifact::{CandidateArtifact, ChecksumAlgorithm, EmbeddedChecksum, ResolvedPackage};
pub use marker::{MarkerEnvironment, MarkerError, MarkerOperator, MarkerTree, MarkerValue};
pub use package::{canonicalize_name, Dependency, InstalledPackage};
pub use requirement::Requirement;
