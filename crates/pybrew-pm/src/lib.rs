pub mod config;
pub mod dependency_graph;
pub mod downloader;
pub mod error;
pub mod formula;
pub mod generator;
pub mod http;
pub mod index;
pub mod package;
pub mod repository;

#[cfg(test)]
mod test_utils;

pub use error::{BrewError, Result};
pub use config::Config;
pub use dependency_graph::{flatten, resolve};
pub use downloader::{FetchedHash, HashFetcher};
pub use formula::{formula_class_name, render};
pub use generator::{FormulaGenerator, FormulaRequest};
pub use http::{HttpClient, HttpClientConfig, Transport};
pub use index::ArtifactLocator;
pub use package::{CandidateArtifact, Dependency, InstalledPackage, Requirement, ResolvedPackage};
pub use repository::{ArraySource, InstalledGraph, InstalledSource, PipInspectSource, SitePackagesSource};
