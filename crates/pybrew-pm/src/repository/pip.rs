use serde::Deserialize;
use std::process::Command;

use super::graph::InstalledGraph;
use super::traits::InstalledSource;
use crate::package::{InstalledPackage, MarkerEnvironment, Requirement};
use crate::{BrewError, Result};

/// Installed distributions as reported by `pip inspect`.
///
/// Runs `<python> -m pip inspect --local` and reads its JSON report, so the
/// environment is seen exactly as the interpreter's own pip sees it.
pub struct PipInspectSource {
    python: String,
}

impl PipInspectSource {
    pub fn new(python: impl Into<String>) -> Self {
        Self {
            python: python.into(),
        }
    }

    /// Get the interpreter used to run pip
    pub fn python(&self) -> &str {
        &self.python
    }
}

impl Default for PipInspectSource {
    fn default() -> Self {
        Self::new("python3")
    }
}

impl InstalledSource for PipInspectSource {
    fn name(&self) -> &str {
        "pip-inspect"
    }

    fn list_installed(&self) -> Result<InstalledGraph> {
        log::debug!("Running {} -m pip inspect --local", self.python);

        let output = Command::new(&self.python)
            .args(["-m", "pip", "inspect", "--local"])
            .output()
            .map_err(|e| BrewError::InstalledSource(format!("Failed to run {}: {}", self.python, e)))?;

        if !output.status.success() {
            return Err(BrewError::InstalledSource(format!(
                "{} -m pip inspect exited with {}: {}",
                self.python,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let report = String::from_utf8_lossy(&output.stdout);
        parse_inspect_report(&report)
    }
}

/// Structure of the `pip inspect` report (only the fields we read)
#[derive(Debug, Deserialize)]
struct InspectReport {
    #[serde(default)]
    installed: Vec<InspectEntry>,
    #[serde(default)]
    environment: Option<MarkerEnvironment>,
}

#[derive(Debug, Deserialize)]
struct InspectEntry {
    metadata: InspectMetadata,
}

#[derive(Debug, Deserialize)]
struct InspectMetadata {
    name: String,
    version: String,
    #[serde(default)]
    requires_dist: Vec<String>,
}

/// Parse the JSON document printed by `pip inspect`.
///
/// The interpreter's marker environment travels with the graph so that
/// requirement markers are evaluated the way pip would.
pub fn parse_inspect_report(json: &str) -> Result<InstalledGraph> {
    let report: InspectReport = serde_json::from_str(json)?;

    let packages = report
        .installed
        .into_iter()
        .map(|entry| {
            let metadata = entry.metadata;
            let requires = metadata
                .requires_dist
                .iter()
                .filter_map(|spec| Requirement::parse(spec))
                .collect();
            InstalledPackage::new(metadata.name, metadata.version).with_requires(requires)
        })
        .collect();

    Ok(InstalledGraph::new(packages).with_environment(report.environment))
}
