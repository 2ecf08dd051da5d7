use super::graph::InstalledGraph;
use super::traits::InstalledSource;
use crate::package::{InstalledPackage, MarkerEnvironment};
use crate::Result;

/// Installed distributions held in memory.
#[derive(Debug, Clone, Default)]
pub struct ArraySource {
    packages: Vec<InstalledPackage>,
    environment: Option<MarkerEnvironment>,
}

impl ArraySource {
    pub fn new(packages: Vec<InstalledPackage>) -> Self {
        Self {
            packages,
            environment: None,
        }
    }

    pub fn with_environment(mut self, environment: MarkerEnvironment) -> Self {
        self.environment = Some(environment);
        self
    }

    pub fn add_package(&mut self, package: InstalledPackage) {
        self.packages.push(package);
    }
}

impl InstalledSource for ArraySource {
    fn name(&self) -> &str {
        "array"
    }

    fn list_installed(&self) -> Result<InstalledGraph> {
        Ok(InstalledGraph::new(self.packages.clone()).with_environment(self.environment.clone()))
    }
}
