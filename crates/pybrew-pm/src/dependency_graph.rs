//! Dependency graph flattening for installed packages.

use std::collections::HashSet;

use crate::package::{Dependency, InstalledPackage};
use crate::repository::{Edge, InstalledGraph, InstalledSource};
use crate::{BrewError, Result};

/// Read the installed graph from `source` and flatten it for `package_name`.
pub fn resolve(source: &dyn InstalledSource, package_name: &str) -> Result<Vec<Dependency>> {
    log::debug!("Reading installed packages via {}", source.name());
    let graph = source.list_installed()?;
    log::debug!("{} installed distributions", graph.len());

    flatten(&graph, package_name)
}

/// Produce the install-ordered dependency list of `package_name`.
///
/// The walk is depth-first and post-order: a package is appended only after
/// all of its requirements, so every dependency precedes its dependents and
/// the requested package comes last. Each key appears once; repeated
/// occurrences keep the first position.
pub fn flatten(graph: &InstalledGraph, package_name: &str) -> Result<Vec<Dependency>> {
    let root = find_root(graph, package_name)?;

    let mut walk = Walk {
        graph,
        on_path: HashSet::new(),
        seen: HashSet::new(),
        deps: Vec::new(),
    };
    walk.visit(root)?;

    Ok(walk.deps)
}

fn find_root<'a>(graph: &'a InstalledGraph, package_name: &str) -> Result<&'a InstalledPackage> {
    let nodes = graph.find(package_name);
    match nodes.as_slice() {
        [] => Err(BrewError::not_found(package_name)),
        [root] => Ok(*root),
        _ => Err(BrewError::AmbiguousPackage {
            name: package_name.to_string(),
        }),
    }
}

struct Walk<'a> {
    graph: &'a InstalledGraph,
    on_path: HashSet<String>,
    seen: HashSet<String>,
    deps: Vec<Dependency>,
}

impl<'a> Walk<'a> {
    fn visit(&mut self, package: &'a InstalledPackage) -> Result<()> {
        if self.seen.contains(&package.key) {
            log::debug!("Duplicate dependency found: {}", package.project_name);
            return Ok(());
        }

        log::debug!("Extracting dependencies for: {}", package.key);
        self.on_path.insert(package.key.clone());

        for child in self.children(package)? {
            if self.on_path.contains(&child.key) {
                log::debug!("Dependency cycle: {} -> {}", package.key, child.key);
                continue;
            }
            self.visit(child)?;
        }

        self.on_path.remove(&package.key);

        log::debug!("Adding {} as a dependency", package.key);
        self.seen.insert(package.key.clone());
        self.deps.push(package.to_dependency());

        Ok(())
    }

    /// Installed direct requirements of `package`, sorted by key.
    fn children(&self, package: &InstalledPackage) -> Result<Vec<&'a InstalledPackage>> {
        let graph = self.graph;
        let mut children = Vec::new();

        for requirement in &package.requires {
            match graph.edge(requirement) {
                Edge::Installed(child) => children.push(child),
                Edge::Extra => {}
                Edge::Inapplicable => {
                    log::debug!(
                        "Skipping {} required by {}: marker does not apply",
                        requirement,
                        package.key
                    );
                }
                Edge::Missing => {
                    log::debug!("{} requires {}, which is not installed", package.key, requirement.name);
                    return Err(BrewError::not_found(&requirement.name));
                }
            }
        }

        children.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(children)
    }
}
