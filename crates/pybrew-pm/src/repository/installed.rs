use std::fs;
use std::path::{Path, PathBuf};

use super::graph::InstalledGraph;
use super::metadata::{parse_metadata, parse_requires_txt};
use super::traits::InstalledSource;
use crate::package::{InstalledPackage, MarkerEnvironment};
use crate::{BrewError, Result};

/// Installed distributions read straight from `site-packages` directories.
///
/// Every `*.dist-info/METADATA` and `*.egg-info/PKG-INFO` below the
/// configured directories is parsed. Directories are scanned in the order
/// given, which is the order their packages take precedence in.
pub struct SitePackagesSource {
    dirs: Vec<PathBuf>,
    environment: Option<MarkerEnvironment>,
}

impl SitePackagesSource {
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self {
            dirs,
            environment: None,
        }
    }

    /// Evaluate requirement markers against `environment`
    pub fn with_environment(mut self, environment: MarkerEnvironment) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Get the scanned directories
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    fn scan_dir(&self, dir: &Path) -> Result<Vec<InstalledPackage>> {
        let mut packages = Vec::new();

        for metadata_path in glob_paths(dir, "*.dist-info/METADATA")? {
            let content = fs::read_to_string(&metadata_path)?;
            packages.push(parse_metadata(&content, &metadata_path.display().to_string())?);
        }

        for pkg_info_path in glob_paths(dir, "*.egg-info/PKG-INFO")? {
            let content = fs::read_to_string(&pkg_info_path)?;
            let mut package = parse_metadata(&content, &pkg_info_path.display().to_string())?;

            // egg-info keeps requirements beside PKG-INFO rather than in it
            let requires_path = pkg_info_path.with_file_name("requires.txt");
            if package.requires.is_empty() && requires_path.is_file() {
                package.requires = parse_requires_txt(&fs::read_to_string(&requires_path)?);
            }

            packages.push(package);
        }

        log::debug!("Found {} distributions in {}", packages.len(), dir.display());
        Ok(packages)
    }
}

impl InstalledSource for SitePackagesSource {
    fn name(&self) -> &str {
        "site-packages"
    }

    fn list_installed(&self) -> Result<InstalledGraph> {
        let mut packages = Vec::new();

        for dir in &self.dirs {
            if !dir.is_dir() {
                return Err(BrewError::InstalledSource(format!(
                    "{} is not a directory",
                    dir.display()
                )));
            }
            packages.extend(self.scan_dir(dir)?);
        }

        Ok(InstalledGraph::new(packages).with_environment(self.environment.clone()))
    }
}

fn glob_paths(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let escaped = glob::Pattern::escape(&dir.to_string_lossy());
    let full_pattern = format!("{}/{}", escaped, pattern);

    let paths = glob::glob(&full_pattern)
        .map_err(|e| BrewError::InstalledSource(format!("Invalid pattern {}: {}", full_pattern, e)))?;

    Ok(paths.filter_map(|entry| entry.ok()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_dist_info(root: &Path, dir_name: &str, metadata: &str) {
        let dist_info = root.join(dir_name);
        fs::create_dir_all(&dist_info).unwrap();
        fs::write(dist_info.join("METADATA"), metadata).unwrap();
    }

    #[test]
    fn test_scan_dist_info() {
        let temp_dir = TempDir::new().unwrap();
        write_dist_info(
            temp_dir.path(),
            "requests-2.31.0.dist-info",
            "Name: requests\nVersion: 2.31.0\nRequires-Dist: idna (<4,>=2.5)\n",
        );
        write_dist_info(temp_dir.path(), "idna-3.6.dist-info", "Name: idna\nVersion: 3.6\n");
        fs::create_dir_all(temp_dir.path().join("requests")).unwrap();

        let source = SitePackagesSource::new(vec![temp_dir.path().to_path_buf()]);
        let graph = source.list_installed().unwrap();

        assert_eq!(source.name(), "site-packages");
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.get("requests").unwrap().requires[0].key, "idna");
        assert_eq!(graph.get("idna").unwrap().version, "3.6");
    }

    #[test]
    fn test_scan_egg_info_with_requires_txt() {
        let temp_dir = TempDir::new().unwrap();
        let egg_info = temp_dir.path().join("legacy_pkg.egg-info");
        fs::create_dir_all(&egg_info).unwrap();
        fs::write(egg_info.join("PKG-INFO"), "Metadata-Version: 1.1\nName: legacy-pkg\nVersion: 0.3\n").unwrap();
        fs::write(egg_info.join("requires.txt"), "six\n\n[docs]\nsphinx\n").unwrap();

        let source = SitePackagesSource::new(vec![temp_dir.path().to_path_buf()]);
        let graph = source.list_installed().unwrap();

        let package = graph.get("legacy_pkg").unwrap();
        assert_eq!(package.project_name, "legacy-pkg");
        assert_eq!(package.requires.len(), 2);
        assert!(package.requires[1].is_extra());
    }

    #[test]
    fn test_directory_order_is_kept() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        write_dist_info(first.path(), "six-1.16.0.dist-info", "Name: six\nVersion: 1.16.0\n");
        write_dist_info(second.path(), "six-1.15.0.dist-info", "Name: six\nVersion: 1.15.0\n");

        let source = SitePackagesSource::new(vec![
            first.path().to_path_buf(),
            second.path().to_path_buf(),
        ]);
        let graph = source.list_installed().unwrap();

        assert_eq!(graph.find("six").len(), 2);
        assert_eq!(graph.get("six").unwrap().version, "1.16.0");
    }

    #[test]
    fn test_missing_directory() {
        let source = SitePackagesSource::new(vec![PathBuf::from("/nonexistent/site-packages")]);
        let err = source.list_installed().unwrap_err();
        assert!(matches!(err, BrewError::InstalledSource(_)));
    }

    #[test]
    fn test_invalid_metadata_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        write_dist_info(temp_dir.path(), "broken-1.0.dist-info", "Summary: nothing useful\n");

        let source = SitePackagesSource::new(vec![temp_dir.path().to_path_buf()]);
        let err = source.list_installed().unwrap_err();
        assert!(matches!(err, BrewError::InvalidMetadata { .. }));
    }
}
