//! Parsing of core metadata files (`METADATA`, `PKG-INFO`) and legacy
//! `requires.txt` files.

use crate::package::{InstalledPackage, Requirement};
use crate::{BrewError, Result};

/// Parse the header block of a core metadata file.
///
/// Only `Name`, `Version` and `Requires-Dist` are read. Headers end at the
/// first blank line; continuation lines (leading whitespace) are folded into
/// the previous header.
pub fn parse_metadata(content: &str, origin: &str) -> Result<InstalledPackage> {
    let mut headers: Vec<(String, String)> = Vec::new();

    for line in content.lines() {
        if line.trim().is_empty() {
            break;
        }

        if line.starts_with([' ', '\t']) {
            if let Some((_, value)) = headers.last_mut() {
                value.push(' ');
                value.push_str(line.trim());
            }
            continue;
        }

        if let Some((key, value)) = line.split_once(':') {
            headers.push((key.trim().to_lowercase(), value.trim().to_string()));
        }
    }

    let header = |name: &str| {
        headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
            .filter(|value| !value.is_empty())
    };

    let name = header("name").ok_or_else(|| BrewError::InvalidMetadata {
        origin: origin.to_string(),
        message: "missing Name header".to_string(),
    })?;
    let version = header("version").ok_or_else(|| BrewError::InvalidMetadata {
        origin: origin.to_string(),
        message: "missing Version header".to_string(),
    })?;

    let requires = headers
        .iter()
        .filter(|(key, _)| key == "requires-dist")
        .filter_map(|(_, value)| {
            let requirement = Requirement::parse(value);
            if requirement.is_none() {
                log::warn!("Ignoring unparsable requirement in {}: {}", origin, value);
            }
            requirement
        })
        .collect();

    Ok(InstalledPackage::new(name, version).with_requires(requires))
}

/// Parse an egg-info `requires.txt`.
///
/// Lines before the first section are unconditional. A `[:marker]` section
/// attaches its marker to the lines below it; a named `[extra]` or
/// `[extra:marker]` section is recorded as an extra.
pub fn parse_requires_txt(content: &str) -> Vec<Requirement> {
    let mut requirements = Vec::new();
    let mut marker: Option<String> = None;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(section) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            marker = match section.split_once(':') {
                Some(("", env_marker)) => Some(env_marker.trim().to_string()),
                Some((extra, env_marker)) => Some(format!(
                    "({}) and extra == \"{}\"",
                    env_marker.trim(),
                    extra.trim()
                )),
                None => Some(format!("extra == \"{}\"", section.trim())),
            };
            continue;
        }

        if let Some(requirement) = Requirement::parse(line) {
            requirements.push(match &marker {
                Some(marker) => requirement.with_marker(marker.clone()),
                None => requirement,
            });
        }
    }

    requirements
}
