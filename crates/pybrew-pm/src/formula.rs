//! Homebrew formula rendering.

use crate::package::ResolvedPackage;
use crate::{BrewError, Result};

/// Python requirement line emitted into every formula.
pub const PYTHON_DEP: &str = "depends_on :python3";

/// Derive a formula class name from a Python package name.
///
/// Dashes are removed, the first character is upper-cased and the rest
/// lower-cased.
///
/// # Examples
///
/// ```
/// use pybrew_pm::formula::formula_class_name;
///
/// assert_eq!(formula_class_name("my-cool-pkg"), "Mycoolpkg");
/// assert_eq!(formula_class_name("HTTPie"), "Httpie");
/// ```
pub fn formula_class_name(package_name: &str) -> String {
    let joined: String = package_name.split('-').collect();
    let mut chars = joined.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Render the formula text.
///
/// Every entry of `resolved` except the last becomes a `resource` block, in
/// order. The primary `url`/`sha256` come from `release` when given,
/// otherwise from the last entry of `resolved`. Values are interpolated
/// as-is without escaping.
pub fn render(
    formula_name: &str,
    description: &str,
    homepage: &str,
    head_url: &str,
    resolved: &[ResolvedPackage],
    release: Option<&ResolvedPackage>,
) -> Result<String> {
    let (resources, last) = match resolved.split_last() {
        Some((last, resources)) => (resources, Some(last)),
        None => (resolved, None),
    };
    let primary = release.or(last).ok_or(BrewError::NoReleaseSpecified)?;

    let mut resource_blocks = String::new();
    for package in resources {
        write_resource(&mut resource_blocks, package);
    }

    Ok(format!(
        r#"class {formula_name} < Formula
  include Language::Python::Virtualenv

  desc "{description}"
  homepage "{homepage}"
  url "{package_url}"
  sha256 "{package_sha256}"
  head "{head_url}"

  {python_dep}{resource_blocks}

  def install
    virtualenv_install_with_resources
  end
end"#,
        formula_name = formula_name,
        description = description,
        homepage = homepage,
        package_url = primary.url,
        package_sha256 = primary.sha256,
        head_url = head_url,
        python_dep = PYTHON_DEP,
        resource_blocks = resource_blocks,
    ))
}

fn write_resource(out: &mut String, package: &ResolvedPackage) {
    out.push_str(&format!(
        "\n\n  resource \"{}\" do\n    url \"{}\"\n    sha256 \"{}\"\n  end",
        package.package_name, package.url, package.sha256
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field<'a>(text: &'a str, indent: &str, key: &str) -> Vec<&'a str> {
        let prefix = format!("{}{} \"", indent, key);
        text.lines()
            .filter_map(|line| line.strip_prefix(prefix.as_str()))
            .filter_map(|rest| rest.strip_suffix('"'))
            .collect()
    }

    fn packages() -> Vec<ResolvedPackage> {
        vec![
            ResolvedPackage::new("click", "https://files.example.com/click-8.1.7.tar.gz", "aa11"),
            ResolvedPackage::new("MarkupSafe", "https://files.example.com/MarkupSafe-2.1.3.tar.gz", "bb22"),
            ResolvedPackage::new("flask", "https://files.example.com/flask-3.0.0.tar.gz", "cc33"),
        ]
    }

    #[test]
    fn test_formula_class_name() {
        assert_eq!(formula_class_name("my-cool-pkg"), "Mycoolpkg");
        assert_eq!(formula_class_name("flask"), "Flask");
        assert_eq!(formula_class_name("Flask_Login"), "Flask_login");
        assert_eq!(formula_class_name(""), "");
    }

    #[test]
    fn test_render_exact_output() {
        let resolved = vec![
            ResolvedPackage::new("six", "https://h/six-1.16.0.tar.gz", "0a"),
            ResolvedPackage::new("mytool", "https://h/mytool-1.0.tar.gz", "1b"),
        ];

        let text = render(
            "Mytool",
            "My tool",
            "https://example.com",
            "https://github.com/me/mytool.git",
            &resolved,
            None,
        )
        .unwrap();

        let expected = "class Mytool < Formula
  include Language::Python::Virtualenv

  desc \"My tool\"
  homepage \"https://example.com\"
  url \"https://h/mytool-1.0.tar.gz\"
  sha256 \"1b\"
  head \"https://github.com/me/mytool.git\"

  depends_on :python3

  resource \"six\" do
    url \"https://h/six-1.16.0.tar.gz\"
    sha256 \"0a\"
  end

  def install
    virtualenv_install_with_resources
  end
end";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_resources_in_input_order() {
        let text = render("Flask", "d", "h", "g", &packages(), None).unwrap();

        let names: Vec<&str> = text
            .lines()
            .filter_map(|line| line.strip_prefix("  resource \""))
            .filter_map(|rest| rest.strip_suffix("\" do"))
            .collect();
        assert_eq!(names, vec!["click", "MarkupSafe"]);
    }

    #[test]
    fn test_url_and_sha256_round_trip() {
        let resolved = packages();
        let text = render("Flask", "d", "h", "g", &resolved, None).unwrap();

        assert_eq!(field(&text, "  ", "url"), vec![resolved[2].url.as_str()]);
        assert_eq!(field(&text, "  ", "sha256"), vec![resolved[2].sha256.as_str()]);
        assert_eq!(
            field(&text, "    ", "url"),
            vec![resolved[0].url.as_str(), resolved[1].url.as_str()]
        );
        assert_eq!(
            field(&text, "    ", "sha256"),
            vec![resolved[0].sha256.as_str(), resolved[1].sha256.as_str()]
        );
    }

    #[test]
    fn test_release_override_takes_primary_fields() {
        let release = ResolvedPackage::new("flask", "https://releases.example.com/flask.tar.gz", "ff");
        let text = render("Flask", "d", "h", "g", &packages(), Some(&release)).unwrap();

        assert_eq!(field(&text, "  ", "url"), vec!["https://releases.example.com/flask.tar.gz"]);
        assert_eq!(field(&text, "  ", "sha256"), vec!["ff"]);
        assert_eq!(field(&text, "    ", "url").len(), 2);
    }

    #[test]
    fn test_release_override_without_dependencies() {
        let release = ResolvedPackage::new("flask", "https://releases.example.com/flask.tar.gz", "ff");
        let text = render("Flask", "d", "h", "g", &[], Some(&release)).unwrap();

        assert!(text.contains("  depends_on :python3\n\n  def install"));
        assert!(!text.contains("  resource \""));
    }

    #[test]
    fn test_no_release_specified() {
        let err = render("Flask", "d", "h", "g", &[], None).unwrap_err();
        assert!(matches!(err, BrewError::NoReleaseSpecified));
    }

    #[test]
    fn test_values_are_not_escaped() {
        let release = ResolvedPackage::new("x", "u", "s");
        let text = render("X", "say \"hi\"", "h", "g", &[], Some(&release)).unwrap();
        assert!(text.contains("  desc \"say \"hi\"\"\n"));
    }
}
