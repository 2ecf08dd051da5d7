/// End-to-end formula generation against an in-memory environment and index.

use pybrew_pm::http::{HttpError, HttpResponse, Transport};
use pybrew_pm::package::{InstalledPackage, MarkerEnvironment, Requirement};
use pybrew_pm::repository::{ArraySource, InstalledSource};
use pybrew_pm::{flatten, BrewError, FormulaGenerator, FormulaRequest};
use std::cell::RefCell;
use std::collections::HashMap;

const INDEX: &str = "https://pypi.test/simple/";

// SHA-256 and MD5 of "hello world"
const HELLO_SHA256: &str = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";
const HELLO_MD5: &str = "5eb63bbbe01eeed093cb22bb8f5acdc3";

#[derive(Default)]
struct MockIndex {
    pages: HashMap<String, (u16, Vec<u8>)>,
    requests: RefCell<Vec<String>>,
}

impl MockIndex {
    fn page(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.to_string(), (200, body.as_bytes().to_vec()));
        self
    }

    fn status(mut self, url: &str, status: u16) -> Self {
        self.pages.insert(url.to_string(), (status, Vec::new()));
        self
    }
}

impl Transport for MockIndex {
    fn get(&self, url: &str) -> Result<HttpResponse, HttpError> {
        self.requests.borrow_mut().push(url.to_string());
        match self.pages.get(url) {
            Some((status, body)) => Ok(HttpResponse::new(*status, body.clone())),
            None => Err(HttpError::Transport {
                url: url.to_string(),
                reason: "no route".to_string(),
            }),
        }
    }
}

fn flask_environment() -> ArraySource {
    ArraySource::new(vec![
        InstalledPackage::new("Flask", "3.0.0").with_requires(vec![
            Requirement::parse("Werkzeug>=3.0.0").unwrap(),
            Requirement::parse("Jinja2>=3.1.2").unwrap(),
            Requirement::parse("click>=8.1.3").unwrap(),
            Requirement::parse("asyncio>=3.4; extra == 'async'").unwrap(),
        ]),
        InstalledPackage::new("Werkzeug", "3.0.1")
            .with_requires(vec![Requirement::parse("MarkupSafe>=2.1.1").unwrap()]),
        InstalledPackage::new("Jinja2", "3.1.2")
            .with_requires(vec![Requirement::parse("MarkupSafe>=2.0").unwrap()]),
        InstalledPackage::new("click", "8.1.7"),
        InstalledPackage::new("MarkupSafe", "2.1.3"),
    ])
}

fn listing(files: &[&str]) -> String {
    let mut html = String::from("<!DOCTYPE html>\n<html><body>\n");
    for href in files {
        let filename = href.split('#').next().unwrap_or(href);
        html.push_str(&format!("<a href=\"../../packages/{}\">{}</a><br/>\n", href, filename));
    }
    html.push_str("</body></html>");
    html
}

fn flask_index() -> MockIndex {
    let jinja_sdist = format!("Jinja2-3.1.2.tar.gz#md5={}", HELLO_MD5);

    MockIndex::default()
        .page(
            "https://pypi.test/simple/click/",
            &listing(&["click-8.1.7.tar.gz", "click-8.1.7-py3-none-any.whl"]),
        )
        .page(
            "https://pypi.test/simple/MarkupSafe/",
            &listing(&["MarkupSafe-2.1.3-cp312-cp312-macosx_10_9_universal2.whl", "MarkupSafe-2.1.3.tar.gz"]),
        )
        .page(
            "https://pypi.test/simple/Jinja2/",
            &listing(&[
                "Jinja2-3.1.2-py2.py3-none-any.whl",
                jinja_sdist.as_str(),
            ]),
        )
        .page(
            "https://pypi.test/simple/Werkzeug/",
            &listing(&["werkzeug-3.0.1.tar.gz"]),
        )
        .page(
            "https://pypi.test/simple/Flask/",
            &listing(&["flask-3.0.0.tar.gz", "flask-3.0.0-py3-none-any.whl"]),
        )
        .page("https://pypi.test/packages/click-8.1.7.tar.gz", "hello world")
        .page("https://pypi.test/packages/MarkupSafe-2.1.3.tar.gz", "hello world")
        .page("https://pypi.test/packages/Jinja2-3.1.2-py2.py3-none-any.whl", "hello world")
        .page("https://pypi.test/packages/Jinja2-3.1.2.tar.gz", "hello world")
        .page("https://pypi.test/packages/werkzeug-3.0.1.tar.gz", "hello world")
        .page("https://pypi.test/packages/flask-3.0.0.tar.gz", "hello world")
}

fn resource_names(formula: &str) -> Vec<&str> {
    formula
        .lines()
        .filter_map(|line| line.strip_prefix("  resource \""))
        .filter_map(|rest| rest.strip_suffix("\" do"))
        .collect()
}

#[test]
fn test_flatten_orders_dependencies_before_dependents() {
    let graph = flask_environment().list_installed().unwrap();
    let deps = flatten(&graph, "flask").unwrap();

    let names: Vec<&str> = deps.iter().map(|d| d.package_name.as_str()).collect();
    assert_eq!(names, vec!["click", "MarkupSafe", "Jinja2", "Werkzeug", "Flask"]);

    for package in graph.packages() {
        let position = names.iter().position(|n| *n == package.project_name).unwrap();
        for requirement in package.requires.iter().filter(|r| !r.is_extra()) {
            let child = names
                .iter()
                .position(|n| n.eq_ignore_ascii_case(&requirement.name))
                .unwrap();
            assert!(child < position, "{} must precede {}", requirement.name, package.project_name);
        }
    }
}

#[test]
fn test_generate_flask_formula() {
    let index = flask_index();
    let generator = FormulaGenerator::new(flask_environment(), &index, INDEX).unwrap();
    let request = FormulaRequest::new("flask")
        .with_description("A simple framework for building complex web applications")
        .with_homepage("https://palletsprojects.com/p/flask")
        .with_git_repo_url("https://github.com/pallets/flask.git");

    let formula = generator.generate(&request).unwrap();

    assert!(formula.starts_with("class Flask < Formula\n"));
    assert!(formula.contains("  desc \"A simple framework for building complex web applications\"\n"));
    assert!(formula.contains("  head \"https://github.com/pallets/flask.git\"\n"));
    assert!(formula.contains("  url \"https://pypi.test/packages/flask-3.0.0.tar.gz\"\n"));
    assert!(formula.contains("  depends_on :python3\n"));
    assert_eq!(resource_names(&formula), vec!["click", "MarkupSafe", "Jinja2", "Werkzeug"]);

    // Preferred universal wheel wins over the sdist for Jinja2
    assert!(formula.contains("    url \"https://pypi.test/packages/Jinja2-3.1.2-py2.py3-none-any.whl\"\n"));
    assert_eq!(formula.matches(HELLO_SHA256).count(), 5);
    assert!(formula.ends_with("  def install\n    virtualenv_install_with_resources\n  end\nend"));
}

#[test]
fn test_checksum_fragment_is_verified_and_stripped() {
    let index = flask_index();
    let generator = FormulaGenerator::new(flask_environment(), &index, INDEX)
        .unwrap()
        .with_suffixes(vec![".tar.gz".to_string()]);

    let formula = generator.generate(&FormulaRequest::new("flask")).unwrap();

    assert!(formula.contains("    url \"https://pypi.test/packages/Jinja2-3.1.2.tar.gz\"\n"));
    assert!(!formula.contains("#md5="));
    assert!(index
        .requests
        .borrow()
        .contains(&"https://pypi.test/packages/Jinja2-3.1.2.tar.gz".to_string()));
}

#[test]
fn test_release_url_replaces_index_lookup() {
    let index = flask_index()
        .page("https://github.com/pallets/flask/archive/3.0.0.tar.gz", "hello world");
    let generator = FormulaGenerator::new(flask_environment(), &index, INDEX).unwrap();
    let request = FormulaRequest::new("flask")
        .with_formula_name("FlaskDev")
        .with_release_url("https://github.com/pallets/flask/archive/3.0.0.tar.gz");

    let formula = generator.generate(&request).unwrap();

    assert!(formula.starts_with("class FlaskDev < Formula\n"));
    assert!(formula.contains("  url \"https://github.com/pallets/flask/archive/3.0.0.tar.gz\"\n"));
    assert_eq!(resource_names(&formula).len(), 4);
    assert!(!index
        .requests
        .borrow()
        .contains(&"https://pypi.test/simple/Flask/".to_string()));
}

#[test]
fn test_markers_follow_interpreter_environment() {
    let mut environment = flask_environment().with_environment(
        MarkerEnvironment::new()
            .with("python_version", "3.11")
            .with("sys_platform", "darwin")
            .with("platform_system", "Darwin"),
    );
    environment.add_package(InstalledPackage::new("blinker", "1.7.0"));
    environment.add_package(InstalledPackage::new("importlib-metadata", "7.0.1"));
    environment.add_package(
        InstalledPackage::new("flask-extras", "1.0.0").with_requires(vec![
            Requirement::parse("Flask>=3.0").unwrap(),
            Requirement::parse("blinker>=1.6.2; python_version >= \"3.8\"").unwrap(),
            Requirement::parse("importlib-metadata>=3.6.0; python_version < \"3.10\"").unwrap(),
            Requirement::parse("colorama; platform_system == \"Windows\"").unwrap(),
        ]),
    );

    let graph = environment.list_installed().unwrap();
    let deps = flatten(&graph, "flask-extras").unwrap();

    let names: Vec<&str> = deps.iter().map(|d| d.package_name.as_str()).collect();
    assert_eq!(
        names,
        vec!["blinker", "click", "MarkupSafe", "Jinja2", "Werkzeug", "Flask", "flask-extras"]
    );
}

#[test]
fn test_hash_mismatch_aborts_generation() {
    let index = flask_index().page(
        "https://pypi.test/simple/click/",
        &listing(&["click-8.1.7.tar.gz#sha256=0000000000000000000000000000000000000000000000000000000000000000"]),
    );
    let generator = FormulaGenerator::new(flask_environment(), &index, INDEX).unwrap();

    let err = generator.generate(&FormulaRequest::new("flask")).unwrap_err();
    assert!(matches!(err, BrewError::HashMismatch { .. }));
}

#[test]
fn test_missing_index_page_is_not_found() {
    let index = flask_index().status("https://pypi.test/simple/click/", 404);
    let generator = FormulaGenerator::new(flask_environment(), &index, INDEX).unwrap();

    let err = generator.generate(&FormulaRequest::new("flask")).unwrap_err();
    assert!(matches!(err, BrewError::PackageNotFound { ref name } if name == "click"));
}

#[test]
fn test_unknown_root_package() {
    let index = MockIndex::default();
    let generator = FormulaGenerator::new(flask_environment(), &index, INDEX).unwrap();

    let err = generator.generate(&FormulaRequest::new("django")).unwrap_err();
    assert!(matches!(err, BrewError::PackageNotFound { ref name } if name == "django"));
    assert!(index.requests.borrow().is_empty());
}
