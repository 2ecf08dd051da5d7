//! Generate command - writes a formula for an installed package.

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use std::path::{Path, PathBuf};

use pybrew_pm::{
    config::Config,
    generator::parse_suffixes,
    formula_class_name, FormulaGenerator, FormulaRequest, HttpClient, InstalledSource,
    PipInspectSource, SitePackagesSource, Transport,
};

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Installed Python package to generate a formula for
    pub package_name: String,

    /// Where to write the formula (Ruby file)
    pub output_file: PathBuf,

    /// Name of the Homebrew formula (default: derived from the package name)
    #[arg(short = 'n', long)]
    pub formula_name: Option<String>,

    /// Description for the formula
    #[arg(short = 'd', long, default_value = "")]
    pub description: String,

    /// Homepage URL of the package
    #[arg(short = 'H', long, default_value = "")]
    pub homepage: String,

    /// Git repository URL of the package
    #[arg(short = 'g', long = "git-repo", default_value = "")]
    pub git_repo: String,

    /// URL of the release file for the package itself, instead of the index
    #[arg(short = 'r', long)]
    pub release_url: Option<String>,

    /// Comma separated distribution suffixes in order of precedence
    /// (default: "py2.py3-none-any.whl,.tar.gz,.zip")
    #[arg(short = 's', long)]
    pub suffixes: Option<String>,

    /// Package index base URL (default: https://pypi.org/simple/)
    #[arg(short = 'i', long)]
    pub index_url: Option<String>,

    /// Python interpreter whose environment is inspected
    #[arg(short = 'p', long)]
    pub python: Option<String>,

    /// Read installed packages from this site-packages directory instead of
    /// asking pip (can be used multiple times)
    #[arg(long = "site-packages", value_name = "DIR", action = clap::ArgAction::Append)]
    pub site_packages: Vec<PathBuf>,
}

impl GenerateArgs {
    /// Apply command line flags on top of the loaded configuration
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(index_url) = &self.index_url {
            config.set_index_url(index_url.clone());
        }
        if let Some(python) = &self.python {
            config.set_python(python.clone());
        }
        if let Some(suffixes) = &self.suffixes {
            config.set_suffixes(parse_suffixes(suffixes));
        }
    }

    pub fn request(&self) -> FormulaRequest {
        let formula_name = self
            .formula_name
            .clone()
            .unwrap_or_else(|| formula_class_name(&self.package_name));

        let request = FormulaRequest::new(&self.package_name)
            .with_formula_name(formula_name)
            .with_description(&self.description)
            .with_homepage(&self.homepage)
            .with_git_repo_url(&self.git_repo);

        match &self.release_url {
            Some(release_url) => request.with_release_url(release_url),
            None => request,
        }
    }

    fn installed_source(&self, config: &Config) -> Box<dyn InstalledSource> {
        if self.site_packages.is_empty() {
            Box::new(PipInspectSource::new(config.python.clone()))
        } else {
            Box::new(SitePackagesSource::new(self.site_packages.clone()))
        }
    }
}

pub fn execute(args: GenerateArgs) -> Result<i32> {
    let working_dir = std::env::current_dir().context("Failed to resolve working directory")?;

    let mut config =
        Config::build(Some(&working_dir), true).context("Failed to load configuration")?;
    args.apply_to(&mut config);

    let request = args.request();
    log::debug!("Formula name: {}", request.formula_name);

    let client = HttpClient::with_config(config.http_config())
        .context("Failed to create HTTP client")?;
    let generator = FormulaGenerator::new(args.installed_source(&config), client, &config.index_url)?
        .with_suffixes(config.suffixes.clone());

    let output_file = absolute_path(&working_dir, &args.output_file);
    write_formula(&generator, &request, &output_file)?;

    log::info!(
        "{} {}",
        style("Wrote template to").green(),
        output_file.display()
    );

    Ok(0)
}

/// Generate the formula and write it to `output_file`.
///
/// The file is only touched once the whole formula has been produced, so a
/// failed run leaves any previous output in place.
fn write_formula<S, T>(
    generator: &FormulaGenerator<S, T>,
    request: &FormulaRequest,
    output_file: &Path,
) -> Result<()>
where
    S: InstalledSource,
    T: Transport + Clone,
{
    let formula = generator
        .generate(request)
        .with_context(|| format!("Failed to generate formula for {}", request.package_name))?;

    std::fs::write(output_file, formula)
        .with_context(|| format!("Failed to write {}", output_file.display()))
}

fn absolute_path(working_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        working_dir.join(path)
    }
}
