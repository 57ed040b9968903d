//! readme-generator: regenerate the Parameters section of a README and a JSON
//! schema from the metadata comments of a values file.
//!
//! `readme-generator --values values.yaml --readme README.md --schema values.schema.json`

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};
use readme_generator::config::Config;
use readme_generator::logging;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "readme-generator",
    version,
    about = "Generate README parameter tables and a JSON schema from an annotated values file"
)]
#[command(group(
    ArgGroup::new("output")
        .required(true)
        .multiple(true)
        .args(["readme", "schema"])
))]
struct Cli {
    /// Values file with metadata comments
    #[arg(short = 'v', long)]
    values: PathBuf,

    /// README to update in place
    #[arg(short = 'r', long)]
    readme: Option<PathBuf>,

    /// Schema file to (over)write
    #[arg(short = 's', long)]
    schema: Option<PathBuf>,

    /// JSON configuration; defaults apply to every field it omits
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init();

    let config = load_config(cli.config.as_deref())?;

    let values = fs::read_to_string(&cli.values)
        .with_context(|| format!("failed to read values file: {}", cli.values.display()))?;
    let readme = match &cli.readme {
        Some(path) => Some(
            fs::read_to_string(path)
                .with_context(|| format!("failed to read README: {}", path.display()))?,
        ),
        None => None,
    };

    let outputs =
        readme_generator::generate(&values, readme.as_deref(), cli.schema.is_some(), &config)?;

    if let (Some(path), Some(content)) = (&cli.readme, &outputs.readme) {
        write_atomic(path, content)?;
        info!("README updated: {}", path.display());
    }
    if let (Some(path), Some(content)) = (&cli.schema, &outputs.schema) {
        write_atomic(path, content)?;
        info!("schema written: {}", path.display());
    }

    Ok(())
}

/// Load the configuration file, or the built-in defaults without one.
fn load_config(path: Option<&Path>) -> Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;
    Config::from_json(&text).with_context(|| format!("failed to load config file: {}", path.display()))
}

/// Replace `path` with `content` through a temporary file in the same
/// directory, so readers never see a partial file.
fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create temporary file in {}", dir.display()))?;
    file.write_all(content.as_bytes())
        .with_context(|| format!("failed to write {}", path.display()))?;
    file.persist(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
