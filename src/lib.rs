//! readme-generator: README parameter tables and a JSON schema from an
//! annotated values file.
//!
//! The pipeline is parse values, parse metadata comments, check, reconcile,
//! render. Every artifact is rendered in memory; writing is left to the
//! caller so that a failure never leaves a half-updated set of files.

pub mod checker;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod modifiers;
pub mod parser;
pub mod render;
pub mod sections;
pub mod slug;

use config::Config;
use error::Result;
use model::Metadata;
use render::markdown::MarkdownRenderer;
use render::schema::SchemaRenderer;
use render::Renderer;
use tracing::info;

/// Rendered artifacts of one run.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Outputs {
    /// Rewritten README, when one was given
    pub readme: Option<String>,
    pub schema: Option<String>,
}

/// Parse and validate the values file, returning the reconciled metadata.
///
/// The values file is both the data (YAML) and the documentation (its
/// metadata comments).
pub fn build_metadata(values: &str, config: &Config) -> Result<Metadata> {
    let leaves = parser::values::parse(values)?;
    let mut metadata = parser::comments::parse(values, config)?;

    checker::check(&leaves, &metadata.parameters, &config.modifiers)?;

    parser::merge::combine(&leaves, &mut metadata.parameters);
    parser::merge::resolve_missing(&leaves, &mut metadata.parameters);
    Ok(metadata)
}

/// Run the full pipeline.
///
/// `readme` is the current README content; the returned README is that
/// document with its Parameters section regenerated.
pub fn generate(values: &str, readme: Option<&str>, schema: bool, config: &Config) -> Result<Outputs> {
    let metadata = build_metadata(values, config)?;
    let mut outputs = Outputs::default();

    if let Some(document) = readme {
        let renderer = MarkdownRenderer { config, document };
        outputs.readme = Some(render_with(&renderer, &metadata)?);
    }
    if schema {
        let renderer = SchemaRenderer { config };
        outputs.schema = Some(render_with(&renderer, &metadata)?);
    }
    Ok(outputs)
}

fn render_with(renderer: &dyn Renderer, metadata: &Metadata) -> Result<String> {
    info!("rendering {}...", renderer.artifact());
    renderer.render(metadata)
}
