//! Renderer module: trait-based output dispatch.

pub mod markdown;
pub mod schema;

use crate::error::Result;
use crate::model::Metadata;

/// Trait for rendering reconciled metadata into an output artifact.
///
/// Implementations must not mutate the shared metadata: modifiers and
/// filtering are applied to private copies.
pub trait Renderer {
    /// Full content of the output file.
    fn render(&self, metadata: &Metadata) -> Result<String>;
    /// Human-readable artifact name used in log messages.
    fn artifact(&self) -> &str;
}
