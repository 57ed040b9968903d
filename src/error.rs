//! Error taxonomy for the generation pipeline.
//!
//! Every variant that can describe several problems lists all of them, so a
//! single run reports everything that has to be fixed.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{}", mismatch_report(.missing, .not_found))]
    MetadataMismatch {
        /// Real keys without metadata
        missing: Vec<String>,
        /// Metadata keys without a real value
        not_found: Vec<String>,
    },

    #[error("unknown modifier '{modifier}' for parameter {parameter}")]
    UnknownModifier { parameter: String, modifier: String },

    #[error("invalid type 'nil' for the following values: {}", .parameters.join(", "))]
    InvalidNull { parameters: Vec<String> },

    #[error(transparent)]
    DocumentStructure(#[from] DocumentStructureError),

    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(#[source] serde_json::Error),

    #[error("failed to parse values: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to serialize schema: {0}")]
    Json(#[from] serde_json::Error),
}

/// Problems locating the Parameters section of the target document.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DocumentStructureError {
    #[error("no Parameters section found in the README")]
    MissingParametersSection,

    #[error("found {} Parameters sections in the README (lines {}), expected exactly one", .lines.len(), join_lines(.lines))]
    AmbiguousParametersSection {
        /// 1-based line numbers of every matching heading
        lines: Vec<usize>,
    },
}

fn mismatch_report(missing: &[String], not_found: &[String]) -> String {
    let mut out = String::from("wrong metadata, the following errors must be fixed before proceeding:");
    for key in missing {
        out.push_str(&format!("\n  Missing metadata for key: {key}"));
    }
    for key in not_found {
        out.push_str(&format!("\n  Metadata provided for non existing key: {key}"));
    }
    out
}

fn join_lines(lines: &[usize]) -> String {
    lines
        .iter()
        .map(|l| l.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatch_lists_every_key() {
        let err = Error::MetadataMismatch {
            missing: vec!["a.b".into(), "a.c".into()],
            not_found: vec!["z".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("Missing metadata for key: a.b"));
        assert!(msg.contains("Missing metadata for key: a.c"));
        assert!(msg.contains("Metadata provided for non existing key: z"));
    }

    #[test]
    fn invalid_null_names_parameters() {
        let err = Error::InvalidNull {
            parameters: vec!["image.digest".into(), "auth.password".into()],
        };
        assert_eq!(
            err.to_string(),
            "invalid type 'nil' for the following values: image.digest, auth.password"
        );
    }

    #[test]
    fn ambiguous_section_reports_lines() {
        let err = DocumentStructureError::AmbiguousParametersSection { lines: vec![3, 9] };
        assert_eq!(
            err.to_string(),
            "found 2 Parameters sections in the README (lines 3, 9), expected exactly one"
        );
    }
}
