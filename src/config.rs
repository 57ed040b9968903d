//! Tool configuration: comment syntax, tag and modifier vocabulary, README
//! lookup rules and schema options.
//!
//! Loaded from a JSON file with camelCase keys. Every field has a default, so
//! a partial file only overrides what it names.

use crate::error::{Error, Result};
use crate::model::ParamType;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub comments: CommentsConfig,
    pub tags: TagsConfig,
    pub modifiers: ModifiersConfig,
    pub regexp: RegexpConfig,
    pub schema: SchemaConfig,
    /// Accept the Parameters heading at any depth below the title (`##+`)
    /// instead of only at `##`
    pub find_parameters_subsection: bool,
    /// Emit an HTML anchor before every section heading
    pub include_section_anchor: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            comments: CommentsConfig::default(),
            tags: TagsConfig::default(),
            modifiers: ModifiersConfig::default(),
            regexp: RegexpConfig::default(),
            schema: SchemaConfig::default(),
            find_parameters_subsection: true,
            include_section_anchor: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct CommentsConfig {
    /// Regex fragment matching the comment prefix
    pub format: String,
}

impl Default for CommentsConfig {
    fn default() -> Self {
        Self {
            format: "##".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct TagsConfig {
    pub param: String,
    pub section: String,
    pub skip: String,
    pub extra: String,
    pub description_start: String,
    pub description_end: String,
}

impl Default for TagsConfig {
    fn default() -> Self {
        Self {
            param: "@param".to_string(),
            section: "@section".to_string(),
            skip: "@skip".to_string(),
            extra: "@extra".to_string(),
            description_start: "@descriptionStart".to_string(),
            description_end: "@descriptionEnd".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModifiersConfig {
    pub array: String,
    pub object: String,
    pub string: String,
    pub nullable: String,
    /// Prefix of `default:<value>`
    pub default: String,
}

impl Default for ModifiersConfig {
    fn default() -> Self {
        Self {
            array: "array".to_string(),
            object: "object".to_string(),
            string: "string".to_string(),
            nullable: "nullable".to_string(),
            default: "default".to_string(),
        }
    }
}

impl ModifiersConfig {
    /// Modifiers that end documentation at their node: descendants need no
    /// metadata of their own.
    pub fn is_value_forcing(&self, modifier: &str) -> bool {
        modifier == self.array || modifier == self.object || modifier == self.string
    }

    /// Literal of a `default:<value>` token, trimmed.
    pub fn default_literal<'a>(&self, modifier: &'a str) -> Option<&'a str> {
        let rest = modifier.strip_prefix(self.default.as_str())?;
        rest.trim_start().strip_prefix(':').map(str::trim)
    }

    pub fn is_known(&self, modifier: &str) -> bool {
        self.is_value_forcing(modifier)
            || modifier == self.nullable
            || self.default_literal(modifier).is_some()
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct RegexpConfig {
    /// Regex matched against README headings to find the parameters section
    pub params_section_title: String,
}

impl Default for RegexpConfig {
    fn default() -> Self {
        Self {
            params_section_title: "Parameters".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct SchemaConfig {
    pub title: String,
    /// `items.type` for empty array defaults; `None` leaves `items` untyped
    #[serde(deserialize_with = "deserialize_param_type")]
    pub empty_array_items_type: Option<ParamType>,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            title: "Chart Values".to_string(),
            empty_array_items_type: None,
        }
    }
}

fn deserialize_param_type<'de, D>(deserializer: D) -> std::result::Result<Option<ParamType>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error as _;
    let value: Option<String> = Option::deserialize(deserializer)?;
    match value {
        None => Ok(None),
        Some(s) => ParamType::parse(&s)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("unknown schema type: {s}"))),
    }
}

impl Config {
    pub fn from_json(input: &str) -> Result<Self> {
        serde_json::from_str(input).map_err(Error::Config)
    }
}
