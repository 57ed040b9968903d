//! Data model for parsed parameter metadata, format-agnostic.

use serde::Serialize;
use serde_json::{Map, Number, Value};
use std::fmt;

/// Complete metadata parsed from the comments of a single values file.
#[derive(Debug, Default, Clone)]
pub struct Metadata {
    /// Sections in first-seen order. `parameters` is left empty here and
    /// filled by [`crate::sections::group`].
    pub sections: Vec<Section>,
    /// All parameters across sections, in source-comment order.
    pub parameters: Vec<Parameter>,
}

impl Metadata {
    pub fn add_section(&mut self, section: Section) {
        self.sections.push(section);
    }

    pub fn add_parameter(&mut self, parameter: Parameter) {
        self.parameters.push(parameter);
    }
}

/// A named group of parameters.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Section {
    pub name: String,
    /// Lines captured between the description start and end tags.
    pub description_lines: Vec<String>,
    pub parameters: Vec<Parameter>,
}

impl Section {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn description(&self) -> String {
        self.description_lines.join("\n")
    }
}

/// How a parameter takes part in validation and README rendering.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Render {
    /// Checked against the values file and rendered in the README.
    #[default]
    Normal,
    /// Neither checked nor rendered in the README; still part of the schema.
    Skip,
    /// Rendered in the README only; has no backing value.
    Extra,
}

/// A single documented (or synthesized) parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// Path using dot notation, e.g. `service.ports[0].port`
    pub name: String,
    pub description: String,
    /// `None` until reconciled with a real value
    pub value: Option<ParamValue>,
    pub kind: Option<ParamType>,
    /// Raw modifier tokens, in declaration order
    pub modifiers: Vec<String>,
    pub section: String,
    pub render: Render,
    /// Whether to render the parameter into the schema
    pub schema: bool,
    /// Set by modifier application
    pub nullable: bool,
}

impl Parameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            value: None,
            kind: None,
            modifiers: Vec::new(),
            section: String::new(),
            render: Render::Normal,
            schema: true,
            nullable: false,
        }
    }

    pub fn is_skip(&self) -> bool {
        self.render == Render::Skip
    }

    pub fn is_extra(&self) -> bool {
        self.render == Render::Extra
    }

    pub fn has_modifier(&self, modifier: &str) -> bool {
        self.modifiers.iter().any(|m| m == modifier)
    }
}

/// JSON-schema primitive type of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Number,
    Boolean,
    Object,
    Array,
}

impl ParamType {
    pub fn as_str(self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Number => "number",
            ParamType::Boolean => "boolean",
            ParamType::Object => "object",
            ParamType::Array => "array",
        }
    }

    /// Type of a JSON value; `null` maps to `object` like a YAML `~` leaf.
    pub fn of_json(value: &Value) -> Self {
        match value {
            Value::String(_) => ParamType::String,
            Value::Number(_) => ParamType::Number,
            Value::Bool(_) => ParamType::Boolean,
            Value::Array(_) => ParamType::Array,
            Value::Object(_) | Value::Null => ParamType::Object,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "string" => Some(ParamType::String),
            "number" => Some(ParamType::Number),
            "boolean" => Some(ParamType::Boolean),
            "object" => Some(ParamType::Object),
            "array" => Some(ParamType::Array),
            _ => None,
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved default value of a parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// A `null` in the values file, rendered as `nil`.
    Nil,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<Value>),
    Object(Map<String, Value>),
}

impl ParamValue {
    pub fn empty_array() -> Self {
        ParamValue::Array(Vec::new())
    }

    pub fn empty_object() -> Self {
        ParamValue::Object(Map::new())
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, ParamValue::Nil)
    }

    pub fn kind(&self) -> ParamType {
        match self {
            ParamValue::Nil | ParamValue::Object(_) => ParamType::Object,
            ParamValue::Bool(_) => ParamType::Boolean,
            ParamValue::Number(_) => ParamType::Number,
            ParamValue::String(_) => ParamType::String,
            ParamValue::Array(_) => ParamType::Array,
        }
    }

    /// Convert to a JSON value; the nil sentinel becomes a real `null`.
    pub fn to_json(&self) -> Value {
        match self {
            ParamValue::Nil => Value::Null,
            ParamValue::Bool(b) => Value::Bool(*b),
            ParamValue::Number(n) => Value::Number(n.clone()),
            ParamValue::String(s) => Value::String(s.clone()),
            ParamValue::Array(items) => Value::Array(items.clone()),
            ParamValue::Object(map) => Value::Object(map.clone()),
        }
    }
}

impl From<Value> for ParamValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => ParamValue::Nil,
            Value::Bool(b) => ParamValue::Bool(b),
            Value::Number(n) => ParamValue::Number(n),
            Value::String(s) => ParamValue::String(s),
            Value::Array(items) => ParamValue::Array(items),
            Value::Object(map) => ParamValue::Object(map),
        }
    }
}

/// Text shown in the README value column.
impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Nil => f.write_str("nil"),
            ParamValue::Bool(b) => write!(f, "{b}"),
            ParamValue::Number(n) => write!(f, "{n}"),
            ParamValue::String(s) if s.is_empty() => f.write_str("\"\""),
            ParamValue::String(s) => f.write_str(s),
            other => write!(f, "{}", other.to_json()),
        }
    }
}

/// A leaf of the flattened values tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Leaf {
    pub name: String,
    pub value: ParamValue,
    pub kind: ParamType,
    /// False for keys that contain a `.` themselves
    pub schema: bool,
}

/// Whether `child` lies strictly below `parent`, i.e. starts with `parent`
/// followed by `.` or `[`.
pub fn is_descendant(child: &str, parent: &str) -> bool {
    child.len() > parent.len()
        && child.starts_with(parent)
        && matches!(child.as_bytes()[parent.len()], b'.' | b'[')
}
