//! JSON schema renderer (OpenAPI v3 schema object flavour).
//!
//! Paths are split on `.` into nested `properties`; a `name[i]` segment turns
//! `name` into an array whose `items` describe the objects below it. Defaults
//! are written for top-level values only, never inside array items.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::*;
use crate::modifiers;
use crate::render::Renderer;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;
use tracing::debug;

pub struct SchemaRenderer<'a> {
    pub config: &'a Config,
}

impl Renderer for SchemaRenderer<'_> {
    fn render(&self, metadata: &Metadata) -> Result<String> {
        let schema = build(&metadata.parameters, self.config)?;
        to_pretty_json(&schema)
    }

    fn artifact(&self) -> &str {
        "schema"
    }
}

/// Root of the generated schema.
#[derive(Debug, serde::Serialize)]
pub struct Schema {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: ParamType,
    pub properties: Properties,
}

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize)]
pub struct SchemaNode {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ParamType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// `Some(Value::Null)` is a real `null` default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "is_false")]
    pub nullable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaNode>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<Properties>,
}

fn is_false(b: &bool) -> bool {
    !b
}

impl SchemaNode {
    fn object() -> Self {
        Self {
            kind: Some(ParamType::Object),
            properties: Some(Properties::default()),
            ..Self::default()
        }
    }

    fn of_type(kind: ParamType) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }
}

/// Insertion-ordered property map.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Properties(Vec<(String, SchemaNode)>);

impl Properties {
    fn entry(&mut self, key: &str, init: impl FnOnce() -> SchemaNode) -> &mut SchemaNode {
        let index = match self.0.iter().position(|(k, _)| k == key) {
            Some(i) => i,
            None => {
                self.0.push((key.to_string(), init()));
                self.0.len() - 1
            }
        };
        &mut self.0[index].1
    }
}

impl Serialize for Properties {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, node) in &self.0 {
            map.serialize_entry(key, node)?;
        }
        map.end()
    }
}

/// Build the schema tree from the reconciled parameters.
///
/// Extra parameters, `object`-modified parameters (their real children carry
/// the schema), keys excluded from the schema and parameters without a value
/// are left out, as are values below a `string`-forced parameter, which the
/// schema describes as a plain string. A `nil` value without `nullable` is an
/// error.
pub fn build(parameters: &[Parameter], config: &Config) -> Result<Schema> {
    let vocabulary = &config.modifiers;
    let string_roots: Vec<&str> = parameters
        .iter()
        .filter(|p| !p.is_extra() && p.has_modifier(&vocabulary.string))
        .map(|p| p.name.as_str())
        .collect();
    let candidates: Vec<Parameter> = parameters
        .iter()
        .filter(|p| !p.is_extra() && !p.has_modifier(&vocabulary.object) && p.schema)
        .filter(|p| !string_roots.iter().any(|root| is_descendant(&p.name, root)))
        .cloned()
        .collect();
    let applied: Vec<Parameter> = modifiers::apply_all(&candidates, vocabulary)?
        .into_iter()
        .filter(|p| p.value.is_some())
        .collect();

    let invalid: Vec<String> = applied
        .iter()
        .filter(|p| p.value.as_ref().is_some_and(ParamValue::is_nil) && !p.nullable)
        .map(|p| p.name.clone())
        .collect();
    if !invalid.is_empty() {
        return Err(Error::InvalidNull { parameters: invalid });
    }

    let mut properties = Properties::default();
    for param in &applied {
        if param.nullable {
            debug!(parameter = %param.name, "adding nullable parameter to the schema");
        }
        let segments: Vec<&str> = param.name.split('.').collect();
        insert(&mut properties, &segments, param, false, config);
    }

    Ok(Schema {
        title: config.schema.title.clone(),
        kind: ParamType::Object,
        properties,
    })
}

fn insert(properties: &mut Properties, segments: &[&str], param: &Parameter, in_items: bool, config: &Config) {
    let Some((&segment, rest)) = segments.split_first() else {
        return;
    };
    let array_key = array_segment(segment);

    if rest.is_empty() {
        match array_key {
            Some(key) => {
                let node = properties.entry(key, || SchemaNode::of_type(ParamType::Array));
                node.kind = Some(ParamType::Array);
                node.description.get_or_insert_with(|| param.description.clone());
                if node.items.is_none() {
                    node.items = Some(Box::new(SchemaNode::of_type(value_kind(param))));
                }
            }
            None => write_leaf(properties.entry(segment, SchemaNode::default), param, in_items, config),
        }
        return;
    }

    match array_key {
        Some(key) => {
            let node = properties.entry(key, || SchemaNode {
                kind: Some(ParamType::Array),
                description: Some(param.description.clone()),
                ..SchemaNode::default()
            });
            let items = node.items.get_or_insert_with(|| Box::new(SchemaNode::object()));
            // An untyped `items: {}` from an `[array]` parameter becomes an object here
            items.kind.get_or_insert(ParamType::Object);
            let children = items.properties.get_or_insert_with(Properties::default);
            insert(children, rest, param, true, config);
        }
        None => {
            let node = properties.entry(segment, SchemaNode::object);
            let children = node.properties.get_or_insert_with(Properties::default);
            insert(children, rest, param, in_items, config);
        }
    }
}

fn write_leaf(node: &mut SchemaNode, param: &Parameter, in_items: bool, config: &Config) {
    let kind = value_kind(param);
    node.kind = Some(kind);
    node.description = Some(param.description.clone());
    node.default = match (&param.value, in_items) {
        (Some(value), false) => Some(value.to_json()),
        _ => None,
    };
    node.nullable = param.nullable;

    let has_item_properties = node.items.as_ref().is_some_and(|items| items.properties.is_some());
    if kind == ParamType::Array && !has_item_properties {
        let first = match &param.value {
            Some(ParamValue::Array(values)) => values.first().map(ParamType::of_json),
            _ => None,
        };
        node.items = Some(Box::new(
            first
                .or(config.schema.empty_array_items_type)
                .map(SchemaNode::of_type)
                .unwrap_or_default(),
        ));
    }
}

fn value_kind(param: &Parameter) -> ParamType {
    param
        .kind
        .or_else(|| param.value.as_ref().map(ParamValue::kind))
        .unwrap_or(ParamType::Object)
}

/// `name[0]` → `name`
fn array_segment(segment: &str) -> Option<&str> {
    let open = segment.find('[')?;
    (open > 0 && segment.ends_with(']')).then(|| &segment[..open])
}

/// Pretty-print with a four-space indent.
pub fn to_pretty_json<T: Serialize>(value: &T) -> Result<String> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut serializer)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn param(name: &str, value: serde_json::Value, modifiers: &[&str]) -> Parameter {
        let value = ParamValue::from(value);
        let mut p = Parameter::new(name);
        p.description = format!("{name} description");
        p.kind = Some(value.kind());
        p.value = Some(value);
        p.modifiers = modifiers.iter().map(|m| m.to_string()).collect();
        p
    }

    fn schema_json(params: &[Parameter]) -> serde_json::Value {
        let config = Config::default();
        let out = SchemaRenderer { config: &config }
            .render(&Metadata {
                sections: Vec::new(),
                parameters: params.to_vec(),
            })
            .unwrap();
        serde_json::from_str(&out).unwrap()
    }

    #[test]
    fn nested_properties_with_defaults() {
        let schema = schema_json(&[
            param("service.port", json!(80), &[]),
            param("service.tags", json!(["a", "b"]), &["array"]),
        ]);
        assert_eq!(schema["title"], "Chart Values");
        assert_eq!(schema["type"], "object");
        let service = &schema["properties"]["service"];
        assert_eq!(service["type"], "object");
        assert_eq!(service["properties"]["port"]["default"], 80);
        assert_eq!(service["properties"]["port"]["type"], "number");
        assert_eq!(service["properties"]["tags"]["type"], "array");
        assert_eq!(service["properties"]["tags"]["default"], json!([]));
        assert_eq!(service["properties"]["tags"]["items"], json!({}));
    }

    #[test]
    fn array_items_share_one_object() {
        let schema = schema_json(&[
            param("a[0].b", json!("x"), &[]),
            param("a[1].c", json!(2), &[]),
        ]);
        let a = &schema["properties"]["a"];
        assert_eq!(a["type"], "array");
        assert_eq!(a["items"]["type"], "object");
        assert_eq!(a["items"]["properties"]["b"]["type"], "string");
        assert_eq!(a["items"]["properties"]["c"]["type"], "number");
        assert!(a["items"]["properties"]["b"].get("default").is_none());
    }

    #[test]
    fn array_modifier_with_indexed_children() {
        let mut child = param("env[0].name", json!("LOG_LEVEL"), &[]);
        child.render = Render::Skip;
        let schema = schema_json(&[param("env", json!([]), &["array"]), child]);
        let env = &schema["properties"]["env"];
        assert_eq!(env["default"], json!([]));
        assert_eq!(env["items"]["type"], "object");
        assert_eq!(env["items"]["properties"]["name"]["type"], "string");
    }

    #[test]
    fn string_modifier_hides_children() {
        let mut child = param("config.a", json!(1), &[]);
        child.render = Render::Skip;
        let schema = schema_json(&[param("config", json!({"a": 1}), &["string"]), child]);
        assert_eq!(
            schema["properties"]["config"],
            json!({"type": "string", "description": "config description", "default": ""})
        );
    }

    #[test]
    fn array_items_type_from_first_element() {
        let schema = schema_json(&[param("hosts", json!(["a.local"]), &[])]);
        assert_eq!(schema["properties"]["hosts"]["items"], json!({"type": "string"}));
    }

    #[test]
    fn configured_empty_array_items_type() {
        let config = Config {
            schema: crate::config::SchemaConfig {
                empty_array_items_type: Some(ParamType::String),
                ..Default::default()
            },
            ..Config::default()
        };
        let schema = build(&[param("list", json!([]), &[])], &config).unwrap();
        let schema = serde_json::to_value(&schema).unwrap();
        assert_eq!(schema["properties"]["list"]["items"], json!({"type": "string"}));
    }

    #[test]
    fn nil_without_nullable_is_rejected() {
        let params = [
            param("image.digest", json!(null), &[]),
            param("auth.password", json!(null), &[]),
        ];
        let err = build(&params, &Config::default()).unwrap_err();
        match err {
            Error::InvalidNull { parameters } => assert_eq!(parameters, ["image.digest", "auth.password"]),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn nullable_writes_null_default() {
        let schema = schema_json(&[param("image.digest", json!(null), &["nullable"])]);
        let digest = &schema["properties"]["image"]["properties"]["digest"];
        assert_eq!(digest["nullable"], true);
        assert!(digest.as_object().unwrap().contains_key("default"));
        assert_eq!(digest["default"], serde_json::Value::Null);
    }

    #[test]
    fn excluded_parameters() {
        let mut extra = param("virtual", json!(1), &[]);
        extra.render = Render::Extra;
        let mut dotted = param("annotations.prometheus.io/scrape", json!("true"), &[]);
        dotted.schema = false;
        let mut unresolved = param("pending", json!(1), &[]);
        unresolved.value = None;
        let schema = schema_json(&[
            extra,
            dotted,
            unresolved,
            param("labels", json!({"app": "x"}), &["object"]),
            param("labels.app", json!("x"), &[]),
        ]);
        let properties = schema["properties"].as_object().unwrap();
        assert_eq!(properties.keys().collect::<Vec<_>>(), ["labels"]);
        assert_eq!(schema["properties"]["labels"]["properties"]["app"]["default"], "x");
    }

    #[test]
    fn skip_parameters_are_part_of_the_schema() {
        let mut skipped = param("internal", json!(true), &[]);
        skipped.render = Render::Skip;
        let schema = schema_json(&[skipped]);
        assert_eq!(schema["properties"]["internal"]["type"], "boolean");
    }

    #[test]
    fn four_space_indent_in_declaration_order() {
        let config = Config::default();
        let out = SchemaRenderer { config: &config }
            .render(&Metadata {
                sections: Vec::new(),
                parameters: vec![param("z", json!(1), &[]), param("a", json!(2), &[])],
            })
            .unwrap();
        assert!(out.starts_with("{\n    \"title\": \"Chart Values\",\n    \"type\": \"object\""));
        assert!(out.find("\"z\"").unwrap() < out.find("\"a\"").unwrap());
    }
}
