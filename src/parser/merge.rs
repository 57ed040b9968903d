//! Merge real values into parsed metadata.
//!
//! [`combine`] copies values onto the parameters that document them;
//! [`resolve_missing`] adds a skip parameter for every real leaf that is only
//! covered by an ancestor's metadata, so the schema still sees every value.

use crate::model::*;
use std::collections::{HashMap, HashSet};

/// Copy value, type and schema flag from the leaf with the same path onto
/// every non-extra parameter that has no value yet.
pub fn combine(leaves: &[Leaf], parameters: &mut [Parameter]) {
    let by_name: HashMap<&str, &Leaf> = leaves.iter().map(|l| (l.name.as_str(), l)).collect();

    for param in parameters.iter_mut().filter(|p| !p.is_extra()) {
        if param.value.is_some() {
            continue;
        }
        if let Some(leaf) = by_name.get(param.name.as_str()) {
            param.value = Some(leaf.value.clone());
            param.kind = Some(leaf.kind);
            param.schema = leaf.schema;
        }
    }
}

/// Synthesize skip parameters for leaves without an exact metadata match.
///
/// The anchor is the parameter with the longest path that is a proper path
/// prefix of the leaf (`service.port` never anchors `service.portEnabled`).
/// Synthesized entries inherit its description and section and are placed
/// right after it, after any siblings synthesized before them. Leaves with no
/// anchor at all are appended at the end.
pub fn resolve_missing(leaves: &[Leaf], parameters: &mut Vec<Parameter>) {
    let documented: HashSet<&str> = parameters
        .iter()
        .filter(|p| !p.is_extra())
        .map(|p| p.name.as_str())
        .collect();

    let mut anchored: HashMap<usize, Vec<Parameter>> = HashMap::new();
    let mut orphans: Vec<Parameter> = Vec::new();

    for leaf in leaves.iter().filter(|l| !documented.contains(l.name.as_str())) {
        match find_anchor(&leaf.name, parameters) {
            Some(i) => {
                let anchor = &parameters[i];
                let param = synthesize(leaf, &anchor.description, &anchor.section);
                anchored.entry(i).or_default().push(param);
            }
            None => orphans.push(synthesize(leaf, "", "")),
        }
    }

    if anchored.is_empty() && orphans.is_empty() {
        return;
    }

    let original = std::mem::take(parameters);
    for (i, param) in original.into_iter().enumerate() {
        parameters.push(param);
        if let Some(children) = anchored.remove(&i) {
            parameters.extend(children);
        }
    }
    parameters.extend(orphans);
}

/// Index of the non-extra parameter with the longest path prefixing `name`.
/// Ties go to the first declaration.
fn find_anchor(name: &str, parameters: &[Parameter]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, param) in parameters.iter().enumerate() {
        if param.is_extra() || !is_descendant(name, &param.name) {
            continue;
        }
        match best {
            Some(b) if parameters[b].name.len() >= param.name.len() => {}
            _ => best = Some(i),
        }
    }
    best
}

fn synthesize(leaf: &Leaf, description: &str, section: &str) -> Parameter {
    let mut param = Parameter::new(leaf.name.clone());
    param.value = Some(leaf.value.clone());
    param.kind = Some(leaf.kind);
    param.schema = leaf.schema;
    param.description = description.to_string();
    param.section = section.to_string();
    param.render = Render::Skip;
    param
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn leaf(name: &str, value: serde_json::Value) -> Leaf {
        let value = ParamValue::from(value);
        Leaf {
            name: name.to_string(),
            kind: value.kind(),
            value,
            schema: true,
        }
    }

    fn param(name: &str, section: &str) -> Parameter {
        let mut p = Parameter::new(name);
        p.section = section.to_string();
        p.description = format!("{name} description");
        p
    }

    fn names(params: &[Parameter]) -> Vec<&str> {
        params.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn combine_copies_exact_matches() {
        let leaves = vec![leaf("a.b", json!(1)), leaf("c", json!("x"))];
        let mut params = vec![param("a.b", "S"), param("c", "S")];
        combine(&leaves, &mut params);
        assert_eq!(params[0].value, Some(ParamValue::from(json!(1))));
        assert_eq!(params[0].kind, Some(ParamType::Number));
        assert_eq!(params[1].kind, Some(ParamType::String));
    }

    #[test]
    fn combine_ignores_extra_and_preset_values() {
        let leaves = vec![leaf("a", json!(1)), leaf("b", json!(2))];
        let mut extra = param("a", "S");
        extra.render = Render::Extra;
        let mut preset = param("b", "S");
        preset.value = Some(ParamValue::String("fixed".into()));
        let mut params = vec![extra, preset];
        combine(&leaves, &mut params);
        assert_eq!(params[0].value, None);
        assert_eq!(params[1].value, Some(ParamValue::String("fixed".into())));
    }

    #[test]
    fn combine_carries_schema_flag() {
        let mut dotted = leaf("annotations.prometheus.io/scrape", json!("true"));
        dotted.schema = false;
        let mut params = vec![param("annotations.prometheus.io/scrape", "S")];
        combine(&[dotted], &mut params);
        assert!(!params[0].schema);
    }

    #[test]
    fn missing_leaves_follow_their_anchor() {
        let leaves = vec![
            leaf("first", json!(1)),
            leaf("skipped.a", json!(1)),
            leaf("skipped.b", json!(2)),
            leaf("last", json!(3)),
        ];
        let mut skip = param("skipped", "Other");
        skip.render = Render::Skip;
        let mut params = vec![param("first", "S"), skip, param("last", "S")];
        resolve_missing(&leaves, &mut params);

        assert_eq!(names(&params), ["first", "skipped", "skipped.a", "skipped.b", "last"]);
        assert!(params[2].is_skip());
        assert!(params[2].schema);
        assert_eq!(params[2].section, "Other");
        assert_eq!(params[3].value, Some(ParamValue::from(json!(2))));
    }

    #[test]
    fn longest_prefix_wins() {
        let leaves = vec![leaf("service.port.extra", json!(1)), leaf("service.portEnabled.x", json!(true))];
        let mut params = vec![param("service", "A"), param("service.port", "B"), param("service.portEnabled", "C")];
        resolve_missing(&leaves, &mut params);

        assert_eq!(
            names(&params),
            ["service", "service.port", "service.port.extra", "service.portEnabled", "service.portEnabled.x"]
        );
        assert_eq!(params[2].section, "B");
        assert_eq!(params[4].section, "C");
        assert_eq!(params[4].description, "service.portEnabled description");
    }

    #[test]
    fn array_items_inherit_from_array_parameter() {
        let leaves = vec![leaf("ports[0].name", json!("http")), leaf("ports[1].name", json!("https"))];
        let mut array = param("ports", "S");
        array.modifiers = vec!["array".into()];
        let mut params = vec![array];
        resolve_missing(&leaves, &mut params);
        assert_eq!(names(&params), ["ports", "ports[0].name", "ports[1].name"]);
        assert_eq!(params[1].description, "ports description");
    }

    #[test]
    fn unanchored_leaves_are_appended() {
        let leaves = vec![leaf("orphan", json!(1)), leaf("a", json!(2))];
        let mut params = vec![param("a", "S")];
        resolve_missing(&leaves, &mut params);
        assert_eq!(names(&params), ["a", "orphan"]);
        assert!(params[1].is_skip());
    }

    #[test]
    fn extra_parameters_are_never_anchors() {
        let leaves = vec![leaf("a.b", json!(1))];
        let mut extra = param("a", "S");
        extra.render = Render::Extra;
        let mut params = vec![extra];
        resolve_missing(&leaves, &mut params);
        assert_eq!(names(&params), ["a", "a.b"]);
        assert_eq!(params[1].section, "");
    }

    #[test]
    fn documented_leaves_are_untouched() {
        let leaves = vec![leaf("a", json!(1))];
        let mut params = vec![param("a", "S")];
        resolve_missing(&leaves, &mut params);
        assert_eq!(params.len(), 1);
    }
}
