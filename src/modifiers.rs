//! Modifier application.
//!
//! Modifiers force the rendered value and type of a parameter regardless of
//! its real value. They apply left to right, later ones winning. `nullable`
//! always marks the parameter nullable but only forces the value to `nil`
//! when it is the last modifier.
//!
//! Renderers call this on their own copies; the reconciled list stays as it
//! was parsed.

use crate::config::ModifiersConfig;
use crate::error::{Error, Result};
use crate::model::{ParamType, ParamValue, Parameter};
use serde_json::Value;

pub fn apply(param: &mut Parameter, vocabulary: &ModifiersConfig) -> Result<()> {
    let Some(last) = param.modifiers.last() else {
        return Ok(());
    };
    let nullable_last = *last == vocabulary.nullable;

    for modifier in &param.modifiers {
        if *modifier == vocabulary.array {
            param.kind = Some(ParamType::Array);
            param.value = Some(ParamValue::empty_array());
        } else if *modifier == vocabulary.object {
            param.kind = Some(ParamType::Object);
            param.value = Some(ParamValue::empty_object());
        } else if *modifier == vocabulary.string {
            param.kind = Some(ParamType::String);
            param.value = Some(ParamValue::String(String::new()));
        } else if *modifier == vocabulary.nullable {
            param.nullable = true;
            if nullable_last {
                param.value = Some(ParamValue::Nil);
            }
        } else if let Some(literal) = vocabulary.default_literal(modifier) {
            let value = parse_literal(literal);
            param.kind.get_or_insert(value.kind());
            param.value = Some(value);
        } else {
            return Err(Error::UnknownModifier {
                parameter: param.name.clone(),
                modifier: modifier.clone(),
            });
        }
    }
    Ok(())
}

/// Apply modifiers to a copy of every parameter.
pub fn apply_all(parameters: &[Parameter], vocabulary: &ModifiersConfig) -> Result<Vec<Parameter>> {
    parameters
        .iter()
        .cloned()
        .map(|mut p| apply(&mut p, vocabulary).map(|_| p))
        .collect()
}

/// JSON literals keep their type (`8080`, `true`); anything else is text.
fn parse_literal(literal: &str) -> ParamValue {
    serde_json::from_str::<Value>(literal)
        .map(ParamValue::from)
        .unwrap_or_else(|_| ParamValue::String(literal.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn with(value: serde_json::Value, modifiers: &[&str]) -> Parameter {
        let value = ParamValue::from(value);
        let mut p = Parameter::new("a");
        p.kind = Some(value.kind());
        p.value = Some(value);
        p.modifiers = modifiers.iter().map(|m| m.to_string()).collect();
        apply(&mut p, &ModifiersConfig::default()).unwrap();
        p
    }

    #[test]
    fn no_modifiers_keep_value() {
        let p = with(json!(80), &[]);
        assert_eq!(p.value, Some(ParamValue::from(json!(80))));
        assert!(!p.nullable);
    }

    #[test]
    fn value_forcing_modifiers() {
        let p = with(json!(["a", "b"]), &["array"]);
        assert_eq!(p.value, Some(ParamValue::empty_array()));
        assert_eq!(p.kind, Some(ParamType::Array));

        let p = with(json!({"k": "v"}), &["object"]);
        assert_eq!(p.value, Some(ParamValue::empty_object()));

        let p = with(json!(null), &["string"]);
        assert_eq!(p.value, Some(ParamValue::String(String::new())));
        assert_eq!(p.kind, Some(ParamType::String));
    }

    #[test]
    fn nullable_last_forces_nil() {
        let p = with(json!("x"), &["object", "nullable"]);
        assert_eq!(p.value, Some(ParamValue::Nil));
        assert_eq!(p.kind, Some(ParamType::Object));
        assert!(p.nullable);
    }

    #[test]
    fn nullable_first_is_overridden() {
        let p = with(json!("x"), &["nullable", "object"]);
        assert_eq!(p.value, Some(ParamValue::empty_object()));
        assert_eq!(p.kind, Some(ParamType::Object));
    }

    #[test]
    fn later_modifier_wins() {
        let p = with(json!("x"), &["array", "string"]);
        assert_eq!(p.value, Some(ParamValue::String(String::new())));
        assert_eq!(p.kind, Some(ParamType::String));
    }

    #[test]
    fn default_literal() {
        let p = with(json!(null), &["default: 8080"]);
        assert_eq!(p.value, Some(ParamValue::from(json!(8080))));

        let p = with(json!("x"), &["default: random 10 chars"]);
        assert_eq!(p.value, Some(ParamValue::String("random 10 chars".into())));
        assert_eq!(p.kind, Some(ParamType::String));
    }

    #[test]
    fn unknown_modifier_errors() {
        let mut p = Parameter::new("a");
        p.modifiers = vec!["integer".into()];
        let err = apply(&mut p, &ModifiersConfig::default()).unwrap_err();
        assert!(matches!(err, Error::UnknownModifier { ref modifier, .. } if modifier == "integer"));
    }

    #[test]
    fn apply_all_leaves_input_untouched() {
        let mut p = Parameter::new("a");
        p.value = Some(ParamValue::from(json!(1)));
        p.modifiers = vec!["array".into()];
        let original = vec![p];
        let applied = apply_all(&original, &ModifiersConfig::default()).unwrap();
        assert_eq!(applied[0].value, Some(ParamValue::empty_array()));
        assert_eq!(original[0].value, Some(ParamValue::from(json!(1))));
    }
}
