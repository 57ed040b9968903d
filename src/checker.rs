//! Consistency check between the real values and the parsed metadata.
//!
//! Every real leaf must be documented (or lie under a `@skip` path) and every
//! documented path must exist. Leaves under a parameter with a value-forcing
//! modifier (`array`, `object`, `string`) count as that parameter.

use crate::config::ModifiersConfig;
use crate::error::{Error, Result};
use crate::model::*;
use std::collections::HashMap;
use tracing::info;

/// Compare real leaf paths against the parsed parameters.
///
/// Matching is one-to-one: a path documented twice leaves the second
/// declaration without a real key, reported as not found.
pub fn check(leaves: &[Leaf], parameters: &[Parameter], modifiers: &ModifiersConfig) -> Result<()> {
    info!("checking missing metadata...");

    let skip_roots: Vec<&str> = parameters
        .iter()
        .filter(|p| p.is_skip())
        .map(|p| p.name.as_str())
        .collect();
    let modifier_roots: Vec<&str> = parameters
        .iter()
        .filter(|p| p.render == Render::Normal)
        .filter(|p| p.modifiers.iter().any(|m| modifiers.is_value_forcing(m)))
        .map(|p| p.name.as_str())
        .collect();

    // Real keys, collapsed onto modifier roots, without skipped subtrees
    let mut real_keys: Vec<&str> = Vec::new();
    for leaf in leaves {
        let name = leaf.name.as_str();
        if skip_roots.contains(&name) || is_under(name, &skip_roots) {
            continue;
        }
        let key = modifier_roots
            .iter()
            .find(|root| is_descendant(name, root))
            .copied()
            .unwrap_or(name);
        if !real_keys.contains(&key) {
            real_keys.push(key);
        }
    }

    let parsed_keys: Vec<&str> = parameters
        .iter()
        .filter(|p| p.render == Render::Normal)
        .map(|p| p.name.as_str())
        .filter(|name| !is_under(name, &modifier_roots) && !is_under(name, &skip_roots))
        .collect();

    let mut available: HashMap<&str, usize> = HashMap::new();
    for &key in &real_keys {
        *available.entry(key).or_default() += 1;
    }
    let mut not_found = Vec::new();
    let mut documented: Vec<&str> = Vec::new();
    for &key in &parsed_keys {
        match available.get_mut(key) {
            Some(count) if *count > 0 => {
                *count -= 1;
                documented.push(key);
            }
            _ => not_found.push(key.to_string()),
        }
    }
    let missing: Vec<String> = real_keys
        .into_iter()
        .filter(|key| !documented.contains(key))
        .map(str::to_string)
        .collect();

    if missing.is_empty() && not_found.is_empty() {
        info!("metadata is correct");
        return Ok(());
    }
    Err(Error::MetadataMismatch { missing, not_found })
}

fn is_under(path: &str, roots: &[&str]) -> bool {
    roots.iter().any(|root| is_descendant(path, root))
}
