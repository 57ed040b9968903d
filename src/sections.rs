//! Group parameters by section for rendering.

use crate::model::{Parameter, Section};

/// Build the ordered list of sections with their parameters.
///
/// Declared sections keep their first-seen order; a name declared twice is
/// merged into its first occurrence, keeping the first non-empty description.
/// Sections referenced only by parameters (e.g. the unnamed section of
/// parameters declared before any `@section`) follow in first-seen order.
/// Sections without parameters are kept.
pub fn group(sections: &[Section], parameters: &[Parameter]) -> Vec<Section> {
    let mut groups: Vec<Section> = Vec::new();

    for declared in sections {
        match groups.iter_mut().find(|g| g.name == declared.name) {
            Some(existing) => {
                if existing.description_lines.is_empty() {
                    existing.description_lines = declared.description_lines.clone();
                }
            }
            None => groups.push(Section {
                name: declared.name.clone(),
                description_lines: declared.description_lines.clone(),
                parameters: Vec::new(),
            }),
        }
    }

    for param in parameters {
        let index = match groups.iter().position(|g| g.name == param.section) {
            Some(i) => i,
            None => {
                groups.push(Section::new(param.section.clone()));
                groups.len() - 1
            }
        };
        groups[index].parameters.push(param.clone());
    }

    groups
}
