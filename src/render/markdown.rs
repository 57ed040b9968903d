//! README renderer: parameter tables spliced into an existing document.
//!
//! The document is rewritten only between the Parameters heading and the
//! end of the generated block; everything else, line endings included, is
//! passed through untouched.

use crate::config::Config;
use crate::error::{DocumentStructureError, Error, Result};
use crate::model::*;
use crate::modifiers;
use crate::render::Renderer;
use crate::sections;
use crate::slug;
use regex::Regex;
use std::sync::LazyLock;
use tracing::{error, info};

static RE_HEADING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(#+)(\s|$)").unwrap());

static RE_ANCHOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^<a id="[^"]*"></a>\s*$"#).unwrap());

const HEADER: [&str; 3] = ["Name", "Description", "Value"];

pub struct MarkdownRenderer<'a> {
    pub config: &'a Config,
    /// Current content of the target README
    pub document: &'a str,
}

impl Renderer for MarkdownRenderer<'_> {
    fn render(&self, metadata: &Metadata) -> Result<String> {
        let parameters = modifiers::apply_all(&metadata.parameters, &self.config.modifiers)?;

        for param in parameters.iter().filter(|p| p.render == Render::Normal) {
            if param.value.as_ref().is_some_and(ParamValue::is_nil) && !param.nullable {
                error!(parameter = %param.name, "nil value without the nullable modifier");
            }
        }

        let grouped = sections::group(&metadata.sections, &parameters);
        insert_into(self.document, &grouped, self.config)
    }

    fn artifact(&self) -> &str {
        "README"
    }
}

// -- Tables -------------------------------------------------------------------

/// Render one section's parameters as an aligned markdown table.
///
/// Skip rows are dropped; Extra rows and rows without a value get an empty
/// value cell.
pub fn render_table(parameters: &[Parameter]) -> String {
    let mut rows: Vec<[String; 3]> = vec![HEADER.map(str::to_string)];
    for param in parameters.iter().filter(|p| !p.is_skip()) {
        let value = match (&param.value, param.is_extra()) {
            (Some(value), false) => format!("`{value}`"),
            _ => String::new(),
        };
        rows.push([format!("`{}`", param.name), param.description.clone(), value]);
    }

    let mut widths = [3usize; 3];
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut lines = Vec::with_capacity(rows.len() + 1);
    for (i, row) in rows.iter().enumerate() {
        lines.push(format_row(row, &widths));
        if i == 0 {
            let dashes = widths.map(|w| "-".repeat(w));
            lines.push(format_row(&dashes, &widths));
        }
    }
    lines.join("\n")
}

fn format_row(cells: &[String; 3], widths: &[usize; 3]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width - cell.chars().count();
            format!("{cell}{}", " ".repeat(pad))
        })
        .collect();
    format!("| {} |", padded.join(" | "))
}

/// Render every section with its heading at `depth`.
///
/// The unnamed section (parameters declared before any `@section`) gets no
/// heading.
pub fn render_sections(sections: &[Section], depth: usize, include_anchor: bool) -> String {
    let hashes = "#".repeat(depth);
    let mut blocks = Vec::with_capacity(sections.len());

    for section in sections {
        let mut lines: Vec<String> = Vec::new();
        if !section.name.is_empty() {
            if include_anchor {
                lines.push(slug::render_anchor(&section.name));
            }
            lines.push(format!("{hashes} {}", section.name));
            lines.push(String::new());
        }
        if !section.description_lines.is_empty() {
            lines.push(section.description());
            lines.push(String::new());
        }
        lines.push(render_table(&section.parameters));
        blocks.push(lines.join("\n"));
    }

    blocks.join("\n\n")
}

// -- Splicing -----------------------------------------------------------------

/// Replace the generated tables under the Parameters heading of `document`.
///
/// The block starts at the first table row, sub-heading or section anchor
/// after the heading and ends at the last one plus its trailing blank lines,
/// all within the heading's span. Prose before and after the block is kept.
pub fn insert_into(document: &str, sections: &[Section], config: &Config) -> Result<String> {
    let lines: Vec<&str> = document.split_inclusive('\n').collect();

    let title = &config.regexp.params_section_title;
    let pattern = if config.find_parameters_subsection {
        format!(r"^(#{{2,}})\s+(?:{title})")
    } else {
        format!(r"^(##)\s+(?:{title})")
    };
    let re_title = Regex::new(&pattern).map_err(|source| Error::InvalidPattern {
        pattern: pattern.clone(),
        source,
    })?;

    let matches: Vec<(usize, usize)> = lines
        .iter()
        .enumerate()
        .filter_map(|(i, line)| re_title.captures(line).map(|caps| (i, caps[1].len())))
        .collect();
    let (heading, depth) = match matches.as_slice() {
        [] => return Err(DocumentStructureError::MissingParametersSection.into()),
        [single] => *single,
        many => {
            let lines = many.iter().map(|(i, _)| i + 1).collect();
            return Err(DocumentStructureError::AmbiguousParametersSection { lines }.into());
        }
    };
    info!(line = heading + 1, "found parameters section");

    let span_end = (heading + 1..lines.len())
        .find(|&i| heading_depth(lines[i]).is_some_and(|d| d <= depth))
        .unwrap_or(lines.len());

    let generated: Vec<usize> = (heading + 1..span_end)
        .filter(|&i| is_generated(lines[i]))
        .collect();
    let (start, end) = match (generated.first(), generated.last()) {
        (Some(&first), Some(&last)) => {
            let mut end = last + 1;
            while end < span_end && is_blank(lines[end]) {
                end += 1;
            }
            (first, end)
        }
        _ => {
            let mut at = heading + 1;
            while at < span_end && is_blank(lines[at]) {
                at += 1;
            }
            (at, at)
        }
    };

    let eol = if lines[heading].ends_with("\r\n") { "\r\n" } else { "\n" };
    let rendered = render_sections(sections, depth + 1, config.include_section_anchor);

    let mut output = String::with_capacity(document.len() + rendered.len());
    for line in &lines[..start] {
        output.push_str(line);
    }
    if !output.ends_with('\n') {
        output.push_str(eol);
    }
    if !is_blank(lines[start - 1]) {
        output.push_str(eol);
    }
    for line in rendered.lines() {
        output.push_str(line);
        output.push_str(eol);
    }
    if end < lines.len() {
        output.push_str(eol);
        for line in &lines[end..] {
            output.push_str(line);
        }
    }
    Ok(output)
}

fn heading_depth(line: &str) -> Option<usize> {
    RE_HEADING.captures(line).map(|caps| caps[1].len())
}

fn is_generated(line: &str) -> bool {
    line.trim_start().starts_with('|') || heading_depth(line).is_some() || RE_ANCHOR.is_match(line)
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}
