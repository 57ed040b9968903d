//! Metadata comment parser: line-by-line state machine.
//!
//! Recognized shapes (with the default vocabulary):
//!
//! ```yaml
//! ## @section Common parameters
//! ## @descriptionStart
//! ## Free text shown under the section heading
//! ## @descriptionEnd
//! ## @param image.tag [string, nullable] Image tag
//! ## @skip internal
//! ## @extra ingress.hosts[0].name Host name
//! ```

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::*;
use regex::Regex;

// -- Patterns -----------------------------------------------------------------

/// `<path> [<modifiers>]? <description>` after a `@param` or `@extra` tag
const PARAMETER_TAIL: &str = r"\s+(?P<path>\S+)\s*(?P<modifiers>\[.*?\])?\s*(?P<text>.*)$";

/// Line patterns compiled from a [`Config`].
///
/// The comment format is a regex fragment; tags are matched literally.
/// Captures are named, so groups inside the comment format do not shift them.
#[derive(Debug)]
pub struct Patterns {
    param: Regex,
    section: Regex,
    skip: Regex,
    extra: Regex,
    description_start: Regex,
    description_end: Regex,
    description_content: Regex,
}

impl Patterns {
    pub fn new(config: &Config) -> Result<Self> {
        let comment = &config.comments.format;
        let tags = &config.tags;
        let tagged = |tag: &str, rest: &str| {
            compile(&format!(
                r"^\s*(?:{comment})\s*{}{rest}",
                regex::escape(tag)
            ))
        };

        Ok(Self {
            param: tagged(&tags.param, PARAMETER_TAIL)?,
            section: tagged(&tags.section, r"\s+(?P<text>.*)$")?,
            skip: tagged(&tags.skip, r"\s+(?P<path>\S+)")?,
            extra: tagged(&tags.extra, PARAMETER_TAIL)?,
            description_start: tagged(&tags.description_start, r"(?:\s+(?P<text>.*))?$")?,
            description_end: tagged(&tags.description_end, r"(?:\s.*)?$")?,
            description_content: compile(&format!(r"^\s*(?:{comment})\s?(?P<text>.*)$"))?,
        })
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| Error::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

// -- Parser state -------------------------------------------------------------

struct ParserState<'a> {
    config: &'a Config,
    patterns: Patterns,
    metadata: Metadata,
    current_section: Option<usize>,
    in_description: bool,
}

// -- Public API ---------------------------------------------------------------

/// Parse the metadata comments of a values file.
///
/// Parameters declared before any section get an empty section name.
pub fn parse(input: &str, config: &Config) -> Result<Metadata> {
    let mut state = ParserState {
        config,
        patterns: Patterns::new(config)?,
        metadata: Metadata::default(),
        current_section: None,
        in_description: false,
    };

    for line in input.lines() {
        process_line(&mut state, line)?;
    }

    Ok(state.metadata)
}

// -- Line processing ----------------------------------------------------------

fn process_line(s: &mut ParserState, line: &str) -> Result<()> {
    // 1. Inside a description span every comment line is text until the end tag
    if s.in_description {
        if s.patterns.description_end.is_match(line) {
            s.in_description = false;
        } else if let Some(caps) = s.patterns.description_content.captures(line) {
            let text = caps["text"].trim_start().to_string();
            push_description_line(s, text);
        }
        return Ok(());
    }

    // 2. Description start, optionally with text on the same line
    if let Some(caps) = s.patterns.description_start.captures(line) {
        s.in_description = true;
        if let Some(text) = caps.name("text").map(|m| m.as_str().trim()) {
            if !text.is_empty() {
                push_description_line(s, text.to_string());
            }
        }
        return Ok(());
    }

    // 3. Section
    if let Some(caps) = s.patterns.section.captures(line) {
        let name = caps["text"].trim().to_string();
        s.metadata.add_section(Section::new(name));
        s.current_section = Some(s.metadata.sections.len() - 1);
        return Ok(());
    }

    // 4. Parameter
    if let Some(caps) = s.patterns.param.captures(line) {
        let param = build_parameter(
            s,
            &caps["path"],
            caps.name("modifiers").map(|m| m.as_str()),
            &caps["text"],
        )?;
        s.metadata.add_parameter(param);
        return Ok(());
    }

    // 5. Extra: documented, never validated
    if let Some(caps) = s.patterns.extra.captures(line) {
        let mut param = build_parameter(
            s,
            &caps["path"],
            caps.name("modifiers").map(|m| m.as_str()),
            &caps["text"],
        )?;
        param.render = Render::Extra;
        s.metadata.add_parameter(param);
        return Ok(());
    }

    // 6. Skip
    if let Some(caps) = s.patterns.skip.captures(line) {
        let mut param = Parameter::new(&caps["path"]);
        param.render = Render::Skip;
        param.section = current_section_name(s);
        s.metadata.add_parameter(param);
    }

    Ok(())
}

// -- Helper functions ---------------------------------------------------------

fn build_parameter(
    s: &ParserState,
    name: &str,
    modifiers: Option<&str>,
    description: &str,
) -> Result<Parameter> {
    let mut param = Parameter::new(name);
    param.modifiers = modifiers.map(split_modifiers).unwrap_or_default();
    param.description = description.trim_end().to_string();
    param.section = current_section_name(s);

    if let Some(unknown) = param
        .modifiers
        .iter()
        .find(|m| !s.config.modifiers.is_known(m))
    {
        return Err(Error::UnknownModifier {
            parameter: param.name.clone(),
            modifier: unknown.clone(),
        });
    }
    Ok(param)
}

/// `[array, nullable]` → `["array", "nullable"]`
fn split_modifiers(list: &str) -> Vec<String> {
    list.trim_start_matches('[')
        .trim_end_matches(']')
        .split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect()
}

fn current_section_name(s: &ParserState) -> String {
    s.current_section
        .map(|i| s.metadata.sections[i].name.clone())
        .unwrap_or_default()
}

/// Description text without a current section is dropped.
fn push_description_line(s: &mut ParserState, text: String) {
    if let Some(i) = s.current_section {
        s.metadata.sections[i].description_lines.push(text);
    }
}
