//! GitHub-flavored markdown anchor generation for section headings.

/// GitHub heading anchor slug.
///
/// Matches the algorithm at:
/// https://github.com/jch/html-pipeline/blob/master/lib/html/pipeline/toc_filter.rb#L44-L45
///
/// - lowercase
/// - drop every char that isn't alphanumeric, space or hyphen
/// - replace spaces with hyphens
pub fn github_slug(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.to_lowercase().chars() {
        if c.is_alphanumeric() || c == ' ' || c == '-' {
            slug.push(c);
        }
    }
    slug.replace(' ', "-")
}

/// HTML anchor placed on the line before a section heading.
pub fn render_anchor(title: &str) -> String {
    format!("<a id=\"{}\"></a>", github_slug(title))
}
