//! Presentation fragments for related-tag links
//!
//! Each retained related tag is rendered through a `LinkRenderer`. The
//! aggregator concatenates the fragments and stores the result with the
//! record, so pages can display related tags without re-rendering.

/// Default fragment template
pub const DEFAULT_LINK_TEMPLATE: &str = concat!(
    r#"<div class="related-tag">"#,
    r#"<a href="/tagged/{link}" title="{title}" rel="tag">{tag}</a>"#,
    r#"<span class="related-count">&times;&nbsp;{count}</span>"#,
    "</div>",
);

/// The values one fragment is rendered from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedLink<'a> {
    /// The related tag's name
    pub related: &'a str,
    /// `"<tag> <related>"`
    pub title: String,
    /// URL-encoded `"<tag>+<related>"`, the combined-tag link
    pub token: String,
    pub count: i64,
}

impl<'a> RelatedLink<'a> {
    pub fn new(tag: &str, related: &'a str, count: i64) -> Self {
        Self {
            related,
            title: format!("{} {}", tag, related),
            token: format!("{}+{}", urlencoding::encode(tag), urlencoding::encode(related)),
            count,
        }
    }
}

/// Formats one related-tag link
pub trait LinkRenderer: Send + Sync {
    fn render(&self, link: &RelatedLink<'_>) -> String;
}

/// Renders links by substituting `{tag}`, `{title}`, `{link}` and `{count}`
/// in a template.
///
/// Tag names and titles are HTML-escaped; the link token is already
/// URL-encoded. Substitution is single-pass, so placeholder text inside a
/// tag name is never expanded. Unknown `{...}` sequences are left as-is.
#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    template: String,
}

#[derive(Clone, Copy)]
enum Field {
    Tag,
    Title,
    Link,
    Count,
}

const PLACEHOLDERS: [(&str, Field); 4] = [
    ("{tag}", Field::Tag),
    ("{title}", Field::Title),
    ("{link}", Field::Link),
    ("{count}", Field::Count),
];

impl TemplateRenderer {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_LINK_TEMPLATE)
    }
}

impl LinkRenderer for TemplateRenderer {
    fn render(&self, link: &RelatedLink<'_>) -> String {
        let mut out = String::with_capacity(self.template.len() + 2 * link.title.len());
        let mut rest = self.template.as_str();

        while let Some(start) = rest.find('{') {
            out.push_str(&rest[..start]);
            let tail = &rest[start..];

            let matched = PLACEHOLDERS
                .iter()
                .find(|(name, _)| tail.starts_with(*name));

            match matched {
                Some((name, field)) => {
                    match field {
                        Field::Tag => out.push_str(&html_escape(link.related)),
                        Field::Title => out.push_str(&html_escape(&link.title)),
                        Field::Link => out.push_str(&link.token),
                        Field::Count => out.push_str(&link.count.to_string()),
                    }
                    rest = &tail[name.len()..];
                }
                None => {
                    out.push('{');
                    rest = &tail[1..];
                }
            }
        }
        out.push_str(rest);

        out
    }
}

pub fn html_escape(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
