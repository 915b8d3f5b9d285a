use std::sync::OnceLock;

use regex::Regex;
use wtcd_runtime::ContentNode;

fn block_end() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)</(?:p|h[1-6]|li|tr|ul|ol|table|div|blockquote)>|<(?:hr|br)\s*/?>")
            .expect("block pattern should compile")
    })
}

fn any_tag() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"<[^>]*>").expect("tag pattern should compile"))
}

fn unescape_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

/// Flattens rendered HTML into one line per block element.
pub fn html_to_lines(html: &str) -> Vec<String> {
    let marked = block_end().replace_all(html, |captures: &regex::Captures<'_>| {
        if captures[0].to_ascii_lowercase().starts_with("<hr") {
            "\n---\n".to_string()
        } else {
            "\n".to_string()
        }
    });
    let marked = marked
        .replace("<li>", "- ")
        .replace("</th>", " | ")
        .replace("</td>", " | ");
    let stripped = any_tag().replace_all(&marked, "");
    stripped
        .lines()
        .map(|line| unescape_entities(line.trim().trim_end_matches('|').trim_end()))
        .filter(|line| !line.is_empty())
        .collect()
}

pub fn content_to_lines(content: &[ContentNode]) -> Vec<String> {
    content
        .iter()
        .flat_map(|node| match node {
            ContentNode::Html(html) => html_to_lines(html),
            ContentNode::Canvas(canvas) => vec![format!(
                "[canvas {} {}x{}]",
                canvas.id, canvas.width, canvas.height
            )],
        })
        .collect()
}
