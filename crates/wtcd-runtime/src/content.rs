use serde::{Deserialize, Serialize};

use crate::canvas::CanvasSnapshot;

/// One piece of reader-visible output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum ContentNode {
    Html(String),
    Canvas(CanvasSnapshot),
}

impl ContentNode {
    pub fn as_html(&self) -> Option<&str> {
        match self {
            ContentNode::Html(html) => Some(html),
            ContentNode::Canvas(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOutput {
    pub content: String,
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ContentOutput {
    pub content: Vec<ContentNode>,
    pub choices: Vec<ChoiceOutput>,
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// `<tag>escaped text</tag>`
pub(crate) fn text_element(tag: &str, text: &str) -> String {
    format!("<{tag}>{}</{tag}>", escape_html(text))
}
