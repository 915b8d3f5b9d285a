pub mod lexer;
pub mod parser;
pub mod scope;
pub mod sections;

use tracing::debug;
use wtcd_core::error::CODE_PARSE;
use wtcd_core::{WtcdError, WtcdRoot};

use crate::parser::LogicParser;
use crate::sections::{build_content, split_sections, SimpleIdGenerator};

type TextHook<'a> = Box<dyn Fn(&str) -> String + 'a>;

/// Inputs for [`parse`]. Markdown rendering is always host supplied.
pub struct ParseOptions<'a> {
    pub source: &'a str,
    pub source_map: bool,
    pub render_markdown: TextHook<'a>,
    pub markdown_pre_processor: TextHook<'a>,
    pub html_post_processor: TextHook<'a>,
}

impl<'a> ParseOptions<'a> {
    pub fn new(source: &'a str, render_markdown: impl Fn(&str) -> String + 'a) -> Self {
        Self {
            source,
            source_map: true,
            render_markdown: Box::new(render_markdown),
            markdown_pre_processor: Box::new(str::to_string),
            html_post_processor: Box::new(str::to_string),
        }
    }

    pub fn with_source_map(mut self, source_map: bool) -> Self {
        self.source_map = source_map;
        self
    }

    pub fn with_markdown_pre_processor(mut self, hook: impl Fn(&str) -> String + 'a) -> Self {
        self.markdown_pre_processor = Box::new(hook);
        self
    }

    pub fn with_html_post_processor(mut self, hook: impl Fn(&str) -> String + 'a) -> Self {
        self.html_post_processor = Box::new(hook);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParseResult {
    Ok(WtcdRoot),
    Error {
        code: String,
        message: String,
        internal_trace: String,
    },
}

impl ParseResult {
    pub fn into_result(self) -> Result<WtcdRoot, WtcdError> {
        match self {
            ParseResult::Ok(root) => Ok(root),
            ParseResult::Error { code, message, .. } => Err(WtcdError::new(code, message)),
        }
    }
}

/// Parses a whole document: the logic block followed by its content sections.
pub fn parse(options: &ParseOptions<'_>) -> ParseResult {
    match parse_document(options) {
        Ok(root) => ParseResult::Ok(root),
        Err(error) => ParseResult::Error {
            internal_trace: format!("{error:?}"),
            code: error.code,
            message: error.message,
        },
    }
}

fn parse_document(options: &ParseOptions<'_>) -> Result<WtcdRoot, WtcdError> {
    let source = options.source.replace("\r\n", "\n");
    let (logic, raw_sections) = split_sections(&source);
    let parsed = LogicParser::new(&logic, options.source_map)?.parse()?;
    let mut root = parsed.root;
    let mut ids = SimpleIdGenerator::new();
    for raw in &raw_sections {
        let markdown = (options.markdown_pre_processor)(&raw.markdown);
        let html = (options.render_markdown)(&markdown);
        let (full_name, mut content) =
            build_content(raw, html, &parsed.root_declarations, &mut ids)?;
        content.html = (options.html_post_processor)(&content.html);
        let Some(section) = root
            .sections
            .iter_mut()
            .find(|section| section.name == raw.name)
        else {
            return Err(WtcdError::at_unknown(
                CODE_PARSE,
                format!("Cannot find a logic declaration for section content {full_name}"),
            ));
        };
        debug!(section = %full_name, "attached section content");
        section.content.push(content);
    }
    Ok(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn paragraphs(markdown: &str) -> String {
        markdown
            .split("\n\n")
            .map(str::trim)
            .filter(|paragraph| !paragraph.is_empty())
            .map(|paragraph| {
                format!(
                    "<p>{}</p>",
                    paragraph.replace('<', "&lt;").replace('>', "&gt;")
                )
            })
            .collect()
    }

    const STORY: &str = "WTCD 1.3
declare number gold = 3
section start then goto [middle end]
section middle then null
section end then exit
---<<< start >>>---
You have <$ gold $> gold.
---<<< middle@1 >>>---
First visit.
---<<< middle@2- >>>---
Back again.
---<<< end >>>---
Bye.
";

    #[test]
    fn parse_merges_rendered_content_into_sections() {
        let options = ParseOptions::new(STORY, paragraphs)
            .with_html_post_processor(|html| html.replace("<p>", "<p class=\"x\">"));
        let root = parse(&options).into_result().expect("parse");
        assert_eq!(root.sections.len(), 3);
        let start = root.section("start").expect("start");
        assert_eq!(
            start.content[0].html,
            "<p class=\"x\">You have <span class=\"wtcd-variable-a\"></span> gold.</p>"
        );
        assert_eq!(start.content[0].variables[0].variable_name, "gold");
        let middle = root.section("middle").expect("middle");
        assert_eq!(middle.content.len(), 2);
        assert_eq!(middle.content[0].lower_bound, Some(1));
        assert_eq!(middle.content[0].upper_bound, Some(1));
        assert_eq!(middle.content[1].upper_bound, None);
    }

    #[test]
    fn parsing_is_deterministic() {
        let options = ParseOptions::new(STORY, paragraphs);
        assert_eq!(parse(&options), parse(&options));
    }

    #[test]
    fn pre_processor_runs_before_rendering() {
        let options = ParseOptions::new(STORY, paragraphs)
            .with_markdown_pre_processor(|markdown| markdown.replace("Bye", "Farewell"));
        let root = parse(&options).into_result().expect("parse");
        assert_eq!(
            root.section("end").expect("end").content[0].html,
            "<p>Farewell.</p>"
        );
    }

    #[test]
    fn content_without_logic_section_is_rejected() {
        let source = "WTCD 1.3\nsection a then exit\n---<<< b@2 >>>---\nOrphan\n";
        let result = parse(&ParseOptions::new(source, paragraphs));
        let ParseResult::Error { code, message, .. } = result else {
            panic!("expected error");
        };
        assert_eq!(code, CODE_PARSE);
        assert!(message.starts_with("Cannot find a logic declaration for section content b@2"));
    }

    #[test]
    fn logic_errors_surface_as_parse_result_errors() {
        let result = parse(&ParseOptions::new("WTCD 1.3\nsection a then goto nowhere", paragraphs));
        let ParseResult::Error { message, .. } = result else {
            panic!("expected error");
        };
        assert_eq!(message, "Unknown section \"nowhere\" at 2:21.");
    }
}
