use std::collections::HashSet;

use regex::{Captures, Regex};
use wtcd_core::error::CODE_PARSE;
use wtcd_core::{ContentVariable, SingleSectionContent, WtcdError};

const ID_POOL: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ1234567890";

/// Short unique names for interpolation spans: `a`, `b`, ..., `0`, `aa`, `ab`, ...
#[derive(Debug, Default)]
pub struct SimpleIdGenerator {
    index: usize,
}

impl SimpleIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> String {
        let pool = ID_POOL.chars().collect::<Vec<_>>();
        let id = Self::name_for(&pool, self.index);
        self.index += 1;
        id
    }

    fn name_for(pool: &[char], index: usize) -> String {
        if index >= pool.len() {
            let mut prefix = Self::name_for(pool, index / pool.len() - 1);
            prefix.push(pool[index % pool.len()]);
            return prefix;
        }
        pool[index].to_string()
    }
}

/// Raw content chunk split from the source, before rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSection {
    pub name: String,
    pub bound: Option<String>,
    pub markdown: String,
}

impl RawSection {
    pub fn full_name(&self) -> String {
        match &self.bound {
            Some(bound) => format!("{}@{bound}", self.name),
            None => self.name.clone(),
        }
    }
}

/// Splits a document into its logic block and the content chunks that follow
/// `---<<< name@bound >>>---` headers.
pub fn split_sections(source: &str) -> (String, Vec<RawSection>) {
    let header = Regex::new(r"(?m)^---<<<\s+([a-zA-Z_][a-zA-Z_0-9]*)(?:@([0-9\-]+))?\s+>>>---$")
        .expect("section header regex must compile");
    let mut chunks = Vec::new();
    let mut headers = Vec::new();
    let mut last_end = 0;
    for caps in header.captures_iter(source) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        chunks.push(source[last_end..whole.start()].to_string());
        headers.push((
            caps[1].to_string(),
            caps.get(2).map(|bound| bound.as_str().to_string()),
        ));
        last_end = whole.end();
    }
    chunks.push(source[last_end..].to_string());

    let mut chunks = chunks.into_iter();
    let logic = chunks.next().unwrap_or_default();
    let sections = headers
        .into_iter()
        .zip(chunks)
        .map(|((name, bound), markdown)| RawSection {
            name,
            bound,
            markdown,
        })
        .collect();
    (logic, sections)
}

/// `a-b`, `a-`, `-b` or a single `n`.
pub fn parse_bounds(
    bound: Option<&str>,
    full_name: &str,
) -> Result<(Option<u64>, Option<u64>), WtcdError> {
    let Some(bound) = bound else {
        return Ok((None, None));
    };
    let parse_one = |part: &str| -> Result<Option<u64>, WtcdError> {
        if part.is_empty() {
            return Ok(None);
        }
        part.parse().map(Some).map_err(|_| {
            WtcdError::at_unknown(
                CODE_PARSE,
                format!("Invalid bound \"{bound}\" of section content {full_name}"),
            )
        })
    };
    if bound.contains('-') {
        let mut parts = bound.split('-');
        let lower = parse_one(parts.next().unwrap_or_default())?;
        let upper = parse_one(parts.next().unwrap_or_default())?;
        Ok((lower, upper))
    } else {
        let exact = parse_one(bound)?;
        Ok((exact, exact))
    }
}

/// Replaces `<$ name $>` references (already HTML-escaped by the markdown
/// renderer) with empty spans the interpreter later fills in.
pub fn parameterize_html(
    html: &str,
    full_name: &str,
    root_declarations: &HashSet<String>,
    ids: &mut SimpleIdGenerator,
) -> Result<(String, Vec<ContentVariable>), WtcdError> {
    let reference = Regex::new(r"&lt;\$\s+([a-zA-Z_][a-zA-Z_0-9]*)\s+\$&gt;")
        .expect("variable reference regex must compile");
    let mut variables = Vec::new();
    let mut out = String::with_capacity(html.len());
    let mut last_end = 0;
    for caps in reference.captures_iter(html) {
        let (whole, variable_name) = split_match(&caps);
        if !root_declarations.contains(variable_name) {
            return Err(WtcdError::at_unknown(
                CODE_PARSE,
                format!(
                    "Cannot resolve variable reference \"{variable_name}\" in section \"{full_name}\""
                ),
            ));
        }
        let element_class = format!("wtcd-variable-{}", ids.next_id());
        out.push_str(&html[last_end..whole.0]);
        out.push_str(&format!("<span class=\"{element_class}\"></span>"));
        last_end = whole.1;
        variables.push(ContentVariable {
            element_class,
            variable_name: variable_name.to_string(),
        });
    }
    out.push_str(&html[last_end..]);
    Ok((out, variables))
}

fn split_match<'h>(caps: &Captures<'h>) -> ((usize, usize), &'h str) {
    let range = caps
        .get(0)
        .map(|whole| (whole.start(), whole.end()))
        .unwrap_or_default();
    let name = caps.get(1).map(|name| name.as_str()).unwrap_or_default();
    (range, name)
}

pub fn build_content(
    raw: &RawSection,
    html: String,
    root_declarations: &HashSet<String>,
    ids: &mut SimpleIdGenerator,
) -> Result<(String, SingleSectionContent), WtcdError> {
    let full_name = raw.full_name();
    let (html, variables) = parameterize_html(&html, &full_name, root_declarations, ids)?;
    let (lower_bound, upper_bound) = parse_bounds(raw.bound.as_deref(), &full_name)?;
    Ok((
        full_name,
        SingleSectionContent {
            html,
            variables,
            lower_bound,
            upper_bound,
        },
    ))
}
