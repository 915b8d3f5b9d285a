mod text;

pub use text::{content_to_lines, html_to_lines};

use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::debug;
use wtcd_core::{WtcdError, WtcdRoot};
use wtcd_parser::{parse, ParseOptions};
use wtcd_runtime::{
    escape_html, DefaultFeatureProvider, FeatureProvider, Interpreter, InterpreterOptions, Step,
    StepError,
};

#[derive(Clone)]
pub struct CreateInterpreterOptions {
    pub source: String,
    pub random_seed: Option<String>,
    pub feature_provider: Option<Rc<dyn FeatureProvider>>,
}

#[derive(Clone)]
pub struct ReplayInterpreterOptions {
    pub source: String,
    pub random_seed: String,
    pub decisions: Vec<usize>,
    pub feature_provider: Option<Rc<dyn FeatureProvider>>,
}

/// Interpreter together with the step it last produced.
pub struct ReplayedInterpreter {
    pub interpreter: Interpreter,
    pub random_seed: String,
    pub last_step: Step,
}

/// Minimal markdown: blank-line separated paragraphs and `#` headings.
pub fn render_paragraphs(markdown: &str) -> String {
    let mut html = String::new();
    for block in markdown.split("\n\n") {
        let block = block.trim();
        if block.is_empty() {
            continue;
        }
        let level = block.chars().take_while(|ch| *ch == '#').count();
        let text = block
            .lines()
            .map(str::trim)
            .collect::<Vec<_>>()
            .join(" ");
        if (1..=6).contains(&level) && text[level..].starts_with(' ') {
            let heading = escape_html(text[level..].trim());
            html.push_str(&format!("<h{level}>{heading}</h{level}>"));
        } else if block.chars().all(|ch| ch == '-' || ch == '*') && block.len() >= 3 {
            html.push_str("<hr>");
        } else {
            html.push_str(&format!("<p>{}</p>", escape_html(&text)));
        }
    }
    html
}

pub fn parse_source(source: &str) -> Result<WtcdRoot, WtcdError> {
    parse(&ParseOptions::new(source, render_paragraphs)).into_result()
}

/// Seed used when the caller does not pick one.
pub fn default_random_seed() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default();
    millis.to_string()
}

pub fn step_error_to_wtcd(error: StepError) -> WtcdError {
    match error {
        StepError::Runtime(error) => error,
        other => WtcdError::new(other.code(), other.to_string()),
    }
}

pub fn create_interpreter(
    options: CreateInterpreterOptions,
) -> Result<(Interpreter, String), WtcdError> {
    let root = parse_source(&options.source)?;
    let random_seed = options.random_seed.unwrap_or_else(default_random_seed);
    let feature_provider = options
        .feature_provider
        .unwrap_or_else(|| Rc::new(DefaultFeatureProvider));
    debug!(seed = %random_seed, sections = root.sections.len(), "creating interpreter");
    let interpreter = Interpreter::new(
        Rc::new(root),
        InterpreterOptions::new(random_seed.clone()).with_feature_provider(feature_provider),
    );
    Ok((interpreter, random_seed))
}

/// Rebuilds an interpreter by starting it and applying every decision in order.
pub fn replay_interpreter(
    options: ReplayInterpreterOptions,
) -> Result<ReplayedInterpreter, WtcdError> {
    let (mut interpreter, random_seed) = create_interpreter(CreateInterpreterOptions {
        source: options.source,
        random_seed: Some(options.random_seed),
        feature_provider: options.feature_provider,
    })?;
    let mut last_step = interpreter.resume(None).map_err(step_error_to_wtcd)?;
    for decision in options.decisions {
        last_step = interpreter
            .resume(Some(decision))
            .map_err(step_error_to_wtcd)?;
    }
    Ok(ReplayedInterpreter {
        interpreter,
        random_seed,
        last_step,
    })
}
