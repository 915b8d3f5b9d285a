use std::collections::HashMap;
use std::rc::Rc;

use tracing::{debug, trace};
use wtcd_core::error::CODE_RUNTIME;
use wtcd_core::{Section, ValueType, WtcdError, WtcdRoot};

use crate::canvas::{DefaultFeatureProvider, FeatureProvider};
use crate::content::{escape_html, ChoiceOutput, ContentNode, ContentOutput};
use crate::engine::{InterpreterHandle, RuntimeScope};
use crate::error::{EvalError, InvalidChoiceError, StepError};
use crate::random::Random;
use crate::stdlib::std_functions;
use crate::value::{ActionValue, ChoiceValue, FunctionValue, RuntimeValue, Variable};

pub struct InterpreterOptions {
    pub random_seed: String,
    pub feature_provider: Rc<dyn FeatureProvider>,
}

impl InterpreterOptions {
    pub fn new(random_seed: impl Into<String>) -> Self {
        Self {
            random_seed: random_seed.into(),
            feature_provider: Rc::new(DefaultFeatureProvider),
        }
    }

    pub fn with_feature_provider(mut self, feature_provider: Rc<dyn FeatureProvider>) -> Self {
        self.feature_provider = feature_provider;
        self
    }
}

/// Result of one successful [`Interpreter::resume`].
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Suspended at a selection; resume with one of the offered choice indices.
    Yielded(ContentOutput),
    Finished(ContentOutput),
}

impl Step {
    pub fn output(&self) -> &ContentOutput {
        match self {
            Step::Yielded(output) | Step::Finished(output) => output,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, Step::Finished(_))
    }
}

#[derive(Debug)]
enum RunState {
    NotStarted,
    Suspended(Vec<Rc<ChoiceValue>>),
    Finished,
}

enum Flow {
    Continue,
    Suspend(ContentOutput, Vec<Rc<ChoiceValue>>),
}

/// Drives a parsed document as a coroutine: each [`resume`](Interpreter::resume)
/// runs sections until the next selection or the end of the story.
pub struct Interpreter {
    root: Rc<WtcdRoot>,
    handle: InterpreterHandle,
    section_stack: Vec<usize>,
    section_enter_times: HashMap<String, u64>,
    state: RunState,
    last_section: Option<usize>,
    pinned: Vec<ContentNode>,
}

impl Interpreter {
    pub fn new(root: Rc<WtcdRoot>, options: InterpreterOptions) -> Self {
        let random = Random::new(&options.random_seed);
        let section_stack = if root.sections.is_empty() {
            Vec::new()
        } else {
            vec![0]
        };
        Self {
            root,
            handle: InterpreterHandle::new(random, options.feature_provider),
            section_stack,
            section_enter_times: HashMap::new(),
            state: RunState::NotStarted,
            last_section: None,
            pinned: Vec::new(),
        }
    }

    /// Content produced by the pinned function after the latest step.
    pub fn pinned(&self) -> &[ContentNode] {
        &self.pinned
    }

    pub fn state_desc(&self) -> Option<&str> {
        self.handle.state_desc()
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, RunState::Finished)
    }

    /// Starts the story with `None`, then continues it with the index of the
    /// chosen option after every [`Step::Yielded`].
    pub fn resume(&mut self, choice: Option<usize>) -> Result<Step, StepError> {
        let state = std::mem::replace(&mut self.state, RunState::Finished);
        let result = match (state, choice) {
            (RunState::NotStarted, None) => {
                self.start();
                self.run_from(|this| this.execute_init())
            }
            (RunState::NotStarted, Some(index)) => {
                self.state = RunState::NotStarted;
                return Err(InvalidChoiceError { choice: index }.into());
            }
            (RunState::Suspended(choices), None) => {
                self.state = RunState::Suspended(choices);
                return Err(StepError::ChoiceRequired);
            }
            (RunState::Suspended(choices), Some(index)) => {
                let Some(action) = choices
                    .get(index)
                    .map(|choice| choice.action.clone())
                    .filter(|action| !action.is_null())
                else {
                    self.state = RunState::Suspended(choices);
                    return Err(InvalidChoiceError { choice: index }.into());
                };
                debug!(choice = index, "resuming after selection");
                self.run_from(|this| this.execute_action_value(&action))
            }
            (RunState::Finished, _) => return Err(StepError::Finished),
        };
        match result {
            Ok(step) => {
                if let Step::Yielded(_) = &step {
                    trace!("interpreter suspended");
                } else {
                    debug!("interpreter finished");
                }
                Ok(step)
            }
            Err(error) => {
                self.state = RunState::Finished;
                Err(StepError::Runtime(error))
            }
        }
    }

    fn start(&mut self) {
        let mut std_scope = RuntimeScope::default();
        for (name, function) in std_functions() {
            std_scope.add_variable(
                name,
                Variable::new(
                    Some(vec![ValueType::Function]),
                    RuntimeValue::Function(Rc::new(FunctionValue::Native { name, function })),
                ),
            );
        }
        self.handle.push_scope(std_scope);
        self.handle.push_scope(RuntimeScope::default());
    }

    fn execute_init(&mut self) -> Result<Flow, EvalError> {
        let root = Rc::clone(&self.root);
        self.handle.execute_statements(&root.init_statements)?;
        Ok(Flow::Continue)
    }

    /// Runs `first`, then sections until the stack empties or a selection suspends.
    fn run_from(
        &mut self,
        first: impl FnOnce(&mut Self) -> Result<Flow, EvalError>,
    ) -> Result<Step, WtcdError> {
        let flow = match first(self) {
            Ok(flow) => flow,
            Err(error) => return Err(self.locate_top_level(error)),
        };
        if let Flow::Suspend(output, choices) = flow {
            return self.suspend(output, choices);
        }
        while let Some(index) = self.section_stack.pop() {
            self.last_section = Some(index);
            match self.run_section(index) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Suspend(output, choices)) => return self.suspend(output, choices),
                Err(error) => return Err(self.locate_top_level(error)),
            }
        }
        let output = ContentOutput {
            content: self.handle.take_content(),
            choices: Vec::new(),
        };
        self.update_pinned().map_err(EvalError::into_wtcd_error)?;
        self.state = RunState::Finished;
        Ok(Step::Finished(output))
    }

    fn suspend(
        &mut self,
        output: ContentOutput,
        choices: Vec<Rc<ChoiceValue>>,
    ) -> Result<Step, WtcdError> {
        self.state = RunState::Suspended(choices);
        Ok(Step::Yielded(output))
    }

    fn locate_top_level(&self, error: EvalError) -> WtcdError {
        match error {
            EvalError::Signal(_) => error.into_wtcd_error(),
            other => {
                let mut error = other.into_wtcd_error();
                match self.last_section.and_then(|index| self.root.sections.get(index)) {
                    Some(section) => error.push_wtcd_stack(
                        format!("section \"{}\"", section.name),
                        section.location.as_ref(),
                    ),
                    None => error.push_wtcd_stack("initialization", None),
                }
                error
            }
        }
    }

    fn run_section(&mut self, index: usize) -> Result<Flow, EvalError> {
        let root = Rc::clone(&self.root);
        let section = &root.sections[index];
        debug!(section = %section.name, "entering section");
        if let Some(executes) = &section.executes {
            self.handle.evaluate(executes)?;
        }
        let enter_count = {
            let count = self.section_enter_times.entry(section.name.clone()).or_insert(0);
            *count += 1;
            *count
        };
        self.render_section_content(section, enter_count)?;
        match self.handle.evaluate(&section.then)? {
            RuntimeValue::Action(action) => self.execute_action(&action),
            RuntimeValue::Null => Ok(Flow::Continue),
            other => Err(EvalError::runtime(
                format!(
                    "Expression after then is expected to return an action, or null, received: {}",
                    other.describe()
                ),
                section.then.location(),
            )),
        }
    }

    fn render_section_content(
        &mut self,
        section: &Section,
        enter_count: u64,
    ) -> Result<(), EvalError> {
        let eligible = section
            .content
            .iter()
            .filter(|content| content.accepts_enter_count(enter_count))
            .collect::<Vec<_>>();
        if eligible.is_empty() {
            return Ok(());
        }
        let selected = eligible[self.handle.random().next_index(eligible.len())];
        let mut html = selected.html.clone();
        for variable in &selected.variables {
            let cell = self
                .handle
                .resolve_variable_reference(&variable.variable_name)?;
            let value = cell.borrow().value.display_text();
            let placeholder = format!("<span class=\"{}\"></span>", variable.element_class);
            let filled = format!(
                "<span class=\"{}\">{}</span>",
                variable.element_class,
                escape_html(&value)
            );
            html = html.replacen(&placeholder, &filled, 1);
        }
        if !html.trim().is_empty() {
            self.handle.push_content(ContentNode::Html(html));
        }
        Ok(())
    }

    fn execute_action_value(&mut self, action: &RuntimeValue) -> Result<Flow, EvalError> {
        match action {
            RuntimeValue::Action(action) => self.execute_action(action),
            _ => Ok(Flow::Continue),
        }
    }

    fn execute_action(&mut self, action: &ActionValue) -> Result<Flow, EvalError> {
        match action {
            ActionValue::Goto { sections } => {
                trace!(targets = ?sections, "goto");
                for name in sections.iter().rev() {
                    let index = self
                        .root
                        .sections
                        .iter()
                        .position(|section| &section.name == name)
                        .ok_or_else(|| {
                            WtcdError::at_unknown(
                                CODE_RUNTIME,
                                format!("Unknown section \"{name}\""),
                            )
                        })?;
                    self.section_stack.push(index);
                }
                Ok(Flow::Continue)
            }
            ActionValue::Exit => {
                trace!("exit");
                self.section_stack.clear();
                Ok(Flow::Continue)
            }
            ActionValue::Selection { choices } => {
                let output = ContentOutput {
                    content: self.handle.take_content(),
                    choices: choices
                        .iter()
                        .map(|choice| ChoiceOutput {
                            content: choice.text.clone(),
                            disabled: choice.action.is_null(),
                        })
                        .collect(),
                };
                self.update_pinned()?;
                Ok(Flow::Suspend(output, choices.clone()))
            }
            ActionValue::Function { function, creator } => {
                let produced = self.handle.invoke_function(function, &[]).map_err(|error| {
                    match error {
                        EvalError::Invocation(message) => EvalError::runtime(
                            format!(
                                "Failed to evaluate the function action for this choice: {message}"
                            ),
                            creator.as_ref(),
                        ),
                        EvalError::Runtime(error) => EvalError::Runtime(
                            error.with_wtcd_stack("Function action", creator.as_ref()),
                        ),
                        other => other,
                    }
                })?;
                match produced {
                    RuntimeValue::Action(action) => self.execute_action(&action),
                    RuntimeValue::Null => Ok(Flow::Continue),
                    other => Err(EvalError::runtime(
                        format!(
                            "Value returned by a function action is expected to be an action or null. Received: {}",
                            other.describe()
                        ),
                        creator.as_ref(),
                    )),
                }
            }
        }
    }

    /// Re-renders pinned content; whatever the pinned function outputs is
    /// kept out of the story content.
    fn update_pinned(&mut self) -> Result<(), EvalError> {
        let Some(function) = self.handle.pinned_function() else {
            self.pinned.clear();
            return Ok(());
        };
        let description = RuntimeValue::Function(Rc::clone(&function)).describe();
        self.handle
            .invoke_function(&function, &[])
            .map_err(|error| match error {
                EvalError::Invocation(message) => EvalError::Runtime(WtcdError::at_unknown(
                    CODE_RUNTIME,
                    format!("Failed to invoke the pinned function ({description}): {message}"),
                )),
                EvalError::Runtime(error) => EvalError::Runtime(
                    error.with_wtcd_stack(format!("Pinned function ({description})"), None),
                ),
                other => other,
            })?;
        self.pinned = self.handle.take_content();
        Ok(())
    }
}
