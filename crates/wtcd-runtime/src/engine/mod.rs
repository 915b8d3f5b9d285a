mod eval;
mod invoke;
mod operators;
mod scope;

#[cfg(test)]
mod tests;

use std::collections::HashMap;
use std::rc::Rc;
use std::time::Instant;

use crate::canvas::{ChainedCanvas, FeatureProvider};
use crate::content::ContentNode;
use crate::random::Random;
use crate::value::FunctionValue;

pub(crate) use scope::RuntimeScope;

/// Mutable evaluation state shared by the evaluator and native functions.
pub struct InterpreterHandle {
    scopes: Vec<RuntimeScope>,
    random: Random,
    content: Vec<ContentNode>,
    pinned_function: Option<Rc<FunctionValue>>,
    state_desc: Option<String>,
    timers: HashMap<String, Instant>,
    canvases: HashMap<String, ChainedCanvas>,
    feature_provider: Rc<dyn FeatureProvider>,
}

impl InterpreterHandle {
    pub(crate) fn new(random: Random, feature_provider: Rc<dyn FeatureProvider>) -> Self {
        Self {
            scopes: Vec::new(),
            random,
            content: Vec::new(),
            pinned_function: None,
            state_desc: None,
            timers: HashMap::new(),
            canvases: HashMap::new(),
            feature_provider,
        }
    }

    pub fn random(&mut self) -> &mut Random {
        &mut self.random
    }

    pub fn push_content(&mut self, node: ContentNode) {
        self.content.push(node);
    }

    pub(crate) fn take_content(&mut self) -> Vec<ContentNode> {
        std::mem::take(&mut self.content)
    }

    pub fn set_pinned_function(&mut self, function: Option<Rc<FunctionValue>>) {
        self.pinned_function = function;
    }

    pub fn pinned_function(&self) -> Option<Rc<FunctionValue>> {
        self.pinned_function.clone()
    }

    pub fn set_state_desc(&mut self, state_desc: Option<String>) {
        self.state_desc = state_desc;
    }

    pub fn state_desc(&self) -> Option<&str> {
        self.state_desc.as_deref()
    }

    pub fn timers_mut(&mut self) -> &mut HashMap<String, Instant> {
        &mut self.timers
    }

    pub fn canvases_mut(&mut self) -> &mut HashMap<String, ChainedCanvas> {
        &mut self.canvases
    }

    pub fn feature_provider(&self) -> Rc<dyn FeatureProvider> {
        Rc::clone(&self.feature_provider)
    }
}
