use std::collections::HashSet;

use wtcd_core::{RegisterName, STD_FUNCTION_NAMES};

#[derive(Debug, Default)]
struct LexicalScope {
    declared: HashSet<String>,
    registers: HashSet<RegisterName>,
    /// Present on function scopes: names looked up through this scope but declared outside it.
    captures: Option<Vec<String>>,
}

/// Parse-time view of which names and registers are visible.
#[derive(Debug)]
pub struct LexicalScopeProvider {
    scopes: Vec<LexicalScope>,
}

impl Default for LexicalScopeProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl LexicalScopeProvider {
    /// Starts with the std scope followed by an empty global scope.
    pub fn new() -> Self {
        let mut provider = Self { scopes: Vec::new() };
        provider.enter_scope();
        for name in STD_FUNCTION_NAMES {
            provider.add_variable(name);
        }
        provider.enter_scope();
        provider
    }

    pub fn enter_scope(&mut self) {
        self.scopes.push(LexicalScope::default());
    }

    pub fn enter_function_scope(&mut self) {
        self.scopes.push(LexicalScope {
            captures: Some(Vec::new()),
            ..LexicalScope::default()
        });
        self.add_register(RegisterName::Return);
    }

    pub fn exit_scope(&mut self) {
        self.scopes.pop();
    }

    /// Pops a function scope and returns the names it captured.
    pub fn exit_function_scope(&mut self) -> Vec<String> {
        self.scopes
            .pop()
            .and_then(|scope| scope.captures)
            .unwrap_or_default()
    }

    pub fn current_scope_has_variable(&self, name: &str) -> bool {
        self.scopes
            .last()
            .is_some_and(|scope| scope.declared.contains(name))
    }

    pub fn add_variable(&mut self, name: &str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.declared.insert(name.to_string());
        }
    }

    pub fn add_register(&mut self, register: RegisterName) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.registers.insert(register);
        }
    }

    pub fn has_register(&self, register: RegisterName) -> bool {
        self.scopes
            .iter()
            .any(|scope| scope.registers.contains(&register))
    }

    /// Resolves `name` innermost first. Every function scope passed on the way
    /// records the name as a capture.
    pub fn has_variable_reference(&mut self, name: &str) -> bool {
        for scope in self.scopes.iter_mut().rev() {
            if scope.declared.contains(name) {
                return true;
            }
            if let Some(captures) = scope.captures.as_mut() {
                if !captures.iter().any(|captured| captured == name) {
                    captures.push(name.to_string());
                }
            }
        }
        false
    }
}

#[cfg(test)]
mod scope_tests {
    use super::*;

    #[test]
    fn std_names_resolve_from_the_start() {
        let mut provider = LexicalScopeProvider::new();
        assert!(provider.has_variable_reference("print"));
        assert!(!provider.has_variable_reference("missing"));
        assert!(!provider.current_scope_has_variable("print"));
    }

    #[test]
    fn function_scopes_record_outer_names_once() {
        let mut provider = LexicalScopeProvider::new();
        provider.add_variable("outer");
        provider.enter_function_scope();
        provider.add_variable("arg");
        assert!(provider.has_variable_reference("arg"));
        assert!(provider.has_variable_reference("outer"));
        provider.enter_scope();
        assert!(provider.has_variable_reference("outer"));
        assert!(provider.has_variable_reference("print"));
        provider.exit_scope();
        assert_eq!(provider.exit_function_scope(), vec!["outer", "print"]);
    }

    #[test]
    fn nested_functions_capture_through_each_level() {
        let mut provider = LexicalScopeProvider::new();
        provider.add_variable("shared");
        provider.enter_function_scope();
        provider.enter_function_scope();
        assert!(provider.has_variable_reference("shared"));
        assert_eq!(provider.exit_function_scope(), vec!["shared"]);
        assert_eq!(provider.exit_function_scope(), vec!["shared"]);
    }

    #[test]
    fn registers_are_visible_from_inner_scopes() {
        let mut provider = LexicalScopeProvider::new();
        assert!(!provider.has_register(RegisterName::Yield));
        provider.enter_scope();
        provider.add_register(RegisterName::Yield);
        provider.enter_scope();
        assert!(provider.has_register(RegisterName::Yield));
        assert!(!provider.has_register(RegisterName::Break));
        provider.exit_scope();
        provider.exit_scope();
        assert!(!provider.has_register(RegisterName::Yield));
    }
}
