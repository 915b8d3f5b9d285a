use std::collections::HashSet;
use std::rc::Rc;

use tracing::{info, warn};
use wtcd_core::error::CODE_PARSE;
use wtcd_core::{
    BinaryOperator, Expression, ExpressionKind, FunctionArgument, FunctionExpression,
    ListElement, OneVariableDeclaration, RegisterName, Section, SourceLocation, Statement,
    StatementKind, SwitchCase, UnaryOperator, ValueType, VariableType, WtcdError, WtcdRoot,
    WtcdVersion, CONDITIONAL_OPERATOR_PRECEDENCE, PARSER_VERSION, UNARY_OPERATOR_PRECEDENCE,
};

use crate::lexer::{Token, TokenKind, TokenStream};
use crate::scope::LexicalScopeProvider;

const VARIABLE_TYPE_KEYWORDS: &[&str] = &[
    "null",
    "number",
    "boolean",
    "string",
    "action",
    "choice",
    "selection",
    "list",
    "function",
];

/// Marker for "no upper bound" when climbing precedences.
const PRECEDENCE_UNBOUNDED: u8 = u8::MAX;

fn error_at(token: &Token, message: impl AsRef<str>) -> WtcdError {
    WtcdError::at_line_column(CODE_PARSE, message, token.line, token.column)
}

/// Logic block of a document plus the root-level names content may interpolate.
#[derive(Debug, Clone)]
pub struct ParsedLogic {
    pub root: WtcdRoot,
    pub root_declarations: HashSet<String>,
}

pub struct LogicParser {
    tokens: TokenStream,
    scopes: LexicalScopeProvider,
    source_map: bool,
    version: WtcdVersion,
    init_statements: Vec<Statement>,
    sections: Vec<Section>,
    root_declarations: HashSet<String>,
    goto_targets: Vec<Token>,
}

impl LogicParser {
    pub fn new(source: &str, source_map: bool) -> Result<Self, WtcdError> {
        Ok(Self {
            tokens: TokenStream::new(source)?,
            scopes: LexicalScopeProvider::new(),
            source_map,
            version: PARSER_VERSION,
            init_statements: Vec::new(),
            sections: Vec::new(),
            root_declarations: HashSet::new(),
            goto_targets: Vec::new(),
        })
    }

    pub fn parse(mut self) -> Result<ParsedLogic, WtcdError> {
        info!("Parsing logic section...");
        self.parse_version()?;
        while !self.tokens.eof() {
            self.parse_root_block()?;
        }
        info!("Run post checks...");
        for target in &self.goto_targets {
            if !self.sections.iter().any(|section| section.name == target.content) {
                return Err(error_at(
                    target,
                    format!("Unknown section \"{}\"", target.content),
                ));
            }
        }
        Ok(ParsedLogic {
            root: WtcdRoot {
                version: self.version,
                init_statements: self.init_statements,
                sections: self.sections,
            },
            root_declarations: self.root_declarations,
        })
    }

    fn loc(&self, token: &Token) -> Option<SourceLocation> {
        self.source_map.then(|| token.location())
    }

    fn peek_loc(&self) -> Option<SourceLocation> {
        self.tokens.peek().and_then(|token| self.loc(token))
    }

    fn parse_version(&mut self) -> Result<(), WtcdError> {
        self.tokens
            .assert_and_skip_content(TokenKind::Identifier, "WTCD")?;
        let version_token = self.tokens.assert_and_skip(TokenKind::Number)?;
        let content = version_token.content.as_str();
        let invalid = || error_at(&version_token, format!("Invalid WTCD version {content}"));
        let parts = content.split('.').collect::<Vec<_>>();
        let [major, minor] = parts.as_slice() else {
            return Err(invalid());
        };
        let version = WtcdVersion {
            major: major.parse().map_err(|_| invalid())?,
            minor: minor.parse().map_err(|_| invalid())?,
        };
        if version > PARSER_VERSION {
            warn!(
                "Document's WTCD version ({content}) is newer than parser version ({PARSER_VERSION}). New features might break parser."
            );
        } else if version.major < PARSER_VERSION.major {
            warn!(
                "Document's WTCD version ({content}) is a least one major version before parser's ({PARSER_VERSION}). Breaking changes introduced might break parser."
            );
        }
        self.version = version;
        Ok(())
    }

    fn parse_root_block(&mut self) -> Result<(), WtcdError> {
        self.tokens
            .assert_next_any(TokenKind::Keyword, &["declare", "section"])?;
        if self.tokens.is_next_content(TokenKind::Keyword, "declare") {
            let statement = self.parse_declaration()?;
            if let StatementKind::Declaration { declarations } = &statement.kind {
                for declaration in declarations {
                    self.root_declarations
                        .insert(declaration.variable_name.clone());
                }
            }
            self.init_statements.push(statement);
        } else {
            let section = self.parse_section()?;
            self.sections.push(section);
        }
        Ok(())
    }

    fn parse_section(&mut self) -> Result<Section, WtcdError> {
        let section_token = self
            .tokens
            .assert_and_skip_content(TokenKind::Keyword, "section")?;
        let name_token = self.tokens.assert_and_skip(TokenKind::Identifier)?;
        if self
            .sections
            .iter()
            .any(|section| section.name == name_token.content)
        {
            return Err(error_at(
                &name_token,
                format!("Cannot redefine section \"{}\"", name_token.content),
            ));
        }
        let executes = if self.tokens.is_next_content(TokenKind::Keyword, "then") {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.tokens
            .assert_and_skip_content(TokenKind::Keyword, "then")?;
        let then = self.parse_expression()?;
        Ok(Section {
            name: name_token.content,
            executes,
            then,
            content: Vec::new(),
            location: self.loc(&section_token),
        })
    }

    fn parse_variable_type(&mut self) -> Result<VariableType, WtcdError> {
        let mut types = Vec::new();
        while self
            .tokens
            .is_next_any(TokenKind::Keyword, VARIABLE_TYPE_KEYWORDS)
        {
            let token = self.tokens.next()?;
            // `selection` was folded into `action` in 1.1.
            let keyword = match token.content.as_str() {
                "selection" => "action",
                other => other,
            };
            let Some(ty) = ValueType::from_keyword(keyword) else {
                return Err(error_at(&token, format!("Unknown type {}", token.content)));
            };
            types.push(ty);
        }
        Ok((!types.is_empty()).then_some(types))
    }

    fn parse_declaration(&mut self) -> Result<Statement, WtcdError> {
        let declare_token = self
            .tokens
            .assert_and_skip_content(TokenKind::Keyword, "declare")?;
        let declarations = if self.tokens.is_next_content(TokenKind::Punctuation, "[") {
            self.tokens.next()?;
            let mut declarations = Vec::new();
            while !self.tokens.is_next_content(TokenKind::Punctuation, "]") {
                declarations.push(self.parse_one_declaration()?);
            }
            if declarations.is_empty() {
                return Err(self.tokens.unexpected_next(Some("at least one element")));
            }
            self.tokens.next()?;
            declarations
        } else {
            vec![self.parse_one_declaration()?]
        };
        Ok(Statement::new(
            StatementKind::Declaration { declarations },
            self.loc(&declare_token),
        ))
    }

    fn parse_one_declaration(&mut self) -> Result<OneVariableDeclaration, WtcdError> {
        let variable_type = self.parse_variable_type()?;
        let name_token = self.tokens.assert_and_skip(TokenKind::Identifier)?;
        let is_function_shorthand = variable_type.as_deref() == Some(&[ValueType::Function][..])
            && (self.tokens.is_next_content(TokenKind::Punctuation, "[")
                || self.tokens.is_next_content(TokenKind::Keyword, "switch"));
        let initial_value = if self.tokens.is_next_content(TokenKind::Operator, "=") {
            self.tokens.next()?;
            Some(self.parse_expression()?)
        } else if is_function_shorthand {
            let function = self.parse_function_core(true)?;
            Some(Expression::new(
                ExpressionKind::Function(Rc::new(function)),
                self.loc(&name_token),
            ))
        } else {
            None
        };
        if self.scopes.current_scope_has_variable(&name_token.content) {
            return Err(error_at(
                &name_token,
                format!(
                    "Variable \"{}\" has already been declared within the same lexical scope",
                    name_token.content
                ),
            ));
        }
        self.scopes.add_variable(&name_token.content);
        Ok(OneVariableDeclaration {
            location: self.loc(&name_token),
            variable_name: name_token.content,
            variable_type,
            initial_value,
        })
    }

    fn parse_statement(&mut self) -> Result<Statement, WtcdError> {
        if self.tokens.is_next_content(TokenKind::Keyword, "declare") {
            return self.parse_declaration();
        }
        if self.tokens.is_next_content(TokenKind::Keyword, "return") {
            return self.parse_register_statement(RegisterName::Return);
        }
        if self.tokens.is_next_content(TokenKind::Keyword, "yield") {
            return self.parse_register_statement(RegisterName::Yield);
        }
        if self.tokens.is_next_content(TokenKind::Keyword, "break") {
            return self.parse_register_statement(RegisterName::Break);
        }
        if self.tokens.is_next_content(TokenKind::Keyword, "continue") {
            let token = self.tokens.next()?;
            return Ok(Statement::new(StatementKind::Continue, self.loc(&token)));
        }
        let location = self.peek_loc();
        let expression = self.parse_expression()?;
        Ok(Statement::new(
            StatementKind::Expression { expression },
            location,
        ))
    }

    /// `yield`, `return` and `break`, each with an optional `= expr` form that
    /// only sets the register.
    fn parse_register_statement(&mut self, register: RegisterName) -> Result<Statement, WtcdError> {
        let token = self
            .tokens
            .assert_and_skip_content(TokenKind::Keyword, register.as_str())?;
        if !self.scopes.has_register(register) {
            return Err(error_at(
                &token,
                format!("Cannot locate lexical scope for {register} register"),
            ));
        }
        let location = self.loc(&token);
        let kind = if self.tokens.is_next_content(TokenKind::Operator, "=") {
            self.tokens.next()?;
            let value = self.parse_expression()?;
            match register {
                RegisterName::Yield => StatementKind::SetYield { value },
                RegisterName::Return => StatementKind::SetReturn { value },
                RegisterName::Break => StatementKind::SetBreak { value },
            }
        } else {
            let value = match self.try_parse_atom()? {
                Some(atom) => self.parse_infix(atom, 0, PRECEDENCE_UNBOUNDED)?,
                None => Expression::new(ExpressionKind::NullLiteral, location),
            };
            match register {
                RegisterName::Yield => StatementKind::Yield { value },
                RegisterName::Return => StatementKind::Return { value },
                RegisterName::Break => StatementKind::Break { value },
            }
        };
        Ok(Statement::new(kind, location))
    }

    pub fn parse_expression(&mut self) -> Result<Expression, WtcdError> {
        let atom = self.parse_atom()?;
        self.parse_infix(atom, 0, PRECEDENCE_UNBOUNDED)
    }

    /// Precedence climbing. An operator binds to `left` only when its
    /// precedence is above `min`; conditionals additionally stay at or below `max`.
    fn parse_infix(
        &mut self,
        mut left: Expression,
        min: u8,
        max: u8,
    ) -> Result<Expression, WtcdError> {
        loop {
            let Some(token) = self.tokens.peek() else {
                return Ok(left);
            };
            if token.kind != TokenKind::Operator {
                return Ok(left);
            }
            let binary = BinaryOperator::from_symbol(&token.content);
            let is_conditional = token.content == "?";
            let precedence = match binary {
                Some(operator) => operator.precedence(),
                None if is_conditional => CONDITIONAL_OPERATOR_PRECEDENCE,
                None => return Ok(left),
            };
            if precedence <= min || (is_conditional && precedence > max) {
                return Ok(left);
            }
            let operator_token = self.tokens.next()?;
            let location = self.loc(&operator_token);
            left = match binary {
                None => {
                    let then = self.parse_expression()?;
                    self.tokens
                        .assert_and_skip_content(TokenKind::Operator, ":")?;
                    let atom = self.parse_atom()?;
                    let otherwise = self.parse_infix(atom, min, precedence)?;
                    Expression::new(
                        ExpressionKind::Conditional {
                            condition: Box::new(left),
                            then: Box::new(then),
                            otherwise: Box::new(otherwise),
                        },
                        location,
                    )
                }
                Some(operator) => {
                    let atom = self.parse_atom()?;
                    let right = self.parse_infix(atom, precedence, max)?;
                    Expression::new(
                        ExpressionKind::Binary {
                            operator,
                            arg0: Box::new(left),
                            arg1: Box::new(right),
                        },
                        location,
                    )
                }
            };
        }
    }

    fn parse_atom(&mut self) -> Result<Expression, WtcdError> {
        match self.try_parse_atom()? {
            Some(atom) => Ok(atom),
            None => Err(self.tokens.unexpected_next(Some("atom"))),
        }
    }

    /// `Ok(None)` when the next token cannot start an atom.
    fn try_parse_atom(&mut self) -> Result<Option<Expression>, WtcdError> {
        let Some(token) = self.tokens.peek() else {
            return Ok(None);
        };
        let kind = token.kind;
        let content = token.content.clone();
        let location = self.loc(token);

        let expression = match (kind, content.as_str()) {
            (TokenKind::Number, _) => {
                let token = self.tokens.next()?;
                let value = content
                    .parse::<f64>()
                    .map_err(|_| error_at(&token, format!("Invalid number {content}")))?;
                Expression::new(ExpressionKind::NumberLiteral { value }, location)
            }
            (TokenKind::String, _) => {
                self.tokens.next()?;
                Expression::new(ExpressionKind::StringLiteral { value: content }, location)
            }
            (TokenKind::Keyword, "true" | "false") => {
                self.tokens.next()?;
                Expression::new(
                    ExpressionKind::BooleanLiteral {
                        value: content == "true",
                    },
                    location,
                )
            }
            (TokenKind::Keyword, "null") => {
                self.tokens.next()?;
                Expression::new(ExpressionKind::NullLiteral, location)
            }
            (TokenKind::Keyword, "selection") => {
                self.tokens.next()?;
                let choices = self.parse_expression()?;
                Expression::new(
                    ExpressionKind::Selection {
                        choices: Box::new(choices),
                    },
                    location,
                )
            }
            (TokenKind::Keyword, "choice") => {
                self.tokens.next()?;
                let text = self.parse_expression()?;
                let action = self.parse_expression()?;
                Expression::new(
                    ExpressionKind::Choice {
                        text: Box::new(text),
                        action: Box::new(action),
                    },
                    location,
                )
            }
            (TokenKind::Keyword, "goto") => {
                self.tokens.next()?;
                let sections = self.parse_goto_targets()?;
                Expression::new(ExpressionKind::GotoAction { sections }, location)
            }
            (TokenKind::Keyword, "exit") => {
                self.tokens.next()?;
                Expression::new(ExpressionKind::ExitAction, location)
            }
            (TokenKind::Punctuation, "(") => {
                self.tokens.next()?;
                let inner = self.parse_expression()?;
                self.tokens
                    .assert_and_skip_content(TokenKind::Punctuation, ")")?;
                inner
            }
            (TokenKind::Punctuation, "[") => self.parse_list()?,
            (TokenKind::Keyword, "function") => {
                self.tokens.next()?;
                let function = self.parse_function_core(true)?;
                Expression::new(ExpressionKind::Function(Rc::new(function)), location)
            }
            (TokenKind::Punctuation, "$") => {
                self.tokens.next()?;
                let function = self.parse_function_core(false)?;
                Expression::new(ExpressionKind::Function(Rc::new(function)), location)
            }
            (TokenKind::Keyword, "switch") => {
                self.tokens.next()?;
                let subject = self.parse_expression()?;
                self.parse_switch_cases(subject, location)?
            }
            (TokenKind::Keyword, "while" | "do") => self.parse_while(location)?,
            (TokenKind::Keyword, "if") => {
                self.tokens.next()?;
                let condition = self.parse_expression()?;
                let then = self.parse_expression()?;
                let otherwise = if self.tokens.is_next_content(TokenKind::Keyword, "else") {
                    self.tokens.next()?;
                    Some(Box::new(self.parse_expression()?))
                } else {
                    None
                };
                Expression::new(
                    ExpressionKind::If {
                        condition: Box::new(condition),
                        then: Box::new(then),
                        otherwise,
                    },
                    location,
                )
            }
            (TokenKind::Tag, _) => {
                self.tokens.next()?;
                Expression::new(ExpressionKind::Tag { name: content }, location)
            }
            (TokenKind::Punctuation, "{") => self.parse_block(location)?,
            (TokenKind::Identifier, _) => {
                let token = self.tokens.next()?;
                if !self.scopes.has_variable_reference(&content) {
                    return Err(error_at(
                        &token,
                        format!("Cannot locate lexical scope for variable \"{content}\""),
                    ));
                }
                Expression::new(
                    ExpressionKind::VariableReference {
                        variable_name: content,
                    },
                    location,
                )
            }
            (TokenKind::Operator, _) => {
                let token = self.tokens.next()?;
                let Some(operator) = UnaryOperator::from_symbol(&content) else {
                    return Err(error_at(&token, format!("Invalid unary operator: {content}")));
                };
                let atom = self.parse_atom()?;
                let arg = self.parse_infix(atom, UNARY_OPERATOR_PRECEDENCE, PRECEDENCE_UNBOUNDED)?;
                Expression::new(
                    ExpressionKind::Unary {
                        operator,
                        arg: Box::new(arg),
                    },
                    location,
                )
            }
            _ => return Ok(None),
        };
        Ok(Some(expression))
    }

    fn parse_goto_targets(&mut self) -> Result<Vec<String>, WtcdError> {
        if !self.tokens.is_next_content(TokenKind::Punctuation, "[") {
            return Ok(vec![self.parse_section_name()?]);
        }
        self.tokens.next()?;
        let mut sections = Vec::new();
        // `goto []` is allowed.
        while !self.tokens.is_next_content(TokenKind::Punctuation, "]") {
            sections.push(self.parse_section_name()?);
        }
        self.tokens.next()?;
        Ok(sections)
    }

    fn parse_section_name(&mut self) -> Result<String, WtcdError> {
        let token = self.tokens.assert_and_skip(TokenKind::Identifier)?;
        let name = token.content.clone();
        self.goto_targets.push(token);
        Ok(name)
    }

    fn parse_list(&mut self) -> Result<Expression, WtcdError> {
        let bracket = self
            .tokens
            .assert_and_skip_content(TokenKind::Punctuation, "[")?;
        let mut elements = Vec::new();
        while !self.tokens.is_next_content(TokenKind::Punctuation, "]") {
            if self.tokens.is_next_content(TokenKind::Operator, "...") {
                let spread = self.tokens.next()?;
                elements.push(ListElement::Spread {
                    expression: self.parse_expression()?,
                    location: self.loc(&spread),
                });
            } else {
                elements.push(ListElement::Item {
                    expression: self.parse_expression()?,
                });
            }
        }
        self.tokens
            .assert_and_skip_content(TokenKind::Punctuation, "]")?;
        Ok(Expression::new(
            ExpressionKind::List { elements },
            self.loc(&bracket),
        ))
    }

    fn parse_block(&mut self, location: Option<SourceLocation>) -> Result<Expression, WtcdError> {
        self.tokens
            .assert_and_skip_content(TokenKind::Punctuation, "{")?;
        self.scopes.enter_scope();
        self.scopes.add_register(RegisterName::Yield);
        let mut statements = Vec::new();
        while !self.tokens.is_next_content(TokenKind::Punctuation, "}") {
            statements.push(self.parse_statement()?);
        }
        self.scopes.exit_scope();
        self.tokens
            .assert_and_skip_content(TokenKind::Punctuation, "}")?;
        Ok(Expression::new(ExpressionKind::Block { statements }, location))
    }

    fn parse_while(&mut self, location: Option<SourceLocation>) -> Result<Expression, WtcdError> {
        self.scopes.enter_scope();
        self.scopes.add_register(RegisterName::Break);
        let pre_expr = if self.tokens.is_next_content(TokenKind::Keyword, "do") {
            self.tokens.next()?;
            Some(Box::new(self.parse_expression()?))
        } else {
            None
        };
        self.tokens
            .assert_and_skip_content(TokenKind::Keyword, "while")?;
        let condition = Box::new(self.parse_expression()?);
        let post_expr = if pre_expr.is_none() {
            Some(Box::new(self.parse_expression()?))
        } else if self.tokens.is_next_content(TokenKind::Keyword, "then") {
            self.tokens.next()?;
            Some(Box::new(self.parse_expression()?))
        } else {
            None
        };
        self.scopes.exit_scope();
        Ok(Expression::new(
            ExpressionKind::While {
                pre_expr,
                condition,
                post_expr,
            },
            location,
        ))
    }

    /// `[matches returns ...]`; a trailing lone expression is the default case.
    fn parse_switch_cases(
        &mut self,
        subject: Expression,
        location: Option<SourceLocation>,
    ) -> Result<Expression, WtcdError> {
        self.tokens
            .assert_and_skip_content(TokenKind::Punctuation, "[")?;
        let mut cases = Vec::new();
        let mut default_case = None;
        while !self.tokens.is_next_content(TokenKind::Punctuation, "]") {
            let matches = self.parse_expression()?;
            if self.tokens.is_next_content(TokenKind::Punctuation, "]") {
                default_case = Some(Box::new(matches));
                break;
            }
            let returns = self.parse_expression()?;
            cases.push(SwitchCase { matches, returns });
        }
        self.tokens
            .assert_and_skip_content(TokenKind::Punctuation, "]")?;
        Ok(Expression::new(
            ExpressionKind::Switch {
                expression: Box::new(subject),
                cases,
                default_case,
            },
            location,
        ))
    }

    fn parse_function_core(&mut self, is_full: bool) -> Result<FunctionExpression, WtcdError> {
        self.scopes.enter_function_scope();
        let parts = self.parse_function_parts(is_full);
        let captures = self.scopes.exit_function_scope();
        let (arguments, rest_arg_name, expression) = parts?;
        Ok(FunctionExpression {
            arguments,
            rest_arg_name,
            captures,
            expression,
        })
    }

    fn parse_function_parts(
        &mut self,
        is_full: bool,
    ) -> Result<(Vec<FunctionArgument>, Option<String>, Expression), WtcdError> {
        let mut arguments = Vec::new();
        let mut rest_arg_name = None;
        let mut body = None;
        if is_full || self.tokens.is_next_content(TokenKind::Punctuation, "[") {
            if self.tokens.is_next_content(TokenKind::Keyword, "switch") {
                let switch_token = self.tokens.next()?;
                let location = self.loc(&switch_token);
                arguments.push(FunctionArgument {
                    name: "$switch".to_string(),
                    types: None,
                    default_value: None,
                    location,
                });
                let subject = Expression::new(
                    ExpressionKind::VariableReference {
                        variable_name: "$switch".to_string(),
                    },
                    location,
                );
                body = Some(self.parse_switch_cases(subject, location)?);
            } else {
                self.tokens
                    .assert_and_skip_content(TokenKind::Punctuation, "[")?;
                let mut used_names = HashSet::new();
                while !self.tokens.is_next_content(TokenKind::Punctuation, "]") {
                    if self.tokens.is_next_content(TokenKind::Operator, "...") {
                        self.tokens.next()?;
                        let rest_token = self.tokens.assert_and_skip(TokenKind::Identifier)?;
                        if used_names.contains(&rest_token.content) {
                            return Err(error_at(
                                &rest_token,
                                format!("Argument \"{}\" already existed.", rest_token.content),
                            ));
                        }
                        rest_arg_name = Some(rest_token.content);
                        break;
                    }
                    let types = self.parse_variable_type()?;
                    let name_token = self.tokens.assert_and_skip(TokenKind::Identifier)?;
                    if !used_names.insert(name_token.content.clone()) {
                        return Err(error_at(
                            &name_token,
                            format!("Argument \"{}\" already existed.", name_token.content),
                        ));
                    }
                    let default_value = if self.tokens.is_next_content(TokenKind::Operator, "=") {
                        self.tokens.next()?;
                        Some(self.parse_expression()?)
                    } else {
                        None
                    };
                    arguments.push(FunctionArgument {
                        location: self.loc(&name_token),
                        name: name_token.content,
                        types,
                        default_value,
                    });
                }
                self.tokens
                    .assert_and_skip_content(TokenKind::Punctuation, "]")?;
            }
        }
        for argument in &arguments {
            self.scopes.add_variable(&argument.name);
        }
        if let Some(rest) = &rest_arg_name {
            self.scopes.add_variable(rest);
        }
        let expression = match body {
            Some(body) => body,
            None => self.parse_expression()?,
        };
        Ok((arguments, rest_arg_name, expression))
    }
}

#[cfg(test)]
mod parser_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> ParsedLogic {
        LogicParser::new(source, true)
            .and_then(LogicParser::parse)
            .unwrap_or_else(|error| panic!("parse failed: {}", error.message))
    }

    fn parse_error(source: &str) -> String {
        match LogicParser::new(source, true).and_then(LogicParser::parse) {
            Ok(_) => panic!("expected parse error for {source:?}"),
            Err(error) => error.message,
        }
    }

    fn first_initializer(parsed: &ParsedLogic) -> &Expression {
        let StatementKind::Declaration { declarations } = &parsed.root.init_statements[0].kind
        else {
            panic!("expected declaration");
        };
        declarations[0]
            .initial_value
            .as_ref()
            .expect("initializer")
    }

    /// Compact rendering of an expression tree for shape assertions.
    fn shape(expression: &Expression) -> String {
        match &expression.kind {
            ExpressionKind::NumberLiteral { value } => value.to_string(),
            ExpressionKind::BooleanLiteral { value } => value.to_string(),
            ExpressionKind::StringLiteral { value } => format!("{value:?}"),
            ExpressionKind::NullLiteral => "null".to_string(),
            ExpressionKind::VariableReference { variable_name } => variable_name.clone(),
            ExpressionKind::Binary {
                operator,
                arg0,
                arg1,
            } => format!("({} {operator} {})", shape(arg0), shape(arg1)),
            ExpressionKind::Unary { operator, arg } => format!("({operator}{})", shape(arg)),
            ExpressionKind::Conditional {
                condition,
                then,
                otherwise,
            } => format!(
                "({} ? {} : {})",
                shape(condition),
                shape(then),
                shape(otherwise)
            ),
            other => format!("<{other:?}>"),
        }
    }

    #[test]
    fn minimal_document() {
        let parsed = parse("WTCD 1.3\ndeclare number a = 1\nsection s then exit");
        assert_eq!(parsed.root.version, WtcdVersion { major: 1, minor: 3 });
        assert_eq!(parsed.root.init_statements.len(), 1);
        assert_eq!(parsed.root.sections.len(), 1);
        assert_eq!(parsed.root.sections[0].name, "s");
        assert_eq!(
            parsed.root.sections[0].then.kind,
            ExpressionKind::ExitAction
        );
        assert!(parsed.root_declarations.contains("a"));
    }

    #[test]
    fn binary_precedence_and_associativity() {
        let parsed = parse("WTCD 1.3 declare a = 1 + 2 * 3 ** 2 - -4 == 5 && !false");
        assert_eq!(
            shape(first_initializer(&parsed)),
            "((((1 + (2 * (3 ** 2))) - (-4)) == 5) && (!false))"
        );
        let parsed = parse("WTCD 1.3 declare a = 10 - 4 - 3");
        assert_eq!(shape(first_initializer(&parsed)), "((10 - 4) - 3)");
    }

    #[test]
    fn conditional_is_right_associative_and_binds_loosely() {
        let parsed = parse("WTCD 1.3 declare a = true ? 1 : false ? 2 : 3 + 4");
        assert_eq!(
            shape(first_initializer(&parsed)),
            "(true ? 1 : (false ? 2 : (3 + 4)))"
        );
        let parsed = parse("WTCD 1.3 declare [b = 1 a = b = true ? 1 : 2]");
        let StatementKind::Declaration { declarations } = &parsed.root.init_statements[0].kind
        else {
            panic!("expected declaration");
        };
        assert_eq!(
            shape(declarations[1].initial_value.as_ref().expect("init")),
            "(b = (true ? 1 : 2))"
        );
    }

    #[test]
    fn unary_binds_below_member_access() {
        let parsed = parse("WTCD 1.3 declare l = [1] declare a = -l . 0");
        let StatementKind::Declaration { declarations } = &parsed.root.init_statements[1].kind
        else {
            panic!("expected declaration");
        };
        assert_eq!(
            shape(declarations[0].initial_value.as_ref().expect("init")),
            "(-(l . 0))"
        );
    }

    #[test]
    fn functions_record_captures_and_arguments() {
        let parsed = parse(
            "WTCD 1.3 declare number base = 1 \
             declare function add [number x = 2 y ...rest] base + x + listLength::[rest]",
        );
        let err = parse_error("WTCD 1.3 declare f = function [x x] x");
        assert_eq!(err, "Argument \"x\" already existed. at 1:34.");

        let ExpressionKind::Function(function) = &first_initializer_at(&parsed, 1).kind else {
            panic!("expected function");
        };
        assert_eq!(
            function
                .arguments
                .iter()
                .map(|argument| argument.name.as_str())
                .collect::<Vec<_>>(),
            vec!["x", "y"]
        );
        assert_eq!(function.arguments[0].types, Some(vec![ValueType::Number]));
        assert!(function.arguments[0].default_value.is_some());
        assert_eq!(function.rest_arg_name.as_deref(), Some("rest"));
        assert_eq!(function.captures, vec!["base", "listLength"]);
    }

    fn first_initializer_at(parsed: &ParsedLogic, index: usize) -> &Expression {
        let StatementKind::Declaration { declarations } = &parsed.root.init_statements[index].kind
        else {
            panic!("expected declaration");
        };
        declarations[0]
            .initial_value
            .as_ref()
            .expect("initializer")
    }

    #[test]
    fn function_switch_sugar_builds_switch_on_implicit_argument() {
        let parsed = parse("WTCD 1.3 declare function pick switch [ [1] \"one\" \"other\" ]");
        let ExpressionKind::Function(function) = &first_initializer(&parsed).kind else {
            panic!("expected function");
        };
        assert_eq!(function.arguments[0].name, "$switch");
        let ExpressionKind::Switch {
            expression,
            cases,
            default_case,
        } = &function.expression.kind
        else {
            panic!("expected switch");
        };
        assert_eq!(shape(expression), "$switch");
        assert_eq!(cases.len(), 1);
        assert_eq!(shape(default_case.as_ref().expect("default")), "\"other\"");
    }

    #[test]
    fn short_functions_take_optional_parameter_lists() {
        let parsed = parse("WTCD 1.3 declare [f = $ 1 g = $[a] a]");
        let StatementKind::Declaration { declarations } = &parsed.root.init_statements[0].kind
        else {
            panic!("expected declaration");
        };
        for (declaration, arity) in declarations.iter().zip([0, 1]) {
            let Some(Expression {
                kind: ExpressionKind::Function(function),
                ..
            }) = &declaration.initial_value
            else {
                panic!("expected function");
            };
            assert_eq!(function.arguments.len(), arity);
        }
    }

    #[test]
    fn loops_blocks_and_registers() {
        let parsed = parse(
            "WTCD 1.3 declare n = { declare number i = 0 \
             while i < 3 { i += 1 if i == 2 { continue } } \
             do i += 1 while i < 10 then { break = i } \
             yield i }",
        );
        let ExpressionKind::Block { statements } = &first_initializer(&parsed).kind else {
            panic!("expected block");
        };
        assert_eq!(statements.len(), 4);
        let StatementKind::Expression { expression } = &statements[2].kind else {
            panic!("expected expression statement");
        };
        let ExpressionKind::While {
            pre_expr,
            post_expr,
            ..
        } = &expression.kind
        else {
            panic!("expected while");
        };
        assert!(pre_expr.is_some());
        assert!(post_expr.is_some());
        assert!(matches!(statements[3].kind, StatementKind::Yield { .. }));
    }

    #[test]
    fn bare_register_statements_imply_null() {
        let parsed = parse("WTCD 1.3 declare f = function [] { return }");
        let ExpressionKind::Function(function) = &first_initializer(&parsed).kind else {
            panic!("expected function");
        };
        let ExpressionKind::Block { statements } = &function.expression.kind else {
            panic!("expected block");
        };
        let StatementKind::Return { value } = &statements[0].kind else {
            panic!("expected return");
        };
        assert_eq!(value.kind, ExpressionKind::NullLiteral);
    }

    #[test]
    fn selection_choices_goto_and_spread() {
        let parsed = parse(
            "WTCD 1.3 declare extra = [] \
             section a then selection [choice \"go\" goto b ...extra choice \"stay\" null] \
             section b then goto [a b]",
        );
        let ExpressionKind::Selection { choices } = &parsed.root.sections[0].then.kind else {
            panic!("expected selection");
        };
        let ExpressionKind::List { elements } = &choices.kind else {
            panic!("expected list");
        };
        assert_eq!(elements.len(), 3);
        assert!(matches!(elements[1], ListElement::Spread { .. }));
        assert_eq!(
            parsed.root.sections[1].then.kind,
            ExpressionKind::GotoAction {
                sections: vec!["a".to_string(), "b".to_string()]
            }
        );
    }

    #[test]
    fn selection_type_keyword_maps_to_action() {
        let parsed = parse("WTCD 1.0 declare selection s = exit");
        let StatementKind::Declaration { declarations } = &parsed.root.init_statements[0].kind
        else {
            panic!("expected declaration");
        };
        assert_eq!(declarations[0].variable_type, Some(vec![ValueType::Action]));
    }

    #[test]
    fn source_map_can_be_disabled() {
        let parsed = LogicParser::new("WTCD 1.3 section s then exit", false)
            .and_then(LogicParser::parse)
            .expect("parse");
        assert_eq!(parsed.root.sections[0].location, None);
        assert_eq!(parsed.root.sections[0].then.location, None);
        let parsed = parse("WTCD 1.3\nsection s then exit");
        assert_eq!(
            parsed.root.sections[0].then.location,
            Some(SourceLocation::new(2, 16))
        );
    }

    #[test]
    fn reports_parse_errors_with_positions() {
        assert_eq!(
            parse_error("WTCD 1.3 section a then goto b"),
            "Unknown section \"b\" at 1:30."
        );
        assert_eq!(
            parse_error("WTCD 1.3 section a then exit section a then exit"),
            "Cannot redefine section \"a\" at 1:38."
        );
        assert_eq!(
            parse_error("WTCD 1.3 declare a = b"),
            "Cannot locate lexical scope for variable \"b\" at 1:22."
        );
        assert_eq!(
            parse_error("WTCD 1.3 declare a = 1 declare a = 2"),
            "Variable \"a\" has already been declared within the same lexical scope at 1:32."
        );
        assert_eq!(
            parse_error("WTCD 1.3 declare a = { break }"),
            "Cannot locate lexical scope for break register at 1:24."
        );
        assert_eq!(
            parse_error("WTCD 1.3 declare []"),
            "Unexpected token punctuation \"]\", expecting at least one element at 1:19."
        );
        assert_eq!(
            parse_error("WTCD 1.3 goto"),
            "Unexpected token keyword \"goto\", expecting keyword \"declare\" or \"section\" at 1:10."
        );
        assert_eq!(
            parse_error("WTCD 1.3 declare a = ?"),
            "Invalid unary operator: ? at 1:22."
        );
        assert_eq!(
            parse_error("WTCD 1.3 declare a = )"),
            "Unexpected token punctuation \")\", expecting atom at 1:22."
        );
        assert_eq!(parse_error("WTCD 1"), "Invalid WTCD version 1 at 1:6.");
        assert_eq!(
            parse_error("section s then exit"),
            "Unexpected token keyword \"section\", expecting identifier \"WTCD\" at 1:1."
        );
    }
}
