use std::fmt;

use wtcd_core::error::CODE_LEX;
use wtcd_core::{is_known_operator, SourceLocation, WtcdError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    Keyword,
    Operator,
    Punctuation,
    String,
    Number,
    Tag,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TokenKind::Identifier => "identifier",
            TokenKind::Keyword => "keyword",
            TokenKind::Operator => "operator",
            TokenKind::Punctuation => "punctuation",
            TokenKind::String => "string",
            TokenKind::Number => "number",
            TokenKind::Tag => "tag",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub content: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }

    fn describe(&self) -> String {
        format!("{} \"{}\"", self.kind, self.content)
    }
}

pub const KEYWORDS: &[&str] = &[
    "declare",
    "section",
    "then",
    "goto",
    "null",
    "true",
    "false",
    "number",
    "boolean",
    "string",
    "action",
    "choice",
    "selection",
    "yield",
    "exit",
    "function",
    "return",
    "switch",
    "while",
    "do",
    "continue",
    "break",
    "if",
    "else",
    "list",
    // reserved
    "for",
    "in",
    "of",
    "enum",
    "dict",
    "dictionary",
    "const",
    "mixed",
];

const OPERATOR_CHARS: &str = "+-*/^&|=><!?:%~.";
const PUNCTUATION_CHARS: &str = "[](){}$";
const QUOTE_CHARS: &str = "\"'`";

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_identifier_body(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn escape(c: char) -> Option<char> {
    match c {
        'n' => Some('\n'),
        't' => Some('\t'),
        '\'' | '"' | '`' | '\\' => Some(c),
        _ => None,
    }
}

/// Joins `items` as an english list: `a`, `a or b`, `a, b, or c`.
pub fn english_concatenation(items: &[String], relation: &str) -> String {
    match items {
        [] => String::new(),
        [only] => only.clone(),
        [first, second] => format!("{first} {relation} {second}"),
        [init @ .., last] => format!("{}, {relation} {last}", init.join(", ")),
    }
}

/// Character cursor with line breaks normalized to `\n`.
struct CharStream {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
}

impl CharStream {
    fn new(source: &str) -> Self {
        let normalized = source.replace("\r\n", "\n").replace('\r', "\n");
        Self {
            chars: normalized.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn eof(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn next(&mut self) -> Result<char, WtcdError> {
        let Some(c) = self.peek() else {
            return Err(self.unexpected_next(None));
        };
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Ok(c)
    }

    fn error(&self, message: impl AsRef<str>) -> WtcdError {
        WtcdError::at_line_column(CODE_LEX, message, self.line, self.column)
    }

    fn describe_next(&self) -> String {
        match self.peek() {
            None => "<EOF>".to_string(),
            Some('\t') => "<TAB>".to_string(),
            Some('\n') => "<LF>".to_string(),
            Some(c) => format!("\"{c}\""),
        }
    }

    fn unexpected_next(&self, expecting: Option<&str>) -> WtcdError {
        match expecting {
            None => self.error(format!("Unexpected character {}", self.describe_next())),
            Some(expecting) => self.error(format!(
                "Unexpected character {}, expecting {expecting}",
                self.describe_next()
            )),
        }
    }

    fn read_while(&mut self, predicate: impl Fn(char) -> bool) -> Result<String, WtcdError> {
        let mut out = String::new();
        while self.peek().is_some_and(&predicate) {
            out.push(self.next()?);
        }
        Ok(out)
    }
}

/// Pull-based tokenizer. One token of lookahead is always buffered so `peek`
/// never fails; lexical errors surface from `new` and `next`.
pub struct TokenStream {
    chars: CharStream,
    current: Option<Token>,
}

impl TokenStream {
    pub fn new(source: &str) -> Result<Self, WtcdError> {
        let mut stream = Self {
            chars: CharStream::new(source),
            current: None,
        };
        stream.current = stream.read_token()?;
        Ok(stream)
    }

    pub fn peek(&self) -> Option<&Token> {
        self.current.as_ref()
    }

    pub fn eof(&self) -> bool {
        self.current.is_none()
    }

    pub fn next(&mut self) -> Result<Token, WtcdError> {
        let Some(token) = self.current.take() else {
            return Err(WtcdError::at_line_column(
                CODE_LEX,
                "Unexpected <EOF>",
                self.chars.line,
                self.chars.column,
            ));
        };
        self.current = self.read_token()?;
        Ok(token)
    }

    pub fn is_next(&self, kind: TokenKind) -> bool {
        self.peek().is_some_and(|token| token.kind == kind)
    }

    pub fn is_next_content(&self, kind: TokenKind, content: &str) -> bool {
        self.peek()
            .is_some_and(|token| token.kind == kind && token.content == content)
    }

    pub fn is_next_any(&self, kind: TokenKind, contents: &[&str]) -> bool {
        self.peek().is_some_and(|token| {
            token.kind == kind && contents.iter().any(|content| token.content == *content)
        })
    }

    pub fn assert_next_any(&self, kind: TokenKind, contents: &[&str]) -> Result<(), WtcdError> {
        if self.is_next_any(kind, contents) {
            return Ok(());
        }
        let quoted = contents
            .iter()
            .map(|content| format!("\"{content}\""))
            .collect::<Vec<_>>();
        Err(self.unexpected_next(Some(&format!(
            "{kind} {}",
            english_concatenation(&quoted, "or")
        ))))
    }

    pub fn assert_and_skip(&mut self, kind: TokenKind) -> Result<Token, WtcdError> {
        if !self.is_next(kind) {
            return Err(self.unexpected_next(Some(&kind.to_string())));
        }
        self.next()
    }

    pub fn assert_and_skip_content(
        &mut self,
        kind: TokenKind,
        content: &str,
    ) -> Result<Token, WtcdError> {
        if !self.is_next_content(kind, content) {
            return Err(self.unexpected_next(Some(&format!("{kind} \"{content}\""))));
        }
        self.next()
    }

    pub fn unexpected_next(&self, expecting: Option<&str>) -> WtcdError {
        let Some(token) = self.peek() else {
            return self.chars.unexpected_next(expecting);
        };
        let message = match expecting {
            None => format!("Unexpected token {}", token.describe()),
            Some(expecting) => {
                format!("Unexpected token {}, expecting {expecting}", token.describe())
            }
        };
        WtcdError::at_line_column(CODE_LEX, message, token.line, token.column)
    }

    fn skip_comment(&mut self) -> Result<(), WtcdError> {
        self.chars.next()?;
        match self.chars.peek() {
            Some('*') => {
                self.chars.next()?;
                loop {
                    while self.chars.peek() != Some('*') {
                        self.chars.next()?;
                    }
                    self.chars.next()?;
                    if self.chars.next()? == '/' {
                        return Ok(());
                    }
                }
            }
            Some('/') => {
                while !self.chars.eof() && self.chars.peek() != Some('\n') {
                    self.chars.next()?;
                }
                if !self.chars.eof() {
                    self.chars.next()?;
                }
                Ok(())
            }
            _ => Err(self.chars.error("Unknown comment type.")),
        }
    }

    fn read_number(&mut self) -> Result<String, WtcdError> {
        let first = self.chars.next()?;
        let mut number = first.to_string();
        let mut dot = first == '.';
        while let Some(c) = self.chars.peek() {
            if !(c.is_ascii_digit() || c == '.') {
                break;
            }
            if c == '.' {
                if dot {
                    return Err(self.chars.unexpected_next(Some("number")));
                }
                dot = true;
            }
            number.push(self.chars.next()?);
        }
        Ok(number)
    }

    fn read_string(&mut self) -> Result<String, WtcdError> {
        let quote = self.chars.next()?;
        let mut out = String::new();
        while self.chars.peek() != Some(quote) {
            if self.chars.eof() {
                return Err(self.chars.unexpected_next(Some(&quote.to_string())));
            }
            let c = self.chars.next()?;
            if c != '\\' {
                out.push(c);
                continue;
            }
            let Some(escaped) = self.chars.peek().and_then(escape) else {
                return Err(self.chars.error(format!(
                    "Unescapable character {}",
                    self.chars.describe_next()
                )));
            };
            out.push(escaped);
            self.chars.next()?;
        }
        self.chars.next()?;
        Ok(out)
    }

    fn read_token(&mut self) -> Result<Option<Token>, WtcdError> {
        loop {
            while matches!(self.chars.peek(), Some(' ' | '\t' | '\n')) {
                self.chars.next()?;
            }
            let Some(c) = self.chars.peek() else {
                return Ok(None);
            };
            if c == '/' && matches!(self.chars.peek_at(1), Some('/' | '*')) {
                self.skip_comment()?;
                continue;
            }

            let line = self.chars.line;
            let column = self.chars.column;
            let (kind, content) = if is_identifier_start(c) {
                let identifier = self.chars.read_while(is_identifier_body)?;
                let kind = if KEYWORDS.contains(&identifier.as_str()) {
                    TokenKind::Keyword
                } else {
                    TokenKind::Identifier
                };
                (kind, identifier)
            } else if c.is_ascii_digit()
                || (c == '.' && self.chars.peek_at(1).is_some_and(|n| n.is_ascii_digit()))
            {
                (TokenKind::Number, self.read_number()?)
            } else if OPERATOR_CHARS.contains(c) {
                let operator = self.chars.read_while(|c| OPERATOR_CHARS.contains(c))?;
                if !is_known_operator(&operator) {
                    return Err(WtcdError::at_line_column(
                        CODE_LEX,
                        format!("Unknown operator: \"{operator}\""),
                        line,
                        column,
                    ));
                }
                (TokenKind::Operator, operator)
            } else if PUNCTUATION_CHARS.contains(c) {
                (TokenKind::Punctuation, self.chars.next()?.to_string())
            } else if QUOTE_CHARS.contains(c) {
                (TokenKind::String, self.read_string()?)
            } else if c == '#' {
                self.chars.next()?;
                (TokenKind::Tag, self.chars.read_while(is_identifier_body)?)
            } else {
                return Err(self.chars.unexpected_next(None));
            };
            return Ok(Some(Token {
                kind,
                content,
                line,
                column,
            }));
        }
    }
}
