//! Marker tokenizer.
//!
//! Scans free-form documentation text and emits tokens only for marker lines: a line whose
//! first non-blank character is `+` immediately followed by a lowercase identifier. All other
//! text is prose and is skipped.
//!
//! ## Design
//!
//! The tokenizer is an explicit state machine. [`Tokenizer::step`] consumes input for the
//! current [`State`], buffers zero or more tokens and returns the next state, or `None` to
//! stop. Tokens are pulled one at a time through the [`Iterator`] impl, so the parser drives
//! scanning. A tokenizer makes a single pass; build a new one to re-scan.
//!
//! On a grammar violation exactly one [`TokenKind::Error`] token carrying the diagnostic is
//! emitted and the tokenizer halts. Nothing follows an `Error` or `End` token.
//!
//! ## Value forms
//!
//! | Form | Example |
//! |------|---------|
//! | bare identifier (implicit `true`) | `+codemark:parser:bool` |
//! | string | `="a\tb"` |
//! | multi-line string | ``=`line one` `` |
//! | bool | `=false` |
//! | int / float / complex | `=0x1F`, `=1.5`, `=3+2i` |
//! | list | `=[1, "two", 3.0]` |

use crate::ast::{is_segment_char, Identifier, Position};
use crate::literal::{classify_number, unquote, Number};
use crate::token::{Token, TokenKind};
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    LineStart,
    Prose,
    Marker,
    Identifier,
    AfterIdentifier,
    Value,
    ListElement,
    AfterListElement,
    AfterValue,
}

#[derive(Debug)]
pub struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
    line: usize,
    column: usize,
    start: usize,
    start_position: Position,
    state: Option<State>,
    tokens: VecDeque<Token>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Tokenizer {
            input,
            pos: 0,
            line: 1,
            column: 1,
            start: 0,
            start_position: Position::new(1, 1),
            state: Some(State::LineStart),
            tokens: VecDeque::new(),
        }
    }

    fn step(&mut self, state: State) -> Option<State> {
        match state {
            State::LineStart => self.line_start(),
            State::Prose => self.prose(),
            State::Marker => self.marker(),
            State::Identifier => self.identifier(),
            State::AfterIdentifier => self.after_identifier(),
            State::Value => self.value(),
            State::ListElement => self.list_element(),
            State::AfterListElement => self.after_list_element(),
            State::AfterValue => self.after_value(),
        }
    }

    fn line_start(&mut self) -> Option<State> {
        while matches!(self.peek(), Some(' ') | Some('\t')) {
            self.bump();
        }
        match self.peek() {
            None => self.end(),
            Some('+') if self.peek_nth(1).is_some_and(|c| c.is_ascii_lowercase()) => {
                Some(State::Marker)
            }
            Some(_) => Some(State::Prose),
        }
    }

    fn prose(&mut self) -> Option<State> {
        while let Some(c) = self.bump() {
            if c == '\n' {
                break;
            }
        }
        Some(State::LineStart)
    }

    fn marker(&mut self) -> Option<State> {
        self.mark();
        self.bump();
        self.emit(TokenKind::Plus);
        Some(State::Identifier)
    }

    fn identifier(&mut self) -> Option<State> {
        self.mark();
        while self.peek().is_some_and(|c| is_segment_char(c) || c == ':') {
            self.bump();
        }
        if let Err(e) = Identifier::parse(self.current_text()) {
            return self.error(e);
        }
        self.emit(TokenKind::Ident);
        Some(State::AfterIdentifier)
    }

    fn after_identifier(&mut self) -> Option<State> {
        match self.peek() {
            Some('=') => {
                self.mark();
                self.bump();
                self.emit(TokenKind::Assign);
                Some(State::Value)
            }
            None | Some('\n') => self.implicit_true(),
            Some('\r') if self.peek_nth(1) == Some('\n') => self.implicit_true(),
            Some(c) => self.error(format!(
                "unexpected character '{}' after marker identifier; expected '=' or end of line",
                c
            )),
        }
    }

    /// A bare identifier means `=true`.
    fn implicit_true(&mut self) -> Option<State> {
        self.mark();
        self.emit_text(TokenKind::Assign, "=");
        self.emit_text(TokenKind::Bool, "true");
        Some(State::AfterValue)
    }

    fn value(&mut self) -> Option<State> {
        match self.peek() {
            Some('[') => {
                self.mark();
                self.bump();
                self.emit(TokenKind::ListOpen);
                Some(State::ListElement)
            }
            Some('`') => self.raw_string(),
            _ => self.scalar(State::AfterValue),
        }
    }

    fn list_element(&mut self) -> Option<State> {
        match self.peek() {
            Some(' ') | Some('\t') => {
                self.error("unexpected whitespace before list element".to_string())
            }
            Some(']') => self.error("expected a list element, found ']'".to_string()),
            Some('[') => self.error("nested lists are not allowed".to_string()),
            Some('`') => {
                self.error("multi-line strings are not allowed inside lists".to_string())
            }
            _ => self.scalar(State::AfterListElement),
        }
    }

    fn after_list_element(&mut self) -> Option<State> {
        match self.peek() {
            Some(',') => {
                self.mark();
                self.bump();
                self.emit(TokenKind::Comma);
                if self.peek() != Some(' ') {
                    return self.error("',' in a list must be followed by a single space".to_string());
                }
                self.bump();
                Some(State::ListElement)
            }
            Some(']') => {
                self.mark();
                self.bump();
                self.emit(TokenKind::ListClose);
                Some(State::AfterValue)
            }
            Some(' ') | Some('\t') => {
                self.error("unexpected whitespace after list element".to_string())
            }
            None | Some('\n') | Some('\r') => self.error("unterminated list".to_string()),
            Some(c) => self.error(format!("unexpected character '{}' in list", c)),
        }
    }

    fn after_value(&mut self) -> Option<State> {
        match self.peek() {
            None => self.end(),
            Some('\n') => {
                self.bump();
                Some(State::LineStart)
            }
            Some('\r') if self.peek_nth(1) == Some('\n') => {
                self.bump();
                self.bump();
                Some(State::LineStart)
            }
            Some(c) => self.error(format!(
                "unexpected character '{}' after value; only a newline may follow",
                c
            )),
        }
    }

    /// Single-line scalar: string, bool or number. `next` is the state after a success.
    fn scalar(&mut self, next: State) -> Option<State> {
        match self.peek() {
            Some('"') => self.string(next),
            Some('t') | Some('f') => self.boolean(next),
            Some(c) if c.is_ascii_digit() || matches!(c, '-' | '+' | '.') => self.number(next),
            None | Some('\n') | Some('\r') => self.error("missing value".to_string()),
            Some(c) => self.error(format!("unexpected character '{}' at start of value", c)),
        }
    }

    fn string(&mut self, next: State) -> Option<State> {
        self.mark();
        self.bump();
        loop {
            match self.peek() {
                None | Some('\n') => return self.error("unterminated string literal".to_string()),
                Some('\\') => {
                    self.bump();
                    if matches!(self.peek(), None | Some('\n')) {
                        return self.error("unterminated string literal".to_string());
                    }
                    self.bump();
                }
                Some('"') => {
                    self.bump();
                    break;
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
        if let Err(e) = unquote(self.current_text()) {
            return self.error(e);
        }
        self.emit(TokenKind::String);
        Some(next)
    }

    fn raw_string(&mut self) -> Option<State> {
        self.mark();
        self.bump();
        loop {
            match self.bump() {
                None => return self.error("unterminated multi-line string".to_string()),
                Some('`') => break,
                Some(_) => {}
            }
        }
        self.emit(TokenKind::String);
        Some(State::AfterValue)
    }

    fn boolean(&mut self, next: State) -> Option<State> {
        self.mark();
        while self.peek().is_some_and(|c| c.is_ascii_alphanumeric() || c == '_') {
            self.bump();
        }
        match self.current_text() {
            "true" | "false" => {
                self.emit(TokenKind::Bool);
                Some(next)
            }
            other => {
                let msg = format!("invalid value '{}'; expected true or false", other);
                self.error(msg)
            }
        }
    }

    fn number(&mut self, next: State) -> Option<State> {
        self.mark();
        while self
            .peek()
            .is_some_and(|c| !c.is_whitespace() && c != ',' && c != ']')
        {
            self.bump();
        }
        let kind = match classify_number(self.current_text()) {
            Ok(Number::Int(_)) => TokenKind::Int,
            Ok(Number::Float(_)) => TokenKind::Float,
            Ok(Number::Complex(..)) => TokenKind::Complex,
            Err(e) => return self.error(e),
        };
        self.emit(kind);
        Some(next)
    }

    fn end(&mut self) -> Option<State> {
        self.mark();
        self.emit_text(TokenKind::End, "");
        None
    }

    fn error(&mut self, message: String) -> Option<State> {
        tracing::debug!(line = self.start_position.line, column = self.start_position.column, %message, "marker lexical error");
        self.tokens
            .push_back(Token::new(TokenKind::Error, message, self.start_position));
        None
    }

    fn mark(&mut self) {
        self.start = self.pos;
        self.start_position = Position::new(self.line, self.column);
    }

    fn current_text(&self) -> &'a str {
        let input = self.input;
        &input[self.start..self.pos]
    }

    fn emit(&mut self, kind: TokenKind) {
        let text = self.current_text();
        self.emit_text(kind, text);
    }

    fn emit_text(&mut self, kind: TokenKind, text: &str) {
        tracing::trace!(?kind, text, "token");
        self.tokens
            .push_back(Token::new(kind, text, self.start_position));
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        while self.tokens.is_empty() {
            let state = self.state.take()?;
            self.state = self.step(state);
        }
        self.tokens.pop_front()
    }
}

/// Tokenize a whole text eagerly. The last token is always `End` or `Error`.
pub fn tokenize(input: &str) -> Vec<Token> {
    Tokenizer::new(input).collect()
}
