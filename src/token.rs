//! Tokens emitted by the marker tokenizer.

use crate::ast::Position;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    End,
    /// Grammar violation; the token text is the diagnostic.
    Error,
    String,
    Bool,
    Ident,
    Assign,
    Plus,
    ListOpen,
    ListClose,
    Int,
    Float,
    Complex,
    Comma,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenKind::End => "end of input",
            TokenKind::Error => "error",
            TokenKind::String => "string",
            TokenKind::Bool => "bool",
            TokenKind::Ident => "identifier",
            TokenKind::Assign => "'='",
            TokenKind::Plus => "'+'",
            TokenKind::ListOpen => "'['",
            TokenKind::ListClose => "']'",
            TokenKind::Int => "integer",
            TokenKind::Float => "float",
            TokenKind::Complex => "complex",
            TokenKind::Comma => "','",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub position: Position,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, position: Position) -> Self {
        Token {
            kind,
            text: text.into(),
            position,
        }
    }

    /// `End` or `Error`: nothing follows.
    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, TokenKind::End | TokenKind::Error)
    }
}
