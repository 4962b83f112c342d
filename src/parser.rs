//! Parse the marker token stream of one comment block into [`Marker`]s.
//!
//! The parser is a second state machine shaped like the tokenizer: it pulls one token at a
//! time and either advances its state or fails the whole block. There is no resynchronization,
//! so one malformed marker invalidates every marker of the block.

use crate::ast::{Identifier, Literal, Marker, Position};
use crate::lexer::Tokenizer;
use crate::literal::{classify_number, unquote, Number};
use crate::token::{Token, TokenKind};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("lexical error at {position}: {message}")]
    Lexical { message: String, position: Position },
    #[error("syntax error at {position}: {message}")]
    Syntax { message: String, position: Position },
}

impl ParseError {
    pub fn position(&self) -> Position {
        match self {
            ParseError::Lexical { position, .. } | ParseError::Syntax { position, .. } => *position,
        }
    }
}

#[derive(Debug)]
enum State {
    ExpectMarker,
    ExpectIdentifier { start: Position },
    ExpectAssign { start: Position, identifier: Identifier },
    ExpectValue { start: Position, identifier: Identifier },
    CollectList {
        start: Position,
        identifier: Identifier,
        elements: Vec<Literal>,
        awaiting_element: bool,
    },
}

/// Drives a [`Tokenizer`] and collects the markers of one block.
#[derive(Debug)]
pub struct Parser<'a> {
    tokens: Tokenizer<'a>,
    markers: Vec<Marker>,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: Tokenizer<'a>) -> Self {
        Parser {
            tokens,
            markers: Vec::new(),
        }
    }

    /// Consume the whole token stream. Either every marker or the first error.
    pub fn parse(mut self) -> Result<Vec<Marker>, ParseError> {
        let mut state = Some(State::ExpectMarker);
        while let Some(current) = state {
            let token = self.next_token()?;
            state = self.step(current, token)?;
        }
        Ok(self.markers)
    }

    fn next_token(&mut self) -> Result<Token, ParseError> {
        let token = self
            .tokens
            .next()
            .unwrap_or_else(|| Token::new(TokenKind::End, "", Position::default()));
        if token.kind == TokenKind::Error {
            return Err(ParseError::Lexical {
                message: token.text,
                position: token.position,
            });
        }
        Ok(token)
    }

    fn step(&mut self, state: State, token: Token) -> Result<Option<State>, ParseError> {
        match state {
            State::ExpectMarker => match token.kind {
                TokenKind::End => Ok(None),
                TokenKind::Plus => Ok(Some(State::ExpectIdentifier {
                    start: token.position,
                })),
                _ => Err(unexpected("'+' or end of input", &token)),
            },
            State::ExpectIdentifier { start } => {
                expect(&token, TokenKind::Ident)?;
                let identifier = Identifier::parse(&token.text).map_err(|message| {
                    ParseError::Syntax {
                        message,
                        position: token.position,
                    }
                })?;
                Ok(Some(State::ExpectAssign { start, identifier }))
            }
            State::ExpectAssign { start, identifier } => {
                expect(&token, TokenKind::Assign)?;
                Ok(Some(State::ExpectValue { start, identifier }))
            }
            State::ExpectValue { start, identifier } => {
                if token.kind == TokenKind::ListOpen {
                    return Ok(Some(State::CollectList {
                        start,
                        identifier,
                        elements: Vec::new(),
                        awaiting_element: true,
                    }));
                }
                let value = literal_from_token(&token)?;
                self.finish(identifier, value, start);
                Ok(Some(State::ExpectMarker))
            }
            State::CollectList {
                start,
                identifier,
                mut elements,
                awaiting_element,
            } => {
                if awaiting_element {
                    elements.push(literal_from_token(&token)?);
                    return Ok(Some(State::CollectList {
                        start,
                        identifier,
                        elements,
                        awaiting_element: false,
                    }));
                }
                match token.kind {
                    TokenKind::Comma => Ok(Some(State::CollectList {
                        start,
                        identifier,
                        elements,
                        awaiting_element: true,
                    })),
                    TokenKind::ListClose => {
                        self.finish(identifier, Literal::List(elements), start);
                        Ok(Some(State::ExpectMarker))
                    }
                    _ => Err(unexpected("',' or ']'", &token)),
                }
            }
        }
    }

    fn finish(&mut self, identifier: Identifier, value: Literal, position: Position) {
        tracing::trace!(%identifier, kind = %value.kind(), "marker parsed");
        self.markers.push(Marker::new(identifier, value, position));
    }
}

fn expect(token: &Token, kind: TokenKind) -> Result<(), ParseError> {
    if token.kind == kind {
        Ok(())
    } else {
        Err(unexpected(&kind.to_string(), token))
    }
}

fn unexpected(expected: &str, found: &Token) -> ParseError {
    ParseError::Syntax {
        message: format!("expected {}, found {}", expected, found.kind),
        position: found.position,
    }
}

/// Literal value of a scalar token.
fn literal_from_token(token: &Token) -> Result<Literal, ParseError> {
    let invalid = |message: String| ParseError::Lexical {
        message,
        position: token.position,
    };
    match token.kind {
        TokenKind::Bool => match token.text.as_str() {
            "true" => Ok(Literal::Bool(true)),
            "false" => Ok(Literal::Bool(false)),
            other => Err(invalid(format!("invalid bool '{}'", other))),
        },
        TokenKind::String => {
            if let Some(raw) = token
                .text
                .strip_prefix('`')
                .and_then(|s| s.strip_suffix('`'))
            {
                Ok(Literal::String(raw.to_string()))
            } else {
                unquote(&token.text).map(Literal::String).map_err(invalid)
            }
        }
        TokenKind::Int | TokenKind::Float | TokenKind::Complex => {
            match classify_number(&token.text).map_err(invalid)? {
                Number::Int(i) => Ok(Literal::Int(i)),
                Number::Float(x) => Ok(Literal::Float(x)),
                Number::Complex(re, im) => Ok(Literal::Complex(re, im)),
            }
        }
        _ => Err(unexpected("a value", token)),
    }
}

/// Parse one block of text into markers.
pub fn parse(text: &str) -> Result<Vec<Marker>, ParseError> {
    Parser::new(Tokenizer::new(text)).parse()
}
