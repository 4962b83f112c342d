//! Abstract Syntax Tree for parsed markers.

use std::fmt;

/// Line/column of a token or marker in the scanned text (both 1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Position { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Marker identifier: `domain:resource:option`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier {
    pub domain: String,
    pub resource: String,
    pub option: String,
}

impl Identifier {
    /// Parse and validate a `domain:resource:option` identifier.
    pub fn parse(text: &str) -> Result<Self, String> {
        let segments: Vec<&str> = text.split(':').collect();
        if segments.len() != 3 {
            return Err(format!(
                "identifier '{}' must have exactly three ':'-separated segments, found {}",
                text,
                segments.len()
            ));
        }
        for segment in &segments {
            validate_segment(segment).map_err(|e| format!("identifier '{}': {}", text, e))?;
        }
        Ok(Identifier {
            domain: segments[0].to_string(),
            resource: segments[1].to_string(),
            option: segments[2].to_string(),
        })
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.domain, self.resource, self.option)
    }
}

/// `[a-z][a-z0-9._]*`, not ending in `.` or `_`.
fn validate_segment(segment: &str) -> Result<(), String> {
    let mut chars = segment.chars();
    match chars.next() {
        None => return Err("empty segment".to_string()),
        Some(c) if c.is_ascii_digit() => {
            return Err(format!("segment '{}' must not start with a digit", segment))
        }
        Some(c) if !c.is_ascii_lowercase() => {
            return Err(format!("segment '{}' must start with a lowercase letter", segment))
        }
        Some(_) => {}
    }
    if let Some(bad) = chars.find(|c| !is_segment_char(*c)) {
        return Err(format!("invalid character '{}' in segment '{}'", bad, segment));
    }
    if segment.ends_with('.') || segment.ends_with('_') {
        return Err(format!("segment '{}' must not end with '.' or '_'", segment));
    }
    Ok(())
}

pub(crate) fn is_segment_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.' || c == '_'
}

/// Kind of a parsed marker value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    String,
    Int,
    Float,
    Complex,
    Bool,
    List,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ValueKind::String => "string",
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::Complex => "complex",
            ValueKind::Bool => "bool",
            ValueKind::List => "list",
        };
        f.write_str(s)
    }
}

/// Literal value as written in the marker text.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Complex(f64, f64),
    Bool(bool),
    String(String),
    /// Element kinds are not constrained by the grammar.
    List(Vec<Literal>),
}

impl Literal {
    pub fn kind(&self) -> ValueKind {
        match self {
            Literal::Int(_) => ValueKind::Int,
            Literal::Float(_) => ValueKind::Float,
            Literal::Complex(..) => ValueKind::Complex,
            Literal::Bool(_) => ValueKind::Bool,
            Literal::String(_) => ValueKind::String,
            Literal::List(_) => ValueKind::List,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Literal::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Literal::Float(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Literal::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Literal::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Literal]> {
        match self {
            Literal::List(v) => Some(v),
            _ => None,
        }
    }
}

/// One parsed `+identifier=value` occurrence.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub identifier: Identifier,
    pub value: Literal,
    pub position: Position,
}

impl Marker {
    pub fn new(identifier: Identifier, value: Literal, position: Position) -> Self {
        Marker {
            identifier,
            value,
            position,
        }
    }

    pub fn kind(&self) -> ValueKind {
        self.value.kind()
    }

    /// Synthetic marker carrying one list element, used for per-element conversion.
    pub fn with_value(&self, value: Literal) -> Self {
        Marker {
            identifier: self.identifier.clone(),
            value,
            position: self.position,
        }
    }
}
