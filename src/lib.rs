//! # codemark — marker value compiler
//!
//! Turns documentation text containing structured markers such as
//! `+domain:resource:option=value` into typed, validated values for code and manifest
//! generators.
//!
//! ## Pipeline
//!
//! text → [`Tokenizer`] → tokens → [`Parser`] → [`Marker`]s → [`ConversionManager`]
//! (descriptor lookup in the [`Registry`], converter resolution, range-checked conversion)
//! → [`Options`].
//!
//! ## Marker grammar
//!
//! ```text
//! marker      := "+" identifier ("=" value)?
//! identifier  := segment ":" segment ":" segment
//! segment     := [a-z][a-z0-9._]*        (must not end in '.' or '_')
//! value       := string | mstring | bool | number | list
//! string      := '"' (escaped-char)* '"'
//! mstring     := '`' (any-char-except-backtick)* '`'
//! bool        := "true" | "false"
//! number      := int | float | complex
//! list        := "[" value ("," " " value)* "]"
//! ```
//!
//! A marker is only recognized at the start of a line; everything else is prose. A bare
//! identifier means `=true`.
//!
//! ## Example
//!
//! ```text
//! // Pod describes a deployable unit.
//! // +k8s:crd:scope="Namespaced"
//! // +k8s:crd:replicas=[1, 2, 3]
//! // +k8s:crd:served
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use codemark::{ConversionManager, OptionDescriptor, Registry, Target, TypeId};
//! use std::sync::Arc;
//!
//! let registry = Registry::new();
//! registry.define(OptionDescriptor::new("k8s:crd:replicas", TypeId::sequence_of(TypeId::U8)))?;
//! let manager = ConversionManager::new(Arc::new(registry));
//! let options = manager.parse_and_convert_all("+k8s:crd:replicas=[1, 2, 3]", Target::Struct)?;
//! ```
//!
//! See `tests/integration.rs` for complete examples.

pub mod ast;
pub mod convert;
pub mod lexer;
pub mod literal;
pub mod manager;
pub mod options;
pub mod parser;
pub mod registry;
pub mod token;
pub mod types;
pub mod value;

pub use ast::{Identifier, Literal, Marker, Position, ValueKind};
pub use convert::{ConvertError, Converter};
pub use lexer::{tokenize, Tokenizer};
pub use manager::{ConversionManager, Error};
pub use options::{Deprecation, Options};
pub use parser::{parse, ParseError, Parser};
pub use registry::{OptionDescriptor, Registry, RegistryError, Target, Targets};
pub use token::{Token, TokenKind};
pub use types::TypeId;
pub use value::Value;
