//! Result of converting one comment block: identifier -> ordered values.

use crate::ast::Position;
use crate::manager::Error;
use crate::registry::OptionDescriptor;
use crate::value::Value;
use std::collections::HashMap;

/// A deprecated marker was used; processing continued with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deprecation {
    pub identifier: String,
    pub replacement: String,
    pub position: Position,
}

/// Converted values per identifier. Identifiers keep the order of their first occurrence,
/// values keep occurrence order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Options {
    entries: Vec<(String, Vec<Value>)>,
    by_identifier: HashMap<String, usize>,
    deprecations: Vec<Deprecation>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value. A second value for a unique descriptor is an error.
    pub fn insert(&mut self, descriptor: &OptionDescriptor, value: Value) -> Result<(), Error> {
        match self.by_identifier.get(&descriptor.identifier) {
            Some(&i) => {
                if descriptor.unique {
                    return Err(Error::UniquenessViolation(descriptor.identifier.clone()));
                }
                self.entries[i].1.push(value);
            }
            None => {
                self.by_identifier
                    .insert(descriptor.identifier.clone(), self.entries.len());
                self.entries
                    .push((descriptor.identifier.clone(), vec![value]));
            }
        }
        Ok(())
    }

    pub(crate) fn record_deprecation(&mut self, deprecation: Deprecation) {
        self.deprecations.push(deprecation);
    }

    pub fn values(&self, identifier: &str) -> Option<&[Value]> {
        self.by_identifier
            .get(identifier)
            .map(|&i| self.entries[i].1.as_slice())
    }

    pub fn first(&self, identifier: &str) -> Option<&Value> {
        self.values(identifier).and_then(|v| v.first())
    }

    /// First value for the descriptor's identifier, or its default value.
    pub fn first_or_default<'a>(&'a self, descriptor: &'a OptionDescriptor) -> Option<&'a Value> {
        self.first(&descriptor.identifier)
            .or(descriptor.default_value.as_ref())
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.by_identifier.contains_key(identifier)
    }

    /// Identifiers in first-seen order with their values.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Value])> {
        self.entries
            .iter()
            .map(|(id, values)| (id.as_str(), values.as_slice()))
    }

    /// Number of distinct identifiers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn deprecations(&self) -> &[Deprecation] {
        &self.deprecations
    }
}
