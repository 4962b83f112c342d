//! Option registry: marker identifier -> [`OptionDescriptor`].
//!
//! The registry is filled once by the embedding application (the define phase) and then
//! shared read-only between parses. Definitions go through a single write lock that also
//! rejects duplicate identifiers.

use crate::ast::Identifier;
use crate::types::TypeId;
use crate::value::Value;
use bitflags::bitflags;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

bitflags! {
    /// Set of declaration kinds a marker may be attached to.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Targets: u16 {
        const PACKAGE = 1 << 0;
        const STRUCT = 1 << 1;
        const INTERFACE = 1 << 2;
        const FIELD = 1 << 3;
        const FUNCTION = 1 << 4;
        const STRUCT_METHOD = 1 << 5;
        const INTERFACE_METHOD = 1 << 6;
        const CONSTANT = 1 << 7;
        const VARIABLE = 1 << 8;

        const TYPES = Self::STRUCT.bits() | Self::INTERFACE.bits();
        const METHODS = Self::STRUCT_METHOD.bits() | Self::INTERFACE_METHOD.bits();
        const ALL = Self::PACKAGE.bits()
            | Self::TYPES.bits()
            | Self::FIELD.bits()
            | Self::FUNCTION.bits()
            | Self::METHODS.bits()
            | Self::CONSTANT.bits()
            | Self::VARIABLE.bits();
    }
}

/// Kind of the declaration a comment block belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Package,
    Struct,
    Interface,
    Field,
    Function,
    StructMethod,
    InterfaceMethod,
    Constant,
    Variable,
}

impl Target {
    pub fn flag(self) -> Targets {
        match self {
            Target::Package => Targets::PACKAGE,
            Target::Struct => Targets::STRUCT,
            Target::Interface => Targets::INTERFACE,
            Target::Field => Targets::FIELD,
            Target::Function => Targets::FUNCTION,
            Target::StructMethod => Targets::STRUCT_METHOD,
            Target::InterfaceMethod => Targets::INTERFACE_METHOD,
            Target::Constant => Targets::CONSTANT,
            Target::Variable => Targets::VARIABLE,
        }
    }
}

impl From<Target> for Targets {
    fn from(t: Target) -> Self {
        t.flag()
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Target::Package => "package",
            Target::Struct => "struct type",
            Target::Interface => "interface type",
            Target::Field => "field",
            Target::Function => "function",
            Target::StructMethod => "struct method",
            Target::InterfaceMethod => "interface method",
            Target::Constant => "constant",
            Target::Variable => "variable",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegistryError {
    #[error("marker '{0}' is already defined")]
    DuplicateDefinition(String),
    #[error("invalid marker identifier: {0}")]
    InvalidIdentifier(String),
    #[error("a converter for type {0} is already registered")]
    DuplicateConverter(TypeId),
}

/// Where a marker may be used, what it converts to, and how it is documented.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionDescriptor {
    pub identifier: String,
    pub targets: Targets,
    pub type_id: TypeId,
    pub unique: bool,
    pub deprecated_in_favor_of: Option<String>,
    pub default_value: Option<Value>,
    pub doc: Option<String>,
}

impl OptionDescriptor {
    /// Descriptor accepted on every target, not unique, not deprecated.
    pub fn new(identifier: impl Into<String>, type_id: TypeId) -> Self {
        OptionDescriptor {
            identifier: identifier.into(),
            targets: Targets::ALL,
            type_id,
            unique: false,
            deprecated_in_favor_of: None,
            default_value: None,
            doc: None,
        }
    }

    pub fn with_targets(mut self, targets: impl Into<Targets>) -> Self {
        self.targets = targets.into();
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn deprecated_in_favor_of(mut self, replacement: impl Into<String>) -> Self {
        self.deprecated_in_favor_of = Some(replacement.into());
        self
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn accepts(&self, target: Target) -> bool {
        self.targets.contains(target.flag())
    }
}

#[derive(Debug, Default)]
pub struct Registry {
    descriptors: RwLock<HashMap<String, Arc<OptionDescriptor>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a descriptor. Fails on a malformed or already defined identifier.
    pub fn define(&self, descriptor: OptionDescriptor) -> Result<(), RegistryError> {
        Identifier::parse(&descriptor.identifier).map_err(RegistryError::InvalidIdentifier)?;
        let mut descriptors = self.descriptors.write();
        if descriptors.contains_key(&descriptor.identifier) {
            return Err(RegistryError::DuplicateDefinition(descriptor.identifier));
        }
        tracing::debug!(identifier = %descriptor.identifier, type_id = %descriptor.type_id, "marker defined");
        descriptors.insert(descriptor.identifier.clone(), Arc::new(descriptor));
        Ok(())
    }

    pub fn lookup(&self, identifier: &str) -> Option<Arc<OptionDescriptor>> {
        self.descriptors.read().get(identifier).cloned()
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.descriptors.read().contains_key(identifier)
    }

    pub fn len(&self) -> usize {
        self.descriptors.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.read().is_empty()
    }

    /// All descriptors, sorted by identifier.
    pub fn descriptors(&self) -> Vec<Arc<OptionDescriptor>> {
        let mut all: Vec<_> = self.descriptors.read().values().cloned().collect();
        all.sort_by(|a, b| a.identifier.cmp(&b.identifier));
        all
    }
}
