//! Conversion manager: descriptor lookup, converter resolution and conversion.
//!
//! Resolution of a destination [`TypeId`]:
//!
//! 1. `Referenced(T)` resolves as `T`; the caller decides whether to box the result.
//! 2. The builtin classification chain (see [`convert`](crate::convert)); the first
//!    converter whose predicate claims the type wins.
//! 3. Converters registered with [`ConversionManager::register_converter`], keyed by exact
//!    type identity.
//! 4. Otherwise [`ConvertError::ConverterNotFound`].

use crate::ast::Marker;
use crate::convert::{builtin_converters, ConvertError, Converter};
use crate::options::{Deprecation, Options};
use crate::parser::{parse, ParseError};
use crate::registry::{OptionDescriptor, Registry, RegistryError, Target};
use crate::types::TypeId;
use crate::value::Value;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("marker '{0}' is not defined")]
    IdentifierNotDefined(String),
    #[error("marker '{identifier}' cannot be used on a {target}")]
    TargetNotApplicable { identifier: String, target: Target },
    #[error("marker '{identifier}': {source}")]
    Conversion {
        identifier: String,
        source: ConvertError,
    },
    #[error("marker '{0}' may occur only once")]
    UniquenessViolation(String),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl Error {
    /// Underlying conversion failure, if any (list element wrappers included).
    pub fn conversion(&self) -> Option<&ConvertError> {
        match self {
            Error::Conversion { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub struct ConversionManager {
    registry: Arc<Registry>,
    builtins: Vec<Arc<dyn Converter>>,
    custom: RwLock<HashMap<TypeId, Arc<dyn Converter>>>,
}

impl std::fmt::Debug for ConversionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let builtins: Vec<&str> = self.builtins.iter().map(|c| c.name()).collect();
        let custom: Vec<String> = self.custom.read().keys().map(|t| t.to_string()).collect();
        f.debug_struct("ConversionManager")
            .field("registry", &self.registry)
            .field("builtins", &builtins)
            .field("custom", &custom)
            .finish()
    }
}

impl ConversionManager {
    pub fn new(registry: Arc<Registry>) -> Self {
        ConversionManager {
            registry,
            builtins: builtin_converters(),
            custom: RwLock::new(HashMap::new()),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Register an application converter for one exact destination type.
    pub fn register_converter(
        &self,
        type_id: TypeId,
        converter: Arc<dyn Converter>,
    ) -> Result<(), RegistryError> {
        let mut custom = self.custom.write();
        if custom.contains_key(&type_id) {
            return Err(RegistryError::DuplicateConverter(type_id));
        }
        tracing::debug!(%type_id, converter = converter.name(), "converter registered");
        custom.insert(type_id, converter);
        Ok(())
    }

    pub fn lookup(&self, identifier: &str) -> Result<Arc<OptionDescriptor>, Error> {
        self.registry
            .lookup(identifier)
            .ok_or_else(|| Error::IdentifierNotDefined(identifier.to_string()))
    }

    pub fn resolve_converter(&self, type_id: &TypeId) -> Result<Arc<dyn Converter>, ConvertError> {
        let type_id = type_id.dereferenced();
        if let Some(c) = self.builtins.iter().find(|c| c.supports(type_id)) {
            tracing::trace!(%type_id, converter = c.name(), "builtin converter resolved");
            return Ok(Arc::clone(c));
        }
        if let Some(c) = self.custom.read().get(type_id) {
            tracing::trace!(%type_id, converter = c.name(), "registered converter resolved");
            return Ok(Arc::clone(c));
        }
        Err(ConvertError::ConverterNotFound(type_id.clone()))
    }

    /// Convert a marker to an explicit destination type, bypassing the registry.
    pub fn convert_to(&self, marker: &Marker, type_id: &TypeId) -> Result<Value, ConvertError> {
        let converter = self.resolve_converter(type_id)?;
        let type_id = type_id.dereferenced();
        converter.can_convert(marker, type_id)?;
        converter.convert(marker, type_id, self)
    }

    /// Convert a marker found on a declaration of kind `target`.
    pub fn convert(&self, marker: &Marker, target: Target) -> Result<Value, Error> {
        let descriptor = self.lookup(&marker.identifier.to_string())?;
        self.convert_with(&descriptor, marker, target)
    }

    fn convert_with(
        &self,
        descriptor: &OptionDescriptor,
        marker: &Marker,
        target: Target,
    ) -> Result<Value, Error> {
        if !descriptor.accepts(target) {
            return Err(Error::TargetNotApplicable {
                identifier: descriptor.identifier.clone(),
                target,
            });
        }
        if let Some(replacement) = &descriptor.deprecated_in_favor_of {
            tracing::warn!(
                identifier = %descriptor.identifier,
                %replacement,
                position = %marker.position,
                "marker is deprecated, use {} instead",
                replacement
            );
        }
        self.convert_to(marker, &descriptor.type_id)
            .map_err(|source| Error::Conversion {
                identifier: descriptor.identifier.clone(),
                source,
            })
    }

    /// Tokenize, parse and convert every marker of one comment block.
    ///
    /// The first failure fails the whole block; no partial options are returned.
    pub fn parse_and_convert_all(&self, text: &str, target: Target) -> Result<Options, Error> {
        let markers = parse(text)?;
        let mut options = Options::new();
        for marker in &markers {
            let descriptor = self.lookup(&marker.identifier.to_string())?;
            let value = self.convert_with(&descriptor, marker, target)?;
            if let Some(replacement) = &descriptor.deprecated_in_favor_of {
                options.record_deprecation(Deprecation {
                    identifier: descriptor.identifier.clone(),
                    replacement: replacement.clone(),
                    position: marker.position,
                });
            }
            options.insert(&descriptor, value)?;
        }
        tracing::debug!(markers = markers.len(), options = options.len(), %target, "block converted");
        Ok(options)
    }
}
