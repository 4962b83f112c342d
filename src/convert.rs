//! Converters: one per destination value family.
//!
//! Every converter answers two questions for a marker and a destination [`TypeId`]:
//! [`Converter::can_convert`] is the pure kind-compatibility check, and
//! [`Converter::convert`] performs the range-checked transformation. Builtin converters also
//! expose a classification predicate, [`Converter::supports`], which the
//! [`ConversionManager`](crate::manager::ConversionManager) walks in a fixed order:
//!
//! | Order | Family | Destinations |
//! |-------|--------|--------------|
//! | 1 | list | `Sequence(T)` for scalar `T` other than byte/rune, or `Any` |
//! | 2 | boolean | `Bool` |
//! | 3 | string | `String`, `Sequence(Byte)`, `Sequence(Rune)` |
//! | 4 | integer | `Int { 8 \| 16 \| 32 \| 64, .. }`, `Byte`, `Rune` |
//! | 5 | float | `Float { 32 \| 64 }` |
//! | 6 | complex | `Complex { 64 \| 128 }` |
//! | 7 | any | `Any` |
//!
//! Conversions never truncate: a value outside the destination's range is an
//! [`ConvertError::Overflow`].

use crate::ast::{Literal, Marker, ValueKind};
use crate::manager::ConversionManager;
use crate::types::TypeId;
use crate::value::Value;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("no converter found for type {0}")]
    ConverterNotFound(TypeId),
    #[error("cannot convert a {found} value to {type_id}")]
    KindMismatch { type_id: TypeId, found: ValueKind },
    /// Decimal integer text beyond the `i64` literal range reaches the integer converter as a
    /// whole float; it is reported here when it exceeds the destination. Values between `2^63`
    /// and `2^64` cannot be held exactly and arrive at `u64` as [`ConvertError::KindMismatch`].
    #[error("value {value} overflows {type_id}")]
    Overflow { value: String, type_id: TypeId },
    #[error("expected a string of exactly {expected} character(s), found {found}")]
    Length { expected: usize, found: usize },
    #[error("{0:#x} is not a valid Unicode scalar value")]
    InvalidChar(u32),
    #[error("element {index} failed: {source}")]
    Element {
        index: usize,
        source: Box<ConvertError>,
    },
    #[error(transparent)]
    Custom(#[from] anyhow::Error),
}

impl ConvertError {
    /// The innermost error, looking through list element wrappers.
    pub fn root(&self) -> &ConvertError {
        match self {
            ConvertError::Element { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Converts parsed markers into values of one destination family.
pub trait Converter: Send + Sync {
    fn name(&self) -> &str;

    /// Classification predicate used for builtin resolution. Registered converters are
    /// matched by exact type identity and do not need it.
    fn supports(&self, _type_id: &TypeId) -> bool {
        false
    }

    /// Pure kind-compatibility check.
    fn can_convert(&self, marker: &Marker, type_id: &TypeId) -> Result<(), ConvertError>;

    fn convert(
        &self,
        marker: &Marker,
        type_id: &TypeId,
        manager: &ConversionManager,
    ) -> Result<Value, ConvertError>;
}

fn mismatch(marker: &Marker, type_id: &TypeId) -> ConvertError {
    ConvertError::KindMismatch {
        type_id: type_id.clone(),
        found: marker.kind(),
    }
}

fn expect_kind(marker: &Marker, type_id: &TypeId, kind: ValueKind) -> Result<(), ConvertError> {
    if marker.kind() == kind {
        Ok(())
    } else {
        Err(mismatch(marker, type_id))
    }
}

/// Builtin converters in resolution order.
pub fn builtin_converters() -> Vec<Arc<dyn Converter>> {
    vec![
        Arc::new(ListConverter),
        Arc::new(BoolConverter),
        Arc::new(StringConverter),
        Arc::new(IntegerConverter),
        Arc::new(FloatConverter),
        Arc::new(ComplexConverter),
        Arc::new(AnyConverter),
    ]
}

// ==================== Boolean ====================

#[derive(Debug, Clone, Copy, Default)]
pub struct BoolConverter;

impl Converter for BoolConverter {
    fn name(&self) -> &str {
        "bool"
    }

    fn supports(&self, type_id: &TypeId) -> bool {
        *type_id == TypeId::Bool
    }

    fn can_convert(&self, marker: &Marker, type_id: &TypeId) -> Result<(), ConvertError> {
        expect_kind(marker, type_id, ValueKind::Bool)
    }

    fn convert(
        &self,
        marker: &Marker,
        type_id: &TypeId,
        _manager: &ConversionManager,
    ) -> Result<Value, ConvertError> {
        match marker.value {
            Literal::Bool(b) => Ok(Value::Bool(b)),
            _ => Err(mismatch(marker, type_id)),
        }
    }
}

// ==================== String ====================

#[derive(Debug, Clone, Copy, Default)]
pub struct StringConverter;

impl Converter for StringConverter {
    fn name(&self) -> &str {
        "string"
    }

    fn supports(&self, type_id: &TypeId) -> bool {
        match type_id {
            TypeId::String => true,
            TypeId::Sequence(element) => matches!(**element, TypeId::Byte | TypeId::Rune),
            _ => false,
        }
    }

    fn can_convert(&self, marker: &Marker, type_id: &TypeId) -> Result<(), ConvertError> {
        expect_kind(marker, type_id, ValueKind::String)
    }

    fn convert(
        &self,
        marker: &Marker,
        type_id: &TypeId,
        _manager: &ConversionManager,
    ) -> Result<Value, ConvertError> {
        let s = match &marker.value {
            Literal::String(s) => s,
            _ => return Err(mismatch(marker, type_id)),
        };
        match type_id {
            TypeId::String => Ok(Value::String(s.clone())),
            TypeId::Sequence(element) if **element == TypeId::Byte => {
                Ok(Value::Bytes(s.as_bytes().to_vec()))
            }
            TypeId::Sequence(element) if **element == TypeId::Rune => {
                Ok(Value::Chars(s.chars().collect()))
            }
            other => Err(ConvertError::ConverterNotFound(other.clone())),
        }
    }
}

// ==================== Integer ====================

#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerConverter;

impl IntegerConverter {
    fn is_char_type(type_id: &TypeId) -> bool {
        matches!(type_id, TypeId::Byte | TypeId::Rune)
    }

    /// A whole float outside the `i64` range that also exceeds the destination's bounds.
    fn oversized(x: f64, type_id: &TypeId) -> Option<ConvertError> {
        const I64_LIMIT: f64 = 9_223_372_036_854_775_808.0;
        let (min, max) = type_id.int_bounds()?;
        if !x.is_finite() || x.fract() != 0.0 || (-I64_LIMIT..I64_LIMIT).contains(&x) {
            return None;
        }
        let v = x as i128;
        (v < min || v > max).then(|| ConvertError::Overflow {
            value: format!("{:.0}", x),
            type_id: type_id.clone(),
        })
    }

    /// Range-check `v` against the destination's width and signedness, then narrow it.
    fn narrow(v: i64, type_id: &TypeId) -> Result<Value, ConvertError> {
        let (min, max) = type_id
            .int_bounds()
            .ok_or_else(|| ConvertError::ConverterNotFound(type_id.clone()))?;
        if i128::from(v) < min || i128::from(v) > max {
            return Err(ConvertError::Overflow {
                value: v.to_string(),
                type_id: type_id.clone(),
            });
        }
        Ok(match type_id {
            TypeId::Byte => Value::U8(v as u8),
            TypeId::Rune => {
                let code = v as u32;
                Value::Char(char::from_u32(code).ok_or(ConvertError::InvalidChar(code))?)
            }
            TypeId::Int { width: 8, signed: false } => Value::U8(v as u8),
            TypeId::Int { width: 16, signed: false } => Value::U16(v as u16),
            TypeId::Int { width: 32, signed: false } => Value::U32(v as u32),
            TypeId::Int { width: 64, signed: false } => Value::U64(v as u64),
            TypeId::Int { width: 8, signed: true } => Value::I8(v as i8),
            TypeId::Int { width: 16, signed: true } => Value::I16(v as i16),
            TypeId::Int { width: 32, signed: true } => Value::I32(v as i32),
            TypeId::Int { width: 64, signed: true } => Value::I64(v),
            other => return Err(ConvertError::ConverterNotFound(other.clone())),
        })
    }
}

impl Converter for IntegerConverter {
    fn name(&self) -> &str {
        "integer"
    }

    fn supports(&self, type_id: &TypeId) -> bool {
        matches!(
            type_id,
            TypeId::Byte | TypeId::Rune | TypeId::Int { width: 8 | 16 | 32 | 64, .. }
        )
    }

    fn can_convert(&self, marker: &Marker, type_id: &TypeId) -> Result<(), ConvertError> {
        match &marker.value {
            Literal::Int(_) => Ok(()),
            Literal::String(_) if Self::is_char_type(type_id) => Ok(()),
            Literal::Float(x) => Err(Self::oversized(*x, type_id)
                .unwrap_or_else(|| mismatch(marker, type_id))),
            _ => Err(mismatch(marker, type_id)),
        }
    }

    fn convert(
        &self,
        marker: &Marker,
        type_id: &TypeId,
        _manager: &ConversionManager,
    ) -> Result<Value, ConvertError> {
        match &marker.value {
            Literal::Int(v) => Self::narrow(*v, type_id),
            Literal::String(s) if Self::is_char_type(type_id) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Self::narrow(i64::from(u32::from(c)), type_id),
                    _ => Err(ConvertError::Length {
                        expected: 1,
                        found: s.chars().count(),
                    }),
                }
            }
            Literal::Float(x) => {
                Err(Self::oversized(*x, type_id).unwrap_or_else(|| mismatch(marker, type_id)))
            }
            _ => Err(mismatch(marker, type_id)),
        }
    }
}

// ==================== Float ====================

#[derive(Debug, Clone, Copy, Default)]
pub struct FloatConverter;

fn narrow_f32(x: f64, type_id: &TypeId) -> Result<f32, ConvertError> {
    if x.is_finite() && x.abs() > f64::from(f32::MAX) {
        return Err(ConvertError::Overflow {
            value: x.to_string(),
            type_id: type_id.clone(),
        });
    }
    Ok(x as f32)
}

impl Converter for FloatConverter {
    fn name(&self) -> &str {
        "float"
    }

    fn supports(&self, type_id: &TypeId) -> bool {
        matches!(type_id, TypeId::Float { width: 32 | 64 })
    }

    fn can_convert(&self, marker: &Marker, type_id: &TypeId) -> Result<(), ConvertError> {
        expect_kind(marker, type_id, ValueKind::Float)
    }

    fn convert(
        &self,
        marker: &Marker,
        type_id: &TypeId,
        _manager: &ConversionManager,
    ) -> Result<Value, ConvertError> {
        let x = match marker.value {
            Literal::Float(x) => x,
            _ => return Err(mismatch(marker, type_id)),
        };
        match type_id {
            TypeId::Float { width: 32 } => narrow_f32(x, type_id).map(Value::F32),
            TypeId::Float { width: 64 } => Ok(Value::F64(x)),
            other => Err(ConvertError::ConverterNotFound(other.clone())),
        }
    }
}

// ==================== Complex ====================

#[derive(Debug, Clone, Copy, Default)]
pub struct ComplexConverter;

impl Converter for ComplexConverter {
    fn name(&self) -> &str {
        "complex"
    }

    fn supports(&self, type_id: &TypeId) -> bool {
        matches!(type_id, TypeId::Complex { width: 64 | 128 })
    }

    fn can_convert(&self, marker: &Marker, type_id: &TypeId) -> Result<(), ConvertError> {
        expect_kind(marker, type_id, ValueKind::Complex)
    }

    fn convert(
        &self,
        marker: &Marker,
        type_id: &TypeId,
        _manager: &ConversionManager,
    ) -> Result<Value, ConvertError> {
        let (re, im) = match marker.value {
            Literal::Complex(re, im) => (re, im),
            _ => return Err(mismatch(marker, type_id)),
        };
        match type_id {
            TypeId::Complex { width: 64 } => {
                Ok(Value::C64(narrow_f32(re, type_id)?, narrow_f32(im, type_id)?))
            }
            TypeId::Complex { width: 128 } => Ok(Value::C128(re, im)),
            other => Err(ConvertError::ConverterNotFound(other.clone())),
        }
    }
}

// ==================== List ====================

#[derive(Debug, Clone, Copy, Default)]
pub struct ListConverter;

impl ListConverter {
    fn element_type(type_id: &TypeId) -> Option<&TypeId> {
        match type_id {
            TypeId::Sequence(element) => Some(element.dereferenced()),
            _ => None,
        }
    }

    fn is_supported_element(element: &TypeId) -> bool {
        match element {
            TypeId::Byte | TypeId::Rune => false,
            TypeId::Any => true,
            other => [
                &BoolConverter as &dyn Converter,
                &StringConverter,
                &IntegerConverter,
                &FloatConverter,
                &ComplexConverter,
            ]
            .iter()
            .any(|c| c.supports(other)),
        }
    }
}

impl Converter for ListConverter {
    fn name(&self) -> &str {
        "list"
    }

    fn supports(&self, type_id: &TypeId) -> bool {
        Self::element_type(type_id).is_some_and(Self::is_supported_element)
    }

    fn can_convert(&self, marker: &Marker, type_id: &TypeId) -> Result<(), ConvertError> {
        expect_kind(marker, type_id, ValueKind::List)
    }

    fn convert(
        &self,
        marker: &Marker,
        type_id: &TypeId,
        manager: &ConversionManager,
    ) -> Result<Value, ConvertError> {
        let elements = match &marker.value {
            Literal::List(elements) => elements,
            _ => return Err(mismatch(marker, type_id)),
        };
        let element_type = Self::element_type(type_id)
            .ok_or_else(|| ConvertError::ConverterNotFound(type_id.clone()))?;
        let mut out = Vec::with_capacity(elements.len());
        for (index, element) in elements.iter().enumerate() {
            let single = marker.with_value(element.clone());
            let value = manager
                .convert_to(&single, element_type)
                .map_err(|e| ConvertError::Element {
                    index,
                    source: Box::new(e),
                })?;
            out.push(value);
        }
        Ok(Value::List(out))
    }
}

// ==================== Any ====================

#[derive(Debug, Clone, Copy, Default)]
pub struct AnyConverter;

impl Converter for AnyConverter {
    fn name(&self) -> &str {
        "any"
    }

    fn supports(&self, type_id: &TypeId) -> bool {
        *type_id == TypeId::Any
    }

    fn can_convert(&self, _marker: &Marker, _type_id: &TypeId) -> Result<(), ConvertError> {
        Ok(())
    }

    fn convert(
        &self,
        marker: &Marker,
        _type_id: &TypeId,
        _manager: &ConversionManager,
    ) -> Result<Value, ConvertError> {
        Ok(Value::Literal(marker.value.clone()))
    }
}
