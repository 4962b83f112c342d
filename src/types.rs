//! Destination type identifiers chosen by the embedding application.

use std::fmt;

/// The type a marker value should become.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeId {
    Bool,
    String,
    /// Single 8-bit character.
    Byte,
    /// Single Unicode scalar value.
    Rune,
    Int { width: u8, signed: bool },
    /// `width` is 32 or 64.
    Float { width: u8 },
    /// `width` is 64 or 128; each component is `width / 2` bits.
    Complex { width: u8 },
    Sequence(Box<TypeId>),
    /// Converted exactly like the inner type.
    Referenced(Box<TypeId>),
    /// Unconstrained: stores the parsed literal unchanged.
    Any,
    /// Application-defined type, served only by registered converters.
    Opaque(String),
}

impl TypeId {
    pub const U8: TypeId = TypeId::Int { width: 8, signed: false };
    pub const U16: TypeId = TypeId::Int { width: 16, signed: false };
    pub const U32: TypeId = TypeId::Int { width: 32, signed: false };
    pub const U64: TypeId = TypeId::Int { width: 64, signed: false };
    pub const I8: TypeId = TypeId::Int { width: 8, signed: true };
    pub const I16: TypeId = TypeId::Int { width: 16, signed: true };
    pub const I32: TypeId = TypeId::Int { width: 32, signed: true };
    pub const I64: TypeId = TypeId::Int { width: 64, signed: true };
    pub const F32: TypeId = TypeId::Float { width: 32 };
    pub const F64: TypeId = TypeId::Float { width: 64 };
    pub const C64: TypeId = TypeId::Complex { width: 64 };
    pub const C128: TypeId = TypeId::Complex { width: 128 };

    pub fn sequence_of(element: TypeId) -> Self {
        TypeId::Sequence(Box::new(element))
    }

    pub fn referenced(inner: TypeId) -> Self {
        TypeId::Referenced(Box::new(inner))
    }

    pub fn opaque(name: impl Into<String>) -> Self {
        TypeId::Opaque(name.into())
    }

    /// Strip any number of `Referenced` layers.
    pub fn dereferenced(&self) -> &TypeId {
        let mut ty = self;
        while let TypeId::Referenced(inner) = ty {
            ty = inner;
        }
        ty
    }

    /// Inclusive bounds of an integer-family destination, or `None` for other types.
    pub fn int_bounds(&self) -> Option<(i128, i128)> {
        match self {
            TypeId::Byte => Some((0, u8::MAX as i128)),
            TypeId::Rune => Some((0, char::MAX as i128)),
            TypeId::Int { width, signed } => {
                let width = u32::from(*width);
                if !(1..=64).contains(&width) {
                    return None;
                }
                if *signed {
                    let max = (1i128 << (width - 1)) - 1;
                    Some((-max - 1, max))
                } else {
                    Some((0, (1i128 << width) - 1))
                }
            }
            _ => None,
        }
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeId::Bool => f.write_str("bool"),
            TypeId::String => f.write_str("string"),
            TypeId::Byte => f.write_str("byte"),
            TypeId::Rune => f.write_str("rune"),
            TypeId::Int { width, signed: true } => write!(f, "i{}", width),
            TypeId::Int { width, signed: false } => write!(f, "u{}", width),
            TypeId::Float { width } => write!(f, "f{}", width),
            TypeId::Complex { width } => write!(f, "complex{}", width),
            TypeId::Sequence(inner) => write!(f, "[{}]", inner),
            TypeId::Referenced(inner) => write!(f, "&{}", inner),
            TypeId::Any => f.write_str("any"),
            TypeId::Opaque(name) => f.write_str(name),
        }
    }
}
