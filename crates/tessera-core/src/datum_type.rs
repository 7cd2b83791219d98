//! The type tag carried by every datum.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Element type held by a datum.
///
/// A datum starts out [`Unknown`](DatumType::Unknown) and is fixed to one
/// of the concrete types by an explicit `set_type` or by its first write.
/// After that the tag never changes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DatumType {
    /// No type assigned yet.
    #[default]
    Unknown,
    /// 32-bit signed integer.
    Integer,
    /// 32-bit float.
    Float,
    /// Four-component float vector.
    Vector,
    /// 4x4 float matrix.
    Matrix,
    /// Owned child scopes.
    Table,
    /// UTF-8 string.
    String,
    /// Non-owning node reference.
    Pointer,
}

impl DatumType {
    /// Every concrete (non-`Unknown`) type, in declaration order.
    pub const CONCRETE: [DatumType; 7] = [
        DatumType::Integer,
        DatumType::Float,
        DatumType::Vector,
        DatumType::Matrix,
        DatumType::Table,
        DatumType::String,
        DatumType::Pointer,
    ];

    /// Stable lowercase name used by text producers.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Vector => "vector",
            Self::Matrix => "matrix",
            Self::Table => "table",
            Self::String => "string",
            Self::Pointer => "pointer",
        }
    }

    /// Whether the type is set.
    pub fn is_known(self) -> bool {
        self != Self::Unknown
    }

    /// Whether elements of this type can be converted to and from text.
    pub fn has_text_form(self) -> bool {
        matches!(
            self,
            Self::Integer | Self::Float | Self::Vector | Self::Matrix | Self::String
        )
    }
}

impl fmt::Display for DatumType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A type name that does not correspond to any [`DatumType`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown datum type name: {0:?}")]
pub struct UnknownDatumType(pub String);

impl FromStr for DatumType {
    type Err = UnknownDatumType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unknown" => Ok(Self::Unknown),
            "integer" => Ok(Self::Integer),
            "float" => Ok(Self::Float),
            "vector" => Ok(Self::Vector),
            "matrix" => Ok(Self::Matrix),
            "table" => Ok(Self::Table),
            "string" => Ok(Self::String),
            "pointer" => Ok(Self::Pointer),
            other => Err(UnknownDatumType(other.to_owned())),
        }
    }
}
