//! Element types, typed arrays and scalar operands.
//!
//! The twelve element kinds use the familiar array type codes. `l` and `L`
//! follow the platform C `long`, so they are 32 bits wide on Windows and on
//! 32-bit targets and 64 bits wide elsewhere.

use std::fmt;

use crate::error::{type_mismatch, Result};

pub mod array;
pub mod element;
pub mod kind;

pub use array::TypedArray;
pub use element::{Element, Wide};
pub use kind::Kind;
pub(crate) use kind::with_kind;

/// One of the supported array element types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NumericType {
    /// `b`: signed 8-bit integer.
    Int8,
    /// `B`: unsigned 8-bit integer.
    UInt8,
    /// `h`: signed 16-bit integer.
    Int16,
    /// `H`: unsigned 16-bit integer.
    UInt16,
    /// `i`: signed 32-bit integer.
    Int32,
    /// `I`: unsigned 32-bit integer.
    UInt32,
    /// `l`: signed C `long`, platform width.
    Long,
    /// `L`: unsigned C `long`, platform width.
    ULong,
    /// `q`: signed 64-bit integer (C `long long`).
    Int64,
    /// `Q`: unsigned 64-bit integer (C `unsigned long long`).
    UInt64,
    /// `f`: single-precision float.
    Float32,
    /// `d`: double-precision float.
    Float64,
}

impl NumericType {
    /// Every element type, in type-code order.
    pub const ALL: [NumericType; 12] = [
        NumericType::Int8,
        NumericType::UInt8,
        NumericType::Int16,
        NumericType::UInt16,
        NumericType::Int32,
        NumericType::UInt32,
        NumericType::Long,
        NumericType::ULong,
        NumericType::Int64,
        NumericType::UInt64,
        NumericType::Float32,
        NumericType::Float64,
    ];

    /// Array type code of this element type.
    pub const fn code(self) -> char {
        match self {
            NumericType::Int8 => 'b',
            NumericType::UInt8 => 'B',
            NumericType::Int16 => 'h',
            NumericType::UInt16 => 'H',
            NumericType::Int32 => 'i',
            NumericType::UInt32 => 'I',
            NumericType::Long => 'l',
            NumericType::ULong => 'L',
            NumericType::Int64 => 'q',
            NumericType::UInt64 => 'Q',
            NumericType::Float32 => 'f',
            NumericType::Float64 => 'd',
        }
    }

    /// Parses an array type code.
    pub fn from_code(code: char) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|ty| ty.code() == code)
            .ok_or_else(|| type_mismatch(format!("unknown array type code '{code}'")))
    }

    /// Dense position of this type in `ALL`, used to index lookup tables.
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn is_floating(self) -> bool {
        matches!(self, NumericType::Float32 | NumericType::Float64)
    }

    pub const fn is_signed(self) -> bool {
        matches!(
            self,
            NumericType::Int8
                | NumericType::Int16
                | NumericType::Int32
                | NumericType::Long
                | NumericType::Int64
                | NumericType::Float32
                | NumericType::Float64
        )
    }
}

impl fmt::Display for NumericType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}'", self.code())
    }
}

/// A scalar operand. Integer scalars are range-checked against the array
/// type they are combined with; float scalars only combine with float arrays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    Int(i128),
    Float(f64),
}

macro_rules! scalar_from {
    ($variant:ident, $wide:ty: $($t:ty),*) => {
        $(
            impl From<$t> for Scalar {
                fn from(value: $t) -> Self {
                    Scalar::$variant(<$wide>::from(value))
                }
            }
        )*
    };
}

scalar_from!(Int, i128: i8, u8, i16, u16, i32, u32, i64, u64, i128);
scalar_from!(Float, f64: f32, f64);
