//! Error types for array conversions and elementwise operations.
//!
//! Errors fall into two groups. Call-shape errors (`Type`, `TypeMismatch`,
//! `Length`, `ScalarOverflow`, `TypeUnsupported`) are raised before any
//! element is touched.
//! Element errors (`Overflow`, `ZeroDivision`, `Arithmetic`) are raised while
//! processing and carry the index of the failing element; everything written
//! before that index stays written.

use thiserror::Error;

use crate::types::NumericType;

/// Errors that can occur during conversions and elementwise operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArrayError {
    /// An argument is not a supported array, or its element type is wrong
    /// for the request.
    #[error("type mismatch: {message}")]
    TypeMismatch {
        /// Human-readable error message.
        message: String,
    },
    /// The call itself is malformed: wrong arity, unknown or unsupported
    /// option, option of the wrong value type, or incompatible operands.
    #[error("type error: {message}")]
    Type {
        /// Human-readable error message.
        message: String,
    },
    /// Array length invariants are violated.
    #[error("length error: {message}")]
    Length {
        /// Human-readable error message.
        message: String,
    },
    /// A value does not fit the destination type.
    #[error("overflow at index {index}")]
    Overflow {
        /// Position of the first element that failed.
        index: usize,
    },
    /// Division or modulo by zero.
    #[error("division by zero at index {index}")]
    ZeroDivision {
        /// Position of the first element that failed.
        index: usize,
    },
    /// Domain error or non-finite floating point result.
    #[error("arithmetic error at index {index}")]
    Arithmetic {
        /// Position of the first element that failed.
        index: usize,
    },
    /// An integer scalar operand does not fit the array element type.
    #[error("scalar {value} is out of range for type '{}'", .ty.code())]
    ScalarOverflow {
        /// The scalar operand as given.
        value: i128,
        /// Element type of the array it was paired with.
        ty: NumericType,
    },
    /// The platform does not provide this element type.
    #[error("numeric type '{}' is not supported on this platform", .0.code())]
    TypeUnsupported(NumericType),
}

/// Result type alias for array operations.
pub type Result<T> = std::result::Result<T, ArrayError>;

/// Creates a type mismatch error.
pub fn type_mismatch(message: impl Into<String>) -> ArrayError {
    ArrayError::TypeMismatch {
        message: message.into(),
    }
}

/// Creates a call-shape type error.
pub fn type_error(message: impl Into<String>) -> ArrayError {
    ArrayError::Type {
        message: message.into(),
    }
}

/// Creates a length error.
pub fn length_error(message: impl Into<String>) -> ArrayError {
    ArrayError::Length {
        message: message.into(),
    }
}

/// Per-element failure reported by a kernel; the loop driver attaches the
/// element index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Fault {
    Overflow,
    ZeroDivision,
    Arithmetic,
}

impl Fault {
    pub(crate) fn at(self, index: usize) -> ArrayError {
        match self {
            Fault::Overflow => ArrayError::Overflow { index },
            Fault::ZeroDivision => ArrayError::ZeroDivision { index },
            Fault::Arithmetic => ArrayError::Arithmetic { index },
        }
    }
}

impl ArrayError {
    /// Returns `true` for errors detected while processing elements, as
    /// opposed to errors rejected before processing began.
    pub fn is_element_error(&self) -> bool {
        matches!(
            self,
            ArrayError::Overflow { .. } | ArrayError::ZeroDivision { .. } | ArrayError::Arithmetic { .. }
        )
    }
}
