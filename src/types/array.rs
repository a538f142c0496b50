use std::ffi::{c_long, c_ulong};

use super::{Element, NumericType, Wide};

/// A fixed-length, mutable, homogeneously typed array.
///
/// The engine reads and writes elements in place but never changes the
/// length of an array it is handed.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedArray {
    Int8(Vec<i8>),
    UInt8(Vec<u8>),
    Int16(Vec<i16>),
    UInt16(Vec<u16>),
    Int32(Vec<i32>),
    UInt32(Vec<u32>),
    Long(Vec<c_long>),
    ULong(Vec<c_ulong>),
    Int64(Vec<i64>),
    UInt64(Vec<u64>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
}

macro_rules! each_array {
    ($array:expr, $values:ident => $body:expr) => {
        match $array {
            TypedArray::Int8($values) => $body,
            TypedArray::UInt8($values) => $body,
            TypedArray::Int16($values) => $body,
            TypedArray::UInt16($values) => $body,
            TypedArray::Int32($values) => $body,
            TypedArray::UInt32($values) => $body,
            TypedArray::Long($values) => $body,
            TypedArray::ULong($values) => $body,
            TypedArray::Int64($values) => $body,
            TypedArray::UInt64($values) => $body,
            TypedArray::Float32($values) => $body,
            TypedArray::Float64($values) => $body,
        }
    };
}

impl TypedArray {
    /// Creates an array of `len` zero elements.
    pub fn zeros(ty: NumericType, len: usize) -> Self {
        match ty {
            NumericType::Int8 => TypedArray::Int8(vec![0; len]),
            NumericType::UInt8 => TypedArray::UInt8(vec![0; len]),
            NumericType::Int16 => TypedArray::Int16(vec![0; len]),
            NumericType::UInt16 => TypedArray::UInt16(vec![0; len]),
            NumericType::Int32 => TypedArray::Int32(vec![0; len]),
            NumericType::UInt32 => TypedArray::UInt32(vec![0; len]),
            NumericType::Long => TypedArray::Long(vec![0; len]),
            NumericType::ULong => TypedArray::ULong(vec![0; len]),
            NumericType::Int64 => TypedArray::Int64(vec![0; len]),
            NumericType::UInt64 => TypedArray::UInt64(vec![0; len]),
            NumericType::Float32 => TypedArray::Float32(vec![0.0; len]),
            NumericType::Float64 => TypedArray::Float64(vec![0.0; len]),
        }
    }

    pub fn numeric_type(&self) -> NumericType {
        match self {
            TypedArray::Int8(_) => NumericType::Int8,
            TypedArray::UInt8(_) => NumericType::UInt8,
            TypedArray::Int16(_) => NumericType::Int16,
            TypedArray::UInt16(_) => NumericType::UInt16,
            TypedArray::Int32(_) => NumericType::Int32,
            TypedArray::UInt32(_) => NumericType::UInt32,
            TypedArray::Long(_) => NumericType::Long,
            TypedArray::ULong(_) => NumericType::ULong,
            TypedArray::Int64(_) => NumericType::Int64,
            TypedArray::UInt64(_) => NumericType::UInt64,
            TypedArray::Float32(_) => NumericType::Float32,
            TypedArray::Float64(_) => NumericType::Float64,
        }
    }

    pub fn len(&self) -> usize {
        each_array!(self, values => values.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Widened value at `index`.
    pub fn get(&self, index: usize) -> Option<Wide> {
        each_array!(self, values => values.get(index).map(|v| v.widen()))
    }

    /// All elements widened, mostly useful for comparing arrays of
    /// different element types.
    pub fn to_wide(&self) -> Vec<Wide> {
        each_array!(self, values => values.iter().map(|v| v.widen()).collect())
    }
}

macro_rules! array_from_vec {
    ($($variant:ident => $t:ty),*) => {
        $(
            impl From<Vec<$t>> for TypedArray {
                fn from(values: Vec<$t>) -> Self {
                    TypedArray::$variant(values)
                }
            }
        )*
    };
}

// `c_long` aliases one of these, so the `l`/`L` variants are built directly.
array_from_vec!(
    Int8 => i8,
    UInt8 => u8,
    Int16 => i16,
    UInt16 => u16,
    Int32 => i32,
    UInt32 => u32,
    Int64 => i64,
    UInt64 => u64,
    Float32 => f32,
    Float64 => f64
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeros_has_requested_type_and_len() {
        for ty in NumericType::ALL {
            let array = TypedArray::zeros(ty, 5);
            assert_eq!(array.numeric_type(), ty);
            assert_eq!(array.len(), 5);
        }
        assert!(TypedArray::zeros(NumericType::Int8, 0).is_empty());
    }

    #[test]
    fn test_get_widens() {
        let array = TypedArray::from(vec![1.5f32, -2.0]);
        assert_eq!(array.get(1), Some(Wide::Float(-2.0)));
        assert_eq!(array.get(2), None);

        let array = TypedArray::Long(vec![-7]);
        assert_eq!(array.to_wide(), vec![Wide::Int(-7)]);
    }
}
