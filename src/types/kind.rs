//! Type-level markers for each [`NumericType`].
//!
//! `c_long` is an alias of `i32` or `i64`, so element primitives alone cannot
//! tell `l` from `i` or `q`. Each marker ties one enum variant to its element
//! primitive, and generic code is monomorphized over markers instead.

use std::ffi::{c_long, c_ulong};

use super::{Element, NumericType, TypedArray};

pub trait Kind: 'static {
    type Elem: Element;

    const TYPE: NumericType;

    fn slice(array: &TypedArray) -> Option<&[Self::Elem]>;

    fn slice_mut(array: &mut TypedArray) -> Option<&mut [Self::Elem]>;
}

macro_rules! kinds {
    ($($name:ident => $elem:ty),* $(,)?) => {
        $(
            pub struct $name;

            impl Kind for $name {
                type Elem = $elem;

                const TYPE: NumericType = NumericType::$name;

                #[inline(always)]
                fn slice(array: &TypedArray) -> Option<&[$elem]> {
                    match array {
                        TypedArray::$name(values) => Some(values),
                        _ => None,
                    }
                }

                #[inline(always)]
                fn slice_mut(array: &mut TypedArray) -> Option<&mut [$elem]> {
                    match array {
                        TypedArray::$name(values) => Some(values),
                        _ => None,
                    }
                }
            }
        )*
    };
}

kinds! {
    Int8 => i8,
    UInt8 => u8,
    Int16 => i16,
    UInt16 => u16,
    Int32 => i32,
    UInt32 => u32,
    Long => c_long,
    ULong => c_ulong,
    Int64 => i64,
    UInt64 => u64,
    Float32 => f32,
    Float64 => f64,
}

/// Runs `$body` with `$K` bound to the marker of the runtime type `$ty`.
macro_rules! with_kind {
    ($ty:expr, $K:ident => $body:expr) => {{
        use $crate::types::{kind, NumericType};
        match $ty {
            NumericType::Int8 => { type $K = kind::Int8; $body }
            NumericType::UInt8 => { type $K = kind::UInt8; $body }
            NumericType::Int16 => { type $K = kind::Int16; $body }
            NumericType::UInt16 => { type $K = kind::UInt16; $body }
            NumericType::Int32 => { type $K = kind::Int32; $body }
            NumericType::UInt32 => { type $K = kind::UInt32; $body }
            NumericType::Long => { type $K = kind::Long; $body }
            NumericType::ULong => { type $K = kind::ULong; $body }
            NumericType::Int64 => { type $K = kind::Int64; $body }
            NumericType::UInt64 => { type $K = kind::UInt64; $body }
            NumericType::Float32 => { type $K = kind::Float32; $body }
            NumericType::Float64 => { type $K = kind::Float64; $body }
        }
    }};
}

pub(crate) use with_kind;
