//! Per-type value limits and the platform capability probe.
//!
//! Limits depend on one platform fact: the width of C `long`. The table is a
//! pure function of that width so that both 32-bit and 64-bit layouts can be
//! built on any host; the process-wide table uses the native width.

use std::ffi::c_long;
use std::sync::OnceLock;

use log::debug;
use num::{Bounded, Float};

use crate::error::{ArrayError, Result};
use crate::simd::SimdSupport;
use crate::types::{NumericType, Wide};

/// Width of the platform C `long` and `unsigned long`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LongWidth {
    Bits32,
    Bits64,
}

impl LongWidth {
    pub fn native() -> Self {
        if std::mem::size_of::<c_long>() == 4 {
            LongWidth::Bits32
        } else {
            LongWidth::Bits64
        }
    }

    pub const fn bits(self) -> u32 {
        match self {
            LongWidth::Bits32 => 32,
            LongWidth::Bits64 => 64,
        }
    }
}

/// An inclusive value range, in the integer or the float domain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Span {
    Int { min: i128, max: i128 },
    Float { min: f64, max: f64 },
}

impl Span {
    /// Whether `value` lies in the range. Values from the other domain are
    /// compared after widening to `f64`; NaN is never contained.
    pub fn contains(&self, value: Wide) -> bool {
        match (*self, value) {
            (Span::Int { min, max }, Wide::Int(v)) => min <= v && v <= max,
            (Span::Float { min, max }, Wide::Float(v)) => min <= v && v <= max,
            (Span::Int { min, max }, Wide::Float(v)) => min as f64 <= v && v <= max as f64,
            (Span::Float { min, max }, Wide::Int(v)) => min <= v as f64 && v as f64 <= max,
        }
    }
}

fn int_span<T: Bounded + Into<i128>>() -> Span {
    Span::Int {
        min: T::min_value().into(),
        max: T::max_value().into(),
    }
}

fn float_span<T: Float + Into<f64>>() -> Span {
    // Finite extremes, not the infinities.
    Span::Float {
        min: T::min_value().into(),
        max: T::max_value().into(),
    }
}

/// Minimum and maximum representable value of every element type.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeLimits {
    width: LongWidth,
    spans: [Span; 12],
}

impl TypeLimits {
    pub fn for_width(width: LongWidth) -> Self {
        let (long, ulong) = match width {
            LongWidth::Bits32 => (int_span::<i32>(), int_span::<u32>()),
            LongWidth::Bits64 => (int_span::<i64>(), int_span::<u64>()),
        };

        let spans = NumericType::ALL.map(|ty| match ty {
            NumericType::Int8 => int_span::<i8>(),
            NumericType::UInt8 => int_span::<u8>(),
            NumericType::Int16 => int_span::<i16>(),
            NumericType::UInt16 => int_span::<u16>(),
            NumericType::Int32 => int_span::<i32>(),
            NumericType::UInt32 => int_span::<u32>(),
            NumericType::Long => long,
            NumericType::ULong => ulong,
            NumericType::Int64 => int_span::<i64>(),
            NumericType::UInt64 => int_span::<u64>(),
            NumericType::Float32 => float_span::<f32>(),
            NumericType::Float64 => float_span::<f64>(),
        });

        TypeLimits { width, spans }
    }

    /// Process-wide table for the native `long` width.
    pub fn native() -> &'static TypeLimits {
        static LIMITS: OnceLock<TypeLimits> = OnceLock::new();
        LIMITS.get_or_init(|| TypeLimits::for_width(LongWidth::native()))
    }

    pub fn width(&self) -> LongWidth {
        self.width
    }

    pub fn limits(&self, ty: NumericType) -> Span {
        self.spans[ty.index()]
    }
}

/// A set of element types, stored as a bitmask over `NumericType::index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeSet(u16);

impl TypeSet {
    pub const fn empty() -> Self {
        TypeSet(0)
    }

    pub const fn all() -> Self {
        TypeSet((1 << NumericType::ALL.len()) - 1)
    }

    pub fn with(self, ty: NumericType) -> Self {
        TypeSet(self.0 | (1 << ty.index()))
    }

    pub fn contains(self, ty: NumericType) -> bool {
        self.0 & (1 << ty.index()) != 0
    }
}

impl FromIterator<NumericType> for TypeSet {
    fn from_iter<I: IntoIterator<Item = NumericType>>(iter: I) -> Self {
        iter.into_iter().fold(TypeSet::empty(), TypeSet::with)
    }
}

/// What the running platform offers: the `long` width, the element types
/// that can be used, and the vector width of the lane path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    long_width: LongWidth,
    supported: TypeSet,
    simd: SimdSupport,
}

impl Platform {
    /// Probes the host once; later calls return the same value.
    pub fn native() -> &'static Platform {
        static PLATFORM: OnceLock<Platform> = OnceLock::new();
        PLATFORM.get_or_init(|| {
            let platform = Platform {
                long_width: LongWidth::native(),
                supported: TypeSet::all(),
                simd: SimdSupport::detect(),
            };
            debug!(
                "platform probe: long is {} bits, vector lanes are {} bytes wide",
                platform.long_width.bits(),
                platform.simd.lane_bytes()
            );
            platform
        })
    }

    /// The native platform restricted to `supported` element types.
    pub fn restricted(supported: TypeSet) -> Self {
        Platform {
            supported,
            ..Platform::native().clone()
        }
    }

    /// The native platform with the lane path switched off.
    pub fn without_simd() -> Self {
        Platform {
            simd: SimdSupport::none(),
            ..Platform::native().clone()
        }
    }

    pub fn long_width(&self) -> LongWidth {
        self.long_width
    }

    pub fn simd(&self) -> SimdSupport {
        self.simd
    }

    pub fn supports(&self, ty: NumericType) -> bool {
        self.supported.contains(ty)
    }

    /// Fails with `TypeUnsupported` when `ty` is absent.
    pub fn require(&self, ty: NumericType) -> Result<()> {
        if self.supports(ty) {
            Ok(())
        } else {
            Err(ArrayError::TypeUnsupported(ty))
        }
    }
}
