//! Guard bands: the range of source values that convert into a destination
//! type without overflow, expressed in the source type's domain.
//!
//! Integer extremes above a float's significand width are not representable
//! in that float. For float-to-integer conversions the upper bound is pulled
//! inside the integer maximum by a guard value so that the bound itself is a
//! representable float and nothing above it can round down into range.

use std::sync::OnceLock;

use log::debug;

use crate::limits::{LongWidth, Span, TypeLimits};
use crate::types::NumericType;

const GUARD_F32_I32: u64 = 127;
const GUARD_F32_U32: u64 = 255;
const GUARD_F32_I64: u64 = (1 << 39) - 1;
const GUARD_F32_U64: u64 = (1 << 40) - 1;
const GUARD_F64_I64: u64 = 1023;
const GUARD_F64_U64: u64 = 2047;

/// Margin between `dest`'s maximum and the largest `source` value accepted
/// for conversion. Zero when the source represents the maximum exactly.
pub fn guard_value(source: NumericType, dest: NumericType, width: LongWidth) -> u64 {
    use NumericType::*;

    // long/ulong take the entry of the fixed-width type they match
    let dest = match (dest, width) {
        (Long, LongWidth::Bits32) => Int32,
        (ULong, LongWidth::Bits32) => UInt32,
        (Long, LongWidth::Bits64) => Int64,
        (ULong, LongWidth::Bits64) => UInt64,
        (other, _) => other,
    };

    match (source, dest) {
        (Float32, Int32) => GUARD_F32_I32,
        (Float32, UInt32) => GUARD_F32_U32,
        (Float32, Int64) => GUARD_F32_I64,
        (Float32, UInt64) => GUARD_F32_U64,
        (Float64, Int64) => GUARD_F64_I64,
        (Float64, UInt64) => GUARD_F64_U64,
        _ => 0,
    }
}

/// Computes the guard band for converting `source` values into `dest`.
pub fn guard_band(source: NumericType, dest: NumericType, limits: &TypeLimits) -> Span {
    let (src, dst) = (limits.limits(source), limits.limits(dest));

    match (src, dst) {
        // i128 holds every integer limit, so the intersection cannot overflow
        (Span::Int { min: smin, max: smax }, Span::Int { min: dmin, max: dmax }) => Span::Int {
            min: smin.max(dmin),
            max: smax.min(dmax),
        },
        (Span::Float { min: smin, max: smax }, Span::Int { min: dmin, max: dmax }) => {
            let guard = i128::from(guard_value(source, dest, limits.width()));
            // dmax - guard is exact in the source float. The minimum needs no
            // guard: it is 0 or a negated power of two.
            Span::Float {
                min: (dmin as f64).max(smin),
                max: ((dmax - guard) as f64).min(smax),
            }
        }
        (Span::Int { .. }, Span::Float { .. }) => src,
        (Span::Float { min: smin, max: smax }, Span::Float { min: dmin, max: dmax }) => {
            Span::Float {
                min: smin.max(dmin),
                max: smax.min(dmax),
            }
        }
    }
}

/// Guard bands for every ordered type pair, computed once per long width.
#[derive(Debug, Clone, PartialEq)]
pub struct GuardBandTable {
    width: LongWidth,
    bands: [[Span; 12]; 12],
}

impl GuardBandTable {
    pub fn build(limits: &TypeLimits) -> Self {
        let bands = NumericType::ALL
            .map(|source| NumericType::ALL.map(|dest| guard_band(source, dest, limits)));

        GuardBandTable {
            width: limits.width(),
            bands,
        }
    }

    /// Process-wide table for the native `long` width.
    pub fn native() -> &'static GuardBandTable {
        static TABLE: OnceLock<GuardBandTable> = OnceLock::new();
        TABLE.get_or_init(|| {
            let table = GuardBandTable::build(TypeLimits::native());
            debug!(
                "guard band table built for {}-bit long",
                table.width.bits()
            );
            table
        })
    }

    pub fn width(&self) -> LongWidth {
        self.width
    }

    pub fn get(&self, source: NumericType, dest: NumericType) -> Span {
        self.bands[source.index()][dest.index()]
    }
}
