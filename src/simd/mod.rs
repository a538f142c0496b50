//! Vector capability probe and the element loop drivers.
//!
//! The lane-block path processes elements in blocks as wide as a vector
//! register. Its width comes from two sources that must agree: the `cfg` flag
//! `build.rs` derives from the build host (`avx512`, `avx2`, `sse`, `neon` or
//! `fallback`) and a runtime check of the CPU actually running the code. A
//! `fallback` build, or a CPU without the compiled-for extension, has no
//! lane-block path.

pub(crate) mod slice;

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
use std::arch::is_x86_feature_detected;

#[cfg(target_arch = "aarch64")]
use std::arch::is_aarch64_feature_detected;

use crate::ops::Operation;
use crate::types::NumericType;

/// Widest block, in elements, any lane path uses (64 one-byte lanes).
pub(crate) const MAX_LANES: usize = 64;

/// Vector width available to the lane path, in bytes. Zero means none.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimdSupport {
    lane_bytes: usize,
}

impl SimdSupport {
    pub fn detect() -> Self {
        SimdSupport {
            lane_bytes: compiled_lane_bytes().min(runtime_lane_bytes()),
        }
    }

    pub const fn none() -> Self {
        SimdSupport { lane_bytes: 0 }
    }

    pub fn lane_bytes(&self) -> usize {
        self.lane_bytes
    }

    pub fn is_available(&self) -> bool {
        self.lane_bytes > 0
    }

    /// Elements of `ty` per vector block.
    pub fn lanes(&self, ty: NumericType) -> usize {
        (self.lane_bytes / element_size(ty)).clamp(1, MAX_LANES)
    }

    /// Whether `op` on `ty` has a lane path here.
    pub fn supports(&self, op: Operation, ty: NumericType) -> bool {
        self.is_available() && op.capabilities().nosimd && self.lanes(ty) > 1
    }
}

fn element_size(ty: NumericType) -> usize {
    use std::ffi::c_long;

    match ty {
        NumericType::Int8 | NumericType::UInt8 => 1,
        NumericType::Int16 | NumericType::UInt16 => 2,
        NumericType::Int32 | NumericType::UInt32 | NumericType::Float32 => 4,
        NumericType::Long | NumericType::ULong => std::mem::size_of::<c_long>(),
        NumericType::Int64 | NumericType::UInt64 | NumericType::Float64 => 8,
    }
}

fn compiled_lane_bytes() -> usize {
    if cfg!(avx512) {
        64
    } else if cfg!(avx2) {
        32
    } else if cfg!(any(sse, neon)) {
        16
    } else {
        0
    }
}

#[allow(unreachable_code)]
fn runtime_lane_bytes() -> usize {
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    {
        if is_x86_feature_detected!("avx512f") {
            return 64;
        }
        if is_x86_feature_detected!("avx2") {
            return 32;
        }
        if is_x86_feature_detected!("sse4.1") {
            return 16;
        }
        return 0;
    }

    #[cfg(target_arch = "aarch64")]
    {
        if is_aarch64_feature_detected!("neon") {
            return 16;
        }
        return 0;
    }

    0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_has_no_lane_path() {
        let support = SimdSupport::none();
        assert!(!support.is_available());
        assert!(!support.supports(Operation::Add, NumericType::Int8));
    }

    #[test]
    fn test_lanes_scale_with_element_size() {
        let support = SimdSupport { lane_bytes: 32 };
        assert_eq!(support.lanes(NumericType::Int8), 32);
        assert_eq!(support.lanes(NumericType::Float32), 8);
        assert_eq!(support.lanes(NumericType::UInt64), 4);

        let support = SimdSupport { lane_bytes: 64 };
        assert_eq!(support.lanes(NumericType::UInt8), MAX_LANES);
    }

    #[test]
    fn test_operations_without_vector_path() {
        let support = SimdSupport { lane_bytes: 16 };
        assert!(support.supports(Operation::LShift, NumericType::Int8));
        assert!(!support.supports(Operation::Pow, NumericType::Int8));
        assert!(!support.supports(Operation::Factorial, NumericType::UInt64));
    }

    #[test]
    fn test_detect_never_exceeds_compiled_width() {
        assert!(SimdSupport::detect().lane_bytes() <= compiled_lane_bytes());
    }
}
