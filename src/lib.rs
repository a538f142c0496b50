//! Typed elementwise array arithmetic.
//!
//! Arrays are homogeneous [`TypedArray`]s over twelve element types. Two
//! families of entry points work on them:
//!
//! - [`convert`] copies one array into another of a possibly different type.
//!   Every element is range-checked against a precomputed guard band, so a
//!   value that would not survive the cast fails with an overflow error
//!   instead of being truncated.
//! - [`call`] runs one of the [`Operation`]s on scalar/array operands, in
//!   place or into a separate output array, optionally limited to the first
//!   `maxlen` elements.
//!
//! Long runs take a lane-block path that computes blocks as wide as the CPU's
//! vector registers into a stack buffer. Runs that cannot fail are also
//! spread across threads. Every path yields exactly the results of the
//! one-element-at-a-time path; `nosimd` selects the loop shape, never the
//! result.
//!
//! ```
//! use simdarith::{call, Arg, CallOptions, Operation, TypedArray};
//!
//! let mut data = TypedArray::from(vec![1i8, 2, 3]);
//! call(Operation::LShift, &mut [Arg::from(&mut data), Arg::from(2i32)], &CallOptions::new()).unwrap();
//! assert_eq!(data, TypedArray::from(vec![4i8, 8, 12]));
//! ```

mod convert;
pub mod engine;
pub mod error;
pub mod guard;
pub mod limits;
pub mod ops;
pub mod simd;
pub mod types;

pub use engine::Engine;
pub use error::{ArrayError, Result};
pub use guard::GuardBandTable;
pub use limits::{LongWidth, Platform, Span, TypeLimits, TypeSet};
pub use ops::{Arg, CallOptions, CallResult, Kwargs, Operation, Value};
pub use simd::SimdSupport;
pub use types::{NumericType, Scalar, TypedArray, Wide};

/// Below this many elements the vector path is skipped.
pub const SIMD_THRESHOLD: usize = 64;

/// From this many elements, runs that cannot fail are split across threads.
pub const PARALLEL_SIMD_THRESHOLD: usize = 131_072;

/// Elements per thread task on the parallel path.
pub const PARALLEL_CHUNK_SIZE: usize = 16_384;

/// Converts `input` into `output` on the native platform.
///
/// See [`Engine::convert`].
pub fn convert(input: &TypedArray, output: &mut TypedArray, maxlen: Option<usize>) -> Result<()> {
    Engine::native().convert(input, output, maxlen)
}

/// Converts `input` into a new array of type `ty` on the native platform.
pub fn convert_to(input: &TypedArray, ty: NumericType) -> Result<TypedArray> {
    Engine::native().convert_to(input, ty)
}

/// Runs `op` on the native platform.
pub fn call(op: Operation, args: &mut [Arg<'_>], options: &CallOptions) -> Result<CallResult> {
    Engine::native().call(op, args, options)
}

/// Runs `op` on the native platform with options given by name.
pub fn call_with_kwargs(op: Operation, args: &mut [Arg<'_>], kwargs: &Kwargs) -> Result<CallResult> {
    Engine::native().call_with_kwargs(op, args, kwargs)
}
