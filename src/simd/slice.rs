//! Element loop drivers shared by every operation.
//!
//! Three paths compute the same thing:
//!
//! - **Scalar**: one element at a time.
//! - **Lanes**: lane blocks as wide as a vector register. Each block is
//!   computed element by element into a stack buffer and committed to the
//!   output; when a kernel faults inside a block, the lanes before the fault
//!   are committed and the loop stops, which leaves the output exactly as
//!   the scalar path would.
//! - **Parallel**: lane blocks spread over rayon workers in
//!   `PARALLEL_CHUNK_SIZE` chunks. Only used for runs that cannot fail, so
//!   there is never a partially written chunk to reason about.

use rayon::prelude::*;

use crate::error::{Fault, Result};
use crate::ops::Operation;
use crate::simd::{SimdSupport, MAX_LANES};
use crate::types::{Element, NumericType};
use crate::{PARALLEL_CHUNK_SIZE, PARALLEL_SIMD_THRESHOLD, SIMD_THRESHOLD};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Path {
    Scalar,
    Lanes(usize),
    Parallel(usize),
}

/// Picks the path for one call.
pub(crate) fn choose_path(
    support: SimdSupport,
    op: Operation,
    ty: NumericType,
    len: usize,
    nosimd: bool,
    can_fail: bool,
) -> Path {
    if nosimd || len < SIMD_THRESHOLD || !support.supports(op, ty) {
        return Path::Scalar;
    }

    let lanes = support.lanes(ty);
    if !can_fail && len >= PARALLEL_SIMD_THRESHOLD {
        Path::Parallel(lanes)
    } else {
        Path::Lanes(lanes)
    }
}

/// One side of an elementwise operation.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Operand<'a, T> {
    Slice(&'a [T]),
    Scalar(T),
    /// The output array's own current values (in-place operation).
    Target,
}

impl<'a, T: Copy> Operand<'a, T> {
    #[inline(always)]
    fn at(&self, index: usize, target: &[T]) -> T {
        match self {
            Operand::Slice(values) => values[index],
            Operand::Scalar(value) => *value,
            Operand::Target => target[index],
        }
    }

    fn window(&self, start: usize, len: usize) -> Operand<'a, T> {
        match *self {
            Operand::Slice(values) => Operand::Slice(&values[start..start + len]),
            other => other,
        }
    }
}

/// Computes `out[i] = kernel(left[i], right[i])` for every `i` in `out`.
pub(crate) fn binary<T, F>(
    left: Operand<'_, T>,
    right: Operand<'_, T>,
    out: &mut [T],
    kernel: F,
    path: Path,
) -> Result<()>
where
    T: Element,
    F: Fn(T, T) -> std::result::Result<T, Fault> + Sync,
{
    match path {
        Path::Scalar => binary_scalar(left, right, out, &kernel, 0),
        Path::Lanes(lanes) => binary_lanes(left, right, out, &kernel, lanes, 0),
        Path::Parallel(lanes) => out
            .par_chunks_mut(PARALLEL_CHUNK_SIZE)
            .enumerate()
            .try_for_each(|(chunk, block)| {
                let start = chunk * PARALLEL_CHUNK_SIZE;
                let len = block.len();
                binary_lanes(
                    left.window(start, len),
                    right.window(start, len),
                    block,
                    &kernel,
                    lanes,
                    start,
                )
            }),
    }
}

/// Computes `out[i] = kernel(input[i])` for every `i` in `out`.
pub(crate) fn unary<T, F>(input: Operand<'_, T>, out: &mut [T], kernel: F, path: Path) -> Result<()>
where
    T: Element,
    F: Fn(T) -> std::result::Result<T, Fault> + Sync,
{
    binary(input, Operand::Scalar(T::default()), out, |a, _| kernel(a), path)
}

fn binary_scalar<T, F>(
    left: Operand<'_, T>,
    right: Operand<'_, T>,
    out: &mut [T],
    kernel: &F,
    offset: usize,
) -> Result<()>
where
    T: Element,
    F: Fn(T, T) -> std::result::Result<T, Fault>,
{
    for index in 0..out.len() {
        let (a, b) = (left.at(index, out), right.at(index, out));
        out[index] = kernel(a, b).map_err(|fault| fault.at(offset + index))?;
    }
    Ok(())
}

fn binary_lanes<T, F>(
    left: Operand<'_, T>,
    right: Operand<'_, T>,
    out: &mut [T],
    kernel: &F,
    lanes: usize,
    offset: usize,
) -> Result<()>
where
    T: Element,
    F: Fn(T, T) -> std::result::Result<T, Fault>,
{
    let lanes = lanes.clamp(1, MAX_LANES);
    let size = out.len();

    let nb_lanes = size - (size % lanes);
    let rem_lanes = size - nb_lanes;

    for start in (0..nb_lanes).step_by(lanes) {
        binary_block(left, right, out, kernel, start, lanes, offset)?;
    }

    if rem_lanes > 0 {
        binary_block(left, right, out, kernel, nb_lanes, rem_lanes, offset)?;
    }

    Ok(())
}

#[inline(always)]
fn binary_block<T, F>(
    left: Operand<'_, T>,
    right: Operand<'_, T>,
    out: &mut [T],
    kernel: &F,
    start: usize,
    len: usize,
    offset: usize,
) -> Result<()>
where
    T: Element,
    F: Fn(T, T) -> std::result::Result<T, Fault>,
{
    let mut block = [T::default(); MAX_LANES];
    let mut failure = None;

    for (lane, slot) in block[..len].iter_mut().enumerate() {
        let index = start + lane;
        match kernel(left.at(index, out), right.at(index, out)) {
            Ok(value) => *slot = value,
            Err(fault) => {
                failure = Some((lane, fault));
                break;
            }
        }
    }

    let committed = failure.map_or(len, |(lane, _)| lane);
    out[start..start + committed].copy_from_slice(&block[..committed]);

    match failure {
        Some((lane, fault)) => Err(fault.at(offset + start + lane)),
        None => Ok(()),
    }
}

/// Whether `kernel(left[i], right[i])` holds for every `i < len`. Neither
/// operand may be `Target`.
pub(crate) fn compare<T, F>(left: Operand<'_, T>, right: Operand<'_, T>, len: usize, kernel: F, path: Path) -> bool
where
    T: Element,
    F: Fn(T, T) -> bool + Sync,
{
    match path {
        Path::Scalar => (0..len).all(|index| kernel(left.at(index, &[]), right.at(index, &[]))),
        Path::Lanes(lanes) => compare_lanes(left, right, len, &kernel, lanes),
        Path::Parallel(lanes) => (0..len.div_ceil(PARALLEL_CHUNK_SIZE))
            .into_par_iter()
            .all(|chunk| {
                let start = chunk * PARALLEL_CHUNK_SIZE;
                let n = PARALLEL_CHUNK_SIZE.min(len - start);
                compare_lanes(left.window(start, n), right.window(start, n), n, &kernel, lanes)
            }),
    }
}

fn compare_lanes<T, F>(left: Operand<'_, T>, right: Operand<'_, T>, len: usize, kernel: &F, lanes: usize) -> bool
where
    T: Element,
    F: Fn(T, T) -> bool,
{
    let lanes = lanes.clamp(1, MAX_LANES);
    let mut mask = [false; MAX_LANES];

    for start in (0..len).step_by(lanes) {
        let width = lanes.min(len - start);
        for (lane, hit) in mask[..width].iter_mut().enumerate() {
            let index = start + lane;
            *hit = kernel(left.at(index, &[]), right.at(index, &[]));
        }
        if !mask[..width].iter().all(|&hit| hit) {
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ArrayError;

    fn checked_add(a: i8, b: i8) -> std::result::Result<i8, Fault> {
        a.checked_add(b).ok_or(Fault::Overflow)
    }

    #[test]
    fn test_paths_agree_on_success() {
        let left: Vec<i8> = (0..100).map(|i| (i % 50) as i8).collect();
        let right: Vec<i8> = (0..100).map(|i| (i % 7) as i8).collect();

        let mut expected = vec![0i8; 100];
        binary(
            Operand::Slice(&left),
            Operand::Slice(&right),
            &mut expected,
            checked_add,
            Path::Scalar,
        )
        .unwrap();

        for path in [Path::Lanes(16), Path::Lanes(3), Path::Parallel(32)] {
            let mut out = vec![0i8; 100];
            binary(Operand::Slice(&left), Operand::Slice(&right), &mut out, checked_add, path).unwrap();
            assert_eq!(out, expected, "{path:?}");
        }
    }

    #[test]
    fn test_lanes_commit_prefix_on_fault() {
        let left: Vec<i8> = (0..40).map(|i| if i == 21 { 127 } else { i as i8 }).collect();

        let mut scalar = vec![-1i8; 40];
        let scalar_result = binary(
            Operand::Slice(&left),
            Operand::Scalar(1),
            &mut scalar,
            checked_add,
            Path::Scalar,
        );

        let mut lanes = vec![-1i8; 40];
        let lanes_result = binary(
            Operand::Slice(&left),
            Operand::Scalar(1),
            &mut lanes,
            checked_add,
            Path::Lanes(16),
        );

        assert_eq!(scalar_result, Err(ArrayError::Overflow { index: 21 }));
        assert_eq!(lanes_result, scalar_result);
        assert_eq!(lanes, scalar);
        assert_eq!(lanes[20], 21);
        assert_eq!(lanes[21], -1);
    }

    #[test]
    fn test_in_place_reads_target() {
        let mut values = vec![1i32, 2, 3, 4, 5];
        unary(Operand::Target, &mut values, |a: i32| Ok(a * 10), Path::Lanes(2)).unwrap();
        assert_eq!(values, vec![10, 20, 30, 40, 50]);

        let mut values = vec![1i32, 2, 3];
        binary(
            Operand::Scalar(100),
            Operand::Target,
            &mut values,
            |a: i32, b: i32| Ok(a - b),
            Path::Scalar,
        )
        .unwrap();
        assert_eq!(values, vec![99, 98, 97]);
    }

    #[test]
    fn test_compare_paths() {
        let data: Vec<u16> = (0..1000).collect();
        for path in [Path::Scalar, Path::Lanes(8), Path::Parallel(8)] {
            assert!(compare(Operand::Slice(&data), Operand::Scalar(1000), 1000, |a, b| a < b, path));
            assert!(!compare(Operand::Slice(&data), Operand::Scalar(999), 1000, |a, b| a < b, path));
            assert!(compare(Operand::Slice(&data), Operand::Scalar(999), 999, |a, b| a < b, path));
        }
    }

    #[test]
    fn test_choose_path() {
        let support = SimdSupport::detect();
        let ty = NumericType::Int32;
        assert_eq!(
            choose_path(support, Operation::Add, ty, 1_000, true, true),
            Path::Scalar
        );
        assert_eq!(
            choose_path(support, Operation::Add, ty, SIMD_THRESHOLD - 1, false, true),
            Path::Scalar
        );
        assert_eq!(
            choose_path(SimdSupport::none(), Operation::Add, ty, 1_000, false, true),
            Path::Scalar
        );
        assert_eq!(
            choose_path(support, Operation::Pow, ty, 1_000, false, true),
            Path::Scalar
        );
        if support.is_available() {
            let lanes = support.lanes(ty);
            assert_eq!(
                choose_path(support, Operation::Add, ty, 1_000, false, true),
                Path::Lanes(lanes)
            );
            assert_eq!(
                choose_path(support, Operation::Add, ty, PARALLEL_SIMD_THRESHOLD, false, false),
                Path::Parallel(lanes)
            );
            assert_eq!(
                choose_path(support, Operation::Add, ty, PARALLEL_SIMD_THRESHOLD, false, true),
                Path::Lanes(lanes)
            );
        }
    }
}
