//! Call-shape resolution shared by every operation.
//!
//! A call is a list of positional [`Arg`]s plus [`CallOptions`]. Before any
//! element is touched the dispatcher checks, in order: the options against the
//! operation's capabilities, the positional shape, the element types, the
//! platform type set, the lengths, and the scalar operand. Only then is the
//! typed kernel looked up and run.

use log::trace;

use crate::error::{length_error, type_error, type_mismatch, ArrayError, Result};
use crate::limits::{Platform, TypeLimits};
use crate::simd::slice::{self, choose_path, Operand};
use crate::types::{with_kind, Element, Kind, NumericType, Scalar, TypedArray, Wide};

use super::arith::{compare_kernel, Arith};
use super::{Arity, CallOptions, Operation};

/// One positional argument of an operation call.
#[derive(Debug)]
pub enum Arg<'a> {
    Array(&'a mut TypedArray),
    Scalar(Scalar),
}

impl<'a> From<&'a mut TypedArray> for Arg<'a> {
    fn from(array: &'a mut TypedArray) -> Self {
        Arg::Array(array)
    }
}

impl From<Scalar> for Arg<'_> {
    fn from(scalar: Scalar) -> Self {
        Arg::Scalar(scalar)
    }
}

macro_rules! arg_from_scalar {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Arg<'_> {
                fn from(value: $t) -> Self {
                    Arg::Scalar(Scalar::from(value))
                }
            }
        )*
    };
}

arg_from_scalar!(i8, u8, i16, u16, i32, u32, i64, u64, i128, f32, f64);

/// What a successful call produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallResult {
    /// Results were written to the output (or in-place) array.
    Applied,
    /// A comparison ran; `true` when the relation held at every position.
    Compared(bool),
}

impl CallResult {
    pub fn compared(self) -> Option<bool> {
        match self {
            CallResult::Compared(holds) => Some(holds),
            CallResult::Applied => None,
        }
    }
}

/// A resolved operand.
#[derive(Debug, Clone, Copy)]
enum Side<'s> {
    Array(&'s TypedArray),
    Scalar(Scalar),
    /// The output array, read in place.
    Target,
}

impl<'s> Side<'s> {
    fn array(self) -> Option<&'s TypedArray> {
        match self {
            Side::Array(array) => Some(array),
            _ => None,
        }
    }
}

fn check_count(args: &[Arg<'_>], max: usize) -> Result<()> {
    match args.len() {
        0 => Err(type_error("no parameters")),
        n if n > max => Err(type_error(format!(
            "too many parameters: expected at most {max}, got {n}"
        ))),
        _ => Ok(()),
    }
}

fn binary_shape<'s>(args: &'s mut [Arg<'_>]) -> Result<(Side<'s>, Side<'s>, &'s mut TypedArray)> {
    check_count(args, 3)?;

    match args {
        [_] => Err(type_error("missing parameter")),
        [Arg::Array(target), Arg::Scalar(scalar)] => Ok((Side::Target, Side::Scalar(*scalar), &mut **target)),
        [Arg::Scalar(scalar), Arg::Array(target)] => Ok((Side::Scalar(*scalar), Side::Target, &mut **target)),
        [Arg::Array(target), Arg::Array(right)] => Ok((Side::Target, Side::Array(&**right), &mut **target)),
        [Arg::Array(left), Arg::Scalar(scalar), Arg::Array(output)] => {
            Ok((Side::Array(&**left), Side::Scalar(*scalar), &mut **output))
        }
        [Arg::Scalar(scalar), Arg::Array(right), Arg::Array(output)] => {
            Ok((Side::Scalar(*scalar), Side::Array(&**right), &mut **output))
        }
        [Arg::Array(left), Arg::Array(right), Arg::Array(output)] => {
            Ok((Side::Array(&**left), Side::Array(&**right), &mut **output))
        }
        [Arg::Scalar(_), Arg::Scalar(_), ..] => Err(type_error("at least one operand must be an array")),
        _ => Err(type_error("output must be an array")),
    }
}

fn unary_shape<'s>(args: &'s mut [Arg<'_>]) -> Result<(Side<'s>, &'s mut TypedArray)> {
    check_count(args, 2)?;

    match args {
        [Arg::Array(target)] => Ok((Side::Target, &mut **target)),
        [Arg::Array(input), Arg::Array(output)] => Ok((Side::Array(&**input), &mut **output)),
        [Arg::Scalar(_), ..] => Err(type_error("operand must be an array")),
        _ => Err(type_error("output must be an array")),
    }
}

fn compare_shape<'s>(args: &'s [Arg<'_>]) -> Result<(Side<'s>, Side<'s>)> {
    check_count(args, 2)?;

    match args {
        [_] => Err(type_error("missing parameter")),
        [Arg::Array(left), Arg::Scalar(scalar)] => Ok((Side::Array(&**left), Side::Scalar(*scalar))),
        [Arg::Scalar(scalar), Arg::Array(right)] => Ok((Side::Scalar(*scalar), Side::Array(&**right))),
        [Arg::Array(left), Arg::Array(right)] => Ok((Side::Array(&**left), Side::Array(&**right))),
        _ => Err(type_error("at least one operand must be an array")),
    }
}

/// Fails when an operand array's type differs from `ty`.
fn check_types(ty: NumericType, operands: &[&TypedArray]) -> Result<NumericType> {
    match operands.iter().map(|array| array.numeric_type()).find(|&other| other != ty) {
        Some(other) => Err(type_error(format!(
            "array types do not match: {ty} and {other}"
        ))),
        None => Ok(ty),
    }
}

/// Number of elements to process.
///
/// `inputs` are the lengths of the operand arrays, `output` the length of a
/// separate output array.
fn processed_length(inputs: &[usize], output: Option<usize>, maxlen: Option<usize>) -> Result<usize> {
    if inputs.contains(&0) || output == Some(0) {
        return Err(length_error("array length must not be zero"));
    }

    let natural = inputs.iter().copied().min().unwrap_or(0);
    if maxlen.is_none() && inputs.iter().any(|&len| len != natural) {
        return Err(length_error("array length mismatch"));
    }

    let len = maxlen.map_or(natural, |limit| limit.min(natural));

    match output {
        Some(out) if maxlen.is_none() && out != natural => Err(length_error(format!(
            "output length {out} does not match input length {natural}"
        ))),
        Some(out) if out < len => Err(length_error(format!(
            "output length {out} is shorter than {len}"
        ))),
        _ => Ok(len),
    }
}

/// Converts a scalar operand to the element type of the arrays it meets.
fn scalar_value<E: Element>(scalar: Scalar, ty: NumericType, limits: &TypeLimits) -> Result<E> {
    match scalar {
        Scalar::Float(_) if !E::FLOATING => Err(type_error(format!(
            "a float scalar cannot be combined with an array of type {ty}"
        ))),
        Scalar::Float(value) => Ok(E::narrow(Wide::Float(value))),
        Scalar::Int(value) if limits.limits(ty).contains(Wide::Int(value)) => Ok(E::narrow(Wide::Int(value))),
        Scalar::Int(value) => Err(ArrayError::ScalarOverflow { value, ty }),
    }
}

fn operand<'s, K: Kind>(side: Side<'s>, len: usize, limits: &TypeLimits) -> Result<Operand<'s, K::Elem>> {
    match side {
        Side::Array(array) => K::slice(array)
            .map(|values| Operand::Slice(&values[..len]))
            .ok_or_else(|| type_mismatch(format!("expected an array of type {}", K::TYPE))),
        Side::Scalar(scalar) => scalar_value::<K::Elem>(scalar, K::TYPE, limits).map(Operand::Scalar),
        Side::Target => Ok(Operand::Target),
    }
}

fn output_slice<K: Kind>(output: &mut TypedArray, len: usize) -> Result<&mut [K::Elem]> {
    K::slice_mut(output)
        .map(|values| &mut values[..len])
        .ok_or_else(|| type_mismatch(format!("expected an output array of type {}", K::TYPE)))
}

fn unsupported(op: Operation, ty: NumericType) -> ArrayError {
    type_error(format!("{op}() is not supported for arrays of type {ty}"))
}

/// Validates and runs one operation call.
pub(crate) fn dispatch(
    platform: &Platform,
    op: Operation,
    args: &mut [Arg<'_>],
    options: &CallOptions,
) -> Result<CallResult> {
    options.validate(op)?;

    match op.capabilities().arity {
        Arity::Binary => {
            let (left, right, output) = binary_shape(args)?;
            let inputs: Vec<&TypedArray> = [left.array(), right.array()].into_iter().flatten().collect();
            let ty = check_types(output.numeric_type(), &inputs)?;
            platform.require(ty)?;

            let in_place = matches!(left, Side::Target) || matches!(right, Side::Target);
            let len = if in_place {
                processed_length(&input_lengths(&inputs, Some(output.len())), None, options.limit())?
            } else {
                processed_length(&input_lengths(&inputs, None), Some(output.len()), options.limit())?
            };

            with_kind!(ty, K => run_binary::<K>(platform, op, left, right, output, len, options))?;
            Ok(CallResult::Applied)
        }
        Arity::Unary => {
            let (input, output) = unary_shape(args)?;
            let inputs: Vec<&TypedArray> = input.array().into_iter().collect();
            let ty = check_types(output.numeric_type(), &inputs)?;
            platform.require(ty)?;

            let len = if matches!(input, Side::Target) {
                processed_length(&[output.len()], None, options.limit())?
            } else {
                processed_length(&input_lengths(&inputs, None), Some(output.len()), options.limit())?
            };

            with_kind!(ty, K => run_unary::<K>(platform, op, input, output, len, options))?;
            Ok(CallResult::Applied)
        }
        Arity::Compare => {
            let (left, right) = compare_shape(args)?;
            let inputs: Vec<&TypedArray> = [left.array(), right.array()].into_iter().flatten().collect();
            let first = inputs
                .first()
                .map(|array| array.numeric_type())
                .ok_or_else(|| type_error("at least one operand must be an array"))?;
            let ty = check_types(first, &inputs)?;
            platform.require(ty)?;

            let len = processed_length(&input_lengths(&inputs, None), None, options.limit())?;

            let holds = with_kind!(ty, K => run_compare::<K>(platform, op, left, right, len, options))?;
            Ok(CallResult::Compared(holds))
        }
    }
}

fn input_lengths(inputs: &[&TypedArray], target: Option<usize>) -> Vec<usize> {
    inputs.iter().map(|array| array.len()).chain(target).collect()
}

fn run_binary<K: Kind>(
    platform: &Platform,
    op: Operation,
    left: Side<'_>,
    right: Side<'_>,
    output: &mut TypedArray,
    len: usize,
    options: &CallOptions,
) -> Result<()>
where
    K::Elem: Arith,
{
    let kernel = K::Elem::binary_kernel(op).ok_or_else(|| unsupported(op, K::TYPE))?;
    let limits = TypeLimits::native();
    let (left, right) = (operand::<K>(left, len, limits)?, operand::<K>(right, len, limits)?);
    let out = output_slice::<K>(output, len)?;

    let checked = options.checked();
    let path = choose_path(platform.simd(), op, K::TYPE, len, options.scalar_only(), op.can_fail(checked));
    trace!("{op} on {}: len={len}, checked={checked}, path={path:?}", K::TYPE);

    slice::binary(left, right, out, move |a, b| kernel(a, b, checked), path)
}

fn run_unary<K: Kind>(
    platform: &Platform,
    op: Operation,
    input: Side<'_>,
    output: &mut TypedArray,
    len: usize,
    options: &CallOptions,
) -> Result<()>
where
    K::Elem: Arith,
{
    let kernel = K::Elem::unary_kernel(op).ok_or_else(|| unsupported(op, K::TYPE))?;
    let input = operand::<K>(input, len, TypeLimits::native())?;
    let out = output_slice::<K>(output, len)?;

    let checked = options.checked();
    let path = choose_path(platform.simd(), op, K::TYPE, len, options.scalar_only(), op.can_fail(checked));
    trace!("{op} on {}: len={len}, checked={checked}, path={path:?}", K::TYPE);

    slice::unary(input, out, move |a| kernel(a, checked), path)
}

fn run_compare<K: Kind>(
    platform: &Platform,
    op: Operation,
    left: Side<'_>,
    right: Side<'_>,
    len: usize,
    options: &CallOptions,
) -> Result<bool> {
    let kernel = compare_kernel::<K::Elem>(op).ok_or_else(|| unsupported(op, K::TYPE))?;
    let limits = TypeLimits::native();
    let (left, right) = (operand::<K>(left, len, limits)?, operand::<K>(right, len, limits)?);

    let path = choose_path(platform.simd(), op, K::TYPE, len, options.scalar_only(), false);
    trace!("{op} on {}: len={len}, path={path:?}", K::TYPE);

    Ok(slice::compare(left, right, len, kernel, path))
}
