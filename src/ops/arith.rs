//! Per-element math for every operation and element type.
//!
//! Kernels take a `checked` flag. When set, overflow and domain problems are
//! reported as a [`Fault`]; when clear, integers wrap in two's complement and
//! floats keep their IEEE result. Division by zero and negative shift counts
//! on integers are reported either way.

use num::traits::{CheckedNeg, WrappingAdd, WrappingMul, WrappingNeg, WrappingSub};
use num::{Float, PrimInt};

use crate::error::Fault;
use crate::types::Element;

use super::Operation;

pub(crate) type BinaryFn<T> = fn(T, T, bool) -> Result<T, Fault>;
pub(crate) type UnaryFn<T> = fn(T, bool) -> Result<T, Fault>;
pub(crate) type CompareFn<T> = fn(T, T) -> bool;

pub(crate) trait Arith: Element {
    /// `None` when the operation is not binary or not defined for `Self`.
    fn binary_kernel(op: Operation) -> Option<BinaryFn<Self>>;

    /// `None` when the operation is not unary or not defined for `Self`.
    fn unary_kernel(op: Operation) -> Option<UnaryFn<Self>>;
}

pub(crate) fn compare_kernel<T: PartialOrd>(op: Operation) -> Option<CompareFn<T>> {
    let kernel: CompareFn<T> = match op {
        Operation::Eq => |a, b| a == b,
        Operation::Ne => |a, b| a != b,
        Operation::Lt => |a, b| a < b,
        Operation::Le => |a, b| a <= b,
        Operation::Gt => |a, b| a > b,
        Operation::Ge => |a, b| a >= b,
        _ => return None,
    };
    Some(kernel)
}

pub(crate) trait IntElement:
    Element + PrimInt + WrappingAdd + WrappingSub + WrappingMul + WrappingNeg + CheckedNeg
{
}

impl<T> IntElement for T where
    T: Element + PrimInt + WrappingAdd + WrappingSub + WrappingMul + WrappingNeg + CheckedNeg
{
}

fn int_add<T: IntElement>(a: T, b: T, checked: bool) -> Result<T, Fault> {
    if checked {
        a.checked_add(&b).ok_or(Fault::Overflow)
    } else {
        Ok(a.wrapping_add(&b))
    }
}

fn int_sub<T: IntElement>(a: T, b: T, checked: bool) -> Result<T, Fault> {
    if checked {
        a.checked_sub(&b).ok_or(Fault::Overflow)
    } else {
        Ok(a.wrapping_sub(&b))
    }
}

fn int_mul<T: IntElement>(a: T, b: T, checked: bool) -> Result<T, Fault> {
    if checked {
        a.checked_mul(&b).ok_or(Fault::Overflow)
    } else {
        Ok(a.wrapping_mul(&b))
    }
}

// MIN / -1 is the one quotient that does not fit.
fn is_min_by_minus_one<T: IntElement>(a: T, b: T) -> bool {
    T::SIGNED && a == T::min_value() && b == !T::zero()
}

fn int_floordiv<T: IntElement>(a: T, b: T, checked: bool) -> Result<T, Fault> {
    let zero = T::zero();
    if b == zero {
        return Err(Fault::ZeroDivision);
    }
    if is_min_by_minus_one(a, b) {
        return if checked { Err(Fault::Overflow) } else { Ok(a) };
    }

    let (quotient, remainder) = (a / b, a % b);
    if remainder != zero && ((remainder < zero) != (b < zero)) {
        Ok(quotient - T::one())
    } else {
        Ok(quotient)
    }
}

fn int_mod<T: IntElement>(a: T, b: T, _checked: bool) -> Result<T, Fault> {
    let zero = T::zero();
    if b == zero {
        return Err(Fault::ZeroDivision);
    }
    if is_min_by_minus_one(a, b) {
        return Ok(zero);
    }

    // The result takes the sign of the divisor.
    let remainder = a % b;
    if remainder != zero && ((remainder < zero) != (b < zero)) {
        Ok(remainder + b)
    } else {
        Ok(remainder)
    }
}

fn int_pow<T: IntElement>(a: T, b: T, checked: bool) -> Result<T, Fault> {
    let (zero, one) = (T::zero(), T::one());

    if b < zero {
        if checked {
            return Err(Fault::Arithmetic);
        }
        // 1 / a^|b| truncated toward zero
        return Ok(if a == one {
            one
        } else if T::SIGNED && a == !zero {
            if b & one == zero {
                one
            } else {
                a
            }
        } else {
            zero
        });
    }

    let (mut base, mut exponent, mut result) = (a, b, one);
    loop {
        if exponent & one == one {
            result = int_mul(result, base, checked)?;
        }
        exponent = exponent >> 1;
        if exponent == zero {
            return Ok(result);
        }
        base = int_mul(base, base, checked)?;
    }
}

fn shift_count<T: IntElement>(b: T) -> Result<u32, Fault> {
    if b < T::zero() {
        return Err(Fault::Arithmetic);
    }
    Ok(b.to_u32().unwrap_or(u32::MAX))
}

fn int_lshift<T: IntElement>(a: T, b: T, _checked: bool) -> Result<T, Fault> {
    let count = shift_count(b)?;
    if count >= T::BITS {
        return Ok(T::zero());
    }
    // bits shifted past the element width are dropped
    Ok(a << count as usize)
}

fn int_rshift<T: IntElement>(a: T, b: T, _checked: bool) -> Result<T, Fault> {
    let count = shift_count(b)?;
    if count >= T::BITS {
        return Ok(if a < T::zero() { !T::zero() } else { T::zero() });
    }
    Ok(a >> count as usize)
}

fn int_and<T: IntElement>(a: T, b: T, _checked: bool) -> Result<T, Fault> {
    Ok(a & b)
}

fn int_or<T: IntElement>(a: T, b: T, _checked: bool) -> Result<T, Fault> {
    Ok(a | b)
}

fn int_xor<T: IntElement>(a: T, b: T, _checked: bool) -> Result<T, Fault> {
    Ok(a ^ b)
}

fn int_neg<T: IntElement>(a: T, checked: bool) -> Result<T, Fault> {
    if checked {
        a.checked_neg().ok_or(Fault::Overflow)
    } else {
        Ok(a.wrapping_neg())
    }
}

fn int_abs<T: IntElement>(a: T, checked: bool) -> Result<T, Fault> {
    if a < T::zero() {
        int_neg(a, checked)
    } else {
        Ok(a)
    }
}

fn int_invert<T: IntElement>(a: T, _checked: bool) -> Result<T, Fault> {
    Ok(!a)
}

fn int_factorial<T: IntElement>(a: T, checked: bool) -> Result<T, Fault> {
    let (zero, one) = (T::zero(), T::one());

    if a < zero {
        return if checked { Err(Fault::Arithmetic) } else { Ok(one) };
    }
    // n! has at least n / 2 factors of two, so it wraps to zero from 2 * BITS on
    if !checked && a.to_u64().map_or(true, |n| n >= 2 * u64::from(T::BITS)) {
        return Ok(zero);
    }

    let mut product = one;
    let mut factor = one + one;
    while factor <= a {
        product = int_mul(product, factor, checked)?;
        factor = factor + one;
    }
    Ok(product)
}

fn int_binary<T: IntElement>(op: Operation) -> Option<BinaryFn<T>> {
    let kernel: BinaryFn<T> = match op {
        Operation::Add => int_add,
        Operation::Sub => int_sub,
        Operation::Mul => int_mul,
        Operation::FloorDiv => int_floordiv,
        Operation::Mod => int_mod,
        Operation::Pow => int_pow,
        Operation::LShift => int_lshift,
        Operation::RShift => int_rshift,
        Operation::And => int_and,
        Operation::Or => int_or,
        Operation::Xor => int_xor,
        _ => return None,
    };
    Some(kernel)
}

fn int_unary<T: IntElement>(op: Operation) -> Option<UnaryFn<T>> {
    let kernel: UnaryFn<T> = match op {
        Operation::Neg if T::SIGNED => int_neg,
        Operation::Abs => int_abs,
        Operation::Invert => int_invert,
        Operation::Factorial => int_factorial,
        _ => return None,
    };
    Some(kernel)
}

fn finite<T: Float>(result: T, checked: bool) -> Result<T, Fault> {
    if checked && !result.is_finite() {
        Err(Fault::Arithmetic)
    } else {
        Ok(result)
    }
}

fn nonzero<T: Float>(divisor: T, checked: bool) -> Result<(), Fault> {
    if checked && divisor == T::zero() {
        Err(Fault::ZeroDivision)
    } else {
        Ok(())
    }
}

fn float_add<T: Float>(a: T, b: T, checked: bool) -> Result<T, Fault> {
    finite(a + b, checked)
}

fn float_sub<T: Float>(a: T, b: T, checked: bool) -> Result<T, Fault> {
    finite(a - b, checked)
}

fn float_mul<T: Float>(a: T, b: T, checked: bool) -> Result<T, Fault> {
    finite(a * b, checked)
}

fn float_truediv<T: Float>(a: T, b: T, checked: bool) -> Result<T, Fault> {
    nonzero(b, checked)?;
    finite(a / b, checked)
}

fn float_floordiv<T: Float>(a: T, b: T, checked: bool) -> Result<T, Fault> {
    nonzero(b, checked)?;
    finite((a / b).floor(), checked)
}

fn float_mod<T: Float>(a: T, b: T, checked: bool) -> Result<T, Fault> {
    nonzero(b, checked)?;
    let zero = T::zero();
    let remainder = a % b;
    if remainder != zero && ((remainder < zero) != (b < zero)) {
        finite(remainder + b, checked)
    } else {
        finite(remainder, checked)
    }
}

fn float_pow<T: Float>(a: T, b: T, checked: bool) -> Result<T, Fault> {
    finite(a.powf(b), checked)
}

fn float_neg<T: Float>(a: T, _checked: bool) -> Result<T, Fault> {
    Ok(-a)
}

fn float_abs<T: Float>(a: T, _checked: bool) -> Result<T, Fault> {
    Ok(a.abs())
}

fn float_sqrt<T: Float>(a: T, checked: bool) -> Result<T, Fault> {
    if checked && a < T::zero() {
        return Err(Fault::Arithmetic);
    }
    finite(a.sqrt(), checked)
}

fn float_binary<T: Float>(op: Operation) -> Option<BinaryFn<T>> {
    let kernel: BinaryFn<T> = match op {
        Operation::Add => float_add,
        Operation::Sub => float_sub,
        Operation::Mul => float_mul,
        Operation::TrueDiv => float_truediv,
        Operation::FloorDiv => float_floordiv,
        Operation::Mod => float_mod,
        Operation::Pow => float_pow,
        _ => return None,
    };
    Some(kernel)
}

fn float_unary<T: Float>(op: Operation) -> Option<UnaryFn<T>> {
    let kernel: UnaryFn<T> = match op {
        Operation::Neg => float_neg,
        Operation::Abs => float_abs,
        Operation::Sqrt => float_sqrt,
        _ => return None,
    };
    Some(kernel)
}

macro_rules! impl_arith {
    ($binary:ident, $unary:ident: $($t:ty),*) => {
        $(
            impl Arith for $t {
                #[inline]
                fn binary_kernel(op: Operation) -> Option<BinaryFn<Self>> {
                    $binary::<$t>(op)
                }

                #[inline]
                fn unary_kernel(op: Operation) -> Option<UnaryFn<Self>> {
                    $unary::<$t>(op)
                }
            }
        )*
    };
}

impl_arith!(int_binary, int_unary: i8, u8, i16, u16, i32, u32, i64, u64);
impl_arith!(float_binary, float_unary: f32, f64);

#[cfg(test)]
mod tests {
    use super::*;

    fn binary<T: Arith>(op: Operation, a: T, b: T, checked: bool) -> Result<T, Fault> {
        let kernel = T::binary_kernel(op).expect("kernel exists");
        kernel(a, b, checked)
    }

    fn unary<T: Arith>(op: Operation, a: T, checked: bool) -> Result<T, Fault> {
        let kernel = T::unary_kernel(op).expect("kernel exists");
        kernel(a, checked)
    }

    #[test]
    fn test_int_overflow_checked_and_wrapping() {
        assert_eq!(binary(Operation::Add, 127i8, 1, true), Err(Fault::Overflow));
        assert_eq!(binary(Operation::Add, 127i8, 1, false), Ok(-128));
        assert_eq!(binary(Operation::Sub, 0u8, 1, false), Ok(255));
        assert_eq!(binary(Operation::Mul, 16u8, 16, true), Err(Fault::Overflow));
    }

    #[test]
    fn test_floordiv_and_mod_follow_floor_semantics() {
        assert_eq!(binary(Operation::FloorDiv, -7i32, 2, true), Ok(-4));
        assert_eq!(binary(Operation::FloorDiv, 7i32, -2, true), Ok(-4));
        assert_eq!(binary(Operation::Mod, -7i32, 2, true), Ok(1));
        assert_eq!(binary(Operation::Mod, 7i32, -2, true), Ok(-1));
        assert_eq!(binary(Operation::FloorDiv, 7u16, 2, true), Ok(3));
        assert_eq!(binary(Operation::Mod, -7.5f64, 2.0, true), Ok(0.5));
        assert_eq!(binary(Operation::FloorDiv, -7.0f32, 2.0, true), Ok(-4.0));
    }

    #[test]
    fn test_integer_division_by_zero_always_faults() {
        assert_eq!(binary(Operation::FloorDiv, 1i16, 0, false), Err(Fault::ZeroDivision));
        assert_eq!(binary(Operation::Mod, 1u64, 0, false), Err(Fault::ZeroDivision));
        assert_eq!(binary(Operation::TrueDiv, 1.0f64, 0.0, true), Err(Fault::ZeroDivision));
        assert_eq!(binary(Operation::TrueDiv, 1.0f64, 0.0, false), Ok(f64::INFINITY));
    }

    #[test]
    fn test_min_by_minus_one() {
        assert_eq!(binary(Operation::FloorDiv, i8::MIN, -1, true), Err(Fault::Overflow));
        assert_eq!(binary(Operation::FloorDiv, i8::MIN, -1, false), Ok(i8::MIN));
        assert_eq!(binary(Operation::Mod, i32::MIN, -1, true), Ok(0));
    }

    #[test]
    fn test_pow() {
        assert_eq!(binary(Operation::Pow, 3i32, 4, true), Ok(81));
        assert_eq!(binary(Operation::Pow, -2i8, 7, true), Ok(-128));
        assert_eq!(binary(Operation::Pow, 2i8, 7, true), Err(Fault::Overflow));
        assert_eq!(binary(Operation::Pow, 2u8, 9, false), Ok(0));
        assert_eq!(binary(Operation::Pow, 5u8, 0, true), Ok(1));
        assert_eq!(binary(Operation::Pow, 2i32, -1, true), Err(Fault::Arithmetic));
        assert_eq!(binary(Operation::Pow, -1i32, -3, false), Ok(-1));
        assert_eq!(binary(Operation::Pow, 2i32, -3, false), Ok(0));
        assert_eq!(binary(Operation::Pow, 2.0f64, 0.5, true), Ok(2f64.sqrt()));
    }

    #[test]
    fn test_shifts() {
        assert_eq!(binary(Operation::LShift, 1i8, 7, true), Ok(-128));
        assert_eq!(binary(Operation::LShift, 3u8, 7, true), Ok(128));
        assert_eq!(binary(Operation::LShift, 1i16, 16, true), Ok(0));
        assert_eq!(binary(Operation::LShift, 1i16, -1, false), Err(Fault::Arithmetic));
        assert_eq!(binary(Operation::RShift, -128i8, 3, true), Ok(-16));
        assert_eq!(binary(Operation::RShift, -1i32, 40, true), Ok(-1));
        assert_eq!(binary(Operation::RShift, 1000u32, 40, true), Ok(0));
    }

    #[test]
    fn test_unsupported_kernels() {
        assert!(f32::binary_kernel(Operation::LShift).is_none());
        assert!(f64::unary_kernel(Operation::Factorial).is_none());
        assert!(u8::unary_kernel(Operation::Neg).is_none());
        assert!(i32::binary_kernel(Operation::TrueDiv).is_none());
        assert!(i32::binary_kernel(Operation::Neg).is_none());
        assert!(compare_kernel::<i8>(Operation::Add).is_none());
    }

    #[test]
    fn test_unary_int() {
        assert_eq!(unary(Operation::Neg, i8::MIN, true), Err(Fault::Overflow));
        assert_eq!(unary(Operation::Neg, i8::MIN, false), Ok(i8::MIN));
        assert_eq!(unary(Operation::Abs, -5i64, true), Ok(5));
        assert_eq!(unary(Operation::Abs, 200u8, true), Ok(200));
        assert_eq!(unary(Operation::Invert, 0u8, true), Ok(255));
    }

    #[test]
    fn test_factorial() {
        assert_eq!(unary(Operation::Factorial, 0u32, true), Ok(1));
        assert_eq!(unary(Operation::Factorial, 5i16, true), Ok(120));
        assert_eq!(unary(Operation::Factorial, 20u64, true), Ok(2_432_902_008_176_640_000));
        assert_eq!(unary(Operation::Factorial, 21u64, true), Err(Fault::Overflow));
        assert_eq!(unary(Operation::Factorial, -1i32, true), Err(Fault::Arithmetic));
        assert_eq!(unary(Operation::Factorial, -1i32, false), Ok(1));
        assert_eq!(unary(Operation::Factorial, 6u8, false), Ok(208));
        assert_eq!(unary(Operation::Factorial, u64::MAX, false), Ok(0));
    }

    #[test]
    fn test_float_checks() {
        assert_eq!(binary(Operation::Mul, f32::MAX, 2.0, true), Err(Fault::Arithmetic));
        assert_eq!(binary(Operation::Mul, f32::MAX, 2.0, false), Ok(f32::INFINITY));
        assert_eq!(unary(Operation::Sqrt, -1.0f64, true), Err(Fault::Arithmetic));
        assert!(unary(Operation::Sqrt, -1.0f64, false).unwrap().is_nan());
        assert_eq!(unary(Operation::Neg, 2.5f32, true), Ok(-2.5));
    }

    #[test]
    fn test_compare_kernels() {
        let lt = compare_kernel::<f64>(Operation::Lt).unwrap();
        assert!(lt(1.0, 2.0));
        assert!(!lt(f64::NAN, 2.0));
        let ne = compare_kernel::<f64>(Operation::Ne).unwrap();
        assert!(ne(f64::NAN, f64::NAN));
    }
}
