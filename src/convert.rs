//! Array-to-array conversion between element types.
//!
//! Every element is checked against the guard band of the (source, dest)
//! pair before it is stored. NaN and the infinities pass through between
//! float types and overflow into integer types. Conversion stops at the
//! first element that does not fit; elements before it keep their converted
//! values and elements from it onward keep their previous values.

use log::trace;

use crate::error::{length_error, type_mismatch, ArrayError, Result};
use crate::guard::GuardBandTable;
use crate::limits::{Platform, Span};
use crate::types::{with_kind, Element, Kind, TypedArray, Wide};

/// Number of elements a conversion touches.
///
/// Without `maxlen` the arrays must have the same, nonzero length. With
/// `maxlen` the count is clamped to both lengths. A `maxlen` of zero is
/// treated as absent.
pub(crate) fn effective_length(input: usize, output: usize, maxlen: Option<usize>) -> Result<usize> {
    let len = match maxlen.filter(|&limit| limit > 0) {
        Some(limit) => limit.min(input).min(output),
        None if input != output => {
            return Err(length_error(format!(
                "input length {input} does not match output length {output}"
            )))
        }
        None => input,
    };

    if len == 0 {
        return Err(length_error("cannot convert a zero-length array"));
    }

    Ok(len)
}

pub(crate) fn convert_arrays(
    platform: &Platform,
    table: &GuardBandTable,
    input: &TypedArray,
    output: &mut TypedArray,
    maxlen: Option<usize>,
) -> Result<()> {
    let (source, dest) = (input.numeric_type(), output.numeric_type());
    platform.require(source)?;
    platform.require(dest)?;

    let len = effective_length(input.len(), output.len(), maxlen)?;
    let band = table.get(source, dest);

    trace!("convert {source} -> {dest}: len={len}, band={band:?}");

    with_kind!(source, S => with_kind!(dest, D => convert_typed::<S, D>(input, output, len, band)))
}

fn convert_typed<S: Kind, D: Kind>(
    input: &TypedArray,
    output: &mut TypedArray,
    len: usize,
    band: Span,
) -> Result<()> {
    let src = S::slice(input).ok_or_else(|| type_mismatch("input is not a source array"))?;
    let dst = D::slice_mut(output).ok_or_else(|| type_mismatch("output is not a destination array"))?;

    convert_elements(&src[..len], &mut dst[..len], band)
}

/// Converts `src` into `dst` element by element. Both slices have the same
/// length.
pub(crate) fn convert_elements<S: Element, D: Element>(src: &[S], dst: &mut [D], band: Span) -> Result<()> {
    for (index, (value, slot)) in src.iter().zip(dst.iter_mut()).enumerate() {
        let wide = value.widen();

        if let Wide::Float(v) = wide {
            if !v.is_finite() {
                if !D::FLOATING {
                    return Err(ArrayError::Overflow { index });
                }
                *slot = D::narrow(wide);
                continue;
            }
        }

        if !band.contains(wide) {
            return Err(ArrayError::Overflow { index });
        }

        *slot = D::narrow(wide);
    }

    Ok(())
}
