use std::fmt::Debug;

/// A value widened into a domain that holds every element type exactly:
/// `i128` for integers, `f64` for floats.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Wide {
    Int(i128),
    Float(f64),
}

/// A primitive that can be stored in a [`TypedArray`](super::TypedArray).
///
/// `widen` is lossless. `narrow` is a native `as` cast: integers truncate to
/// the low bits, floats truncate toward zero and saturate. Callers range
/// check before narrowing when they need an exact result.
pub trait Element: Copy + Default + PartialEq + PartialOrd + Debug + Send + Sync + 'static {
    const FLOATING: bool;
    const SIGNED: bool;
    const BITS: u32;

    fn widen(self) -> Wide;

    fn narrow(wide: Wide) -> Self;
}

macro_rules! impl_element {
    ($floating:expr, $signed:expr, $widen:ident as $wide:ty: $($t:ty),*) => {
        $(
            impl Element for $t {
                const FLOATING: bool = $floating;
                const SIGNED: bool = $signed;
                const BITS: u32 = (std::mem::size_of::<$t>() * 8) as u32;

                #[inline(always)]
                fn widen(self) -> Wide {
                    Wide::$widen(self as $wide)
                }

                #[inline(always)]
                fn narrow(wide: Wide) -> Self {
                    match wide {
                        Wide::Int(v) => v as $t,
                        Wide::Float(v) => v as $t,
                    }
                }
            }
        )*
    };
}

impl_element!(false, true, Int as i128: i8, i16, i32, i64);
impl_element!(false, false, Int as i128: u8, u16, u32, u64);
impl_element!(true, true, Float as f64: f32, f64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widen_is_exact() {
        assert_eq!(u64::MAX.widen(), Wide::Int(u64::MAX as i128));
        assert_eq!(i64::MIN.widen(), Wide::Int(i64::MIN as i128));
        assert_eq!(f32::MAX.widen(), Wide::Float(f32::MAX as f64));
    }

    #[test]
    fn test_narrow_uses_native_casts() {
        assert_eq!(i8::narrow(Wide::Int(300)), 44);
        assert_eq!(u8::narrow(Wide::Float(3.9)), 3);
        assert_eq!(i32::narrow(Wide::Float(-2.7)), -2);
        assert!(f32::narrow(Wide::Float(f64::NAN)).is_nan());
    }

    #[test]
    fn test_constants() {
        assert_eq!(<i8 as Element>::BITS, 8);
        assert_eq!(<u64 as Element>::BITS, 64);
        assert!(<f64 as Element>::FLOATING);
        assert!(!<u16 as Element>::SIGNED);
    }
}
