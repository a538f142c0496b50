//! Entry point tying the platform probe, the guard-band table and the
//! dispatcher together.

use std::sync::OnceLock;

use crate::convert::convert_arrays;
use crate::error::Result;
use crate::guard::GuardBandTable;
use crate::limits::{Platform, TypeSet};
use crate::ops::dispatch::dispatch;
use crate::ops::{Arg, CallOptions, CallResult, Kwargs, Operation};
use crate::types::{NumericType, TypedArray};

/// Conversion and operation entry points bound to one [`Platform`].
///
/// [`Engine::native`] offers every element type the host has. Engines built
/// with [`Engine::with_types`] reject the others with `TypeUnsupported`.
#[derive(Debug, Clone)]
pub struct Engine {
    platform: Platform,
    table: &'static GuardBandTable,
}

impl Engine {
    pub fn native() -> &'static Engine {
        static ENGINE: OnceLock<Engine> = OnceLock::new();
        ENGINE.get_or_init(|| Engine::on(Platform::native().clone()))
    }

    /// An engine limited to `types`.
    pub fn with_types(types: &[NumericType]) -> Self {
        Engine::on(Platform::restricted(types.iter().copied().collect::<TypeSet>()))
    }

    /// An engine that always takes the scalar path.
    pub fn without_simd() -> Self {
        Engine::on(Platform::without_simd())
    }

    fn on(platform: Platform) -> Self {
        Engine {
            platform,
            table: GuardBandTable::native(),
        }
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    pub fn guard_bands(&self) -> &GuardBandTable {
        self.table
    }

    /// Converts `input` into `output`, checking every element against the
    /// guard band of the type pair.
    ///
    /// Without `maxlen` both arrays must have the same nonzero length. With
    /// `maxlen` the first `min(maxlen, len(input), len(output))` elements are
    /// converted and the rest of `output` is left as it was.
    pub fn convert(&self, input: &TypedArray, output: &mut TypedArray, maxlen: Option<usize>) -> Result<()> {
        convert_arrays(&self.platform, self.table, input, output, maxlen)
    }

    /// Converts `input` into a new array of type `ty`.
    pub fn convert_to(&self, input: &TypedArray, ty: NumericType) -> Result<TypedArray> {
        let mut output = TypedArray::zeros(ty, input.len());
        self.convert(input, &mut output, None)?;
        Ok(output)
    }

    /// Runs `op` on positional `args`.
    pub fn call(&self, op: Operation, args: &mut [Arg<'_>], options: &CallOptions) -> Result<CallResult> {
        dispatch(&self.platform, op, args, options)
    }

    /// Runs `op` with options given by name.
    pub fn call_with_kwargs(&self, op: Operation, args: &mut [Arg<'_>], kwargs: &Kwargs) -> Result<CallResult> {
        let options = kwargs.parse()?;
        self.call(op, args, &options)
    }
}
