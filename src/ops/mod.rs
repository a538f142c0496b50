//! The elementwise operation catalogue.
//!
//! Each [`Operation`] carries a capability descriptor: its call shape and
//! which optional flags it accepts. The dispatcher validates every call
//! against the descriptor before touching any element.

use std::fmt;

pub(crate) mod arith;
pub mod dispatch;
pub mod options;

pub use dispatch::{Arg, CallResult};
pub use options::{CallOptions, Kwargs, Value};

/// Operand layout an operation accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// `(array, scalar)`, `(scalar, array)` or `(array, array)`, each with
    /// an optional output array.
    Binary,
    /// `(array)` with an optional output array.
    Unary,
    /// `(array, scalar)`, `(scalar, array)` or `(array, array)`, no output;
    /// yields a single `bool`.
    Compare,
}

/// Which call shape and optional flags an operation supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub arity: Arity,
    /// Accepts `matherrors` to switch off overflow and domain checks.
    pub matherrors: bool,
    /// Has a vector path and accepts `nosimd` to force the scalar path.
    pub nosimd: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Add,
    Sub,
    Mul,
    TrueDiv,
    FloorDiv,
    Mod,
    Pow,
    LShift,
    RShift,
    And,
    Or,
    Xor,
    Neg,
    Abs,
    Invert,
    Factorial,
    Sqrt,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Operation {
    pub const ALL: [Operation; 23] = [
        Operation::Add,
        Operation::Sub,
        Operation::Mul,
        Operation::TrueDiv,
        Operation::FloorDiv,
        Operation::Mod,
        Operation::Pow,
        Operation::LShift,
        Operation::RShift,
        Operation::And,
        Operation::Or,
        Operation::Xor,
        Operation::Neg,
        Operation::Abs,
        Operation::Invert,
        Operation::Factorial,
        Operation::Sqrt,
        Operation::Eq,
        Operation::Ne,
        Operation::Lt,
        Operation::Le,
        Operation::Gt,
        Operation::Ge,
    ];

    pub const fn capabilities(self) -> Capabilities {
        use Operation::*;

        let (arity, matherrors, nosimd) = match self {
            Add | Sub | Mul | TrueDiv => (Arity::Binary, true, true),
            FloorDiv | Mod | Pow => (Arity::Binary, true, false),
            LShift | RShift | And | Or | Xor => (Arity::Binary, false, true),
            Neg | Abs | Sqrt => (Arity::Unary, true, true),
            Invert => (Arity::Unary, false, true),
            Factorial => (Arity::Unary, true, false),
            Eq | Ne | Lt | Le | Gt | Ge => (Arity::Compare, false, true),
        };

        Capabilities {
            arity,
            matherrors,
            nosimd,
        }
    }

    /// Whether the unchecked form of the operation can still fail on some
    /// element. Integer division and shifts reject zero divisors and
    /// negative counts even with `matherrors`.
    pub(crate) const fn can_fail(self, checked: bool) -> bool {
        use Operation::*;

        match self {
            FloorDiv | Mod | LShift | RShift => true,
            And | Or | Xor | Invert | Eq | Ne | Lt | Le | Gt | Ge => false,
            Add | Sub | Mul | TrueDiv | Pow | Neg | Abs | Factorial | Sqrt => checked,
        }
    }

    pub const fn name(self) -> &'static str {
        use Operation::*;

        match self {
            Add => "add",
            Sub => "sub",
            Mul => "mul",
            TrueDiv => "truediv",
            FloorDiv => "floordiv",
            Mod => "mod",
            Pow => "pow",
            LShift => "lshift",
            RShift => "rshift",
            And => "and",
            Or => "or",
            Xor => "xor",
            Neg => "neg",
            Abs => "abs",
            Invert => "invert",
            Factorial => "factorial",
            Sqrt => "sqrt",
            Eq => "eq",
            Ne => "ne",
            Lt => "lt",
            Le => "le",
            Gt => "gt",
            Ge => "ge",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_unique() {
        let mut names: Vec<_> = Operation::ALL.iter().map(|op| op.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Operation::ALL.len());
    }

    #[test]
    fn test_capabilities() {
        let shift = Operation::LShift.capabilities();
        assert_eq!(shift.arity, Arity::Binary);
        assert!(!shift.matherrors);
        assert!(shift.nosimd);

        let factorial = Operation::Factorial.capabilities();
        assert_eq!(factorial.arity, Arity::Unary);
        assert!(factorial.matherrors);
        assert!(!factorial.nosimd);

        assert_eq!(Operation::Ge.capabilities().arity, Arity::Compare);
    }

    #[test]
    fn test_unchecked_arithmetic_cannot_fail() {
        assert!(!Operation::Add.can_fail(false));
        assert!(Operation::Add.can_fail(true));
        assert!(Operation::FloorDiv.can_fail(false));
        assert!(!Operation::Xor.can_fail(true));
    }
}
