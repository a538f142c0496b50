//! Optional call parameters, in typed form and by name.

use crate::error::{type_error, Result};

use super::Operation;

/// Per-call options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallOptions {
    /// Process at most this many elements. `None` and `Some(0)` process the
    /// natural length.
    pub maxlen: Option<usize>,
    /// Disable the operation's overflow and domain checks. `None` when the
    /// caller did not pass the option.
    pub matherrors: Option<bool>,
    /// Force the scalar path. `None` when the caller did not pass the option.
    pub nosimd: Option<bool>,
}

impl CallOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_maxlen(mut self, maxlen: usize) -> Self {
        self.maxlen = Some(maxlen);
        self
    }

    pub fn with_matherrors(mut self, matherrors: bool) -> Self {
        self.matherrors = Some(matherrors);
        self
    }

    pub fn with_nosimd(mut self, nosimd: bool) -> Self {
        self.nosimd = Some(nosimd);
        self
    }

    /// Rejects flags the operation does not define, whatever their value.
    pub fn validate(&self, op: Operation) -> Result<()> {
        let caps = op.capabilities();

        if self.matherrors.is_some() && !caps.matherrors {
            return Err(type_error(format!("{op}() does not accept matherrors")));
        }
        if self.nosimd.is_some() && !caps.nosimd {
            return Err(type_error(format!("{op}() does not accept nosimd")));
        }

        Ok(())
    }

    /// `maxlen` with the "zero means unset" rule applied.
    pub(crate) fn limit(&self) -> Option<usize> {
        self.maxlen.filter(|&limit| limit > 0)
    }

    /// Whether overflow and domain checks are on.
    pub(crate) fn checked(&self) -> bool {
        !self.matherrors.unwrap_or(false)
    }

    pub(crate) fn scalar_only(&self) -> bool {
        self.nosimd.unwrap_or(false)
    }
}

/// A keyword option value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_owned())
    }
}

/// Options given by name, as a dynamic caller would pass keyword arguments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Kwargs {
    entries: Vec<(String, Value)>,
}

impl Kwargs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.entries.push((name.to_owned(), value.into()));
        self
    }

    /// Resolves names into [`CallOptions`]. Unknown or repeated names and
    /// values of the wrong type fail with a type error.
    pub fn parse(&self) -> Result<CallOptions> {
        let mut options = CallOptions::new();
        let mut seen: Vec<&str> = Vec::with_capacity(self.entries.len());

        for (name, value) in &self.entries {
            if seen.contains(&name.as_str()) {
                return Err(type_error(format!("got multiple values for '{name}'")));
            }
            seen.push(name);

            match name.as_str() {
                "maxlen" => {
                    options.maxlen = match value {
                        Value::Int(limit) => usize::try_from(*limit).ok().filter(|&l| l > 0),
                        other => {
                            return Err(type_error(format!(
                                "maxlen must be an integer, not {other:?}"
                            )))
                        }
                    }
                }
                "matherrors" => options.matherrors = Some(flag(name, value)?),
                "nosimd" => options.nosimd = Some(flag(name, value)?),
                other => {
                    return Err(type_error(format!("unexpected keyword argument '{other}'")))
                }
            }
        }

        Ok(options)
    }
}

fn flag(name: &str, value: &Value) -> Result<bool> {
    match value {
        Value::Bool(flag) => Ok(*flag),
        Value::Int(v) => Ok(*v != 0),
        other => Err(type_error(format!("{name} must be a boolean, not {other:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ArrayError;

    #[test]
    fn test_parse_known_options() {
        let options = Kwargs::new()
            .with("maxlen", 5)
            .with("nosimd", true)
            .with("matherrors", 1)
            .parse()
            .unwrap();
        assert_eq!(
            options,
            CallOptions::new()
                .with_maxlen(5)
                .with_nosimd(true)
                .with_matherrors(true)
        );
    }

    #[test]
    fn test_non_positive_maxlen_is_ignored() {
        assert_eq!(Kwargs::new().with("maxlen", -3).parse().unwrap().maxlen, None);
        assert_eq!(Kwargs::new().with("maxlen", 0).parse().unwrap().maxlen, None);
        assert_eq!(CallOptions::new().with_maxlen(0).limit(), None);
    }

    #[test]
    fn test_bad_option_values() {
        for kwargs in [
            Kwargs::new().with("maxlen", "x"),
            Kwargs::new().with("maxlen", 2.5),
            Kwargs::new().with("nosimd", "yes"),
            Kwargs::new().with("matherrors", 0.0),
            Kwargs::new().with("xyz", true),
            Kwargs::new().with("nosimd", true).with("nosimd", false),
        ] {
            assert!(matches!(kwargs.parse(), Err(ArrayError::Type { .. })), "{kwargs:?}");
        }
    }

    #[test]
    fn test_validate_against_capabilities() {
        let matherrors = CallOptions::new().with_matherrors(true);
        assert!(matherrors.validate(Operation::Add).is_ok());
        assert!(matches!(
            matherrors.validate(Operation::LShift),
            Err(ArrayError::Type { .. })
        ));

        let nosimd = CallOptions::new().with_nosimd(true);
        assert!(nosimd.validate(Operation::LShift).is_ok());
        assert!(matches!(
            nosimd.validate(Operation::Factorial),
            Err(ArrayError::Type { .. })
        ));
    }

    #[test]
    fn test_unsupported_flag_is_rejected_when_false() {
        let matherrors = CallOptions::new().with_matherrors(false);
        assert!(matherrors.validate(Operation::Add).is_ok());
        assert!(matches!(
            matherrors.validate(Operation::LShift),
            Err(ArrayError::Type { .. })
        ));

        let nosimd = Kwargs::new().with("nosimd", false).parse().unwrap();
        assert_eq!(nosimd.nosimd, Some(false));
        assert!(nosimd.checked());
        assert!(!nosimd.scalar_only());
        assert!(matches!(nosimd.validate(Operation::Pow), Err(ArrayError::Type { .. })));

        assert!(CallOptions::new().validate(Operation::Factorial).is_ok());
    }
}
