//! Smart tags: transformers authored as validated function calls.
//!
//! A smart tag declares a check for its main value, a check for its
//! positional arguments, and the operation itself. The generated transformer
//! runs them in that order and stops at the first failure, which becomes an
//! [`Outcome::Error`] carrying a [`TagError`].
//!
//! ```rust
//! use tagfold::{SmartTag, TagError, Value};
//! use tagfold::smart_tag::{expect_arity, string_arg};
//!
//! struct Suffix;
//!
//! impl SmartTag for Suffix {
//!     const NAME: &'static str = "suffix";
//!     type Args = String;
//!
//!     fn check_main(main: &Value) -> Result<Value, TagError> {
//!         string_arg(Self::NAME, std::slice::from_ref(main), 0).map(Value::String)
//!     }
//!
//!     fn check_args(args: &[Value]) -> Result<String, TagError> {
//!         expect_arity(Self::NAME, args, 1, 1, "1")?;
//!         Ok(string_arg(Self::NAME, args, 0)?.to_string())
//!     }
//!
//!     fn apply(main: Value, suffix: String) -> Result<Value, TagError> {
//!         let Value::String(s) = main else { unreachable!() };
//!         Ok(Value::from(format!("{s}{suffix}")))
//!     }
//! }
//! ```

use tagfold_dom::Stem;

use crate::error::TagError;
use crate::registry::Registry;
use crate::transformer::{Outcome, Transformer};
use crate::value::{Value, ValueType};

mod replace;
mod setattribute;
mod setproperty;
mod stringify;

pub use replace::Replace;
pub use setattribute::SetAttribute;
pub use setproperty::SetProperty;
pub use stringify::{Parse, Stringify, parse_text, stringify_value};

/// Where a smart tag takes its main value from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// The main value is the accumulator the transformer is merged into;
    /// the smart tag node's positional children are the arguments.
    #[default]
    Coalescion,
    /// The first argument is the main value and the accumulator is ignored.
    Isolation,
}

pub trait SmartTag: 'static {
    /// Tag name the smart tag is registered under.
    const NAME: &'static str;

    /// Validated arguments.
    type Args;

    fn mode() -> Mode {
        Mode::Coalescion
    }

    /// Accept (and possibly normalize) the main value.
    fn check_main(main: &Value) -> Result<Value, TagError> {
        Ok(main.clone())
    }

    /// Check arity and per-position types.
    fn check_args(args: &[Value]) -> Result<Self::Args, TagError>;

    fn apply(main: Value, args: Self::Args) -> Result<Value, TagError>;
}

/// Generator for a smart tag: the transformer carries `args` and validates
/// them against whatever accumulator it is invoked on.
pub fn generate<T: SmartTag>(name: &str, args: Vec<Value>) -> Transformer {
    let captured = args.clone();
    Transformer::new(name, args, move |current, _hooks| {
        match run::<T>(current, &captured) {
            Ok(value) => Outcome::Replace(value),
            Err(error) => {
                debug!("<{}> failed: {}", T::NAME, error);
                Outcome::Error(error)
            }
        }
    })
}

/// Main check, then argument check, then the operation.
pub fn run<T: SmartTag>(current: &Value, args: &[Value]) -> Result<Value, TagError> {
    let (main, args) = match T::mode() {
        Mode::Coalescion => (current, args),
        Mode::Isolation => match args.split_first() {
            Some((main, rest)) => (main, rest),
            None => {
                return Err(TagError::Arity {
                    tag: Stem::from_static(T::NAME),
                    expected: "at least 1",
                    found: 0,
                });
            }
        },
    };
    let main = T::check_main(main)?;
    let args = T::check_args(args)?;
    T::apply(main, args)
}

pub(crate) fn register_all(registry: &mut Registry) {
    registry.register_smart_tag::<Replace>();
    registry.register_smart_tag::<SetAttribute>();
    registry.register_smart_tag::<SetProperty>();
    registry.register_smart_tag::<Stringify>();
    registry.register_smart_tag::<Parse>();
}

/// Fail unless `min <= args.len() <= max`.
pub fn expect_arity(
    tag: &'static str,
    args: &[Value],
    min: usize,
    max: usize,
    expected: &'static str,
) -> Result<(), TagError> {
    if (min..=max).contains(&args.len()) {
        Ok(())
    } else {
        Err(TagError::Arity {
            tag: Stem::from_static(tag),
            expected,
            found: args.len(),
        })
    }
}

/// A string-typed argument. Text leaves are accepted as strings.
pub fn string_arg(tag: &'static str, args: &[Value], position: usize) -> Result<Stem, TagError> {
    match args.get(position) {
        Some(Value::String(s) | Value::Text(s)) => Ok(s.clone()),
        other => Err(TagError::ArgType {
            tag: Stem::from_static(tag),
            position,
            expected: "string",
            found: other.map_or(ValueType::Null, Value::value_type),
        }),
    }
}

/// Shorthand for a main-value type failure.
pub(crate) fn main_value_error(tag: &'static str, expected: &'static str, found: &Value) -> TagError {
    TagError::MainValue {
        tag: Stem::from_static(tag),
        expected,
        found: found.value_type(),
    }
}
