//! Typed value destinations.
//!
//! A flag's parsed value lives in storage owned by the caller. This module
//! provides the two halves of that contract:
//!
//! - [`FlagValue`]: how a concrete Rust type is parsed from and formatted to
//!   command-line text.
//! - [`Value`]: the type-erased destination the tokenizer writes into.
//!
//! [`Slot`] is the shared handle a caller keeps to read the value back after
//! parsing, and [`SlotValue`] binds a slot plus its default into a [`Value`].

use std::cell::RefCell;
use std::fmt;
use std::num::IntErrorKind;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use thiserror::Error;

/// A textual value was rejected by a flag's type.
///
/// # Examples
///
/// ```
/// use flagx_core::{FlagValue, ValueError};
///
/// let err = i64::parse_flag("abc").unwrap_err();
/// assert_eq!(err, ValueError::parse_error());
/// assert_eq!(err.to_string(), "parse error");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValueError {
    message: String,
}

impl ValueError {
    /// Creates an error with a custom message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The text could not be read as the target type at all.
    pub fn parse_error() -> Self {
        Self::new("parse error")
    }

    /// The text was well-formed but does not fit in the target type.
    pub fn out_of_range() -> Self {
        Self::new("value out of range")
    }

    /// Returns the message without any flag context.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// A Rust type that can be the destination of a flag.
///
/// Implemented for the common scalar types. Implement it for your own types
/// to register them with `Parser::var`.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use flagx_core::FlagValue;
///
/// assert_eq!(i64::parse_flag("0x1f").unwrap(), 31);
/// assert_eq!(bool::parse_flag("T").unwrap(), true);
/// assert_eq!(Duration::parse_flag("1m 30s").unwrap(), Duration::from_secs(90));
/// assert!(u32::parse_flag("-1").is_err());
/// ```
pub trait FlagValue: fmt::Debug + Clone + 'static {
    /// Short type name shown in usage text (e.g. `int`).
    const TYPE_NAME: &'static str;

    /// Boolean flags may appear without a value (`-verbose`).
    const IS_BOOL: bool = false;

    /// Parses command-line text into a value.
    fn parse_flag(raw: &str) -> Result<Self, ValueError>;

    /// Formats a value back to command-line text.
    fn format_flag(&self) -> String;

    /// Zero values are not listed as defaults in usage text.
    fn is_zero(&self) -> bool;
}

impl FlagValue for String {
    const TYPE_NAME: &'static str = "string";

    fn parse_flag(raw: &str) -> Result<Self, ValueError> {
        Ok(raw.to_string())
    }

    fn format_flag(&self) -> String {
        self.clone()
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl FlagValue for bool {
    const TYPE_NAME: &'static str = "bool";
    const IS_BOOL: bool = true;

    fn parse_flag(raw: &str) -> Result<Self, ValueError> {
        match raw {
            "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
            "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
            _ => Err(ValueError::parse_error()),
        }
    }

    fn format_flag(&self) -> String {
        self.to_string()
    }

    fn is_zero(&self) -> bool {
        !*self
    }
}

/// Reads a signed integer with an optional base prefix.
///
/// Accepts `0x`/`0o`/`0b` prefixes, a bare leading `0` for octal, and `_`
/// digit separators.
fn parse_integer(raw: &str) -> Result<i128, ValueError> {
    let (negative, body) = match raw.as_bytes().first() {
        Some(b'-') => (true, &raw[1..]),
        Some(b'+') => (false, &raw[1..]),
        _ => (false, raw),
    };

    let lower = body.to_ascii_lowercase();
    let (radix, digits) = if let Some(rest) = lower.strip_prefix("0x") {
        (16, rest)
    } else if let Some(rest) = lower.strip_prefix("0o") {
        (8, rest)
    } else if let Some(rest) = lower.strip_prefix("0b") {
        (2, rest)
    } else if lower.len() > 1 && lower.starts_with('0') {
        (8, &lower[1..])
    } else {
        (10, lower.as_str())
    };

    let digits: String = digits.chars().filter(|c| *c != '_').collect();
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return Err(ValueError::parse_error());
    }

    let magnitude = u128::from_str_radix(&digits, radix).map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => ValueError::out_of_range(),
        _ => ValueError::parse_error(),
    })?;
    let value = i128::try_from(magnitude).map_err(|_| ValueError::out_of_range())?;
    Ok(if negative { -value } else { value })
}

macro_rules! integer_flag_value {
    ($($ty:ty => $name:literal),* $(,)?) => {
        $(
            impl FlagValue for $ty {
                const TYPE_NAME: &'static str = $name;

                fn parse_flag(raw: &str) -> Result<Self, ValueError> {
                    let wide = parse_integer(raw)?;
                    <$ty>::try_from(wide).map_err(|_| ValueError::out_of_range())
                }

                fn format_flag(&self) -> String {
                    self.to_string()
                }

                fn is_zero(&self) -> bool {
                    *self == 0
                }
            }
        )*
    };
}

integer_flag_value! {
    i32 => "int",
    i64 => "int",
    u32 => "uint",
    u64 => "uint",
    usize => "uint",
}

impl FlagValue for f64 {
    const TYPE_NAME: &'static str = "float";

    fn parse_flag(raw: &str) -> Result<Self, ValueError> {
        raw.parse().map_err(|_| ValueError::parse_error())
    }

    fn format_flag(&self) -> String {
        self.to_string()
    }

    fn is_zero(&self) -> bool {
        *self == 0.0
    }
}

impl FlagValue for Duration {
    const TYPE_NAME: &'static str = "duration";

    fn parse_flag(raw: &str) -> Result<Self, ValueError> {
        humantime::parse_duration(raw).map_err(|e| ValueError::new(e.to_string()))
    }

    fn format_flag(&self) -> String {
        humantime::format_duration(*self).to_string()
    }

    fn is_zero(&self) -> bool {
        Duration::is_zero(self)
    }
}

impl FlagValue for PathBuf {
    const TYPE_NAME: &'static str = "path";

    fn parse_flag(raw: &str) -> Result<Self, ValueError> {
        Ok(PathBuf::from(raw))
    }

    fn format_flag(&self) -> String {
        self.display().to_string()
    }

    fn is_zero(&self) -> bool {
        self.as_os_str().is_empty()
    }
}

/// Type-erased destination for one flag's value.
///
/// The tokenizer only ever sees `dyn Value`; it never knows the concrete
/// type behind a flag.
pub trait Value: fmt::Debug {
    /// Stores a textual value, or rejects it.
    fn set(&mut self, raw: &str) -> Result<(), ValueError>;

    /// Whether the flag may appear without a value.
    fn is_bool_flag(&self) -> bool {
        false
    }

    /// Type name shown in usage text.
    fn type_name(&self) -> &'static str;

    /// The value currently held by the destination, as text.
    fn current_text(&self) -> String;

    /// The registration default, when it is worth showing.
    fn default_text(&self) -> Option<String> {
        None
    }
}

/// Shared handle to caller-owned flag storage.
///
/// Cloning a slot clones the handle, not the value.
///
/// # Examples
///
/// ```
/// use flagx_core::Slot;
///
/// let slot = Slot::new(3_i64);
/// let other = slot.clone();
/// other.replace(7);
/// assert_eq!(slot.get(), 7);
/// ```
#[derive(Debug, Default)]
pub struct Slot<T>(Rc<RefCell<T>>);

impl<T> Clone for Slot<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<T> Slot<T> {
    /// Creates a slot holding `value`.
    pub fn new(value: T) -> Self {
        Self(Rc::new(RefCell::new(value)))
    }

    /// Runs `f` against the current value.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.0.borrow())
    }

    /// Stores `value`, returning the previous one.
    pub fn replace(&self, value: T) -> T {
        self.0.replace(value)
    }
}

impl<T: Clone> Slot<T> {
    /// Returns a copy of the current value.
    pub fn get(&self) -> T {
        self.0.borrow().clone()
    }
}

/// A [`Slot`] bound to its registration default.
#[derive(Debug, Clone)]
pub struct SlotValue<T: FlagValue> {
    slot: Slot<T>,
    default: T,
}

impl<T: FlagValue> SlotValue<T> {
    /// Creates a destination with a fresh slot initialized to `default`.
    ///
    /// Returns the caller's handle alongside the destination.
    ///
    /// # Examples
    ///
    /// ```
    /// use flagx_core::{SlotValue, Value};
    ///
    /// let (slot, mut dest) = SlotValue::bind(10_u32);
    /// dest.set("12").unwrap();
    /// assert_eq!(slot.get(), 12);
    /// assert_eq!(dest.default_text().as_deref(), Some("10"));
    /// ```
    pub fn bind(default: T) -> (Slot<T>, Self) {
        let slot = Slot::new(default.clone());
        let value = Self {
            slot: slot.clone(),
            default,
        };
        (slot, value)
    }

    /// Wraps an existing slot; its current value becomes the default.
    pub fn from_slot(slot: Slot<T>) -> Self {
        let default = slot.get();
        Self { slot, default }
    }
}

impl<T: FlagValue> Value for SlotValue<T> {
    fn set(&mut self, raw: &str) -> Result<(), ValueError> {
        let parsed = T::parse_flag(raw)?;
        self.slot.replace(parsed);
        Ok(())
    }

    fn is_bool_flag(&self) -> bool {
        T::IS_BOOL
    }

    fn type_name(&self) -> &'static str {
        T::TYPE_NAME
    }

    fn current_text(&self) -> String {
        self.slot.with(T::format_flag)
    }

    fn default_text(&self) -> Option<String> {
        (!self.default.is_zero()).then(|| self.default.format_flag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_prefixes_and_separators() {
        assert_eq!(i64::parse_flag("42").unwrap(), 42);
        assert_eq!(i64::parse_flag("-0x10").unwrap(), -16);
        assert_eq!(i64::parse_flag("0b101").unwrap(), 5);
        assert_eq!(i64::parse_flag("0o17").unwrap(), 15);
        assert_eq!(i64::parse_flag("017").unwrap(), 15);
        assert_eq!(i64::parse_flag("1_000").unwrap(), 1000);
        assert_eq!(i64::parse_flag("0").unwrap(), 0);
    }

    #[test]
    fn test_integer_errors_are_classified() {
        assert_eq!(i64::parse_flag("").unwrap_err(), ValueError::parse_error());
        assert_eq!(i64::parse_flag("12a").unwrap_err(), ValueError::parse_error());
        assert_eq!(i64::parse_flag("--1").unwrap_err(), ValueError::parse_error());
        assert_eq!(
            i32::parse_flag("4294967296").unwrap_err(),
            ValueError::out_of_range()
        );
        assert_eq!(u64::parse_flag("-3").unwrap_err(), ValueError::out_of_range());
    }

    #[test]
    fn test_bool_spellings() {
        for raw in ["1", "t", "T", "TRUE", "true", "True"] {
            assert!(bool::parse_flag(raw).unwrap(), "{raw}");
        }
        for raw in ["0", "f", "F", "FALSE", "false", "False"] {
            assert!(!bool::parse_flag(raw).unwrap(), "{raw}");
        }
        assert!(bool::parse_flag("yes").is_err());
    }

    #[test]
    fn test_duration_uses_humantime_syntax() {
        assert_eq!(
            Duration::parse_flag("250ms").unwrap(),
            Duration::from_millis(250)
        );
        assert!(Duration::parse_flag("soon").is_err());
        assert_eq!(Duration::from_secs(90).format_flag(), "1m 30s");
    }

    #[test]
    fn test_zero_defaults_are_hidden() {
        let (_, value) = SlotValue::bind(String::new());
        assert_eq!(value.default_text(), None);
        let (_, value) = SlotValue::bind(String::from("out.txt"));
        assert_eq!(value.default_text().as_deref(), Some("out.txt"));
        let (_, value) = SlotValue::bind(false);
        assert_eq!(value.default_text(), None);
    }

    #[test]
    fn test_failed_set_keeps_previous_value() {
        let (slot, mut value) = SlotValue::bind(5_i64);
        assert!(value.set("five").is_err());
        assert_eq!(slot.get(), 5);
        value.set("6").unwrap();
        assert_eq!(value.current_text(), "6");
    }

    #[test]
    fn test_from_slot_uses_current_value_as_default() {
        let slot = Slot::new(PathBuf::from("/tmp"));
        let value = SlotValue::from_slot(slot);
        assert_eq!(value.default_text().as_deref(), Some("/tmp"));
        assert_eq!(value.type_name(), "path");
    }
}
