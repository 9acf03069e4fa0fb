//! Single-occurrence flag tokenizer.
//!
//! [`ArgCursor`] walks an argument list and consumes one flag occurrence per
//! call, writing the value into the matching [`Value`] destination. It knows
//! nothing about required flags or error policies; callers decide what to do
//! with each [`Consumed`] outcome or [`TokenError`].
//!
//! Accepted forms:
//!
//! | Token(s)            | Meaning                                  |
//! |---------------------|------------------------------------------|
//! | `-name` / `--name`  | boolean flag set to `true`               |
//! | `-name=value`       | any flag, inline value                   |
//! | `-name value`       | non-boolean flag, value in next token    |
//! | `--`                | end of flags (consumed)                  |
//! | `-` or `word`       | end of flags (left in place)             |

use std::collections::VecDeque;

use thiserror::Error;

use crate::value::{Value, ValueError};

/// Names that request help when no flag by that name is declared.
pub const HELP_NAMES: [&str; 2] = ["help", "h"];

/// Resolves flag names to their value destinations.
pub trait Destinations {
    /// Returns the destination registered under `name`, if any.
    fn destination(&mut self, name: &str) -> Option<&mut dyn Value>;
}

/// Result of one successful [`ArgCursor::consume_one`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Consumed {
    /// A declared flag was consumed and its value stored.
    Flag(String),
    /// `-h` or `-help` appeared without a matching declaration.
    HelpRequested,
    /// No flags remain.
    End,
}

/// Failure to consume one flag occurrence.
///
/// The offending token is always removed from the cursor before the error
/// is returned, so a caller that chooses to keep going makes progress.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Token starts with dashes but is not a usable flag (e.g. `---x`, `-=v`).
    #[error("bad flag syntax: {0}")]
    BadSyntax(String),
    /// Token has flag syntax but names no declared flag.
    #[error("flag provided but not defined: -{0}")]
    Undeclared(String),
    /// Non-boolean flag was the last token and had no inline value.
    #[error("flag needs an argument: -{0}")]
    MissingValue(String),
    /// Destination rejected the value.
    #[error("invalid value {value:?} for flag -{name}: {source}")]
    InvalidValue {
        name: String,
        value: String,
        source: ValueError,
    },
    /// Boolean destination rejected an inline value.
    #[error("invalid boolean value {value:?} for -{name}: {source}")]
    InvalidBool {
        name: String,
        value: String,
        source: ValueError,
    },
}

impl TokenError {
    /// Whether the failure is an undeclared flag, as opposed to a bad token
    /// or value.
    pub fn is_undeclared(&self) -> bool {
        matches!(self, Self::Undeclared(_))
    }

    /// The flag the failure is about, when a name could be read.
    pub fn flag_name(&self) -> Option<&str> {
        match self {
            Self::BadSyntax(_) => None,
            Self::Undeclared(name) | Self::MissingValue(name) => Some(name),
            Self::InvalidValue { name, .. } | Self::InvalidBool { name, .. } => Some(name),
        }
    }
}

/// Cursor over the arguments that have not been consumed yet.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use flagx_core::{ArgCursor, Consumed, Destinations, SlotValue, Value};
///
/// struct Flags(HashMap<String, Box<dyn Value>>);
///
/// impl Destinations for Flags {
///     fn destination(&mut self, name: &str) -> Option<&mut dyn Value> {
///         let value: &mut dyn Value = self.0.get_mut(name)?.as_mut();
///         Some(value)
///     }
/// }
///
/// let (port, dest) = SlotValue::bind(80_u32);
/// let mut flags = Flags(HashMap::from([("port".to_string(), Box::new(dest) as Box<dyn Value>)]));
///
/// let mut cursor = ArgCursor::new(["-port", "8080", "serve"]);
/// assert_eq!(cursor.consume_one(&mut flags).unwrap(), Consumed::Flag("port".into()));
/// assert_eq!(cursor.consume_one(&mut flags).unwrap(), Consumed::End);
/// assert_eq!(port.get(), 8080);
/// assert_eq!(cursor.remaining().collect::<Vec<_>>(), ["serve"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ArgCursor {
    args: VecDeque<String>,
    finished: bool,
}

impl ArgCursor {
    /// Creates a cursor over `args` (program name excluded).
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            finished: false,
        }
    }

    /// Arguments not consumed as flags.
    pub fn remaining(&self) -> impl Iterator<Item = &str> {
        self.args.iter().map(String::as_str)
    }

    /// Consumes the cursor, returning the unconsumed arguments.
    pub fn into_remaining(self) -> Vec<String> {
        self.args.into()
    }

    /// Whether flag parsing has stopped.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Consumes one flag occurrence from the front of the cursor.
    ///
    /// # Errors
    ///
    /// Returns a [`TokenError`] describing the bad token. The token, and any
    /// value argument it took, has already been removed.
    pub fn consume_one(&mut self, flags: &mut dyn Destinations) -> Result<Consumed, TokenError> {
        let looks_like_flag =
            matches!(self.args.front(), Some(token) if token.len() >= 2 && token.starts_with('-'));
        if self.finished || !looks_like_flag {
            self.finished = true;
            return Ok(Consumed::End);
        }
        let Some(token) = self.args.pop_front() else {
            return Ok(Consumed::End);
        };

        let dashes = if token.starts_with("--") {
            if token.len() == 2 {
                self.finished = true;
                return Ok(Consumed::End);
            }
            2
        } else {
            1
        };

        let body = &token[dashes..];
        if body.is_empty() || body.starts_with('-') || body.starts_with('=') {
            return Err(TokenError::BadSyntax(token));
        }

        let (name, inline) = match body.split_once('=') {
            Some((name, value)) => (name.to_string(), Some(value.to_string())),
            None => (body.to_string(), None),
        };

        let Some(value) = flags.destination(&name) else {
            if HELP_NAMES.contains(&name.as_str()) {
                return Ok(Consumed::HelpRequested);
            }
            return Err(TokenError::Undeclared(name));
        };

        if value.is_bool_flag() {
            let raw = inline.unwrap_or_else(|| "true".to_string());
            if let Err(source) = value.set(&raw) {
                return Err(TokenError::InvalidBool {
                    name,
                    value: raw,
                    source,
                });
            }
        } else {
            let raw = match inline {
                Some(raw) => raw,
                None => match self.args.pop_front() {
                    Some(raw) => raw,
                    None => return Err(TokenError::MissingValue(name)),
                },
            };
            if let Err(source) = value.set(&raw) {
                return Err(TokenError::InvalidValue {
                    name,
                    value: raw,
                    source,
                });
            }
        }

        Ok(Consumed::Flag(name))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::value::{Slot, SlotValue};

    #[derive(Default)]
    struct Flags(HashMap<String, Box<dyn Value>>);

    impl Flags {
        fn with<T: crate::FlagValue>(mut self, name: &str, default: T) -> (Self, Slot<T>) {
            let (slot, dest) = SlotValue::bind(default);
            self.0.insert(name.to_string(), Box::new(dest));
            (self, slot)
        }
    }

    impl Destinations for Flags {
        fn destination(&mut self, name: &str) -> Option<&mut dyn Value> {
            let value: &mut dyn Value = self.0.get_mut(name)?.as_mut();
            Some(value)
        }
    }

    fn drain(cursor: &mut ArgCursor, flags: &mut Flags) -> Vec<Result<Consumed, TokenError>> {
        let mut out = Vec::new();
        loop {
            let step = cursor.consume_one(flags);
            let end = matches!(step, Ok(Consumed::End));
            out.push(step);
            if end {
                return out;
            }
        }
    }

    #[test]
    fn test_inline_and_separate_values() {
        let (flags, name) = Flags::default().with("name", String::new());
        let (mut flags, count) = flags.with("count", 0_i64);
        let mut cursor = ArgCursor::new(["--name=ada", "-count", "3"]);

        let steps = drain(&mut cursor, &mut flags);
        assert_eq!(steps.len(), 3);
        assert_eq!(name.get(), "ada");
        assert_eq!(count.get(), 3);
    }

    #[test]
    fn test_bool_flag_does_not_take_next_token() {
        let (mut flags, verbose) = Flags::default().with("verbose", false);
        let mut cursor = ArgCursor::new(["-verbose", "false"]);

        assert_eq!(
            cursor.consume_one(&mut flags).unwrap(),
            Consumed::Flag("verbose".into())
        );
        assert_eq!(cursor.consume_one(&mut flags).unwrap(), Consumed::End);
        assert!(verbose.get());
        assert_eq!(cursor.into_remaining(), vec!["false".to_string()]);
    }

    #[test]
    fn test_inline_bool_value() {
        let (mut flags, verbose) = Flags::default().with("verbose", true);
        let mut cursor = ArgCursor::new(["-verbose=false"]);
        cursor.consume_one(&mut flags).unwrap();
        assert!(!verbose.get());

        let mut cursor = ArgCursor::new(["-verbose=maybe"]);
        let err = cursor.consume_one(&mut flags).unwrap_err();
        assert!(matches!(err, TokenError::InvalidBool { .. }));
        assert_eq!(
            err.to_string(),
            "invalid boolean value \"maybe\" for -verbose: parse error"
        );
    }

    #[test]
    fn test_double_dash_terminates_and_is_consumed() {
        let (mut flags, _) = Flags::default().with("x", false);
        let mut cursor = ArgCursor::new(["-x", "--", "-x"]);
        let steps = drain(&mut cursor, &mut flags);
        assert_eq!(steps.len(), 2);
        assert!(cursor.is_finished());
        assert_eq!(cursor.remaining().collect::<Vec<_>>(), ["-x"]);
    }

    #[test]
    fn test_single_dash_is_positional() {
        let mut flags = Flags::default();
        let mut cursor = ArgCursor::new(["-", "-x"]);
        assert_eq!(cursor.consume_one(&mut flags).unwrap(), Consumed::End);
        assert_eq!(cursor.remaining().count(), 2);
    }

    #[test]
    fn test_bad_syntax_is_discarded() {
        let mut flags = Flags::default();
        for token in ["---x", "-=v", "--=v"] {
            let mut cursor = ArgCursor::new([token, "rest"]);
            let err = cursor.consume_one(&mut flags).unwrap_err();
            assert_eq!(err, TokenError::BadSyntax(token.to_string()));
            assert_eq!(cursor.remaining().collect::<Vec<_>>(), ["rest"]);
        }
    }

    #[test]
    fn test_undeclared_flag_is_classified() {
        let mut flags = Flags::default();
        let mut cursor = ArgCursor::new(["-nope=1"]);
        let err = cursor.consume_one(&mut flags).unwrap_err();
        assert!(err.is_undeclared());
        assert_eq!(err.flag_name(), Some("nope"));
        assert_eq!(err.to_string(), "flag provided but not defined: -nope");
    }

    #[test]
    fn test_missing_value() {
        let (mut flags, _) = Flags::default().with("out", String::new());
        let mut cursor = ArgCursor::new(["-out"]);
        let err = cursor.consume_one(&mut flags).unwrap_err();
        assert_eq!(err, TokenError::MissingValue("out".into()));
        assert!(!err.is_undeclared());
    }

    #[test]
    fn test_invalid_value_names_the_flag() {
        let (mut flags, count) = Flags::default().with("count", 1_i64);
        let mut cursor = ArgCursor::new(["-count=abc"]);
        let err = cursor.consume_one(&mut flags).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid value \"abc\" for flag -count: parse error"
        );
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_undeclared_help_names_request_help() {
        let mut flags = Flags::default();
        for token in ["-h", "--help", "-help=1"] {
            let mut cursor = ArgCursor::new([token]);
            assert_eq!(
                cursor.consume_one(&mut flags).unwrap(),
                Consumed::HelpRequested
            );
        }
    }

    #[test]
    fn test_declared_h_shadows_help() {
        let (mut flags, host) = Flags::default().with("h", String::new());
        let mut cursor = ArgCursor::new(["-h", "example.org"]);
        assert_eq!(
            cursor.consume_one(&mut flags).unwrap(),
            Consumed::Flag("h".into())
        );
        assert_eq!(host.get(), "example.org");
    }
}
