//! The process-default parser.
//!
//! Each thread owns one lazily created [`Parser`] named after `argv[0]`.
//! These functions forward to it, so small programs can register and parse
//! without threading a parser value around. A second thread gets its own,
//! empty parser; register and parse on the same thread.
//!
//! ```
//! use flagx::{global, RecordingTerminator, SharedBuffer};
//!
//! global::set_output(SharedBuffer::new());
//! global::set_terminator(RecordingTerminator::new());
//!
//! let port = global::with_command_line(|p| p.uint("port", 8080, "listen port", false)).unwrap();
//! global::parse_from(["-port", "9000"]).unwrap();
//! assert_eq!(port.get(), 9000);
//! ```

use std::cell::RefCell;

use crate::error::Result;
use crate::output::Output;
use crate::parser::Parser;
use crate::policy::ErrorPolicy;
use crate::terminate::Terminator;

thread_local! {
    static COMMAND_LINE: RefCell<Parser> = RefCell::new(Parser::new());
}

/// Runs `f` with the default parser.
///
/// # Panics
///
/// Panics if called re-entrantly from inside `f`, or from a custom usage
/// function or terminator while the default parser is parsing.
pub fn with_command_line<R>(f: impl FnOnce(&mut Parser) -> R) -> R {
    COMMAND_LINE.with_borrow_mut(f)
}

/// Replaces the default parser's error policy.
pub fn set_error_policy(policy: ErrorPolicy) {
    with_command_line(|parser| parser.set_error_policy(policy));
}

/// The default parser's error policy.
pub fn error_policy() -> ErrorPolicy {
    with_command_line(|parser| parser.error_policy())
}

/// Replaces the default parser's output sink.
pub fn set_output(output: impl Into<Output>) {
    let output = output.into();
    with_command_line(|parser| parser.set_output(output));
}

/// Replaces the default parser's termination hook.
pub fn set_terminator(terminator: impl Terminator + 'static) {
    with_command_line(|parser| parser.set_terminator(terminator));
}

/// Parses the process arguments with the default parser.
///
/// # Errors
///
/// See [`Parser::parse`].
pub fn parse() -> Result<()> {
    with_command_line(Parser::parse_env)
}

/// Parses `args` with the default parser.
///
/// # Errors
///
/// See [`Parser::parse`].
pub fn parse_from<I, S>(args: I) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    with_command_line(|parser| parser.parse(args))
}

/// Parses `args` with the default parser, panicking on any error.
///
/// # Panics
///
/// See [`Parser::must_parse`].
pub fn must_parse<I, S>(args: I)
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    with_command_line(|parser| parser.must_parse(args));
}

/// Writes the default parser's usage text.
///
/// # Errors
///
/// See [`Parser::usage`].
pub fn usage() -> Result<()> {
    with_command_line(Parser::usage)
}
