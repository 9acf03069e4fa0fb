//! Process-termination hook.
//!
//! The parser never exits on its own; it asks a [`Terminator`]. The default,
//! [`ProcessExit`], really ends the process. Tests swap in a
//! [`RecordingTerminator`] (or any `Fn(i32)`) so the reporting paths can be
//! observed without the test binary going away.

use std::cell::RefCell;
use std::rc::Rc;

/// Status passed to the terminator for help, fatal parse errors and missing
/// required flags alike.
pub const TERMINATION_EXIT_CODE: i32 = 0;

/// Capability to stop the process.
///
/// Implementations that do not actually stop control flow must tolerate
/// being called several times in one parse pass (once per missing required
/// flag, after a fatal error).
pub trait Terminator {
    /// Requests termination with `code`.
    fn terminate(&self, code: i32);
}

impl<F> Terminator for F
where
    F: Fn(i32),
{
    fn terminate(&self, code: i32) {
        self(code)
    }
}

/// Exits the process via [`std::process::exit`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessExit;

impl Terminator for ProcessExit {
    fn terminate(&self, code: i32) {
        std::process::exit(code)
    }
}

/// Records termination requests instead of acting on them.
///
/// Clones share the same record.
///
/// # Examples
///
/// ```
/// use flagx::{RecordingTerminator, Terminator};
///
/// let recorder = RecordingTerminator::new();
/// let hook = recorder.clone();
/// hook.terminate(0);
/// assert_eq!(recorder.count(), 1);
/// assert_eq!(recorder.codes(), vec![0]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RecordingTerminator {
    codes: Rc<RefCell<Vec<i32>>>,
}

impl RecordingTerminator {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of termination requests seen.
    pub fn count(&self) -> usize {
        self.codes.borrow().len()
    }

    /// Whether termination was requested at all.
    pub fn was_called(&self) -> bool {
        self.count() > 0
    }

    /// Codes in request order.
    pub fn codes(&self) -> Vec<i32> {
        self.codes.borrow().clone()
    }

    /// Forgets every recorded request.
    pub fn reset(&self) {
        self.codes.borrow_mut().clear();
    }
}

impl Terminator for RecordingTerminator {
    fn terminate(&self, code: i32) {
        self.codes.borrow_mut().push(code);
    }
}
