//! Error-handling policy for a parse pass.
//!
//! The policy is three independent switches. None of them outranks another;
//! each is checked against the error at hand on its own.
//!
//! # Example YAML
//!
//! ```yaml
//! continue_on_error: false
//! skip_undeclared: true
//! clear_after_parse: false
//! ```

use std::fmt;
use std::str::FromStr;

use flagx_core::TokenError;
use serde::{Deserialize, Serialize};

/// How a [`Parser`](crate::Parser) reacts to parse errors.
///
/// Missing fields deserialize as `false`.
///
/// # Examples
///
/// ```
/// use flagx::{ErrorPolicy, PolicyOption};
/// use flagx_core::TokenError;
///
/// let policy = ErrorPolicy::new().with_skip_undeclared();
/// assert!(policy.tolerates(&TokenError::Undeclared("x".into())));
/// assert!(!policy.tolerates(&TokenError::MissingValue("out".into())));
///
/// let same: ErrorPolicy = "skip-undeclared".parse::<PolicyOption>().unwrap().into();
/// assert_eq!(policy, same);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorPolicy {
    /// Suppress every parse error and keep going.
    pub continue_on_error: bool,
    /// Suppress only undeclared-flag errors and keep going.
    pub skip_undeclared: bool,
    /// Drop every descriptor except help once the pass is over.
    pub clear_after_parse: bool,
}

impl ErrorPolicy {
    /// A policy with every switch off: the first error is fatal.
    pub const fn new() -> Self {
        Self {
            continue_on_error: false,
            skip_undeclared: false,
            clear_after_parse: false,
        }
    }

    /// Turns on `continue_on_error`.
    pub const fn with_continue_on_error(mut self) -> Self {
        self.continue_on_error = true;
        self
    }

    /// Turns on `skip_undeclared`.
    pub const fn with_skip_undeclared(mut self) -> Self {
        self.skip_undeclared = true;
        self
    }

    /// Turns on `clear_after_parse`.
    pub const fn with_clear_after_parse(mut self) -> Self {
        self.clear_after_parse = true;
        self
    }

    /// Turns on the switch named by `option`.
    pub const fn with(self, option: PolicyOption) -> Self {
        match option {
            PolicyOption::ContinueOnError => self.with_continue_on_error(),
            PolicyOption::SkipUndeclared => self.with_skip_undeclared(),
            PolicyOption::ClearAfterParse => self.with_clear_after_parse(),
        }
    }

    /// Builds a policy with exactly the given switches on.
    pub fn from_options(options: impl IntoIterator<Item = PolicyOption>) -> Self {
        options.into_iter().fold(Self::new(), Self::with)
    }

    /// Whether the switch named by `option` is on.
    pub const fn contains(&self, option: PolicyOption) -> bool {
        match option {
            PolicyOption::ContinueOnError => self.continue_on_error,
            PolicyOption::SkipUndeclared => self.skip_undeclared,
            PolicyOption::ClearAfterParse => self.clear_after_parse,
        }
    }

    /// The switches that are on, in declaration order.
    pub fn options(&self) -> Vec<PolicyOption> {
        PolicyOption::ALL
            .into_iter()
            .filter(|option| self.contains(*option))
            .collect()
    }

    /// Whether the parse loop should discard the offending token and keep
    /// going instead of treating `err` as fatal.
    pub fn tolerates(&self, err: &TokenError) -> bool {
        self.continue_on_error || (self.skip_undeclared && err.is_undeclared())
    }
}

impl From<PolicyOption> for ErrorPolicy {
    fn from(option: PolicyOption) -> Self {
        Self::new().with(option)
    }
}

impl FromIterator<PolicyOption> for ErrorPolicy {
    fn from_iter<I: IntoIterator<Item = PolicyOption>>(iter: I) -> Self {
        Self::from_options(iter)
    }
}

impl fmt::Display for ErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let options = self.options();
        if options.is_empty() {
            return f.write_str("none");
        }
        let names: Vec<&str> = options.iter().map(|o| o.as_str()).collect();
        f.write_str(&names.join("|"))
    }
}

/// One named switch of an [`ErrorPolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PolicyOption {
    /// See [`ErrorPolicy::continue_on_error`].
    ContinueOnError,
    /// See [`ErrorPolicy::skip_undeclared`].
    SkipUndeclared,
    /// See [`ErrorPolicy::clear_after_parse`].
    ClearAfterParse,
}

impl PolicyOption {
    /// Every option, in declaration order.
    pub const ALL: [PolicyOption; 3] = [
        PolicyOption::ContinueOnError,
        PolicyOption::SkipUndeclared,
        PolicyOption::ClearAfterParse,
    ];

    /// Kebab-case name, as accepted by [`FromStr`].
    pub const fn as_str(&self) -> &'static str {
        match self {
            PolicyOption::ContinueOnError => "continue-on-error",
            PolicyOption::SkipUndeclared => "skip-undeclared",
            PolicyOption::ClearAfterParse => "clear-after-parse",
        }
    }
}

impl fmt::Display for PolicyOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PolicyOption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        PolicyOption::ALL
            .into_iter()
            .find(|option| option.as_str() == normalized)
            .ok_or_else(|| {
                format!(
                    "unknown policy option '{s}' (expected one of: continue-on-error, skip-undeclared, clear-after-parse)"
                )
            })
    }
}
