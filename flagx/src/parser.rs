//! The parse loop, required-flag enforcement and the parser instance API.
//!
//! A parse pass runs in three steps:
//!
//! 1. Consume flag occurrences until the arguments run out, a non-flag
//!    argument appears, help is requested, or an error is fatal under the
//!    current [`ErrorPolicy`].
//! 2. Report every required flag that was never consumed, however step 1
//!    ended.
//! 3. Reset the registry if `clear_after_parse` is on.
//!
//! Fatal errors, missing required flags and help all end in a call to the
//! [`Terminator`] with [`TERMINATION_EXIT_CODE`]. With the default
//! [`ProcessExit`] the process ends there; with any other terminator the
//! pass carries on and [`Parser::parse`] returns the first failure.

use std::fmt;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use flagx_core::{ArgCursor, Consumed, FlagValue, Slot, SlotValue, Value};
use tracing::{debug, trace, warn};

use crate::error::{FlagxError, Result};
use crate::output::Output;
use crate::policy::ErrorPolicy;
use crate::registry::{FlagDescriptor, HELP_FLAG, Registry};
use crate::summary::{FlagSnapshot, ParseSummary};
use crate::terminate::{ProcessExit, TERMINATION_EXIT_CODE, Terminator};
use crate::usage::{UsageFn, UsageStyle, render_default};

/// A flag parser: registry, error policy, output sink, usage renderer and
/// termination hook.
///
/// # Examples
///
/// ```
/// use flagx::{Parser, RecordingTerminator, SharedBuffer};
///
/// let out = SharedBuffer::new();
/// let exits = RecordingTerminator::new();
///
/// let mut parser = Parser::named("greet", "Print a greeting.");
/// parser.set_output(out.clone());
/// parser.set_terminator(exits.clone());
///
/// let name = parser.string("name", "", "who to greet", true).unwrap();
/// let verbose = parser.bool("verbose", false, "chatty output", false).unwrap();
///
/// let err = parser.parse(["-verbose"]).unwrap_err();
/// assert_eq!(err.to_string(), "flag is required: -name");
/// assert!(verbose.get());
/// assert_eq!(name.get(), "");
/// assert_eq!(exits.count(), 1);
/// assert_eq!(out.contents(), "flag is required: -name\n");
/// ```
pub struct Parser {
    name: String,
    description: String,
    registry: Registry,
    policy: ErrorPolicy,
    output: Output,
    usage_fn: Option<UsageFn>,
    style: UsageStyle,
    terminator: Box<dyn Terminator>,
    remaining: Vec<String>,
}

impl fmt::Debug for Parser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parser")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("registry", &self.registry)
            .field("policy", &self.policy)
            .field("output", &self.output)
            .field("custom_usage", &self.usage_fn.is_some())
            .field("style", &self.style)
            .field("remaining", &self.remaining)
            .finish_non_exhaustive()
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// `argv[0]` as given, or a placeholder when the platform provides none.
pub(crate) fn program_name() -> String {
    std::env::args_os()
        .next()
        .map(|arg| arg.to_string_lossy().into_owned())
        .unwrap_or_else(|| "command".to_string())
}

impl Parser {
    /// Creates a parser named after `argv[0]`, with no description.
    pub fn new() -> Self {
        Self::named("", "")
    }

    /// Creates a parser with a program name and description for usage text.
    ///
    /// An empty `name` falls back to `argv[0]`.
    pub fn named(name: impl Into<String>, description: impl Into<String>) -> Self {
        let mut name = name.into();
        if name.is_empty() {
            name = program_name();
        }
        Self {
            name,
            description: description.into(),
            registry: Registry::new(),
            policy: ErrorPolicy::new(),
            output: Output::default(),
            usage_fn: None,
            style: UsageStyle::default(),
            terminator: Box::new(ProcessExit),
            remaining: Vec::new(),
        }
    }

    /// Program name used in usage text.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Program description used in usage text.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The flag registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The current error policy.
    pub fn error_policy(&self) -> ErrorPolicy {
        self.policy
    }

    /// Replaces the error policy. Takes effect on the next parse pass.
    pub fn set_error_policy(&mut self, policy: ErrorPolicy) {
        self.policy = policy;
    }

    /// Replaces the output sink.
    pub fn set_output(&mut self, output: impl Into<Output>) {
        self.output = output.into();
    }

    /// The output sink, for writing alongside the parser's own reports.
    pub fn output(&mut self) -> &mut Output {
        &mut self.output
    }

    /// Replaces the termination hook.
    pub fn set_terminator(&mut self, terminator: impl Terminator + 'static) {
        self.terminator = Box::new(terminator);
    }

    /// Sets the style of the default usage renderer.
    pub fn set_style(&mut self, style: UsageStyle) {
        self.style = style;
    }

    /// The style of the default usage renderer.
    pub fn style(&self) -> UsageStyle {
        self.style
    }

    /// Installs a custom usage function, replacing the default renderer.
    pub fn set_usage<F>(&mut self, usage: F)
    where
        F: Fn(&Registry, &mut dyn Write) -> io::Result<()> + 'static,
    {
        self.usage_fn = Some(Box::new(usage));
    }

    /// Restores the default usage renderer.
    pub fn clear_usage(&mut self) {
        self.usage_fn = None;
    }

    /// Registers a flag with a caller-supplied destination.
    ///
    /// # Errors
    ///
    /// See [`Registry::register`].
    pub fn register(
        &mut self,
        name: &str,
        description: &str,
        required: bool,
        value: Box<dyn Value>,
    ) -> Result<&FlagDescriptor> {
        self.registry.register(name, description, required, value)
    }

    /// Registers a flag of any [`FlagValue`] type and returns its storage.
    ///
    /// # Errors
    ///
    /// See [`Registry::register`].
    pub fn var<T: FlagValue>(
        &mut self,
        name: &str,
        default: T,
        description: &str,
        required: bool,
    ) -> Result<Slot<T>> {
        let (slot, value) = SlotValue::bind(default);
        self.register(name, description, required, Box::new(value))?;
        Ok(slot)
    }

    /// Registers a flag that writes into an existing slot. The slot's
    /// current value is the default.
    ///
    /// # Errors
    ///
    /// See [`Registry::register`].
    pub fn var_into<T: FlagValue>(
        &mut self,
        slot: &Slot<T>,
        name: &str,
        description: &str,
        required: bool,
    ) -> Result<()> {
        let value = SlotValue::from_slot(slot.clone());
        self.register(name, description, required, Box::new(value))?;
        Ok(())
    }

    /// Registers a string flag.
    pub fn string(
        &mut self,
        name: &str,
        default: &str,
        description: &str,
        required: bool,
    ) -> Result<Slot<String>> {
        self.var(name, default.to_string(), description, required)
    }

    /// Registers a signed integer flag.
    pub fn int(
        &mut self,
        name: &str,
        default: i64,
        description: &str,
        required: bool,
    ) -> Result<Slot<i64>> {
        self.var(name, default, description, required)
    }

    /// Registers an unsigned integer flag.
    pub fn uint(
        &mut self,
        name: &str,
        default: u64,
        description: &str,
        required: bool,
    ) -> Result<Slot<u64>> {
        self.var(name, default, description, required)
    }

    /// Registers a floating-point flag.
    pub fn float(
        &mut self,
        name: &str,
        default: f64,
        description: &str,
        required: bool,
    ) -> Result<Slot<f64>> {
        self.var(name, default, description, required)
    }

    /// Registers a boolean flag.
    pub fn bool(
        &mut self,
        name: &str,
        default: bool,
        description: &str,
        required: bool,
    ) -> Result<Slot<bool>> {
        self.var(name, default, description, required)
    }

    /// Registers a duration flag (`1h30m`, `250ms`, ...).
    pub fn duration(
        &mut self,
        name: &str,
        default: Duration,
        description: &str,
        required: bool,
    ) -> Result<Slot<Duration>> {
        self.var(name, default, description, required)
    }

    /// Registers a path flag.
    pub fn path(
        &mut self,
        name: &str,
        default: impl Into<PathBuf>,
        description: &str,
        required: bool,
    ) -> Result<Slot<PathBuf>> {
        self.var(name, default.into(), description, required)
    }

    /// Finds a registered flag by name.
    pub fn lookup(&self, name: &str) -> Option<&FlagDescriptor> {
        self.registry.lookup(name)
    }

    /// Number of registered flags, help excluded.
    pub fn flag_count(&self) -> usize {
        self.registry.user_flag_count()
    }

    /// Number of flags consumed in the last parse pass.
    pub fn n_flag(&self) -> usize {
        self.registry.iter().filter(|flag| flag.is_parsed()).count()
    }

    /// Calls `f` for each consumed flag, in registration order.
    pub fn visit(&self, mut f: impl FnMut(&FlagDescriptor)) {
        self.registry
            .iter()
            .filter(|flag| flag.is_parsed())
            .for_each(|flag| f(flag));
    }

    /// Calls `f` for every registered flag, in registration order.
    pub fn visit_all(&self, f: impl FnMut(&FlagDescriptor)) {
        self.registry.iter().for_each(f);
    }

    /// Arguments left after flag parsing stopped.
    pub fn remaining(&self) -> &[String] {
        &self.remaining
    }

    /// Number of remaining arguments.
    pub fn n_arg(&self) -> usize {
        self.remaining.len()
    }

    /// The `i`-th remaining argument.
    pub fn arg(&self, i: usize) -> Option<&str> {
        self.remaining.get(i).map(String::as_str)
    }

    /// Captures the registry and remaining arguments.
    pub fn snapshot(&self) -> ParseSummary {
        ParseSummary {
            program: self.name.clone(),
            flags: self.registry.iter().map(FlagSnapshot::from).collect(),
            remaining: self.remaining.clone(),
        }
    }

    /// Parses the process arguments, skipping `argv[0]`.
    ///
    /// # Errors
    ///
    /// See [`Parser::parse`].
    pub fn parse_env(&mut self) -> Result<()> {
        let args: Vec<String> = std::env::args_os()
            .skip(1)
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();
        self.parse(args)
    }

    /// Runs one parse pass over `args` (program name excluded).
    ///
    /// Every failure is written to the output sink and handed to the
    /// terminator before this returns.
    ///
    /// # Errors
    ///
    /// - [`FlagxError::HelpRequested`] if the help flag was given. Missing
    ///   required flags are still reported.
    /// - [`FlagxError::Token`] for the first error the policy did not
    ///   suppress.
    /// - [`FlagxError::MissingRequired`] listing every required flag that
    ///   was not given, when nothing else failed first.
    pub fn parse<I, S>(&mut self, args: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.registry.reset_parsed();

        let mut cursor = ArgCursor::new(args);
        let outcome = self.consume_flags(&mut cursor);
        self.remaining = cursor.into_remaining();

        let missing = self.enforce_required();

        if self.policy.clear_after_parse {
            self.clear();
        }

        match outcome {
            Some(err) => Err(err),
            None if !missing.is_empty() => Err(FlagxError::MissingRequired(missing)),
            None => Ok(()),
        }
    }

    /// Like [`Parser::parse`], but panics with the returned error.
    ///
    /// # Panics
    ///
    /// Panics whenever [`Parser::parse`] would return an error other than a
    /// help request.
    pub fn must_parse<I, S>(&mut self, args: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        match self.parse(args) {
            Err(err) if !err.is_help() => panic!("{err}"),
            _ => {}
        }
    }

    /// Drops every registered flag except help. Slots handed out at
    /// registration keep their values.
    pub fn clear(&mut self) {
        debug!(parser = %self.name, "clearing registry");
        self.registry.clear();
    }

    /// Writes usage text to the output sink, through the custom usage
    /// function when one is installed.
    ///
    /// # Errors
    ///
    /// Returns [`FlagxError::Io`] if the sink rejects the write.
    pub fn usage(&mut self) -> Result<()> {
        match &self.usage_fn {
            Some(usage) => usage(&self.registry, &mut self.output)?,
            None => render_default(
                &self.name,
                &self.description,
                &self.registry,
                self.style,
                &mut self.output,
            )?,
        }
        self.output.flush()?;
        Ok(())
    }

    fn consume_flags(&mut self, cursor: &mut ArgCursor) -> Option<FlagxError> {
        loop {
            match cursor.consume_one(&mut self.registry) {
                Ok(Consumed::Flag(name)) if name == HELP_FLAG => return Some(self.request_help()),
                Ok(Consumed::Flag(name)) => {
                    debug!(parser = %self.name, flag = %name, "consumed flag");
                    self.registry.mark_parsed(&name);
                }
                Ok(Consumed::HelpRequested) => return Some(self.request_help()),
                Ok(Consumed::End) => {
                    trace!(parser = %self.name, remaining = cursor.remaining().count(), "no more flags");
                    return None;
                }
                Err(err) if self.policy.tolerates(&err) => {
                    debug!(parser = %self.name, policy = %self.policy, error = %err, "suppressed parse error");
                }
                Err(err) => {
                    self.report(&err.to_string());
                    self.terminate();
                    return Some(err.into());
                }
            }
        }
    }

    fn enforce_required(&mut self) -> Vec<String> {
        let missing: Vec<String> = self
            .registry
            .missing_required()
            .map(|flag| flag.name().to_string())
            .collect();
        for name in &missing {
            self.report(&format!("flag is required: -{name}"));
            self.terminate();
        }
        missing
    }

    fn request_help(&mut self) -> FlagxError {
        if let Err(err) = self.usage() {
            warn!(parser = %self.name, error = %err, "failed to write usage");
        }
        self.terminate();
        FlagxError::HelpRequested
    }

    fn report(&mut self, message: &str) {
        let written = writeln!(self.output, "{message}").and_then(|()| self.output.flush());
        if let Err(err) = written {
            warn!(parser = %self.name, error = %err, "failed to write parse report");
        }
    }

    fn terminate(&self) {
        debug!(parser = %self.name, code = TERMINATION_EXIT_CODE, "requesting termination");
        self.terminator.terminate(TERMINATION_EXIT_CODE);
    }
}
