//! Ordered flag registry.
//!
//! Registration order is display order in usage text. The help flag is
//! always the first entry and survives [`Registry::clear`].

use flagx_core::{Destinations, Value, ValueError, validate_flag_name};

use crate::error::{FlagxError, Result};

/// Name of the always-present help flag.
pub const HELP_FLAG: &str = "help";

const HELP_DESCRIPTION: &str = "show this help message";

/// Metadata for one registered flag.
#[derive(Debug)]
pub struct FlagDescriptor {
    name: String,
    description: String,
    required: bool,
    parsed: bool,
    value: Box<dyn Value>,
}

impl FlagDescriptor {
    /// The flag name, without dashes.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Description shown in usage text.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Whether parsing fails closed when the flag is absent.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Whether the flag was consumed during the last parse pass.
    pub fn is_parsed(&self) -> bool {
        self.parsed
    }

    /// The value destination.
    pub fn value(&self) -> &dyn Value {
        self.value.as_ref()
    }

    /// Whether this is the built-in help flag.
    pub fn is_help(&self) -> bool {
        self.name == HELP_FLAG
    }

    /// The flag as typed on a command line, e.g. `-name`.
    pub fn show_flag(&self) -> String {
        format!("-{}", self.name)
    }
}

/// Destination for the help flag; it only has to accept boolean syntax.
#[derive(Debug)]
struct HelpValue;

impl Value for HelpValue {
    fn set(&mut self, raw: &str) -> std::result::Result<(), ValueError> {
        <bool as flagx_core::FlagValue>::parse_flag(raw).map(|_| ())
    }

    fn is_bool_flag(&self) -> bool {
        true
    }

    fn type_name(&self) -> &'static str {
        "bool"
    }

    fn current_text(&self) -> String {
        "false".to_string()
    }
}

/// Insertion-ordered collection of [`FlagDescriptor`]s with unique names.
///
/// # Examples
///
/// ```
/// use flagx::{HELP_FLAG, Registry};
/// use flagx_core::SlotValue;
///
/// let mut registry = Registry::new();
/// let (_, port) = SlotValue::bind(8080_u32);
/// registry.register("port", "listen port", false, Box::new(port)).unwrap();
///
/// let names: Vec<&str> = registry.iter().map(|f| f.name()).collect();
/// assert_eq!(names, [HELP_FLAG, "port"]);
///
/// registry.clear();
/// assert_eq!(registry.len(), 1);
/// assert!(registry.lookup(HELP_FLAG).is_some());
/// ```
#[derive(Debug)]
pub struct Registry {
    flags: Vec<FlagDescriptor>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Creates a registry holding only the help flag.
    pub fn new() -> Self {
        let mut registry = Self { flags: Vec::new() };
        registry.add_help();
        registry
    }

    /// Appends a descriptor with `parsed = false`.
    ///
    /// # Errors
    ///
    /// Returns [`FlagxError::InvalidName`] for names the tokenizer could
    /// never produce, and [`FlagxError::DuplicateFlag`] if `name` is taken.
    pub fn register(
        &mut self,
        name: &str,
        description: &str,
        required: bool,
        value: Box<dyn Value>,
    ) -> Result<&FlagDescriptor> {
        validate_flag_name(name)?;
        if self.lookup(name).is_some() {
            return Err(FlagxError::DuplicateFlag(name.to_string()));
        }
        let index = self.flags.len();
        self.flags.push(FlagDescriptor {
            name: name.to_string(),
            description: description.to_string(),
            required,
            parsed: false,
            value,
        });
        Ok(&self.flags[index])
    }

    /// Finds a descriptor by name.
    pub fn lookup(&self, name: &str) -> Option<&FlagDescriptor> {
        self.flags.iter().find(|flag| flag.name == name)
    }

    /// Ensures the help flag exists, as the first entry.
    pub fn add_help(&mut self) {
        if self.lookup(HELP_FLAG).is_some() {
            return;
        }
        self.flags.insert(
            0,
            FlagDescriptor {
                name: HELP_FLAG.to_string(),
                description: HELP_DESCRIPTION.to_string(),
                required: false,
                parsed: false,
                value: Box::new(HelpValue),
            },
        );
    }

    /// Drops every descriptor, then re-adds the help flag.
    pub fn clear(&mut self) {
        self.flags.clear();
        self.add_help();
    }

    /// Descriptors in registration order, help first.
    pub fn iter(&self) -> impl Iterator<Item = &FlagDescriptor> {
        self.flags.iter()
    }

    /// Number of descriptors, help included.
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    /// Always `false` in practice: the help flag is never removed.
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Number of descriptors, help excluded.
    pub fn user_flag_count(&self) -> usize {
        self.flags.iter().filter(|flag| !flag.is_help()).count()
    }

    /// Required descriptors that were not consumed, in registration order.
    pub fn missing_required(&self) -> impl Iterator<Item = &FlagDescriptor> {
        self.flags
            .iter()
            .filter(|flag| flag.required && !flag.parsed)
    }

    pub(crate) fn reset_parsed(&mut self) {
        for flag in &mut self.flags {
            flag.parsed = false;
        }
    }

    pub(crate) fn mark_parsed(&mut self, name: &str) -> bool {
        match self.flags.iter_mut().find(|flag| flag.name == name) {
            Some(flag) => {
                flag.parsed = true;
                true
            }
            None => false,
        }
    }
}

impl Destinations for Registry {
    fn destination(&mut self, name: &str) -> Option<&mut dyn Value> {
        let flag = self.flags.iter_mut().find(|flag| flag.name == name)?;
        let value: &mut dyn Value = flag.value.as_mut();
        Some(value)
    }
}
