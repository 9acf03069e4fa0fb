//! Serializable view of a parser after a parse pass.

use serde::{Deserialize, Serialize};

use crate::registry::FlagDescriptor;

/// State of one registered flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagSnapshot {
    /// Flag name, without dashes.
    pub name: String,
    /// Value type as shown in usage text.
    pub type_name: String,
    /// Current value, as text.
    pub value: String,
    /// Registration default, when non-zero.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Whether the flag is required.
    pub required: bool,
    /// Whether the flag was consumed in the last pass.
    pub parsed: bool,
}

impl From<&FlagDescriptor> for FlagSnapshot {
    fn from(flag: &FlagDescriptor) -> Self {
        let value = flag.value();
        Self {
            name: flag.name().to_string(),
            type_name: value.type_name().to_string(),
            value: value.current_text(),
            default: value.default_text(),
            required: flag.is_required(),
            parsed: flag.is_parsed(),
        }
    }
}

/// Registry contents and leftover arguments, as returned by
/// [`Parser::snapshot`](crate::Parser::snapshot).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseSummary {
    /// Program name.
    pub program: String,
    /// Registered flags, help first.
    pub flags: Vec<FlagSnapshot>,
    /// Arguments left after flag parsing stopped.
    pub remaining: Vec<String>,
}

impl ParseSummary {
    /// Finds a flag by name.
    pub fn flag(&self, name: &str) -> Option<&FlagSnapshot> {
        self.flags.iter().find(|flag| flag.name == name)
    }

    /// Names of flags that were consumed.
    pub fn parsed_names(&self) -> Vec<&str> {
        self.flags
            .iter()
            .filter(|flag| flag.parsed)
            .map(|flag| flag.name.as_str())
            .collect()
    }
}
