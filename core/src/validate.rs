//! Flag name validation.
//!
//! A flag name is what follows the dashes on the command line, so it must be
//! something the tokenizer can actually produce: non-empty, not starting
//! with a dash, and free of `=` and whitespace.
//!
//! # Examples
//!
//! ```
//! use flagx_core::{ValidationError, validate_flag_name, validate_flag_names};
//!
//! assert!(validate_flag_name("dry-run").is_ok());
//! assert_eq!(
//!     validate_flag_name("--verbose"),
//!     Err(ValidationError::LeadingDash("--verbose".into()))
//! );
//!
//! let errors = validate_flag_names(["port", "host", "port"]);
//! assert_eq!(errors, vec![ValidationError::DuplicateName("port".into())]);
//! ```

use std::collections::HashSet;

use thiserror::Error;

/// Flag name validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Name is empty.
    #[error("flag name cannot be empty")]
    EmptyName,
    /// Name starts with `-`; dashes belong to the command line, not the name.
    #[error("flag name cannot start with '-': {0}")]
    LeadingDash(String),
    /// Name contains `=`, which separates inline values.
    #[error("flag name cannot contain '=': {0}")]
    ContainsEquals(String),
    /// Name contains whitespace and could never be typed as one token.
    #[error("flag name cannot contain whitespace: {0:?}")]
    ContainsWhitespace(String),
    /// Two flags in the same set share a name.
    #[error("duplicate flag name: {0}")]
    DuplicateName(String),
}

/// Validates a single flag name.
///
/// # Errors
///
/// Returns the first rule the name breaks.
pub fn validate_flag_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if name.starts_with('-') {
        return Err(ValidationError::LeadingDash(name.to_string()));
    }
    if name.contains('=') {
        return Err(ValidationError::ContainsEquals(name.to_string()));
    }
    if name.chars().any(char::is_whitespace) {
        return Err(ValidationError::ContainsWhitespace(name.to_string()));
    }
    Ok(())
}

/// Validates a whole set of names, including uniqueness.
///
/// Every broken name is reported; each duplicate is reported once.
pub fn validate_flag_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut reported: HashSet<&str> = HashSet::new();

    for name in names {
        if let Err(err) = validate_flag_name(name) {
            errors.push(err);
            continue;
        }
        if !seen.insert(name) && reported.insert(name) {
            errors.push(ValidationError::DuplicateName(name.to_string()));
        }
    }

    errors
}
