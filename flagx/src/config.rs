//! Declarative parser configuration.
//!
//! A [`ParserConfig`] describes a parser (name, description, policy, usage
//! style) and the flags it declares, and can be loaded from YAML or JSON.
//!
//! # Example YAML
//!
//! ```yaml
//! name: greet
//! description: Print a greeting.
//! policy:
//!   skip_undeclared: true
//! style: plain
//! flags:
//!   - name: name
//!     kind: string
//!     description: who to greet
//!     required: true
//!   - name: count
//!     kind: int
//!     default: "1"
//! ```

use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::time::Duration;

use flagx_core::{FlagValue, ValidationError, validate_flag_names};
use serde::{Deserialize, Serialize};

use crate::error::{FlagxError, Result};
use crate::parser::Parser;
use crate::policy::ErrorPolicy;
use crate::registry::HELP_FLAG;
use crate::usage::UsageStyle;

/// Value type of a declared flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagKind {
    /// `String`.
    String,
    /// `i64`.
    Int,
    /// `u64`.
    Uint,
    /// `f64`.
    Float,
    /// `bool`.
    Bool,
    /// [`Duration`].
    Duration,
    /// [`PathBuf`].
    Path,
}

impl FlagKind {
    fn declare(self, parser: &mut Parser, decl: &FlagDeclaration) -> Result<()> {
        match self {
            FlagKind::String => declare_as::<String>(parser, decl),
            FlagKind::Int => declare_as::<i64>(parser, decl),
            FlagKind::Uint => declare_as::<u64>(parser, decl),
            FlagKind::Float => declare_as::<f64>(parser, decl),
            FlagKind::Bool => declare_as::<bool>(parser, decl),
            FlagKind::Duration => declare_as::<Duration>(parser, decl),
            FlagKind::Path => declare_as::<PathBuf>(parser, decl),
        }
    }

    fn check_default(self, decl: &FlagDeclaration) -> Result<()> {
        match self {
            FlagKind::String => default_for::<String>(decl).map(drop),
            FlagKind::Int => default_for::<i64>(decl).map(drop),
            FlagKind::Uint => default_for::<u64>(decl).map(drop),
            FlagKind::Float => default_for::<f64>(decl).map(drop),
            FlagKind::Bool => default_for::<bool>(decl).map(drop),
            FlagKind::Duration => default_for::<Duration>(decl).map(drop),
            FlagKind::Path => default_for::<PathBuf>(decl).map(drop),
        }
    }
}

fn default_for<T: FlagValue + Default>(decl: &FlagDeclaration) -> Result<T> {
    match &decl.default {
        Some(raw) => T::parse_flag(raw).map_err(|source| FlagxError::InvalidDefault {
            name: decl.name.clone(),
            value: raw.clone(),
            source,
        }),
        None => Ok(T::default()),
    }
}

fn declare_as<T: FlagValue + Default>(parser: &mut Parser, decl: &FlagDeclaration) -> Result<()> {
    let default = default_for::<T>(decl)?;
    parser.var(&decl.name, default, &decl.description, decl.required)?;
    Ok(())
}

/// One flag in a [`ParserConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagDeclaration {
    /// Flag name, without dashes.
    pub name: String,
    /// Value type.
    pub kind: FlagKind,
    /// Usage description.
    #[serde(default)]
    pub description: String,
    /// Whether the flag must be given.
    #[serde(default)]
    pub required: bool,
    /// Default value as command-line text; the type's zero value if absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl FlagDeclaration {
    /// Creates a declaration with no description, not required, no default.
    pub fn new(name: impl Into<String>, kind: FlagKind) -> Self {
        Self {
            name: name.into(),
            kind,
            description: String::new(),
            required: false,
            default: None,
        }
    }

    /// Adds a description.
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    /// Marks the flag as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets the default value text.
    pub fn with_default(mut self, default: &str) -> Self {
        self.default = Some(default.to_string());
        self
    }
}

/// Parser settings plus flag declarations.
///
/// # Examples
///
/// ```
/// use flagx::{FlagDeclaration, FlagKind, ParserConfig};
///
/// let yaml = r#"
/// name: greet
/// flags:
///   - name: name
///     kind: string
///     required: true
/// "#;
/// let config = ParserConfig::from_yaml_str(yaml).unwrap();
/// assert_eq!(config.flags, vec![FlagDeclaration::new("name", FlagKind::String).required()]);
///
/// let parser = config.build().unwrap();
/// assert_eq!(parser.name(), "greet");
/// assert!(parser.lookup("name").unwrap().is_required());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Program name for usage text; `argv[0]` when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Program description for usage text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Error policy.
    pub policy: ErrorPolicy,
    /// Default usage renderer style.
    pub style: UsageStyle,
    /// Flags to register, in order.
    pub flags: Vec<FlagDeclaration>,
}

impl ParserConfig {
    /// Loads a configuration file. Files ending in `.json` are read as JSON,
    /// anything else as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`FlagxError::Io`] if the file cannot be read, or
    /// [`FlagxError::Yaml`] / [`FlagxError::Json`] if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(std::fs::File::open(path)?);
        let config = if is_json(path) {
            serde_json::from_reader(reader)?
        } else {
            serde_yaml::from_reader(reader)?
        };
        Ok(config)
    }

    /// Parses a YAML document.
    ///
    /// # Errors
    ///
    /// Returns [`FlagxError::Yaml`] if parsing fails.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Saves the configuration, as JSON for `.json` paths and YAML
    /// otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`FlagxError::Io`] if the file cannot be written, or a
    /// serialization error.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let writer = BufWriter::new(std::fs::File::create(path)?);
        if is_json(path) {
            serde_json::to_writer_pretty(writer, self)?;
        } else {
            serde_yaml::to_writer(writer, self)?;
        }
        Ok(())
    }

    /// Reports every problem [`build`](Self::build) would hit, instead of
    /// stopping at the first.
    pub fn validate(&self) -> Vec<FlagxError> {
        let names = std::iter::once(HELP_FLAG).chain(self.flags.iter().map(|f| f.name.as_str()));
        let mut errors: Vec<FlagxError> = validate_flag_names(names)
            .into_iter()
            .map(|err| match err {
                ValidationError::DuplicateName(name) => FlagxError::DuplicateFlag(name),
                other => FlagxError::from(other),
            })
            .collect();
        for decl in &self.flags {
            if let Err(err) = decl.kind.check_default(decl) {
                errors.push(err);
            }
        }
        errors
    }

    /// Builds a parser with the configured settings and flags.
    ///
    /// The parser writes to standard error and exits the process on
    /// termination requests; replace either on the returned parser.
    ///
    /// # Errors
    ///
    /// Returns the first registration error: a bad name, a duplicate, or a
    /// default that does not parse.
    pub fn build(&self) -> Result<Parser> {
        let mut parser = Parser::named(
            self.name.clone().unwrap_or_default(),
            self.description.clone().unwrap_or_default(),
        );
        parser.set_error_policy(self.policy);
        parser.set_style(self.style);
        for decl in &self.flags {
            decl.kind.declare(&mut parser, decl)?;
        }
        Ok(parser)
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}
