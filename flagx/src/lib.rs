//! Command-line flag parsing with required flags, configurable error
//! policies and a substitutable termination hook.
//!
//! Flags follow the single-dash convention: `-name value`, `-name=value`,
//! `--name`, and `-flag` alone for booleans. Parsing stops at the first
//! non-flag argument or after `--`.
//!
//! On top of that syntax a [`Parser`] adds:
//!
//! - required flags, reported one by one when absent;
//! - an [`ErrorPolicy`] that can suppress all errors or only undeclared
//!   flags, and optionally clear the registry after each pass;
//! - a [`Terminator`] consulted for help, fatal errors and missing required
//!   flags, always with [`TERMINATION_EXIT_CODE`];
//! - a built-in `-help` flag and a replaceable usage renderer.
//!
//! Parsers can also be described declaratively with a [`ParserConfig`]
//! loaded from YAML or JSON.
//!
//! # Example
//!
//! ```
//! use flagx::{ErrorPolicy, Parser, RecordingTerminator, SharedBuffer};
//!
//! let mut parser = Parser::named("serve", "Run the server.");
//! parser.set_output(SharedBuffer::new());
//! parser.set_terminator(RecordingTerminator::new());
//! parser.set_error_policy(ErrorPolicy::new().with_skip_undeclared());
//!
//! let port = parser.uint("port", 8080, "listen port", false).unwrap();
//! let root = parser.path("root", ".", "document root", true).unwrap();
//!
//! parser.parse(["-root", "/srv", "-legacy", "-port=9000", "extra"]).unwrap();
//! assert_eq!(port.get(), 9000);
//! assert_eq!(root.get(), std::path::PathBuf::from("/srv"));
//! assert_eq!(parser.remaining(), ["extra"]);
//! ```

mod config;
mod error;
pub mod global;
mod output;
mod parser;
mod policy;
mod registry;
mod summary;
mod terminate;
mod usage;

pub use config::{FlagDeclaration, FlagKind, ParserConfig};
pub use error::{FlagxError, Result};
pub use output::{Output, SharedBuffer};
pub use parser::Parser;
pub use policy::{ErrorPolicy, PolicyOption};
pub use registry::{FlagDescriptor, HELP_FLAG, Registry};
pub use summary::{FlagSnapshot, ParseSummary};
pub use terminate::{ProcessExit, RecordingTerminator, TERMINATION_EXIT_CODE, Terminator};
pub use usage::{UsageFn, UsageStyle, render_default};

pub use flagx_core::{FlagValue, Slot, SlotValue, TokenError, Value, ValueError};
