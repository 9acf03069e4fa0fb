//! Typed flag values and a single-occurrence flag tokenizer.
//!
//! This crate is the primitive layer underneath `flagx`:
//!
//! - [`FlagValue`]: parsing and formatting for concrete value types
//!   (`String`, `bool`, integers, `f64`, [`Duration`](std::time::Duration),
//!   [`PathBuf`](std::path::PathBuf)).
//! - [`Value`]: the type-erased destination a flag writes into, with
//!   [`Slot`] / [`SlotValue`] as the shared-storage implementation.
//! - [`ArgCursor`]: consumes one flag occurrence at a time from an argument
//!   list, reporting [`TokenError`]s for undeclared flags and bad values.
//! - [`validate_flag_name`]: rules for names the tokenizer can produce.
//!
//! Required flags, error policies and usage text live in `flagx`.
//!
//! # Example
//!
//! ```
//! use flagx_core::*;
//!
//! struct One(SlotValue<i64>);
//!
//! impl Destinations for One {
//!     fn destination(&mut self, name: &str) -> Option<&mut dyn Value> {
//!         (name == "count").then_some(&mut self.0 as &mut dyn Value)
//!     }
//! }
//!
//! let (count, dest) = SlotValue::bind(0_i64);
//! let mut flags = One(dest);
//! let mut cursor = ArgCursor::new(["-count=3", "-other"]);
//!
//! assert_eq!(cursor.consume_one(&mut flags), Ok(Consumed::Flag("count".into())));
//! assert!(cursor.consume_one(&mut flags).unwrap_err().is_undeclared());
//! assert_eq!(count.get(), 3);
//! ```

mod token;
mod validate;
mod value;

pub use token::{ArgCursor, Consumed, Destinations, HELP_NAMES, TokenError};
pub use validate::{ValidationError, validate_flag_name, validate_flag_names};
pub use value::{FlagValue, Slot, SlotValue, Value, ValueError};
