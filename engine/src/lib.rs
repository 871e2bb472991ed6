//! Command-line parsing against an [`argbind_core::Registry`].
//!
//! A call to [`parse`] runs these stages in order, stopping at the first
//! error:
//!
//! 1. **Drain** the token source stack ([`drain`]): command-line words,
//!    `@file` response files, `-{ ... }-` comment regions and the help token,
//!    each switched on through [`argbind_core::ParseConfig`].
//! 2. **Extract flagged** options ([`extract_flagged`]), greedy up to the
//!    option's maximum, another flag or `--`.
//! 3. **Extract unflagged** options ([`extract_unflagged`]), splitting the
//!    remaining words around the one variable-arity positional.
//! 4. **Reject leftovers** ([`reject_leftovers`]).
//! 5. **Resolve defaults** ([`resolve_defaults`]), including the inversion
//!    rule for a bare optional-single flag.
//! 6. **Bind** values into slots ([`bind_all`]), recording each allocation so
//!    [`release`] can free it.
//!
//! Errors are reported through [`ParseError`], one variant per failure class.
//!
//! # Example
//!
//! ```
//! use argbind_core::*;
//! use argbind_engine::{Outcome, parse};
//!
//! let verbose = Slot::new();
//! let count = Slot::new();
//! let rest = Slot::new();
//!
//! let mut registry = Registry::new();
//! registry.register(OptionSpec::flag("v,verbose", verbose.clone())).unwrap();
//! registry
//!     .register(OptionSpec::new("n", "count", TypeSpec::Int, Arity::exactly(1), count.clone()).with_default("10"))
//!     .unwrap();
//! registry
//!     .register(OptionSpec::positional("rest", TypeSpec::String, Arity::at_least(0), rest.clone()))
//!     .unwrap();
//!
//! let outcome = parse(&mut registry, &["-n", "7", "alpha", "beta"], &ParseConfig::default()).unwrap();
//! assert_eq!(outcome, Outcome::Parsed);
//! assert_eq!(verbose.get::<bool>(), Some(false));
//! assert_eq!(count.get::<i32>(), Some(7));
//! assert_eq!(rest.strings().unwrap(), vec!["alpha", "beta"]);
//!
//! argbind_engine::release(&mut registry).unwrap();
//! assert!(rest.is_null());
//! ```

mod bind;
mod convert;
mod defaults;
mod error;
mod extract;
mod parse;
mod source;
mod teardown;
mod tokens;

pub use bind::{bind_all, release, release_slot};
pub use convert::{convert_scalar, invert, parse_bool, parse_integer};
pub use defaults::{Resolved, is_defaulted, resolve_defaults};
pub use error::{ArityError, ConversionError, ParseError, Result, SourceError, UsageError};
pub use extract::{Capture, extract_flagged, extract_unflagged, reject_leftovers};
pub use parse::{Outcome, parse};
pub use source::{Drained, SourceStack, drain};
pub use teardown::{Exit, Teardown};
pub use tokens::{Provenance, Token, TokenVector, display_quoted, join_quoted, split_quoted};
