//! Option descriptors and the option registry.
//!
//! This crate defines the schema side of declarative command-line parsing:
//!
//! - [`OptionDescriptor`]: one flagged or positional option with its flag, value
//!   type, [`Arity`], destination [`Slot`], default string, and the output
//!   fields a parse fills in.
//! - [`Registry`]: the ordered set of descriptors, built through the single
//!   generic [`Registry::register`] entry point.
//! - [`Kind`]: the five-way classification of an arity that drives
//!   extraction and default handling.
//! - [`ParseConfig`]: feature switches passed explicitly into every parse.
//! - [`RegistryDocument`]: registries as JSON or YAML data.
//!
//! Validation ([`Registry::validate`]) catches malformed registries before
//! any token is read: bad arities, type metadata that does not match the type
//! tag, illegal or duplicate flags, and more than one positional variadic.
//!
//! The parse itself lives in the `argbind-engine` crate.
//!
//! # Example
//!
//! ```
//! use argbind_core::*;
//!
//! let verbose = Slot::new();
//! let files = Slot::new();
//!
//! let mut registry = Registry::new();
//! registry
//!     .register(OptionSpec::flag("v,verbose", verbose.clone()).with_info("say more"))
//!     .unwrap();
//! registry
//!     .register(OptionSpec::positional("files", TypeSpec::String, Arity::at_least(1), files.clone()))
//!     .unwrap();
//!
//! assert!(registry.validate().is_ok());
//! assert_eq!(registry.options()[1].kind().unwrap(), Kind::Variadic);
//! ```

mod config;
mod document;
mod registry;
mod types;
mod validate;
mod value;

pub use config::*;
pub use document::{
    EnumDocument, EnumValueDocument, MaxBound, OptionDocument, RegistryDocument, Unbounded,
};
pub use registry::{OptionDescriptor, OptionOutput, OptionSpec, Registry};
pub use types::*;
pub use validate::{SchemaError, validate_registry};
pub use value::{Bound, FromValue, Opaque, Slot, SlotBorrowed, Value};
