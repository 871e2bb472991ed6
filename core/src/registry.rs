//! The option registry: descriptors, generic registration, flag matching.

use tracing::debug;

use crate::config::MULTI_FLAG_SEPARATOR;
use crate::types::{AllocShape, Arity, EnumTable, Kind, OpaqueCodec, TypeSpec, TypeTag, ValueSource};
use crate::validate::SchemaError;
use crate::value::Slot;

/// Per-parse results recorded on a descriptor.
///
/// Overwritten by every parse call; reset to defaults when a parse fails.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionOutput {
    pub source: ValueSource,
    /// The captured parameters rejoined into one string, or the default.
    pub parm_str: Option<String>,
    /// Number of parameters bound; meaningful for variadic options.
    pub count: usize,
    pub alloc: AllocShape,
}

/// Schema entry for one flagged or positional option.
///
/// A flag is declared without dashes. `"n"` matches `-n` only; `"v,verbose"`
/// matches both `-v` and `--verbose`. Options without a flag are positional
/// and take their tokens in registry order.
///
/// # Examples
///
/// ```
/// use argbind_core::{Arity, OptionDescriptor, Slot, TypeTag};
///
/// let verbose = OptionDescriptor::new(Some("v,verbose"), "verbose", TypeTag::Bool, Arity::flag(), Slot::new());
/// assert!(verbose.matches("-v"));
/// assert!(verbose.matches("--verbose"));
/// assert!(!verbose.matches("-verbose"));
/// assert_eq!(verbose.ident(), "--verbose");
///
/// let input = OptionDescriptor::new(None, "input", TypeTag::String, Arity::exactly(1), Slot::new());
/// assert_eq!(input.ident(), "<input>");
/// ```
#[derive(Debug, Clone)]
pub struct OptionDescriptor {
    pub flag: Option<String>,
    pub name: String,
    pub value_type: TypeTag,
    pub arity: Arity,
    pub storage: Option<Slot>,
    pub default: Option<String>,
    pub info: String,
    pub enum_table: Option<EnumTable>,
    pub codec: Option<OpaqueCodec>,
    pub output: OptionOutput,
}

impl OptionDescriptor {
    pub fn new(
        flag: Option<&str>,
        name: impl Into<String>,
        value_type: TypeTag,
        arity: Arity,
        storage: Slot,
    ) -> Self {
        Self {
            flag: flag.map(str::to_string),
            name: name.into(),
            value_type,
            arity,
            storage: Some(storage),
            default: None,
            info: String::new(),
            enum_table: None,
            codec: None,
            output: OptionOutput::default(),
        }
    }

    /// Classifies the current arity. Recomputed on every call.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::InvalidArity`] when `min > max`.
    pub fn kind(&self) -> Result<Kind, SchemaError> {
        self.arity.kind().ok_or_else(|| SchemaError::InvalidArity {
            option: self.ident(),
            arity: self.arity,
        })
    }

    /// The short and long halves of a `short,long` declaration, or `None`
    /// for single-form and positional options.
    pub fn flag_pair(&self) -> Option<(&str, &str)> {
        self.flag.as_deref()?.split_once(MULTI_FLAG_SEPARATOR)
    }

    /// Every token that selects this option.
    pub fn dashed_forms(&self) -> Vec<String> {
        match (self.flag.as_deref(), self.flag_pair()) {
            (_, Some((short, long))) => vec![format!("-{short}"), format!("--{long}")],
            (Some(flag), None) => vec![format!("-{flag}")],
            (None, None) => Vec::new(),
        }
    }

    pub fn matches(&self, token: &str) -> bool {
        match (self.flag.as_deref(), self.flag_pair()) {
            (_, Some((short, long))) => {
                token.strip_prefix("--") == Some(long) || token.strip_prefix('-') == Some(short)
            }
            (Some(flag), None) => token.strip_prefix('-') == Some(flag),
            (None, None) => false,
        }
    }

    /// Canonical identifier used in every message: the long form when there
    /// is one, else the short form, else `<name>`.
    pub fn ident(&self) -> String {
        match (self.flag.as_deref(), self.flag_pair()) {
            (_, Some((_, long))) => format!("--{long}"),
            (Some(flag), None) => format!("-{flag}"),
            (None, None) => format!("<{}>", self.name),
        }
    }

    pub fn is_flagged(&self) -> bool {
        self.flag.is_some()
    }
}

/// Arguments to [`Registry::register`].
///
/// # Examples
///
/// ```
/// use argbind_core::{Arity, OptionSpec, Registry, Slot, TypeSpec};
///
/// let count = Slot::new();
/// let mut registry = Registry::new();
/// let index = registry
///     .register(
///         OptionSpec::new("n,count", "count", TypeSpec::Int, Arity::exactly(1), count.clone())
///             .with_default("10")
///             .with_info("how many"),
///     )
///     .unwrap();
/// assert_eq!(registry.options()[index].ident(), "--count");
/// ```
#[derive(Debug, Clone)]
pub struct OptionSpec {
    pub flag: Option<String>,
    pub name: String,
    pub type_spec: TypeSpec,
    pub arity: Arity,
    pub storage: Slot,
    pub default: Option<String>,
    pub info: String,
}

impl OptionSpec {
    pub fn new(
        flag: impl Into<String>,
        name: impl Into<String>,
        type_spec: TypeSpec,
        arity: Arity,
        storage: Slot,
    ) -> Self {
        Self {
            flag: Some(flag.into()),
            name: name.into(),
            type_spec,
            arity,
            storage,
            default: None,
            info: String::new(),
        }
    }

    /// A positional option.
    pub fn positional(name: impl Into<String>, type_spec: TypeSpec, arity: Arity, storage: Slot) -> Self {
        Self {
            flag: None,
            name: name.into(),
            type_spec,
            arity,
            storage,
            default: None,
            info: String::new(),
        }
    }

    /// A pure boolean flag, named after its long form.
    pub fn flag(flag: impl Into<String>, storage: Slot) -> Self {
        let flag = flag.into();
        let name = match flag.split_once(MULTI_FLAG_SEPARATOR) {
            Some((_, long)) => long.to_string(),
            None => flag.clone(),
        };
        Self::new(flag, name, TypeSpec::Bool, Arity::flag(), storage)
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_info(mut self, info: impl Into<String>) -> Self {
        self.info = info.into();
        self
    }

    fn into_descriptor(self) -> OptionDescriptor {
        let (value_type, enum_table, codec) = self.type_spec.into_parts();
        OptionDescriptor {
            flag: self.flag,
            name: self.name,
            value_type,
            arity: self.arity,
            storage: Some(self.storage),
            default: self.default,
            info: self.info,
            enum_table,
            codec,
            output: OptionOutput::default(),
        }
    }
}

/// Ordered collection of option descriptors.
///
/// Built once, then reused across parse calls. Registration checks arity
/// only; call [`validate`](Registry::validate) for the full schema check
/// (the parser does so before reading any token).
#[derive(Debug, Clone, Default)]
pub struct Registry {
    options: Vec<OptionDescriptor>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one option and returns its index.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::InvalidArity`] when `min > max`.
    pub fn register(&mut self, spec: OptionSpec) -> Result<usize, SchemaError> {
        self.push(spec.into_descriptor())
    }

    /// Appends a prebuilt descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::InvalidArity`] when `min > max`.
    pub fn push(&mut self, descriptor: OptionDescriptor) -> Result<usize, SchemaError> {
        let kind = descriptor.kind()?;
        debug!(
            option = %descriptor.ident(),
            kind = kind.number(),
            value_type = %descriptor.value_type,
            "registered option"
        );
        self.options.push(descriptor);
        Ok(self.options.len() - 1)
    }

    pub fn options(&self) -> &[OptionDescriptor] {
        &self.options
    }

    pub fn get(&self, index: usize) -> Option<&OptionDescriptor> {
        self.options.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut OptionDescriptor> {
        self.options.get_mut(index)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut OptionDescriptor> {
        self.options.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Index of the flagged option selected by `token`.
    pub fn find_flag(&self, token: &str) -> Option<usize> {
        self.options.iter().position(|opt| opt.matches(token))
    }

    /// Clears every descriptor's output fields.
    pub fn reset_outputs(&mut self) {
        for opt in &mut self.options {
            opt.output = OptionOutput::default();
        }
    }
}
