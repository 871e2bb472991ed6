//! Option type definitions: arity, kind, value-type tags and the metadata
//! that some tags require.
//!
//! An option's behavior during a parse is decided by two things: its
//! [`Arity`] (how many parameters it takes, classified into a [`Kind`]) and
//! its [`TypeTag`] (how each parameter token turns into a value). Enumerated
//! options carry an [`EnumTable`]; opaque options carry an [`OpaqueCodec`].

use std::any::Any;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::validate::SchemaError;
use crate::value::Opaque;

/// Declared parameter count of an option.
///
/// `max` of `None` means unbounded.
///
/// # Examples
///
/// ```
/// use argbind_core::{Arity, Kind};
///
/// assert_eq!(Arity::flag().kind(), Some(Kind::Flag));
/// assert_eq!(Arity::exactly(1).kind(), Some(Kind::Single));
/// assert_eq!(Arity::exactly(3).kind(), Some(Kind::Fixed));
/// assert_eq!(Arity::optional().kind(), Some(Kind::OptionalSingle));
/// assert_eq!(Arity::at_least(0).kind(), Some(Kind::Variadic));
/// assert_eq!(Arity::between(3, 2).kind(), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arity {
    pub min: usize,
    pub max: Option<usize>,
}

impl Arity {
    /// A pure flag: `(0, 0)`.
    pub fn flag() -> Self {
        Self::between(0, 0)
    }

    /// Exactly `n` parameters.
    pub fn exactly(n: usize) -> Self {
        Self::between(n, n)
    }

    /// Zero or one parameter: `(0, 1)`.
    pub fn optional() -> Self {
        Self::between(0, 1)
    }

    pub fn between(min: usize, max: usize) -> Self {
        Self {
            min,
            max: Some(max),
        }
    }

    /// `min` or more parameters, no upper bound.
    pub fn at_least(min: usize) -> Self {
        Self { min, max: None }
    }

    /// Classifies this arity, or returns `None` when `min > max`.
    ///
    /// The result depends on `(min, max)` alone.
    pub fn kind(&self) -> Option<Kind> {
        match (self.min, self.max) {
            (min, Some(max)) if min > max => None,
            (0, Some(0)) => Some(Kind::Flag),
            (1, Some(1)) => Some(Kind::Single),
            (min, Some(max)) if min == max => Some(Kind::Fixed),
            (0, Some(1)) => Some(Kind::OptionalSingle),
            _ => Some(Kind::Variadic),
        }
    }

    /// `min < max`: optional-single and variadic options.
    pub fn is_variable(&self) -> bool {
        self.max.is_none_or(|max| self.min < max)
    }

    /// Whether `count` parameters fall inside this arity.
    pub fn admits(&self, count: usize) -> bool {
        count >= self.min && self.max.is_none_or(|max| count <= max)
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) => write!(f, "({}, {})", self.min, max),
            None => write!(f, "({}, unbounded)", self.min),
        }
    }
}

/// Five-way classification of an [`Arity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Kind {
    /// `min = max = 0`: presence is the value.
    Flag = 1,
    /// `min = max = 1`.
    Single = 2,
    /// `min = max >= 2`.
    Fixed = 3,
    /// `min = 0, max = 1`; a default is mandatory.
    OptionalSingle = 4,
    /// `min < max`, including unbounded.
    Variadic = 5,
}

impl Kind {
    /// Numeric kind, 1 through 5.
    pub fn number(self) -> u8 {
        self as u8
    }
}

/// Declared value type of an option.
///
/// # Examples
///
/// ```
/// use argbind_core::TypeTag;
///
/// let tag: TypeTag = "uint".parse().unwrap();
/// assert_eq!(tag, TypeTag::UInt);
/// assert_eq!(tag.to_string(), "uint");
/// assert!("complex".parse::<TypeTag>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeTag {
    Bool,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    Size,
    Float,
    Double,
    Char,
    String,
    Enum,
    Other,
}

impl TypeTag {
    pub const ALL: [TypeTag; 14] = [
        TypeTag::Bool,
        TypeTag::Short,
        TypeTag::UShort,
        TypeTag::Int,
        TypeTag::UInt,
        TypeTag::Long,
        TypeTag::ULong,
        TypeTag::Size,
        TypeTag::Float,
        TypeTag::Double,
        TypeTag::Char,
        TypeTag::String,
        TypeTag::Enum,
        TypeTag::Other,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TypeTag::Bool => "bool",
            TypeTag::Short => "short",
            TypeTag::UShort => "ushort",
            TypeTag::Int => "int",
            TypeTag::UInt => "uint",
            TypeTag::Long => "long",
            TypeTag::ULong => "ulong",
            TypeTag::Size => "size",
            TypeTag::Float => "float",
            TypeTag::Double => "double",
            TypeTag::Char => "char",
            TypeTag::String => "string",
            TypeTag::Enum => "enum",
            TypeTag::Other => "other",
        }
    }

    /// Bool, integer family, float family or char.
    pub fn is_scalar(self) -> bool {
        !matches!(self, TypeTag::String | TypeTag::Enum | TypeTag::Other)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TypeTag {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TypeTag::ALL
            .into_iter()
            .find(|tag| tag.name() == s)
            .ok_or_else(|| SchemaError::UnknownType(s.to_string()))
    }
}

/// Type description accepted by [`Registry::register`](crate::Registry::register).
///
/// Enumerated and opaque types carry the metadata they need, so a
/// registration can never pair a tag with the wrong table or codec.
#[derive(Debug, Clone)]
pub enum TypeSpec {
    Bool,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    Size,
    Float,
    Double,
    Char,
    String,
    Enum(EnumTable),
    Other(OpaqueCodec),
}

impl TypeSpec {
    pub fn tag(&self) -> TypeTag {
        match self {
            TypeSpec::Bool => TypeTag::Bool,
            TypeSpec::Short => TypeTag::Short,
            TypeSpec::UShort => TypeTag::UShort,
            TypeSpec::Int => TypeTag::Int,
            TypeSpec::UInt => TypeTag::UInt,
            TypeSpec::Long => TypeTag::Long,
            TypeSpec::ULong => TypeTag::ULong,
            TypeSpec::Size => TypeTag::Size,
            TypeSpec::Float => TypeTag::Float,
            TypeSpec::Double => TypeTag::Double,
            TypeSpec::Char => TypeTag::Char,
            TypeSpec::String => TypeTag::String,
            TypeSpec::Enum(_) => TypeTag::Enum,
            TypeSpec::Other(_) => TypeTag::Other,
        }
    }

    /// Splits into the tag and the metadata a descriptor stores separately.
    pub fn into_parts(self) -> (TypeTag, Option<EnumTable>, Option<OpaqueCodec>) {
        let tag = self.tag();
        match self {
            TypeSpec::Enum(table) => (tag, Some(table), None),
            TypeSpec::Other(codec) => (tag, None, Some(codec)),
            _ => (tag, None, None),
        }
    }

    /// The scalar or string spec for `tag`; `None` for tags needing metadata.
    pub fn plain(tag: TypeTag) -> Option<Self> {
        Some(match tag {
            TypeTag::Bool => TypeSpec::Bool,
            TypeTag::Short => TypeSpec::Short,
            TypeTag::UShort => TypeSpec::UShort,
            TypeTag::Int => TypeSpec::Int,
            TypeTag::UInt => TypeSpec::UInt,
            TypeTag::Long => TypeSpec::Long,
            TypeTag::ULong => TypeSpec::ULong,
            TypeTag::Size => TypeSpec::Size,
            TypeTag::Float => TypeSpec::Float,
            TypeTag::Double => TypeSpec::Double,
            TypeTag::Char => TypeSpec::Char,
            TypeTag::String => TypeSpec::String,
            TypeTag::Enum | TypeTag::Other => return None,
        })
    }
}

/// Name to value table for an enumerated option.
///
/// # Examples
///
/// ```
/// use argbind_core::EnumTable;
///
/// let endian = EnumTable::new("endian", [("little", 1), ("big", 2)]);
/// assert_eq!(endian.lookup("BIG"), Some(2));
/// assert_eq!(endian.name_of(1), Some("little"));
/// assert_eq!(endian.case_sensitive().lookup("BIG"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumTable {
    pub name: String,
    pub entries: Vec<(String, i32)>,
    #[serde(default)]
    pub case_sensitive: bool,
}

impl EnumTable {
    pub fn new<N, I, S>(name: N, entries: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = (S, i32)>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            entries: entries.into_iter().map(|(n, v)| (n.into(), v)).collect(),
            case_sensitive: false,
        }
    }

    pub fn case_sensitive(mut self) -> Self {
        self.case_sensitive = true;
        self
    }

    pub fn lookup(&self, name: &str) -> Option<i32> {
        self.entries
            .iter()
            .find(|(entry, _)| {
                if self.case_sensitive {
                    entry == name
                } else {
                    entry.eq_ignore_ascii_case(name)
                }
            })
            .map(|(_, value)| *value)
    }

    pub fn name_of(&self, value: i32) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, v)| *v == value)
            .map(|(name, _)| name.as_str())
    }
}

/// How an opaque value is laid out in the caller's storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpaqueLayout {
    /// The value lives in the slot itself and occupies `size` bytes.
    Inline { size: usize },
    /// The slot holds a pointer to a separately owned value.
    Pointer,
}

/// Failure reported by an opaque parse callback.
///
/// `message` is passed through to the caller untouched; when it is empty the
/// error names `code` instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackFailure {
    pub code: i32,
    pub message: String,
}

impl CallbackFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: 1,
            message: message.into(),
        }
    }

    pub fn code(code: i32) -> Self {
        Self {
            code,
            message: String::new(),
        }
    }
}

pub type ParseFn = Rc<dyn Fn(&str) -> Result<Opaque, CallbackFailure>>;
pub type DestroyFn = Rc<dyn Fn(Opaque)>;

/// Parse and destroy callbacks for an opaque option type.
///
/// # Examples
///
/// ```
/// use argbind_core::{CallbackFailure, OpaqueCodec, Opaque};
///
/// let codec = OpaqueCodec::pointer("point")
///     .with_parse(|text| {
///         let (x, y) = text.split_once(',').ok_or_else(|| CallbackFailure::new("need x,y"))?;
///         let x: i32 = x.parse().map_err(|_| CallbackFailure::new("bad x"))?;
///         let y: i32 = y.parse().map_err(|_| CallbackFailure::new("bad y"))?;
///         Ok(Opaque::new((x, y)))
///     })
///     .with_destroy(|_| {});
/// assert_eq!(codec.type_name, "point");
/// assert!(codec.destroy.is_some());
/// ```
#[derive(Clone)]
pub struct OpaqueCodec {
    pub type_name: String,
    pub layout: OpaqueLayout,
    pub parse: Option<ParseFn>,
    pub destroy: Option<DestroyFn>,
}

impl OpaqueCodec {
    pub fn inline(type_name: impl Into<String>, size: usize) -> Self {
        Self {
            type_name: type_name.into(),
            layout: OpaqueLayout::Inline { size },
            parse: None,
            destroy: None,
        }
    }

    pub fn pointer(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            layout: OpaqueLayout::Pointer,
            parse: None,
            destroy: None,
        }
    }

    pub fn with_parse<F>(mut self, parse: F) -> Self
    where
        F: Fn(&str) -> Result<Opaque, CallbackFailure> + 'static,
    {
        self.parse = Some(Rc::new(parse));
        self
    }

    pub fn with_destroy<F>(mut self, destroy: F) -> Self
    where
        F: Fn(Opaque) + 'static,
    {
        self.destroy = Some(Rc::new(destroy));
        self
    }

    /// Bytes one element occupies in caller storage.
    pub fn element_size(&self) -> usize {
        match self.layout {
            OpaqueLayout::Inline { size } => size,
            OpaqueLayout::Pointer => std::mem::size_of::<Box<dyn Any>>(),
        }
    }
}

impl fmt::Debug for OpaqueCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpaqueCodec")
            .field("type_name", &self.type_name)
            .field("layout", &self.layout)
            .field("parse", &self.parse.is_some())
            .field("destroy", &self.destroy.is_some())
            .finish()
    }
}

/// Where an option's bound value came from in the last parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ValueSource {
    /// Not parsed yet, or the last parse failed.
    #[default]
    Unknown,
    /// Substituted from the option's default string.
    Default,
    /// Given on the command line.
    CommandLine,
    /// Read from a response file.
    ResponseFile,
}

impl ValueSource {
    pub fn is_explicit(self) -> bool {
        matches!(self, ValueSource::CommandLine | ValueSource::ResponseFile)
    }
}

/// What the binder allocated into an option's slot, so that
/// teardown releases exactly that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum AllocShape {
    #[default]
    None,
    /// One string or one opaque value with a destructor.
    Single,
    /// A fixed-length array of strings or of opaque values with a destructor.
    FixedArray,
    /// A variadic array.
    DynamicArray,
}
