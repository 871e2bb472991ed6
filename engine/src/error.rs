//! Error types for a parse call.
//!
//! Every stage returns the first error it meets. Messages name the offending
//! option by its canonical identifier (see
//! [`OptionDescriptor::ident`](argbind_core::OptionDescriptor::ident)).

use std::path::PathBuf;

use argbind_core::SchemaError;
use thiserror::Error;

/// Errors from a parse call, one variant per failure class.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Arity(#[from] ArityError),
    #[error(transparent)]
    Conversion(#[from] ConversionError),
    #[error(transparent)]
    Usage(#[from] UsageError),
}

/// Result type alias for parse operations.
pub type Result<T> = std::result::Result<T, ParseError>;

/// Failures while draining the token source stack.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("couldn't open \"{}\" for reading as response file: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("error reading response file \"{}\": {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("response file \"{}\" would nest more than {max} deep", .path.display())]
    TooDeep { path: PathBuf, max: usize },
    #[error("unbalanced end of comment region \"}}-\" in {origin}")]
    UnbalancedEnd { origin: String },
    #[error("{origin} ended with {depth} comment region(s) still open (unbalanced start \"-{{\")")]
    UnbalancedStart { origin: String, depth: usize },
}

/// Too few parameters captured for an option.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArityError {
    #[error("hit end of input before getting {needed} parameter(s) for {option} (got {got})")]
    EndOfInput { option: String, needed: usize, got: usize },
    #[error("hit flag {flag} before getting {needed} parameter(s) for {option} (got {got})")]
    SawFlag {
        option: String,
        flag: String,
        needed: usize,
        got: usize,
    },
    #[error("hit \"--\" (end of variable parameters) before getting {needed} parameter(s) for {option} (got {got})")]
    SawStopMarker { option: String, needed: usize, got: usize },
    #[error("don't have {needed} parameter(s) for {option} (only {remaining} left)")]
    MissingPositional {
        option: String,
        needed: usize,
        remaining: usize,
    },
    #[error("{option} needs at least {min} parameter(s) but only {got} remain")]
    TooFewVariadic { option: String, min: usize, got: usize },
}

/// A parameter or default that does not convert to the option's type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("couldn't parse \"{parm}\" as {type_name} for {option}")]
    Token {
        option: String,
        parm: String,
        type_name: String,
    },
    #[error("couldn't parse (default) \"{parm}\" as {type_name} for {option}")]
    DefaultToken {
        option: String,
        parm: String,
        type_name: String,
    },
    #[error("couldn't find \"{token}\" among {enum_name} values for {option}")]
    UnknownName {
        option: String,
        token: String,
        enum_name: String,
    },
    #[error("error parsing \"{parm}\" as {type_name} for {option}:\n{message}")]
    Callback {
        option: String,
        parm: String,
        type_name: String,
        message: String,
    },
    #[error("# parameters (in default) for {option} is {got}, but need {expected}")]
    DefaultCount {
        option: String,
        got: usize,
        expected: String,
    },
}

/// Input that fits no option, a required option that never appeared, or a
/// destination the caller is still reading.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsageError {
    #[error("didn't get required {option}")]
    MissingRequired { option: String },
    #[error("unexpected arg: \"{token}\"")]
    UnexpectedArgument { token: String },
    #[error("unexpected arg (or unrecognized flag): \"{token}\"")]
    UnrecognizedFlag { token: String },
    #[error("unexpected end-of-parameters flag \"--\": not ending a flagged variable-parameter option")]
    UnexpectedStopMarker,
    #[error("destination for {option} is borrowed by the caller")]
    SlotBorrowed { option: String },
}
