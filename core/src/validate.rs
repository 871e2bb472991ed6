//! Registry validation.
//!
//! Checks the structural invariants a registry must satisfy before any token
//! is read: valid arity, storage present, type metadata matching the type
//! tag, well formed and unique flags, defaults for optional-single options,
//! and at most one positional variadic option.
//!
//! Validation stops at the first violation and has no side effects, so it
//! can run any number of times.
//!
//! # Examples
//!
//! ```
//! use argbind_core::*;
//!
//! let mut registry = Registry::new();
//! registry.register(OptionSpec::flag("v,verbose", Slot::new())).unwrap();
//! assert!(registry.validate().is_ok());
//!
//! // Invalid: flags are declared without their leading dash
//! registry.register(OptionSpec::flag("-q", Slot::new())).unwrap();
//! assert!(matches!(registry.validate(), Err(SchemaError::InvalidFlag { .. })));
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::config::{
    MULTI_FLAG_SEPARATOR, RESERVED_TOKENS, RESPONSE_FILE_COMMENT, RESPONSE_FILE_MARKER,
};
use crate::registry::{OptionDescriptor, Registry};
use crate::types::{Arity, Kind, OpaqueLayout, TypeTag};

/// Malformed registry.
///
/// Always fatal, and always detected before any token is read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// `min > max`.
    #[error("invalid arity {arity} for {option}: min exceeds max")]
    InvalidArity { option: String, arity: Arity },
    /// A type name that is not one of the known tags.
    #[error("unknown value type \"{0}\"")]
    UnknownType(String),
    #[error("no storage supplied for {option}")]
    MissingStorage { option: String },
    #[error("{option} is of type enum but has no enum table")]
    MissingEnumTable { option: String },
    #[error("{option} is of type {value_type} but carries an enum table")]
    UnexpectedEnumTable { option: String, value_type: TypeTag },
    #[error("{option} is of type other but has no callbacks")]
    MissingCallbacks { option: String },
    #[error("{option} is of type {value_type} but carries callbacks")]
    UnexpectedCallbacks { option: String, value_type: TypeTag },
    #[error("callbacks for {option} declare a zero element size")]
    ZeroElementSize { option: String },
    #[error("callbacks for {option} have no parse function")]
    MissingParseCallback { option: String },
    /// A destructor only makes sense when the slot holds a pointer.
    #[error("callbacks for {option} pair a destructor with inline {size}-byte elements")]
    DestroyWithoutPointer { option: String, size: usize },
    #[error("flag for option {index} ({name}) is empty")]
    EmptyFlag { index: usize, name: String },
    #[error("invalid flag \"{flag}\": {reason}")]
    InvalidFlag { flag: String, reason: String },
    #[error("duplicate flag {0}")]
    DuplicateFlag(String),
    #[error("positional option {index} has no name")]
    MissingName { index: usize },
    /// A pure flag has nothing to be positional about.
    #[error("{option} takes no parameters and so needs a flag")]
    UnflaggedFlag { option: String },
    /// A parameterless flag only ever records whether it appeared.
    #[error("{option} takes no parameters and so must be of type bool, not {value_type}")]
    FlagNotBool { option: String, value_type: TypeTag },
    #[error("{option} takes zero or one parameter and so needs a non-empty default")]
    MissingDefault { option: String },
    /// Positional parameters can only be distributed around one
    /// variable-arity option.
    #[error("only one positional option may take a variable number of parameters, but {first} and {second} both do")]
    MultipleUnflaggedVariadic { first: String, second: String },
}

impl Registry {
    /// Validates the whole registry.
    ///
    /// # Errors
    ///
    /// Returns the first [`SchemaError`] found, checking each descriptor in
    /// order before the registry-wide variadic rule.
    pub fn validate(&self) -> Result<(), SchemaError> {
        validate_registry(self)
    }
}

/// Validates a registry; see [`Registry::validate`].
///
/// # Errors
///
/// Returns the first [`SchemaError`] found.
pub fn validate_registry(registry: &Registry) -> Result<(), SchemaError> {
    let mut seen_flags: HashSet<String> = HashSet::new();
    let mut pivot: Option<&OptionDescriptor> = None;

    for (index, opt) in registry.options().iter().enumerate() {
        let kind = opt.kind()?;
        validate_storage(opt)?;
        validate_type_metadata(opt)?;

        match opt.flag.as_deref() {
            Some(flag) => {
                validate_flag(index, opt, flag)?;
                if kind == Kind::Flag && opt.value_type != TypeTag::Bool {
                    return Err(SchemaError::FlagNotBool {
                        option: opt.ident(),
                        value_type: opt.value_type,
                    });
                }
                for form in opt.dashed_forms() {
                    if !seen_flags.insert(form.clone()) {
                        return Err(SchemaError::DuplicateFlag(form));
                    }
                }
            }
            None => {
                if opt.name.trim().is_empty() {
                    return Err(SchemaError::MissingName { index });
                }
                if kind == Kind::Flag {
                    return Err(SchemaError::UnflaggedFlag { option: opt.ident() });
                }
            }
        }

        if kind == Kind::OptionalSingle && opt.default.as_deref().is_none_or(|d| d.trim().is_empty()) {
            return Err(SchemaError::MissingDefault { option: opt.ident() });
        }

        if opt.arity.is_variable() && !opt.is_flagged() {
            if let Some(first) = pivot {
                return Err(SchemaError::MultipleUnflaggedVariadic {
                    first: first.ident(),
                    second: opt.ident(),
                });
            }
            pivot = Some(opt);
        }
    }

    Ok(())
}

fn validate_storage(opt: &OptionDescriptor) -> Result<(), SchemaError> {
    if opt.storage.is_none() {
        return Err(SchemaError::MissingStorage { option: opt.ident() });
    }
    Ok(())
}

fn validate_type_metadata(opt: &OptionDescriptor) -> Result<(), SchemaError> {
    match (opt.value_type, &opt.enum_table) {
        (TypeTag::Enum, None) => {
            return Err(SchemaError::MissingEnumTable { option: opt.ident() });
        }
        (value_type, Some(_)) if value_type != TypeTag::Enum => {
            return Err(SchemaError::UnexpectedEnumTable {
                option: opt.ident(),
                value_type,
            });
        }
        _ => {}
    }

    match (opt.value_type, &opt.codec) {
        (TypeTag::Other, None) => Err(SchemaError::MissingCallbacks { option: opt.ident() }),
        (TypeTag::Other, Some(codec)) => {
            if codec.element_size() == 0 {
                return Err(SchemaError::ZeroElementSize { option: opt.ident() });
            }
            if codec.parse.is_none() {
                return Err(SchemaError::MissingParseCallback { option: opt.ident() });
            }
            match (codec.layout, &codec.destroy) {
                (OpaqueLayout::Inline { size }, Some(_)) => Err(SchemaError::DestroyWithoutPointer {
                    option: opt.ident(),
                    size,
                }),
                _ => Ok(()),
            }
        }
        (value_type, Some(_)) => Err(SchemaError::UnexpectedCallbacks {
            option: opt.ident(),
            value_type,
        }),
        (_, None) => Ok(()),
    }
}

fn validate_flag(index: usize, opt: &OptionDescriptor, flag: &str) -> Result<(), SchemaError> {
    if flag.is_empty() {
        return Err(SchemaError::EmptyFlag {
            index,
            name: opt.name.clone(),
        });
    }

    let invalid = |reason: &str| SchemaError::InvalidFlag {
        flag: flag.to_string(),
        reason: reason.to_string(),
    };

    if let Some(c) = flag.chars().find(|c| c.is_whitespace() || c.is_control()) {
        return Err(invalid(&format!("contains {c:?}")));
    }
    if let Some(c) = flag
        .chars()
        .find(|c| [RESPONSE_FILE_MARKER, RESPONSE_FILE_COMMENT, '"'].contains(c))
    {
        return Err(invalid(&format!("contains reserved character '{c}'")));
    }
    if flag.matches(MULTI_FLAG_SEPARATOR).count() > 1 {
        return Err(invalid("more than one short,long separator"));
    }

    let halves: Vec<&str> = flag.split(MULTI_FLAG_SEPARATOR).collect();
    if halves.iter().any(|half| half.is_empty()) {
        return Err(invalid("short or long form is empty"));
    }
    if halves.iter().any(|half| half.starts_with('-')) {
        return Err(invalid("flags are declared without leading dashes"));
    }

    if let Some(form) = opt
        .dashed_forms()
        .into_iter()
        .find(|form| RESERVED_TOKENS.contains(&form.as_str()))
    {
        return Err(invalid(&format!("{form} is a reserved token")));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::OptionSpec;
    use crate::types::{CallbackFailure, EnumTable, OpaqueCodec, TypeSpec};
    use crate::value::{Opaque, Slot};

    fn registry_with(specs: Vec<OptionSpec>) -> Registry {
        let mut registry = Registry::new();
        for spec in specs {
            registry.register(spec).unwrap();
        }
        registry
    }

    fn int_opt(flag: &str) -> OptionSpec {
        OptionSpec::new(flag, flag, TypeSpec::Int, Arity::exactly(1), Slot::new())
    }

    #[test]
    fn test_validate_accepts_typical_registry() {
        let registry = registry_with(vec![
            OptionSpec::flag("v,verbose", Slot::new()),
            int_opt("n").with_default("10"),
            OptionSpec::new("s", "scale", TypeSpec::Double, Arity::optional(), Slot::new()).with_default("1.0"),
            OptionSpec::positional("input", TypeSpec::String, Arity::exactly(1), Slot::new()),
            OptionSpec::positional("rest", TypeSpec::String, Arity::at_least(0), Slot::new()),
        ]);
        assert_eq!(registry.validate(), Ok(()));
    }

    #[test]
    fn test_validate_is_idempotent() {
        let registry = registry_with(vec![int_opt("n"), int_opt("n")]);
        let first = registry.validate();
        assert!(first.is_err());
        assert_eq!(first, registry.validate());
    }

    #[test]
    fn test_validate_rejects_missing_storage() {
        let mut registry = registry_with(vec![int_opt("n")]);
        registry.get_mut(0).unwrap().storage = None;
        assert_eq!(
            registry.validate(),
            Err(SchemaError::MissingStorage { option: "-n".into() })
        );
    }

    #[test]
    fn test_validate_enum_table_iff_enum() {
        let mut registry = registry_with(vec![OptionSpec::new(
            "e",
            "endian",
            TypeSpec::Enum(EnumTable::new("endian", [("little", 1), ("big", 2)])),
            Arity::exactly(1),
            Slot::new(),
        )]);
        assert!(registry.validate().is_ok());

        registry.get_mut(0).unwrap().enum_table = None;
        assert_eq!(
            registry.validate(),
            Err(SchemaError::MissingEnumTable { option: "-e".into() })
        );

        let mut registry = registry_with(vec![int_opt("n")]);
        registry.get_mut(0).unwrap().enum_table = Some(EnumTable::new("x", [("a", 0)]));
        assert!(matches!(
            registry.validate(),
            Err(SchemaError::UnexpectedEnumTable { value_type: TypeTag::Int, .. })
        ));
    }

    #[test]
    fn test_validate_callbacks() {
        let parse = |_: &str| -> Result<Opaque, CallbackFailure> { Ok(Opaque::new(0_u8)) };
        let with_codec = |codec: OpaqueCodec| {
            registry_with(vec![OptionSpec::new(
                "p",
                "point",
                TypeSpec::Other(codec),
                Arity::exactly(1),
                Slot::new(),
            )])
        };

        assert!(with_codec(OpaqueCodec::pointer("point").with_parse(parse).with_destroy(|_| {}))
            .validate()
            .is_ok());
        assert!(with_codec(OpaqueCodec::inline("point", 8).with_parse(parse))
            .validate()
            .is_ok());
        assert!(matches!(
            with_codec(OpaqueCodec::inline("point", 0).with_parse(parse)).validate(),
            Err(SchemaError::ZeroElementSize { .. })
        ));
        assert!(matches!(
            with_codec(OpaqueCodec::pointer("point")).validate(),
            Err(SchemaError::MissingParseCallback { .. })
        ));
        assert!(matches!(
            with_codec(OpaqueCodec::inline("point", 8).with_parse(parse).with_destroy(|_| {})).validate(),
            Err(SchemaError::DestroyWithoutPointer { size: 8, .. })
        ));

        let mut registry = with_codec(OpaqueCodec::pointer("point").with_parse(parse));
        registry.get_mut(0).unwrap().codec = None;
        assert!(matches!(registry.validate(), Err(SchemaError::MissingCallbacks { .. })));

        let mut registry = registry_with(vec![int_opt("n")]);
        registry.get_mut(0).unwrap().codec = Some(OpaqueCodec::pointer("x").with_parse(parse));
        assert!(matches!(registry.validate(), Err(SchemaError::UnexpectedCallbacks { .. })));
    }

    #[test]
    fn test_validate_rejects_bad_flags() {
        for flag in ["-n", "a b", "x@y", "x#", "a,b,c", ",long", "s,", "n\t", "q\"", "x,-y"] {
            let registry = registry_with(vec![int_opt(flag)]);
            assert!(
                matches!(registry.validate(), Err(SchemaError::InvalidFlag { .. })),
                "flag {flag:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_validate_rejects_empty_flag() {
        let registry = registry_with(vec![int_opt("")]);
        assert!(matches!(registry.validate(), Err(SchemaError::EmptyFlag { index: 0, .. })));
    }

    #[test]
    fn test_validate_rejects_reserved_forms() {
        let registry = registry_with(vec![OptionSpec::flag("h,help", Slot::new())]);
        assert!(matches!(registry.validate(), Err(SchemaError::InvalidFlag { .. })));

        let registry = registry_with(vec![OptionSpec::flag("{", Slot::new())]);
        assert!(matches!(registry.validate(), Err(SchemaError::InvalidFlag { .. })));
    }

    #[test]
    fn test_validate_rejects_duplicate_forms() {
        let registry = registry_with(vec![
            OptionSpec::flag("v,verbose", Slot::new()),
            OptionSpec::flag("v", Slot::new()),
        ]);
        assert_eq!(registry.validate(), Err(SchemaError::DuplicateFlag("-v".into())));
    }

    #[test]
    fn test_validate_rejects_unflagged_flag() {
        let registry = registry_with(vec![OptionSpec::positional(
            "switch",
            TypeSpec::Bool,
            Arity::flag(),
            Slot::new(),
        )]);
        assert_eq!(
            registry.validate(),
            Err(SchemaError::UnflaggedFlag { option: "<switch>".into() })
        );
    }

    #[test]
    fn test_validate_rejects_non_bool_flag() {
        let registry = registry_with(vec![OptionSpec::new("q", "quiet", TypeSpec::Int, Arity::flag(), Slot::new())]);
        assert_eq!(
            registry.validate(),
            Err(SchemaError::FlagNotBool {
                option: "-q".into(),
                value_type: TypeTag::Int,
            })
        );
        assert_eq!(
            registry.validate().unwrap_err().to_string(),
            "-q takes no parameters and so must be of type bool, not int"
        );
    }

    #[test]
    fn test_validate_requires_positional_name() {
        let registry = registry_with(vec![OptionSpec::positional(" ", TypeSpec::Int, Arity::exactly(1), Slot::new())]);
        assert_eq!(registry.validate(), Err(SchemaError::MissingName { index: 0 }));
    }

    #[test]
    fn test_validate_requires_optional_single_default() {
        let missing = registry_with(vec![OptionSpec::new(
            "o",
            "o",
            TypeSpec::Bool,
            Arity::optional(),
            Slot::new(),
        )]);
        assert_eq!(missing.validate(), Err(SchemaError::MissingDefault { option: "-o".into() }));

        let empty = registry_with(vec![
            OptionSpec::new("o", "o", TypeSpec::Bool, Arity::optional(), Slot::new()).with_default(" \t"),
        ]);
        assert!(matches!(empty.validate(), Err(SchemaError::MissingDefault { .. })));
    }

    #[test]
    fn test_validate_allows_one_positional_variadic() {
        let registry = registry_with(vec![
            OptionSpec::positional("a", TypeSpec::String, Arity::at_least(1), Slot::new()),
            OptionSpec::new("f", "f", TypeSpec::String, Arity::at_least(0), Slot::new()),
            OptionSpec::positional("b", TypeSpec::String, Arity::between(0, 3), Slot::new()),
        ]);
        assert_eq!(
            registry.validate(),
            Err(SchemaError::MultipleUnflaggedVariadic {
                first: "<a>".into(),
                second: "<b>".into(),
            })
        );
    }

    #[test]
    fn test_validate_counts_positional_optional_as_variable() {
        let registry = registry_with(vec![
            OptionSpec::positional("level", TypeSpec::Int, Arity::optional(), Slot::new()).with_default("1"),
            OptionSpec::positional("rest", TypeSpec::String, Arity::at_least(0), Slot::new()),
        ]);
        assert!(matches!(
            registry.validate(),
            Err(SchemaError::MultipleUnflaggedVariadic { .. })
        ));
    }

    #[test]
    fn test_validate_reports_first_violation() {
        let mut registry = registry_with(vec![int_opt("-bad"), int_opt("n")]);
        registry.get_mut(1).unwrap().storage = None;
        assert!(matches!(registry.validate(), Err(SchemaError::InvalidFlag { .. })));
    }

    #[test]
    fn test_invalid_arity_caught_by_validate() {
        let mut registry = registry_with(vec![int_opt("n")]);
        registry.get_mut(0).unwrap().arity = Arity::between(3, 2);
        assert!(matches!(registry.validate(), Err(SchemaError::InvalidArity { .. })));
    }
}
