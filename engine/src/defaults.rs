//! Default resolution.
//!
//! Decides, per option, whether its default string stands in for live input
//! and produces the parameter string the binder will convert.
//!
//! | kind | defaulted when |
//! |---|---|
//! | flag | the flag is absent |
//! | single, fixed | flagged and the flag is absent |
//! | optional single | nothing was captured |
//! | variadic | flagged: the flag is absent; positional: nothing was captured and `min >= 1` |
//!
//! A substituted default is tokenized and checked against the option's arity
//! just like live input.

use argbind_core::{Kind, OptionDescriptor, Registry, ValueSource};
use tracing::debug;

use crate::error::{ConversionError, ParseError, UsageError};
use crate::extract::Capture;
use crate::tokens::{Provenance, Token, join_quoted, one_line, split_quoted};

/// What the binder needs to know about one option after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub kind: Kind,
    pub defaulted: bool,
    /// The option's flag was seen.
    pub appeared: bool,
    /// Live parameters captured, before any default substitution.
    pub captured: usize,
    /// Parameter string to convert; `None` when there is nothing to bind.
    pub parm: Option<String>,
    /// Number of parameters in `parm`.
    pub count: usize,
    pub source: ValueSource,
}

impl Resolved {
    /// Kind-4 inversion: the flag appeared with nothing after it.
    pub fn inverts(&self, opt: &OptionDescriptor) -> bool {
        self.kind == Kind::OptionalSingle && opt.is_flagged() && self.appeared && self.captured == 0
    }
}

/// Whether the default stands in for `capture`.
pub fn is_defaulted(opt: &OptionDescriptor, kind: Kind, capture: &Capture) -> bool {
    match kind {
        Kind::Flag => !capture.appeared,
        Kind::Single | Kind::Fixed => opt.is_flagged() && !capture.appeared,
        Kind::OptionalSingle => capture.tokens.is_empty(),
        Kind::Variadic if opt.is_flagged() => !capture.appeared,
        Kind::Variadic => capture.tokens.is_empty() && opt.arity.min >= 1,
    }
}

/// Resolves every option in registry order.
///
/// # Errors
///
/// Returns [`ConversionError::DefaultCount`] when a substituted default has
/// the wrong number of parameters, and [`UsageError::MissingRequired`] for a
/// positional variadic with `min >= 1` that got no tokens and has no default.
pub fn resolve_defaults(registry: &Registry, captures: &[Capture]) -> Result<Vec<Resolved>, ParseError> {
    registry
        .options()
        .iter()
        .zip(captures)
        .map(|(opt, capture)| resolve_one(opt, capture))
        .collect()
}

fn resolve_one(opt: &OptionDescriptor, capture: &Capture) -> Result<Resolved, ParseError> {
    let kind = opt.kind()?;
    let defaulted = is_defaulted(opt, kind, capture);
    let captured = capture.tokens.len();

    if !defaulted {
        let provenance = capture
            .tokens
            .first()
            .map(Token::provenance)
            .or(capture.flag_provenance)
            .unwrap_or(Provenance::CommandLine);
        return Ok(Resolved {
            kind,
            defaulted,
            appeared: capture.appeared,
            captured,
            parm: (captured > 0).then(|| join_quoted(capture.texts())),
            count: captured,
            source: provenance.into(),
        });
    }

    let mut resolved = Resolved {
        kind,
        defaulted,
        appeared: capture.appeared,
        captured,
        parm: None,
        count: 0,
        source: ValueSource::Default,
    };
    if kind == Kind::Flag {
        return Ok(resolved);
    }

    let Some(default) = opt.default.as_deref() else {
        if kind == Kind::Variadic && !opt.is_flagged() {
            return Err(UsageError::MissingRequired { option: opt.ident() }.into());
        }
        return Ok(resolved);
    };

    let parm = one_line(default);
    let count = split_quoted(&parm).len();
    let fits = if opt.arity.is_variable() {
        opt.arity.admits(count)
    } else {
        count == opt.arity.min
    };
    if !fits {
        return Err(ConversionError::DefaultCount {
            option: opt.ident(),
            got: count,
            expected: describe_arity(opt),
        }
        .into());
    }

    debug!(option = %opt.ident(), default = %parm, count, "using default");
    resolved.parm = Some(parm);
    resolved.count = count;
    Ok(resolved)
}

fn describe_arity(opt: &OptionDescriptor) -> String {
    match opt.arity.max {
        Some(max) if max == opt.arity.min => format!("exactly {max}"),
        Some(max) => format!("between {} and {max}", opt.arity.min),
        None => format!("at least {}", opt.arity.min),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argbind_core::{Arity, OptionSpec, Slot, TypeSpec};

    fn one(spec: OptionSpec, capture: Capture) -> Result<Resolved, ParseError> {
        let mut registry = Registry::new();
        registry.register(spec).unwrap();
        resolve_defaults(&registry, &[capture]).map(|mut all| all.remove(0))
    }

    fn seen(texts: &[&str]) -> Capture {
        Capture {
            appeared: true,
            flag_provenance: Some(Provenance::CommandLine),
            tokens: texts.iter().map(|t| Token::new(*t, Provenance::CommandLine)).collect(),
        }
    }

    #[test]
    fn test_default_round_trip() {
        let spec = OptionSpec::new("s", "size", TypeSpec::Int, Arity::exactly(3), Slot::new())
            .with_default("  1   2\n3 ");
        let resolved = one(spec, Capture::default()).unwrap();
        assert!(resolved.defaulted);
        assert_eq!(resolved.parm.as_deref(), Some("1 2 3"));
        assert_eq!(resolved.count, 3);
        assert_eq!(resolved.source, ValueSource::Default);
    }

    #[test]
    fn test_default_arity_checked_like_input() {
        let spec = OptionSpec::new("s", "size", TypeSpec::Int, Arity::exactly(3), Slot::new()).with_default("1 2");
        let err = one(spec, Capture::default()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "# parameters (in default) for -s is 2, but need exactly 3"
        );

        let spec = OptionSpec::new("l", "list", TypeSpec::Int, Arity::between(1, 2), Slot::new())
            .with_default("1 2 3");
        assert!(matches!(
            one(spec, Capture::default()),
            Err(ParseError::Conversion(ConversionError::DefaultCount { got: 3, .. }))
        ));
    }

    #[test]
    fn test_explicit_input_not_defaulted() {
        let spec = OptionSpec::new("n", "n", TypeSpec::Int, Arity::exactly(1), Slot::new()).with_default("10");
        let resolved = one(spec, seen(&["7"])).unwrap();
        assert!(!resolved.defaulted);
        assert_eq!(resolved.parm.as_deref(), Some("7"));
        assert_eq!(resolved.source, ValueSource::CommandLine);
    }

    #[test]
    fn test_flag_presence() {
        let absent = one(OptionSpec::flag("v", Slot::new()), Capture::default()).unwrap();
        assert!(absent.defaulted);
        assert!(absent.parm.is_none());

        let present = one(OptionSpec::flag("v", Slot::new()), seen(&[])).unwrap();
        assert!(!present.defaulted);
        assert_eq!(present.source, ValueSource::CommandLine);
    }

    #[test]
    fn test_optional_single_inverts_only_when_flag_bare() {
        let spec = || OptionSpec::new("b", "b", TypeSpec::Bool, Arity::optional(), Slot::new()).with_default("false");
        let mut registry = Registry::new();
        registry.register(spec()).unwrap();
        let opt = &registry.options()[0];

        let bare = one(spec(), seen(&[])).unwrap();
        assert!(bare.defaulted);
        assert!(bare.inverts(opt));

        let absent = one(spec(), Capture::default()).unwrap();
        assert!(absent.defaulted);
        assert!(!absent.inverts(opt));

        let given = one(spec(), seen(&["true"])).unwrap();
        assert!(!given.defaulted);
        assert!(!given.inverts(opt));
    }

    #[test]
    fn test_positional_variadic_policy() {
        let optional = OptionSpec::positional("rest", TypeSpec::String, Arity::at_least(0), Slot::new())
            .with_default("x");
        let resolved = one(optional, Capture::default()).unwrap();
        assert!(!resolved.defaulted);
        assert_eq!(resolved.count, 0);

        let required = OptionSpec::positional("files", TypeSpec::String, Arity::at_least(1), Slot::new())
            .with_default("a.txt b.txt");
        let resolved = one(required, Capture::default()).unwrap();
        assert!(resolved.defaulted);
        assert_eq!(resolved.count, 2);

        let missing = OptionSpec::positional("files", TypeSpec::String, Arity::at_least(1), Slot::new());
        assert!(matches!(
            one(missing, Capture::default()),
            Err(ParseError::Usage(UsageError::MissingRequired { ref option })) if option == "<files>"
        ));
    }

    #[test]
    fn test_quoted_default_counts_as_one() {
        let spec = OptionSpec::new("t", "title", TypeSpec::String, Arity::exactly(1), Slot::new())
            .with_default("\"two words\"");
        let resolved = one(spec, Capture::default()).unwrap();
        assert_eq!(resolved.count, 1);
    }

    #[test]
    fn test_response_file_provenance_carried() {
        let spec = OptionSpec::new("n", "n", TypeSpec::Int, Arity::exactly(1), Slot::new());
        let capture = Capture {
            appeared: true,
            flag_provenance: Some(Provenance::ResponseFile),
            tokens: vec![Token::new("3", Provenance::ResponseFile)],
        };
        assert_eq!(one(spec, capture).unwrap().source, ValueSource::ResponseFile);
    }
}
