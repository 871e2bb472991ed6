//! Attributing tokens to options.
//!
//! Extraction runs in two passes over the drained [`TokenVector`], removing
//! every token it attributes:
//!
//! 1. [`extract_flagged`] scans left to right for flags. Each flag greedily
//!    takes the tokens after it, up to its maximum, stopping early at the end
//!    of input, at another option's flag, or at `--` (which is dropped).
//! 2. [`extract_unflagged`] hands what is left to positional options. Fixed
//!    positionals before the pivot (the one variable-arity positional) take
//!    from the front, those after it take from the back, and the pivot takes
//!    the middle.
//!
//! Anything still in the vector afterwards is rejected by
//! [`reject_leftovers`].

use argbind_core::{Kind, Registry, VARIADIC_STOP};
use tracing::{debug, trace};

use crate::error::{ArityError, ParseError, UsageError};
use crate::tokens::{Provenance, Token, TokenVector};

/// Tokens attributed to one option.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capture {
    /// The option's flag was seen.
    pub appeared: bool,
    /// Provenance of the flag token itself.
    pub flag_provenance: Option<Provenance>,
    pub tokens: Vec<Token>,
}

impl Capture {
    pub fn texts(&self) -> Vec<&str> {
        self.tokens.iter().map(Token::text).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    Full,
    EndOfInput,
    Flag(usize),
    Marker,
}

/// Pass A: captures the parameters of every flagged option.
///
/// A flag seen again replaces its earlier capture; the last occurrence wins.
///
/// # Errors
///
/// Returns [`ArityError`] when a flag is followed by fewer than `min`
/// parameters, and [`UsageError::MissingRequired`] for a flagged option that
/// takes parameters, has no default, and never appeared.
pub fn extract_flagged(
    registry: &Registry,
    tokens: &mut TokenVector,
    captures: &mut [Capture],
) -> Result<(), ParseError> {
    let options = registry.options();
    let mut index = 0;

    while index < tokens.len() {
        let Some(opt_index) = tokens.get(index).and_then(|t| registry.find_flag(t.text())) else {
            index += 1;
            continue;
        };
        let opt = &options[opt_index];
        let max = opt.arity.max.unwrap_or(usize::MAX);

        let mut count = 0;
        let mut stop = Stop::Full;
        while count < max {
            match tokens.get(index + 1 + count) {
                None => {
                    stop = Stop::EndOfInput;
                    break;
                }
                Some(token) if token.is(VARIADIC_STOP) => {
                    stop = Stop::Marker;
                    break;
                }
                Some(token) => match registry.find_flag(token.text()) {
                    Some(other) => {
                        stop = Stop::Flag(other);
                        break;
                    }
                    None => count += 1,
                },
            }
        }

        if count < opt.arity.min {
            let option = opt.ident();
            let needed = opt.arity.min;
            return Err(match stop {
                Stop::Flag(other) => ArityError::SawFlag {
                    option,
                    flag: options[other].ident(),
                    needed,
                    got: count,
                },
                Stop::Marker => ArityError::SawStopMarker {
                    option,
                    needed,
                    got: count,
                },
                Stop::Full | Stop::EndOfInput => ArityError::EndOfInput {
                    option,
                    needed,
                    got: count,
                },
            }
            .into());
        }

        let flag_token = tokens.remove_range(index, 1);
        let params = tokens.remove_range(index, count);
        if stop == Stop::Marker {
            tokens.remove_range(index, 1);
        }

        let capture = &mut captures[opt_index];
        if capture.appeared {
            debug!(
                option = %opt.ident(),
                discarded = ?capture.texts(),
                "flag repeated; later occurrence replaces earlier one"
            );
        }
        *capture = Capture {
            appeared: true,
            flag_provenance: flag_token.first().map(Token::provenance),
            tokens: params,
        };
        trace!(option = %opt.ident(), params = ?capture.texts(), "captured flagged option");
    }

    for (opt, capture) in options.iter().zip(captures.iter()) {
        if opt.is_flagged() && opt.kind()? != Kind::Flag && opt.default.is_none() && !capture.appeared {
            return Err(UsageError::MissingRequired { option: opt.ident() }.into());
        }
    }

    Ok(())
}

/// Pass B: distributes the remaining tokens over positional options.
///
/// # Errors
///
/// Returns [`ArityError`] when there are too few tokens for a fixed
/// positional, or when the pivot gets some tokens but fewer than its `min`.
pub fn extract_unflagged(
    registry: &Registry,
    tokens: &mut TokenVector,
    captures: &mut [Capture],
) -> Result<(), ParseError> {
    let options = registry.options();
    let unflagged: Vec<usize> = options
        .iter()
        .enumerate()
        .filter(|(_, opt)| !opt.is_flagged())
        .map(|(i, _)| i)
        .collect();
    if unflagged.is_empty() {
        return Ok(());
    }

    let pivot = unflagged.iter().position(|&i| options[i].arity.is_variable());
    let (before, after) = match pivot {
        Some(p) => (&unflagged[..p], &unflagged[p + 1..]),
        None => (&unflagged[..], &[][..]),
    };

    for &i in before {
        let needed = options[i].arity.min;
        if tokens.len() < needed {
            return Err(ArityError::MissingPositional {
                option: options[i].ident(),
                needed,
                remaining: tokens.len(),
            }
            .into());
        }
        captures[i].tokens = tokens.remove_range(0, needed);
        trace!(option = %options[i].ident(), params = ?captures[i].texts(), "captured positional");
    }

    let reserved: usize = after.iter().map(|&i| options[i].arity.min).sum();
    let Some(middle) = tokens.len().checked_sub(reserved) else {
        let first = &options[after[0]];
        return Err(ArityError::MissingPositional {
            option: first.ident(),
            needed: first.arity.min,
            remaining: tokens.len(),
        }
        .into());
    };

    for &i in after {
        captures[i].tokens = tokens.remove_range(middle, options[i].arity.min);
        trace!(option = %options[i].ident(), params = ?captures[i].texts(), "captured positional");
    }

    if let Some(p) = pivot {
        let i = unflagged[p];
        let opt = &options[i];
        let take = middle.min(opt.arity.max.unwrap_or(usize::MAX));
        if take > 0 {
            if take < opt.arity.min {
                return Err(ArityError::TooFewVariadic {
                    option: opt.ident(),
                    min: opt.arity.min,
                    got: take,
                }
                .into());
            }
            let got = tokens
                .iter()
                .take(take)
                .position(|t| t.is(VARIADIC_STOP))
                .unwrap_or(take);
            captures[i].tokens = tokens.remove_range(0, got);
        }
        debug!(
            option = %opt.ident(),
            count = captures[i].tokens.len(),
            "pivot took the middle tokens"
        );
    }

    Ok(())
}

/// Fails on the first token no option claimed.
///
/// # Errors
///
/// Returns [`UsageError::UnexpectedStopMarker`] for a stray `--`,
/// [`UsageError::UnrecognizedFlag`] for a token starting with `-`, and
/// [`UsageError::UnexpectedArgument`] otherwise.
pub fn reject_leftovers(tokens: &TokenVector) -> Result<(), UsageError> {
    let Some(token) = tokens.first() else {
        return Ok(());
    };
    let text = token.text().to_string();
    Err(if token.is(VARIADIC_STOP) {
        UsageError::UnexpectedStopMarker
    } else if text.starts_with('-') {
        UsageError::UnrecognizedFlag { token: text }
    } else {
        UsageError::UnexpectedArgument { token: text }
    })
}
