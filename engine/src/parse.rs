//! The parse driver.

use argbind_core::{ParseConfig, Registry};
use tracing::debug;

use crate::bind::{bind_all, release};
use crate::defaults::resolve_defaults;
use crate::error::Result;
use crate::extract::{Capture, extract_flagged, extract_unflagged, reject_leftovers};
use crate::source::{Drained, drain};
use crate::teardown::{Exit, Teardown};

/// How a successful parse ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every option was bound.
    Parsed,
    /// The help token was seen; nothing was bound.
    HelpRequested,
}

/// Parses `args` against `registry`, binding every option's slot.
///
/// The registry is validated first. Values a previous call allocated are
/// released before any token is read, so one registry can be parsed
/// repeatedly. On failure every slot this call allocated is released again
/// and the output fields are cleared.
///
/// # Errors
///
/// Returns the first [`ParseError`](crate::ParseError) any stage meets:
/// schema, token source, arity, conversion or usage.
///
/// # Examples
///
/// ```
/// use argbind_core::{Arity, OptionSpec, ParseConfig, Registry, Slot, TypeSpec, ValueSource};
/// use argbind_engine::{Outcome, parse};
///
/// let size = Slot::new();
/// let mut registry = Registry::new();
/// registry
///     .register(OptionSpec::new("s,size", "size", TypeSpec::Int, Arity::exactly(2), size.clone()).with_default("4 4"))
///     .unwrap();
///
/// let outcome = parse(&mut registry, &["--size", "3", "5"], &ParseConfig::default()).unwrap();
/// assert_eq!(outcome, Outcome::Parsed);
/// assert_eq!(size.get_vec::<i32>().unwrap(), vec![3, 5]);
/// assert_eq!(registry.options()[0].output.source, ValueSource::CommandLine);
/// ```
pub fn parse<S: AsRef<str>>(registry: &mut Registry, args: &[S], config: &ParseConfig) -> Result<Outcome> {
    registry.validate()?;
    release(registry)?;
    registry.reset_outputs();

    let mut teardown = Teardown::new();
    let result = run(registry, args, config, &mut teardown);
    match result {
        Ok(outcome) => {
            teardown.finish(Exit::Success);
            debug!(?outcome, options = registry.len(), "parse finished");
            Ok(outcome)
        }
        Err(err) => {
            debug!(error = %err, "parse failed");
            teardown.finish(Exit::Error);
            registry.reset_outputs();
            Err(err)
        }
    }
}

fn run<S: AsRef<str>>(
    registry: &mut Registry,
    args: &[S],
    config: &ParseConfig,
    teardown: &mut Teardown,
) -> Result<Outcome> {
    let mut tokens = match drain(args, config)? {
        Drained::Tokens(tokens) => tokens,
        Drained::Help => {
            debug!("help requested");
            return Ok(Outcome::HelpRequested);
        }
    };
    debug!(tokens = %tokens.display_quoted(), "drained");

    let mut captures = vec![Capture::default(); registry.len()];
    extract_flagged(registry, &mut tokens, &mut captures)?;
    extract_unflagged(registry, &mut tokens, &mut captures)?;
    reject_leftovers(&tokens)?;

    let resolved = resolve_defaults(registry, &captures)?;
    bind_all(registry, &resolved, teardown)?;
    Ok(Outcome::Parsed)
}
