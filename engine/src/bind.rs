//! Value binding and symmetric release.
//!
//! The binder splits each resolved parameter string back into tokens,
//! converts them by type tag, writes the result into the option's slot and
//! records what it allocated in [`AllocShape`]. [`release`] later frees
//! exactly that.

use argbind_core::{
    AllocShape, Bound, DestroyFn, Kind, OptionDescriptor, Registry, SchemaError, Slot, SlotBorrowed, TypeTag,
    Value,
};
use tracing::{debug, trace, warn};

use crate::convert::{convert_scalar, invert};
use crate::defaults::Resolved;
use crate::error::{ConversionError, ParseError, UsageError};
use crate::teardown::Teardown;
use crate::tokens::split_quoted;

/// Binds every option in registry order.
///
/// Each allocating bind registers an error-only release on `teardown`, so a
/// later failure leaves no slot holding a half-finished parse.
///
/// # Errors
///
/// Returns [`ConversionError`] for the first parameter that does not convert,
/// and [`UsageError::SlotBorrowed`] when the caller holds a borrow of a
/// destination.
pub fn bind_all(registry: &mut Registry, resolved: &[Resolved], teardown: &mut Teardown) -> Result<(), ParseError> {
    for (opt, res) in registry.iter_mut().zip(resolved) {
        bind_one(opt, res)?;
        if opt.output.alloc != AllocShape::None {
            if let Some(slot) = opt.storage.clone() {
                let alloc = opt.output.alloc;
                let destroy = destroyer(opt);
                let option = opt.ident();
                teardown.on_error("bound value", move || {
                    if release_slot(&slot, alloc, destroy).is_err() {
                        warn!(%option, "destination borrowed; bound value not released");
                    }
                });
            }
        }
    }
    Ok(())
}

fn bind_one(opt: &mut OptionDescriptor, res: &Resolved) -> Result<(), ParseError> {
    let slot = opt
        .storage
        .clone()
        .ok_or_else(|| SchemaError::MissingStorage { option: opt.ident() })?;

    opt.output.source = res.source;
    opt.output.parm_str = res.parm.clone();
    opt.output.count = 0;
    opt.output.alloc = AllocShape::None;

    if res.kind == Kind::Flag {
        store(&slot, Bound::One(Value::Bool(res.appeared)), opt)?;
        trace!(option = %opt.ident(), value = res.appeared, "bound flag");
        return Ok(());
    }

    let Some(parm) = res.parm.as_deref() else {
        // Variadic with nothing captured and nothing defaulted.
        store(&slot, Bound::Null, opt)?;
        trace!(option = %opt.ident(), "bound empty");
        return Ok(());
    };

    let words = split_quoted(parm);
    if words.len() != res.count {
        return Err(token_error(opt, res, parm).into());
    }
    let mut values = Vec::with_capacity(words.len());
    for word in &words {
        match convert(opt, res, word) {
            Ok(value) => values.push(value),
            Err(err) => {
                destroy_all(values, destroyer(opt));
                return Err(err.into());
            }
        }
    }

    let owns_heap = match opt.value_type {
        TypeTag::String => true,
        TypeTag::Other => destroyer(opt).is_some(),
        _ => false,
    };

    match res.kind {
        Kind::Flag => {}
        Kind::Single => {
            let Some(value) = values.pop() else {
                return Err(token_error(opt, res, parm).into());
            };
            store(&slot, Bound::One(value), opt)?;
            if owns_heap {
                opt.output.alloc = AllocShape::Single;
            }
            opt.output.count = 1;
        }
        Kind::Fixed => {
            opt.output.count = values.len();
            store(&slot, Bound::Many(values), opt)?;
            if owns_heap {
                opt.output.alloc = AllocShape::FixedArray;
            }
        }
        Kind::OptionalSingle => {
            let Some(value) = values.pop() else {
                return Err(token_error(opt, res, parm).into());
            };
            opt.output.count = 1;
            let value = if res.inverts(opt) {
                match value {
                    Value::Str(_) => {
                        debug!(option = %opt.ident(), "flag given without parameter; nulling default");
                        Value::Str(None)
                    }
                    Value::Enum(_) | Value::Other(_) => value,
                    scalar => {
                        debug!(option = %opt.ident(), "flag given without parameter; inverting default");
                        invert(scalar)
                    }
                }
            } else {
                value
            };
            let nulled = matches!(value, Value::Str(None));
            store(&slot, Bound::One(value), opt)?;
            if owns_heap && !nulled {
                opt.output.alloc = AllocShape::Single;
            }
        }
        Kind::Variadic => {
            opt.output.count = values.len();
            if values.is_empty() {
                store(&slot, Bound::Null, opt)?;
            } else {
                if opt.value_type == TypeTag::String {
                    values.push(Value::Str(None));
                }
                store(&slot, Bound::Many(values), opt)?;
                opt.output.alloc = AllocShape::DynamicArray;
            }
        }
    }

    trace!(option = %opt.ident(), alloc = ?opt.output.alloc, count = opt.output.count, "bound");
    Ok(())
}

/// Writes `bound` into `slot`; a refused write destroys what it carried.
fn store(slot: &Slot, bound: Bound, opt: &OptionDescriptor) -> Result<(), ParseError> {
    slot.set(bound).map_err(|SlotBorrowed { rejected }| {
        destroy_all(bound_values(rejected), destroyer(opt));
        ParseError::from(UsageError::SlotBorrowed { option: opt.ident() })
    })
}

fn bound_values(bound: Bound) -> Vec<Value> {
    match bound {
        Bound::One(value) => vec![value],
        Bound::Many(values) => values,
        Bound::Unset | Bound::Null => Vec::new(),
    }
}

fn type_name(opt: &OptionDescriptor) -> String {
    match opt.value_type {
        TypeTag::Enum => opt
            .enum_table
            .as_ref()
            .map_or_else(|| "enum".to_string(), |t| t.name.clone()),
        TypeTag::Other => opt
            .codec
            .as_ref()
            .map_or_else(|| "other".to_string(), |c| c.type_name.clone()),
        tag => tag.name().to_string(),
    }
}

fn token_error(opt: &OptionDescriptor, res: &Resolved, parm: &str) -> ConversionError {
    let (option, parm, type_name) = (opt.ident(), parm.to_string(), type_name(opt));
    if res.defaulted {
        ConversionError::DefaultToken {
            option,
            parm,
            type_name,
        }
    } else {
        ConversionError::Token {
            option,
            parm,
            type_name,
        }
    }
}

fn convert(opt: &OptionDescriptor, res: &Resolved, word: &str) -> Result<Value, ConversionError> {
    match opt.value_type {
        TypeTag::String => Ok(Value::Str(Some(word.to_string()))),
        TypeTag::Enum => {
            let table = opt.enum_table.as_ref().ok_or_else(|| token_error(opt, res, word))?;
            table.lookup(word).map(Value::Enum).ok_or_else(|| ConversionError::UnknownName {
                option: opt.ident(),
                token: word.to_string(),
                enum_name: table.name.clone(),
            })
        }
        TypeTag::Other => {
            let parse = opt
                .codec
                .as_ref()
                .and_then(|c| c.parse.clone())
                .ok_or_else(|| token_error(opt, res, word))?;
            parse(word).map(Value::Other).map_err(|failure| ConversionError::Callback {
                option: opt.ident(),
                parm: word.to_string(),
                type_name: type_name(opt),
                message: if failure.message.is_empty() {
                    format!("returned {}", failure.code)
                } else {
                    failure.message
                },
            })
        }
        tag => convert_scalar(tag, word).ok_or_else(|| token_error(opt, res, word)),
    }
}

fn destroyer(opt: &OptionDescriptor) -> Option<DestroyFn> {
    match opt.value_type {
        TypeTag::Other => opt.codec.as_ref().and_then(|c| c.destroy.clone()),
        _ => None,
    }
}

/// Frees what a bind of shape `alloc` put into `slot`, running `destroy` on
/// each opaque value, and leaves the slot null.
///
/// # Errors
///
/// Returns [`SlotBorrowed`] while the caller holds a borrow of `slot`; the
/// value stays bound and nothing is destroyed.
pub fn release_slot(slot: &Slot, alloc: AllocShape, destroy: Option<DestroyFn>) -> Result<(), SlotBorrowed> {
    if alloc == AllocShape::None {
        return Ok(());
    }
    destroy_all(bound_values(slot.take()?), destroy);
    Ok(())
}

fn destroy_all(values: Vec<Value>, destroy: Option<DestroyFn>) {
    let Some(destroy) = destroy else {
        return;
    };
    for value in values {
        if let Value::Other(opaque) = value {
            destroy(opaque);
        }
    }
}

/// Releases everything the last successful parse allocated.
///
/// Safe to call more than once; options with nothing allocated are skipped.
/// Scalar values stay in their slots.
///
/// # Errors
///
/// Returns [`UsageError::SlotBorrowed`] for the first destination the caller
/// is still borrowing. That option keeps its allocation record, so a later
/// call can finish the job.
pub fn release(registry: &mut Registry) -> Result<(), UsageError> {
    for opt in registry.iter_mut() {
        if opt.output.alloc == AllocShape::None {
            continue;
        }
        if let Some(slot) = &opt.storage {
            debug!(option = %opt.ident(), alloc = ?opt.output.alloc, "releasing");
            release_slot(slot, opt.output.alloc, destroyer(opt))
                .map_err(|_| UsageError::SlotBorrowed { option: opt.ident() })?;
        }
        opt.output.alloc = AllocShape::None;
        opt.output.parm_str = None;
    }
    Ok(())
}
