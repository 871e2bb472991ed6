//! Bound values and the caller-owned storage they land in.
//!
//! A [`Slot`] is a shared handle: the caller keeps one clone to read the
//! result, the option descriptor keeps another for the binder to write
//! through. Nothing is copied out of the registry after a parse.

use std::any::Any;
use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::Rc;

use thiserror::Error;

/// A value of a callback-defined type.
pub struct Opaque(Box<dyn Any>);

impl Opaque {
    pub fn new<T: Any>(value: T) -> Self {
        Self(Box::new(value))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }

    pub fn downcast<T: Any>(self) -> Result<T, Self> {
        self.0.downcast::<T>().map(|b| *b).map_err(Self)
    }
}

impl fmt::Debug for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Opaque(..)")
    }
}

/// One typed value.
#[derive(Debug)]
pub enum Value {
    Bool(bool),
    Short(i16),
    UShort(u16),
    Int(i32),
    UInt(u32),
    Long(i64),
    ULong(u64),
    Size(usize),
    Float(f32),
    Double(f64),
    Char(char),
    /// `None` is a nulled string, also used as the terminator of variadic
    /// string arrays.
    Str(Option<String>),
    Enum(i32),
    Other(Opaque),
}

/// Contents of a [`Slot`].
#[derive(Debug, Default)]
pub enum Bound {
    /// Never written.
    #[default]
    Unset,
    /// Written with "no value": a nulled string or an empty variadic.
    Null,
    One(Value),
    Many(Vec<Value>),
}

/// Conversion from a bound [`Value`] into a plain Rust type.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Option<Self>;
}

macro_rules! from_value {
    ($ty:ty, $($variant:ident),+) => {
        impl FromValue for $ty {
            fn from_value(value: &Value) -> Option<Self> {
                match value {
                    $(Value::$variant(v) => Some(*v),)+
                    _ => None,
                }
            }
        }
    };
}

from_value!(bool, Bool);
from_value!(i16, Short);
from_value!(u16, UShort);
from_value!(i32, Int, Enum);
from_value!(u32, UInt);
from_value!(i64, Long);
from_value!(u64, ULong);
from_value!(usize, Size);
from_value!(f32, Float);
from_value!(f64, Double);
from_value!(char, Char);

impl FromValue for String {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Str(Some(s)) => Some(s.clone()),
            _ => None,
        }
    }
}

/// Caller-supplied destination storage for one option.
///
/// # Examples
///
/// ```
/// use argbind_core::{Bound, Slot, Value};
///
/// let slot = Slot::new();
/// assert!(slot.is_unset());
///
/// let writer = slot.clone();
/// writer.set(Bound::One(Value::Int(7))).unwrap();
/// assert_eq!(slot.get::<i32>(), Some(7));
/// ```
#[derive(Clone, Default)]
pub struct Slot(Rc<RefCell<Bound>>);

/// A [`Slot`] could not be written because a borrow of it is still alive.
#[derive(Debug, Error)]
#[error("destination slot is borrowed elsewhere")]
pub struct SlotBorrowed {
    /// What the write would have stored; [`Bound::Unset`] for a take.
    pub rejected: Bound,
}

impl Slot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `bound`, dropping the previous contents.
    ///
    /// # Errors
    ///
    /// Returns [`SlotBorrowed`], carrying `bound` back, while a
    /// [`borrow`](Self::borrow) of this slot is held.
    pub fn set(&self, bound: Bound) -> Result<(), SlotBorrowed> {
        match self.0.try_borrow_mut() {
            Ok(mut cell) => {
                *cell = bound;
                Ok(())
            }
            Err(_) => Err(SlotBorrowed { rejected: bound }),
        }
    }

    /// Replaces the contents with [`Bound::Null`] and returns what was there.
    ///
    /// # Errors
    ///
    /// Returns [`SlotBorrowed`] while a borrow of this slot is held; the
    /// contents stay in place.
    pub fn take(&self) -> Result<Bound, SlotBorrowed> {
        let mut cell = self.0.try_borrow_mut().map_err(|_| SlotBorrowed {
            rejected: Bound::Unset,
        })?;
        Ok(std::mem::replace(&mut *cell, Bound::Null))
    }

    pub fn borrow(&self) -> Ref<'_, Bound> {
        self.0.borrow()
    }

    pub fn is_unset(&self) -> bool {
        matches!(*self.0.borrow(), Bound::Unset)
    }

    pub fn is_null(&self) -> bool {
        matches!(*self.0.borrow(), Bound::Null | Bound::One(Value::Str(None)))
    }

    /// The single bound value, converted.
    pub fn get<T: FromValue>(&self) -> Option<T> {
        match &*self.0.borrow() {
            Bound::One(value) => T::from_value(value),
            _ => None,
        }
    }

    /// Every element of a bound array, converted; stops at a null string
    /// terminator. An empty variadic reads as an empty vector.
    pub fn get_vec<T: FromValue>(&self) -> Option<Vec<T>> {
        match &*self.0.borrow() {
            Bound::Many(values) => values
                .iter()
                .take_while(|v| !matches!(v, Value::Str(None)))
                .map(T::from_value)
                .collect(),
            Bound::Null => Some(Vec::new()),
            _ => None,
        }
    }

    /// Shorthand for `get_vec::<String>()`.
    pub fn strings(&self) -> Option<Vec<String>> {
        self.get_vec()
    }

    /// Runs `f` on the single bound opaque value when it has type `T`.
    pub fn with_opaque<T: Any, R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        match &*self.0.borrow() {
            Bound::One(Value::Other(opaque)) => opaque.downcast_ref::<T>().map(f),
            _ => None,
        }
    }

    pub fn ptr_eq(&self, other: &Slot) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(bound) => f.debug_tuple("Slot").field(&*bound).finish(),
            Err(_) => f.write_str("Slot(<borrowed>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_clones_share_storage() {
        let slot = Slot::new();
        let other = slot.clone();
        other.set(Bound::One(Value::Bool(true))).unwrap();
        assert_eq!(slot.get::<bool>(), Some(true));
        assert!(slot.ptr_eq(&other));
    }

    #[test]
    fn test_get_rejects_wrong_type() {
        let slot = Slot::new();
        slot.set(Bound::One(Value::Double(1.5))).unwrap();
        assert_eq!(slot.get::<f32>(), None);
        assert_eq!(slot.get::<f64>(), Some(1.5));
    }

    #[test]
    fn test_get_vec_stops_at_null_terminator() {
        let slot = Slot::new();
        slot.set(Bound::Many(vec![
            Value::Str(Some("a".into())),
            Value::Str(Some("b".into())),
            Value::Str(None),
        ]))
        .unwrap();
        assert_eq!(slot.strings(), Some(vec!["a".to_string(), "b".to_string()]));
    }

    #[test]
    fn test_null_reads_as_empty_vec() {
        let slot = Slot::new();
        slot.set(Bound::Null).unwrap();
        assert!(slot.is_null());
        assert_eq!(slot.get_vec::<i32>(), Some(Vec::new()));
    }

    #[test]
    fn test_take_leaves_null() {
        let slot = Slot::new();
        slot.set(Bound::One(Value::Str(Some("x".into())))).unwrap();
        let taken = slot.take().unwrap();
        assert!(matches!(taken, Bound::One(Value::Str(Some(ref s))) if s == "x"));
        assert!(slot.is_null());
    }

    #[test]
    fn test_with_opaque_downcasts() {
        let slot = Slot::new();
        slot.set(Bound::One(Value::Other(Opaque::new((3_i32, 4_i32))))).unwrap();
        assert_eq!(slot.with_opaque(|p: &(i32, i32)| p.0 + p.1), Some(7));
        assert_eq!(slot.with_opaque(|_: &String| ()), None);
    }

    #[test]
    fn test_enum_reads_as_i32() {
        let slot = Slot::new();
        slot.set(Bound::One(Value::Enum(2))).unwrap();
        assert_eq!(slot.get::<i32>(), Some(2));
    }

    #[test]
    fn test_write_while_borrowed_is_refused() {
        let slot = Slot::new();
        slot.set(Bound::One(Value::Int(1))).unwrap();

        let held = slot.borrow();
        let err = slot.set(Bound::One(Value::Int(2))).unwrap_err();
        assert!(matches!(err.rejected, Bound::One(Value::Int(2))));
        assert!(slot.take().is_err());
        drop(held);

        assert_eq!(slot.get::<i32>(), Some(1));
        assert!(slot.set(Bound::Null).is_ok());
    }
}
