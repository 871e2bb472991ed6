//! Release actions that run only when a parse call fails.
//!
//! Cleanup that must happen on every exit belongs to the owning value's
//! `Drop`. What lives here is the other half: work a successful call keeps
//! (bound values handed to the caller) but a failing call must undo.
//! [`Teardown::finish`] with [`Exit::Error`] runs the actions in reverse
//! registration order; a teardown dropped without being finished releases as
//! a failure.

use tracing::trace;

/// How the guarded call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    Success,
    Error,
}

type Action = Box<dyn FnOnce()>;

/// Scoped list of error-path release actions.
///
/// # Examples
///
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use argbind_engine::{Exit, Teardown};
///
/// let log = Rc::new(RefCell::new(Vec::new()));
/// let mut teardown = Teardown::new();
/// let l = log.clone();
/// teardown.on_error("first", move || l.borrow_mut().push("first"));
/// let l = log.clone();
/// teardown.on_error("second", move || l.borrow_mut().push("second"));
///
/// teardown.finish(Exit::Error);
/// assert_eq!(*log.borrow(), vec!["second", "first"]);
/// ```
#[derive(Default)]
pub struct Teardown {
    entries: Vec<(&'static str, Action)>,
}

impl Teardown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an action for failing exits.
    pub fn on_error(&mut self, label: &'static str, action: impl FnOnce() + 'static) {
        self.entries.push((label, Box::new(action)));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ends the scope. A failing exit runs every action, newest first; a
    /// successful one discards them unrun.
    pub fn finish(mut self, exit: Exit) {
        self.release(exit);
    }

    fn release(&mut self, exit: Exit) {
        if exit == Exit::Success {
            trace!(discarded = self.entries.len(), "keeping bound values");
            self.entries.clear();
            return;
        }
        while let Some((label, action)) = self.entries.pop() {
            trace!(label, "releasing");
            action();
        }
    }
}

impl Drop for Teardown {
    fn drop(&mut self) {
        self.release(Exit::Error);
    }
}
