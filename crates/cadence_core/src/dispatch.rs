//! # Callback Dispatch
//!
//! Callbacks are captured closures. Data-driven code that can only name a
//! callback registers it once in a [`DispatchTable`] and refers to it by key.
//!
//! A dispatching loop leases the callback out of the table with
//! [`DispatchTable::take`], calls it while holding whatever else it needs
//! mutably, then hands it back with [`DispatchTable::restore`].

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

use crate::error::CadenceError;

/// A callback held by a runner or a motion.
pub enum Callback<F: ?Sized> {
    /// A captured closure.
    Direct(Box<F>),
    /// A key into the owner's dispatch table.
    Named(Cow<'static, str>),
}

impl<F: ?Sized> Callback<F> {
    /// Wraps a closure.
    #[must_use]
    pub fn direct(callback: Box<F>) -> Self {
        Self::Direct(callback)
    }

    /// Refers to a dispatch-table entry.
    #[must_use]
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        Self::Named(name.into())
    }

    /// Returns the dispatch key, if this callback is named.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Direct(_) => None,
            Self::Named(name) => Some(&**name),
        }
    }
}

impl<F: ?Sized> fmt::Debug for Callback<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct(_) => f.write_str("Callback::Direct(..)"),
            Self::Named(name) => write!(f, "Callback::Named({name:?})"),
        }
    }
}

/// Name-to-callback table.
pub struct DispatchTable<F: ?Sized> {
    entries: HashMap<Cow<'static, str>, Box<F>>,
}

impl<F: ?Sized> DispatchTable<F> {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Registers `callback` under `name`, returning any callback it replaced.
    pub fn register(
        &mut self,
        name: impl Into<Cow<'static, str>>,
        callback: Box<F>,
    ) -> Option<Box<F>> {
        self.entries.insert(name.into(), callback)
    }

    /// Removes the callback registered under `name`.
    pub fn unregister(&mut self, name: &str) -> bool {
        self.entries.remove(name).is_some()
    }

    /// Returns true when `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of registered callbacks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Leases a callback out of the table.
    ///
    /// Missing names are logged. Pair every successful `take` with
    /// [`DispatchTable::restore`].
    pub fn take(&mut self, name: &str) -> Option<(Cow<'static, str>, Box<F>)> {
        let entry = self.entries.remove_entry(name);
        if entry.is_none() {
            let error = CadenceError::UnknownCallback(name.to_owned());
            tracing::warn!(%error, "named callback skipped");
        }
        entry
    }

    /// Returns a leased callback.
    ///
    /// If the name was re-registered while leased, the newer registration wins.
    pub fn restore(&mut self, lease: (Cow<'static, str>, Box<F>)) {
        let (name, callback) = lease;
        self.entries.entry(name).or_insert(callback);
    }
}

impl<F: ?Sized> Default for DispatchTable<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: ?Sized> fmt::Debug for DispatchTable<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}
