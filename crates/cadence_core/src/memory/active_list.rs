//! # Active List
//!
//! Ordered set of live entries that tolerates mutation while it is being
//! dispatched.
//!
//! ## Dispatch Contract
//!
//! ```text
//! tick start:  n = list.len()            (snapshot)
//! for i in 0..n:
//!     take(i)   -> None  => vacated earlier this tick, skip
//!               -> Some  => dispatch, then restore(i) or leave vacated
//! push(..)     lands at index >= n       => first visited next tick
//! tick end:    compact()                 (drop tombstones, keep order)
//! ```

/// Registration-ordered slots with tombstones.
#[derive(Debug)]
pub struct ActiveList<T> {
    /// Slots in registration order. `None` is a tombstone.
    slots: Vec<Option<T>>,
    /// Occupied slots.
    live: usize,
}

impl<T> ActiveList<T> {
    /// Creates an empty list with room for `capacity` entries.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            live: 0,
        }
    }

    /// Number of slots including tombstones. Use this as the tick snapshot.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots.
    #[inline]
    #[must_use]
    pub fn live(&self) -> usize {
        self.live
    }

    /// Returns true when no slot is occupied.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Returns true when at least one tombstone is waiting for compaction.
    #[inline]
    #[must_use]
    pub fn has_tombstones(&self) -> bool {
        self.live < self.slots.len()
    }

    /// Appends an entry and returns its slot index.
    pub fn push(&mut self, entry: T) -> usize {
        self.slots.push(Some(entry));
        self.live += 1;
        self.slots.len() - 1
    }

    /// Vacates a slot, leaving a tombstone, and returns its entry.
    pub fn take(&mut self, index: usize) -> Option<T> {
        let entry = self.slots.get_mut(index)?.take()?;
        self.live -= 1;
        Some(entry)
    }

    /// Refills a slot vacated by [`ActiveList::take`].
    ///
    /// Returns the entry back when the slot is out of range or occupied.
    pub fn restore(&mut self, index: usize, entry: T) -> Result<(), T> {
        match self.slots.get_mut(index) {
            Some(slot) if slot.is_none() => {
                *slot = Some(entry);
                self.live += 1;
                Ok(())
            }
            _ => Err(entry),
        }
    }

    /// Returns the entry in a slot.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.slots.get(index)?.as_ref()
    }

    /// Returns the entry in a slot mutably.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.slots.get_mut(index)?.as_mut()
    }

    /// Finds the slot of the first live entry matching `predicate`.
    pub fn position(&self, mut predicate: impl FnMut(&T) -> bool) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.as_ref().is_some_and(&mut predicate))
    }

    /// Drops all tombstones, preserving registration order.
    ///
    /// Never call this while a dispatch loop holds slot indices.
    pub fn compact(&mut self) {
        if self.has_tombstones() {
            self.slots.retain(Option::is_some);
        }
    }

    /// Iterates live entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().filter_map(Option::as_ref)
    }
}

impl<T> Default for ActiveList<T> {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}
