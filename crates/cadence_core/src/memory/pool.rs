//! # Object Pool
//!
//! Free-list recycler for working objects that are checked out and returned
//! every few frames.

/// Lifecycle contract for pooled objects.
///
/// `init` runs on every checkout, `reset` on every ordinary return and
/// `destroy` when the pool trims an idle instance.
pub trait Poolable {
    /// Arguments passed to [`Poolable::init`] on checkout.
    type Args;

    /// Prepares a fresh or recycled instance for use.
    fn init(&mut self, args: Self::Args);

    /// Clears all state so the instance retains nothing from its last use.
    fn reset(&mut self) {}

    /// Final teardown before the pool drops the instance.
    fn destroy(&mut self) {}
}

/// Snapshot of a pool's accounting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Maximum idle instances kept after a trim.
    pub capacity: usize,
    /// Instances currently idle in the free list.
    pub free_count: usize,
    /// Instances ever built by the factory.
    pub created_total: u64,
    /// Instances ever handed back.
    pub returned_total: u64,
    /// Instances destroyed by trimming.
    pub destroyed_total: u64,
    /// Instances currently checked out.
    pub in_use: u64,
}

/// A bounded free-list pool.
///
/// The capacity bounds how many idle instances survive [`Pool::clear`] and
/// [`Pool::resize`]. It never bounds checkout: when the free list is empty,
/// [`Pool::get`] builds a new instance.
///
/// # Thread Safety
///
/// This pool is NOT thread-safe. Each pool belongs to exactly one subsystem.
/// Never call `get` on a pool from inside its own factory or `init`.
///
/// # Example
///
/// ```rust,ignore
/// let mut pool: Pool<Leg> = Pool::new("legs", 512, Leg::blank);
///
/// // Checkout - recycled when possible
/// let leg = pool.get(60);
///
/// // Return - reset, then back on the free list
/// pool.release(leg);
/// ```
pub struct Pool<T: Poolable> {
    /// Diagnostic name used in log lines.
    name: &'static str,
    /// Idle instances. The last entry is handed out first.
    free: Vec<T>,
    /// Idle instances kept after trimming.
    capacity: usize,
    /// Builds a new instance when the free list is empty.
    factory: fn() -> T,
    /// Instances built by the factory.
    created_total: u64,
    /// Instances returned through `release` or `release_clean`.
    returned_total: u64,
    /// Instances destroyed by `clear` or `resize`.
    destroyed_total: u64,
}

impl<T: Poolable> Pool<T> {
    /// Creates an empty pool.
    ///
    /// # Arguments
    ///
    /// * `name` - Label used in diagnostics
    /// * `capacity` - Idle instances kept after trimming
    /// * `factory` - Builds a blank instance
    #[must_use]
    pub fn new(name: &'static str, capacity: usize, factory: fn() -> T) -> Self {
        Self {
            name,
            free: Vec::with_capacity(capacity),
            capacity,
            factory,
            created_total: 0,
            returned_total: 0,
            destroyed_total: 0,
        }
    }

    /// Returns the pool's diagnostic name.
    #[inline]
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the idle capacity.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of idle instances.
    #[inline]
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Checks out an instance and runs its `init` contract with `args`.
    ///
    /// Recycles the most recently returned instance when one is idle,
    /// otherwise builds one with the factory. A panic raised by the factory
    /// or by `init` propagates to the caller.
    pub fn get(&mut self, args: T::Args) -> T {
        let mut instance = match self.free.pop() {
            Some(instance) => instance,
            None => {
                self.created_total += 1;
                tracing::trace!(pool = self.name, created = self.created_total, "pool grew");
                (self.factory)()
            }
        };
        instance.init(args);
        instance
    }

    /// Returns an instance, running its `reset` contract first.
    ///
    /// Passing `None` is a logged no-op.
    pub fn release(&mut self, instance: impl Into<Option<T>>) {
        let Some(mut instance) = instance.into() else {
            tracing::warn!(pool = self.name, "ignored release of an empty instance");
            return;
        };
        instance.reset();
        self.push_idle(instance);
    }

    /// Returns an instance the caller knows is already clean.
    ///
    /// Identical to [`Pool::release`] except the `reset` contract is skipped.
    pub fn release_clean(&mut self, instance: impl Into<Option<T>>) {
        let Some(instance) = instance.into() else {
            tracing::warn!(pool = self.name, "ignored clean release of an empty instance");
            return;
        };
        self.push_idle(instance);
    }

    /// Destroys idle instances beyond the capacity.
    pub fn clear(&mut self) {
        self.trim_to(self.capacity);
    }

    /// Changes the capacity. Shrinking destroys the excess idle instances now.
    pub fn resize(&mut self, new_capacity: usize) {
        let old = self.capacity;
        self.capacity = new_capacity;
        if new_capacity < old {
            self.trim_to(new_capacity);
        } else {
            self.free.reserve(new_capacity.saturating_sub(self.free.len()));
        }
        tracing::debug!(pool = self.name, old, new = new_capacity, "pool resized");
    }

    /// Builds up to `count` idle instances ahead of time.
    ///
    /// Bounded by the remaining idle capacity. Returns how many were built.
    pub fn pre_allocate(&mut self, count: usize) -> usize {
        let room = self.capacity.saturating_sub(self.free.len());
        let count = count.min(room);
        for _ in 0..count {
            let instance = (self.factory)();
            self.created_total += 1;
            self.free.push(instance);
        }
        count
    }

    /// Returns the pool's accounting.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        let free = self.free.len() as u64;
        PoolStats {
            capacity: self.capacity,
            free_count: self.free.len(),
            created_total: self.created_total,
            returned_total: self.returned_total,
            destroyed_total: self.destroyed_total,
            in_use: self
                .created_total
                .saturating_sub(self.destroyed_total)
                .saturating_sub(free),
        }
    }

    fn push_idle(&mut self, instance: T) {
        self.free.push(instance);
        self.returned_total += 1;
    }

    fn trim_to(&mut self, keep: usize) {
        if self.free.len() <= keep {
            return;
        }
        let excess = self.free.len() - keep;
        for mut instance in self.free.drain(keep..) {
            instance.destroy();
        }
        self.destroyed_total += excess as u64;
        tracing::debug!(pool = self.name, destroyed = excess, "pool trimmed");
    }
}

impl<T: Poolable> std::fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pool")
            .field("name", &self.name)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    static SERIAL: AtomicU32 = AtomicU32::new(1);

    #[derive(Debug)]
    struct Widget {
        serial: u32,
        label: u32,
        dirty: bool,
        destroyed: bool,
    }

    impl Widget {
        fn blank() -> Self {
            Self {
                serial: SERIAL.fetch_add(1, Ordering::Relaxed),
                label: 0,
                dirty: false,
                destroyed: false,
            }
        }
    }

    impl Poolable for Widget {
        type Args = u32;

        fn init(&mut self, label: u32) {
            self.label = label;
            self.dirty = true;
        }

        fn reset(&mut self) {
            self.label = 0;
            self.dirty = false;
        }

        fn destroy(&mut self) {
            self.destroyed = true;
        }
    }

    fn assert_accounting(pool: &Pool<Widget>) {
        let stats = pool.stats();
        assert_eq!(
            stats.in_use,
            stats.created_total - stats.free_count as u64,
            "in_use must equal created - free: {stats:?}"
        );
    }

    #[test]
    fn test_pool_accounting_holds() {
        let mut pool = Pool::new("widgets", 4, Widget::blank);
        let mut out = Vec::new();
        let mut last_created = 0;

        for round in 0..6u32 {
            out.push(pool.get(round));
            assert_accounting(&pool);
            if round % 2 == 1 {
                pool.release(out.pop());
                assert_accounting(&pool);
            }
            assert!(pool.stats().created_total >= last_created);
            last_created = pool.stats().created_total;
        }
        for widget in out.drain(..) {
            pool.release(widget);
            assert_accounting(&pool);
        }
        assert_eq!(pool.stats().in_use, 0);
    }

    #[test]
    fn test_pool_reuse_identity() {
        let mut pool = Pool::new("widgets", 4, Widget::blank);
        let first = pool.get(7);
        let serial = first.serial;
        pool.release(first);

        let again = pool.get(9);
        assert_eq!(again.serial, serial);
        assert_eq!(again.label, 9);
        assert_eq!(pool.stats().created_total, 1);
    }

    #[test]
    fn test_release_resets() {
        let mut pool = Pool::new("widgets", 4, Widget::blank);
        let widget = pool.get(3);
        assert!(widget.dirty);
        pool.release(widget);
        assert!(!pool.free[0].dirty);
        assert_eq!(pool.free[0].label, 0);
    }

    #[test]
    fn test_release_clean_skips_reset() {
        let mut pool = Pool::new("widgets", 4, Widget::blank);
        let widget = pool.get(3);
        pool.release_clean(widget);
        assert!(pool.free[0].dirty);
        assert_eq!(pool.stats().returned_total, 1);
    }

    #[test]
    fn test_release_none_is_noop() {
        let mut pool = Pool::new("widgets", 4, Widget::blank);
        pool.release(None);
        pool.release_clean(None);
        assert_eq!(pool.stats().returned_total, 0);
        assert_eq!(pool.free_count(), 0);
    }

    #[test]
    fn test_capacity_does_not_bound_checkout() {
        let mut pool = Pool::new("widgets", 2, Widget::blank);
        let _a = pool.get(1);
        let _b = pool.get(2);
        let _c = pool.get(3);
        assert_eq!(pool.stats().created_total, 3);
        assert_eq!(pool.stats().in_use, 3);
    }

    #[test]
    fn test_clear_trims_beyond_capacity() {
        let mut pool = Pool::new("widgets", 2, Widget::blank);
        let widgets: Vec<_> = (0..5).map(|i| pool.get(i)).collect();
        for widget in widgets {
            pool.release(widget);
        }
        assert_eq!(pool.free_count(), 5);

        pool.clear();
        assert_eq!(pool.free_count(), 2);
        assert_eq!(pool.stats().destroyed_total, 3);
        assert_eq!(pool.stats().in_use, 0);
    }

    #[test]
    fn test_resize_shrinks_immediately() {
        let mut pool = Pool::new("widgets", 8, Widget::blank);
        assert_eq!(pool.pre_allocate(6), 6);

        pool.resize(2);
        assert_eq!(pool.capacity(), 2);
        assert_eq!(pool.free_count(), 2);
        assert_eq!(pool.stats().destroyed_total, 4);

        pool.resize(10);
        assert_eq!(pool.free_count(), 2);
    }

    #[test]
    fn test_pre_allocate_bounded_by_room() {
        let mut pool = Pool::new("widgets", 3, Widget::blank);
        let held = pool.get(0);
        pool.release(held);

        assert_eq!(pool.pre_allocate(10), 2);
        assert_eq!(pool.free_count(), 3);
        assert_eq!(pool.stats().created_total, 3);
        assert_eq!(pool.pre_allocate(1), 0);
    }
}
