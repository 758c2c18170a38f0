#![forbid(unsafe_code)]

//! Observable value container driven by pure updater functions.
//!
//! # Design
//!
//! [`Store<T>`] wraps a value of type `T` in shared, reference-counted
//! storage. The value is only ever replaced through [`Store::set`], which
//! computes `updater(&current)` and then synchronously notifies every live
//! listener with the new value, in subscription order.
//!
//! Subscribing does not call the listener with the current value. Consumers
//! read [`Store::get`] once for the initial state and then subscribe for
//! deltas.
//!
//! # Performance
//!
//! | Operation     | Complexity                 |
//! |---------------|----------------------------|
//! | `get()`       | O(1) + clone of `T`        |
//! | `set()`       | O(L) where L = listeners   |
//! | `subscribe()` | O(1) amortized             |
//! | unsubscribe   | O(L)                       |
//!
//! # Failure Modes
//!
//! - **Re-entrant set**: an updater or listener that calls `set()` on the same
//!   store does not run immediately. The updater is queued and applied after
//!   the current notification pass, followed by its own pass. The outermost
//!   `set()` drains the queue before returning, so callers still observe a
//!   fully notified state.
//! - **Listener panics**: the busy flag is reset on unwind; queued updaters
//!   that had not run yet are dropped.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};

type Updater<T> = Box<dyn FnOnce(&T) -> T>;

struct ListenerEntry<T> {
    id: u64,
    active: Cell<bool>,
    callback: Box<dyn Fn(&T)>,
}

struct StoreInner<T> {
    value: RefCell<T>,
    version: Cell<u64>,
    listeners: RefCell<Vec<Rc<ListenerEntry<T>>>>,
    next_listener: Cell<u64>,
    /// Set while an updater or a notification pass is running.
    busy: Cell<bool>,
    pending: RefCell<VecDeque<Updater<T>>>,
}

impl<T> StoreInner<T> {
    fn remove_listener(&self, id: u64) {
        let mut listeners = self.listeners.borrow_mut();
        if let Some(pos) = listeners.iter().position(|entry| entry.id == id) {
            let entry = listeners.remove(pos);
            entry.active.set(false);
        }
    }
}

/// Resets the busy flag even if an updater or listener unwinds.
struct BusyGuard<'a, T> {
    inner: &'a StoreInner<T>,
}

impl<T> Drop for BusyGuard<'_, T> {
    fn drop(&mut self) {
        self.inner.busy.set(false);
        if std::thread::panicking() {
            self.inner.pending.borrow_mut().clear();
        }
    }
}

/// A shared observable value.
///
/// Cloning a `Store` creates a new handle to the **same** inner state.
pub struct Store<T> {
    inner: Rc<StoreInner<T>>,
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Store<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Store");
        match self.inner.value.try_borrow() {
            Ok(value) => s.field("value", &*value),
            Err(_) => s.field("value", &"<updating>"),
        };
        s.field("version", &self.inner.version.get())
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

impl<T> Store<T> {
    /// Clone of the current value.
    #[must_use]
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.inner.value.borrow().clone()
    }

    /// Read the current value by reference.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    /// Number of applied updaters since creation.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.version.get()
    }

    /// Number of currently registered listeners.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    /// A non-owning reference to this store.
    #[must_use]
    pub fn downgrade(&self) -> WeakStore<T> {
        WeakStore {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Whether two handles point at the same store.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Whether an updater or notification pass is running. A `set` issued
    /// now is queued rather than applied.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.inner.busy.get()
    }
}

impl<T: 'static> Store<T> {
    /// Create a store seeded with `value`. Version starts at 0.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(StoreInner {
                value: RefCell::new(value),
                version: Cell::new(0),
                listeners: RefCell::new(Vec::new()),
                next_listener: Cell::new(0),
                busy: Cell::new(false),
                pending: RefCell::new(VecDeque::new()),
            }),
        }
    }

    /// Replace the value with `updater(&current)` and notify listeners.
    ///
    /// Returns after every listener subscribed at the time of each pass has
    /// observed the new value. Calls made while the store is busy are queued;
    /// see the module docs.
    pub fn set(&self, updater: impl FnOnce(&T) -> T + 'static) {
        if self.inner.busy.get() {
            tracing::trace!(
                message = "store.reentrant_set",
                queued = self.inner.pending.borrow().len() + 1
            );
            self.inner.pending.borrow_mut().push_back(Box::new(updater));
            return;
        }

        self.inner.busy.set(true);
        let _guard = BusyGuard { inner: &self.inner };

        self.apply(updater);
        self.notify();

        loop {
            let next = self.inner.pending.borrow_mut().pop_front();
            let Some(updater) = next else {
                break;
            };
            self.apply(updater);
            self.notify();
        }
    }

    /// Register `listener` for future changes.
    ///
    /// The returned [`Subscription`] removes exactly this registration when
    /// released. Dropping it releases it.
    #[must_use = "dropping the subscription unsubscribes the listener"]
    pub fn subscribe(&self, listener: impl Fn(&T) + 'static) -> Subscription {
        let id = self.inner.next_listener.get();
        self.inner.next_listener.set(id + 1);
        self.inner.listeners.borrow_mut().push(Rc::new(ListenerEntry {
            id,
            active: Cell::new(true),
            callback: Box::new(listener),
        }));

        let weak = Rc::downgrade(&self.inner);
        Subscription::from_release(move || {
            if let Some(inner) = weak.upgrade() {
                inner.remove_listener(id);
            }
        })
    }

    fn apply(&self, updater: impl FnOnce(&T) -> T) {
        let next = {
            let current = self.inner.value.borrow();
            updater(&current)
        };
        *self.inner.value.borrow_mut() = next;
        self.inner.version.set(self.inner.version.get() + 1);
    }

    fn notify(&self) {
        // Snapshot so listeners may subscribe or unsubscribe during the pass.
        let listeners: Vec<Rc<ListenerEntry<T>>> = self.inner.listeners.borrow().clone();
        let value = self.inner.value.borrow();
        for entry in &listeners {
            if entry.active.get() {
                (entry.callback)(&value);
            }
        }
    }
}

/// Non-owning store reference held by overlay handles.
pub struct WeakStore<T> {
    inner: Weak<StoreInner<T>>,
}

impl<T> Clone for WeakStore<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for WeakStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakStore")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

impl<T> WeakStore<T> {
    #[must_use]
    pub fn upgrade(&self) -> Option<Store<T>> {
        self.inner.upgrade().map(|inner| Store { inner })
    }
}

/// Capability that removes one listener registration.
///
/// Releasing is idempotent: [`unsubscribe`](Self::unsubscribe) may be called
/// any number of times, and dropping an already released subscription does
/// nothing.
pub struct Subscription {
    release: Cell<Option<Box<dyn FnOnce()>>>,
}

impl Subscription {
    fn from_release(release: impl FnOnce() + 'static) -> Self {
        Self {
            release: Cell::new(Some(Box::new(release))),
        }
    }

    /// Remove the listener. No-op after the first call.
    pub fn unsubscribe(&self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }

    /// Whether the listener is still registered through this capability.
    #[must_use]
    pub fn is_active(&self) -> bool {
        let release = self.release.take();
        let active = release.is_some();
        self.release.set(release);
        active
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_set_basic() {
        let store = Store::new(42);
        assert_eq!(store.get(), 42);
        assert_eq!(store.version(), 0);

        store.set(|v| v + 1);
        assert_eq!(store.get(), 43);
        assert_eq!(store.version(), 1);
    }

    #[test]
    fn set_always_notifies_even_when_equal() {
        let store = Store::new(7);
        let count = Rc::new(Cell::new(0u32));
        let c = Rc::clone(&count);
        let _sub = store.subscribe(move |_| c.set(c.get() + 1));

        store.set(|v| *v);
        assert_eq!(count.get(), 1);
        assert_eq!(store.version(), 1);
    }

    #[test]
    fn subscribe_does_not_replay_current_value() {
        let store = Store::new(1);
        let seen = Rc::new(Cell::new(None));
        let s = Rc::clone(&seen);
        let _sub = store.subscribe(move |v| s.set(Some(*v)));
        assert_eq!(seen.get(), None);

        store.set(|_| 5);
        assert_eq!(seen.get(), Some(5));
    }

    #[test]
    fn with_access() {
        let store = Store::new(vec![1, 2, 3]);
        assert_eq!(store.with(|v| v.iter().sum::<i32>()), 6);
    }

    #[test]
    fn notification_order_is_subscription_order() {
        let store = Store::new(0);
        let log = Rc::new(RefCell::new(Vec::new()));

        let l1 = Rc::clone(&log);
        let _a = store.subscribe(move |_| l1.borrow_mut().push('A'));
        let l2 = Rc::clone(&log);
        let _b = store.subscribe(move |_| l2.borrow_mut().push('B'));
        let l3 = Rc::clone(&log);
        let _c = store.subscribe(move |_| l3.borrow_mut().push('C'));

        store.set(|_| 1);
        assert_eq!(*log.borrow(), vec!['A', 'B', 'C']);
    }

    #[test]
    fn unsubscribe_stops_only_that_listener() {
        let store = Store::new(0);
        let a = Rc::new(Cell::new(0u32));
        let b = Rc::new(Cell::new(0u32));
        let ac = Rc::clone(&a);
        let bc = Rc::clone(&b);

        let sub_a = store.subscribe(move |_| ac.set(ac.get() + 1));
        let _sub_b = store.subscribe(move |_| bc.set(bc.get() + 1));

        sub_a.unsubscribe();
        store.set(|v| v + 1);
        assert_eq!(a.get(), 0);
        assert_eq!(b.get(), 1);
        assert_eq!(store.subscriber_count(), 1);
    }

    #[test]
    fn unsubscribe_is_idempotent() {
        let store = Store::new(0);
        let sub = store.subscribe(|_| {});
        let _other = store.subscribe(|_| {});
        assert!(sub.is_active());

        sub.unsubscribe();
        sub.unsubscribe();
        assert!(!sub.is_active());
        assert_eq!(store.subscriber_count(), 1);
        drop(sub);
        assert_eq!(store.subscriber_count(), 1);
    }

    #[test]
    fn drop_unsubscribes() {
        let store = Store::new(0);
        let count = Rc::new(Cell::new(0u32));
        let c = Rc::clone(&count);
        let sub = store.subscribe(move |_| c.set(c.get() + 1));
        drop(sub);

        store.set(|_| 1);
        assert_eq!(count.get(), 0);
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn unsubscribed_mid_pass_is_skipped() {
        let store = Store::new(0);
        let late = Rc::new(Cell::new(0u32));
        let victim: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

        let v = Rc::clone(&victim);
        let _killer = store.subscribe(move |_| {
            if let Some(sub) = v.borrow().as_ref() {
                sub.unsubscribe();
            }
        });
        let l = Rc::clone(&late);
        *victim.borrow_mut() = Some(store.subscribe(move |_| l.set(l.get() + 1)));

        store.set(|_| 1);
        assert_eq!(late.get(), 0);
    }

    #[test]
    fn reentrant_set_is_queued_after_current_pass() {
        let store = Store::new(0);
        let log = Rc::new(RefCell::new(Vec::new()));

        let inner_store = store.clone();
        let l1 = Rc::clone(&log);
        let _first = store.subscribe(move |v| {
            l1.borrow_mut().push(format!("first:{v}"));
            if *v == 1 {
                inner_store.set(|v| v + 10);
            }
        });
        let l2 = Rc::clone(&log);
        let _second = store.subscribe(move |v| l2.borrow_mut().push(format!("second:{v}")));

        store.set(|_| 1);

        assert_eq!(store.get(), 11);
        assert_eq!(store.version(), 2);
        assert_eq!(
            *log.borrow(),
            vec!["first:1", "second:1", "first:11", "second:11"]
        );
    }

    #[test]
    fn set_from_updater_is_queued() {
        let store = Store::new(vec![1]);
        let nested = store.clone();
        store.set(move |v| {
            nested.set(|v| {
                let mut next = v.clone();
                next.push(3);
                next
            });
            let mut next = v.clone();
            next.push(2);
            next
        });
        assert_eq!(store.get(), vec![1, 2, 3]);
    }

    #[test]
    fn busy_only_during_updates_and_notifications() {
        let store = Store::new(0);
        assert!(!store.is_busy());
        let seen = Rc::new(Cell::new(false));
        let (inner, flag) = (store.clone(), Rc::clone(&seen));
        let _sub = store.subscribe(move |_| flag.set(inner.is_busy()));
        store.set(|v| v + 1);
        assert!(seen.get());
        assert!(!store.is_busy());
    }

    #[test]
    fn clone_shares_state_and_listeners() {
        let a = Store::new(0);
        let b = a.clone();
        let count = Rc::new(Cell::new(0u32));
        let c = Rc::clone(&count);
        let _sub = a.subscribe(move |_| c.set(c.get() + 1));

        b.set(|_| 9);
        assert_eq!(a.get(), 9);
        assert_eq!(count.get(), 1);
        assert!(a.ptr_eq(&b));
    }

    #[test]
    fn weak_store_does_not_keep_alive() {
        let store = Store::new(1);
        let weak = store.downgrade();
        assert!(weak.upgrade().is_some());
        drop(store);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn subscription_outliving_store_is_inert() {
        let store = Store::new(0);
        let sub = store.subscribe(|_| {});
        drop(store);
        sub.unsubscribe();
        assert!(!sub.is_active());
    }

    #[test]
    fn debug_format() {
        let store = Store::new(42);
        let dbg = format!("{store:?}");
        assert!(dbg.contains("Store"));
        assert!(dbg.contains("42"));
        assert!(dbg.contains("version"));
    }
}
