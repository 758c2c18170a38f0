#![forbid(unsafe_code)]

//! Observable state containers for overlay kinds.
//!
//! - [`Store`]: a shared value replaced through pure updater functions, with
//!   synchronous change notification.
//! - [`Subscription`]: capability returned by [`Store::subscribe`]; releasing
//!   it (explicitly or by drop) removes exactly that listener.
//!
//! # Architecture
//!
//! `Store<T>` uses `Rc` with interior mutability for single-threaded shared
//! ownership. Every mutation and every notification runs to completion on the
//! calling thread.
//!
//! # Invariants
//!
//! 1. `get()` returns the result of the most recently applied updater.
//! 2. Listeners are notified in subscription order, once per applied updater.
//! 3. A released listener is never invoked again, including later in the
//!    notification pass that released it.
//! 4. `set()` issued while the store is applying or notifying is queued and
//!    applied after the current pass, before the outermost `set()` returns.

pub mod store;

pub use store::{Store, Subscription, WeakStore};
