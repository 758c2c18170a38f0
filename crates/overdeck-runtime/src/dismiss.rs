#![forbid(unsafe_code)]

//! Deferred closes driven by an external clock.
//!
//! Overlay lifetime is not the store's business: a caller that wants a toast
//! to go away after a while schedules a close here and calls
//! [`DismissTimers::fire_due`] from its own tick. Cancelling a timer for an
//! item that was closed by other means is the caller's job; a timer that
//! fires anyway hits a closed handle and does nothing, since ids are never
//! reused.

use std::collections::BTreeMap;
use std::fmt;

use overdeck_core::OverlayId;
use web_time::{Duration, Instant};

use crate::kind::Handle;

/// When a scheduled close falls due. `Never` sorts after every instant and
/// stands in for a delay the clock cannot represent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Deadline {
    At(Instant),
    Never,
}

/// Token identifying one scheduled close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerToken(u64);

struct PendingClose {
    id: OverlayId,
    kind: String,
    close: Box<dyn Fn()>,
}

/// Ordered set of scheduled closes.
#[derive(Default)]
pub struct DismissTimers {
    next_token: u64,
    /// Keyed by deadline, then token, so equal deadlines fire in schedule order.
    entries: BTreeMap<(Deadline, TimerToken), PendingClose>,
}

impl fmt::Debug for DismissTimers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DismissTimers")
            .field("pending", &self.entries.len())
            .field("next_deadline", &self.next_deadline())
            .finish()
    }
}

impl DismissTimers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Close `handle` once `now + after` has passed.
    ///
    /// A delay that overflows the clock is kept as a timer that never fires,
    /// so it can still be cancelled by token.
    pub fn schedule<C: Clone + 'static>(
        &mut self,
        handle: &Handle<C>,
        after: Duration,
        now: Instant,
    ) -> TimerToken {
        let token = TimerToken(self.next_token);
        self.next_token += 1;

        let deadline = match now.checked_add(after) {
            Some(at) => Deadline::At(at),
            None => {
                tracing::warn!(
                    message = "dismiss.unrepresentable_deadline",
                    kind = handle.kind(),
                    id = handle.id().get(),
                    after_secs = after.as_secs()
                );
                Deadline::Never
            }
        };

        let target = handle.clone();
        self.entries.insert(
            (deadline, token),
            PendingClose {
                id: handle.id(),
                kind: handle.kind().to_string(),
                close: Box::new(move || target.close()),
            },
        );
        token
    }

    /// Drop a scheduled close. Returns whether it was still pending.
    pub fn cancel(&mut self, token: TimerToken) -> bool {
        let key = self.entries.keys().find(|(_, t)| *t == token).copied();
        key.is_some_and(|key| self.entries.remove(&key).is_some())
    }

    /// Cancel every pending close targeting `id`. Returns how many were dropped.
    pub fn cancel_for(&mut self, id: OverlayId) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, pending| pending.id != id);
        before - self.entries.len()
    }

    /// Run every close whose deadline is at or before `now`, earliest first.
    pub fn fire_due(&mut self, now: Instant) -> usize {
        let mut fired = 0;
        while let Some(entry) = self.entries.first_entry() {
            match entry.key().0 {
                Deadline::At(at) if at <= now => {}
                _ => break,
            }
            let pending = entry.remove();
            tracing::debug!(
                message = "dismiss.fire",
                kind = pending.kind.as_str(),
                id = pending.id.get()
            );
            (pending.close)();
            fired += 1;
        }
        fired
    }

    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        match self.entries.keys().next() {
            Some((Deadline::At(at), _)) => Some(*at),
            _ => None,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
