//! Process-wide overlay identifiers.
//!
//! Identifiers come from a single atomic counter, so every call to
//! [`next_overlay_id`] returns a value distinct from all previous calls in the
//! process. Ids are never reused, which makes a late close against an old id
//! harmless.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_OVERLAY_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one overlay item. Two items are never equal by content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OverlayId(u64);

impl OverlayId {
    /// Raw counter value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for OverlayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<OverlayId> for String {
    fn from(id: OverlayId) -> Self {
        id.to_string()
    }
}

/// Mint the next identifier.
pub fn next_overlay_id() -> OverlayId {
    OverlayId(NEXT_OVERLAY_ID.fetch_add(1, Ordering::Relaxed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_distinct_and_increasing() {
        let a = next_overlay_id();
        let b = next_overlay_id();
        assert_ne!(a, b);
        assert!(b > a);
    }

    #[test]
    fn string_form_is_non_empty() {
        let id = next_overlay_id();
        let s: String = id.into();
        assert!(!s.is_empty());
        assert_eq!(s, id.get().to_string());
    }

    #[test]
    fn distinct_across_threads() {
        let handles: Vec<_> = (0..4)
            .map(|_| std::thread::spawn(|| (0..250).map(|_| next_overlay_id()).collect::<Vec<_>>()))
            .collect();
        let mut seen = HashSet::new();
        for h in handles {
            for id in h.join().expect("id thread") {
                assert!(seen.insert(id), "duplicate id {id}");
            }
        }
        assert_eq!(seen.len(), 1000);
    }
}
