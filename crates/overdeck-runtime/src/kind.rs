#![forbid(unsafe_code)]

//! Instance API for one registered overlay kind.
//!
//! [`OverlayKind::open`] mints an id, lets the caller build content that can
//! already reference its own [`Handle`], and only then appends the item to the
//! kind's store. Handles keep an id and a non-owning store reference; every
//! action reads the store fresh, so a handle never acts on a stale snapshot.

use std::fmt;
use std::rc::Rc;

use overdeck_core::{
    ItemProps, KindState, OverlayId, OverlayItem, Visibility, next_overlay_id, transitions,
};

use crate::reactive::{Store, WeakStore};

/// Application-facing entry point for a kind, e.g. `toast` or `modal`.
pub struct OverlayKind<C> {
    name: Rc<str>,
    store: Store<KindState<C>>,
}

impl<C> Clone for OverlayKind<C> {
    fn clone(&self) -> Self {
        Self {
            name: Rc::clone(&self.name),
            store: self.store.clone(),
        }
    }
}

impl<C: fmt::Debug> fmt::Debug for OverlayKind<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverlayKind")
            .field("name", &self.name)
            .field("store", &self.store)
            .finish()
    }
}

impl<C: Clone + 'static> OverlayKind<C> {
    pub(crate) fn new(name: Rc<str>, initial: KindState<C>) -> Self {
        Self {
            name,
            store: Store::new(initial),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The backing store. Mutate items through handles, not through this.
    #[must_use]
    pub fn store(&self) -> &Store<KindState<C>> {
        &self.store
    }

    /// Open a new overlay instance.
    ///
    /// `content` runs to completion before the item is published, so the item
    /// never renders without working actions. Calling actions on the handle
    /// from inside `content` is a stale no-op: the item does not exist yet.
    pub fn open(&self, content: impl FnOnce(&Handle<C>) -> C) -> Handle<C> {
        self.open_with_props(ItemProps::new(), content)
    }

    /// Open a new overlay instance carrying per-item props.
    pub fn open_with_props(
        &self,
        props: ItemProps,
        content: impl FnOnce(&Handle<C>) -> C,
    ) -> Handle<C> {
        let id = next_overlay_id();
        let handle = Handle {
            id,
            kind: Rc::clone(&self.name),
            store: self.store.downgrade(),
        };
        let item = OverlayItem::new(id, content(&handle)).with_props(props);

        tracing::debug!(message = "overlay.open", kind = &*self.name, id = id.get());
        self.store.set(move |state| transitions::append(state, item));
        handle
    }

    /// Remove the item with `id`, if it is still open.
    pub fn close(&self, id: OverlayId) {
        close_in(&self.name, &self.store, id);
    }

    /// Snapshot of the current items.
    #[must_use]
    pub fn items(&self) -> KindState<C> {
        self.store.get()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.store.with(Vec::len)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn contains(&self, id: OverlayId) -> bool {
        self.store.with(|state| transitions::contains(state, id))
    }
}

/// Whether an action on `id` should reach the store.
///
/// While the store is busy the action is queued behind updaters that may not
/// have run yet (an `open` from the same listener, say), so presence cannot be
/// judged now. The transitions treat an absent id as a no-op.
fn accepts<C>(store: &Store<KindState<C>>, id: OverlayId) -> bool {
    store.is_busy() || store.with(|state| transitions::contains(state, id))
}

fn close_in<C: Clone + 'static>(kind: &str, store: &Store<KindState<C>>, id: OverlayId) {
    if !accepts(store, id) {
        tracing::trace!(message = "overlay.stale_handle", kind, id = id.get(), action = "close");
        return;
    }
    tracing::debug!(message = "overlay.close", kind, id = id.get());
    store.set(move |state| transitions::remove(state, id));
}

/// Actions for one overlay instance.
///
/// Every action on an item that no longer exists (already closed, or its
/// registry is gone) is a silent no-op.
pub struct Handle<C> {
    id: OverlayId,
    kind: Rc<str>,
    store: WeakStore<KindState<C>>,
}

impl<C> Clone for Handle<C> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            kind: Rc::clone(&self.kind),
            store: self.store.clone(),
        }
    }
}

impl<C> fmt::Debug for Handle<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl<C: Clone + 'static> Handle<C> {
    #[must_use]
    pub fn id(&self) -> OverlayId {
        self.id
    }

    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Replace the item's content, keeping its props and visibility.
    pub fn update(&self, content: C) {
        if let Some(store) = self.live_store("update") {
            let id = self.id;
            tracing::debug!(message = "overlay.update", kind = &*self.kind, id = id.get());
            store.set(move |state| transitions::replace_content(state, id, content, None));
        }
    }

    /// Replace both content and props.
    pub fn update_with_props(&self, content: C, props: ItemProps) {
        if let Some(store) = self.live_store("update") {
            let id = self.id;
            tracing::debug!(message = "overlay.update", kind = &*self.kind, id = id.get());
            store.set(move |state| transitions::replace_content(state, id, content, Some(props)));
        }
    }

    /// Remove the item. Idempotent.
    pub fn close(&self) {
        match self.store.upgrade() {
            Some(store) => close_in(&self.kind, &store, self.id),
            None => self.log_stale("close"),
        }
    }

    pub fn hide(&self) {
        self.set_visibility(Visibility::Hidden);
    }

    pub fn show(&self) {
        self.set_visibility(Visibility::Shown);
    }

    /// Whether the item is still in its kind's state.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.store
            .upgrade()
            .is_some_and(|store| store.with(|state| transitions::contains(state, self.id)))
    }

    #[must_use]
    pub fn visibility(&self) -> Option<Visibility> {
        self.find(|item| item.visibility)
    }

    #[must_use]
    pub fn content(&self) -> Option<C> {
        self.find(|item| item.content.clone())
    }

    fn set_visibility(&self, visibility: Visibility) {
        if let Some(store) = self.live_store(visibility.as_str()) {
            let id = self.id;
            tracing::debug!(
                message = "overlay.visibility",
                kind = &*self.kind,
                id = id.get(),
                visibility = visibility.as_str()
            );
            store.set(move |state| transitions::set_visibility(state, id, visibility));
        }
    }

    fn find<R>(&self, f: impl FnOnce(&OverlayItem<C>) -> R) -> Option<R> {
        let store = self.store.upgrade()?;
        store.with(|state| state.iter().find(|item| item.id == self.id).map(f))
    }

    fn live_store(&self, action: &'static str) -> Option<Store<KindState<C>>> {
        let store = self.store.upgrade();
        match store {
            Some(store) if accepts(&store, self.id) => Some(store),
            _ => {
                self.log_stale(action);
                None
            }
        }
    }

    fn log_stale(&self, action: &'static str) {
        tracing::trace!(
            message = "overlay.stale_handle",
            kind = &*self.kind,
            id = self.id.get(),
            action
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toasts() -> OverlayKind<String> {
        OverlayKind::new(Rc::from("toast"), Vec::new())
    }

    fn contents(kind: &OverlayKind<String>) -> Vec<String> {
        kind.items().into_iter().map(|item| item.content).collect()
    }

    #[test]
    fn open_then_close() {
        let kind = toasts();
        let handle = kind.open(|_| "hi".to_string());
        assert!(!handle.id().to_string().is_empty());

        let items = kind.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, handle.id());
        assert_eq!(items[0].content, "hi");
        assert_eq!(items[0].visibility, Visibility::Shown);

        handle.close();
        assert!(kind.is_empty());
    }

    #[test]
    fn content_factory_sees_final_id() {
        let kind = toasts();
        let handle = kind.open(|h| format!("toast #{}", h.id()));
        assert_eq!(handle.content(), Some(format!("toast #{}", handle.id())));
    }

    #[test]
    fn factory_actions_before_publish_are_noops() {
        let kind = toasts();
        let handle = kind.open(|h| {
            h.close();
            "still here".to_string()
        });
        assert!(handle.is_open());
    }

    #[test]
    fn close_first_of_two_keeps_second() {
        let kind = toasts();
        let a = kind.open(|_| "A".to_string());
        let _b = kind.open(|_| "B".to_string());
        a.close();
        assert_eq!(contents(&kind), ["B"]);
    }

    #[test]
    fn close_is_idempotent() {
        let kind = toasts();
        let a = kind.open(|_| "A".to_string());
        let _b = kind.open(|_| "B".to_string());
        a.close();
        let once = kind.items();
        let version = kind.store().version();
        a.close();
        assert_eq!(kind.items(), once);
        assert_eq!(kind.store().version(), version);
    }

    #[test]
    fn update_after_close_is_noop() {
        let kind = toasts();
        let a = kind.open(|_| "A".to_string());
        let _b = kind.open(|_| "B".to_string());
        a.close();
        let before = kind.items();
        a.update("late".to_string());
        a.hide();
        assert_eq!(kind.items(), before);
        assert_eq!(a.content(), None);
        assert_eq!(a.visibility(), None);
    }

    #[test]
    fn update_replaces_in_place() {
        let kind = toasts();
        let _a = kind.open(|_| "A".to_string());
        let b = kind.open(|_| "B".to_string());
        let _c = kind.open(|_| "C".to_string());
        b.update("B2".to_string());
        assert_eq!(contents(&kind), ["A", "B2", "C"]);
    }

    #[test]
    fn update_with_props_replaces_props() {
        let kind = toasts();
        let mut props = ItemProps::new();
        props.insert("accent".into(), "green".into());
        let a = kind.open_with_props(props, |_| "A".to_string());
        assert_eq!(kind.items()[0].props.get("accent").map(String::as_str), Some("green"));

        let mut next = ItemProps::new();
        next.insert("accent".into(), "red".into());
        a.update_with_props("A2".to_string(), next);
        let item = &kind.items()[0];
        assert_eq!(item.content, "A2");
        assert_eq!(item.props.get("accent").map(String::as_str), Some("red"));
    }

    #[test]
    fn hide_then_show_round_trips_visibility() {
        let kind = toasts();
        let a = kind.open(|_| "A".to_string());
        a.hide();
        assert_eq!(a.visibility(), Some(Visibility::Hidden));
        assert!(a.is_open());
        a.show();
        assert_eq!(a.visibility(), Some(Visibility::Shown));
        assert_eq!(a.content(), Some("A".to_string()));
    }

    #[test]
    fn kind_level_close_by_id() {
        let kind = toasts();
        let a = kind.open(|_| "A".to_string());
        kind.close(a.id());
        assert!(!a.is_open());
        kind.close(a.id());
        assert!(kind.is_empty());
    }

    #[test]
    fn handle_outliving_kind_is_inert() {
        let kind = toasts();
        let a = kind.open(|_| "A".to_string());
        drop(kind);
        assert!(!a.is_open());
        a.close();
        a.update("x".to_string());
        a.show();
    }

    #[test]
    fn actions_on_handle_opened_inside_listener_apply_in_order() {
        let kind = toasts();
        let inner = kind.clone();
        let fired = Rc::new(std::cell::Cell::new(false));
        let seen: Rc<std::cell::RefCell<Option<Handle<String>>>> = Rc::default();
        let (fired2, seen2) = (Rc::clone(&fired), Rc::clone(&seen));
        let _sub = kind.store().subscribe(move |_: &KindState<String>| {
            if fired2.replace(true) {
                return;
            }
            let b = inner.open(|_| "B".to_string());
            b.update("B2".to_string());
            *seen2.borrow_mut() = Some(b.clone());
            b.close();
        });

        kind.open(|_| "A".to_string());
        assert_eq!(contents(&kind), ["A"]);
        let b = seen.borrow().clone().expect("listener ran");
        assert!(!b.is_open());
    }

    #[test]
    fn update_queued_inside_listener_lands_on_new_item() {
        let kind = toasts();
        let inner = kind.clone();
        let fired = Rc::new(std::cell::Cell::new(false));
        let fired2 = Rc::clone(&fired);
        let _sub = kind.store().subscribe(move |_: &KindState<String>| {
            if !fired2.replace(true) {
                inner.open(|_| "B".to_string()).update("B2".to_string());
            }
        });

        kind.open(|_| "A".to_string());
        assert_eq!(contents(&kind), ["A", "B2"]);
    }

    #[test]
    fn debug_shows_name_and_store() {
        let kind = toasts();
        kind.open(|_| "A".to_string());
        let rendered = format!("{kind:?}");
        assert!(rendered.contains("toast"));
        assert!(rendered.contains("subscriber_count"));
    }

    #[test]
    fn listener_closing_another_handle_is_applied() {
        let kind = toasts();
        let a = kind.open(|_| "A".to_string());
        let a2 = a.clone();
        let _sub = kind.store().subscribe(move |state: &KindState<String>| {
            if state.len() > 1 {
                a2.close();
            }
        });
        let _b = kind.open(|_| "B".to_string());
        assert_eq!(contents(&kind), ["B"]);
    }
}
