//! Overlay items and the ordered per-kind state that holds them.

use std::collections::BTreeMap;

use crate::id::OverlayId;

/// Optional per-item metadata (placement hints, accent names, and so on).
///
/// Ordered so renderers and snapshots are deterministic.
pub type ItemProps = BTreeMap<String, String>;

/// Ordered items of one kind. Insertion order is rendering order.
pub type KindState<C> = Vec<OverlayItem<C>>;

/// Whether an item currently participates in rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    #[default]
    Shown,
    Hidden,
}

impl Visibility {
    #[must_use]
    pub const fn is_shown(self) -> bool {
        matches!(self, Self::Shown)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Shown => "shown",
            Self::Hidden => "hidden",
        }
    }
}

/// One live overlay instance.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayItem<C> {
    pub id: OverlayId,
    pub content: C,
    pub props: ItemProps,
    pub visibility: Visibility,
}

impl<C> OverlayItem<C> {
    /// A shown item with no props.
    #[must_use]
    pub fn new(id: OverlayId, content: C) -> Self {
        Self {
            id,
            content,
            props: ItemProps::new(),
            visibility: Visibility::Shown,
        }
    }

    #[must_use]
    pub fn with_props(mut self, props: ItemProps) -> Self {
        self.props = props;
        self
    }

    #[must_use]
    pub fn is_shown(&self) -> bool {
        self.visibility.is_shown()
    }
}

/// Pure state transitions over a [`KindState`].
///
/// Each function takes the prior state by reference and returns the next one,
/// so they slot directly into a store updater. Transitions that target an id
/// not present return an unchanged copy.
pub mod transitions {
    use super::{ItemProps, KindState, OverlayItem, Visibility};
    use crate::id::OverlayId;

    #[must_use]
    pub fn append<C: Clone>(state: &KindState<C>, item: OverlayItem<C>) -> KindState<C> {
        let mut next = Vec::with_capacity(state.len() + 1);
        next.extend_from_slice(state);
        next.push(item);
        next
    }

    #[must_use]
    pub fn remove<C: Clone>(state: &KindState<C>, id: OverlayId) -> KindState<C> {
        state.iter().filter(|item| item.id != id).cloned().collect()
    }

    #[must_use]
    pub fn replace_content<C: Clone>(
        state: &KindState<C>,
        id: OverlayId,
        content: C,
        props: Option<ItemProps>,
    ) -> KindState<C> {
        state
            .iter()
            .map(|item| {
                if item.id != id {
                    return item.clone();
                }
                OverlayItem {
                    id,
                    content: content.clone(),
                    props: props.clone().unwrap_or_else(|| item.props.clone()),
                    visibility: item.visibility,
                }
            })
            .collect()
    }

    #[must_use]
    pub fn set_visibility<C: Clone>(
        state: &KindState<C>,
        id: OverlayId,
        visibility: Visibility,
    ) -> KindState<C> {
        state
            .iter()
            .map(|item| {
                let mut item = item.clone();
                if item.id == id {
                    item.visibility = visibility;
                }
                item
            })
            .collect()
    }

    #[must_use]
    pub fn contains<C>(state: &KindState<C>, id: OverlayId) -> bool {
        state.iter().any(|item| item.id == id)
    }
}
