#![forbid(unsafe_code)]

//! The collaborator surface the root mount renders into.
//!
//! The application owns one content anchor. The root mount asks the host to
//! insert a sibling container right after it, presents every kind's layer
//! into that container, and removes the container on unmount.

use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_CONTAINER_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of an overlay container inserted by a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContainerId(u64);

impl ContainerId {
    /// Mint a fresh container id. Hosts call this from `insert_after`.
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_CONTAINER_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// One kind's rendered output, tagged with the kind name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindLayer<V> {
    pub kind: String,
    pub view: V,
}

/// Rendering surface that hosts overlay output beside the content anchor.
pub trait OverlayHost<V> {
    fn has_anchor(&self, anchor: &str) -> bool;

    /// Insert an empty overlay container as the next sibling of `anchor`.
    fn insert_after(&mut self, anchor: &str) -> ContainerId;

    /// Replace the container's contents with `layers`, bottom layer first.
    fn present(&mut self, container: ContainerId, layers: &[KindLayer<V>]);

    fn remove(&mut self, container: ContainerId);
}

/// In-memory host that records containers and presented frames.
#[derive(Debug)]
pub struct HeadlessHost<V> {
    anchors: Vec<String>,
    containers: Vec<(String, ContainerId)>,
    last_frame: Option<Vec<KindLayer<V>>>,
    presents: usize,
}

impl<V> HeadlessHost<V> {
    /// A host whose document holds a single anchor element.
    #[must_use]
    pub fn new(anchor: impl Into<String>) -> Self {
        Self {
            anchors: vec![anchor.into()],
            containers: Vec::new(),
            last_frame: None,
            presents: 0,
        }
    }

    #[must_use]
    pub fn with_anchor(mut self, anchor: impl Into<String>) -> Self {
        self.anchors.push(anchor.into());
        self
    }

    /// The container currently inserted after `anchor`, if any.
    #[must_use]
    pub fn container_after(&self, anchor: &str) -> Option<ContainerId> {
        self.containers
            .iter()
            .find(|(a, _)| a == anchor)
            .map(|(_, id)| *id)
    }

    #[must_use]
    pub fn last_frame(&self) -> Option<&[KindLayer<V>]> {
        self.last_frame.as_deref()
    }

    #[must_use]
    pub fn present_count(&self) -> usize {
        self.presents
    }
}

impl<V: Clone> OverlayHost<V> for HeadlessHost<V> {
    fn has_anchor(&self, anchor: &str) -> bool {
        self.anchors.iter().any(|a| a == anchor)
    }

    fn insert_after(&mut self, anchor: &str) -> ContainerId {
        let id = ContainerId::next();
        self.containers.push((anchor.to_string(), id));
        id
    }

    fn present(&mut self, container: ContainerId, layers: &[KindLayer<V>]) {
        if !self.containers.iter().any(|(_, id)| *id == container) {
            tracing::warn!(message = "host.present_unknown_container", container = container.get());
            return;
        }
        self.last_frame = Some(layers.to_vec());
        self.presents += 1;
    }

    fn remove(&mut self, container: ContainerId) {
        self.containers.retain(|(_, id)| *id != container);
        self.last_frame = None;
    }
}
